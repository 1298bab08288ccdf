//! Per-variable descriptor: declared metadata plus the borrowed source buffer.

use tracing::info;

use crate::dtype::{DataSlice, NcType};
use crate::error::IoError;

/// Deflate level requested for eligible variables. Compression can shrink a
/// floating-point output file by an order of magnitude.
const DEFLATE_LEVEL: i32 = 9;

/// A dimension as bound to one variable: a value snapshot taken at bind
/// time, so later registry changes do not retroactively alter the variable.
#[derive(Debug, Clone)]
pub(crate) struct BoundDim {
    pub(crate) name: String,
    pub(crate) extent: i64,
}

/// A variable registered with a writer session but not yet streamed out.
///
/// Holds the resolved element type, the ordered dimension snapshot, and the
/// caller's borrowed buffer. Declaring to the backend (`commit`) and
/// streaming the data (`write`) are separate steps; `write` commits first as
/// a safety net if the session skipped it.
#[derive(Debug)]
pub(crate) struct PendingVariable<'data> {
    name: String,
    nc_type: NcType,
    data: DataSlice<'data>,
    dims: Vec<BoundDim>,
    compress_hint: bool,
    committed: bool,
    compressed: bool,
}

impl<'data> PendingVariable<'data> {
    /// Pure assignment, no I/O. The type tag must already be resolved.
    pub(crate) fn new(
        name: &str,
        nc_type: NcType,
        data: DataSlice<'data>,
        dims: Vec<BoundDim>,
        compress_hint: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            nc_type,
            data,
            dims,
            compress_hint,
            committed: false,
            compressed: false,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn compressed(&self) -> bool {
        self.compressed
    }

    /// True when the compress hint applies: more than one dimension and a
    /// first axis longer than one element. Scalars, 1-D arrays, and
    /// degenerate leading axes are left uncompressed.
    fn compression_eligible(&self) -> bool {
        self.compress_hint && self.dims.len() > 1 && self.dims[0].extent > 1
    }

    /// One-time backend declaration using the resolved type and the bound
    /// dimensions in their bind order (which fixes the on-disk axis order).
    pub(crate) fn commit(
        &mut self,
        file: &mut netcdf::FileMut,
        verbose: bool,
    ) -> Result<(), IoError> {
        if self.committed {
            return Ok(());
        }

        let dim_names: Vec<&str> = self.dims.iter().map(|d| d.name.as_str()).collect();
        let mut var = match self.nc_type {
            // The backend has no boolean type; booleans are stored as bytes.
            NcType::Bool | NcType::Byte => file.add_variable::<i8>(&self.name, &dim_names),
            NcType::UByte | NcType::Char => file.add_variable::<u8>(&self.name, &dim_names),
            NcType::Short => file.add_variable::<i16>(&self.name, &dim_names),
            NcType::UShort => file.add_variable::<u16>(&self.name, &dim_names),
            NcType::Int => file.add_variable::<i32>(&self.name, &dim_names),
            NcType::UInt => file.add_variable::<u32>(&self.name, &dim_names),
            NcType::Int64 => file.add_variable::<i64>(&self.name, &dim_names),
            NcType::UInt64 => file.add_variable::<u64>(&self.name, &dim_names),
            NcType::Float => file.add_variable::<f32>(&self.name, &dim_names),
            NcType::Double => file.add_variable::<f64>(&self.name, &dim_names),
            NcType::Real => {
                // Resolved during add_variable; reaching commit unresolved is
                // a session bug, surfaced as a configuration error.
                return Err(IoError::UnresolvedReal {
                    name: self.name.clone(),
                    elem_size: self.data.elem_size(),
                });
            }
        }
        .map_err(|e| IoError::backend("define variable", self.name.as_str(), e))?;

        if self.compression_eligible() {
            var.set_compression(DEFLATE_LEVEL, true)
                .map_err(|e| IoError::backend("enable compression", self.name.as_str(), e))?;
            self.compressed = true;
        }

        if verbose {
            info!(
                variable = %self.name,
                nc_type = ?self.nc_type,
                ndims = self.dims.len(),
                compressed = self.compressed,
                "variable committed"
            );
        }

        self.committed = true;
        Ok(())
    }

    /// Attach a free-text `units` attribute. No-op for empty text; only
    /// valid once the variable has been declared to the backend.
    pub(crate) fn set_units(&self, file: &mut netcdf::FileMut, units: &str) -> Result<(), IoError> {
        if units.is_empty() {
            return Ok(());
        }
        if !self.committed {
            return Err(IoError::Backend {
                operation: "set units".to_string(),
                name: self.name.clone(),
                code: None,
                reason: "variable is not committed".to_string(),
            });
        }
        let mut var = file
            .variable_mut(&self.name)
            .ok_or_else(|| IoError::Backend {
                operation: "set units".to_string(),
                name: self.name.clone(),
                code: None,
                reason: "committed variable missing from backend".to_string(),
            })?;
        var.put_attribute("units", units)
            .map_err(|e| IoError::backend("set units", self.name.as_str(), e))?;
        Ok(())
    }

    /// Stream the borrowed buffer's current contents to the backend.
    ///
    /// Character variables sit on a record dimension and are written one
    /// element at a time; the per-record path behaves identically across
    /// backend versions that differ in bulk-write support for this shape.
    /// Every other shape is a single bulk write.
    pub(crate) fn write(&mut self, file: &mut netcdf::FileMut, verbose: bool) -> Result<(), IoError> {
        if !self.committed {
            self.commit(file, verbose)?;
        }

        let mut var = file
            .variable_mut(&self.name)
            .ok_or_else(|| IoError::Backend {
                operation: "write variable".to_string(),
                name: self.name.clone(),
                code: None,
                reason: "committed variable missing from backend".to_string(),
            })?;

        let wrap = |e: netcdf::Error| IoError::backend("write variable", self.name.as_str(), e);
        match self.data {
            DataSlice::Char(s) => {
                for (i, byte) in s.bytes().enumerate() {
                    var.put_values(&[byte], i..i + 1).map_err(wrap)?;
                }
            }
            DataSlice::Bool(v) => {
                let raw: Vec<i8> = v.iter().map(|&b| b as i8).collect();
                var.put_values(&raw, ..).map_err(wrap)?;
            }
            DataSlice::Byte(v) => var.put_values(v, ..).map_err(wrap)?,
            DataSlice::UByte(v) => var.put_values(v, ..).map_err(wrap)?,
            DataSlice::Short(v) => var.put_values(v, ..).map_err(wrap)?,
            DataSlice::UShort(v) => var.put_values(v, ..).map_err(wrap)?,
            DataSlice::Int(v) => var.put_values(v, ..).map_err(wrap)?,
            DataSlice::UInt(v) => var.put_values(v, ..).map_err(wrap)?,
            DataSlice::Int64(v) => var.put_values(v, ..).map_err(wrap)?,
            DataSlice::UInt64(v) => var.put_values(v, ..).map_err(wrap)?,
            DataSlice::Float(v) => var.put_values(v, ..).map_err(wrap)?,
            DataSlice::Double(v) => var.put_values(v, ..).map_err(wrap)?,
        }

        if verbose {
            info!(variable = %self.name, n = self.data.len(), "variable written");
        }
        Ok(())
    }
}

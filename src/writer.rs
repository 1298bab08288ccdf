//! Deferred-commit NetCDF writer session.
//!
//! A [`NetcdfOut`] accumulates dimension and variable metadata over any
//! number of `add_*` calls, declaring metadata to the backend as it goes,
//! and streams every registered buffer to disk in a single `write()`. The
//! session moves through `Open → Committed → Written → Closed` exactly once;
//! re-entering a state is a no-op and there is no path back.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::dims::Dimensions;
use crate::dtype::{DataSlice, NcType};
use crate::error::IoError;
use crate::retry::{self, OPEN_ATTEMPTS, OPEN_RETRY_DELAY};
use crate::variable::{BoundDim, PendingVariable};

// ---------------------------------------------------------------------------
// WriterOptions
// ---------------------------------------------------------------------------

/// Per-session options for a [`NetcdfOut`].
#[derive(Debug, Clone, Copy)]
pub struct WriterOptions {
    /// Emit `info!` diagnostics for opens, declarations, and writes.
    verbose: bool,
    /// Request deflate compression for eligible (multi-dimensional,
    /// non-degenerate) variables.
    compress: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            compress: true,
        }
    }
}

impl WriterOptions {
    /// Enable or disable per-session diagnostic logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enable or disable the compression hint for eligible variables.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

// ---------------------------------------------------------------------------
// Dimension registry
// ---------------------------------------------------------------------------

/// Session-wide map of declared dimensions.
///
/// A name is declared to the backend once; re-declaring it returns the
/// stored extent without validating that the lengths agree. Callers must
/// keep re-declarations consistent.
#[derive(Debug, Default)]
struct DimRegistry {
    extents: HashMap<String, i64>,
}

impl DimRegistry {
    fn declare(
        &mut self,
        file: &mut netcdf::FileMut,
        name: &str,
        extent: i64,
    ) -> Result<i64, IoError> {
        if extent == 0 {
            return Err(IoError::InvalidDimension {
                name: name.to_string(),
                len: extent,
            });
        }
        if let Some(&stored) = self.extents.get(name) {
            return Ok(stored);
        }
        if extent < 0 {
            file.add_unlimited_dimension(name)
                .map_err(|e| IoError::backend("define dimension", name, e))?;
        } else {
            file.add_dimension(name, extent as usize)
                .map_err(|e| IoError::backend("define dimension", name, e))?;
        }
        self.extents.insert(name.to_string(), extent);
        Ok(extent)
    }
}

// ---------------------------------------------------------------------------
// NetcdfOut
// ---------------------------------------------------------------------------

/// A write-only NetCDF session for one output file.
///
/// Buffers passed to the `add_*` methods are borrowed, not copied; the
/// `'data` lifetime keeps them alive and immutable until the session is
/// written or dropped. Dropping the session closes it, committing and
/// writing first if the caller never did.
///
/// Not safe for concurrent use; one writer owns a session for its lifetime.
#[derive(Debug)]
pub struct NetcdfOut<'data> {
    path: PathBuf,
    file: Option<netcdf::FileMut>,
    dims: DimRegistry,
    variables: BTreeMap<String, PendingVariable<'data>>,
    // Buffer address -> variable name, for the deferred-write alias check.
    bound: HashMap<usize, String>,
    committed: bool,
    written: bool,
    verbose: bool,
    compress: bool,
}

impl<'data> NetcdfOut<'data> {
    /// Create a fresh output file at `path` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Backend`] if the parent directory cannot be
    /// created or the backend create call keeps failing after the bounded
    /// retries.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, IoError> {
        Self::create_with(path, WriterOptions::default())
    }

    /// Create a fresh output file at `path`.
    ///
    /// The file is always created anew (truncating any previous content;
    /// this is a writer-only format, never update-in-place). Missing parent
    /// directories are created first. The backend create call is retried up
    /// to five times with a five second delay, to ride out transient
    /// contention on shared filesystems.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    pub fn create_with(path: impl AsRef<Path>, options: WriterOptions) -> Result<Self, IoError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| IoError::Backend {
                    operation: "create directory".to_string(),
                    name: parent.display().to_string(),
                    code: None,
                    reason: e.to_string(),
                })?;
            }
        }

        let path_display = path.display().to_string();
        let file = retry::with_retry(OPEN_ATTEMPTS, OPEN_RETRY_DELAY, "create", &path_display, || {
            netcdf::create(&path)
        })?;

        if options.verbose {
            info!(path = %path_display, "output file created");
        }

        Ok(Self {
            path,
            file: Some(file),
            dims: DimRegistry::default(),
            variables: BTreeMap::new(),
            bound: HashMap::new(),
            committed: false,
            written: false,
            verbose: options.verbose,
            compress: options.compress,
        })
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once the metadata phase has ended.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// True once the variable data has been streamed out.
    pub fn is_written(&self) -> bool {
        self.written
    }

    /// Number of variables registered so far.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Whether compression was configured for a registered variable, or
    /// `None` if no such variable exists.
    pub fn compressed(&self, name: &str) -> Option<bool> {
        self.variables.get(name).map(PendingVariable::compressed)
    }

    /// Register a variable: declare its dimensions and itself to the
    /// backend, and remember its borrowed buffer for the later `write()`.
    ///
    /// `ty` may be [`NcType::Real`], which resolves to `Float` or `Double`
    /// from the buffer's element width. An empty `units` string attaches no
    /// attribute.
    ///
    /// # Errors
    ///
    /// Configuration errors: empty buffer, call after [`commit`](Self::commit)
    /// or [`close`](Self::close), duplicate name, type tag not matching the
    /// buffer, or a buffer pointer-identical to one already bound — deferred
    /// writing would make both variables read the same memory at write time,
    /// which cannot be told apart from a copy-paste mistake.
    /// [`IoError::Backend`] if the backend rejects a declaration.
    pub fn add_variable(
        &mut self,
        name: &str,
        ty: NcType,
        data: DataSlice<'data>,
        dims: &Dimensions,
        units: &str,
    ) -> Result<(), IoError> {
        if self.file.is_none() {
            return Err(IoError::SessionClosed {
                path: self.path.clone(),
            });
        }
        if self.committed {
            return Err(IoError::AlreadyCommitted {
                name: name.to_string(),
            });
        }
        if data.is_empty() {
            return Err(IoError::EmptyBuffer {
                name: name.to_string(),
            });
        }
        if self.variables.contains_key(name) {
            return Err(IoError::DuplicateVariable {
                name: name.to_string(),
            });
        }
        if let Some(previous) = self.bound.get(&data.addr()) {
            return Err(IoError::AliasedBuffer {
                name: name.to_string(),
                previous: previous.clone(),
            });
        }

        let resolved = data.resolve(name, ty)?;

        let file = self.file.as_mut().ok_or_else(|| IoError::SessionClosed {
            path: self.path.clone(),
        })?;

        // Declare each requested dimension, then snapshot the registry's
        // current values into the variable. Reuse of an existing name keeps
        // the originally declared extent.
        let mut bound_dims = Vec::with_capacity(dims.len());
        for spec in dims.iter() {
            let extent = self.dims.declare(file, spec.name(), spec.extent())?;
            bound_dims.push(BoundDim {
                name: spec.name().to_string(),
                extent,
            });
        }

        let mut variable = PendingVariable::new(name, resolved, data, bound_dims, self.compress);
        variable.commit(file, self.verbose)?;
        variable.set_units(file, units)?;

        self.bound.insert(data.addr(), name.to_string());
        self.variables.insert(name.to_string(), variable);

        if self.verbose {
            info!(variable = name, file = %self.path.display(), "variable registered");
        }
        Ok(())
    }

    /// Register a scalar under the shared implicit `"scalar"` dimension.
    ///
    /// # Errors
    ///
    /// See [`add_variable`](Self::add_variable).
    pub fn add_scalar(
        &mut self,
        name: &str,
        ty: NcType,
        data: DataSlice<'data>,
        units: &str,
    ) -> Result<(), IoError> {
        let dims = Dimensions::new().with("scalar", 1);
        self.add_variable(name, ty, data, &dims, units)
    }

    /// Register a 1-D array under one named dimension whose extent is the
    /// buffer length.
    ///
    /// # Errors
    ///
    /// See [`add_variable`](Self::add_variable).
    pub fn add_1d(
        &mut self,
        name: &str,
        ty: NcType,
        data: DataSlice<'data>,
        dim_name: &str,
        units: &str,
    ) -> Result<(), IoError> {
        let dims = Dimensions::new().with(dim_name, data.len() as i64);
        self.add_variable(name, ty, data, &dims, units)
    }

    /// Register a 2-D array under two named dimensions, row-major.
    ///
    /// # Errors
    ///
    /// See [`add_variable`](Self::add_variable).
    #[allow(clippy::too_many_arguments)]
    pub fn add_2d(
        &mut self,
        name: &str,
        ty: NcType,
        data: DataSlice<'data>,
        dim0: (&str, i64),
        dim1: (&str, i64),
        units: &str,
    ) -> Result<(), IoError> {
        let dims = Dimensions::new().with(dim0.0, dim0.1).with(dim1.0, dim1.1);
        self.add_variable(name, ty, data, &dims, units)
    }

    /// Register a string as a 1-D character array.
    ///
    /// The text goes under an auto-generated `string<len>` dimension using
    /// the counted-record convention, so the on-disk extent is exactly the
    /// byte length of `text`.
    ///
    /// # Errors
    ///
    /// See [`add_variable`](Self::add_variable); an empty string is an
    /// empty buffer.
    pub fn add_string(&mut self, name: &str, text: &'data str) -> Result<(), IoError> {
        let dim_name = format!("string{}", text.len());
        let dims = Dimensions::new().with(dim_name, -(text.len() as i64));
        self.add_variable(name, NcType::Char, DataSlice::Char(text), &dims, "")
    }

    /// End the metadata phase. Idempotent and irreversible: no dimension or
    /// variable declarations are accepted afterwards.
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible to match the other transitions.
    pub fn commit(&mut self) -> Result<(), IoError> {
        if !self.committed && self.verbose {
            info!(file = %self.path.display(), "metadata committed");
        }
        self.committed = true;
        Ok(())
    }

    /// Stream every registered variable's current buffer contents to disk.
    ///
    /// Commits first if needed. The relative order across variables is
    /// unspecified; each variable's data is correct as of this call.
    /// Idempotent: a second call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Backend`] from the first failing variable write;
    /// the file is then partially written and should be discarded.
    pub fn write(&mut self) -> Result<(), IoError> {
        self.commit()?;
        if self.written {
            return Ok(());
        }
        let file = self.file.as_mut().ok_or_else(|| IoError::SessionClosed {
            path: self.path.clone(),
        })?;
        for variable in self.variables.values_mut() {
            variable.write(file, self.verbose)?;
        }
        self.written = true;
        if self.verbose {
            info!(
                file = %self.path.display(),
                n_variables = self.variables.len(),
                "all variables written"
            );
        }
        Ok(())
    }

    /// Commit and write if not already done, then release the backend
    /// handle. Safe to call repeatedly; also invoked on drop.
    ///
    /// # Errors
    ///
    /// Propagates any pending [`write`](Self::write) failure.
    pub fn close(&mut self) -> Result<(), IoError> {
        if self.file.is_none() {
            return Ok(());
        }
        self.write()?;
        // Dropping the handle flushes and closes the backend file.
        self.file = None;
        if self.verbose {
            info!(file = %self.path.display(), "output file closed");
        }
        Ok(())
    }
}

impl Drop for NetcdfOut<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!(file = %self.path.display(), error = %e, "closing NetCDF output failed");
        }
    }
}

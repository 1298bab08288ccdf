//! Read-only NetCDF session.

use std::path::{Path, PathBuf};

use netcdf::types::NcTypeDescriptor;
use tracing::{debug, info};

use crate::error::IoError;
use crate::retry::{self, OPEN_ATTEMPTS, OPEN_RETRY_DELAY};

// ---------------------------------------------------------------------------
// ReaderOptions
// ---------------------------------------------------------------------------

/// Per-session options for a [`NetcdfIn`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderOptions {
    /// Emit `info!` diagnostics for opens and reads.
    verbose: bool,
}

impl ReaderOptions {
    /// Enable or disable per-session diagnostic logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

// ---------------------------------------------------------------------------
// NetcdfIn
// ---------------------------------------------------------------------------

/// A read-only session over one existing NetCDF file.
///
/// Reads a single named variable's full contents at a time, either by exact
/// name or by trying a list of candidate names in turn — output files
/// written under slightly different naming conventions across tool versions
/// can then be read with one candidate list.
#[derive(Debug)]
pub struct NetcdfIn {
    path: PathBuf,
    file: netcdf::File,
    verbose: bool,
}

impl NetcdfIn {
    /// Open an existing file at `path` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::FileNotFound`] if `path` does not exist, or
    /// [`IoError::Backend`] if the backend open call keeps failing after the
    /// bounded retries.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        Self::open_with(path, ReaderOptions::default())
    }

    /// Open an existing file at `path`.
    ///
    /// A missing path fails immediately; an existing path is opened with the
    /// same five-attempt, five-second-delay retry policy as the writer.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn open_with(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self, IoError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(IoError::FileNotFound { path });
        }

        let path_display = path.display().to_string();
        let file = retry::with_retry(OPEN_ATTEMPTS, OPEN_RETRY_DELAY, "open", &path_display, || {
            netcdf::open(&path)
        })?;

        if options.verbose {
            info!(path = %path_display, "input file opened");
        }

        Ok(Self {
            path,
            file,
            verbose: options.verbose,
        })
    }

    /// Path of the input file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total number of elements of a named variable, for sizing read buffers.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::VariableNotFound`] if the variable is absent.
    pub fn variable_len(&self, name: &str) -> Result<usize, IoError> {
        let var = self.lookup(name)?;
        Ok(var.dimensions().iter().map(|d| d.len()).product())
    }

    /// Read the full contents of a named variable.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::VariableNotFound`] if the variable is absent, or
    /// [`IoError::Backend`] if the backend read call fails.
    pub fn read_values<T: NcTypeDescriptor + Copy>(&self, name: &str) -> Result<Vec<T>, IoError> {
        let var = self.lookup(name)?;
        let values = var
            .get_values::<T, _>(..)
            .map_err(|e| IoError::backend("read variable", name, e))?;
        if self.verbose {
            info!(variable = name, n = values.len(), "variable read");
        }
        Ok(values)
    }

    /// Read the full contents of a named variable into a caller buffer.
    ///
    /// # Errors
    ///
    /// As [`read_values`](Self::read_values), plus
    /// [`IoError::BufferLength`] if `out` does not match the variable's
    /// element count exactly.
    pub fn read_into<T: NcTypeDescriptor + Copy>(
        &self,
        name: &str,
        out: &mut [T],
    ) -> Result<(), IoError> {
        let expected = self.variable_len(name)?;
        if out.len() != expected {
            return Err(IoError::BufferLength {
                name: name.to_string(),
                expected,
                got: out.len(),
            });
        }
        let values = self.read_values::<T>(name)?;
        out.copy_from_slice(&values);
        Ok(())
    }

    /// Read a string variable into a freshly sized text buffer.
    ///
    /// The length comes from the variable's own dimensions, so short strings
    /// come back exactly as written — no padding and no fixed scratch-buffer
    /// truncation. Trailing NUL bytes from fixed-width storage are stripped.
    ///
    /// # Errors
    ///
    /// As [`read_values`](Self::read_values); non-UTF-8 content is reported
    /// as a [`IoError::Backend`] decode failure.
    pub fn read_string(&self, name: &str) -> Result<String, IoError> {
        let bytes = self.read_values::<u8>(name)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        String::from_utf8(bytes[..end].to_vec()).map_err(|e| IoError::Backend {
            operation: "decode text".to_string(),
            name: name.to_string(),
            code: None,
            reason: e.to_string(),
        })
    }

    /// Read the first candidate variable that both exists and reads
    /// successfully, returning the winning name with the data.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::VariableNotFound`] carrying the joined candidate
    /// list if every candidate is absent or fails to read — a naming or
    /// versioning mismatch, distinct from a backend fault.
    pub fn read_first<T: NcTypeDescriptor + Copy>(
        &self,
        candidates: &[&str],
    ) -> Result<(String, Vec<T>), IoError> {
        for &candidate in candidates {
            if self.file.variable(candidate).is_none() {
                continue;
            }
            match self.read_values::<T>(candidate) {
                Ok(values) => return Ok((candidate.to_string(), values)),
                Err(e) => {
                    debug!(variable = candidate, error = %e, "candidate read failed, trying next");
                }
            }
        }
        Err(self.not_found(&candidates.join(",")))
    }

    /// String-typed counterpart of [`read_first`](Self::read_first).
    ///
    /// # Errors
    ///
    /// See [`read_first`](Self::read_first).
    pub fn read_first_string(&self, candidates: &[&str]) -> Result<(String, String), IoError> {
        for &candidate in candidates {
            if self.file.variable(candidate).is_none() {
                continue;
            }
            match self.read_string(candidate) {
                Ok(text) => return Ok((candidate.to_string(), text)),
                Err(e) => {
                    debug!(variable = candidate, error = %e, "candidate read failed, trying next");
                }
            }
        }
        Err(self.not_found(&candidates.join(",")))
    }

    fn lookup(&self, name: &str) -> Result<netcdf::Variable<'_>, IoError> {
        self.file
            .variable(name)
            .ok_or_else(|| self.not_found(name))
    }

    fn not_found(&self, name: &str) -> IoError {
        IoError::VariableNotFound {
            name: name.to_string(),
            path: self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_fails_before_retry() {
        let err = NetcdfIn::open("/definitely/not/here.nc").unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn options_builder() {
        let opts = ReaderOptions::default().with_verbose(true);
        assert!(opts.verbose);
        assert!(!ReaderOptions::default().verbose);
    }
}

//! Error types for ncio.

use std::path::PathBuf;

use crate::dtype::NcType;

/// Error type for all fallible operations in the ncio crate.
///
/// Three broad categories, kept as distinct variants so callers can react
/// differently to each:
///
/// - configuration errors ([`EmptyBuffer`](IoError::EmptyBuffer),
///   [`AliasedBuffer`](IoError::AliasedBuffer), and friends) — programmer
///   mistakes in how the session is driven, detected before any backend call;
/// - backend failures ([`Backend`](IoError::Backend)) — the NetCDF engine
///   rejected a declare/write/read call, wrapped with the failing operation,
///   the entity name, and the native error;
/// - read-side lookup misses ([`VariableNotFound`](IoError::VariableNotFound))
///   — a naming/versioning mismatch rather than an I/O fault.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Wraps a failed call into the NetCDF library with its context.
    #[error("netcdf {operation} failed for '{name}': {reason}")]
    Backend {
        /// The operation that failed (e.g. `"define variable"`).
        operation: String,
        /// Name of the variable, dimension, or file involved.
        name: String,
        /// Native NetCDF status code, when the backend reported one.
        code: Option<i32>,
        /// Description of the underlying failure.
        reason: String,
    },

    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when a variable's source buffer is empty.
    #[error("source buffer for variable '{name}' is empty")]
    EmptyBuffer {
        /// Name of the rejected variable.
        name: String,
    },

    /// Returned when two variables would share one source buffer.
    ///
    /// Writing is deferred, so both variables would read the same memory at
    /// write time and silently duplicate data.
    #[error("variable '{name}' shares its source buffer with variable '{previous}'")]
    AliasedBuffer {
        /// Name of the variable being added.
        name: String,
        /// Name of the variable already bound to the buffer.
        previous: String,
    },

    /// Returned when a variable name is declared twice in one session.
    #[error("variable '{name}' is already defined in this session")]
    DuplicateVariable {
        /// The duplicated name.
        name: String,
    },

    /// Returned when a declaration arrives after the metadata phase ended.
    #[error("cannot add variable '{name}': session metadata is already committed")]
    AlreadyCommitted {
        /// Name of the rejected variable.
        name: String,
    },

    /// Returned when an operation is attempted on a closed session.
    #[error("session for {} is closed", path.display())]
    SessionClosed {
        /// Path of the session's file.
        path: PathBuf,
    },

    /// Returned when a dimension is declared with an invalid length.
    ///
    /// Zero is reserved by the backend for the unbounded sentinel; the
    /// unbounded intent must be expressed through a negative length instead.
    #[error("invalid length {len} for dimension '{name}'")]
    InvalidDimension {
        /// Name of the dimension.
        name: String,
        /// The rejected length.
        len: i64,
    },

    /// Returned when the `Real` type alias cannot be resolved.
    #[error("cannot resolve real type for variable '{name}': element width {elem_size} matches neither float nor double")]
    UnresolvedReal {
        /// Name of the variable.
        name: String,
        /// Element size of the offending buffer, in bytes.
        elem_size: usize,
    },

    /// Returned when a type tag does not match the supplied buffer variant.
    #[error("type tag {expected:?} does not match {found:?} buffer for variable '{name}'")]
    TypeMismatch {
        /// Name of the variable.
        name: String,
        /// The declared type tag.
        expected: NcType,
        /// The type implied by the data slice.
        found: NcType,
    },

    /// Returned when a requested variable is absent under all attempted names.
    #[error("variable '{name}' not found in {}", path.display())]
    VariableNotFound {
        /// The requested name, or the comma-joined candidate list.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a caller-provided read buffer has the wrong length.
    #[error("buffer of length {got} does not match variable '{name}' of length {expected}")]
    BufferLength {
        /// Name of the variable.
        name: String,
        /// Number of elements in the file.
        expected: usize,
        /// Number of elements in the caller's buffer.
        got: usize,
    },
}

impl IoError {
    /// Wrap a backend error with the failing operation and entity name.
    pub(crate) fn backend(
        operation: impl Into<String>,
        name: impl Into<String>,
        source: netcdf::Error,
    ) -> Self {
        let code = match &source {
            netcdf::Error::Netcdf(code) => Some(*code),
            _ => None,
        };
        IoError::Backend {
            operation: operation.into(),
            name: name.into(),
            code,
            reason: source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_backend() {
        let err = IoError::Backend {
            operation: "define variable".to_string(),
            name: "psi".to_string(),
            code: Some(-42),
            reason: "NetCDF: String match to name in use".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "netcdf define variable failed for 'psi': NetCDF: String match to name in use"
        );
    }

    #[test]
    fn display_file_not_found() {
        let err = IoError::FileNotFound {
            path: PathBuf::from("/tmp/missing.nc"),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.nc");
    }

    #[test]
    fn display_aliased_buffer() {
        let err = IoError::AliasedBuffer {
            name: "b".to_string(),
            previous: "a".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "variable 'b' shares its source buffer with variable 'a'"
        );
    }

    #[test]
    fn display_invalid_dimension() {
        let err = IoError::InvalidDimension {
            name: "time".to_string(),
            len: 0,
        };
        assert_eq!(err.to_string(), "invalid length 0 for dimension 'time'");
    }

    #[test]
    fn display_variable_not_found() {
        let err = IoError::VariableNotFound {
            name: "beta,alpha".to_string(),
            path: PathBuf::from("/data/run.nc"),
        };
        assert_eq!(
            err.to_string(),
            "variable 'beta,alpha' not found in /data/run.nc"
        );
    }

    #[test]
    fn backend_helper_extracts_native_code() {
        let err = IoError::backend("open", "/tmp/x.nc", netcdf::Error::Netcdf(-101));
        match err {
            IoError::Backend { code, .. } => assert_eq!(code, Some(-101)),
            _ => panic!("expected Backend error"),
        }
    }

    #[test]
    fn backend_helper_without_code() {
        let err = IoError::backend("open", "/tmp/x.nc", netcdf::Error::Str("boom".to_string()));
        match err {
            IoError::Backend { code, reason, .. } => {
                assert_eq!(code, None);
                assert!(reason.contains("boom"));
            }
            _ => panic!("expected Backend error"),
        }
    }

    #[test]
    fn error_is_send_sync_and_std_error() {
        fn assert_bounds<T: Send + Sync + std::error::Error>() {}
        assert_bounds::<IoError>();
    }
}

//! Bounded retry around opening NetCDF files.
//!
//! Creating or opening a file on a contended shared filesystem can fail
//! transiently; both session types retry the backend call a fixed number of
//! times with a fixed delay before escalating to a backend error. This is
//! tolerance for filesystem contention, not for concurrent access from other
//! threads of the same process.

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::IoError;

/// Number of attempts before an open/create failure becomes fatal.
pub(crate) const OPEN_ATTEMPTS: u32 = 5;

/// Delay between open/create attempts.
pub(crate) const OPEN_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Run `f` up to `attempts` times, sleeping `delay` between failures.
///
/// The last backend error is wrapped with `operation` and `target` context
/// once the attempts are exhausted. `attempts` is clamped to at least one.
pub(crate) fn with_retry<T>(
    attempts: u32,
    delay: Duration,
    operation: &str,
    target: &str,
    mut f: impl FnMut() -> Result<T, netcdf::Error>,
) -> Result<T, IoError> {
    let attempts = attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f() {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= attempts {
                    return Err(IoError::backend(operation, target, e));
                }
                warn!(
                    target_file = target,
                    operation,
                    attempt,
                    attempts,
                    error = %e,
                    "netcdf open failed, retrying"
                );
                thread::sleep(delay);
            }
        }
    }
}

//! # ncio
//!
//! Deferred-commit NetCDF output sessions for simulation codes, plus a
//! retry-tolerant read-only session.
//!
//! A [`NetcdfOut`] collects dimension and variable metadata across any
//! number of `add_*` calls without copying the caller's buffers, then
//! streams everything to disk at a single `write()` point. The session
//! enforces a strict two-phase protocol — declare everything, then seal and
//! write everything — and rejects two variables bound to the same source
//! buffer, since deferred writing would silently duplicate their data.
//!
//! ```no_run
//! use ncio::{DataSlice, NcType, NetcdfOut};
//!
//! # fn main() -> Result<(), ncio::IoError> {
//! let step = [42i32];
//! let energy = [0.1f64, 0.2, 0.4, 0.8];
//!
//! let mut out = NetcdfOut::create("output/run.nc")?;
//! out.add_scalar("step", NcType::Int, DataSlice::Int(&step), "")?;
//! out.add_1d("energy", NcType::Double, DataSlice::Double(&energy), "time", "eV")?;
//! out.close()?;
//! # Ok(())
//! # }
//! ```

mod dims;
mod dtype;
mod error;
mod reader;
mod retry;
mod variable;
mod writer;

pub use dims::{DimSpec, Dimensions};
pub use dtype::{DataSlice, NcType};
pub use error::IoError;
pub use reader::{NetcdfIn, ReaderOptions};
pub use writer::{NetcdfOut, WriterOptions};

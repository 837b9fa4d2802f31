//! Rolling statistics and interpolation primitives for 1-min series.
//!
//! Pure math library — zero I/O. Provides centered rolling aggregations with
//! NaN-propagating boundary semantics, first differences, NaN-aware linear
//! interpolation, bounded gap filling, and the equation-of-time harmonic fit
//! used to convert UTC timestamps to true solar time.

mod error;
mod interp;
mod rolling;
mod solar;

pub use error::SeriesError;
pub use interp::{fill_gaps, LinearInterp};
pub use rolling::{diff, rolling_max, rolling_mean, rolling_sum};
pub use solar::{cos_zenith, equation_of_time, solar_time_offset_seconds};

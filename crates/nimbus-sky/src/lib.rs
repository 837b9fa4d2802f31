//! Rule-based sky-condition classification for 1-min solar irradiance series.
//!
//! Classifies each timestamp of a 1-min GHI time series into one of seven
//! sky types (unknown, overcast, thick clouds, scattered clouds, thin
//! clouds, cloudless, cloud enhancement) from ratios of measured to
//! clear-sky-model irradiance and their short-horizon variability, followed
//! by multi-pass temporal cleaning of short mislabeled runs.
//!
//! The entry point is [`classify`], driven by an explicit immutable
//! [`ClassifyConfig`]. Pure batch computation over an in-memory series:
//! no I/O, no retained state, independent series can be classified in
//! parallel with no coordination.

mod classify;
mod clean;
mod config;
mod error;
mod indices;
mod mirror;
mod segment;
mod series;
mod skytype;

pub use classify::{classify, Classification};
pub use clean::{
    clean_cloudless_to_thin, clean_scatter_flanked_by_thin, clean_spurious_patches,
    clean_thin_to_scatter,
};
pub use config::ClassifyConfig;
pub use error::SkyError;
pub use indices::{compute_indices, Indices};
pub use mirror::ghi_mirroring;
pub use segment::{reduce, reconstruct, segment, Patch, Segmentation};
pub use series::{IrradianceSeries, IrradianceSeriesBuilder};
pub use skytype::{known_sky_types, SkyType};

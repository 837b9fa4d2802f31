//! CSV input/output for the nimbus sky-classification pipeline.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{LoadedSeries, TimestampFormat};
pub use error::IoError;
pub use reader::{SeriesReader, CALENDAR_COLUMNS, REQUIRED_COLUMNS};
pub use writer::LabelWriter;

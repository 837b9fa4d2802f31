//! CSV label writer preserving the input timestamp representation.

use std::path::{Path, PathBuf};

use chrono::{Datelike, Timelike};
use nimbus_sky::{Classification, IrradianceSeries};
use tracing::{info, instrument};

use crate::domain::TimestampFormat;
use crate::reader::CALENDAR_COLUMNS;
use crate::IoError;

/// Writes classification results to a CSV file.
///
/// The output reproduces the input's timestamp representation (a `times`
/// column or the six calendar columns) followed by a `sky_type` integer
/// column; with `full_output`, the `Km`, `Kv` and `Kvf` index columns are
/// appended. NaN index values are written as `NaN`.
pub struct LabelWriter {
    path: PathBuf,
}

impl LabelWriter {
    /// Create a new writer targeting the given output path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Write the label series (and optionally the index columns).
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be created or written.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn write(
        &self,
        series: &IrradianceSeries,
        classification: &Classification,
        timestamp_format: TimestampFormat,
        full_output: bool,
    ) -> Result<(), IoError> {
        let mut wtr = csv::Writer::from_path(&self.path).map_err(|e| self.write_error(e))?;

        let mut header: Vec<&str> = match timestamp_format {
            TimestampFormat::TimesColumn => vec!["times"],
            TimestampFormat::CalendarColumns => CALENDAR_COLUMNS.to_vec(),
        };
        header.push("sky_type");
        if full_output {
            header.extend(["Km", "Kv", "Kvf"]);
        }
        wtr.write_record(&header).map_err(|e| self.write_error(e))?;

        let indices = &classification.indices;
        for (i, time) in series.times().iter().enumerate() {
            let mut record: Vec<String> = match timestamp_format {
                TimestampFormat::TimesColumn => {
                    vec![time.format("%Y-%m-%d %H:%M:%S").to_string()]
                }
                TimestampFormat::CalendarColumns => vec![
                    time.year().to_string(),
                    time.month().to_string(),
                    time.day().to_string(),
                    time.hour().to_string(),
                    time.minute().to_string(),
                    time.second().to_string(),
                ],
            };
            record.push(classification.sky_type[i].as_u8().to_string());
            if full_output {
                record.push(indices.km[i].to_string());
                record.push(indices.kv[i].to_string());
                record.push(indices.kvf[i].to_string());
            }
            wtr.write_record(&record).map_err(|e| self.write_error(e))?;
        }

        wtr.flush().map_err(|e| IoError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;

        info!(n_samples = series.len(), full_output, "labels written");
        Ok(())
    }

    fn write_error(&self, error: csv::Error) -> IoError {
        IoError::WriteFile {
            path: self.path.clone(),
            source: std::io::Error::other(error),
        }
    }
}

//! CSV series reader with required-column validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use nimbus_sky::IrradianceSeries;
use tracing::{debug, info, instrument};

use crate::domain::{LoadedSeries, TimestampFormat};
use crate::IoError;

/// Data columns every input table must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = ["sza", "eth", "ghi", "ghics", "ghicda"];

/// The calendar-column timestamp representation.
pub const CALENDAR_COLUMNS: [&str; 6] = ["Year", "Month", "Day", "Hour", "Minute", "Second"];

/// Reads a 1-min irradiance series from a CSV file.
///
/// Expected CSV format:
/// - Header row required.
/// - Timestamps as either a `times` column (`%Y-%m-%d %H:%M:%S` UTC, `T`
///   separator accepted) or the six columns `Year,Month,Day,Hour,Minute,Second`.
/// - Data columns `sza,eth,ghi,ghics,ghicda`; `longitude` and `dif` are
///   picked up when present.
/// - Empty cells and `NaN` markers parse as NaN — missing data is legal.
/// - Rows are sorted by timestamp after loading.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::NoTimestampColumns`] | Neither timestamp representation present |
/// | [`IoError::MissingColumns`] | Any required data column absent (all named) |
/// | [`IoError::InvalidTimestamp`] | Unparseable timestamp cell |
/// | [`IoError::InvalidValue`] | Unparseable data cell |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InvalidSeries`] | Duplicate timestamps or inconsistent series |
pub struct SeriesReader {
    path: PathBuf,
}

impl SeriesReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<LoadedSeries, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        })?;
        let columns: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        debug!(n_columns = columns.len(), "read CSV header");

        // Calendar columns take precedence over a `times` column.
        let timestamp_format = if CALENDAR_COLUMNS.iter().all(|c| columns.contains_key(*c)) {
            TimestampFormat::CalendarColumns
        } else if columns.contains_key("times") {
            TimestampFormat::TimesColumn
        } else {
            return Err(IoError::NoTimestampColumns);
        };

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !columns.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(IoError::MissingColumns { columns: missing });
        }

        let has_longitude = columns.contains_key("longitude");
        let has_dif = columns.contains_key("dif");

        struct Row {
            time: DateTime<Utc>,
            values: [f64; 5],
            longitude: f64,
            dif: f64,
        }

        let mut rows: Vec<Row> = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            let time = match timestamp_format {
                TimestampFormat::TimesColumn => {
                    let raw = record.get(columns["times"]).unwrap_or("");
                    parse_timestamp(raw).ok_or_else(|| IoError::InvalidTimestamp {
                        path: self.path.clone(),
                        row_index,
                        raw: raw.to_string(),
                    })?
                }
                TimestampFormat::CalendarColumns => {
                    self.parse_calendar_row(&columns, &record, row_index)?
                }
            };

            let mut values = [f64::NAN; 5];
            for (slot, name) in values.iter_mut().zip(REQUIRED_COLUMNS) {
                *slot = self.parse_cell(&columns, &record, name, row_index)?;
            }
            let longitude = if has_longitude {
                self.parse_cell(&columns, &record, "longitude", row_index)?
            } else {
                f64::NAN
            };
            let dif = if has_dif {
                self.parse_cell(&columns, &record, "dif", row_index)?
            } else {
                f64::NAN
            };

            rows.push(Row {
                time,
                values,
                longitude,
                dif,
            });
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        rows.sort_by_key(|r| r.time);

        let times: Vec<DateTime<Utc>> = rows.iter().map(|r| r.time).collect();
        let mut builder = IrradianceSeries::builder(times)
            .sza(rows.iter().map(|r| r.values[0]).collect())
            .eth(rows.iter().map(|r| r.values[1]).collect())
            .ghi(rows.iter().map(|r| r.values[2]).collect())
            .ghics(rows.iter().map(|r| r.values[3]).collect())
            .ghicda(rows.iter().map(|r| r.values[4]).collect());
        if has_longitude {
            builder = builder.longitude(rows.iter().map(|r| r.longitude).collect());
        }
        if has_dif {
            builder = builder.dif(rows.iter().map(|r| r.dif).collect());
        }
        let series = builder.build()?;

        info!(n_samples = series.len(), ?timestamp_format, "series loaded");
        Ok(LoadedSeries {
            series,
            timestamp_format,
        })
    }

    fn parse_cell(
        &self,
        columns: &HashMap<String, usize>,
        record: &csv::StringRecord,
        name: &str,
        row_index: usize,
    ) -> Result<f64, IoError> {
        let raw = record.get(columns[name]).unwrap_or("");
        parse_float(raw).ok_or_else(|| IoError::InvalidValue {
            path: self.path.clone(),
            row_index,
            column: name.to_string(),
            raw: raw.to_string(),
        })
    }

    fn parse_calendar_row(
        &self,
        columns: &HashMap<String, usize>,
        record: &csv::StringRecord,
        row_index: usize,
    ) -> Result<DateTime<Utc>, IoError> {
        let mut parts = [0i64; 6];
        for (slot, name) in parts.iter_mut().zip(CALENDAR_COLUMNS) {
            let raw = record.get(columns[name]).unwrap_or("");
            *slot = raw
                .trim()
                .parse()
                .map_err(|_| IoError::InvalidTimestamp {
                    path: self.path.clone(),
                    row_index,
                    raw: raw.to_string(),
                })?;
        }
        let [year, month, day, hour, minute, second] = parts;
        Utc.with_ymd_and_hms(
            year as i32,
            month as u32,
            day as u32,
            hour as u32,
            minute as u32,
            second as u32,
        )
        .single()
        .ok_or_else(|| IoError::InvalidTimestamp {
            path: self.path.clone(),
            row_index,
            raw: format!("{year}-{month}-{day} {hour}:{minute}:{second}"),
        })
    }
}

/// Parse a data cell. Empty cells and NaN markers are missing data.
fn parse_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    trimmed.parse().ok()
}

/// Parse a `times` cell: `%Y-%m-%d %H:%M:%S`, `T` separator, or RFC 3339.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_times_column_file() {
        let csv = "times,sza,eth,ghi,ghics,ghicda\n\
                   2019-06-01 10:00:00,30.0,1300.0,800.0,850.0,900.0\n\
                   2019-06-01 10:01:00,30.1,1300.0,805.0,851.0,901.0\n";
        let f = write_csv(csv);
        let loaded = SeriesReader::new(f.path()).read().unwrap();
        assert_eq!(loaded.timestamp_format, TimestampFormat::TimesColumn);
        assert_eq!(loaded.series.len(), 2);
        assert_eq!(loaded.series.sza(), &[30.0, 30.1]);
        assert!(loaded.series.longitude().is_none());
    }

    #[test]
    fn read_calendar_columns_file() {
        let csv = "Year,Month,Day,Hour,Minute,Second,sza,eth,ghi,ghics,ghicda\n\
                   2019,6,1,10,0,0,30.0,1300.0,800.0,850.0,900.0\n\
                   2019,6,1,10,1,0,30.1,1300.0,805.0,851.0,901.0\n";
        let f = write_csv(csv);
        let loaded = SeriesReader::new(f.path()).read().unwrap();
        assert_eq!(loaded.timestamp_format, TimestampFormat::CalendarColumns);
        assert_eq!(
            loaded.series.times()[0],
            Utc.with_ymd_and_hms(2019, 6, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn t_separator_accepted() {
        let csv = "times,sza,eth,ghi,ghics,ghicda\n\
                   2019-06-01T10:00:00,30.0,1300.0,800.0,850.0,900.0\n";
        let f = write_csv(csv);
        let loaded = SeriesReader::new(f.path()).read().unwrap();
        assert_eq!(
            loaded.series.times()[0],
            Utc.with_ymd_and_hms(2019, 6, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn rows_are_sorted_by_timestamp() {
        let csv = "times,sza,eth,ghi,ghics,ghicda\n\
                   2019-06-01 10:01:00,31.0,1300.0,805.0,851.0,901.0\n\
                   2019-06-01 10:00:00,30.0,1300.0,800.0,850.0,900.0\n";
        let f = write_csv(csv);
        let loaded = SeriesReader::new(f.path()).read().unwrap();
        assert_eq!(loaded.series.sza(), &[30.0, 31.0]);
    }

    #[test]
    fn longitude_and_dif_columns_are_picked_up() {
        let csv = "times,longitude,sza,eth,ghi,ghics,ghicda,dif\n\
                   2019-06-01 10:00:00,2.35,30.0,1300.0,800.0,850.0,900.0,120.0\n";
        let f = write_csv(csv);
        let loaded = SeriesReader::new(f.path()).read().unwrap();
        assert_eq!(loaded.series.longitude(), Some(&[2.35][..]));
        assert_eq!(loaded.series.dif(), Some(&[120.0][..]));
    }

    #[test]
    fn empty_and_nan_cells_become_nan() {
        let csv = "times,sza,eth,ghi,ghics,ghicda\n\
                   2019-06-01 10:00:00,30.0,1300.0,,850.0,900.0\n\
                   2019-06-01 10:01:00,30.1,1300.0,NaN,851.0,901.0\n";
        let f = write_csv(csv);
        let loaded = SeriesReader::new(f.path()).read().unwrap();
        assert!(loaded.series.ghi()[0].is_nan());
        assert!(loaded.series.ghi()[1].is_nan());
    }

    #[test]
    fn error_missing_columns_all_named() {
        let csv = "times,sza,ghi\n2019-06-01 10:00:00,30.0,800.0\n";
        let f = write_csv(csv);
        match SeriesReader::new(f.path()).read() {
            Err(IoError::MissingColumns { columns }) => {
                assert_eq!(columns, vec!["eth", "ghics", "ghicda"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn error_no_timestamp_columns() {
        let csv = "sza,eth,ghi,ghics,ghicda\n30.0,1300.0,800.0,850.0,900.0\n";
        let f = write_csv(csv);
        assert!(matches!(
            SeriesReader::new(f.path()).read(),
            Err(IoError::NoTimestampColumns)
        ));
    }

    #[test]
    fn error_invalid_timestamp() {
        let csv = "times,sza,eth,ghi,ghics,ghicda\nnot-a-time,30.0,1300.0,800.0,850.0,900.0\n";
        let f = write_csv(csv);
        assert!(matches!(
            SeriesReader::new(f.path()).read(),
            Err(IoError::InvalidTimestamp { row_index: 0, .. })
        ));
    }

    #[test]
    fn error_invalid_value() {
        let csv = "times,sza,eth,ghi,ghics,ghicda\n\
                   2019-06-01 10:00:00,30.0,1300.0,abc,850.0,900.0\n";
        let f = write_csv(csv);
        match SeriesReader::new(f.path()).read() {
            Err(IoError::InvalidValue { column, raw, .. }) => {
                assert_eq!(column, "ghi");
                assert_eq!(raw, "abc");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn error_empty_dataset() {
        let csv = "times,sza,eth,ghi,ghics,ghicda\n";
        let f = write_csv(csv);
        assert!(matches!(
            SeriesReader::new(f.path()).read(),
            Err(IoError::EmptyDataset { .. })
        ));
    }

    #[test]
    fn error_file_not_found() {
        let result = SeriesReader::new(Path::new("/nonexistent/file.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_duplicate_timestamps() {
        let csv = "times,sza,eth,ghi,ghics,ghicda\n\
                   2019-06-01 10:00:00,30.0,1300.0,800.0,850.0,900.0\n\
                   2019-06-01 10:00:00,30.1,1300.0,805.0,851.0,901.0\n";
        let f = write_csv(csv);
        assert!(matches!(
            SeriesReader::new(f.path()).read(),
            Err(IoError::InvalidSeries(_))
        ));
    }
}

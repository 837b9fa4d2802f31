//! Domain types for nimbus-io.

use nimbus_sky::IrradianceSeries;

/// How row timestamps were represented in the input table.
///
/// The writer reproduces the same representation so that output files stay
/// drop-in compatible with the input layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    /// A single `times` column with `%Y-%m-%d %H:%M:%S` UTC timestamps.
    TimesColumn,
    /// Six calendar columns: `Year`, `Month`, `Day`, `Hour`, `Minute`, `Second`.
    CalendarColumns,
}

/// A parsed input table: the validated series plus its timestamp layout.
///
/// Produced by [`SeriesReader`](crate::SeriesReader). Rows are sorted by
/// timestamp during loading regardless of file order.
#[derive(Debug)]
pub struct LoadedSeries {
    /// The validated irradiance series.
    pub series: IrradianceSeries,
    /// Timestamp representation found in the input header.
    pub timestamp_format: TimestampFormat,
}

//! GHI mirroring: extrapolation of irradiance across sunrise and sunset.
//!
//! Centered rolling indices are biased near sunrise/sunset because one side
//! of the window has no daylight data. Mirroring populates nighttime samples
//! with synthetic values obtained by reflecting the daytime `ghi`-vs-cos(sza)
//! relation about the horizon, independently for the morning and afternoon
//! halves of each true-solar-time calendar day.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use nimbus_series::{
    cos_zenith, equation_of_time, fill_gaps, solar_time_offset_seconds, LinearInterp,
};
use tracing::debug;

use crate::error::SkyError;
use crate::series::IrradianceSeries;

/// Interior gaps of up to 4 h of 1-min samples are filled before mirroring.
const GAP_FILL_LIMIT: usize = 240;

/// Convert a UTC timestamp to true solar time at the given longitude.
fn true_solar_time(time: DateTime<Utc>, longitude: f64) -> DateTime<Utc> {
    let fractional_doy = f64::from(time.ordinal())
        + (f64::from(time.hour())
            + (f64::from(time.minute()) + f64::from(time.second()) / 60.0) / 60.0)
            / 24.0;
    let days_in_year = if is_leap_year(time.year()) { 366.0 } else { 365.0 };
    let eot = equation_of_time(fractional_doy, days_in_year);
    let offset = solar_time_offset_seconds(longitude, eot);
    if !offset.is_finite() {
        return time;
    }
    time + Duration::milliseconds((offset * 1000.0).round() as i64)
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Extend `ghi` across sunrise/sunset by horizon reflection.
///
/// Returns a series of the same length: daytime samples carry the (gap
/// filled) measured values, nighttime samples carry negative synthetic
/// values where the reflection is defined and NaN elsewhere. The output is
/// only ever used as input to the rolling indices — it is not a measurement.
///
/// # Errors
///
/// Returns [`SkyError::MissingFields`] when the series has no `longitude`.
pub fn ghi_mirroring(series: &IrradianceSeries) -> Result<Vec<f64>, SkyError> {
    let Some(longitude) = series.longitude() else {
        return Err(SkyError::MissingFields {
            fields: vec!["longitude".to_string()],
        });
    };

    let cosz: Vec<f64> = series.sza().iter().map(|&z| cos_zenith(z)).collect();
    let tst: Vec<DateTime<Utc>> = series
        .times()
        .iter()
        .zip(longitude)
        .map(|(&t, &lon)| true_solar_time(t, lon))
        .collect();
    let times_s: Vec<f64> = series.times().iter().map(|t| t.timestamp() as f64).collect();

    let mut out = series.ghi().to_vec();
    let n = series.len();
    let mut day_start = 0;
    while day_start < n {
        let date = tst[day_start].date_naive();
        let mut day_end = day_start + 1;
        while day_end < n && tst[day_end].date_naive() == date {
            day_end += 1;
        }

        let is_am: Vec<bool> = tst[day_start..day_end].iter().map(|t| t.hour() < 12).collect();
        let mirrored = mirror_day(
            &times_s[day_start..day_end],
            &out[day_start..day_end],
            &cosz[day_start..day_end],
            &is_am,
        )?;
        out[day_start..day_end].copy_from_slice(&mirrored);

        debug!(%date, n_samples = day_end - day_start, "day mirrored");
        day_start = day_end;
    }
    Ok(out)
}

/// Mirror one true-solar-time calendar day, both halves independently.
fn mirror_day(
    times_s: &[f64],
    ghi: &[f64],
    cosz: &[f64],
    is_am: &[bool],
) -> Result<Vec<f64>, SkyError> {
    let mut filled = fill_gaps(times_s, ghi, GAP_FILL_LIMIT)?;
    for (value, &c) in filled.iter_mut().zip(cosz) {
        if c <= 0.0 {
            *value = f64::NAN;
        }
    }

    for half_is_am in [true, false] {
        let support: Vec<(f64, f64)> = (0..filled.len())
            .filter(|&i| is_am[i] == half_is_am && cosz[i] > 0.0)
            .map(|i| (cosz[i], filled[i]))
            .collect();
        // Nothing to extrapolate from in this half.
        if support.is_empty() {
            continue;
        }

        let interp = LinearInterp::new(support);
        for i in 0..filled.len() {
            if is_am[i] == half_is_am && cosz[i] <= 0.0 {
                filled[i] = -interp.eval(-cosz[i]);
            }
        }
    }
    Ok(filled)
}

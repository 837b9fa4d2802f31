//! Equation of time and true-solar-time helpers.

use std::f64::consts::PI;

/// Equation of time in minutes for a fractional day of year.
///
/// Harmonic fit (four lowest Fourier terms) to the NREL SPA equation of
/// time. `fractional_doy` is the 1-based day of year plus the fraction of
/// the day elapsed; `days_in_year` is 365.0 or 366.0 for leap years.
#[must_use]
pub fn equation_of_time(fractional_doy: f64, days_in_year: f64) -> f64 {
    let angle = (2.0 * PI / days_in_year) * fractional_doy;
    0.009_865_71
        + 0.586_887_18 * angle.cos()
        - 7.345_381_33 * angle.sin()
        - 3.314_939_99 * (2.0 * angle).cos()
        - 9.353_665_41 * (2.0 * angle).sin()
        - 0.081_517_50 * (3.0 * angle).cos()
        - 0.308_924_09 * (3.0 * angle).sin()
        - 0.135_328_89 * (4.0 * angle).cos()
        - 0.173_362_20 * (4.0 * angle).sin()
}

/// Offset in seconds from UTC to true solar time at the given longitude.
///
/// 4 minutes of time per degree of longitude, plus the equation of time.
#[must_use]
pub fn solar_time_offset_seconds(longitude_deg: f64, eot_minutes: f64) -> f64 {
    (4.0 * longitude_deg + eot_minutes) * 60.0
}

/// Cosine of the solar zenith angle given the zenith angle in degrees.
#[must_use]
pub fn cos_zenith(sza_deg: f64) -> f64 {
    sza_deg.to_radians().cos()
}

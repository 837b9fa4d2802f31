//! Clearness and variability index computation.

use nimbus_series::{diff, rolling_mean, rolling_sum};

use crate::config::ClassifyConfig;
use crate::error::SkyError;
use crate::series::IrradianceSeries;

/// Zenith-angle cutoff above which `Kcs` is not meaningful.
const KCS_MAX_SZA: f64 = 87.0;

/// The four per-sample indices driving the threshold classifier.
///
/// All vectors run parallel to the input series. NaN marks samples where an
/// input was missing, a rolling window was incomplete, or the sample falls
/// outside the index's validity domain.
#[derive(Debug, Clone)]
pub struct Indices {
    /// Clear-sky index `ghi/ghics`, NaN for `sza >= 87`, clipped to >= 0.
    pub kcs: Vec<f64>,
    /// Mean clearness index: rolling-mean(ghi)/ghicda, daytime only, clipped to >= 0.
    pub km: Vec<f64>,
    /// Short-horizon variability index (window `dt`).
    pub kv: Vec<f64>,
    /// Long-horizon variability index (window `dt_f`).
    pub kvf: Vec<f64>,
}

/// Division that resolves degenerate denominators to NaN instead of inf.
pub(crate) fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// Clip to >= 0, preserving NaN. `f64::max` alone would turn NaN into 0.
fn clip_zero(value: f64) -> f64 {
    if value.is_nan() {
        f64::NAN
    } else {
        value.max(0.0)
    }
}

/// Compute the four indices for a series.
///
/// `ghi` is the irradiance input to the rolling indices — either the
/// measured series or its mirrored extension. `Kcs` always uses the
/// measured `ghi` from `series`.
///
/// # Errors
///
/// Returns [`SkyError::InvalidConfig`] (via [`ClassifyConfig::validate`])
/// for unusable window lengths.
pub fn compute_indices(
    series: &IrradianceSeries,
    ghi: &[f64],
    config: &ClassifyConfig,
) -> Result<Indices, SkyError> {
    config.validate()?;
    debug_assert_eq!(ghi.len(), series.len());

    let sza = series.sza();
    let dt = config.dt as usize;
    let dt_f = config.dt_f as usize;

    let kcs: Vec<f64> = series
        .ghi()
        .iter()
        .zip(series.ghics())
        .zip(sza)
        .map(|((&g, &gcs), &z)| {
            if z < KCS_MAX_SZA {
                clip_zero(safe_div(g, gcs))
            } else {
                f64::NAN
            }
        })
        .collect();

    let mean_ghi = rolling_mean(ghi, dt)?;

    let km: Vec<f64> = mean_ghi
        .iter()
        .zip(series.ghicda())
        .zip(sza)
        .map(|((&m, &gcda), &z)| {
            if z <= config.max_sza {
                clip_zero(safe_div(m, gcda))
            } else {
                f64::NAN
            }
        })
        .collect();

    // |d/dt (ghi - rolling-mean(ghi))|, summed over each window and
    // normalized by the window duration in seconds.
    let abs_delta: Vec<f64> = diff(
        &ghi.iter()
            .zip(&mean_ghi)
            .map(|(&g, &m)| g - m)
            .collect::<Vec<f64>>(),
    )
    .iter()
    .map(|d| d.abs())
    .collect();

    let kv: Vec<f64> = rolling_sum(&abs_delta, dt)?
        .into_iter()
        .map(|s| s / (config.dt as f64 * 60.0))
        .collect();

    let kvf: Vec<f64> = rolling_sum(&abs_delta, dt_f)?
        .into_iter()
        .map(|s| s / (config.dt_f as f64 * 60.0))
        .collect();

    Ok(Indices { kcs, km, kv, kvf })
}

//! Threshold classification of a 1-min irradiance series.

use tracing::info;

use crate::clean::{
    clean_cloudless_to_thin, clean_scatter_flanked_by_thin, clean_spurious_patches,
    clean_thin_to_scatter,
};
use crate::config::ClassifyConfig;
use crate::error::SkyError;
use crate::indices::{compute_indices, Indices};
use crate::mirror::ghi_mirroring;
use crate::series::IrradianceSeries;
use crate::skytype::SkyType;

/// Zenith-angle split between the two cloudless sub-rules.
const CLOUDLESS_SZA_SPLIT: f64 = 75.0;
/// `Kcs` band of the high-zenith cloudless sub-rule.
const CLOUDLESS_HIGH_SZA_MIN_KCS: f64 = 0.80;
const CLOUDLESS_HIGH_SZA_MAX_KCS: f64 = 1.20;
/// Zenith ceiling of the cloud-enhancement rule.
const CLOUDEN_MAX_SZA: f64 = 80.0;

/// Result of a classification run.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Final sky type per sample.
    pub sky_type: Vec<SkyType>,
    /// The indices the labels were derived from (the full-output table).
    pub indices: Indices,
    /// Rounds used by the spurious-patch fixed-point loop (0 when disabled).
    pub spurious_rounds: usize,
}

/// Classify every sample of a 1-min irradiance series into a sky type.
///
/// Computes the clearness/variability indices (optionally over the mirrored
/// `ghi`), applies the threshold rules in their fixed priority order, runs
/// the enabled cleaning passes, and forces `Unknown` outside daytime and
/// wherever measured `ghi` is missing. Labels are recomputed fully on every
/// call; no state is retained.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`SkyError::InvalidConfig`] | Unusable window lengths or `max_sza` |
/// | [`SkyError::MissingFields`] | Mirroring enabled but the series has no `longitude` |
/// | [`SkyError::MixedSegment`] | Internal segmentation defect (never expected) |
pub fn classify(
    series: &IrradianceSeries,
    config: &ClassifyConfig,
) -> Result<Classification, SkyError> {
    config.validate()?;
    info!(
        n_samples = series.len(),
        mirroring = config.enable_ghi_mirroring,
        "classifying series"
    );

    let ghi_extended = if config.enable_ghi_mirroring {
        ghi_mirroring(series)?
    } else {
        series.ghi().to_vec()
    };
    let indices = compute_indices(series, &ghi_extended, config)?;

    let n = series.len();
    let sza = series.sza();
    let (kcs, km, kv, kvf) = (&indices.kcs, &indices.km, &indices.kv, &indices.kvf);

    // Condition masks, all evaluated against the same index state.
    // Comparisons against NaN are false, so missing indices never classify.
    let daytime: Vec<bool> = sza.iter().map(|&z| z <= config.max_sza).collect();

    let clouden: Vec<bool> = (0..n)
        .map(|i| {
            daytime[i]
                && sza[i] < CLOUDEN_MAX_SZA
                && kcs[i] > config.clouden_min_kcs
                && kv[i] > config.clouden_min_kv
                && kvf[i] > config.clouden_min_kvf
        })
        .collect();

    let cloudless: Vec<bool> = (0..n)
        .map(|i| {
            let (min_kcs, max_kcs) = if sza[i] < CLOUDLESS_SZA_SPLIT {
                (config.cloudless_min_kcs, config.cloudless_max_kcs)
            } else {
                (CLOUDLESS_HIGH_SZA_MIN_KCS, CLOUDLESS_HIGH_SZA_MAX_KCS)
            };
            daytime[i]
                && km[i] > config.cloudless_min_km
                && kcs[i] > min_kcs
                && kcs[i] < max_kcs
                && kv[i] < config.cloudless_max_kv
        })
        .collect();

    let overcast: Vec<bool> = (0..n)
        .map(|i| {
            daytime[i] && km[i] < config.overcast_max_km && kv[i] < config.overcast_max_kv
        })
        .collect();

    let cloudy: Vec<bool> = (0..n)
        .map(|i| daytime[i] && !cloudless[i] && !overcast[i] && !clouden[i])
        .collect();

    let thinclouds: Vec<bool> = (0..n)
        .map(|i| {
            cloudy[i]
                && km[i] > config.thinclouds_min_km
                && kv[i] >= config.thinclouds_min_kv
                && kv[i] < config.thinclouds_max_kv
        })
        .collect();

    let thickclouds: Vec<bool> = (0..n)
        .map(|i| {
            cloudy[i]
                && km[i] < config.thickclouds_max_km
                && kv[i] >= config.thickclouds_min_kv
                && kv[i] < config.thickclouds_max_kv
        })
        .collect();

    let scatterclouds: Vec<bool> = (0..n)
        .map(|i| cloudy[i] && !thickclouds[i] && !thinclouds[i])
        .collect();

    // Fixed write order; later writes win where masks overlap. This order
    // is load-bearing — cloud enhancement has final priority.
    let mut sky_type = vec![SkyType::Unknown; n];
    for (mask, label) in [
        (&overcast, SkyType::Overcast),
        (&thickclouds, SkyType::ThickClouds),
        (&scatterclouds, SkyType::ScatterClouds),
        (&thinclouds, SkyType::ThinClouds),
        (&cloudless, SkyType::Cloudless),
        (&clouden, SkyType::CloudEnhancement),
    ] {
        for i in 0..n {
            if mask[i] {
                sky_type[i] = label;
            }
        }
    }

    // Cleaning passes, each consuming the previous one's output.
    let mut spurious_rounds = 0;
    if config.clean_spurious_patches {
        let (cleaned, rounds) =
            clean_spurious_patches(&sky_type, config.min_sky_patch_len, config.max_clean_iter)?;
        sky_type = cleaned;
        spurious_rounds = rounds;
    }
    if config.clean_scatter_flanked_by_thin {
        sky_type = clean_scatter_flanked_by_thin(&sky_type, config.dt as usize, sza, km, kv)?;
    }
    if config.clean_cloudless_to_thin {
        sky_type = clean_cloudless_to_thin(&sky_type, kv)?;
    }
    if config.clean_thin_to_scatter {
        sky_type = clean_thin_to_scatter(&sky_type, kv)?;
    }

    // Unknown wherever classification is not possible, regardless of the above.
    for i in 0..n {
        if !daytime[i] || series.ghi()[i].is_nan() {
            sky_type[i] = SkyType::Unknown;
        }
    }

    info!(spurious_rounds, "classification complete");
    Ok(Classification {
        sky_type,
        indices,
        spurious_rounds,
    })
}

//! Label-cleaning passes operating on contiguous same-label patches.
//!
//! Each pass re-derives the segmentation from the label sequence it is
//! given and returns a new sequence; passes are chained in a fixed order by
//! [`classify`](crate::classify). Within a pass, every qualifying patch is
//! evaluated against the same input state and all rewrites land together —
//! there is no sample-by-sample feedback inside a round.

use nimbus_series::{rolling_max, rolling_mean};
use tracing::{debug, info};

use crate::error::SkyError;
use crate::segment::{reduce, reconstruct, segment};
use crate::skytype::SkyType;

/// Zenith ceiling of the "should remain scattered" predicate.
const SCATTER_KEEP_MAX_SZA: f64 = 70.0;
/// `Km` floor of the "should remain scattered" predicate.
const SCATTER_KEEP_MIN_KM: f64 = 0.7;
/// `Kv` floor of the "should remain scattered" predicate.
const SCATTER_KEEP_MIN_KV: f64 = 0.1;
/// Floor on `rolling-mean(Kv)/rolling-max(Kv)` of the predicate.
const SCATTER_KEEP_MIN_A: f64 = 0.9;

/// Remove spurious patches: short runs embedded between two long runs of
/// one sky type.
///
/// A patch is spurious when its length is below `min_len` and at least one
/// neighbor is at least `min_len` long. Two rewrite rules fire per round:
///
/// 1. a spurious non-cloud-enhancement patch flanked by equal
///    `ScatterClouds` or `ThickClouds` neighbors takes the neighbor type;
/// 2. a spurious `ThinClouds` or `Cloudless` patch flanked by equal
///    `ThinClouds`/`Cloudless` neighbors takes the neighbor type.
///
/// All qualifying patches rewrite simultaneously each round; the loop stops
/// when a round changes nothing or after `max_iter` rounds. Returns the
/// cleaned sequence and the number of rounds that changed something —
/// hitting the cap is not an error, merely a bounded best effort.
///
/// # Errors
///
/// Returns [`SkyError::MixedSegment`] only on an internal segmentation
/// defect.
pub fn clean_spurious_patches(
    labels: &[SkyType],
    min_len: usize,
    max_iter: usize,
) -> Result<(Vec<SkyType>, usize), SkyError> {
    info!("clean spurious sky patches");

    let mut current = labels.to_vec();
    let mut rounds = 0;

    while rounds < max_iter {
        let seg = segment(&current);
        let patches = reduce(&seg)?;

        let mut polished: Vec<SkyType> = patches.iter().map(|p| p.sky_type).collect();
        for patch in &patches {
            if patch.sky_type == SkyType::Unknown {
                continue;
            }
            let spurious = patch.len < min_len
                && (patch.prev.is_some_and(|(_, len)| len >= min_len)
                    || patch.next.is_some_and(|(_, len)| len >= min_len));
            if !spurious {
                continue;
            }
            let (Some((prev_type, _)), Some((next_type, _))) = (patch.prev, patch.next) else {
                continue;
            };
            if prev_type != next_type {
                continue;
            }

            let flanked_by_broken = matches!(
                prev_type,
                SkyType::ScatterClouds | SkyType::ThickClouds
            );
            let thin_cloudless_swap = matches!(
                patch.sky_type,
                SkyType::ThinClouds | SkyType::Cloudless
            ) && matches!(prev_type, SkyType::ThinClouds | SkyType::Cloudless);

            if (flanked_by_broken && patch.sky_type != SkyType::CloudEnhancement)
                || thin_cloudless_swap
            {
                polished[patch.id] = prev_type;
            }
        }

        let next = reconstruct(seg.ids(), &polished);
        let changed = next
            .iter()
            .zip(&current)
            .filter(|(a, b)| a != b)
            .count();
        current = next;

        if changed == 0 {
            break;
        }
        rounds += 1;
        debug!(round = rounds, changed, "spurious patches rewritten");
    }

    let total_changed = current
        .iter()
        .zip(labels)
        .filter(|(a, b)| a != b)
        .count();
    info!(rounds, total_changed, "spurious patch removal done");
    Ok((current, rounds))
}

/// Reconcile scatter-clouds patches flanked by thin clouds.
///
/// A `ScatterClouds` patch of length strictly between 25 and 35 samples,
/// flanked on both sides by `ThinClouds`, is relabeled to `ThinClouds` —
/// except the samples that individually satisfy the "should remain
/// scattered" predicate (low zenith angle, high `Km`, `Kv` above a floor,
/// and `rolling-mean(Kv)/rolling-max(Kv)` above a floor), which keep
/// `ScatterClouds`.
///
/// # Errors
///
/// Returns [`SkyError::Series`] for an unusable `dt_window`, or
/// [`SkyError::MixedSegment`] on an internal segmentation defect.
pub fn clean_scatter_flanked_by_thin(
    labels: &[SkyType],
    dt_window: usize,
    sza: &[f64],
    km: &[f64],
    kv: &[f64],
) -> Result<Vec<SkyType>, SkyError> {
    info!("clean scatter_clouds flanked by thin_clouds");

    let seg = segment(labels);
    let patches = reduce(&seg)?;

    let kv_mean = rolling_mean(kv, dt_window)?;
    let kv_max = rolling_max(kv, dt_window)?;

    let keep_scattered: Vec<bool> = (0..labels.len())
        .map(|i| {
            let a = kv_mean[i] / kv_max[i];
            sza[i] < SCATTER_KEEP_MAX_SZA
                && km[i] > SCATTER_KEEP_MIN_KM
                && kv[i] > SCATTER_KEEP_MIN_KV
                && a > SCATTER_KEEP_MIN_A
        })
        .collect();

    let mut out = labels.to_vec();
    let mut n_patches = 0;
    for patch in &patches {
        let flanked = patch.prev.map(|(t, _)| t) == Some(SkyType::ThinClouds)
            && patch.next.map(|(t, _)| t) == Some(SkyType::ThinClouds);
        if patch.sky_type != SkyType::ScatterClouds
            || !(patch.len > 25 && patch.len < 35)
            || !flanked
        {
            continue;
        }
        n_patches += 1;
        for i in patch.range() {
            out[i] = if keep_scattered[i] {
                SkyType::ScatterClouds
            } else {
                SkyType::ThinClouds
            };
        }
    }

    info!(n_patches, "sky patches updated");
    Ok(out)
}

/// Downgrade cloudless patches that are likely thin clouds.
///
/// A `Cloudless` patch flanked on both sides by `ThinClouds`, shorter than
/// 20 samples, with flanking lengths summing to more than half its own
/// length, is relabeled to `ThinClouds` when the 25th percentile of `Kv`
/// over its samples is at least 0.01.
///
/// # Errors
///
/// Returns [`SkyError::MixedSegment`] on an internal segmentation defect.
pub fn clean_cloudless_to_thin(labels: &[SkyType], kv: &[f64]) -> Result<Vec<SkyType>, SkyError> {
    info!("reviewing cloudless => thin_clouds transitions");

    let seg = segment(labels);
    let patches = reduce(&seg)?;

    let mut out = labels.to_vec();
    let mut n_updates = 0;
    for patch in &patches {
        let (Some((prev_type, prev_len)), Some((next_type, next_len))) = (patch.prev, patch.next)
        else {
            continue;
        };
        let candidate = patch.sky_type == SkyType::Cloudless
            && prev_type == SkyType::ThinClouds
            && next_type == SkyType::ThinClouds
            && patch.len < 20
            && (prev_len + next_len) as f64 > 0.5 * patch.len as f64;
        if !candidate {
            continue;
        }

        let q25 = quantile(&kv[patch.range()], 0.25);
        debug!(segment = patch.id, len = patch.len, q25, "cloudless candidate");
        if q25 >= 0.01 {
            for i in patch.range() {
                out[i] = SkyType::ThinClouds;
            }
            n_updates += 1;
        }
    }

    info!(n_updates, "segments updated");
    Ok(out)
}

/// Downgrade thin-clouds patches that are likely scattered clouds.
///
/// Symmetric to [`clean_cloudless_to_thin`]: a `ThinClouds` patch flanked
/// by `ScatterClouds`, longer than 20 samples, with flanking lengths
/// summing to more than half its own length, is relabeled to
/// `ScatterClouds` when the 75th percentile of `Kv` over its samples is at
/// least 0.04.
///
/// # Errors
///
/// Returns [`SkyError::MixedSegment`] on an internal segmentation defect.
pub fn clean_thin_to_scatter(labels: &[SkyType], kv: &[f64]) -> Result<Vec<SkyType>, SkyError> {
    info!("reviewing thin_clouds => scatter_clouds transitions");

    let seg = segment(labels);
    let patches = reduce(&seg)?;

    let mut out = labels.to_vec();
    let mut n_updates = 0;
    for patch in &patches {
        let (Some((prev_type, prev_len)), Some((next_type, next_len))) = (patch.prev, patch.next)
        else {
            continue;
        };
        let candidate = patch.sky_type == SkyType::ThinClouds
            && prev_type == SkyType::ScatterClouds
            && next_type == SkyType::ScatterClouds
            && patch.len > 20
            && (prev_len + next_len) as f64 > 0.5 * patch.len as f64;
        if !candidate {
            continue;
        }

        let q75 = quantile(&kv[patch.range()], 0.75);
        debug!(segment = patch.id, len = patch.len, q75, "thin_clouds candidate");
        if q75 >= 0.04 {
            for i in patch.range() {
                out[i] = SkyType::ScatterClouds;
            }
            n_updates += 1;
        }
    }

    info!(n_updates, "segments updated");
    Ok(out)
}

/// Quantile of the finite values with linear interpolation between order
/// statistics. NaN when no finite value is present.
fn quantile(values: &[f64], q: f64) -> f64 {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    finite.sort_by(f64::total_cmp);

    let position = q * (finite.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        finite[lower]
    } else {
        let weight = position - lower as f64;
        finite[lower] * (1.0 - weight) + finite[upper] * weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skytype::SkyType::{
        CloudEnhancement, Cloudless, ScatterClouds, ThickClouds, ThinClouds, Unknown,
    };

    fn run(parts: &[(SkyType, usize)]) -> Vec<SkyType> {
        parts
            .iter()
            .flat_map(|&(sky_type, len)| std::iter::repeat(sky_type).take(len))
            .collect()
    }

    // --- spurious patch removal ---

    #[test]
    fn short_thick_run_between_scatter_is_absorbed() {
        let labels = run(&[(ScatterClouds, 20), (ThickClouds, 5), (ScatterClouds, 20)]);
        let (cleaned, rounds) = clean_spurious_patches(&labels, 15, 50).unwrap();
        assert!(cleaned.iter().all(|&t| t == ScatterClouds));
        assert_eq!(rounds, 1);
    }

    #[test]
    fn cloudless_thin_swap_rule() {
        let labels = run(&[(ThinClouds, 20), (Cloudless, 10), (ThinClouds, 20)]);
        let (cleaned, _) = clean_spurious_patches(&labels, 15, 50).unwrap();
        assert!(cleaned.iter().all(|&t| t == ThinClouds));

        let labels = run(&[(Cloudless, 20), (ThinClouds, 10), (Cloudless, 20)]);
        let (cleaned, _) = clean_spurious_patches(&labels, 15, 50).unwrap();
        assert!(cleaned.iter().all(|&t| t == Cloudless));
    }

    #[test]
    fn cloud_enhancement_is_never_absorbed() {
        let labels = run(&[(ScatterClouds, 20), (CloudEnhancement, 3), (ScatterClouds, 20)]);
        let (cleaned, rounds) = clean_spurious_patches(&labels, 15, 50).unwrap();
        assert_eq!(cleaned, labels);
        assert_eq!(rounds, 0);
    }

    #[test]
    fn unknown_patches_are_left_alone() {
        let labels = run(&[(ScatterClouds, 20), (Unknown, 5), (ScatterClouds, 20)]);
        let (cleaned, _) = clean_spurious_patches(&labels, 15, 50).unwrap();
        assert_eq!(cleaned, labels);
    }

    #[test]
    fn edge_patches_are_never_rewritten() {
        // first patch is short but has no previous neighbor
        let labels = run(&[(ThickClouds, 5), (ScatterClouds, 20)]);
        let (cleaned, _) = clean_spurious_patches(&labels, 15, 50).unwrap();
        assert_eq!(cleaned, labels);
    }

    #[test]
    fn unequal_flanks_are_not_absorbed() {
        let labels = run(&[(ScatterClouds, 20), (Cloudless, 5), (ThickClouds, 20)]);
        let (cleaned, _) = clean_spurious_patches(&labels, 15, 50).unwrap();
        assert_eq!(cleaned, labels);
    }

    #[test]
    fn both_neighbors_short_is_not_spurious() {
        let labels = run(&[(ScatterClouds, 5), (ThickClouds, 5), (ScatterClouds, 5)]);
        let (cleaned, _) = clean_spurious_patches(&labels, 15, 50).unwrap();
        assert_eq!(cleaned, labels);
    }

    #[test]
    fn all_rewrites_land_in_one_synchronized_round() {
        // Two independent spurious patches: both rewritten in the same round.
        let labels = run(&[
            (ScatterClouds, 16),
            (ThickClouds, 5),
            (ScatterClouds, 5),
            (ThickClouds, 5),
            (ScatterClouds, 16),
        ]);
        let (cleaned, rounds) = clean_spurious_patches(&labels, 15, 50).unwrap();
        // the thick runs are absorbed; the middle short scatter run has only
        // short neighbors at evaluation time and survives untouched
        let expected = run(&[(ScatterClouds, 47)]);
        assert_eq!(cleaned, expected);
        assert_eq!(rounds, 1);
    }

    #[test]
    fn spurious_removal_is_idempotent() {
        let labels = run(&[
            (ThinClouds, 20),
            (Cloudless, 4),
            (ThinClouds, 3),
            (ScatterClouds, 30),
            (ThickClouds, 8),
            (ScatterClouds, 12),
        ]);
        let (once, _) = clean_spurious_patches(&labels, 15, 50).unwrap();
        let (twice, rounds) = clean_spurious_patches(&once, 15, 50).unwrap();
        assert_eq!(once, twice);
        assert_eq!(rounds, 0);
    }

    #[test]
    fn round_cap_bounds_the_loop() {
        let labels = run(&[(ScatterClouds, 20), (ThickClouds, 5), (ScatterClouds, 20)]);
        let (cleaned, rounds) = clean_spurious_patches(&labels, 15, 0).unwrap();
        assert_eq!(cleaned, labels);
        assert_eq!(rounds, 0);
    }

    // --- scatter flanked by thin ---

    #[test]
    fn scatter_run_flanked_by_thin_becomes_thin() {
        let labels = run(&[(ThinClouds, 20), (ScatterClouds, 30), (ThinClouds, 20)]);
        let n = labels.len();
        // predicate false everywhere: kv = 0
        let cleaned = clean_scatter_flanked_by_thin(
            &labels,
            3,
            &vec![30.0; n],
            &vec![1.0; n],
            &vec![0.0; n],
        )
        .unwrap();
        assert!(cleaned.iter().all(|&t| t == ThinClouds));
    }

    #[test]
    fn samples_matching_the_keep_predicate_stay_scattered() {
        let labels = run(&[(ThinClouds, 20), (ScatterClouds, 30), (ThinClouds, 20)]);
        let n = labels.len();
        // constant kv = 0.2: A = 1, kv > 0.1, with km and sza in range the
        // predicate holds on every complete window
        let cleaned = clean_scatter_flanked_by_thin(
            &labels,
            3,
            &vec![30.0; n],
            &vec![0.8; n],
            &vec![0.2; n],
        )
        .unwrap();
        assert_eq!(cleaned, labels);
    }

    #[test]
    fn scatter_length_bounds_are_strict() {
        for len in [25, 35] {
            let labels = run(&[(ThinClouds, 20), (ScatterClouds, len), (ThinClouds, 20)]);
            let n = labels.len();
            let cleaned = clean_scatter_flanked_by_thin(
                &labels,
                3,
                &vec![30.0; n],
                &vec![1.0; n],
                &vec![0.0; n],
            )
            .unwrap();
            assert_eq!(cleaned, labels, "len = {len} must not be rewritten");
        }
    }

    // --- cloudless => thin downgrade ---

    #[test]
    fn cloudless_downgrade_reference_scenario() {
        // length 10 flanked by 8 and 9 (sum 17 > 5), q25(Kv) = 0.02 >= 0.01
        let labels = run(&[(ThinClouds, 8), (Cloudless, 10), (ThinClouds, 9)]);
        let kv = vec![0.02; labels.len()];
        let cleaned = clean_cloudless_to_thin(&labels, &kv).unwrap();
        assert!(cleaned.iter().all(|&t| t == ThinClouds));
    }

    #[test]
    fn quiet_cloudless_patch_is_kept() {
        let labels = run(&[(ThinClouds, 8), (Cloudless, 10), (ThinClouds, 9)]);
        let kv = vec![0.001; labels.len()];
        let cleaned = clean_cloudless_to_thin(&labels, &kv).unwrap();
        assert_eq!(cleaned, labels);
    }

    #[test]
    fn long_cloudless_patch_is_kept() {
        let labels = run(&[(ThinClouds, 15), (Cloudless, 25), (ThinClouds, 15)]);
        let kv = vec![0.02; labels.len()];
        let cleaned = clean_cloudless_to_thin(&labels, &kv).unwrap();
        assert_eq!(cleaned, labels);
    }

    #[test]
    fn all_nan_kv_never_qualifies() {
        let labels = run(&[(ThinClouds, 8), (Cloudless, 10), (ThinClouds, 9)]);
        let kv = vec![f64::NAN; labels.len()];
        let cleaned = clean_cloudless_to_thin(&labels, &kv).unwrap();
        assert_eq!(cleaned, labels);
    }

    // --- thin => scatter downgrade ---

    #[test]
    fn busy_thin_patch_becomes_scatter() {
        let labels = run(&[(ScatterClouds, 15), (ThinClouds, 25), (ScatterClouds, 15)]);
        let kv = vec![0.05; labels.len()];
        let cleaned = clean_thin_to_scatter(&labels, &kv).unwrap();
        assert!(cleaned.iter().all(|&t| t == ScatterClouds));
    }

    #[test]
    fn calm_thin_patch_is_kept() {
        let labels = run(&[(ScatterClouds, 15), (ThinClouds, 25), (ScatterClouds, 15)]);
        let kv = vec![0.01; labels.len()];
        let cleaned = clean_thin_to_scatter(&labels, &kv).unwrap();
        assert_eq!(cleaned, labels);
    }

    #[test]
    fn short_thin_patch_is_not_downgraded() {
        // length 20 is not strictly greater than 20
        let labels = run(&[(ScatterClouds, 15), (ThinClouds, 20), (ScatterClouds, 15)]);
        let kv = vec![0.05; labels.len()];
        let cleaned = clean_thin_to_scatter(&labels, &kv).unwrap();
        assert_eq!(cleaned, labels);
    }

    // --- quantile helper ---

    #[test]
    fn quantile_interpolates_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&values, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile(&values, 0.75) - 3.25).abs() < 1e-12);
        assert_eq!(quantile(&values, 0.0), 1.0);
        assert_eq!(quantile(&values, 1.0), 4.0);
    }

    #[test]
    fn quantile_skips_nan() {
        let values = [f64::NAN, 2.0, f64::NAN, 4.0];
        assert!((quantile(&values, 0.5) - 3.0).abs() < 1e-12);
        assert!(quantile(&[f64::NAN], 0.5).is_nan());
    }
}

//! Classification configuration: windows, thresholds, and cleaning flags.

use serde::Deserialize;

use crate::error::SkyError;

/// Immutable configuration for a classification run.
///
/// An explicit value of this type is passed into every call — there is no
/// process-wide threshold state. All fields can be overridden from a JSON
/// document via `serde` (absent keys keep their defaults).
///
/// # Defaults
///
/// | Parameter | Default |
/// |---|---|
/// | `max_sza` | 85.0 deg |
/// | `dt` | 30 min |
/// | `dt_f` | 60 min |
/// | `clouden_min_kcs` / `_kv` / `_kvf` | 1.05 / 0.08 / 0.05 |
/// | `cloudless_min_km` | 0.85 |
/// | `cloudless_min_kcs` / `cloudless_max_kcs` | 0.95 / 1.05 |
/// | `cloudless_max_kv` | 0.01 |
/// | `overcast_max_km` / `overcast_max_kv` | 0.60 / 0.01 |
/// | `thinclouds_min_km` | 0.70 |
/// | `thinclouds_min_kv` / `thinclouds_max_kv` | 0.01 / 0.07 |
/// | `thickclouds_max_km` | 0.50 |
/// | `thickclouds_min_kv` / `thickclouds_max_kv` | 0.005 / 0.05 |
/// | `enable_ghi_mirroring` | true |
/// | cleaning passes | all enabled |
/// | `min_sky_patch_len` | 15 samples |
/// | `max_clean_iter` | 50 rounds |
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifyConfig {
    /// Daytime cutoff: samples with `sza` above this are never classified.
    pub max_sza: f64,
    /// Short rolling-window length in minutes (1 sample per minute).
    pub dt: u32,
    /// Long rolling-window length in minutes, for `Kvf`.
    pub dt_f: u32,

    /// Cloud enhancement: `Kcs` floor.
    pub clouden_min_kcs: f64,
    /// Cloud enhancement: `Kv` floor.
    pub clouden_min_kv: f64,
    /// Cloud enhancement: `Kvf` floor.
    pub clouden_min_kvf: f64,

    /// Cloudless: `Km` floor (both zenith-angle sub-rules).
    pub cloudless_min_km: f64,
    /// Cloudless, low zenith angles: `Kcs` floor.
    pub cloudless_min_kcs: f64,
    /// Cloudless, low zenith angles: `Kcs` ceiling.
    pub cloudless_max_kcs: f64,
    /// Cloudless: `Kv` ceiling (both sub-rules).
    pub cloudless_max_kv: f64,

    /// Overcast: `Km` ceiling.
    pub overcast_max_km: f64,
    /// Overcast: `Kv` ceiling.
    pub overcast_max_kv: f64,

    /// Thin clouds: `Km` floor.
    pub thinclouds_min_km: f64,
    /// Thin clouds: `Kv` band floor (inclusive).
    pub thinclouds_min_kv: f64,
    /// Thin clouds: `Kv` band ceiling (exclusive).
    pub thinclouds_max_kv: f64,

    /// Thick clouds: `Km` ceiling.
    pub thickclouds_max_km: f64,
    /// Thick clouds: `Kv` band floor (inclusive).
    pub thickclouds_min_kv: f64,
    /// Thick clouds: `Kv` band ceiling (exclusive).
    pub thickclouds_max_kv: f64,

    /// Extrapolate `ghi` across sunrise/sunset before computing rolling indices.
    pub enable_ghi_mirroring: bool,

    /// Enable the spurious-patch removal pass.
    pub clean_spurious_patches: bool,
    /// Enable the scatter-clouds-flanked-by-thin-clouds reconciliation pass.
    pub clean_scatter_flanked_by_thin: bool,
    /// Enable the cloudless-to-thin-clouds downgrade pass.
    pub clean_cloudless_to_thin: bool,
    /// Enable the thin-clouds-to-scatter-clouds downgrade pass.
    pub clean_thin_to_scatter: bool,

    /// Patches shorter than this are candidates for spurious removal.
    pub min_sky_patch_len: usize,
    /// Round cap for the spurious-removal fixed-point loop.
    pub max_clean_iter: usize,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            max_sza: 85.0,
            dt: 30,
            dt_f: 60,
            clouden_min_kcs: 1.05,
            clouden_min_kv: 0.08,
            clouden_min_kvf: 0.05,
            cloudless_min_km: 0.85,
            cloudless_min_kcs: 0.95,
            cloudless_max_kcs: 1.05,
            cloudless_max_kv: 0.01,
            overcast_max_km: 0.60,
            overcast_max_kv: 0.01,
            thinclouds_min_km: 0.70,
            thinclouds_min_kv: 0.01,
            thinclouds_max_kv: 0.07,
            thickclouds_max_km: 0.50,
            thickclouds_min_kv: 0.005,
            thickclouds_max_kv: 0.05,
            enable_ghi_mirroring: true,
            clean_spurious_patches: true,
            clean_scatter_flanked_by_thin: true,
            clean_cloudless_to_thin: true,
            clean_thin_to_scatter: true,
            min_sky_patch_len: 15,
            max_clean_iter: 50,
        }
    }
}

impl ClassifyConfig {
    /// Enable or disable GHI mirroring.
    #[must_use]
    pub fn with_ghi_mirroring(mut self, enabled: bool) -> Self {
        self.enable_ghi_mirroring = enabled;
        self
    }

    /// Set the short and long rolling-window lengths in minutes.
    #[must_use]
    pub fn with_windows(mut self, dt: u32, dt_f: u32) -> Self {
        self.dt = dt;
        self.dt_f = dt_f;
        self
    }

    /// Enable or disable all four cleaning passes at once.
    #[must_use]
    pub fn with_cleaning(mut self, enabled: bool) -> Self {
        self.clean_spurious_patches = enabled;
        self.clean_scatter_flanked_by_thin = enabled;
        self.clean_cloudless_to_thin = enabled;
        self.clean_thin_to_scatter = enabled;
        self
    }

    /// Check that window lengths and cutoffs are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SkyError::InvalidConfig`] when `dt` or `dt_f` is zero, or
    /// when `max_sza` is outside `(0, 90]`.
    pub fn validate(&self) -> Result<(), SkyError> {
        if self.dt == 0 {
            return Err(SkyError::InvalidConfig {
                reason: "dt must be at least 1 minute".into(),
            });
        }
        if self.dt_f == 0 {
            return Err(SkyError::InvalidConfig {
                reason: "dt_f must be at least 1 minute".into(),
            });
        }
        if !(self.max_sza > 0.0 && self.max_sza <= 90.0) {
            return Err(SkyError::InvalidConfig {
                reason: format!("max_sza must be in (0, 90], got {}", self.max_sza),
            });
        }
        Ok(())
    }
}

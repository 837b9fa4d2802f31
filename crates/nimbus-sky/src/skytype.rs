//! The sky-type label enumeration.

use std::fmt;

/// Discrete sky condition assigned to each timestamp.
///
/// The integer labels form a total order from `Unknown` (1) through
/// `CloudEnhancement` (7) and are stable across the on-disk format: output
/// tables store the raw integer, and [`SkyType::from_raw`] restores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SkyType {
    /// Classification not possible (night, missing data, out-of-range input).
    Unknown = 1,
    /// Fully overcast sky.
    Overcast = 2,
    /// Optically thick, broken cloud cover.
    ThickClouds = 3,
    /// Scattered clouds with strong irradiance variability.
    ScatterClouds = 4,
    /// Optically thin cloud cover.
    ThinClouds = 5,
    /// Cloud-free sky.
    Cloudless = 6,
    /// Irradiance enhanced above the clear-sky level by cloud edges.
    CloudEnhancement = 7,
}

impl SkyType {
    /// All members in label order.
    pub const ALL: [SkyType; 7] = [
        SkyType::Unknown,
        SkyType::Overcast,
        SkyType::ThickClouds,
        SkyType::ScatterClouds,
        SkyType::ThinClouds,
        SkyType::Cloudless,
        SkyType::CloudEnhancement,
    ];

    /// Decode a raw integer label. Any unrecognized value maps to `Unknown`.
    #[must_use]
    pub fn from_raw(value: i64) -> Self {
        match value {
            2 => SkyType::Overcast,
            3 => SkyType::ThickClouds,
            4 => SkyType::ScatterClouds,
            5 => SkyType::ThinClouds,
            6 => SkyType::Cloudless,
            7 => SkyType::CloudEnhancement,
            _ => SkyType::Unknown,
        }
    }

    /// Return the raw integer label.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Return the snake_case name of this sky type.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SkyType::Unknown => "unknown",
            SkyType::Overcast => "overcast",
            SkyType::ThickClouds => "thick_clouds",
            SkyType::ScatterClouds => "scatter_clouds",
            SkyType::ThinClouds => "thin_clouds",
            SkyType::Cloudless => "cloudless",
            SkyType::CloudEnhancement => "cloud_enhancement",
        }
    }
}

impl fmt::Display for SkyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Iterate over the sky types that carry an actual classification,
/// i.e. every member except [`SkyType::Unknown`].
pub fn known_sky_types() -> impl Iterator<Item = SkyType> {
    SkyType::ALL
        .into_iter()
        .filter(|t| *t != SkyType::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_labels_round_trip() {
        for sky_type in SkyType::ALL {
            assert_eq!(SkyType::from_raw(i64::from(sky_type.as_u8())), sky_type);
        }
    }

    #[test]
    fn out_of_range_decodes_to_unknown() {
        assert_eq!(SkyType::from_raw(0), SkyType::Unknown);
        assert_eq!(SkyType::from_raw(8), SkyType::Unknown);
        assert_eq!(SkyType::from_raw(-3), SkyType::Unknown);
        assert_eq!(SkyType::from_raw(255), SkyType::Unknown);
    }

    #[test]
    fn total_order_follows_labels() {
        assert!(SkyType::Unknown < SkyType::Overcast);
        assert!(SkyType::ThickClouds < SkyType::ScatterClouds);
        assert!(SkyType::Cloudless < SkyType::CloudEnhancement);
    }

    #[test]
    fn known_sky_types_skips_unknown() {
        let known: Vec<SkyType> = known_sky_types().collect();
        assert_eq!(known.len(), 6);
        assert!(!known.contains(&SkyType::Unknown));
        assert_eq!(known[0], SkyType::Overcast);
        assert_eq!(known[5], SkyType::CloudEnhancement);
    }

    #[test]
    fn display_uses_snake_case_name() {
        assert_eq!(SkyType::ScatterClouds.to_string(), "scatter_clouds");
    }
}

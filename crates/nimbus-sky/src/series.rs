//! The validated 1-min irradiance series domain type.

use chrono::{DateTime, Utc};

use crate::error::SkyError;

/// A validated 1-min irradiance series.
///
/// All field vectors run parallel to `times`, which is strictly increasing.
/// Irradiance values may be NaN (missing data is legal and propagates to
/// `Unknown` labels); lengths and ordering are enforced at construction.
/// Build via [`IrradianceSeries::builder`].
#[derive(Debug, Clone)]
pub struct IrradianceSeries {
    times: Vec<DateTime<Utc>>,
    sza: Vec<f64>,
    eth: Vec<f64>,
    ghi: Vec<f64>,
    ghics: Vec<f64>,
    ghicda: Vec<f64>,
    longitude: Option<Vec<f64>>,
    dif: Option<Vec<f64>>,
}

impl IrradianceSeries {
    /// Start building a series over the given timestamps.
    #[must_use]
    pub fn builder(times: Vec<DateTime<Utc>>) -> IrradianceSeriesBuilder {
        IrradianceSeriesBuilder {
            times,
            sza: None,
            eth: None,
            ghi: None,
            ghics: None,
            ghicda: None,
            longitude: None,
            dif: None,
        }
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Return true if the series has no samples.
    ///
    /// A series constructed through the builder is always non-empty, so this
    /// always returns `false` for valid instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// UTC timestamps, strictly increasing.
    #[must_use]
    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    /// Solar zenith angle in degrees.
    #[must_use]
    pub fn sza(&self) -> &[f64] {
        &self.sza
    }

    /// Extraterrestrial horizontal irradiance in W/m2.
    #[must_use]
    pub fn eth(&self) -> &[f64] {
        &self.eth
    }

    /// Measured global horizontal irradiance in W/m2.
    #[must_use]
    pub fn ghi(&self) -> &[f64] {
        &self.ghi
    }

    /// Clear-sky model GHI in W/m2.
    #[must_use]
    pub fn ghics(&self) -> &[f64] {
        &self.ghics
    }

    /// Clean-dry-atmosphere model GHI in W/m2.
    #[must_use]
    pub fn ghicda(&self) -> &[f64] {
        &self.ghicda
    }

    /// Site longitude in degrees east, if provided.
    #[must_use]
    pub fn longitude(&self) -> Option<&[f64]> {
        self.longitude.as_deref()
    }

    /// Diffuse horizontal irradiance in W/m2, if provided.
    #[must_use]
    pub fn dif(&self) -> Option<&[f64]> {
        self.dif.as_deref()
    }
}

/// Builder for [`IrradianceSeries`].
///
/// `build` collects every absent required field into a single
/// [`SkyError::MissingFields`], so the caller sees the full list at once.
#[derive(Debug)]
pub struct IrradianceSeriesBuilder {
    times: Vec<DateTime<Utc>>,
    sza: Option<Vec<f64>>,
    eth: Option<Vec<f64>>,
    ghi: Option<Vec<f64>>,
    ghics: Option<Vec<f64>>,
    ghicda: Option<Vec<f64>>,
    longitude: Option<Vec<f64>>,
    dif: Option<Vec<f64>>,
}

impl IrradianceSeriesBuilder {
    /// Set the solar zenith angle field (degrees).
    #[must_use]
    pub fn sza(mut self, values: Vec<f64>) -> Self {
        self.sza = Some(values);
        self
    }

    /// Set the extraterrestrial horizontal irradiance field (W/m2).
    #[must_use]
    pub fn eth(mut self, values: Vec<f64>) -> Self {
        self.eth = Some(values);
        self
    }

    /// Set the measured global horizontal irradiance field (W/m2).
    #[must_use]
    pub fn ghi(mut self, values: Vec<f64>) -> Self {
        self.ghi = Some(values);
        self
    }

    /// Set the clear-sky model GHI field (W/m2).
    #[must_use]
    pub fn ghics(mut self, values: Vec<f64>) -> Self {
        self.ghics = Some(values);
        self
    }

    /// Set the clean-dry-atmosphere model GHI field (W/m2).
    #[must_use]
    pub fn ghicda(mut self, values: Vec<f64>) -> Self {
        self.ghicda = Some(values);
        self
    }

    /// Set the per-sample site longitude field (degrees east).
    #[must_use]
    pub fn longitude(mut self, values: Vec<f64>) -> Self {
        self.longitude = Some(values);
        self
    }

    /// Set the diffuse horizontal irradiance field (W/m2).
    #[must_use]
    pub fn dif(mut self, values: Vec<f64>) -> Self {
        self.dif = Some(values);
        self
    }

    /// Validate and build the series.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SkyError::MissingFields`] | Any of `sza`, `eth`, `ghi`, `ghics`, `ghicda` was not set |
    /// | [`SkyError::EmptySeries`] | `times` is empty |
    /// | [`SkyError::UnsortedTimes`] | Timestamps are not strictly increasing |
    /// | [`SkyError::LengthMismatch`] | Any field's length differs from `times` |
    pub fn build(self) -> Result<IrradianceSeries, SkyError> {
        let mut missing = Vec::new();
        for (name, field) in [
            ("sza", &self.sza),
            ("eth", &self.eth),
            ("ghi", &self.ghi),
            ("ghics", &self.ghics),
            ("ghicda", &self.ghicda),
        ] {
            if field.is_none() {
                missing.push(name.to_string());
            }
        }
        if !missing.is_empty() {
            return Err(SkyError::MissingFields { fields: missing });
        }

        if self.times.is_empty() {
            return Err(SkyError::EmptySeries);
        }
        if let Some(index) = (1..self.times.len()).find(|&i| self.times[i] <= self.times[i - 1]) {
            return Err(SkyError::UnsortedTimes { index });
        }

        let expected = self.times.len();
        let check = |field: &'static str, values: &[f64]| -> Result<(), SkyError> {
            if values.len() != expected {
                return Err(SkyError::LengthMismatch {
                    field,
                    expected,
                    got: values.len(),
                });
            }
            Ok(())
        };

        let sza = self.sza.expect("checked above");
        let eth = self.eth.expect("checked above");
        let ghi = self.ghi.expect("checked above");
        let ghics = self.ghics.expect("checked above");
        let ghicda = self.ghicda.expect("checked above");

        check("sza", &sza)?;
        check("eth", &eth)?;
        check("ghi", &ghi)?;
        check("ghics", &ghics)?;
        check("ghicda", &ghicda)?;
        if let Some(longitude) = &self.longitude {
            check("longitude", longitude)?;
        }
        if let Some(dif) = &self.dif {
            check("dif", dif)?;
        }

        Ok(IrradianceSeries {
            times: self.times,
            sza,
            eth,
            ghi,
            ghics,
            ghicda,
            longitude: self.longitude,
            dif: self.dif,
        })
    }
}

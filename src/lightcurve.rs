//! Observed light curves.
//!
//! A [`LightCurve`] holds one time series of flux measurements, for example one
//! wavelength channel of a spectroscopic transit observation, and fits a
//! [`TransitModel`] to it through a named [`Fitter`](crate::fitter::Fitter).

use crate::error::{LcFitError, Result};
use crate::fitter::{FitData, FitOptions, FitOutcome, FitterRegistry};
use crate::model::TransitModel;
use crate::parameters::ParameterSet;
use log::debug;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit of a light curve's time axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    #[default]
    Day,
    Hour,
    Minute,
    Second,
}

impl TimeUnit {
    /// Number of units in one day
    pub fn per_day(&self) -> f64 {
        match self {
            TimeUnit::Day => 1.0,
            TimeUnit::Hour => 24.0,
            TimeUnit::Minute => 1440.0,
            TimeUnit::Second => 86400.0,
        }
    }

    /// Convert a time axis in this unit to days
    pub fn to_days(&self, time: &Array1<f64>) -> Array1<f64> {
        time / self.per_day()
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Day => "day",
            TimeUnit::Hour => "hour",
            TimeUnit::Minute => "minute",
            TimeUnit::Second => "second",
        };
        f.write_str(name)
    }
}

impl FromStr for TimeUnit {
    type Err = LcFitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "day" | "days" | "d" => Ok(TimeUnit::Day),
            "hour" | "hours" | "h" | "hr" => Ok(TimeUnit::Hour),
            "minute" | "minutes" | "min" => Ok(TimeUnit::Minute),
            "second" | "seconds" | "s" | "sec" => Ok(TimeUnit::Second),
            other => Err(LcFitError::InvalidInput(format!("unknown time unit '{}'", other))),
        }
    }
}

/// A single observed time series
#[derive(Debug, Clone)]
pub struct LightCurve {
    time: Array1<f64>,
    flux: Array1<f64>,
    unc: Array1<f64>,
    units: TimeUnit,
    name: Option<String>,
    parameters: Option<ParameterSet>,
}

impl LightCurve {
    /// Create a light curve.
    ///
    /// `time` and `flux` must have the same length, and so must `unc` when
    /// given. Without uncertainties every entry of `unc` is NaN.
    ///
    /// # Examples
    ///
    /// ```
    /// use lcfit_rs::lightcurve::LightCurve;
    /// use ndarray::array;
    ///
    /// let lc = LightCurve::new(array![0.0, 1.0, 2.0], array![1.0, 0.98, 1.0], None).unwrap();
    /// assert_eq!(lc.unc().len(), 3);
    /// assert!(lc.unc().iter().all(|u| u.is_nan()));
    ///
    /// assert!(LightCurve::new(array![0.0, 1.0], array![1.0], None).is_err());
    /// ```
    pub fn new(time: Array1<f64>, flux: Array1<f64>, unc: Option<Array1<f64>>) -> Result<Self> {
        if time.len() != flux.len() {
            return Err(LcFitError::ShapeMismatch(format!(
                "time and flux axes must be the same length ({} != {})",
                time.len(),
                flux.len()
            )));
        }

        let unc = match unc {
            Some(unc) if unc.len() != time.len() => {
                return Err(LcFitError::ShapeMismatch(format!(
                    "time and unc axes must be the same length ({} != {})",
                    time.len(),
                    unc.len()
                )));
            }
            Some(unc) => unc,
            None => Array1::from_elem(time.len(), f64::NAN),
        };

        Ok(Self {
            time,
            flux,
            unc,
            units: TimeUnit::default(),
            name: None,
            parameters: None,
        })
    }

    pub fn with_units(mut self, units: TimeUnit) -> Self {
        self.units = units;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Bind the orbital parameters used as the fit's starting point
    pub fn with_parameters(mut self, parameters: ParameterSet) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Swap the bound parameters, returning the previous ones
    pub fn set_parameters(&mut self, parameters: Option<ParameterSet>) -> Option<ParameterSet> {
        std::mem::replace(&mut self.parameters, parameters)
    }

    pub fn time(&self) -> &Array1<f64> {
        &self.time
    }

    pub fn flux(&self) -> &Array1<f64> {
        &self.flux
    }

    pub fn unc(&self) -> &Array1<f64> {
        &self.unc
    }

    pub fn units(&self) -> TimeUnit {
        self.units
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parameters(&self) -> Option<&ParameterSet> {
        self.parameters.as_ref()
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Whether every uncertainty is a finite, positive number
    pub fn has_uncertainties(&self) -> bool {
        !self.unc.is_empty() && self.unc.iter().all(|u| u.is_finite() && *u > 0.0)
    }

    /// Fit `model` to this light curve with one of the built-in fitters
    ///
    /// See [`fit_with`](Self::fit_with).
    pub fn fit(
        &self,
        model: &mut dyn TransitModel,
        fitter: &str,
        options: &FitOptions,
    ) -> Result<FitOutcome> {
        self.fit_with(&FitterRegistry::default(), model, fitter, options)
    }

    /// Fit `model` to this light curve with the fitter registered as `fitter`.
    ///
    /// The model is first interpolated onto this light curve's time axis; this
    /// mutates the model. The fitter's outcome is returned as is.
    pub fn fit_with(
        &self,
        registry: &FitterRegistry,
        model: &mut dyn TransitModel,
        fitter: &str,
        options: &FitOptions,
    ) -> Result<FitOutcome> {
        model.interpolate(&self.time, self.units)?;

        let fitter = registry.get(fitter)?;
        debug!(
            "fitting {} to light curve {} ({} points) with {}",
            model.name(),
            self.name().unwrap_or("<unnamed>"),
            self.len(),
            fitter.name()
        );

        let data = FitData {
            time: &self.time,
            flux: &self.flux,
            unc: &self.unc,
            units: self.units,
            initial: self.parameters.as_ref(),
            options,
        };
        fitter.fit(&data, model)
    }
}

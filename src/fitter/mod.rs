//! Fitters and the fitter registry.
//!
//! A [`Fitter`] takes the observed flux of a light curve and a
//! [`TransitModel`] and returns a [`FitOutcome`]. Fitters are looked up by name
//! in a [`FitterRegistry`]; the default registry holds the built-in
//! Levenberg-Marquardt fitter under the name `"lmfit"`.

#[cfg(feature = "lm")]
pub mod lmfit;

use crate::error::{LcFitError, Result};
use crate::lightcurve::TimeUnit;
use crate::model::TransitModel;
use crate::parameters::{ParamValue, ParameterSet};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "lm")]
pub use lmfit::LmFitter;

/// Name of the built-in fitter
pub const DEFAULT_FITTER: &str = "lmfit";

/// Options passed through to a fitter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Upper bound on solver iterations, overriding the fitter's own setting
    pub max_iterations: Option<usize>,

    /// Wall-clock limit for one fit, in seconds
    pub timeout_secs: Option<f64>,

    /// Fitter-specific settings
    pub extra: BTreeMap<String, ParamValue>,
}

impl FitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs_f64());
        self
    }

    pub fn with_extra(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// The timeout as a [`Duration`]; negative or non-finite values mean no limit
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
    }
}

/// Everything a fitter sees of one light curve
#[derive(Debug, Clone, Copy)]
pub struct FitData<'a> {
    pub time: &'a Array1<f64>,
    pub flux: &'a Array1<f64>,
    pub unc: &'a Array1<f64>,
    pub units: TimeUnit,
    /// Parameters bound to the light curve; `None` means start from the model's own
    pub initial: Option<&'a ParameterSet>,
    pub options: &'a FitOptions,
}

impl<'a> FitData<'a> {
    /// The parameters to start the fit from
    pub fn starting_parameters(&self, model: &dyn TransitModel) -> ParameterSet {
        self.initial
            .cloned()
            .unwrap_or_else(|| model.parameters().clone())
    }

    /// Inverse uncertainties, when every uncertainty is finite and positive
    pub fn weights(&self) -> Option<Array1<f64>> {
        let usable = !self.unc.is_empty() && self.unc.iter().all(|u| u.is_finite() && *u > 0.0);
        usable.then(|| self.unc.mapv(|u| 1.0 / u))
    }
}

/// Result of fitting one light curve
#[derive(Debug, Clone)]
pub struct FitOutcome {
    /// Name of the fitted model
    pub model_name: String,

    /// Name of the fitter that produced this outcome
    pub fitter: String,

    /// Best-fit parameters, fixed ones included
    pub best_fit: ParameterSet,

    /// Goodness-of-fit statistic (lower is better)
    pub chi2: f64,

    /// Whether the fitter considers the fit converged
    pub success: bool,

    /// A message describing the result
    pub message: String,

    /// Number of iterations performed
    pub iterations: usize,

    /// Number of model evaluations
    pub func_evals: usize,
}

impl fmt::Display for FitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fit Result ({} / {}):", self.model_name, self.fitter)?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  Chi2: {:.6e}", self.chi2)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        for param in self.best_fit.iter() {
            let status = if param.vary() { "free" } else { "fixed" };
            writeln!(f, "  {} = {} ({})", param.name(), param.value(), status)?;
        }
        Ok(())
    }
}

/// An optimizer that fits a model to one light curve
pub trait Fitter: Send + Sync {
    /// Name the fitter is registered under
    fn name(&self) -> &str;

    /// Fit `model` to `data`.
    ///
    /// The model has already been interpolated onto `data.time`.
    fn fit(&self, data: &FitData<'_>, model: &mut dyn TransitModel) -> Result<FitOutcome>;
}

/// Fitters by name
#[derive(Clone)]
pub struct FitterRegistry {
    fitters: HashMap<String, Arc<dyn Fitter>>,
}

impl FitterRegistry {
    /// A registry without any fitter
    pub fn empty() -> Self {
        Self {
            fitters: HashMap::new(),
        }
    }

    /// Register a fitter under its own name, returning any fitter it replaces
    pub fn register<F: Fitter + 'static>(&mut self, fitter: F) -> Option<Arc<dyn Fitter>> {
        self.fitters
            .insert(fitter.name().to_string(), Arc::new(fitter))
    }

    /// Look up a fitter, failing with [`LcFitError::UnsupportedFitter`]
    pub fn get(&self, name: &str) -> Result<Arc<dyn Fitter>> {
        self.fitters
            .get(name)
            .cloned()
            .ok_or_else(|| LcFitError::UnsupportedFitter {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fitters.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fitters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FitterRegistry {
    fn default() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::empty();
        #[cfg(feature = "lm")]
        registry.register(LmFitter::new());
        registry
    }
}

impl fmt::Debug for FitterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FitterRegistry")
            .field("fitters", &self.names())
            .finish()
    }
}

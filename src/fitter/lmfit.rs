//! The built-in Levenberg-Marquardt fitter.
//!
//! Free parameters are the numeric parameters with `vary == true`. Each one is
//! mapped through a [`BoundsTransform`] so that the solver works on an
//! unconstrained internal value while the model always sees values inside the
//! parameter's `[min, max]` range.

use crate::error::{LcFitError, Result};
use crate::fitter::{FitData, FitOutcome, Fitter, DEFAULT_FITTER};
use crate::lm::{LevenbergMarquardt, LmConfig};
use crate::model::TransitModel;
use crate::parameters::{BoundsTransform, HistoryRetention, ParamValue, ParameterSet};
use crate::problem::Problem;
use log::{debug, warn};
use ndarray::Array1;

/// Levenberg-Marquardt fitter registered as `"lmfit"`
///
/// Only numeric parameters are fitted. Varying parameters holding text,
/// booleans or sequences (a limb-darkening law name, a coefficient list) are
/// passed to the model unchanged and come back with their starting values.
#[derive(Debug, Clone, Default)]
pub struct LmFitter {
    config: LmConfig,
}

impl LmFitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }
}

impl Fitter for LmFitter {
    fn name(&self) -> &str {
        DEFAULT_FITTER
    }

    fn fit(&self, data: &FitData<'_>, model: &mut dyn TransitModel) -> Result<FitOutcome> {
        let start = data.starting_parameters(model);
        let problem = LightCurveProblem::new(&*model, &start, data.flux, data.weights())?;

        let mut config = self.config.clone();
        if let Some(max_iterations) = data.options.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(timeout) = data.options.timeout() {
            config.timeout = Some(timeout);
        }

        debug!(
            "lmfit: {} free of {} parameters, {} points",
            problem.free_names().len(),
            start.len(),
            data.flux.len()
        );
        if !problem.held_names().is_empty() {
            debug!(
                "lmfit: holding non-numeric varying parameters at their start values: {}",
                problem.held_names().join(", ")
            );
        }

        let initial = problem.initial_internal()?;
        let result = LevenbergMarquardt::with_config(config).minimize(&problem, initial)?;

        let mut best_fit = start;
        for (name, value) in problem.free_names().iter().zip(problem.to_external(&result.params)) {
            let param = best_fit.try_get(name)?.with_value(value)?;
            best_fit.add(param)?;
        }

        if !result.success {
            warn!("lmfit did not converge for {}: {}", model.name(), result.message);
        }

        Ok(FitOutcome {
            model_name: model.name().to_string(),
            fitter: self.name().to_string(),
            best_fit,
            chi2: result.cost,
            success: result.success,
            message: result.message,
            iterations: result.iterations,
            func_evals: result.func_evals,
        })
    }
}

/// Weighted residuals of a transit model against one light curve, as a
/// function of the internal values of the free parameters
struct LightCurveProblem<'a> {
    model: &'a dyn TransitModel,
    /// Starting parameters with history disabled, cloned for every evaluation
    template: ParameterSet,
    free: Vec<(String, BoundsTransform)>,
    names: Vec<String>,
    /// Varying parameters the solver cannot move
    held: Vec<String>,
    flux: &'a Array1<f64>,
    weights: Option<Array1<f64>>,
}

impl<'a> LightCurveProblem<'a> {
    fn new(
        model: &'a dyn TransitModel,
        start: &ParameterSet,
        flux: &'a Array1<f64>,
        weights: Option<Array1<f64>>,
    ) -> Result<Self> {
        let mut free = Vec::new();
        let mut held = Vec::new();
        for param in start.iter().filter(|p| p.vary()) {
            if !matches!(param.value(), ParamValue::Number(_)) {
                held.push(param.name().to_string());
                continue;
            }
            let bounds = param.numeric_bounds()?;
            free.push((param.name().to_string(), BoundsTransform::new(bounds)));
        }
        let names = free.iter().map(|(name, _)| name.clone()).collect();

        Ok(Self {
            model,
            template: start.clone().with_retention(HistoryRetention::KeepLast(0)),
            free,
            names,
            held,
            flux,
            weights,
        })
    }

    fn free_names(&self) -> &[String] {
        &self.names
    }

    fn held_names(&self) -> &[String] {
        &self.held
    }

    fn initial_internal(&self) -> Result<Array1<f64>> {
        self.free
            .iter()
            .map(|(name, transform)| {
                let value = self
                    .template
                    .try_get(name)?
                    .numeric_value()
                    .ok_or_else(|| LcFitError::parameter_type(name, "value must be a number"))?;
                Ok(transform.to_internal(value)?)
            })
            .collect::<Result<Vec<f64>>>()
            .map(Array1::from)
    }

    fn to_external(&self, internal: &Array1<f64>) -> Vec<f64> {
        self.free
            .iter()
            .zip(internal.iter())
            .map(|((_, transform), x)| transform.to_external(*x))
            .collect()
    }

    fn parameters_at(&self, internal: &Array1<f64>) -> Result<ParameterSet> {
        let mut params = self.template.clone();
        for ((name, _), value) in self.free.iter().zip(self.to_external(internal)) {
            let param = params.try_get(name)?.with_value(value)?;
            params.add(param)?;
        }
        Ok(params)
    }
}

impl Problem for LightCurveProblem<'_> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let trial = self.parameters_at(params)?;
        let residuals = self.model.residuals(&trial, self.flux)?;

        Ok(match &self.weights {
            Some(weights) => residuals * weights,
            None => residuals,
        })
    }

    fn parameter_count(&self) -> usize {
        self.free.len()
    }

    fn residual_count(&self) -> usize {
        self.flux.len()
    }
}

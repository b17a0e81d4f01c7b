//! Fitting campaigns.
//!
//! A [`FittingCampaign`] fits one model per light curve (typically one light
//! curve per wavelength channel) and collects the outcomes in a
//! [`FitResultTable`]. A failing unit never aborts the campaign: it is
//! recorded as a [`UnitFailure`] and the campaign moves on.
//!
//! Fit numbers are handed out on successful appends only, so the rows of a
//! table are always numbered `0..len` without gaps.

use crate::error::{LcFitError, Result};
use crate::fitter::{FitOptions, FitOutcome, FitterRegistry, DEFAULT_FITTER};
use crate::lightcurve::LightCurve;
use crate::model::TransitModel;
use crate::parameters::{HistoryRetention, ParameterSet};
use crate::results::{CellValue, FitResultRow, FitResultTable};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Campaign settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// Name of the fitter used for every unit. Default: `"lmfit"`
    pub fitter: String,

    /// Options passed to the fitter
    pub options: FitOptions,

    /// History retention applied to every unit's parameters before fitting
    pub history_retention: HistoryRetention,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            fitter: DEFAULT_FITTER.to_string(),
            options: FitOptions::default(),
            history_retention: HistoryRetention::default(),
        }
    }
}

impl CampaignConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fitter(mut self, fitter: &str) -> Self {
        self.fitter = fitter.to_string();
        self
    }

    pub fn with_options(mut self, options: FitOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_history_retention(mut self, retention: HistoryRetention) -> Self {
        self.history_retention = retention;
        self
    }

    /// Read a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One light curve to fit, with the model fitted to it
pub struct FitUnit {
    pub wavelength: f64,
    pub light_curve: LightCurve,
    pub model: Box<dyn TransitModel + Send>,
}

impl FitUnit {
    pub fn new(
        wavelength: f64,
        light_curve: LightCurve,
        model: Box<dyn TransitModel + Send>,
    ) -> Self {
        Self {
            wavelength,
            light_curve,
            model,
        }
    }
}

impl fmt::Debug for FitUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FitUnit")
            .field("wavelength", &self.wavelength)
            .field("light_curve", &self.light_curve)
            .field("model", &self.model.name())
            .finish()
    }
}

/// A unit that produced no result row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitFailure {
    /// Index of the unit in the campaign
    pub unit: usize,
    pub wavelength: f64,
    pub reason: String,
}

/// Summary of one campaign run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CampaignReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl fmt::Display for CampaignReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} units attempted, {} succeeded, {} failed",
            self.attempted, self.succeeded, self.failed
        )
    }
}

/// Fits a set of light curves and collects the results
///
/// # Examples
///
/// ```
/// use lcfit_rs::campaign::{CampaignConfig, FittingCampaign};
///
/// let mut campaign = FittingCampaign::new(CampaignConfig::default());
/// let report = campaign.run();
/// assert_eq!(report.attempted, 0);
/// assert!(campaign.results().is_empty());
/// ```
#[derive(Debug)]
pub struct FittingCampaign {
    config: CampaignConfig,
    registry: FitterRegistry,
    template: Option<ParameterSet>,
    units: Vec<FitUnit>,
    results: FitResultTable,
    failures: Vec<UnitFailure>,
}

impl FittingCampaign {
    /// A campaign using the built-in fitters
    pub fn new(config: CampaignConfig) -> Self {
        Self {
            config,
            registry: FitterRegistry::default(),
            template: None,
            units: Vec::new(),
            results: FitResultTable::new(),
            failures: Vec::new(),
        }
    }

    /// Replace the fitter registry
    pub fn with_registry(mut self, registry: FitterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Starting parameters for light curves that have none bound.
    ///
    /// Each such light curve receives its own copy before fitting.
    pub fn with_template(mut self, template: ParameterSet) -> Self {
        self.template = Some(template);
        self
    }

    pub fn add_unit(&mut self, unit: FitUnit) {
        self.units.push(unit);
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    pub fn units(&self) -> &[FitUnit] {
        &self.units
    }

    pub fn results(&self) -> &FitResultTable {
        &self.results
    }

    /// Failures of every run so far, oldest first
    pub fn failures(&self) -> &[UnitFailure] {
        &self.failures
    }

    /// Query the results, see [`FitResultTable::slice`]
    pub fn slice(&self, value: impl Into<CellValue>, column: &str) -> Result<FitResultTable> {
        self.results.slice(value, column)
    }

    /// Fit every unit in order, appending a row per successful fit
    pub fn run(&mut self) -> CampaignReport {
        info!(
            "fitting {} units with {}",
            self.units.len(),
            self.config.fitter
        );

        let context = self.context();
        let outcomes: Vec<Result<FitOutcome>> = self
            .units
            .iter_mut()
            .enumerate()
            .map(|(index, unit)| context.fit_unit(index, unit))
            .collect();

        self.merge(outcomes)
    }

    /// Fit every unit on the rayon thread pool.
    ///
    /// Units share nothing mutable while fitting; rows are merged afterwards on
    /// the calling thread in unit order, so numbering matches [`run`](Self::run).
    pub fn run_parallel(&mut self) -> CampaignReport {
        info!(
            "fitting {} units with {} in parallel",
            self.units.len(),
            self.config.fitter
        );

        let context = self.context();
        let outcomes: Vec<Result<FitOutcome>> = self
            .units
            .par_iter_mut()
            .enumerate()
            .map(|(index, unit)| context.fit_unit(index, unit))
            .collect();

        self.merge(outcomes)
    }

    fn context(&self) -> UnitContext {
        UnitContext {
            registry: self.registry.clone(),
            fitter: self.config.fitter.clone(),
            options: self.config.options.clone(),
            template: self.template.clone(),
            retention: self.config.history_retention,
        }
    }

    /// Single writer for the result table
    fn merge(&mut self, outcomes: Vec<Result<FitOutcome>>) -> CampaignReport {
        let mut report = CampaignReport {
            attempted: outcomes.len(),
            ..CampaignReport::default()
        };

        for ((index, unit), outcome) in self.units.iter().enumerate().zip(outcomes) {
            match outcome {
                Ok(outcome) => {
                    let fit_number = self.results.next_fit_number();
                    self.results
                        .push(FitResultRow::from_outcome(fit_number, unit.wavelength, &outcome));
                    report.succeeded += 1;
                }
                Err(err) => {
                    warn!(
                        "unit {} (wavelength {}) failed: {}",
                        index, unit.wavelength, err
                    );
                    self.failures.push(UnitFailure {
                        unit: index,
                        wavelength: unit.wavelength,
                        reason: err.to_string(),
                    });
                    report.failed += 1;
                }
            }
        }

        info!("campaign finished: {}", report);
        report
    }
}

/// Everything a unit needs to be fitted, owned so it can cross threads
struct UnitContext {
    registry: FitterRegistry,
    fitter: String,
    options: FitOptions,
    template: Option<ParameterSet>,
    retention: HistoryRetention,
}

impl UnitContext {
    fn fit_unit(&self, index: usize, unit: &mut FitUnit) -> Result<FitOutcome> {
        debug!("unit {}: wavelength {}", index, unit.wavelength);

        let parameters = unit
            .light_curve
            .set_parameters(None)
            .or_else(|| self.template.clone())
            .map(|params| params.with_retention(self.retention));
        unit.light_curve.set_parameters(parameters);

        let outcome = unit.light_curve.fit_with(
            &self.registry,
            unit.model.as_mut(),
            &self.fitter,
            &self.options,
        )?;

        if !outcome.success {
            return Err(LcFitError::FitFailure {
                unit: format!("unit {}", index),
                message: outcome.message,
            });
        }
        Ok(outcome)
    }
}

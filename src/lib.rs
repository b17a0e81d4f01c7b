//! # lcfit-rs
//!
//! `lcfit-rs` fits transit models to spectroscopic light curves, one light
//! curve per wavelength channel, and collects the best-fit orbital parameters
//! in a queryable table.
//!
//! The library provides:
//! - A parameter system with typed values, bounds and an assignment history
//! - Light curves that fit an external transit model through a named fitter
//! - A built-in Levenberg-Marquardt fitter registered as `"lmfit"`
//! - Fitting campaigns that fill a result table, sequentially or in parallel
//!
//! ## Basic Usage
//!
//! ```
//! use lcfit_rs::{CampaignConfig, FittingCampaign, ParameterSet};
//!
//! let mut template = ParameterSet::new();
//! template.set("P", (3.5, false)).unwrap();
//! template.set("Tc", 0.0).unwrap();
//!
//! let mut campaign = FittingCampaign::new(CampaignConfig::default()).with_template(template);
//! // campaign.add_unit(FitUnit::new(wavelength, light_curve, Box::new(model)));
//! let report = campaign.run();
//! assert_eq!(report.failed, 0);
//! ```

// Public modules
pub mod error;

// Parameter system
pub mod parameters;

pub mod campaign;
pub mod fitter;
pub mod ldc;
pub mod lightcurve;
pub mod model;
pub mod problem;
pub mod results;

// Conditional modules
#[cfg(feature = "lm")]
pub mod lm;

// Re-exports for convenience
pub use campaign::{CampaignConfig, CampaignReport, FitUnit, FittingCampaign, UnitFailure};
pub use error::{LcFitError, Result};
pub use fitter::{FitOptions, FitOutcome, Fitter, FitterRegistry};
pub use ldc::LimbDarkeningLaw;
pub use lightcurve::{LightCurve, TimeUnit};
pub use model::TransitModel;
pub use parameters::{ParamInput, ParamValue, Parameter, ParameterSet};
pub use results::{CellValue, Column, FitResultRow, FitResultTable};

#[cfg(feature = "lm")]
pub use fitter::LmFitter;

#[cfg(feature = "lm")]
pub use lm::LevenbergMarquardt;

pub use problem::Problem;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

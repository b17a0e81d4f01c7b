//! Tests for the built-in Levenberg-Marquardt fitter

#![cfg(feature = "lm")]

use crate::test_helpers::{approx_eq, GaussianDip};
use approx::assert_relative_eq;
use lcfit_rs::error::LcFitError;
use lcfit_rs::fitter::{FitOptions, FitterRegistry, LmFitter};
use lcfit_rs::lightcurve::LightCurve;
use lcfit_rs::lm::LmConfig;
use lcfit_rs::parameters::{ParamValue, ParameterSet};
use ndarray::Array1;
use std::time::Duration;

fn number(params: &ParameterSet, name: &str) -> f64 {
    params.get(name).and_then(|p| p.numeric_value()).unwrap()
}

#[test]
fn test_recovers_dip() {
    let lc = GaussianDip::synthetic_light_curve(0.012, 0.021, 0.05, 80);
    let mut model = GaussianDip::new(0.0, 0.01, 0.05);

    let outcome = lc.fit(&mut model, "lmfit", &FitOptions::default()).unwrap();

    assert!(outcome.success, "{}", outcome.message);
    assert_relative_eq!(number(&outcome.best_fit, "Tc"), 0.012, epsilon = 1e-6);
    assert_relative_eq!(number(&outcome.best_fit, "d"), 0.021, epsilon = 1e-6);
    // Fixed parameters are untouched
    assert_eq!(number(&outcome.best_fit, "width"), 0.05);
    assert!(outcome.chi2 < 1e-8);
    assert!(outcome.iterations > 0);
}

#[test]
fn test_respects_bounds() {
    // The data want a depth of 0.05, the bounds allow at most 0.03
    let lc = GaussianDip::synthetic_light_curve(0.0, 0.05, 0.05, 60);

    let mut start = ParameterSet::new();
    start.set("Tc", 0.0).unwrap();
    start.set("d", (0.01, true, 0.0, 0.03)).unwrap();
    start.set("width", (0.05, false)).unwrap();
    let lc = lc.with_parameters(start);

    let mut model = GaussianDip::new(0.0, 0.01, 0.05);
    let outcome = lc.fit(&mut model, "lmfit", &FitOptions::default()).unwrap();

    let depth = number(&outcome.best_fit, "d");
    assert!(depth <= 0.03, "depth {} escaped its bounds", depth);
    assert!(approx_eq(depth, 0.03, 1e-4));
}

#[test]
fn test_text_parameters_are_carried_through() {
    let lc = GaussianDip::synthetic_light_curve(0.0, 0.02, 0.05, 40);

    let mut start = ParameterSet::new();
    start.set("Tc", 0.0).unwrap();
    start.set("d", 0.01).unwrap();
    start.set("width", (0.05, false)).unwrap();
    start.set("P", (3.5, false)).unwrap();
    start.set("limb_dark", "quadratic").unwrap();
    let lc = lc.with_parameters(start);

    let mut model = GaussianDip::new(0.0, 0.01, 0.05);
    let outcome = lc.fit(&mut model, "lmfit", &FitOptions::default()).unwrap();

    assert_eq!(
        outcome.best_fit.value("limb_dark"),
        Some(&ParamValue::Text("quadratic".to_string()))
    );
    assert_eq!(number(&outcome.best_fit, "P"), 3.5);
}

#[test]
fn test_iteration_limit_is_not_success() {
    let lc = GaussianDip::synthetic_light_curve(0.012, 0.021, 0.05, 80);
    let mut model = GaussianDip::new(0.0, 0.01, 0.05);

    let options = FitOptions::new().with_max_iterations(1);
    let outcome = lc.fit(&mut model, "lmfit", &options).unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.iterations, 1);
}

#[test]
fn test_timeout_is_an_error() {
    let lc = GaussianDip::synthetic_light_curve(0.012, 0.021, 0.05, 80);
    let mut model = GaussianDip::new(0.0, 0.01, 0.05);

    let options = FitOptions::new().with_timeout(Duration::ZERO);
    let err = lc.fit(&mut model, "lmfit", &options).unwrap_err();
    assert!(matches!(err, LcFitError::OptimizationFailure(_)));
}

#[test]
fn test_all_fixed_evaluates_once() {
    let lc = GaussianDip::synthetic_light_curve(0.0, 0.02, 0.05, 20);

    let mut start = ParameterSet::new();
    start.set("Tc", (0.0, false)).unwrap();
    start.set("d", (0.02, false)).unwrap();
    start.set("width", (0.05, false)).unwrap();
    let lc = lc.with_parameters(start);

    let mut model = GaussianDip::new(0.0, 0.01, 0.05);
    let outcome = lc.fit(&mut model, "lmfit", &FitOptions::default()).unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.func_evals, 1);
    assert!(outcome.chi2 < 1e-20);
}

#[test]
fn test_custom_configuration() {
    let mut registry = FitterRegistry::empty();
    registry.register(LmFitter::with_config(LmConfig {
        max_iterations: 500,
        ..LmConfig::default()
    }));

    // Without uncertainties the residuals are unweighted
    let time = Array1::linspace(-0.2, 0.2, 50);
    let flux = GaussianDip::flux_at(&time, 0.005, 0.015, 0.05);
    let lc = LightCurve::new(time, flux, None).unwrap();

    let mut model = GaussianDip::new(0.0, 0.01, 0.05);
    let outcome = lc
        .fit_with(&registry, &mut model, "lmfit", &FitOptions::default())
        .unwrap();
    assert!(outcome.success, "{}", outcome.message);
    assert_relative_eq!(number(&outcome.best_fit, "d"), 0.015, epsilon = 1e-6);
}

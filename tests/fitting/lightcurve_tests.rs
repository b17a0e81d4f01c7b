//! Tests for fitting through a LightCurve

use crate::test_helpers::{GaussianDip, StubFitter};
use lcfit_rs::error::LcFitError;
use lcfit_rs::fitter::{FitOptions, FitterRegistry};
use lcfit_rs::lightcurve::{LightCurve, TimeUnit};
use lcfit_rs::model::TransitModel;
use lcfit_rs::parameters::{ParamValue, ParameterSet};
use ndarray::array;

fn stub_registry() -> FitterRegistry {
    let mut registry = FitterRegistry::empty();
    registry.register(StubFitter::new());
    registry
}

#[test]
fn test_fit_interpolates_model_first() {
    let lc = LightCurve::new(array![0.0, 1.0, 2.0], array![1.0, 0.98, 1.0], None).unwrap();
    let mut model = GaussianDip::new(1.0, 0.02, 0.3);
    assert!(model.interpolated_flux().is_none());

    let outcome = lc
        .fit_with(&stub_registry(), &mut model, "stub", &FitOptions::default())
        .unwrap();

    assert_eq!(model.interpolated_flux().unwrap().len(), 3);
    assert_eq!(outcome.best_fit.value("P"), Some(&ParamValue::Number(3.5)));
    assert_eq!(outcome.best_fit.value("Tc"), Some(&ParamValue::Number(1.0)));
    assert_eq!(outcome.chi2, 0.02);
    assert_eq!(outcome.model_name, "gaussian_dip");
}

#[test]
fn test_unknown_fitter_after_interpolation() {
    let lc = LightCurve::new(array![0.0, 1.0, 2.0], array![1.0, 0.98, 1.0], None).unwrap();
    let mut model = GaussianDip::new(1.0, 0.02, 0.3);

    let err = lc
        .fit_with(&stub_registry(), &mut model, "emcee", &FitOptions::default())
        .unwrap_err();

    match err {
        LcFitError::UnsupportedFitter { name, available } => {
            assert_eq!(name, "emcee");
            assert_eq!(available, "stub");
        }
        other => panic!("expected UnsupportedFitter, got {:?}", other),
    }
    assert!(model.interpolated_flux().is_some());
}

#[test]
fn test_bound_parameters_are_the_starting_point() {
    let mut params = ParameterSet::new();
    params.set("Tc", 0.5).unwrap();
    params.set("d", 0.01).unwrap();
    params.set("width", 0.2).unwrap();
    params.set("ecc", (0.0, false)).unwrap();

    let lc = LightCurve::new(array![0.0, 1.0], array![1.0, 1.0], None)
        .unwrap()
        .with_parameters(params);
    let mut model = GaussianDip::new(1.0, 0.02, 0.3);

    let outcome = lc
        .fit_with(&stub_registry(), &mut model, "stub", &FitOptions::default())
        .unwrap();
    assert!(outcome.best_fit.contains("ecc"));
    assert_eq!(outcome.best_fit.value("d"), Some(&ParamValue::Number(0.01)));
}

#[test]
fn test_time_units_reach_the_model() {
    // Two hours either side of mid-transit at 0.1 day
    let hours = array![0.0, 2.4, 4.8];
    let lc = LightCurve::new(hours, array![1.0, 0.99, 1.0], None)
        .unwrap()
        .with_units(TimeUnit::Hour);
    let mut model = GaussianDip::new(0.1, 0.01, 0.05);

    lc.fit_with(&stub_registry(), &mut model, "stub", &FitOptions::default())
        .unwrap();

    let flux = model.interpolated_flux().unwrap();
    assert!((flux[1] - 0.99).abs() < 1e-12);
    assert!(flux[0] > flux[1]);
}

#[cfg(feature = "lm")]
#[test]
fn test_default_registry_fit() {
    let lc = GaussianDip::synthetic_light_curve(0.01, 0.02, 0.05, 60);
    let mut model = GaussianDip::new(0.0, 0.01, 0.05);

    let outcome = lc.fit(&mut model, "lmfit", &FitOptions::default()).unwrap();
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.fitter, "lmfit");
}

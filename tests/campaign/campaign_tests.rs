//! Tests for FittingCampaign

use crate::test_helpers::{GaussianDip, StubFitter};
use lcfit_rs::campaign::{CampaignConfig, FitUnit, FittingCampaign};
use lcfit_rs::fitter::{FitOptions, FitterRegistry};
use lcfit_rs::lightcurve::LightCurve;
use lcfit_rs::parameters::{HistoryRetention, ParameterSet};
use lcfit_rs::results::CellValue;
use ndarray::array;

fn stub_campaign(fitter: StubFitter) -> FittingCampaign {
    let mut registry = FitterRegistry::empty();
    registry.register(fitter);
    FittingCampaign::new(CampaignConfig::new().with_fitter("stub")).with_registry(registry)
}

fn unit(wavelength: f64, model_name: &str) -> FitUnit {
    let lc = LightCurve::new(array![0.0, 1.0, 2.0], array![1.0, 0.98, 1.0], None).unwrap();
    FitUnit::new(
        wavelength,
        lc,
        Box::new(GaussianDip::new(1.0, 0.02, 0.3).named(model_name)),
    )
}

#[test]
fn test_end_to_end_failure_does_not_consume_fit_number() {
    let mut campaign = stub_campaign(StubFitter::failing_for("broken"));
    campaign.add_unit(unit(1.1, "batman"));
    campaign.add_unit(unit(1.2, "broken"));
    campaign.add_unit(unit(1.3, "batman"));

    let report = campaign.run();
    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);

    let rows = campaign.results().rows();
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].fit_number, rows[0].wavelength), (0, 1.1));
    assert_eq!((rows[1].fit_number, rows[1].wavelength), (1, 1.3));
    assert_eq!(rows[0].period, 3.5);
    assert_eq!(rows[0].tc, 1.0);
    assert_eq!(rows[0].chi2, 0.02);

    let failures = campaign.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].unit, 1);
    assert_eq!(failures[0].wavelength, 1.2);
    assert!(failures[0].reason.contains("stub failure"));
}

#[test]
fn test_unconverged_fit_is_a_failure() {
    let mut campaign = stub_campaign(StubFitter::unconverged());
    campaign.add_unit(unit(1.1, "batman"));

    let report = campaign.run();
    assert_eq!(report.failed, 1);
    assert!(campaign.results().is_empty());
}

#[test]
fn test_unknown_fitter_fails_every_unit() {
    let mut campaign = FittingCampaign::new(CampaignConfig::new().with_fitter("emcee"))
        .with_registry(FitterRegistry::empty());
    campaign.add_unit(unit(1.1, "batman"));
    campaign.add_unit(unit(1.2, "batman"));

    let report = campaign.run();
    assert_eq!(report.failed, 2);
    assert!(campaign.failures()[0].reason.contains("emcee"));
}

#[test]
fn test_running_again_continues_numbering() {
    let mut campaign = stub_campaign(StubFitter::new());
    campaign.add_unit(unit(1.1, "batman"));
    campaign.add_unit(unit(1.2, "batman"));

    campaign.run();
    campaign.run();

    let numbers = campaign.results().column("fit_number").unwrap();
    assert_eq!(numbers, (0..4usize).map(CellValue::Int).collect::<Vec<_>>());
    assert_eq!(campaign.slice(1.2, "wavelength").unwrap().len(), 2);
}

#[test]
fn test_parallel_run_matches_sequential_numbering() {
    let mut sequential = stub_campaign(StubFitter::failing_for("broken"));
    let mut parallel = stub_campaign(StubFitter::failing_for("broken"));
    for campaign in [&mut sequential, &mut parallel] {
        for k in 0..12 {
            let name = if k % 4 == 1 { "broken" } else { "batman" };
            campaign.add_unit(unit(1.0 + k as f64 * 0.1, name));
        }
    }

    let a = sequential.run();
    let b = parallel.run_parallel();
    assert_eq!(a, b);
    assert_eq!(b.succeeded, 9);

    let key = |campaign: &FittingCampaign| -> Vec<(usize, f64)> {
        campaign
            .results()
            .rows()
            .iter()
            .map(|row| (row.fit_number, row.wavelength))
            .collect()
    };
    assert_eq!(key(&sequential), key(&parallel));
    assert_eq!(sequential.failures(), parallel.failures());
}

#[test]
fn test_template_is_copied_into_each_light_curve() {
    let mut template = ParameterSet::new();
    template.set("Tc", 0.9).unwrap();
    template.set("d", 0.01).unwrap();
    template.set("width", (0.3, false)).unwrap();
    template.set("P", 3.0).unwrap();

    let mut campaign = stub_campaign(StubFitter::new())
        .with_template(template.clone());
    campaign.add_unit(unit(1.1, "batman"));

    // A unit with its own parameters keeps them
    let mut own = ParameterSet::new();
    own.set("Tc", 1.1).unwrap();
    own.set("d", 0.02).unwrap();
    own.set("width", 0.3).unwrap();
    let mut bound = unit(1.2, "batman");
    bound.light_curve = bound.light_curve.with_parameters(own);
    campaign.add_unit(bound);

    campaign.run();

    let first = campaign.units()[0].light_curve.parameters().unwrap();
    assert_eq!(first.get("P").unwrap().numeric_value(), Some(3.0));
    let second = campaign.units()[1].light_curve.parameters().unwrap();
    assert!(!second.contains("P"));

    // The stub overwrote P in its own copy, never in the template
    assert_eq!(template.get("P").unwrap().numeric_value(), Some(3.0));
    assert_eq!(campaign.results().rows()[0].period, 3.5);
}

#[test]
fn test_history_retention_applied_to_units() {
    let mut template = ParameterSet::new();
    for _ in 0..5 {
        template.set("Tc", 1.0).unwrap();
    }
    template.set("d", 0.01).unwrap();
    template.set("width", 0.3).unwrap();

    let config = CampaignConfig::new()
        .with_fitter("stub")
        .with_history_retention(HistoryRetention::KeepLast(2));
    let mut registry = FitterRegistry::empty();
    registry.register(StubFitter::new());
    let mut campaign = FittingCampaign::new(config)
        .with_registry(registry)
        .with_template(template);
    campaign.add_unit(unit(1.1, "batman"));
    campaign.run();

    let params = campaign.units()[0].light_curve.parameters().unwrap();
    assert_eq!(params.history().len(), 2);
    assert_eq!(params.total_recorded(), 7);
}

#[test]
fn test_config_from_json() {
    let config = CampaignConfig::from_json_str(
        r#"{"fitter": "stub", "options": {"max_iterations": 50}, "history_retention": {"keep_last": 10}}"#,
    )
    .unwrap();
    assert_eq!(config.fitter, "stub");
    assert_eq!(config.options, FitOptions::new().with_max_iterations(50));
    assert_eq!(config.history_retention, HistoryRetention::KeepLast(10));

    let config = CampaignConfig::from_json_str("{}").unwrap();
    assert_eq!(config, CampaignConfig::default());
    assert_eq!(config.fitter, "lmfit");
}

#[cfg(feature = "lm")]
#[test]
fn test_lmfit_campaign_over_wavelengths() {
    let depths = [0.010, 0.012, 0.015];
    let mut template = ParameterSet::new();
    template.set("Tc", 0.0).unwrap();
    template.set("d", (0.02, true, 0.0, 0.1)).unwrap();
    template.set("width", (0.05, false)).unwrap();

    let mut campaign = FittingCampaign::new(CampaignConfig::default()).with_template(template);
    for (i, depth) in depths.iter().enumerate() {
        let lc = GaussianDip::synthetic_light_curve(0.003, *depth, 0.05, 60);
        campaign.add_unit(FitUnit::new(
            1.1 + 0.1 * i as f64,
            lc,
            Box::new(GaussianDip::new(0.0, 0.02, 0.05)),
        ));
    }

    let report = campaign.run_parallel();
    assert_eq!(report.succeeded, 3, "{:?}", campaign.failures());

    for (row, depth) in campaign.results().rows().iter().zip(depths) {
        assert!((row.depth - depth).abs() < 1e-6);
        assert!((row.tc - 0.003).abs() < 1e-6);
        assert_eq!(row.model_name, "gaussian_dip");
    }
}

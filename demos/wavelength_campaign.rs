//! Example fitting one light curve per wavelength channel
//!
//! This example loads starting parameters from a JSON file with an explicit
//! override, fits a simple dip model to five synthetic channels with the
//! built-in Levenberg-Marquardt fitter, and queries the result table.

use lcfit_rs::error::{LcFitError, Result};
use lcfit_rs::parameters::{ParamInput, ParameterSet};
use lcfit_rs::{
    CampaignConfig, FitOptions, FitUnit, FittingCampaign, LightCurve, TimeUnit, TransitModel,
};
use ndarray::Array1;
use std::fs;

/// Stand-in for a transit model: a Gaussian dip of depth `rp²`
struct GaussianTransit {
    params: ParameterSet,
    time: Option<Array1<f64>>,
    flux: Option<Array1<f64>>,
}

impl GaussianTransit {
    fn new(params: ParameterSet) -> Self {
        Self {
            params,
            time: None,
            flux: None,
        }
    }

    fn flux(time: &Array1<f64>, params: &ParameterSet) -> Result<Array1<f64>> {
        let number = |name: &str| -> Result<f64> {
            params
                .try_get(name)?
                .numeric_value()
                .ok_or_else(|| LcFitError::InvalidInput(format!("{} is not a number", name)))
        };
        let (t0, rp, duration) = (number("t0")?, number("rp")?, number("duration")?);
        Ok(time.mapv(|t| 1.0 - rp * rp * (-0.5 * ((t - t0) / duration).powi(2)).exp()))
    }
}

impl TransitModel for GaussianTransit {
    fn name(&self) -> &str {
        "gaussian_transit"
    }

    fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    fn interpolate(&mut self, time: &Array1<f64>, units: TimeUnit) -> Result<()> {
        let days = units.to_days(time);
        self.flux = Some(Self::flux(&days, &self.params)?);
        self.time = Some(days);
        Ok(())
    }

    fn eval(&self, params: &ParameterSet) -> Result<Array1<f64>> {
        match &self.time {
            Some(time) => Self::flux(time, params),
            None => Err(LcFitError::InvalidInput("model not interpolated".to_string())),
        }
    }

    fn interpolated_flux(&self) -> Option<&Array1<f64>> {
        self.flux.as_ref()
    }
}

fn main() -> Result<()> {
    println!("Wavelength campaign example");
    println!("===========================\n");

    // Starting parameters: a JSON file plus an explicit override
    let path = std::env::temp_dir().join("lcfit-demo-orbit.json");
    fs::write(
        &path,
        r#"{
            "per": [3.5, false],
            "t0": 0.0,
            "rp": [0.1, true, 0.0, 0.3],
            "duration": [0.04, false],
            "limb_dark": "quadratic",
            "u": [[0.1, 0.3]]
        }"#,
    )?;
    let template = ParameterSet::load(Some(&path), vec![("ecc", ParamInput::from((0.0, false)))])?;
    fs::remove_file(&path)?;

    println!("Starting parameters:");
    for param in template.iter() {
        println!("  {:?}", param.values().to_tuple());
    }
    println!();

    // One synthetic light curve per channel, times in hours
    let hours = Array1::linspace(-4.8, 4.8, 200);
    let config = CampaignConfig::new().with_options(FitOptions::new().with_max_iterations(100));
    let mut campaign = FittingCampaign::new(config).with_template(template.clone());

    for (k, wavelength) in [1.1, 1.2, 1.3, 1.4, 1.5].into_iter().enumerate() {
        let mut truth = template.clone();
        truth.set("t0", 0.003)?;
        truth.set("rp", (0.1 + 0.002 * k as f64, true, 0.0, 0.3))?;
        let flux = GaussianTransit::flux(&TimeUnit::Hour.to_days(&hours), &truth)?;

        let lc = LightCurve::new(hours.clone(), flux, Some(Array1::from_elem(200, 2e-4)))?
            .with_units(TimeUnit::Hour)
            .with_name(format!("{:.1}um", wavelength));
        campaign.add_unit(FitUnit::new(
            wavelength,
            lc,
            Box::new(GaussianTransit::new(template.clone())),
        ));
    }

    let report = campaign.run_parallel();
    println!("{}\n", report);
    println!("{}", campaign.results());

    for failure in campaign.failures() {
        println!("unit {} failed: {}", failure.unit, failure.reason);
    }

    let channel = campaign.slice(1.3, "wavelength")?;
    println!("Channel 1.3um:\n{}", channel);

    Ok(())
}

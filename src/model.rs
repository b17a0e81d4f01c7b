//! Transit model trait.
//!
//! The physical light-curve model (limb-darkened transit, eclipse, ...) lives
//! outside this crate. [`TransitModel`] is the capability the fitters need from
//! it: interpolate onto an observed time axis, then predict flux on that axis
//! for trial parameter values.

use crate::error::{LcFitError, Result};
use crate::lightcurve::TimeUnit;
use crate::parameters::ParameterSet;
use ndarray::Array1;

/// A parametric light-curve model that can be fit to data.
pub trait TransitModel {
    /// Name recorded in fit outcomes and result tables
    fn name(&self) -> &str;

    /// The model's own parameters, used as the starting point when the light
    /// curve has none bound
    fn parameters(&self) -> &ParameterSet;

    /// Interpolate the model onto `time`, expressed in `units`.
    ///
    /// This replaces the model's interpolated flux and sets the axis that
    /// [`eval`](Self::eval) predicts on.
    fn interpolate(&mut self, time: &Array1<f64>, units: TimeUnit) -> Result<()>;

    /// Flux predicted on the interpolated time axis for `params`
    fn eval(&self, params: &ParameterSet) -> Result<Array1<f64>>;

    /// Flux computed by the last [`interpolate`](Self::interpolate) call, if any
    fn interpolated_flux(&self) -> Option<&Array1<f64>>;

    /// Residuals `observed - predicted` for `params`
    fn residuals(&self, params: &ParameterSet, observed: &Array1<f64>) -> Result<Array1<f64>> {
        let predicted = self.eval(params)?;

        if observed.len() != predicted.len() {
            return Err(LcFitError::DimensionMismatch(format!(
                "model {} predicted {} points for {} observations",
                self.name(),
                predicted.len(),
                observed.len()
            )));
        }

        Ok(observed - &predicted)
    }
}

//! Limb-darkening laws.
//!
//! The normalized intensity profiles `I(mu) / I(1)` of the laws supported by
//! common transit models, and the number of coefficients each one takes. A
//! light-curve parameter set names its law in a `limb_dark` text parameter and
//! carries the coefficients in `ldcs` (or `u`).

use crate::error::{LcFitError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A limb-darkening law
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LimbDarkeningLaw {
    Uniform,
    Linear,
    Quadratic,
    SquareRoot,
    Logarithmic,
    Exponential,
    #[serde(rename = "3-parameter")]
    ThreeParameter,
    #[serde(rename = "4-parameter")]
    FourParameter,
}

impl LimbDarkeningLaw {
    pub const ALL: [LimbDarkeningLaw; 8] = [
        LimbDarkeningLaw::Uniform,
        LimbDarkeningLaw::Linear,
        LimbDarkeningLaw::Quadratic,
        LimbDarkeningLaw::SquareRoot,
        LimbDarkeningLaw::Logarithmic,
        LimbDarkeningLaw::Exponential,
        LimbDarkeningLaw::ThreeParameter,
        LimbDarkeningLaw::FourParameter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LimbDarkeningLaw::Uniform => "uniform",
            LimbDarkeningLaw::Linear => "linear",
            LimbDarkeningLaw::Quadratic => "quadratic",
            LimbDarkeningLaw::SquareRoot => "square-root",
            LimbDarkeningLaw::Logarithmic => "logarithmic",
            LimbDarkeningLaw::Exponential => "exponential",
            LimbDarkeningLaw::ThreeParameter => "3-parameter",
            LimbDarkeningLaw::FourParameter => "4-parameter",
        }
    }

    /// Number of coefficients the law takes
    pub fn n_coeffs(&self) -> usize {
        match self {
            LimbDarkeningLaw::Uniform => 0,
            LimbDarkeningLaw::Linear => 1,
            LimbDarkeningLaw::Quadratic
            | LimbDarkeningLaw::SquareRoot
            | LimbDarkeningLaw::Logarithmic
            | LimbDarkeningLaw::Exponential => 2,
            LimbDarkeningLaw::ThreeParameter => 3,
            LimbDarkeningLaw::FourParameter => 4,
        }
    }

    /// Normalized intensity at `mu = cos(theta)`
    ///
    /// Fails if `coeffs` does not hold exactly [`n_coeffs`](Self::n_coeffs) values.
    ///
    /// # Examples
    ///
    /// ```
    /// use lcfit_rs::ldc::LimbDarkeningLaw;
    ///
    /// let law = LimbDarkeningLaw::Quadratic;
    /// assert_eq!(law.intensity(1.0, &[0.4, 0.2]).unwrap(), 1.0);
    /// assert!(law.intensity(0.5, &[0.4]).is_err());
    /// ```
    pub fn intensity(&self, mu: f64, coeffs: &[f64]) -> Result<f64> {
        if coeffs.len() != self.n_coeffs() {
            return Err(LcFitError::DimensionMismatch(format!(
                "{} limb darkening takes {} coefficients, got {}",
                self.name(),
                self.n_coeffs(),
                coeffs.len()
            )));
        }

        let c = coeffs;
        let one_minus = 1.0 - mu;
        let value = match self {
            LimbDarkeningLaw::Uniform => 1.0,
            LimbDarkeningLaw::Linear => 1.0 - c[0] * one_minus,
            LimbDarkeningLaw::Quadratic => 1.0 - c[0] * one_minus - c[1] * one_minus.powi(2),
            LimbDarkeningLaw::SquareRoot => 1.0 - c[0] * one_minus - c[1] * (1.0 - mu.sqrt()),
            LimbDarkeningLaw::Logarithmic => {
                1.0 - c[0] * one_minus - c[1] * mu * (1.0 - mu.ln())
            }
            LimbDarkeningLaw::Exponential => {
                1.0 - c[0] * one_minus - c[1] / (1.0 - mu.exp())
            }
            LimbDarkeningLaw::ThreeParameter => {
                1.0 - c[0] * one_minus - c[1] * (1.0 - mu.powf(1.5)) - c[2] * (1.0 - mu.powi(2))
            }
            LimbDarkeningLaw::FourParameter => {
                1.0 - c[0] * (1.0 - mu.sqrt())
                    - c[1] * one_minus
                    - c[2] * (1.0 - mu.powf(1.5))
                    - c[3] * (1.0 - mu.powi(2))
            }
        };

        Ok(value)
    }
}

impl fmt::Display for LimbDarkeningLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LimbDarkeningLaw {
    type Err = LcFitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|law| law.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|law| law.name()).collect();
                LcFitError::InvalidInput(format!(
                    "'{}' is not a supported limb darkening profile, try one of {:?}",
                    s, names
                ))
            })
    }
}

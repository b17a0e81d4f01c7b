//! Parameter definition and implementation
//!
//! A [`Parameter`] is a single named value slot with optional bounds and a
//! free/fixed flag. Parameters are immutable once built; a
//! [`ParameterSet`](super::ParameterSet) "updates" a parameter by replacing it
//! with a new one of the same name.

use crate::error::{LcFitError, Result};
use crate::parameters::bounds::Bounds;
use crate::parameters::value::{ParamInput, ParamValue, ValueKind};
use serde::Serialize;

/// Maximum number of positional arguments: `(value, vary, min, max)`
const MAX_ARGS: usize = 4;

/// A named model parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    value: ParamValue,
    vary: bool,
    min: Option<ParamValue>,
    max: Option<ParamValue>,
}

impl Parameter {
    /// Create a free parameter without bounds
    ///
    /// # Examples
    ///
    /// ```
    /// use lcfit_rs::parameters::{Parameter, ParamValue};
    ///
    /// let param = Parameter::new("inc", 89.0);
    /// assert_eq!(param.name(), "inc");
    /// assert_eq!(param.value(), &ParamValue::Number(89.0));
    /// assert!(param.vary());
    /// ```
    pub fn new(name: &str, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            vary: true,
            min: None,
            max: None,
        }
    }

    /// Create a parameter with every field given explicitly
    ///
    /// `min` and `max` must belong to the same type family as `value`.
    pub fn with_options(
        name: &str,
        value: ParamValue,
        vary: bool,
        min: Option<ParamValue>,
        max: Option<ParamValue>,
    ) -> Result<Self> {
        for (label, bound) in [("min", &min), ("max", &max)] {
            if let Some(bound) = bound {
                if bound.kind() != value.kind() {
                    return Err(LcFitError::parameter_type(
                        name,
                        format!(
                            "{} is a {} but the value is a {}",
                            label,
                            bound.kind(),
                            value.kind()
                        ),
                    ));
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            value,
            vary,
            min,
            max,
        })
    }

    /// Create a parameter from its positional arguments `(value, vary, min, max)`
    ///
    /// Only `value` is required. `vary` must be a boolean (or null for the
    /// default `true`); `min`/`max` may be null to leave them unset.
    pub fn from_args(name: &str, args: Vec<ParamInput>) -> Result<Self> {
        if args.is_empty() {
            return Err(LcFitError::parameter_type(name, "a value is required"));
        }
        if args.len() > MAX_ARGS {
            return Err(LcFitError::parameter_type(
                name,
                format!(
                    "expected at most {} arguments (value, vary, min, max), got {}",
                    MAX_ARGS,
                    args.len()
                ),
            ));
        }

        let mut args = args.into_iter();
        let mut next_value = |field: &str| -> Result<Option<ParamValue>> {
            match args.next() {
                Some(arg) => arg
                    .into_value()
                    .map_err(|msg| LcFitError::parameter_type(name, format!("{}: {}", field, msg))),
                None => Ok(None),
            }
        };

        let value = next_value("value")?
            .ok_or_else(|| LcFitError::parameter_type(name, "value cannot be null"))?;
        let vary = match next_value("vary")? {
            None => true,
            Some(ParamValue::Bool(vary)) => vary,
            Some(other) => {
                return Err(LcFitError::parameter_type(
                    name,
                    format!("vary must be a boolean, got {}", other.kind()),
                ))
            }
        };
        let min = next_value("min")?;
        let max = next_value("max")?;

        Self::with_options(name, value, vary, min, max)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    /// Whether the parameter is free during fitting
    pub fn vary(&self) -> bool {
        self.vary
    }

    pub fn min(&self) -> Option<&ParamValue> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&ParamValue> {
        self.max.as_ref()
    }

    /// The type family of the value
    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// The value as a number, if it is one
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_f64()
    }

    /// Numeric bounds for fitting; unset limits are unbounded on that side.
    ///
    /// Fails if the limits are not numbers or if `min > max`.
    pub fn numeric_bounds(&self) -> Result<Bounds> {
        let limit = |bound: &Option<ParamValue>, label: &str| -> Result<Option<f64>> {
            match bound {
                None => Ok(None),
                Some(ParamValue::Number(x)) => Ok(Some(*x)),
                Some(other) => Err(LcFitError::parameter_type(
                    &self.name,
                    format!("{} must be a number to fit, got {}", label, other.kind()),
                )),
            }
        };

        Ok(Bounds::from_limits(
            limit(&self.min, "min")?,
            limit(&self.max, "max")?,
        )?)
    }

    /// A copy of this parameter holding a new value of the same type family
    pub fn with_value(&self, value: impl Into<ParamValue>) -> Result<Self> {
        let value = value.into();
        if value.kind() != self.kind() {
            return Err(LcFitError::parameter_type(
                &self.name,
                format!("cannot replace a {} with a {}", self.kind(), value.kind()),
            ));
        }

        Ok(Self {
            value,
            ..self.clone()
        })
    }

    /// Snapshot of all fields, as recorded in the parameter set history
    pub fn values(&self) -> ParameterValues {
        ParameterValues {
            name: self.name.clone(),
            value: self.value.clone(),
            vary: self.vary,
            min: self.min.clone(),
            max: self.max.clone(),
        }
    }
}

/// Snapshot of a parameter: `(name, value, vary, min, max)`
///
/// The struct keeps every position, with unset bounds as `None`. The flattened
/// form returned by [`ParameterValues::to_tuple`] and the serialized form both
/// omit unset bounds instead of inventing a placeholder for them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterValues {
    pub name: String,
    pub value: ParamValue,
    pub vary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<ParamValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<ParamValue>,
}

impl ParameterValues {
    /// Flatten left to right, skipping unset fields
    ///
    /// ```
    /// use lcfit_rs::parameters::{Parameter, ParamValue};
    ///
    /// let param = Parameter::with_options(
    ///     "b", ParamValue::Number(0.3), true, None, Some(ParamValue::Number(1.0)),
    /// ).unwrap();
    /// let tuple = param.values().to_tuple();
    /// assert_eq!(tuple.len(), 4);
    /// assert_eq!(tuple[3], ParamValue::Number(1.0));
    /// ```
    pub fn to_tuple(&self) -> Vec<ParamValue> {
        let mut tuple = vec![
            ParamValue::Text(self.name.clone()),
            self.value.clone(),
            ParamValue::Bool(self.vary),
        ];
        tuple.extend(self.min.iter().cloned());
        tuple.extend(self.max.iter().cloned());
        tuple
    }
}

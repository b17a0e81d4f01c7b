//! Parameter value types
//!
//! [`ParamValue`] is the tagged union stored inside a [`Parameter`](super::Parameter).
//! [`ParamInput`] is the raw, not yet normalized value handed to
//! [`ParameterSet::set`](super::ParameterSet::set), which may still be a
//! positional argument tuple, a bare scalar, a list, or something that can never
//! become a parameter (a mapping).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The type family of a parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Number,
    Text,
    Bool,
    Sequence,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Number => "number",
            ValueKind::Text => "string",
            ValueKind::Bool => "boolean",
            ValueKind::Sequence => "sequence",
        };
        f.write_str(name)
    }
}

/// The value held by a parameter
///
/// Fixed-size tuples of numbers (limb-darkening coefficients, for instance) are
/// represented as a `Sequence` of `Number`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Sequence(Vec<ParamValue>),
}

impl ParamValue {
    /// The type family of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            ParamValue::Bool(_) => ValueKind::Bool,
            ParamValue::Number(_) => ValueKind::Number,
            ParamValue::Text(_) => ValueKind::Text,
            ParamValue::Sequence(_) => ValueKind::Sequence,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Numeric view of the value: a number becomes a one-element vector, a
    /// sequence of numbers is returned element-wise.
    ///
    /// Returns `None` for text, booleans and sequences with non-numeric items.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            ParamValue::Number(x) => Some(vec![*x]),
            ParamValue::Sequence(items) => items.iter().map(ParamValue::as_f64).collect(),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Number(x) => write!(f, "{}", x),
            ParamValue::Text(s) => write!(f, "'{}'", s),
            ParamValue::Sequence(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Number(x)
    }
}

impl From<i32> for ParamValue {
    fn from(x: i32) -> Self {
        ParamValue::Number(f64::from(x))
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(values: Vec<f64>) -> Self {
        ParamValue::Sequence(values.into_iter().map(ParamValue::Number).collect())
    }
}

/// A value as supplied to [`ParameterSet::set`](super::ParameterSet::set), before
/// normalization.
///
/// A `Tuple` is the positional argument list `(value, vary, min, max)` of a
/// parameter; a `List` is an ordered sequence that normalization turns into such
/// a tuple. `Null` marks an unset optional field.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamInput {
    Null,
    Scalar(ParamValue),
    List(Vec<ParamInput>),
    Tuple(Vec<ParamInput>),
    Mapping(Vec<(String, ParamInput)>),
}

impl ParamInput {
    /// Build a positional argument tuple
    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ParamInput>,
    {
        ParamInput::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Short description of the input's shape, used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            ParamInput::Null => "null",
            ParamInput::Scalar(ParamValue::Bool(_)) => "boolean",
            ParamInput::Scalar(ParamValue::Number(_)) => "number",
            ParamInput::Scalar(ParamValue::Text(_)) => "string",
            ParamInput::Scalar(ParamValue::Sequence(_)) | ParamInput::List(_) => "list",
            ParamInput::Tuple(_) => "tuple",
            ParamInput::Mapping(_) => "mapping",
        }
    }

    /// Convert a single normalized argument into a value.
    ///
    /// `Null` becomes `None`; lists and tuples become sequences. Mappings (and
    /// nulls nested inside sequences) have no value representation.
    pub fn into_value(self) -> Result<Option<ParamValue>, String> {
        match self {
            ParamInput::Null => Ok(None),
            ParamInput::Scalar(value) => Ok(Some(value)),
            ParamInput::List(items) | ParamInput::Tuple(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item.into_value()? {
                        Some(value) => values.push(value),
                        None => return Err("sequences cannot contain null".to_string()),
                    }
                }
                Ok(Some(ParamValue::Sequence(values)))
            }
            ParamInput::Mapping(_) => Err("a mapping is not a valid parameter value".to_string()),
        }
    }
}

impl From<ParamValue> for ParamInput {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Sequence(items) => {
                ParamInput::List(items.into_iter().map(ParamInput::from).collect())
            }
            scalar => ParamInput::Scalar(scalar),
        }
    }
}

impl From<f64> for ParamInput {
    fn from(x: f64) -> Self {
        ParamInput::Scalar(ParamValue::Number(x))
    }
}

impl From<i32> for ParamInput {
    fn from(x: i32) -> Self {
        ParamInput::Scalar(ParamValue::from(x))
    }
}

impl From<bool> for ParamInput {
    fn from(b: bool) -> Self {
        ParamInput::Scalar(ParamValue::Bool(b))
    }
}

impl From<&str> for ParamInput {
    fn from(s: &str) -> Self {
        ParamInput::Scalar(ParamValue::from(s))
    }
}

impl From<String> for ParamInput {
    fn from(s: String) -> Self {
        ParamInput::Scalar(ParamValue::Text(s))
    }
}

impl<T: Into<ParamInput>> From<Option<T>> for ParamInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamInput::Null, Into::into)
    }
}

impl<T: Into<ParamInput>> From<Vec<T>> for ParamInput {
    fn from(items: Vec<T>) -> Self {
        ParamInput::List(items.into_iter().map(Into::into).collect())
    }
}

impl<A, B> From<(A, B)> for ParamInput
where
    A: Into<ParamInput>,
    B: Into<ParamInput>,
{
    fn from((a, b): (A, B)) -> Self {
        ParamInput::Tuple(vec![a.into(), b.into()])
    }
}

impl<A, B, C> From<(A, B, C)> for ParamInput
where
    A: Into<ParamInput>,
    B: Into<ParamInput>,
    C: Into<ParamInput>,
{
    fn from((a, b, c): (A, B, C)) -> Self {
        ParamInput::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

impl<A, B, C, D> From<(A, B, C, D)> for ParamInput
where
    A: Into<ParamInput>,
    B: Into<ParamInput>,
    C: Into<ParamInput>,
    D: Into<ParamInput>,
{
    fn from((a, b, c, d): (A, B, C, D)) -> Self {
        ParamInput::Tuple(vec![a.into(), b.into(), c.into(), d.into()])
    }
}

impl From<serde_json::Value> for ParamInput {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => ParamInput::Null,
            Value::Bool(b) => ParamInput::from(b),
            // Every JSON number has an f64 representation (possibly lossy for huge integers)
            Value::Number(n) => ParamInput::from(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => ParamInput::from(s),
            Value::Array(items) => {
                ParamInput::List(items.into_iter().map(ParamInput::from).collect())
            }
            Value::Object(map) => ParamInput::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, ParamInput::from(value)))
                    .collect(),
            ),
        }
    }
}

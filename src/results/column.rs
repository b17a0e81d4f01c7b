//! The fixed result-table schema.

use crate::error::{LcFitError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A column of the result table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "fit_number")]
    FitNumber,
    #[serde(rename = "wavelength")]
    Wavelength,
    /// Orbital period
    #[serde(rename = "P")]
    Period,
    /// Mid-transit time
    #[serde(rename = "Tc")]
    Tc,
    /// Semi-major axis in stellar radii
    #[serde(rename = "a/Rs")]
    ARs,
    /// Impact parameter
    #[serde(rename = "b")]
    Impact,
    /// Transit depth
    #[serde(rename = "d")]
    Depth,
    /// Limb-darkening coefficients
    #[serde(rename = "ldcs")]
    Ldcs,
    /// Eccentricity
    #[serde(rename = "e")]
    Ecc,
    /// Argument of periastron
    #[serde(rename = "w")]
    Omega,
    #[serde(rename = "model_name")]
    ModelName,
    #[serde(rename = "chi2")]
    Chi2,
}

impl Column {
    /// Every column, in table order
    pub const ALL: [Column; 12] = [
        Column::FitNumber,
        Column::Wavelength,
        Column::Period,
        Column::Tc,
        Column::ARs,
        Column::Impact,
        Column::Depth,
        Column::Ldcs,
        Column::Ecc,
        Column::Omega,
        Column::ModelName,
        Column::Chi2,
    ];

    /// The column's name in the table header
    pub fn name(&self) -> &'static str {
        match self {
            Column::FitNumber => "fit_number",
            Column::Wavelength => "wavelength",
            Column::Period => "P",
            Column::Tc => "Tc",
            Column::ARs => "a/Rs",
            Column::Impact => "b",
            Column::Depth => "d",
            Column::Ldcs => "ldcs",
            Column::Ecc => "e",
            Column::Omega => "w",
            Column::ModelName => "model_name",
            Column::Chi2 => "chi2",
        }
    }

    /// Names a best-fit parameter may carry for this column, in lookup order.
    ///
    /// Empty for columns that do not come from the parameters.
    pub fn parameter_aliases(&self) -> &'static [&'static str] {
        match self {
            Column::Period => &["P", "per", "period"],
            Column::Tc => &["Tc", "t0"],
            Column::ARs => &["a/Rs", "a", "aRs"],
            Column::Impact => &["b", "impact"],
            Column::Depth => &["d", "depth"],
            Column::Ldcs => &["ldcs", "u"],
            Column::Ecc => &["e", "ecc"],
            Column::Omega => &["w", "omega"],
            Column::FitNumber | Column::Wavelength | Column::ModelName | Column::Chi2 => &[],
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = LcFitError;

    fn from_str(s: &str) -> Result<Self> {
        Column::ALL
            .iter()
            .copied()
            .find(|column| column.name() == s)
            .ok_or_else(|| LcFitError::ColumnNotFound(s.to_string()))
    }
}

/// One cell of the result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(usize),
    Float(f64),
    Floats(Vec<f64>),
    Text(String),
}

impl CellValue {
    /// Equality used when slicing: integers and floats compare numerically and
    /// NaN never matches anything.
    pub fn matches(&self, other: &CellValue) -> bool {
        match (self, other) {
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Int(a), CellValue::Float(b)) | (CellValue::Float(b), CellValue::Int(a)) => {
                *a as f64 == *b
            }
            (CellValue::Float(a), CellValue::Float(b)) => a == b,
            (CellValue::Floats(a), CellValue::Floats(b)) => a == b,
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(x) => write!(f, "{}", x),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Floats(xs) => {
                let items: Vec<String> = xs.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<Vec<f64>> for CellValue {
    fn from(value: Vec<f64>) -> Self {
        CellValue::Floats(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

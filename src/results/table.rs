//! The result table filled by a fitting campaign.

use crate::error::Result;
use crate::fitter::FitOutcome;
use crate::parameters::{ParamValue, ParameterSet};
use crate::results::column::{CellValue, Column};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs::File;
use std::path::Path;

/// Planet-to-star radius ratio; the depth column falls back to its square
const RADIUS_RATIO_PARAM: &str = "rp";

/// One row of the result table, one per successful fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResultRow {
    pub fit_number: usize,
    #[serde(deserialize_with = "nan_if_null")]
    pub wavelength: f64,
    #[serde(rename = "P", deserialize_with = "nan_if_null")]
    pub period: f64,
    #[serde(rename = "Tc", deserialize_with = "nan_if_null")]
    pub tc: f64,
    #[serde(rename = "a/Rs", deserialize_with = "nan_if_null")]
    pub a_rs: f64,
    #[serde(rename = "b", deserialize_with = "nan_if_null")]
    pub impact: f64,
    #[serde(rename = "d", deserialize_with = "nan_if_null")]
    pub depth: f64,
    /// Never empty; `[NaN]` when the fit had no coefficients
    #[serde(deserialize_with = "nans_if_null")]
    pub ldcs: Vec<f64>,
    #[serde(rename = "e", deserialize_with = "nan_if_null")]
    pub ecc: f64,
    #[serde(rename = "w", deserialize_with = "nan_if_null")]
    pub omega: f64,
    pub model_name: String,
    #[serde(deserialize_with = "nan_if_null")]
    pub chi2: f64,
}

impl FitResultRow {
    /// Extract the table schema from a fit outcome.
    ///
    /// Each column is read from the first of its parameter aliases present in
    /// the best-fit parameters. Missing or non-numeric values are NaN. Without a
    /// depth parameter, a radius ratio `rp` gives a depth of `rp²`.
    pub fn from_outcome(fit_number: usize, wavelength: f64, outcome: &FitOutcome) -> Self {
        let params = &outcome.best_fit;
        let number = |column: Column| {
            find_value(params, column)
                .and_then(ParamValue::as_f64)
                .unwrap_or(f64::NAN)
        };

        let ldcs = find_value(params, Column::Ldcs)
            .and_then(ParamValue::to_f64_vec)
            .unwrap_or_default();

        let depth = match find_value(params, Column::Depth) {
            Some(value) => value.as_f64(),
            None => params
                .value(RADIUS_RATIO_PARAM)
                .and_then(ParamValue::as_f64)
                .map(|rp| rp * rp),
        }
        .unwrap_or(f64::NAN);

        Self {
            fit_number,
            wavelength,
            period: number(Column::Period),
            tc: number(Column::Tc),
            a_rs: number(Column::ARs),
            impact: number(Column::Impact),
            depth,
            ldcs: if ldcs.is_empty() { vec![f64::NAN] } else { ldcs },
            ecc: number(Column::Ecc),
            omega: number(Column::Omega),
            model_name: outcome.model_name.clone(),
            chi2: outcome.chi2,
        }
    }

    /// The cell in `column`
    pub fn get(&self, column: Column) -> CellValue {
        match column {
            Column::FitNumber => self.fit_number.into(),
            Column::Wavelength => self.wavelength.into(),
            Column::Period => self.period.into(),
            Column::Tc => self.tc.into(),
            Column::ARs => self.a_rs.into(),
            Column::Impact => self.impact.into(),
            Column::Depth => self.depth.into(),
            Column::Ldcs => self.ldcs.clone().into(),
            Column::Ecc => self.ecc.into(),
            Column::Omega => self.omega.into(),
            Column::ModelName => self.model_name.as_str().into(),
            Column::Chi2 => self.chi2.into(),
        }
    }
}

// serde_json writes NaN as null
fn nan_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

fn nans_if_null<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<f64>, D::Error> {
    let values = Vec::<Option<f64>>::deserialize(deserializer)?;
    Ok(values.into_iter().map(|x| x.unwrap_or(f64::NAN)).collect())
}

fn find_value(params: &ParameterSet, column: Column) -> Option<&ParamValue> {
    column
        .parameter_aliases()
        .iter()
        .find_map(|alias| params.value(alias))
}

/// Fit results, one row per successful fit, in append order
///
/// # Examples
///
/// ```
/// use lcfit_rs::results::FitResultTable;
///
/// let table = FitResultTable::new();
/// assert_eq!(table.next_fit_number(), 0);
/// assert!(table.slice(1.4, "wavelength").unwrap().is_empty());
/// assert!(table.slice(1.4, "radius").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FitResultTable {
    rows: Vec<FitResultRow>,
}

impl FitResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row
    pub fn push(&mut self, row: FitResultRow) {
        self.rows.push(row);
    }

    /// The fit number the next appended row should carry
    pub fn next_fit_number(&self) -> usize {
        self.rows.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[FitResultRow] {
        &self.rows
    }

    /// Rows whose `column` cell equals `value`, in their original order.
    ///
    /// Returns a new table and leaves this one untouched. No match gives an
    /// empty table; a name outside the schema gives
    /// [`LcFitError::ColumnNotFound`](crate::error::LcFitError::ColumnNotFound).
    pub fn slice(&self, value: impl Into<CellValue>, column: &str) -> Result<FitResultTable> {
        let column: Column = column.parse()?;
        let value = value.into();

        Ok(Self {
            rows: self
                .rows
                .iter()
                .filter(|row| row.get(column).matches(&value))
                .cloned()
                .collect(),
        })
    }

    /// Rows for one wavelength channel
    pub fn slice_wavelength(&self, wavelength: f64) -> FitResultTable {
        Self {
            rows: self
                .rows
                .iter()
                .filter(|row| row.wavelength == wavelength)
                .cloned()
                .collect(),
        }
    }

    /// Every cell of one column, in row order
    pub fn column(&self, column: &str) -> Result<Vec<CellValue>> {
        let column: Column = column.parse()?;
        Ok(self.rows.iter().map(|row| row.get(column)).collect())
    }

    /// The table as a JSON array of row objects. NaN cells become `null`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

impl fmt::Display for FitResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| Column::ALL.iter().map(|c| row.get(*c).to_string()).collect())
            .collect();

        let widths: Vec<usize> = Column::ALL
            .iter()
            .enumerate()
            .map(|(i, column)| {
                cells
                    .iter()
                    .map(|row| row[i].len())
                    .fold(column.name().len(), usize::max)
            })
            .collect();

        let header: Vec<String> = Column::ALL
            .iter()
            .zip(&widths)
            .map(|(column, width)| format!("{:>width$}", column.name(), width = width))
            .collect();
        writeln!(f, "{}", header.join("  "))?;

        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:>width$}", cell, width = width))
                .collect();
            writeln!(f, "{}", line.join("  "))?;
        }
        Ok(())
    }
}

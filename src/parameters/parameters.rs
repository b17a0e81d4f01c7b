//! Parameter set implementation
//!
//! [`ParameterSet`] maps parameter names to [`Parameter`]s. Every assignment goes
//! through [`ParameterSet::set`], which normalizes the raw input, validates it,
//! builds a new parameter and appends its snapshot to the set's history.

use crate::error::{LcFitError, Result};
use crate::ldc::LimbDarkeningLaw;
use crate::parameters::io::{self, ParamEntries};
use crate::parameters::parameter::{Parameter, ParameterValues};
use crate::parameters::value::{ParamInput, ParamValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Name of the text parameter that selects the limb-darkening law
pub const LIMB_DARK_PARAM: &str = "limb_dark";

/// How much of the assignment history a [`ParameterSet`] keeps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryRetention {
    /// Keep every snapshot ever recorded
    #[default]
    Unbounded,
    /// Keep only the most recent `n` snapshots
    KeepLast(usize),
}

/// A collection of named parameters with an append-only assignment history
///
/// # Examples
///
/// ```
/// use lcfit_rs::parameters::{ParameterSet, ParamValue};
///
/// let mut params = ParameterSet::new();
/// params.set("a", 20.0).unwrap();
/// params.set("inc", (89.0, false)).unwrap();
/// params.set("limb_dark", "quadratic").unwrap();
///
/// assert_eq!(params.get("a").unwrap().value(), &ParamValue::Number(20.0));
/// assert!(!params.get("inc").unwrap().vary());
/// assert_eq!(params.history().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    /// Map of parameter names to Parameter objects
    params: HashMap<String, Parameter>,

    /// Parameter names in first-assignment order
    order: Vec<String>,

    /// Snapshots of every parameter assigned, oldest first
    history: Vec<ParameterValues>,

    retention: HistoryRetention,

    /// Number of snapshots ever recorded, including pruned ones
    total_recorded: usize,
}

impl ParameterSet {
    /// Create a new empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the history retention policy, pruning immediately if needed
    pub fn with_retention(mut self, retention: HistoryRetention) -> Self {
        self.retention = retention;
        self.prune_history();
        self
    }

    /// Build a parameter set from an optional file plus explicit values.
    ///
    /// The file format is chosen by extension (`.txt` or `.json`). A path that
    /// does not exist contributes nothing. Explicit `overrides` win over file
    /// values of the same name.
    ///
    /// # Examples
    ///
    /// ```
    /// use lcfit_rs::parameters::{ParameterSet, ParamInput};
    /// use std::path::Path;
    ///
    /// let params = ParameterSet::load(
    ///     Some(Path::new("does/not/exist.json")),
    ///     vec![("ecc", ParamInput::from(0.1))],
    /// )
    /// .unwrap();
    /// assert_eq!(params.len(), 1);
    /// ```
    pub fn load<I, S>(file: Option<&Path>, overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ParamInput)>,
        S: Into<String>,
    {
        let base = match file {
            Some(path) => io::read_param_file(path)?.unwrap_or_default(),
            None => Vec::new(),
        };
        let overrides: ParamEntries = overrides
            .into_iter()
            .map(|(name, input)| (name.into(), input))
            .collect();

        Self::from_entries(io::merge_entries(base, overrides))
    }

    /// Build a parameter set from the contents of a JSON parameter file
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_entries(io::parse_json(json, Path::new("<string>"))?)
    }

    /// Build a parameter set from the contents of a text parameter file
    pub fn from_text_str(text: &str) -> Result<Self> {
        Self::from_entries(io::parse_text(text, Path::new("<string>"))?)
    }

    fn from_entries(entries: ParamEntries) -> Result<Self> {
        let mut params = Self::new();
        for (name, input) in entries {
            params.set(&name, input)?;
        }
        Ok(params)
    }

    /// Normalize a raw input into the positional arguments of a parameter.
    ///
    /// A bare scalar becomes a one-element tuple and a list becomes a tuple of
    /// the same items; a tuple is kept as is. Anything else (null, mappings) is
    /// rejected with [`LcFitError::ParameterType`].
    ///
    /// ```
    /// use lcfit_rs::parameters::{ParameterSet, ParamInput};
    ///
    /// let args = ParameterSet::normalize("a", ParamInput::from(5)).unwrap();
    /// assert_eq!(args, vec![ParamInput::from(5)]);
    /// ```
    pub fn normalize(name: &str, input: ParamInput) -> Result<Vec<ParamInput>> {
        match input {
            ParamInput::Scalar(_) => Ok(vec![input]),
            ParamInput::List(items) | ParamInput::Tuple(items) => Ok(items),
            other => Err(LcFitError::parameter_type(
                name,
                format!("a {} cannot be normalized to a tuple", other.describe()),
            )),
        }
    }

    /// Assign a parameter.
    ///
    /// The input is normalized with [`normalize`](Self::normalize) and turned
    /// into a new [`Parameter`] that replaces any existing one of the same name.
    /// Replacing requires the new value to have the same type family as the
    /// old one. Every successful call appends the new parameter's snapshot to
    /// the history; a failed call changes nothing.
    pub fn set(&mut self, name: &str, input: impl Into<ParamInput>) -> Result<&Parameter> {
        let args = Self::normalize(name, input.into())?;
        let param = Parameter::from_args(name, args)?;
        self.store(param)
    }

    /// Assign an already built parameter, under its own name
    pub fn add(&mut self, param: Parameter) -> Result<&Parameter> {
        self.store(param)
    }

    fn store(&mut self, param: Parameter) -> Result<&Parameter> {
        let name = param.name().to_string();

        match self.params.get(&name) {
            Some(existing) if existing.kind() != param.kind() => {
                return Err(LcFitError::parameter_type(
                    &name,
                    format!(
                        "existing {} value cannot be replaced by a {}",
                        existing.kind(),
                        param.kind()
                    ),
                ));
            }
            Some(_) => {}
            None => self.order.push(name.clone()),
        }

        self.history.push(param.values());
        self.total_recorded += 1;
        self.prune_history();

        self.params.insert(name.clone(), param);
        self.try_get(&name)
    }

    fn prune_history(&mut self) {
        if let HistoryRetention::KeepLast(keep) = self.retention {
            if self.history.len() > keep {
                let excess = self.history.len() - keep;
                self.history.drain(..excess);
            }
        }
    }

    /// Get a parameter by name
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.get(name)
    }

    /// Get a parameter by name, failing with [`LcFitError::ParameterNotFound`]
    pub fn try_get(&self, name: &str) -> Result<&Parameter> {
        self.params
            .get(name)
            .ok_or_else(|| LcFitError::ParameterNotFound(name.to_string()))
    }

    /// Raw value of a parameter
    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.get(name).map(Parameter::value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameter names in first-assignment order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Iterate over parameters in first-assignment order
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.order.iter().filter_map(move |name| self.params.get(name))
    }

    /// Parameters that are free during fitting
    pub fn varying(&self) -> Vec<&Parameter> {
        self.iter().filter(|p| p.vary()).collect()
    }

    /// Parameters that are held fixed during fitting
    pub fn fixed(&self) -> Vec<&Parameter> {
        self.iter().filter(|p| !p.vary()).collect()
    }

    /// Snapshots of every assignment, oldest first
    pub fn history(&self) -> &[ParameterValues] {
        &self.history
    }

    /// Number of successful assignments over the set's lifetime
    pub fn total_recorded(&self) -> usize {
        self.total_recorded
    }

    pub fn retention(&self) -> HistoryRetention {
        self.retention
    }

    /// The limb-darkening law named by the `limb_dark` parameter, if present
    pub fn limb_darkening_law(&self) -> Result<Option<LimbDarkeningLaw>> {
        match self.get(LIMB_DARK_PARAM) {
            None => Ok(None),
            Some(param) => match param.value() {
                ParamValue::Text(name) => name.parse().map(Some),
                other => Err(LcFitError::parameter_type(
                    LIMB_DARK_PARAM,
                    format!("expected a string, got {}", other.kind()),
                )),
            },
        }
    }

    /// JSON object `name -> [value, vary, min, max]` that [`from_json_str`](Self::from_json_str)
    /// reads back. Trailing unset bounds are left out; an unset `min` before a
    /// set `max` is written as `null`.
    ///
    /// JSON has no NaN or infinity, so a non-finite number anywhere in a
    /// parameter is a [`LcFitError::ParameterType`] error.
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        let mut map = serde_json::Map::new();
        for param in self.iter() {
            let name = param.name();
            let mut args = vec![
                json_value(name, param.value())?,
                serde_json::Value::Bool(param.vary()),
            ];
            match (param.min(), param.max()) {
                (None, None) => {}
                (min, max) => {
                    args.push(json_or_null(name, min)?);
                    if max.is_some() {
                        args.push(json_or_null(name, max)?);
                    }
                }
            }
            map.insert(name.to_string(), serde_json::Value::Array(args));
        }
        Ok(serde_json::Value::Object(map))
    }

    /// Save parameters to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json_value()?)?)
    }

    /// Save parameters to a JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = self.to_json_value()?;
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, &json)?;
        Ok(())
    }
}

fn json_value(name: &str, value: &ParamValue) -> Result<serde_json::Value> {
    match value {
        ParamValue::Number(x) if !x.is_finite() => Err(LcFitError::parameter_type(
            name,
            format!("cannot write non-finite number {} to JSON", x),
        )),
        ParamValue::Sequence(items) => items
            .iter()
            .map(|item| json_value(name, item))
            .collect::<Result<Vec<_>>>()
            .map(serde_json::Value::Array),
        other => Ok(serde_json::to_value(other)?),
    }
}

fn json_or_null(name: &str, value: Option<&ParamValue>) -> Result<serde_json::Value> {
    value.map_or(Ok(serde_json::Value::Null), |v| json_value(name, v))
}

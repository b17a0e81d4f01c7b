//! Parameter file ingestion
//!
//! Two formats are understood, selected by file extension:
//!
//! - `.txt`: one `name value` pair per line, whitespace separated, numeric
//!   values only. Blank lines and `#` comments are skipped.
//! - `.json`: a top-level object mapping parameter names to values. Values
//!   follow the same normalization rules as [`ParameterSet::set`](super::ParameterSet::set).
//!
//! Both parsers produce an ordered list of `(name, input)` pairs.

use crate::error::{LcFitError, Result};
use crate::parameters::value::ParamInput;
use log::debug;
use nom::{
    bytes::complete::is_not,
    character::complete::{space0, space1},
    number::complete::double,
    IResult, Parser,
};
use std::fs;
use std::path::Path;

/// Ordered `(name, input)` pairs, as read from a file or supplied as overrides
pub type ParamEntries = Vec<(String, ParamInput)>;

/// Parameter file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamFormat {
    Text,
    Json,
}

impl ParamFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("txt") => Some(ParamFormat::Text),
            Some("json") => Some(ParamFormat::Json),
            _ => None,
        }
    }
}

/// Read a parameter file.
///
/// A path that does not exist yields `Ok(None)`: a missing file simply
/// contributes no parameters. A file that exists but has an unrecognized
/// extension or malformed contents is a [`LcFitError::FileFormat`] error.
pub fn read_param_file(path: &Path) -> Result<Option<ParamEntries>> {
    if !path.exists() {
        debug!(
            "parameter file {} does not exist, using explicit values only",
            path.display()
        );
        return Ok(None);
    }

    let format = ParamFormat::from_path(path).ok_or_else(|| {
        LcFitError::file_format(path, "unsupported extension (expected .txt or .json)")
    })?;

    let contents = fs::read_to_string(path)?;
    let entries = match format {
        ParamFormat::Text => parse_text(&contents, path)?,
        ParamFormat::Json => parse_json(&contents, path)?,
    };

    debug!("read {} parameters from {}", entries.len(), path.display());
    Ok(Some(entries))
}

/// Parse the whitespace-delimited text format
pub fn parse_text(contents: &str, origin: &Path) -> Result<ParamEntries> {
    let mut entries = Vec::new();

    for (lineno, raw_line) in contents.lines().enumerate() {
        let line = match raw_line.find('#') {
            Some(idx) => &raw_line[..idx],
            None => raw_line,
        };
        if line.trim().is_empty() {
            continue;
        }

        let (rest, (name, value)) = name_value_pair(line).map_err(|_| {
            LcFitError::file_format(
                origin,
                format!("line {}: expected `name value`, got {:?}", lineno + 1, raw_line),
            )
        })?;

        if !rest.trim().is_empty() {
            return Err(LcFitError::file_format(
                origin,
                format!("line {}: unexpected trailing data {:?}", lineno + 1, rest.trim()),
            ));
        }

        entries.push((name, ParamInput::from(value)));
    }

    Ok(entries)
}

/// Parse the JSON format; the document must be an object
pub fn parse_json(contents: &str, origin: &Path) -> Result<ParamEntries> {
    let document: serde_json::Value = serde_json::from_str(contents)
        .map_err(|err| LcFitError::file_format(origin, err.to_string()))?;

    match document {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(name, value)| (name, ParamInput::from(value)))
            .collect()),
        other => Err(LcFitError::file_format(
            origin,
            format!("expected a JSON object of parameters, got {}", json_type_name(&other)),
        )),
    }
}

/// Layer `overrides` on top of `base`.
///
/// An override of an existing name replaces the value in place; new names are
/// appended in the order given.
pub fn merge_entries(mut base: ParamEntries, overrides: ParamEntries) -> ParamEntries {
    for (name, input) in overrides {
        match base.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = input,
            None => base.push((name, input)),
        }
    }
    base
}

fn name_value_pair(input: &str) -> IResult<&str, (String, f64)> {
    let parsed: IResult<&str, (&str, &str, &str, f64)> =
        (space0, is_not(" \t\r\n"), space1, double).parse(input);
    let (input, (_, name, _, value)) = parsed?;
    Ok((input, (name.to_string(), value)))
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

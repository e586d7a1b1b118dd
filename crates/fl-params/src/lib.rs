//! fl-params: run parameters from YAML mappings.
//!
//! Automation scripts keep their knobs (stream names, setpoints, cell
//! references) in a flat-ish YAML file next to the script. This crate loads
//! such a file into a [`Params`] mapping with typed accessors.

pub mod schema;

pub use schema::{ParamValue, Params};

pub type ParamsResult<T> = Result<T, ParamsError>;

#[derive(thiserror::Error, Debug)]
pub enum ParamsError {
    #[error("Parameter file is not a mapping (found {found})")]
    NotAMapping { found: &'static str },

    #[error("Missing parameter: {key}")]
    Missing { key: String },

    #[error("Parameter '{key}' is not a {expected} (found {found})")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub fn load_params(path: &std::path::Path) -> ParamsResult<Params> {
    let content = std::fs::read_to_string(path)?;
    parse_params(&content)
}

/// Parse a YAML document into parameters.
///
/// The document must be a mapping at the top level. An empty or null
/// document is treated as an empty mapping.
pub fn parse_params(content: &str) -> ParamsResult<Params> {
    if content.trim().is_empty() {
        return Ok(Params::default());
    }
    let value: ParamValue = serde_yaml::from_str(content)?;
    match value {
        ParamValue::Map(entries) => Ok(Params(entries)),
        ParamValue::Null => Ok(Params::default()),
        other => Err(ParamsError::NotAMapping {
            found: other.kind(),
        }),
    }
}

pub fn save_params(path: &std::path::Path, params: &Params) -> ParamsResult<()> {
    let content = serde_yaml::to_string(params)?;
    std::fs::write(path, content)?;
    Ok(())
}

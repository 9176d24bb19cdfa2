use std::fs;
use std::path::Path;

use crate::contract::Contract;
use crate::error::{ParseError, SpecError};
use crate::lockfile::Lockfile;
use crate::options::ValidateOptions;
use crate::report::Checked;
use crate::tree::Node;

/// Supported document encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
    Yaml,
    /// Unrecognised extension: JSON is tried first, then TOML.
    Unknown,
}

impl DocumentFormat {
    pub fn detect_from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Unknown,
        }
    }
}

fn parse_json(input: &str) -> Result<Node, serde_json::Error> {
    serde_json::from_str::<serde_json::Value>(input).map(Node::from)
}

fn parse_toml(input: &str) -> Result<Node, toml::de::Error> {
    toml::from_str::<toml::Table>(input).map(|table| Node::from(toml::Value::Table(table)))
}

/// Decodes text into a document tree without validating it.
pub fn parse_tree(input: &str, format: DocumentFormat) -> Result<Node, ParseError> {
    match format {
        DocumentFormat::Json => parse_json(input).map_err(ParseError::Json),
        DocumentFormat::Toml => parse_toml(input).map_err(ParseError::Toml),
        DocumentFormat::Yaml => serde_yaml::from_str::<serde_yaml::Value>(input)
            .map(Node::from)
            .map_err(ParseError::Yaml),
        DocumentFormat::Unknown => match parse_json(input) {
            Ok(node) => Ok(node),
            Err(json) => parse_toml(input).map_err(|toml| ParseError::Both { json, toml }),
        },
    }
}

pub fn load_tree<P: AsRef<Path>>(path: P) -> Result<Node, SpecError> {
    let path = path.as_ref();
    let format = DocumentFormat::detect_from_path(path);
    let content = fs::read_to_string(path).map_err(|source| SpecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let node = parse_tree(&content, format)?;
    tracing::debug!(path = %path.display(), ?format, "document decoded");
    Ok(node)
}

/// Reads and validates a contract document.
pub fn load_contract<P: AsRef<Path>>(
    path: P,
    options: &ValidateOptions,
) -> Result<Checked<Contract>, SpecError> {
    let node = load_tree(path)?;
    Ok(Contract::validate(&node, options)?)
}

pub fn load_lockfile<P: AsRef<Path>>(path: P) -> Result<Checked<Lockfile>, SpecError> {
    let node = load_tree(path)?;
    Ok(Lockfile::validate(&node)?)
}

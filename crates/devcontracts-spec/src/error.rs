use std::path::PathBuf;

use thiserror::Error;

use crate::report::ValidationReport;

/// Errors raised while loading a document or options file.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Invalid(ValidationReport),
    #[error("invalid options: {0}")]
    Config(String),
}

impl From<ValidationReport> for SpecError {
    fn from(report: ValidationReport) -> Self {
        SpecError::Invalid(report)
    }
}

impl SpecError {
    /// The validation report, when the document decoded but did not validate.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            SpecError::Invalid(report) => Some(report),
            _ => None,
        }
    }
}

/// Text could not be decoded into a document tree.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse document as JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("failed to parse document as TOML: {0}")]
    Toml(#[source] toml::de::Error),
    #[error("failed to parse document as YAML: {0}")]
    Yaml(#[source] serde_yaml::Error),
    #[error(
        "failed to parse document as JSON ({json}) and TOML ({toml}); specify the format explicitly"
    )]
    Both {
        #[source]
        json: serde_json::Error,
        toml: toml::de::Error,
    },
}

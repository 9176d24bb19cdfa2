use std::fmt;
use std::path::Path;
use std::str::FromStr;

use jsonschema::{validator_for, Validator};
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// Environment variable that overrides [`ValidateOptions::edge_policy`].
pub const EDGE_POLICY_ENV: &str = "DEVCONTRACTS_EDGE_POLICY";

/// How `depends_on` / `affects` entries naming a missing structure key are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    Ignore,
    #[default]
    Warn,
    Deny,
}

impl FromStr for EdgePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(EdgePolicy::Ignore),
            "warn" => Ok(EdgePolicy::Warn),
            "deny" => Ok(EdgePolicy::Deny),
            other => Err(format!(
                "unknown edge policy '{other}' (expected ignore, warn or deny)"
            )),
        }
    }
}

impl fmt::Display for EdgePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EdgePolicy::Ignore => "ignore",
            EdgePolicy::Warn => "warn",
            EdgePolicy::Deny => "deny",
        })
    }
}

/// Caller-side validation settings. Document-level policy lives in `[rules]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ValidateOptions {
    /// Reporting for dangling dependency edges.
    #[serde(default)]
    pub edge_policy: EdgePolicy,
    /// Fail validation when any warning is produced.
    #[serde(default)]
    pub warnings_as_errors: bool,
}

static OPTIONS_SCHEMA: Lazy<Validator> = Lazy::new(|| {
    let schema = schemars::schema_for!(ValidateOptions);
    let schema_value = serde_json::to_value(&schema).expect("schema value");
    validator_for(&schema_value).expect("valid schema")
});

impl ValidateOptions {
    /// Loads options from a TOML file, checking it against the generated schema first.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SpecError> {
        let raw: toml::Value = toml::from_str(content).map_err(crate::error::ParseError::Toml)?;
        let json_value = serde_json::to_value(&raw).map_err(crate::error::ParseError::Json)?;
        let validation_errors: Vec<_> = OPTIONS_SCHEMA
            .iter_errors(&json_value)
            .map(|e| e.to_string())
            .collect();
        if !validation_errors.is_empty() {
            return Err(SpecError::Config(validation_errors.join(", ")));
        }
        let options: Self = toml::from_str(content).map_err(crate::error::ParseError::Toml)?;
        Ok(options)
    }

    /// Applies `DEVCONTRACTS_EDGE_POLICY` when set.
    pub fn with_env_overrides(mut self) -> Result<Self, SpecError> {
        if let Ok(raw) = std::env::var(EDGE_POLICY_ENV) {
            self.edge_policy = raw.parse().map_err(SpecError::Config)?;
        }
        Ok(self)
    }
}

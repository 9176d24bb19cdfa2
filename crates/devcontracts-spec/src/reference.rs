use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::gen::SchemaGenerator;
use schemars::schema::{
    InstanceType, Metadata, Schema, SchemaObject, StringValidation, SubschemaValidation,
};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::report::{FieldPath, IssueKind, ValidationReport};
use crate::tree::Node;

const PATH_PREFIX_PATTERN: &str = r"^(\.?/|\.\./|/|[A-Za-z]:\\)";

static PATH_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(PATH_PREFIX_PATTERN).expect("ref path regex"));

/// Which accepted form a [`Ref`] was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Url,
    /// `./…` or `../…`
    Relative,
    /// `/…`
    Absolute,
    /// `C:\…`
    WindowsAbsolute,
}

/// Reference to a contract or resource: an absolute URL or a prefixed filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ref {
    raw: String,
    kind: RefKind,
}

impl Ref {
    pub fn parse(raw: &str) -> Result<Self, IssueKind> {
        let kind = classify(raw).ok_or_else(|| IssueKind::InvalidReference {
            value: raw.to_string(),
        })?;
        Ok(Self {
            raw: raw.to_string(),
            kind,
        })
    }

    pub(crate) fn check(
        node: &Node,
        field: &FieldPath,
        report: &mut ValidationReport,
    ) -> Option<Self> {
        let Node::String(raw) = node else {
            report.push_error(
                field.clone(),
                IssueKind::InvalidType {
                    expected: "string",
                    received: node.shape(),
                },
            );
            return None;
        };
        match Self::parse(raw) {
            Ok(reference) => Some(reference),
            Err(kind) => {
                report.push_error(field.clone(), kind);
                None
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> RefKind {
        self.kind
    }

    pub fn is_url(&self) -> bool {
        self.kind == RefKind::Url
    }
}

fn classify(raw: &str) -> Option<RefKind> {
    if PATH_PREFIX_RE.is_match(raw) {
        let kind = if raw.starts_with("./") || raw.starts_with("../") {
            RefKind::Relative
        } else if raw.starts_with('/') {
            RefKind::Absolute
        } else {
            RefKind::WindowsAbsolute
        };
        return Some(kind);
    }
    Url::parse(raw).ok().map(|_| RefKind::Url)
}

impl FromStr for Ref {
    type Err = IssueKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Ref {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Ref {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for Ref {
    fn schema_name() -> String {
        "Ref".into()
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        let url = SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            format: Some("uri".into()),
            ..Default::default()
        };
        let path = SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            string: Some(Box::new(StringValidation {
                pattern: Some(PATH_PREFIX_PATTERN.into()),
                ..Default::default()
            })),
            ..Default::default()
        };
        SchemaObject {
            metadata: Some(Box::new(Metadata {
                description: Some(
                    "Absolute URL, or a path starting with '/', './', '../' or a Windows drive prefix."
                        .into(),
                ),
                ..Default::default()
            })),
            subschemas: Some(Box::new(SubschemaValidation {
                any_of: Some(vec![url.into(), path.into()]),
                ..Default::default()
            })),
            ..Default::default()
        }
        .into()
    }
}

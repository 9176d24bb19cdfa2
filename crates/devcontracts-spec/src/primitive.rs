use std::fmt;

use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Metadata, Schema, SchemaObject};
use schemars::JsonSchema;

use crate::report::{finish, FieldPath, IssueKind, ValidationReport};
use crate::tree::Node;

/// Scalar value a token may take.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenPrimitive {
    String(String),
    /// Always finite.
    Number(f64),
    Bool(bool),
    Null,
}

impl TokenPrimitive {
    /// Returns `None` for NaN and infinities.
    pub fn number(value: f64) -> Option<Self> {
        value.is_finite().then_some(TokenPrimitive::Number(value))
    }

    pub fn parse(node: &Node) -> Result<Self, ValidationReport> {
        finish(|field, report| Self::check(node, field, report), false).map(|c| c.value)
    }

    pub(crate) fn check(
        node: &Node,
        field: &FieldPath,
        report: &mut ValidationReport,
    ) -> Option<Self> {
        match node {
            Node::String(value) => Some(TokenPrimitive::String(value.clone())),
            Node::Bool(value) => Some(TokenPrimitive::Bool(*value)),
            Node::Null => Some(TokenPrimitive::Null),
            Node::Number(value) if value.is_finite() => Some(TokenPrimitive::Number(*value)),
            other => {
                report.push_error(
                    field.clone(),
                    IssueKind::InvalidTokenType {
                        received: other.shape(),
                    },
                );
                None
            }
        }
    }

    pub fn to_node(&self) -> Node {
        match self {
            TokenPrimitive::String(value) => Node::String(value.clone()),
            TokenPrimitive::Number(value) => Node::Number(*value),
            TokenPrimitive::Bool(value) => Node::Bool(*value),
            TokenPrimitive::Null => Node::Null,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenPrimitive::String(value) => Some(value),
            _ => None,
        }
    }
}

tree_serde!(TokenPrimitive);

impl fmt::Display for TokenPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_node().describe())
    }
}

impl From<&str> for TokenPrimitive {
    fn from(value: &str) -> Self {
        TokenPrimitive::String(value.to_string())
    }
}

impl From<String> for TokenPrimitive {
    fn from(value: String) -> Self {
        TokenPrimitive::String(value)
    }
}

impl From<bool> for TokenPrimitive {
    fn from(value: bool) -> Self {
        TokenPrimitive::Bool(value)
    }
}

impl JsonSchema for TokenPrimitive {
    fn schema_name() -> String {
        "TokenPrimitive".into()
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(
                vec![
                    InstanceType::String,
                    InstanceType::Number,
                    InstanceType::Boolean,
                    InstanceType::Null,
                ]
                .into(),
            ),
            metadata: Some(Box::new(Metadata {
                description: Some("A token value: string, number, boolean or null.".into()),
                ..Default::default()
            })),
            ..Default::default()
        }
        .into()
    }
}

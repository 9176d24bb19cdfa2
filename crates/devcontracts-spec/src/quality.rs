use std::collections::BTreeMap;

use schemars::JsonSchema;

use crate::check::{expect_map, expect_object, expect_string, expect_string_list, optional_field};
use crate::report::{FieldPath, ValidationReport};
use crate::tree::Node;

/// `[quality]`: code quality tool configuration. Open at every level.
#[derive(Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct QualitySection {
    /// Linter name to its configuration.
    pub lint: Option<BTreeMap<String, LinterQuality>>,
    #[schemars(flatten)]
    pub extra: BTreeMap<String, Node>,
}

/// `[quality.lint.<name>]`
#[derive(Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct LinterQuality {
    /// Tools the linter needs (e.g. a runner).
    pub depends: Option<Vec<String>>,
    pub version: Option<String>,
    #[schemars(flatten)]
    pub extra: BTreeMap<String, Node>,
}

fn extras(members: &BTreeMap<String, Node>, known: &[&str]) -> BTreeMap<String, Node> {
    members
        .iter()
        .filter(|(key, value)| !known.contains(&key.as_str()) && !value.is_undefined())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

impl QualitySection {
    pub(crate) fn check(
        node: &Node,
        field: &FieldPath,
        report: &mut ValidationReport,
    ) -> Option<Self> {
        let members = expect_object(node, field, report)?;
        let lint = optional_field(members, "lint", field, report, |node, field, report| {
            expect_map(node, field, report, LinterQuality::check)
        });
        Some(Self {
            lint: lint?,
            extra: extras(members, &["lint"]),
        })
    }

    pub fn to_node(&self) -> Node {
        let mut map = self.extra.clone();
        if let Some(lint) = &self.lint {
            map.insert(
                "lint".into(),
                Node::Object(
                    lint.iter()
                        .map(|(name, linter)| (name.clone(), linter.to_node()))
                        .collect(),
                ),
            );
        }
        Node::Object(map)
    }
}

impl LinterQuality {
    fn check(node: &Node, field: &FieldPath, report: &mut ValidationReport) -> Option<Self> {
        let members = expect_object(node, field, report)?;
        let depends = optional_field(members, "depends", field, report, expect_string_list);
        let version = optional_field(members, "version", field, report, expect_string);
        Some(Self {
            depends: depends?,
            version: version?,
            extra: extras(members, &["depends", "version"]),
        })
    }

    pub fn to_node(&self) -> Node {
        let mut map = self.extra.clone();
        if let Some(depends) = &self.depends {
            map.insert(
                "depends".into(),
                Node::Array(depends.iter().map(|d| Node::from(d.as_str())).collect()),
            );
        }
        if let Some(version) = &self.version {
            map.insert("version".into(), Node::from(version.as_str()));
        }
        Node::Object(map)
    }
}

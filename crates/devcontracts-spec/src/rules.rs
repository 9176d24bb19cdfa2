use std::collections::BTreeMap;

use schemars::JsonSchema;

use crate::check::{expect_bool, expect_object, optional, optional_field};
use crate::report::{finish, FieldPath, ValidationReport};
use crate::tree::Node;

/// `[rules]`: validation policy. Unknown rule categories are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct RulesSection {
    /// Rules for `[structure]` validation.
    pub structure: Option<StructureRules>,
    #[schemars(flatten)]
    pub extra: BTreeMap<String, Node>,
}

/// `[rules.structure]`
#[derive(Debug, Clone, PartialEq, JsonSchema)]
#[schemars(default)]
pub struct StructureRules {
    /// Declared directories may be empty on disk. Enforced by the filesystem scan.
    pub allow_empty_directory: bool,
    /// Check `schema_ref` names against `[schemas]`.
    pub validate_schema: bool,
    #[schemars(flatten)]
    pub extra: BTreeMap<String, Node>,
}

impl Default for StructureRules {
    fn default() -> Self {
        Self {
            allow_empty_directory: false,
            validate_schema: true,
            extra: BTreeMap::new(),
        }
    }
}

impl RulesSection {
    pub fn parse(node: &Node) -> Result<Self, ValidationReport> {
        finish(|field, report| Self::check(node, field, report), false).map(|c| c.value)
    }

    pub(crate) fn check(
        node: &Node,
        field: &FieldPath,
        report: &mut ValidationReport,
    ) -> Option<Self> {
        let members = expect_object(node, field, report)?;
        let structure = optional_field(members, "structure", field, report, StructureRules::check);
        let extra = members
            .iter()
            .filter(|(key, value)| key.as_str() != "structure" && !value.is_undefined())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Some(Self {
            structure: structure?,
            extra,
        })
    }

    /// Effective structure rules, with defaults when the section is absent.
    pub fn structure_rules(&self) -> StructureRules {
        self.structure.clone().unwrap_or_default()
    }

    pub fn to_node(&self) -> Node {
        let mut map = self.extra.clone();
        if let Some(structure) = &self.structure {
            map.insert("structure".into(), structure.to_node());
        }
        Node::Object(map)
    }
}

impl StructureRules {
    pub(crate) fn check(
        node: &Node,
        field: &FieldPath,
        report: &mut ValidationReport,
    ) -> Option<Self> {
        let members = expect_object(node, field, report)?;
        let defaults = Self::default();
        let allow_empty_directory = match optional(members, "allow_empty_directory") {
            None => Some(defaults.allow_empty_directory),
            Some(value) => expect_bool(value, &field.key("allow_empty_directory"), report),
        };
        let validate_schema = match optional(members, "validate_schema") {
            None => Some(defaults.validate_schema),
            Some(value) => expect_bool(value, &field.key("validate_schema"), report),
        };
        let extra = members
            .iter()
            .filter(|(key, value)| {
                !matches!(key.as_str(), "allow_empty_directory" | "validate_schema")
                    && !value.is_undefined()
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Some(Self {
            allow_empty_directory: allow_empty_directory?,
            validate_schema: validate_schema?,
            extra,
        })
    }

    pub fn to_node(&self) -> Node {
        let mut map = self.extra.clone();
        map.insert(
            "allow_empty_directory".into(),
            Node::Bool(self.allow_empty_directory),
        );
        map.insert("validate_schema".into(), Node::Bool(self.validate_schema));
        Node::Object(map)
    }
}

tree_serde!(RulesSection);

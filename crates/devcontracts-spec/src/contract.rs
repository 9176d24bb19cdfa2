//! The contract document (`contracts.toml`).
//!
//! The root is a closed record: every accepted key is listed in [`ROOT_KEYS`] and
//! anything else is rejected, so new sections require a format change. Extension
//! happens inside `metadata`, `[rules]`, `[quality]` and structure entries instead.

use std::collections::BTreeMap;

use schemars::JsonSchema;

use crate::check::{
    expect_map, expect_object, expect_string, expect_version, optional, optional_field,
    reject_unknown_keys, required,
};
use crate::options::ValidateOptions;
use crate::primitive::TokenPrimitive;
use crate::quality::QualitySection;
use crate::reference::Ref;
use crate::report::{finish, Checked, FieldPath, ValidationReport};
use crate::rules::RulesSection;
use crate::structure::{StructureContext, StructureSection};
use crate::tree::Node;
use crate::version::FormatVersion;

pub const ROOT_KEYS: &[&str] = &[
    "schemaVersion",
    "schema",
    "metadata",
    "contracts",
    "tokens",
    "schemas",
    "rules",
    "structure",
    "quality",
    "tasks",
];

/// One named external contract pulled into the document.
#[derive(Debug, Clone, PartialEq, Eq, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct ContractEntry {
    /// Reference (URL or path) to the contract definition.
    #[schemars(rename = "ref")]
    pub reference: Ref,
    /// A brief description of the contract.
    pub description: String,
}

impl ContractEntry {
    pub fn new(reference: Ref, description: impl Into<String>) -> Self {
        Self {
            reference,
            description: description.into(),
        }
    }

    pub fn parse(node: &Node) -> Result<Self, ValidationReport> {
        finish(|field, report| Self::check(node, field, report), false).map(|c| c.value)
    }

    pub(crate) fn check(
        node: &Node,
        field: &FieldPath,
        report: &mut ValidationReport,
    ) -> Option<Self> {
        let members = expect_object(node, field, report)?;
        reject_unknown_keys(members, &["ref", "description"], field, report);
        let reference = required(members, "ref", field, report)
            .and_then(|value| Ref::check(value, &field.key("ref"), report));
        let description = required(members, "description", field, report)
            .and_then(|value| expect_string(value, &field.key("description"), report));
        Some(Self {
            reference: reference?,
            description: description?,
        })
    }

    pub fn to_node(&self) -> Node {
        Node::object([
            ("ref", Node::from(self.reference.as_str())),
            ("description", Node::from(self.description.as_str())),
        ])
    }
}

tree_serde!(ContractEntry);

/// A validated contract document.
#[derive(Debug, Clone, PartialEq, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct Contract {
    /// Format revision of this document. Always 1.
    #[schemars(rename = "schemaVersion")]
    pub schema_version: FormatVersion,
    /// Meta-schema that validates this document itself.
    pub schema: Option<Ref>,
    /// Arbitrary key-value metadata for the project.
    pub metadata: BTreeMap<String, Node>,
    /// Definitions of individual contracts.
    pub contracts: BTreeMap<String, ContractEntry>,
    /// Named primitive tokens (string, number, boolean, null).
    pub tokens: Option<BTreeMap<String, TokenPrimitive>>,
    /// Reusable schema definitions, addressed by `schema_ref`.
    pub schemas: Option<BTreeMap<String, Ref>>,
    pub rules: Option<RulesSection>,
    /// Expected project file structure, keyed by path relative to the project root.
    pub structure: Option<StructureSection>,
    pub quality: Option<QualitySection>,
    /// Named task commands.
    pub tasks: Option<BTreeMap<String, String>>,
}

impl Contract {
    /// An empty document: no imports, no metadata.
    pub fn new() -> Self {
        Self {
            schema_version: FormatVersion,
            schema: None,
            metadata: BTreeMap::new(),
            contracts: BTreeMap::new(),
            tokens: None,
            schemas: None,
            rules: None,
            structure: None,
            quality: None,
            tasks: None,
        }
    }

    /// Validates with default options and drops warnings.
    pub fn parse(node: &Node) -> Result<Self, ValidationReport> {
        Self::validate(node, &ValidateOptions::default()).map(Checked::into_inner)
    }

    pub fn validate(
        node: &Node,
        options: &ValidateOptions,
    ) -> Result<Checked<Self>, ValidationReport> {
        let result = finish(
            |field, report| Self::check(node, field, options, report),
            options.warnings_as_errors,
        );
        match &result {
            Ok(checked) => tracing::debug!(
                warnings = checked.warnings.len(),
                contracts = checked.value.contracts.len(),
                "contract validated"
            ),
            Err(report) => tracing::debug!(errors = report.errors.len(), "contract rejected"),
        }
        result
    }

    fn check(
        node: &Node,
        field: &FieldPath,
        options: &ValidateOptions,
        report: &mut ValidationReport,
    ) -> Option<Self> {
        let members = expect_object(node, field, report)?;
        reject_unknown_keys(members, ROOT_KEYS, field, report);

        let version_ok = required(members, "schemaVersion", field, report)
            .is_some_and(|value| expect_version(value, &field.key("schemaVersion"), report));
        let schema = optional_field(members, "schema", field, report, Ref::check);
        let metadata = required(members, "metadata", field, report)
            .and_then(|value| expect_object(value, &field.key("metadata"), report))
            .cloned();
        let contracts = required(members, "contracts", field, report).and_then(|value| {
            expect_map(value, &field.key("contracts"), report, ContractEntry::check)
        });
        let tokens = optional_field(members, "tokens", field, report, |node, field, report| {
            expect_map(node, field, report, TokenPrimitive::check)
        });
        let schemas = optional_field(members, "schemas", field, report, |node, field, report| {
            expect_map(node, field, report, Ref::check)
        });
        let rules = optional_field(members, "rules", field, report, RulesSection::check);
        let quality = optional_field(members, "quality", field, report, QualitySection::check);
        let tasks = optional_field(members, "tasks", field, report, |node, field, report| {
            expect_map(node, field, report, expect_string)
        });

        // A failed [schemas] section still resolves names through its well-formed entries.
        let salvaged = match (&schemas, optional(members, "schemas")) {
            (None, Some(raw)) => salvage_schemas(raw),
            _ => BTreeMap::new(),
        };
        let ctx = StructureContext {
            schemas: match &schemas {
                Some(found) => found.as_ref(),
                None => Some(&salvaged),
            },
            rules: rules.as_ref().and_then(Option::as_ref),
            edge_policy: options.edge_policy,
        };
        let structure = optional_field(members, "structure", field, report, |node, field, report| {
            StructureSection::check(node, field, &ctx, report)
        });

        if !version_ok {
            return None;
        }
        Some(Self {
            schema_version: FormatVersion,
            schema: schema?,
            metadata: metadata?,
            contracts: contracts?,
            tokens: tokens?,
            schemas: schemas?,
            rules: rules?,
            structure: structure?,
            quality: quality?,
            tasks: tasks?,
        })
    }

    /// Value declared for a token.
    pub fn token(&self, name: &str) -> Option<&TokenPrimitive> {
        self.tokens.as_ref().and_then(|tokens| tokens.get(name))
    }

    /// Reference named by `schema_ref`.
    pub fn schema(&self, name: &str) -> Option<&Ref> {
        self.schemas.as_ref().and_then(|schemas| schemas.get(name))
    }

    /// Whether declared-but-empty directories are tolerated by the layout scan.
    pub fn allows_empty_directories(&self) -> bool {
        self.rules
            .as_ref()
            .map(|rules| rules.structure_rules().allow_empty_directory)
            .unwrap_or(false)
    }

    pub fn to_node(&self) -> Node {
        let mut map = BTreeMap::new();
        map.insert("schemaVersion".to_string(), self.schema_version.to_node());
        if let Some(schema) = &self.schema {
            map.insert("schema".into(), Node::from(schema.as_str()));
        }
        map.insert("metadata".into(), Node::Object(self.metadata.clone()));
        map.insert(
            "contracts".into(),
            Node::Object(
                self.contracts
                    .iter()
                    .map(|(name, entry)| (name.clone(), entry.to_node()))
                    .collect(),
            ),
        );
        if let Some(tokens) = &self.tokens {
            map.insert(
                "tokens".into(),
                Node::Object(
                    tokens
                        .iter()
                        .map(|(name, value)| (name.clone(), value.to_node()))
                        .collect(),
                ),
            );
        }
        if let Some(schemas) = &self.schemas {
            map.insert(
                "schemas".into(),
                Node::Object(
                    schemas
                        .iter()
                        .map(|(name, reference)| (name.clone(), Node::from(reference.as_str())))
                        .collect(),
                ),
            );
        }
        if let Some(rules) = &self.rules {
            map.insert("rules".into(), rules.to_node());
        }
        if let Some(structure) = &self.structure {
            map.insert("structure".into(), structure.to_node());
        }
        if let Some(quality) = &self.quality {
            map.insert("quality".into(), quality.to_node());
        }
        if let Some(tasks) = &self.tasks {
            map.insert(
                "tasks".into(),
                Node::Object(
                    tasks
                        .iter()
                        .map(|(name, cmd)| (name.clone(), Node::from(cmd.as_str())))
                        .collect(),
                ),
            );
        }
        Node::Object(map)
    }
}

fn salvage_schemas(raw: &Node) -> BTreeMap<String, Ref> {
    raw.as_object()
        .into_iter()
        .flatten()
        .filter_map(|(name, value)| {
            let reference = Ref::parse(value.as_str()?).ok()?;
            Some((name.clone(), reference))
        })
        .collect()
}

impl Default for Contract {
    fn default() -> Self {
        Self::new()
    }
}

tree_serde!(Contract);

//! `[structure]`: the expected project layout.
//!
//! Each key is a project-relative path. Entries carry a small set of known fields
//! plus an open bag of user metadata (strings, string lists, booleans). The
//! `depends_on` / `affects` lists form a [`DependencyGraph`] over the section's keys.

use std::collections::{BTreeMap, BTreeSet};

use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, ObjectValidation, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::Serialize;

use crate::check::{expect_object, expect_string, expect_string_list, optional_field, required};
use crate::options::{EdgePolicy, ValidateOptions};
use crate::reference::Ref;
use crate::report::{finish, Checked, FieldPath, IssueKind, ValidationReport};
use crate::rules::RulesSection;
use crate::tree::Node;

const KNOWN_KEYS: &[&str] = &[
    "type",
    "purpose",
    "schema",
    "schema_ref",
    "types",
    "depends_on",
    "affects",
    "ignores",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
    Symlink,
}

impl EntryType {
    pub const NAMES: &'static [&'static str] = &["file", "directory", "symlink"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "file" => Some(EntryType::File),
            "directory" => Some(EntryType::Directory),
            "symlink" => Some(EntryType::Symlink),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::File => "file",
            EntryType::Directory => "directory",
            EntryType::Symlink => "symlink",
        }
    }
}

/// Validation or tracking pass that should skip an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IgnoreKind {
    Git,
    Contract,
}

impl IgnoreKind {
    pub const NAMES: &'static [&'static str] = &["git", "contract"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "git" => Some(IgnoreKind::Git),
            "contract" => Some(IgnoreKind::Contract),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreKind::Git => "git",
            IgnoreKind::Contract => "contract",
        }
    }
}

/// Where an entry's schema comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaBinding {
    /// `schema = "<ref>"`
    Direct(Ref),
    /// `schema_ref = "<name in [schemas]>"`
    Named(String),
}

impl SchemaBinding {
    /// Resolves the binding to a concrete reference.
    pub fn resolve<'a>(&'a self, schemas: Option<&'a BTreeMap<String, Ref>>) -> Option<&'a Ref> {
        match self {
            SchemaBinding::Direct(reference) => Some(reference),
            SchemaBinding::Named(name) => schemas.and_then(|map| map.get(name)),
        }
    }
}

impl JsonSchema for SchemaBinding {
    fn schema_name() -> String {
        "SchemaBinding".into()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let mut properties = BTreeMap::new();
        properties.insert("schema".to_string(), gen.subschema_for::<Ref>());
        properties.insert("schema_ref".to_string(), gen.subschema_for::<String>());
        SchemaObject {
            instance_type: Some(InstanceType::Object.into()),
            object: Some(Box::new(ObjectValidation {
                properties,
                ..Default::default()
            })),
            ..Default::default()
        }
        .into()
    }
}

/// Allowed shapes for user metadata on an entry.
#[derive(Debug, Clone, PartialEq, Eq, JsonSchema)]
#[schemars(untagged)]
pub enum ExtraValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
}

impl ExtraValue {
    fn check(node: &Node, field: &FieldPath, report: &mut ValidationReport) -> Option<Self> {
        match node {
            Node::String(value) => Some(ExtraValue::Text(value.clone())),
            Node::Bool(value) => Some(ExtraValue::Flag(*value)),
            Node::Array(items) if items.iter().all(|item| item.as_str().is_some()) => {
                let items = items
                    .iter()
                    .filter_map(|item| item.as_str().map(String::from))
                    .collect();
                Some(ExtraValue::List(items))
            }
            other => {
                report.push_error(
                    field.clone(),
                    IssueKind::InvalidType {
                        expected: "string, array of strings or boolean",
                        received: other.shape(),
                    },
                );
                None
            }
        }
    }

    fn to_node(&self) -> Node {
        match self {
            ExtraValue::Text(value) => Node::String(value.clone()),
            ExtraValue::List(items) => {
                Node::Array(items.iter().map(|item| Node::String(item.clone())).collect())
            }
            ExtraValue::Flag(value) => Node::Bool(*value),
        }
    }
}

/// One declared path in the project layout.
#[derive(Debug, Clone, PartialEq, JsonSchema)]
pub struct StructureEntry {
    #[schemars(rename = "type")]
    pub entry_type: EntryType,
    /// Human-readable description of the path.
    pub purpose: Option<String>,
    /// `schema` wins when both keys are given.
    #[schemars(flatten)]
    pub binding: Option<SchemaBinding>,
    /// A `schema_ref` that was overridden by `schema`. Kept so the entry round-trips.
    #[schemars(skip)]
    pub shadowed_schema_ref: Option<String>,
    /// Generated type declarations for this entry.
    pub types: Option<Ref>,
    pub depends_on: Option<Vec<String>>,
    pub affects: Option<Vec<String>>,
    pub ignores: Option<BTreeSet<IgnoreKind>>,
    #[schemars(flatten)]
    pub extra: BTreeMap<String, ExtraValue>,
}

impl StructureEntry {
    pub fn new(entry_type: EntryType) -> Self {
        Self {
            entry_type,
            purpose: None,
            binding: None,
            shadowed_schema_ref: None,
            types: None,
            depends_on: None,
            affects: None,
            ignores: None,
            extra: BTreeMap::new(),
        }
    }

    /// Shape-only validation; `schema_ref` names are not resolved.
    pub fn parse(node: &Node) -> Result<Self, ValidationReport> {
        finish(|field, report| Self::check(node, field, report), false).map(|c| c.value)
    }

    pub(crate) fn check(
        node: &Node,
        field: &FieldPath,
        report: &mut ValidationReport,
    ) -> Option<Self> {
        let members = expect_object(node, field, report)?;

        let entry_type = required(members, "type", field, report).and_then(|value| {
            let found = value.as_str().and_then(EntryType::from_name);
            if found.is_none() {
                report.push_error(
                    field.key("type"),
                    IssueKind::InvalidEnumValue {
                        value: value.describe(),
                        expected: EntryType::NAMES,
                    },
                );
            }
            found
        });
        let purpose = optional_field(members, "purpose", field, report, expect_string);
        let schema = optional_field(members, "schema", field, report, Ref::check);
        let schema_ref = optional_field(members, "schema_ref", field, report, expect_string);
        let types = optional_field(members, "types", field, report, Ref::check);
        let depends_on = optional_field(members, "depends_on", field, report, expect_string_list);
        let affects = optional_field(members, "affects", field, report, expect_string_list);
        let ignores = optional_field(members, "ignores", field, report, check_ignores);

        let mut extra = BTreeMap::new();
        let mut extra_ok = true;
        for (key, value) in members {
            if KNOWN_KEYS.contains(&key.as_str()) || value.is_undefined() {
                continue;
            }
            match ExtraValue::check(value, &field.key(key.as_str()), report) {
                Some(checked) => {
                    extra.insert(key.clone(), checked);
                }
                None => extra_ok = false,
            }
        }

        let (schema, schema_ref) = (schema?, schema_ref?);
        let (binding, shadowed_schema_ref) = match (schema, schema_ref) {
            (Some(direct), shadowed) => (Some(SchemaBinding::Direct(direct)), shadowed),
            (None, Some(name)) => (Some(SchemaBinding::Named(name)), None),
            (None, None) => (None, None),
        };
        if !extra_ok {
            return None;
        }
        Some(Self {
            entry_type: entry_type?,
            purpose: purpose?,
            binding,
            shadowed_schema_ref,
            types: types?,
            depends_on: depends_on?,
            affects: affects?,
            ignores: ignores?,
            extra,
        })
    }

    /// The `schema_ref` name declared on this entry, whether or not it is authoritative.
    pub fn schema_ref(&self) -> Option<&str> {
        match (&self.binding, &self.shadowed_schema_ref) {
            (Some(SchemaBinding::Named(name)), _) => Some(name),
            (_, Some(name)) => Some(name),
            _ => None,
        }
    }

    pub fn is_ignored_by(&self, kind: IgnoreKind) -> bool {
        self.ignores.as_ref().is_some_and(|set| set.contains(&kind))
    }

    pub fn to_node(&self) -> Node {
        let mut map: BTreeMap<String, Node> = self
            .extra
            .iter()
            .map(|(key, value)| (key.clone(), value.to_node()))
            .collect();
        map.insert("type".into(), Node::from(self.entry_type.as_str()));
        if let Some(purpose) = &self.purpose {
            map.insert("purpose".into(), Node::from(purpose.as_str()));
        }
        match &self.binding {
            Some(SchemaBinding::Direct(reference)) => {
                map.insert("schema".into(), Node::from(reference.as_str()));
            }
            Some(SchemaBinding::Named(name)) => {
                map.insert("schema_ref".into(), Node::from(name.as_str()));
            }
            None => {}
        }
        if let Some(name) = &self.shadowed_schema_ref {
            map.insert("schema_ref".into(), Node::from(name.as_str()));
        }
        if let Some(types) = &self.types {
            map.insert("types".into(), Node::from(types.as_str()));
        }
        if let Some(list) = &self.depends_on {
            map.insert("depends_on".into(), string_list(list));
        }
        if let Some(list) = &self.affects {
            map.insert("affects".into(), string_list(list));
        }
        if let Some(ignores) = &self.ignores {
            map.insert(
                "ignores".into(),
                Node::Array(ignores.iter().map(|kind| Node::from(kind.as_str())).collect()),
            );
        }
        Node::Object(map)
    }
}

fn string_list(items: &[String]) -> Node {
    Node::Array(items.iter().map(|item| Node::from(item.as_str())).collect())
}

fn check_ignores(
    node: &Node,
    field: &FieldPath,
    report: &mut ValidationReport,
) -> Option<BTreeSet<IgnoreKind>> {
    let Node::Array(items) = node else {
        report.push_error(
            field.clone(),
            IssueKind::InvalidType {
                expected: "array",
                received: node.shape(),
            },
        );
        return None;
    };
    let mut out = BTreeSet::new();
    let mut ok = true;
    for (index, item) in items.iter().enumerate() {
        match item.as_str().and_then(IgnoreKind::from_name) {
            Some(kind) => {
                out.insert(kind);
            }
            None => {
                ok = false;
                report.push_error(
                    field.index(index),
                    IssueKind::InvalidEnumValue {
                        value: item.describe(),
                        expected: IgnoreKind::NAMES,
                    },
                );
            }
        }
    }
    ok.then_some(out)
}

tree_serde!(StructureEntry);

/// Which list an edge was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeRelation {
    DependsOn,
    Affects,
}

impl EdgeRelation {
    pub fn key(&self) -> &'static str {
        match self {
            EdgeRelation::DependsOn => "depends_on",
            EdgeRelation::Affects => "affects",
        }
    }
}

/// One `depends_on` / `affects` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    /// Entry that declared the edge.
    pub owner: String,
    pub relation: EdgeRelation,
    /// Position in the declaring list.
    pub index: usize,
    pub target: String,
}

impl Edge {
    /// Entry whose change propagates along this edge.
    pub fn source(&self) -> &str {
        match self.relation {
            EdgeRelation::DependsOn => &self.target,
            EdgeRelation::Affects => &self.owner,
        }
    }

    /// Entry that is affected by a change to [`Edge::source`].
    pub fn sink(&self) -> &str {
        match self.relation {
            EdgeRelation::DependsOn => &self.owner,
            EdgeRelation::Affects => &self.target,
        }
    }

    fn field(&self, section: &FieldPath) -> FieldPath {
        section
            .key(self.owner.as_str())
            .key(self.relation.key())
            .index(self.index)
    }
}

/// Directed graph over structure keys, edges pointing from a changed entry to the
/// entries it affects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    nodes: BTreeSet<String>,
    edges: Vec<Edge>,
}

impl DependencyGraph {
    pub fn from_entries(entries: &BTreeMap<String, StructureEntry>) -> Self {
        let mut edges = Vec::new();
        for (owner, entry) in entries {
            for (relation, list) in [
                (EdgeRelation::DependsOn, &entry.depends_on),
                (EdgeRelation::Affects, &entry.affects),
            ] {
                for (index, target) in list.iter().flatten().enumerate() {
                    edges.push(Edge {
                        owner: owner.clone(),
                        relation,
                        index,
                        target: target.clone(),
                    });
                }
            }
        }
        Self {
            nodes: entries.keys().cloned().collect(),
            edges,
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges whose target is not a structure key.
    pub fn dangling(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(|edge| !self.nodes.contains(&edge.target))
    }

    fn adjacency(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut out: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for edge in &self.edges {
            if self.nodes.contains(&edge.target) {
                out.entry(edge.source()).or_default().insert(edge.sink());
            }
        }
        out
    }

    /// Every entry transitively affected by a change to `key`.
    pub fn impacted_by(&self, key: &str) -> BTreeSet<String> {
        let adjacency = self.adjacency();
        let mut seen = BTreeSet::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            for next in adjacency.get(current).into_iter().flatten() {
                if seen.insert(next.to_string()) {
                    stack.push(*next);
                }
            }
        }
        seen
    }

    /// First cycle found, as the list of keys along it. Cycles are legal.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let adjacency = self.adjacency();
        let mut done: BTreeSet<&str> = BTreeSet::new();
        for start in &self.nodes {
            if done.contains(start.as_str()) {
                continue;
            }
            let mut path: Vec<&str> = Vec::new();
            if let Some(cycle) = visit(start, &adjacency, &mut path, &mut done) {
                return Some(cycle);
            }
        }
        None
    }
}

fn visit<'a>(
    node: &'a str,
    adjacency: &BTreeMap<&'a str, BTreeSet<&'a str>>,
    path: &mut Vec<&'a str>,
    done: &mut BTreeSet<&'a str>,
) -> Option<Vec<String>> {
    if let Some(pos) = path.iter().position(|n| *n == node) {
        return Some(path[pos..].iter().map(|n| n.to_string()).collect());
    }
    if done.contains(node) {
        return None;
    }
    path.push(node);
    for next in adjacency.get(node).into_iter().flatten() {
        if let Some(cycle) = visit(*next, adjacency, path, done) {
            return Some(cycle);
        }
    }
    path.pop();
    done.insert(node);
    None
}

/// The validated `[structure]` section.
#[derive(Debug, Clone, Default, PartialEq, JsonSchema)]
#[schemars(transparent)]
pub struct StructureSection {
    entries: BTreeMap<String, StructureEntry>,
}

/// Context from the rest of the document that structure validation depends on.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureContext<'a> {
    pub schemas: Option<&'a BTreeMap<String, Ref>>,
    pub rules: Option<&'a RulesSection>,
    pub edge_policy: EdgePolicy,
}

impl StructureSection {
    pub fn new(entries: BTreeMap<String, StructureEntry>) -> Self {
        Self { entries }
    }

    /// Validates a raw `[structure]` map against its schemas and rules.
    pub fn validate(
        node: &Node,
        schemas: Option<&BTreeMap<String, Ref>>,
        rules: Option<&RulesSection>,
        options: &ValidateOptions,
    ) -> Result<Checked<Self>, ValidationReport> {
        let ctx = StructureContext {
            schemas,
            rules,
            edge_policy: options.edge_policy,
        };
        finish(
            |field, report| Self::check(node, &field.key("structure"), &ctx, report),
            options.warnings_as_errors,
        )
    }

    pub(crate) fn check(
        node: &Node,
        field: &FieldPath,
        ctx: &StructureContext<'_>,
        report: &mut ValidationReport,
    ) -> Option<Self> {
        let members = expect_object(node, field, report)?;
        let mut entries = BTreeMap::new();
        let mut ok = true;
        for (key, value) in members {
            match StructureEntry::check(value, &field.key(key.as_str()), report) {
                Some(entry) => {
                    entries.insert(key.clone(), entry);
                }
                None => ok = false,
            }
        }

        let validate_schema = ctx
            .rules
            .map(|rules| rules.structure_rules().validate_schema)
            .unwrap_or(true);
        if validate_schema {
            for (key, entry) in &entries {
                let Some(name) = entry.schema_ref() else {
                    continue;
                };
                if !ctx.schemas.is_some_and(|schemas| schemas.contains_key(name)) {
                    ok = false;
                    report.push_error(
                        field.key(key.as_str()).key("schema_ref"),
                        IssueKind::UnresolvedSchemaRef {
                            schema: name.to_string(),
                        },
                    );
                }
            }
        } else {
            tracing::debug!("schema_ref resolution disabled by rules.structure.validate_schema");
        }

        for (key, entry) in &entries {
            if let Some(name) = &entry.shadowed_schema_ref {
                report.push_warning(
                    field.key(key.as_str()).key("schema_ref"),
                    IssueKind::ShadowedSchemaRef {
                        schema: name.clone(),
                    },
                );
            }
        }

        let graph = DependencyGraph::from_entries(&entries);
        let dangling = graph
            .edges()
            .iter()
            .filter(|edge| !members.contains_key(&edge.target));
        for edge in dangling {
            let kind = IssueKind::DanglingDependency {
                target: edge.target.clone(),
            };
            let edge_field = edge.field(field);
            match ctx.edge_policy {
                EdgePolicy::Ignore => {}
                EdgePolicy::Warn => report.push_warning(edge_field, kind),
                EdgePolicy::Deny => {
                    ok = false;
                    report.push_error(edge_field, kind);
                }
            }
        }
        if let Some(cycle) = graph.find_cycle() {
            tracing::debug!(cycle = ?cycle, "structure dependency cycle");
        }

        ok.then_some(Self { entries })
    }

    pub fn entries(&self) -> &BTreeMap<String, StructureEntry> {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&StructureEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::from_entries(&self.entries)
    }

    pub fn to_node(&self) -> Node {
        Node::Object(
            self.entries
                .iter()
                .map(|(key, entry)| (key.clone(), entry.to_node()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schemas(names: &[&str]) -> BTreeMap<String, Ref> {
        names
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    Ref::parse("https://example.com/schema.json").unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn parses_entry_with_metadata() {
        let node = Node::from(json!({
            "type": "file",
            "purpose": "Docs",
            "ignores": ["git"],
            "owner": "docs-team",
            "tags": ["a", "b"],
            "generated": false
        }));
        let entry = StructureEntry::parse(&node).unwrap();
        assert_eq!(entry.entry_type, EntryType::File);
        assert!(entry.is_ignored_by(IgnoreKind::Git));
        assert!(!entry.is_ignored_by(IgnoreKind::Contract));
        assert_eq!(
            entry.extra.get("owner"),
            Some(&ExtraValue::Text("docs-team".into()))
        );
        assert_eq!(entry.extra.get("generated"), Some(&ExtraValue::Flag(false)));
        assert_eq!(StructureEntry::parse(&entry.to_node()).unwrap(), entry);
    }

    #[test]
    fn rejects_unknown_entry_type() {
        let node = Node::from(json!({"type": "invalid-type"}));
        let report = StructureEntry::parse(&node).unwrap_err();
        assert_eq!(report.errors[0].field.to_string(), "type");
        assert_eq!(
            report.errors[0].kind,
            IssueKind::InvalidEnumValue {
                value: "\"invalid-type\"".into(),
                expected: EntryType::NAMES,
            }
        );
    }

    #[test]
    fn rejects_nested_objects_in_metadata() {
        let node = Node::from(json!({"type": "file", "meta": {"a": 1}}));
        let report = StructureEntry::parse(&node).unwrap_err();
        assert_eq!(report.errors[0].field.to_string(), "meta");
    }

    #[test]
    fn direct_schema_overrides_schema_ref() {
        let node = Node::from(json!({
            "type": "file",
            "schema": "./schemas/local.json",
            "schema_ref": "shared"
        }));
        let entry = StructureEntry::parse(&node).unwrap();
        assert!(matches!(entry.binding, Some(SchemaBinding::Direct(_))));
        assert_eq!(entry.schema_ref(), Some("shared"));
        assert_eq!(entry.to_node(), node);
    }

    #[test]
    fn collects_errors_from_every_entry() {
        let node = Node::from(json!({
            "a.txt": {"type": "folder"},
            "b.txt": {"purpose": "no type"},
            "c/": {"type": "directory", "ignores": ["svn"]}
        }));
        let report =
            StructureSection::validate(&node, None, None, &ValidateOptions::default()).unwrap_err();
        let fields: Vec<String> = report.errors.iter().map(|e| e.field.to_string()).collect();
        assert_eq!(
            fields,
            vec![
                r#"structure["a.txt"].type"#,
                r#"structure["b.txt"].type"#,
                r#"structure["c/"].ignores[0]"#,
            ]
        );
    }

    #[test]
    fn unresolved_schema_ref_depends_on_rule() {
        let node = Node::from(json!({"src/index.ts": {"type": "file", "schema_ref": "missing"}}));
        let known = schemas(&["present"]);
        let options = ValidateOptions::default();
        let report = StructureSection::validate(&node, Some(&known), None, &options).unwrap_err();
        assert_eq!(
            report.errors[0].kind,
            IssueKind::UnresolvedSchemaRef {
                schema: "missing".into()
            }
        );

        let rules_node = Node::from(json!({"structure": {"validate_schema": false}}));
        let rules = RulesSection::parse(&rules_node).unwrap();
        assert!(StructureSection::validate(&node, Some(&known), Some(&rules), &options).is_ok());
    }

    #[test]
    fn dangling_edges_follow_policy() {
        let node = Node::from(json!({
            "src/index.ts": {"type": "file", "depends_on": ["package.json"]}
        }));
        let warn =
            StructureSection::validate(&node, None, None, &ValidateOptions::default()).unwrap();
        assert_eq!(warn.warnings.len(), 1);
        assert_eq!(
            warn.warnings[0].field.to_string(),
            r#"structure["src/index.ts"].depends_on[0]"#
        );

        let ignore = ValidateOptions {
            edge_policy: EdgePolicy::Ignore,
            ..Default::default()
        };
        assert!(StructureSection::validate(&node, None, None, &ignore)
            .unwrap()
            .warnings
            .is_empty());

        let deny = ValidateOptions {
            edge_policy: EdgePolicy::Deny,
            ..Default::default()
        };
        let report = StructureSection::validate(&node, None, None, &deny).unwrap_err();
        assert_eq!(
            report.errors[0].kind,
            IssueKind::DanglingDependency {
                target: "package.json".into()
            }
        );
    }

    #[test]
    fn failed_entry_is_not_a_dangling_target() {
        let node = Node::from(json!({
            "a": {"type": "socket"},
            "b": {"type": "file", "depends_on": ["a"]}
        }));
        let deny = ValidateOptions {
            edge_policy: EdgePolicy::Deny,
            ..Default::default()
        };
        let report = StructureSection::validate(&node, None, None, &deny).unwrap_err();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field.to_string(), "structure.a.type");
        assert!(matches!(
            report.errors[0].kind,
            IssueKind::InvalidEnumValue { .. }
        ));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn shadowed_schema_ref_is_a_warning() {
        let node = Node::from(json!({
            "src/a.json": {
                "type": "file",
                "schema": "./schemas/local.json",
                "schema_ref": "shared"
            }
        }));
        let known = schemas(&["shared"]);
        let shadowed = IssueKind::ShadowedSchemaRef {
            schema: "shared".into(),
        };

        let checked =
            StructureSection::validate(&node, Some(&known), None, &ValidateOptions::default())
                .unwrap();
        assert_eq!(checked.warnings.len(), 1);
        assert_eq!(checked.warnings[0].kind, shadowed);
        assert_eq!(
            checked.warnings[0].field.to_string(),
            r#"structure["src/a.json"].schema_ref"#
        );

        let strict = ValidateOptions {
            warnings_as_errors: true,
            ..Default::default()
        };
        let report = StructureSection::validate(&node, Some(&known), None, &strict).unwrap_err();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, shadowed);
    }

    #[test]
    fn graph_tracks_impact_and_cycles() {
        let node = Node::from(json!({
            "package.json": {"type": "file", "affects": ["src/index.ts"]},
            "src/index.ts": {"type": "file", "depends_on": ["tsconfig.json"]},
            "tsconfig.json": {"type": "file"},
            "dist/": {"type": "directory", "depends_on": ["src/index.ts"]}
        }));
        let section = StructureSection::validate(&node, None, None, &ValidateOptions::default())
            .unwrap()
            .into_inner();
        let graph = section.graph();
        let impacted = graph.impacted_by("tsconfig.json");
        assert!(impacted.contains("src/index.ts"));
        assert!(impacted.contains("dist/"));
        assert!(graph.find_cycle().is_none());

        let cyclic = Node::from(json!({
            "a": {"type": "file", "depends_on": ["b"]},
            "b": {"type": "file", "depends_on": ["a"]}
        }));
        let section = StructureSection::validate(&cyclic, None, None, &ValidateOptions::default())
            .unwrap()
            .into_inner();
        let cycle = section.graph().find_cycle().unwrap();
        assert_eq!(cycle.len(), 2);
    }
}

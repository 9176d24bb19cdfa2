//! Shared field checks used by the document validators.
//!
//! Every helper records its defect in the report and returns `None` instead of
//! stopping, so callers keep walking sibling fields.

use std::collections::BTreeMap;

use crate::report::{FieldPath, IssueKind, ValidationReport};
use crate::tree::Node;

pub(crate) type Members = BTreeMap<String, Node>;

pub(crate) fn expect_object<'a>(
    node: &'a Node,
    field: &FieldPath,
    report: &mut ValidationReport,
) -> Option<&'a Members> {
    match node {
        Node::Object(map) => Some(map),
        other => {
            report.push_error(
                field.clone(),
                IssueKind::InvalidType {
                    expected: "object",
                    received: other.shape(),
                },
            );
            None
        }
    }
}

/// Closed records: one issue naming every key outside `allowed`.
pub(crate) fn reject_unknown_keys(
    members: &Members,
    allowed: &[&str],
    field: &FieldPath,
    report: &mut ValidationReport,
) {
    let unknown: Vec<String> = members
        .keys()
        .filter(|key| !allowed.contains(&key.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        report.push_error(field.clone(), IssueKind::UnrecognizedKey { keys: unknown });
    }
}

/// Present and defined member. An `Undefined` member counts as absent.
pub(crate) fn optional<'a>(members: &'a Members, key: &str) -> Option<&'a Node> {
    members.get(key).filter(|node| !node.is_undefined())
}

pub(crate) fn required<'a>(
    members: &'a Members,
    key: &str,
    field: &FieldPath,
    report: &mut ValidationReport,
) -> Option<&'a Node> {
    let found = optional(members, key);
    if found.is_none() {
        report.push_error(field.key(key), IssueKind::MissingRequiredField);
    }
    found
}

pub(crate) fn expect_string(
    node: &Node,
    field: &FieldPath,
    report: &mut ValidationReport,
) -> Option<String> {
    match node {
        Node::String(value) => Some(value.clone()),
        other => {
            report.push_error(
                field.clone(),
                IssueKind::InvalidType {
                    expected: "string",
                    received: other.shape(),
                },
            );
            None
        }
    }
}

pub(crate) fn expect_bool(
    node: &Node,
    field: &FieldPath,
    report: &mut ValidationReport,
) -> Option<bool> {
    match node {
        Node::Bool(value) => Some(*value),
        other => {
            report.push_error(
                field.clone(),
                IssueKind::InvalidType {
                    expected: "boolean",
                    received: other.shape(),
                },
            );
            None
        }
    }
}

pub(crate) fn expect_string_list(
    node: &Node,
    field: &FieldPath,
    report: &mut ValidationReport,
) -> Option<Vec<String>> {
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
    let mut out = Vec::with_capacity(items.len());
    let mut ok = true;
    for (index, item) in items.iter().enumerate() {
        match expect_string(item, &field.index(index), report) {
            Some(value) => out.push(value),
            None => ok = false,
        }
    }
    ok.then_some(out)
}

/// Validates an optional string-keyed map, checking each value with `check`.
/// Returns `None` if the node is not an object or any value failed.
pub(crate) fn expect_map<T>(
    node: &Node,
    field: &FieldPath,
    report: &mut ValidationReport,
    mut check: impl FnMut(&Node, &FieldPath, &mut ValidationReport) -> Option<T>,
) -> Option<BTreeMap<String, T>> {
    let members = expect_object(node, field, report)?;
    let mut out = BTreeMap::new();
    let mut ok = true;
    for (key, value) in members {
        match check(value, &field.key(key.as_str()), report) {
            Some(checked) => {
                out.insert(key.clone(), checked);
            }
            None => ok = false,
        }
    }
    ok.then_some(out)
}

/// Format version literal shared by contracts and lockfiles.
pub(crate) fn expect_version(
    node: &Node,
    field: &FieldPath,
    report: &mut ValidationReport,
) -> bool {
    match node {
        Node::Number(n) if *n == 1.0 => true,
        other => {
            report.push_error(
                field.clone(),
                IssueKind::UnsupportedVersion {
                    received: other.describe(),
                },
            );
            false
        }
    }
}

/// Folds an optional field: absent stays `Some(None)`, a failed check becomes `None`.
pub(crate) fn optional_field<T>(
    members: &Members,
    key: &str,
    field: &FieldPath,
    report: &mut ValidationReport,
    check: impl FnOnce(&Node, &FieldPath, &mut ValidationReport) -> Option<T>,
) -> Option<Option<T>> {
    match optional(members, key) {
        None => Some(None),
        Some(node) => check(node, &field.key(key), report).map(Some),
    }
}

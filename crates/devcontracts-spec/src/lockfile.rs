use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;

use crate::check::{expect_object, expect_version, optional_field, reject_unknown_keys, required};
use crate::contract::Contract;
use crate::report::{finish, Checked, FieldPath, IssueKind, ValidationIssue, ValidationReport};
use crate::token::{ResolvedTokenCollection, TokenPath};
use crate::tree::Node;
use crate::version::FormatVersion;

/// Lockfile (`contracts.lock`): pins resolved token values for a contract.
#[derive(Debug, Clone, Default, PartialEq, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct Lockfile {
    pub version: FormatVersion,
    /// Resolved values keyed by token path.
    #[schemars(rename = "resolvedTokens")]
    pub resolved_tokens: Option<ResolvedTokenCollection>,
}

impl Lockfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(node: &Node) -> Result<Self, ValidationReport> {
        Self::validate(node).map(Checked::into_inner)
    }

    pub fn validate(node: &Node) -> Result<Checked<Self>, ValidationReport> {
        let result = finish(|field, report| Self::check(node, field, report), false);
        if let Err(report) = &result {
            tracing::debug!(errors = report.errors.len(), "lockfile rejected");
        }
        result
    }

    fn check(node: &Node, field: &FieldPath, report: &mut ValidationReport) -> Option<Self> {
        let members = expect_object(node, field, report)?;
        reject_unknown_keys(members, &["version", "resolvedTokens"], field, report);
        let version_ok = required(members, "version", field, report)
            .is_some_and(|value| expect_version(value, &field.key("version"), report));
        let resolved_tokens = optional_field(
            members,
            "resolvedTokens",
            field,
            report,
            ResolvedTokenCollection::check,
        );
        if !version_ok {
            return None;
        }
        Some(Self {
            version: FormatVersion,
            resolved_tokens: resolved_tokens?,
        })
    }

    /// Cross-checks resolved entries against the contract they were produced from.
    ///
    /// Every resolved path must parse and land on a value in the contract tree, and every
    /// declared token needs an entry at `$.tokens.<name>`. Findings are warnings: a stale
    /// lockfile is still a well-formed one.
    pub fn check_against(&self, contract: &Contract) -> Vec<ValidationIssue> {
        let tree = contract.to_node();
        let resolved_field = FieldPath::root().key("resolvedTokens");
        let mut issues = Vec::new();
        let mut covered = BTreeSet::new();

        if let Some(resolved) = &self.resolved_tokens {
            for (raw, _) in resolved.iter() {
                match TokenPath::parse(raw) {
                    Ok(path) if path.resolve(&tree).is_some() => {
                        covered.insert(path.to_string());
                    }
                    Ok(_) => issues.push(ValidationIssue::new(
                        resolved_field.key(raw),
                        IssueKind::UnresolvedTokenPath {
                            path: raw.to_string(),
                        },
                    )),
                    Err(err) => {
                        tracing::debug!(
                            path = raw,
                            error = %err,
                            "unparseable resolved token path"
                        );
                        issues.push(ValidationIssue::new(
                            resolved_field.key(raw),
                            IssueKind::UnresolvedTokenPath {
                                path: raw.to_string(),
                            },
                        ));
                    }
                }
            }
        }

        for name in contract.tokens.iter().flat_map(|tokens| tokens.keys()) {
            let expected = TokenPath::for_token(name).to_string();
            if !covered.contains(&expected) {
                issues.push(ValidationIssue::new(
                    resolved_field.key(expected),
                    IssueKind::MissingResolvedToken {
                        token: name.clone(),
                    },
                ));
            }
        }
        issues
    }

    pub fn to_node(&self) -> Node {
        let mut map = BTreeMap::new();
        map.insert("version".to_string(), self.version.to_node());
        if let Some(resolved) = &self.resolved_tokens {
            map.insert("resolvedTokens".to_string(), resolved.to_node());
        }
        Node::Object(map)
    }
}

tree_serde!(Lockfile);

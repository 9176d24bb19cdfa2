//! Data model and validation for DevContracts documents.
//!
//! A contract (`contracts.toml`) declares the external contracts a project imports, its
//! design tokens, reusable schemas and the expected file layout. A lockfile pins the
//! resolved token values. Both are decoded into a [`Node`] tree and checked by total
//! validators that collect every defect into a [`ValidationReport`].

/// Implements serde for a model type by going through its tree form, so that
/// deserialization applies the same checks as [`Contract::validate`].
macro_rules! tree_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serde::Serialize::serialize(&self.to_node(), serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let node = <crate::tree::Node as serde::Deserialize>::deserialize(deserializer)?;
                <$ty>::parse(&node).map_err(serde::de::Error::custom)
            }
        }
    };
}

mod check;
pub mod contract;
pub mod document;
pub mod error;
pub mod lockfile;
pub mod options;
pub mod primitive;
pub mod quality;
pub mod reference;
pub mod report;
pub mod rules;
pub mod schema;
pub mod structure;
pub mod token;
pub mod tree;
pub mod version;

pub use contract::{Contract, ContractEntry};
pub use document::{load_contract, load_lockfile, load_tree, parse_tree, DocumentFormat};
pub use error::{ParseError, SpecError};
pub use lockfile::Lockfile;
pub use options::{EdgePolicy, ValidateOptions, EDGE_POLICY_ENV};
pub use primitive::TokenPrimitive;
pub use quality::{LinterQuality, QualitySection};
pub use reference::{Ref, RefKind};
pub use report::{Checked, FieldPath, IssueKind, Segment, ValidationIssue, ValidationReport};
pub use rules::{RulesSection, StructureRules};
pub use schema::{contract_schema, lockfile_schema, CONTRACT_SCHEMA_ID, LOCKFILE_SCHEMA_ID};
pub use structure::{
    DependencyGraph, Edge, EdgeRelation, EntryType, ExtraValue, IgnoreKind, SchemaBinding,
    StructureEntry, StructureSection,
};
pub use token::{
    PathStep, ResolvedToken, ResolvedTokenCollection, TokenPath, TokenPathError, TokenState,
};
pub use tree::{Node, Shape};
pub use version::{FormatVersion, FORMAT_VERSION};

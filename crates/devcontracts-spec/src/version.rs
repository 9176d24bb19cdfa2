use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use schemars::JsonSchema;

use crate::tree::Node;

/// The only document format revision understood by this crate.
pub const FORMAT_VERSION: u32 = 1;

/// Literal format version field (`schemaVersion` / `version`).
///
/// Only revision 1 exists; a newer format bumps this literal rather than widening it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FormatVersion;

impl FormatVersion {
    pub fn get(&self) -> u32 {
        FORMAT_VERSION
    }

    pub(crate) fn to_node(self) -> Node {
        Node::Number(f64::from(FORMAT_VERSION))
    }
}

impl JsonSchema for FormatVersion {
    fn schema_name() -> String {
        "FormatVersion".into()
    }

    fn is_referenceable() -> bool {
        false
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::Integer.into()),
            const_value: Some(serde_json::json!(FORMAT_VERSION)),
            ..Default::default()
        }
        .into()
    }
}

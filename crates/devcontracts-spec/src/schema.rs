//! JSON Schema export for editors and external validators.

use schemars::schema_for;
use serde_json::Value;

use crate::contract::Contract;
use crate::lockfile::Lockfile;

pub const CONTRACT_SCHEMA_ID: &str = "https://devcontracts.dev/schemas/contract.schema.json";
pub const LOCKFILE_SCHEMA_ID: &str = "https://devcontracts.dev/schemas/lockfile.schema.json";

fn with_id(mut schema: Value, id: &str) -> Value {
    if let Value::Object(map) = &mut schema {
        map.insert("$id".into(), Value::String(id.into()));
    }
    schema
}

pub fn contract_schema() -> Value {
    let schema = serde_json::to_value(schema_for!(Contract)).unwrap_or(Value::Bool(true));
    with_id(schema, CONTRACT_SCHEMA_ID)
}

pub fn lockfile_schema() -> Value {
    let schema = serde_json::to_value(schema_for!(Lockfile)).unwrap_or(Value::Bool(true));
    with_id(schema, LOCKFILE_SCHEMA_ID)
}

use std::fs;

use devcontracts_spec::{
    contract_schema, load_contract, load_lockfile, lockfile_schema, Contract, EdgePolicy,
    FieldPath, IssueKind, Node, Shape, SpecError, TokenPrimitive, TokenState, ValidateOptions,
};
use serde_json::json;
use tempfile::tempdir;

const CONTRACT_TOML: &str = r#"
schemaVersion = 1
schema = "https://devcontracts.dev/schemas/contract.schema.json"

[metadata]
project = "ExampleProj"
owner = "Team A"

[contracts.my-service]
ref = "./service-contract.ts"
description = "Main service contract"

[contracts.another-contract]
ref = "https://example.com/contract.json"
description = "External API contract"

[tokens]
license = "MIT"
port = 8080
strict = true

[schemas]
my-schema = "https://example.com/schema.json"

[rules.structure]
allow_empty_directory = false
validate_schema = true

[structure."src/index.ts"]
type = "file"
purpose = "Entry point"
schema_ref = "my-schema"
depends_on = ["package.json"]
affects = ["dist/"]
owner = "platform"

[structure."package.json"]
type = "file"

[structure."dist/"]
type = "directory"
ignores = ["git"]

[quality.lint.eslint]
version = "8.0.0"
config = ".eslintrc.json"

[tasks]
check = "deno task check"
"#;

#[test]
fn loads_toml_contract_from_disk() {
    let tmp = tempdir().expect("tmpdir");
    let path = tmp.path().join("contracts.toml");
    fs::write(&path, CONTRACT_TOML).expect("write contract");

    let checked = load_contract(&path, &ValidateOptions::default()).expect("valid contract");
    assert!(checked.warnings.is_empty());
    let contract = checked.value;
    assert_eq!(contract.contracts.len(), 2);
    assert_eq!(contract.token("port"), TokenPrimitive::number(8080.0).as_ref());
    let structure = contract.structure.as_ref().expect("structure");
    let entry = structure.get("src/index.ts").expect("entry");
    assert_eq!(entry.schema_ref(), Some("my-schema"));
    assert_eq!(
        structure.graph().impacted_by("package.json").into_iter().collect::<Vec<_>>(),
        vec!["dist/".to_string(), "src/index.ts".to_string()]
    );
}

#[test]
fn contract_round_trips_through_json_text() {
    let node = devcontracts_spec::parse_tree(CONTRACT_TOML, devcontracts_spec::DocumentFormat::Toml)
        .expect("toml");
    let contract = Contract::parse(&node).expect("valid");
    let text = serde_json::to_string(&contract).expect("serialize");
    let again: Contract = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(again, contract);
}

#[test]
fn exported_schema_accepts_valid_contract() {
    let schema = contract_schema();
    let validator = jsonschema::validator_for(&schema).expect("schema compiles");
    let node = devcontracts_spec::parse_tree(CONTRACT_TOML, devcontracts_spec::DocumentFormat::Toml)
        .expect("toml");
    let instance = serde_json::to_value(&node).expect("json");
    let errors: Vec<String> = validator.iter_errors(&instance).map(|e| e.to_string()).collect();
    assert!(errors.is_empty(), "unexpected schema errors: {errors:?}");
}

#[test]
fn exported_schema_rejects_unknown_root_key() {
    let validator = jsonschema::validator_for(&contract_schema()).expect("schema compiles");
    let instance = json!({
        "schemaVersion": 1,
        "metadata": {},
        "contracts": {},
        "otherStuff": "not allowed"
    });
    assert!(!validator.is_valid(&instance));
}

#[test]
fn exported_lockfile_schema_matches_validator() {
    let validator = jsonschema::validator_for(&lockfile_schema()).expect("schema compiles");
    assert!(validator.is_valid(&json!({"version": 1})));
    assert!(validator.is_valid(&json!({"version": 1, "resolvedTokens": {"$.tokens.a": "x"}})));
    assert!(!validator.is_valid(&json!({"version": 2})));
    assert!(!validator.is_valid(&json!({"version": 1, "extra": true})));
}

#[test]
fn invalid_contract_on_disk_carries_report() {
    let tmp = tempdir().expect("tmpdir");
    let path = tmp.path().join("contracts.json");
    fs::write(
        &path,
        r#"{"schemaVersion": 1, "metadata": {}, "contracts": {"bad-service": {"description": "no ref"}}}"#,
    )
    .expect("write");

    let err = load_contract(&path, &ValidateOptions::default()).unwrap_err();
    let report = err.report().expect("validation report");
    let field: FieldPath = ["contracts", "bad-service", "ref"].into_iter().collect();
    assert!(report.has_error(&field, |kind| *kind == IssueKind::MissingRequiredField));
    assert_eq!(field.to_string(), r#"contracts["bad-service"].ref"#);
}

#[test]
fn toml_infinity_is_not_a_token_value() {
    let text = "schemaVersion = 1\ncontracts = {}\n\n[metadata]\n\n[tokens]\nport = inf\n";
    let node = devcontracts_spec::parse_tree(text, devcontracts_spec::DocumentFormat::Toml)
        .expect("toml");
    let report = Contract::parse(&node).unwrap_err();
    let field: FieldPath = ["tokens", "port"].into_iter().collect();
    assert!(report.has_error(&field, |kind| {
        *kind
            == IssueKind::InvalidTokenType {
                received: Shape::Number,
            }
    }));
    assert_eq!(report.errors.len(), 1);
}

#[test]
fn deny_policy_turns_dangling_edges_into_errors() {
    let node = Node::from(json!({
        "schemaVersion": 1,
        "metadata": {},
        "contracts": {},
        "structure": {"src/": {"type": "directory", "depends_on": ["missing.txt"]}}
    }));
    let warn = Contract::validate(&node, &ValidateOptions::default()).expect("warn passes");
    assert_eq!(warn.warnings.len(), 1);

    let deny = ValidateOptions {
        edge_policy: EdgePolicy::Deny,
        ..ValidateOptions::default()
    };
    let report = Contract::validate(&node, &deny).unwrap_err();
    assert_eq!(
        report.errors[0].field.to_string(),
        r#"structure["src/"].depends_on[0]"#
    );
}

#[test]
fn lockfile_from_disk_keeps_null_values() {
    let tmp = tempdir().expect("tmpdir");
    let path = tmp.path().join("contracts.lock");
    fs::write(
        &path,
        r#"{"version": 1, "resolvedTokens": {"$.tokens.owner": null, "": "root"}}"#,
    )
    .expect("write");

    let lock = load_lockfile(&path).expect("valid lockfile").into_inner();
    let tokens = lock.resolved_tokens.expect("tokens");
    assert_eq!(
        tokens.lookup("$.tokens.owner"),
        TokenState::Value(&TokenPrimitive::Null)
    );
    assert_eq!(
        tokens.lookup(""),
        TokenState::Value(&TokenPrimitive::from("root"))
    );
}

#[test]
fn unparseable_lockfile_is_a_parse_error() {
    let tmp = tempdir().expect("tmpdir");
    let path = tmp.path().join("contracts.json");
    fs::write(&path, "{ not json").expect("write");
    assert!(matches!(load_lockfile(&path), Err(SpecError::Parse(_))));
}

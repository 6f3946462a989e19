//! Integration tests for the contract checker: file inputs, live schemas and
//! the CLI exit codes.

use std::io::Write;
use std::process::Command;

use serde_json::json;
use tempfile::NamedTempFile;
use vitrina_client::{ApiClient, ClientConfig, FacetSchemaClient};
use vitrina_contract::{check_contract, ContractError, RuleSource, SchemaPack};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEPLOYED_PACK: &str = r#"{
    "goods": {"facets": [
        {"semantic_type": "price", "facet_type": "range"},
        {"semantic_type": "category", "facet_type": "enum"},
        {"semantic_type": "location", "facet_type": "enum"},
        {"semantic_type": "brand", "facet_type": "enum", "values": ["Acme", "Globex"]}
    ]},
    "services": {"facets": [
        {"semantic_type": "category", "facet_type": "enum"},
        {"semantic_type": "location", "facet_type": "enum"},
        {"semantic_type": "duration", "facet_type": "range"},
        {"semantic_type": "price", "facet_type": "range"}
    ]}
}"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}

fn contract_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vitrina-contract"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_deployed_pack_file_passes() {
    let file = write_temp(DEPLOYED_PACK);
    let pack = SchemaPack::from_file(file.path()).unwrap();
    let report = check_contract(&pack, &RuleSource::Builtin);
    assert!(report.passed(), "missing: {:?}", report.missing);
}

#[test]
fn test_new_schema_type_without_rule_fails() {
    let file = write_temp(
        r#"{"goods": {"facets": [
            {"semantic_type": "price", "facet_type": "range"},
            {"semantic_type": "warranty", "facet_type": "enum"}
        ]}}"#,
    );
    let pack = SchemaPack::from_file(file.path()).unwrap();
    let report = check_contract(&pack, &RuleSource::Builtin);
    assert_eq!(report.missing, vec!["warranty"]);
}

#[test]
fn test_gate_source_file_scanned() {
    let gate = write_temp(
        r#"
        GateRule { semantic_type: "price", control: ControlKind::RangeInput },
        GateRule { semantic_type: "warranty", control: ControlKind::Select },
        "#,
    );
    let pack = SchemaPack::from_json_str(
        r#"{"goods": {"facets": [{"semantic_type": "warranty"}, {"semantic_type": "brand"}]}}"#,
    )
    .unwrap();

    let rules = RuleSource::from_file(gate.path()).unwrap();
    let report = check_contract(&pack, &rules);
    assert_eq!(report.missing, vec!["brand"]);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SchemaPack::from_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ContractError::Io { .. }));
}

#[tokio::test]
async fn test_live_schemas_fetched_per_domain() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/products/facets"))
        .and(query_param("type", "goods"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domain": "goods", "tenant_id": "acme",
            "facets": [{"semantic_type": "brand", "facet_type": "enum"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products/facets"))
        .and(query_param("type", "services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "domain": "services", "tenant_id": "acme",
            "facets": [{"semantic_type": "warranty", "facet_type": "enum"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FacetSchemaClient::new(
        ApiClient::new(ClientConfig::new(mock_server.uri(), "acme")).unwrap(),
    );
    let pack = SchemaPack::fetch(&client, "acme").await.unwrap();
    let report = check_contract(&pack, &RuleSource::Builtin);

    assert_eq!(report.facet_types, vec!["brand", "warranty"]);
    assert_eq!(report.missing, vec!["warranty"]);
}

#[tokio::test]
async fn test_live_fetch_failure_is_input_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/products/facets"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = FacetSchemaClient::new(
        ApiClient::new(ClientConfig::new(mock_server.uri(), "acme")).unwrap(),
    );
    let err = SchemaPack::fetch(&client, "acme").await.unwrap_err();
    assert!(matches!(err, ContractError::Fetch(_)));
}

// =============================================================================
// CLI
// =============================================================================

#[test]
fn test_cli_exit_zero_on_pass() {
    let file = write_temp(DEPLOYED_PACK);
    let output = contract_bin()
        .args(["check", "--schema"])
        .arg(file.path())
        .output()
        .expect("Failed to run vitrina-contract");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("OK: every declared facet type has a gating rule"));
}

#[test]
fn test_cli_exit_one_on_violation_with_json() {
    let file = write_temp(r#"{"goods": {"facets": [{"semantic_type": "warranty"}]}}"#);
    let output = contract_bin()
        .args(["check", "--format", "json", "--schema"])
        .arg(file.path())
        .output()
        .expect("Failed to run vitrina-contract");

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["missing"], json!(["warranty"]));
}

#[test]
fn test_cli_exit_two_on_empty_pack() {
    let file = write_temp("{}");
    let output = contract_bin()
        .args(["check", "--schema"])
        .arg(file.path())
        .output()
        .expect("Failed to run vitrina-contract");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Schema pack is empty"));
}

#[test]
fn test_cli_requires_an_input() {
    let output = contract_bin()
        .arg("check")
        .output()
        .expect("Failed to run vitrina-contract");
    assert_eq!(output.status.code(), Some(2));
}

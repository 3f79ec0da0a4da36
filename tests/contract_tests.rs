mod common;

use brrtrouter_contract::contract::{ContractError, ContractValidator, DocumentFn};
use brrtrouter_contract::exchange::{ContractRequest, ContractResponse, MessageKind};
use brrtrouter_contract::spec_cache::SpecValidatorCache;
use brrtrouter_contract::ValidationCause;
use common::{contract, SpecFixture};
use http::Method;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

fn get_widget() -> ContractRequest {
    ContractRequest::new(Method::GET, "/widgets/42").with_route_template("/widgets/{id}")
}

fn good_widget() -> ContractResponse {
    ContractResponse::new(200).with_json(&json!({"id": "42", "name": "Foo"}))
}

fn bad_widget() -> ContractResponse {
    ContractResponse::new(200).with_json(&json!({"id": 42, "name": "Foo"}))
}

#[test]
fn test_matching_exchange_passes() {
    let fixture = SpecFixture::widgets();
    let mut contract = contract(&fixture.spec);

    contract
        .assert_exchange(&get_widget(), &good_widget(), &Method::GET)
        .unwrap();
    assert!(contract.sink().failures.is_empty());
}

#[test]
fn test_wrong_type_is_reported_with_breadcrumb() {
    let fixture = SpecFixture::widgets();
    let mut contract = contract(&fixture.spec);

    let err = contract
        .assert_exchange(&get_widget(), &bad_widget(), &Method::GET)
        .unwrap_err();
    let report = err.report().unwrap();
    assert_eq!(report.kind, MessageKind::Response);
    assert_eq!(report.path_template, "/widgets/{id}");

    let mismatch = report.error.keyword_mismatch().unwrap();
    assert_eq!(mismatch.breadcrumb, vec!["id".to_string()]);
    assert_eq!(mismatch.keyword, "type");

    assert!(report.message.starts_with(
        "Body does not match schema for content-type \"application/json\" for Response [get /widgets/{id} 200]"
    ));
    assert!(report.message.contains("\nKey: id\n"));
    assert!(report
        .message
        .contains("Content: \n{\n    \"id\": 42,\n    \"name\": \"Foo\"\n}\n"));

    let failures = &contract.sink().failures;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, report.message);
    assert_eq!(failures[0].1, r#"{"id":42,"name":"Foo"}"#);
}

#[test]
fn test_nested_breadcrumb() {
    let fixture = SpecFixture::widgets();
    let mut contract = contract(&fixture.spec);
    let request = ContractRequest::new(Method::GET, "/widgets").with_route_template("/widgets");
    let response = ContractResponse::new(200).with_json(&json!([
        {"id": "1", "name": "a"},
        {"id": "2"}
    ]));

    let err = contract
        .validate_exchange(&request, &response, &Method::GET)
        .unwrap_err();
    let report = err.report().unwrap();
    assert_eq!(report.error.keyword_mismatch().unwrap().keyword, "required");
    assert!(report.message.contains("\nKey: 1\n"));
}

#[test]
fn test_skip_next_response_validation_once() {
    let fixture = SpecFixture::widgets();
    let mut contract = contract(&fixture.spec);

    contract.skip_next_response_validation();
    contract
        .validate_exchange(&get_widget(), &bad_widget(), &Method::GET)
        .unwrap();
    assert!(contract
        .validate_exchange(&get_widget(), &bad_widget(), &Method::GET)
        .is_err());
}

#[test]
fn test_skip_next_request_validation_once() {
    let fixture = SpecFixture::widgets();
    let mut contract = contract(&fixture.spec);
    let request = ContractRequest::new(Method::POST, "/widgets")
        .with_route_template("/widgets")
        .with_json(&json!({"name": ""}));
    let response = ContractResponse::new(201).with_json(&json!({"id": "1", "name": "x"}));

    contract.skip_next_request_validation();
    contract
        .validate_exchange(&request, &response, &Method::POST)
        .unwrap();

    let err = contract
        .validate_exchange(&request, &response, &Method::POST)
        .unwrap_err();
    let report = err.report().unwrap();
    assert_eq!(report.kind, MessageKind::Request);
    let mismatch = report.error.keyword_mismatch().unwrap();
    assert_eq!(mismatch.keyword, "minLength");
    assert_eq!(mismatch.breadcrumb_chain(), "name");
}

#[test]
fn test_skip_next_validation_keeps_forced_path() {
    let fixture = SpecFixture::widgets();
    let mut contract = contract(&fixture.spec);

    contract.force_openapi_path("/nope").skip_next_validation();
    contract
        .validate_exchange(&get_widget(), &bad_widget(), &Method::GET)
        .unwrap();
    assert!(!contract.controls().is_idle(), "forced path survives the short-circuit");

    let err = contract
        .validate_exchange(&get_widget(), &good_widget(), &Method::GET)
        .unwrap_err();
    let report = err.report().unwrap();
    assert_eq!(report.path_template, "/nope");
    assert!(matches!(
        report.error.causes(),
        [ValidationCause::OperationNotFound { .. }]
    ));

    contract
        .validate_exchange(&get_widget(), &good_widget(), &Method::GET)
        .unwrap();
}

#[test]
fn test_forced_path_applies_once() {
    let fixture = SpecFixture::widgets();
    let mut contract = contract(&fixture.spec);
    let request = ContractRequest::new(Method::GET, "/w/42").with_route_template("/w/{id}");

    contract.force_openapi_path("/widgets/{id}");
    contract
        .validate_exchange(&request, &good_widget(), &Method::GET)
        .unwrap();

    let err = contract
        .validate_exchange(&request, &good_widget(), &Method::GET)
        .unwrap_err();
    assert_eq!(err.report().unwrap().path_template, "/w/{id}");
}

#[test]
fn test_raw_uri_with_server_base_path() {
    let fixture = SpecFixture::widgets();
    let mut contract = contract(&fixture.spec);
    let request = ContractRequest::new(Method::GET, "/api/v1/widgets/42?expand=true");

    contract
        .validate_exchange(&request, &good_widget(), &Method::GET)
        .unwrap();
    assert!(contract
        .validate_exchange(&request, &bad_widget(), &Method::GET)
        .is_err());
}

#[test]
fn test_missing_document_is_a_configuration_error() {
    let mut contract = ContractValidator::new(DocumentFn(|| None::<PathBuf>))
        .with_cache(Arc::new(SpecValidatorCache::memory_only()))
        .with_sink(brrtrouter_contract::contract::RecordingSink::default());

    let err = contract
        .assert_exchange(&get_widget(), &good_widget(), &Method::GET)
        .unwrap_err();
    assert!(matches!(err, ContractError::Configuration(_)));
    assert!(contract.sink().failures.is_empty());
}

#[test]
fn test_unloadable_document_is_a_spec_load_error() {
    let fixture = SpecFixture::widgets();
    let mut contract = contract(&fixture.dir.path().join("missing.yaml"));

    let err = contract
        .validate_exchange(&get_widget(), &good_widget(), &Method::GET)
        .unwrap_err();
    assert!(matches!(err, ContractError::SpecLoad { .. }));
}

#[test]
fn test_unparsable_body_is_reported_without_content() {
    let fixture = SpecFixture::widgets();
    let mut contract = contract(&fixture.spec);
    let response = ContractResponse::new(200)
        .with_header("Content-Type", "application/json; charset=utf-8")
        .with_body("{oops");

    let err = contract
        .validate_exchange(&get_widget(), &response, &Method::GET)
        .unwrap_err();
    let report = err.report().unwrap();
    assert!(matches!(
        report.error.causes(),
        [ValidationCause::BodyNotJson { .. }]
    ));
    assert!(!report.message.contains("Content:"));
    assert_eq!(report.content, "{oops");
}

#[test]
fn test_call_runs_kernel_and_validates() {
    let fixture = SpecFixture::widgets();
    let mut contract = contract(&fixture.spec);
    let mut kernel = |request: &ContractRequest| {
        assert_eq!(request.path(), "/widgets/42");
        ContractResponse::from_value(200, json!({"id": "42", "name": "Foo"}))
    };

    let response = contract.call(&mut kernel, get_widget()).unwrap();
    assert_eq!(response.status, 200);

    let mut broken = |_: &ContractRequest| ContractResponse::from_value(200, json!({"id": 42}));
    assert!(contract.call(&mut broken, get_widget()).is_err());
    assert_eq!(contract.sink().failures.len(), 1);
}

#[test]
#[should_panic(expected = "Body does not match schema")]
fn test_panic_sink_fails_the_test() {
    let fixture = SpecFixture::widgets();
    let mut contract = ContractValidator::new(PathBuf::from(&fixture.spec))
        .with_cache(Arc::new(SpecValidatorCache::memory_only()));
    let _ = contract.assert_exchange(&get_widget(), &bad_widget(), &Method::GET);
}

//! Contract checks for the published OpenAPI document.
//!
//! The operation list is snapshotted so route changes show up in review.

use rstest::{fixture, rstest};
use serde_json::Value;
use tenantry::ApiDoc;
use utoipa::OpenApi;

#[fixture]
fn document() -> Value {
    serde_json::to_value(ApiDoc::openapi()).expect("OpenAPI document serialises")
}

fn operations(document: &Value) -> impl Iterator<Item = (&str, &str, &Value)> {
    document
        .get("paths")
        .and_then(Value::as_object)
        .expect("paths object")
        .iter()
        .flat_map(|(path, item)| {
            item.as_object()
                .expect("path item object")
                .iter()
                .map(move |(method, operation)| (method.as_str(), path.as_str(), operation))
        })
}

#[rstest]
fn operation_list_is_stable(document: Value) {
    let mut listed: Vec<String> = operations(&document)
        .map(|(method, path, operation)| {
            let id = operation
                .get("operationId")
                .and_then(Value::as_str)
                .unwrap_or("<none>");
            format!("{method} {path} {id}")
        })
        .collect();
    listed.sort();

    insta::assert_json_snapshot!("operations", listed);
}

#[rstest]
fn only_account_reads_need_a_bearer_token(document: Value) {
    let mut protected: Vec<&str> = operations(&document)
        .filter(|(_, _, operation)| {
            operation
                .get("security")
                .and_then(Value::as_array)
                .is_some_and(|reqs| reqs.iter().any(|req| req.get("bearerAuth").is_some()))
        })
        .map(|(_, path, _)| path)
        .collect();
    protected.sort_unstable();

    assert_eq!(protected, ["/api/v1/auth/me", "/api/v1/entitlement"]);
}

#[rstest]
fn billing_update_documents_the_signature_header(document: Value) {
    let parameters = document
        .pointer("/paths/~1api~1v1~1billing~1entitlement/post/parameters")
        .and_then(Value::as_array)
        .expect("billing parameters");

    assert!(parameters.iter().any(|param| {
        param.get("name") == Some(&Value::from("X-Tenantry-Signature"))
            && param.get("in") == Some(&Value::from("header"))
    }));
}

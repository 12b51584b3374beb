//! Tests for HTTP error rendering.

use actix_web::body::to_bytes;
use actix_web::test::{self as actix_test, TestRequest};
use actix_web::{App, HttpResponse, post};
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde::Deserialize;
use serde_json::{Value, json};

use super::*;

const TRACE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

struct Rendered {
    status: StatusCode,
    trace_header: Option<String>,
    challenge: Option<String>,
    body: Error,
}

async fn render(error: &Error) -> Rendered {
    let response = ResponseError::error_response(error);
    let header_text = |name| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    let trace_header = header_text(header::HeaderName::from_static(TRACE_ID_HEADER));
    let challenge = header_text(header::WWW_AUTHENTICATE);
    let status = response.status();
    let bytes = to_bytes(response.into_body()).await.expect("body bytes");
    Rendered {
        status,
        trace_header,
        challenge,
        body: serde_json::from_slice(&bytes).expect("error envelope"),
    }
}

#[fixture]
fn store_failure() -> Error {
    Error::internal("subscriber table missing column tier")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"sql": "select tier from subscribers"}))
}

#[rstest]
#[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::Unauthorized, StatusCode::UNAUTHORIZED)]
#[case(ErrorCode::Forbidden, StatusCode::FORBIDDEN)]
#[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
#[case(ErrorCode::Conflict, StatusCode::CONFLICT)]
#[case(ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE)]
#[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
fn every_code_has_a_status(#[case] code: ErrorCode, #[case] status: StatusCode) {
    assert_eq!(status_for(code), status);
}

#[rstest]
#[actix_web::test]
async fn validation_errors_keep_their_details() {
    let error = Error::invalid_request("password must be at least 8 characters")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"field": "password", "code": "password_too_short"}));

    let rendered = render(&error).await;

    assert_eq!(rendered.status, StatusCode::BAD_REQUEST);
    assert_eq!(rendered.trace_header.as_deref(), Some(TRACE_ID));
    assert_eq!(rendered.challenge, None);
    assert_eq!(rendered.body, error);
}

#[rstest]
#[actix_web::test]
async fn unauthorized_responses_carry_a_bearer_challenge() {
    let rendered = render(&Error::unauthorized("invalid or expired token")).await;

    assert_eq!(rendered.status, StatusCode::UNAUTHORIZED);
    assert_eq!(rendered.challenge.as_deref(), Some("Bearer"));
    assert_eq!(rendered.trace_header, None);
    assert_eq!(rendered.body.message(), "invalid or expired token");
}

#[given("a store failure carrying SQL in its details")]
fn a_store_failure() -> Error {
    store_failure()
}

#[when("the failure is prepared for the client")]
fn the_failure_is_prepared(error: Error) -> Error {
    public_view(&error)
}

#[then("the client sees only the generic message and the trace id")]
fn only_generic_message_leaks(public: Error) {
    assert_eq!(public.code(), ErrorCode::InternalError);
    assert_eq!(public.message(), INTERNAL_MESSAGE);
    assert_eq!(public.details(), None);
    assert_eq!(public.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn internal_failures_are_redacted() {
    let public = the_failure_is_prepared(a_store_failure());
    only_generic_message_leaks(public);
}

#[rstest]
#[actix_web::test]
async fn redacted_failures_still_echo_the_trace_header(store_failure: Error) {
    let rendered = render(&store_failure).await;

    assert_eq!(rendered.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(rendered.trace_header.as_deref(), Some(TRACE_ID));
    assert_eq!(rendered.body.message(), INTERNAL_MESSAGE);
}

#[derive(Deserialize)]
struct Probe {
    #[expect(dead_code, reason = "only the shape of the body matters")]
    email: String,
}

#[post("/probe")]
async fn probe(_body: web::Json<Probe>) -> HttpResponse {
    HttpResponse::NoContent().finish()
}

#[rstest]
#[case(TestRequest::post().insert_header(header::ContentType::json()).set_payload("{\"email\":"), "invalid_json")]
#[case(TestRequest::post().insert_header(header::ContentType::json()).set_payload("{}"), "invalid_json")]
#[case(TestRequest::post().insert_header(header::ContentType::plaintext()).set_payload("{}"), "unsupported_content_type")]
#[actix_web::test]
async fn malformed_bodies_use_the_error_envelope(
    #[case] request: TestRequest,
    #[case] expected_code: &str,
) {
    let app =
        actix_test::init_service(App::new().app_data(json_config()).service(probe)).await;

    let response = actix_test::call_service(&app, request.uri("/probe").to_request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;

    assert_eq!(body.get("code"), Some(&json!("invalid_request")));
    assert_eq!(body.pointer("/details/field"), Some(&json!("body")));
    assert_eq!(body.pointer("/details/code"), Some(&json!(expected_code)));
}

//! Tests for the account API handlers.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::test as actix_test;
use chrono::{TimeDelta, TimeZone, Utc};
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::{Value, json};

use super::{RegisterRequest, map_registration_validation_error};
use crate::domain::{Error, ErrorCode, Registration};
use crate::inbound::http::test_utils::{api_app, in_memory_state};
use crate::test_support::MutableClock;

#[fixture]
fn clock() -> Arc<MutableClock> {
    let start = Utc
        .with_ymd_and_hms(2026, 1, 1, 9, 0, 0)
        .single()
        .expect("valid instant");
    Arc::new(MutableClock::new(start))
}

async fn send<S, B>(app: &S, request: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(app, request).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

fn register_request(email: &str, password: &str, full_name: &str, company: &str) -> actix_http::Request {
    actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "email": email,
            "password": password,
            "fullName": full_name,
            "companyName": company,
        }))
        .to_request()
}

fn login_request(email: &str, password: &str) -> actix_http::Request {
    actix_test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request()
}

fn me_request(authorization: Option<&str>) -> actix_http::Request {
    let request = actix_test::TestRequest::get().uri("/api/v1/auth/me");
    match authorization {
        Some(value) => request.insert_header((header::AUTHORIZATION, value)),
        None => request,
    }
    .to_request()
}

fn token_of(body: &Value) -> String {
    body.get("token")
        .and_then(Value::as_str)
        .expect("token present")
        .to_owned()
}

#[rstest]
#[actix_web::test]
async fn register_returns_account_summary(clock: Arc<MutableClock>) {
    let app = actix_test::init_service(api_app(in_memory_state(clock))).await;

    let (status, body) = send(&app, register_request("Ann@X.com", "pw123456", "Ann", "Acme")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.get("email"), Some(&json!("ann@x.com")));
    assert!(body.get("id").and_then(Value::as_str).is_some());
    assert_eq!(body.get("createdAt"), Some(&json!("2026-01-01T09:00:00Z")));
    assert!(body.get("updatedAt").is_some());
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[rstest]
#[actix_web::test]
async fn duplicate_registration_conflicts(clock: Arc<MutableClock>) {
    let app = actix_test::init_service(api_app(in_memory_state(clock))).await;
    let (first, _) = send(&app, register_request("a@x.com", "pw123456", "Ann", "Acme")).await;
    assert_eq!(first, StatusCode::CREATED);

    let (status, body) = send(&app, register_request("A@x.com", "other-pass", "Bob", "Beta")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body.get("code"), Some(&json!("conflict")));

    // The original credentials still work.
    let (login, _) = send(&app, login_request("a@x.com", "pw123456")).await;
    assert_eq!(login, StatusCode::OK);
}

#[rstest]
#[case("bad", "pw123456", "Ann", "Acme", "email", "invalid_email")]
#[case("", "pw123456", "Ann", "Acme", "email", "empty_email")]
#[case("a@x.com", "short", "Ann", "Acme", "password", "password_too_short")]
#[case("a@x.com", "pw123456", "  ", "Acme", "fullName", "empty_full_name")]
#[case("a@x.com", "pw123456", "Ann", "", "companyName", "empty_company_name")]
#[case("a@x.com", "pw123456", "Ann", "!!!", "companyName", "invalid_company_name")]
#[actix_web::test]
async fn register_validation_failures_name_the_field(
    clock: Arc<MutableClock>,
    #[case] email: &str,
    #[case] password: &str,
    #[case] full_name: &str,
    #[case] company: &str,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(api_app(in_memory_state(clock))).await;

    let (status, body) = send(&app, register_request(email, password, full_name, company)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.get("code"), Some(&json!("invalid_request")));
    assert_eq!(body.pointer("/details/field"), Some(&json!(field)));
    assert_eq!(body.pointer("/details/code"), Some(&json!(code)));
}

#[rstest]
#[actix_web::test]
async fn login_then_whoami_shows_company(clock: Arc<MutableClock>) {
    let app = actix_test::init_service(api_app(in_memory_state(clock))).await;
    let (_, registered) =
        send(&app, register_request("a@x.com", "pw123456", "Ann", "Acme Corp")).await;

    let (status, login) = send(&app, login_request(" A@X.COM ", "pw123456")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login.pointer("/account/id"), registered.get("id"));

    let bearer = format!("Bearer {}", token_of(&login));
    let (status, me) = send(&app, me_request(Some(&bearer))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me.get("id"), registered.get("id"));
    assert_eq!(me.get("email"), Some(&json!("a@x.com")));
    assert_eq!(me.pointer("/profile/fullName"), Some(&json!("Ann")));
    assert_eq!(me.pointer("/profile/role"), Some(&json!("admin")));
    assert_eq!(me.pointer("/profile/company/name"), Some(&json!("Acme Corp")));
    assert_eq!(me.pointer("/profile/company/slug"), Some(&json!("acme-corp")));
}

#[rstest]
#[actix_web::test]
async fn wrong_password_and_unknown_email_fail_identically(clock: Arc<MutableClock>) {
    let app = actix_test::init_service(api_app(in_memory_state(clock))).await;
    send(&app, register_request("a@x.com", "pw123456", "Ann", "Acme")).await;

    let wrong_password = send(&app, login_request("a@x.com", "pw1234567")).await;
    let unknown_email = send(&app, login_request("nobody@x.com", "pw123456")).await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(
        wrong_password.1.get("message"),
        Some(&json!(crate::domain::INVALID_CREDENTIALS))
    );
}

#[rstest]
#[case("", "pw", "email", "empty_email")]
#[case("a@x.com", "", "password", "empty_password")]
#[actix_web::test]
async fn blank_login_fields_are_invalid_requests(
    clock: Arc<MutableClock>,
    #[case] email: &str,
    #[case] password: &str,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(api_app(in_memory_state(clock))).await;

    let (status, body) = send(&app, login_request(email, password)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.pointer("/details/field"), Some(&json!(field)));
    assert_eq!(body.pointer("/details/code"), Some(&json!(code)));
}

#[rstest]
#[case(None)]
#[case(Some("Bearer not-a-token"))]
#[case(Some("Basic YTpi"))]
#[actix_web::test]
async fn whoami_requires_a_valid_token(clock: Arc<MutableClock>, #[case] header: Option<&str>) {
    let app = actix_test::init_service(api_app(in_memory_state(clock))).await;

    let (status, body) = send(&app, me_request(header)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.get("code"), Some(&json!("unauthorized")));
}

#[rstest]
#[actix_web::test]
async fn tokens_stop_working_after_a_day(clock: Arc<MutableClock>) {
    let app = actix_test::init_service(api_app(in_memory_state(clock.clone()))).await;
    send(&app, register_request("a@x.com", "pw123456", "Ann", "Acme")).await;
    let (_, login) = send(&app, login_request("a@x.com", "pw123456")).await;
    let bearer = format!("Bearer {}", token_of(&login));

    clock.advance(TimeDelta::hours(24) - TimeDelta::seconds(1));
    let (still_valid, _) = send(&app, me_request(Some(&bearer))).await;
    assert_eq!(still_valid, StatusCode::OK);

    clock.advance(TimeDelta::seconds(1));
    let (expired, _) = send(&app, me_request(Some(&bearer))).await;
    assert_eq!(expired, StatusCode::UNAUTHORIZED);
}

#[given("a registration with a short password")]
fn a_registration_with_a_short_password() -> RegisterRequest {
    RegisterRequest {
        email: "a@x.com".to_owned(),
        password: "1234567".to_owned(),
        full_name: "Ann".to_owned(),
        company_name: "Acme".to_owned(),
    }
}

#[when("the registration is validated")]
fn the_registration_is_validated(request: RegisterRequest) -> Result<Registration, Error> {
    Registration::try_from(request).map_err(map_registration_validation_error)
}

#[then("the password field is reported")]
fn the_password_field_is_reported(result: Result<Registration, Error>) {
    let error = result.expect_err("short password must fail");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details(),
        Some(&json!({"field": "password", "code": "password_too_short"}))
    );
    assert_eq!(error.message(), "password must be at least 8 characters");
}

#[rstest]
fn short_passwords_are_reported_on_the_password_field() {
    let request = a_registration_with_a_short_password();
    let result = the_registration_is_validated(request);
    the_password_field_is_reported(result);
}

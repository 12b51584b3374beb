//! End-to-end account lifecycle against a live server.
//!
//! Boots the real server on an ephemeral port with in-memory stores and
//! drives it twice: once with raw HTTP calls, once through the session
//! holder a client application would embed.

#[path = "support/live_server.rs"]
mod live_server;

use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use awc::Client;
use chrono::{TimeDelta, Utc};
use live_server::{LiveServer, get_with_token, post_json, push_billing_update};
use rstest::rstest;
use serde_json::{Value, json};
use tenantry_session::{
    EntitlementStatus, MemoryTokenStore, Notification, Notifier, SessionClientConfig,
    SessionHolder, SessionState, SignUp, TokenStore, titles,
};
use url::Url;

#[derive(Default)]
struct RecordingNotifier(Mutex<Vec<Notification>>);

impl RecordingNotifier {
    fn titles(&self) -> Vec<String> {
        self.0
            .lock()
            .expect("notifier lock")
            .iter()
            .map(|n| n.title.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.0.lock().expect("notifier lock").push(notification);
    }
}

#[rstest]
#[actix_rt::test]
async fn probes_report_ready_once_bound() {
    let server = LiveServer::start();

    for path in ["/health/ready", "/health/live"] {
        let response = Client::default()
            .get(server.url(path))
            .send()
            .await
            .expect("probe request");
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }

    server.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn register_login_and_subscribe_over_http() {
    let server = LiveServer::start();
    let registration = json!({
        "email": "Ann@Acme.test",
        "password": "pw123456",
        "fullName": "Ann Example",
        "companyName": "Acme",
    });

    let (status, account) = post_json(&server, "/api/v1/auth/register", &registration).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(account.get("email"), Some(&json!("ann@acme.test")));

    let (status, conflict) = post_json(&server, "/api/v1/auth/register", &registration).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict.get("code"), Some(&json!("conflict")));

    let (status, login) = post_json(
        &server,
        "/api/v1/auth/login",
        &json!({"email": "ann@acme.test", "password": "pw123456"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = login
        .get("token")
        .and_then(Value::as_str)
        .expect("token")
        .to_owned();

    let (status, me) = get_with_token(&server, "/api/v1/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me.pointer("/profile/company/slug"), Some(&json!("acme")));
    assert_eq!(me.pointer("/profile/role"), Some(&json!("admin")));

    let (_, before) = get_with_token(&server, "/api/v1/entitlement", &token).await;
    assert_eq!(before.get("subscribed"), Some(&json!(false)));

    let expiry = Utc::now() + TimeDelta::days(30);
    let (status, ack) = push_billing_update(
        &server,
        &json!({
            "email": "ann@acme.test",
            "subscribed": true,
            "tier": "Premium",
            "expiry": expiry.to_rfc3339(),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({"success": true}));

    let (_, after) = get_with_token(&server, "/api/v1/entitlement", &token).await;
    assert_eq!(after.get("subscribed"), Some(&json!(true)));
    assert_eq!(after.get("tier"), Some(&json!("Premium")));

    server.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn unsigned_billing_update_is_refused() {
    let server = LiveServer::start();

    let (status, body) = post_json(
        &server,
        "/api/v1/billing/entitlement",
        &json!({"email": "ann@acme.test", "subscribed": true}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.get("code"), Some(&json!("unauthorized")));
    server.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn session_holder_follows_the_account_through_its_lifecycle() {
    let server = LiveServer::start();
    let base = Url::parse(&format!("{}/", server.base_url)).expect("base URL");
    let config = SessionClientConfig::new(base);
    let tokens = Arc::new(MemoryTokenStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let holder =
        SessionHolder::connect(&config, tokens.clone(), notifier.clone()).expect("client builds");

    let signed_up = holder
        .sign_up(SignUp::new("ann@acme.test", "pw123456", "Ann", "Acme"))
        .await
        .expect("sign up");
    let first = signed_up.entitlement.wait().await.expect("first entitlement");
    assert!(!first.subscribed);

    let (status, _) = push_billing_update(
        &server,
        &json!({
            "email": "ann@acme.test",
            "subscribed": true,
            "tier": "Premium",
            "expiry": (Utc::now() + TimeDelta::days(30)).to_rfc3339(),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let refreshed = holder.refresh_entitlement().await.expect("refresh");
    assert!(refreshed.subscribed);

    // A second holder over the same store resumes the session from the token.
    let resumed =
        SessionHolder::connect(&config, tokens.clone(), notifier.clone()).expect("client builds");
    let restored = resumed.restore().await.expect("restore").expect("session");
    let slug = restored
        .profile
        .as_ref()
        .and_then(|profile| profile.company.as_ref())
        .map(|company| company.slug.as_str());
    assert_eq!(slug, Some("acme"));
    restored.entitlement.wait().await.expect("restored entitlement");
    assert!(matches!(
        resumed.state(),
        SessionState::Authenticated {
            entitlement: EntitlementStatus::Known(ref e),
            ..
        } if e.subscribed
    ));

    holder.sign_out().expect("sign out");
    assert_eq!(holder.state(), SessionState::Unauthenticated);
    assert!(tokens.load().expect("token store").is_none());
    assert_eq!(
        notifier.titles(),
        vec![
            titles::SIGN_UP_SUCCEEDED.to_owned(),
            titles::SIGNED_OUT.to_owned()
        ]
    );

    server.stop().await;
}

#[rstest]
#[actix_rt::test]
async fn wrong_password_is_reported_to_the_holder() {
    let server = LiveServer::start();
    let base = Url::parse(&format!("{}/", server.base_url)).expect("base URL");
    let notifier = Arc::new(RecordingNotifier::default());
    let holder = SessionHolder::connect(
        &SessionClientConfig::new(base),
        Arc::new(MemoryTokenStore::default()),
        notifier.clone(),
    )
    .expect("client builds");

    let err = holder
        .sign_in("nobody@acme.test", "pw123456")
        .await
        .expect_err("unknown account");

    assert!(err.is_unauthorized());
    assert_eq!(holder.state(), SessionState::Unauthenticated);
    assert_eq!(notifier.titles(), vec![titles::SIGN_IN_FAILED.to_owned()]);
    server.stop().await;
}

//! Live server harness shared by the HTTP integration suites.
//!
//! Serves the real application on an ephemeral port so tests talk to it
//! over TCP exactly as a client would.

use std::net::TcpListener;

use actix_web::dev::ServerHandle;
use actix_web::http::{StatusCode, header};
use actix_web::web;
use awc::Client;
use serde_json::Value;
use tenantry::inbound::http::health::HealthState;
use tenantry::inbound::http::webhook_signature::{SIGNATURE_HEADER, WebhookVerifier};
use tenantry::outbound::crypto::Argon2Settings;
use tenantry::server::{ServerConfig, ServerSecrets, create_server};

pub(crate) const TOKEN_SECRET: &[u8] = b"integration-token-secret-32bytes";
pub(crate) const WEBHOOK_SECRET: &[u8] = b"integration-webhook-secret";

pub(crate) struct LiveServer {
    pub(crate) base_url: String,
    handle: ServerHandle,
}

impl LiveServer {
    pub(crate) fn start() -> Self {
        Self::start_with(|config| config)
    }

    /// Start a server after `adjust` has amended the default configuration.
    pub(crate) fn start_with(adjust: impl FnOnce(ServerConfig) -> ServerConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral port");
        let addr = listener.local_addr().expect("bound address");
        let config = adjust(ServerConfig::new(
            addr,
            ServerSecrets::new(TOKEN_SECRET.to_vec(), WEBHOOK_SECRET.to_vec()),
        )
        .with_listener(listener)
        .with_argon2(Argon2Settings {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }));
        let server =
            create_server(web::Data::new(HealthState::new()), config).expect("server starts");
        let handle = server.handle();
        actix_web::rt::spawn(server);
        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) async fn stop(self) {
        self.handle.stop(true).await;
    }
}

pub(crate) async fn read_json<S>(mut response: awc::ClientResponse<S>) -> (StatusCode, Value)
where
    S: futures::Stream<Item = Result<web::Bytes, awc::error::PayloadError>> + Unpin,
{
    let status = response.status();
    let body = response.body().await.expect("response body");
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

pub(crate) async fn post_json(server: &LiveServer, path: &str, payload: &Value) -> (StatusCode, Value) {
    let response = Client::default()
        .post(server.url(path))
        .send_json(payload)
        .await
        .expect("POST request");
    read_json(response).await
}

pub(crate) async fn get_with_token(server: &LiveServer, path: &str, token: &str) -> (StatusCode, Value) {
    let response = Client::default()
        .get(server.url(path))
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .send()
        .await
        .expect("GET request");
    read_json(response).await
}

pub(crate) async fn push_billing_update(server: &LiveServer, payload: &Value) -> (StatusCode, Value) {
    let body = serde_json::to_vec(payload).expect("serialise payload");
    let signature = WebhookVerifier::new(WEBHOOK_SECRET.to_vec()).sign(&body);
    let response = Client::default()
        .post(server.url("/api/v1/billing/entitlement"))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .insert_header((SIGNATURE_HEADER, signature))
        .send_body(body)
        .await
        .expect("billing request");
    read_json(response).await
}

//! Reqwest-backed [`AccountApi`] adapter.
//!
//! Owns transport details only: URL resolution, bearer headers, timeout and
//! status mapping, and JSON decoding.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::api::{Account, AccountApi, AccountDetails, Entitlement, LoginOutcome, SignUp};
use crate::{SessionClientConfig, SessionError};

const REGISTER_PATH: &str = "api/v1/auth/register";
const LOGIN_PATH: &str = "api/v1/auth/login";
const WHOAMI_PATH: &str = "api/v1/auth/me";
const ENTITLEMENT_PATH: &str = "api/v1/entitlement";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody<'a> {
    email: &'a str,
    password: &'a str,
    full_name: &'a str,
    company_name: &'a str,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginBodyResponse {
    token: String,
    account: Account,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// HTTP client for the account service.
#[derive(Debug, Clone)]
pub struct HttpAccountApi {
    client: Client,
    base_url: Url,
    request_timeout: std::time::Duration,
}

impl HttpAccountApi {
    /// Build a client from `config`.
    ///
    /// # Errors
    /// Returns [`SessionError::Transport`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: &SessionClientConfig) -> Result<Self, SessionError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| SessionError::Transport {
                message: err.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            request_timeout: config.request_timeout,
        })
    }

    fn url(&self, path: &str) -> Result<Url, SessionError> {
        self.base_url.join(path).map_err(|err| SessionError::Transport {
            message: format!("invalid URL for {path}: {err}"),
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SessionError> {
        let response = request
            .send()
            .await
            .map_err(|err| self.map_transport_error(&err))?;
        decode(response).await
    }

    fn map_transport_error(&self, err: &reqwest::Error) -> SessionError {
        if err.is_timeout() {
            SessionError::Timeout {
                timeout: self.request_timeout,
            }
        } else {
            SessionError::Transport {
                message: err.to_string(),
            }
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SessionError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| SessionError::Transport {
            message: err.to_string(),
        })?;
    if status.is_success() {
        return serde_json::from_slice(&body).map_err(|err| SessionError::Decode {
            message: err.to_string(),
        });
    }

    let payload: Option<ErrorBody> = serde_json::from_slice(&body).ok();
    let (code, message) = payload.map_or((None, None), |p| (p.code, p.message));
    debug!(status = status.as_u16(), code = ?code, "account service rejected request");
    Err(SessionError::Rejected {
        status: status.as_u16(),
        code,
        message: message.unwrap_or_else(|| format!("request failed with status {status}")),
    })
}

#[async_trait]
impl AccountApi for HttpAccountApi {
    async fn register(&self, sign_up: &SignUp) -> Result<Account, SessionError> {
        let body = RegisterBody {
            email: &sign_up.email,
            password: &sign_up.password,
            full_name: &sign_up.full_name,
            company_name: &sign_up.company_name,
        };
        let request = self.client.post(self.url(REGISTER_PATH)?).json(&body);
        self.send(request).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SessionError> {
        let request = self
            .client
            .post(self.url(LOGIN_PATH)?)
            .json(&LoginBody { email, password });
        let LoginBodyResponse { token, account } = self.send(request).await?;
        Ok(LoginOutcome {
            token: Zeroizing::new(token),
            account,
        })
    }

    async fn whoami(&self, token: &str) -> Result<AccountDetails, SessionError> {
        let request = self.client.get(self.url(WHOAMI_PATH)?).bearer_auth(token);
        self.send(request).await
    }

    async fn check_entitlement(&self, token: &str) -> Result<Entitlement, SessionError> {
        let request = self.client.get(self.url(ENTITLEMENT_PATH)?).bearer_auth(token);
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn api(base: &str) -> HttpAccountApi {
        let config = SessionClientConfig::new(Url::parse(base).expect("valid URL"));
        HttpAccountApi::new(&config).expect("client builds")
    }

    #[rstest]
    #[case("https://accounts.test/", "https://accounts.test/api/v1/auth/me")]
    #[case("https://accounts.test/tenant/", "https://accounts.test/tenant/api/v1/auth/me")]
    fn paths_resolve_against_the_base(#[case] base: &str, #[case] expected: &str) {
        let url = api(base).url(WHOAMI_PATH).expect("joins");
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    fn sign_up_fields_serialise_in_camel_case() {
        let body = RegisterBody {
            email: "a@x.com",
            password: "pw123456",
            full_name: "Ann",
            company_name: "Acme",
        };
        let json = serde_json::to_value(&body).expect("serialises");
        assert_eq!(json.get("fullName"), Some(&serde_json::json!("Ann")));
        assert_eq!(json.get("companyName"), Some(&serde_json::json!("Acme")));
    }
}

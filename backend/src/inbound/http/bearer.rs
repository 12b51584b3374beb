//! Bearer token extraction.
//!
//! Handlers that need a caller identity take [`BearerIdentity`] as an
//! argument; extraction verifies the token through the `TokenVerifier` port
//! held in [`HttpState`] and never touches storage.

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::{AuthenticatedIdentity, Error, SessionToken};
use crate::inbound::http::state::HttpState;

const BEARER_SCHEME: &str = "Bearer ";

/// Identity proven by the request's `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct BearerIdentity(pub AuthenticatedIdentity);

impl BearerIdentity {
    /// Verified identity.
    pub fn into_inner(self) -> AuthenticatedIdentity {
        self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Option<SessionToken> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_at_checked(BEARER_SCHEME.len())?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) || token.is_empty() {
        return None;
    }
    Some(SessionToken::new(token))
}

fn extract(req: &HttpRequest) -> Result<BearerIdentity, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state is not registered"))?;
    let token = bearer_token(req).ok_or_else(|| Error::unauthorized("bearer token required"))?;
    state.tokens.verify(&token).map(BearerIdentity)
}

impl FromRequest for BearerIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    #[case("Bearer abc.def", Some("abc.def"))]
    #[case("bearer abc.def", Some("abc.def"))]
    #[case("Bearer   padded  ", Some("padded"))]
    #[case("Bearer ", None)]
    #[case("Basic abc", None)]
    #[case("Bear", None)]
    fn parses_bearer_headers(#[case] value: &str, #[case] expected: Option<&str>) {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, value))
            .to_http_request();
        let token = bearer_token(&req);
        assert_eq!(token.as_ref().map(SessionToken::expose), expected);
    }

    #[rstest]
    fn missing_header_has_no_token() {
        let req = TestRequest::default().to_http_request();
        assert!(bearer_token(&req).is_none());
    }
}

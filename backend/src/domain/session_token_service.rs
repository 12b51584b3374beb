//! Token issuance and stateless verification.

use std::sync::Arc;

use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{TokenSigner, TokenVerifier};
use crate::domain::{AuthenticatedIdentity, Error, SessionToken, TokenClaims};

const INVALID_TOKEN: &str = "invalid or expired token";

/// Issues and verifies bearer tokens against the injected clock.
pub struct SessionTokenService<S> {
    signer: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> SessionTokenService<S> {
    /// Create a new service around `signer`.
    pub fn new(signer: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { signer, clock }
    }
}

impl<S: TokenSigner> SessionTokenService<S> {
    /// Sign a token for `identity` valid for the standard lifetime.
    pub fn issue(&self, identity: &AuthenticatedIdentity) -> Result<SessionToken, Error> {
        let claims = TokenClaims::issue(identity, self.clock.utc());
        self.signer
            .sign(&claims)
            .map_err(|err| Error::internal(err.to_string()))
    }
}

impl<S: TokenSigner> TokenVerifier for SessionTokenService<S> {
    fn verify(&self, token: &SessionToken) -> Result<AuthenticatedIdentity, Error> {
        let claims = self.signer.decode(token).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            Error::unauthorized(INVALID_TOKEN)
        })?;

        if !claims.is_live_at(self.clock.utc()) {
            debug!(exp = claims.exp, "bearer token expired");
            return Err(Error::unauthorized(INVALID_TOKEN));
        }

        claims.identity().ok_or_else(|| {
            debug!("bearer token carries malformed claims");
            Error::unauthorized(INVALID_TOKEN)
        })
    }
}

//! Password login: authenticate against the credential store, then issue a
//! session token.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    AccountRepository, LoginOutcome, LoginService, PasswordHasher, TokenSigner,
};
use crate::domain::{
    AccountService, AuthenticatedIdentity, Error, LoginCredentials, SessionTokenService,
};

/// [`LoginService`] backed by password credentials and signed tokens.
pub struct PasswordLoginService<R, H, S> {
    accounts: Arc<AccountService<R, H>>,
    tokens: Arc<SessionTokenService<S>>,
}

impl<R, H, S> PasswordLoginService<R, H, S> {
    /// Compose an account service with a token service.
    pub fn new(accounts: Arc<AccountService<R, H>>, tokens: Arc<SessionTokenService<S>>) -> Self {
        Self { accounts, tokens }
    }
}

#[async_trait]
impl<R, H, S> LoginService for PasswordLoginService<R, H, S>
where
    R: AccountRepository,
    H: PasswordHasher + 'static,
    S: TokenSigner,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let account = self.accounts.authenticate(credentials).await?;
        let identity = AuthenticatedIdentity {
            account_id: account.id,
            email: account.email.clone(),
        };
        let token = self.tokens.issue(&identity)?;
        info!(account_id = %account.id, "session token issued");
        Ok(LoginOutcome { token, account })
    }
}

//! Client-side session state machine.
//!
//! A [`SessionHolder`] owns the current [`SessionState`] and publishes every
//! change on a `tokio::sync::watch` channel. Identity is always confirmed
//! before entitlement is requested, and each authentication starts a new
//! epoch: an entitlement answer that belongs to an older epoch is dropped
//! instead of overwriting the newer session.
//!
//! The stored token only changes together with the state, under the watch
//! channel's lock, so a late failure from an older epoch cannot discard the
//! token of a newer session.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::api::{Account, AccountApi, Entitlement, Profile, SignUp};
use crate::http::HttpAccountApi;
use crate::notifier::{Notification, Notifier};
use crate::token_store::TokenStore;
use crate::{SessionClientConfig, SessionError};

/// Notification titles raised by the holder.
pub mod titles {
    /// Registration or the follow-up login failed.
    pub const SIGN_UP_FAILED: &str = "Sign up failed";
    /// Registration and login succeeded.
    pub const SIGN_UP_SUCCEEDED: &str = "Account created successfully!";
    /// Login failed.
    pub const SIGN_IN_FAILED: &str = "Sign in failed";
    /// Login succeeded.
    pub const SIGN_IN_SUCCEEDED: &str = "Welcome back!";
    /// Local sign-out completed.
    pub const SIGNED_OUT: &str = "Signed out";
    /// Local sign-out could not discard the stored token.
    pub const SIGN_OUT_FAILED: &str = "Sign out failed";
    /// A stored token could not be verified at start-up.
    pub const SESSION_EXPIRED: &str = "Session expired";
    /// The entitlement check failed.
    pub const ENTITLEMENT_FAILED: &str = "Could not check subscription";
}

/// Entitlement of an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitlementStatus {
    /// Not fetched yet. This is unknown, not "unsubscribed".
    Pending,
    /// Last answer from the server.
    Known(Entitlement),
}

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No session.
    Unauthenticated,
    /// A stored token is being verified.
    Authenticating,
    /// Identity confirmed.
    Authenticated {
        /// Signed-in account.
        account: Account,
        /// Profile, `None` when the server returned none or could not be
        /// asked right after login.
        profile: Option<Profile>,
        /// Entitlement of the account.
        entitlement: EntitlementStatus,
    },
}

/// Outcome of a successful sign-in, sign-up, or restore.
#[derive(Debug)]
pub struct SignedIn {
    /// Signed-in account.
    pub account: Account,
    /// Profile, when the server returned one.
    pub profile: Option<Profile>,
    /// Entitlement check started once identity was confirmed.
    pub entitlement: EntitlementRefresh,
}

/// Handle to an in-flight entitlement check.
///
/// The check runs whether or not the handle is awaited; dropping it only
/// discards the result. The session state is updated either way unless the
/// session changed in the meantime.
#[derive(Debug)]
pub struct EntitlementRefresh {
    task: JoinHandle<Result<Entitlement, SessionError>>,
}

impl EntitlementRefresh {
    fn spawn(shared: Arc<Shared>, epoch: u64, token: Zeroizing<String>) -> Self {
        Self {
            task: tokio::spawn(shared.refresh(epoch, token)),
        }
    }

    /// Wait for the entitlement answer.
    ///
    /// # Errors
    /// Returns the request failure, or [`SessionError::Superseded`] when
    /// the session was signed out or replaced before the answer arrived.
    pub async fn wait(self) -> Result<Entitlement, SessionError> {
        self.task.await.map_err(|err| SessionError::Transport {
            message: format!("entitlement refresh did not complete: {err}"),
        })?
    }
}

struct Shared {
    api: Arc<dyn AccountApi>,
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    verify_timeout: Duration,
    state: watch::Sender<SessionState>,
    // Only written inside `state` modifications, so reads under the watch
    // lock see the epoch that matches the state.
    epoch: AtomicU64,
}

impl Shared {
    /// Start verifying a stored token, unless a session is already active.
    fn begin_restore(&self) -> Option<u64> {
        let mut opened = None;
        self.state.send_if_modified(|state| {
            if matches!(state, SessionState::Authenticated { .. }) {
                return false;
            }
            opened = Some(self.epoch.fetch_add(1, Ordering::SeqCst) + 1);
            *state = SessionState::Authenticating;
            true
        });
        opened
    }

    /// Store `token` and open a new epoch with `next`.
    ///
    /// Nothing changes when the token cannot be stored.
    fn adopt(&self, token: &str, next: SessionState) -> Result<u64, SessionError> {
        let mut adopted = Err(SessionError::Superseded);
        self.state.send_if_modified(|state| {
            if let Err(err) = self.tokens.save(token) {
                adopted = Err(err.into());
                return false;
            }
            adopted = Ok(self.epoch.fetch_add(1, Ordering::SeqCst) + 1);
            *state = next;
            true
        });
        adopted
    }

    /// Open an unauthenticated epoch and discard the stored token.
    ///
    /// The state is reset even when the token cannot be discarded.
    fn reset(&self) -> Result<(), SessionError> {
        let mut cleared = Ok(());
        self.state.send_modify(|state| {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            *state = SessionState::Unauthenticated;
            cleared = self.tokens.clear().map_err(SessionError::from);
        });
        cleared
    }

    /// Apply `update` only while `epoch` is still current.
    fn settle(&self, epoch: u64, update: impl FnOnce(&mut SessionState) -> bool) -> bool {
        self.state.send_if_modified(|state| {
            self.epoch.load(Ordering::SeqCst) == epoch && update(state)
        })
    }

    fn authenticated_epoch(&self) -> Option<u64> {
        let state = self.state.borrow();
        matches!(*state, SessionState::Authenticated { .. })
            .then(|| self.epoch.load(Ordering::SeqCst))
    }

    fn fail(&self, title: &str, err: SessionError) -> SessionError {
        self.notifier
            .notify(Notification::failure(title, err.to_string()));
        err
    }

    async fn refresh(
        self: Arc<Self>,
        epoch: u64,
        token: Zeroizing<String>,
    ) -> Result<Entitlement, SessionError> {
        let entitlement = self
            .api
            .check_entitlement(&token)
            .await
            .map_err(|err| self.fail(titles::ENTITLEMENT_FAILED, err))?;

        let applied = self.settle(epoch, |state| match state {
            SessionState::Authenticated {
                entitlement: slot, ..
            } => {
                *slot = EntitlementStatus::Known(entitlement.clone());
                true
            }
            SessionState::Unauthenticated | SessionState::Authenticating => false,
        });
        if applied {
            Ok(entitlement)
        } else {
            debug!(epoch, "dropping entitlement for a superseded session");
            Err(SessionError::Superseded)
        }
    }
}

/// Holder of the current user session.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use tenantry_session::{
///     MemoryTokenStore, SessionClientConfig, SessionHolder, SessionState, TracingNotifier,
/// };
/// use url::Url;
///
/// let config = SessionClientConfig::new(Url::parse("http://127.0.0.1:8080/").expect("URL"));
/// let holder = SessionHolder::connect(
///     &config,
///     Arc::new(MemoryTokenStore::default()),
///     Arc::new(TracingNotifier),
/// )
/// .expect("client builds");
/// assert_eq!(holder.state(), SessionState::Unauthenticated);
/// ```
pub struct SessionHolder {
    shared: Arc<Shared>,
}

impl SessionHolder {
    /// Holder over an explicit account API.
    #[must_use]
    pub fn new(
        api: Arc<dyn AccountApi>,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
        verify_timeout: Duration,
    ) -> Self {
        let (state, _initial) = watch::channel(SessionState::Unauthenticated);
        Self {
            shared: Arc::new(Shared {
                api,
                tokens,
                notifier,
                verify_timeout,
                state,
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Holder talking HTTP to the server named in `config`.
    ///
    /// # Errors
    /// Returns [`SessionError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn connect(
        config: &SessionClientConfig,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, SessionError> {
        let api = HttpAccountApi::new(config)?;
        Ok(Self::new(
            Arc::new(api),
            tokens,
            notifier,
            config.verify_timeout,
        ))
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    /// Resume the session of a stored token.
    ///
    /// Returns `Ok(None)` when no token is stored or a session is already
    /// active. A token that fails
    /// verification, or is not verified within the configured timeout, is
    /// discarded and the holder ends up unauthenticated.
    ///
    /// # Errors
    /// Returns the verification failure, [`SessionError::Timeout`], or a
    /// token store failure. Returns [`SessionError::Superseded`] when a
    /// sign-in or sign-out finished while the token was being verified; the
    /// newer session is left untouched.
    pub async fn restore(&self) -> Result<Option<SignedIn>, SessionError> {
        let shared = &self.shared;
        let Some(token) = shared.tokens.load().map_err(SessionError::from)? else {
            return Ok(None);
        };

        let Some(epoch) = shared.begin_restore() else {
            debug!("session already active; nothing to restore");
            return Ok(None);
        };
        let timeout = shared.verify_timeout;
        let verified = tokio::time::timeout(timeout, shared.api.whoami(&token))
            .await
            .unwrap_or_else(|_elapsed| Err(SessionError::Timeout { timeout }));

        let details = match verified {
            Ok(details) => details,
            Err(err) => {
                let discarded = shared.settle(epoch, |state| {
                    if let Err(clear_err) = shared.tokens.clear() {
                        warn!(error = %clear_err, "could not discard rejected token");
                    }
                    *state = SessionState::Unauthenticated;
                    true
                });
                if !discarded {
                    debug!(error = %err, "stored token rejected after the session changed");
                    return Err(SessionError::Superseded);
                }
                debug!(error = %err, "stored token rejected");
                return Err(shared.fail(titles::SESSION_EXPIRED, err));
            }
        };

        let adopted = shared.settle(epoch, |state| {
            *state = SessionState::Authenticated {
                account: details.account.clone(),
                profile: details.profile.clone(),
                entitlement: EntitlementStatus::Pending,
            };
            true
        });
        if !adopted {
            return Err(SessionError::Superseded);
        }
        Ok(Some(SignedIn {
            account: details.account,
            profile: details.profile,
            entitlement: EntitlementRefresh::spawn(Arc::clone(shared), epoch, token),
        }))
    }

    /// Create an account, then sign in with the same credentials.
    ///
    /// # Errors
    /// Returns the registration or login failure, or a token store failure.
    pub async fn sign_up(&self, sign_up: SignUp) -> Result<SignedIn, SessionError> {
        let account = self
            .shared
            .api
            .register(&sign_up)
            .await
            .map_err(|err| self.shared.fail(titles::SIGN_UP_FAILED, err))?;
        debug!(account_id = %account.id, "account registered");

        let signed_in = self
            .authenticate(&sign_up.email, &sign_up.password)
            .await
            .map_err(|err| self.shared.fail(titles::SIGN_UP_FAILED, err))?;
        self.shared
            .notifier
            .notify(Notification::success(titles::SIGN_UP_SUCCEEDED));
        Ok(signed_in)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    /// Returns the login failure or a token store failure.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, SessionError> {
        let signed_in = self
            .authenticate(email, password)
            .await
            .map_err(|err| self.shared.fail(titles::SIGN_IN_FAILED, err))?;
        self.shared
            .notifier
            .notify(Notification::success(titles::SIGN_IN_SUCCEEDED));
        Ok(signed_in)
    }

    /// Fetch the entitlement of the current session again.
    ///
    /// # Errors
    /// Returns [`SessionError::NotAuthenticated`] without a session, the
    /// request failure, or [`SessionError::Superseded`].
    pub async fn refresh_entitlement(&self) -> Result<Entitlement, SessionError> {
        let shared = &self.shared;
        let epoch = shared
            .authenticated_epoch()
            .ok_or(SessionError::NotAuthenticated)
            .map_err(|err| shared.fail(titles::ENTITLEMENT_FAILED, err))?;
        let token = shared
            .tokens
            .load()
            .map_err(SessionError::from)
            .and_then(|token| token.ok_or(SessionError::NotAuthenticated))
            .map_err(|err| shared.fail(titles::ENTITLEMENT_FAILED, err))?;
        Arc::clone(shared).refresh(epoch, token).await
    }

    /// Forget the session locally. The server is not contacted.
    ///
    /// # Errors
    /// Returns a token store failure; the holder is unauthenticated either
    /// way.
    pub fn sign_out(&self) -> Result<(), SessionError> {
        self.shared
            .reset()
            .map_err(|err| self.shared.fail(titles::SIGN_OUT_FAILED, err))?;
        self.shared
            .notifier
            .notify(Notification::success(titles::SIGNED_OUT));
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<SignedIn, SessionError> {
        let outcome = self.shared.api.login(email, password).await?;
        let profile = match self.shared.api.whoami(&outcome.token).await {
            Ok(details) => details.profile,
            Err(err) => {
                warn!(error = %err, "profile unavailable after login");
                None
            }
        };
        let epoch = self.shared.adopt(
            &outcome.token,
            SessionState::Authenticated {
                account: outcome.account.clone(),
                profile: profile.clone(),
                entitlement: EntitlementStatus::Pending,
            },
        )?;
        Ok(SignedIn {
            account: outcome.account,
            profile,
            entitlement: EntitlementRefresh::spawn(Arc::clone(&self.shared), epoch, outcome.token),
        })
    }
}

#[cfg(test)]
#[path = "holder_tests.rs"]
mod tests;

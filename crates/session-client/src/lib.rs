//! Client-side session holder for the tenantry account and entitlement API.
//!
//! The crate keeps "who is signed in" and "what are they entitled to" for a
//! client process. It talks to the server through the [`AccountApi`] port
//! ([`HttpAccountApi`] in production), persists the bearer token through a
//! [`TokenStore`], and reports outcomes to a [`Notifier`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tenantry_session::{
//!     FileTokenStore, SessionClientConfig, SessionHolder, SignUp, TracingNotifier,
//! };
//! use url::Url;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionClientConfig::new(Url::parse("https://accounts.example.test/")?);
//! let tokens = Arc::new(FileTokenStore::open("/var/lib/app/token")?);
//! let holder = SessionHolder::connect(&config, tokens, Arc::new(TracingNotifier))?;
//!
//! if holder.restore().await?.is_none() {
//!     let signed_in = holder
//!         .sign_up(SignUp::new("ann@acme.test", "pw123456", "Ann", "Acme"))
//!         .await?;
//!     let entitlement = signed_in.entitlement.wait().await?;
//!     println!("subscribed: {}", entitlement.subscribed);
//! }
//! # Ok(())
//! # }
//! ```

mod api;
mod config;
mod error;
mod holder;
mod http;
mod notifier;
mod token_store;

pub use api::{
    Account, AccountApi, AccountDetails, Company, Entitlement, LoginOutcome, Profile, SignUp,
};
pub use config::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_VERIFY_TIMEOUT, SessionClientConfig};
pub use error::SessionError;
pub use holder::{
    EntitlementRefresh, EntitlementStatus, SessionHolder, SessionState, SignedIn, titles,
};
pub use http::HttpAccountApi;
pub use notifier::{Notification, NotificationKind, Notifier, TracingNotifier};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};

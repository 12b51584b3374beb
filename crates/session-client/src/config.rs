//! Client configuration.

use std::time::Duration;

use url::Url;

/// Default bound on every HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default bound on verifying a stored token at start-up.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`crate::HttpAccountApi`] and
/// [`crate::SessionHolder`].
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use tenantry_session::SessionClientConfig;
/// use url::Url;
///
/// let base = Url::parse("https://accounts.example.test/").expect("valid URL");
/// let config = SessionClientConfig::new(base).with_verify_timeout(Duration::from_secs(3));
/// assert_eq!(config.verify_timeout, Duration::from_secs(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClientConfig {
    /// Server origin; API paths are resolved against it.
    pub base_url: Url,
    /// Timeout applied to each request.
    pub request_timeout: Duration,
    /// Timeout for the `whoami` call made by [`crate::SessionHolder::restore`].
    pub verify_timeout: Duration,
}

impl SessionClientConfig {
    /// Settings with the default timeouts.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the start-up verification timeout.
    #[must_use]
    pub fn with_verify_timeout(mut self, timeout: Duration) -> Self {
        self.verify_timeout = timeout;
        self
    }
}

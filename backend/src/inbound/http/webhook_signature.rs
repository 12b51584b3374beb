//! Shared-secret signatures for billing webhooks.
//!
//! The billing provider sends `X-Tenantry-Signature: sha256=<hex>` where the
//! hex value is HMAC-SHA256 of the raw request body.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-tenantry-signature";
const SCHEME_PREFIX: &str = "sha256=";

/// Verifies (and, for tests and tooling, produces) webhook signatures.
pub struct WebhookVerifier {
    secret: Zeroizing<Vec<u8>>,
}

impl WebhookVerifier {
    /// Verifier bound to `secret`.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
        }
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret).ok()
    }

    /// Header value for `body`.
    ///
    /// # Examples
    /// ```
    /// use tenantry::inbound::http::webhook_signature::WebhookVerifier;
    ///
    /// let verifier = WebhookVerifier::new(b"secret".to_vec());
    /// let header = verifier.sign(b"{}");
    /// assert!(header.starts_with("sha256="));
    /// assert!(verifier.verify(b"{}", &header));
    /// ```
    pub fn sign(&self, body: &[u8]) -> String {
        let digest = self
            .mac()
            .map(|mut mac| {
                mac.update(body);
                hex::encode(mac.finalize().into_bytes())
            })
            .unwrap_or_default();
        format!("{SCHEME_PREFIX}{digest}")
    }

    /// Constant-time check of `header` against `body`.
    pub fn verify(&self, body: &[u8], header: &str) -> bool {
        let Some(encoded) = header.trim().strip_prefix(SCHEME_PREFIX) else {
            return false;
        };
        let Ok(expected) = hex::decode(encoded) else {
            return false;
        };
        let Some(mut mac) = self.mac() else {
            return false;
        };
        mac.update(body);
        mac.verify_slice(&expected).is_ok()
    }
}

//! HS256 JWT implementation of the `TokenSigner` port.
//!
//! Expiry is not checked here: the token service compares
//! `exp` against its injected clock so tests can move time.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::domain::ports::{TokenSigner, TokenSignerError};
use crate::domain::{SessionToken, TokenClaims};

/// Signs and verifies tokens with a shared HMAC secret.
pub struct JwtTokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenSigner {
    /// Create a signer for `secret`.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl TokenSigner for JwtTokenSigner {
    fn sign(&self, claims: &TokenClaims) -> Result<SessionToken, TokenSignerError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map(SessionToken::new)
            .map_err(|err| TokenSignerError::signing(err.to_string()))
    }

    fn decode(&self, token: &SessionToken) -> Result<TokenClaims, TokenSignerError> {
        decode::<TokenClaims>(token.expose(), &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| TokenSignerError::rejected(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn claims() -> TokenClaims {
        TokenClaims {
            sub: "3fa85f64-5717-4562-b3fc-2c963f66afa6".to_owned(),
            email: "a@x.com".to_owned(),
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        }
    }

    #[rstest]
    fn signed_claims_decode_unchanged() {
        let signer = JwtTokenSigner::new(b"0123456789abcdef0123456789abcdef");
        let token = signer.sign(&claims()).expect("signed");
        assert_eq!(signer.decode(&token).expect("decoded"), claims());
    }

    #[rstest]
    fn expired_claims_still_decode() {
        // Expiry is judged by the caller's clock, not here.
        let signer = JwtTokenSigner::new(b"0123456789abcdef0123456789abcdef");
        let mut old = claims();
        old.iat = 1;
        old.exp = 2;
        let token = signer.sign(&old).expect("signed");
        assert_eq!(signer.decode(&token).expect("decoded"), old);
    }

    #[rstest]
    fn foreign_secret_is_rejected() {
        let signer = JwtTokenSigner::new(b"0123456789abcdef0123456789abcdef");
        let other = JwtTokenSigner::new(b"fedcba9876543210fedcba9876543210");
        let token = other.sign(&claims()).expect("signed");
        let error = signer.decode(&token).expect_err("rejected");
        assert!(matches!(error, TokenSignerError::Rejected { .. }));
    }

    #[rstest]
    #[case("")]
    #[case("a.b.c")]
    #[case("not a token")]
    fn malformed_tokens_are_rejected(#[case] raw: &str) {
        let signer = JwtTokenSigner::new(b"0123456789abcdef0123456789abcdef");
        assert!(signer.decode(&SessionToken::new(raw)).is_err());
    }

    #[rstest]
    fn tampered_payload_is_rejected() {
        let signer = JwtTokenSigner::new(b"0123456789abcdef0123456789abcdef");
        let token = signer.sign(&claims()).expect("signed");
        let mut parts: Vec<&str> = token.expose().split('.').collect();
        let forged_claims = TokenClaims {
            sub: "00000000-0000-4000-8000-000000000000".to_owned(),
            ..claims()
        };
        let forged = other_payload(&forged_claims);
        parts[1] = forged.as_str();
        let error = signer
            .decode(&SessionToken::new(parts.join(".")))
            .expect_err("rejected");
        assert!(matches!(error, TokenSignerError::Rejected { .. }));
    }

    fn other_payload(claims: &TokenClaims) -> String {
        let token = JwtTokenSigner::new(b"another-secret-another-secret-xx")
            .sign(claims)
            .expect("signed");
        token
            .expose()
            .split('.')
            .nth(1)
            .expect("payload segment")
            .to_owned()
    }
}

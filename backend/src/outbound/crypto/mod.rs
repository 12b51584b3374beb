//! Cryptographic adapters: password hashing and token signing.

mod argon2_hasher;
mod jwt_signer;

pub use argon2_hasher::{Argon2PasswordHasher, Argon2Settings};
pub use jwt_signer::JwtTokenSigner;

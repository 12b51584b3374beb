//! HTTP inbound adapter exposing the account and entitlement endpoints.

pub mod auth;
pub mod bearer;
pub mod entitlement;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod webhook_signature;

pub use error::ApiResult;

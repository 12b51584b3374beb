//! Entitlement API handlers.
//!
//! ```text
//! GET /api/v1/entitlement
//! POST /api/v1/billing/entitlement {"email":"a@x.com","subscribed":true,"tier":"Premium"}
//! ```

use actix_web::{HttpRequest, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{
    AccountId, AccountValidationError, EmailAddress, Entitlement, EntitlementUpdate,
    EntitlementValidationError, Error,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::BearerIdentity;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ACCOUNT_ID, BODY, EMAIL, EXPIRY, TIER, field_error, parse_optional_rfc3339_timestamp,
};
use crate::inbound::http::webhook_signature::SIGNATURE_HEADER;

/// Current entitlement of the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementResponse {
    /// Active right now.
    pub subscribed: bool,
    #[schema(example = "Premium")]
    pub tier: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
    pub employee_count: u32,
}

impl From<Entitlement> for EntitlementResponse {
    fn from(value: Entitlement) -> Self {
        Self {
            subscribed: value.subscribed,
            tier: value.tier,
            expiry: value.expires_at,
            employee_count: value.employee_count,
        }
    }
}

/// Billing provider payload for `POST /api/v1/billing/entitlement`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementUpdateRequest {
    #[schema(example = "ann@acme.test")]
    pub email: String,
    #[schema(format = Uuid)]
    pub account_id: Option<String>,
    pub subscribed: bool,
    #[schema(example = "Premium")]
    pub tier: Option<String>,
    /// RFC 3339 end of the paid period.
    #[schema(example = "2026-12-31T00:00:00Z")]
    pub expiry: Option<String>,
    pub billing_ref: Option<String>,
}

/// Acknowledgement returned to the billing provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateAck {
    pub success: bool,
}

fn parse_update(payload: EntitlementUpdateRequest) -> Result<EntitlementUpdate, Error> {
    let email = EmailAddress::new(&payload.email).map_err(|err| {
        let code = match err {
            AccountValidationError::EmptyEmail => "empty_email",
            AccountValidationError::EmailTooLong { .. } => "email_too_long",
            AccountValidationError::InvalidEmail | AccountValidationError::InvalidId => {
                "invalid_email"
            }
        };
        field_error(EMAIL, code, err.to_string())
    })?;
    let account_id = payload
        .account_id
        .as_deref()
        .map(|raw| {
            AccountId::new(raw).map_err(|_| {
                field_error(ACCOUNT_ID, "invalid_uuid", "accountId must be a valid UUID")
            })
        })
        .transpose()?;
    let tier = EntitlementUpdate::normalise_tier(payload.tier.as_deref()).map_err(|err| {
        let code = match err {
            EntitlementValidationError::EmptyTier => "empty_tier",
            EntitlementValidationError::TierTooLong { .. } => "tier_too_long",
        };
        field_error(TIER, code, err.to_string())
    })?;
    let expires_at = parse_optional_rfc3339_timestamp(payload.expiry.as_deref(), EXPIRY)?;

    Ok(EntitlementUpdate {
        email,
        account_id,
        subscribed: payload.subscribed,
        tier,
        expires_at,
        billing_ref: payload.billing_ref,
    })
}

/// Evaluate the caller's subscription at this instant.
#[utoipa::path(
    get,
    path = "/api/v1/entitlement",
    responses(
        (status = 200, description = "Current entitlement", body = EntitlementResponse),
        (status = 401, description = "Missing, invalid, or expired token", body = ErrorSchema),
        (status = 503, description = "Subscriber store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["entitlement"],
    operation_id = "checkEntitlement",
    security(("bearerAuth" = []))
)]
#[get("/entitlement")]
pub async fn check_entitlement(
    state: web::Data<HttpState>,
    identity: BearerIdentity,
) -> ApiResult<web::Json<EntitlementResponse>> {
    let entitlement = state.entitlements.check(&identity.into_inner()).await?;
    Ok(web::Json(EntitlementResponse::from(entitlement)))
}

/// Apply a billing update. The body must be signed with the shared secret.
///
/// Replays of the same payload leave the same state.
#[utoipa::path(
    post,
    path = "/api/v1/billing/entitlement",
    request_body = EntitlementUpdateRequest,
    params(
        ("X-Tenantry-Signature" = String, Header, description = "sha256=<hex HMAC-SHA256 of the raw body>")
    ),
    responses(
        (status = 200, description = "Update applied", body = UpdateAck),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Missing or invalid signature", body = ErrorSchema),
        (status = 503, description = "Subscriber store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["billing"],
    operation_id = "updateEntitlement",
    security([])
)]
#[post("/billing/entitlement")]
pub async fn update_entitlement(
    state: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<web::Json<UpdateAck>> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !state.webhook.verify(&body, signature) {
        warn!("rejected billing update with bad signature");
        return Err(Error::unauthorized("invalid signature"));
    }

    let payload: EntitlementUpdateRequest = serde_json::from_slice(&body)
        .map_err(|err| field_error(BODY, "invalid_json", format!("malformed payload: {err}")))?;
    let update = parse_update(payload)?;
    state.entitlement_updates.apply(&update).await?;
    Ok(web::Json(UpdateAck { success: true }))
}

#[cfg(test)]
#[path = "entitlement_tests.rs"]
mod tests;

//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the account, entitlement, billing, and health paths
//! together with the error schema wrappers from
//! [`crate::inbound::http::schemas`]. The document backs Swagger UI in debug
//! builds and is exported by the `openapi-dump` binary.

use crate::inbound::http::auth::{
    AccountResponse, CompanyResponse, LoginRequest, LoginResponse, MeResponse, ProfileResponse,
    RegisterRequest,
};
use crate::inbound::http::entitlement::{
    EntitlementResponse, EntitlementUpdateRequest, UpdateAck,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/v1/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Tenantry API",
        description = "Account registration, bearer-token sign-in, and subscription entitlements."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::me,
        crate::inbound::http::entitlement::check_entitlement,
        crate::inbound::http::entitlement::update_entitlement,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        AccountResponse,
        LoginResponse,
        CompanyResponse,
        ProfileResponse,
        MeResponse,
        EntitlementResponse,
        EntitlementUpdateRequest,
        UpdateAck,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "auth", description = "Registration, sign-in, and the current account"),
        (name = "entitlement", description = "Subscription state of the caller"),
        (name = "billing", description = "Signed updates from the billing provider"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

//! Multi-tenant account and entitlement core.
//!
//! Layout follows a hexagonal split: [`domain`] holds the model, ports, and
//! services; [`inbound`] adapts HTTP onto the driving ports; [`outbound`]
//! implements the driven ports; [`server`] wires everything into an Actix
//! server.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;

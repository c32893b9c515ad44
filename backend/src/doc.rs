//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated OpenAPI specification for the HTTP
//! surface: the role-verification endpoint, its CORS preflight, and the
//! health probes. The document is served by Swagger UI in debug builds.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::Role;
use crate::inbound::http::verify::{VerifyRoleRequest, VerifyRoleResponse};

/// Enrich the generated document with the bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                Http::builder()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by the hosted auth service."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the HTTP surface.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Marketplace backend API",
        description = "Server-side role verification and health probes for the storefront.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::verify::verify_role,
        crate::inbound::http::verify::verify_role_preflight,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(VerifyRoleRequest, VerifyRoleResponse, Role)),
    tags(
        (name = "auth", description = "Role verification for sensitive actions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

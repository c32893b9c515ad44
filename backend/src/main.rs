//! Backend entry-point: wires the role-verification endpoint, health
//! probes, and OpenAPI docs over the hosted auth and data services.

use std::env;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
use url::Url;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use backend::ApiDoc;
use backend::domain::RoleVerifier;
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::verify::{verify_role, verify_role_preflight};
use backend::outbound::authapi::AuthApiClient;
use backend::outbound::rest::RestRoleStore;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let base_url = required_url("AUTH_API_BASE_URL")?;
    let anon_key = required_var("AUTH_API_ANON_KEY")?;
    let service_key = required_var("AUTH_API_SERVICE_KEY")?;
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());

    let authenticator = AuthApiClient::new(base_url.clone(), anon_key)
        .map_err(|e| std::io::Error::other(format!("failed to build auth client: {e}")))?;
    let role_store = RestRoleStore::new(reqwest::Client::new(), base_url, service_key);
    let verifier = Arc::new(RoleVerifier::new(
        Arc::new(authenticator),
        Arc::new(role_store),
    ));
    let http_state = web::Data::new(HttpState::new(verifier));

    let health_state = web::Data::new(HealthState::new());
    // Clone for server factory so readiness probe remains accessible.
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(server_health_state.clone())
            .app_data(http_state.clone())
            .service(verify_role)
            .service(verify_role_preflight)
            .service(ready)
            .service(live);
        #[cfg(feature = "metrics")]
        let app = app.wrap(make_metrics());
        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
        app
    })
    .bind(bind_addr)?;

    health_state.mark_ready();
    server.run().await
}

fn required_var(name: &str) -> std::io::Result<String> {
    env::var(name).map_err(|_| std::io::Error::other(format!("{name} must be set")))
}

fn required_url(name: &str) -> std::io::Result<Url> {
    let raw = required_var(name)?;
    Url::parse(&raw).map_err(|e| std::io::Error::other(format!("{name} is not a valid URL: {e}")))
}

#[cfg(feature = "metrics")]
fn make_metrics() -> actix_web_prom::PrometheusMetrics {
    PrometheusMetricsBuilder::new("backend")
        .endpoint("/metrics")
        .build()
        .expect("configure Prometheus metrics")
}

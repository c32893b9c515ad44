//! Permissive CORS headers for the browser-called verification endpoint.
//!
//! The endpoint is invoked directly from storefront pages on arbitrary
//! origins, so every response — including errors and the preflight — carries
//! the same permissive header set.

use actix_web::HttpResponseBuilder;

/// Header values applied to every `/verify-role` response.
const ALLOW_ORIGIN: (&str, &str) = ("Access-Control-Allow-Origin", "*");
const ALLOW_HEADERS: (&str, &str) = (
    "Access-Control-Allow-Headers",
    "authorization, x-client-info, apikey, content-type",
);
const ALLOW_METHODS: (&str, &str) = ("Access-Control-Allow-Methods", "POST, OPTIONS");

/// Attach the permissive CORS header set to a response under construction.
pub fn apply(builder: &mut HttpResponseBuilder) -> &mut HttpResponseBuilder {
    builder
        .insert_header(ALLOW_ORIGIN)
        .insert_header(ALLOW_HEADERS)
        .insert_header(ALLOW_METHODS)
}

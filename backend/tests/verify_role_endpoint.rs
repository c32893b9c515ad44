//! End-to-end coverage of `/verify-role` over the real actix service.
//!
//! The outbound ports are replaced with in-process stubs so the tests
//! exercise the full request path (header extraction, role-set parsing,
//! status mapping, CORS) without network access.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};

use backend::domain::ports::{
    RoleStore, RoleStoreError, TokenAuthenticationError, TokenAuthenticator,
};
use backend::domain::{BearerToken, Role, RoleVerifier, UserId};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::verify::{verify_role, verify_role_preflight};

const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

struct StubAuthenticator {
    result: Result<UserId, TokenAuthenticationError>,
}

#[async_trait]
impl TokenAuthenticator for StubAuthenticator {
    async fn authenticate(&self, _token: &BearerToken) -> Result<UserId, TokenAuthenticationError> {
        self.result.clone()
    }
}

struct StubRoleStore {
    result: Result<Option<Role>, RoleStoreError>,
}

#[async_trait]
impl RoleStore for StubRoleStore {
    async fn find_by_user_id(&self, _user_id: &UserId) -> Result<Option<Role>, RoleStoreError> {
        self.result.clone()
    }
}

fn user_id() -> UserId {
    UserId::new(USER_ID).expect("fixture id")
}

fn state(
    auth: Result<UserId, TokenAuthenticationError>,
    role: Result<Option<Role>, RoleStoreError>,
) -> web::Data<HttpState> {
    let verifier = RoleVerifier::new(
        Arc::new(StubAuthenticator { result: auth }),
        Arc::new(StubRoleStore { result: role }),
    );
    web::Data::new(HttpState::new(Arc::new(verifier)))
}

async fn call(
    state: web::Data<HttpState>,
    authorization: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(state)
            .service(verify_role)
            .service(verify_role_preflight),
    )
    .await;
    let mut req = test::TestRequest::post()
        .uri("/verify-role")
        .set_json(&body);
    if let Some(value) = authorization {
        req = req.insert_header(("Authorization", value));
    }
    let res = test::call_service(&app, req.to_request()).await;
    let status = res.status();
    let body: Value = test::read_body_json(res).await;
    (status, body)
}

#[actix_web::test]
async fn seller_requesting_admin_access_is_forbidden() {
    let state = state(Ok(user_id()), Ok(Some(Role::Seller)));
    let (status, body) = call(
        state,
        Some("Bearer seller-token"),
        json!({ "requiredRoles": ["admin"] }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["authorized"], false);
    assert_eq!(body["userRole"], "seller");
    assert_eq!(body["userId"], USER_ID);
    assert_eq!(body["error"], "insufficient permissions");
}

#[actix_web::test]
async fn matching_role_is_admitted() {
    let state = state(Ok(user_id()), Ok(Some(Role::Admin)));
    let (status, body) = call(
        state,
        Some("Bearer admin-token"),
        json!({ "requiredRoles": ["admin"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authorized"], true);
    assert_eq!(body["userRole"], "admin");
}

#[actix_web::test]
async fn missing_authorization_header_is_unauthorised() {
    let state = state(Ok(user_id()), Ok(Some(Role::Admin)));
    let (status, body) = call(state, None, json!({ "requiredRoles": ["admin"] })).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["authorized"], false);
    assert!(body.get("userId").is_none());
}

#[actix_web::test]
async fn rejected_token_is_unauthorised() {
    let state = state(
        Err(TokenAuthenticationError::invalid_token("JWT expired")),
        Ok(Some(Role::Admin)),
    );
    let (status, body) = call(
        state,
        Some("Bearer expired-token"),
        json!({ "requiredRoles": ["admin"] }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["authorized"], false);
    assert_eq!(body["error"], "invalid or expired token");
}

#[actix_web::test]
async fn role_store_failure_is_a_server_error() {
    let state = state(
        Ok(user_id()),
        Err(RoleStoreError::connection("connection refused")),
    );
    let (status, body) = call(
        state,
        Some("Bearer some-token"),
        json!({ "requiredRoles": ["admin"] }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["authorized"], false);
    assert_eq!(body["error"], "role lookup failed");
}

#[actix_web::test]
async fn empty_required_roles_is_an_authentication_check() {
    let state = state(
        Ok(user_id()),
        Err(RoleStoreError::connection("must not be consulted")),
    );
    let (status, body) = call(state, Some("Bearer some-token"), json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authorized"], true);
    assert!(body.get("userRole").is_none());
}

#[actix_web::test]
async fn absent_body_is_an_authentication_check() {
    let app = test::init_service(
        App::new()
            .app_data(state(Ok(user_id()), Ok(Some(Role::Seller))))
            .service(verify_role),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/verify-role")
        .insert_header(("Authorization", "Bearer some-token"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["authorized"], true);
    assert!(body.get("userRole").is_none());
}

#[actix_web::test]
async fn malformed_body_is_rejected_rather_than_collapsed() {
    // A present-but-undecodable body must never degrade into an
    // authentication-only grant.
    let app = test::init_service(
        App::new()
            .app_data(state(Ok(user_id()), Ok(Some(Role::Seller))))
            .service(verify_role),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/verify-role")
        .insert_header(("Authorization", "Bearer seller-token"))
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"requiredRoles": "admin"}"#)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["authorized"], false);
    assert!(body["error"].as_str().is_some());
}

#[actix_web::test]
async fn unknown_requested_roles_never_match() {
    // A request naming only unknown roles must not degrade into an
    // authentication-only check.
    let state = state(Ok(user_id()), Ok(Some(Role::Seller)));
    let (status, body) = call(
        state,
        Some("Bearer seller-token"),
        json!({ "requiredRoles": ["superuser"] }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["authorized"], false);
    assert_eq!(body["userRole"], "seller");
}

#[actix_web::test]
async fn responses_carry_permissive_cors_headers() {
    let app = test::init_service(
        App::new()
            .app_data(state(Ok(user_id()), Ok(Some(Role::Admin))))
            .service(verify_role)
            .service(verify_role_preflight),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/verify-role")
        .insert_header(("Authorization", "Bearer admin-token"))
        .set_json(json!({ "requiredRoles": ["admin"] }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(
        res.headers()
            .get("Access-Control-Allow-Origin")
            .map(|v| v.to_str().expect("ascii header")),
        Some("*")
    );

    let preflight = test::TestRequest::with_uri("/verify-role")
        .method(actix_web::http::Method::OPTIONS)
        .to_request();
    let res = test::call_service(&app, preflight).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("Access-Control-Allow-Methods"));
}

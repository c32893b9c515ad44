//! Role verification endpoint.
//!
//! ```text
//! POST /verify-role {"requiredRoles":["admin"]}
//! OPTIONS /verify-role
//! ```
//!
//! Re-validates the caller's role server-side before sensitive mutations.
//! The endpoint never trusts client-held role state: the bearer credential
//! is authenticated against the auth service and the role re-read from the
//! trusted store with a privileged credential.

use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, options, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{AccessDecision, BearerToken, RoleSet, VerifyError};
use crate::inbound::http::cors;
use crate::inbound::http::state::HttpState;

/// Verification request body.
///
/// An absent body or empty `requiredRoles` makes the call an
/// authentication-only check.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRoleRequest {
    /// Acceptable roles in application vocabulary (`client`, `seller`,
    /// `admin`); the storage spelling `user` is accepted as an alias.
    #[serde(default)]
    pub required_roles: Vec<String>,
}

/// Verification response payload shared by all outcomes.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRoleResponse {
    /// Whether the caller is admitted.
    pub authorized: bool,
    /// The authenticated caller's id, when authentication succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// The caller's resolved role in application vocabulary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    /// Informational note on granting decisions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure description on denials and errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyRoleResponse {
    fn granted(decision: &AccessDecision) -> Self {
        Self {
            authorized: true,
            user_id: Some(decision.user_id().to_string()),
            user_role: decision.role().map(|role| role.app_name().to_owned()),
            message: decision.reason().map(ToOwned::to_owned),
            error: None,
        }
    }

    fn forbidden(decision: &AccessDecision) -> Self {
        Self {
            authorized: false,
            user_id: Some(decision.user_id().to_string()),
            user_role: decision.role().map(|role| role.app_name().to_owned()),
            message: None,
            error: Some(
                decision
                    .reason()
                    .unwrap_or("insufficient permissions")
                    .to_owned(),
            ),
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            authorized: false,
            user_id: None,
            user_role: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

fn respond(status: StatusCode, body: &VerifyRoleResponse) -> HttpResponse {
    cors::apply(&mut HttpResponse::build(status)).json(body)
}

/// Decode the request body, treating an absent body as an
/// authentication-only request.
///
/// A body that is present but undecodable is an error, never an empty role
/// set: collapsing it would silently turn an intended role restriction into
/// an unconditional grant.
fn decode_request(body: &[u8]) -> Result<VerifyRoleRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(VerifyRoleRequest::default());
    }
    serde_json::from_slice(body)
}

fn bearer_from_request(req: &HttpRequest) -> Result<BearerToken, String> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| "missing authorization header".to_owned())?;
    let value = value
        .to_str()
        .map_err(|_| "authorization header is not valid UTF-8".to_owned())?;
    BearerToken::from_header_value(value).map_err(|err| err.to_string())
}

/// Verify the caller's role before a sensitive action.
///
/// Callers must treat transport failures identically to
/// `authorized: false` — fail closed, never fail open.
#[utoipa::path(
    post,
    path = "/verify-role",
    request_body = VerifyRoleRequest,
    responses(
        (status = 200, description = "Caller authenticated and admitted", body = VerifyRoleResponse),
        (status = 400, description = "Request body present but not decodable", body = VerifyRoleResponse),
        (status = 401, description = "Missing or invalid bearer credential", body = VerifyRoleResponse),
        (status = 403, description = "Authenticated but role not in the requested set", body = VerifyRoleResponse),
        (status = 500, description = "Trusted role store lookup failed", body = VerifyRoleResponse)
    ),
    tags = ["auth"],
    operation_id = "verifyRole",
    security(("BearerToken" = []))
)]
#[post("/verify-role")]
pub async fn verify_role(
    req: HttpRequest,
    payload: web::Bytes,
    state: web::Data<HttpState>,
) -> HttpResponse {
    let token = match bearer_from_request(&req) {
        Ok(token) => token,
        Err(message) => {
            return respond(
                StatusCode::UNAUTHORIZED,
                &VerifyRoleResponse::failure(message),
            );
        }
    };

    let body = match decode_request(&payload) {
        Ok(body) => body,
        Err(error) => {
            return respond(
                StatusCode::BAD_REQUEST,
                &VerifyRoleResponse::failure(format!("invalid request body: {error}")),
            );
        }
    };
    let required = RoleSet::from_names(body.required_roles.iter().map(String::as_str));

    match state.verifier.verify(&token, &required).await {
        Ok(decision) if decision.is_authorized() => {
            respond(StatusCode::OK, &VerifyRoleResponse::granted(&decision))
        }
        Ok(decision) => respond(
            StatusCode::FORBIDDEN,
            &VerifyRoleResponse::forbidden(&decision),
        ),
        Err(VerifyError::Unauthenticated { .. }) => respond(
            StatusCode::UNAUTHORIZED,
            &VerifyRoleResponse::failure("invalid or expired token"),
        ),
        Err(VerifyError::StoreFailure { .. }) => respond(
            StatusCode::INTERNAL_SERVER_ERROR,
            &VerifyRoleResponse::failure("role lookup failed"),
        ),
    }
}

/// Answer CORS preflight for the verification endpoint.
#[utoipa::path(
    options,
    path = "/verify-role",
    responses((status = 200, description = "Preflight accepted")),
    tags = ["auth"],
    operation_id = "verifyRolePreflight",
    security([])
)]
#[options("/verify-role")]
pub async fn verify_role_preflight() -> HttpResponse {
    cors::apply(&mut HttpResponse::Ok()).finish()
}

//! Trusted role lookups against the data API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::domain::ports::{RoleStore, RoleStoreError};
use crate::domain::{Role, UserId};
use crate::outbound::status_message;

/// Row shape returned by `GET /rest/v1/user_roles?select=role`.
#[derive(Debug, Deserialize)]
struct RoleRowDto {
    role: String,
}

/// Role store adapter reading the `user_roles` table with the service key.
pub struct RestRoleStore {
    client: Client,
    base_url: Url,
    service_key: String,
}

impl RestRoleStore {
    /// Build the adapter over a shared client.
    #[must_use]
    pub const fn new(client: Client, base_url: Url, service_key: String) -> Self {
        Self {
            client,
            base_url,
            service_key,
        }
    }

    fn endpoint(&self, user_id: &UserId) -> Result<Url, RoleStoreError> {
        let mut url = self
            .base_url
            .join("rest/v1/user_roles")
            .map_err(|error| RoleStoreError::connection(error.to_string()))?;
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{user_id}"))
            .append_pair("select", "role");
        Ok(url)
    }
}

#[async_trait]
impl RoleStore for RestRoleStore {
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Role>, RoleStoreError> {
        let response = self
            .client
            .get(self.endpoint(user_id)?)
            .header("apikey", self.service_key.as_str())
            .bearer_auth(self.service_key.as_str())
            .send()
            .await
            .map_err(|error| RoleStoreError::connection(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| RoleStoreError::connection(error.to_string()))?;
        if !status.is_success() {
            return Err(RoleStoreError::query(status_message(status, body.as_ref())));
        }
        parse_role_rows(body.as_ref())
    }
}

fn parse_role_rows(body: &[u8]) -> Result<Option<Role>, RoleStoreError> {
    let rows: Vec<RoleRowDto> = serde_json::from_slice(body)
        .map_err(|error| RoleStoreError::query(format!("invalid role rows payload: {error}")))?;
    Ok(rows.first().map(|row| Role::from_storage(&row.role)))
}

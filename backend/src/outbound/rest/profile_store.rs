//! Profile lookups against the data API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::domain::ports::{ProfileStore, ProfileStoreError};
use crate::domain::{Email, Identity, UserId};
use crate::outbound::status_message;

/// Row shape returned by `GET /rest/v1/profiles`.
#[derive(Debug, Deserialize)]
struct ProfileRowDto {
    id: String,
    email: String,
    full_name: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRowDto {
    fn into_identity(self) -> Result<Identity, ProfileStoreError> {
        let id = UserId::new(&self.id)
            .map_err(|error| ProfileStoreError::query(format!("bad profile id: {error}")))?;
        let email = Email::new(self.email)
            .map_err(|error| ProfileStoreError::query(format!("bad profile email: {error}")))?;
        Ok(Identity::new(
            id,
            email,
            self.full_name,
            self.avatar_url,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// Profile store adapter reading the `profiles` table with the service key.
pub struct RestProfileStore {
    client: Client,
    base_url: Url,
    service_key: String,
}

impl RestProfileStore {
    /// Build the adapter over a shared client.
    #[must_use]
    pub const fn new(client: Client, base_url: Url, service_key: String) -> Self {
        Self {
            client,
            base_url,
            service_key,
        }
    }

    fn endpoint(&self, user_id: &UserId) -> Result<Url, ProfileStoreError> {
        let mut url = self
            .base_url
            .join("rest/v1/profiles")
            .map_err(|error| ProfileStoreError::connection(error.to_string()))?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{user_id}"))
            .append_pair(
                "select",
                "id,email,full_name,avatar_url,created_at,updated_at",
            );
        Ok(url)
    }
}

#[async_trait]
impl ProfileStore for RestProfileStore {
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Identity>, ProfileStoreError> {
        let response = self
            .client
            .get(self.endpoint(user_id)?)
            .header("apikey", self.service_key.as_str())
            .bearer_auth(self.service_key.as_str())
            .send()
            .await
            .map_err(|error| ProfileStoreError::connection(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| ProfileStoreError::connection(error.to_string()))?;
        if !status.is_success() {
            return Err(ProfileStoreError::query(status_message(
                status,
                body.as_ref(),
            )));
        }
        parse_profile_rows(body.as_ref())
    }
}

fn parse_profile_rows(body: &[u8]) -> Result<Option<Identity>, ProfileStoreError> {
    let rows: Vec<ProfileRowDto> = serde_json::from_slice(body)
        .map_err(|error| ProfileStoreError::query(format!("invalid profile rows payload: {error}")))?;
    rows.into_iter()
        .next()
        .map(ProfileRowDto::into_identity)
        .transpose()
}

#[cfg(test)]
mod tests {
    //! Row decoding coverage; no network involved.
    use super::*;

    const ROW: &str = r#"[{
        "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
        "email": "shopper@example.com",
        "full_name": "Sam Shopper",
        "avatar_url": null,
        "created_at": "2024-03-01T09:00:00Z",
        "updated_at": "2024-03-05T17:30:00Z"
    }]"#;

    #[test]
    fn decodes_a_profile_row_into_an_identity() {
        let identity = parse_profile_rows(ROW.as_bytes())
            .expect("row should decode")
            .expect("one row present");
        assert_eq!(
            identity.id().to_string(),
            "3fa85f64-5717-4562-b3fc-2c963f66afa6"
        );
        assert_eq!(identity.email().as_ref(), "shopper@example.com");
        assert_eq!(identity.display_name(), Some("Sam Shopper"));
        assert_eq!(identity.avatar_url(), None);
    }

    #[test]
    fn missing_rows_are_not_an_error() {
        let identity = parse_profile_rows(b"[]").expect("empty list should decode");
        assert!(identity.is_none());
    }

    #[test]
    fn a_row_with_a_bad_id_is_a_query_error() {
        let body = ROW.replace("3fa85f64-5717-4562-b3fc-2c963f66afa6", "not-a-uuid");
        let error = parse_profile_rows(body.as_bytes()).expect_err("bad id must fail");
        assert!(matches!(error, ProfileStoreError::Query { .. }));
    }

    #[test]
    fn a_row_with_a_bad_email_is_a_query_error() {
        let body = ROW.replace("shopper@example.com", "shopper.example.com");
        let error = parse_profile_rows(body.as_bytes()).expect_err("bad email must fail");
        assert!(matches!(error, ProfileStoreError::Query { .. }));
    }
}

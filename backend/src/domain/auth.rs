//! Authentication primitives for bearer-credential handling.
//!
//! Keep inbound header parsing outside the transport layer by exposing a
//! validated token type that the verifier and outbound adapters consume.

use std::fmt;

use zeroize::Zeroizing;

/// Domain error returned when bearer credential input is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerTokenError {
    /// Token material was empty once trimmed.
    #[error("bearer token must not be empty")]
    Empty,
    /// The `Authorization` header did not use the `Bearer` scheme.
    #[error("authorization header must use the Bearer scheme")]
    InvalidScheme,
}

/// Opaque bearer credential presented by a caller.
///
/// The raw token material stays inside a zeroising buffer and is never
/// logged; adapters borrow it only to copy into an outbound request header.
#[derive(Clone)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Construct a token from raw material.
    ///
    /// # Errors
    ///
    /// Returns [`BearerTokenError::Empty`] when the material is blank.
    pub fn new(raw: impl Into<String>) -> Result<Self, BearerTokenError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BearerTokenError::Empty);
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Parse an `Authorization` header value of the form `Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns [`BearerTokenError::InvalidScheme`] when the scheme prefix is
    /// missing and [`BearerTokenError::Empty`] when no token follows it.
    pub fn from_header_value(value: &str) -> Result<Self, BearerTokenError> {
        let rest = value
            .trim_start()
            .strip_prefix("Bearer ")
            .ok_or(BearerTokenError::InvalidScheme)?;
        Self::new(rest)
    }

    /// Borrow the token material for outbound transport headers.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Token material must never reach logs.
        f.write_str("BearerToken(..)")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", BearerTokenError::Empty)]
    #[case("   ", BearerTokenError::Empty)]
    fn blank_tokens_are_rejected(#[case] raw: &str, #[case] expected: BearerTokenError) {
        let err = BearerToken::new(raw).expect_err("blank token must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("Basic abc", BearerTokenError::InvalidScheme)]
    #[case("bearer abc", BearerTokenError::InvalidScheme)]
    #[case("Bearer ", BearerTokenError::Empty)]
    fn malformed_headers_are_rejected(#[case] header: &str, #[case] expected: BearerTokenError) {
        let err = BearerToken::from_header_value(header).expect_err("malformed header must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn header_value_parses_and_trims() {
        let token = BearerToken::from_header_value("Bearer  abc.def.ghi ").expect("valid header");
        assert_eq!(token.as_str(), "abc.def.ghi");
    }

    #[rstest]
    fn debug_output_redacts_material() {
        let token = BearerToken::new("secret").expect("valid token");
        assert_eq!(format!("{token:?}"), "BearerToken(..)");
    }
}

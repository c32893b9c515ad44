//! Role vocabulary and translation across the storage boundary.
//!
//! The application speaks `client`/`seller`/`admin` while the trusted role
//! table stores `user`/`seller`/`admin`. Both spellings funnel through this
//! module so no other code compares role strings directly.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Authorisation role granted to an identity.
///
/// ## Invariants
/// - Exactly one role is authoritative per identity at any time.
/// - Identities without a row in the role store resolve to [`Role::Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Default retail shopper; the lowest-privilege role.
    Client,
    /// Wholesale seller with access to the B2B portal.
    Seller,
    /// Back-office administrator.
    Admin,
}

impl Role {
    /// Translate a raw value from the trusted role store.
    ///
    /// Unknown or empty values degrade to [`Role::Client`] so a corrupted
    /// row can never grant more than the lowest privilege.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Role;
    ///
    /// assert_eq!(Role::from_storage("seller"), Role::Seller);
    /// assert_eq!(Role::from_storage("user"), Role::Client);
    /// assert_eq!(Role::from_storage("root"), Role::Client);
    /// ```
    #[must_use]
    pub fn from_storage(raw: &str) -> Self {
        match raw.trim() {
            "admin" => Self::Admin,
            "seller" => Self::Seller,
            _ => Self::Client,
        }
    }

    /// The spelling used by the trusted role store.
    #[must_use]
    pub const fn storage_name(self) -> &'static str {
        match self {
            Self::Client => "user",
            Self::Seller => "seller",
            Self::Admin => "admin",
        }
    }

    /// Parse an application-vocabulary role name.
    ///
    /// Accepts the storage spelling `user` as an alias for `client` so both
    /// sides of the naming boundary parse through one site. Returns `None`
    /// for names outside the vocabulary.
    #[must_use]
    pub fn from_app_name(raw: &str) -> Option<Self> {
        match raw.trim() {
            "client" | "user" => Some(Self::Client),
            "seller" => Some(Self::Seller),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// The spelling used on application surfaces and the wire.
    #[must_use]
    pub const fn app_name(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Seller => "seller",
            Self::Admin => "admin",
        }
    }

    /// Canonical landing path for the role after sign-in.
    #[must_use]
    pub const fn home_path(self) -> &'static str {
        match self {
            Self::Client => "/",
            Self::Seller => "/seller",
            Self::Admin => "/admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.app_name())
    }
}

/// A caller-requested set of acceptable roles.
///
/// Built from application-vocabulary names. Names outside the vocabulary
/// still count as requested but never become members, so a request naming
/// only unknown roles stays non-empty and can never match — it fails closed
/// rather than collapsing into an authentication-only check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    members: Vec<Role>,
    requested: usize,
}

impl RoleSet {
    /// Build a set from already-parsed roles, deduplicating entries.
    #[must_use]
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        let mut members = Vec::new();
        let mut requested = 0;
        for role in roles {
            requested += 1;
            if !members.contains(&role) {
                members.push(role);
            }
        }
        Self { members, requested }
    }

    /// Parse a set from application-vocabulary names.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{Role, RoleSet};
    ///
    /// let set = RoleSet::from_names(["admin", "client", "superuser"]);
    /// assert!(set.contains(Role::Admin));
    /// assert!(set.contains(Role::Client));
    /// assert_eq!(set.roles().len(), 2);
    /// assert!(!set.is_empty());
    /// ```
    #[must_use]
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut requested = 0;
        let mut set = Self::new(
            names
                .into_iter()
                .inspect(|_| requested += 1)
                .filter_map(Role::from_app_name),
        );
        set.requested = requested;
        set
    }

    /// True when no role was requested at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.requested == 0
    }

    /// Membership test against a resolved role.
    #[must_use]
    pub fn contains(&self, role: Role) -> bool {
        self.members.contains(&role)
    }

    /// Borrow the member roles in request order.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.members
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for vocabulary translation.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("user", Role::Client)]
    #[case("seller", Role::Seller)]
    #[case("admin", Role::Admin)]
    #[case(" admin ", Role::Admin)]
    #[case("", Role::Client)]
    #[case("superuser", Role::Client)]
    fn storage_values_translate_or_degrade(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(Role::from_storage(raw), expected);
    }

    #[rstest]
    #[case("client", Some(Role::Client))]
    #[case("user", Some(Role::Client))]
    #[case("seller", Some(Role::Seller))]
    #[case("admin", Some(Role::Admin))]
    #[case("root", None)]
    #[case("", None)]
    fn app_names_parse(#[case] raw: &str, #[case] expected: Option<Role>) {
        assert_eq!(Role::from_app_name(raw), expected);
    }

    #[rstest]
    fn translation_round_trips_through_both_vocabularies() {
        for role in [Role::Client, Role::Seller, Role::Admin] {
            assert_eq!(Role::from_storage(role.storage_name()), role);
            assert_eq!(Role::from_app_name(role.app_name()), Some(role));
        }
    }

    #[rstest]
    #[case(Role::Client, "/")]
    #[case(Role::Seller, "/seller")]
    #[case(Role::Admin, "/admin")]
    fn home_paths_map_per_role(#[case] role: Role, #[case] expected: &str) {
        assert_eq!(role.home_path(), expected);
    }

    #[rstest]
    fn role_set_drops_unknown_names_and_duplicates() {
        let set = RoleSet::from_names(["admin", "admin", "wizard", "user"]);
        assert_eq!(set.roles(), [Role::Admin, Role::Client]);
    }

    #[rstest]
    fn unknown_only_requests_stay_non_empty_and_match_nothing() {
        let set = RoleSet::from_names(["superuser"]);
        assert!(!set.is_empty());
        assert!(set.roles().is_empty());
        assert!(!set.contains(Role::Admin));
    }

    #[rstest]
    fn empty_role_set_contains_nothing() {
        let set = RoleSet::default();
        assert!(set.is_empty());
        assert!(!set.contains(Role::Admin));
    }

    #[rstest]
    fn serde_uses_application_vocabulary() {
        let json = serde_json::to_string(&Role::Client).expect("role serialises");
        assert_eq!(json, "\"client\"");
        let parsed: Role = serde_json::from_str("\"seller\"").expect("role deserialises");
        assert_eq!(parsed, Role::Seller);
    }
}

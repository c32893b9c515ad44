//! Session/role resolution driven by auth-state events.
//!
//! The resolver owns the process-wide session: it subscribes to the auth
//! transport, derives an [`Identity`] and [`Role`] per identity change, and
//! publishes immutable snapshots through a watch channel. It never blocks
//! protected actions itself; the route guard consumes its snapshots and the
//! role verifier re-checks on the server side.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use super::identity::{Identity, UserId};
use super::ports::{AuthSessions, Navigator, ProfileStore, RoleStore};
use super::role::Role;
use super::session::{AuthEvent, SessionSnapshot};

/// Paths reachable without authentication; a fresh sign-in on one of these
/// leaves the user where they are.
const PUBLIC_PATH_PREFIXES: &[&str] = &["/store", "/product"];

/// Path of the login page; a fresh sign-in here always redirects home.
pub const LOGIN_PATH: &str = "/login";

/// Decide where a fresh sign-in should land, if anywhere.
///
/// This is a UX convenience, not a security control: the route guard remains
/// the gate for protected content.
///
/// # Examples
/// ```
/// use backend::domain::{post_sign_in_redirect, Role};
///
/// assert_eq!(post_sign_in_redirect("/login", Role::Seller), Some("/seller"));
/// assert_eq!(post_sign_in_redirect("/", Role::Seller), None);
/// assert_eq!(post_sign_in_redirect("/checkout", Role::Client), Some("/"));
/// ```
#[must_use]
pub fn post_sign_in_redirect(current_path: &str, role: Role) -> Option<&'static str> {
    if current_path == LOGIN_PATH {
        return Some(role.home_path());
    }
    if current_path == "/"
        || PUBLIC_PATH_PREFIXES
            .iter()
            .any(|prefix| current_path.starts_with(prefix))
    {
        return None;
    }
    Some(role.home_path())
}

/// Event-driven owner of the current session snapshot.
///
/// ## Ownership
/// The resolver is the only writer of the session; consumers hold a
/// [`watch::Receiver`] and read immutable snapshots.
pub struct SessionResolver {
    auth: Arc<dyn AuthSessions>,
    profiles: Arc<dyn ProfileStore>,
    roles: Arc<dyn RoleStore>,
    navigator: Arc<dyn Navigator>,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl SessionResolver {
    /// Construct a resolver in the loading state.
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthSessions>,
        profiles: Arc<dyn ProfileStore>,
        roles: Arc<dyn RoleStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::resolving());
        Self {
            auth,
            profiles,
            roles,
            navigator,
            snapshot,
        }
    }

    /// Subscribe to session snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    /// Read the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Begin listening for auth events and restore any persisted session.
    ///
    /// The event listener is attached strictly before the persisted-session
    /// fetch is issued so no event can be missed between the two; both paths
    /// converge on the same snapshot shape. The spawned listener keeps the
    /// resolver alive for as long as the event stream stays open.
    pub async fn start(self: Arc<Self>) {
        let mut events = self.auth.subscribe();
        let resolver = Arc::clone(&self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        // Resolution must not run inside the event-delivery
                        // callback (some auth SDKs deadlock when re-entered
                        // from their own notification path); this loop is
                        // already a separate task. Events are applied in
                        // arrival order: a slow resolution for an earlier
                        // sign-in must finish before a later sign-out is
                        // applied, so it can never publish over it.
                        resolver.apply(event).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "auth event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        match self.auth.current_session().await {
            Ok(Some(user_id)) => self.apply(AuthEvent::SessionRestored(user_id)).await,
            Ok(None) => self.publish(SessionSnapshot::signed_out()),
            Err(error) => {
                warn!(%error, "persisted session lookup failed; treating as signed out");
                self.publish(SessionSnapshot::signed_out());
            }
        }
    }

    /// Apply one auth event to the session.
    pub async fn apply(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(user_id) => self.resolve(user_id, true).await,
            AuthEvent::SessionRestored(user_id) => self.resolve(user_id, false).await,
            AuthEvent::SignedOut => self.publish(SessionSnapshot::signed_out()),
        }
    }

    /// Invalidate the backend session and clear local state.
    ///
    /// Local state is always cleared and the user returned to the public
    /// home, even when the backend invalidation call fails.
    pub async fn sign_out(&self) {
        if let Err(error) = self.auth.sign_out().await {
            warn!(%error, "backend sign-out failed; clearing local session anyway");
        }
        self.publish(SessionSnapshot::signed_out());
        self.navigator.navigate(Role::Client.home_path());
    }

    async fn resolve(&self, user_id: UserId, fresh_sign_in: bool) {
        let (profile, role) = tokio::join!(
            self.profiles.find_by_user_id(&user_id),
            self.roles.find_by_user_id(&user_id),
        );

        let role = match role {
            Ok(Some(role)) => role,
            Ok(None) => Role::Client,
            Err(error) => {
                warn!(%error, %user_id, "role lookup failed; defaulting to client");
                Role::Client
            }
        };

        let identity: Option<Identity> = match profile {
            Ok(Some(identity)) => Some(identity),
            Ok(None) => {
                warn!(%user_id, "no profile row for identity; exposing no identity");
                None
            }
            Err(error) => {
                warn!(%error, %user_id, "profile lookup failed; exposing no identity");
                None
            }
        };

        debug!(%user_id, %role, authenticated = identity.is_some(), "session resolved");
        self.publish(SessionSnapshot::settled(identity, Some(role)));

        if fresh_sign_in
            && let Some(target) = post_sign_in_redirect(&self.navigator.current_path(), role)
        {
            self.navigator.navigate(target);
        }
    }

    fn publish(&self, snapshot: SessionSnapshot) {
        let _previous = self.snapshot.send_replace(snapshot);
    }
}

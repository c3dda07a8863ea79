//! Authentication check, roles, and login bookkeeping.
//!
//! Rubik View doesn't authenticate anyone; the backend does. The console
//! only needs to know whether a token is present (to decide whether the
//! monitor should run at all) and what role the backend granted. The
//! [`Authenticator`] trait is that question, asked of whatever holds the
//! token.

use std::fmt;

use rubikview_protocol::{ROLE_KEY, TOKEN_KEY};
use tracing::{info, warn};

use crate::store::stamp_login;
use crate::{KeyValueStore, StoreError, Timestamp};

/// Answers "is a user signed in right now?".
///
/// Consulted once, when the monitor starts. `Send + Sync + 'static` so it
/// can be moved into the builder and shared.
pub trait Authenticator: Send + Sync + 'static {
    fn is_authenticated(&self) -> bool;
}

/// The dashboard's check: a non-empty `token` entry exists.
///
/// A storage error counts as "not signed in", which makes the monitor
/// stand down instead of failing.
#[derive(Debug, Clone)]
pub struct TokenPresence<S> {
    store: S,
}

impl<S: KeyValueStore> TokenPresence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> Authenticator for TokenPresence<S> {
    fn is_authenticated(&self) -> bool {
        match self.store.get(TOKEN_KEY) {
            Ok(Some(token)) => !token.is_empty(),
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "token lookup failed, treating as signed out");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// The role string the backend returns at login.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    SuperAdmin,
    /// Any other role name, kept verbatim.
    User(String),
}

impl Role {
    /// Parses the stored role name. Unknown names become [`Role::User`].
    pub fn parse(name: &str) -> Self {
        match name {
            "admin" => Self::Admin,
            "superadmin" => Self::SuperAdmin,
            other => Self::User(other.to_string()),
        }
    }

    /// Admin screens (user management, job triggers, indicator config)
    /// are open to `admin` and `superadmin`.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::SuperAdmin => "superadmin",
            Self::User(name) => name,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads the current user's role, if one is stored.
pub fn current_role<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<Role>, StoreError> {
    Ok(store.get(ROLE_KEY)?.map(|name| Role::parse(&name)))
}

/// Persists a successful login: token, role and the login instant.
///
/// This is the write the login page performs after the backend accepts the
/// credentials, and it is what makes a later monitor start see an
/// authenticated session with a fresh absolute cap.
pub fn record_login<S: KeyValueStore + ?Sized>(
    store: &S,
    token: &str,
    role: &Role,
    at: Timestamp,
) -> Result<(), StoreError> {
    store.set(TOKEN_KEY, token)?;
    store.set(ROLE_KEY, role.as_str())?;
    stamp_login(store, at)?;
    info!(%role, login_at = %at, "login recorded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use rubikview_protocol::LOGIN_TIMESTAMP_KEY;

    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_token_presence_requires_non_empty_token() {
        let store = MemoryStore::new();
        let auth = TokenPresence::new(store.clone());
        assert!(!auth.is_authenticated());

        store.set(TOKEN_KEY, "").unwrap();
        assert!(!auth.is_authenticated(), "empty token is not a session");

        store.set(TOKEN_KEY, "jwt").unwrap();
        assert!(auth.is_authenticated());
    }

    #[test]
    fn test_role_parse_and_is_admin() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("superadmin"), Role::SuperAdmin);
        assert_eq!(Role::parse("analyst"), Role::User("analyst".into()));

        assert!(Role::Admin.is_admin());
        assert!(Role::SuperAdmin.is_admin());
        assert!(!Role::parse("analyst").is_admin());
        assert!(!Role::parse("Admin").is_admin(), "role names are case-sensitive");
    }

    #[test]
    fn test_record_login_writes_all_session_keys() {
        let store = MemoryStore::new();

        record_login(&store, "jwt", &Role::SuperAdmin, Timestamp(42)).unwrap();

        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("jwt"));
        assert_eq!(store.get(ROLE_KEY).unwrap().as_deref(), Some("superadmin"));
        assert_eq!(store.get(LOGIN_TIMESTAMP_KEY).unwrap().as_deref(), Some("42"));
        assert_eq!(current_role(&store).unwrap(), Some(Role::SuperAdmin));
    }

    #[test]
    fn test_current_role_absent_is_none() {
        assert_eq!(current_role(&MemoryStore::new()).unwrap(), None);
    }
}

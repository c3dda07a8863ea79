//! Logout: clear every trace of the session, then go to the login page.

use rubikview_protocol::{LogoutReason, LOGIN_PATH, SESSION_KEYS};
use tracing::{info, warn};

use crate::KeyValueStore;

/// Ends the session. Called by the monitor on expiry and on manual
/// sign-out.
///
/// Synchronous and infallible from the caller's point of view: whatever
/// goes wrong inside, the user still ends up at the login page.
pub trait LogoutAction: Send + Sync + 'static {
    fn logout(&self, reason: LogoutReason);
}

/// Any `Fn(LogoutReason)` closure is a logout action. Handy in tests.
impl<F> LogoutAction for F
where
    F: Fn(LogoutReason) + Send + Sync + 'static,
{
    fn logout(&self, reason: LogoutReason) {
        self(reason)
    }
}

/// Performs a full navigation, e.g. `window.location.href = path`.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn navigate(&self, path: &str) {
        self(path)
    }
}

/// The dashboard's logout: remove `token`, `role` and `loginTimestamp`
/// from storage, expire every cookie, then navigate to `/login`.
#[derive(Debug, Clone)]
pub struct ClearSessionLogout<S, C, N> {
    storage: S,
    cookies: C,
    navigator: N,
}

impl<S, C, N> ClearSessionLogout<S, C, N>
where
    S: KeyValueStore,
    C: KeyValueStore,
    N: Navigator,
{
    pub fn new(storage: S, cookies: C, navigator: N) -> Self {
        Self {
            storage,
            cookies,
            navigator,
        }
    }

    fn clear_storage(&self) {
        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "failed to clear session key");
            }
        }
    }

    fn clear_cookies(&self) {
        let names = match self.cookies.keys() {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "failed to list cookies");
                return;
            }
        };
        for name in names {
            if let Err(e) = self.cookies.remove(&name) {
                warn!(cookie = %name, error = %e, "failed to expire cookie");
            }
        }
    }
}

impl<S, C, N> LogoutAction for ClearSessionLogout<S, C, N>
where
    S: KeyValueStore,
    C: KeyValueStore,
    N: Navigator,
{
    fn logout(&self, reason: LogoutReason) {
        info!(%reason, "logging out");
        self.clear_storage();
        self.clear_cookies();
        self.navigator.navigate(LOGIN_PATH);
    }
}

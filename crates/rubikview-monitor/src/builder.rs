//! `MonitorBuilder`: configuration and the start-up checks.
//!
//! Starting a monitor is the "mount" step of the dashboard's layout: decide
//! whether anyone is signed in, find or create the login timestamp, log out
//! straight away if the session is already past its cap, and otherwise
//! spawn the actor that owns the timers.

use std::sync::Arc;

use rubikview_protocol::MonitorState;
use rubikview_session::{
    load_login_timestamp, stamp_login, Authenticator, ClearSessionLogout, Clock, KeyValueStore,
    LogoutAction, Navigator, Session, SystemClock, TimeoutPolicy, TokenPresence,
};
use rubikview_tick::{PollConfig, PollScheduler};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::actor::MonitorActor;
use crate::MonitorHandle;

/// Builder for configuring and starting a session monitor.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
///
/// use rubikview_monitor::MonitorBuilder;
/// use rubikview_protocol::{ActivityKind, LogoutReason};
/// use rubikview_session::{MemoryStore, TimeoutPolicy, TokenPresence};
///
/// # async fn demo() {
/// let storage = MemoryStore::new();
/// let monitor = MonitorBuilder::new()
///     .policy(TimeoutPolicy::default().with_inactivity_timeout(Duration::from_secs(900)))
///     .start(
///         storage.clone(),
///         TokenPresence::new(storage),
///         |reason: LogoutReason| println!("logged out: {reason}"),
///     );
///
/// monitor.record_activity(ActivityKind::Click);
/// println!("{:?}", monitor.formatted_countdown());
/// # }
/// ```
pub struct MonitorBuilder {
    policy: TimeoutPolicy,
    poll: PollConfig,
    clock: Arc<dyn Clock>,
}

impl MonitorBuilder {
    /// Dashboard defaults: 30 min idle, 10 min countdown, 8 h cap, 1 Hz
    /// poll, system wall clock.
    pub fn new() -> Self {
        Self {
            policy: TimeoutPolicy::default(),
            poll: PollConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets the timeout policy. It is validated when the monitor starts.
    pub fn policy(mut self, policy: TimeoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets how often both deadlines are re-checked.
    pub fn poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Sets the clock used for timestamps and deadline arithmetic.
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Starts a monitor over `store`.
    ///
    /// Never fails. Each of these returns an inactive handle with no task
    /// and no timers behind it:
    /// - `auth` says nobody is signed in;
    /// - the store can't be read or written;
    /// - there is no Tokio runtime to run the monitor on.
    ///
    /// If the session is already past its absolute cap, `logout` runs
    /// before this returns and the handle reports `Expired`.
    pub fn start<S, A, L>(self, store: S, auth: A, logout: L) -> MonitorHandle
    where
        S: KeyValueStore,
        A: Authenticator,
        L: LogoutAction,
    {
        let policy = self.policy.validated();
        let clock = self.clock;
        let (state_tx, state_rx) = watch::channel(MonitorState::Inactive);

        if !auth.is_authenticated() {
            debug!("not authenticated, session monitor stays inactive");
            return MonitorHandle::inactive(state_rx, clock);
        }

        let now = clock.now();
        let login_at = match load_login_timestamp(&store) {
            Ok(Some(login_at)) => login_at,
            Ok(None) => {
                if let Err(e) = stamp_login(&store, now) {
                    warn!(error = %e, "cannot persist login timestamp, session timeouts not enforced");
                    return MonitorHandle::inactive(state_rx, clock);
                }
                debug!(login_at = %now, "no login timestamp, starting one now");
                now
            }
            Err(e) => {
                warn!(error = %e, "storage unavailable, session timeouts not enforced");
                return MonitorHandle::inactive(state_rx, clock);
            }
        };

        let session = Session::new(login_at, now);
        let initial = session.evaluate(now, &policy).state();

        if let MonitorState::Expired { reason } = initial {
            info!(%reason, %login_at, "session already past its limit, logging out");
            logout.logout(reason);
            state_tx.send_replace(initial);
            return MonitorHandle::inactive(state_rx, clock);
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no Tokio runtime, session timeouts not enforced");
            return MonitorHandle::inactive(state_rx, clock);
        };

        state_tx.send_replace(initial);
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = MonitorActor {
            policy,
            session,
            store,
            logout,
            clock: Arc::clone(&clock),
            poller: PollScheduler::new(self.poll),
            receiver: rx,
            state: state_tx,
        };
        let task = runtime.spawn(actor.run());

        MonitorHandle::running(tx, state_rx, clock, task)
    }

    /// Starts a monitor wired the way the dashboard wires it: signed in
    /// means a `token` is stored, and logout clears `storage` and `cookies`
    /// before navigating to `/login`.
    pub fn start_dashboard<S, C, N>(self, storage: S, cookies: C, navigator: N) -> MonitorHandle
    where
        S: KeyValueStore + Clone,
        C: KeyValueStore,
        N: Navigator,
    {
        let auth = TokenPresence::new(storage.clone());
        let logout = ClearSessionLogout::new(storage.clone(), cookies, navigator);
        self.start(storage, auth, logout)
    }
}

impl Default for MonitorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

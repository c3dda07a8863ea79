//! # Rubik View
//!
//! Session activity monitor for the Rubik View analytics console.
//!
//! A signed-in session ends on whichever comes first: a stretch of
//! inactivity longer than the inactivity timeout, or the absolute session
//! cap measured from login. Shortly before either, the monitor publishes a
//! countdown for the sign-out badge; when one is reached it clears the
//! stored session and sends the user to the login page.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rubikview::prelude::*;
//!
//! # async fn run() -> Result<(), RubikViewError> {
//! rubikview::init_logging();
//!
//! let storage = MemoryStore::new();
//! let cookies = MemoryStore::new();
//! record_login(&storage, "jwt", &Role::Admin, SystemClock.now())?;
//!
//! let monitor = MonitorBuilder::new()
//!     .policy(TimeoutPolicy::from_json(r#"{"inactivity_timeout_ms": 900000}"#)?)
//!     .start_dashboard(storage, cookies, |path: &str| println!("redirect to {path}"));
//!
//! let sink = monitor.activity_sink();
//! sink.record(ActivityKind::Click);
//!
//! let mut updates = monitor.subscribe();
//! while updates.changed().await.is_ok() {
//!     let state = *updates.borrow_and_update();
//!     if let Some(remaining) = state.countdown() {
//!         println!("signing out in {remaining}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod logging;

pub use error::RubikViewError;
pub use logging::init_logging;

pub use rubikview_monitor as monitor;
pub use rubikview_protocol as protocol;
pub use rubikview_session as session;
pub use rubikview_tick as tick;

/// Everything a UI binding needs, in one import.
pub mod prelude {
    pub use crate::RubikViewError;
    pub use rubikview_monitor::{ActivitySink, MonitorBuilder, MonitorError, MonitorHandle};
    pub use rubikview_protocol::{
        ActivityKind, Codec, Countdown, JsonCodec, LogoutReason, MonitorState, ProtocolError,
    };
    pub use rubikview_session::{
        record_login, Authenticator, ClearSessionLogout, Clock, KeyValueStore, LogoutAction,
        MemoryStore, Navigator, Role, StoreError, SystemClock, TimeoutPolicy, Timestamp,
        TokenPresence,
    };
    pub use rubikview_tick::PollConfig;
}

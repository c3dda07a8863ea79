//! Session model and injected capabilities for the Rubik View monitor.
//!
//! This crate answers everything about a session that doesn't involve
//! timers:
//!
//! 1. **Policy** ([`TimeoutPolicy`]): inactivity timeout, countdown
//!    threshold, absolute cap.
//! 2. **Arithmetic** ([`Session`], [`Evaluation`]): how much time is left
//!    and which deadline binds.
//! 3. **Capabilities**: [`KeyValueStore`] for persisted state and cookies,
//!    [`Clock`] for "now", [`Authenticator`] for "is anyone signed in",
//!    [`LogoutAction`] and [`Navigator`] for ending the session.
//!
//! # How it fits in the stack
//!
//! ```text
//! Monitor (above)   ← drives timers, publishes state
//!     ↕
//! Session (this crate)   ← policy, deadlines, storage, logout
//!     ↕
//! Protocol (below)  ← MonitorState, LogoutReason, key names
//! ```

mod auth;
mod clock;
mod error;
mod logout;
mod policy;
mod session;
mod store;

pub use auth::{current_role, record_login, Authenticator, Role, TokenPresence};
pub use clock::{Clock, SystemClock, Timestamp, TokioClock};
pub use error::{SessionError, StoreError};
pub use logout::{ClearSessionLogout, LogoutAction, Navigator};
pub use policy::{
    TimeoutPolicy, DEFAULT_COUNTDOWN_THRESHOLD, DEFAULT_INACTIVITY_TIMEOUT,
    DEFAULT_MAX_SESSION_DURATION,
};
pub use session::{Evaluation, Session};
pub use store::{load_login_timestamp, stamp_login, KeyValueStore, MemoryStore};

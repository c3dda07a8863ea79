//! Session activity monitor for the Rubik View dashboard.
//!
//! A monitor runs as one Tokio task per signed-in session (actor model).
//! It enforces two limits and logs the user out when either is reached:
//!
//! - an inactivity timeout, reset by qualifying user activity;
//! - an absolute session cap, measured from the stored login timestamp
//!   and never extended by activity.
//!
//! Once the nearer of the two is within the countdown threshold, the
//! published [`MonitorState`](rubikview_protocol::MonitorState) carries the
//! remaining time for the sign-out badge.
//!
//! # Key types
//!
//! - [`MonitorBuilder`]: configures and starts a monitor
//! - [`MonitorHandle`]: state, activity, manual logout, stop
//! - [`ActivitySink`]: cloneable activity recorder for event listeners
//! - [`MonitorError`]: what the handle's fallible operations return

mod actor;
mod builder;
mod error;
mod handle;

pub use builder::MonitorBuilder;
pub use error::MonitorError;
pub use handle::{ActivitySink, MonitorHandle};

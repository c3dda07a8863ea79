//! The handle a UI binding holds while a monitor runs.

use std::fmt;
use std::sync::Arc;

use rubikview_protocol::{ActivityKind, Countdown, MonitorState};
use rubikview_session::Clock;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::trace;

use crate::actor::MonitorCommand;
use crate::MonitorError;

/// Handle to a session monitor.
///
/// Returned by [`MonitorBuilder::start`](crate::MonitorBuilder::start).
/// Holding it keeps the monitor alive; dropping it closes the command
/// channel, the monitor task sees that on its next wakeup and releases its
/// timers. [`stop`](Self::stop) does the same thing and waits for it.
///
/// An *inactive* handle (signed out at start, storage unavailable, or
/// expired at start) has no task behind it. Every method still works:
/// activity is ignored and the published state stays where it was.
pub struct MonitorHandle {
    sender: Option<mpsc::UnboundedSender<MonitorCommand>>,
    state: watch::Receiver<MonitorState>,
    clock: Arc<dyn Clock>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub(crate) fn running(
        sender: mpsc::UnboundedSender<MonitorCommand>,
        state: watch::Receiver<MonitorState>,
        clock: Arc<dyn Clock>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            sender: Some(sender),
            state,
            clock,
            task: Some(task),
        }
    }

    pub(crate) fn inactive(state: watch::Receiver<MonitorState>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sender: None,
            state,
            clock,
            task: None,
        }
    }

    /// The most recently published state.
    pub fn state(&self) -> MonitorState {
        *self.state.borrow()
    }

    /// Remaining time while the countdown is visible.
    pub fn countdown(&self) -> Option<Countdown> {
        self.state().countdown()
    }

    /// Remaining time as the badge renders it, e.g. `"9:05"`.
    pub fn formatted_countdown(&self) -> Option<String> {
        self.countdown().map(|c| c.to_string())
    }

    /// Whether the sign-out badge should show the countdown.
    pub fn show_countdown(&self) -> bool {
        self.countdown().is_some()
    }

    /// `true` while the monitor task is alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// A receiver that wakes on every published change. The UI re-renders
    /// the badge from it.
    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state.clone()
    }

    /// Records qualifying activity, stamped with the current time.
    ///
    /// Never blocks and never fails; activity for a monitor that isn't
    /// running is dropped.
    pub fn record_activity(&self, kind: ActivityKind) {
        let Some(sender) = &self.sender else {
            trace!(%kind, "no monitor running, activity dropped");
            return;
        };
        let sent = sender.send(MonitorCommand::Activity {
            kind,
            at: self.clock.now(),
        });
        if sent.is_err() {
            trace!(%kind, "monitor stopped, activity dropped");
        }
    }

    /// A cloneable sink for event listeners.
    ///
    /// Sinks don't keep the monitor alive: once the handle is gone, recording
    /// through a sink is a no-op.
    pub fn activity_sink(&self) -> ActivitySink {
        ActivitySink {
            sender: self.sender.as_ref().map(|s| s.downgrade()),
            clock: Arc::clone(&self.clock),
        }
    }

    /// Signs the user out: same clear-and-redirect as an expiry, with
    /// reason `Manual`. The monitor stops afterwards.
    ///
    /// # Errors
    /// [`MonitorError::NotRunning`] if there is no live monitor to do it.
    pub fn logout(&self) -> Result<(), MonitorError> {
        let sender = self.sender.as_ref().ok_or(MonitorError::NotRunning)?;
        sender
            .send(MonitorCommand::Logout)
            .map_err(|_| MonitorError::NotRunning)
    }

    /// Stops the monitor without logging out and waits until its timers
    /// are released.
    ///
    /// # Errors
    /// [`MonitorError::TaskFailed`] if the monitor task panicked.
    pub async fn stop(mut self) -> Result<(), MonitorError> {
        if let Some(sender) = self.sender.take() {
            if sender.send(MonitorCommand::Stop).is_err() {
                trace!("monitor already finished, nothing to stop");
            }
        }
        self.join().await
    }

    /// Waits for the monitor to finish on its own (expiry, manual logout,
    /// or the session being cleared from storage).
    ///
    /// # Errors
    /// [`MonitorError::TaskFailed`] if the monitor task panicked.
    pub async fn join(&mut self) -> Result<(), MonitorError> {
        match self.task.take() {
            Some(task) => task
                .await
                .map_err(|e| MonitorError::TaskFailed(e.to_string())),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("state", &self.state())
            .field("running", &self.is_running())
            .finish()
    }
}

/// Records activity into a monitor without owning it.
///
/// Bindings install one of these in every event listener of the
/// [`ActivityKind::ALL`] set.
#[derive(Clone)]
pub struct ActivitySink {
    sender: Option<mpsc::WeakUnboundedSender<MonitorCommand>>,
    clock: Arc<dyn Clock>,
}

impl ActivitySink {
    /// Records qualifying activity. Returns `false` if the monitor is gone.
    pub fn record(&self, kind: ActivityKind) -> bool {
        let Some(sender) = self.sender.as_ref().and_then(|weak| weak.upgrade()) else {
            trace!(%kind, "monitor handle gone, activity dropped");
            return false;
        };
        let sent = sender.send(MonitorCommand::Activity {
            kind,
            at: self.clock.now(),
        });
        if sent.is_err() {
            trace!(%kind, "monitor stopped, activity dropped");
        }
        sent.is_ok()
    }
}

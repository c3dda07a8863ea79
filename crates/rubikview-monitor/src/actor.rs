//! Monitor actor: a Tokio task that owns one session's timers.
//!
//! Everything scheduled for a session lives inside this task: the one-shot
//! idle-deadline `Sleep` and the 1 Hz [`PollScheduler`]. Activity re-phases
//! the poll, so countdown steps line up with the last reset. When the task
//! returns, both are dropped together, whichever way it returned.

use std::mem;
use std::pin::Pin;
use std::sync::Arc;

use rubikview_protocol::{ActivityKind, LogoutReason, MonitorState};
use rubikview_session::{
    load_login_timestamp, Clock, KeyValueStore, LogoutAction, Session, TimeoutPolicy, Timestamp,
};
use rubikview_tick::{PollInfo, PollScheduler};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, Sleep};
use tracing::{debug, info, trace, warn};

/// Commands sent from the handle (and activity sinks) to the actor.
#[derive(Debug)]
pub(crate) enum MonitorCommand {
    /// Qualifying user activity, stamped when the event was recorded.
    Activity { kind: ActivityKind, at: Timestamp },
    /// The user signed out.
    Logout,
    /// Tear the monitor down without logging out.
    Stop,
}

/// Why the actor woke up.
enum Wake {
    Command(Option<MonitorCommand>),
    IdleDeadline,
    Poll(PollInfo),
}

enum Flow {
    Continue,
    Stop,
}

/// The actor's state. Constructed by the builder once start-up checks
/// have passed.
pub(crate) struct MonitorActor<S, L> {
    pub(crate) policy: TimeoutPolicy,
    pub(crate) session: Session,
    pub(crate) store: S,
    pub(crate) logout: L,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) poller: PollScheduler,
    pub(crate) receiver: mpsc::UnboundedReceiver<MonitorCommand>,
    pub(crate) state: watch::Sender<MonitorState>,
}

impl<S, L> MonitorActor<S, L>
where
    S: KeyValueStore,
    L: LogoutAction,
{
    /// Runs until the session expires, the user logs out, or the monitor
    /// is stopped (explicitly, or by dropping the handle).
    pub(crate) async fn run(mut self) {
        info!(
            login_at = %self.session.login_at(),
            timeout_ms = self.policy.inactivity_timeout.as_millis() as u64,
            cap_ms = self.policy.max_session_duration.as_millis() as u64,
            "session monitor started"
        );

        let now = self.clock.now();
        let first = self.session.evaluate(now, &self.policy);
        let idle_deadline = time::sleep(first.inactivity_remaining());
        tokio::pin!(idle_deadline);

        loop {
            let wake = tokio::select! {
                biased;
                cmd = self.receiver.recv() => Wake::Command(cmd),
                () = &mut idle_deadline => Wake::IdleDeadline,
                info = self.poller.wait_for_poll() => Wake::Poll(info),
            };

            let flow = match wake {
                Wake::Command(Some(MonitorCommand::Activity { kind, at })) => {
                    trace!(%kind, %at, "activity");
                    self.session.record_activity(at);
                    self.poller.rephase();
                    self.check(Some(idle_deadline.as_mut()))
                }
                Wake::Command(Some(MonitorCommand::Logout)) => {
                    self.end(LogoutReason::Manual);
                    Flow::Stop
                }
                Wake::Command(Some(MonitorCommand::Stop)) | Wake::Command(None) => {
                    self.publish(MonitorState::Inactive);
                    Flow::Stop
                }
                Wake::IdleDeadline => self.check(Some(idle_deadline.as_mut())),
                Wake::Poll(info) => {
                    if info.late {
                        debug!(
                            poll = info.poll,
                            skipped = info.skipped,
                            "late poll, re-checking deadlines"
                        );
                    }
                    self.check(None)
                }
            };

            if let Flow::Stop = flow {
                break;
            }
        }

        let polls = self.poller.metrics();
        info!(
            login_at = %self.session.login_at(),
            polls = polls.total_polls,
            late_polls = polls.total_late,
            skipped_polls = polls.total_skipped,
            "session monitor stopped"
        );
    }

    /// Re-evaluates both deadlines and publishes the result.
    ///
    /// `rearm` is the idle-deadline timer when its deadline may have moved
    /// (activity, or the timer itself fired); polls leave it alone.
    fn check(&mut self, rearm: Option<Pin<&mut Sleep>>) -> Flow {
        match load_login_timestamp(&self.store) {
            Ok(Some(login_at)) => {
                if login_at != self.session.login_at() {
                    debug!(
                        old = %self.session.login_at(),
                        new = %login_at,
                        "login timestamp changed in storage, adopting it"
                    );
                    self.session.rebase_login(login_at);
                }
            }
            Ok(None) => {
                info!("login timestamp cleared, session no longer tracked");
                self.publish(MonitorState::Inactive);
                return Flow::Stop;
            }
            Err(e) => {
                warn!(error = %e, "storage unavailable, session timeouts not enforced");
                self.publish(MonitorState::Inactive);
                return Flow::Stop;
            }
        }

        let eval = self.session.evaluate(self.clock.now(), &self.policy);
        trace!(
            remaining_ms = eval.remaining_ms(),
            binding = %eval.binding(),
            "deadlines evaluated"
        );

        match eval.state() {
            MonitorState::Expired { reason } => {
                self.end(reason);
                Flow::Stop
            }
            state => {
                if let Some(timer) = rearm {
                    timer.reset(Instant::now() + eval.inactivity_remaining());
                }
                self.publish(state);
                Flow::Continue
            }
        }
    }

    /// Forces logout and publishes the terminal state.
    fn end(&mut self, reason: LogoutReason) {
        info!(%reason, login_at = %self.session.login_at(), "session ended, logging out");
        self.logout.logout(reason);
        self.publish(MonitorState::Expired { reason });
    }

    /// Publishes `next` if it differs from what observers last saw.
    fn publish(&self, next: MonitorState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            if mem::discriminant(current) != mem::discriminant(&next) {
                match next {
                    MonitorState::Countdown { remaining } => {
                        info!(%remaining, "countdown visible");
                    }
                    _ => debug!(from = %current, to = %next, "monitor state changed"),
                }
            }
            *current = next;
            true
        });
    }
}

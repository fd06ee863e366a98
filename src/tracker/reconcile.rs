//! Client-observable countdown state, kept in sync with the persisted
//! session.
//!
//! Two cooperating timer loops drive the display: a low-frequency poll
//! that recomputes the view from the authoritative store, and a one-second
//! tick that decrements the displayed value for smoothness in between.
//! The poll always wins on conflict; whatever the local ticker guessed is
//! overwritten by the freshly fetched state at every reconciliation point.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use log::debug;
use serde::Serialize;
use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::{
    models::{ActiveSession, SessionStatus},
    store::SessionStore,
};

use super::{Clock, SessionTracker};

/// What a client renders: seconds left on the countdown and whether it is
/// ticking down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub remaining_secs: i64,
    pub running: bool,
}

impl TimerView {
    pub fn idle() -> Self {
        Self {
            remaining_secs: 0,
            running: false,
        }
    }
}

/// Derive the displayed view from the authoritative session at `now_ms`.
///
/// Absent means idle. A running session whose remaining time has reached
/// zero is treated as finished locally without notifying the store;
/// finishing is a local-clock event and the store only changes on the next
/// explicit command. A paused session freezes the display at whatever was
/// last computed, so the previous view is threaded through.
pub fn reconcile(session: Option<&ActiveSession>, now_ms: i64, last: TimerView) -> TimerView {
    match session {
        None => TimerView::idle(),
        Some(session) => match session.status {
            SessionStatus::Running => {
                let elapsed_secs = (now_ms - session.start_time) / 1000;
                let remaining = session.target_secs() - elapsed_secs;
                if remaining <= 0 {
                    TimerView {
                        remaining_secs: 0,
                        running: false,
                    }
                } else {
                    TimerView {
                        remaining_secs: remaining,
                        running: true,
                    }
                }
            }
            SessionStatus::Paused => TimerView {
                remaining_secs: last.remaining_secs,
                running: false,
            },
        },
    }
}

/// Background pair of tasks keeping a shared [`TimerView`] current.
///
/// The poll task reconciles against the store on a fixed cadence; the tick
/// task decrements the shared value once per `tick_interval` while the
/// view says running. Both stop when the cancellation token fires.
pub struct Reconciler {
    view: Arc<Mutex<TimerView>>,
    cancel: CancellationToken,
    poll: JoinHandle<()>,
    tick: JoinHandle<()>,
}

impl Reconciler {
    pub fn spawn<S, C>(
        tracker: Arc<SessionTracker<S, C>>,
        poll_interval: Duration,
        tick_interval: Duration,
    ) -> Self
    where
        S: SessionStore + 'static,
        C: Clock + 'static,
    {
        let view = Arc::new(Mutex::new(TimerView::idle()));
        let cancel = CancellationToken::new();

        let poll = {
            let view = view.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let mut interval = time::interval(poll_interval);
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = interval.tick() => {
                            let session = tracker.get_state();
                            let now_ms = tracker.clock().now_ms();
                            let mut guard = view.lock().unwrap();
                            let next = reconcile(session.as_ref(), now_ms, *guard);
                            if next != *guard {
                                debug!("Reconciled timer view: {next:?}");
                            }
                            *guard = next;
                        }
                    }
                }
            })
        };

        let tick = {
            let view = view.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let mut interval = time::interval(tick_interval);
                // The first interval tick completes immediately; consume it
                // so the display is not decremented at spawn time.
                interval.tick().await;
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = interval.tick() => {
                            let mut guard = view.lock().unwrap();
                            if guard.running {
                                guard.remaining_secs -= 1;
                                if guard.remaining_secs <= 0 {
                                    guard.remaining_secs = 0;
                                    guard.running = false;
                                }
                            }
                        }
                    }
                }
            })
        };

        Self {
            view,
            cancel,
            poll,
            tick,
        }
    }

    /// The currently displayed countdown state.
    pub fn view(&self) -> TimerView {
        *self.view.lock().unwrap()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
        self.poll.abort();
        self.tick.abort();
    }
}

impl Drop for Reconciler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

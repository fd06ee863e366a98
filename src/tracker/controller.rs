use log::info;

use crate::{
    error::{Error, Result},
    models::{ActiveSession, SessionStatus},
    store::SessionStore,
};

use super::{Clock, SystemClock};

/// Lifecycle commands for the single persisted focus session.
///
/// All four commands are whole-row read-modify-writes against the injected
/// [`SessionStore`]; the tracker holds no state of its own. Pause and
/// resume are no-ops outside their half of the state machine, stop is
/// always valid, and start unconditionally replaces whatever was there.
pub struct SessionTracker<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: SessionStore, C: Clock> SessionTracker<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Begin a new running session of `duration_minutes`, replacing any
    /// existing session. Rejects non-positive durations before touching
    /// the store; they would produce nonsensical progress downstream.
    pub fn start(&self, duration_minutes: i64) -> Result<ActiveSession> {
        if duration_minutes <= 0 {
            return Err(Error::InvalidInput(format!(
                "session duration must be positive, got {duration_minutes}"
            )));
        }

        let session = ActiveSession {
            start_time: self.clock.now_ms(),
            duration: duration_minutes,
            status: SessionStatus::Running,
            paused_at: None,
        };
        self.store.put(session.clone())?;

        info!("Started {duration_minutes}m focus session");
        Ok(session)
    }

    /// Freeze the running session by stamping when the pause began.
    /// No-op when no session exists or it is already paused.
    pub fn pause(&self) -> Result<()> {
        match self.store.get() {
            Some(mut session) if session.status == SessionStatus::Running => {
                session.status = SessionStatus::Paused;
                session.paused_at = Some(self.clock.now_ms());
                self.store.put(session)?;
                info!("Paused focus session");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Shift `start_time` forward by the paused interval and return to
    /// running, so `now - start_time` excludes the pause from elapsed
    /// accounting. No-op when no session exists or it is already running.
    pub fn resume(&self) -> Result<()> {
        match self.store.get() {
            Some(mut session) if session.status == SessionStatus::Paused => {
                let Some(paused_at) = session.paused_at else {
                    return Ok(());
                };
                session.start_time += self.clock.now_ms() - paused_at;
                session.status = SessionStatus::Running;
                session.paused_at = None;
                self.store.put(session)?;
                info!("Resumed focus session");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Clear the session regardless of prior state. Idempotent; when no
    /// session exists the store is left untouched.
    pub fn stop(&self) -> Result<()> {
        if self.store.get().is_none() {
            return Ok(());
        }
        self.store.clear()?;
        info!("Stopped focus session");
        Ok(())
    }

    /// Pure read of the persisted session. Callers derive remaining time
    /// themselves; see [`super::reconcile`].
    pub fn get_state(&self) -> Option<ActiveSession> {
        self.store.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::MemoryStore, tracker::clock::ManualClock};

    fn tracker_at(ms: i64) -> (SessionTracker<MemoryStore, ManualClock>, ManualClock) {
        let clock = ManualClock::at_ms(ms);
        let tracker = SessionTracker::new(MemoryStore::default(), clock.clone());
        (tracker, clock)
    }

    #[test]
    fn start_rejects_non_positive_duration() {
        let (tracker, _clock) = tracker_at(0);
        assert!(matches!(tracker.start(0), Err(Error::InvalidInput(_))));
        assert!(matches!(tracker.start(-5), Err(Error::InvalidInput(_))));
        assert!(tracker.get_state().is_none());
    }

    #[test]
    fn start_stamps_now_and_runs() {
        let (tracker, _clock) = tracker_at(50_000);
        let session = tracker.start(25).unwrap();
        assert_eq!(session.start_time, 50_000);
        assert_eq!(session.duration, 25);
        assert_eq!(session.status, SessionStatus::Running);
        assert_eq!(session.paused_at, None);
        assert_eq!(tracker.get_state(), Some(session));
    }

    #[test]
    fn start_replaces_existing_session() {
        let (tracker, clock) = tracker_at(0);
        tracker.start(25).unwrap();
        clock.advance_secs(60);
        tracker.start(5).unwrap();

        let session = tracker.get_state().unwrap();
        assert_eq!(session.duration, 5);
        assert_eq!(session.start_time, 60_000);
        assert_eq!(session.status, SessionStatus::Running);
    }

    #[test]
    fn pause_stamps_paused_at() {
        let (tracker, clock) = tracker_at(0);
        tracker.start(25).unwrap();
        clock.advance_secs(10);
        tracker.pause().unwrap();

        let session = tracker.get_state().unwrap();
        assert_eq!(session.status, SessionStatus::Paused);
        assert_eq!(session.paused_at, Some(10_000));
        assert_eq!(session.start_time, 0);
    }

    #[test]
    fn pause_is_idempotent() {
        let (tracker, clock) = tracker_at(0);
        tracker.start(25).unwrap();
        clock.advance_secs(10);
        tracker.pause().unwrap();
        let paused = tracker.get_state();

        clock.advance_secs(10);
        tracker.pause().unwrap();
        assert_eq!(tracker.get_state(), paused);
    }

    #[test]
    fn pause_without_session_is_noop() {
        let (tracker, _clock) = tracker_at(0);
        tracker.pause().unwrap();
        assert!(tracker.get_state().is_none());
    }

    #[test]
    fn resume_excludes_pause_from_elapsed() {
        // Start at t0, pause at t0+p, resume at t0+p+q: start_time must
        // land at t0+q so elapsed at any later instant t is t - t0 - q.
        let (tracker, clock) = tracker_at(0);
        tracker.start(25).unwrap();

        clock.advance_secs(10); // p = 10s
        tracker.pause().unwrap();

        clock.advance_secs(20); // q = 20s
        tracker.resume().unwrap();

        let session = tracker.get_state().unwrap();
        assert_eq!(session.status, SessionStatus::Running);
        assert_eq!(session.paused_at, None);
        assert_eq!(session.start_time, 20_000);
    }

    #[test]
    fn resume_while_running_is_noop() {
        let (tracker, clock) = tracker_at(0);
        tracker.start(25).unwrap();
        let running = tracker.get_state();

        clock.advance_secs(5);
        tracker.resume().unwrap();
        assert_eq!(tracker.get_state(), running);
    }

    #[test]
    fn resume_without_session_is_noop() {
        let (tracker, _clock) = tracker_at(0);
        tracker.resume().unwrap();
        assert!(tracker.get_state().is_none());
    }

    #[test]
    fn stop_is_idempotent() {
        let (tracker, _clock) = tracker_at(0);
        tracker.start(25).unwrap();
        tracker.stop().unwrap();
        assert!(tracker.get_state().is_none());
        tracker.stop().unwrap();
        assert!(tracker.get_state().is_none());
    }

    #[test]
    fn stop_without_session_does_not_write() {
        let clock = ManualClock::at_ms(0);
        let store = MemoryStore::default();
        let tracker = SessionTracker::new(store.clone(), clock);

        tracker.stop().unwrap();
        assert_eq!(store.clear_count(), 0);

        tracker.start(25).unwrap();
        tracker.stop().unwrap();
        tracker.stop().unwrap();
        assert_eq!(store.clear_count(), 1);
    }

    #[test]
    fn repeated_pause_resume_accumulates_only_active_time() {
        let (tracker, clock) = tracker_at(0);
        tracker.start(25).unwrap();

        for _ in 0..3 {
            clock.advance_secs(10);
            tracker.pause().unwrap();
            clock.advance_secs(30);
            tracker.resume().unwrap();
        }

        // 3 pauses of 30s each are excluded: start_time shifted by 90s.
        let session = tracker.get_state().unwrap();
        assert_eq!(session.start_time, 90_000);
    }
}

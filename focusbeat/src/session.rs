//! Session timer state machine.
//!
//! ```text
//! Idle(Focus) --start--> Running(Focus) --expiry/skip--> Idle(Break) --start--> Running(Break)
//!      ^                                                                              |
//!      +------------------------------------- expiry/skip ----------------------------+
//! ```
//!
//! `pause` goes from `Running(m)` to `Idle(m)`. `reset` returns to `Idle(Focus)` from
//! anywhere. The caller drives time: every operation that needs the current
//! time takes `now`, and nothing here spawns timers of its own.

use crate::clock;
use crate::notify::{expiry_text, NotificationScheduler};
use crate::settings::DurationProvider;
use chrono::{DateTime, Utc};
use focusbeat_ipc::SessionMode;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub mode: SessionMode,
    pub is_running: bool,
    /// Authoritative while idle, a cached projection of `end_timestamp` while running.
    pub remaining_secs: u32,
    /// Set iff `is_running`.
    pub end_timestamp: Option<DateTime<Utc>>,
}

impl SessionState {
    fn idle(mode: SessionMode, remaining_secs: u32) -> Self {
        Self {
            mode,
            is_running: false,
            remaining_secs,
            end_timestamp: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryCause {
    Elapsed,
    Skipped,
}

/// Outcome of a mode flip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub ended: SessionMode,
    pub next: SessionMode,
    pub next_secs: u32,
    pub cause: ExpiryCause,
    pub auto_started: bool,
}

/// Offer to start the next session right away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionAlert {
    pub title: String,
    pub message: String,
    pub next: SessionMode,
}

impl TransitionAlert {
    fn for_transition(ended: SessionMode, next_secs: u32) -> Self {
        let (title, _) = expiry_text(ended);
        let minutes = next_secs / 60;
        let message = match ended.opposite() {
            SessionMode::Break => format!("Start your {minutes} minute break now?"),
            SessionMode::Focus => format!("Ready to focus for {minutes} minutes?"),
        };
        Self {
            title: title.to_string(),
            message,
            next: ended.opposite(),
        }
    }
}

/// Shows the end-of-session prompt. The user's answer is fed back through
/// [`SessionMachine::respond_to_alert`] on the control thread.
pub trait AlertPresenter {
    fn present(&mut self, alert: &TransitionAlert);
}

/// Forwards alerts to whoever owns the UI loop.
pub struct ChannelPresenter(UnboundedSender<TransitionAlert>);

impl ChannelPresenter {
    pub fn new(tx: UnboundedSender<TransitionAlert>) -> Self {
        Self(tx)
    }
}

impl AlertPresenter for ChannelPresenter {
    fn present(&mut self, alert: &TransitionAlert) {
        if self.0.send(alert.clone()).is_err() {
            debug!("alert dropped, UI loop is gone");
        }
    }
}

pub struct SessionMachine<P> {
    state: SessionState,
    durations: P,
    notifier: Box<dyn NotificationScheduler>,
    presenter: Box<dyn AlertPresenter>,
    /// Duration the current session was sized with, for progress display.
    target_secs: u32,
    foreground: bool,
    auto_continue: bool,
    awaiting_response: bool,
}

impl<P: DurationProvider> SessionMachine<P> {
    pub fn new(
        durations: P,
        notifier: Box<dyn NotificationScheduler>,
        presenter: Box<dyn AlertPresenter>,
    ) -> Self {
        let focus = durations.focus_secs();
        Self {
            state: SessionState::idle(SessionMode::Focus, focus),
            durations,
            notifier,
            presenter,
            target_secs: focus,
            foreground: true,
            auto_continue: false,
            awaiting_response: false,
        }
    }

    pub fn with_auto_continue(mut self, auto_continue: bool) -> Self {
        self.auto_continue = auto_continue;
        self
    }

    // Queries

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mode(&self) -> SessionMode {
        self.state.mode
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn remaining_secs(&self) -> u32 {
        self.state.remaining_secs
    }

    pub fn durations(&self) -> &P {
        &self.durations
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground
    }

    pub fn awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    /// 0.0 .. 1.0 through the current session.
    pub fn progress(&self) -> f64 {
        if self.target_secs == 0 {
            return 0.0;
        }
        let remaining = self.state.remaining_secs.min(self.target_secs);
        1.0 - f64::from(remaining) / f64::from(self.target_secs)
    }

    // Commands

    /// Start the current session. Calling it while running pauses instead,
    /// since start and pause share one button.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Transition> {
        if self.state.is_running {
            return self.pause(now);
        }
        if self.state.remaining_secs == 0 {
            self.state.remaining_secs = self.durations.secs_for(self.state.mode);
            self.target_secs = self.state.remaining_secs;
        }

        let end = clock::compute_end_timestamp(self.state.remaining_secs, now);
        self.state.is_running = true;
        self.state.end_timestamp = Some(end);
        self.awaiting_response = false;

        self.notifier.cancel_all();
        let (title, body) = expiry_text(self.state.mode);
        if let Err(e) = self.notifier.schedule(end, title, body) {
            warn!("Failed to schedule notification: {}", e);
        }
        info!(mode = %self.state.mode, remaining = self.state.remaining_secs, "session started");
        None
    }

    /// Freeze the countdown. No-op while idle.
    ///
    /// If the session already ran out (the last tick was missed), this is an
    /// expiry rather than a pause.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Transition> {
        let end = self.state.end_timestamp.filter(|_| self.state.is_running)?;
        let remaining = clock::compute_remaining(end, now);
        if remaining == 0 {
            return Some(self.expire(ExpiryCause::Elapsed, now));
        }

        self.notifier.cancel_all();
        self.state.is_running = false;
        self.state.end_timestamp = None;
        self.state.remaining_secs = remaining;
        info!(mode = %self.state.mode, remaining, "session paused");
        None
    }

    pub fn reset(&mut self) {
        self.notifier.cancel_all();
        let focus = self.durations.focus_secs();
        self.state = SessionState::idle(SessionMode::Focus, focus);
        self.target_secs = focus;
        self.awaiting_response = false;
        info!("session reset");
    }

    /// End the current session early, running or not.
    pub fn skip(&mut self, now: DateTime<Utc>) -> Transition {
        self.expire(ExpiryCause::Skipped, now)
    }

    /// Periodic foreground update.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Transition> {
        self.observe(now)
    }

    /// Catch up after a gap with no ticks. Call once per activation.
    pub fn reconcile_after_suspension(&mut self, now: DateTime<Utc>) -> Option<Transition> {
        if !self.state.is_running {
            return None;
        }
        let before = self.state.remaining_secs;
        let transition = self.observe(now);
        match &transition {
            Some(t) => info!(ended = %t.ended, "session ended while suspended"),
            None => debug!(before, after = self.state.remaining_secs, "reconciled after suspension"),
        }
        transition
    }

    /// Answer to the last presented alert. Stale answers are ignored.
    pub fn respond_to_alert(&mut self, accept: bool, now: DateTime<Utc>) -> Option<Transition> {
        if !std::mem::take(&mut self.awaiting_response) {
            debug!("ignoring alert response with no alert pending");
            return None;
        }
        if accept && !self.state.is_running {
            return self.start(now);
        }
        None
    }

    pub fn set_foreground(&mut self, foreground: bool) {
        self.foreground = foreground;
    }

    /// Change the duration settings. A running session keeps its end time;
    /// an idle session picks up the new length if it had not been started,
    /// and is clamped to it otherwise.
    pub fn update_durations(&mut self, change: impl FnOnce(&mut P)) {
        let before = self.durations.secs_for(self.state.mode);
        change(&mut self.durations);
        if self.state.is_running {
            return;
        }
        let after = self.durations.secs_for(self.state.mode);
        if self.state.remaining_secs == before {
            self.state.remaining_secs = after;
        } else {
            self.state.remaining_secs = self.state.remaining_secs.min(after);
        }
        self.target_secs = after;
    }

    fn observe(&mut self, now: DateTime<Utc>) -> Option<Transition> {
        let end = self.state.end_timestamp.filter(|_| self.state.is_running)?;
        let remaining = clock::compute_remaining(end, now);
        if remaining > 0 {
            self.state.remaining_secs = remaining;
            return None;
        }
        Some(self.expire(ExpiryCause::Elapsed, now))
    }

    /// Shared by natural expiry and skip so the modes always alternate.
    fn expire(&mut self, cause: ExpiryCause, now: DateTime<Utc>) -> Transition {
        self.notifier.cancel_all();
        self.state.is_running = false;
        self.state.end_timestamp = None;
        self.awaiting_response = false;

        let ended = self.state.mode;
        let next = ended.opposite();
        let next_secs = self.durations.secs_for(next);
        self.state.mode = next;
        self.state.remaining_secs = next_secs;
        self.target_secs = next_secs;
        info!(%ended, %next, ?cause, "session transition");

        let mut auto_started = false;
        if self.auto_continue {
            self.start(now);
            auto_started = true;
        } else if self.foreground {
            self.awaiting_response = true;
            self.presenter
                .present(&TransitionAlert::for_transition(ended, next_secs));
        }

        Transition {
            ended,
            next,
            next_secs,
            cause,
            auto_started,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;
    use crate::notify::NotificationHandle;
    use crate::settings::Durations;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        scheduled: Vec<(DateTime<Utc>, String)>,
        outstanding: usize,
        cancels: usize,
        alerts: Vec<TransitionAlert>,
    }

    struct RecordingScheduler {
        log: Rc<RefCell<Log>>,
        fail: bool,
    }

    impl NotificationScheduler for RecordingScheduler {
        fn schedule(
            &mut self,
            fire_at: DateTime<Utc>,
            _title: &str,
            body: &str,
        ) -> Result<NotificationHandle, NotifyError> {
            if self.fail {
                return Err(NotifyError::NoRuntime);
            }
            let mut log = self.log.borrow_mut();
            log.scheduled.push((fire_at, body.to_string()));
            log.outstanding += 1;
            Ok(NotificationHandle(log.scheduled.len() as u64))
        }

        fn cancel_all(&mut self) {
            let mut log = self.log.borrow_mut();
            log.outstanding = 0;
            log.cancels += 1;
        }
    }

    struct RecordingPresenter(Rc<RefCell<Log>>);

    impl AlertPresenter for RecordingPresenter {
        fn present(&mut self, alert: &TransitionAlert) {
            self.0.borrow_mut().alerts.push(alert.clone());
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
    }

    fn machine_with(durations: Durations) -> (SessionMachine<Durations>, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let machine = SessionMachine::new(
            durations,
            Box::new(RecordingScheduler {
                log: log.clone(),
                fail: false,
            }),
            Box::new(RecordingPresenter(log.clone())),
        );
        (machine, log)
    }

    fn machine() -> (SessionMachine<Durations>, Rc<RefCell<Log>>) {
        machine_with(Durations::default())
    }

    fn assert_invariants(m: &SessionMachine<Durations>, log: &Log) {
        let s = m.state();
        assert_eq!(s.end_timestamp.is_some(), s.is_running);
        assert_eq!(log.outstanding, usize::from(s.is_running));
        assert!(s.remaining_secs <= m.target_secs);
        // Only a session sized before the lengths were shortened may exceed them.
        assert!(
            s.remaining_secs <= m.durations().longest() || m.target_secs > m.durations().longest()
        );
    }

    #[test]
    fn starts_idle_in_focus() {
        let (m, log) = machine();
        assert_eq!(m.mode(), SessionMode::Focus);
        assert!(!m.is_running());
        assert_eq!(m.remaining_secs(), 1500);
        assert_invariants(&m, &log.borrow());
    }

    #[test]
    fn start_schedules_one_notification_at_end_time() {
        let (mut m, log) = machine();
        m.start(at(0));
        assert!(m.is_running());
        assert_eq!(m.state().end_timestamp, Some(at(1500)));

        let log = log.borrow();
        assert_eq!(log.scheduled, vec![(at(1500), "Time for a break.".to_string())]);
        assert_invariants(&m, &log);
    }

    #[test]
    fn start_while_running_pauses() {
        let (mut m, log) = machine();
        m.start(at(0));
        m.start(at(100));
        assert!(!m.is_running());
        assert_eq!(m.remaining_secs(), 1400);
        assert_invariants(&m, &log.borrow());
    }

    #[test]
    fn start_then_pause_at_same_instant_keeps_remaining() {
        let (mut m, log) = machine();
        m.start(at(0));
        m.pause(at(0));
        assert_eq!(m.remaining_secs(), 1500);
        assert_eq!(m.state().end_timestamp, None);
        assert_invariants(&m, &log.borrow());
    }

    #[test]
    fn pause_twice_is_same_as_once() {
        let (mut m, log) = machine();
        m.start(at(0));
        m.pause(at(10));
        let once = m.state().clone();
        m.pause(at(20));
        assert_eq!(m.state(), &once);
        assert_invariants(&m, &log.borrow());
    }

    #[test]
    fn resume_after_pause_continues_from_freeze_point() {
        let (mut m, log) = machine();
        m.start(at(0));
        m.pause(at(600));
        m.start(at(5000));
        assert_eq!(m.state().end_timestamp, Some(at(5900)));
        assert_eq!(log.borrow().scheduled.last().map(|s| s.0), Some(at(5900)));
    }

    #[test]
    fn pause_after_missed_expiry_transitions() {
        let (mut m, log) = machine();
        m.start(at(0));
        let t = m.pause(at(2000)).expect("session had already ended");
        assert_eq!(t.next, SessionMode::Break);
        assert_eq!(m.remaining_secs(), 300);
        assert_invariants(&m, &log.borrow());
    }

    #[test]
    fn tick_counts_down_then_expires() {
        let (mut m, log) = machine();
        m.start(at(0));
        assert_eq!(m.tick(at(1499)), None);
        assert_eq!(m.mode(), SessionMode::Focus);
        assert_eq!(m.remaining_secs(), 1);

        let t = m.tick(at(1500)).expect("expiry");
        assert_eq!(t.ended, SessionMode::Focus);
        assert_eq!(t.cause, ExpiryCause::Elapsed);
        assert_eq!(m.mode(), SessionMode::Break);
        assert!(!m.is_running());
        assert_eq!(m.remaining_secs(), 300);
        assert_invariants(&m, &log.borrow());
    }

    #[test]
    fn tick_while_idle_does_nothing() {
        let (mut m, _) = machine();
        assert_eq!(m.tick(at(99_999)), None);
        assert_eq!(m.remaining_secs(), 1500);
    }

    #[test]
    fn reconcile_after_long_suspension_transitions_once() {
        let (mut m, log) = machine();
        m.start(at(0));
        let t = m.reconcile_after_suspension(at(1500 + 5));
        assert_eq!(t.map(|t| t.next), Some(SessionMode::Break));
        assert_eq!(m.mode(), SessionMode::Break);
        assert_eq!(m.remaining_secs(), 300);
        assert!(!m.is_running());

        // A second activation must not flip again.
        assert_eq!(m.reconcile_after_suspension(at(1600)), None);
        assert_eq!(m.mode(), SessionMode::Break);
        assert_invariants(&m, &log.borrow());
    }

    #[test]
    fn reconcile_mid_session_updates_display() {
        let (mut m, _) = machine();
        m.start(at(0));
        assert_eq!(m.reconcile_after_suspension(at(900)), None);
        assert!(m.is_running());
        assert_eq!(m.remaining_secs(), 600);
    }

    #[test]
    fn reconcile_while_idle_is_noop() {
        let (mut m, _) = machine();
        let before = m.state().clone();
        assert_eq!(m.reconcile_after_suspension(at(10_000)), None);
        assert_eq!(m.state(), &before);
    }

    #[test]
    fn reset_returns_to_fresh_focus() {
        let (mut m, log) = machine();
        m.start(at(0));
        m.tick(at(1500));
        m.start(at(1600));
        m.reset();
        assert_eq!(m.state(), &SessionState::idle(SessionMode::Focus, 1500));
        assert_invariants(&m, &log.borrow());
    }

    #[test]
    fn skip_works_from_idle_and_running() {
        let (mut m, log) = machine();
        let t = m.skip(at(0));
        assert_eq!((t.ended, t.next), (SessionMode::Focus, SessionMode::Break));
        assert_eq!(t.cause, ExpiryCause::Skipped);
        assert_eq!(m.remaining_secs(), 300);

        m.start(at(10));
        m.skip(at(20));
        assert_eq!(m.mode(), SessionMode::Focus);
        assert_eq!(m.remaining_secs(), 1500);
        assert_invariants(&m, &log.borrow());
    }

    #[test]
    fn natural_expiry_in_foreground_presents_alert() {
        let (mut m, log) = machine();
        m.start(at(0));
        m.tick(at(1500));
        let log = log.borrow();
        assert_eq!(log.alerts.len(), 1);
        assert_eq!(log.alerts[0].title, "Focus complete");
        assert_eq!(log.alerts[0].message, "Start your 5 minute break now?");
        assert!(m.awaiting_response());
    }

    #[test]
    fn foreground_skip_presents_alert() {
        let (mut m, log) = machine();
        m.start(at(0));
        m.skip(at(10));
        assert_eq!(log.borrow().alerts.len(), 1);
        assert_eq!(log.borrow().alerts[0].next, SessionMode::Break);
        assert!(m.awaiting_response());

        m.respond_to_alert(true, at(11));
        assert!(m.is_running());
        assert_eq!(m.mode(), SessionMode::Break);
        assert_eq!(m.state().end_timestamp, Some(at(311)));
        assert_invariants(&m, &log.borrow());
    }

    #[test]
    fn background_transitions_do_not_prompt() {
        let (mut m, log) = machine();
        m.set_foreground(false);
        m.skip(at(0));
        m.start(at(0));
        m.tick(at(300));
        assert!(log.borrow().alerts.is_empty());
        assert!(!m.awaiting_response());
        assert_eq!(m.mode(), SessionMode::Focus);
    }

    #[test]
    fn accepting_alert_starts_next_session() {
        let (mut m, log) = machine();
        m.start(at(0));
        m.tick(at(1500));
        m.respond_to_alert(true, at(1502));
        assert!(m.is_running());
        assert_eq!(m.mode(), SessionMode::Break);
        assert_eq!(m.state().end_timestamp, Some(at(1802)));
        assert_invariants(&m, &log.borrow());
    }

    #[test]
    fn dismissing_alert_leaves_session_idle() {
        let (mut m, _) = machine();
        m.start(at(0));
        m.tick(at(1500));
        m.respond_to_alert(false, at(1502));
        assert!(!m.is_running());
        assert_eq!(m.mode(), SessionMode::Break);
    }

    #[test]
    fn stale_accept_after_manual_start_does_not_pause() {
        let (mut m, _) = machine();
        m.start(at(0));
        m.tick(at(1500));
        m.start(at(1501));
        m.respond_to_alert(true, at(1502));
        assert!(m.is_running());
    }

    #[test]
    fn auto_continue_starts_next_session_without_prompt() {
        let (m, log) = machine();
        let mut m = m.with_auto_continue(true);
        m.start(at(0));
        let t = m.tick(at(1500)).expect("expiry");
        assert!(t.auto_started);
        assert!(m.is_running());
        assert_eq!(m.state().end_timestamp, Some(at(1800)));
        assert!(log.borrow().alerts.is_empty());
        assert_invariants(&m, &log.borrow());
    }

    #[test]
    fn scheduler_failure_does_not_stop_the_session() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut m = SessionMachine::new(
            Durations::default(),
            Box::new(RecordingScheduler {
                log: log.clone(),
                fail: true,
            }),
            Box::new(RecordingPresenter(log.clone())),
        );
        m.start(at(0));
        assert!(m.is_running());
        assert!(m.tick(at(1500)).is_some());
        assert_eq!(m.mode(), SessionMode::Break);
    }

    #[test]
    fn settings_change_while_running_keeps_current_end_time() {
        let (mut m, _) = machine();
        m.start(at(0));
        m.update_durations(|d| {
            d.focus_secs = 600;
            d.break_secs = 900;
        });
        assert_eq!(m.state().end_timestamp, Some(at(1500)));
        assert_eq!(m.tick(at(1000)), None);
        assert_eq!(m.remaining_secs(), 500);

        m.tick(at(1500));
        assert_eq!(m.remaining_secs(), 900);
    }

    #[test]
    fn settings_change_while_idle_applies_to_fresh_session() {
        let (mut m, _) = machine();
        m.update_durations(|d| d.focus_secs = 3000);
        assert_eq!(m.remaining_secs(), 3000);
    }

    #[test]
    fn settings_change_clamps_paused_session() {
        let (mut m, _) = machine();
        m.start(at(0));
        m.pause(at(100));
        m.update_durations(|d| d.focus_secs = 600);
        assert_eq!(m.remaining_secs(), 600);

        m.update_durations(|d| d.focus_secs = 1200);
        assert_eq!(m.remaining_secs(), 1200);
    }

    #[test]
    fn shortening_lengths_mid_session_keeps_its_size_until_transition() {
        let (mut m, log) = machine();
        m.start(at(0));
        m.update_durations(|d| {
            d.focus_secs = 600;
            d.break_secs = 300;
        });
        m.tick(at(10));
        assert_eq!(m.remaining_secs(), 1490);
        assert!(m.remaining_secs() > m.durations().longest());
        assert_invariants(&m, &log.borrow());

        m.pause(at(20));
        assert_eq!(m.remaining_secs(), 1480);
        assert_invariants(&m, &log.borrow());

        m.skip(at(30));
        assert_eq!(m.remaining_secs(), 300);
        assert!(m.remaining_secs() <= m.durations().longest());
        assert_invariants(&m, &log.borrow());
    }

    #[test]
    fn progress_tracks_the_session_target() {
        let (mut m, _) = machine();
        assert_eq!(m.progress(), 0.0);
        m.start(at(0));
        m.tick(at(750));
        assert!((m.progress() - 0.5).abs() < 1e-9);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Start,
        Pause,
        Reset,
        Skip,
        Tick(i64),
        Suspend(i64),
        SetDurations(u32, u32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Start),
            Just(Op::Pause),
            Just(Op::Reset),
            Just(Op::Skip),
            (1i64..120).prop_map(Op::Tick),
            (1i64..10_000).prop_map(Op::Suspend),
            (minutes(), minutes()).prop_map(|(f, b)| Op::SetDurations(f, b)),
        ]
    }

    fn minutes() -> impl Strategy<Value = u32> {
        (1u32..=60).prop_map(|m| m * 60)
    }

    proptest! {
        #[test]
        fn reset_from_any_state_is_fresh_focus(
            focus in minutes(),
            brk in minutes(),
            ops in prop::collection::vec(op(), 0..40),
        ) {
            let (mut m, log) = machine_with(Durations { focus_secs: focus, break_secs: brk });
            let mut now = 0;
            for op in ops {
                match op {
                    Op::Start => { m.start(at(now)); }
                    Op::Pause => { m.pause(at(now)); }
                    Op::Reset => m.reset(),
                    Op::Skip => { m.skip(at(now)); }
                    Op::Tick(dt) => { now += dt; m.tick(at(now)); }
                    Op::Suspend(dt) => { now += dt; m.reconcile_after_suspension(at(now)); }
                    Op::SetDurations(f, b) => m.update_durations(|d| {
                        d.focus_secs = f;
                        d.break_secs = b;
                    }),
                }
                assert_invariants(&m, &log.borrow());
            }
            m.reset();
            let focus_now = m.durations().focus_secs;
            prop_assert_eq!(m.state(), &SessionState::idle(SessionMode::Focus, focus_now));
        }

        #[test]
        fn modes_strictly_alternate(
            focus in minutes(),
            brk in minutes(),
            ops in prop::collection::vec(op(), 0..60),
        ) {
            let (mut m, _) = machine_with(Durations { focus_secs: focus, break_secs: brk });
            let mut now = 0;
            let mut last = SessionMode::Focus;
            for op in ops {
                let t = match op {
                    Op::Start => m.start(at(now)),
                    Op::Pause => m.pause(at(now)),
                    Op::Skip => Some(m.skip(at(now))),
                    Op::Tick(dt) => { now += dt; m.tick(at(now)) }
                    Op::Suspend(dt) => { now += dt; m.reconcile_after_suspension(at(now)) }
                    Op::SetDurations(f, b) => {
                        m.update_durations(|d| {
                            d.focus_secs = f;
                            d.break_secs = b;
                        });
                        None
                    }
                    Op::Reset => continue,
                };
                if let Some(t) = t {
                    prop_assert_eq!(t.ended, last);
                    prop_assert_ne!(t.next, last);
                    last = t.next;
                }
                prop_assert_eq!(m.mode(), last);
            }
        }
    }
}

use crate::clock::format_mmss;
use crate::companion::CompanionChannel;
use crate::config::Config;
use crate::persistence::SettingsStore;
use crate::session::{SessionMachine, Transition, TransitionAlert};
use chrono::{DateTime, Utc};
use focusbeat_ipc::{Command, Response, SessionMode, SessionStatus};
use tracing::{info, warn};

#[derive(Default, Clone, PartialEq, Debug)]
pub enum AppMode {
    #[default]
    Normal,
    /// End-of-session prompt waiting for y/n.
    Prompt(TransitionAlert),
    ShowHelp,
}

/// Everything the UI loop owns. All session mutations go through here, on one thread.
pub struct App {
    pub machine: SessionMachine<SettingsStore>,
    pub mode: AppMode,
    pub config: Config,
    pub companion_message: Option<String>,
    pub should_quit: bool,
    companion: Box<dyn CompanionChannel>,
    last_transition: Option<Transition>,
}

impl App {
    pub fn new(
        config: Config,
        machine: SessionMachine<SettingsStore>,
        companion: Box<dyn CompanionChannel>,
    ) -> Self {
        Self {
            machine,
            mode: AppMode::Normal,
            config,
            companion_message: None,
            should_quit: false,
            companion,
            last_transition: None,
        }
    }

    pub fn toggle_timer(&mut self, now: DateTime<Utc>) {
        let transition = self.machine.start(now);
        let expired = transition.is_some();
        self.after_command(transition);
        if self.machine.is_running() {
            self.relay(format!(
                "{} started · {}",
                self.machine.mode(),
                format_mmss(self.machine.remaining_secs())
            ));
        } else if !expired {
            self.relay(format!(
                "{} paused at {}",
                self.machine.mode(),
                format_mmss(self.machine.remaining_secs())
            ));
        }
    }

    pub fn reset_timer(&mut self) {
        self.machine.reset();
        self.mode = AppMode::Normal;
        self.relay("Timer reset".to_string());
    }

    pub fn skip_session(&mut self, now: DateTime<Utc>) {
        let transition = self.machine.skip(now);
        self.after_command(Some(transition));
    }

    pub fn tick(&mut self, now: DateTime<Utc>) {
        let transition = self.machine.tick(now);
        self.after_command(transition);
    }

    /// The host became active again after a gap with no ticks.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        let transition = self.machine.reconcile_after_suspension(now);
        self.after_command(transition);
    }

    pub fn set_foreground(&mut self, foreground: bool, now: DateTime<Utc>) {
        let was = self.machine.is_foreground();
        self.machine.set_foreground(foreground);
        if foreground && !was {
            self.resume(now);
        }
    }

    pub fn show_alert(&mut self, alert: TransitionAlert) {
        if self.machine.awaiting_response() {
            self.mode = AppMode::Prompt(alert);
        }
    }

    pub fn answer_prompt(&mut self, accept: bool, now: DateTime<Utc>) {
        self.mode = AppMode::Normal;
        let transition = self.machine.respond_to_alert(accept, now);
        self.after_command(transition);
        if self.machine.is_running() {
            self.relay(format!("{} started", self.machine.mode()));
        }
    }

    /// Drop a prompt that no longer applies, e.g. the session was started remotely.
    pub fn sync_prompt(&mut self) {
        if matches!(self.mode, AppMode::Prompt(_)) && !self.machine.awaiting_response() {
            self.mode = AppMode::Normal;
        }
    }

    pub fn adjust_minutes(&mut self, mode: SessionMode, delta: i64) {
        self.machine.update_durations(|s| s.step_minutes(mode, delta));
        self.save_settings();
    }

    pub fn set_minutes(&mut self, focus: Option<u32>, rest: Option<u32>) {
        self.machine.update_durations(|s| {
            if let Some(m) = focus {
                s.set_minutes(SessionMode::Focus, i64::from(m));
            }
            if let Some(m) = rest {
                s.set_minutes(SessionMode::Break, i64::from(m));
            }
        });
        self.save_settings();
    }

    pub fn restore_defaults(&mut self) {
        self.machine.update_durations(SettingsStore::restore_defaults);
        self.save_settings();
    }

    pub fn receive_companion(&mut self, text: String) {
        info!("Received companion message: {}", text);
        self.companion_message = Some(text);
    }

    pub fn take_transition(&mut self) -> Option<Transition> {
        self.last_transition.take()
    }

    pub fn status(&self) -> SessionStatus {
        let durations = self.machine.durations().durations();
        SessionStatus {
            mode: self.machine.mode(),
            running: self.machine.is_running(),
            remaining_secs: self.machine.remaining_secs(),
            focus_secs: durations.focus_secs,
            break_secs: durations.break_secs,
            companion_message: self.companion_message.clone(),
        }
    }

    pub fn handle_command(&mut self, command: Command, now: DateTime<Utc>) -> Response {
        match command {
            Command::Toggle => self.toggle_timer(now),
            Command::Start => {
                if !self.machine.is_running() {
                    self.toggle_timer(now);
                }
            }
            Command::Pause => {
                if self.machine.is_running() {
                    self.toggle_timer(now);
                }
            }
            Command::Reset => self.reset_timer(),
            Command::Skip => self.skip_session(now),
            Command::Status => {}
            Command::SetDurations {
                focus_minutes,
                break_minutes,
            } => self.set_minutes(focus_minutes, break_minutes),
            Command::RestoreDefaults => self.restore_defaults(),
            Command::Relay { text } => {
                self.receive_companion(text);
                return Response::Ok;
            }
        }
        self.sync_prompt();
        Response::Status(self.status())
    }

    fn after_command(&mut self, transition: Option<Transition>) {
        let Some(t) = transition else {
            return;
        };
        self.relay(format!(
            "{} complete, {} next ({})",
            t.ended,
            t.next,
            format_mmss(t.next_secs)
        ));
        self.last_transition = Some(t);
    }

    fn relay(&self, text: String) {
        self.companion.send(&text);
    }

    fn save_settings(&self) {
        if let Err(e) = self.machine.durations().save() {
            warn!("Failed to save settings: {:#}", e);
        }
    }
}

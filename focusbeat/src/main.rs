use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use focusbeat::app::{App, AppMode};
use focusbeat::companion::SocketCompanion;
use focusbeat::config::{self, Config};
use focusbeat::ipc::server::{self, ControlRequest};
use focusbeat::lifecycle::SuspensionDetector;
use focusbeat::notify::DesktopScheduler;
use focusbeat::persistence::SettingsStore;
use focusbeat::session::{ChannelPresenter, SessionMachine, TransitionAlert};
use focusbeat_ipc::SessionMode;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod ui;

use ui::Ui;

struct Inbound {
    requests: mpsc::Receiver<ControlRequest>,
    alerts: mpsc::UnboundedReceiver<TransitionAlert>,
}

fn main() -> Result<()> {
    if let Err(e) = init_logging() {
        eprintln!("Warning: running without a log file: {:#}", e);
    }
    let config = config::load_config().unwrap_or_else(|e| {
        warn!("Using default config: {:#}", e);
        Config::default()
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    // Control socket
    let (request_tx, request_rx) = mpsc::channel(32);
    let socket_path = config.ipc.socket_path.clone();
    {
        let _enter = runtime.enter();
        match server::bind(&socket_path) {
            Ok(listener) => {
                runtime.spawn(server::serve(listener, request_tx));
            }
            Err(e) => warn!("Remote control disabled: {:#}", e),
        }
    }

    // Session engine
    let (alert_tx, alert_rx) = mpsc::unbounded_channel();
    let machine = SessionMachine::new(
        SettingsStore::open_default(),
        Box::new(DesktopScheduler::new(runtime.handle().clone())),
        Box::new(ChannelPresenter::new(alert_tx)),
    )
    .with_auto_continue(config.timer.auto_continue);
    let companion = SocketCompanion::new(
        config.companion.peer_socket.clone(),
        runtime.handle().clone(),
    );
    let app = App::new(config, machine, Box::new(companion));
    let inbound = Inbound {
        requests: request_rx,
        alerts: alert_rx,
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, inbound);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    let _ = fs::remove_file(&socket_path);
    runtime.shutdown_timeout(Duration::from_millis(200));

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging() -> Result<()> {
    let Some(dir) = SettingsStore::data_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory at {:?}", dir))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("focusbeat.log"))
        .context("Failed to open log file")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App, mut inbound: Inbound) -> Result<()> {
    let tick_every = Duration::from_millis(app.config.timer.tick_millis.max(100));
    let mut detector =
        SuspensionDetector::new(chrono::Duration::seconds(app.config.timer.suspend_threshold_secs));
    let mut last_tick = Instant::now();
    let mut ui = Ui::default();
    info!("focusbeat started");

    loop {
        // While unfocused the gap is absorbed; FocusGained is the activation then
        if detector.observe(Utc::now()) && app.machine.is_foreground() {
            info!("resumed after suspension");
            app.resume(Utc::now());
        }

        // Remote commands are executed here, on the UI thread
        while let Ok(req) = inbound.requests.try_recv() {
            let response = app.handle_command(req.command, Utc::now());
            let _ = req.reply.send(response);
        }

        if app.machine.is_foreground() && last_tick.elapsed() >= tick_every {
            app.tick(Utc::now());
            last_tick = Instant::now();
        }

        while let Ok(alert) = inbound.alerts.try_recv() {
            app.show_alert(alert);
        }
        app.sync_prompt();

        if app.take_transition().is_some() {
            ui.trigger_transition_effect(&app);
        }

        terminal.draw(|f| ui.draw(f, &app))?;

        if app.should_quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::FocusGained => {
                    let now = Utc::now();
                    detector.activated(now);
                    app.set_foreground(true, now);
                }
                Event::FocusLost => app.set_foreground(false, Utc::now()),
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(&mut app, key.code)
                }
                _ => {}
            }
        }
    }
}

fn handle_key(app: &mut App, code: KeyCode) {
    let now = Utc::now();
    match app.mode {
        AppMode::Normal => match code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char(' ') => app.toggle_timer(now),
            KeyCode::Char('r') => app.reset_timer(),
            KeyCode::Char('s') => app.skip_session(now),
            KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_minutes(SessionMode::Focus, 1),
            KeyCode::Char('-') => app.adjust_minutes(SessionMode::Focus, -1),
            KeyCode::Char(']') => app.adjust_minutes(SessionMode::Break, 1),
            KeyCode::Char('[') => app.adjust_minutes(SessionMode::Break, -1),
            KeyCode::Char('d') => app.restore_defaults(),
            KeyCode::Char('?') => app.mode = AppMode::ShowHelp,
            _ => {}
        },
        AppMode::Prompt(_) => match code {
            KeyCode::Char('y') | KeyCode::Enter => app.answer_prompt(true, now),
            KeyCode::Char('n') | KeyCode::Esc => app.answer_prompt(false, now),
            _ => {}
        },
        AppMode::ShowHelp => app.mode = AppMode::Normal,
    }
}

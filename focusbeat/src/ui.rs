use focusbeat::app::{App, AppMode};
use focusbeat::clock::format_mmss;
use focusbeat::session::TransitionAlert;
use focusbeat_ipc::SessionMode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph},
    Frame,
};
use std::time::Instant;
use tachyonfx::{fx, Duration as TachyonDuration, EffectManager};

pub struct Ui {
    effects: EffectManager<u32>,
    last_frame: Instant,
    timer_area: Rect,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            effects: EffectManager::default(),
            last_frame: Instant::now(),
            timer_area: Rect::default(),
        }
    }
}

impl Ui {
    pub fn draw(&mut self, f: &mut Frame, app: &App) {
        let area = f.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(7),
                Constraint::Length(4),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        draw_header(f, chunks[0], app);
        draw_timer(f, chunks[1], app);
        draw_durations(f, chunks[2], app);
        draw_companion(f, chunks[3], app);
        draw_status_bar(f, chunks[4], app);
        self.timer_area = chunks[1];

        match &app.mode {
            AppMode::Prompt(alert) => draw_prompt_overlay(f, alert, app),
            AppMode::ShowHelp => draw_help_overlay(f, app),
            AppMode::Normal => {}
        }

        let elapsed = self.last_frame.elapsed();
        self.last_frame = Instant::now();
        let delta = TachyonDuration::from_millis(elapsed.as_millis().min(u128::from(u32::MAX)) as u32);
        self.effects.process_effects(delta, f.buffer_mut(), area);
    }

    pub fn trigger_transition_effect(&mut self, app: &App) {
        let color = mode_color(app, app.machine.mode());
        let effect = fx::fade_to_fg(color, 600).with_area(self.timer_area);
        self.effects.add_effect(effect);
    }
}

fn mode_color(app: &App, mode: SessionMode) -> Color {
    match mode {
        SessionMode::Focus => app.config.theme.red,
        SessionMode::Break => app.config.theme.green,
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let text = Line::from(vec![
        Span::raw(icons.header_left.clone()),
        Span::styled(
            "FOCUS BEAT",
            Style::default().fg(theme.blue).add_modifier(Modifier::BOLD),
        ),
        Span::raw(icons.header_right.clone()),
    ]);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.black)),
        ),
        area,
    );
}

fn draw_timer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let machine = &app.machine;
    let mode = machine.mode();
    let color = mode_color(app, mode);
    let (mode_icon, state_icon) = (
        match mode {
            SessionMode::Focus => &icons.focus,
            SessionMode::Break => &icons.rest,
        },
        if machine.is_running() {
            &icons.play
        } else {
            &icons.pause
        },
    );

    let block = Block::default()
        .title(Span::styled(
            format!(" {} {} ", mode_icon, mode),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(inner_area);
    f.render_widget(
        Paragraph::new(format!(
            "{} {}",
            state_icon,
            format_mmss(machine.remaining_secs())
        ))
        .style(
            Style::default()
                .fg(theme.foreground)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center),
        v_chunks[0],
    );
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(color).bg(theme.black))
            .percent((machine.progress() * 100.0).clamp(0.0, 100.0) as u16),
        v_chunks[2],
    );
}

fn draw_durations(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let durations = app.machine.durations().durations();
    let block = Block::default()
        .title(Span::styled(" Settings ", Style::default().fg(theme.gray)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.black));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let line = |label: &str, secs: u32, keys: &str| {
        Line::from(vec![
            Span::styled(format!("{:<8}", label), Style::default().fg(theme.gray)),
            Span::styled(
                format!("{:>3} min", secs / 60),
                Style::default().fg(theme.foreground),
            ),
            Span::styled(format!("  {}", keys), Style::default().fg(theme.black)),
        ])
    };
    f.render_widget(
        Paragraph::new(vec![
            line("Focus", durations.focus_secs, "+/-"),
            line("Break", durations.break_secs, "]/["),
        ]),
        inner_area,
    );
}

fn draw_companion(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let text = match &app.companion_message {
        Some(msg) => Span::styled(
            format!("{} {}", app.config.icons.companion, msg),
            Style::default().fg(theme.magenta),
        ),
        None => Span::styled("", Style::default()),
    };
    f.render_widget(
        Paragraph::new(Line::from(text)).alignment(Alignment::Center),
        area,
    );
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let (mode_text, mode_color) = match app.mode {
        AppMode::Normal => ("NORMAL", theme.green),
        AppMode::Prompt(_) => ("PROMPT", theme.yellow),
        AppMode::ShowHelp => ("HELP", theme.magenta),
    };
    let help = match app.mode {
        AppMode::Normal => "space:start/pause │ r:reset │ s:skip │ ?:help │ q:quit",
        AppMode::Prompt(_) => "y:start │ n:not now",
        AppMode::ShowHelp => "any key:close",
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", mode_text),
                Style::default()
                    .bg(mode_color)
                    .fg(theme.background)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(help),
        ]))
        .block(Block::default().style(Style::default().bg(theme.black).fg(theme.gray))),
        area,
    );
}

fn draw_prompt_overlay(f: &mut Frame, alert: &TransitionAlert, app: &App) {
    let area = centered_rect(50, 30, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {} ", alert.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(mode_color(app, alert.next)))
        .border_type(BorderType::Double)
        .style(Style::default().bg(app.config.theme.background));
    let inner_area = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                alert.message.clone(),
                Style::default().fg(app.config.theme.foreground),
            )),
            Line::raw(""),
            Line::from(vec![
                Span::styled("y", Style::default().fg(app.config.theme.blue)),
                Span::raw(" start   "),
                Span::styled("n", Style::default().fg(app.config.theme.blue)),
                Span::raw(" not now"),
            ]),
        ])
        .alignment(Alignment::Center),
        inner_area,
    );
}

fn draw_help_overlay(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let shortcuts = [
        ("Space", "Start/pause"),
        ("r", "Reset to focus"),
        ("s", "Skip to next session"),
        ("+ / -", "Focus length ±1 min"),
        ("] / [", "Break length ±1 min"),
        ("d", "Restore default lengths"),
        ("q", "Quit"),
    ];
    let lines: Vec<Line> = shortcuts
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{:>7}  ", key), Style::default().fg(app.config.theme.blue)),
                Span::raw(*what),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Keys ")
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(app.config.theme.magenta))
                .style(Style::default().bg(app.config.theme.background)),
        ),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

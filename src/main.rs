use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use tennis_terminal::api::HttpScoreApi;
use tennis_terminal::display::{resolve_points, set_cell, set_column_count};
use tennis_terminal::state::MatchStore;

struct App {
    store: MatchStore,
    api: HttpScoreApi,
    should_quit: bool,
    help_overlay: bool,
    score_poll: Option<Duration>,
    last_poll: Instant,
}

impl App {
    fn new(api: HttpScoreApi) -> Self {
        let score_poll = std::env::var("SCORE_POLL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(|secs| Duration::from_secs(secs.max(2)));
        Self {
            store: MatchStore::new(),
            api,
            should_quit: false,
            help_overlay: false,
            score_poll,
            last_poll: Instant::now(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.score_point(0),
            KeyCode::Char('2') => self.score_point(1),
            KeyCode::Char('r') => self.store.refresh(&self.api),
            KeyCode::Char('x') => self.store.reset(&self.api),
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            _ => {}
        }
    }

    fn score_point(&mut self, idx: usize) {
        let Some(name) = self.store.players().get(idx).map(|p| p.name.clone()) else {
            return;
        };
        self.store.increment_score(&self.api, &name);
    }

    fn maybe_poll_scores(&mut self) {
        let Some(poll) = self.score_poll else {
            return;
        };
        if self.last_poll.elapsed() >= poll {
            self.store.refresh(&self.api);
            self.last_poll = Instant::now();
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(HttpScoreApi::from_env());
    app.store.refresh(&app.api);

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        app.maybe_poll_scores();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app.api.base_url()))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_scoreboard(frame, chunks[1], app);

    let footer = Paragraph::new("1/2 Point for player 1/2 | r Refresh | x Reset all scores | ? Help | q Quit")
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(base_url: &str) -> String {
    let line1 = format!("  _o_  TENNIS TERMINAL | {base_url}");
    let line2 = "  /|\\".to_string();
    let line3 = "  / \\".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn render_scoreboard(frame: &mut Frame, area: Rect, app: &App) {
    let roster = app.store.players();

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    if let Some(winner) = app.store.winner() {
        let banner = Paragraph::new(format!("Winner: {}", winner.name))
            .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD));
        frame.render_widget(banner, sections[0]);
    }

    if let Some(err) = app.store.error() {
        let msg = Paragraph::new(err.to_string()).style(Style::default().fg(Color::Red));
        frame.render_widget(msg, sections[1]);
    }

    if roster.is_empty() {
        let text = if app.store.loading() {
            "Loading match data..."
        } else {
            "No match data"
        };
        let empty = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, sections[3]);
        return;
    }

    let max_sets = set_column_count(roster);
    let widths = scoreboard_columns(max_sets);

    render_scoreboard_header(frame, sections[2], &widths, max_sets);

    let rows_area = sections[3];
    for (i, player) in roster.iter().enumerate() {
        if (i as u16) >= rows_area.height {
            break;
        }
        let row_area = Rect {
            x: rows_area.x,
            y: rows_area.y + i as u16,
            width: rows_area.width,
            height: 1,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths.clone())
            .split(row_area);

        let row_style = if player.winner {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        render_cell_text(frame, cols[0], &player.name, row_style);
        for idx in 0..max_sets {
            render_cell_text(frame, cols[1 + idx], &set_cell(player, idx), row_style);
        }
        render_cell_text(
            frame,
            cols[1 + max_sets],
            &player.current_set_games.to_string(),
            row_style,
        );
        let points = resolve_points(player, roster).to_string();
        render_cell_text(frame, cols[2 + max_sets], &points, row_style);
    }
}

fn scoreboard_columns(max_sets: usize) -> Vec<Constraint> {
    let mut widths = Vec::with_capacity(max_sets + 3);
    widths.push(Constraint::Min(14));
    for _ in 0..max_sets {
        widths.push(Constraint::Length(7));
    }
    widths.push(Constraint::Length(7));
    widths.push(Constraint::Length(8));
    widths
}

fn render_scoreboard_header(
    frame: &mut Frame,
    area: Rect,
    widths: &[Constraint],
    max_sets: usize,
) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths.to_vec())
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell_text(frame, cols[0], "Player", style);
    for idx in 0..max_sets {
        render_cell_text(frame, cols[1 + idx], &format!("Set {}", idx + 1), style);
    }
    render_cell_text(frame, cols[1 + max_sets], "Games", style);
    render_cell_text(frame, cols[2 + max_sets], "Points", style);
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, text_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(50, 50, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Tennis Terminal - Help",
        "",
        "  1            Point for player 1",
        "  2            Point for player 2",
        "  r            Refresh match data",
        "  x            Reset all scores",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Scores are computed by the scoring service;",
        "this client only displays them.",
    ]
    .join("\n");

    let help = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Help"));
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub mod plain;

use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::App;
use crate::repo::ReviewSource;
use crate::store::ReviewerState;

/// One display row: `login — count`.
pub fn row_text(login: &str, count: usize) -> String {
    format!("{login} — {count}")
}

pub fn run<S: ReviewSource>(mut app: App<S>, tick_rate: Duration) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut last_tick = Instant::now();
    let res = loop {
        app.poll_fetch();
        if let Err(e) = terminal.draw(|f| draw(f, &app)) {
            break Err(anyhow::Error::from(e));
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        match poll_key(timeout) {
            Ok(Some(code)) if handle_key(&mut app, code) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e),
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    };

    cleanup_terminal(&mut terminal)?;
    res
}

fn poll_key(timeout: Duration) -> Result<Option<KeyCode>> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind == KeyEventKind::Press
    {
        return Ok(Some(key.code));
    }
    Ok(None)
}

/// Returns true when the app should quit.
fn handle_key<S: ReviewSource>(app: &mut App<S>, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('g') | KeyCode::Char('r') => app.start_fetch(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('o') | KeyCode::Enter => app.open_selected(),
        _ => {}
    }
    false
}

fn draw<S: ReviewSource>(f: &mut ratatui::Frame, app: &App<S>) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(size);

    f.render_widget(render_header(app), chunks[0]);

    let state = app.state();
    if state.shows_spinner() {
        let loading = Paragraph::new("⏳ Loading review requests...")
            .style(Style::default().fg(Color::Magenta))
            .block(Block::default().title("Reviewers").borders(Borders::ALL));
        f.render_widget(loading, chunks[1]);
    } else {
        let mut list_state = ListState::default();
        if !state.distinct_reviewers.is_empty() {
            list_state.select(Some(app.selected));
        }
        f.render_stateful_widget(render_list(state, app.selected), chunks[1], &mut list_state);
    }

    f.render_widget(render_footer(app), chunks[2]);
}

fn render_header<S: ReviewSource>(app: &App<S>) -> Paragraph<'static> {
    let state = app.state();
    let total: usize = state.reviewer_counts.values().sum();
    let summary = format!(
        "Reviewers: {} / Requests: {}",
        state.distinct_reviewers.len(),
        total
    );
    let mut spans = vec![
        Span::styled(app.title.clone(), Style::default().fg(Color::Cyan)),
        Span::raw("  |  "),
        Span::styled(summary, Style::default().fg(Color::Yellow)),
    ];
    if state.is_loading {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            "⏳ Fetching...",
            Style::default().fg(Color::Magenta),
        ));
    }
    Paragraph::new(Line::from(spans))
        .block(Block::default().title("Overview").borders(Borders::ALL))
        .wrap(Wrap { trim: true })
}

fn render_list(state: &ReviewerState, selected: usize) -> List<'static> {
    let items: Vec<ListItem> = state
        .rows()
        .enumerate()
        .map(|(idx, (login, count))| {
            let style = if idx == selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(format!(" {}", row_text(login, count)))).style(style)
        })
        .collect();

    List::new(items)
        .block(
            Block::default()
                .title("Reviewers (g fetch ; j/k move ; o open profile ; q quit)")
                .borders(Borders::ALL),
        )
        .highlight_symbol("➤ ")
}

fn render_footer<S: ReviewSource>(app: &App<S>) -> Paragraph<'_> {
    let msg = app
        .status
        .as_deref()
        .unwrap_or("g fetch ; o open profile ; q quit");
    Paragraph::new(msg).block(Block::default().title("Status").borders(Borders::ALL))
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

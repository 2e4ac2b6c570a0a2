//! Discharge Desk - Actor-based terminal client for the discharge-summary backend
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events and timers
//! - Network Layer (Tokio) - async HTTP execution

use std::io::{self, Write};
use std::time::Duration;

use base64::Engine;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use discharge_desk::app::forms::{FieldKind, FormDraft};
use discharge_desk::app::pagination::LoadMore;
use discharge_desk::app::region::RequestState;
use discharge_desk::constants::{APP_NAME, APP_VERSION, LOG_FILE};
use discharge_desk::messages::ui_events::{key_to_ui_event, InputMode, Screen};
use discharge_desk::models::{PatientRow, SubmitReceipt};
use discharge_desk::ui::{notification_color, render_input, render_labelled, render_tabs};
use discharge_desk::{
    AppActor, ClientConfig, Clipboard, NetworkActor, NetworkCommand, NetworkResponse, RenderState,
    Storage, UiEvent,
};

const FALLBACK_NOTE: &str = "Based on data from a similar patient";

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Clipboard backed by the OSC 52 terminal escape. The App hands text over
/// and the UI loop writes it between frames.
struct TerminalClipboard {
    tx: mpsc::UnboundedSender<String>,
}

impl Clipboard for TerminalClipboard {
    fn copy(&mut self, text: &str) -> anyhow::Result<()> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(text);
        self.tx
            .send(format!("\x1b]52;c;{}\x07", encoded))
            .map_err(|_| anyhow::anyhow!("terminal is gone"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(base_url = %config.base_url, version = APP_VERSION, "Starting {}", APP_NAME);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _terminal_guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();
    let (clip_tx, mut clip_rx) = mpsc::unbounded_channel::<String>();

    // Spawn network actor
    let network_actor = NetworkActor::new(config.clone(), net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let clipboard = Box::new(TerminalClipboard { tx: clip_tx });
    let app_actor = AppActor::new(config, Storage::new(), net_cmd_tx, render_tx, clipboard);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx, &mut clip_rx).await?;

    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
    clip_rx: &mut mpsc::UnboundedReceiver<String>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) =
                    key_to_ui_event(key, current_state.screen, current_state.input_mode)
                {
                    let quit = matches!(event, UiEvent::Quit);
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }

        while let Ok(sequence) = clip_rx.try_recv() {
            let out = terminal.backend_mut();
            out.write_all(sequence.as_bytes())?;
            Write::flush(out)?;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(state.palette.bg).fg(state.palette.fg)),
        area,
    );

    // Main layout with tab bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_tab_bar(f, state, main_chunks[0]);

    match state.screen {
        Screen::Lookup => draw_lookup(f, state, main_chunks[1]),
        Screen::AddPatient => draw_form(
            f,
            state,
            &state.patient_form,
            &state.patient_status,
            " Add Patient ",
            main_chunks[1],
        ),
        Screen::UploadReport => draw_form(
            f,
            state,
            &state.upload_form,
            &state.upload_status,
            " Upload Test Report ",
            main_chunks[1],
        ),
        Screen::Database => draw_database(f, state, main_chunks[1]),
    }

    draw_status_bar(f, state, main_chunks[2]);
    draw_notifications(f, state, area);
}

fn draw_tab_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let titles: Vec<&str> = Screen::ALL.iter().map(|s| s.title()).collect();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(22)])
        .split(area);

    f.render_widget(render_tabs(&titles, state.screen.index(), &state.palette), chunks[0]);
    let theme = Paragraph::new(format!("{} [{}]", APP_NAME, state.theme.as_str()))
        .style(Style::default().fg(state.palette.muted))
        .alignment(Alignment::Right);
    f.render_widget(theme, chunks[1]);
}

fn draw_fields(f: &mut Frame, state: &RenderState, form: &FormDraft, area: Rect) {
    let constraints: Vec<Constraint> = form.fields.iter().map(|_| Constraint::Length(3)).collect();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let editing = state.input_mode == InputMode::Editing;
    for (i, (field, chunk)) in form.fields.iter().zip(chunks.iter()).enumerate() {
        let focused = i == form.focus;
        let title = match (field.kind, field.required) {
            (FieldKind::File, true) => format!(" {} (file path) * ", field.label),
            (FieldKind::File, false) => format!(" {} (file path) ", field.label),
            (FieldKind::Text, true) => format!(" {} * ", field.label),
            (FieldKind::Text, false) => format!(" {} ", field.label),
        };
        f.render_widget(
            render_input(&field.value, &title, focused, editing, &state.palette),
            *chunk,
        );

        // Cursor
        if focused && editing {
            let max_x = chunk.x + chunk.width.saturating_sub(2);
            let cursor_x = (chunk.x + field.value.chars().count() as u16 + 1).min(max_x);
            f.set_cursor_position(Position::new(cursor_x, chunk.y + 1));
        }
    }
}

fn draw_lookup(f: &mut Frame, state: &RenderState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3 * state.lookup.fields.len() as u16),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(columns[0]);

    draw_fields(f, state, &state.lookup, left[0]);

    let actions = if state.actions_enabled {
        Style::default().fg(state.palette.accent)
    } else {
        Style::default().fg(state.palette.muted)
    };
    let options = Paragraph::new(Line::from(vec![
        Span::styled("p:preview  g:generate", actions),
        Span::raw("  "),
        Span::styled(
            format!("d:detail [{}]", state.detail_level.as_str()),
            Style::default().fg(state.palette.fg),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" Actions "));
    f.render_widget(options, left[1]);

    draw_preview(f, state, left[2]);
    draw_result(f, state, columns[1]);
}

fn draw_preview(f: &mut Frame, state: &RenderState, area: Rect) {
    let palette = &state.palette;
    match &state.preview {
        RequestState::Success(preview) => {
            let mut fields = preview.fields(&state.base_url);
            if preview.is_fallback() {
                fields.push(("Note", FALLBACK_NOTE.to_string()));
            }
            f.render_widget(render_labelled(&fields, " Patient Preview ", palette), area);
        }
        other => {
            let text = placeholder(other, "Press 'p' to preview the patient", "Fetching patient data...");
            f.render_widget(placeholder_paragraph(text, other, state, " Patient Preview "), area);
        }
    }
}

fn draw_result(f: &mut Frame, state: &RenderState, area: Rect) {
    let palette = &state.palette;
    match &state.result {
        RequestState::Success(reply) => {
            let title = if state.downloading {
                " Discharge Summary [downloading...] "
            } else {
                " Discharge Summary (c:copy o:pdf ↑/↓ scroll) "
            };
            let mut sections = reply.summary.sections();
            if reply.summary.is_fallback() {
                sections.insert(0, ("Note", FALLBACK_NOTE.to_string()));
            }
            let paragraph = render_labelled(&sections, title, palette)
                .scroll((state.result_scroll, 0));
            f.render_widget(paragraph, area);
        }
        other => {
            let text = placeholder(other, "Press 'g' to generate a summary", "Generating summary...");
            f.render_widget(placeholder_paragraph(text, other, state, " Discharge Summary "), area);
        }
    }
}

fn placeholder<'a, T>(state: &'a RequestState<T>, idle: &'a str, loading: &'a str) -> &'a str {
    match state {
        RequestState::Idle | RequestState::Success(_) => idle,
        RequestState::Loading => loading,
        RequestState::Failure(message) => message,
    }
}

fn placeholder_paragraph<'a, T>(
    text: &'a str,
    region: &RequestState<T>,
    state: &RenderState,
    title: &'a str,
) -> Paragraph<'a> {
    let color = match region {
        RequestState::Failure(_) => state.palette.error,
        RequestState::Loading => state.palette.highlight,
        _ => state.palette.muted,
    };
    Paragraph::new(text)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title))
}

fn draw_form(
    f: &mut Frame,
    state: &RenderState,
    form: &FormDraft,
    status: &RequestState<SubmitReceipt>,
    title: &str,
    area: Rect,
) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let (line, color) = match status {
        RequestState::Loading => ("Submitting...".to_string(), state.palette.highlight),
        RequestState::Failure(message) => (message.clone(), state.palette.error),
        RequestState::Success(receipt) => (
            receipt.message.clone().unwrap_or_default(),
            state.palette.success,
        ),
        RequestState::Idle => ("s:submit  e:edit  Tab:next field".to_string(), state.palette.muted),
    };
    f.render_widget(Paragraph::new(line).style(Style::default().fg(color)), chunks[0]);

    draw_fields(f, state, form, chunks[1]);
}

fn draw_database(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let header = Row::new(PatientRow::COLUMNS.iter().map(|c| Cell::from(*c)))
        .style(Style::default().fg(state.palette.accent).bold());
    let rows = state
        .rows
        .iter()
        .skip(state.table_scroll as usize)
        .map(|row| Row::new(row.cells()));
    let widths = [
        Constraint::Length(6),
        Constraint::Length(16),
        Constraint::Length(4),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(7),
        Constraint::Length(5),
        Constraint::Length(7),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(16),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Min(8),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .style(Style::default().fg(state.palette.fg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Patients ({}) ", state.rows.len())),
        );
    f.render_widget(table, chunks[0]);

    let (footer, color) = match state.load_more {
        LoadMore::Ready => ("m:load more  r:reload", state.palette.accent),
        LoadMore::InFlight => ("Loading...", state.palette.highlight),
        LoadMore::Removed => ("All patients loaded  r:reload", state.palette.muted),
    };
    f.render_widget(
        Paragraph::new(footer).style(Style::default().fg(color)),
        chunks[1],
    );
}

fn draw_notifications(f: &mut Frame, state: &RenderState, area: Rect) {
    let width = 48.min(area.width);
    let mut y = area.y + 1;

    for notification in state.notifications.iter().rev() {
        if y + 3 > area.y + area.height {
            break;
        }
        let rect = Rect::new(area.x + area.width - width, y, width, 3);
        let color = notification_color(notification.kind, notification.phase, &state.palette);
        let toast = Paragraph::new(notification.message.as_str())
            .style(Style::default().fg(color).bg(state.palette.bg))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            );
        f.render_widget(Clear, rect);
        f.render_widget(toast, rect);
        y += 3;
    }
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let status = if state.input_mode == InputMode::Editing {
        " ESC:stop editing | Tab:next field "
    } else {
        " 1-4:screen | Tab:field | e:edit | t:theme | x:dismiss | q:quit "
    };

    let bar = Paragraph::new(status).style(Style::default().fg(state.palette.muted));
    f.render_widget(bar, area);
}

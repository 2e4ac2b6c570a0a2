use ratatui::{prelude::*, widgets::*};

use crate::app::notifications::{NotificationKind, NotificationPhase};
use crate::models::Theme;

/// Colors for one theme
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub accent: Color,
    pub muted: Color,
    pub success: Color,
    pub error: Color,
    pub highlight: Color,
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            fg: Color::Black,
            bg: Color::White,
            accent: Color::Blue,
            muted: Color::Gray,
            success: Color::Green,
            error: Color::Red,
            highlight: Color::Magenta,
        },
        Theme::Dark => Palette {
            fg: Color::White,
            bg: Color::Black,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            success: Color::LightGreen,
            error: Color::LightRed,
            highlight: Color::Yellow,
        },
    }
}

/// Renders a text input field
pub fn render_input<'a>(
    content: &'a str,
    title: &'a str,
    is_focused: bool,
    is_editing: bool,
    palette: &Palette,
) -> Paragraph<'a> {
    let style = if is_focused && is_editing {
        Style::default().fg(palette.highlight)
    } else if is_focused {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.muted)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title);

    Paragraph::new(content)
        .style(Style::default().fg(palette.fg))
        .block(block)
}

/// Renders labelled lines (preview and summary sections)
pub fn render_labelled<'a>(
    items: &[(&'a str, String)],
    title: &'a str,
    palette: &Palette,
) -> Paragraph<'a> {
    let lines: Vec<Line> = items
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{}: ", label), Style::default().fg(palette.accent).bold()),
                Span::styled(value.clone(), Style::default().fg(palette.fg)),
            ])
        })
        .collect();

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title))
}

/// Renders screen tabs
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize, palette: &Palette) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(palette.muted))
        .highlight_style(Style::default().fg(palette.highlight).bold())
        .divider("|")
}

/// Notification color; leaving notifications fade to the muted color
pub fn notification_color(kind: NotificationKind, phase: NotificationPhase, palette: &Palette) -> Color {
    match (phase, kind) {
        (NotificationPhase::Leaving, _) => palette.muted,
        (NotificationPhase::Visible, NotificationKind::Success) => palette.success,
        (NotificationPhase::Visible, NotificationKind::Error) => palette.error,
    }
}

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::App;
use crate::input::InputMode;
use crate::model::{Card, LogsPane, LogsState, Section, Tone, ViewState};

const BG: Color = Color::Rgb(9, 15, 25);
const PANEL: Color = Color::Rgb(16, 27, 44);
const ACCENT: Color = Color::Rgb(52, 211, 153);
const MUTED: Color = Color::Rgb(140, 156, 178);
const WARN: Color = Color::Rgb(251, 191, 36);
const ERROR: Color = Color::Rgb(248, 113, 113);

pub fn render(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, root[0], app);
    render_tabs(frame, root[1], app);
    render_body(frame, root[2], app);
    render_footer(frame, root[3], app);

    if let Some(pane) = app.logs() {
        render_logs_overlay(frame, app, pane);
    }
    if app.show_help() {
        render_help_modal(frame, app);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled(
            " spyglass ",
            Style::default()
                .fg(BG)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {} ", app.api_target()), Style::default().fg(MUTED)),
        Span::styled(
            format!(" namespace: {} ", app.scope()),
            Style::default().fg(Color::White),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(BG)), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let active = app.active_section();
    let mut spans = Vec::new();
    for section in Section::ALL {
        let style = if section == active {
            Style::default()
                .fg(ACCENT)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(MUTED)
        };
        spans.push(Span::styled(format!("  {}  ", section.title()), style));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
        area,
    );
}

fn render_body(frame: &mut Frame, area: Rect, app: &App) {
    let dim = app.switch_pending();
    let section = app.active_section();
    match app.view(section) {
        ViewState::Loading => render_notice(frame, area, "Loading…", MUTED, dim),
        ViewState::Empty => render_notice(frame, area, section.empty_message(), MUTED, dim),
        ViewState::Error(message) => render_error(frame, area, section, message, dim),
        ViewState::Populated(cards) => render_cards(frame, area, app, cards, dim),
    }
}

fn render_notice(frame: &mut Frame, area: Rect, message: &str, color: Color, dim: bool) {
    let paragraph = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .style(maybe_dim(Style::default().fg(color).bg(BG), dim));
    frame.render_widget(paragraph, area);
}

fn render_error(frame: &mut Frame, area: Rect, section: Section, message: &str, dim: bool) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(ERROR),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Press r to retry.",
            Style::default().fg(MUTED),
        )),
    ]);
    let panel = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(format!("{} Error", section.title()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ERROR))
                .style(maybe_dim(Style::default().bg(PANEL), dim)),
        );
    frame.render_widget(panel, area);
}

fn render_cards(frame: &mut Frame, area: Rect, app: &App, cards: &[Card], dim: bool) {
    // All cards in a section share a height; nodes carry four detail lines,
    // the rest carry three or four.
    let card_height = cards
        .first()
        .map(|card| card.lines.len() as u16 + 3)
        .unwrap_or(5);
    let visible = (area.height / card_height).max(1) as usize;
    let selected = app.selected_index();
    let start = selected.saturating_sub(visible.saturating_sub(1));

    let shown = visible.min(cards.len().saturating_sub(start));
    let mut constraints = vec![Constraint::Length(card_height); shown];
    constraints.push(Constraint::Min(0));
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (slot, (index, card)) in slots
        .iter()
        .zip(cards.iter().enumerate().skip(start).take(shown))
    {
        render_card(frame, *slot, card, index == selected, dim);
    }
}

fn render_card(frame: &mut Frame, area: Rect, card: &Card, selected: bool, dim: bool) {
    let border = if selected {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(MUTED)
    };
    let mut lines = vec![Line::from(Span::styled(
        card.badge.clone(),
        Style::default()
            .fg(tone_color(card.tone))
            .add_modifier(Modifier::BOLD),
    ))];
    for (label, value) in &card.lines {
        lines.push(Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(MUTED)),
            Span::styled(value.clone(), Style::default().fg(Color::White)),
        ]));
    }
    let paragraph = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .title(format!(" {} ", card.name))
            .borders(Borders::ALL)
            .border_style(maybe_dim(border, dim))
            .style(maybe_dim(Style::default().bg(PANEL), dim)),
    );
    frame.render_widget(paragraph, area);
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Ready => ACCENT,
        Tone::Pending => WARN,
        Tone::Failed => ERROR,
    }
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let hints = match app.input_mode() {
        InputMode::Sections => "←/→ tabs  n namespace  j/k select  l logs  r refresh  ? help  q quit",
        InputMode::Logs => "c container  t tail lines  r refresh  j/k scroll  Esc close",
    };
    let line = Line::from(vec![
        Span::styled(format!(" {hints} "), Style::default().fg(MUTED)),
        Span::styled(format!(" {} ", app.status()), Style::default().fg(ACCENT)),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(BG)), area);
}

fn render_logs_overlay(frame: &mut Frame, app: &App, pane: &LogsPane) {
    let area = centered_rect(84, 80, frame.area());
    frame.render_widget(Clear, area);

    let namespace = pane.pod.namespace.as_deref().unwrap_or("-");
    let pod = pane.pod.name.as_deref().unwrap_or("-");
    let block = Block::default()
        .title(format!(" Logs {namespace}/{pod} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .style(Style::default().bg(PANEL));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let container = match (&pane.container, pane.pod.containers.is_empty()) {
        (Some(name), _) => name.as_str(),
        (None, true) => "none",
        (None, false) => "all",
    };
    let selector = Line::from(vec![
        Span::styled("Container: ", Style::default().fg(MUTED)),
        Span::styled(container.to_string(), Style::default().fg(ACCENT)),
        Span::styled("   Tail: ", Style::default().fg(MUTED)),
        Span::styled(pane.tail_lines.to_string(), Style::default().fg(ACCENT)),
    ]);
    frame.render_widget(Paragraph::new(selector), rows[0]);

    let body = match &pane.state {
        LogsState::Loading => Paragraph::new("Loading…").style(Style::default().fg(MUTED)),
        LogsState::Loaded(text) => Paragraph::new(Text::from(text.clone()))
            .wrap(Wrap { trim: false })
            .scroll((app.logs_scroll(), 0))
            .style(Style::default().fg(Color::White)),
        LogsState::Error(message) => Paragraph::new(format!("Error: {message}"))
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(ERROR)),
    };
    frame.render_widget(body, rows[1]);
}

fn render_help_modal(frame: &mut Frame, _app: &App) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let lines = [
        "←/→, Tab   switch section",
        "j/k, ↑/↓   move selection",
        "n / p      cycle namespace filter",
        "r, F5      refresh current view",
        "l, Enter   view logs for selected pod",
        "Esc        close overlay",
        "q          quit",
        "",
        "In the logs overlay:",
        "c / C      cycle container",
        "t / T      cycle tail lines",
        "r          refresh logs",
    ];
    let text = Text::from(
        lines
            .iter()
            .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(Color::White))))
            .collect::<Vec<_>>(),
    );
    let paragraph = Paragraph::new(text).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT))
            .style(Style::default().bg(PANEL)),
    );
    frame.render_widget(paragraph, area);
}

fn maybe_dim(style: Style, dim: bool) -> Style {
    if dim {
        style.add_modifier(Modifier::DIM)
    } else {
        style
    }
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
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

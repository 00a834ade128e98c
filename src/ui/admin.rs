use crate::app::{App, InputMode, PaneState};
use crate::util::strip_control_chars;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the admin column: source lookup on top, import below.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 10 || area.height < 8 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_pane(
        f,
        chunks[0],
        " Source Lookup ",
        "ID",
        &app.source_id_input,
        &app.source_pane,
        app.mode == InputMode::SourceId,
    );
    render_pane(
        f,
        chunks[1],
        " Import ",
        "Data",
        &app.import_input,
        &app.import_pane,
        app.mode == InputMode::ImportData,
    );
}

fn render_pane(
    f: &mut Frame,
    area: Rect,
    title: &str,
    label: &str,
    input: &str,
    pane: &PaneState,
    focused: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let cursor = if focused { "_" } else { "" };

    let (body, style) = match pane {
        PaneState::Idle => (String::new(), Style::default()),
        PaneState::Loading => ("Loading...".to_string(), Style::default().fg(Color::Yellow)),
        PaneState::Done(text) => (
            strip_control_chars(text).into_owned(),
            Style::default().fg(Color::Green),
        ),
        PaneState::Failed(text) => (
            strip_control_chars(text).into_owned(),
            Style::default().fg(Color::Red),
        ),
    };

    let mut lines = vec![
        Line::from(format!("{label}: {}{cursor}", strip_control_chars(input))),
        Line::from(""),
    ];
    lines.extend(body.lines().map(|l| Line::styled(l.to_string(), style)));

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(p, area);
}

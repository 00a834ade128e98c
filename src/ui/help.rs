//! Help overlay: keybinding table grouped by context.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

const BINDINGS: &[(&str, &[(&str, &str)])] = &[
    (
        "Reader",
        &[
            ("h/l ←/→", "Previous/next category"),
            ("1-9", "Select category"),
            ("j/k ↓/↑", "Select article"),
            ("o", "Open article link"),
            ("r", "Refresh"),
            ("q", "Quit"),
        ],
    ),
    (
        "Inputs",
        &[
            ("/", "Search (blank search shows the category)"),
            ("u", "Fetch from an alternate source URL"),
            ("s", "Settings"),
            ("a", "Toggle admin panes"),
        ],
    ),
    (
        "Admin",
        &[
            ("Tab", "Switch between source id and import"),
            ("Enter", "Look up source / import data"),
            ("Esc", "Leave admin inputs"),
        ],
    ),
];

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame) {
    let overlay = centered_rect(70, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let mut rows: Vec<Row> = Vec::new();
    for (label, bindings) in BINDINGS {
        rows.push(Row::new(vec![
            Line::from(Span::styled(
                format!("-- {label} --"),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ]));
        for (key, description) in bindings.iter() {
            rows.push(Row::new(vec![format!("  {key}"), description.to_string()]));
        }
        rows.push(Row::new(vec![String::new(), String::new()]));
    }
    rows.pop();

    let widths = [Constraint::Length(14), Constraint::Min(20)];
    let table = Table::new(rows, widths).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help (? to close) "),
    );

    f.render_widget(table, overlay);
}

/// Create a centered rectangle with the given percentage of the parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

//! Render functions for the TUI.
//!
//! Layout, top to bottom: category tabs, search and source bars, the article
//! panel (with the admin column beside it when toggled), then the status bar.
//! The settings modal and help overlay are drawn last.

use crate::app::{App, InputMode, SettingsField, SettingsForm};
use crate::util::strip_control_chars;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::{admin, articles, help, status};

pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 14;

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_tabs(f, app, chunks[0]);
    render_input_line(
        f,
        chunks[1],
        "Search",
        &app.search_input,
        app.mode == InputMode::Search,
    );
    render_input_line(
        f,
        chunks[2],
        "Source URL",
        &app.custom_source_input,
        app.mode == InputMode::CustomSource,
    );

    if app.show_admin {
        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[3]);
        articles::render(f, app, main[0]);
        admin::render(f, app, main[1]);
    } else {
        articles::render(f, app, chunks[3]);
    }

    status::render(f, app, chunks[4]);

    if let Some(form) = &app.settings_form {
        render_settings_overlay(f, app, form);
    }

    if app.show_help {
        help::render(f);
    }
}

/// One tab per category; the active category is highlighted when listed.
fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = app
        .categories
        .iter()
        .enumerate()
        .map(|(i, c)| Line::from(format!("{} {}", i + 1, c)))
        .collect();

    let tabs = Tabs::new(titles).block(Block::default().borders(Borders::ALL).title("Categories"));
    // A stored default outside the list highlights nothing
    let tabs = match app.active_category_index() {
        Some(index) => tabs.select(index).highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        ),
        None => tabs.highlight_style(Style::default()),
    };
    f.render_widget(tabs, area);
}

fn render_input_line(f: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let cursor = if focused { "_" } else { "" };
    let line = Line::from(vec![
        Span::styled(format!(" {label}: "), label_style),
        Span::raw(format!("{}{cursor}", strip_control_chars(value))),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_settings_overlay(f: &mut Frame, app: &App, form: &SettingsForm) {
    let area = f.area();

    let marker = |field: SettingsField| if form.field == field { ">" } else { " " };
    let category = form.category(&app.categories);
    let text = format!(
        "{} Refresh interval (seconds, 0 = off): {}_\n\n{} Default category: < {} >\n\n(Enter) Save  (Esc) Cancel",
        marker(SettingsField::RefreshInterval),
        form.interval_secs,
        marker(SettingsField::DefaultCategory),
        category,
    );

    let width = 56u16.min(area.width.saturating_sub(4));
    let height = 9u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Settings "),
    );
    f.render_widget(paragraph, overlay);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NewsClient;
    use crate::app::PanelState;
    use crate::render::{DisplayFragment, Renderer};
    use crate::settings::SettingsStore;
    use crate::storage::MemoryStore;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        let (tx, _rx) = mpsc::channel(4);
        App::new(
            NewsClient::new("http://127.0.0.1:9").unwrap(),
            SettingsStore::new(Arc::new(MemoryStore::new())),
            Renderer::default(),
            vec!["business".into(), "sports".into()],
            tx,
        )
    }

    #[test]
    fn test_small_terminal_message() {
        let app = app();
        assert!(screen(&app, 40, 10).contains("Terminal too small"));
    }

    #[test]
    fn test_loading_and_error_copy() {
        let mut app = app();
        app.panel = PanelState::Loading {
            seq: 1,
            kind: crate::app::FetchKind::Search,
        };
        assert!(screen(&app, 100, 24).contains("Searching news..."));

        app.panel = PanelState::Rendered(DisplayFragment::error(
            "Failed to load news. Please try again later.",
            "boom",
        ));
        let out = screen(&app, 100, 24);
        assert!(out.contains("Failed to load news"));
        assert!(out.contains("boom"));
    }

    #[test]
    fn test_no_results_and_tabs() {
        let mut app = app();
        app.panel = PanelState::Rendered(DisplayFragment::NoResults);
        let out = screen(&app, 100, 24);
        assert!(out.contains("No news items found."));
        assert!(out.contains("1 business"));
        assert!(out.contains("2 sports"));
    }

    #[test]
    fn test_settings_overlay_drawn() {
        let mut app = app();
        app.settings_form = Some(SettingsForm {
            interval_secs: "30".into(),
            category_index: Some(1),
            stored_category: "business".into(),
            field: SettingsField::DefaultCategory,
        });
        let out = screen(&app, 100, 24);
        assert!(out.contains("Settings"));
        assert!(out.contains("< sports >"));
    }
}

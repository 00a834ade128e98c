use crate::app::{App, InputMode};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(&**msg)
    } else {
        match app.mode {
            InputMode::Normal => Cow::Borrowed(
                "[h/l]category [/]search [u]source [s]ettings [a]dmin [r]efresh [o]pen [?]help [q]uit",
            ),
            InputMode::Search => Cow::Borrowed("Type to search | ENTER search | ESC done"),
            InputMode::CustomSource => Cow::Borrowed("Alternate source URL | ENTER fetch | ESC cancel"),
            InputMode::SourceId | InputMode::ImportData => {
                Cow::Borrowed("TAB switch input | ENTER submit | ESC leave admin inputs")
            }
            InputMode::Settings => {
                Cow::Borrowed("TAB next field | ←/→ category | ENTER save | ESC cancel")
            }
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}

//! Input handling for the TUI.
//!
//! Keys are routed by [`InputMode`]: the help overlay captures everything
//! while visible, text inputs capture printable characters, and `Normal`
//! mode maps single keys to reader actions.

use crate::app::{App, InputMode, SettingsField};
use crate::util::{validate_url_for_open, MAX_INPUT_LENGTH};
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if app.show_help {
        if matches!(code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return Action::Continue;
    }

    match app.mode {
        InputMode::Normal => return handle_normal_input(app, code),
        InputMode::Search => handle_search_input(app, code),
        InputMode::CustomSource => handle_custom_source_input(app, code),
        InputMode::SourceId | InputMode::ImportData => handle_admin_input(app, code),
        InputMode::Settings => handle_settings_input(app, code),
    }
    Action::Continue
}

fn handle_normal_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Left | KeyCode::Char('h') => app.cycle_category(-1),
        KeyCode::Right | KeyCode::Char('l') => app.cycle_category(1),
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            if index < app.categories.len() {
                app.select_category_index(index);
            }
        }
        KeyCode::Down | KeyCode::Char('j') => app.nav_down(),
        KeyCode::Up | KeyCode::Char('k') => app.nav_up(),
        KeyCode::Char('/') => app.mode = InputMode::Search,
        KeyCode::Char('u') => app.mode = InputMode::CustomSource,
        KeyCode::Char('s') => app.open_settings(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('a') => {
            app.show_admin = !app.show_admin;
            if app.show_admin {
                app.mode = InputMode::SourceId;
            }
        }
        KeyCode::Char('o') => open_selected(app),
        KeyCode::Esc => app.show_admin = false,
        _ => {}
    }
    Action::Continue
}

fn open_selected(app: &mut App) {
    let Some(url) = app.selected_link() else {
        app.set_status("Selected article has no link");
        return;
    };
    if let Err(e) = validate_url_for_open(&url) {
        app.set_status(e.to_string());
    } else if let Err(e) = open::that(&url) {
        tracing::warn!(error = %e, "Failed to open browser");
        app.set_status(format!("Failed to open browser: {e}"));
    }
}

fn handle_search_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.mode = InputMode::Normal,
        KeyCode::Enter => {
            app.mode = InputMode::Normal;
            app.submit_search();
        }
        KeyCode::Backspace => {
            let mut value = app.search_input.clone();
            value.pop();
            app.edit_search_input(value);
        }
        KeyCode::Char(c) => {
            if app.search_input.len() >= MAX_INPUT_LENGTH {
                app.set_status(format!("Search at max length ({MAX_INPUT_LENGTH} chars)"));
                return;
            }
            let mut value = app.search_input.clone();
            value.push(c);
            app.edit_search_input(value);
        }
        _ => {}
    }
}

fn handle_custom_source_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.mode = InputMode::Normal,
        KeyCode::Enter => {
            app.mode = InputMode::Normal;
            app.apply_custom_source();
        }
        KeyCode::Backspace => {
            app.custom_source_input.pop();
        }
        KeyCode::Char(c) if app.custom_source_input.len() < MAX_INPUT_LENGTH => {
            app.custom_source_input.push(c);
        }
        _ => {}
    }
}

fn handle_admin_input(app: &mut App, code: KeyCode) {
    let importing = app.mode == InputMode::ImportData;
    match code {
        KeyCode::Esc => app.mode = InputMode::Normal,
        KeyCode::Tab | KeyCode::BackTab => {
            app.mode = if importing {
                InputMode::SourceId
            } else {
                InputMode::ImportData
            };
        }
        KeyCode::Enter if importing => app.import_data(),
        KeyCode::Enter => app.lookup_source(),
        KeyCode::Backspace if importing => {
            app.import_input.pop();
        }
        KeyCode::Backspace => {
            app.source_id_input.pop();
        }
        KeyCode::Char(c) if importing => app.import_input.push(c),
        KeyCode::Char(c) if app.source_id_input.len() < MAX_INPUT_LENGTH => {
            app.source_id_input.push(c);
        }
        _ => {}
    }
}

fn handle_settings_input(app: &mut App, code: KeyCode) {
    let category_count = app.categories.len();
    match code {
        KeyCode::Esc => {
            app.close_settings();
            return;
        }
        KeyCode::Enter => {
            app.submit_settings_form();
            return;
        }
        _ => {}
    }

    let Some(form) = app.settings_form.as_mut() else {
        app.mode = InputMode::Normal;
        return;
    };
    match (form.field, code) {
        (_, KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down) => form.next_field(),
        (SettingsField::RefreshInterval, KeyCode::Char(c)) if c.is_ascii_digit() => {
            if form.interval_secs.len() < 9 {
                form.interval_secs.push(c);
            }
        }
        (SettingsField::RefreshInterval, KeyCode::Backspace) => {
            form.interval_secs.pop();
        }
        (SettingsField::DefaultCategory, KeyCode::Left | KeyCode::Char('h')) => {
            form.cycle_category(-1, category_count)
        }
        (SettingsField::DefaultCategory, KeyCode::Right | KeyCode::Char('l')) => {
            form.cycle_category(1, category_count)
        }
        _ => {}
    }
}

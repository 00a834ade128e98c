use crate::app::App;
use crate::render::{ArticleCard, DisplayFragment};
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Render the article panel for the current panel state.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let title = match app.active_category_index() {
        Some(_) => format!("News - {}", app.active_category()),
        None => "News".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    let fragment = app.panel.fragment();
    match &*fragment {
        DisplayFragment::Loading { message } => {
            let p = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(p, area);
        }
        DisplayFragment::NoResults => {
            let p = Paragraph::new(crate::render::NO_RESULTS)
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(p, area);
        }
        DisplayFragment::Error { headline, detail } => {
            let lines = vec![
                Line::from(Span::styled(
                    headline.as_str(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    strip_control_chars(detail).into_owned(),
                    Style::default().fg(Color::Gray),
                )),
            ];
            let p = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            f.render_widget(p, area);
        }
        DisplayFragment::Articles(cards) => {
            let width = area.width.saturating_sub(4) as usize;
            let items: Vec<ListItem> = cards
                .iter()
                .enumerate()
                .map(|(i, card)| card_item(card, width, i == app.selected_card))
                .collect();

            let list = List::new(items).block(block);
            let mut state = ListState::default().with_selected(Some(app.selected_card));
            f.render_stateful_widget(list, area, &mut state);
        }
    }
}

fn card_item(card: &ArticleCard, width: usize, selected: bool) -> ListItem<'static> {
    let title_style = if selected {
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let dim = Style::default().fg(Color::DarkGray);

    let clean = |s: &str| truncate_to_width(&strip_control_chars(s), width).into_owned();

    let mut lines = vec![
        Line::from(Span::styled(clean(&card.title), title_style)),
        Line::from(Span::styled(clean(&card.date), dim)),
        Line::from(clean(&card.body)),
    ];
    if let Some(image) = &card.image_url {
        lines.push(Line::from(Span::styled(clean(&format!("[image] {image}")), dim)));
    }
    if let Some(link) = &card.read_more_url {
        lines.push(Line::from(Span::styled(
            clean(&format!("Read more: {link}")),
            Style::default().fg(Color::Blue),
        )));
    }
    lines.push(Line::from(""));

    ListItem::new(lines)
}

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Mode};
use crate::text::truncate_to_width;
use crate::theme::Palette;

pub struct SearchBarWidget;

impl SearchBarWidget {
    /// One-line search bar; shows the committed term when not typing
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let typing = app.mode == Mode::Search;
        let text = if typing {
            format!("/{}▏", app.directory.search_input())
        } else if app.directory.criteria().search_term.is_empty() {
            "/ search businesses".to_string()
        } else {
            format!("/{}", app.directory.criteria().search_term)
        };

        let style = if typing {
            Style::default().fg(Palette::FG0).bg(Palette::BG1)
        } else {
            Style::default().fg(Palette::GREY1).bg(Palette::BG1)
        };
        let line = Line::from(Span::styled(
            truncate_to_width(&text, area.width as usize),
            style,
        ));
        frame.render_widget(Paragraph::new(line).style(Style::default().bg(Palette::BG1)), area);
    }

    /// Dropdown of recent searches under the bar while the input is empty
    pub fn render_recent(frame: &mut Frame, below: Rect, app: &App) {
        let recent = app.directory.recent_searches();
        if app.mode != Mode::Search || recent.is_empty() {
            return;
        }
        if !app.directory.search_input().is_empty() && app.recent_cursor.is_none() {
            return;
        }

        let height = (recent.len() as u16 + 2).min(below.height);
        let width = 40u16.min(below.width);
        let area = Rect::new(below.x, below.y, width, height);

        let items: Vec<ListItem> = recent
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if app.recent_cursor == Some(i) {
                    Style::default().fg(Palette::FG0).bg(Palette::SELECTION)
                } else {
                    Style::default().fg(Palette::GREY2)
                };
                let when = entry.timestamp.format("%b %d %H:%M").to_string();
                ListItem::new(Line::from(vec![
                    Span::styled(
                        truncate_to_width(&entry.term, (width as usize).saturating_sub(16)),
                        style,
                    ),
                    Span::styled(format!("  {}", when), Style::default().fg(Palette::GREY0)),
                ]))
            })
            .collect();

        let block = Block::default()
            .title(" Recent (Tab, Ctrl-d) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Palette::GREY0))
            .style(Style::default().bg(Palette::BG1));

        frame.render_widget(Clear, area);
        frame.render_widget(List::new(items).block(block), area);
    }
}

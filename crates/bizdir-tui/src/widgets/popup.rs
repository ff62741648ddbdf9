use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, FilterOption};
use crate::theme::Palette;
use crate::widgets::centered_rect;

pub struct PopupWidget;

impl PopupWidget {
    /// Category and certification picker
    pub fn render_filters(frame: &mut Frame, app: &App) {
        let options = app.filter_options();
        let height = (options.len() as u16 + 4).min(frame.area().height.saturating_sub(2));
        let area = centered_rect(44, height, frame.area());

        let mut items = Vec::with_capacity(options.len() + 1);
        let mut cursor_row = app.picker_cursor;
        let mut heading_added = false;
        for (i, option) in options.iter().enumerate() {
            if matches!(option, FilterOption::Certification(_)) && !heading_added {
                heading_added = true;
                items.push(ListItem::new(Line::from(Span::styled(
                    "── Certifications",
                    Style::default().fg(Palette::GREY0),
                ))));
                if i <= app.picker_cursor {
                    cursor_row += 1;
                }
            }

            let checked = if app.is_option_active(option) { "[x] " } else { "[ ] " };
            let style = if app.is_option_active(option) {
                Style::default().fg(Palette::GREEN)
            } else {
                Style::default().fg(Palette::FG0)
            };
            items.push(ListItem::new(Line::from(vec![
                Span::styled(checked, style),
                Span::styled(option.label().to_string(), style),
            ])));
        }

        let active = app.directory.criteria().active_filter_count();
        let block = Block::default()
            .title(format!(" Filters ({} active) ", active))
            .title_bottom(" space: toggle  c: clear  Esc: close ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Palette::ACCENT))
            .style(Style::default().bg(Palette::BG1));

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Palette::SELECTION).add_modifier(Modifier::BOLD));
        let mut state = ListState::default();
        state.select(Some(cursor_row));

        frame.render_widget(Clear, area);
        frame.render_stateful_widget(list, area, &mut state);
    }

    pub fn render_help(frame: &mut Frame) {
        let bindings = [
            ("j / k", "move selection"),
            ("Ctrl-f / Ctrl-b", "page down / up"),
            ("gg / G", "top / bottom"),
            ("Enter", "open business"),
            ("Esc", "back to list"),
            ("/", "search"),
            ("Tab", "recent searches (while searching)"),
            ("f", "filters"),
            ("c", "clear filters"),
            ("s", "save / unsave"),
            ("o", "open website"),
            ("q", "quit"),
        ];
        let area = centered_rect(52, bindings.len() as u16 + 2, frame.area());

        let lines: Vec<Line> = bindings
            .iter()
            .map(|(keys, what)| {
                Line::from(vec![
                    Span::styled(format!("{:<18}", keys), Style::default().fg(Palette::YELLOW)),
                    Span::styled(*what, Style::default().fg(Palette::FG0)),
                ])
            })
            .collect();

        let block = Block::default()
            .title(" Keys ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Palette::ACCENT))
            .style(Style::default().bg(Palette::BG1));

        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::text::truncate_to_width;
use crate::theme::Palette;

pub struct SpotlightWidget;

impl SpotlightWidget {
    /// Rows the spotlight needs, or 0 when it should be hidden
    pub fn height(app: &App) -> u16 {
        let visible = app.config.ui.show_spotlight
            && app.directory.criteria().is_empty()
            && app.directory.spotlight().is_some();
        if visible {
            4
        } else {
            0
        }
    }

    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let Some(record) = app.directory.spotlight() else {
            return;
        };

        let block = Block::default()
            .title(" Spotlight ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Palette::YELLOW))
            .style(Style::default().bg(Palette::BG1));
        let width = block.inner(area).width as usize;

        let lines = vec![
            Line::from(vec![
                Span::styled(
                    truncate_to_width(&record.name, width.saturating_sub(record.category.len() + 3)),
                    Style::default()
                        .fg(Palette::FG0)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" · {}", record.category),
                    Style::default().fg(Palette::YELLOW),
                ),
            ]),
            Line::from(Span::styled(
                truncate_to_width(record.description.trim(), width),
                Style::default().fg(Palette::GREY2),
            )),
        ];

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

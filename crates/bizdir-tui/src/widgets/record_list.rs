use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use bizdir_core::catalog::Record;

use crate::app::App;
use crate::text::{remaining_width, truncate_to_width};
use crate::theme::Palette;

pub struct RecordListWidget;

impl RecordListWidget {
    /// Render the display window as fixed-height cards starting at the
    /// current list offset. Also records the viewport height on the app.
    pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
        let active = app.directory.criteria().active_filter_count();
        let title = if active > 0 {
            format!(" Businesses [{} filters] ", active)
        } else {
            " Businesses ".to_string()
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Palette::ACCENT))
            .style(Style::default().bg(Palette::BG0));

        let inner = block.inner(area);
        frame.render_widget(block, area);
        app.viewport_rows = inner.height;

        if app.directory.window().is_empty() {
            let message = if app.directory.catalog().is_empty() {
                "No businesses loaded"
            } else {
                "No businesses match your filters (c: clear filters)"
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    message,
                    Style::default().fg(Palette::GREY1),
                ))),
                inner,
            );
            return;
        }

        let card_height = app.card_height();
        let first = (app.list_offset / card_height) as usize;
        // rows of the first card scrolled above the viewport
        let mut skip = (app.list_offset % card_height) as u16;
        let mut y = inner.y;

        for (index, record) in app.directory.window().iter().enumerate().skip(first) {
            if y >= inner.y + inner.height {
                break;
            }
            let height = (card_height as u16 - skip).min(inner.y + inner.height - y);
            let card_area = Rect::new(inner.x, y, inner.width, height);
            let lines = Self::card_lines(
                record,
                index == app.selected,
                app.directory.is_saved(record),
                inner.width,
            );

            let style = if index == app.selected {
                Style::default().bg(Palette::SELECTION)
            } else {
                Style::default()
            };
            frame.render_widget(
                Paragraph::new(lines).style(style).scroll((skip, 0)),
                card_area,
            );
            y += height;
            skip = 0;
        }
    }

    fn card_lines(record: &Record, selected: bool, saved: bool, width: u16) -> Vec<Line<'static>> {
        let marker = if selected { "▌" } else { " " };
        let saved_marker = if saved { "★ " } else { "" };

        let mut badges = String::new();
        if record.is_board_member {
            badges.push_str(" [Board]");
        }
        if record.is_member {
            badges.push_str(" [Member]");
        }

        let used = format!("{}{}{}", marker, saved_marker, badges);
        let name = truncate_to_width(&record.name, remaining_width(width, &used));

        let mut title = vec![
            Span::styled(marker, Style::default().fg(Palette::ACCENT)),
            Span::styled(saved_marker, Style::default().fg(Palette::SAVED)),
            Span::styled(
                name,
                Style::default()
                    .fg(Palette::FG0)
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        if record.is_board_member {
            title.push(Span::styled(" [Board]", Style::default().fg(Palette::BOARD)));
        }
        if record.is_member {
            title.push(Span::styled(" [Member]", Style::default().fg(Palette::MEMBER)));
        }

        let mut subtitle = record.category.clone();
        if let Some(owner) = record.owner.as_deref().filter(|o| !o.is_empty()) {
            subtitle.push_str(" · ");
            subtitle.push_str(owner);
        }

        let body_width = (width as usize).saturating_sub(2);
        vec![
            Line::from(title),
            Line::from(Span::styled(
                format!("  {}", truncate_to_width(&subtitle, body_width)),
                Style::default().fg(Palette::YELLOW),
            )),
            Line::from(Span::styled(
                format!("  {}", truncate_to_width(record.description.trim(), body_width)),
                Style::default().fg(Palette::GREY2),
            )),
        ]
    }
}

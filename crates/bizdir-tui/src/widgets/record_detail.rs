use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use bizdir_core::catalog::Record;

use crate::app::App;
use crate::theme::Palette;

pub struct RecordDetailWidget;

impl RecordDetailWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let block = Block::default()
            .title(" Business ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Palette::ACCENT))
            .style(Style::default().bg(Palette::BG0));

        let content = match app.directory.detail() {
            Some(record) => Self::content(record, app.directory.is_saved(record)),
            None => Text::from(Line::from(Span::styled(
                "No business selected",
                Style::default().fg(Palette::GREY1),
            ))),
        };

        let paragraph = Paragraph::new(content)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((app.detail_scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn content(record: &Record, saved: bool) -> Text<'static> {
        let mut lines = Vec::new();

        let mut title = vec![Span::styled(
            record.name.clone(),
            Style::default()
                .fg(Palette::FG0)
                .add_modifier(Modifier::BOLD),
        )];
        if saved {
            title.push(Span::styled("  ★ saved", Style::default().fg(Palette::SAVED)));
        }
        lines.push(Line::from(title));
        lines.push(Line::from(Span::styled(
            record.category.clone(),
            Style::default().fg(Palette::YELLOW),
        )));

        let mut badges = Vec::new();
        if record.is_board_member {
            badges.push(Span::styled("Board Member ", Style::default().fg(Palette::BOARD)));
        }
        if record.is_member {
            badges.push(Span::styled("BMC Member", Style::default().fg(Palette::MEMBER)));
        }
        if !badges.is_empty() {
            lines.push(Line::from(badges));
        }
        lines.push(Line::default());

        let fields = [
            ("Owner", record.owner.as_deref()),
            ("Address", record.address.as_deref()),
            ("Contact", Some(record.contact.as_str())),
            ("Website", record.website_url.as_deref()),
            ("Email", record.contact_email.as_deref()),
            ("Phone", record.contact_phone.as_deref()),
        ];
        for (label, value) in fields {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                lines.push(field_line(label, value));
            }
        }
        if let Some(social) = &record.social_media {
            for (label, link) in social.entries() {
                lines.push(field_line(label, link));
            }
        }

        if !record.description.trim().is_empty() {
            lines.push(Line::default());
            for paragraph in record.description.lines() {
                lines.push(Line::from(Span::styled(
                    paragraph.to_string(),
                    Style::default().fg(Palette::FG0),
                )));
            }
        }

        lines.push(Line::default());
        let hint = if record.contact_url().is_some() {
            "o: open website  s: save  Esc: back"
        } else {
            "s: save  Esc: back"
        };
        lines.push(Line::from(Span::styled(hint, Style::default().fg(Palette::GREY0))));

        Text::from(lines)
    }
}

fn field_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(Palette::GREY1)),
        Span::styled(value.to_string(), Style::default().fg(Palette::FG0)),
    ])
}

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use bizdir_core::controller::ListSummary;
use bizdir_core::View;

use crate::app::{App, Mode};
use crate::text::remaining_width;
use crate::theme::Palette;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let mode_str = match app.mode {
            Mode::Normal => match app.directory.view() {
                View::List => "LIST",
                View::Detail => "DETAIL",
            },
            Mode::Search => "SEARCH",
            Mode::FilterPicker => "FILTERS",
            Mode::Help => "HELP",
        };

        let status_text = match &app.status_message {
            Some(msg) => format!(" {} | {}", mode_str, msg),
            None => format!(
                " {} | {} | Saved: {}",
                mode_str,
                summary_text(&app.directory.summary()),
                app.directory.saved_count()
            ),
        };

        let help_hint = " q:quit /:search f:filters ?:help ";
        let padding_len = remaining_width(area.width, &status_text).saturating_sub(help_hint.len());

        let line = Line::from(vec![
            Span::styled(
                status_text,
                Style::default().fg(Palette::FG0).bg(Palette::BG2),
            ),
            Span::styled(" ".repeat(padding_len), Style::default().bg(Palette::BG2)),
            Span::styled(
                help_hint,
                Style::default().fg(Palette::GREY2).bg(Palette::BG2),
            ),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Result count plus the paging state of the list
pub fn summary_text(summary: &ListSummary) -> String {
    let noun = if summary.total == 1 { "business" } else { "businesses" };
    let mut text = format!("{} {} found", summary.total, noun);
    if summary.shown < summary.total {
        text.push_str(&format!(" (showing {})", summary.shown));
    }

    if summary.loading_more {
        text.push_str(" | Loading more…");
    } else if summary.preloading {
        text.push_str(" | Preloading…");
    } else if !summary.has_more && summary.total > 0 {
        text.push_str(&format!(" | You've seen all {}", summary.total));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(total: usize, shown: usize) -> ListSummary {
        ListSummary {
            total,
            shown,
            has_more: shown < total,
            loading_more: false,
            preloading: false,
        }
    }

    #[test]
    fn test_summary_while_paging() {
        assert_eq!(summary_text(&summary(45, 20)), "45 businesses found (showing 20)");

        let preloading = ListSummary {
            preloading: true,
            ..summary(45, 20)
        };
        assert_eq!(
            summary_text(&preloading),
            "45 businesses found (showing 20) | Preloading…"
        );
    }

    #[test]
    fn test_summary_when_complete() {
        assert_eq!(
            summary_text(&summary(1, 1)),
            "1 business found | You've seen all 1"
        );
        assert_eq!(summary_text(&summary(0, 0)), "0 businesses found");
    }
}

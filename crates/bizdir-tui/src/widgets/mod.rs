mod popup;
mod record_detail;
mod record_list;
mod search_bar;
mod spotlight;
mod status_bar;

pub use popup::PopupWidget;
pub use record_detail::RecordDetailWidget;
pub use record_list::RecordListWidget;
pub use search_bar::SearchBarWidget;
pub use spotlight::SpotlightWidget;
pub use status_bar::StatusBarWidget;

use ratatui::layout::Rect;

/// Create a centered rect of the given size inside `area`
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use bizdir_core::View;

use crate::app::{App, Mode};

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    PageDown,
    PageUp,
    JumpToTop,
    JumpToBottom,
    PendingG, // First 'g' press, waiting for second 'g'
    Select,
    Back,
    ToggleSaved,
    OpenContact,
    StartSearch,
    OpenFilters,
    ClearFilters,
    ToggleOption,
    CycleRecent,
    RemoveRecent,
    Help,
    ExitMode,
    Confirm,
    Cancel,
    InputChar(char),
    Backspace,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App) -> Action {
    match app.mode {
        Mode::Search => return handle_search_mode(key),
        Mode::FilterPicker => return handle_picker_mode(key),
        Mode::Help => return Action::ExitMode,
        Mode::Normal => {}
    }

    let in_detail = app.directory.view() == View::Detail;

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Char('j'), KeyModifiers::NONE) => Action::MoveDown,
        (KeyCode::Char('k'), KeyModifiers::NONE) => Action::MoveUp,
        (KeyCode::Down, KeyModifiers::NONE) => Action::MoveDown,
        (KeyCode::Up, KeyModifiers::NONE) => Action::MoveUp,

        (KeyCode::Char('f'), KeyModifiers::CONTROL) => Action::PageDown,
        (KeyCode::Char('b'), KeyModifiers::CONTROL) => Action::PageUp,
        (KeyCode::PageDown, _) => Action::PageDown,
        (KeyCode::PageUp, _) => Action::PageUp,

        (KeyCode::Char('g'), KeyModifiers::NONE) => {
            if app.pending_key == Some('g') {
                Action::JumpToTop
            } else {
                Action::PendingG
            }
        }
        (KeyCode::Char('G'), KeyModifiers::SHIFT) => Action::JumpToBottom,

        (KeyCode::Enter, KeyModifiers::NONE) if !in_detail => Action::Select,
        (KeyCode::Char('l'), KeyModifiers::NONE) if !in_detail => Action::Select,
        (KeyCode::Esc, KeyModifiers::NONE) if in_detail => Action::Back,
        (KeyCode::Char('h'), KeyModifiers::NONE) if in_detail => Action::Back,
        (KeyCode::Backspace, KeyModifiers::NONE) if in_detail => Action::Back,

        (KeyCode::Char('s'), KeyModifiers::NONE) => Action::ToggleSaved,
        (KeyCode::Char('o'), KeyModifiers::NONE) => Action::OpenContact,

        (KeyCode::Char('/'), KeyModifiers::NONE) if !in_detail => Action::StartSearch,
        (KeyCode::Char('f'), KeyModifiers::NONE) if !in_detail => Action::OpenFilters,
        (KeyCode::Char('c'), KeyModifiers::NONE) if !in_detail => Action::ClearFilters,

        (KeyCode::Char('?'), _) => Action::Help,

        _ => Action::None,
    }
}

/// Handle key events while typing in the search bar
fn handle_search_mode(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Enter, _) => Action::Confirm,
        (KeyCode::Esc, _) => Action::Cancel,
        (KeyCode::Backspace, _) => Action::Backspace,
        (KeyCode::Tab, _) => Action::CycleRecent,
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::RemoveRecent,
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => Action::InputChar(c),
        _ => Action::None,
    }
}

/// Handle key events in the filter picker
fn handle_picker_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char(' ') | KeyCode::Enter => Action::ToggleOption,
        KeyCode::Char('c') => Action::ClearFilters,
        KeyCode::Esc | KeyCode::Char('f') | KeyCode::Char('q') => Action::ExitMode,
        _ => Action::None,
    }
}

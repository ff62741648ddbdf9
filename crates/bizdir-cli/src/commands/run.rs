use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use bizdir_core::catalog::{Catalog, JsonCatalog};
use bizdir_core::{AppConfig, DirectoryController, View};
use bizdir_tui::{
    app::{App, Mode},
    event::{AppEvent, EventHandler},
    input::{handle_key_event, Action},
    widgets::{
        PopupWidget, RecordDetailWidget, RecordListWidget, SearchBarWidget, SpotlightWidget,
        StatusBarWidget,
    },
};

use super::open_store;

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    let provider = JsonCatalog::new(config.catalog_path());
    let (catalog, load_error) = Catalog::load(&provider);

    let local = open_store(&config.local_store_path());
    let session = open_store(&config.session_store_path());
    let directory = DirectoryController::new(&config, catalog, local, session);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle("bizdir"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.clone(), directory);
    if let Some(e) = load_error {
        app.set_status(format!("Failed to load catalog: {}", e));
    }

    let event_handler = EventHandler::new(config.ui.tick_rate_ms);

    let result = main_loop(&mut terminal, &mut app, &event_handler);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn main_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_handler: &EventHandler,
) -> Result<()> {
    loop {
        // Apply finished timers, preloads and scroll jumps
        app.sync();

        terminal.draw(|frame| {
            let size = frame.area();

            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1), // Search bar
                    Constraint::Min(1),    // Content
                    Constraint::Length(1), // Status bar
                ])
                .split(size);

            SearchBarWidget::render(frame, main_layout[0], app);

            match app.directory.view() {
                View::List => {
                    let spotlight = SpotlightWidget::height(app);
                    let content = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([Constraint::Length(spotlight), Constraint::Min(1)])
                        .split(main_layout[1]);
                    if spotlight > 0 {
                        SpotlightWidget::render(frame, content[0], app);
                    }
                    RecordListWidget::render(frame, content[1], app);
                }
                View::Detail => RecordDetailWidget::render(frame, main_layout[1], app),
            }

            StatusBarWidget::render(frame, main_layout[2], app);

            match app.mode {
                Mode::Search => SearchBarWidget::render_recent(frame, main_layout[1], app),
                Mode::FilterPicker => PopupWidget::render_filters(frame, app),
                Mode::Help => PopupWidget::render_help(frame),
                Mode::Normal => {}
            }
        })?;

        app.after_frame();

        if let Some(event) = event_handler.next()? {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, app);
                    handle_action(app, action);
                }
                // the next draw picks up the new size
                AppEvent::Resize(_, _) => {}
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_action(app: &mut App, action: Action) {
    if action != Action::PendingG && action != Action::None {
        app.clear_pending_key();
    }
    if action != Action::None {
        app.clear_status();
    }

    match action {
        Action::Quit => app.quit(),
        Action::MoveDown => match app.mode {
            Mode::FilterPicker => app.picker_down(),
            _ => app.move_down(),
        },
        Action::MoveUp => match app.mode {
            Mode::FilterPicker => app.picker_up(),
            _ => app.move_up(),
        },
        Action::PageDown => app.page_down(),
        Action::PageUp => app.page_up(),
        Action::PendingG => app.pending_key = Some('g'),
        Action::JumpToTop => {
            app.clear_pending_key();
            app.jump_to_top();
        }
        Action::JumpToBottom => app.jump_to_bottom(),
        Action::Select => app.open_selected(),
        Action::Back => app.close_detail(),
        Action::ToggleSaved => app.toggle_saved(),
        Action::OpenContact => app.open_contact(),
        Action::StartSearch => app.start_search(),
        Action::OpenFilters => app.open_filter_picker(),
        Action::ClearFilters => app.clear_filters(),
        Action::ToggleOption => app.toggle_picker_option(),
        Action::CycleRecent => app.cycle_recent(),
        Action::RemoveRecent => app.remove_recent(),
        Action::Help => app.mode = Mode::Help,
        Action::ExitMode => app.mode = Mode::Normal,
        Action::Confirm => app.confirm_search(),
        Action::Cancel => app.cancel_search(),
        Action::InputChar(c) => app.search_input_char(c),
        Action::Backspace => app.search_backspace(),
        Action::None => {}
    }
}

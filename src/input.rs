//! Keyboard and mouse input handling.
//!
//! Maps terminal events to [`App`] gestures.  Scroll movements go through the
//! app's navigation methods, which in turn raise the near-bottom and
//! scrolled-to-top signals for the feed.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in [`handle_key_event`] that calls it.
//! 3. Update the help text in the status bar (`ui.rs`).

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};

use crate::app::App;

/// Rows moved by PageUp / PageDown.
const PAGE_ROWS: usize = 5;

/// Dispatch one terminal event.
pub fn handle_event(app: &mut App, event: Event) {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        _ => {}
    }
}

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Esc => app.escape(),
        KeyCode::Char('x') => app.close_overlay(),
        KeyCode::Enter => app.activate_selected(),
        KeyCode::Char('r') | KeyCode::F(5) => app.pull_to_refresh(),
        KeyCode::Tab => app.next_tab(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::PageDown => app.page_down(PAGE_ROWS),
        KeyCode::PageUp => app.page_up(PAGE_ROWS),
        _ => {}
    }
}

/// The wheel scrolls the list one card at a time.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.select_next(),
        MouseEventKind::ScrollUp => app.select_previous(),
        _ => {}
    }
}

//! Input handling.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{App, Focus};
use crate::core::Transition;

/// Handle a crossterm event.
/// Returns true if the event was handled.
pub fn handle_input(app: &mut App, event: Event) -> bool {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Resize(_, _) => {
            app.mark_dirty();
            true
        }
        _ => false,
    }
}

/// Handle a key event.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Char('1') => app.set_focus(Focus::Commits),
        KeyCode::Char('2') => app.set_focus(Focus::Files),
        KeyCode::Char('3') => app.set_focus(Focus::Content),
        KeyCode::Enter => app.focus_right(),
        KeyCode::Char('s') => app.apply(Transition::ToggleMode),
        KeyCode::Char('r') => app.reload(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.apply(Transition::IncreaseContext),
        KeyCode::Char('-') => app.apply(Transition::DecreaseContext),
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::PageDown => app.page(true),
        KeyCode::PageUp => app.page(false),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        _ => return false,
    }
    true
}

//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent};

use seniorhub_core::ShellView;

use crate::app::{App, AppState};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    match app.view() {
        ShellView::Loading => {}
        ShellView::SignIn => handle_sign_in_input(app, key),
        ShellView::Dashboard => handle_dashboard_input(app, key),
    }
    false
}

fn handle_sign_in_input(app: &mut App, key: KeyEvent) {
    // While the browser is open only cancelling makes sense
    if app.is_signing_in() {
        if key.code == KeyCode::Esc {
            app.cancel_sign_in();
        }
        return;
    }

    match key.code {
        KeyCode::Enter | KeyCode::Char('g') => app.start_sign_in(),
        KeyCode::Char('d') if app.shell.demo_allowed() => app.sign_in_demo(),
        KeyCode::Char('q') | KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        _ => {}
    }
}

fn handle_dashboard_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Right | KeyCode::Down | KeyCode::Tab | KeyCode::Char('l') | KeyCode::Char('j') => {
            app.select_next()
        }
        KeyCode::Left | KeyCode::Up | KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Char('k') => {
            app.select_prev()
        }
        KeyCode::Enter => app.activate_selected(),
        KeyCode::Char('o') => app.logout(),
        KeyCode::Char('q') | KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        _ => {}
    }
}

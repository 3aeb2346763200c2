//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Every screen change goes through the router,
//! so the authentication guard sees it.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{can_add_password_char, can_add_username_char, App, AppState, LoginFocus};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    if app.on_login_screen() {
        return handle_login_input(app, key).await;
    }

    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(index) = c.to_digit(10) {
                app.select_tab(index as usize);
            }
        }
        KeyCode::Right | KeyCode::Tab => app.next_tab(),
        KeyCode::Left | KeyCode::BackTab => app.prev_tab(),
        KeyCode::Char('b') | KeyCode::Backspace => app.go_back(),
        KeyCode::Char('r') => app.refresh_user().await,
        KeyCode::Char('o') => app.logout(),
        _ => {}
    }
    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => {
                app.login_focus = LoginFocus::Button;
                app.attempt_login().await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

//! Event handling

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::async_ops::AsyncCommand;
use super::state::{AppState, LOADING_STATUS, Mode};
use crate::session::SessionStore;

/// Handle key events, returning an optional async command
pub fn handle_key<S: SessionStore>(state: &mut AppState<S>, key: KeyEvent) -> Option<AsyncCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return None;
    }

    // Handle mode-specific input first
    match state.mode {
        Mode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                state.mode = Mode::Normal;
            }
            None
        }
        Mode::ConfirmDelete(_) => handle_confirm_key(state, key),
        Mode::Auth(_) | Mode::ChangePassword | Mode::Compose | Mode::Edit(_) => {
            handle_form_key(state, key)
        }
        Mode::Normal => handle_normal_key(state, key),
    }
}

fn handle_normal_key<S: SessionStore>(
    state: &mut AppState<S>,
    key: KeyEvent,
) -> Option<AsyncCommand> {
    let authenticated = state.session.is_authenticated();

    match (key.modifiers, key.code) {
        (_, KeyCode::Char('q')) => {
            state.should_quit = true;
            None
        }
        (_, KeyCode::Char('?') | KeyCode::F(1)) => {
            state.mode = Mode::Help;
            None
        }
        (_, KeyCode::Char('t')) => {
            state.toggle_theme();
            None
        }
        (_, KeyCode::Char('r') | KeyCode::F(5)) => {
            state.set_status(LOADING_STATUS);
            Some(state.refresh_feed())
        }
        (_, KeyCode::Esc) => {
            state.clear_status();
            state.feed.clear_error();
            None
        }

        // Navigation
        (_, KeyCode::Char('j') | KeyCode::Down) => {
            state.select_next_post();
            None
        }
        (_, KeyCode::Char('k') | KeyCode::Up) => {
            state.select_prev_post();
            None
        }
        (_, KeyCode::Char('g') | KeyCode::Home) => {
            state.selected_post = 0;
            None
        }
        (_, KeyCode::Char('G') | KeyCode::End) => {
            state.selected_post = state.feed.posts().len().saturating_sub(1);
            None
        }

        // Open attached media in the system handler
        (_, KeyCode::Char('o')) => {
            if let Some(url) = state
                .selected_post()
                .and_then(|p| p.media())
                .map(|(_, url)| url.to_string())
            {
                match open::that(&url) {
                    Ok(()) => state.set_status(format!("Opened {url}")),
                    Err(e) => state.set_status(format!("Failed to open media: {e}")),
                }
            }
            None
        }

        // Account
        (_, KeyCode::Char('a')) if !authenticated => {
            state.open_auth();
            None
        }
        (_, KeyCode::Char('L')) if authenticated => state.logout(),
        (_, KeyCode::Char('p')) if authenticated => {
            state.open_change_password();
            None
        }

        // Post actions
        (_, KeyCode::Char('n')) if state.can_manage_posts() => {
            state.open_compose();
            None
        }
        (_, KeyCode::Char('e')) if state.can_manage_posts() => {
            state.open_edit();
            None
        }
        (_, KeyCode::Char('d') | KeyCode::Delete) if state.can_manage_posts() => {
            state.request_delete();
            None
        }
        _ => None,
    }
}

fn handle_form_key<S: SessionStore>(
    state: &mut AppState<S>,
    key: KeyEvent,
) -> Option<AsyncCommand> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => {
            state.dismiss_popup();
            None
        }
        (_, KeyCode::Enter) => state.submit_form(),
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
            state.switch_auth_tab();
            None
        }
        (_, KeyCode::Tab | KeyCode::Down) => {
            state.form.next_field();
            None
        }
        (_, KeyCode::BackTab | KeyCode::Up) => {
            state.form.prev_field();
            None
        }
        (_, KeyCode::Left) => {
            state.form.cycle(false);
            None
        }
        (_, KeyCode::Right) => {
            state.form.cycle(true);
            None
        }
        (_, KeyCode::Backspace) => {
            state.form.backspace();
            None
        }
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
            state.form.input_char(c);
            None
        }
        _ => None,
    }
}

fn handle_confirm_key<S: SessionStore>(
    state: &mut AppState<S>,
    key: KeyEvent,
) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => state.answer_delete(true),
        KeyCode::Char('n' | 'N') | KeyCode::Esc => state.answer_delete(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::{MemoryStore, Session};

    fn press(state: &mut AppState<MemoryStore>, code: KeyCode) -> Option<AsyncCommand> {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn state() -> AppState<MemoryStore> {
        AppState::new(Config::default(), Session::restore(MemoryStore::new()))
    }

    #[test]
    fn test_quit() {
        let mut state = state();
        press(&mut state, KeyCode::Char('q'));
        assert!(state.should_quit);
    }

    #[test]
    fn test_post_actions_hidden_when_anonymous() {
        let mut state = state();
        press(&mut state, KeyCode::Char('n'));
        assert_eq!(state.mode, Mode::Normal);

        press(&mut state, KeyCode::Char('a'));
        assert!(matches!(state.mode, Mode::Auth(_)));
    }

    #[test]
    fn test_typing_q_in_form_does_not_quit() {
        let mut state = state();
        state.session.login("alice", None);
        press(&mut state, KeyCode::Char('n'));
        assert_eq!(state.mode, Mode::Compose);

        press(&mut state, KeyCode::Char('q'));
        assert!(!state.should_quit);
        assert_eq!(state.form.post_input().content, "q");

        press(&mut state, KeyCode::Esc);
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn test_login_form_submits() {
        let mut state = state();
        press(&mut state, KeyCode::Char('a'));
        press(&mut state, KeyCode::Char('b'));
        press(&mut state, KeyCode::Tab);
        press(&mut state, KeyCode::Char('x'));

        let Some(AsyncCommand::Login { username, password }) = press(&mut state, KeyCode::Enter)
        else {
            panic!("expected login");
        };
        assert_eq!(username, "b");
        assert_eq!(password, "x");
        assert!(state.form.busy);

        // A second Enter while the request is in flight sends nothing
        assert!(press(&mut state, KeyCode::Enter).is_none());
    }

    #[test]
    fn test_esc_ignored_while_request_in_flight() {
        let mut state = state();
        state.session.login("alice", None);
        press(&mut state, KeyCode::Char('n'));
        press(&mut state, KeyCode::Char('x'));
        assert!(press(&mut state, KeyCode::Enter).is_some());

        press(&mut state, KeyCode::Esc);
        assert_eq!(state.mode, Mode::Compose);
    }

    #[test]
    fn test_ctrl_c_quits_from_form() {
        let mut state = state();
        press(&mut state, KeyCode::Char('a'));
        handle_key(
            &mut state,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(state.should_quit);
    }
}

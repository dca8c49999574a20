//! Application state

use crate::actions::{Mutation, PendingDelete, PostInput};
use crate::config::Config;
use crate::db::Database;
use crate::feed::FeedState;
use crate::models::Post;
use crate::session::{Session, SessionStore};
use crate::theme::Theme;

use super::async_ops::{AsyncCommand, AsyncResult};
use super::forms::Form;

/// Which tab of the auth popup is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthTab {
    /// Existing account
    #[default]
    Login,
    /// New account
    Signup,
}

impl AuthTab {
    /// The other tab
    pub const fn toggled(self) -> Self {
        match self {
            Self::Login => Self::Signup,
            Self::Signup => Self::Login,
        }
    }
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Browsing the feed
    #[default]
    Normal,
    /// Login / sign-up popup
    Auth(AuthTab),
    /// Change-password form
    ChangePassword,
    /// New post form
    Compose,
    /// Edit form for post `id`
    Edit(i64),
    /// Waiting for the user to confirm a delete
    ConfirmDelete(PendingDelete),
    /// Keybinding help
    Help,
}

/// Application state
pub struct AppState<S: SessionStore = Database> {
    /// Configuration
    pub config: Config,
    /// Session (auth, theme, persisted store)
    pub session: Session<S>,
    /// Feed and its load status
    pub feed: FeedState,
    /// Current mode
    pub mode: Mode,
    /// Active popup form
    pub form: Form,
    /// Selected post index
    pub selected_post: usize,
    /// Status message (bottom bar)
    pub status: String,
    /// Whether to quit
    pub should_quit: bool,

    /// Tick counter for animations
    tick: u64,
}

impl<S: SessionStore> AppState<S> {
    /// Create a new app state
    pub fn new(config: Config, session: Session<S>) -> Self {
        Self {
            config,
            session,
            feed: FeedState::new(),
            mode: Mode::Normal,
            form: Form::empty(),
            selected_post: 0,
            status: String::new(),
            should_quit: false,
            tick: 0,
        }
    }

    /// Tick for animations
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Get current tick
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status.clear();
    }

    /// Current theme
    pub const fn theme(&self) -> Theme {
        self.session.theme().theme()
    }

    /// Whether post actions (create/edit/delete) are available
    pub const fn can_manage_posts(&self) -> bool {
        self.session.is_authenticated()
    }

    // ==================== Feed ====================

    /// Start a feed refresh for the current auth state
    pub fn refresh_feed(&mut self) -> AsyncCommand {
        let request = self
            .feed
            .begin_refresh(self.session.is_authenticated(), self.session.username());
        AsyncCommand::FetchFeed {
            request,
            token: self.session.token(),
        }
    }

    /// Refresh only if the user logged in, out, or switched accounts
    pub fn refresh_if_identity_changed(&mut self) -> Option<AsyncCommand> {
        if self
            .feed
            .identity_changed(self.session.is_authenticated(), self.session.username())
        {
            Some(self.refresh_feed())
        } else {
            None
        }
    }

    /// Get the currently selected post
    pub fn selected_post(&self) -> Option<&Post> {
        self.feed.posts().get(self.selected_post)
    }

    /// Move selection down in the feed
    pub fn select_next_post(&mut self) {
        let len = self.feed.posts().len();
        if len > 0 {
            self.selected_post = (self.selected_post + 1).min(len - 1);
        }
    }

    /// Move selection up in the feed
    pub fn select_prev_post(&mut self) {
        self.selected_post = self.selected_post.saturating_sub(1);
    }

    /// Keep the selection inside the list after it changes
    fn clamp_selection(&mut self) {
        let len = self.feed.posts().len();
        if self.selected_post >= len {
            self.selected_post = len.saturating_sub(1);
        }
    }

    // ==================== Session ====================

    /// Flip light/dark
    pub fn toggle_theme(&mut self) {
        let theme = self.session.toggle_theme();
        self.set_status(format!("Theme: {theme}"));
    }

    /// Log out and reload the public feed
    pub fn logout(&mut self) -> Option<AsyncCommand> {
        self.session.logout();
        self.mode = Mode::Normal;
        self.set_status("Logged out");
        self.refresh_if_identity_changed()
    }

    // ==================== Popups ====================

    /// Open the login / sign-up popup
    pub fn open_auth(&mut self) {
        self.mode = Mode::Auth(AuthTab::Login);
        self.form = Form::login("");
    }

    /// Switch between the login and sign-up tabs
    pub fn switch_auth_tab(&mut self) {
        if self.form.busy {
            return;
        }
        if let Mode::Auth(tab) = self.mode {
            let tab = tab.toggled();
            self.mode = Mode::Auth(tab);
            self.form = match tab {
                AuthTab::Login => Form::login(""),
                AuthTab::Signup => Form::signup(),
            };
        }
    }

    /// Open the change-password form
    pub fn open_change_password(&mut self) {
        self.mode = Mode::ChangePassword;
        self.form = Form::change_password();
    }

    /// Open the new-post form
    pub fn open_compose(&mut self) {
        self.mode = Mode::Compose;
        self.form = Form::post(&PostInput::default());
    }

    /// Open the edit form for the selected post
    pub fn open_edit(&mut self) {
        if let Some(post) = self.selected_post() {
            let id = post.id;
            self.form = Form::post(&PostInput::from_post(post));
            self.mode = Mode::Edit(id);
        }
    }

    /// Ask for confirmation before deleting the selected post
    pub fn request_delete(&mut self) {
        if let Some(post) = self.selected_post() {
            self.mode = Mode::ConfirmDelete(PendingDelete::new(post.id));
        }
    }

    /// Answer the delete confirmation. Declining sends nothing.
    pub fn answer_delete(&mut self, confirmed: bool) -> Option<AsyncCommand> {
        let Mode::ConfirmDelete(pending) = self.mode else {
            return None;
        };
        self.mode = Mode::Normal;

        let mutation = if confirmed {
            Some(pending.confirm())
        } else {
            pending.decline()
        }?;

        self.set_status("Deleting...");
        Some(AsyncCommand::Mutate {
            token: self.session.token(),
            mutation,
        })
    }

    /// Close any popup. A form waiting on its request stays open.
    pub fn dismiss_popup(&mut self) {
        if !self.form.busy {
            self.close_popup();
        }
    }

    /// Close any popup
    pub fn close_popup(&mut self) {
        self.mode = Mode::Normal;
        self.form = Form::empty();
    }

    /// Submit the active form
    pub fn submit_form(&mut self) -> Option<AsyncCommand> {
        if self.form.busy {
            return None;
        }

        let cmd = match self.mode {
            Mode::Auth(AuthTab::Login) => {
                let (username, password) = self.form.login_values();
                AsyncCommand::Login { username, password }
            }
            Mode::Auth(AuthTab::Signup) => {
                let (username, email, password) = self.form.signup_values();
                AsyncCommand::Register {
                    username,
                    email,
                    password,
                }
            }
            Mode::ChangePassword => {
                let (current_password, new_password) = self.form.change_password_values();
                AsyncCommand::ChangePassword {
                    token: self.session.token(),
                    username: self.session.username().to_string(),
                    current_password,
                    new_password,
                }
            }
            Mode::Compose | Mode::Edit(_) => {
                let input = self.form.post_input();
                let mutation = match self.mode {
                    Mode::Edit(id) => Mutation::update(id, &input),
                    _ => Mutation::create(&input),
                };
                match mutation {
                    Ok(mutation) => AsyncCommand::Mutate {
                        token: self.session.token(),
                        mutation,
                    },
                    Err(e) => {
                        self.form.set_error(e.to_string());
                        return None;
                    }
                }
            }
            Mode::Normal | Mode::ConfirmDelete(_) | Mode::Help => return None,
        };

        self.form.busy = true;
        self.form.message = None;
        Some(cmd)
    }

    // ==================== Async results ====================

    /// Whether the open form is the one waiting on a result of this kind.
    ///
    /// Only a submitted form is busy, and a busy form cannot be dismissed,
    /// so a match means the result belongs to it.
    fn form_awaits(&self, issued_by: impl Fn(Mode) -> bool) -> bool {
        self.form.busy && issued_by(self.mode)
    }

    /// Report a failure on the form that sent the request, or on the status
    /// bar if that form is gone
    fn report_failure(&mut self, issued_by: impl Fn(Mode) -> bool, message: String) {
        if self.form_awaits(issued_by) {
            self.form.set_error(message);
        } else {
            self.set_status(message);
        }
    }

    /// Apply a worker result, returning a follow-up command if one is needed
    pub fn apply_result(&mut self, result: AsyncResult) -> Option<AsyncCommand> {
        match result {
            AsyncResult::FeedFetched { seq, result } => {
                if self.feed.apply(seq, result) {
                    self.clamp_selection();
                    if self.status == LOADING_STATUS {
                        self.clear_status();
                    }
                }
                None
            }
            AsyncResult::LoggedIn(success) => {
                self.session
                    .login(&success.username, success.token.as_deref());
                if self.form_awaits(|m| m == Mode::Auth(AuthTab::Login)) {
                    self.close_popup();
                }
                self.set_status("Login successful!");
                self.refresh_if_identity_changed()
            }
            AsyncResult::LoginFailed { message } => {
                self.report_failure(|m| m == Mode::Auth(AuthTab::Login), message);
                None
            }
            AsyncResult::Registered { username, message } => {
                if self.form_awaits(|m| m == Mode::Auth(AuthTab::Signup)) {
                    self.mode = Mode::Auth(AuthTab::Login);
                    self.form = Form::login(&username);
                    self.form.focus = 1;
                    self.form.set_info(message);
                } else {
                    self.set_status(message);
                }
                None
            }
            AsyncResult::RegisterFailed { message } => {
                self.report_failure(|m| m == Mode::Auth(AuthTab::Signup), message);
                None
            }
            AsyncResult::PasswordChanged { message } => {
                if self.form_awaits(|m| m == Mode::ChangePassword) {
                    self.close_popup();
                }
                self.set_status(message);
                None
            }
            AsyncResult::PasswordChangeFailed { message } => {
                self.report_failure(|m| m == Mode::ChangePassword, message);
                None
            }
            AsyncResult::Mutated { mutation } => {
                if self.form_awaits(|m| issued(&mutation, m)) {
                    self.close_popup();
                }
                self.set_status(mutation.done_label());
                Some(self.refresh_feed())
            }
            AsyncResult::MutationFailed { mutation, message } => {
                if self.form_awaits(|m| issued(&mutation, m)) {
                    self.form.set_error(message.clone());
                }
                self.clear_status();
                self.feed.set_error(message);
                None
            }
        }
    }
}

/// Status shown while a manual refresh is outstanding
pub const LOADING_STATUS: &str = "Loading posts...";

/// Whether a form in `mode` sends this mutation
fn issued(mutation: &Mutation, mode: Mode) -> bool {
    match (mutation, mode) {
        (Mutation::Create(_), Mode::Compose) => true,
        (Mutation::Update { id, .. }, Mode::Edit(edit_id)) => *id == edit_id,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::LoginSuccess;
    use crate::feed::FeedScope;
    use crate::session::{KEY_TOKEN, MemoryStore};

    fn state() -> AppState<MemoryStore> {
        AppState::new(Config::default(), Session::restore(MemoryStore::new()))
    }

    fn post(id: i64) -> Post {
        serde_json::from_value(serde_json::json!({ "id": id, "content": "x" })).unwrap()
    }

    fn load(state: &mut AppState<MemoryStore>, posts: Vec<Post>) {
        let AsyncCommand::FetchFeed { request, .. } = state.refresh_feed() else {
            panic!("expected fetch");
        };
        state.apply_result(AsyncResult::FeedFetched {
            seq: request.seq,
            result: Ok(posts),
        });
    }

    #[test]
    fn test_anonymous_refresh_is_public_without_token() {
        let mut state = state();
        let AsyncCommand::FetchFeed { request, token } = state.refresh_feed() else {
            panic!("expected fetch");
        };
        assert_eq!(request.scope, FeedScope::Public);
        assert!(token.is_none());
    }

    #[test]
    fn test_login_result_persists_and_refreshes() {
        let mut state = state();
        load(&mut state, vec![]);
        state.open_auth();
        state.form.input_char('a');
        assert!(matches!(state.submit_form(), Some(AsyncCommand::Login { .. })));

        let cmd = state.apply_result(AsyncResult::LoggedIn(LoginSuccess {
            username: "alice".to_string(),
            token: Some("jwt".to_string()),
        }));

        assert_eq!(state.mode, Mode::Normal);
        assert!(state.session.is_authenticated());
        assert_eq!(state.session.store().get(KEY_TOKEN).as_deref(), Some("jwt"));
        let Some(AsyncCommand::FetchFeed { request, token }) = cmd else {
            panic!("expected refresh");
        };
        assert_eq!(request.scope, FeedScope::Personal);
        assert_eq!(token.as_deref(), Some("jwt"));
    }

    #[test]
    fn test_login_failure_keeps_popup() {
        let mut state = state();
        state.open_auth();
        state.form.busy = true;
        state.apply_result(AsyncResult::LoginFailed {
            message: "Invalid credentials".to_string(),
        });
        assert_eq!(state.mode, Mode::Auth(AuthTab::Login));
        assert!(!state.form.busy);
        assert!(!state.session.is_authenticated());
    }

    #[test]
    fn test_logout_reloads_public_feed() {
        let mut state = state();
        state.session.login("alice", Some("jwt"));
        load(&mut state, vec![post(1)]);

        let Some(AsyncCommand::FetchFeed { request, token }) = state.logout() else {
            panic!("expected refresh");
        };
        assert_eq!(request.scope, FeedScope::Public);
        assert!(token.is_none());
        assert!(state.session.token().is_none());
    }

    #[test]
    fn test_empty_compose_sends_nothing() {
        let mut state = state();
        state.session.login("alice", None);
        state.open_compose();
        assert!(state.submit_form().is_none());
        assert_eq!(state.mode, Mode::Compose);
        assert!(state.form.message.is_some());
    }

    #[test]
    fn test_mutation_failure_keeps_form_open() {
        let mut state = state();
        state.session.login("alice", None);
        state.open_compose();
        state.form.input_char('h');
        let Some(AsyncCommand::Mutate { mutation, .. }) = state.submit_form() else {
            panic!("expected mutate");
        };

        let follow_up = state.apply_result(AsyncResult::MutationFailed {
            mutation,
            message: "Content too long".to_string(),
        });
        assert!(follow_up.is_none());
        assert_eq!(state.mode, Mode::Compose);
        assert_eq!(state.feed.error(), Some("Content too long"));
    }

    #[test]
    fn test_mutation_success_closes_form_and_refreshes() {
        let mut state = state();
        state.session.login("alice", None);
        load(&mut state, vec![post(1)]);
        state.open_edit();
        assert_eq!(state.mode, Mode::Edit(1));

        let Some(AsyncCommand::Mutate { mutation, .. }) = state.submit_form() else {
            panic!("expected mutate");
        };
        let follow_up = state.apply_result(AsyncResult::Mutated { mutation });
        assert_eq!(state.mode, Mode::Normal);
        assert!(matches!(follow_up, Some(AsyncCommand::FetchFeed { .. })));
        assert!(state.feed.is_loading());
    }

    #[test]
    fn test_declined_delete_sends_nothing() {
        let mut state = state();
        state.session.login("alice", None);
        load(&mut state, vec![post(9)]);

        state.request_delete();
        assert!(matches!(state.mode, Mode::ConfirmDelete(_)));
        assert!(state.answer_delete(false).is_none());
        assert_eq!(state.mode, Mode::Normal);

        state.request_delete();
        let Some(AsyncCommand::Mutate { mutation, .. }) = state.answer_delete(true) else {
            panic!("expected delete");
        };
        assert_eq!(mutation, Mutation::Delete { id: 9 });
    }

    #[test]
    fn test_selection_clamped_after_reload() {
        let mut state = state();
        load(&mut state, vec![post(1), post(2), post(3)]);
        state.select_next_post();
        state.select_next_post();
        assert_eq!(state.selected_post, 2);

        load(&mut state, vec![post(1)]);
        assert_eq!(state.selected_post, 0);
    }

    #[test]
    fn test_registered_switches_to_login() {
        let mut state = state();
        state.open_auth();
        state.switch_auth_tab();
        assert_eq!(state.mode, Mode::Auth(AuthTab::Signup));
        assert!(matches!(state.submit_form(), Some(AsyncCommand::Register { .. })));

        state.apply_result(AsyncResult::Registered {
            username: "carol".to_string(),
            message: "User registered successfully!".to_string(),
        });
        assert_eq!(state.mode, Mode::Auth(AuthTab::Login));
        assert_eq!(state.form.login_values().0, "carol");
    }

    #[test]
    fn test_feed_result_clears_loading_status() {
        let mut state = state();
        state.set_status(LOADING_STATUS);
        load(&mut state, vec![]);
        assert!(state.status.is_empty());
        assert!(!state.feed.is_loading());
    }

    #[test]
    fn test_feed_result_keeps_other_status() {
        let mut state = state();
        state.set_status("Post created");
        load(&mut state, vec![post(1)]);
        assert_eq!(state.status, "Post created");
    }

    #[test]
    fn test_failed_delete_clears_deleting_status() {
        let mut state = state();
        state.session.login("alice", None);
        load(&mut state, vec![post(4)]);
        state.request_delete();
        let Some(AsyncCommand::Mutate { mutation, .. }) = state.answer_delete(true) else {
            panic!("expected delete");
        };
        assert_eq!(state.status, "Deleting...");

        state.apply_result(AsyncResult::MutationFailed {
            mutation,
            message: "Error deleting post".to_string(),
        });
        assert!(state.status.is_empty());
        assert_eq!(state.feed.error(), Some("Error deleting post"));
    }

    #[test]
    fn test_late_create_result_keeps_new_draft() {
        let mut state = state();
        state.session.login("alice", None);
        state.open_compose();
        state.form.input_char('a');
        let Some(AsyncCommand::Mutate { mutation, .. }) = state.submit_form() else {
            panic!("expected create");
        };

        // The first form was closed before its result came back
        state.close_popup();
        state.open_compose();
        for c in "draft".chars() {
            state.form.input_char(c);
        }

        state.apply_result(AsyncResult::Mutated { mutation });
        assert_eq!(state.mode, Mode::Compose);
        assert_eq!(state.form.post_input().content, "draft");
        assert!(state.form.message.is_none());
    }

    #[test]
    fn test_late_failure_goes_to_status_bar() {
        let mut state = state();
        state.session.login("alice", None);
        state.open_compose();
        state.apply_result(AsyncResult::LoginFailed {
            message: "Invalid credentials".to_string(),
        });
        assert!(state.form.message.is_none());
        assert_eq!(state.status, "Invalid credentials");
    }

    #[test]
    fn test_delete_result_does_not_close_edit_form() {
        let mut state = state();
        state.session.login("alice", None);
        load(&mut state, vec![post(1), post(2)]);
        state.open_edit();
        state.form.busy = true;

        state.apply_result(AsyncResult::Mutated {
            mutation: Mutation::Delete { id: 2 },
        });
        assert_eq!(state.mode, Mode::Edit(1));
    }

    #[test]
    fn test_busy_form_cannot_be_dismissed() {
        let mut state = state();
        state.open_auth();
        state.form.busy = true;
        state.dismiss_popup();
        state.switch_auth_tab();
        assert_eq!(state.mode, Mode::Auth(AuthTab::Login));
    }
}

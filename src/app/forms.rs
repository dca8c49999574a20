//! Form input state for the popups (login, sign-up, change password, post)

use std::path::PathBuf;

use crate::actions::PostInput;
use crate::models::MediaType;

/// Value held by a single form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Free text
    Text(String),
    /// Free text rendered masked
    Secret(String),
    /// Checkbox
    Toggle(bool),
    /// Media type picker
    Media(MediaType),
}

/// A labelled field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Label shown next to the input
    pub label: &'static str,
    /// Current value
    pub value: FieldValue,
}

impl Field {
    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: FieldValue::Text(value.into()),
        }
    }

    fn secret(label: &'static str) -> Self {
        Self {
            label,
            value: FieldValue::Secret(String::new()),
        }
    }

    /// Text as displayed (secrets masked)
    pub fn display(&self) -> String {
        match &self.value {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Secret(s) => "•".repeat(s.chars().count()),
            FieldValue::Toggle(true) => "[x]".to_string(),
            FieldValue::Toggle(false) => "[ ]".to_string(),
            FieldValue::Media(m) => format!("◀ {m} ▶"),
        }
    }
}

/// Feedback line under a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMessage {
    /// Positive outcome
    Info(String),
    /// Failure to show in the error color
    Error(String),
}

/// A popup form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    /// Fields in tab order
    pub fields: Vec<Field>,
    /// Focused field index
    pub focus: usize,
    /// Feedback line
    pub message: Option<FormMessage>,
    /// A request for this form is in flight
    pub busy: bool,
}

// Field indexes for each form kind
const LOGIN_USERNAME: usize = 0;
const LOGIN_PASSWORD: usize = 1;

const SIGNUP_USERNAME: usize = 0;
const SIGNUP_EMAIL: usize = 1;
const SIGNUP_PASSWORD: usize = 2;

const CHANGE_CURRENT: usize = 0;
const CHANGE_NEW: usize = 1;

const POST_CONTENT: usize = 0;
const POST_MEDIA_TYPE: usize = 1;
const POST_MEDIA_FILE: usize = 2;
const POST_DESCRIPTION: usize = 3;
const POST_PUBLIC: usize = 4;

impl Form {
    fn with_fields(fields: Vec<Field>) -> Self {
        Self {
            fields,
            focus: 0,
            message: None,
            busy: false,
        }
    }

    /// Empty form with no fields
    pub const fn empty() -> Self {
        Self {
            fields: Vec::new(),
            focus: 0,
            message: None,
            busy: false,
        }
    }

    /// Login form
    pub fn login(username: &str) -> Self {
        Self::with_fields(vec![
            Field::text("Username", username),
            Field::secret("Password"),
        ])
    }

    /// Sign-up form
    pub fn signup() -> Self {
        Self::with_fields(vec![
            Field::text("Username", ""),
            Field::text("Email", ""),
            Field::secret("Password"),
        ])
    }

    /// Change-password form
    pub fn change_password() -> Self {
        Self::with_fields(vec![
            Field::secret("Current Password"),
            Field::secret("New Password"),
        ])
    }

    /// Create/edit post form, pre-filled from `input`
    pub fn post(input: &PostInput) -> Self {
        let media_file = input
            .media_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        Self::with_fields(vec![
            Field::text("Content", input.content.clone()),
            Field {
                label: "Media Type",
                value: FieldValue::Media(input.media_type),
            },
            Field::text("Upload (file path)", media_file),
            Field::text("Description", input.description.clone()),
            Field {
                label: "Make this post public",
                value: FieldValue::Toggle(input.is_public),
            },
        ])
    }

    /// Move focus to the next field
    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    /// Move focus to the previous field
    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = self.focus.checked_sub(1).unwrap_or(self.fields.len() - 1);
        }
    }

    /// Type a character into the focused field
    pub fn input_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            match &mut field.value {
                FieldValue::Text(s) | FieldValue::Secret(s) => s.push(c),
                FieldValue::Toggle(on) if c == ' ' => *on = !*on,
                FieldValue::Toggle(_) | FieldValue::Media(_) => {}
            }
        }
    }

    /// Delete the last character of the focused field
    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if let FieldValue::Text(s) | FieldValue::Secret(s) = &mut field.value {
                s.pop();
            }
        }
    }

    /// Cycle a picker or flip a checkbox (left/right arrows)
    pub fn cycle(&mut self, forward: bool) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            match &mut field.value {
                FieldValue::Media(m) => *m = if forward { m.next() } else { m.prev() },
                FieldValue::Toggle(on) => *on = !*on,
                FieldValue::Text(_) | FieldValue::Secret(_) => {}
            }
        }
    }

    fn string(&self, idx: usize) -> &str {
        match self.fields.get(idx).map(|f| &f.value) {
            Some(FieldValue::Text(s) | FieldValue::Secret(s)) => s,
            _ => "",
        }
    }

    /// `(username, password)` of a login form
    pub fn login_values(&self) -> (String, String) {
        (
            self.string(LOGIN_USERNAME).trim().to_string(),
            self.string(LOGIN_PASSWORD).to_string(),
        )
    }

    /// `(username, email, password)` of a sign-up form
    pub fn signup_values(&self) -> (String, String, String) {
        (
            self.string(SIGNUP_USERNAME).trim().to_string(),
            self.string(SIGNUP_EMAIL).trim().to_string(),
            self.string(SIGNUP_PASSWORD).to_string(),
        )
    }

    /// `(current, new)` of a change-password form
    pub fn change_password_values(&self) -> (String, String) {
        (
            self.string(CHANGE_CURRENT).to_string(),
            self.string(CHANGE_NEW).to_string(),
        )
    }

    /// Post input of a create/edit form
    pub fn post_input(&self) -> PostInput {
        let media_type = match self.fields.get(POST_MEDIA_TYPE).map(|f| &f.value) {
            Some(FieldValue::Media(m)) => *m,
            _ => MediaType::None,
        };
        let is_public = !matches!(
            self.fields.get(POST_PUBLIC).map(|f| &f.value),
            Some(FieldValue::Toggle(false))
        );
        let media_path = Some(self.string(POST_MEDIA_FILE).trim())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        PostInput {
            content: self.string(POST_CONTENT).to_string(),
            is_public,
            media_type,
            media_path,
            description: self.string(POST_DESCRIPTION).to_string(),
        }
    }

    /// Show an error line
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.busy = false;
        self.message = Some(FormMessage::Error(message.into()));
    }

    /// Show an info line
    pub fn set_info(&mut self, message: impl Into<String>) {
        self.busy = false;
        self.message = Some(FormMessage::Info(message.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_and_focus() {
        let mut form = Form::login("");
        for c in "alice".chars() {
            form.input_char(c);
        }
        form.next_field();
        for c in "pw1".chars() {
            form.input_char(c);
        }
        form.backspace();

        assert_eq!(form.login_values(), ("alice".to_string(), "pw".to_string()));
        assert_eq!(form.fields[1].display(), "••");

        form.next_field();
        assert_eq!(form.focus, 0);
        form.prev_field();
        assert_eq!(form.focus, 1);
    }

    #[test]
    fn test_post_form_round_trip() {
        let input = PostInput {
            content: "hello".to_string(),
            is_public: false,
            media_type: MediaType::Image,
            media_path: Some(PathBuf::from("/tmp/cat.png")),
            description: "a cat".to_string(),
        };
        assert_eq!(Form::post(&input).post_input(), input);
    }

    #[test]
    fn test_post_form_pickers() {
        let mut form = Form::post(&PostInput::default());
        form.focus = POST_MEDIA_TYPE;
        form.cycle(true);
        form.cycle(true);
        form.focus = POST_PUBLIC;
        form.input_char(' ');

        let input = form.post_input();
        assert_eq!(input.media_type, MediaType::Video);
        assert!(!input.is_public);
        assert!(input.media_path.is_none());
    }
}

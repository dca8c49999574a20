//! UI rendering for the TUI

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use super::forms::{FieldValue, Form, FormMessage};
use super::state::{AppState, AuthTab, Mode};
use crate::actions::PendingDelete;
use crate::feed::FeedStatus;
use crate::models::Post;
use crate::session::SessionStore;
use crate::theme::ThemeColors;

/// Brand shown in the navbar
const BRAND: &str = "Nutz";

/// Spinner animation frames
const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main render function
pub fn render<S: SessionStore>(frame: &mut Frame, state: &AppState<S>) {
    let colors = *state.session.theme().colors();

    // Set background
    let area = frame.area();
    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(bg_block, area);

    let hero_height = if state.session.is_authenticated() { 0 } else { 4 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),           // Navbar
            Constraint::Length(hero_height), // Welcome banner
            Constraint::Min(0),              // Feed
            Constraint::Length(1),           // Status bar
        ])
        .split(area);

    render_navbar(frame, state, &colors, chunks[0]);
    if hero_height > 0 {
        render_hero(frame, &colors, chunks[1]);
    }
    render_feed(frame, state, &colors, chunks[2]);
    render_status_bar(frame, state, &colors, chunks[3]);

    // Render modal dialogs
    match state.mode {
        Mode::Help => render_help_popup(frame, &colors),
        Mode::Auth(tab) => render_auth_popup(frame, &state.form, tab, &colors),
        Mode::ChangePassword => {
            render_form_popup(frame, &state.form, " Change Password ", 50, 40, &colors);
        }
        Mode::Compose => render_form_popup(frame, &state.form, " Create Post ", 60, 55, &colors),
        Mode::Edit(_) => render_form_popup(frame, &state.form, " Edit Post ", 60, 55, &colors),
        Mode::ConfirmDelete(pending) => render_confirm_delete(frame, pending, &colors),
        Mode::Normal => {}
    }
}

fn render_navbar<S: SessionStore>(
    frame: &mut Frame,
    state: &AppState<S>,
    colors: &ThemeColors,
    area: Rect,
) {
    let theme_icon = state.theme().toggle_icon();

    let mut spans = vec![
        Span::styled(format!(" {theme_icon} "), colors.text()),
        Span::styled("t", colors.key_hint()),
        Span::styled("  │  ", colors.text_muted()),
    ];

    if state.session.is_authenticated() {
        spans.push(Span::styled("Profile ", colors.text()));
        spans.push(Span::styled(
            format!("({})", state.session.username()),
            colors.text_primary(),
        ));
        spans.push(Span::styled("  ", colors.text()));
        spans.push(Span::styled("L", colors.key_hint()));
        spans.push(Span::styled(" logout ", colors.text_muted()));
    } else {
        spans.push(Span::styled("Login / Sign Up ", colors.text()));
        spans.push(Span::styled("a", colors.key_hint()));
        spans.push(Span::styled(" ", colors.text()));
    }

    let navbar = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block())
                .title(format!(" {BRAND} "))
                .title_style(colors.brand()),
        );

    frame.render_widget(navbar, area);
}

fn render_hero(frame: &mut Frame, colors: &ThemeColors, area: Rect) {
    let hero = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Welcome to {BRAND}"),
            colors.text_primary().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Share what's on your mind. Log in to post and see your feed.",
            colors.text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::NONE));

    let inner = Rect {
        y: area.y + 1,
        height: area.height.saturating_sub(1),
        ..area
    };
    frame.render_widget(hero, inner);
}

fn render_feed<S: SessionStore>(
    frame: &mut Frame,
    state: &AppState<S>,
    colors: &ThemeColors,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block_focus())
        .title(format!(" {} ", state.feed.scope().title()))
        .title_style(colors.text_primary().add_modifier(Modifier::BOLD));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let has_error = state.feed.error().is_some();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(u16::from(has_error)),
            Constraint::Min(0),
        ])
        .split(inner);

    if let Some(error) = state.feed.error() {
        let line = Line::from(vec![
            Span::styled(" ✗ ", colors.text_error()),
            Span::styled(error, colors.text_error()),
        ]);
        frame.render_widget(Paragraph::new(line), chunks[0]);
    }

    let list_area = chunks[1];
    let posts = state.feed.posts();

    if posts.is_empty() {
        let (message, style) = match state.feed.status() {
            FeedStatus::Loading => ("Loading posts...", colors.text_muted()),
            FeedStatus::Loaded => ("No posts available", colors.text_muted()),
            FeedStatus::Error(_) => ("", colors.text_muted()),
        };
        let empty = Paragraph::new(message)
            .style(style)
            .alignment(Alignment::Center);
        frame.render_widget(empty, list_area);
        return;
    }

    let width = usize::from(list_area.width.saturating_sub(4));
    let can_manage = state.can_manage_posts();
    let items: Vec<ListItem> = posts
        .iter()
        .enumerate()
        .map(|(i, post)| post_item(post, i == state.selected_post, can_manage, width, colors))
        .collect();

    let list = List::new(items)
        .highlight_style(colors.selected())
        .highlight_symbol("▌ ");

    let mut list_state = ListState::default().with_selected(Some(state.selected_post));
    frame.render_stateful_widget(list, list_area, &mut list_state);
}

fn post_item<'a>(
    post: &'a Post,
    selected: bool,
    can_manage: bool,
    width: usize,
    colors: &ThemeColors,
) -> ListItem<'a> {
    let badge_style = if post.is_public {
        colors.text_success()
    } else {
        colors.text_warning()
    };

    let mut header = vec![
        Span::styled(format!("User ID: {}", post.user_id), colors.text_primary()),
        Span::styled("  ", colors.text()),
        Span::styled(post.display_time(), colors.text_muted()),
    ];
    if post.is_edited() {
        header.push(Span::styled(" (edited)", colors.text_muted()));
    }
    header.push(Span::styled(
        format!("  [{}]", post.visibility_label()),
        badge_style,
    ));

    let mut lines = vec![Line::from(header)];

    let content = if selected {
        post.content.clone()
    } else {
        post.preview(width)
    };
    lines.extend(
        content
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), colors.text()))),
    );

    if let Some((media_type, url)) = post.media() {
        lines.push(Line::from(vec![
            Span::styled(format!("  📎 {media_type}: "), colors.text_muted()),
            Span::styled(url, colors.text_primary()),
        ]));
    }
    if let Some(description) = post.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(Line::from(Span::styled(
            format!("  {description}"),
            colors.text_muted().add_modifier(Modifier::ITALIC),
        )));
    }

    if selected && can_manage {
        let mut actions = vec![
            Span::styled("e", colors.key_hint()),
            Span::styled(" edit  ", colors.text_muted()),
            Span::styled("d", colors.key_hint()),
            Span::styled(" delete", colors.text_muted()),
        ];
        if post.media().is_some() {
            actions.push(Span::styled("  o", colors.key_hint()));
            actions.push(Span::styled(" open media", colors.text_muted()));
        }
        lines.push(Line::from(actions));
    }

    lines.push(Line::from(""));
    ListItem::new(lines)
}

fn render_status_bar<S: SessionStore>(
    frame: &mut Frame,
    state: &AppState<S>,
    colors: &ThemeColors,
    area: Rect,
) {
    let loading_indicator = if state.feed.is_loading() || state.form.busy {
        let frame_idx = usize::try_from(state.current_tick() / 2).unwrap_or(0) % SPINNER.len();
        format!("{} ", SPINNER[frame_idx])
    } else {
        String::new()
    };

    let content = if state.status.is_empty() {
        let mut spans = vec![
            Span::styled(" ", Style::default()),
            Span::styled(loading_indicator, colors.text_muted()),
            Span::styled("r", colors.key_hint()),
            Span::styled(": refresh  ", colors.text_muted()),
        ];
        if state.can_manage_posts() {
            spans.push(Span::styled("n", colors.key_hint()));
            spans.push(Span::styled(": new post  ", colors.text_muted()));
            spans.push(Span::styled("p", colors.key_hint()));
            spans.push(Span::styled(": password  ", colors.text_muted()));
        }
        spans.extend([
            Span::styled("?", colors.key_hint()),
            Span::styled(": help  ", colors.text_muted()),
            Span::styled("q", colors.key_hint()),
            Span::styled(": quit", colors.text_muted()),
        ]);
        spans
    } else {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled(loading_indicator, colors.text_muted()),
            Span::styled(state.status.as_str(), colors.text()),
        ]
    };

    let status =
        Paragraph::new(Line::from(content)).style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(status, area);
}

fn help_line<'a>(keys: &'a str, action: &'a str, colors: &ThemeColors) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {keys:<17}"), colors.key_hint()),
        Span::styled(action, colors.text()),
    ])
}

fn render_help_popup(frame: &mut Frame, colors: &ThemeColors) {
    let popup_area = centered_rect(50, 70, frame.area());

    let bg_block = Block::default().style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            colors.text_primary().add_modifier(Modifier::BOLD),
        ))
    };

    let help_content = vec![
        Line::from(""),
        heading("  Navigation"),
        help_line("j/k or ↑/↓", "Move between posts", colors),
        help_line("g/G", "First/last post", colors),
        help_line("r", "Refresh feed", colors),
        help_line("o", "Open attached media", colors),
        Line::from(""),
        heading("  Posts (logged in)"),
        help_line("n", "New post", colors),
        help_line("e", "Edit selected post", colors),
        help_line("d", "Delete selected post", colors),
        Line::from(""),
        heading("  Account"),
        help_line("a", "Login / Sign Up", colors),
        help_line("p", "Change password", colors),
        help_line("L", "Logout", colors),
        help_line("t", "Toggle light/dark theme", colors),
        Line::from(""),
        heading("  Forms"),
        help_line("Tab/Shift+Tab", "Next/previous field", colors),
        help_line("←/→ or Space", "Change a choice", colors),
        help_line("Ctrl+S", "Switch Login / Sign Up", colors),
        help_line("Enter", "Submit", colors),
        help_line("Esc", "Cancel", colors),
        Line::from(""),
        help_line("q", "Quit", colors),
    ];

    let help = Paragraph::new(help_content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors.block_focus())
            .title(" Help ")
            .title_style(colors.brand()),
    );

    frame.render_widget(help, popup_area);
}

fn form_lines<'a>(form: &'a Form, colors: &ThemeColors) -> Vec<Line<'a>> {
    let mut lines = vec![Line::from("")];

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            colors.text_primary().add_modifier(Modifier::BOLD)
        } else {
            colors.text_muted()
        };
        let marker = if focused { "▸ " } else { "  " };

        let mut value = field.display();
        if focused && matches!(field.value, FieldValue::Text(_) | FieldValue::Secret(_)) {
            value.push('▏');
        }

        lines.push(Line::from(vec![
            Span::styled(marker, colors.text_primary()),
            Span::styled(format!("{}: ", field.label), label_style),
            Span::styled(value, colors.text()),
        ]));
        lines.push(Line::from(""));
    }

    match &form.message {
        Some(FormMessage::Error(message)) => {
            lines.push(Line::from(Span::styled(
                format!("  ✗ {message}"),
                colors.text_error(),
            )));
        }
        Some(FormMessage::Info(message)) => {
            lines.push(Line::from(Span::styled(
                format!("  ✓ {message}"),
                colors.text_success(),
            )));
        }
        None if form.busy => {
            lines.push(Line::from(Span::styled("  Working...", colors.text_muted())));
        }
        None => {}
    }

    lines
}

fn render_auth_popup(frame: &mut Frame, form: &Form, tab: AuthTab, colors: &ThemeColors) {
    let popup_area = centered_rect(50, 50, frame.area());

    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let (login_style, signup_style) = match tab {
        AuthTab::Login => (colors.selected(), colors.text_muted()),
        AuthTab::Signup => (colors.text_muted(), colors.selected()),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled("  ", colors.text()),
        Span::styled(" Login ", login_style),
        Span::styled("  ", colors.text()),
        Span::styled(" Sign Up ", signup_style),
        Span::styled("   Ctrl+S", colors.key_hint()),
        Span::styled(" switch", colors.text_muted()),
    ])];
    lines.extend(form_lines(form, colors));

    let popup = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors.block_focus())
            .title(format!(" {BRAND} "))
            .title_style(colors.brand()),
    );
    frame.render_widget(popup, popup_area);
}

fn render_form_popup(
    frame: &mut Frame,
    form: &Form,
    title: &str,
    percent_x: u16,
    percent_y: u16,
    colors: &ThemeColors,
) {
    let popup_area = centered_rect(percent_x, percent_y, frame.area());

    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let mut lines = form_lines(form, colors);
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Enter", colors.key_hint()),
        Span::styled(" submit  ", colors.text_muted()),
        Span::styled("Esc", colors.key_hint()),
        Span::styled(" cancel", colors.text_muted()),
    ]));

    let popup = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors.block_focus())
            .title(title.to_string())
            .title_style(colors.brand()),
    );
    frame.render_widget(popup, popup_area);
}

fn render_confirm_delete(frame: &mut Frame, pending: PendingDelete, colors: &ThemeColors) {
    let popup_area = centered_rect(40, 20, frame.area());

    let bg_block = Block::default().style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(PendingDelete::PROMPT, colors.text())),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", colors.key_hint()),
            Span::styled(" yes   ", colors.text_muted()),
            Span::styled("n", colors.key_hint()),
            Span::styled(" no", colors.text_muted()),
        ]),
    ];

    let dialog = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(colors.error))
                .title(format!(" Delete post #{} ", pending.id()))
                .title_style(colors.text_error()),
        );
    frame.render_widget(dialog, popup_area);
}

/// Helper function to create a centered rect
const fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_width = r.width * percent_x / 100;
    let popup_height = r.height * percent_y / 100;
    Rect {
        x: r.x + (r.width.saturating_sub(popup_width)) / 2,
        y: r.y + (r.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::{MemoryStore, Session};
    use ratatui::{Terminal, backend::TestBackend};

    fn draw(state: &AppState<MemoryStore>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, state)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_anonymous_navbar() {
        let state = AppState::new(Config::default(), Session::restore(MemoryStore::new()));
        let screen = draw(&state);
        assert!(screen.contains("Login / Sign Up"));
        assert!(screen.contains("Public Posts"));
        assert!(screen.contains("Loading posts..."));
    }

    #[test]
    fn test_logged_in_navbar() {
        let mut state = AppState::new(Config::default(), Session::restore(MemoryStore::new()));
        state.session.login("alice", Some("jwt"));
        state.refresh_feed();
        let screen = draw(&state);
        assert!(screen.contains("Profile (alice)"));
        assert!(screen.contains("Posts Feed"));
    }

    #[test]
    fn test_centered_rect() {
        let r = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(r, Rect::new(25, 10, 50, 20));
    }
}

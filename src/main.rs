//! Nutz - a terminal client for the Nutz social posting service
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tokio::runtime::Runtime;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use nutz::actions::{self, Mutation, PendingDelete, PostInput};
use nutz::{ApiClient, Config, Database, FeedScope, FeedState, MediaType, Session};

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Parse CLI arguments
    match parse_args()? {
        Command::Run => nutz::app::run(),
        Command::Login { username } => login_cli(&username),
        Command::Register { username, email } => register_cli(&username, &email),
        Command::Logout => logout_cli(),
        Command::Whoami => whoami_cli(),
        Command::Passwd => passwd_cli(),
        Command::Feed { scope } => feed_cli(scope),
        Command::Post(input) => mutate_cli(|| Mutation::create(&input)),
        Command::Edit { id, input } => mutate_cli(|| Mutation::update(id, &input)),
        Command::Delete { id, yes } => delete_cli(id, yes),
        Command::Theme { toggle } => theme_cli(toggle),
        Command::Config { server, page_size } => config_cli(server, page_size),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
    }
}

/// CLI commands
enum Command {
    Run,
    Login { username: String },
    Register { username: String, email: String },
    Logout,
    Whoami,
    Passwd,
    Feed { scope: Option<FeedScope> },
    Post(PostInput),
    Edit { id: i64, input: PostInput },
    Delete { id: i64, yes: bool },
    Theme { toggle: bool },
    Config {
        server: Option<String>,
        page_size: Option<u32>,
    },
    Help,
    Version,
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() == 1 {
        return Ok(Command::Run);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" | "version" => Ok(Command::Version),

        "login" => {
            let username = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing username"))?
                .clone();
            Ok(Command::Login { username })
        }

        "register" | "signup" => {
            let username = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing username"))?
                .clone();
            let email = args
                .get(3)
                .ok_or_else(|| anyhow::anyhow!("Missing email"))?
                .clone();
            Ok(Command::Register { username, email })
        }

        "logout" => Ok(Command::Logout),
        "whoami" => Ok(Command::Whoami),
        "passwd" => Ok(Command::Passwd),

        "feed" => {
            let scope = if has_flag(&args, "--public") {
                Some(FeedScope::Public)
            } else if has_flag(&args, "--mine") {
                Some(FeedScope::Mine)
            } else {
                None
            };
            Ok(Command::Feed { scope })
        }

        "post" => {
            let content = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing post content"))?
                .clone();
            Ok(Command::Post(parse_post_input(content, &args[3..])?))
        }

        "edit" => {
            let id = parse_id(args.get(2))?;
            let content = args
                .get(3)
                .ok_or_else(|| anyhow::anyhow!("Missing post content"))?
                .clone();
            Ok(Command::Edit {
                id,
                input: parse_post_input(content, &args[4..])?,
            })
        }

        "delete" | "rm" => {
            let id = parse_id(args.get(2))?;
            let yes = has_flag(&args, "--yes") || has_flag(&args, "-y");
            Ok(Command::Delete { id, yes })
        }

        "theme" => Ok(Command::Theme {
            toggle: args.get(2).is_some_and(|a| a == "toggle"),
        }),

        "config" => {
            let mut server = None;
            let mut page_size = None;
            let rest = &args[2..];
            let mut i = 0;
            while i < rest.len() {
                match (rest[i].as_str(), rest.get(i + 1)) {
                    ("--server", Some(url)) => server = Some(url.clone()),
                    ("--page-size", Some(size)) => {
                        let size: u32 = size
                            .parse()
                            .map_err(|_| anyhow::anyhow!("Invalid page size: {size}"))?;
                        if size == 0 {
                            bail!("Page size must be at least 1");
                        }
                        page_size = Some(size);
                    }
                    (flag, _) => bail!("Unexpected argument: {flag}"),
                }
                i += 2;
            }
            Ok(Command::Config { server, page_size })
        }

        other => Err(anyhow::anyhow!(
            "Unknown command: {other}\nRun 'nutz --help' for usage"
        )),
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_id(arg: Option<&String>) -> Result<i64> {
    let arg = arg.ok_or_else(|| anyhow::anyhow!("Missing post id"))?;
    arg.parse()
        .map_err(|_| anyhow::anyhow!("Invalid post id: {arg}"))
}

/// Parse `[--private] [--media <path>] [--type image|video] [--description <text>]`
fn parse_post_input(content: String, rest: &[String]) -> Result<PostInput> {
    let mut input = PostInput {
        content,
        ..PostInput::default()
    };

    let mut i = 0;
    while i < rest.len() {
        let value = rest.get(i + 1);
        match (rest[i].as_str(), value) {
            ("--private", _) => {
                input.is_public = false;
                i += 1;
                continue;
            }
            ("--public", _) => {
                input.is_public = true;
                i += 1;
                continue;
            }
            ("--media" | "-m", Some(path)) => input.media_path = Some(PathBuf::from(path)),
            ("--type", Some(kind)) => {
                input.media_type = MediaType::from_str(kind)
                    .ok_or_else(|| anyhow::anyhow!("Unknown media type: {kind}"))?;
            }
            ("--description" | "-d", Some(text)) => input.description.clone_from(text),
            (flag, _) => bail!("Unexpected argument: {flag}"),
        }
        i += 2;
    }

    // A file without an explicit type is most likely an image
    if input.media_path.is_some() && input.media_type == MediaType::None {
        input.media_type = MediaType::Image;
    }

    Ok(input)
}

fn print_help() {
    let config_path = nutz::Config::default_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"Nutz - a terminal client for the Nutz social posting service

USAGE:
    nutz                               Launch TUI
    nutz [COMMAND]

COMMANDS:
    login <username>                   Log in (password is not echoed)
    register <username> <email>        Create an account
    logout                             Forget the stored login
    whoami                             Show the logged-in user
    passwd                             Change your password

    feed [--public | --mine]           Show posts (your feed when logged in)

    post <content> [OPTIONS]           Create a post
    edit <id> <content> [OPTIONS]      Edit a post
      Options:
        --private                      Only visible to you
        -m, --media <path>             Attach a file
        --type <image|video>           Attachment type (default: image)
        -d, --description <text>       Attachment description
      Examples:
        nutz post "Hello world!"
        nutz post "Look" --media cat.png --description "my cat"

    delete <id> [-y, --yes]            Delete a post (asks first)

    theme [toggle]                     Show or toggle light/dark
    config [--server <url>] [--page-size <n>]
                                       Show or change settings

OPTIONS:
    -h, --help                         Show this help message
    -v, --version                      Show version information

KEYBINDINGS (TUI):
    j/k, g/G      Move, jump to top/bottom
    r             Refresh
    a             Login / Sign Up
    n / e / d     New, edit, delete post
    p             Change password
    L             Logout
    t             Toggle theme
    ?             Help

CONFIG:
    {}
"#,
        config_path
    );
}

fn print_version() {
    println!("nutz {}", nutz::VERSION);
}

/// Everything a one-shot command needs
fn open_session() -> Result<(Config, ApiClient, Session<Database>)> {
    let config = Config::load()?;
    let api = ApiClient::from_config(&config);
    let session = Session::restore(Database::open()?);
    Ok((config, api, session))
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Read a password without echoing it. Falls back to a plain line read
/// when stdin is not a terminal.
fn prompt_password(label: &str) -> Result<String> {
    use std::io::IsTerminal;

    if !std::io::stdin().is_terminal() {
        return prompt(label);
    }

    print!("{label}");
    std::io::stdout().flush()?;

    terminal::enable_raw_mode()?;
    let result = read_password();
    terminal::disable_raw_mode()?;
    println!();

    match result? {
        Some(password) => Ok(password),
        None => bail!("Cancelled"),
    }
}

fn read_password() -> Result<Option<String>> {
    let mut buf = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match apply_password_key(&mut buf, key) {
                PasswordInput::Pending => {}
                PasswordInput::Done => return Ok(Some(buf)),
                PasswordInput::Cancelled => return Ok(None),
            }
        }
    }
}

/// Outcome of one key press while reading a password
#[derive(Debug, PartialEq, Eq)]
enum PasswordInput {
    Pending,
    Done,
    Cancelled,
}

fn apply_password_key(buf: &mut String, key: KeyEvent) -> PasswordInput {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            PasswordInput::Cancelled
        }
        KeyCode::Esc => PasswordInput::Cancelled,
        KeyCode::Enter => PasswordInput::Done,
        KeyCode::Backspace => {
            buf.pop();
            PasswordInput::Pending
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            buf.push(c);
            PasswordInput::Pending
        }
        _ => PasswordInput::Pending,
    }
}

fn require_login(session: &Session<Database>) -> Result<()> {
    if !session.is_authenticated() {
        bail!("Not logged in. Run: nutz login <username>");
    }
    Ok(())
}

fn login_cli(username: &str) -> Result<()> {
    let (_, api, mut session) = open_session()?;
    let password = prompt_password("Password: ")?;

    let rt = Runtime::new()?;
    match rt.block_on(actions::login(&api, username, &password)) {
        Ok(success) => {
            session.login(&success.username, success.token.as_deref());
            println!("✓ Login successful! Logged in as {}", session.username());
            Ok(())
        }
        Err(message) => bail!(message),
    }
}

fn register_cli(username: &str, email: &str) -> Result<()> {
    let (_, api, _) = open_session()?;
    let password = prompt_password("Password: ")?;

    let rt = Runtime::new()?;
    match rt.block_on(actions::register(&api, username, email, &password)) {
        Ok(message) => {
            println!("✓ {message}");
            println!("Log in with: nutz login {username}");
            Ok(())
        }
        Err(message) => bail!(message),
    }
}

fn logout_cli() -> Result<()> {
    let (_, _, mut session) = open_session()?;
    session.logout();
    println!("✓ Logged out");
    Ok(())
}

fn whoami_cli() -> Result<()> {
    let (_, api, session) = open_session()?;
    if session.is_authenticated() {
        println!("{}", session.username());
    } else {
        println!("Not logged in");
    }
    println!("Server: {}", api.base_url());
    Ok(())
}

fn passwd_cli() -> Result<()> {
    let (_, api, session) = open_session()?;
    require_login(&session)?;

    let current = prompt_password("Current password: ")?;
    let new = prompt_password("New password: ")?;

    let rt = Runtime::new()?;
    let result = rt.block_on(actions::change_password(
        &api,
        session.token().as_deref(),
        session.username(),
        &current,
        &new,
    ));
    match result {
        Ok(message) => {
            println!("✓ {message}");
            Ok(())
        }
        Err(message) => bail!(message),
    }
}

fn feed_cli(scope: Option<FeedScope>) -> Result<()> {
    let (config, api, session) = open_session()?;
    let scope = scope.unwrap_or_else(|| FeedScope::for_auth(session.is_authenticated()));
    if scope.requires_auth() {
        require_login(&session)?;
    }

    let mut feed = FeedState::new();
    let request = feed.begin_scoped(scope, session.is_authenticated(), session.username());

    let rt = Runtime::new()?;
    let result = rt.block_on(actions::fetch_feed(
        &api,
        request,
        session.token().as_deref(),
        config.page_size,
    ));
    feed.apply(request.seq, result);

    if let Some(error) = feed.error() {
        bail!(error.to_string());
    }

    println!("\n{}", scope.title());
    println!("{}", "─".repeat(60));

    if feed.posts().is_empty() {
        println!("No posts available");
        return Ok(());
    }

    for post in feed.posts() {
        let edited = if post.is_edited() { " (edited)" } else { "" };
        println!(
            "\n#{} · User ID: {} · {}{} · {}",
            post.id,
            post.user_id,
            post.display_time(),
            edited,
            post.visibility_label()
        );
        println!("{}", post.content);
        if let Some((media_type, url)) = post.media() {
            println!("📎 {media_type}: {url}");
        }
        if let Some(description) = post.description.as_deref().filter(|d| !d.is_empty()) {
            println!("   {description}");
        }
    }

    Ok(())
}

fn mutate_cli<F>(build: F) -> Result<()>
where
    F: FnOnce() -> Result<Mutation, actions::ValidationError>,
{
    let (_, api, session) = open_session()?;
    require_login(&session)?;

    // Validation runs before anything is sent
    let mutation = build()?;
    send_mutation(&api, &session, &mutation)
}

fn send_mutation(api: &ApiClient, session: &Session<Database>, mutation: &Mutation) -> Result<()> {
    let rt = Runtime::new()?;
    match rt.block_on(actions::run_mutation(
        api,
        session.token().as_deref(),
        mutation,
    )) {
        Ok(()) => {
            println!("✓ {}", mutation.done_label());
            Ok(())
        }
        Err(message) => bail!(message),
    }
}

fn delete_cli(id: i64, yes: bool) -> Result<()> {
    let (_, api, session) = open_session()?;
    require_login(&session)?;

    let pending = PendingDelete::new(id);
    let confirmed = yes || {
        let answer = prompt(&format!("{} [y/N] ", PendingDelete::PROMPT))?;
        matches!(answer.trim(), "y" | "Y" | "yes")
    };

    let Some(mutation) = (if confirmed {
        Some(pending.confirm())
    } else {
        pending.decline()
    }) else {
        println!("Cancelled");
        return Ok(());
    };

    send_mutation(&api, &session, &mutation)
}

fn theme_cli(toggle: bool) -> Result<()> {
    let (_, _, mut session) = open_session()?;
    let theme = if toggle {
        session.toggle_theme()
    } else {
        session.theme().theme()
    };
    println!("{} {}", theme.toggle_icon(), theme);
    Ok(())
}

fn config_cli(server: Option<String>, page_size: Option<u32>) -> Result<()> {
    let mut config = Config::load()?;
    let changed = server.is_some() || page_size.is_some();

    if let Some(server) = server {
        config.api_base_url = server.trim_end_matches('/').to_string();
    }
    if let Some(page_size) = page_size {
        config.page_size = page_size;
    }
    if changed {
        config.save()?;
        println!("✓ Config saved");
    }

    println!("Server:    {}", config.api_base_url);
    println!("Page size: {}", config.page_size);
    println!("File:      {}", Config::default_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_password_keys_edit_buffer() {
        let mut buf = String::new();
        for c in "hunter3".chars() {
            assert_eq!(apply_password_key(&mut buf, key(KeyCode::Char(c))), PasswordInput::Pending);
        }
        apply_password_key(&mut buf, key(KeyCode::Backspace));
        apply_password_key(&mut buf, key(KeyCode::Char('2')));

        assert_eq!(apply_password_key(&mut buf, key(KeyCode::Enter)), PasswordInput::Done);
        assert_eq!(buf, "hunter2");
    }

    #[test]
    fn test_password_ctrl_c_cancels() {
        let mut buf = String::from("secret");
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(apply_password_key(&mut buf, ctrl_c), PasswordInput::Cancelled);
        assert_eq!(apply_password_key(&mut buf, key(KeyCode::Esc)), PasswordInput::Cancelled);
    }
}

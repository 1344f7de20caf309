mod app;
mod avatar_cache;
mod config;
mod error;
mod event;
mod github;
mod kitty_protocol;
mod selection;
mod terminal_graphics;
#[cfg(test)]
mod test_utils;
mod ui;

use app::{App, Command};
use clap::Parser;
use config::{Config, Overrides};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use event::AppEvent;
use futures::StreamExt;
use github::client::GitHubClient;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use ui::toast::NotifyLevel;

#[derive(Parser)]
#[command(name = "roster", about = "TUI browser for a GitHub organization's repositories")]
struct Cli {
    #[arg(long, help = "GitHub organization to list")]
    org: Option<String>,
    #[arg(long, help = "Repositories requested per page (1-100)")]
    per_page: Option<u8>,
    #[arg(long, help = "Base URL of the GitHub REST API")]
    api_base: Option<String>,
    #[arg(long, help = "Draw initials instead of avatar images")]
    no_avatars: bool,
    #[arg(long, help = "Write logs to this file")]
    log_file: Option<PathBuf>,
    #[arg(long, help = "Print the effective configuration as TOML and exit")]
    print_config: bool,
}

/// File logging; the terminal belongs to the UI. The guard must live until
/// exit so buffered lines are flushed.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let path = config.resolved_log_file();
    let dir = path.parent()?;
    let file_name = path.file_name()?;
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("Warning: cannot create log directory {}: {e}", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env("ROSTER_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(Overrides {
        org: cli.org,
        api_base: cli.api_base,
        per_page: cli.per_page,
        no_avatars: cli.no_avatars,
        log_file: cli.log_file,
    });
    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }
    let _log_guard = init_tracing(&config);

    let client = GitHubClient::new(&config)?;
    tracing::info!(org = %config.org, url = %config.repos_url(), "starting");

    // Cell size is queried before raw mode so the ioctl sees a sane tty
    let graphics = terminal_graphics::detect_graphics_cap();
    let mut app = App::new(config, graphics);

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    let repos_tx = tx.clone();
    let repos_client = client.clone();
    tokio::spawn(async move {
        let result = repos_client.fetch_repos().await;
        let _ = repos_tx.send(AppEvent::ReposLoaded(result));
    });

    let input_tx = tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            let app_event = match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
                Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
                Event::Resize(_, _) => Some(AppEvent::Resize),
                _ => None,
            };
            if let Some(e) = app_event {
                if input_tx.send(e).is_err() {
                    break;
                }
            }
        }
    });

    let tick_tx = tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            if tick_tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    loop {
        if app.avatars.take_dirty() && app.graphics.is_kitty() {
            let backend = terminal.backend_mut();
            backend.write_all(kitty_protocol::delete_all_images().as_bytes())?;
            backend.flush()?;
            terminal.clear()?;
        }
        terminal.draw(|f| app.render(f))?;

        let first = match rx.recv().await {
            Some(e) => e,
            None => break,
        };
        app.handle_event(first);
        while let Ok(pending) = rx.try_recv() {
            app.handle_event(pending);
        }

        for command in app.take_commands() {
            run_command(&mut app, command, &client, &tx);
        }

        if app.should_quit {
            break;
        }
    }

    if app.graphics.is_kitty() {
        let _ = terminal
            .backend_mut()
            .write_all(kitty_protocol::delete_all_images().as_bytes());
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    tracing::info!("exiting");

    Ok(())
}

fn run_command(
    app: &mut App,
    command: Command,
    client: &GitHubClient,
    tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match command {
        Command::FetchContributors(request) => {
            let tx = tx.clone();
            let client = client.clone();
            tokio::spawn(async move {
                let result = client.fetch_contributors(&request.url).await;
                let _ = tx.send(AppEvent::ContributorsLoaded {
                    token: request.token,
                    result,
                });
            });
        }
        Command::FetchAvatar(url) => {
            let tx = tx.clone();
            let client = client.clone();
            tokio::spawn(async move {
                let png = match client.fetch_avatar(&url).await {
                    Ok(bytes) => {
                        avatar_cache::thumbnail_png(&bytes, avatar_cache::THUMBNAIL_PX)
                    }
                    Err(e) => {
                        tracing::debug!(url = %url, error = %e, "avatar fetch failed");
                        None
                    }
                };
                let _ = tx.send(AppEvent::AvatarLoaded { url, png });
            });
        }
        Command::Open(url) => {
            tracing::info!(url = %url, "opening in browser");
            match open::that_detached(&url) {
                Ok(()) => app.notify(format!("Opened {url}"), NotifyLevel::Info),
                Err(e) => {
                    let err = error::RosterError::Browser {
                        url,
                        reason: e.to_string(),
                    };
                    tracing::warn!(error = %err, "open failed");
                    app.notify(err.to_string(), NotifyLevel::Error);
                }
            }
        }
    }
}

//! # faq-tui
//!
//! A terminal front end for the FAQ answer service: pick an application, ask a
//! question, read the matching answers.

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use faq_assistant_tui::app_core::dispatch::Dispatcher;
use faq_assistant_tui::app_core::input::{AppKeyCode, AppKeyEvent, AppMouseEvent, AppMouseKind};
use faq_assistant_tui::app_core::reducer;
use faq_assistant_tui::app_core::state::{AppAction, AppState};
use faq_assistant_tui::backend::HttpBackend;
use faq_assistant_tui::config::{self, Config, Overrides};
use faq_assistant_tui::{logging, ui};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info};

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "FAQ-TUI: ask questions about common SaaS applications and browse the matching FAQ answers."
)]
struct Args {
    /// Base URL of the FAQ answer service
    #[arg(short, long, env = "FAQ_BASE_URL")]
    base_url: Option<String>,

    /// UI theme (dracula, solarized, gruvbox, everforest_light)
    #[arg(short, long)]
    theme: Option<String>,

    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show all paths used by the application (config, data, log)
    #[arg(long)]
    paths: bool,
}

// ---------------------------------------------------------------------------
// Crossterm → shared-reducer adapters
// ---------------------------------------------------------------------------

fn crossterm_to_app_key_event(
    code: KeyCode,
    modifiers: KeyModifiers,
    kind: KeyEventKind,
) -> Option<AppKeyEvent> {
    if matches!(kind, KeyEventKind::Release) {
        return None;
    }

    let key_code = match code {
        KeyCode::Char(c) => AppKeyCode::Char(c),
        KeyCode::Backspace => AppKeyCode::Backspace,
        KeyCode::Delete => AppKeyCode::Delete,
        KeyCode::Enter => AppKeyCode::Enter,
        KeyCode::Esc => AppKeyCode::Esc,
        KeyCode::Up => AppKeyCode::Up,
        KeyCode::Down => AppKeyCode::Down,
        KeyCode::Left => AppKeyCode::Left,
        KeyCode::Right => AppKeyCode::Right,
        KeyCode::Home => AppKeyCode::Home,
        KeyCode::End => AppKeyCode::End,
        KeyCode::PageUp => AppKeyCode::PageUp,
        KeyCode::PageDown => AppKeyCode::PageDown,
        KeyCode::Tab => AppKeyCode::Tab,
        KeyCode::BackTab => AppKeyCode::BackTab,
        KeyCode::F(1) => AppKeyCode::F1,
        _ => return None,
    };

    Some(AppKeyEvent {
        code: key_code,
        ctrl: modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER),
        alt: modifiers.contains(KeyModifiers::ALT),
        shift: modifiers.contains(KeyModifiers::SHIFT),
        is_release: false,
    })
}

fn crossterm_to_app_mouse_event(mouse: &event::MouseEvent) -> Option<AppMouseEvent> {
    let kind = match mouse.kind {
        MouseEventKind::Down(event::MouseButton::Left) => AppMouseKind::LeftDown,
        MouseEventKind::ScrollUp => AppMouseKind::ScrollUp,
        MouseEventKind::ScrollDown => AppMouseKind::ScrollDown,
        _ => return None,
    };
    Some(AppMouseEvent {
        kind,
        column: mouse.column,
        row: mouse.row,
    })
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let args = Args::parse();
    let app_version = format!("v{}", env!("CARGO_PKG_VERSION"));

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };
    let data_dir = config::get_data_dir()?;
    let log_path = logging::log_path(&data_dir);

    if args.paths {
        println!("App Paths:");
        println!("  Config: {}", config_path.display());
        println!("  Data:   {}", data_dir.display());
        println!("  Log:    {}", log_path.display());
        return Ok(());
    }

    let file_config = config::load_file(&config_path)?;
    let config = Config::resolve(
        file_config,
        Overrides {
            base_url: args.base_url.clone(),
            theme: args.theme.clone(),
        },
    )?;

    logging::init(&log_path)?;
    info!(base_url = %config.base_url, theme = ?config.theme, "starting {}", app_version);

    let backend = HttpBackend::new(config.base_url.clone())?;
    let dispatcher = Dispatcher::new(Arc::new(backend));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = AppState::new(
        config.theme.config(),
        config.base_url.to_string(),
        app_version,
    );

    let res = run_app(&mut terminal, &mut app, &dispatcher);

    // In-flight lookups must not reach state after the UI is gone.
    dispatcher.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!("exiting with error: {:#}", err);
    }
    info!("shutdown complete");
    res
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    dispatcher: &Dispatcher,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    terminal.draw(|f| ui::ui(f, app))?;

    loop {
        if app.should_quit {
            break;
        }

        let mut dirty = false;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(event) = crossterm_to_app_key_event(key.code, key.modifiers, key.kind)
                    {
                        reducer::handle_key_event(app, event);
                        dirty = true;
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(event) = crossterm_to_app_mouse_event(&mouse) {
                        dirty |= reducer::handle_mouse_event(app, event);
                    }
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }

        if let Some(action) = app.pending_action.take() {
            handle_action(dispatcher, action);
            dirty = true;
        }

        while let Some(completion) = dispatcher.try_recv() {
            dirty |= app.apply_completion(completion);
        }

        if dirty {
            terminal.draw(|f| ui::ui(f, app))?;
        }
    }
    Ok(())
}

fn handle_action(dispatcher: &Dispatcher, action: AppAction) {
    match action {
        AppAction::Submit(request) => dispatcher.dispatch(request),
    }
}

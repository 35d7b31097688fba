//! TagDeck TUI entry point.

use chrono::Utc;
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tagdeck_tui::api_client::TagClient;
use tagdeck_tui::config::TuiConfig;
use tagdeck_tui::controller::TagController;
use tagdeck_tui::error::TuiError;
use tagdeck_tui::events::TuiEvent;
use tagdeck_tui::persistence;
use tagdeck_tui::state::{App, Command};
use tagdeck_tui::tasks::spawn_command;
use tagdeck_tui::telemetry;
use tagdeck_tui::views::render_view;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    telemetry::init_tracing(&config.error_log_path)?;
    info!(base_url = %config.api_base_url, "starting tagdeck");

    let transport = TagClient::new(&config)?;
    let controller = TagController::new(Arc::new(transport), &config.query);
    let mut app = App::new(config, controller);

    let restored = match persistence::load(&app.config.persistence_path) {
        Ok(state) => state,
        Err(err) => {
            warn!(error = %err, "ignoring unreadable persisted state");
            None
        }
    };

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    spawn_input_reader(event_tx.clone());
    for command in app.startup(restored) {
        spawn_command(&app.controller, command, event_tx.clone());
    }

    let mut ticker = tokio::time::interval(app.config.refresh_interval());

    loop {
        terminal.draw(|f| render_view(f, &mut app))?;

        tokio::select! {
            _ = ticker.tick() => {
                handle_event(&mut app, TuiEvent::Tick, &event_tx);
            }
            Some(event) = event_rx.recv() => {
                handle_event(&mut app, event, &event_tx);
            }
        }
        if app.should_quit {
            break;
        }
    }

    if let Err(err) = persistence::save(&app.config.persistence_path, &app.persisted_state()) {
        warn!(error = %err, "failed to persist UI state");
    }
    info!("tagdeck stopped");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, DisableFocusChange, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let event = match evt {
                    CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => {
                        TuiEvent::Input(key)
                    }
                    CrosstermEvent::Resize(width, height) => TuiEvent::Resize { width, height },
                    CrosstermEvent::FocusGained => TuiEvent::FocusGained,
                    _ => continue,
                };
                if sender.blocking_send(event).is_err() {
                    return;
                }
            }
        }
    });
}

fn handle_event(app: &mut App, event: TuiEvent, sender: &mpsc::Sender<TuiEvent>) {
    let command = match event {
        TuiEvent::Input(key) => app.handle_key(key),
        TuiEvent::Tick => app.on_tick(Utc::now()),
        TuiEvent::FocusGained => app.on_focus_gained(),
        TuiEvent::MutationSettled { kind, result } => {
            app.on_mutation_settled(kind, result);
            None
        }
        TuiEvent::QueryFailed(message) => {
            app.on_query_failed(message);
            None
        }
        TuiEvent::Resize { .. } => None,
    };
    if let Some(command) = command {
        dispatch(app, command, sender);
    }
}

fn dispatch(app: &App, command: Command, sender: &mpsc::Sender<TuiEvent>) {
    debug!(?command, "dispatching");
    spawn_command(&app.controller, command, sender.clone());
}

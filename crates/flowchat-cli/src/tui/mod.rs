//! Two-thread TUI orchestration.
//!
//! Terminal I/O runs on a dedicated OS thread; relay calls run as tokio tasks.
//! Both report back to the main `select!` loop over `tokio::sync::mpsc`
//! channels.

mod input;

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use flowchat_core::{RelayEnvelope, RelayRequest};

use crate::app::ChatSession;
use crate::relay::{RelayClient, RelayClientError};
use crate::ui;

pub use input::handle_term_event;

/// Terminal events forwarded from the UI reader thread.
pub enum TermEvent {
    Key(crossterm::event::KeyEvent),
    Resize(u16, u16),
}

type RelayResult = Result<RelayEnvelope, RelayClientError>;

/// Run the interactive TUI until the user quits.
pub async fn run(mut session: ChatSession, client: RelayClient) -> anyhow::Result<()> {
    // 1. Enter raw mode, create terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 2. Channels + cancellation token
    let cancel = CancellationToken::new();
    let (term_tx, mut term_rx) = mpsc::channel::<TermEvent>(64);
    let (reply_tx, mut reply_rx) = mpsc::channel::<RelayResult>(4);

    // 3. Spawn dedicated OS thread for crossterm::event::read()
    let cancel_clone = cancel.clone();
    let ui_thread = std::thread::spawn(move || {
        loop {
            if cancel_clone.is_cancelled() {
                break;
            }
            // Poll with 50ms timeout so we can check cancellation
            if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                match event::read() {
                    Ok(Event::Key(key)) => {
                        // Filter out Release events (Windows emits Press + Release per keystroke)
                        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                            continue;
                        }
                        if term_tx.blocking_send(TermEvent::Key(key)).is_err() {
                            break;
                        }
                    }
                    Ok(Event::Resize(w, h)) => {
                        if term_tx.blocking_send(TermEvent::Resize(w, h)).is_err() {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
    });

    let mut tick = tokio::time::interval(Duration::from_millis(50));

    let result: anyhow::Result<()> = loop {
        tokio::select! {
            _ = tick.tick() => {
                if let Err(e) = terminal.draw(|f| ui::draw(f, &mut session)) {
                    break Err(e.into());
                }
            }
            Some(term_event) = term_rx.recv() => {
                if let Some(request) = handle_term_event(&mut session, term_event) {
                    dispatch(&client, &reply_tx, request);
                }
            }
            Some(reply) = reply_rx.recv() => {
                session.finish_submit(reply);
            }
        }
        if session.should_quit {
            break Ok(());
        }
    };

    // 4. Shutdown: signal UI thread to stop
    cancel.cancel();
    let _ = ui_thread.join(); // fast, <50ms due to poll timeout

    // 5. Restore terminal
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    result
}

/// Send `request` on its own task; the answer comes back on `reply_tx`.
fn dispatch(client: &RelayClient, reply_tx: &mpsc::Sender<RelayResult>, request: RelayRequest) {
    let client = client.clone();
    let reply_tx = reply_tx.clone();
    tokio::spawn(async move {
        let result = client.send(&request).await;
        if reply_tx.send(result).await.is_err() {
            debug!("Reply arrived after the TUI exited");
        }
    });
}

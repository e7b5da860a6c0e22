//! Terminal session for the page.
//!
//! [`Tui`] owns the ratatui terminal and the terminal modes the page needs
//! (raw input, alternate screen, mouse reporting, bracketed paste). A
//! background task merges crossterm input with the frame and tick clocks
//! into one [`Event`] channel.

use std::io::Stdout;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseEvent,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use futures::{FutureExt, StreamExt};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// After this long the input task is aborted instead of awaited.
const ABORT_AFTER: Duration = Duration::from_millis(500);
const GIVE_UP_AFTER: Duration = Duration::from_secs(2);

pub type Backend = CrosstermBackend<Stdout>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Init,
    Quit,
    Error(String),
    /// Advances the page's deferred work.
    Tick,
    Render,
    Paste(String),
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

/// Events per second for the two clocks.
#[derive(Clone, Copy, Debug)]
struct Rates {
    frame: f64,
    tick: f64,
}

pub struct Tui {
    terminal: Terminal<Backend>,
    rates: Rates,
    input: JoinHandle<()>,
    shutdown: CancellationToken,
    events: UnboundedReceiver<Event>,
    sender: UnboundedSender<Event>,
}

impl Tui {
    pub fn new(frame_rate: f64, tick_rate: f64) -> color_eyre::Result<Self> {
        let (sender, events) = mpsc::unbounded_channel();
        Ok(Self {
            terminal: Terminal::new(Backend::new(std::io::stdout()))?,
            rates: Rates {
                frame: frame_rate,
                tick: tick_rate,
            },
            input: tokio::spawn(async {}),
            shutdown: CancellationToken::new(),
            events,
            sender,
        })
    }

    /// Switches the terminal into the page's modes and starts reading input.
    pub fn enter(&mut self) -> color_eyre::Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        execute!(
            std::io::stdout(),
            EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;

        self.shutdown.cancel();
        self.shutdown = CancellationToken::new();
        self.input = tokio::spawn(pump(self.sender.clone(), self.shutdown.clone(), self.rates));
        Ok(())
    }

    /// Stops reading input and restores the terminal.
    pub fn exit(&mut self) -> color_eyre::Result<()> {
        self.stop_input()?;
        if crossterm::terminal::is_raw_mode_enabled()? {
            self.flush()?;
            execute!(
                std::io::stdout(),
                DisableBracketedPaste,
                DisableMouseCapture,
                LeaveAlternateScreen,
                cursor::Show
            )?;
            crossterm::terminal::disable_raw_mode()?;
        }
        Ok(())
    }

    /// Hands the terminal back to the shell (ctrl+z).
    pub fn suspend(&mut self) -> color_eyre::Result<()> {
        self.exit()?;
        #[cfg(not(windows))]
        signal_hook::low_level::raise(signal_hook::consts::SIGTSTP)?;
        Ok(())
    }

    pub async fn next_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    fn stop_input(&self) -> color_eyre::Result<()> {
        self.shutdown.cancel();
        let started = Instant::now();
        while !self.input.is_finished() {
            let waited = started.elapsed();
            if waited >= GIVE_UP_AFTER {
                return Err(color_eyre::eyre::eyre!("Input task did not stop"));
            }
            if waited >= ABORT_AFTER {
                self.input.abort();
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    }
}

/// Forwards terminal input and clock ticks until cancelled or the receiver
/// goes away.
async fn pump(sender: UnboundedSender<Event>, shutdown: CancellationToken, rates: Rates) {
    let mut input = EventStream::new();
    let mut ticks = interval(Duration::from_secs_f64(1.0 / rates.tick));
    let mut frames = interval(Duration::from_secs_f64(1.0 / rates.frame));

    #[cfg(unix)]
    {
        let sender = sender.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut terminate) => {
                    terminate.recv().await;
                    debug!("Received SIGTERM");
                    let _ = sender.send(Event::Quit);
                }
                Err(e) => warn!("Failed to install SIGTERM handler: {e}"),
            }
        });
    }

    if sender.send(Event::Init).is_err() {
        return;
    }

    loop {
        let event = tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticks.tick() => Event::Tick,
            _ = frames.tick() => Event::Render,
            next = input.next().fuse() => match next {
                Some(Ok(raw)) => match translate(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => Event::Error(e.to_string()),
                None => break,
            },
        };
        if sender.send(event).is_err() {
            break;
        }
    }
    shutdown.cancel();
}

/// Maps a crossterm event onto the page's events. Key releases and repeats
/// and focus changes are dropped; ctrl+c always quits.
fn translate(raw: CrosstermEvent) -> Option<Event> {
    match raw {
        CrosstermEvent::Key(key) if key.kind != KeyEventKind::Press => None,
        CrosstermEvent::Key(key)
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(Event::Quit)
        }
        CrosstermEvent::Key(key) => Some(Event::Key(key)),
        CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        CrosstermEvent::Paste(text) => Some(Event::Paste(text)),
        CrosstermEvent::FocusGained | CrosstermEvent::FocusLost => None,
    }
}

impl Deref for Tui {
    type Target = Terminal<Backend>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            error!("Failed to restore terminal: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    #[test]
    fn test_ctrl_c_quits() {
        let raw = CrosstermEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(translate(raw), Some(Event::Quit));
    }

    #[test]
    fn test_only_key_presses_pass() {
        let press = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(
            translate(CrosstermEvent::Key(press)),
            Some(Event::Key(press))
        );

        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Tab,
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert_eq!(translate(CrosstermEvent::Key(release)), None);
    }

    #[test]
    fn test_focus_changes_are_dropped() {
        assert_eq!(translate(CrosstermEvent::FocusLost), None);
        assert_eq!(
            translate(CrosstermEvent::Paste("a@b.com".to_string())),
            Some(Event::Paste("a@b.com".to_string()))
        );
    }
}

//! TUI rendering and terminal management (impure shell).
//!
//! The render loop is the owner context: queued engine events are
//! applied here and nowhere else, then the slot sequence is mapped to
//! rows. Key handling forwards user actions (post, heart, delete, mute)
//! to the engine and never mutates display state directly — the engine
//! acknowledges through the event feed like any other mutation.

mod render;

use crate::dispatch::EventMarshal;
use crate::engine::{AutoHeart, ChatEngine};
use crate::state::StreamPresenter;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Interval between engine-event drains when the user is idle.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Cadence of the auto-heart toggle.
const AUTOHEART_INTERVAL: Duration = Duration::from_secs(2);

/// Errors that can occur during TUI operations.
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations.
    #[error("terminal IO error: {0}")]
    Io(#[from] io::Error),
}

/// Transient UI state owned by the shell, not the presenter.
#[derive(Debug, Default)]
pub(crate) struct UiState {
    /// Composer line for the next comment.
    pub(crate) composer: String,
    /// Selected row, counted from the newest comment.
    pub(crate) selected: usize,
    /// Whether the auto-heart task is running.
    pub(crate) autoheart_on: bool,
}

/// Main TUI application.
///
/// Generic over backend to support testing with `TestBackend`.
pub struct TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    terminal: Terminal<B>,
    presenter: StreamPresenter,
    marshal: EventMarshal,
    engine: Arc<dyn ChatEngine>,
    ui: UiState,
    autoheart: Option<AutoHeart>,
}

/// Run the client against a prepared presenter and event feed.
///
/// Sets up the terminal, runs the event loop until quit, and restores
/// the terminal even when the loop errors.
pub fn run(
    presenter: StreamPresenter,
    marshal: EventMarshal,
    engine: Arc<dyn ChatEngine>,
) -> Result<StreamPresenter, TuiError> {
    let mut app = TuiApp::new(presenter, marshal, engine)?;
    let result = app.run();
    let restore = restore_terminal();
    result?;
    restore?;
    Ok(app.into_presenter())
}

fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application.
    ///
    /// Sets up the terminal in raw mode with the alternate screen.
    pub fn new(
        presenter: StreamPresenter,
        marshal: EventMarshal,
        engine: Arc<dyn ChatEngine>,
    ) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            presenter,
            marshal,
            engine,
            ui: UiState::default(),
            autoheart: None,
        })
    }

    /// Run the main event loop.
    ///
    /// Returns when the user quits. Redraws on user input and whenever
    /// queued engine events were applied; idle ticks cost nothing.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            if event::poll(TICK_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                        self.draw()?;
                        continue;
                    }
                    Event::Resize(_, _) => {
                        self.draw()?;
                        continue;
                    }
                    _ => {}
                }
            }

            // Timer tick: apply whatever the network threads queued.
            if self.marshal.drain(&mut self.presenter) > 0 {
                self.draw()?;
            }
        }
    }
}

impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    /// Test constructor over an arbitrary backend; skips terminal setup.
    #[cfg(test)]
    pub(crate) fn new_for_test(
        terminal: Terminal<B>,
        presenter: StreamPresenter,
        marshal: EventMarshal,
        engine: Arc<dyn ChatEngine>,
    ) -> Self {
        Self {
            terminal,
            presenter,
            marshal,
            engine,
            ui: UiState::default(),
            autoheart: None,
        }
    }

    /// Give the presenter back for shutdown persistence.
    pub fn into_presenter(self) -> StreamPresenter {
        self.presenter
    }

    /// Apply queued engine events; exposed for tests driving the loop
    /// by hand.
    #[cfg(test)]
    pub(crate) fn drain_events(&mut self) -> usize {
        self.marshal.drain(&mut self.presenter)
    }

    #[cfg(test)]
    pub(crate) fn presenter(&self) -> &StreamPresenter {
        &self.presenter
    }

    #[cfg(test)]
    pub(crate) fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Handle a single keyboard event.
    ///
    /// Returns true if the app should quit.
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return true,
                // Heart the stream once.
                KeyCode::Char('s') => self.engine.heart_stream(),
                // Toggle the periodic auto-heart task.
                KeyCode::Char('a') => self.toggle_autoheart(),
                // Heart / unheart the selected comment.
                KeyCode::Char('y') => self.with_selected_comment(|engine, id| {
                    engine.heart_comment(id);
                }),
                KeyCode::Char('t') => self.with_selected_comment(|engine, id| {
                    engine.unheart_comment(id);
                }),
                // Ask the service to delete the selected comment.
                KeyCode::Char('d') => self.with_selected_comment(|engine, id| {
                    engine.delete_comment(id);
                }),
                // Mute the selected comment's author.
                KeyCode::Char('x') => self.mute_selected(),
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Enter => self.post_composer(),
            KeyCode::Backspace => {
                self.ui.composer.pop();
            }
            // Newest comment renders at the top (index 0).
            KeyCode::Up => {
                self.ui.selected = self.ui.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                let last = self.presenter.occupied().saturating_sub(1);
                self.ui.selected = (self.ui.selected + 1).min(last);
            }
            KeyCode::Char(c) => self.ui.composer.push(c),
            _ => {}
        }
        false
    }

    fn post_composer(&mut self) {
        let text = self.ui.composer.trim();
        if text.is_empty() {
            return;
        }
        self.engine.post_comment(text);
        self.ui.composer.clear();
    }

    fn toggle_autoheart(&mut self) {
        if let Some(task) = self.autoheart.take() {
            task.stop();
            self.ui.autoheart_on = false;
            return;
        }
        match AutoHeart::start(self.engine.clone(), AUTOHEART_INTERVAL) {
            Ok(task) => {
                self.autoheart = Some(task);
                self.ui.autoheart_on = true;
            }
            Err(err) => warn!(%err, "could not start auto-heart"),
        }
    }

    fn with_selected_comment(&mut self, action: impl FnOnce(&dyn ChatEngine, crate::model::CommentId)) {
        let target = self
            .presenter
            .comments()
            .nth(self.ui.selected)
            .and_then(|content| content.comment);
        if let Some(id) = target {
            action(self.engine.as_ref(), id);
        }
    }

    fn mute_selected(&mut self) {
        let author = self
            .presenter
            .comments()
            .nth(self.ui.selected)
            .and_then(|content| content.author);
        if let Some(user) = author {
            self.presenter.mute_user(user);
        }
    }

    /// Render the current state.
    pub(crate) fn draw(&mut self) -> Result<(), TuiError> {
        let presenter = &self.presenter;
        let engine = self.engine.as_ref();
        let ui = &self.ui;
        self.terminal
            .draw(|frame| render::draw(frame, presenter, engine, ui))?;
        Ok(())
    }
}

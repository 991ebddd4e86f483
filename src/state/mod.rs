// State management module
//
// This module provides the SessionManager which wraps SessionState with
// thread-safe access using Arc<RwLock<T>> and emits change events for
// shell updates.

use crate::metrics::SessionMetrics;
use crate::models::{
    Book, BookDraft, BookId, Difficulty, GameDefaults, GameError, GuessFeedback, GuessGame,
    LibraryStats, SearchField,
};
use crate::services::{LibraryError, LibraryStore};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when session state is modified
///
/// These events are emitted to notify interested parties (primarily the
/// shell) about state changes without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionChange {
    /// The game accepted a new range or attempt budget
    GameConfigured {
        min_range: i64,
        max_range: i64,
        max_attempts: u32,
    },

    /// A new round has started with a fresh secret
    GameReset,

    /// A guess was evaluated against the secret
    GuessEvaluated {
        feedback: GuessFeedback,
    },

    /// The number of books in the library changed
    LibraryChanged {
        total: usize,
    },

    /// A book has been added to the library
    BookAdded {
        id: BookId,
        title: String,
    },

    /// A book has been removed from the library
    BookRemoved {
        id: BookId,
        title: String,
    },

    /// A library write did not reach disk; in-memory state is ahead of the store
    LibrarySaveFailed {
        message: String,
    },
}

/// Everything a session holds: the current game round and the library
/// collection.
///
/// `library_warning` carries a message when the store file could not be
/// loaded and the session started from an empty collection instead.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub game: GuessGame,
    pub library: Vec<Book>,
    pub library_warning: Option<String>,
}

/// Thread-safe session manager with event emission
///
/// This is the central state management component that:
/// - Provides thread-safe access to [`SessionState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`SessionChange`] events
/// - Persists library mutations through [`LibraryStore`]
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Usage
///
/// Always use `SessionManager` instead of accessing [`SessionState`] directly:
/// - [`read()`](Self::read) for reading state without cloning
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
///
/// # Related Types
///
/// - [`SessionState`]: The underlying state structure
/// - [`SessionChange`]: Event types emitted on state mutations
/// - [`crate::services::LibraryStore`]: Persists the library collection
/// - [`crate::ui::ShellController`]: Primary consumer of session state
pub struct SessionManager {
    /// The session state protected by RwLock for thread-safe access
    state: Arc<RwLock<SessionState>>,

    /// Persistence backend for the library collection
    store: LibraryStore,

    /// Counters describing what the session has done so far
    metrics: Arc<SessionMetrics>,

    /// Broadcast channel for emitting session change events
    /// Multiple subscribers can listen for state changes
    events_tx: broadcast::Sender<SessionChange>,
}

impl SessionManager {
    /// Create a new SessionManager with default state and the given store
    ///
    /// # Returns
    /// A new SessionManager with a broadcast channel buffer of 100 events
    pub fn new(store: LibraryStore) -> Self {
        let (events_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            store,
            metrics: Arc::new(SessionMetrics::new()),
            events_tx,
        }
    }

    /// Open a session: seed the game from configured defaults and load the
    /// library from the store
    ///
    /// Neither input can stop the session from opening. Unusable game
    /// defaults fall back to the built-in range; an unreadable or corrupt
    /// store file leaves the library empty and records a warning in
    /// [`SessionState::library_warning`].
    pub fn open(store: LibraryStore, defaults: &GameDefaults) -> Self {
        let game = match GuessGame::with_settings(
            defaults.min_range,
            defaults.max_range,
            defaults.difficulty.attempt_budget(),
        ) {
            Ok(game) => game,
            Err(err) => {
                tracing::warn!("Configured game defaults are unusable ({}), using built-ins", err);
                GuessGame::new()
            }
        };

        let (library, library_warning) = match store.load() {
            Ok(library) => (library, None),
            Err(err) => {
                tracing::warn!("Starting with an empty library: {}", err);
                (Vec::new(), Some(err.to_string()))
            }
        };

        let manager = Self::new(store);
        {
            let mut state = manager.state.write().unwrap();
            state.game = game;
            state.library = library;
            state.library_warning = library_warning;
        }
        manager
    }

    /// Get a read-only snapshot of the current state
    ///
    /// This clones the entire state, so it's safe to use without holding locks.
    /// For checking individual fields, consider using `read()` with a closure.
    pub fn snapshot(&self) -> SessionState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let total = session.read(|state| state.library.len());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// This is the primary way to modify state. It:
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Arguments
    /// * `update_fn` - A function that mutates the state
    ///
    /// # Returns
    /// A vector of SessionChange events that were emitted
    ///
    /// # Example
    /// ```ignore
    /// session.update(|state| {
    ///     state.library.clear();
    /// });
    /// ```
    pub fn update<F>(&self, update_fn: F) -> Vec<SessionChange>
    where
        F: FnOnce(&mut SessionState),
    {
        self.update_with(|state| update_fn(state)).1
    }

    /// Subscribe to session change events
    ///
    /// Returns a receiver that will get notified of all future state changes.
    /// Multiple subscribers can listen simultaneously.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.events_tx.subscribe()
    }

    /// Counters for what this session has done so far
    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Warning from opening the library store, if the session started empty
    pub fn library_warning(&self) -> Option<String> {
        self.read(|state| state.library_warning.clone())
    }

    /// Like [`update()`](Self::update), but the closure can return a value
    /// alongside the emitted events
    fn update_with<F, R>(&self, update_fn: F) -> (R, Vec<SessionChange>)
    where
        F: FnOnce(&mut SessionState) -> R,
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        // Apply the update
        let outcome = update_fn(&mut state);

        // Detect changes and emit events
        let changes = self.detect_changes(&old_state, &state);

        for change in &changes {
            self.send_event(change.clone());
        }

        (outcome, changes)
    }

    /// Detect what changed between two states and generate events
    ///
    /// This is called internally by `update_with()` to determine which
    /// events to emit. Changes without a diffable footprint (a redrawn
    /// secret, an evaluated guess) are emitted explicitly by the
    /// operation that causes them.
    fn detect_changes(&self, old: &SessionState, new: &SessionState) -> Vec<SessionChange> {
        let mut changes = Vec::new();

        // Game configuration changes
        if old.game.min_range() != new.game.min_range()
            || old.game.max_range() != new.game.max_range()
            || old.game.max_attempts() != new.game.max_attempts()
        {
            changes.push(SessionChange::GameConfigured {
                min_range: new.game.min_range(),
                max_range: new.game.max_range(),
                max_attempts: new.game.max_attempts(),
            });
        }

        // Library collection changes
        if old.library.len() != new.library.len() {
            changes.push(SessionChange::LibraryChanged {
                total: new.library.len(),
            });
        }

        changes
    }

    fn send_event(&self, event: SessionChange) {
        self.metrics.record_event_emitted();
        // Ignore send errors - it's OK if no one is listening
        let _ = self.events_tx.send(event);
    }

    // Convenience methods for common session operations

    /// Apply a new range and attempt budget, starting a fresh round
    ///
    /// An invalid range leaves the previous configuration and round
    /// untouched.
    pub fn configure_game(
        &self,
        min_range: i64,
        max_range: i64,
        max_attempts: u32,
    ) -> Result<Vec<SessionChange>, GameError> {
        let (outcome, mut changes) =
            self.update_with(|state| state.game.configure(min_range, max_range, max_attempts));
        outcome?;

        // A fresh secret never shows up in a state diff, so emit it explicitly
        let reset_event = SessionChange::GameReset;
        self.send_event(reset_event.clone());
        changes.push(reset_event);

        Ok(changes)
    }

    /// Switch to a difficulty preset and start a fresh round
    pub fn set_difficulty(&self, difficulty: Difficulty) -> Vec<SessionChange> {
        let mut changes = self.update(|state| state.game.set_difficulty(difficulty));

        let reset_event = SessionChange::GameReset;
        self.send_event(reset_event.clone());
        changes.push(reset_event);

        changes
    }

    /// Start a fresh round with the current configuration
    pub fn reset_game(&self) -> Vec<SessionChange> {
        let mut changes = self.update(|state| state.game.reset());

        let reset_event = SessionChange::GameReset;
        self.send_event(reset_event.clone());
        changes.push(reset_event);

        changes
    }

    /// Evaluate a raw guess against the current round
    ///
    /// Emits [`SessionChange::GuessEvaluated`] and updates metrics only
    /// when the guess actually consumed an attempt; replays against a
    /// finished round and unparseable input leave the session silent.
    pub fn submit_guess(&self, raw: &str) -> Result<GuessFeedback, GameError> {
        let (outcome, evaluated) = {
            let mut state = self.state.write().unwrap();
            let attempts_before = state.game.attempts();
            let outcome = state.game.submit_guess(raw);
            let evaluated = state.game.attempts() != attempts_before;
            (outcome, evaluated)
        };

        let feedback = outcome?;
        if evaluated {
            self.metrics.record_guess();
            match feedback {
                GuessFeedback::Won { .. } => self.metrics.record_game_won(),
                GuessFeedback::Lost { .. } => self.metrics.record_game_lost(),
                GuessFeedback::TooLow { .. } | GuessFeedback::TooHigh { .. } => {}
            }
            self.send_event(SessionChange::GuessEvaluated { feedback });
        }

        Ok(feedback)
    }

    /// Validate a draft, add it to the library, and persist
    ///
    /// On a persistence failure the book is already in the in-memory
    /// collection; [`SessionChange::LibrarySaveFailed`] is emitted and the
    /// error returned so the caller can retry the save.
    pub fn add_book(&self, draft: BookDraft) -> Result<BookId, LibraryError> {
        let ((outcome, stored), _changes) = self.update_with(|state| {
            let outcome = self.store.add_book(&mut state.library, draft);
            let stored = match &outcome {
                // The draft reached the collection even when the save failed
                Ok(_) | Err(LibraryError::Persistence { .. }) => {
                    state.library.last().map(|b| (b.id, b.title.clone()))
                }
                Err(_) => None,
            };
            (outcome, stored)
        });

        match &outcome {
            Ok(_) => {
                self.metrics.record_book_added();
                self.metrics.record_store_save();
                if let Some((id, title)) = stored {
                    self.send_event(SessionChange::BookAdded { id, title });
                }
            }
            Err(err @ LibraryError::Persistence { .. }) => {
                self.metrics.record_book_added();
                self.metrics.record_store_save_failure();
                if let Some((id, title)) = stored {
                    self.send_event(SessionChange::BookAdded { id, title });
                }
                self.send_event(SessionChange::LibrarySaveFailed {
                    message: err.to_string(),
                });
            }
            Err(_) => {}
        }

        outcome
    }

    /// Remove a book by its stable identifier and persist
    pub fn remove_book(&self, id: BookId) -> Result<Book, LibraryError> {
        let ((outcome, target), _changes) = self.update_with(|state| {
            let target = state
                .library
                .iter()
                .find(|b| b.id == id)
                .map(|b| (b.id, b.title.clone()));
            (self.store.remove_book(&mut state.library, id), target)
        });

        self.finish_removal(outcome, target)
    }

    /// Remove a book by its position in canonical insertion order and persist
    pub fn remove_book_at(&self, position: usize) -> Result<Book, LibraryError> {
        let ((outcome, target), _changes) = self.update_with(|state| {
            let target = state
                .library
                .get(position)
                .map(|b| (b.id, b.title.clone()));
            (self.store.remove_book_at(&mut state.library, position), target)
        });

        self.finish_removal(outcome, target)
    }

    fn finish_removal(
        &self,
        outcome: Result<Book, LibraryError>,
        target: Option<(BookId, String)>,
    ) -> Result<Book, LibraryError> {
        match &outcome {
            Ok(book) => {
                self.metrics.record_book_removed();
                self.metrics.record_store_save();
                self.send_event(SessionChange::BookRemoved {
                    id: book.id,
                    title: book.title.clone(),
                });
            }
            Err(err @ LibraryError::Persistence { .. }) => {
                // The book already left the in-memory collection
                self.metrics.record_book_removed();
                self.metrics.record_store_save_failure();
                if let Some((id, title)) = target {
                    self.send_event(SessionChange::BookRemoved { id, title });
                }
                self.send_event(SessionChange::LibrarySaveFailed {
                    message: err.to_string(),
                });
            }
            Err(_) => {}
        }

        outcome
    }

    /// Write the current collection to the store, for retrying after a
    /// failed save
    pub fn save_library(&self) -> Result<(), LibraryError> {
        let library = self.read(|state| state.library.clone());
        match self.store.save(&library) {
            Ok(()) => {
                self.metrics.record_store_save();
                Ok(())
            }
            Err(err) => {
                self.metrics.record_store_save_failure();
                self.send_event(SessionChange::LibrarySaveFailed {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Books whose selected field contains `term`, case-insensitively
    pub fn search_books(
        &self,
        field: SearchField,
        term: &str,
    ) -> Result<Vec<Book>, LibraryError> {
        self.read(|state| {
            self.store
                .search(&state.library, field, term)
                .map(|matches| matches.cloned().collect())
        })
    }

    /// The whole collection, optionally sorted by title
    pub fn list_books(&self, sort_by_title: bool) -> Vec<Book> {
        self.read(|state| {
            self.store
                .list_all(&state.library, sort_by_title)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// Aggregate counts over the collection
    pub fn library_stats(&self) -> LibraryStats {
        self.read(|state| self.store.statistics(&state.library))
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(LibraryStore::default())
    }
}

// Make SessionManager cloneable for sharing across threads
impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            store: self.store.clone(),
            metrics: Arc::clone(&self.metrics),
            events_tx: self.events_tx.clone(),
        }
    }
}

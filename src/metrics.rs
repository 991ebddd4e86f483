// Session metrics module
//
// Provides lightweight metrics tracking for monitoring session activity

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Global session metrics
///
/// Uses atomic operations for thread-safe metric tracking without locks.
/// Metrics are collected throughout the session lifecycle and logged on
/// shutdown for a summary of what the session did.
#[derive(Debug)]
pub struct SessionMetrics {
    /// Total number of guesses evaluated against a secret
    pub guesses_evaluated: AtomicU64,

    /// Number of rounds won
    pub games_won: AtomicUsize,

    /// Number of rounds lost
    pub games_lost: AtomicUsize,

    /// Number of books added to the library
    pub books_added: AtomicUsize,

    /// Number of books removed from the library
    pub books_removed: AtomicUsize,

    /// Number of successful library store writes
    pub store_saves: AtomicU64,

    /// Number of failed library store writes
    pub store_save_failures: AtomicU64,

    /// Number of session change events emitted
    pub events_emitted: AtomicU64,

    /// Session start time
    start_time: Instant,
}

impl SessionMetrics {
    /// Create a new SessionMetrics instance
    pub fn new() -> Self {
        Self {
            guesses_evaluated: AtomicU64::new(0),
            games_won: AtomicUsize::new(0),
            games_lost: AtomicUsize::new(0),
            books_added: AtomicUsize::new(0),
            books_removed: AtomicUsize::new(0),
            store_saves: AtomicU64::new(0),
            store_save_failures: AtomicU64::new(0),
            events_emitted: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record an evaluated guess
    pub fn record_guess(&self) {
        self.guesses_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a won round
    pub fn record_game_won(&self) {
        self.games_won.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lost round
    pub fn record_game_lost(&self) {
        self.games_lost.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a book added
    pub fn record_book_added(&self) {
        self.books_added.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a book removed
    pub fn record_book_removed(&self) {
        self.books_removed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful store write
    pub fn record_store_save(&self) {
        self.store_saves.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed store write
    pub fn record_store_save_failure(&self) {
        self.store_save_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an emitted session change event
    pub fn record_event_emitted(&self) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get the share of finished rounds that were won, as a percentage
    pub fn win_rate(&self) -> f64 {
        let won = self.games_won.load(Ordering::Relaxed);
        let finished = won + self.games_lost.load(Ordering::Relaxed);
        if finished > 0 {
            won as f64 / finished as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        let uptime = self.uptime();
        tracing::info!("=== Session Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", uptime.as_secs_f64());
        tracing::info!(
            "Rounds: {} won, {} lost ({:.1}% win rate over {} guesses)",
            self.games_won.load(Ordering::Relaxed),
            self.games_lost.load(Ordering::Relaxed),
            self.win_rate(),
            self.guesses_evaluated.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Library: {} books added, {} removed",
            self.books_added.load(Ordering::Relaxed),
            self.books_removed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Store writes: {} saved, {} failed",
            self.store_saves.load(Ordering::Relaxed),
            self.store_save_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Events emitted: {}",
            self.events_emitted.load(Ordering::Relaxed)
        );
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

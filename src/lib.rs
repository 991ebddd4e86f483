// Parlor - Number-Guessing Engine and Persisted Personal Library
//
// This is the library crate containing the core business logic and data structures.
// The binary crate (main.rs) provides the terminal shell entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{Book, BookDraft, BookId, Difficulty, GuessFeedback, GuessGame, UserConfig};
pub use services::{LibraryError, LibraryStore};
pub use state::{SessionChange, SessionManager, SessionState};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

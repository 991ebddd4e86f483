//! Data models for the parlor application.
//!
//! This module contains the core data structures used throughout the application:
//! - [`GuessGame`]: The number-guessing state machine with range, budget, and outcome
//! - [`Book`] / [`BookId`]: Typed library records with stable identifiers
//! - [`LibraryStats`]: Aggregate read-status and genre numbers for the collection
//! - [`UserConfig`]: User preferences loaded from `Parlor Config.yaml`
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Serializable**: `Book` matches the JSON store file contract; `UserConfig` the YAML one
//! - **Cloneable**: session state is wrapped in `Arc<RwLock<>>` by
//!   [`SessionManager`](crate::state::SessionManager) and snapshotted by value
//! - **UI-free**: nothing here knows about the shell; feedback values carry the
//!   data the presentation layer formats

pub mod book;
pub mod config;
pub mod game;

pub use book::{Book, BookDraft, BookId, LibraryStats, SearchField};
pub use config::{GameDefaults, LibrarySettings, UserConfig};
pub use game::{Difficulty, GameError, GameStatus, GuessFeedback, GuessGame};

//! Services module - Pure business logic for the personal library.
//!
//! This module contains the persistence and validation rules behind the
//! session. The services are **framework-agnostic** and have no dependencies
//! on the shell layer, making them testable and reusable.
//!
//! # Components
//!
//! - [`LibraryStore`]: JSON-backed storage and collection operations. Handles:
//!   - Loading and atomically saving the whole collection
//!   - Draft validation (required fields, year range, duplicate detection)
//!   - Search, listing, and aggregate statistics
//!
//! - [`LibraryError`]: Everything that can go wrong, from a corrupt store
//!   file to a duplicate title/author pair
//!
//! # Design Philosophy
//!
//! The services layer is designed to be:
//! - **Stateless**: The collection is an explicit parameter, owned by the caller
//! - **Recoverable**: A failed save leaves the in-memory collection intact for retry
//! - **Testable**: No hidden dependencies, all inputs are explicit parameters
//!
//! # Usage Example
//!
//! ```ignore
//! use parlor::services::LibraryStore;
//!
//! let store = LibraryStore::new("library.json");
//! let mut library = store.load()?;
//!
//! let id = store.add_book(&mut library, draft)?;
//! let stats = store.statistics(&library);
//! ```

pub mod library;

pub use library::{LibraryError, LibraryStore};

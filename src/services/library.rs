use crate::models::{Book, BookDraft, BookId, LibraryStats, SearchField};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Datelike, Utc};
use indexmap::IndexMap;
use std::fs;
use thiserror::Error;

/// Errors from library validation and persistence
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Library file {path} is not valid JSON")]
    CorruptStore {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Library file access failed: {path}")]
    Persistence {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Publication year {year} is outside 0 through {max}")]
    YearOutOfRange { year: i32, max: i32 },

    #[error("A book with the title '{title}' by '{author}' already exists")]
    DuplicateBook { title: String, author: String },

    #[error("Position {position} is out of range for a library of {len}")]
    IndexOutOfRange { position: usize, len: usize },

    #[error("No book with id {id}")]
    UnknownBook { id: BookId },

    #[error("Search term must not be empty")]
    EmptySearchTerm,
}

/// Persistence and collection operations for the personal library
///
/// The service holds only the store path; the collection itself is passed
/// in explicitly, so one session owns its `Vec<Book>` and the service stays
/// stateless. Every mutation persists the whole collection. A failed save
/// leaves the in-memory collection as mutated so the caller can retry the
/// write.
#[derive(Debug, Clone)]
pub struct LibraryStore {
    store_path: Utf8PathBuf,
}

impl LibraryStore {
    pub fn new<P: AsRef<Utf8Path>>(store_path: P) -> Self {
        Self {
            store_path: store_path.as_ref().to_path_buf(),
        }
    }

    pub fn store_path(&self) -> &Utf8Path {
        &self.store_path
    }

    /// Read the whole collection from the store file
    ///
    /// An absent file or blank content is an empty library. Unparseable
    /// content is [`LibraryError::CorruptStore`]; callers recover by
    /// treating the library as empty and surfacing a warning.
    pub fn load(&self) -> Result<Vec<Book>, LibraryError> {
        if !self.store_path.exists() {
            tracing::info!("Library file not found at {}, starting empty", self.store_path);
            return Ok(Vec::new());
        }

        let contents =
            fs::read_to_string(&self.store_path).map_err(|source| LibraryError::Persistence {
                path: self.store_path.clone(),
                source,
            })?;

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        let library: Vec<Book> =
            serde_json::from_str(&contents).map_err(|source| LibraryError::CorruptStore {
                path: self.store_path.clone(),
                source,
            })?;

        tracing::info!("Loaded {} books from {}", library.len(), self.store_path);
        Ok(library)
    }

    /// Write the whole collection to the store file
    ///
    /// Serializes pretty-printed JSON to a temporary file and renames it
    /// into place, so a crashed write never leaves a half-written store.
    pub fn save(&self, library: &[Book]) -> Result<(), LibraryError> {
        let json =
            serde_json::to_string_pretty(library).map_err(|source| LibraryError::Persistence {
                path: self.store_path.clone(),
                source: source.into(),
            })?;

        let tmp_path = self.store_path.with_extension("json.tmp");
        let persistence = |source| LibraryError::Persistence {
            path: self.store_path.clone(),
            source,
        };
        fs::write(&tmp_path, json).map_err(persistence)?;
        fs::rename(&tmp_path, &self.store_path).map_err(persistence)?;

        tracing::debug!("Saved {} books to {}", library.len(), self.store_path);
        Ok(())
    }

    /// Validate a draft, append it as a new book, and persist
    ///
    /// Title and author are trimmed and required; the publication year must
    /// fall between 0 and the current calendar year; a `(title, author)`
    /// pair already present (case-insensitively) is rejected. A blank genre
    /// normalizes to None.
    pub fn add_book(
        &self,
        library: &mut Vec<Book>,
        draft: BookDraft,
    ) -> Result<BookId, LibraryError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(LibraryError::MissingField { field: "title" });
        }
        let author = draft.author.trim();
        if author.is_empty() {
            return Err(LibraryError::MissingField { field: "author" });
        }

        let max_year = Utc::now().year();
        if draft.publication_year < 0 || draft.publication_year > max_year {
            return Err(LibraryError::YearOutOfRange {
                year: draft.publication_year,
                max: max_year,
            });
        }

        if let Some(existing) = library.iter().find(|b| b.same_title_author(title, author)) {
            return Err(LibraryError::DuplicateBook {
                title: existing.title.clone(),
                author: existing.author.clone(),
            });
        }

        let book = Book {
            id: BookId::random(),
            title: title.to_string(),
            author: author.to_string(),
            publication_year: draft.publication_year,
            genre: draft
                .genre
                .as_deref()
                .map(str::trim)
                .filter(|genre| !genre.is_empty())
                .map(str::to_string),
            read_status: draft.read_status,
        };
        let id = book.id;

        tracing::info!("Adding '{}' by {} to the library", book.title, book.author);
        library.push(book);
        self.save(library)?;
        Ok(id)
    }

    /// Remove a book by its stable identifier and persist
    ///
    /// When the save fails the book has still left the in-memory
    /// collection; the error carries the persistence failure.
    pub fn remove_book(&self, library: &mut Vec<Book>, id: BookId) -> Result<Book, LibraryError> {
        let position = library
            .iter()
            .position(|b| b.id == id)
            .ok_or(LibraryError::UnknownBook { id })?;
        self.remove_at(library, position)
    }

    /// Remove a book by its position in canonical insertion order and persist
    ///
    /// An invalid position leaves the library unchanged.
    pub fn remove_book_at(
        &self,
        library: &mut Vec<Book>,
        position: usize,
    ) -> Result<Book, LibraryError> {
        if position >= library.len() {
            return Err(LibraryError::IndexOutOfRange {
                position,
                len: library.len(),
            });
        }
        self.remove_at(library, position)
    }

    fn remove_at(&self, library: &mut Vec<Book>, position: usize) -> Result<Book, LibraryError> {
        let book = library.remove(position);
        tracing::info!("Removed '{}' by {} from the library", book.title, book.author);
        match self.save(library) {
            Ok(()) => Ok(book),
            Err(err) => {
                tracing::warn!("Removal of '{}' is not persisted yet: {}", book.title, err);
                Err(err)
            }
        }
    }

    /// Lazily iterate books whose selected field contains `term`,
    /// case-insensitively
    pub fn search<'a>(
        &self,
        library: &'a [Book],
        field: SearchField,
        term: &str,
    ) -> Result<impl Iterator<Item = &'a Book>, LibraryError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(LibraryError::EmptySearchTerm);
        }
        let needle = term.to_lowercase();

        Ok(library.iter().filter(move |book| {
            let haystack = match field {
                SearchField::Title => &book.title,
                SearchField::Author => &book.author,
            };
            haystack.to_lowercase().contains(&needle)
        }))
    }

    /// The full collection in canonical order, optionally sorted by title
    ///
    /// The title sort is stable and case-insensitive; ties keep insertion
    /// order.
    pub fn list_all<'a>(&self, library: &'a [Book], sort_by_title: bool) -> Vec<&'a Book> {
        let mut books: Vec<&Book> = library.iter().collect();
        if sort_by_title {
            books.sort_by_cached_key(|book| book.title.to_lowercase());
        }
        books
    }

    /// Aggregate counts over the collection
    pub fn statistics(&self, library: &[Book]) -> LibraryStats {
        let total = library.len();
        let read_count = library.iter().filter(|book| book.read_status).count();
        let read_percentage = if total > 0 {
            (read_count as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        let mut by_genre: IndexMap<String, usize> = IndexMap::new();
        for book in library {
            let genre = book.genre.as_deref().unwrap_or("Uncategorized");
            *by_genre.entry(genre.to_string()).or_insert(0) += 1;
        }

        LibraryStats {
            total,
            read_count,
            read_percentage,
            by_genre,
        }
    }
}

impl Default for LibraryStore {
    fn default() -> Self {
        Self::new("library.json")
    }
}

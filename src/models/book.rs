use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier assigned to a book when it enters the library
///
/// Removal goes through this id rather than a display position, so a
/// sorted or filtered listing can never delete the wrong record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(Uuid);

impl BookId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One library record as stored in the JSON file
///
/// Field names are the file contract. Files written before ids existed
/// load fine: a missing `id` defaults to a fresh one, and a blank or
/// absent `genre` becomes None.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default = "BookId::random")]
    pub id: BookId,

    pub title: String,

    pub author: String,

    pub publication_year: i32,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub genre: Option<String>,

    #[serde(default)]
    pub read_status: bool,
}

impl Book {
    /// Case-insensitive identity used for duplicate detection
    pub fn same_title_author(&self, title: &str, author: &str) -> bool {
        self.title.to_lowercase() == title.to_lowercase()
            && self.author.to_lowercase() == author.to_lowercase()
    }
}

/// Raw user-entered fields before validation and normalization
#[derive(Debug, Clone, Default)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub genre: Option<String>,
    pub read_status: bool,
}

/// Which book field a search matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
}

/// Aggregate numbers over the whole collection
///
/// `read_percentage` is on a 0 to 100 scale and stays 0.0 for an empty
/// library. `by_genre` counts genres in first-seen order, grouping books
/// without one under "Uncategorized".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LibraryStats {
    pub total: usize,
    pub read_count: usize,
    pub read_percentage: f64,
    pub by_genre: IndexMap<String, usize>,
}

impl LibraryStats {
    pub fn unread_count(&self) -> usize {
        self.total - self.read_count
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|genre| {
        let trimmed = genre.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_ids_are_unique() {
        assert_ne!(BookId::random(), BookId::random());
    }

    #[test]
    fn test_same_title_author_is_case_insensitive() {
        let book = Book {
            id: BookId::random(),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            publication_year: 1965,
            genre: Some("Science Fiction".to_string()),
            read_status: true,
        };

        assert!(book.same_title_author("DUNE", "frank herbert"));
        assert!(!book.same_title_author("Dune Messiah", "Frank Herbert"));
    }

    #[test]
    fn test_legacy_record_without_id_gets_one() {
        let json = r#"{
            "title": "Dune",
            "author": "Frank Herbert",
            "publication_year": 1965,
            "genre": "",
            "read_status": false
        }"#;

        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.genre, None);
        assert!(!book.read_status);
    }

    #[test]
    fn test_null_genre_becomes_none() {
        let json = r#"{
            "title": "Dune",
            "author": "Frank Herbert",
            "publication_year": 1965,
            "genre": null,
            "read_status": true
        }"#;

        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.genre, None);
    }

    #[test]
    fn test_genre_whitespace_is_trimmed() {
        let json = r#"{
            "title": "Dune",
            "author": "Frank Herbert",
            "publication_year": 1965,
            "genre": "  Science Fiction  ",
            "read_status": true
        }"#;

        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.genre, Some("Science Fiction".to_string()));
    }

    #[test]
    fn test_serde_round_trip_preserves_id() {
        let book = Book {
            id: BookId::random(),
            title: "The Dispossessed".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            publication_year: 1974,
            genre: None,
            read_status: true,
        };

        let json = serde_json::to_string_pretty(&book).unwrap();
        let restored: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, book);
    }

    #[test]
    fn test_stats_unread_count() {
        let stats = LibraryStats {
            total: 5,
            read_count: 2,
            read_percentage: 40.0,
            by_genre: IndexMap::new(),
        };
        assert_eq!(stats.unread_count(), 3);
    }
}

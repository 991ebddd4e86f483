//! Integration tests for SessionManager with session change events
//!
//! These tests verify that the SessionManager correctly:
//! - Emits session change events on mutations
//! - Supports multiple subscribers
//! - Handles concurrent access from multiple tasks
//! - Recovers from store failures without losing in-memory state

use camino::Utf8PathBuf;
use parlor::models::{BookDraft, GameDefaults, GuessFeedback};
use parlor::{LibraryStore, SessionChange, SessionManager};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::time::{Duration, timeout};

fn create_test_session() -> (SessionManager, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let session = SessionManager::new(LibraryStore::new(dir.join("library.json")));
    (session, temp_dir)
}

fn draft(title: &str, author: &str) -> BookDraft {
    BookDraft {
        title: title.to_string(),
        author: author.to_string(),
        publication_year: 1965,
        genre: None,
        read_status: false,
    }
}

#[tokio::test]
async fn test_game_configuration_events_emitted() {
    let (session, _temp_dir) = create_test_session();
    let session = Arc::new(session);
    let mut rx = session.subscribe();

    session.configure_game(10, 99, 3).unwrap();

    // Should receive GameConfigured followed by GameReset
    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");

    assert!(
        matches!(
            event,
            SessionChange::GameConfigured {
                min_range: 10,
                max_range: 99,
                max_attempts: 3
            }
        ),
        "Expected GameConfigured event, got: {:?}",
        event
    );

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");

    assert!(matches!(event, SessionChange::GameReset));
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let (session, _temp_dir) = create_test_session();
    let session = Arc::new(session);
    let mut rx1 = session.subscribe();
    let mut rx2 = session.subscribe();
    let mut rx3 = session.subscribe();

    // Trigger a state change
    session.reset_game();

    // All three subscribers should receive the GameReset event
    let event1 = timeout(Duration::from_millis(100), rx1.recv())
        .await
        .expect("Timeout on rx1")
        .expect("rx1 closed");

    let event2 = timeout(Duration::from_millis(100), rx2.recv())
        .await
        .expect("Timeout on rx2")
        .expect("rx2 closed");

    let event3 = timeout(Duration::from_millis(100), rx3.recv())
        .await
        .expect("Timeout on rx3")
        .expect("rx3 closed");

    assert!(matches!(event1, SessionChange::GameReset));
    assert!(matches!(event2, SessionChange::GameReset));
    assert!(matches!(event3, SessionChange::GameReset));
}

#[tokio::test]
async fn test_guess_evaluation_event() {
    let (session, _temp_dir) = create_test_session();
    let mut rx = session.subscribe();

    let secret = session.snapshot().game.secret();
    session.submit_guess(&secret.to_string()).unwrap();

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout")
        .expect("Channel closed");

    match event {
        SessionChange::GuessEvaluated { feedback } => {
            assert!(
                matches!(feedback, GuessFeedback::Won { attempts: 1, .. }),
                "Expected a first-guess win, got: {:?}",
                feedback
            );
        }
        other => panic!("Expected GuessEvaluated, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_library_event_workflow() {
    let (session, _temp_dir) = create_test_session();
    let mut rx = session.subscribe();

    // Adding emits the collection change first, then the book itself
    let id = session.add_book(draft("Dune", "Frank Herbert")).unwrap();

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout")
        .expect("Channel closed");
    assert!(matches!(event, SessionChange::LibraryChanged { total: 1 }));

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout")
        .expect("Channel closed");
    match event {
        SessionChange::BookAdded {
            id: event_id,
            title,
        } => {
            assert_eq!(event_id, id);
            assert_eq!(title, "Dune");
        }
        other => panic!("Expected BookAdded, got: {:?}", other),
    }

    // Removing mirrors the same shape
    session.remove_book(id).unwrap();

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout")
        .expect("Channel closed");
    assert!(matches!(event, SessionChange::LibraryChanged { total: 0 }));

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout")
        .expect("Channel closed");
    assert!(matches!(event, SessionChange::BookRemoved { .. }));
}

#[tokio::test]
async fn test_save_failure_emits_and_keeps_state() {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    // The parent directory is missing, so every save fails
    let session = SessionManager::new(LibraryStore::new(dir.join("absent").join("library.json")));
    let mut rx = session.subscribe();

    let result = session.add_book(draft("Dune", "Frank Herbert"));
    assert!(result.is_err(), "Save should fail without a parent directory");

    // The book is still in memory for a retry
    assert_eq!(session.snapshot().library.len(), 1);

    // Collect events until the save failure shows up
    let mut found_save_failed = false;
    for _ in 0..3 {
        match timeout(Duration::from_millis(100), rx.recv()).await {
            Ok(Ok(SessionChange::LibrarySaveFailed { .. })) => {
                found_save_failed = true;
                break;
            }
            Ok(Ok(_)) => continue,
            _ => break,
        }
    }

    assert!(found_save_failed, "Expected LibrarySaveFailed event");
}

#[tokio::test]
async fn test_corrupt_store_recovered_then_healed_by_save() {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let store_path = dir.join("library.json");
    std::fs::write(&store_path, "{\"this is\": not a book list").unwrap();

    // Opening recovers with an empty library and a warning
    let session = SessionManager::open(LibraryStore::new(&store_path), &GameDefaults::default());
    assert!(session.library_warning().is_some());
    assert!(session.snapshot().library.is_empty());

    // The next successful save replaces the corrupt file
    session.add_book(draft("Dune", "Frank Herbert")).unwrap();

    let reopened = SessionManager::open(LibraryStore::new(&store_path), &GameDefaults::default());
    assert!(reopened.library_warning().is_none());
    assert_eq!(reopened.snapshot().library.len(), 1);
}

#[tokio::test]
async fn test_concurrent_session_access() {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let store_path = dir.join("library.json");
    let session = Arc::new(SessionManager::new(LibraryStore::new(&store_path)));

    // Spawn multiple tasks that add books concurrently
    let mut handles = vec![];

    for i in 0..10 {
        let session_clone = Arc::clone(&session);
        let handle = tokio::spawn(async move {
            session_clone
                .add_book(draft(&format!("Book {}", i), "Author"))
                .unwrap();
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(session.snapshot().library.len(), 10);

    // Every addition reached the store
    let reopened =
        SessionManager::open(LibraryStore::new(&store_path), &GameDefaults::default());
    assert_eq!(reopened.snapshot().library.len(), 10);
}

#[tokio::test]
async fn test_round_lifecycle_with_metrics() {
    let (session, _temp_dir) = create_test_session();

    // A one-attempt round that misses is lost
    session.configure_game(1, 1000, 1).unwrap();
    let secret = session.snapshot().game.secret();
    let wrong = if secret == 1 { 2 } else { 1 };

    let feedback = session.submit_guess(&wrong.to_string()).unwrap();
    assert!(matches!(feedback, GuessFeedback::Lost { .. }));

    // Guessing again replays the loss without consuming attempts
    let replay = session.submit_guess("500").unwrap();
    assert!(matches!(replay, GuessFeedback::Lost { .. }));
    assert_eq!(session.snapshot().game.attempts(), 1);

    // A fresh round can still be won
    session.reset_game();
    let secret = session.snapshot().game.secret();
    let feedback = session.submit_guess(&secret.to_string()).unwrap();
    assert!(matches!(feedback, GuessFeedback::Won { .. }));

    use std::sync::atomic::Ordering;
    assert_eq!(session.metrics().games_won.load(Ordering::Relaxed), 1);
    assert_eq!(session.metrics().games_lost.load(Ordering::Relaxed), 1);
    assert_eq!(session.metrics().guesses_evaluated.load(Ordering::Relaxed), 2);
}

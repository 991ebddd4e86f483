// Shell Controller - Bridges the terminal with Rust State Management
//
// This module contains the ShellController which coordinates between:
// - The interactive menu REPL (stdin/stdout)
// - SessionManager (game and library state)
//
// It handles:
// - Prompting and parsing menu choices
// - Rendering game feedback and library listings
// - Reporting recoverable errors without leaving the loop

use crate::models::{Book, BookDraft, Difficulty, GameStatus, GuessFeedback, SearchField};
use crate::state::SessionManager;
use anyhow::Result;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// Where a sub-menu loop sends the caller next
#[derive(Debug, PartialEq)]
enum Flow {
    Back,
    Quit,
}

/// Shell controller that wires the terminal up with session state and logic
///
/// This is the main coordinator for the interactive layer. It:
/// - Runs the main menu loop until the user quits or input ends
/// - Drives game rounds and library operations through [`SessionManager`]
/// - Prints every recoverable error and returns to the menu
///
/// Input and output are generic so tests can script a whole session
/// against in-memory buffers.
///
/// # Example
/// ```ignore
/// let session = SessionManager::open(store, &user_config.game);
/// let mut shell = ShellController::new(
///     session,
///     io::stdin().lock(),
///     io::stdout().lock(),
/// );
/// shell.run()?;  // Blocks until the user quits
/// ```
pub struct ShellController<R: BufRead, W: Write> {
    /// Shared session state manager
    session: SessionManager,

    /// Line-buffered input source
    input: R,

    /// Output sink for prompts and screens
    output: W,
}

impl<R: BufRead, W: Write> ShellController<R, W> {
    pub fn new(session: SessionManager, input: R, output: W) -> Self {
        Self {
            session,
            input,
            output,
        }
    }

    /// Run the main menu loop until the user quits or input ends
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "Welcome to Parlor.")?;
        if let Some(warning) = self.session.library_warning() {
            writeln!(self.output, "Warning: {warning}")?;
        }

        loop {
            writeln!(self.output)?;
            writeln!(self.output, "1) Guessing game")?;
            writeln!(self.output, "2) Personal library")?;
            writeln!(self.output, "q) Quit")?;
            let Some(choice) = self.prompt("> ")? else {
                break;
            };
            match choice.to_lowercase().as_str() {
                "1" => {
                    if self.game_loop()? == Flow::Quit {
                        break;
                    }
                }
                "2" => {
                    if self.library_loop()? == Flow::Quit {
                        break;
                    }
                }
                "q" | "quit" => break,
                "" => {}
                _ => writeln!(self.output, "Unknown choice.")?,
            }
        }

        writeln!(self.output, "Goodbye.")?;
        Ok(())
    }

    /// Print a label and read one trimmed line; None when input ended
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt for a number; None when input ended or the line did not parse
    fn prompt_number<T: FromStr>(&mut self, label: &str) -> Result<Option<T>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match raw.parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                writeln!(self.output, "Please enter a whole number.")?;
                Ok(None)
            }
        }
    }

    // --- Guessing game ---

    fn game_loop(&mut self) -> Result<Flow> {
        loop {
            self.print_game_screen()?;
            writeln!(self.output, "1) Guess  2) Difficulty  3) Range  4) New game  5) Back")?;
            let Some(choice) = self.prompt("> ")? else {
                return Ok(Flow::Quit);
            };
            match choice.as_str() {
                "1" => self.handle_guess()?,
                "2" => self.handle_difficulty()?,
                "3" => self.handle_range()?,
                "4" => {
                    self.session.reset_game();
                    writeln!(self.output, "New game started.")?;
                }
                "5" => return Ok(Flow::Back),
                "" => {}
                _ => writeln!(self.output, "Unknown choice.")?,
            }
        }
    }

    fn print_game_screen(&mut self) -> Result<()> {
        let game = self.session.snapshot().game;

        writeln!(self.output)?;
        writeln!(self.output, "-- Guessing Game --")?;
        writeln!(
            self.output,
            "Guess the number between {} and {}.",
            game.min_range(),
            game.max_range()
        )?;
        if game.max_attempts() > 0 {
            writeln!(
                self.output,
                "Attempts: {} of {}",
                game.attempts(),
                game.max_attempts()
            )?;
        } else {
            writeln!(self.output, "Attempts: {}", game.attempts())?;
        }
        if game.is_over() {
            let outcome = if game.status() == GameStatus::Won {
                "won"
            } else {
                "lost"
            };
            writeln!(
                self.output,
                "Round over - you {outcome}. Start a new game to play again."
            )?;
        }
        Ok(())
    }

    fn handle_guess(&mut self) -> Result<()> {
        let Some(raw) = self.prompt("Your guess: ")? else {
            return Ok(());
        };
        match self.session.submit_guess(&raw) {
            Ok(GuessFeedback::Won { guess, attempts }) => {
                let noun = if attempts == 1 { "attempt" } else { "attempts" };
                writeln!(
                    self.output,
                    "Correct! You guessed {guess} in {attempts} {noun}."
                )?;
            }
            Ok(GuessFeedback::TooLow { .. }) => {
                writeln!(self.output, "Too low! Try a higher number.")?;
            }
            Ok(GuessFeedback::TooHigh { .. }) => {
                writeln!(self.output, "Too high! Try a lower number.")?;
            }
            Ok(GuessFeedback::Lost { secret }) => {
                writeln!(self.output, "Out of attempts! The number was {secret}.")?;
            }
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(())
    }

    fn handle_difficulty(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "Difficulty: 1) Easy (10 attempts)  2) Medium (7)  3) Hard (5)  4) Unlimited"
        )?;
        let Some(choice) = self.prompt("Pick: ")? else {
            return Ok(());
        };
        let difficulty = match choice.to_lowercase().as_str() {
            "1" | "easy" => Difficulty::Easy,
            "2" | "medium" => Difficulty::Medium,
            "3" | "hard" => Difficulty::Hard,
            "4" | "unlimited" => Difficulty::Unlimited,
            _ => {
                writeln!(self.output, "Unknown difficulty.")?;
                return Ok(());
            }
        };
        self.session.set_difficulty(difficulty);
        writeln!(self.output, "Difficulty set. New game started.")?;
        Ok(())
    }

    fn handle_range(&mut self) -> Result<()> {
        let Some(min) = self.prompt_number::<i64>("New minimum: ")? else {
            return Ok(());
        };
        let Some(max) = self.prompt_number::<i64>("New maximum: ")? else {
            return Ok(());
        };
        // Keep whatever attempt budget the current difficulty set
        let budget = self.session.snapshot().game.max_attempts();
        match self.session.configure_game(min, max, budget) {
            Ok(_) => writeln!(
                self.output,
                "Range set to {min} through {max}. New game started."
            )?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(())
    }

    // --- Personal library ---

    fn library_loop(&mut self) -> Result<Flow> {
        loop {
            let total = self.session.read(|state| state.library.len());
            let noun = if total == 1 { "book" } else { "books" };
            writeln!(self.output)?;
            writeln!(self.output, "-- Personal Library ({total} {noun}) --")?;
            writeln!(
                self.output,
                "1) Add  2) Remove  3) Search  4) List all  5) Statistics  6) Save now  7) Back"
            )?;
            let Some(choice) = self.prompt("> ")? else {
                return Ok(Flow::Quit);
            };
            match choice.as_str() {
                "1" => self.handle_add_book()?,
                "2" => self.handle_remove_book()?,
                "3" => self.handle_search()?,
                "4" => self.handle_list()?,
                "5" => self.handle_stats()?,
                "6" => match self.session.save_library() {
                    Ok(()) => writeln!(self.output, "Library saved.")?,
                    Err(err) => writeln!(self.output, "{err}")?,
                },
                "7" => return Ok(Flow::Back),
                "" => {}
                _ => writeln!(self.output, "Unknown choice.")?,
            }
        }
    }

    fn handle_add_book(&mut self) -> Result<()> {
        let Some(title) = self.prompt("Title: ")? else {
            return Ok(());
        };
        let Some(author) = self.prompt("Author: ")? else {
            return Ok(());
        };
        let Some(publication_year) = self.prompt_number::<i32>("Publication year: ")? else {
            return Ok(());
        };
        let Some(genre) = self.prompt("Genre (optional): ")? else {
            return Ok(());
        };
        let Some(read) = self.prompt("Read it? (y/n): ")? else {
            return Ok(());
        };

        let draft = BookDraft {
            title,
            author,
            publication_year,
            genre: if genre.is_empty() { None } else { Some(genre) },
            read_status: matches!(read.to_lowercase().as_str(), "y" | "yes"),
        };
        match self.session.add_book(draft) {
            Ok(_) => writeln!(self.output, "Book added.")?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(())
    }

    fn handle_remove_book(&mut self) -> Result<()> {
        let books = self.session.list_books(false);
        if books.is_empty() {
            writeln!(self.output, "The library is empty.")?;
            return Ok(());
        }
        self.print_books(&books)?;

        let Some(position) = self.prompt_number::<usize>("Remove which number? ")? else {
            return Ok(());
        };
        // Resolve the displayed number to a stable id before removing
        let Some(book) = position.checked_sub(1).and_then(|index| books.get(index)) else {
            writeln!(self.output, "No book at position {position}.")?;
            return Ok(());
        };
        match self.session.remove_book(book.id) {
            Ok(removed) => writeln!(
                self.output,
                "Removed \"{}\" by {}.",
                removed.title, removed.author
            )?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(())
    }

    fn handle_search(&mut self) -> Result<()> {
        writeln!(self.output, "Search by: 1) Title  2) Author")?;
        let Some(choice) = self.prompt("Pick: ")? else {
            return Ok(());
        };
        let field = match choice.to_lowercase().as_str() {
            "1" | "title" => SearchField::Title,
            "2" | "author" => SearchField::Author,
            _ => {
                writeln!(self.output, "Unknown choice.")?;
                return Ok(());
            }
        };
        let Some(term) = self.prompt("Search for: ")? else {
            return Ok(());
        };

        match self.session.search_books(field, &term) {
            Ok(matches) if matches.is_empty() => writeln!(self.output, "No books matched.")?,
            Ok(matches) => {
                let noun = if matches.len() == 1 { "book" } else { "books" };
                writeln!(self.output, "Found {} {noun}:", matches.len())?;
                self.print_books(&matches)?;
            }
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(())
    }

    fn handle_list(&mut self) -> Result<()> {
        if self.session.read(|state| state.library.is_empty()) {
            writeln!(self.output, "The library is empty.")?;
            return Ok(());
        }
        let Some(sort) = self.prompt("Sort by title? (y/n): ")? else {
            return Ok(());
        };
        let sorted = matches!(sort.to_lowercase().as_str(), "y" | "yes");
        let books = self.session.list_books(sorted);
        self.print_books(&books)?;
        Ok(())
    }

    fn handle_stats(&mut self) -> Result<()> {
        let stats = self.session.library_stats();
        if stats.total == 0 {
            writeln!(self.output, "The library is empty.")?;
            return Ok(());
        }

        writeln!(self.output, "Total books: {}", stats.total)?;
        writeln!(
            self.output,
            "Read: {} ({:.1}%)",
            stats.read_count, stats.read_percentage
        )?;
        writeln!(self.output, "Unread: {}", stats.unread_count())?;
        writeln!(self.output, "By genre:")?;
        for (genre, count) in &stats.by_genre {
            writeln!(self.output, "  {genre}: {count}")?;
        }
        Ok(())
    }

    fn print_books(&mut self, books: &[Book]) -> Result<()> {
        for (index, book) in books.iter().enumerate() {
            let genre = book.genre.as_deref().unwrap_or("N/A");
            let status = if book.read_status { "Read" } else { "Unread" };
            writeln!(
                self.output,
                "{:>3}) \"{}\" by {} ({}) [{}] {}",
                index + 1,
                book.title,
                book.author,
                book.publication_year,
                genre,
                status
            )?;
        }
        Ok(())
    }
}

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of a guessing round
///
/// `Won` and `Lost` are terminal; only [`GuessGame::reset`] or
/// [`GuessGame::configure`] start a new round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameStatus {
    #[default]
    InProgress,
    Won,
    Lost,
}

/// Attempt-budget presets selectable from the shell or the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Unlimited,
}

impl Difficulty {
    /// Maximum guesses the preset allows; 0 means unlimited
    pub fn attempt_budget(&self) -> u32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 7,
            Difficulty::Hard => 5,
            Difficulty::Unlimited => 0,
        }
    }
}

/// Feedback returned for an evaluated guess
///
/// `Lost` carries the secret so the caller can reveal it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessFeedback {
    Won { guess: i64, attempts: u32 },
    TooLow { guess: i64 },
    TooHigh { guess: i64 },
    Lost { secret: i64 },
}

/// Errors from configuring or playing a game
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Minimum must be less than maximum (got {min} and {max})")]
    InvalidRange { min: i64, max: i64 },

    #[error("'{input}' is not a valid number")]
    InvalidGuess { input: String },
}

/// Number-guessing state machine
///
/// Owns the secret, the configured range, the attempt budget, and the
/// round outcome. One instance belongs to one session; nothing here is
/// persisted.
///
/// # Example
/// ```ignore
/// let mut game = GuessGame::with_settings(1, 100, 5)?;
/// match game.submit_guess("42")? {
///     GuessFeedback::Won { attempts, .. } => println!("won in {attempts}"),
///     GuessFeedback::TooLow { .. } => println!("higher"),
///     GuessFeedback::TooHigh { .. } => println!("lower"),
///     GuessFeedback::Lost { secret } => println!("it was {secret}"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GuessGame {
    secret: i64,
    min_range: i64,
    max_range: i64,
    max_attempts: u32,
    attempts: u32,
    status: GameStatus,
}

impl GuessGame {
    /// Create a game with the built-in defaults: range 1 through 100, unlimited attempts
    pub fn new() -> Self {
        let mut game = Self {
            secret: 0,
            min_range: 1,
            max_range: 100,
            max_attempts: 0,
            attempts: 0,
            status: GameStatus::InProgress,
        };
        game.reset();
        game
    }

    /// Create a game with explicit bounds and attempt budget
    ///
    /// # Arguments
    /// * `min_range` - Inclusive lower bound for the secret
    /// * `max_range` - Inclusive upper bound; must be above `min_range`
    /// * `max_attempts` - Guesses allowed before a forced loss; 0 for unlimited
    pub fn with_settings(min_range: i64, max_range: i64, max_attempts: u32) -> Result<Self, GameError> {
        let mut game = Self::new();
        game.configure(min_range, max_range, max_attempts)?;
        Ok(game)
    }

    /// Replace the range and attempt budget, then start a new round
    ///
    /// Fails with [`GameError::InvalidRange`] when `min_range >= max_range`;
    /// the previous configuration stays in effect in that case.
    pub fn configure(
        &mut self,
        min_range: i64,
        max_range: i64,
        max_attempts: u32,
    ) -> Result<(), GameError> {
        if min_range >= max_range {
            return Err(GameError::InvalidRange {
                min: min_range,
                max: max_range,
            });
        }

        self.min_range = min_range;
        self.max_range = max_range;
        self.max_attempts = max_attempts;
        self.reset();
        Ok(())
    }

    /// Apply a difficulty preset and start a new round
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.max_attempts = difficulty.attempt_budget();
        self.reset();
    }

    /// Start a new round: fresh secret, zero attempts, in progress
    pub fn reset(&mut self) {
        let mut rng = rand::rng();
        self.secret = rng.random_range(self.min_range..=self.max_range);
        self.attempts = 0;
        self.status = GameStatus::InProgress;
    }

    /// Evaluate one guess
    ///
    /// Non-numeric input returns [`GameError::InvalidGuess`] without touching
    /// the attempt counter. A finished round tolerates further submissions and
    /// answers with the existing terminal result instead of evaluating them.
    /// The win check runs before the exhaustion check, so the exact secret on
    /// the final permitted attempt still wins.
    pub fn submit_guess(&mut self, raw: &str) -> Result<GuessFeedback, GameError> {
        match self.status {
            GameStatus::Won => {
                return Ok(GuessFeedback::Won {
                    guess: self.secret,
                    attempts: self.attempts,
                });
            }
            GameStatus::Lost => {
                return Ok(GuessFeedback::Lost {
                    secret: self.secret,
                });
            }
            GameStatus::InProgress => {}
        }

        let input = raw.trim();
        let guess: i64 = input.parse().map_err(|_| GameError::InvalidGuess {
            input: input.to_string(),
        })?;

        self.attempts += 1;

        if guess == self.secret {
            self.status = GameStatus::Won;
            return Ok(GuessFeedback::Won {
                guess,
                attempts: self.attempts,
            });
        }

        if self.max_attempts == 0 || self.attempts < self.max_attempts {
            if guess > self.secret {
                Ok(GuessFeedback::TooHigh { guess })
            } else {
                Ok(GuessFeedback::TooLow { guess })
            }
        } else {
            self.status = GameStatus::Lost;
            Ok(GuessFeedback::Lost {
                secret: self.secret,
            })
        }
    }

    pub fn min_range(&self) -> i64 {
        self.min_range
    }

    pub fn max_range(&self) -> i64 {
        self.max_range
    }

    /// Configured attempt budget; 0 means unlimited
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Guesses evaluated since the round started
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Current target number; intended for post-round display and tests
    pub fn secret(&self) -> i64 {
        self.secret
    }

    pub fn is_over(&self) -> bool {
        self.status != GameStatus::InProgress
    }

    /// Guesses left in the budget, or None when unlimited
    pub fn remaining_attempts(&self) -> Option<u32> {
        if self.max_attempts == 0 {
            None
        } else {
            Some(self.max_attempts.saturating_sub(self.attempts))
        }
    }
}

impl Default for GuessGame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_defaults() {
        let game = GuessGame::new();

        assert_eq!(game.min_range(), 1);
        assert_eq!(game.max_range(), 100);
        assert_eq!(game.max_attempts(), 0);
        assert_eq!(game.attempts(), 0);
        assert_eq!(game.status(), GameStatus::InProgress);
        assert!(game.secret() >= 1 && game.secret() <= 100);
    }

    #[test]
    fn test_configure_rejects_inverted_range() {
        let mut game = GuessGame::new();

        let err = game.configure(50, 10, 3).unwrap_err();
        assert_eq!(err, GameError::InvalidRange { min: 50, max: 10 });

        // Prior configuration survives the failed call
        assert_eq!(game.min_range(), 1);
        assert_eq!(game.max_range(), 100);
        assert_eq!(game.max_attempts(), 0);
    }

    #[test]
    fn test_configure_rejects_equal_bounds() {
        let mut game = GuessGame::new();
        assert!(game.configure(7, 7, 0).is_err());
    }

    #[test]
    fn test_configure_resets_round() {
        let mut game = GuessGame::new();
        game.submit_guess("not a number").unwrap_err();
        let secret = game.secret();
        let _ = game.submit_guess(&(secret + 1).min(100).to_string());

        game.configure(10, 20, 5).unwrap();

        assert_eq!(game.attempts(), 0);
        assert_eq!(game.status(), GameStatus::InProgress);
        assert!(game.secret() >= 10 && game.secret() <= 20);
        assert_eq!(game.max_attempts(), 5);
    }

    #[test]
    fn test_difficulty_budgets() {
        assert_eq!(Difficulty::Easy.attempt_budget(), 10);
        assert_eq!(Difficulty::Medium.attempt_budget(), 7);
        assert_eq!(Difficulty::Hard.attempt_budget(), 5);
        assert_eq!(Difficulty::Unlimited.attempt_budget(), 0);
    }

    #[test]
    fn test_set_difficulty_starts_new_round() {
        let mut game = GuessGame::new();
        let _ = game.submit_guess("50");
        assert_eq!(game.attempts(), 1);

        game.set_difficulty(Difficulty::Hard);

        assert_eq!(game.max_attempts(), 5);
        assert_eq!(game.attempts(), 0);
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_invalid_guess_leaves_counters_alone() {
        let mut game = GuessGame::new();

        let err = game.submit_guess("forty-two").unwrap_err();
        assert!(matches!(err, GameError::InvalidGuess { .. }));
        assert_eq!(game.attempts(), 0);
        assert_eq!(game.status(), GameStatus::InProgress);

        // Whitespace around a number is fine; unlimited budget cannot lose
        let feedback = game.submit_guess("  12  ").unwrap();
        assert!(!matches!(feedback, GuessFeedback::Lost { .. }));
        assert_eq!(game.attempts(), 1);
    }

    #[test]
    fn test_correct_guess_wins() {
        let mut game = GuessGame::new();
        let secret = game.secret();

        let feedback = game.submit_guess(&secret.to_string()).unwrap();

        assert_eq!(
            feedback,
            GuessFeedback::Won {
                guess: secret,
                attempts: 1
            }
        );
        assert_eq!(game.status(), GameStatus::Won);
    }

    #[test]
    fn test_directional_hints() {
        let mut game = GuessGame::with_settings(1, 1000, 0).unwrap();
        let secret = game.secret();

        if secret > 1 {
            let low = game.submit_guess(&(secret - 1).to_string()).unwrap();
            assert_eq!(low, GuessFeedback::TooLow { guess: secret - 1 });
        }
        if secret < 1000 {
            let high = game.submit_guess(&(secret + 1).to_string()).unwrap();
            assert_eq!(high, GuessFeedback::TooHigh { guess: secret + 1 });
        }
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_budget_exhaustion_loses_on_final_wrong_guess() {
        let mut game = GuessGame::with_settings(1, 100, 3).unwrap();
        let secret = game.secret();
        let wrong = if secret == 100 { 1 } else { 100 };

        let first = game.submit_guess(&wrong.to_string()).unwrap();
        assert!(matches!(
            first,
            GuessFeedback::TooLow { .. } | GuessFeedback::TooHigh { .. }
        ));
        let second = game.submit_guess(&wrong.to_string()).unwrap();
        assert!(matches!(
            second,
            GuessFeedback::TooLow { .. } | GuessFeedback::TooHigh { .. }
        ));

        let third = game.submit_guess(&wrong.to_string()).unwrap();
        assert_eq!(third, GuessFeedback::Lost { secret });
        assert_eq!(game.attempts(), 3);
        assert_eq!(game.status(), GameStatus::Lost);
    }

    #[test]
    fn test_exact_secret_wins_on_last_attempt() {
        let mut game = GuessGame::with_settings(1, 100, 2).unwrap();
        let secret = game.secret();
        let wrong = if secret == 100 { 1 } else { 100 };

        game.submit_guess(&wrong.to_string()).unwrap();
        let feedback = game.submit_guess(&secret.to_string()).unwrap();

        assert_eq!(
            feedback,
            GuessFeedback::Won {
                guess: secret,
                attempts: 2
            }
        );
        assert_eq!(game.status(), GameStatus::Won);
    }

    #[test]
    fn test_terminal_round_ignores_further_guesses() {
        let mut game = GuessGame::with_settings(1, 100, 1).unwrap();
        let secret = game.secret();
        let wrong = if secret == 100 { 1 } else { 100 };

        let lost = game.submit_guess(&wrong.to_string()).unwrap();
        assert_eq!(lost, GuessFeedback::Lost { secret });

        // Further input, even unparseable, replays the terminal result
        let replay = game.submit_guess("garbage").unwrap();
        assert_eq!(replay, GuessFeedback::Lost { secret });
        assert_eq!(game.attempts(), 1);

        let mut won_game = GuessGame::new();
        let target = won_game.secret();
        won_game.submit_guess(&target.to_string()).unwrap();
        let replay = won_game.submit_guess("999").unwrap();
        assert_eq!(
            replay,
            GuessFeedback::Won {
                guess: target,
                attempts: 1
            }
        );
        assert_eq!(won_game.attempts(), 1);
    }

    #[test]
    fn test_remaining_attempts() {
        let mut game = GuessGame::with_settings(1, 100, 3).unwrap();
        assert_eq!(game.remaining_attempts(), Some(3));

        let secret = game.secret();
        let wrong = if secret == 100 { 1 } else { 100 };
        game.submit_guess(&wrong.to_string()).unwrap();
        assert_eq!(game.remaining_attempts(), Some(2));

        let unlimited = GuessGame::new();
        assert_eq!(unlimited.remaining_attempts(), None);
    }

    #[test]
    fn test_negative_ranges_supported() {
        let mut game = GuessGame::with_settings(-50, -10, 0).unwrap();
        assert!(game.secret() >= -50 && game.secret() <= -10);

        let feedback = game.submit_guess("-11").unwrap();
        match feedback {
            GuessFeedback::Won { guess, .. } => assert_eq!(guess, -11),
            GuessFeedback::TooLow { guess } | GuessFeedback::TooHigh { guess } => {
                assert_eq!(guess, -11)
            }
            GuessFeedback::Lost { .. } => panic!("unlimited budget cannot lose"),
        }
    }
}

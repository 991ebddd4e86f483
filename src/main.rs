//! Parlor - Number-Guessing Engine and Persisted Personal Library
//!
//! Main entry point for the terminal application.
//!
//! # Overview
//!
//! This binary crate provides the interactive shell frontend for Parlor.
//! It initializes:
//! - Configuration loading ([`ConfigManager`])
//! - Logging infrastructure (rotating file output)
//! - Session state ([`SessionManager`] - game round plus library collection)
//! - Shell controller ([`ShellController`] - bridges the terminal with business logic)
//!
//! Everything runs on the main thread: the shell loop blocks on stdin and
//! all store I/O is synchronous.
//!
//! # Execution Flow
//!
//! 1. Load YAML configuration from Parlor Data/
//! 2. Initialize logging → logs/parlor.<date>.log (debug level when configured)
//! 3. Open the library store named by the configuration
//! 4. Create SessionManager (Arc<RwLock<SessionState>>) seeded from config defaults
//! 5. Run the shell loop (blocks until the user quits)
//! 6. Log the session metrics summary
//!
//! # Configuration Files
//!
//! Expected in `Parlor Data/` directory:
//! - `Parlor Config.yaml`: Game defaults, library settings, debug mode
//! - `library.json`: The book collection (created on first save)

use anyhow::Result;
use parlor::ui::ShellController;
use parlor::{APP_NAME, ConfigManager, LibraryStore, SessionManager, VERSION};
use std::io;

/// Main entry point for the Parlor terminal application
///
/// This function orchestrates the complete application lifecycle:
/// 1. Configuration loading
/// 2. Logging setup
/// 3. Session state initialization
/// 4. Shell launch and execution
/// 5. Metrics summary on shutdown
///
/// # Returns
///
/// - `Ok(())` if the application ran and exited normally
/// - `Err(_)` if initialization or the shell loop failed
///
/// # Errors
///
/// This function can fail if:
/// - The configuration directory cannot be created (permissions)
/// - The configuration file exists but is invalid YAML
/// - Logging initialization fails (disk space, permissions)
/// - The terminal streams fail mid-session
fn main() -> Result<()> {
    // Configuration comes first so its debug flag can drive the log level
    let config_manager = ConfigManager::new("Parlor Data")?;
    let user_config = config_manager.load_user_config()?;

    let _guard = parlor::logging::setup_logging("logs", "parlor", user_config.debug_mode, false)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!("Configuration directory: {}", config_manager.config_dir());

    // Open the library store named by the configuration
    let store_path = config_manager.library_path(&user_config);
    let store = LibraryStore::new(&store_path);
    tracing::info!("Library store: {}", store_path);

    // Seed the session from configured defaults; a missing or corrupt
    // store leaves the library empty with a warning instead of failing
    let session = SessionManager::open(store, &user_config.game);
    tracing::info!("Session manager initialized");

    // Run the shell (blocks until the user quits or input ends)
    let mut shell = ShellController::new(session.clone(), io::stdin().lock(), io::stdout().lock());
    let result = shell.run();

    if let Err(ref err) = result {
        tracing::error!("Shell error: {}", err);
    }

    session.metrics().log_summary();
    tracing::info!("Application shutdown complete");

    result
}

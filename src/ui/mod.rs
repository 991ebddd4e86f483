// UI module - terminal shell logic
//
// This module contains:
// - ShellController: Main controller that wires up the terminal with state management

pub mod shell;

pub use shell::ShellController;

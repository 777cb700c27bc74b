//! Command implementations for the Tandem CLI.
//!
//! - [`dev`] - Development session
//! - [`check`] - Configuration validation
//!
//! Each command is implemented in its own module and provides an `execute`
//! function that takes the parsed command arguments and returns a Result.

pub mod check;
pub mod dev;
mod project;

// Re-export execute functions for convenience
pub use check::execute as check_execute;
pub use dev::execute as dev_execute;
pub use project::Project;

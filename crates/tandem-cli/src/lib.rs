//! Tandem CLI - development orchestration for server-rendered applications.
//!
//! Tandem drives two bundler pipelines side by side: the client bundle, served
//! by a hot-reloading development server, and the server bundle, executed as a
//! supervised child process that is restarted after every successful rebuild
//! and after crashes.
//!
//! # Architecture
//!
//! The CLI is organized into several key modules:
//!
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal output: spinners, colored status lines
//! - [`dev`] - The orchestration loop: event bus, build controllers, process
//!   supervision, watchers and the development server
//! - `commands` - Individual CLI command implementations
//!
//! # Example
//!
//! ```rust
//! use tandem_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     // CLI command implementations...
//!     Ok(())
//! }
//! ```

// Public modules
pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

// Re-export commonly used types
pub use error::{BuildError, CliError, Result};

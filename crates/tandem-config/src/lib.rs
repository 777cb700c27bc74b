pub mod config;
pub mod env;
pub mod error;
pub mod loading;
pub mod validation;

// Re-export main types
pub use config::*;
pub use env::{BuildDefines, EnvSnapshot, ENV_FILE};
pub use error::*;

// Re-export loading and validation
pub use loading::ConfigDiscovery;
pub use validation::{ConfigValidator, FsValidator, SchemaValidator};

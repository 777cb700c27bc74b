//! File-based config discovery for CLI use
//!
//! Merges settings from defaults, `tandem.toml` and `TANDEM_`-prefixed
//! environment variables. Priority: environment > file > defaults.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::config::TandemConfig;
use crate::error::{ConfigError, Result};

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use tandem_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load(None).unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    /// Create a new config discovery with a root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find `tandem.toml` in the root directory
    pub fn find(&self) -> Option<PathBuf> {
        let path = self.root.join(TandemConfig::FILE_NAME);
        path.is_file().then_some(path)
    }

    /// Load configuration, optionally from an explicit file.
    ///
    /// Without an explicit file, a missing `tandem.toml` is not an error: the
    /// defaults describe the conventional layout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` when `explicit` does not exist and
    /// `ConfigError::Load` for syntax or type errors.
    pub fn load(&self, explicit: Option<&Path>) -> Result<TandemConfig> {
        let file = match explicit {
            Some(path) => {
                let path = if path.is_relative() {
                    self.root.join(path)
                } else {
                    path.to_path_buf()
                };
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path));
                }
                Some(path)
            }
            None => self.find(),
        };

        self.figment(file.as_deref()).extract().map_err(ConfigError::from)
    }

    /// Path of the configuration file that `load` would read, if any.
    pub fn config_file(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) if path.is_relative() => Some(self.root.join(path)),
            Some(path) => Some(path.to_path_buf()),
            None => self.find(),
        }
    }

    fn figment(&self, file: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(TandemConfig::default()));

        if let Some(path) = file {
            tracing::debug!("loading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        // TANDEM_BUILD_DIR, TANDEM_SERVER__ENTRY, ...
        figment.merge(
            Env::prefixed("TANDEM_")
                .ignore(&["config", "define"])
                .split("__"),
        )
    }
}

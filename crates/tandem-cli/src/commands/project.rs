//! Project resolution shared by the commands.

use std::path::{Path, PathBuf};

use tandem_config::{ConfigDiscovery, ConfigValidator, EnvSnapshot, FsValidator, TandemConfig};

use crate::error::{CliError, Result};

/// A project root with its loaded configuration.
#[derive(Debug, Clone)]
pub struct Project {
    /// Absolute project root
    pub root: PathBuf,

    /// Configuration with every path absolutized against `root`
    pub config: TandemConfig,

    /// The `tandem.toml` in use, if any
    pub config_file: Option<PathBuf>,
}

impl Project {
    /// Resolve the root and load its configuration.
    ///
    /// The root is `cwd` when given (relative to the current directory),
    /// otherwise the current directory.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `cwd` is not a directory, and any
    /// loading error from the configuration.
    pub fn load(cwd: Option<&Path>, config: Option<&Path>) -> Result<Self> {
        let root = resolve_root(cwd)?;
        tracing::debug!("project root: {}", root.display());

        let discovery = ConfigDiscovery::new(&root);
        let loaded = discovery.load(config)?.absolutize(&root);
        let config_file = discovery.config_file(config);

        Ok(Self {
            root,
            config: loaded,
            config_file,
        })
    }

    /// Check that bundler configs and server sources exist on disk.
    pub fn validate(&self) -> Result<()> {
        FsValidator.validate(&self.config)?;
        Ok(())
    }

    /// Read `.env` and the process environment.
    pub fn env(&self, dev_port: Option<u16>) -> Result<EnvSnapshot> {
        Ok(EnvSnapshot::load(&self.root, dev_port)?)
    }
}

fn resolve_root(cwd: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    let root = match cwd {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => current.join(path),
        None => current,
    };

    if !root.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "Specified --cwd is not a directory: {}",
            root.display()
        )));
    }

    // Watcher events carry canonical paths
    Ok(root.canonicalize()?)
}

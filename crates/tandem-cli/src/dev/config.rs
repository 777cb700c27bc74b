//! Development session configuration.
//!
//! Combines the project configuration (`tandem.toml`) with the frozen
//! environment snapshot into everything a session needs: paths to watch,
//! the dev server address, and the commands for both bundlers and the server
//! runtime.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tandem_config::{EnvSnapshot, TandemConfig};

use super::client_build::ClientBuildOptions;
use super::command::CommandSpec;
use super::compiler::CommandCompiler;
use super::diagnostics::BuildTarget;
use super::orchestrator::Collaborators;
use super::process::CommandLauncher;
use super::server::DevServerOptions;
use super::server_build::ServerBuildOptions;
use crate::error::Result;

/// Development session configuration.
#[derive(Debug, Clone)]
pub struct DevConfig {
    /// Project root
    pub root: PathBuf,

    /// Build output, deleted at bootstrap
    pub build_dir: PathBuf,

    /// Files whose change ends the session
    pub config_files: Vec<PathBuf>,

    /// Client sources
    pub client_watch: Vec<PathBuf>,

    /// Server sources
    pub server_watch: Vec<PathBuf>,

    /// Patterns to ignore when watching sources
    pub watch_ignore: Vec<String>,

    /// Debounce delay in milliseconds for file changes
    pub debounce_ms: u64,

    /// Delay before a crashed server is restarted
    pub restart_delay: Duration,

    /// Dev server socket address (IP + port)
    pub addr: SocketAddr,

    /// Host advertised in URLs
    pub host: String,

    /// Directory served by the dev server
    pub public_dir: PathBuf,

    /// Serve index.html for unknown extension-less paths
    pub history_fallback: bool,

    /// Draw spinners and clear the terminal
    pub interactive: bool,
}

impl DevConfig {
    /// Build the session configuration.
    ///
    /// `config` must already be absolutized against `root`. `config_file` is
    /// the tandem config file in use, if any; it is watched alongside the
    /// bundler configs.
    pub fn from_project(
        root: &Path,
        config: &TandemConfig,
        config_file: Option<PathBuf>,
        env: &EnvSnapshot,
    ) -> Self {
        let mut config_files = vec![config.client.config.clone(), config.server.config.clone()];
        config_files.extend(config_file);

        Self {
            root: root.to_path_buf(),
            build_dir: config.build_dir.clone(),
            config_files,
            client_watch: config.client.watch.clone(),
            server_watch: config.server.watch.clone(),
            watch_ignore: config.watch_ignore.clone(),
            debounce_ms: config.debounce_ms,
            restart_delay: Duration::from_millis(config.restart_delay_ms),
            addr: SocketAddr::new(config.dev_server.bind, env.dev_port),
            host: env.host.clone(),
            public_dir: config.public_dir().to_path_buf(),
            history_fallback: config.dev_server.history_fallback,
            interactive: !crate::ui::is_ci(),
        }
    }

    /// URL of the dev server as seen by the browser.
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.addr.port())
    }

    pub fn client_options(&self) -> ClientBuildOptions {
        ClientBuildOptions {
            dev_server: DevServerOptions {
                addr: self.addr,
                history_fallback: self.history_fallback,
            },
            public_dir: self.public_dir.clone(),
            watch: self.client_watch.clone(),
            watch_ignore: self.watch_ignore.clone(),
            debounce_ms: self.debounce_ms,
            interactive: self.interactive,
        }
    }

    pub fn server_options(&self) -> ServerBuildOptions {
        ServerBuildOptions {
            watch: self.server_watch.clone(),
            watch_ignore: self.watch_ignore.clone(),
            debounce_ms: self.debounce_ms,
            restart_delay: self.restart_delay,
            interactive: self.interactive,
        }
    }
}

/// Command-backed compilers and launcher for a project.
///
/// Each bundler gets its own build definitions; the server runtime receives
/// the server definitions too, so values like `PORT` reach the process.
pub fn command_collaborators(
    root: &Path,
    config: &TandemConfig,
    env: &EnvSnapshot,
) -> Result<Collaborators> {
    let client_defines = env.client_defines();
    let server_defines = env.server_defines(&config.static_path(root), &config.manifest_path(root));

    let client = CommandSpec::from_slice("client bundler", &config.client.command)?
        .cwd(root)
        .envs(client_defines.env_vars());
    let server = CommandSpec::from_slice("server bundler", &config.server.command)?
        .cwd(root)
        .envs(server_defines.env_vars());
    let runtime = CommandSpec::from_slice("server runtime", &config.server.runtime)?
        .arg(config.server_entry())
        .cwd(root)
        .envs(server_defines.env_vars());

    Ok(Collaborators {
        client_compiler: Arc::new(CommandCompiler::new(BuildTarget::Client, client)),
        server_compiler: Arc::new(CommandCompiler::new(BuildTarget::Server, server)),
        launcher: Arc::new(CommandLauncher::new(runtime)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> EnvSnapshot {
        EnvSnapshot::from_vars([("DEV_PORT", "3001"), ("HOST", "dev.local")]).unwrap()
    }

    #[test]
    fn from_project_collects_paths() {
        let root = Path::new("/app");
        let config = TandemConfig::default().absolutize(root);
        let dev = DevConfig::from_project(root, &config, Some(root.join("tandem.toml")), &env());

        assert_eq!(dev.build_dir, PathBuf::from("/app/build"));
        assert_eq!(
            dev.config_files,
            vec![
                PathBuf::from("/app/scripts/config/webpack/client.js"),
                PathBuf::from("/app/scripts/config/webpack/server.js"),
                PathBuf::from("/app/tandem.toml"),
            ]
        );
        assert_eq!(dev.addr.port(), 3001);
        assert_eq!(dev.restart_delay, Duration::from_secs(5));
        assert_eq!(dev.server_url(), "http://dev.local:3001");
        assert_eq!(dev.public_dir, PathBuf::from("/app/build"));
    }

    #[test]
    fn options_carry_session_settings() {
        let root = Path::new("/app");
        let config = TandemConfig::default().absolutize(root);
        let dev = DevConfig::from_project(root, &config, None, &env());

        assert_eq!(dev.config_files.len(), 2);
        assert_eq!(dev.client_options().dev_server.addr, dev.addr);
        assert_eq!(dev.server_options().restart_delay, dev.restart_delay);
        assert_eq!(dev.server_options().watch, vec![PathBuf::from("/app/src/server")]);
    }

    #[test]
    fn collaborators_reject_empty_runtime() {
        let root = Path::new("/app");
        let mut config = TandemConfig::default().absolutize(root);
        config.server.runtime.clear();
        assert!(command_collaborators(root, &config, &env()).is_err());

        config.server.runtime = vec!["node".to_string()];
        assert!(command_collaborators(root, &config, &env()).is_ok());
    }
}

//! Project configuration for a tandem session.
//!
//! A project is described by `tandem.toml` at its root. Every field has a
//! default matching the conventional layout of a server-rendered app built with
//! webpack (`scripts/config/webpack/{client,server}.js`, sources under `src/`,
//! output under `build/`).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

/// Root configuration, loaded from `tandem.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TandemConfig {
    /// Build output directory, deleted at the start of every session
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Asset manifest file name, relative to the build directory
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Client bundle pipeline
    #[serde(default = "ClientConfig::default")]
    pub client: ClientConfig,

    /// Server bundle pipeline and runtime
    #[serde(default = "ServerConfig::default")]
    pub server: ServerConfig,

    /// Development HTTP server
    #[serde(default)]
    pub dev_server: DevServerConfig,

    /// Delay before restarting a crashed server process
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,

    /// Per-path debounce window for file-system events
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Patterns ignored by the source watchers
    #[serde(default = "default_watch_ignore")]
    pub watch_ignore: Vec<String>,
}

/// Client bundle pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Bundler command; its stdout is read as a JSON statistics document
    #[serde(default = "default_client_command")]
    pub command: Vec<String>,

    /// Bundler configuration file (watched; a change ends the session)
    #[serde(default = "default_client_config")]
    pub config: PathBuf,

    /// Source paths whose changes trigger a client rebuild
    #[serde(default = "default_client_watch")]
    pub watch: Vec<PathBuf>,

    /// Directory served by the dev server (defaults to the build directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            command: default_client_command(),
            config: default_client_config(),
            watch: default_client_watch(),
            public_dir: None,
        }
    }
}

/// Server bundle pipeline and the runtime that executes its output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bundler command; its stdout is read as a JSON statistics document
    #[serde(default = "default_server_command")]
    pub command: Vec<String>,

    /// Bundler configuration file (watched; a change ends the session)
    #[serde(default = "default_server_config")]
    pub config: PathBuf,

    /// Source paths whose changes trigger a server rebuild
    #[serde(default = "default_server_watch")]
    pub watch: Vec<PathBuf>,

    /// Compiled server entry, relative to the build directory
    #[serde(default = "default_server_entry")]
    pub entry: PathBuf,

    /// Runtime command; the compiled entry is appended as the last argument
    #[serde(default = "default_server_runtime")]
    pub runtime: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command: default_server_command(),
            config: default_server_config(),
            watch: default_server_watch(),
            entry: default_server_entry(),
            runtime: default_server_runtime(),
        }
    }
}

/// Development HTTP server settings. The port comes from `DEV_PORT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DevServerConfig {
    /// Interface to bind
    #[serde(default = "default_bind")]
    pub bind: IpAddr,

    /// Serve index.html for unknown extension-less paths
    #[serde(default = "default_history_fallback")]
    pub history_fallback: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            history_fallback: default_history_fallback(),
        }
    }
}

impl Default for TandemConfig {
    fn default() -> Self {
        Self {
            build_dir: default_build_dir(),
            manifest: default_manifest(),
            client: ClientConfig::default(),
            server: ServerConfig::default(),
            dev_server: DevServerConfig::default(),
            restart_delay_ms: default_restart_delay_ms(),
            debounce_ms: default_debounce_ms(),
            watch_ignore: default_watch_ignore(),
        }
    }
}

impl TandemConfig {
    /// File name looked up at the project root.
    pub const FILE_NAME: &'static str = "tandem.toml";

    /// Generate JSON Schema for tandem.toml.
    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(TandemConfig);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Resolve every relative path against `root`.
    pub fn absolutize(mut self, root: &Path) -> Self {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };

        join(&mut self.build_dir);
        join(&mut self.client.config);
        join(&mut self.server.config);
        self.client.watch.iter_mut().for_each(join);
        self.server.watch.iter_mut().for_each(join);
        if let Some(dir) = self.client.public_dir.as_mut() {
            join(dir);
        }
        self
    }

    /// Directory served by the dev server.
    pub fn public_dir(&self) -> &Path {
        self.client.public_dir.as_deref().unwrap_or(&self.build_dir)
    }

    /// Compiled server entry point.
    pub fn server_entry(&self) -> PathBuf {
        self.build_dir.join(&self.server.entry)
    }

    /// Static asset directory relative to `root`, as seen by the server bundle.
    pub fn static_path(&self, root: &Path) -> PathBuf {
        relative_to(&self.build_dir.join("static"), root)
    }

    /// Manifest path relative to `root`, as seen by the server bundle.
    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        relative_to(&self.build_dir.join(&self.manifest), root)
    }
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

pub fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

pub fn default_manifest() -> PathBuf {
    PathBuf::from("manifest.json")
}

pub fn default_client_config() -> PathBuf {
    PathBuf::from("scripts/config/webpack/client.js")
}

pub fn default_server_config() -> PathBuf {
    PathBuf::from("scripts/config/webpack/server.js")
}

pub fn default_client_command() -> Vec<String> {
    webpack_command(&default_client_config())
}

pub fn default_server_command() -> Vec<String> {
    webpack_command(&default_server_config())
}

fn webpack_command(config: &Path) -> Vec<String> {
    vec![
        "npx".to_string(),
        "webpack".to_string(),
        "--config".to_string(),
        config.display().to_string(),
        "--json".to_string(),
    ]
}

pub fn default_client_watch() -> Vec<PathBuf> {
    vec![PathBuf::from("src/client"), PathBuf::from("src/shared")]
}

pub fn default_server_watch() -> Vec<PathBuf> {
    vec![PathBuf::from("src/server")]
}

pub fn default_server_entry() -> PathBuf {
    PathBuf::from("server.js")
}

pub fn default_server_runtime() -> Vec<String> {
    ["node", "--trace-warnings", "-r", "source-map-support/register"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

pub fn default_history_fallback() -> bool {
    true
}

pub fn default_restart_delay_ms() -> u64 {
    5000
}

pub fn default_debounce_ms() -> u64 {
    100
}

pub fn default_watch_ignore() -> Vec<String> {
    vec![
        "node_modules".to_string(),
        "*.log".to_string(),
        "*.swp".to_string(),
        "*~".to_string(),
    ]
}

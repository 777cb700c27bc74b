//! Frozen environment snapshot shared by both bundle pipelines.
//!
//! The snapshot is read once at startup from `.env` plus the process
//! environment (the process wins, as with dotenv). Each pipeline receives its
//! own set of build definitions derived from it; nothing is re-read later.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{ConfigError, Result};

/// Environment file looked up at the project root.
pub const ENV_FILE: &str = ".env";

/// Values consumed from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvSnapshot {
    pub node_env: String,
    pub host: String,
    pub dev_port: u16,
    pub port: Option<String>,
    pub api_url: Option<String>,
    pub heroku: bool,
}

impl EnvSnapshot {
    /// Load `.env` from `root` and overlay the process environment.
    ///
    /// `NODE_ENV` is always `development`. `dev_port` overrides `DEV_PORT`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EnvFileMissing` when `root/.env` does not exist,
    /// and `MissingEnv`/`InvalidEnv` for an absent or malformed `DEV_PORT`.
    pub fn load(root: &Path, dev_port: Option<u16>) -> Result<Self> {
        let path = root.join(ENV_FILE);
        if !path.is_file() {
            return Err(ConfigError::EnvFileMissing(path));
        }

        let mut vars = HashMap::new();
        let entries = dotenvy::from_path_iter(&path).map_err(|e| ConfigError::EnvFile(e.to_string()))?;
        for entry in entries {
            let (key, value) = entry.map_err(|e| ConfigError::EnvFile(e.to_string()))?;
            vars.insert(key, value);
        }
        tracing::debug!("loaded {} variables from {}", vars.len(), path.display());

        vars.extend(std::env::vars());
        if let Some(port) = dev_port {
            vars.insert("DEV_PORT".to_string(), port.to_string());
        }

        Self::from_vars(vars)
    }

    /// Build a snapshot from raw variables.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let get = |name: &str| vars.get(name).filter(|v| !v.is_empty()).cloned();

        let raw_port = get("DEV_PORT").ok_or_else(|| ConfigError::MissingEnv("DEV_PORT".to_string()))?;
        let dev_port = raw_port.trim().parse::<u16>().map_err(|_| ConfigError::InvalidEnv {
            name: "DEV_PORT".to_string(),
            value: raw_port.clone(),
        })?;

        Ok(Self {
            node_env: "development".to_string(),
            host: get("HOST").unwrap_or_else(|| "localhost".to_string()),
            dev_port,
            port: get("PORT"),
            api_url: get("API_URL"),
            heroku: get("HEROKU").is_some(),
        })
    }

    pub fn is_development(&self) -> bool {
        self.node_env == "development"
    }

    /// Public path under which the dev server exposes client assets.
    pub fn public_path(&self) -> String {
        format!("http://{}:{}/", self.host, self.dev_port)
    }

    /// Definitions for the client bundle.
    pub fn client_defines(&self) -> BuildDefines {
        let mut defines = BuildDefines::default();
        defines.insert("SERVER", Value::Bool(false));
        defines.insert("CLIENT", Value::Bool(true));
        defines.insert("NODE_ENV", Value::String(self.node_env.clone()));
        defines.insert_opt("API_URL", self.api_url.as_deref());
        defines.insert("PUBLIC_PATH", Value::String(self.public_path()));
        defines
    }

    /// Definitions for the server bundle.
    ///
    /// `PORT` is left out on Heroku, where the platform assigns it at runtime.
    pub fn server_defines(&self, static_path: &Path, manifest_path: &Path) -> BuildDefines {
        let mut defines = BuildDefines::default();
        defines.insert("SERVER", Value::Bool(true));
        defines.insert("CLIENT", Value::Bool(false));
        defines.insert("NODE_ENV", Value::String(self.node_env.clone()));
        if !self.heroku {
            defines.insert_opt("PORT", self.port.as_deref());
        }
        defines.insert("DEV_PORT", Value::String(self.dev_port.to_string()));
        defines.insert_opt("API_URL", self.api_url.as_deref());
        defines.insert("STATIC_PATH", Value::String(static_path.display().to_string()));
        defines.insert("MANIFEST_PATH", Value::String(manifest_path.display().to_string()));
        defines.insert("PUBLIC_PATH", Value::String(self.public_path()));
        defines
    }
}

/// Build-time constants handed to one bundle pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildDefines(BTreeMap<String, Value>);

impl BuildDefines {
    /// Name of the variable carrying the `process.env.*` literal map.
    pub const DEFINE_VAR: &'static str = "TANDEM_DEFINE";

    fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    fn insert_opt(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.insert(key, Value::String(value.to_string()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Plain environment variables for the bundler process.
    pub fn env_vars(&self) -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = self
            .0
            .iter()
            .map(|(key, value)| {
                let raw = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), raw)
            })
            .collect();
        vars.push((Self::DEFINE_VAR.to_string(), self.to_define_json()));
        vars
    }

    /// `{"process.env.KEY": "<JSON literal>"}`, the shape DefinePlugin expects.
    pub fn to_define_json(&self) -> String {
        let map: BTreeMap<String, String> = self
            .0
            .iter()
            .map(|(key, value)| (format!("process.env.{key}"), value.to_string()))
            .collect();
        serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string())
    }
}

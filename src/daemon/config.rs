use super::errors::ConfigError;
use super::repo_config::{repo_defaults, RepoCfg};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::Path;

pub const DEFAULT_PORT: u16 = 8001;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub repositories: Vec<RepoCfg>,
}

/// Top level after the defaults are merged in. Repository entries stay untyped
/// until they get their own defaults.
#[derive(Deserialize)]
struct RawConfig {
    port: u16,
    repositories: Vec<Value>,
}

impl Config {
    /// Loads a JSON config file (or TOML, picked by extension) and fills in defaults.
    pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
        let display = path.display().to_string();
        let file_text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        let document = if path.extension().is_some_and(|ext| ext == "toml") {
            let value: toml::Value = toml::from_str(&file_text).map_err(|source| ConfigError::Toml {
                path: display,
                source,
            })?;
            serde_json::to_value(value)?
        } else {
            serde_json::from_str(&file_text).map_err(|source| ConfigError::Json {
                path: display,
                source,
            })?
        };

        Config::from_value(document)
    }

    pub fn from_value(document: Value) -> Result<Config, ConfigError> {
        let Value::Object(loaded) = document else {
            return Err(ConfigError::Shape("top level must be an object".to_string()));
        };
        let raw: RawConfig = serde_json::from_value(Value::Object(merge(&defaults(), &loaded)))?;

        let repo_defaults = repo_defaults();
        let mut repositories = Vec::with_capacity(raw.repositories.len());
        for (index, entry) in raw.repositories.into_iter().enumerate() {
            let Value::Object(entry) = entry else {
                return Err(ConfigError::Shape(format!("repositories[{index}] must be an object")));
            };
            let repo: RepoCfg = serde_json::from_value(Value::Object(merge(&repo_defaults, &entry)))?;
            repositories.push(repo);
        }

        Ok(Config { port: raw.port, repositories })
    }
}

fn defaults() -> Map<String, Value> {
    match json!({ "port": DEFAULT_PORT, "repositories": [] }) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Shallow key-wise merge: every key of `overrides` replaces the one in `defaults`.
pub fn merge(defaults: &Map<String, Value>, overrides: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

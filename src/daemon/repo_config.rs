use log::warn;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_URL: &str = "https://github.com/example/project";
pub const DEFAULT_PATH: &str = "~/Documents/Projects/project";
pub const DEFAULT_DEPLOY: &str = "git pull";

/// Values every repository entry starts from before its own keys are merged in.
pub fn repo_defaults() -> Map<String, Value> {
    match json!({
        "url": DEFAULT_URL,
        "path": DEFAULT_PATH,
        "deploy": DEFAULT_DEPLOY,
        "secret": "",
    }) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RepoCfg {
    /// Repository URL as sent in push notifications
    pub url: String,
    /// Local checkout path
    pub path: PathBuf,
    /// Shell command run inside `path` on every push
    pub deploy: String,
    /// Shared secret (loaded, never checked)
    pub secret: String,
}

impl RepoCfg {
    /// Checkout directory with a leading `~` expanded against `$HOME`.
    pub fn directory(&self) -> PathBuf {
        expand_home(&self.path)
    }
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

/// Read-only lookup from repository URL to its deploy settings.
#[derive(Debug, Default)]
pub struct Registry {
    repos: HashMap<String, RepoCfg>,
}

impl Registry {
    pub fn new(repositories: &[RepoCfg]) -> Registry {
        let mut repos = HashMap::with_capacity(repositories.len());
        for repo in repositories {
            if repos.insert(repo.url.clone(), repo.clone()).is_some() {
                warn!("{} is configured more than once, using the last entry", repo.url);
            }
        }
        Registry { repos }
    }

    pub fn get(&self, url: &str) -> Option<&RepoCfg> {
        self.repos.get(url)
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepoCfg> {
        self.repos.values()
    }
}

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DaemonError>;

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not bind to port {port} - {source}")]
    Bind { port: u16, source: io::Error },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("{failed} of {total} repositories failed the check")]
    CheckFailed { failed: usize, total: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config error: could not load config file '{path}' - {source}")]
    Read { path: String, source: io::Error },
    #[error("config error: '{path}' is not valid JSON - {source}")]
    Json { path: String, source: serde_json::Error },
    #[error("config error: '{path}' is not valid TOML - {source}")]
    Toml { path: String, source: toml::de::Error },
    #[error("config error: {0}")]
    Shape(String),
    #[error("config error: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid JSON!")]
    MalformedPayload,
    #[error("{url} just sent a webhook but is not configured?")]
    UnconfiguredRepository { url: String },
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("could not launch '{command}' - {source}")]
    Launch { command: String, source: io::Error },
    #[error("'{command}' exited with {}", exit_code(.code))]
    Exited { command: String, code: Option<i32> },
}

fn exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (killed by signal)".to_string(),
    }
}

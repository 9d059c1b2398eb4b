pub mod config;
pub mod deploy;
pub mod dispatcher;
pub mod errors;
pub mod git_ops;
pub mod logging;
pub mod repo_config;
pub mod server;
pub mod validator;

use chrono::Local;
use env_logger::{Builder, Env, Target};
use std::io::Write;

/// Logs to stdout as ` [HH:MM:SS] message`. `RUST_LOG` overrides the `info` default.
pub fn init() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stdout)
        .format(|buf, record| writeln!(buf, "{}{}", time_prefix(), record.args()))
        .init();
}

pub fn time_prefix() -> String {
    Local::now().format(" [%H:%M:%S] ").to_string()
}

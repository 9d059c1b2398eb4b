//! Fire-and-forget deploy commands.

use super::errors::ProcessError;
use log::{log, Level};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Something that can start a deploy command in a directory without waiting for it.
pub trait DeployRunner: Send + Sync {
    fn run(&self, directory: PathBuf, command: String);
}

/// Runs deploys as `sh -c` children on the tokio runtime and logs their output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl DeployRunner for ShellRunner {
    fn run(&self, directory: PathBuf, command: String) {
        let command = compose_command(&directory, &command);
        tokio::spawn(async move {
            let report = execute(command).await;
            log_report(&report);
        });
    }
}

#[derive(Debug)]
pub struct DeployReport {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub result: Result<(), ProcessError>,
}

/// `cd "<directory>" && <command>` so the whole thing runs in one shell.
pub fn compose_command(directory: &Path, command: &str) -> String {
    let mut quoted = String::new();
    for ch in directory.to_string_lossy().chars() {
        if matches!(ch, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    format!("cd \"{quoted}\" && {command}")
}

pub async fn execute(command: String) -> DeployReport {
    let output = match Command::new("sh").arg("-c").arg(&command).output().await {
        Ok(output) => output,
        Err(source) => {
            return DeployReport {
                result: Err(ProcessError::Launch { command: command.clone(), source }),
                command,
                stdout: String::new(),
                stderr: String::new(),
            }
        }
    };

    let result = if output.status.success() {
        Ok(())
    } else {
        Err(ProcessError::Exited {
            command: command.clone(),
            code: output.status.code(),
        })
    };

    DeployReport {
        command,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        result,
    }
}

pub fn log_report(report: &DeployReport) {
    for (level, line) in report_lines(report) {
        log!(level, "{line}");
    }
}

/// Start marker, any output, the failure if there was one, end marker.
fn report_lines(report: &DeployReport) -> Vec<(Level, String)> {
    let mut lines = vec![(Level::Info, format!("---- {} ----", report.command))];
    if !report.stdout.is_empty() {
        lines.push((Level::Info, report.stdout.trim_end().to_string()));
    }
    if !report.stderr.is_empty() {
        lines.push((Level::Warn, report.stderr.trim_end().to_string()));
    }
    if let Err(error) = &report.result {
        lines.push((Level::Error, error.to_string()));
    }
    lines.push((Level::Info, "----- end of deploy output -----".to_string()));
    lines
}

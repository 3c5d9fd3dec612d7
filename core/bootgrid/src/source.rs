//! Session record acquisition.
//!
//! Runs the session-history command once and returns its stdout, or reads
//! the same text from a file or stdin. No retries; any failure is fatal.

use std::io::{self, Read};
use std::path::Path;
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("No session-history command configured")]
    NoCommand,

    #[error("'{program}' was not found; install it or set `command` in the config file")]
    NotFound { program: String },

    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to read session records from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Runs `command` (program followed by arguments) and returns its stdout.
pub fn run_command(command: &[String]) -> Result<String, SourceError> {
    let (program, args) = command.split_first().ok_or(SourceError::NoCommand)?;
    let command_line = command.join(" ");
    tracing::debug!(command = %command_line, "running session-history command");

    let output = Command::new(program).args(args).output().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            SourceError::NotFound {
                program: program.clone(),
            }
        } else {
            SourceError::Spawn {
                command: command_line.clone(),
                source: e,
            }
        }
    })?;

    if !output.status.success() {
        return Err(SourceError::Failed {
            command: command_line,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Reads records from `path`, or from stdin when `path` is `-`.
///
/// Invalid UTF-8 is replaced rather than rejected; the affected lines then
/// fail to parse and are skipped.
pub fn read_input(path: &Path) -> Result<String, SourceError> {
    if path.as_os_str() == "-" {
        return read_records(io::stdin().lock(), "stdin");
    }

    fs_err::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|e| SourceError::Read {
            path: path.display().to_string(),
            source: e,
        })
}

fn read_records(mut reader: impl Read, name: &str) -> Result<String, SourceError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| SourceError::Read {
            path: name.to_string(),
            source: e,
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

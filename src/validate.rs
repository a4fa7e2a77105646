//! Per-record validation hook.
//!
//! Write and update runs can hand every raw record to an external
//! validator before anything is transformed or committed. The hook is an
//! injected capability resolved once at startup from `--validator`; the
//! pipeline only sees the trait.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// A validation capability: raw serialized record in, verdict out.
pub trait RecordValidator {
    /// Check one record, given its raw JSON bytes. An `Err` aborts the
    /// whole run.
    fn validate(&self, raw: &[u8]) -> Result<()>;
}

/// Runs a user-supplied command per record, record JSON on stdin.
///
/// A zero exit status passes; anything else fails the run with the
/// command's stderr as the detail.
pub struct CommandValidator {
    program: String,
    args: Vec<String>,
}

impl CommandValidator {
    /// Split a command line on whitespace into program and arguments.
    pub fn new(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(String::from);
        let Some(program) = parts.next() else {
            return Err(Error::Config("validator command is empty".to_string()));
        };
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl RecordValidator for CommandValidator {
    fn validate(&self, raw: &[u8]) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::ValidationFailed {
                detail: format!("could not run validator '{}': {e}", self.program),
            })?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin.write_all(raw)?;
        }
        let output = child.wait_with_output()?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        Err(Error::ValidationFailed {
            detail: if stderr.is_empty() {
                format!("validator exited with {}", output.status)
            } else {
                stderr.to_string()
            },
        })
    }
}

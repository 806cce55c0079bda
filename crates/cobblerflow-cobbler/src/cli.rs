//! cobbler CLI wrapper
//!
//! Every mutation goes through the `cobbler` executable, one process per
//! command, awaited to completion before the next one starts.

use crate::error::{CobblerError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// cobbler CLI wrapper
#[derive(Debug, Clone)]
pub struct Cobbler {
    bin: PathBuf,
    timeout: Duration,
}

impl Cobbler {
    pub fn new(bin: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    /// Run `cobbler <args>` and return stdout
    ///
    /// On a non-zero exit the combined stdout and stderr is returned as the
    /// error output, since cobbler reports some failures on stdout.
    pub async fn run(&self, args: &[String]) -> Result<String> {
        let line = args.join(" ");
        let mut cmd = Command::new(&self.bin);
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!("Running: {} {}", self.bin.display(), line);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CobblerError::CobblerNotFound(self.bin.clone()));
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(CobblerError::Timeout(self.timeout)),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CobblerError::CommandFailed {
                command: line,
                output: format!("{}{}", stdout, stderr).trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

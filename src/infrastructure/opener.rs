//! Link openers used for fallback navigation.

use std::process::{Command, Stdio};
use std::thread;

use tracing::{info, warn};
use url::Url;

use crate::domain::ports::LinkOpener;
use crate::error::OpenError;

/// Opens URLs by spawning an external program, e.g. `xdg-open` or `open`.
///
/// The caller does not wait for the program; a background thread reaps it on exit.
#[derive(Debug, Clone)]
pub struct CommandOpener {
    program: String,
}

impl CommandOpener {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl LinkOpener for CommandOpener {
    fn open(&self, url: &Url) -> Result<(), OpenError> {
        let mut child = Command::new(&self.program)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        info!(program = %self.program, url = %url, pid = child.id(), "Launched opener");

        let program = self.program.clone();
        thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => {
                warn!(program = %program, status = %status, "Opener exited with failure")
            }
            Ok(_) => {}
            Err(e) => warn!(program = %program, error = %e, "Failed to wait for opener"),
        });
        Ok(())
    }
}

/// Opener that only logs the URL. Used when no opener program is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingOpener;

impl LinkOpener for LoggingOpener {
    fn open(&self, url: &Url) -> Result<(), OpenError> {
        info!(url = %url, "Fallback URL (not opened)");
        Ok(())
    }
}

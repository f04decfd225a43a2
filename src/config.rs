//! Runtime settings for one invocation.

use crate::error::Result;
use crate::profile::ProfileTable;
use crate::script::PowerShell;
use std::time::Duration;

/// Default wait for a PowerShell child process.
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shell used to run automation scripts.
#[cfg(target_os = "windows")]
pub const DEFAULT_SHELL: &str = "powershell.exe";
#[cfg(not(target_os = "windows"))]
pub const DEFAULT_SHELL: &str = "pwsh";

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Config {
    pub shell: String,
    pub script_timeout: Duration,
    pub profiles: ProfileTable,
}

impl Config {
    /// Defaults with the built-in profile table.
    pub fn new() -> Result<Self> {
        Ok(Self {
            shell: DEFAULT_SHELL.to_string(),
            script_timeout: DEFAULT_SCRIPT_TIMEOUT,
            profiles: ProfileTable::builtin()?,
        })
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = timeout;
        self
    }

    /// Script host built from these settings.
    pub fn script_host(&self) -> PowerShell {
        PowerShell::new(self.shell.clone(), self.script_timeout)
    }
}

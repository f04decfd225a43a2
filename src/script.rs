//! Running PowerShell scripts in a child process.
//!
//! Both the device resolver and the fallback applicator talk to WMI through
//! PowerShell. Scripts write a single JSON document to stdout; stderr is kept
//! verbatim for reporting.

use crate::error::{Error, Result};
use base64::engine::{Engine, general_purpose};
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Hide the console window PowerShell would otherwise flash.
#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Captured streams of a finished script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutput {
    /// Whether the script wrote anything to its error stream.
    pub fn has_errors(&self) -> bool {
        !self.stderr.trim().is_empty()
    }

    /// Stdout, or [`Error::ChildProcess`] if the script only produced errors.
    pub fn into_stdout(self) -> Result<String> {
        if self.stdout.trim().is_empty() && self.has_errors() {
            return Err(Error::ChildProcess(self.stderr.trim().to_string()));
        }
        if self.has_errors() {
            log::warn!("PowerShell error: {}", self.stderr.trim());
        }
        Ok(self.stdout)
    }
}

/// Something that can execute an automation script.
pub trait ScriptHost {
    /// Run `script` to completion and capture its output.
    fn run(&self, script: &str) -> Result<ScriptOutput>;
}

impl<H: ScriptHost + ?Sized> ScriptHost for &H {
    fn run(&self, script: &str) -> Result<ScriptOutput> {
        (**self).run(script)
    }
}

/// Runs scripts with `powershell.exe -EncodedCommand`.
#[derive(Debug, Clone)]
pub struct PowerShell {
    program: String,
    timeout: Duration,
}

impl PowerShell {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn command(&self, script: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args([
            "-NoProfile",
            "-NonInteractive",
            "-ExecutionPolicy",
            "Bypass",
            "-EncodedCommand",
        ]);
        cmd.arg(encode_command(script));

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd
    }
}

impl ScriptHost for PowerShell {
    fn run(&self, script: &str) -> Result<ScriptOutput> {
        log::debug!("running {} script ({} bytes)", self.program, script.len());
        run_with_timeout(self.command(script), self.timeout)
    }
}

/// Run `cmd` with piped output, killing it if it outlives `timeout`.
pub fn run_with_timeout(mut cmd: Command, timeout: Duration) -> Result<ScriptOutput> {
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    let mut child = cmd.spawn()?;

    // Drain both pipes concurrently so the child never blocks on a full buffer.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            kill(&mut child);
            return Err(Error::TimedOut(timeout));
        }
        Err(e) => {
            kill(&mut child);
            return Err(Error::Spawn(e));
        }
    };
    log::debug!("{:?} exited with {status}", cmd.get_program());

    Ok(ScriptOutput {
        stdout: join(stdout)?,
        stderr: join(stderr)?,
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<std::io::Result<String>> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut bytes)?;
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    })
}

fn join(handle: JoinHandle<std::io::Result<String>>) -> Result<String> {
    handle
        .join()
        .map_err(|_| Error::Platform("output reader thread panicked".into()))?
        .map_err(Error::Spawn)
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Base64 of the UTF-16LE script text, as `-EncodedCommand` expects. This
/// sidesteps command-line quoting of the script body.
pub fn encode_command(script: &str) -> String {
    let bytes: Vec<u8> = script.encode_utf16().flat_map(u16::to_le_bytes).collect();
    general_purpose::STANDARD.encode(bytes)
}

/// Quote `value` as a single-quoted PowerShell string literal.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

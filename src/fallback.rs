//! Fallback application through the PowerShell automation channel.
//!
//! Some drivers reject `ChangeDisplaySettingsEx` from an ordinary process but
//! accept it when issued from PowerShell. The script locates the monitor in
//! `WmiMonitorBasicDisplayParams` and then calls `ChangeDisplaySettingsExW`
//! with a null mode pointer.
//!
//! The call only probes that the device is reachable; the requested geometry
//! is not passed along. A `Succeeded` report therefore does not guarantee that
//! the mode changed.

use crate::error::Error;
use crate::mode::DisplayMode;
use crate::resolver::MonitorIdentity;
use crate::script::{ScriptHost, quote};
use serde::Deserialize;
use std::fmt;

/// `{target}` is replaced with the quoted instance name.
const PROBE_SCRIPT: &str = r#"$ErrorActionPreference = 'Stop'
$target = {target}
$pattern = '*' + [System.Management.Automation.WildcardPattern]::Escape($target) + '*'
$display = Get-CimInstance -Namespace root\wmi -ClassName WmiMonitorBasicDisplayParams |
    Where-Object { $_.InstanceName -like $pattern } | Select-Object -First 1
if (-not $display) {
    ConvertTo-Json -Compress -InputObject ([pscustomobject]@{ Status = 'MonitorNotFound'; Code = 0 })
    return
}
Add-Type -TypeDefinition @'
using System;
using System.Runtime.InteropServices;
public static class ScreenConfigProbe {
    [DllImport("user32.dll", CharSet = CharSet.Unicode)]
    public static extern int ChangeDisplaySettingsExW(string lpszDeviceName, IntPtr lpDevMode, IntPtr hwnd, uint dwflags, IntPtr lParam);
}
'@
$code = [ScreenConfigProbe]::ChangeDisplaySettingsExW($target, [IntPtr]::Zero, [IntPtr]::Zero, 0, [IntPtr]::Zero)
$status = if ($code -eq 0) { 'Succeeded' } else { 'Failed' }
ConvertTo-Json -Compress -InputObject ([pscustomobject]@{ Status = $status; Code = $code })"#;

/// What the fallback path observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReport {
    /// The native call returned success from the automation channel.
    Succeeded,
    /// The native call returned a non-zero code.
    Failed { code: i32 },
    /// The automation channel found no monitor with that instance name.
    MonitorNotFound,
    /// The script could not be run or its output could not be read.
    Unavailable { reason: String },
}

impl fmt::Display for FallbackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReport::Succeeded => f.write_str("Resolution changed successfully."),
            FallbackReport::Failed { code } => {
                write!(f, "Failed to change resolution. Error Code: {code}")
            }
            FallbackReport::MonitorNotFound => f.write_str("Monitor not found."),
            FallbackReport::Unavailable { reason } => write!(f, "Fallback unavailable: {reason}"),
        }
    }
}

/// Second attempt after the primary path was rejected.
pub trait FallbackApplicator {
    /// Best effort; problems are described by the returned report.
    fn apply_fallback(&self, identity: &MonitorIdentity, mode: DisplayMode) -> FallbackReport;
}

impl<F: FallbackApplicator + ?Sized> FallbackApplicator for &F {
    fn apply_fallback(&self, identity: &MonitorIdentity, mode: DisplayMode) -> FallbackReport {
        (**self).apply_fallback(identity, mode)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProbeResult {
    status: String,
    #[serde(default)]
    code: i32,
}

/// Fallback that runs the probe script through a [`ScriptHost`].
#[derive(Debug, Clone)]
pub struct ScriptFallback<H> {
    host: H,
}

impl<H: ScriptHost> ScriptFallback<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// The script that would be run for `instance_name`.
    pub fn script(instance_name: &str) -> String {
        PROBE_SCRIPT.replace("{target}", &quote(instance_name))
    }

    fn run(&self, identity: &MonitorIdentity) -> crate::Result<FallbackReport> {
        let script = Self::script(identity.instance_name());
        let stdout = self.host.run(&script)?.into_stdout()?;
        parse_report(&stdout)
    }
}

impl<H: ScriptHost> FallbackApplicator for ScriptFallback<H> {
    fn apply_fallback(&self, identity: &MonitorIdentity, mode: DisplayMode) -> FallbackReport {
        log::info!(
            "falling back to PowerShell for {} (requested {mode}, probe only)",
            identity.instance_name()
        );
        let report = self.run(identity).unwrap_or_else(|e| FallbackReport::Unavailable {
            reason: e.to_string(),
        });
        if report == FallbackReport::MonitorNotFound {
            log::warn!(
                "{}",
                Error::FallbackUnreachable(identity.instance_name().to_string())
            );
        }
        report
    }
}

fn parse_report(stdout: &str) -> crate::Result<FallbackReport> {
    let result: ProbeResult = serde_json::from_str(stdout.trim())?;
    Ok(match result.status.as_str() {
        "Succeeded" => FallbackReport::Succeeded,
        "MonitorNotFound" => FallbackReport::MonitorNotFound,
        "Failed" => FallbackReport::Failed { code: result.code },
        other => FallbackReport::Unavailable {
            reason: format!("unexpected probe status '{other}'"),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptOutput;
    use std::cell::RefCell;

    struct FakeHost {
        result: fn() -> crate::Result<ScriptOutput>,
        scripts: RefCell<Vec<String>>,
    }

    impl FakeHost {
        fn new(result: fn() -> crate::Result<ScriptOutput>) -> Self {
            Self {
                result,
                scripts: RefCell::new(Vec::new()),
            }
        }
    }

    impl ScriptHost for FakeHost {
        fn run(&self, script: &str) -> crate::Result<ScriptOutput> {
            self.scripts.borrow_mut().push(script.to_string());
            (self.result)()
        }
    }

    fn stdout(s: &str) -> crate::Result<ScriptOutput> {
        Ok(ScriptOutput {
            stdout: s.to_string(),
            stderr: String::new(),
        })
    }

    fn identity() -> MonitorIdentity {
        MonitorIdentity::new(r"DISPLAY\GSM5B7F\5&1a2b3c&0&UID4353_0", "LG ULTRAGEAR").unwrap()
    }

    fn mode() -> DisplayMode {
        DisplayMode::new(1920, 1080, 60).unwrap()
    }

    #[test]
    fn test_script_embeds_quoted_instance() {
        let script = ScriptFallback::<&FakeHost>::script("DISPLAY\\O'Brien_0");
        assert!(script.contains("$target = 'DISPLAY\\O''Brien_0'"));
        assert!(!script.contains("{target}"));
        // Here-string terminator must start a line.
        assert!(script.contains("\n'@\n"));
    }

    #[test]
    fn test_succeeded() {
        let host = FakeHost::new(|| stdout("{\"Status\":\"Succeeded\",\"Code\":0}\r\n"));
        let report = ScriptFallback::new(&host).apply_fallback(&identity(), mode());
        assert_eq!(report, FallbackReport::Succeeded);
        assert_eq!(host.scripts.borrow().len(), 1);
        assert!(host.scripts.borrow()[0].contains("UID4353_0"));
    }

    #[test]
    fn test_failed_code() {
        let host = FakeHost::new(|| stdout("{\"Status\":\"Failed\",\"Code\":-2}"));
        let report = ScriptFallback::new(&host).apply_fallback(&identity(), mode());
        assert_eq!(report, FallbackReport::Failed { code: -2 });
        assert_eq!(report.to_string(), "Failed to change resolution. Error Code: -2");
    }

    #[test]
    fn test_monitor_not_found() {
        let host = FakeHost::new(|| stdout("{\"Status\":\"MonitorNotFound\",\"Code\":0}"));
        let report = ScriptFallback::new(&host).apply_fallback(&identity(), mode());
        assert_eq!(report, FallbackReport::MonitorNotFound);
    }

    #[test]
    fn test_host_errors_become_unavailable() {
        let host = FakeHost::new(|| Err(Error::TimedOut(std::time::Duration::from_secs(30))));
        let report = ScriptFallback::new(&host).apply_fallback(&identity(), mode());
        assert!(matches!(report, FallbackReport::Unavailable { .. }));
    }

    #[test]
    fn test_stderr_noise_does_not_hide_status() {
        let host = FakeHost::new(|| {
            Ok(ScriptOutput {
                stdout: "{\"Status\":\"Failed\",\"Code\":-2}".into(),
                stderr: "WARNING: Add-Type compiled with warnings".into(),
            })
        });
        let report = ScriptFallback::new(&host).apply_fallback(&identity(), mode());
        assert_eq!(report, FallbackReport::Failed { code: -2 });
        assert_eq!(host.scripts.borrow().len(), 1);
    }

    #[test]
    fn test_stderr_only_is_unavailable() {
        let host = FakeHost::new(|| {
            Ok(ScriptOutput {
                stdout: String::new(),
                stderr: "Add-Type : Cannot add type".into(),
            })
        });
        match ScriptFallback::new(&host).apply_fallback(&identity(), mode()) {
            FallbackReport::Unavailable { reason } => assert!(reason.contains("Cannot add type")),
            other => panic!("unexpected report {other:?}"),
        }
    }

    #[test]
    fn test_garbage_output_is_unavailable() {
        let host = FakeHost::new(|| stdout("Resolution changed successfully."));
        let report = ScriptFallback::new(&host).apply_fallback(&identity(), mode());
        assert!(matches!(report, FallbackReport::Unavailable { .. }));
    }

    #[test]
    fn test_unknown_status() {
        assert!(matches!(
            parse_report("{\"Status\":\"Maybe\"}").unwrap(),
            FallbackReport::Unavailable { .. }
        ));
    }
}

//! Command-line front end.
//!
//! Every outcome, including failures, is reported on stdout and the process
//! always exits with status 0.

use crate::apply::{ApplyResult, ModeApplicator, reset_display};
use crate::commands::{SetMonitor, SetMonitorReport, set_monitor};
use crate::config::{Config, DEFAULT_SCRIPT_TIMEOUT};
use crate::display::{self, AdapterInfo};
use crate::error::Error;
use crate::fallback::{FallbackReport, ScriptFallback};
use crate::mode::ChangeScope;
use crate::modes::list_modes;
use crate::profile::CustomMode;
use crate::resolver::{DeviceResolver, WmiMonitorQuery};
use clap::error::ErrorKind;
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::time::Duration;

const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Command words, in the order they are documented.
const COMMANDS: [&str; 6] = [
    "usage",
    "listmonitors",
    "setmonitor",
    "deviceinfo",
    "resetmonitor",
    "listdisplaymodes",
];

const USAGE: &str = r#"Usage: screenconfig [setmonitor] ["monitorname"] [ClientName] [CustomWidth] [CustomHeight] [CustomRefreshRate] [--check | --session]

Parameters:
  setmonitor: Command to set monitor settings.
  'monitorname': The name of the monitor (e.g., '\\.\DISPLAY1', 'LG ULTRAGEAR'). Monitor names with spaces must be in quotes.
  ClientName: A string value to specify the target device (steamdecklcd, xbox, custom).
    Example: steamdecklcd, xbox, custom
    If you select 'custom', you must provide the custom resolution, refresh rate.
  CustomWidth (optional): Integer specifying the screen width (required for 'custom').
    Example: 1920
  CustomHeight (optional): Integer specifying the screen height (required for 'custom').
    Example: 1080
  CustomRefreshRate (optional): Integer specifying the screen refresh rate in Hz (required for 'custom').
    Example: 60
  --check (optional): Only ask the driver whether the mode would be accepted.
  --session (optional): Apply the mode without saving it to the registry.

Other commands:
  usage                            Show this text.
  listmonitors                     List graphics adapters and their outputs.
  deviceinfo "monitorname"         Show the instance name and device id of a monitor.
  listdisplaymodes "devicename"    List every mode a display device reports.
  resetmonitor                     Reset the display settings to the registry defaults.

Options:
  -v, --verbose                    Log more detail to stderr (repeat for more).
  --script-timeout <SECONDS>       Seconds to wait for PowerShell (default 30).
  --shell <PROGRAM>                PowerShell executable to use.

Examples:
  screenconfig setmonitor "LG ULTRAGEAR" custom 1920 1080 60
    Applies custom resolution 1920x1080, 60Hz to 'LG ULTRAGEAR'.

  screenconfig resetmonitor
    Resets the display settings to default.
"#;

/// Parsed command line.
#[derive(Debug, Parser)]
#[command(
    name = "screenconfig",
    version,
    disable_help_subcommand = true,
    disable_help_flag = true
)]
pub struct Cli {
    /// Log more detail to stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Seconds to wait for a PowerShell child process.
    #[arg(long, value_name = "SECONDS", global = true)]
    pub script_timeout: Option<u64>,

    /// PowerShell executable.
    #[arg(long, value_name = "PROGRAM", global = true)]
    pub shell: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print help text.
    #[command(name = "usage")]
    Usage,
    /// Enumerate adapters and their outputs.
    #[command(name = "listmonitors")]
    ListMonitors,
    /// Apply a client profile or custom mode to a monitor.
    #[command(name = "setmonitor", allow_negative_numbers = true)]
    SetMonitor {
        monitor_name: String,
        client_name: String,
        width: Option<i64>,
        height: Option<i64>,
        refresh_rate: Option<i64>,
        /// Only test whether the mode would be accepted.
        #[arg(long, conflicts_with = "session")]
        check: bool,
        /// Apply without writing the registry profile.
        #[arg(long)]
        session: bool,
    },
    /// Show the resolved identity of a monitor.
    #[command(name = "deviceinfo")]
    DeviceInfo { monitor_name: String },
    /// Reset display configuration to the registry defaults.
    #[command(name = "resetmonitor")]
    ResetMonitor,
    /// List every display mode a device reports.
    #[command(name = "listdisplaymodes")]
    ListDisplayModes { monitor_name: String },
}

impl Cli {
    fn config(&self) -> crate::Result<Config> {
        let mut config = Config::new()?;
        if let Some(shell) = &self.shell {
            config = config.with_shell(shell.clone());
        }
        let timeout = self
            .script_timeout
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SCRIPT_TIMEOUT);
        Ok(config.with_script_timeout(timeout))
    }
}

/// Parse `args` (including the program name) and run the command.
pub fn run(args: Vec<String>) {
    let (args, command_word) = normalize_command(args);
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            init_logging(cli.verbose);
            execute(cli);
        }
        Err(e) => {
            for line in parse_error_lines(e.kind(), command_word.as_deref()) {
                println!("{line}");
            }
            if e.kind() == ErrorKind::DisplayVersion {
                print!("{e}");
            } else {
                print_usage();
            }
        }
    }
}

/// Lowercase the command word so commands match case-insensitively.
///
/// Returns the rewritten arguments and the command word as typed.
fn normalize_command(mut args: Vec<String>) -> (Vec<String>, Option<String>) {
    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        if arg == "--script-timeout" || arg == "--shell" {
            i += 2;
            continue;
        }
        if arg.starts_with('-') {
            i += 1;
            continue;
        }
        let typed = arg.clone();
        args[i] = typed.to_lowercase();
        return (args, Some(typed));
    }
    (args, None)
}

fn parse_error_lines(kind: ErrorKind, command_word: Option<&str>) -> Vec<String> {
    let word = command_word.map(str::to_lowercase);
    let known = word.as_deref().filter(|w| COMMANDS.contains(w));
    match (kind, known) {
        (ErrorKind::DisplayHelp | ErrorKind::DisplayVersion, _) => Vec::new(),
        (ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand, None) => Vec::new(),
        (_, None) => match command_word {
            Some(word) => vec![format!(
                "Unknown command '{word}'. Showing usage instructions:"
            )],
            None => vec!["Error: invalid option.".to_string()],
        },
        (ErrorKind::MissingRequiredArgument, Some("setmonitor")) => vec![
            "Error: setmonitor requires a monitor name and client name (steamdecklcd, xbox, custom)."
                .to_string(),
        ],
        (ErrorKind::MissingRequiredArgument, Some("deviceinfo")) => {
            vec!["Error: deviceinfo requires a monitor name.".to_string()]
        }
        (ErrorKind::MissingRequiredArgument, Some("listdisplaymodes")) => {
            vec!["Error: Please specify the monitor name for listdisplaymodes.".to_string()]
        }
        (ErrorKind::ValueValidation, Some("setmonitor")) => vec![
            "Error: Invalid custom parameters. Please provide width, height, and refresh rate."
                .to_string(),
        ],
        (_, Some(word)) => vec![format!("Error: invalid arguments for {word}.")],
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("failed to initialise logging: {e}");
    }
}

fn execute(cli: Cli) {
    let config = match cli.config() {
        Ok(config) => config,
        Err(e) => {
            print_error(&e);
            return;
        }
    };

    match cli.command {
        None | Some(Command::Usage) => print_usage(),
        Some(Command::ListMonitors) => list_monitors(),
        Some(Command::SetMonitor {
            monitor_name,
            client_name,
            width,
            height,
            refresh_rate,
            check,
            session,
        }) => {
            let scope = match (check, session) {
                (true, _) => ChangeScope::Test,
                (false, true) => ChangeScope::Session,
                (false, false) => ChangeScope::Persistent,
            };
            let custom = match (width, height, refresh_rate) {
                (Some(w), Some(h), Some(r)) => Some(CustomMode::new(w, h, r)),
                _ => None,
            };
            set_monitor_command(
                &config,
                SetMonitor {
                    monitor_name,
                    client_name,
                    custom,
                },
                scope,
            );
        }
        Some(Command::DeviceInfo { monitor_name }) => device_info(&config, &monitor_name),
        Some(Command::ResetMonitor) => reset_monitor(),
        Some(Command::ListDisplayModes { monitor_name }) => list_display_modes(&monitor_name),
    }
}

fn print_usage() {
    print!("{USAGE}");
}

fn print_error(error: &Error) {
    for line in error_lines(error) {
        println!("{line}");
    }
    if matches!(error, Error::InvalidProfile(_)) {
        print_usage();
    }
}

fn error_lines(error: &Error) -> Vec<String> {
    match error {
        Error::MonitorNotFound(name) => vec![format!("Error: Could not find monitor {name}")],
        Error::ChildProcess(stderr) => vec![format!("PowerShell Error: {stderr}")],
        Error::InvalidProfile(msg) => vec![format!("Error: {msg}.")],
        other => vec![format!("Error: {other}")],
    }
}

fn set_monitor_command(config: &Config, args: SetMonitor, scope: ChangeScope) {
    let backend = match display::native() {
        Ok(backend) => backend,
        Err(e) => return print_error(&e),
    };
    let resolver = DeviceResolver::new(WmiMonitorQuery::new(config.script_host()));
    let applicator = ModeApplicator::new(backend, ScriptFallback::new(config.script_host()))
        .with_scope(scope);

    match set_monitor(&resolver, &config.profiles, &applicator, &args) {
        Ok(report) => {
            for line in report_lines(&report) {
                println!("{line}");
            }
        }
        Err(e) => print_error(&e),
    }
}

fn report_lines(report: &SetMonitorReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Applying {} settings to {}: {}",
        report.profile,
        report.identity.device_id(),
        report.mode
    )];
    let primary = report.outcome.primary;
    let device = report.identity.instance_name();
    if report.outcome.scope == ChangeScope::Test {
        if primary.is_success() {
            lines.push(format!("{} would be accepted by {device}.", report.mode));
        } else {
            lines.push(format!("{} would be rejected by {device}: {primary}", report.mode));
        }
        return lines;
    }
    match &report.outcome.fallback {
        None if report.outcome.scope == ChangeScope::Session => {
            lines.push(format!("Settings applied to {device} for this session."))
        }
        None => lines.push(format!("Settings applied to {device}.")),
        Some(fallback) => {
            lines.push(format!(
                "Failed to apply settings using API: {}",
                Error::PrimaryApplyFailed(primary)
            ));
            lines.push("Falling back to PowerShell...".to_string());
            lines.push(fallback.to_string());
            if *fallback == FallbackReport::Succeeded {
                lines.push(
                    "Note: the PowerShell fallback only confirms the monitor is reachable; \
                     the requested mode may not have been applied."
                        .to_string(),
                );
            }
        }
    }
    lines
}

fn device_info(config: &Config, monitor_name: &str) {
    let resolver = DeviceResolver::new(WmiMonitorQuery::new(config.script_host()));
    match resolver.resolve(monitor_name) {
        Ok(identity) => println!(
            "Found Monitor - InstanceName: {}, DeviceID: {}",
            identity.instance_name(),
            identity.device_id()
        ),
        Err(e) => print_error(&e),
    }
}

fn reset_monitor() {
    let result = display::native().and_then(|backend| reset_display(&backend));
    match result {
        Ok(ApplyResult::Successful) => println!("Display settings reset to default."),
        Ok(other) => println!("Failed to reset display settings: {other}"),
        Err(e) => print_error(&e),
    }
}

fn list_display_modes(monitor_name: &str) {
    let backend = match display::native() {
        Ok(backend) => backend,
        Err(e) => return print_error(&e),
    };
    println!("Available display modes for {monitor_name}:");
    for (i, mode) in list_modes(&backend, monitor_name).enumerate() {
        println!("Mode {i}: {mode}");
    }
}

fn list_monitors() {
    match display::adapters() {
        Ok(adapters) => {
            for (index, adapter) in adapters.iter().enumerate() {
                for line in adapter_lines(index, adapter) {
                    println!("{line}");
                }
            }
        }
        Err(e) => println!("Error listing monitors: {e}"),
    }
}

fn adapter_lines(index: usize, adapter: &AdapterInfo) -> Vec<String> {
    let mut lines = vec![
        format!("====== ADAPTER {index} ====="),
        format!("Device Name      : {}", adapter.description),
        format!("Device Vendor ID : 0x{:X}", adapter.vendor_id),
        format!("Device Device ID : 0x{:X}", adapter.device_id),
        format!(
            "Device Video Mem : {} MiB",
            adapter.dedicated_video_memory / BYTES_PER_MIB
        ),
        format!(
            "Device Sys Mem   : {} MiB",
            adapter.dedicated_system_memory / BYTES_PER_MIB
        ),
        format!(
            "Shared Sys Mem   : {} MiB",
            adapter.shared_system_memory / BYTES_PER_MIB
        ),
        String::new(),
    ];
    for output in &adapter.outputs {
        lines.push("    ====== OUTPUT ======".to_string());
        lines.push(format!("    Output Name       : {}", output.device_name));
        lines.push(format!(
            "    AttachedToDesktop : {}",
            if output.attached_to_desktop { "yes" } else { "no" }
        ));
        lines.push(format!(
            "    Resolution        : {}x{}",
            output.width, output.height
        ));
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::ApplyOutcome;
    use crate::display::OutputInfo;
    use crate::mode::DisplayMode;
    use crate::profile::ClientProfile;
    use crate::resolver::MonitorIdentity;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn parse(list: &[&str]) -> Result<Cli, clap::Error> {
        let (args, _) = normalize_command(args(list));
        Cli::try_parse_from(args)
    }

    #[test]
    fn test_normalize_lowercases_command_word_only() {
        let (normalized, word) =
            normalize_command(args(&["screenconfig", "SetMonitor", "LG ULTRAGEAR", "XBOX"]));
        assert_eq!(normalized, args(&["screenconfig", "setmonitor", "LG ULTRAGEAR", "XBOX"]));
        assert_eq!(word.as_deref(), Some("SetMonitor"));
    }

    #[test]
    fn test_normalize_skips_global_options() {
        let (normalized, word) = normalize_command(args(&[
            "screenconfig",
            "-v",
            "--shell",
            "PWSH",
            "DeviceInfo",
            "LG",
        ]));
        assert_eq!(normalized[3], "PWSH");
        assert_eq!(normalized[4], "deviceinfo");
        assert_eq!(word.as_deref(), Some("DeviceInfo"));

        let (_, word) = normalize_command(args(&["screenconfig"]));
        assert_eq!(word, None);
    }

    #[test]
    fn test_parse_setmonitor_custom() {
        let cli = parse(&["screenconfig", "setmonitor", "LG ULTRAGEAR", "custom", "1920", "1080", "60"])
            .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::SetMonitor {
                monitor_name: "LG ULTRAGEAR".into(),
                client_name: "custom".into(),
                width: Some(1920),
                height: Some(1080),
                refresh_rate: Some(60),
                check: false,
                session: false,
            })
        );
    }

    #[test]
    fn test_parse_setmonitor_negative_values() {
        let cli = parse(&["screenconfig", "setmonitor", "LG", "custom", "-1920", "1080", "60"]).unwrap();
        assert!(matches!(cli.command, Some(Command::SetMonitor { width: Some(-1920), .. })));
    }

    #[test]
    fn test_parse_case_insensitive_command() {
        let cli = parse(&["screenconfig", "LISTDISPLAYMODES", r"\\.\DISPLAY1"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::ListDisplayModes {
                monitor_name: r"\\.\DISPLAY1".into()
            })
        );
    }

    #[test]
    fn test_parse_no_command() {
        let cli = parse(&["screenconfig"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_global_options() {
        let cli = parse(&["screenconfig", "-vv", "--script-timeout", "5", "resetmonitor"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let config = cli.config().unwrap();
        assert_eq!(config.script_timeout, Duration::from_secs(5));
        assert_eq!(cli.command, Some(Command::ResetMonitor));
    }

    #[test]
    fn test_unknown_command_message() {
        let err = parse(&["screenconfig", "Frobnicate"]).unwrap_err();
        assert_eq!(
            parse_error_lines(err.kind(), Some("Frobnicate")),
            vec!["Unknown command 'Frobnicate'. Showing usage instructions:".to_string()]
        );
    }

    #[test]
    fn test_missing_argument_messages() {
        let err = parse(&["screenconfig", "setmonitor", "LG"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(parse_error_lines(err.kind(), Some("setmonitor"))[0].contains("requires a monitor name"));

        let err = parse(&["screenconfig", "DeviceInfo"]).unwrap_err();
        assert_eq!(
            parse_error_lines(err.kind(), Some("DeviceInfo")),
            vec!["Error: deviceinfo requires a monitor name.".to_string()]
        );
    }

    #[test]
    fn test_non_numeric_custom_values() {
        let err = parse(&["screenconfig", "setmonitor", "LG", "custom", "wide", "1080", "60"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(parse_error_lines(err.kind(), Some("setmonitor"))[0].contains("Invalid custom parameters"));
    }

    #[test]
    fn test_error_lines() {
        assert_eq!(
            error_lines(&Error::MonitorNotFound("Unknown Display".into())),
            vec!["Error: Could not find monitor Unknown Display".to_string()]
        );
        assert_eq!(
            error_lines(&Error::ChildProcess("Access denied".into())),
            vec!["PowerShell Error: Access denied".to_string()]
        );
    }

    fn report(fallback: Option<FallbackReport>, primary: ApplyResult) -> SetMonitorReport {
        scoped_report(fallback, primary, ChangeScope::Persistent)
    }

    fn scoped_report(
        fallback: Option<FallbackReport>,
        primary: ApplyResult,
        scope: ChangeScope,
    ) -> SetMonitorReport {
        SetMonitorReport {
            identity: MonitorIdentity::new(r"DISPLAY\GSM5B7F\1_0", "LG ULTRAGEAR").unwrap(),
            profile: ClientProfile::Xbox,
            mode: DisplayMode::new(2560, 1440, 120).unwrap(),
            outcome: ApplyOutcome {
                primary,
                fallback,
                scope,
            },
        }
    }

    #[test]
    fn test_report_lines_success() {
        let lines = report_lines(&report(None, ApplyResult::Successful));
        assert_eq!(lines[0], "Applying xbox settings to LG ULTRAGEAR: 2560x1440, 120Hz");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_report_lines_fallback_flags_probe() {
        let lines = report_lines(&report(Some(FallbackReport::Succeeded), ApplyResult::BadMode));
        assert!(lines[1].starts_with("Failed to apply settings using API"));
        assert_eq!(lines[2], "Falling back to PowerShell...");
        assert_eq!(lines[3], "Resolution changed successfully.");
        assert!(lines[4].starts_with("Note:"));

        let lines = report_lines(&report(
            Some(FallbackReport::Failed { code: -1 }),
            ApplyResult::Failed,
        ));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_parse_scope_flags() {
        let cli = parse(&["screenconfig", "setmonitor", "LG", "xbox", "--check"]).unwrap();
        assert!(matches!(cli.command, Some(Command::SetMonitor { check: true, session: false, .. })));

        let cli = parse(&["screenconfig", "setmonitor", "LG", "xbox", "--session"]).unwrap();
        assert!(matches!(cli.command, Some(Command::SetMonitor { check: false, session: true, .. })));

        let err = parse(&["screenconfig", "setmonitor", "LG", "xbox", "--check", "--session"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_report_lines_scopes() {
        let lines = report_lines(&scoped_report(None, ApplyResult::Successful, ChangeScope::Test));
        assert_eq!(lines[1], r"2560x1440, 120Hz would be accepted by DISPLAY\GSM5B7F\1_0.");

        let lines = report_lines(&scoped_report(None, ApplyResult::BadMode, ChangeScope::Test));
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("would be rejected"));

        let lines = report_lines(&scoped_report(None, ApplyResult::Successful, ChangeScope::Session));
        assert_eq!(lines[1], r"Settings applied to DISPLAY\GSM5B7F\1_0 for this session.");
    }

    #[test]
    fn test_adapter_lines() {
        let adapter = AdapterInfo {
            description: "NVIDIA GeForce RTX 3080".into(),
            vendor_id: 0x10DE,
            device_id: 0x2206,
            dedicated_video_memory: 10 * 1024 * BYTES_PER_MIB,
            dedicated_system_memory: 0,
            shared_system_memory: 16 * 1024 * BYTES_PER_MIB,
            outputs: vec![OutputInfo {
                device_name: r"\\.\DISPLAY1".into(),
                attached_to_desktop: true,
                width: 2560,
                height: 1440,
            }],
        };
        let lines = adapter_lines(0, &adapter);
        assert_eq!(lines[0], "====== ADAPTER 0 =====");
        assert_eq!(lines[2], "Device Vendor ID : 0x10DE");
        assert_eq!(lines[4], "Device Video Mem : 10240 MiB");
        assert!(lines.contains(&"    AttachedToDesktop : yes".to_string()));
        assert!(lines.contains(&"    Resolution        : 2560x1440".to_string()));
    }
}

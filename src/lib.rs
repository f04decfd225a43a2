//! # screenconfig
//!
//! Apply a resolution and refresh rate to a named monitor on Windows, either
//! from a client profile (Steam Deck LCD, Xbox) or from explicit values.
//!
//! ## Quick Start
//!
//! ```no_run
//! use screenconfig::{
//!     Config, DeviceResolver, ModeApplicator, ScriptFallback, WmiMonitorQuery, display,
//! };
//! use screenconfig::ClientProfile;
//!
//! let config = Config::new()?;
//! let resolver = DeviceResolver::new(WmiMonitorQuery::new(config.script_host()));
//! let identity = resolver.resolve("LG ULTRAGEAR")?;
//!
//! let mode = config.profiles.resolve(ClientProfile::Xbox, None)?;
//! let applicator = ModeApplicator::new(display::native()?, ScriptFallback::new(config.script_host()));
//! let outcome = applicator.apply(&identity, mode)?;
//! println!("{:?}", outcome.primary);
//! # Ok::<(), screenconfig::Error>(())
//! ```
//!
//! ## Architecture
//!
//! A command flows through four stages: the [`resolver`] turns a friendly
//! monitor name into a [`MonitorIdentity`] using WMI, the [`profile`] table
//! turns a client name into a [`DisplayMode`], the [`apply`] stage calls
//! `ChangeDisplaySettingsExW`, and only when that fails the [`fallback`] stage
//! retries through PowerShell. [`modes`] enumerates the modes of a device
//! independently of that pipeline.
//!
//! Native calls sit behind the [`DisplayBackend`] trait and PowerShell behind
//! [`ScriptHost`], so every stage can be driven without real hardware.

pub mod apply;
pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod fallback;
pub mod mode;
pub mod modes;
pub mod os;
pub mod profile;
pub mod resolver;
pub mod script;

mod platform;

// Re-exports
pub use apply::{ApplyOutcome, ApplyResult, ModeApplicator, reset_display};
pub use commands::{SetMonitor, SetMonitorReport, set_monitor};
pub use config::Config;
pub use display::{AdapterInfo, DisplayBackend, OutputInfo, adapters};
pub use error::{Error, Result};
pub use fallback::{FallbackApplicator, FallbackReport, ScriptFallback};
pub use mode::{COLOR_DEPTH_BITS, ChangeScope, DisplayMode, ModeFields, ModeRequest};
pub use modes::{DisplayModes, list_modes};
pub use platform::NativeDisplay;
pub use profile::{ClientProfile, CustomMode, ProfileTable};
pub use resolver::{DeviceResolver, MonitorIdentity, MonitorQuery, MonitorSnapshot, WmiMonitorQuery};
pub use script::{PowerShell, ScriptHost, ScriptOutput};

//! The `setmonitor` pipeline: resolve, map, apply.

use crate::apply::{ApplyOutcome, ModeApplicator};
use crate::display::DisplayBackend;
use crate::error::Result;
use crate::fallback::FallbackApplicator;
use crate::mode::DisplayMode;
use crate::profile::{ClientProfile, CustomMode, ProfileTable};
use crate::resolver::{DeviceResolver, MonitorIdentity, MonitorQuery};

/// Arguments of one `setmonitor` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetMonitor {
    pub monitor_name: String,
    pub client_name: String,
    pub custom: Option<CustomMode>,
}

/// Everything `setmonitor` did, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetMonitorReport {
    pub identity: MonitorIdentity,
    pub profile: ClientProfile,
    pub mode: DisplayMode,
    pub outcome: ApplyOutcome,
}

/// Resolve the monitor, map the client profile and apply the mode.
///
/// Stops at the first error: an unknown monitor is reported before the
/// client name is even looked at.
pub fn set_monitor<Q, B, F>(
    resolver: &DeviceResolver<Q>,
    profiles: &ProfileTable,
    applicator: &ModeApplicator<B, F>,
    args: &SetMonitor,
) -> Result<SetMonitorReport>
where
    Q: MonitorQuery,
    B: DisplayBackend,
    F: FallbackApplicator,
{
    let identity = resolver.resolve(&args.monitor_name)?;
    let profile: ClientProfile = args.client_name.parse()?;
    let mode = profiles.resolve(profile, args.custom)?;
    log::info!("applying {profile} ({mode}) to {}", identity.device_id());
    let outcome = applicator.apply(&identity, mode)?;
    Ok(SetMonitorReport {
        identity,
        profile,
        mode,
        outcome,
    })
}

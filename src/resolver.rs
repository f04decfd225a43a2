//! Resolving a human-readable monitor name to an addressable identity.
//!
//! Windows exposes the EDID friendly name of each monitor only through the
//! `WmiMonitorID` WMI class, so the query goes through PowerShell. The script
//! emits one JSON row per monitor; the friendly name is decoded here.

use crate::error::{Error, Result};
use crate::script::ScriptHost;
use serde::{Deserialize, Deserializer};

/// Emits `[{"InstanceName": "...", "UserFriendlyName": [76, 71, ...]}, ...]`.
const MONITOR_ID_SCRIPT: &str = r#"$ErrorActionPreference = 'Stop'
$rows = @(Get-CimInstance -Namespace root\wmi -ClassName WmiMonitorID | ForEach-Object {
    $name = if ($_.UserFriendlyName) { @($_.UserFriendlyName) } else { @() }
    [pscustomobject]@{ InstanceName = $_.InstanceName; UserFriendlyName = $name }
})
ConvertTo-Json -InputObject $rows -Compress -Depth 3"#;

/// A stable handle on one physical monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorIdentity {
    instance_name: String,
    device_id: String,
}

impl MonitorIdentity {
    /// Both fields must be non-empty.
    pub fn new(instance_name: impl Into<String>, device_id: impl Into<String>) -> Option<Self> {
        let instance_name = instance_name.into();
        let device_id = device_id.into();
        if instance_name.is_empty() || device_id.is_empty() {
            None
        } else {
            Some(Self {
                instance_name,
                device_id,
            })
        }
    }

    /// OS-assigned instance name used to address configuration calls.
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Decoded friendly name of the monitor.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

/// One row of the monitor-identification query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonitorRow {
    #[serde(default)]
    pub instance_name: Option<String>,
    #[serde(default, deserialize_with = "code_units")]
    pub user_friendly_name: Option<Vec<u16>>,
}

/// Null entries (`[null]` for a monitor without a name) read as NUL.
fn code_units<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<u16>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<u16>>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|units| units.into_iter().map(Option::unwrap_or_default).collect()))
}

impl MonitorRow {
    /// Friendly name decoded from its null-terminated code unit array.
    pub fn friendly_name(&self) -> String {
        decode_friendly_name(self.user_friendly_name.as_deref().unwrap_or_default())
    }

    /// Identity for this row, if both fields are present.
    pub fn identity(&self) -> Option<MonitorIdentity> {
        MonitorIdentity::new(
            self.instance_name.clone().unwrap_or_default(),
            self.friendly_name(),
        )
    }
}

/// Decode a WMI friendly name: stop at the first NUL, skip non-characters.
pub fn decode_friendly_name(raw: &[u16]) -> String {
    raw.iter()
        .take_while(|&&c| c != 0)
        .filter_map(|&c| char::from_u32(u32::from(c)))
        .collect()
}

/// All monitors reported by one enumeration, in OS order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorSnapshot {
    rows: Vec<MonitorRow>,
}

impl MonitorSnapshot {
    pub fn new(rows: Vec<MonitorRow>) -> Self {
        Self { rows }
    }

    /// Parse the JSON array written by the query script. Empty output means
    /// no monitors.
    pub fn from_json(json: &str) -> Result<Self> {
        let json = json.trim();
        if json.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn rows(&self) -> &[MonitorRow] {
        &self.rows
    }

    /// First monitor whose friendly name contains `monitor_name`
    /// (case-sensitive). An empty name matches nothing.
    pub fn find(&self, monitor_name: &str) -> Result<MonitorIdentity> {
        if !monitor_name.is_empty() {
            for row in &self.rows {
                if !row.friendly_name().contains(monitor_name) {
                    continue;
                }
                match row.identity() {
                    Some(identity) => return Ok(identity),
                    None => log::debug!("skipping incomplete monitor row {row:?}"),
                }
            }
        }
        Err(Error::MonitorNotFound(monitor_name.to_string()))
    }
}

/// Source of monitor enumeration snapshots.
pub trait MonitorQuery {
    fn monitors(&self) -> Result<MonitorSnapshot>;
}

impl<Q: MonitorQuery + ?Sized> MonitorQuery for &Q {
    fn monitors(&self) -> Result<MonitorSnapshot> {
        (**self).monitors()
    }
}

/// Queries `WmiMonitorID` through a script host.
#[derive(Debug, Clone)]
pub struct WmiMonitorQuery<H> {
    host: H,
}

impl<H: ScriptHost> WmiMonitorQuery<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }
}

impl<H: ScriptHost> MonitorQuery for WmiMonitorQuery<H> {
    fn monitors(&self) -> Result<MonitorSnapshot> {
        let stdout = self.host.run(MONITOR_ID_SCRIPT)?.into_stdout()?;
        let snapshot = MonitorSnapshot::from_json(&stdout)?;
        log::debug!("WmiMonitorID returned {} monitors", snapshot.rows().len());
        Ok(snapshot)
    }
}

/// Maps monitor names to identities.
#[derive(Debug, Clone)]
pub struct DeviceResolver<Q> {
    query: Q,
}

impl<Q: MonitorQuery> DeviceResolver<Q> {
    pub fn new(query: Q) -> Self {
        Self { query }
    }

    /// Enumerate monitors once and return the first match.
    pub fn resolve(&self, monitor_name: &str) -> Result<MonitorIdentity> {
        let identity = self.query.monitors()?.find(monitor_name)?;
        log::info!(
            "resolved '{monitor_name}' to {} ({})",
            identity.instance_name(),
            identity.device_id()
        );
        Ok(identity)
    }
}

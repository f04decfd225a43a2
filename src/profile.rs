//! Client profiles: named presets that map to a fixed display mode.

use crate::error::{Error, Result};
use crate::mode::{DisplayMode, RawMode};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Built-in profile table, loaded by [`ProfileTable::builtin`].
const BUILTIN_PROFILES: &str = include_str!("profiles.json");

/// The device a resolution preset is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientProfile {
    /// Steam Deck LCD (1280x800 @ 60Hz).
    SteamDeckLcd,
    /// Xbox (2560x1440 @ 120Hz).
    Xbox,
    /// Caller-supplied width, height and refresh rate.
    Custom,
    /// No profile selected.
    None,
}

impl ClientProfile {
    /// Lowercase tag used on the command line and in the profile table.
    pub fn tag(&self) -> &'static str {
        match self {
            ClientProfile::SteamDeckLcd => "steamdecklcd",
            ClientProfile::Xbox => "xbox",
            ClientProfile::Custom => "custom",
            ClientProfile::None => "none",
        }
    }
}

impl fmt::Display for ClientProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ClientProfile {
    type Err = Error;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "steamdecklcd" => Ok(ClientProfile::SteamDeckLcd),
            "xbox" => Ok(ClientProfile::Xbox),
            "custom" => Ok(ClientProfile::Custom),
            "none" => Ok(ClientProfile::None),
            _ => Err(Error::InvalidProfile(format!("invalid client name '{s}'"))),
        }
    }
}

/// Width, height and refresh rate supplied for [`ClientProfile::Custom`].
///
/// Values are signed so that non-positive input reaches the mapper and is
/// rejected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomMode {
    pub width: i64,
    pub height: i64,
    pub refresh_rate: i64,
}

impl CustomMode {
    pub fn new(width: i64, height: i64, refresh_rate: i64) -> Self {
        Self {
            width,
            height,
            refresh_rate,
        }
    }

    fn to_mode(self) -> Result<DisplayMode> {
        let width = positive(self.width, "width")?;
        let height = positive(self.height, "height")?;
        let refresh_rate = positive(self.refresh_rate, "refresh rate")?;
        DisplayMode::new(width, height, refresh_rate)
            .map_err(|e| Error::InvalidProfile(e.to_string()))
    }
}

fn positive(value: i64, name: &str) -> Result<u32> {
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(Error::InvalidProfile(format!(
            "custom {name} must be a positive integer, got {value}"
        ))),
    }
}

/// Mapping from profile tag to display mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileTable {
    modes: HashMap<ClientProfile, DisplayMode>,
}

impl ProfileTable {
    /// The profiles shipped with the tool.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_PROFILES)
    }

    /// Parse a table of the form `{ "xbox": { "width": .., "height": .., "refresh_rate": .. } }`.
    ///
    /// `custom` and `none` cannot carry a fixed mode and are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawMode> = serde_json::from_str(json)?;
        let mut modes = HashMap::with_capacity(raw.len());
        for (tag, raw_mode) in raw {
            let profile: ClientProfile = tag.parse()?;
            if matches!(profile, ClientProfile::Custom | ClientProfile::None) {
                return Err(Error::InvalidProfile(format!(
                    "profile '{tag}' cannot have a fixed mode"
                )));
            }
            let mode = DisplayMode::try_from(raw_mode)
                .map_err(|e| Error::InvalidProfile(format!("profile '{tag}': {e}")))?;
            modes.insert(profile, mode);
        }
        Ok(Self { modes })
    }

    /// Fixed mode for a preset profile, if the table has one.
    pub fn get(&self, profile: ClientProfile) -> Option<DisplayMode> {
        self.modes.get(&profile).copied()
    }

    /// Map a profile to the mode that should be applied.
    ///
    /// `custom` is only consulted for [`ClientProfile::Custom`] and is
    /// returned unmodified when every value is positive.
    pub fn resolve(&self, profile: ClientProfile, custom: Option<CustomMode>) -> Result<DisplayMode> {
        match profile {
            ClientProfile::Custom => custom
                .ok_or_else(|| {
                    Error::InvalidProfile(
                        "custom requires width, height and refresh rate".into(),
                    )
                })?
                .to_mode(),
            ClientProfile::None => Err(Error::InvalidProfile("no client specified".into())),
            preset => self.get(preset).ok_or_else(|| {
                Error::InvalidProfile(format!("no mode defined for client '{preset}'"))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("SteamDeckLCD".parse::<ClientProfile>().unwrap(), ClientProfile::SteamDeckLcd);
        assert_eq!("XBOX".parse::<ClientProfile>().unwrap(), ClientProfile::Xbox);
        assert_eq!("custom".parse::<ClientProfile>().unwrap(), ClientProfile::Custom);
        assert!(matches!("ps5".parse::<ClientProfile>(), Err(Error::InvalidProfile(_))));
    }

    #[test]
    fn test_builtin_presets() {
        let table = ProfileTable::builtin().unwrap();
        assert_eq!(
            table.resolve(ClientProfile::SteamDeckLcd, None).unwrap(),
            DisplayMode::new(1280, 800, 60).unwrap()
        );
        assert_eq!(
            table.resolve(ClientProfile::Xbox, None).unwrap(),
            DisplayMode::new(2560, 1440, 120).unwrap()
        );
    }

    #[test]
    fn test_presets_ignore_custom_values() {
        let table = ProfileTable::builtin().unwrap();
        let custom = Some(CustomMode::new(800, 600, 75));
        for profile in [ClientProfile::SteamDeckLcd, ClientProfile::Xbox] {
            assert_eq!(
                table.resolve(profile, custom).unwrap(),
                table.resolve(profile, None).unwrap()
            );
        }
    }

    #[test]
    fn test_custom_returns_values_unmodified() {
        let table = ProfileTable::builtin().unwrap();
        let mode = table
            .resolve(ClientProfile::Custom, Some(CustomMode::new(1920, 1080, 60)))
            .unwrap();
        assert_eq!((mode.width(), mode.height(), mode.refresh_rate()), (1920, 1080, 60));
        assert_eq!(mode.color_depth(), 32);

        let mode = table
            .resolve(ClientProfile::Custom, Some(CustomMode::new(7680, 4320, 1)))
            .unwrap();
        assert_eq!((mode.width(), mode.height(), mode.refresh_rate()), (7680, 4320, 1));
    }

    #[test]
    fn test_custom_rejects_non_positive() {
        let table = ProfileTable::builtin().unwrap();
        for custom in [
            CustomMode::new(0, 1080, 60),
            CustomMode::new(1920, -1, 60),
            CustomMode::new(1920, 1080, 0),
            CustomMode::new(-1920, -1080, -60),
            CustomMode::new(i64::from(u32::MAX) + 1, 1080, 60),
        ] {
            assert!(matches!(
                table.resolve(ClientProfile::Custom, Some(custom)),
                Err(Error::InvalidProfile(_))
            ));
        }
        assert!(matches!(
            table.resolve(ClientProfile::Custom, None),
            Err(Error::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_none_is_invalid() {
        let table = ProfileTable::builtin().unwrap();
        assert!(matches!(
            table.resolve(ClientProfile::None, Some(CustomMode::new(1920, 1080, 60))),
            Err(Error::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_custom_entry() {
        let json = r#"{ "custom": { "width": 1, "height": 1, "refresh_rate": 1 } }"#;
        assert!(matches!(ProfileTable::from_json(json), Err(Error::InvalidProfile(_))));
    }

    #[test]
    fn test_from_json_rejects_zero_mode() {
        let json = r#"{ "xbox": { "width": 2560, "height": 1440, "refresh_rate": 0 } }"#;
        assert!(matches!(ProfileTable::from_json(json), Err(Error::InvalidProfile(_))));
    }

    #[test]
    fn test_missing_preset_entry() {
        let json = r#"{ "xbox": { "width": 2560, "height": 1440, "refresh_rate": 120 } }"#;
        let table = ProfileTable::from_json(json).unwrap();
        assert!(table.get(ClientProfile::SteamDeckLcd).is_none());
        assert!(matches!(
            table.resolve(ClientProfile::SteamDeckLcd, None),
            Err(Error::InvalidProfile(_))
        ));
    }
}

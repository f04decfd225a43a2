//! Display modes and the change requests built from them.

use crate::error::{Error, Result};
use crate::os;
use serde::Deserialize;
use std::fmt;

/// Color depth used for every applied mode.
pub const COLOR_DEPTH_BITS: u32 = 32;

/// One configuration a display can be driven at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayMode {
    width: u32,
    height: u32,
    refresh_rate: u32,
    color_depth: u32,
}

impl DisplayMode {
    /// Create a mode to apply. All fields must be non-zero; color depth is
    /// fixed at [`COLOR_DEPTH_BITS`].
    pub fn new(width: u32, height: u32, refresh_rate: u32) -> Result<Self> {
        let mode = Self {
            width,
            height,
            refresh_rate,
            color_depth: COLOR_DEPTH_BITS,
        };
        if mode.is_valid() {
            Ok(mode)
        } else {
            Err(Error::InvalidMode(mode))
        }
    }

    /// Wrap a mode exactly as the OS reported it. No validation.
    pub fn from_device(width: u32, height: u32, refresh_rate: u32, color_depth: u32) -> Self {
        Self {
            width,
            height,
            refresh_rate,
            color_depth,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Refresh rate in Hz.
    pub fn refresh_rate(&self) -> u32 {
        self.refresh_rate
    }

    /// Bits per pixel.
    pub fn color_depth(&self) -> u32 {
        self.color_depth
    }

    /// Whether every field is non-zero.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.refresh_rate > 0 && self.color_depth > 0
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}, {}Hz", self.width, self.height, self.refresh_rate)
    }
}

/// Raw mode record as stored in the embedded profile table.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct RawMode {
    pub width: u32,
    pub height: u32,
    pub refresh_rate: u32,
}

impl TryFrom<RawMode> for DisplayMode {
    type Error = Error;

    fn try_from(raw: RawMode) -> Result<Self> {
        DisplayMode::new(raw.width, raw.height, raw.refresh_rate)
    }
}

/// Which fields of a mode the OS should change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeFields {
    pub width: bool,
    pub height: bool,
    pub refresh_rate: bool,
    pub color_depth: bool,
}

impl ModeFields {
    /// Width, height, refresh rate and color depth.
    pub const ALL: ModeFields = ModeFields {
        width: true,
        height: true,
        refresh_rate: true,
        color_depth: true,
    };

    /// Native `dmFields` bits for the selected fields.
    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.width {
            bits |= os::DM_PELSWIDTH;
        }
        if self.height {
            bits |= os::DM_PELSHEIGHT;
        }
        if self.refresh_rate {
            bits |= os::DM_DISPLAYFREQUENCY;
        }
        if self.color_depth {
            bits |= os::DM_BITSPERPEL;
        }
        bits
    }
}

/// How long a mode change should last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeScope {
    /// Write to the registry profile and apply to the desktop now.
    Persistent,
    /// Apply for the current session only.
    Session,
    /// Ask the driver whether the mode could be set, without setting it.
    Test,
}

impl ChangeScope {
    /// Native `CDS_*` flags for this scope.
    pub fn flags(&self) -> u32 {
        match self {
            ChangeScope::Persistent => os::CDS_UPDATEREGISTRY,
            ChangeScope::Session => os::CDS_FULLSCREEN,
            ChangeScope::Test => os::CDS_TEST,
        }
    }
}

/// A validated mode change addressed to one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeRequest {
    device: String,
    mode: DisplayMode,
    fields: ModeFields,
}

impl ModeRequest {
    /// Request that every field of `mode` be applied to `device`.
    pub fn new(device: impl Into<String>, mode: DisplayMode) -> Result<Self> {
        if !mode.is_valid() {
            return Err(Error::InvalidMode(mode));
        }
        Ok(Self {
            device: device.into(),
            mode,
            fields: ModeFields::ALL,
        })
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn fields(&self) -> ModeFields {
        self.fields
    }
}

//! Native display-configuration contract values.
//!
//! These mirror the Win32 `DISP_CHANGE_*`, `CDS_*` and `DM_*` constants. They
//! are plain integers so the core logic can reason about native results without
//! linking against any platform headers; only `platform::windows` converts them
//! into `windows` crate types.

// Results of ChangeDisplaySettingsEx
/// The settings change was successful.
pub const DISP_CHANGE_SUCCESSFUL: i32 = 0;
/// The computer must be restarted for the graphics mode to work.
pub const DISP_CHANGE_RESTART: i32 = 1;
/// The display driver failed the specified graphics mode.
pub const DISP_CHANGE_FAILED: i32 = -1;
/// The graphics mode is not supported.
pub const DISP_CHANGE_BADMODE: i32 = -2;
/// Unable to write settings to the registry.
pub const DISP_CHANGE_NOTUPDATED: i32 = -3;
/// An invalid set of flags was passed in.
pub const DISP_CHANGE_BADFLAGS: i32 = -4;
/// An invalid parameter was passed in.
pub const DISP_CHANGE_BADPARAM: i32 = -5;

// Flags for ChangeDisplaySettingsEx
/// Apply now and write to the registry profile.
pub const CDS_UPDATEREGISTRY: u32 = 0x0000_0001;
/// Only test whether the mode could be set.
pub const CDS_TEST: u32 = 0x0000_0002;
/// Temporary change for the current session.
pub const CDS_FULLSCREEN: u32 = 0x0000_0004;

// DEVMODE.dmFields bits
/// `dmBitsPerPel` is set.
pub const DM_BITSPERPEL: u32 = 0x0004_0000;
/// `dmPelsWidth` is set.
pub const DM_PELSWIDTH: u32 = 0x0008_0000;
/// `dmPelsHeight` is set.
pub const DM_PELSHEIGHT: u32 = 0x0010_0000;
/// `dmDisplayFrequency` is set.
pub const DM_DISPLAYFREQUENCY: u32 = 0x0040_0000;

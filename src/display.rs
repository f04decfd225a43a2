//! Native display configuration and hardware queries.

use crate::error::Result;
use crate::mode::{ChangeScope, DisplayMode, ModeRequest};

/// The OS display-configuration facility.
///
/// Methods return raw native result codes (see [`crate::os`]); mapping them
/// into [`crate::ApplyResult`] is left to the caller.
pub trait DisplayBackend {
    /// Apply `request` to its device.
    fn change_mode(&self, request: &ModeRequest, scope: ChangeScope) -> Result<i32>;

    /// Reload the display configuration stored in the registry.
    fn reset(&self) -> Result<i32>;

    /// Mode number `index` of `device`, or `None` past the last mode.
    fn mode_at(&self, device: &str, index: u32) -> Option<DisplayMode>;
}

impl<B: DisplayBackend + ?Sized> DisplayBackend for &B {
    fn change_mode(&self, request: &ModeRequest, scope: ChangeScope) -> Result<i32> {
        (**self).change_mode(request, scope)
    }

    fn reset(&self) -> Result<i32> {
        (**self).reset()
    }

    fn mode_at(&self, device: &str, index: u32) -> Option<DisplayMode> {
        (**self).mode_at(device, index)
    }
}

/// A graphics adapter and the outputs attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterInfo {
    /// Adapter description as reported by the driver.
    pub description: String,
    pub vendor_id: u32,
    pub device_id: u32,
    /// Dedicated video memory in bytes.
    pub dedicated_video_memory: u64,
    /// Dedicated system memory in bytes.
    pub dedicated_system_memory: u64,
    /// Shared system memory in bytes.
    pub shared_system_memory: u64,
    pub outputs: Vec<OutputInfo>,
}

/// One output (monitor connector) of an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    /// GDI device name, e.g. `\\.\DISPLAY1`.
    pub device_name: String,
    pub attached_to_desktop: bool,
    /// Desktop width in pixels.
    pub width: u32,
    /// Desktop height in pixels.
    pub height: u32,
}

/// The display backend for the current platform.
pub fn native() -> Result<crate::platform::NativeDisplay> {
    crate::platform::native_display()
}

/// List graphics adapters and their outputs.
pub fn adapters() -> Result<Vec<AdapterInfo>> {
    crate::platform::adapters()
}

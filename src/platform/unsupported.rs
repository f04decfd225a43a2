//! Display configuration is only available on Windows.

use crate::display::{AdapterInfo, DisplayBackend};
use crate::error::{Error, Result};
use crate::mode::{ChangeScope, DisplayMode, ModeRequest};

/// Placeholder backend; every operation reports [`Error::NotSupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDisplay;

pub fn native_display() -> Result<NativeDisplay> {
    Err(not_supported())
}

impl DisplayBackend for NativeDisplay {
    fn change_mode(&self, _request: &ModeRequest, _scope: ChangeScope) -> Result<i32> {
        Err(not_supported())
    }

    fn reset(&self) -> Result<i32> {
        Err(not_supported())
    }

    fn mode_at(&self, _device: &str, _index: u32) -> Option<DisplayMode> {
        None
    }
}

pub fn adapters() -> Result<Vec<AdapterInfo>> {
    Err(not_supported())
}

fn not_supported() -> Error {
    Error::NotSupported("display configuration is only available on Windows".into())
}

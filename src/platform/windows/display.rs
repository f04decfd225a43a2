//! Windows display configuration via ChangeDisplaySettingsExW.

use crate::display::DisplayBackend;
use crate::error::Result;
use crate::mode::{ChangeScope, DisplayMode, ModeRequest};
use std::iter::once;
use std::mem::{MaybeUninit, size_of};
use windows::Win32::Graphics::Gdi::{
    CDS_TYPE, ChangeDisplaySettingsExW, DEVMODE_FIELD_FLAGS, DEVMODEW, ENUM_DISPLAY_SETTINGS_MODE,
    EnumDisplaySettingsW,
};
use windows::core::PCWSTR;

/// GDI display configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDisplay;

pub fn native_display() -> Result<NativeDisplay> {
    Ok(NativeDisplay)
}

impl DisplayBackend for NativeDisplay {
    fn change_mode(&self, request: &ModeRequest, scope: ChangeScope) -> Result<i32> {
        let mode = request.mode();
        let mut devmode = empty_devmode();
        devmode.dmFields = DEVMODE_FIELD_FLAGS(request.fields().bits());
        devmode.dmPelsWidth = mode.width();
        devmode.dmPelsHeight = mode.height();
        devmode.dmDisplayFrequency = mode.refresh_rate();
        devmode.dmBitsPerPel = mode.color_depth();

        let device = wide(request.device());
        let result = unsafe {
            ChangeDisplaySettingsExW(
                PCWSTR(device.as_ptr()),
                Some(&devmode as *const DEVMODEW),
                None,
                CDS_TYPE(scope.flags()),
                None,
            )
        };
        Ok(result.0)
    }

    fn reset(&self) -> Result<i32> {
        let result =
            unsafe { ChangeDisplaySettingsExW(PCWSTR::null(), None, None, CDS_TYPE(0), None) };
        Ok(result.0)
    }

    fn mode_at(&self, device: &str, index: u32) -> Option<DisplayMode> {
        let mut devmode = empty_devmode();
        let device = wide(device);
        let ok = unsafe {
            EnumDisplaySettingsW(
                PCWSTR(device.as_ptr()),
                ENUM_DISPLAY_SETTINGS_MODE(index),
                &mut devmode,
            )
        };
        ok.as_bool().then(|| {
            DisplayMode::from_device(
                devmode.dmPelsWidth,
                devmode.dmPelsHeight,
                devmode.dmDisplayFrequency,
                devmode.dmBitsPerPel,
            )
        })
    }
}

fn empty_devmode() -> DEVMODEW {
    let mut devmode = unsafe { MaybeUninit::<DEVMODEW>::zeroed().assume_init() };
    devmode.dmSize = size_of::<DEVMODEW>() as u16;
    devmode
}

/// Null-terminated UTF-16 copy of `s`.
fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(once(0)).collect()
}

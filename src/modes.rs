//! Enumerating the display modes a device reports.

use crate::display::DisplayBackend;
use crate::mode::DisplayMode;
use std::iter::FusedIterator;

/// Modes of one device in raw OS order.
///
/// Each step asks the backend for the next mode index. The first index the
/// backend has no mode for ends the sequence for good.
#[derive(Debug)]
pub struct DisplayModes<'a, B: ?Sized> {
    backend: &'a B,
    device: String,
    next: Option<u32>,
}

impl<B: DisplayBackend + ?Sized> Iterator for DisplayModes<'_, B> {
    type Item = DisplayMode;

    fn next(&mut self) -> Option<DisplayMode> {
        let index = self.next?;
        match self.backend.mode_at(&self.device, index) {
            Some(mode) => {
                self.next = index.checked_add(1);
                Some(mode)
            }
            None => {
                log::debug!("{}: {index} display modes", self.device);
                self.next = None;
                None
            }
        }
    }
}

impl<B: DisplayBackend + ?Sized> FusedIterator for DisplayModes<'_, B> {}

/// Start enumerating modes of `device` (a GDI name such as `\\.\DISPLAY1`).
pub fn list_modes<'a, B: DisplayBackend + ?Sized>(
    backend: &'a B,
    device: impl Into<String>,
) -> DisplayModes<'a, B> {
    DisplayModes {
        backend,
        device: device.into(),
        next: Some(0),
    }
}

//! Windows implementation on top of GDI and DXGI.

mod adapters;
mod display;

pub use adapters::adapters;
pub use display::{NativeDisplay, native_display};

//! Windows adapter and output enumeration via DXGI.

use crate::display::{AdapterInfo, OutputInfo};
use crate::error::{Error, Result};
use windows::Win32::Graphics::Dxgi::{
    CreateDXGIFactory1, DXGI_ERROR_NOT_FOUND, IDXGIAdapter1, IDXGIFactory1,
};

pub fn adapters() -> Result<Vec<AdapterInfo>> {
    let factory: IDXGIFactory1 = unsafe { CreateDXGIFactory1() }
        .map_err(|e| Error::Platform(format!("CreateDXGIFactory1 failed: {e}")))?;

    let mut adapters = Vec::new();
    for index in 0u32.. {
        let adapter = match unsafe { factory.EnumAdapters1(index) } {
            Ok(adapter) => adapter,
            Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => break,
            Err(e) => return Err(Error::Platform(format!("EnumAdapters1({index}) failed: {e}"))),
        };
        adapters.push(adapter_info(&adapter)?);
    }
    Ok(adapters)
}

fn adapter_info(adapter: &IDXGIAdapter1) -> Result<AdapterInfo> {
    let desc = unsafe { adapter.GetDesc1() }
        .map_err(|e| Error::Platform(format!("GetDesc1 failed: {e}")))?;

    Ok(AdapterInfo {
        description: from_wide(&desc.Description),
        vendor_id: desc.VendorId,
        device_id: desc.DeviceId,
        dedicated_video_memory: desc.DedicatedVideoMemory as u64,
        dedicated_system_memory: desc.DedicatedSystemMemory as u64,
        shared_system_memory: desc.SharedSystemMemory as u64,
        outputs: outputs(adapter)?,
    })
}

fn outputs(adapter: &IDXGIAdapter1) -> Result<Vec<OutputInfo>> {
    let mut outputs = Vec::new();
    for index in 0u32.. {
        let output = match unsafe { adapter.EnumOutputs(index) } {
            Ok(output) => output,
            Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => break,
            Err(e) => return Err(Error::Platform(format!("EnumOutputs({index}) failed: {e}"))),
        };
        let desc = unsafe { output.GetDesc() }
            .map_err(|e| Error::Platform(format!("IDXGIOutput::GetDesc failed: {e}")))?;
        let rect = desc.DesktopCoordinates;
        outputs.push(OutputInfo {
            device_name: from_wide(&desc.DeviceName),
            attached_to_desktop: desc.AttachedToDesktop.as_bool(),
            width: (rect.right - rect.left).max(0) as u32,
            height: (rect.bottom - rect.top).max(0) as u32,
        });
    }
    Ok(outputs)
}

fn from_wide(buffer: &[u16]) -> String {
    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..len])
}

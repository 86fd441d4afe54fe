//! Shared hardware device and frame-pool references.
//!
//! Hardware frames never cross the bridge by value; both sides hold
//! shared references to a device-resident frame pool. Cloning the `Arc`
//! acquires a reference, dropping it releases one, matching the
//! ref-counted buffer semantics of the underlying device APIs.

use crate::frame::PixelFormat;
use std::fmt;
use std::sync::Arc;

/// Hardware acceleration device kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HwDeviceKind {
    /// VA-API (Linux).
    Vaapi,
    /// NVIDIA CUDA.
    Cuda,
    /// VideoToolbox (macOS).
    VideoToolbox,
    /// Direct3D 11 video acceleration.
    D3d11va,
    /// Intel Quick Sync Video.
    Qsv,
}

impl HwDeviceKind {
    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Vaapi => "VA-API",
            Self::Cuda => "CUDA",
            Self::VideoToolbox => "VideoToolbox",
            Self::D3d11va => "D3D11VA",
            Self::Qsv => "Quick Sync",
        }
    }
}

/// An opened hardware device.
#[derive(Debug)]
pub struct HwDevice {
    /// Device kind.
    pub kind: HwDeviceKind,
    /// Device identifier (driver path, adapter name, ...).
    pub name: String,
}

impl HwDevice {
    /// Create a device handle.
    pub fn new(kind: HwDeviceKind, name: impl Into<String>) -> HwDeviceRef {
        Arc::new(Self {
            kind,
            name: name.into(),
        })
    }
}

/// Shared reference to a hardware device.
pub type HwDeviceRef = Arc<HwDevice>;

/// A device-resident frame pool: the context hardware frames are
/// allocated from.
pub struct HwFramesContext {
    /// Owning device.
    pub device: HwDeviceRef,
    /// Storage format of the pooled surfaces.
    pub sw_format: PixelFormat,
    /// Surface width.
    pub width: u32,
    /// Surface height.
    pub height: u32,
}

impl HwFramesContext {
    /// Create a frame-pool context on a device.
    pub fn new(device: HwDeviceRef, sw_format: PixelFormat, width: u32, height: u32) -> HwFramesRef {
        Arc::new(Self {
            device,
            sw_format,
            width,
            height,
        })
    }
}

impl fmt::Debug for HwFramesContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HwFramesContext")
            .field("device", &self.device.kind)
            .field("sw_format", &self.sw_format)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Shared reference to a hardware frame pool.
pub type HwFramesRef = Arc<HwFramesContext>;

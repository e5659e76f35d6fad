//! HUD configuration.
//!
//! - `layout`: Fixed overlay layout constants (borders, header/footer bands, badge row)
//! - `device`: Device profile (zoom constant, vertical offset, camera intrinsics)
//! - `features`: Optional measurement panel blocks

pub mod device;
pub mod features;
pub mod layout;

pub use device::{CameraIntrinsics, DeviceProfile};
pub use features::HudFeatures;
pub use layout::{BDR_S, DEFAULT_HEIGHT, DEFAULT_WIDTH, FOOTER_H, HEADER_H, TEXT_SCALE};

/// Everything the compositor needs to know about the device it runs on.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct HudConfig {
    /// Selects zoom, vertical offset and camera intrinsics.
    pub device: DeviceProfile,
    /// Video comes from the wide-angle camera (halves the zoom).
    pub wide_camera: bool,
    /// Optional measurement panel blocks.
    pub features: HudFeatures,
}

impl HudConfig {
    pub const fn new(device: DeviceProfile) -> Self {
        Self {
            device,
            wide_camera: false,
            features: HudFeatures::FROM_CARGO,
        }
    }

    /// Intrinsics of the camera feeding the video blit.
    pub const fn intrinsics(&self) -> CameraIntrinsics { self.device.intrinsics(self.wide_camera) }
}

impl Default for HudConfig {
    fn default() -> Self { Self::new(DeviceProfile::Tici) }
}

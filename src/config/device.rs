//! Device profiles and camera intrinsics.
//!
//! The zoom constant and vertical offset were tuned per device so that the
//! road camera image fills the panel with the horizon slightly above center.

/// Pinhole intrinsics of a camera, in camera pixels.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CameraIntrinsics {
    pub focal_x: f32,
    pub focal_y: f32,
    pub principal_x: f32,
    pub principal_y: f32,
}

impl CameraIntrinsics {
    pub const fn new(
        focal: f32,
        principal_x: f32,
        principal_y: f32,
    ) -> Self {
        Self {
            focal_x: focal,
            focal_y: focal,
            principal_x,
            principal_y,
        }
    }
}

/// EON road camera.
pub const EON_ROAD_CAMERA: CameraIntrinsics = CameraIntrinsics::new(910.0, 582.0, 437.0);

/// TICI road camera (1928x1208 sensor).
pub const TICI_ROAD_CAMERA: CameraIntrinsics = CameraIntrinsics::new(2648.0, 1928.0 / 2.0, 1208.0 / 2.0);

/// Wide-angle camera (1928x1208 sensor).
pub const WIDE_CAMERA: CameraIntrinsics = CameraIntrinsics::new(567.0, 1928.0 / 2.0, 1208.0 / 2.0);

/// Hardware generation the HUD runs on.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DeviceProfile {
    Eon,
    #[default]
    Tici,
}

impl DeviceProfile {
    /// Zoom numerator; divided by the focal length to get the video scale.
    pub const fn zoom(self) -> f32 {
        match self {
            Self::Eon => 2138.5,
            Self::Tici => 2912.8,
        }
    }

    /// Vertical offset of the video center below the viewport center, pixels.
    pub const fn y_offset(self) -> f32 {
        match self {
            Self::Eon => 0.0,
            Self::Tici => 150.0,
        }
    }

    /// Road camera intrinsics for this device.
    pub const fn road_camera(self) -> CameraIntrinsics {
        match self {
            Self::Eon => EON_ROAD_CAMERA,
            Self::Tici => TICI_ROAD_CAMERA,
        }
    }

    /// Intrinsics of the camera in use.
    pub const fn intrinsics(
        self,
        wide_camera: bool,
    ) -> CameraIntrinsics {
        if wide_camera { WIDE_CAMERA } else { self.road_camera() }
    }
}

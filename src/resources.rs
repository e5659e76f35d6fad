//! Fonts and images used by the overlays.
//!
//! Every asset the drawers reference is an enum variant, resolved to a canvas
//! handle once at startup by [`ResourceTable::load`]. A missing asset fails
//! the load with a [`ResourceError`] naming it, so the problem surfaces
//! before the first frame instead of as a lookup miss mid-draw.

use thiserror::Error;

use crate::canvas::{Canvas, FontHandle, ImageHandle};

/// Font faces used by the HUD.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FontId {
    SansRegular,
    SansSemibold,
    SansBold,
}

impl FontId {
    pub const ALL: [Self; 3] = [Self::SansRegular, Self::SansSemibold, Self::SansBold];

    /// Face name registered with the canvas.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SansRegular => "sans-regular",
            Self::SansSemibold => "sans-semibold",
            Self::SansBold => "sans-bold",
        }
    }

    pub const fn asset_path(self) -> &'static str {
        match self {
            Self::SansRegular => "fonts/opensans_regular.ttf",
            Self::SansSemibold => "fonts/opensans_semibold.ttf",
            Self::SansBold => "fonts/opensans_bold.ttf",
        }
    }

    const fn index(self) -> usize { self as usize }
}

/// Images used by the HUD.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ImageId {
    Wheel,
    BrakeDisc,
    AutoholdWarning,
    AutoholdActive,
}

impl ImageId {
    pub const ALL: [Self; 4] = [Self::Wheel, Self::BrakeDisc, Self::AutoholdWarning, Self::AutoholdActive];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Wheel => "wheel",
            Self::BrakeDisc => "brake_img",
            Self::AutoholdWarning => "autohold_warning",
            Self::AutoholdActive => "autohold_active",
        }
    }

    pub const fn asset_path(self) -> &'static str {
        match self {
            Self::Wheel => "img_chffr_wheel.png",
            Self::BrakeDisc => "img_brake_disc.png",
            Self::AutoholdWarning => "img_autohold_warning.png",
            Self::AutoholdActive => "img_autohold_active.png",
        }
    }

    const fn index(self) -> usize { self as usize }
}

/// Startup asset failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("font '{name}' not found at {path}")]
    MissingFont { name: &'static str, path: &'static str },
    #[error("image '{name}' not found at {path}")]
    MissingImage { name: &'static str, path: &'static str },
}

/// Resolved handles for every font and image.
#[derive(Clone, Debug)]
pub struct ResourceTable {
    fonts: [FontHandle; FontId::ALL.len()],
    images: [ImageHandle; ImageId::ALL.len()],
}

impl ResourceTable {
    /// Load every asset through the canvas; fails on the first missing one.
    pub fn load(canvas: &mut impl Canvas) -> Result<Self, ResourceError> {
        let mut fonts = [FontHandle(0); FontId::ALL.len()];
        for id in FontId::ALL {
            fonts[id.index()] = canvas
                .create_font(id.name(), id.asset_path())
                .ok_or(ResourceError::MissingFont {
                    name: id.name(),
                    path: id.asset_path(),
                })?;
        }

        let mut images = [ImageHandle(0); ImageId::ALL.len()];
        for id in ImageId::ALL {
            images[id.index()] = canvas.create_image(id.asset_path()).ok_or(ResourceError::MissingImage {
                name: id.name(),
                path: id.asset_path(),
            })?;
        }

        log::info!("loaded {} fonts and {} images", fonts.len(), images.len());
        Ok(Self { fonts, images })
    }

    #[inline]
    pub const fn font(
        &self,
        id: FontId,
    ) -> FontHandle {
        self.fonts[id.index()]
    }

    #[inline]
    pub const fn image(
        &self,
        id: ImageId,
    ) -> ImageHandle {
        self.images[id.index()]
    }
}

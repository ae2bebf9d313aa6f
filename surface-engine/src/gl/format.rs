//! Pixel format descriptions: what the caller asks for and what the driver offers.

use serde::{Deserialize, Serialize};

/// How color is stored in the color buffer.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorModel {
    #[default]
    Rgba,
    ColorIndex,
}

impl ColorModel {
    #[inline]
    pub fn is_rgba(self) -> bool {
        self == ColorModel::Rgba
    }
}

/// Desired rendering surface configuration.
///
/// Size fields are either a positive bit count or `None` ("don't care"). During selection they only
/// count as presence flags through the matching `*_enabled` field; the actual numbers are handed to
/// the platform when it is asked for its own best guess.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelFormatRequest {
    pub double_buffer: bool, // = true

    pub depth_enabled: bool, // = true
    pub depth_bits: Option<u8>,

    pub color_model: ColorModel, // = Rgba
    pub red_bits: Option<u8>,
    pub green_bits: Option<u8>,
    pub blue_bits: Option<u8>,

    pub alpha_enabled: bool,
    pub alpha_bits: Option<u8>,

    pub accum_enabled: bool,
    pub accum_bits: Option<u8>,

    pub stencil_enabled: bool,
    pub stencil_bits: Option<u8>,

    pub stereo: bool,

    /// Ask for a hardware accelerated format (as opposed to a software/generic one).
    pub direct_rendering: bool, // = true

    /// The surface needs an overlay plane.
    pub has_overlay: bool,

    /// Layer the surface lives on: 0 is the main plane, anything else an overlay/underlay plane.
    pub plane: i32,
}

impl Default for PixelFormatRequest {
    fn default() -> Self {
        Self {
            double_buffer: true,
            depth_enabled: true,
            depth_bits: None,
            color_model: ColorModel::Rgba,
            red_bits: None,
            green_bits: None,
            blue_bits: None,
            alpha_enabled: false,
            alpha_bits: None,
            accum_enabled: false,
            accum_bits: None,
            stencil_enabled: false,
            stencil_bits: None,
            stereo: false,
            direct_rendering: true,
            has_overlay: false,
            plane: 0,
        }
    }
}

impl PixelFormatRequest {
    /// Replaces every `Some(0)` size with `None`, so sizes are either positive or unspecified.
    pub fn normalized(mut self) -> Self {
        for bits in [
            &mut self.depth_bits,
            &mut self.red_bits,
            &mut self.green_bits,
            &mut self.blue_bits,
            &mut self.alpha_bits,
            &mut self.accum_bits,
            &mut self.stencil_bits,
        ] {
            if *bits == Some(0) {
                *bits = None;
            }
        }
        self
    }

    /// Sum of the requested red, green and blue sizes, or `None` if none of them were given.
    pub fn color_bits(&self) -> Option<u8> {
        let channels = [self.red_bits, self.green_bits, self.blue_bits];
        if channels.iter().all(Option::is_none) {
            return None;
        }
        Some(
            channels
                .iter()
                .map(|bits| bits.unwrap_or(0))
                .fold(0u8, u8::saturating_add),
        )
    }

    pub fn is_main_plane(&self) -> bool {
        self.plane == 0
    }
}

/// Opaque platform identifier of an offered format (a WGL format index, a GLX visual id, ...).
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct FormatId(pub u64);

impl std::fmt::Display for FormatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single format as reported by the platform.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferedFormat {
    pub id: FormatId,

    /// The format can be rendered to with the graphics API at all.
    pub render_capable: bool,
    pub draw_to_window: bool,
    /// Color bit count when drawing to a bitmap, 0 if the format cannot draw to bitmaps.
    pub bitmap_color_bits: u8,

    pub double_buffer: bool,
    pub stereo: bool,
    pub direct_rendering: bool,
    pub has_overlay: bool,
    pub color_model: ColorModel,

    /// Total color buffer size, excluding alpha on most platforms.
    pub color_bits: u8,
    pub red_bits: u8,
    pub green_bits: u8,
    pub blue_bits: u8,
    pub alpha_bits: u8,
    pub accum_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
}

impl OfferedFormat {
    #[inline]
    pub fn depth_enabled(&self) -> bool {
        self.depth_bits > 0
    }

    #[inline]
    pub fn alpha_enabled(&self) -> bool {
        self.alpha_bits > 0
    }

    #[inline]
    pub fn accum_enabled(&self) -> bool {
        self.accum_bits > 0
    }

    #[inline]
    pub fn stencil_enabled(&self) -> bool {
        self.stencil_bits > 0
    }
}

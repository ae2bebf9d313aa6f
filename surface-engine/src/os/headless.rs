//! Platform without a display

use crate::gl::{ColorModel, FormatId, OfferedFormat, PixelFormatRequest};
use crate::os::{names, EnumeratedFormats, Platform, PlatformKind};
use raw_window_handle::{DisplayHandle, HandleError, HasDisplayHandle};

/// Serves a fixed list of formats instead of asking a driver.
///
/// Used when no native platform can be opened and for feeding recorded format lists back into the selector.
/// There is no driver to make a guess, so unless one is given with [`HeadlessPlatform::with_guess`] every format gets scored.
#[derive(Clone, Debug, Default)]
pub struct HeadlessPlatform {
    guess: Option<OfferedFormat>,
    formats: Vec<OfferedFormat>,
    bitmap_color_bits: u8,
}

impl HeadlessPlatform {
    pub fn new(formats: Vec<OfferedFormat>) -> Self {
        Self {
            guess: None,
            formats,
            bitmap_color_bits: 0,
        }
    }

    /// Report `guess` as the platform's own pick, ahead of the other formats.
    pub fn with_guess(mut self, guess: OfferedFormat) -> Self {
        self.guess = Some(guess);
        self
    }

    pub fn with_bitmap_color_bits(mut self, bits: u8) -> Self {
        self.bitmap_color_bits = bits;
        self
    }

    /// The formats a typical software rasterizer exposes: 8 bit RGBA with and without depth/stencil, single and double buffered.
    pub fn software() -> Self {
        let rgba = |id: u64, double_buffer: bool, depth_bits: u8, stencil_bits: u8| OfferedFormat {
            id: FormatId(id),
            render_capable: true,
            draw_to_window: true,
            bitmap_color_bits: 0,
            double_buffer,
            stereo: false,
            direct_rendering: false,
            has_overlay: false,
            color_model: ColorModel::Rgba,
            color_bits: 24,
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            accum_bits: 0,
            depth_bits,
            stencil_bits,
        };

        Self::new(vec![
            rgba(1, true, 24, 8),
            rgba(2, true, 0, 0),
            rgba(3, false, 24, 8),
            rgba(4, false, 0, 0),
            rgba(5, true, 32, 0),
        ])
    }

    pub fn formats(&self) -> &[OfferedFormat] {
        &self.formats
    }
}

impl HasDisplayHandle for HeadlessPlatform {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        Err(HandleError::Unavailable)
    }
}

impl Platform for HeadlessPlatform {
    fn name(&self) -> &'static str {
        if cfg!(windows) {
            names::WINDOWS_HEADLESS
        } else {
            names::LINUX_HEADLESS
        }
    }

    fn kind(&self) -> PlatformKind {
        if cfg!(windows) {
            PlatformKind::WindowsHeadless
        } else {
            PlatformKind::LinuxHeadless
        }
    }

    fn is_headless(&self) -> bool {
        true
    }

    fn bitmap_color_bits(&self) -> u8 {
        self.bitmap_color_bits
    }

    fn enumerate_pixel_formats(&self, _request: &PixelFormatRequest) -> anyhow::Result<EnumeratedFormats> {
        Ok(EnumeratedFormats {
            guess: self.guess,
            formats: self.formats.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{PixelFormatSelector, SelectionPath};

    #[test]
    fn software_formats_are_window_drawable() {
        let platform = HeadlessPlatform::software();
        let formats = platform
            .enumerate_pixel_formats(&PixelFormatRequest::default())
            .unwrap();

        assert!(formats.guess.is_none());
        assert!(!formats.is_empty());
        assert!(formats.formats.iter().all(|f| f.render_capable && f.draw_to_window));
        assert!(platform.is_headless());
        assert!(platform.display_handle().is_err());
    }

    #[test]
    fn enumeration_is_stable() {
        let platform = HeadlessPlatform::software();
        let request = PixelFormatRequest::default();
        assert_eq!(
            platform.enumerate_pixel_formats(&request).unwrap(),
            platform.enumerate_pixel_formats(&request).unwrap()
        );
    }

    fn visual(id: u64, double_buffer: bool, depth_bits: u8) -> OfferedFormat {
        OfferedFormat {
            id: FormatId(id),
            render_capable: true,
            draw_to_window: true,
            direct_rendering: true,
            double_buffer,
            depth_bits,
            color_model: ColorModel::Rgba,
            color_bits: 24,
            ..Default::default()
        }
    }

    #[test]
    fn without_guess_first_format_is_not_taken_blindly() {
        let platform = HeadlessPlatform::new(vec![visual(0x21, false, 0), visual(0x22, true, 24)]);
        let request = PixelFormatRequest::default();
        let formats = platform.enumerate_pixel_formats(&request).unwrap();

        let selected = formats.select(&PixelFormatSelector::default(), &request).unwrap();
        assert_eq!(selected.id(), FormatId(0x22));
        assert_eq!(selected.path, SelectionPath::FullSearch);
    }

    #[test]
    fn guess_goes_first() {
        let platform = HeadlessPlatform::new(vec![visual(0x21, false, 0), visual(0x22, true, 24)])
            .with_guess(visual(0x23, false, 16));
        let request = PixelFormatRequest::default();
        let formats = platform.enumerate_pixel_formats(&request).unwrap();

        assert_eq!(formats.len(), 3);
        assert_eq!(formats.candidates()[0].id, FormatId(0x23));

        let selected = formats.select(&PixelFormatSelector::default(), &request).unwrap();
        assert_eq!(selected.id(), FormatId(0x23));
        assert_eq!(selected.path, SelectionPath::FastPath);
    }
}

//! Platform interface & platform specific code

mod headless;

#[cfg(target_os="linux")]
mod x11;

#[cfg(windows)]
mod windows;

pub use headless::HeadlessPlatform;

use crate::gl::{OfferedFormat, PixelFormatRequest, PixelFormatSelector, SelectError, SelectedFormat};
use log::warn;
use raw_window_handle::HasDisplayHandle;
use std::sync::Arc;

/// Generic access to platform specific functions.
/// Also requires [`raw_window_handle::HasDisplayHandle`] to be implemented.
pub trait Platform: HasDisplayHandle + Send + Sync {
    /// Get the name of the current platform
    ///
    /// # Common Names
    /// | OS               | Return Value       | Constant                                   |
    /// |------------------|--------------------|--------------------------------------------|
    /// | Windows          | `"windows"`          | [`names::WINDOWS`]          |
    /// | Windows/Headless | `"windows-headless"` | [`names::WINDOWS_HEADLESS`] |
    /// | Linux/X11        | `"linux-x11"`        | [`names::LINUX_X11`]        |
    /// | Linux/Headless   | `"linux-headless"`   | [`names::LINUX_HEADLESS`]   |
    ///
    fn name(&self) -> &'static str;

    /// Get a more machine-nice identifier for the platform.
    /// On all standard platforms, this is not backed by a string. On non-standard platforms, this is required to be [`PlatformKind::Custom`], which relies on a `&'static str`.
    fn kind(&self) -> PlatformKind;

    /// Check if a platform is headless (does it support surfaces or are we going to only be able to render to offscreen targets).
    fn is_headless(&self) -> bool;

    /// Color bit count of the bitmap target formats are matched against. Formats that cannot draw to bitmaps report 0, which is also the default.
    fn bitmap_color_bits(&self) -> u8 {
        0
    }

    /// List the pixel formats the display driver offers, in driver order.
    ///
    /// If the platform has its own way of guessing a format for `request` and the guess succeeds, it goes into [`EnumeratedFormats::guess`] and is left out of the remaining list. Enumeration should be deterministic: calling this twice without the system changing gives the same result.
    fn enumerate_pixel_formats(&self, request: &PixelFormatRequest) -> anyhow::Result<EnumeratedFormats>;
}

/// Result of asking a platform for its pixel formats.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EnumeratedFormats {
    /// The platform's own pick for the request, if it has a way to make one and it found something.
    pub guess: Option<OfferedFormat>,
    /// Every other format, in driver order.
    pub formats: Vec<OfferedFormat>,
}

impl EnumeratedFormats {
    /// Formats without a platform guess.
    pub fn unguessed(formats: Vec<OfferedFormat>) -> Self {
        Self { guess: None, formats }
    }

    /// Total number of formats, guess included.
    pub fn len(&self) -> usize {
        self.formats.len() + self.guess.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Guess first (if any), then the rest.
    pub fn candidates(&self) -> Vec<OfferedFormat> {
        self.guess.iter().chain(&self.formats).copied().collect()
    }

    /// Run the selector over these formats. Without a guess there is nothing for the fast path to look at, so only the full search runs.
    pub fn select(
        &self,
        selector: &PixelFormatSelector,
        request: &PixelFormatRequest,
    ) -> Result<SelectedFormat, SelectError> {
        match self.guess {
            Some(_) => selector.select(request, &self.candidates()),
            None => selector.search(request, &self.formats),
        }
    }
}

/// Identifier for platforms.
///
/// Non-standard platforms **must** use [`PlatformKind::Custom`].
#[derive(Copy, Clone, Hash, PartialEq, Eq, Debug)]
#[allow(missing_docs)]
pub enum PlatformKind {
    Windows,
    WindowsHeadless,
    LinuxX11,
    LinuxHeadless,
    Custom(&'static str),
}

/// Constants for standard platform names.
#[allow(missing_docs)]
pub mod names {

    pub const WINDOWS: &'static str = "windows";
    pub const LINUX_X11: &'static str = "linux-x11";
    pub const WINDOWS_HEADLESS: &'static str = "windows-headless";
    pub const LINUX_HEADLESS: &'static str = "linux-headless";
}

/// Open the native platform, falling back to the headless software formats when there is no display to talk to.
pub fn new_platform() -> anyhow::Result<Arc<dyn Platform>> {
    #[cfg(target_os="windows")]
    {
        match windows::WindowsPlatform::new() {
            Ok(platform) => Ok(Arc::new(platform)),
            Err(e) => {
                warn!("Windows platform initialization failed, using headless formats: {e:#}");
                Ok(Arc::new(HeadlessPlatform::software()))
            }
        }
    }

    #[cfg(target_os="linux")]
    {
        match x11::X11Platform::new() {
            Ok(platform) => Ok(Arc::new(platform)),
            Err(e) => {
                warn!("X11 platform initialization failed, using headless formats: {e:#}");
                Ok(Arc::new(HeadlessPlatform::software()))
            }
        }
    }

    #[cfg(not(any(target_os="windows", target_os="linux")))]
    {
        warn!("No native platform support, using headless formats");
        Ok(Arc::new(HeadlessPlatform::software()))
    }
}

//! # Surface Engine
//!
//! Pixel format negotiation for rendering surfaces: ask the platform which formats it offers, then pick the one
//! that best fits a [`PixelFormatRequest`](gl::PixelFormatRequest).

pub mod gl;
pub mod os;

#[cfg(target_os="linux")]
pub extern crate x11_dl;

#[cfg(windows)]
pub extern crate windows;

use crate::gl::{PixelFormatRequest, PixelFormatSelector, SelectedFormat};
use crate::os::{new_platform, Platform};
use log::{debug, info};
use std::sync::Arc;

/// Owns the platform and the request used when callers don't bring their own.
pub struct Engine {
    platform: Arc<dyn Platform>,
    default_request: PixelFormatRequest,
}

impl Engine {
    /// Engine on the native platform (or the headless fallback, see [`new_platform`]).
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::with_platform(new_platform()?))
    }

    pub fn with_platform(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            default_request: PixelFormatRequest::default(),
        }
    }

    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    pub fn default_request(&self) -> &PixelFormatRequest {
        &self.default_request
    }

    pub fn set_default_request(&mut self, request: PixelFormatRequest) {
        self.default_request = request.normalized();
    }

    /// Enumerate the platform's formats once and pick the best one for `request` (or the default request).
    /// The fast path only applies when the platform came up with a guess of its own.
    ///
    /// Fails with [`gl::SelectError::NoCompatibleFormat`] (reachable through `downcast_ref`) when nothing the platform
    /// offers can be rendered to a window. That is final for this surface; enumerating again will not change it.
    pub fn choose_pixel_format(&self, request: Option<&PixelFormatRequest>) -> anyhow::Result<SelectedFormat> {
        let request = request
            .cloned()
            .map(PixelFormatRequest::normalized)
            .unwrap_or_else(|| self.default_request.clone());

        let enumerated = self.platform.enumerate_pixel_formats(&request)?;
        debug!(
            "{} offered {} pixel formats (guess: {:?})",
            self.platform.name(),
            enumerated.len(),
            enumerated.guess.map(|guess| guess.id)
        );

        let selector = PixelFormatSelector::with_bitmap_color_bits(self.platform.bitmap_color_bits());
        let selected = enumerated.select(&selector, &request)?;

        info!(
            "Using pixel format {} on {} ({:?})",
            selected.id(),
            self.platform.name(),
            selected.path
        );

        Ok(selected)
    }
}

#![cfg(windows)]

use crate::gl::{ColorModel, FormatId, OfferedFormat, PixelFormatRequest};
use crate::os::{EnumeratedFormats, Platform, PlatformKind};
use anyhow::bail;
use log::debug;
use raw_window_handle::{DisplayHandle, HandleError, HasDisplayHandle};
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{GetDC, HDC, ReleaseDC};
use windows::Win32::Graphics::OpenGL::{
    ChoosePixelFormat, DescribePixelFormat, PFD_DEPTH_DONTCARE, PFD_DOUBLEBUFFER, PFD_DRAW_TO_BITMAP,
    PFD_DRAW_TO_WINDOW, PFD_FLAGS, PFD_GENERIC_ACCELERATED, PFD_GENERIC_FORMAT, PFD_STEREO,
    PFD_SUPPORT_OPENGL, PFD_TYPE_COLORINDEX, PFD_TYPE_RGBA, PIXELFORMATDESCRIPTOR,
};

/// Low nibble of `bReserved` holds the number of overlay planes.
const OVERLAY_PLANE_MASK: u8 = 0x0f;

pub(super) struct WindowsPlatform {}

impl WindowsPlatform {
    pub(super) fn new() -> anyhow::Result<Self> {
        // make sure there is a screen to describe formats for before handing the platform out
        let dc = ScreenDc::acquire()?;
        debug!("WGL pixel formats available: {}", dc.format_count());
        Ok(Self {})
    }
}

/// The whole-screen device context, released on drop.
struct ScreenDc(HDC);

impl ScreenDc {
    fn acquire() -> anyhow::Result<Self> {
        let hdc = unsafe { GetDC(HWND::default()) };
        if hdc.is_invalid() {
            bail!("GetDC failed for the screen device context");
        }
        Ok(Self(hdc))
    }

    fn format_count(&self) -> i32 {
        unsafe {
            DescribePixelFormat(
                self.0,
                1,
                size_of::<PIXELFORMATDESCRIPTOR>() as u32,
                None,
            )
        }
    }

    fn describe(&self, index: i32) -> Option<PIXELFORMATDESCRIPTOR> {
        let mut pfd = PIXELFORMATDESCRIPTOR::default();
        let max = unsafe {
            DescribePixelFormat(
                self.0,
                index,
                size_of::<PIXELFORMATDESCRIPTOR>() as u32,
                Some(&mut pfd as *mut PIXELFORMATDESCRIPTOR),
            )
        };
        (max != 0).then_some(pfd)
    }

    fn choose(&self, pfd: &PIXELFORMATDESCRIPTOR) -> i32 {
        unsafe { ChoosePixelFormat(self.0, pfd) }
    }
}

impl Drop for ScreenDc {
    fn drop(&mut self) {
        unsafe {
            _ = ReleaseDC(HWND::default(), self.0);
        }
    }
}

#[inline]
fn has_flag(flags: PFD_FLAGS, flag: PFD_FLAGS) -> bool {
    flags.0 & flag.0 != 0
}

/// What gets handed to `ChoosePixelFormat` for the driver's own guess.
fn descriptor_for(request: &PixelFormatRequest) -> PIXELFORMATDESCRIPTOR {
    let mut flags = PFD_DRAW_TO_WINDOW | PFD_SUPPORT_OPENGL;
    if request.double_buffer {
        flags |= PFD_DOUBLEBUFFER;
    }
    if request.stereo {
        flags |= PFD_STEREO;
    }
    if !request.depth_enabled {
        flags |= PFD_DEPTH_DONTCARE;
    }

    // "enabled" without a size still has to ask for something
    let size = |enabled: bool, bits: Option<u8>| if enabled { bits.unwrap_or(1) } else { 0 };

    PIXELFORMATDESCRIPTOR {
        nSize: size_of::<PIXELFORMATDESCRIPTOR>() as u16,
        nVersion: 1,
        dwFlags: flags,
        iPixelType: match request.color_model {
            ColorModel::Rgba => PFD_TYPE_RGBA,
            ColorModel::ColorIndex => PFD_TYPE_COLORINDEX,
        },
        cColorBits: request.color_bits().unwrap_or(0),
        cRedBits: request.red_bits.unwrap_or(0),
        cGreenBits: request.green_bits.unwrap_or(0),
        cBlueBits: request.blue_bits.unwrap_or(0),
        cAlphaBits: size(request.alpha_enabled, request.alpha_bits),
        cAccumBits: size(request.accum_enabled, request.accum_bits),
        cDepthBits: size(request.depth_enabled, request.depth_bits),
        cStencilBits: size(request.stencil_enabled, request.stencil_bits),
        ..Default::default()
    }
}

fn offered_format(index: i32, pfd: &PIXELFORMATDESCRIPTOR) -> OfferedFormat {
    let flags = pfd.dwFlags;
    let generic = has_flag(flags, PFD_GENERIC_FORMAT);
    let accelerated = has_flag(flags, PFD_GENERIC_ACCELERATED);
    let draw_to_window = has_flag(flags, PFD_DRAW_TO_WINDOW);

    OfferedFormat {
        id: FormatId(index as u64),
        render_capable: has_flag(flags, PFD_SUPPORT_OPENGL),
        draw_to_window,
        // formats that also draw to windows are matched as window formats
        bitmap_color_bits: if has_flag(flags, PFD_DRAW_TO_BITMAP) && !draw_to_window {
            pfd.cColorBits
        } else {
            0
        },
        double_buffer: has_flag(flags, PFD_DOUBLEBUFFER),
        stereo: has_flag(flags, PFD_STEREO),
        direct_rendering: !generic || accelerated,
        has_overlay: pfd.bReserved & OVERLAY_PLANE_MASK != 0,
        color_model: if pfd.iPixelType == PFD_TYPE_RGBA {
            ColorModel::Rgba
        } else {
            ColorModel::ColorIndex
        },
        color_bits: pfd.cColorBits,
        red_bits: pfd.cRedBits,
        green_bits: pfd.cGreenBits,
        blue_bits: pfd.cBlueBits,
        alpha_bits: pfd.cAlphaBits,
        accum_bits: pfd.cAccumBits,
        depth_bits: pfd.cDepthBits,
        stencil_bits: pfd.cStencilBits,
    }
}

impl HasDisplayHandle for WindowsPlatform {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        Ok(DisplayHandle::windows())
    }
}

impl Platform for WindowsPlatform {
    fn name(&self) -> &'static str {
        super::names::WINDOWS
    }

    fn kind(&self) -> PlatformKind {
        PlatformKind::Windows
    }

    fn is_headless(&self) -> bool {
        false
    }

    fn enumerate_pixel_formats(&self, request: &PixelFormatRequest) -> anyhow::Result<EnumeratedFormats> {
        let dc = ScreenDc::acquire()?;
        let count = dc.format_count();

        let guess_index = dc.choose(&descriptor_for(request));
        let guess = if guess_index > 0 {
            dc.describe(guess_index)
                .map(|pfd| offered_format(guess_index, &pfd))
        } else {
            debug!("ChoosePixelFormat found no format, every format will be scored");
            None
        };

        let formats: Vec<_> = (1..=count)
            .filter(|&index| guess.is_none() || index != guess_index)
            .filter_map(|index| dc.describe(index).map(|pfd| offered_format(index, &pfd)))
            .collect();

        debug!(
            "Enumerated {} WGL pixel formats (driver guess: {:?})",
            formats.len(),
            guess.map(|format| format.id)
        );

        Ok(EnumeratedFormats { guess, formats })
    }
}

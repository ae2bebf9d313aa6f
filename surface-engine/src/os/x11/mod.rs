//! X11 interop

#![cfg(target_os = "linux")]

use crate::gl::{ColorModel, FormatId, OfferedFormat, PixelFormatRequest};
use crate::os::{EnumeratedFormats, PlatformKind};
use anyhow::bail;
use log::debug;
use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, RawDisplayHandle, XlibDisplayHandle,
};
use std::ffi::{c_int, c_void};
use std::ptr::NonNull;
use x11_dl::glx::{self, Glx};
use x11_dl::xlib;
use x11_dl::xlib::Xlib;

pub(super) struct X11Platform {
    xlib: Xlib,
    glx: Glx,
    display: *mut xlib::Display,
    default_screen: i32,
    direct_rendering: bool,
}

// Xlib is put into thread-safe mode with XInitThreads before the display is opened, so the connection can be used from any thread.
unsafe impl Send for X11Platform {}
unsafe impl Sync for X11Platform {}

impl X11Platform {
    pub fn new() -> anyhow::Result<X11Platform> {
        let xlib = Xlib::open()?;

        // has to come before any other Xlib call
        if unsafe { (xlib.XInitThreads)() } == 0 {
            bail!("XInitThreads failed.");
        }

        let glx = Glx::open()?;
        let display = unsafe { (xlib.XOpenDisplay)(std::ptr::null()) };

        if display.is_null() {
            bail!("Failed to connect to X server.");
        }

        let default_screen = unsafe { (xlib.XDefaultScreen)(display) };

        let mut platform = X11Platform {
            xlib,
            glx,
            display,
            default_screen,
            direct_rendering: false,
        };

        let (mut error_base, mut event_base) = (0, 0);
        if unsafe { (platform.glx.glXQueryExtension)(display, &mut error_base, &mut event_base) } == 0 {
            bail!("X server does not support GLX.");
        }

        platform.direct_rendering = platform.query_direct_rendering();
        debug!("GLX direct rendering: {}", platform.direct_rendering);

        Ok(platform)
    }

    /// Visuals of the default screen. The list is owned by Xlib and freed when the guard drops.
    fn visuals(&self) -> VisualList<'_> {
        let mut template: xlib::XVisualInfo = unsafe { std::mem::zeroed() };
        template.screen = self.default_screen;
        let mut count: c_int = 0;

        let ptr = unsafe {
            (self.xlib.XGetVisualInfo)(self.display, xlib::VisualScreenMask, &mut template, &mut count)
        };

        VisualList {
            xlib: &self.xlib,
            ptr,
            len: if ptr.is_null() { 0 } else { count.max(0) as usize },
        }
    }

    /// The visual GLX itself picks for `request`, if any matches.
    fn choose_visual(&self, request: &PixelFormatRequest) -> Option<OfferedFormat> {
        let mut attributes = visual_attributes(request);
        let ptr = unsafe {
            (self.glx.glXChooseVisual)(self.display, self.default_screen, attributes.as_mut_ptr())
        };

        let chosen = VisualList {
            xlib: &self.xlib,
            ptr,
            len: if ptr.is_null() { 0 } else { 1 },
        };
        chosen.as_slice().first().map(|visual| self.offered_format(visual))
    }

    fn config(&self, visual: &xlib::XVisualInfo, attribute: c_int) -> Option<c_int> {
        let mut value: c_int = 0;
        let status = unsafe {
            (self.glx.glXGetConfig)(
                self.display,
                visual as *const xlib::XVisualInfo as *mut xlib::XVisualInfo,
                attribute,
                &mut value,
            )
        };
        (status == 0).then_some(value)
    }

    fn config_bits(&self, visual: &xlib::XVisualInfo, attribute: c_int) -> u8 {
        self.config(visual, attribute)
            .unwrap_or(0)
            .clamp(0, u8::MAX as c_int) as u8
    }

    fn config_flag(&self, visual: &xlib::XVisualInfo, attribute: c_int) -> bool {
        self.config(visual, attribute).unwrap_or(0) != 0
    }

    /// GLX decides directness per context, so ask once with a throwaway context on the first GL visual.
    fn query_direct_rendering(&self) -> bool {
        let visuals = self.visuals();
        let Some(visual) = visuals
            .as_slice()
            .iter()
            .find(|v| self.config_flag(v, glx::GLX_USE_GL))
        else {
            return false;
        };

        unsafe {
            let context = (self.glx.glXCreateContext)(
                self.display,
                visual as *const xlib::XVisualInfo as *mut xlib::XVisualInfo,
                std::ptr::null_mut(),
                xlib::True,
            );
            if context.is_null() {
                return false;
            }
            let direct = (self.glx.glXIsDirect)(self.display, context) != 0;
            (self.glx.glXDestroyContext)(self.display, context);
            direct
        }
    }

    fn offered_format(&self, visual: &xlib::XVisualInfo) -> OfferedFormat {
        let red_bits = self.config_bits(visual, glx::GLX_RED_SIZE);
        let green_bits = self.config_bits(visual, glx::GLX_GREEN_SIZE);
        let blue_bits = self.config_bits(visual, glx::GLX_BLUE_SIZE);
        let accum_bits = [
            glx::GLX_ACCUM_RED_SIZE,
            glx::GLX_ACCUM_GREEN_SIZE,
            glx::GLX_ACCUM_BLUE_SIZE,
            glx::GLX_ACCUM_ALPHA_SIZE,
        ]
        .into_iter()
        .map(|attribute| self.config_bits(visual, attribute))
        .fold(0u8, u8::saturating_add);
        let rgba = self.config_flag(visual, glx::GLX_RGBA);

        OfferedFormat {
            id: FormatId(visual.visualid as u64),
            render_capable: self.config_flag(visual, glx::GLX_USE_GL),
            // every GLX visual can back a window
            draw_to_window: true,
            bitmap_color_bits: 0,
            double_buffer: self.config_flag(visual, glx::GLX_DOUBLEBUFFER),
            stereo: self.config_flag(visual, glx::GLX_STEREO),
            direct_rendering: self.direct_rendering,
            has_overlay: self.config(visual, glx::GLX_LEVEL).unwrap_or(0) > 0,
            color_model: if rgba { ColorModel::Rgba } else { ColorModel::ColorIndex },
            color_bits: if rgba {
                red_bits.saturating_add(green_bits).saturating_add(blue_bits)
            } else {
                self.config_bits(visual, glx::GLX_BUFFER_SIZE)
            },
            red_bits,
            green_bits,
            blue_bits,
            alpha_bits: self.config_bits(visual, glx::GLX_ALPHA_SIZE),
            accum_bits,
            depth_bits: self.config_bits(visual, glx::GLX_DEPTH_SIZE),
            stencil_bits: self.config_bits(visual, glx::GLX_STENCIL_SIZE),
        }
    }
}

struct VisualList<'a> {
    xlib: &'a Xlib,
    ptr: *mut xlib::XVisualInfo,
    len: usize,
}

impl VisualList<'_> {
    fn as_slice(&self) -> &[xlib::XVisualInfo] {
        if self.ptr.is_null() {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
        }
    }
}

impl Drop for VisualList<'_> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                (self.xlib.XFree)(self.ptr as *mut c_void);
            }
        }
    }
}

impl Drop for X11Platform {
    fn drop(&mut self) {
        unsafe {
            (self.xlib.XCloseDisplay)(self.display);
        }
    }
}

impl HasDisplayHandle for X11Platform {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        unsafe {
            Ok(DisplayHandle::borrow_raw(RawDisplayHandle::Xlib(
                XlibDisplayHandle::new(
                    Some(NonNull::new_unchecked(self.display as *mut c_void)),
                    self.default_screen,
                ),
            )))
        }
    }
}

impl super::Platform for X11Platform {
    fn name(&self) -> &'static str {
        super::names::LINUX_X11
    }

    fn kind(&self) -> PlatformKind {
        PlatformKind::LinuxX11
    }

    fn is_headless(&self) -> bool {
        false
    }

    fn enumerate_pixel_formats(&self, request: &PixelFormatRequest) -> anyhow::Result<EnumeratedFormats> {
        let visuals = self.visuals();
        if visuals.len == 0 {
            bail!("XGetVisualInfo returned no visuals for screen {}", self.default_screen);
        }

        let guess = self.choose_visual(request);
        if guess.is_none() {
            debug!("glXChooseVisual found no visual, every visual will be scored");
        }

        let formats: Vec<_> = visuals
            .as_slice()
            .iter()
            .map(|visual| self.offered_format(visual))
            .filter(|format| guess.map_or(true, |guess| guess.id != format.id))
            .collect();

        debug!(
            "Enumerated {} GLX visuals on screen {} (glXChooseVisual: {:?})",
            formats.len(),
            self.default_screen,
            guess.map(|format| format.id)
        );

        Ok(EnumeratedFormats { guess, formats })
    }
}

/// `None`-terminated attribute list for `glXChooseVisual`. Sizes there are minimums, so an enabled buffer without a size asks for one bit.
fn visual_attributes(request: &PixelFormatRequest) -> Vec<c_int> {
    let mut attributes = Vec::new();

    if request.color_model.is_rgba() {
        attributes.push(glx::GLX_RGBA);
    }
    if request.double_buffer {
        attributes.push(glx::GLX_DOUBLEBUFFER);
    }
    if request.stereo {
        attributes.push(glx::GLX_STEREO);
    }

    for (attribute, bits) in [
        (glx::GLX_RED_SIZE, request.red_bits),
        (glx::GLX_GREEN_SIZE, request.green_bits),
        (glx::GLX_BLUE_SIZE, request.blue_bits),
    ] {
        if let Some(bits) = bits {
            attributes.extend([attribute, bits as c_int]);
        }
    }

    for (attribute, enabled, bits) in [
        (glx::GLX_ALPHA_SIZE, request.alpha_enabled, request.alpha_bits),
        (glx::GLX_DEPTH_SIZE, request.depth_enabled, request.depth_bits),
        (glx::GLX_STENCIL_SIZE, request.stencil_enabled, request.stencil_bits),
    ] {
        if enabled {
            attributes.extend([attribute, bits.unwrap_or(1) as c_int]);
        }
    }

    if request.accum_enabled {
        // total accumulation bits spread over the four channels
        let per_channel = request.accum_bits.map_or(1, |bits| (bits / 4).max(1)) as c_int;
        for attribute in [
            glx::GLX_ACCUM_RED_SIZE,
            glx::GLX_ACCUM_GREEN_SIZE,
            glx::GLX_ACCUM_BLUE_SIZE,
        ] {
            attributes.extend([attribute, per_channel]);
        }
    }

    if request.plane != 0 {
        attributes.extend([glx::GLX_LEVEL, request.plane as c_int]);
    }

    attributes.push(0);
    attributes
}

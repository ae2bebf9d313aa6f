//! Picking the offered pixel format that best matches a request.
//!
//! The platform's own pick (element 0 of the candidate list) is accepted as-is when it clears a handful of
//! hard requirements. Otherwise every candidate is filtered and scored, and the highest score wins. Scores
//! are weighted so that a matching color model beats everything else, then direct rendering, stereo and
//! double buffering, with buffer sizes only breaking ties between those.

use crate::gl::error::SelectError;
use crate::gl::format::{FormatId, OfferedFormat, PixelFormatRequest};
use log::{debug, trace, warn};
use serde::Serialize;

const DOUBLE_BUFFER_WEIGHT: u32 = 1000;
const STEREO_WEIGHT: u32 = 2000;
const DIRECT_RENDERING_WEIGHT: u32 = 4000;
const COLOR_MODEL_WEIGHT: u32 = 8000;

/// Both true or both false.
#[inline]
fn iff(a: bool, b: bool) -> bool {
    a == b
}

/// Which part of the selection produced the result.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPath {
    /// The platform's first guess was good enough.
    FastPath,
    /// Every candidate was scored.
    FullSearch,
}

/// The winning format.
///
/// The format may not be what was asked for (a missing stencil buffer, a single-buffered surface, ...), so
/// look at [`SelectedFormat::format`] rather than assuming the request was met.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SelectedFormat {
    pub format: OfferedFormat,
    pub path: SelectionPath,
    /// Score of the winner, only known after a full search.
    pub score: Option<u32>,
}

impl SelectedFormat {
    pub fn id(&self) -> FormatId {
        self.format.id
    }
}

/// Chooses among offered pixel formats.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PixelFormatSelector {
    bitmap_color_bits: u8,
}

impl PixelFormatSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector for a platform whose bitmap target has `bits` color bits.
    ///
    /// Candidates only pass when their bitmap color bit count equals this value. The default of 0 admits
    /// exactly the formats that do not draw to bitmaps.
    pub fn with_bitmap_color_bits(bits: u8) -> Self {
        Self {
            bitmap_color_bits: bits,
        }
    }

    pub fn bitmap_color_bits(&self) -> u8 {
        self.bitmap_color_bits
    }

    /// Picks the best candidate for `request`.
    ///
    /// `candidates` must be in platform enumeration order with the platform's own pick (if any) first.
    pub fn select(
        &self,
        request: &PixelFormatRequest,
        candidates: &[OfferedFormat],
    ) -> Result<SelectedFormat, SelectError> {
        let Some(first) = candidates.first() else {
            return Err(SelectError::NoCompatibleFormat { candidates: 0 });
        };

        if self.accepts_fast_path(request, first) {
            debug!("Accepted platform pixel format {} without searching", first.id);
            return Ok(SelectedFormat {
                format: *first,
                path: SelectionPath::FastPath,
                score: None,
            });
        }

        self.search(request, candidates)
    }

    /// Scores every candidate without looking at a platform guess.
    ///
    /// This is the second half of [`PixelFormatSelector::select`], for platforms that had no guess to put first.
    pub fn search(
        &self,
        request: &PixelFormatRequest,
        candidates: &[OfferedFormat],
    ) -> Result<SelectedFormat, SelectError> {
        let mut best: Option<(&OfferedFormat, u32)> = None;

        for candidate in candidates {
            if !self.passes_filters(request, candidate) {
                trace!("Pixel format {} rejected", candidate.id);
                continue;
            }

            let score = self.score(request, candidate);
            trace!("Pixel format {} scored {}", candidate.id, score);

            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((candidate, score)),
            }
        }

        let (format, score) = best.ok_or(SelectError::NoCompatibleFormat {
            candidates: candidates.len(),
        })?;

        debug!(
            "Selected pixel format {} (score {}) out of {} candidates",
            format.id,
            score,
            candidates.len()
        );

        Ok(SelectedFormat {
            format: *format,
            path: SelectionPath::FullSearch,
            score: Some(score),
        })
    }

    /// Score of `candidate` against `request`. Does not check whether the candidate is usable at all.
    pub fn score(&self, request: &PixelFormatRequest, candidate: &OfferedFormat) -> u32 {
        let mut score = candidate.color_bits as u32;

        if iff(request.depth_enabled, candidate.depth_enabled()) {
            score += candidate.depth_bits as u32;
        }
        if iff(request.alpha_enabled, candidate.alpha_enabled()) {
            score += candidate.alpha_bits as u32;
        }
        if iff(request.accum_enabled, candidate.accum_enabled()) {
            score += candidate.accum_bits as u32;
        }
        if iff(request.stencil_enabled, candidate.stencil_enabled()) {
            score += candidate.stencil_bits as u32;
        }
        if iff(request.double_buffer, candidate.double_buffer) {
            score += DOUBLE_BUFFER_WEIGHT;
        }
        if iff(request.stereo, candidate.stereo) {
            score += STEREO_WEIGHT;
        }
        if iff(request.direct_rendering, candidate.direct_rendering) {
            score += DIRECT_RENDERING_WEIGHT;
        }
        if iff(request.color_model.is_rgba(), candidate.color_model.is_rgba()) {
            score += COLOR_MODEL_WEIGHT;
        }

        score
    }

    fn accepts_fast_path(&self, request: &PixelFormatRequest, candidate: &OfferedFormat) -> bool {
        if !(candidate.render_capable && candidate.draw_to_window) {
            warn!(
                "Platform suggested pixel format {} which cannot render to a window, searching all formats",
                candidate.id
            );
            return false;
        }

        // an unrequested overlay is fine, a missing requested one is not
        (!request.has_overlay || candidate.has_overlay)
            && iff(request.direct_rendering, candidate.direct_rendering)
            && candidate.bitmap_color_bits == self.bitmap_color_bits
            && candidate.draw_to_window
            && iff(request.color_model.is_rgba(), candidate.color_model.is_rgba())
    }

    fn passes_filters(&self, request: &PixelFormatRequest, candidate: &OfferedFormat) -> bool {
        candidate.render_capable
            && candidate.draw_to_window
            && candidate.bitmap_color_bits == self.bitmap_color_bits
            && (!request.has_overlay || candidate.has_overlay)
    }
}

/// [`PixelFormatSelector::select`] with the default selector.
pub fn select(
    request: &PixelFormatRequest,
    candidates: &[OfferedFormat],
) -> Result<SelectedFormat, SelectError> {
    PixelFormatSelector::default().select(request, candidates)
}

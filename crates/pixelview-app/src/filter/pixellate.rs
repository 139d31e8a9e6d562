//! Centre-anchored pixellation.
//!
//! `apply` does no pixel work: it returns a description (source frame, block
//! size, grid anchor) that the GPU evaluates in `pixellate.wgsl`. `rasterize`
//! runs the same math on the CPU. The two must stay in sync.

use std::sync::Arc;

use super::{FilterError, INTENSITY_MAX, INTENSITY_MIN};
use crate::media::types::DecodedFrame;

/// Pixellation filter. Intensity maps 1:1 to block size in source pixels.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pixellate;

impl Pixellate {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(
        &self,
        frame: Arc<DecodedFrame>,
        intensity: f32,
    ) -> Result<FilteredFrame, FilterError> {
        if !(INTENSITY_MIN..=INTENSITY_MAX).contains(&intensity) {
            return Err(FilterError::IntensityOutOfRange(intensity));
        }
        if frame.width == 0 || frame.height == 0 {
            return Err(FilterError::EmptyFrame);
        }
        if frame.data.len() != frame.expected_len() {
            return Err(FilterError::MalformedFrame {
                width: frame.width,
                height: frame.height,
                len: frame.data.len(),
            });
        }

        // Integer centre keeps intensity 1 an exact identity on odd sizes too.
        let center = [(frame.width / 2) as f32, (frame.height / 2) as f32];
        Ok(FilteredFrame {
            source: frame,
            block_size: intensity,
            center,
        })
    }
}

/// A pixellated image description covering the source frame's extent.
#[derive(Debug, Clone)]
pub struct FilteredFrame {
    pub source: Arc<DecodedFrame>,
    pub block_size: f32,
    /// Grid anchor in source pixel coordinates. A block edge passes through it.
    pub center: [f32; 2],
}

impl FilteredFrame {
    pub fn extent(&self) -> (u32, u32) {
        (self.source.width, self.source.height)
    }

    /// Source pixel sampled for output pixel (x, y): the centre of its block.
    pub fn source_coord(&self, x: u32, y: u32) -> (u32, u32) {
        (
            sample_axis(x, self.center[0], self.block_size, self.source.width),
            sample_axis(y, self.center[1], self.block_size, self.source.height),
        )
    }

    /// Evaluate the description on the CPU.
    pub fn rasterize(&self) -> DecodedFrame {
        let (width, height) = self.extent();
        let mut data = Vec::with_capacity(self.source.expected_len());
        for y in 0..height {
            for x in 0..width {
                let (sx, sy) = self.source_coord(x, y);
                data.extend_from_slice(&self.source.pixel(sx, sy));
            }
        }

        DecodedFrame {
            data,
            width,
            height,
            pts: self.source.pts,
        }
    }
}

fn sample_axis(p: u32, center: f32, block: f32, len: u32) -> u32 {
    let pc = p as f32 + 0.5;
    let cell = ((pc - center) / block).floor();
    let s = (center + (cell + 0.5) * block).floor();
    s.clamp(0.0, (len - 1) as f32) as u32
}

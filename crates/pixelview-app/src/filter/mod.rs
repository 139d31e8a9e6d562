pub mod pixellate;

use thiserror::Error;

pub use pixellate::{FilteredFrame, Pixellate};

/// Lowest accepted filter intensity (block size of one pixel).
pub const INTENSITY_MIN: f32 = 1.0;
/// Highest accepted filter intensity.
pub const INTENSITY_MAX: f32 = 100.0;

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("intensity {0} is outside 1..=100")]
    IntensityOutOfRange(f32),

    #[error("frame has no pixels")]
    EmptyFrame,

    #[error("frame is {width}x{height} but carries {len} bytes")]
    MalformedFrame { width: u32, height: u32, len: usize },
}

/// `--filter-test`: rasterize one test-pattern frame at a spread of
/// intensities and log how coarse each result is. Needs no GPU.
pub fn run_diagnostic() {
    use std::collections::HashSet;
    use std::sync::Arc;

    let Some(frame) = crate::media::clip::test_pattern(256, 144, 30.0, 1.0 / 30.0)
        .into_iter()
        .next()
    else {
        return;
    };
    let frame = Arc::new(frame);
    for intensity in [1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 100.0] {
        match Pixellate::new().apply(Arc::clone(&frame), intensity) {
            Ok(filtered) => {
                let out = filtered.rasterize();
                let distinct = out.data.chunks_exact(4).collect::<HashSet<_>>().len();
                log::info!("intensity {intensity:>5.1}: {distinct} distinct colours");
            }
            Err(e) => log::error!("intensity {intensity}: {e}"),
        }
    }
}

//! In-memory clips: pre-decoded frames with instant random access.
//!
//! Used for the generated test pattern and anything small enough to hold in
//! RAM. A 10s@30fps clip at 320x180 is ~70MB.

use super::provider::{FrameProvider, ProviderStatus};
use super::types::{DecodedFrame, VideoMeta};

/// Pre-decoded frames served by presentation timestamp.
pub struct ClipProvider {
    frames: Vec<DecodedFrame>,
    meta: VideoMeta,
    delivered: Option<usize>,
}

impl ClipProvider {
    /// Frames must be sorted by `pts` and share one size.
    pub fn new(frames: Vec<DecodedFrame>, fps: f64) -> Result<Self, String> {
        let first = frames.first().ok_or("clip has no frames")?;
        if fps <= 0.0 || !fps.is_finite() {
            return Err(format!("invalid clip frame rate {fps}"));
        }
        let (width, height) = (first.width, first.height);
        if frames.iter().any(|f| f.width != width || f.height != height) {
            return Err("clip frames differ in size".to_string());
        }
        if frames.windows(2).any(|w| w[1].pts < w[0].pts) {
            return Err("clip frames are not sorted by timestamp".to_string());
        }
        let last_pts = frames.last().map_or(0.0, |f| f.pts);
        let meta = VideoMeta {
            width,
            height,
            fps,
            duration_secs: last_pts + 1.0 / fps,
        };
        Ok(Self {
            frames,
            meta,
            delivered: None,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Index of the newest frame due at `item_time`.
    fn index_at(&self, item_time: f64) -> Option<usize> {
        self.frames
            .partition_point(|f| f.pts <= item_time)
            .checked_sub(1)
    }
}

impl FrameProvider for ClipProvider {
    fn status(&mut self) -> ProviderStatus {
        ProviderStatus::Ready(self.meta.clone())
    }

    fn has_new_frame(&mut self, item_time: f64) -> bool {
        self.index_at(item_time)
            .is_some_and(|i| self.delivered != Some(i))
    }

    fn copy_frame(&mut self, item_time: f64) -> Option<DecodedFrame> {
        if !self.has_new_frame(item_time) {
            return None;
        }
        let idx = self.index_at(item_time)?;
        self.delivered = Some(idx);
        self.frames.get(idx).cloned()
    }

    fn rewind(&mut self) {
        self.delivered = None;
    }

    fn exhausted(&mut self) -> bool {
        self.delivered == Some(self.frames.len() - 1)
    }
}

/// Generate a looping test pattern: colour gradient, a sweeping bar and a
/// checkerboard square that moves diagonally.
pub fn test_pattern(width: u32, height: u32, fps: f64, secs: f64) -> Vec<DecodedFrame> {
    let width = width.max(1);
    let height = height.max(1);
    let count = (secs * fps).round().max(1.0) as usize;
    let square = (width.min(height) / 4).max(1);

    (0..count)
        .map(|n| {
            let mut data = vec![0u8; (width as usize) * (height as usize) * 4];
            let bar_x = (n as u32 * 4) % width;
            let sq_x = (n as u32 * 2) % width.saturating_sub(square).max(1);
            let sq_y = (n as u32) % height.saturating_sub(square).max(1);
            let blue = ((n * 255) / count.max(1)) as u8;

            for y in 0..height {
                for x in 0..width {
                    let i = ((y * width + x) * 4) as usize;
                    let in_square = x >= sq_x && x < sq_x + square && y >= sq_y && y < sq_y + square;
                    let px = if in_square {
                        if ((x - sq_x) / 4 + (y - sq_y) / 4) % 2 == 0 {
                            [255, 255, 255, 255]
                        } else {
                            [0, 0, 0, 255]
                        }
                    } else if x.abs_diff(bar_x) < 3 {
                        [255, 220, 40, 255]
                    } else {
                        [
                            (x * 255 / width) as u8,
                            (y * 255 / height) as u8,
                            blue,
                            255,
                        ]
                    };
                    data[i..i + 4].copy_from_slice(&px);
                }
            }

            DecodedFrame {
                data,
                width,
                height,
                pts: n as f64 / fps,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_clip() -> ClipProvider {
        ClipProvider::new(test_pattern(16, 8, 10.0, 1.0), 10.0).unwrap()
    }

    #[test]
    fn test_pattern_frame_count_and_timestamps() {
        let frames = test_pattern(16, 8, 30.0, 10.0);
        assert_eq!(frames.len(), 300);
        assert_eq!(frames[0].data.len(), 16 * 8 * 4);
        assert!((frames[30].pts - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pattern_frames_differ_over_time() {
        let frames = test_pattern(16, 8, 10.0, 1.0);
        assert_ne!(frames[0].data, frames[5].data);
    }

    #[test]
    fn new_rejects_empty_clip() {
        assert!(ClipProvider::new(Vec::new(), 30.0).is_err());
    }

    #[test]
    fn new_rejects_bad_fps() {
        assert!(ClipProvider::new(test_pattern(4, 4, 10.0, 0.5), 0.0).is_err());
    }

    #[test]
    fn status_is_ready_with_duration() {
        let mut clip = small_clip();
        match clip.status() {
            ProviderStatus::Ready(meta) => {
                assert_eq!(meta.width, 16);
                assert_eq!(meta.height, 8);
                assert!((meta.duration_secs - 1.0).abs() < 1e-9);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn copy_frame_delivers_each_frame_once() {
        let mut clip = small_clip();
        assert!(clip.has_new_frame(0.0));
        let f = clip.copy_frame(0.0).unwrap();
        assert!((f.pts - 0.0).abs() < 1e-9);
        assert!(!clip.has_new_frame(0.05));
        assert!(clip.copy_frame(0.05).is_none());
        assert!(clip.has_new_frame(0.1));
    }

    #[test]
    fn copy_frame_skips_to_newest_due() {
        let mut clip = small_clip();
        let f = clip.copy_frame(0.35).unwrap();
        assert!((f.pts - 0.3).abs() < 1e-9);
    }

    #[test]
    fn nothing_due_before_first_frame() {
        let frames: Vec<_> = test_pattern(4, 4, 10.0, 0.5)
            .into_iter()
            .map(|mut f| {
                f.pts += 1.0;
                f
            })
            .collect();
        let mut clip = ClipProvider::new(frames, 10.0).unwrap();
        assert!(!clip.has_new_frame(0.5));
        assert!(clip.copy_frame(0.5).is_none());
    }

    #[test]
    fn rewind_makes_first_frame_new_again() {
        let mut clip = small_clip();
        clip.copy_frame(0.0).unwrap();
        assert!(!clip.has_new_frame(0.0));
        clip.rewind();
        assert!(clip.has_new_frame(0.0));
    }

    #[test]
    fn exhausted_after_last_frame_until_rewind() {
        let mut clip = small_clip();
        clip.copy_frame(0.85).unwrap();
        assert!(!clip.exhausted());
        clip.copy_frame(0.95).unwrap();
        assert!(clip.exhausted());
        clip.rewind();
        assert!(!clip.exhausted());
    }
}

/// A decoded frame ready for filtering and GPU upload.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub data: Vec<u8>, // RGBA8, tightly packed rows
    pub width: u32,
    pub height: u32,
    /// Presentation timestamp in seconds from the start of the clip.
    pub pts: f64,
}

impl DecodedFrame {
    /// Expected byte length for the frame's dimensions.
    pub fn expected_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    /// RGBA of the pixel at (x, y). Caller keeps coordinates in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

/// Video metadata reported by a provider once it is ready.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMeta {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub duration_secs: f64,
}

/// Transport state for the playback session.
#[derive(Debug, Clone)]
pub struct TransportState {
    pub playing: bool,
    pub looping: bool,
    /// Current item time in seconds.
    pub position: f64,
    /// Total duration in seconds. 0 until known: from the provider's
    /// metadata, or from the last frame once an unsized source runs out.
    pub duration: f64,
}

impl Default for TransportState {
    fn default() -> Self {
        Self {
            playing: false,
            looping: true,
            position: 0.0,
            duration: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_state_defaults() {
        let t = TransportState::default();
        assert!(!t.playing);
        assert!(t.looping);
        assert!((t.position - 0.0).abs() < 1e-10);
        assert!((t.duration - 0.0).abs() < 1e-10);
    }

    #[test]
    fn decoded_frame_pixel_lookup() {
        let frame = DecodedFrame {
            data: vec![
                1, 2, 3, 255, 4, 5, 6, 255, //
                7, 8, 9, 255, 10, 11, 12, 255,
            ],
            width: 2,
            height: 2,
            pts: 0.0,
        };
        assert_eq!(frame.expected_len(), 16);
        assert_eq!(frame.pixel(1, 0), [4, 5, 6, 255]);
        assert_eq!(frame.pixel(0, 1), [7, 8, 9, 255]);
    }
}

use super::types::{DecodedFrame, VideoMeta};

/// Readiness of a frame provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderStatus {
    /// Still probing or opening the source.
    Pending,
    Ready(VideoMeta),
    Failed(String),
}

/// Pull-based source of timed frames.
///
/// The playback session owns the clock; a provider only answers "is there a
/// newer frame due at this item time" and hands it over. Providers never push.
pub trait FrameProvider {
    fn status(&mut self) -> ProviderStatus;

    /// True if a frame not yet copied out is due at or before `item_time`.
    fn has_new_frame(&mut self, item_time: f64) -> bool;

    /// Newest frame due at or before `item_time`. Older due frames are dropped.
    fn copy_frame(&mut self, item_time: f64) -> Option<DecodedFrame>;

    /// Restart delivery from the first frame.
    fn rewind(&mut self);

    /// True once every frame the source will produce has been copied out.
    /// Marks the end of clips whose metadata carries no duration.
    fn exhausted(&mut self) -> bool {
        false
    }
}

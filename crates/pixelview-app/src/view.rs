use std::path::Path;
use std::sync::Arc;

use crate::error::PlayerError;
use crate::filter::{FilteredFrame, Pixellate};
use crate::media::video::FfmpegProvider;
use crate::media::{FrameProvider, PlaybackSession, SessionState, TickOutcome};
use crate::render::{self, PresentTarget, RedrawOutcome};
use crate::ui::ViewParams;

/// What a refresh tick did to the cached filtered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUpdate {
    NotReady,
    Unchanged,
    Updated,
}

/// Ties the playback session, the filter and presentation together.
///
/// The cached `FilteredFrame` only changes when the session hands out a new
/// decoded frame; redraws in between present the same image again.
pub struct VideoView {
    session: PlaybackSession,
    filter: Pixellate,
    current: Option<FilteredFrame>,
    frame_updates: u64,
}

impl VideoView {
    pub fn new() -> Self {
        Self {
            session: PlaybackSession::new(),
            filter: Pixellate::new(),
            current: None,
            frame_updates: 0,
        }
    }

    /// Start decoding `path` in the background.
    pub fn open(&mut self, path: &Path) {
        log::info!("Opening {}", path.display());
        self.open_provider(Box::new(FfmpegProvider::open(path)));
    }

    pub fn open_provider(&mut self, provider: Box<dyn FrameProvider>) {
        self.current = None;
        self.session.start(provider);
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.session.set_looping(looping);
    }

    /// Apply the UI's play state to the session.
    pub fn bind(&mut self, params: &ViewParams) {
        if params.playing == self.session.is_playing() {
            return;
        }
        if params.playing {
            self.session.play();
        } else {
            self.session.pause();
        }
    }

    /// Advance playback to `host_secs` and re-filter when a new frame is due.
    pub fn refresh_tick(
        &mut self,
        host_secs: f64,
        params: &ViewParams,
    ) -> Result<FrameUpdate, PlayerError> {
        match self.session.tick(host_secs)? {
            TickOutcome::NotReady => Ok(FrameUpdate::NotReady),
            TickOutcome::NoNewFrame => Ok(FrameUpdate::Unchanged),
            TickOutcome::Frame(frame) => {
                let filtered = self.filter.apply(Arc::new(frame), params.intensity())?;
                self.current = Some(filtered);
                self.frame_updates += 1;
                Ok(FrameUpdate::Updated)
            }
        }
    }

    /// Present the cached frame on `target`. At most one submission.
    pub fn redraw<T: PresentTarget>(&self, target: &mut T) -> RedrawOutcome {
        render::redraw(target, self.current.as_ref())
    }

    pub fn stop(&mut self) {
        self.session.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_playing()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.session.state(), SessionState::Ready(_))
    }

    pub fn position_secs(&self) -> f64 {
        self.session.position_secs()
    }

    pub fn duration_secs(&self) -> f64 {
        self.session.duration_secs()
    }

    #[cfg(test)]
    pub fn current_frame(&self) -> Option<&FilteredFrame> {
        self.current.as_ref()
    }

    pub fn frame_updates(&self) -> u64 {
        self.frame_updates
    }

    pub fn status_label(&self) -> &'static str {
        match self.session.state() {
            SessionState::Unopened => "No media",
            SessionState::Opening => "Opening",
            SessionState::Ready(_) if self.session.is_playing() => "Playing",
            SessionState::Ready(_) => "Paused",
            SessionState::Failed(_) => "Failed",
        }
    }
}

impl Default for VideoView {
    fn default() -> Self {
        Self::new()
    }
}

use super::provider::{FrameProvider, ProviderStatus};
use super::types::{DecodedFrame, TransportState, VideoMeta};
use crate::error::PlayerError;

/// Lifecycle of a playback session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unopened,
    Opening,
    Ready(VideoMeta),
    Failed(String),
}

/// Result of one refresh tick.
#[derive(Debug)]
pub enum TickOutcome {
    /// Source still opening. Steady state until the provider reports ready.
    NotReady,
    /// Nothing newer than the last delivered frame is due.
    NoNewFrame,
    Frame(DecodedFrame),
}

/// Owns the frame provider and the transport clock.
pub struct PlaybackSession {
    provider: Option<Box<dyn FrameProvider>>,
    state: SessionState,
    transport: TransportState,
    last_host_time: Option<f64>,
    /// Timestamp of the newest frame handed out.
    last_pts: Option<f64>,
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self {
            provider: None,
            state: SessionState::Unopened,
            transport: TransportState::default(),
            last_host_time: None,
            last_pts: None,
        }
    }

    /// Attach a provider and begin waiting for it to become ready.
    pub fn start(&mut self, provider: Box<dyn FrameProvider>) {
        let looping = self.transport.looping;
        self.provider = Some(provider);
        self.state = SessionState::Opening;
        self.transport = TransportState {
            looping,
            ..TransportState::default()
        };
        self.last_host_time = None;
        self.last_pts = None;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[cfg(test)]
    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    pub fn is_playing(&self) -> bool {
        self.transport.playing
    }

    pub fn position_secs(&self) -> f64 {
        self.transport.position
    }

    pub fn duration_secs(&self) -> f64 {
        self.transport.duration
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.transport.looping = looping;
    }

    /// Metadata once the provider is ready, `SessionNotReady` while opening.
    pub fn poll_ready(&mut self) -> Result<VideoMeta, PlayerError> {
        let provider = match (&self.state, self.provider.as_mut()) {
            (SessionState::Unopened, _) | (_, None) => return Err(PlayerError::NotOpened),
            (SessionState::Failed(e), _) => return Err(PlayerError::SessionFailed(e.clone())),
            (_, Some(p)) => p,
        };

        match provider.status() {
            ProviderStatus::Pending => {
                if let SessionState::Ready(meta) = &self.state {
                    return Ok(meta.clone());
                }
                Err(PlayerError::SessionNotReady)
            }
            ProviderStatus::Ready(meta) => {
                if self.state == SessionState::Opening {
                    log::info!(
                        "Session ready: {}x{} @ {:.2} fps, {:.2}s",
                        meta.width,
                        meta.height,
                        meta.fps,
                        meta.duration_secs
                    );
                    self.transport.duration = meta.duration_secs;
                    self.state = SessionState::Ready(meta.clone());
                }
                Ok(meta)
            }
            ProviderStatus::Failed(e) => {
                log::error!("Playback session failed: {e}");
                self.state = SessionState::Failed(e.clone());
                self.transport.playing = false;
                Err(PlayerError::SessionFailed(e))
            }
        }
    }

    /// Advance the clock to `host_secs` and pull the newest due frame.
    pub fn tick(&mut self, host_secs: f64) -> Result<TickOutcome, PlayerError> {
        let dt = self
            .last_host_time
            .map_or(0.0, |last| (host_secs - last).max(0.0));
        self.last_host_time = Some(host_secs);

        match self.poll_ready() {
            Ok(_) => {}
            Err(PlayerError::SessionNotReady) => return Ok(TickOutcome::NotReady),
            Err(e) => return Err(e),
        }

        self.advance(dt);

        let item_time = self.transport.position;
        let provider = self.provider.as_mut().ok_or(PlayerError::NotOpened)?;
        let outcome = if provider.has_new_frame(item_time) {
            provider
                .copy_frame(item_time)
                .map_or(TickOutcome::NoNewFrame, TickOutcome::Frame)
        } else {
            TickOutcome::NoNewFrame
        };
        if let TickOutcome::Frame(frame) = &outcome {
            self.last_pts = Some(frame.pts);
        }
        self.learn_duration();
        Ok(outcome)
    }

    /// A source without a reported duration ends one frame period after the
    /// last frame it delivered. From then on `advance` wraps or pauses there.
    fn learn_duration(&mut self) {
        if self.transport.duration > 0.0 {
            return;
        }
        let Some(provider) = self.provider.as_mut() else {
            return;
        };
        if !provider.exhausted() {
            return;
        }
        let frame_period = match &self.state {
            SessionState::Ready(meta) if meta.fps > 0.0 => 1.0 / meta.fps,
            _ => 0.0,
        };
        let end = self
            .last_pts
            .map_or(self.transport.position, |pts| pts + frame_period);
        if end > 0.0 {
            log::info!("Source reported no duration, clip ends at {end:.2}s");
            self.transport.duration = end;
        }
    }

    fn advance(&mut self, dt: f64) {
        if !self.transport.playing {
            return;
        }
        self.transport.position += dt;

        let duration = self.transport.duration;
        if duration > 0.0 && self.transport.position >= duration {
            if self.transport.looping {
                self.transport.position = self.transport.position.rem_euclid(duration);
                if let Some(p) = self.provider.as_mut() {
                    p.rewind();
                }
            } else {
                self.transport.position = duration;
                self.transport.playing = false;
            }
        }
    }

    /// Resume playback. At the end of a non-looping clip, restart from zero.
    pub fn play(&mut self) {
        if self.transport.playing {
            return;
        }
        let duration = self.transport.duration;
        if !self.transport.looping && duration > 0.0 && self.transport.position >= duration {
            self.rewind_to_start();
        }
        self.transport.playing = true;
    }

    pub fn pause(&mut self) {
        self.transport.playing = false;
    }

    /// Pause and return to the first frame.
    pub fn stop(&mut self) {
        self.transport.playing = false;
        self.rewind_to_start();
    }

    fn rewind_to_start(&mut self) {
        self.transport.position = 0.0;
        if matches!(self.state, SessionState::Ready(_)) {
            if let Some(p) = self.provider.as_mut() {
                p.rewind();
            }
        }
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new()
    }
}

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use winit::window::Window;

use crate::error::PlayerError;
use crate::gpu::{GpuContext, PixellatePipeline, SurfaceTarget};
use crate::media::clip::{ClipProvider, test_pattern};
use crate::media::video;
use crate::render::RedrawOutcome;
use crate::settings::PlayerSettings;
use crate::ui::{EguiOverlay, PlaybackInfo, ViewParams};
use crate::view::VideoView;

const PATTERN_SIZE: (u32, u32) = (256, 144);
const PATTERN_FPS: f64 = 30.0;
const PATTERN_SECS: f64 = 10.0;

pub struct App {
    pub gpu: GpuContext,
    pub window: Arc<Window>,
    pub view: VideoView,
    pub pipeline: PixellatePipeline,
    pub egui_overlay: EguiOverlay,
    pub params: ViewParams,
    pub media_label: String,
    pub status_error: Option<String>,
    pub start_time: Instant,
}

impl App {
    pub fn new(window: Arc<Window>, settings: &PlayerSettings) -> Result<Self> {
        let gpu = GpuContext::new(window.clone())?;
        let pipeline = PixellatePipeline::new(&gpu.device, gpu.format);
        let egui_overlay = EguiOverlay::new(&gpu.device, gpu.format, &window);

        let mut view = VideoView::new();
        view.set_looping(settings.looping);
        let media_label = match settings.resolve_media_path() {
            Some(path) if video::ffmpeg_available() => {
                view.open(&path);
                path.file_name()
                    .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
            }
            Some(path) => {
                log::warn!(
                    "ffprobe/ffmpeg not found, playing test pattern instead of {}",
                    path.display()
                );
                open_test_pattern(&mut view)?
            }
            None => {
                log::warn!("No media file found, playing test pattern");
                open_test_pattern(&mut view)?
            }
        };

        Ok(Self {
            gpu,
            window,
            view,
            pipeline,
            egui_overlay,
            params: ViewParams::new(true, settings.initial_intensity),
            media_label,
            status_error: None,
            start_time: Instant::now(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.egui_overlay
            .resize(width, height, self.window.scale_factor() as f32);
    }

    /// One refresh tick: push the UI state into the view and pull a frame.
    pub fn update(&mut self) {
        let host_secs = self.start_time.elapsed().as_secs_f64();
        self.view.bind(&self.params);
        if let Err(e) = self.view.refresh_tick(host_secs, &self.params) {
            // Session failures are logged on the transition; filter errors here.
            if self.status_error.is_none() && !matches!(e, PlayerError::SessionFailed(_)) {
                log::error!("Playback error: {e}");
            }
            self.status_error = Some(e.to_string());
            self.params.playing = false;
        }
        // The session pauses itself at the end of a non-looping clip.
        if self.view.is_ready() && !self.view.is_playing() {
            self.params.playing = false;
        }
    }

    pub fn toggle_play(&mut self) {
        self.params.toggle_playing();
    }

    pub fn stop(&mut self) {
        self.params.playing = false;
        self.view.stop();
    }

    pub fn playback_info(&self) -> PlaybackInfo {
        PlaybackInfo {
            media_label: self.media_label.clone(),
            position_secs: self.view.position_secs(),
            duration_secs: self.view.duration_secs(),
            status: self.view.status_label(),
            ready: self.view.is_ready(),
            frames_filtered: self.view.frame_updates(),
            error: self.status_error.clone(),
        }
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let mut target = SurfaceTarget::new(&self.gpu, &mut self.pipeline, &mut self.egui_overlay);
        match self.view.redraw(&mut target) {
            RedrawOutcome::Presented | RedrawOutcome::NoCommandBuffer => Ok(()),
            RedrawOutcome::NoFilteredFrame => {
                target.redraw_overlay_only().or_else(withheld_is_ok)
            }
            RedrawOutcome::NoDrawable => target
                .take_error()
                .map_or(Ok(()), Err)
                .or_else(withheld_is_ok),
        }
    }
}

/// A timed-out drawable means the previous present is still in flight. The
/// tick is skipped and the next redraw tries again.
fn withheld_is_ok(err: wgpu::SurfaceError) -> Result<(), wgpu::SurfaceError> {
    match err {
        wgpu::SurfaceError::Timeout => {
            log::debug!("Drawable withheld, skipping redraw");
            Ok(())
        }
        other => Err(other),
    }
}

fn open_test_pattern(view: &mut VideoView) -> Result<String> {
    let (width, height) = PATTERN_SIZE;
    let frames = test_pattern(width, height, PATTERN_FPS, PATTERN_SECS);
    let clip = ClipProvider::new(frames, PATTERN_FPS).map_err(anyhow::Error::msg)?;
    log::info!(
        "Test pattern: {} frames at {width}x{height}",
        clip.frame_count()
    );
    view.open_provider(Box::new(clip));
    Ok("Test pattern".to_string())
}

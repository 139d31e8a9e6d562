use wgpu::{CommandEncoder, SurfaceError, SurfaceTexture};

use super::context::GpuContext;
use super::pipeline::PixellatePipeline;
use crate::filter::FilteredFrame;
use crate::render::{FitTransform, PresentTarget};
use crate::ui::EguiOverlay;

/// Encoder for one redraw plus the drawable scheduled for presentation.
pub struct FrameCommands {
    encoder: CommandEncoder,
    scheduled: Option<SurfaceTexture>,
}

/// The window surface as a `PresentTarget`. Borrowed for a single redraw.
pub struct SurfaceTarget<'a> {
    gpu: &'a GpuContext,
    pipeline: &'a mut PixellatePipeline,
    overlay: &'a mut EguiOverlay,
    error: Option<SurfaceError>,
}

impl<'a> SurfaceTarget<'a> {
    pub fn new(
        gpu: &'a GpuContext,
        pipeline: &'a mut PixellatePipeline,
        overlay: &'a mut EguiOverlay,
    ) -> Self {
        Self {
            gpu,
            pipeline,
            overlay,
            error: None,
        }
    }

    /// The error behind the last withheld drawable, if any.
    pub fn take_error(&mut self) -> Option<SurfaceError> {
        self.error.take()
    }

    /// Draw only the overlay on a black background. Used until the first
    /// filtered frame exists so the controls are reachable while opening.
    pub fn redraw_overlay_only(&mut self) -> Result<(), SurfaceError> {
        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.encoder();
        self.overlay
            .render(&self.gpu.device, &self.gpu.queue, &mut encoder, &view, true);
        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn encoder(&self) -> CommandEncoder {
        self.gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pixelview-frame"),
            })
    }
}

impl PresentTarget for SurfaceTarget<'_> {
    type Commands = FrameCommands;
    type Drawable = SurfaceTexture;

    fn command_buffer(&mut self) -> Option<FrameCommands> {
        Some(FrameCommands {
            encoder: self.encoder(),
            scheduled: None,
        })
    }

    fn next_drawable(&mut self) -> Option<SurfaceTexture> {
        match self.gpu.surface.get_current_texture() {
            Ok(texture) => Some(texture),
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }

    fn drawable_size(&self, drawable: &SurfaceTexture) -> (u32, u32) {
        (drawable.texture.width(), drawable.texture.height())
    }

    fn encode(
        &mut self,
        commands: &mut FrameCommands,
        drawable: &SurfaceTexture,
        image: &FilteredFrame,
        fit: &FitTransform,
    ) {
        let view = drawable
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.pipeline
            .prepare(&self.gpu.device, &self.gpu.queue, image, fit);
        self.pipeline.draw(&mut commands.encoder, &view);
        self.overlay.render(
            &self.gpu.device,
            &self.gpu.queue,
            &mut commands.encoder,
            &view,
            false,
        );
    }

    fn present(&mut self, commands: &mut FrameCommands, drawable: SurfaceTexture) {
        commands.scheduled = Some(drawable);
    }

    fn submit(&mut self, commands: FrameCommands) {
        self.gpu
            .queue
            .submit(std::iter::once(commands.encoder.finish()));
        // wgpu presents after the submission that wrote the texture.
        if let Some(texture) = commands.scheduled {
            texture.present();
        }
    }
}

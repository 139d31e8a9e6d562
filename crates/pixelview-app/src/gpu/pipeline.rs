use std::sync::Arc;

use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, BufferBindingType, ColorTargetState,
    CommandEncoder, Device, FragmentState, MultisampleState, PipelineCompilationOptions,
    PipelineLayoutDescriptor, PrimitiveState, Queue, RenderPipeline, ShaderStages, Texture,
    TextureFormat, TextureSampleType, TextureView, TextureViewDimension, VertexState,
};

use super::fullscreen_quad::FULLSCREEN_TRIANGLE_VS;
use super::uniforms::{PixellateUniforms, UniformBuffer};
use crate::filter::FilteredFrame;
use crate::media::DecodedFrame;
use crate::render::FitTransform;

const PIXELLATE_FS: &str = include_str!("../../../../assets/shaders/pixellate.wgsl");

/// Frame texture sized to the current video, recreated when the size changes.
struct FrameTexture {
    texture: Texture,
    bind_group: BindGroup,
    width: u32,
    height: u32,
}

/// Draws a `FilteredFrame` onto a surface view: block sampling and fit
/// placement both happen in the fragment shader.
pub struct PixellatePipeline {
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    uniforms: UniformBuffer,
    frame: Option<FrameTexture>,
    uploaded: Option<Arc<DecodedFrame>>,
}

impl PixellatePipeline {
    pub fn new(device: &Device, format: TextureFormat) -> Self {
        let bind_group_layout = Self::create_bind_group_layout(device);

        let full_source = format!("{FULLSCREEN_TRIANGLE_VS}\n{PIXELLATE_FS}");
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pixellate-shader"),
            source: wgpu::ShaderSource::Wgsl(full_source.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("pixellate-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pixellate-render-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader_module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader_module,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
            uniforms: UniformBuffer::new(device),
            frame: None,
            uploaded: None,
        }
    }

    fn create_bind_group_layout(device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("pixellate-bind-group-layout"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        // textureLoad only; no sampler bound
                        sample_type: TextureSampleType::Float { filterable: false },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        })
    }

    fn create_frame_texture(&self, device: &Device, width: u32, height: u32) -> FrameTexture {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("video-frame"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view: TextureView = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("pixellate-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: self.uniforms.buffer.as_entire_binding(),
                },
            ],
        });
        log::debug!("Created {width}x{height} frame texture");
        FrameTexture {
            texture,
            bind_group,
            width,
            height,
        }
    }

    /// Upload the source frame if it changed and refresh the uniforms.
    pub fn prepare(
        &mut self,
        device: &Device,
        queue: &Queue,
        image: &FilteredFrame,
        fit: &FitTransform,
    ) {
        let (width, height) = image.extent();
        let resized = self
            .frame
            .as_ref()
            .is_none_or(|f| f.width != width || f.height != height);
        if resized {
            self.frame = Some(self.create_frame_texture(device, width, height));
            self.uploaded = None;
        }

        let fresh = self
            .uploaded
            .as_ref()
            .is_none_or(|last| !Arc::ptr_eq(last, &image.source));
        if fresh && let Some(frame) = &self.frame {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &frame.texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &image.source.data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(width * 4),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
            self.uploaded = Some(Arc::clone(&image.source));
        }

        self.uniforms
            .update(queue, &PixellateUniforms::new(image, fit));
    }

    /// Clear `target` to black and draw the prepared frame over its full extent.
    pub fn draw(&self, encoder: &mut CommandEncoder, target: &TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("pixellate-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        if let Some(frame) = &self.frame {
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &frame.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
    }
}

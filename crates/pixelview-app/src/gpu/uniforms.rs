use bytemuck::{Pod, Zeroable};
use wgpu::{Buffer, Device, Queue};

use crate::filter::FilteredFrame;
use crate::render::FitTransform;

/// Pixellate uniforms packed for GPU consumption (32 bytes).
/// Must be kept in sync with the WGSL `PixellateUniforms` struct.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PixellateUniforms {
    pub frame_size: [f32; 2],
    pub offset: [f32; 2],
    pub center: [f32; 2],
    pub scale: f32,
    pub block_size: f32,
}

impl PixellateUniforms {
    pub fn new(image: &FilteredFrame, fit: &FitTransform) -> Self {
        let (width, height) = image.extent();
        Self {
            frame_size: [width as f32, height as f32],
            offset: fit.offset,
            center: image.center,
            scale: fit.scale,
            block_size: image.block_size,
        }
    }
}

pub struct UniformBuffer {
    pub buffer: Buffer,
}

impl UniformBuffer {
    pub fn new(device: &Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pixellate-uniforms"),
            size: std::mem::size_of::<PixellateUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer }
    }

    pub fn update(&self, queue: &Queue, uniforms: &PixellateUniforms) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniforms));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::filter::Pixellate;
    use crate::media::DecodedFrame;

    #[test]
    fn pixellate_uniforms_size_32() {
        assert_eq!(std::mem::size_of::<PixellateUniforms>(), 32);
    }

    #[test]
    fn uniforms_carry_frame_and_fit() {
        let frame = Arc::new(DecodedFrame {
            data: vec![0; 64 * 32 * 4],
            width: 64,
            height: 32,
            pts: 0.0,
        });
        let image = Pixellate::new().apply(frame, 8.0).unwrap();
        let fit = FitTransform::compute((64, 32), (128, 128));
        let u = PixellateUniforms::new(&image, &fit);

        assert_eq!(u.frame_size, [64.0, 32.0]);
        assert_eq!(u.center, [32.0, 16.0]);
        assert_eq!(u.block_size, 8.0);
        assert_eq!(u.scale, 4.0);
        assert_eq!(u.offset, [-64.0, 0.0]);
    }
}

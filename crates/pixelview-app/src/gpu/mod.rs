pub mod context;
pub mod fullscreen_quad;
pub mod pipeline;
pub mod surface_target;
pub mod uniforms;

pub use context::GpuContext;
pub use pipeline::PixellatePipeline;
pub use surface_target::SurfaceTarget;

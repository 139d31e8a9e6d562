pub mod controls;
pub mod overlay;
pub mod theme;

pub use controls::{PlaybackInfo, ViewParams, draw_controls};
pub use overlay::EguiOverlay;

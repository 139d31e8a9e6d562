pub mod clip;
pub mod provider;
pub mod session;
pub mod types;
pub mod video;

pub use provider::FrameProvider;
pub use session::{PlaybackSession, SessionState, TickOutcome};
pub use types::DecodedFrame;

use thiserror::Error;

use crate::filter::FilterError;

/// Errors surfaced by the playback view.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no media has been opened")]
    NotOpened,

    /// The provider has not reported ready yet. Expected while opening.
    #[error("playback session is not ready yet")]
    SessionNotReady,

    #[error("playback session failed: {0}")]
    SessionFailed(String),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

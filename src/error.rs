use thiserror::Error;

use crate::tracklet::TrackletId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("feature dimension mismatch: {0} != {1}")]
    DimensionMismatch(usize, usize),

    #[error("speed requires at least 2 frames, got {0}")]
    InsufficientFrames(usize),

    #[error("tracklet {0} has no frames")]
    EmptyTracklet(TrackletId),

    #[error("frames span zero time")]
    ZeroDuration,

    #[error("unknown road user class: {0}")]
    UnknownClass(i32),

    #[error("duplicate tracklet id: {0}")]
    DuplicateTracklet(TrackletId),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
}

//! Error types for the scanning pipeline.
//!
//! Each layer converts its failures at the boundary nearest their origin; these
//! types only describe what can go wrong, not how it is reported to the user.

use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, ScanError>;

/// A pixel buffer that does not describe a valid RGBA frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Width or height is zero
    #[error("frame dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
    },

    /// Buffer length does not match `width * height * 4`
    #[error("RGBA buffer for {width}x{height} needs {expected} bytes, got {actual}")]
    BufferLength {
        /// Frame width
        width: usize,
        /// Frame height
        height: usize,
        /// Bytes the dimensions require
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// `width * height * 4` does not fit in memory addressing
    #[error("frame dimensions {width}x{height} overflow")]
    Overflow {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
    },
}

/// Failures of a frame source.
///
/// `PermissionDenied`, `DeviceUnavailable` and `Unsupported` are terminal for the
/// live camera path of a session.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The user or host refused camera access
    #[error("camera permission denied")]
    PermissionDenied,

    /// No usable camera, or the device is busy
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// The host exposes no camera API at all
    #[error("camera capture is not supported on this host")]
    Unsupported,

    /// The stream was already stopped
    #[error("video stream already stopped")]
    Stopped,

    /// A still image could not be decoded
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    /// A still image could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The captured pixels did not form a valid frame
    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl SourceError {
    /// Whether this error ends the live camera path for the session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SourceError::PermissionDenied
                | SourceError::DeviceUnavailable(_)
                | SourceError::Unsupported
                | SourceError::Stopped
        )
    }
}

/// Top-level errors surfaced by the session API.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Invalid pixel buffer
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Camera or image failure
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The decode worker thread could not be spawned
    #[error("failed to spawn decode worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// Operation requires a live session
    #[error("scan session already stopped")]
    SessionStopped,
}

//! Data passed between the pipeline stages

/// Validated RGBA frames
pub mod frame;
/// Decode results
pub mod outcome;
/// Validated navigation paths
pub mod target;

pub use frame::PixelFrame;
pub use outcome::DecodeOutcome;
pub use target::NavigationTarget;

//! Frame sources
//!
//! Two variants, both producing a [`crate::PixelFrame`]:
//! - [`camera::LiveCamera`] pulls the latest frame from a video stream
//! - [`still::StillImage`] yields one uploaded image and is done
//!
//! Camera hardware sits behind [`camera::CameraProvider`] so hosts plug in
//! their own capture backend and tests plug in recorded frames.

/// Live and recorded camera streams
pub mod camera;
/// Uploaded images
pub mod still;

pub use camera::{CameraProvider, Facing, LiveCamera, ReplayCamera, ReplayStream, VideoStream};
pub use still::StillImage;


use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::SourceError;
use crate::models::PixelFrame;

/// Requested camera direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Rear camera, pointed away from the user
    #[default]
    Environment,
    /// Front camera
    User,
}

/// An acquired camera stream
pub trait VideoStream: Send {
    /// Rasterize the current video image
    ///
    /// `Ok(None)` means the stream does not have enough data yet. Must not wait
    /// for a new frame.
    fn latest_frame(&mut self) -> Result<Option<PixelFrame>, SourceError>;

    /// Release every track. Calling it twice is harmless.
    fn stop(&mut self);
}

/// Host capture backend
pub trait CameraProvider {
    /// Ask for camera access and open a stream
    ///
    /// Fails with `PermissionDenied`, `DeviceUnavailable` or `Unsupported`.
    fn open(&mut self, facing: Facing) -> Result<Box<dyn VideoStream>, SourceError>;
}

/// Exclusive owner of one camera stream for a session
pub struct LiveCamera {
    stream: Option<Box<dyn VideoStream>>,
}

impl LiveCamera {
    /// Acquire a stream from `provider`
    pub fn acquire(provider: &mut dyn CameraProvider, facing: Facing) -> Result<Self, SourceError> {
        let stream = provider.open(facing)?;
        tracing::info!(?facing, "camera stream acquired");
        Ok(Self {
            stream: Some(stream),
        })
    }

    /// Capture the current frame, if the stream has one
    pub fn capture(&mut self) -> Result<Option<PixelFrame>, SourceError> {
        match self.stream.as_mut() {
            Some(stream) => stream.latest_frame(),
            None => Err(SourceError::Stopped),
        }
    }

    /// Whether the stream is still held
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Stop all tracks and give up the stream
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::info!("camera stream released");
        }
    }
}

impl Drop for LiveCamera {
    fn drop(&mut self) {
        self.close();
    }
}

/// Camera provider that plays back recorded frames
///
/// Used by the `qrscan replay` command and by tests. The stream cycles through
/// its frames; `with_warmup` makes the first pulls report "not enough data".
#[derive(Clone)]
pub struct ReplayCamera {
    frames: Arc<Vec<PixelFrame>>,
    warmup: usize,
    stopped: Arc<AtomicBool>,
    opened: Arc<AtomicUsize>,
}

impl ReplayCamera {
    /// Provider whose streams cycle through `frames`
    pub fn new(frames: Vec<PixelFrame>) -> Self {
        Self {
            frames: Arc::new(frames),
            warmup: 0,
            stopped: Arc::new(AtomicBool::new(false)),
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Report no data for the first `ticks` pulls of each stream
    pub fn with_warmup(mut self, ticks: usize) -> Self {
        self.warmup = ticks;
        self
    }

    /// Whether the last opened stream has released its tracks
    pub fn tracks_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// How many streams were opened through this provider
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::Acquire)
    }
}

impl CameraProvider for ReplayCamera {
    fn open(&mut self, _facing: Facing) -> Result<Box<dyn VideoStream>, SourceError> {
        if self.frames.is_empty() {
            return Err(SourceError::DeviceUnavailable(
                "replay camera has no frames".to_string(),
            ));
        }
        self.opened.fetch_add(1, Ordering::AcqRel);
        self.stopped.store(false, Ordering::Release);
        Ok(Box::new(ReplayStream {
            frames: Arc::clone(&self.frames),
            warmup: self.warmup,
            cursor: 0,
            stopped: Arc::clone(&self.stopped),
        }))
    }
}

/// Stream handed out by [`ReplayCamera`]
pub struct ReplayStream {
    frames: Arc<Vec<PixelFrame>>,
    warmup: usize,
    cursor: usize,
    stopped: Arc<AtomicBool>,
}

impl VideoStream for ReplayStream {
    fn latest_frame(&mut self) -> Result<Option<PixelFrame>, SourceError> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(SourceError::Stopped);
        }
        if self.warmup > 0 {
            self.warmup -= 1;
            return Ok(None);
        }
        let frame = self.frames[self.cursor % self.frames.len()].clone();
        self.cursor += 1;
        Ok(Some(frame))
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames() -> Vec<PixelFrame> {
        vec![
            PixelFrame::filled(2, 2, [0, 0, 0, 255]).unwrap(),
            PixelFrame::filled(2, 2, [255, 255, 255, 255]).unwrap(),
        ]
    }

    struct Denied;

    impl CameraProvider for Denied {
        fn open(&mut self, _facing: Facing) -> Result<Box<dyn VideoStream>, SourceError> {
            Err(SourceError::PermissionDenied)
        }
    }

    #[test]
    fn test_replay_cycles_after_warmup() {
        let mut provider = ReplayCamera::new(frames()).with_warmup(1);
        let mut camera = LiveCamera::acquire(&mut provider, Facing::Environment).unwrap();
        assert_eq!(camera.capture().unwrap(), None);
        let a = camera.capture().unwrap().unwrap();
        let b = camera.capture().unwrap().unwrap();
        let c = camera.capture().unwrap().unwrap();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_close_releases_tracks() {
        let mut provider = ReplayCamera::new(frames());
        let mut camera = LiveCamera::acquire(&mut provider, Facing::Environment).unwrap();
        assert!(!provider.tracks_stopped());
        camera.close();
        assert!(provider.tracks_stopped());
        assert!(!camera.is_open());
        assert!(matches!(camera.capture(), Err(SourceError::Stopped)));
    }

    #[test]
    fn test_drop_releases_tracks() {
        let mut provider = ReplayCamera::new(frames());
        {
            let _camera = LiveCamera::acquire(&mut provider, Facing::User).unwrap();
        }
        assert!(provider.tracks_stopped());
        assert_eq!(provider.open_count(), 1);
    }

    #[test]
    fn test_acquire_errors_pass_through() {
        let err = LiveCamera::acquire(&mut Denied, Facing::Environment).err().unwrap();
        assert!(matches!(err, SourceError::PermissionDenied));

        let mut empty = ReplayCamera::new(Vec::new());
        let err = LiveCamera::acquire(&mut empty, Facing::Environment).err().unwrap();
        assert!(matches!(err, SourceError::DeviceUnavailable(_)));
    }
}

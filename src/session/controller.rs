use std::thread;
use std::time::{Duration, Instant};

use crate::collab::{Navigator, Notice, Notifier};
use crate::config::ScanConfig;
use crate::decoder::engine::{DecodeOptions, QrEngine, SymbolDecoder};
use crate::error::{ScanError, SourceError};
use crate::models::{DecodeOutcome, PixelFrame};
use crate::router::{ResultRouter, RouteDecision};
use crate::source::{CameraProvider, Facing, LiveCamera};
use crate::worker::{DecodeWorker, Submit};

use super::scheduler::Ticker;

/// Camera access as far as the session knows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraPermission {
    /// Not asked yet
    Unknown,
    /// Stream acquired
    Granted,
    /// Refused or unavailable
    Denied,
}

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Camera could not be opened; uploads still work
    CameraDenied,
    /// Camera failed mid-session; uploads still work
    CameraLost,
    /// The view went away; everything is released
    Teardown,
}

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, camera not requested
    Idle,
    /// Waiting on camera access
    PermissionPending,
    /// Ticking
    Active,
    /// A code was accepted; no ticks until resumed
    Paused,
    /// Live path over
    Stopped(StopReason),
}

/// Per-session counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    /// Ticks run while active
    pub ticks: u64,
    /// Frames pulled from the camera
    pub frames_captured: u64,
    /// Frames the worker accepted
    pub frames_submitted: u64,
    /// Captured but refused by a busy worker
    pub frames_dropped: u64,
    /// Ticks skipped without capturing because a decode was in flight
    pub busy_ticks: u64,
    /// Outcomes routed
    pub outcomes: u64,
    /// Validated codes handed to the navigator
    pub navigations: u64,
}

/// One scanning view, from mount to teardown
///
/// Owns the camera stream and the decode worker. Both are released by
/// [`stop`](Self::stop) or when the session is dropped.
pub struct ScanSession<N: Navigator, T: Notifier> {
    config: ScanConfig,
    router: ResultRouter,
    state: SessionState,
    permission: CameraPermission,
    scan_active: bool,
    camera: Option<LiveCamera>,
    worker: Option<DecodeWorker>,
    navigator: N,
    notifier: T,
    last_error: Option<String>,
    stats: ScanStats,
}

impl<N: Navigator, T: Notifier> ScanSession<N, T> {
    /// Create a session backed by the QR engine described by `config`
    pub fn new(config: ScanConfig, navigator: N, notifier: T) -> Result<Self, ScanError> {
        let engine = QrEngine::new(DecodeOptions {
            inversion: config.inversion,
            parallel_min_pixels: config.parallel_min_pixels,
        });
        Self::with_decoder(config, engine, navigator, notifier)
    }

    /// Create a session with a custom decoder on the worker thread
    pub fn with_decoder<D>(
        config: ScanConfig,
        decoder: D,
        navigator: N,
        notifier: T,
    ) -> Result<Self, ScanError>
    where
        D: SymbolDecoder + 'static,
    {
        let worker = DecodeWorker::spawn(decoder)?;
        Ok(Self {
            router: ResultRouter::new(config.product_prefix.clone()),
            config,
            state: SessionState::Idle,
            permission: CameraPermission::Unknown,
            scan_active: false,
            camera: None,
            worker: Some(worker),
            navigator,
            notifier,
            last_error: None,
            stats: ScanStats::default(),
        })
    }

    /// Current loop state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Camera permission as last resolved
    pub fn permission(&self) -> CameraPermission {
        self.permission
    }

    /// Whether another tick would be scheduled
    pub fn is_scan_active(&self) -> bool {
        self.scan_active
    }

    /// Counters so far
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Configuration the session was built with
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// The navigator
    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// The notifier
    pub fn notifier(&self) -> &T {
        &self.notifier
    }

    /// Request the camera and begin scanning
    ///
    /// A refusal is reported once and ends the live path; uploads stay usable.
    pub fn start(&mut self, provider: &mut dyn CameraProvider) -> SessionState {
        if self.state != SessionState::Idle {
            tracing::warn!(state = ?self.state, "scan session already started");
            return self.state;
        }

        self.state = SessionState::PermissionPending;
        match LiveCamera::acquire(provider, Facing::Environment) {
            Ok(camera) => {
                self.camera = Some(camera);
                self.permission = CameraPermission::Granted;
                self.state = SessionState::Active;
                self.scan_active = true;
                tracing::info!("camera permission granted, scanning");
            }
            Err(err) => {
                tracing::warn!(error = %err, "camera unavailable");
                self.permission = CameraPermission::Denied;
                self.scan_active = false;
                self.state = SessionState::Stopped(StopReason::CameraDenied);
                self.notifier.notify(camera_notice(&err));
            }
        }
        self.state
    }

    /// One decode tick: capture the latest frame and hand it to the worker
    ///
    /// Returns whether another tick should be scheduled.
    pub fn tick(&mut self) -> bool {
        if !self.should_tick() {
            return false;
        }
        let busy = match self.worker.as_ref() {
            Some(worker) => worker.is_busy(),
            None => return false,
        };
        self.stats.ticks += 1;
        if busy {
            self.stats.busy_ticks += 1;
            return true;
        }

        // The previous decode's outcome is queued before the worker goes idle;
        // apply it before capturing so a hit is never followed by another submit.
        self.pump();
        if !self.should_tick() {
            return false;
        }
        let (Some(camera), Some(worker)) = (self.camera.as_mut(), self.worker.as_ref()) else {
            return false;
        };

        match camera.capture() {
            Ok(Some(frame)) => {
                self.stats.frames_captured += 1;
                match worker.submit(frame) {
                    Submit::Accepted => self.stats.frames_submitted += 1,
                    Submit::Busy => self.stats.frames_dropped += 1,
                    Submit::Closed => {
                        tracing::error!("decode worker closed while scanning");
                        self.halt(StopReason::CameraLost);
                        return false;
                    }
                }
            }
            // not enough video data yet
            Ok(None) => {}
            Err(err) if err.is_terminal() => {
                tracing::warn!(error = %err, "camera stream lost");
                self.notifier.notify(camera_notice(&err));
                self.halt(StopReason::CameraLost);
                return false;
            }
            Err(err) => tracing::warn!(error = %err, "skipping unreadable frame"),
        }

        self.should_tick()
    }

    /// Route every outcome the worker has delivered so far
    pub fn pump(&mut self) {
        loop {
            let Some(response) = self.worker.as_ref().and_then(|w| w.try_recv()) else {
                break;
            };
            self.handle_outcome(response.into_outcome());
        }
    }

    /// Wait up to `timeout` for an in-flight decode, then route what arrived
    pub fn settle(&mut self, timeout: Duration) {
        let response = self.worker.as_ref().and_then(|w| w.recv_timeout(timeout));
        if let Some(response) = response {
            self.handle_outcome(response.into_outcome());
        }
        self.pump();
    }

    /// Apply one decode outcome
    ///
    /// Safe to call after teardown: late outcomes are ignored.
    pub fn handle_outcome(&mut self, outcome: DecodeOutcome) -> RouteDecision {
        self.apply_outcome(outcome, true)
    }

    /// `resume_on_retry` is false for uploads made while live scanning was off,
    /// so a rejected upload never restarts the camera loop.
    fn apply_outcome(&mut self, outcome: DecodeOutcome, resume_on_retry: bool) -> RouteDecision {
        if self.state == SessionState::Stopped(StopReason::Teardown) {
            tracing::debug!("ignoring decode outcome after teardown");
            return RouteDecision::Silent;
        }
        self.stats.outcomes += 1;

        if outcome.is_found() {
            // No further ticks while the result is being handled.
            self.pause();
            self.last_error = None;
        }

        let decision = self.router.route(&outcome);
        match &decision {
            RouteDecision::Navigate(target) => {
                tracing::info!(path = target.path(), "scanned product code");
                self.stats.navigations += 1;
                self.navigator.navigate(target.path());
            }
            RouteDecision::Retry(err) => {
                tracing::info!(error = %err, "scanned code rejected");
                self.notifier.notify(err.notice());
                if resume_on_retry {
                    self.resume();
                }
            }
            RouteDecision::Report(err) => {
                let message = err.to_string();
                if self.last_error.as_deref() != Some(message.as_str()) {
                    tracing::warn!(error = %err, "decode error");
                    self.notifier.notify(err.notice());
                    self.last_error = Some(message);
                }
            }
            RouteDecision::Silent => {}
        }
        decision
    }

    /// Decode an uploaded image through the same worker and routing
    ///
    /// Works whether or not the camera is available. Waits up to the configured
    /// still-image timeout; a silent worker means no code was found. If a live
    /// decode navigates while the upload waits for the worker, the upload is
    /// dropped and `Silent` is returned.
    pub fn scan_still(&mut self, frame: PixelFrame) -> Result<RouteDecision, ScanError> {
        if self.state == SessionState::Stopped(StopReason::Teardown) {
            return Err(ScanError::SessionStopped);
        }
        let timeout = self.config.still_timeout;
        let deadline = Instant::now() + timeout;

        // Let a live decode finish first; only one request may be in flight.
        let navigations = self.stats.navigations;
        let mut pending = Some(frame);
        while let Some(frame) = pending.take() {
            // An idle worker has already queued its last reply, so pumping after
            // the check sees any live outcome before the upload goes in.
            let busy = self.worker.as_ref().ok_or(ScanError::SessionStopped)?.is_busy();
            self.pump();
            if self.stats.navigations != navigations {
                tracing::info!("live scan navigated first, dropping uploaded image");
                return Ok(RouteDecision::Silent);
            }
            let worker = self.worker.as_ref().ok_or(ScanError::SessionStopped)?;
            if busy {
                if Instant::now() >= deadline {
                    self.notifier.notify(Notice::error(
                        "Scan Error",
                        "The scanner is busy. Please try again.",
                    ));
                    return Ok(RouteDecision::Silent);
                }
                pending = Some(frame);
                thread::sleep(Duration::from_millis(1));
                continue;
            }
            if worker.submit(frame) == Submit::Closed {
                return Err(ScanError::SessionStopped);
            }
        }

        let resume_on_retry = self.scan_active;
        let remaining = deadline.saturating_duration_since(Instant::now());
        let response = self.worker.as_ref().and_then(|w| w.recv_timeout(remaining));
        match response {
            Some(response) => Ok(self.apply_outcome(response.into_outcome(), resume_on_retry)),
            None => {
                tracing::info!("no QR code found in uploaded image");
                self.notifier.notify(Notice::info(
                    "No QR code found",
                    "No QR code could be found in the selected image.",
                ));
                Ok(RouteDecision::Silent)
            }
        }
    }

    /// Run ticks until scanning pauses or stops
    pub fn run(&mut self, ticker: &mut dyn Ticker) -> usize {
        self.run_until(ticker, None)
    }

    /// Run at most `max_ticks` ticks (all of them when `None`)
    ///
    /// Returns the number of ticks executed.
    pub fn run_until(&mut self, ticker: &mut dyn Ticker, max_ticks: Option<usize>) -> usize {
        let mut ticks = 0;
        while self.should_tick() && max_ticks.map_or(true, |max| ticks < max) {
            ticker.wait_next();
            self.tick();
            ticks += 1;
            self.pump();
        }
        ticks
    }

    /// Restart scanning after a pause
    ///
    /// Only possible while the camera is granted and open.
    pub fn resume(&mut self) -> bool {
        let camera_open = self.camera.as_ref().is_some_and(|c| c.is_open());
        if self.permission != CameraPermission::Granted || !camera_open {
            return false;
        }
        match self.state {
            SessionState::Active | SessionState::Paused => {
                self.state = SessionState::Active;
                self.scan_active = true;
                true
            }
            _ => false,
        }
    }

    /// Tear down: stop the camera, stop the worker, ignore anything late
    pub fn stop(&mut self) {
        if self.state == SessionState::Stopped(StopReason::Teardown) {
            return;
        }
        self.scan_active = false;
        if let Some(mut camera) = self.camera.take() {
            camera.close();
        }
        if let Some(mut worker) = self.worker.take() {
            worker.close();
        }
        self.state = SessionState::Stopped(StopReason::Teardown);
        tracing::info!(stats = ?self.stats, "scan session stopped");
    }

    fn should_tick(&self) -> bool {
        self.scan_active && self.state == SessionState::Active
    }

    fn pause(&mut self) {
        self.scan_active = false;
        if self.state == SessionState::Active {
            self.state = SessionState::Paused;
        }
    }

    /// End the live path but keep the worker for uploads
    fn halt(&mut self, reason: StopReason) {
        self.scan_active = false;
        if let Some(mut camera) = self.camera.take() {
            camera.close();
        }
        self.state = SessionState::Stopped(reason);
    }
}

impl<N: Navigator, T: Notifier> Drop for ScanSession<N, T> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn camera_notice(err: &SourceError) -> Notice {
    match err {
        SourceError::PermissionDenied => Notice::error(
            "Camera Access Denied",
            "Please enable camera permissions in your browser settings to use this feature.",
        ),
        SourceError::Unsupported => Notice::error(
            "Unsupported Browser",
            "Your browser does not support camera access.",
        ),
        _ => Notice::error(
            "Camera Unavailable",
            "No camera could be opened. You can still upload a QR code image.",
        ),
    }
}

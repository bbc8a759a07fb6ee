//! Scan loop controller
//!
//! A session owns the camera stream and the decode worker for the lifetime of
//! the scanning view. Ticks run on the caller's thread; decoding runs on the
//! worker. The loop stops by not scheduling another tick once scanning is no
//! longer active, so there is no cancellation message to send.

/// Session state machine
pub mod controller;
/// Tick sources
pub mod scheduler;

pub use controller::{CameraPermission, ScanSession, ScanStats, SessionState, StopReason};
pub use scheduler::{ImmediateTicker, IntervalTicker, Ticker};

//! RustQR Scan - live QR code scanning for product pages
//!
//! Camera frames are captured on the caller's thread, decoded on a dedicated
//! worker thread, and successful decodes are routed to a product path.
//!
//! ```text
//! LiveCamera  -> ScanSession (tick) -> DecodeWorker -> QrEngine
//!                      ^                                  |
//!                      +------ ResultRouter <-- outcome --+
//!                                   |
//!                        navigate(path) | notify(notice)
//! ```
//!
//! # Example
//! ```no_run
//! use rust_qr_scan::{RecordingNavigator, ScanConfig, ScanSession, TracingNotifier};
//! use rust_qr_scan::source::still::load_frame;
//!
//! let config = ScanConfig::from_env();
//! let nav = RecordingNavigator::new();
//! let mut session = ScanSession::new(config, nav.clone(), TracingNotifier).unwrap();
//! let frame = load_frame(std::path::Path::new("label.png"), 1600).unwrap();
//! session.scan_still(frame).unwrap();
//! println!("{:?}", nav.last());
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// External collaborators (navigation, notifications)
pub mod collab;
/// Session configuration from defaults and environment
pub mod config;
/// QR decoder engine
pub mod decoder;
/// Error types
pub mod error;
/// Tracing subscriber setup for binaries
pub mod logging;
/// Core data structures (PixelFrame, DecodeOutcome, NavigationTarget)
pub mod models;
/// Outcome validation and routing
pub mod router;
/// Scan loop controller and tick scheduling
pub mod session;
/// Camera and still-image frame sources
pub mod source;
/// Pixel helpers (luma conversion)
pub mod utils;
/// Decode worker thread and its message protocol
pub mod worker;

pub use collab::{
    Navigator, Notice, NoticeKind, Notifier, RecordingNavigator, RecordingNotifier,
    TracingNotifier,
};
pub use config::ScanConfig;
pub use decoder::engine::{DecodeOptions, InversionMode, QrEngine, SymbolDecoder, decode};
pub use error::{FrameError, Result, ScanError, SourceError};
pub use models::{DecodeOutcome, NavigationTarget, PixelFrame};
pub use router::{ResultRouter, RouteDecision, RouteError};
pub use session::{
    CameraPermission, ImmediateTicker, IntervalTicker, ScanSession, ScanStats, SessionState,
    StopReason, Ticker,
};
pub use worker::{DecodeWorker, Submit};

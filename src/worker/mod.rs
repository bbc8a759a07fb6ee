//! Decode worker boundary
//!
//! The decoder engine runs on its own thread so a slow decode never stalls
//! frame capture. Requests and responses cross the boundary as messages; see
//! [`protocol`] for the wire shapes.
//!
//! The response channel is at-most-one-outcome-or-timeout: a frame with no
//! symbol produces no message at all. Callers that need to know a decode has
//! finished check [`DecodeWorker::is_busy`] or wait with
//! [`DecodeWorker::recv_timeout`].

/// Worker thread handle
pub mod boundary;
/// Wire messages
pub mod protocol;

pub use boundary::{DecodeWorker, Submit};
pub use protocol::{ImageData, WorkerRequest, WorkerResponse};

//! QR symbol decoding
//!
//! The symbol locator and bit-level decoding are delegated to `rqrr`; this
//! module owns the frame preparation around it (luma conversion, inversion
//! passes) and turns every result into a [`DecodeOutcome`](crate::DecodeOutcome).

/// Decoder engine: frame in, outcome out
pub mod engine;

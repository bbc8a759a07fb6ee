//! Pixel helpers shared by the decoder engine
//!
//! - Luminance conversion (RGBA to one byte per pixel)
//! - Luminance inversion for light-on-dark symbols

/// RGBA to luma conversion
pub mod grayscale;

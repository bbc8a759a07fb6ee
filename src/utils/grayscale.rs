//! RGBA to luminance conversion
//! Y = 0.299*R + 0.587*G + 0.114*B
//! Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
//!
//! Alpha is ignored: camera frames are always opaque and uploaded images are
//! flattened before they get here.

use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline(always)]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Convert RGBA image to grayscale
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    rgba_to_grayscale_with_buffer(rgba, width, height, &mut gray);
    gray
}

/// Convert RGBA to grayscale into a pre-allocated buffer (no allocation)
///
/// # Returns
/// Number of pixels written (width * height)
pub fn rgba_to_grayscale_with_buffer(
    rgba: &[u8],
    width: usize,
    height: usize,
    output: &mut [u8],
) -> usize {
    let pixel_count = width * height;
    assert!(output.len() >= pixel_count, "Output buffer too small");
    assert!(rgba.len() >= pixel_count * 4, "Input buffer too small");

    // 8 pixels per iteration, remainder handled below
    let mut out_chunks = output[..pixel_count].chunks_exact_mut(8);
    let mut in_chunks = rgba[..pixel_count * 4].chunks_exact(32);
    for (out, px) in (&mut out_chunks).zip(&mut in_chunks) {
        for i in 0..8 {
            let idx = i * 4;
            out[i] = luma(px[idx], px[idx + 1], px[idx + 2]);
        }
    }
    for (out, px) in out_chunks
        .into_remainder()
        .iter_mut()
        .zip(in_chunks.remainder().chunks_exact(4))
    {
        *out = luma(px[0], px[1], px[2]);
    }

    pixel_count
}

// ============== Parallel Processing with Rayon ==============

/// Convert RGBA to grayscale using parallel processing
/// Processes rows in parallel for multi-core speedup
pub fn rgba_to_grayscale_parallel(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    rgba_to_grayscale_parallel_with_buffer(rgba, width, height, &mut gray);
    gray
}

/// Row-parallel variant of [`rgba_to_grayscale_with_buffer`]
pub fn rgba_to_grayscale_parallel_with_buffer(
    rgba: &[u8],
    width: usize,
    height: usize,
    output: &mut [u8],
) -> usize {
    let pixel_count = width * height;
    assert!(output.len() >= pixel_count, "Output buffer too small");
    assert!(rgba.len() >= pixel_count * 4, "Input buffer too small");

    output[..pixel_count]
        .par_chunks_mut(width)
        .zip(rgba[..pixel_count * 4].par_chunks(width * 4))
        .for_each(|(row, src)| {
            for (out, px) in row.iter_mut().zip(src.chunks_exact(4)) {
                *out = luma(px[0], px[1], px[2]);
            }
        });

    pixel_count
}

/// Invert luminance in place (dark modules become light)
pub fn invert_in_place(gray: &mut [u8]) {
    for v in gray.iter_mut() {
        *v = 255 - *v;
    }
}

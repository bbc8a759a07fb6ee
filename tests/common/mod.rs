//! Synthetic frames for integration tests

#![allow(dead_code)]

use image::{DynamicImage, GrayImage, ImageOutputFormat};
use qrcode::{Color, QrCode};
use rust_qr_scan::PixelFrame;
use std::io::Cursor;

/// Quiet zone around the symbol, in modules
const QUIET_ZONE: usize = 4;

/// Luma pixels of `payload` rendered as a centered QR symbol in a `size`x`size` image
pub fn render_qr_luma(payload: &str, size: usize) -> Vec<u8> {
    let code = QrCode::new(payload.as_bytes()).expect("payload fits in a QR code");
    let modules = code.width();
    let colors = code.to_colors();
    let total = modules + 2 * QUIET_ZONE;
    let scale = size / total;
    assert!(scale >= 1, "{}px is too small for {} modules", size, total);
    let offset = (size - total * scale) / 2;

    let mut luma = vec![255u8; size * size];
    for my in 0..modules {
        for mx in 0..modules {
            if colors[my * modules + mx] != Color::Dark {
                continue;
            }
            let x0 = offset + (QUIET_ZONE + mx) * scale;
            let y0 = offset + (QUIET_ZONE + my) * scale;
            for y in y0..y0 + scale {
                for x in x0..x0 + scale {
                    luma[y * size + x] = 0;
                }
            }
        }
    }
    luma
}

/// RGBA frame holding `payload` as a dark-on-light QR symbol
pub fn qr_frame(payload: &str, size: usize) -> PixelFrame {
    PixelFrame::from_luma(size, size, &render_qr_luma(payload, size)).unwrap()
}

/// Same symbol, light-on-dark
pub fn inverted_qr_frame(payload: &str, size: usize) -> PixelFrame {
    let luma: Vec<u8> = render_qr_luma(payload, size)
        .into_iter()
        .map(|v| 255 - v)
        .collect();
    PixelFrame::from_luma(size, size, &luma).unwrap()
}

/// Plain white frame with no symbol
pub fn blank_frame(size: usize) -> PixelFrame {
    PixelFrame::filled(size, size, [255, 255, 255, 255]).unwrap()
}

/// PNG file bytes for `payload`, as a user upload would provide
pub fn qr_png(payload: &str, size: usize) -> Vec<u8> {
    let luma = render_qr_luma(payload, size);
    let img = GrayImage::from_raw(size as u32, size as u32, luma).unwrap();
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img)
        .write_to(&mut out, ImageOutputFormat::Png)
        .unwrap();
    out.into_inner()
}

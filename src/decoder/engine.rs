use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use crate::config::DEFAULT_PARALLEL_MIN_PIXELS;
use crate::models::{DecodeOutcome, PixelFrame};
use crate::utils::grayscale::{
    invert_in_place, rgba_to_grayscale_parallel_with_buffer, rgba_to_grayscale_with_buffer,
};

/// Smallest side that can hold a version 1 symbol (21 modules) at one pixel each
const MIN_SYMBOL_SIDE: usize = 21;

/// Which luminance polarities the engine tries
///
/// Light-on-dark symbols are only found when an inverted pass runs. The default
/// skips it: live frames are retried every tick, so a fast miss costs less than
/// a slow hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InversionMode {
    /// Normal polarity only
    #[default]
    DontInvert,
    /// Inverted polarity only
    OnlyInvert,
    /// Normal first, then inverted
    AttemptBoth,
    /// Inverted first, then normal
    InvertFirst,
}

impl InversionMode {
    /// Inversion flag for each pass, in order
    fn passes(self) -> &'static [bool] {
        match self {
            InversionMode::DontInvert => &[false],
            InversionMode::OnlyInvert => &[true],
            InversionMode::AttemptBoth => &[false, true],
            InversionMode::InvertFirst => &[true, false],
        }
    }
}

impl FromStr for InversionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "dontinvert" | "none" => Ok(InversionMode::DontInvert),
            "onlyinvert" => Ok(InversionMode::OnlyInvert),
            "attemptboth" | "both" => Ok(InversionMode::AttemptBoth),
            "invertfirst" => Ok(InversionMode::InvertFirst),
            _ => Err(format!("unknown inversion mode '{}'", s)),
        }
    }
}

/// Engine options
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOptions {
    /// Which luma polarities to try
    pub inversion: InversionMode,
    /// Frames with at least this many pixels use row-parallel luma conversion
    pub parallel_min_pixels: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            inversion: InversionMode::default(),
            parallel_min_pixels: DEFAULT_PARALLEL_MIN_PIXELS,
        }
    }
}

/// Anything that can turn a frame into a [`DecodeOutcome`]
///
/// Implementations must not panic across this call for ordinary input, and must
/// return the same outcome for the same frame. The worker boundary still
/// guards against panics.
pub trait SymbolDecoder: Send {
    /// Decode one frame
    fn decode(&mut self, frame: &PixelFrame) -> DecodeOutcome;
}

/// QR decoder backed by `rqrr`, with a reusable luma buffer
pub struct QrEngine {
    options: DecodeOptions,
    luma: Vec<u8>,
}

impl QrEngine {
    /// Engine with `options`; the luma buffer grows on first use
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            options,
            luma: Vec::new(),
        }
    }

    /// Options this engine was built with
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    fn prepare_luma(&mut self, frame: &PixelFrame) -> usize {
        let count = frame.pixel_count();
        if self.luma.len() < count {
            self.luma.resize(count, 0);
        }
        let out = &mut self.luma[..count];
        if count >= self.options.parallel_min_pixels {
            rgba_to_grayscale_parallel_with_buffer(frame.pixels(), frame.width(), frame.height(), out)
        } else {
            rgba_to_grayscale_with_buffer(frame.pixels(), frame.width(), frame.height(), out)
        }
    }
}

impl Default for QrEngine {
    fn default() -> Self {
        Self::new(DecodeOptions::default())
    }
}

impl SymbolDecoder for QrEngine {
    fn decode(&mut self, frame: &PixelFrame) -> DecodeOutcome {
        let (width, height) = (frame.width(), frame.height());
        if width < MIN_SYMBOL_SIDE || height < MIN_SYMBOL_SIDE {
            return DecodeOutcome::NotFound;
        }

        let count = self.prepare_luma(frame);
        let luma = &mut self.luma[..count];
        let mut inverted = false;

        for &invert in self.options.inversion.passes() {
            if invert != inverted {
                invert_in_place(luma);
                inverted = invert;
            }
            let view: &[u8] = luma;
            let scanned = panic::catch_unwind(AssertUnwindSafe(|| scan_luma(view, width, height)));
            match scanned {
                Ok(Some(text)) => return DecodeOutcome::Found { text },
                Ok(None) => {}
                Err(payload) => return DecodeOutcome::error(panic_message(payload.as_ref())),
            }
        }

        DecodeOutcome::NotFound
    }
}

/// Decode a single frame with a throwaway engine
pub fn decode(frame: &PixelFrame, options: &DecodeOptions) -> DecodeOutcome {
    QrEngine::new(options.clone()).decode(frame)
}

/// First decodable, non-empty symbol in a luma image
fn scan_luma(luma: &[u8], width: usize, height: usize) -> Option<String> {
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| luma[y * width + x]);
    for grid in prepared.detect_grids() {
        match grid.decode() {
            Ok((_meta, content)) if !content.is_empty() => return Some(content),
            Ok(_) => tracing::trace!("symbol decoded to empty payload"),
            // A located but unreadable grid is an ordinary per-frame miss.
            Err(err) => tracing::trace!(%err, "grid located but not decodable"),
        }
    }
    None
}

/// Best-effort text for a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("decoder panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("decoder panicked: {}", s)
    } else {
        "decoder panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_frame_not_found() {
        let frame = PixelFrame::filled(100, 100, [255, 255, 255, 255]).unwrap();
        assert_eq!(
            decode(&frame, &DecodeOptions::default()),
            DecodeOutcome::NotFound
        );
    }

    #[test]
    fn test_tiny_frame_not_found() {
        let frame = PixelFrame::filled(10, 10, [0, 0, 0, 255]).unwrap();
        let mut engine = QrEngine::default();
        assert_eq!(engine.decode(&frame), DecodeOutcome::NotFound);
    }

    #[test]
    fn test_noise_is_stable() {
        // Same frame twice, same answer, reusing one engine buffer
        let luma: Vec<u8> = (0..64 * 48).map(|i| ((i * 7919) % 251) as u8).collect();
        let frame = PixelFrame::from_luma(64, 48, &luma).unwrap();
        let mut engine = QrEngine::new(DecodeOptions {
            inversion: InversionMode::AttemptBoth,
            parallel_min_pixels: 1,
        });
        let first = engine.decode(&frame);
        let second = engine.decode(&frame);
        assert_eq!(first, second);
        assert_eq!(first, DecodeOutcome::NotFound);
    }

    #[test]
    fn test_inversion_mode_parse() {
        assert_eq!("dontInvert".parse::<InversionMode>(), Ok(InversionMode::DontInvert));
        assert_eq!("only-invert".parse::<InversionMode>(), Ok(InversionMode::OnlyInvert));
        assert_eq!("attempt_both".parse::<InversionMode>(), Ok(InversionMode::AttemptBoth));
        assert_eq!("INVERTFIRST".parse::<InversionMode>(), Ok(InversionMode::InvertFirst));
        assert!("upside-down".parse::<InversionMode>().is_err());
    }

    #[test]
    fn test_inversion_passes() {
        assert_eq!(InversionMode::DontInvert.passes(), &[false]);
        assert_eq!(InversionMode::InvertFirst.passes(), &[true, false]);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "decoder panicked: boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "decoder panicked");
    }
}

use serde::{Deserialize, Serialize};

use crate::error::FrameError;
use crate::models::{DecodeOutcome, PixelFrame};

/// Frame payload as it travels to the worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Frame width in pixels
    pub width: usize,
    /// Frame height in pixels
    pub height: usize,
    /// RGBA bytes
    pub data: Vec<u8>,
}

impl ImageData {
    /// Re-validate the payload on the worker side
    pub fn into_frame(self) -> Result<PixelFrame, FrameError> {
        PixelFrame::new(self.width, self.height, self.data)
    }
}

impl From<PixelFrame> for ImageData {
    fn from(frame: PixelFrame) -> Self {
        let (width, height, data) = frame.into_parts();
        Self {
            width,
            height,
            data,
        }
    }
}

/// Messages into the worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerRequest {
    /// Decode one frame
    DecodeImage {
        /// The frame
        #[serde(rename = "imageData")]
        image_data: ImageData,
    },
}

impl WorkerRequest {
    /// `DECODE_IMAGE` request for `frame`
    pub fn decode_image(frame: PixelFrame) -> Self {
        WorkerRequest::DecodeImage {
            image_data: frame.into(),
        }
    }
}

/// Messages out of the worker. There is deliberately no "not found" message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerResponse {
    /// A symbol was decoded
    DecodeResult {
        /// Payload text
        data: String,
    },
    /// The engine failed
    DecodeError {
        /// Failure description
        error: String,
    },
}

impl WorkerResponse {
    /// Wire message for an outcome; `None` for `NotFound`
    pub fn from_outcome(outcome: DecodeOutcome) -> Option<Self> {
        match outcome {
            DecodeOutcome::Found { text } => Some(WorkerResponse::DecodeResult { data: text }),
            DecodeOutcome::NotFound => None,
            DecodeOutcome::Error { message } => Some(WorkerResponse::DecodeError { error: message }),
        }
    }

    /// Outcome this message reports
    pub fn into_outcome(self) -> DecodeOutcome {
        match self {
            WorkerResponse::DecodeResult { data } => DecodeOutcome::Found { text: data },
            WorkerResponse::DecodeError { error } => DecodeOutcome::Error { message: error },
        }
    }
}

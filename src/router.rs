//! Turns decode outcomes into a navigation or a notice.
//!
//! The router only decides; the session applies the decision (navigates,
//! notifies, pauses or resumes scanning).

use thiserror::Error;
use url::Url;

use crate::collab::Notice;
use crate::config::DEFAULT_PRODUCT_PREFIX;
use crate::models::{DecodeOutcome, NavigationTarget};

/// Error text fragments that mean "no symbol in this frame"
const NOT_FOUND_MARKERS: &[&str] = &["not found", "notfound", "no qr", "no symbol"];

/// Why a decode did not lead anywhere
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Payload is not an absolute URL
    #[error("scanned text is not a URL: {text:?}")]
    InvalidUrl {
        /// The scanned text
        text: String,
    },

    /// URL parsed but points outside the product pages
    #[error("scanned URL path {path:?} is not a product page")]
    InvalidTarget {
        /// Path of the scanned URL
        path: String,
    },

    /// Engine reported a failure
    #[error("decode failed: {message}")]
    Decode {
        /// Engine error text
        message: String,
    },
}

impl RouteError {
    /// User-facing notice for this error
    pub fn notice(&self) -> Notice {
        match self {
            RouteError::InvalidUrl { .. } => {
                Notice::error("Invalid URL", "The scanned QR code contains an invalid URL.")
            }
            RouteError::InvalidTarget { .. } => Notice::error(
                "Invalid QR Code",
                "This QR code does not lead to a valid product page.",
            ),
            RouteError::Decode { .. } => {
                Notice::error("Scan Error", "Could not scan the QR code. Please try again.")
            }
        }
    }
}

/// What to do with one outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Stop scanning and go to the target
    Navigate(NavigationTarget),
    /// Tell the user and keep scanning; another code may be in view next tick
    Retry(RouteError),
    /// Tell the user once; scanning is unaffected
    Report(RouteError),
    /// Nothing to show
    Silent,
}

/// Validates scanned payloads against the product path prefix
#[derive(Debug, Clone)]
pub struct ResultRouter {
    prefix: String,
}

impl ResultRouter {
    /// Router accepting paths under `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Required path prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Decide what one outcome leads to
    pub fn route(&self, outcome: &DecodeOutcome) -> RouteDecision {
        match outcome {
            DecodeOutcome::Found { text } => match self.target_for(text) {
                Ok(target) => RouteDecision::Navigate(target),
                Err(err) => RouteDecision::Retry(err),
            },
            DecodeOutcome::Error { message } if is_not_found_message(message) => {
                RouteDecision::Silent
            }
            DecodeOutcome::Error { message } => RouteDecision::Report(RouteError::Decode {
                message: message.clone(),
            }),
            DecodeOutcome::NotFound => RouteDecision::Silent,
        }
    }

    /// Parse `text` as an absolute URL and check its path
    pub fn target_for(&self, text: &str) -> Result<NavigationTarget, RouteError> {
        let url = Url::parse(text).map_err(|_| RouteError::InvalidUrl {
            text: text.to_string(),
        })?;
        let path = url.path();
        NavigationTarget::new(path, &self.prefix).ok_or_else(|| RouteError::InvalidTarget {
            path: path.to_string(),
        })
    }
}

impl Default for ResultRouter {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCT_PREFIX)
    }
}

/// Whether an engine error really just means "nothing in this frame"
pub fn is_not_found_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    NOT_FOUND_MARKERS.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_url_navigates() {
        let router = ResultRouter::default();
        let decision = router.route(&DecodeOutcome::found("https://app.example.com/products/F101"));
        match decision {
            RouteDecision::Navigate(target) => assert_eq!(target.path(), "/products/F101"),
            other => panic!("expected navigation, got {:?}", other),
        }
    }

    #[test]
    fn test_query_and_fragment_dropped() {
        let router = ResultRouter::default();
        let target = router
            .target_for("https://shop.example.com/products/A101?ref=qr#top")
            .unwrap();
        assert_eq!(target.path(), "/products/A101");
        assert_eq!(target.article_no(), Some("A101"));
    }

    #[test]
    fn test_other_path_is_invalid_target() {
        let router = ResultRouter::default();
        assert_eq!(
            router.route(&DecodeOutcome::found("https://app.example.com/about")),
            RouteDecision::Retry(RouteError::InvalidTarget {
                path: "/about".into()
            })
        );
    }

    #[test]
    fn test_plain_text_is_invalid_url() {
        let router = ResultRouter::default();
        assert_eq!(
            router.route(&DecodeOutcome::found("hello world")),
            RouteDecision::Retry(RouteError::InvalidUrl {
                text: "hello world".into()
            })
        );
        // relative paths need a base, so they are not URLs either
        assert!(matches!(
            router.route(&DecodeOutcome::found("/products/F101")),
            RouteDecision::Retry(RouteError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_custom_prefix() {
        let router = ResultRouter::new("/fabrics/");
        assert!(matches!(
            router.route(&DecodeOutcome::found("https://x.test/fabrics/F1")),
            RouteDecision::Navigate(_)
        ));
        assert!(matches!(
            router.route(&DecodeOutcome::found("https://x.test/products/F1")),
            RouteDecision::Retry(RouteError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_not_found_errors_suppressed() {
        let router = ResultRouter::default();
        assert_eq!(
            router.route(&DecodeOutcome::error("NotFoundException: No MultiFormat Readers")),
            RouteDecision::Silent
        );
        assert_eq!(
            router.route(&DecodeOutcome::error("No QR code in frame")),
            RouteDecision::Silent
        );
        assert_eq!(router.route(&DecodeOutcome::NotFound), RouteDecision::Silent);
    }

    #[test]
    fn test_real_errors_reported() {
        let router = ResultRouter::default();
        let decision = router.route(&DecodeOutcome::error("decoder panicked: index out of bounds"));
        match decision {
            RouteDecision::Report(err) => assert_eq!(err.notice().title, "Scan Error"),
            other => panic!("expected report, got {:?}", other),
        }
    }

    #[test]
    fn test_notice_texts() {
        let invalid = RouteError::InvalidTarget { path: "/".into() }.notice();
        assert_eq!(invalid.title, "Invalid QR Code");
        let bad_url = RouteError::InvalidUrl { text: "x".into() }.notice();
        assert_eq!(bad_url.message, "The scanned QR code contains an invalid URL.");
    }
}

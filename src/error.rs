//! Error type shared by the fallible entry points.
//!
//! Detection stages degrade instead of failing, so only configuration,
//! file loading and per-card processing produce these.

/// Errors surfaced by configuration, loading and card processing
#[derive(thiserror::Error, Debug)]
pub enum OmrError {
    /// The image could not be decoded or opened
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    /// Filesystem failure while reading or writing
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Malformed JSON configuration or report
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// An answer-key pattern failed to compile
    #[error("invalid answer pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// A configuration value is out of range
    #[error("invalid configuration: {field}: {reason}")]
    InvalidConfig {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
    /// Grading was requested with no questions in the key
    #[error("No answer key provided")]
    EmptyAnswerKey,
    /// One card could not be processed
    #[error("card {index}: {reason} ({hint})")]
    CardProcessing {
        /// Position of the card in grid order
        index: usize,
        /// What went wrong
        reason: String,
        /// What to change before retrying
        hint: &'static str,
    },
}

impl OmrError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        OmrError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_actionable() {
        let err = OmrError::CardProcessing {
            index: 2,
            reason: "empty image".into(),
            hint: "rescan the card",
        };
        assert_eq!(err.to_string(), "card 2: empty image (rescan the card)");

        let err = OmrError::invalid("marking_threshold", "must be within [0, 1]");
        assert!(err.to_string().contains("marking_threshold"));
    }
}

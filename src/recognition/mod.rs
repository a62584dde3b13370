pub mod client;

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::ink::Ink;

pub use client::HttpRecognizer;

pub const TARGET_LANGUAGE: &str = "ko";
pub const PRE_SPACE_OPTION: &str = "enable_pre_space";
const SUCCESS_STATUS: &str = "SUCCESS";

#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error("refusing to send a recognition request without any ink")]
    EmptyInk,
    #[error("invalid recognizer endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WritingGuide {
    pub writing_area_width: u32,
    pub writing_area_height: u32,
}

/// `[xs, ys, timestamps]`. Timestamps are not captured, so the last entry is always empty.
pub type WireStroke = [Vec<f64>; 3];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InkRequest {
    pub writing_guide: WritingGuide,
    pub ink: Vec<WireStroke>,
    pub language: String,
}

/// Body of a handwriting recognition call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionRequest {
    pub options: String,
    pub requests: Vec<InkRequest>,
}

impl RecognitionRequest {
    pub fn new(ink: &Ink, width: u32, height: u32) -> Result<Self, RecognitionError> {
        if ink.is_empty() {
            return Err(RecognitionError::EmptyInk);
        }
        let strokes = ink
            .strokes()
            .iter()
            .map(|stroke| [stroke.xs(), stroke.ys(), Vec::new()])
            .collect();

        Ok(Self {
            options: PRE_SPACE_OPTION.to_string(),
            requests: vec![InkRequest {
                writing_guide: WritingGuide {
                    writing_area_width: width,
                    writing_area_height: height,
                },
                ink: strokes,
                language: TARGET_LANGUAGE.to_string(),
            }],
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// The service answered with a status other than success.
    Rejected { status: String },
    /// The service answered, but not in the expected shape.
    Malformed(String),
    /// The request never got a usable answer.
    Transport(String),
}

impl FailureReason {
    pub fn is_rejection(&self) -> bool {
        matches!(self, FailureReason::Rejected { .. })
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Rejected { status } => write!(f, "service rejected the request ({})", status),
            FailureReason::Malformed(detail) => write!(f, "malformed response: {}", detail),
            FailureReason::Transport(detail) => write!(f, "transport error: {}", detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionOutcome {
    Recognized(String),
    Failed(FailureReason),
}

/// Anything that can turn a request into a best guess.
#[async_trait::async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, request: RecognitionRequest) -> RecognitionOutcome;
}

/// Reads `["SUCCESS", [[display, [candidate, ...]], ...], ...]`.
///
/// Every level is checked before it is indexed into.
pub fn interpret_response(body: &Value) -> RecognitionOutcome {
    let malformed = |detail: &str| RecognitionOutcome::Failed(FailureReason::Malformed(detail.to_string()));

    let Some(parts) = body.as_array() else {
        return malformed("top level is not an array");
    };
    let Some(status) = parts.first().and_then(Value::as_str) else {
        return malformed("missing status string");
    };
    if status != SUCCESS_STATUS {
        return RecognitionOutcome::Failed(FailureReason::Rejected {
            status: status.to_string(),
        });
    }

    let candidate = parts
        .get(1)
        .and_then(Value::as_array)
        .and_then(|groups| groups.first())
        .and_then(Value::as_array)
        .and_then(|group| group.get(1))
        .and_then(Value::as_array)
        .and_then(|transcriptions| transcriptions.first())
        .and_then(Value::as_str);

    match candidate {
        Some(candidate) => RecognitionOutcome::Recognized(candidate.to_string()),
        None => malformed("no candidate in first group"),
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::MiddleAiError;

/// Kind of rating an end user gave.
///
/// On the wire the collector expects the ordinal (`emoji = 0`, `thumbs = 1`,
/// `scale = 2`), not the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackType {
    Emoji = 0,
    Thumbs = 1,
    Scale = 2,
}

impl FeedbackType {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackType::Emoji => "emoji",
            FeedbackType::Thumbs => "thumbs",
            FeedbackType::Scale => "scale",
        }
    }
}

impl Serialize for FeedbackType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackType {
    type Err = MiddleAiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emoji" => Ok(FeedbackType::Emoji),
            "thumbs" => Ok(FeedbackType::Thumbs),
            "scale" => Ok(FeedbackType::Scale),
            other => Err(MiddleAiError::Serialization(format!(
                "unknown feedback type {other:?} (expected emoji, thumbs or scale)"
            ))),
        }
    }
}

/// Body of `POST {endpoint}/feedback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRecord<'a> {
    pub application_ref: &'a str,
    pub thread_id: &'a str,
    pub enduser_id: &'a str,
    pub feedback_type: FeedbackType,
    pub feedback_value: &'a str,
}

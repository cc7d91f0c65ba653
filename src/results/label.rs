//! Sentiment class labels shared across the results engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A correction or prediction value outside the 3-class range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("label must be 0, 1 or 2, got {0}")]
pub struct InvalidLabelError(pub i64);

/// Three-class sentiment label used throughout the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Label {
    Negative,
    Neutral,
    Positive,
}

impl Label {
    /// All labels in class-index order.
    pub const ALL: [Label; 3] = [Label::Negative, Label::Neutral, Label::Positive];

    /// Number of sentiment classes.
    pub const COUNT: usize = 3;

    /// Zero-based class index, matching the wire encoding.
    pub fn as_index(self) -> usize {
        match self {
            Label::Negative => 0,
            Label::Neutral => 1,
            Label::Positive => 2,
        }
    }

    /// Human-readable class name for logs and exports.
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Negative => "negative",
            Label::Neutral => "neutral",
            Label::Positive => "positive",
        }
    }
}

impl TryFrom<i64> for Label {
    type Error = InvalidLabelError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::Negative),
            1 => Ok(Label::Neutral),
            2 => Ok(Label::Positive),
            other => Err(InvalidLabelError(other)),
        }
    }
}

impl From<Label> for i64 {
    fn from(label: Label) -> Self {
        label.as_index() as i64
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_index() {
        for label in Label::ALL {
            assert_eq!(Label::try_from(label.as_index() as i64), Ok(label));
        }
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(Label::try_from(3), Err(InvalidLabelError(3)));
        assert_eq!(Label::try_from(-1), Err(InvalidLabelError(-1)));
    }

    #[test]
    fn serde_uses_integer_encoding() {
        let json = serde_json::to_string(&Label::Positive).unwrap();
        assert_eq!(json, "2");
        let back: Label = serde_json::from_str("1").unwrap();
        assert_eq!(back, Label::Neutral);
    }
}

use serde::{Deserialize, Serialize};

/// Responses longer than this (in characters) trigger auto-summarization
pub const DEFAULT_SUMMARIZE_THRESHOLD: usize = 100;

/// Query sent to the agent when a turn produced enough material to summarize
pub const SUMMARY_REQUEST: &str =
    "Based on what you just learned, provide a short 1-2 sentence summary of the key information.";

/// The single compressed long-term memory of a session.
///
/// Updates replace the value wholesale; the previous summary is discarded.
/// Content is opaque model text and is stored without validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingSummary {
    text: String,
}

impl RollingSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored summary. An empty string clears it.
    pub fn update(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn read(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// What happened to the summary at the end of a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// The primary response was at or under the threshold
    NotNeeded,
    /// The secondary call produced a usable summary, which replaced the old one
    Updated(String),
    /// The secondary call failed or returned nothing usable; summary untouched
    Unchanged,
}

/// Whether a primary response is long enough to be worth summarizing
pub fn should_summarize(response: &str, threshold: usize) -> bool {
    response.chars().count() > threshold
}

/// Extract a usable summary from a secondary call's response.
/// A missing or blank response is treated the same as a failed call.
pub fn usable_summary(response: Option<&str>) -> Option<&str> {
    response.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_overwrites() {
        let mut summary = RollingSummary::new();
        summary.update("A");
        summary.update("B");

        assert_eq!(summary.read(), "B");
    }

    #[test]
    fn test_update_with_empty_clears() {
        let mut summary = RollingSummary::new();
        summary.update("Paris is the capital of France.");
        assert!(!summary.is_empty());

        summary.update("");

        assert!(summary.is_empty());
        assert_eq!(summary.read(), "");
    }

    #[test]
    fn test_control_characters_are_kept() {
        let mut summary = RollingSummary::new();
        summary.update("line one\n\tline two\u{7}");

        assert_eq!(summary.read(), "line one\n\tline two\u{7}");
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let exactly = "x".repeat(100);
        let longer = "x".repeat(101);

        assert!(!should_summarize(&exactly, DEFAULT_SUMMARIZE_THRESHOLD));
        assert!(should_summarize(&longer, DEFAULT_SUMMARIZE_THRESHOLD));
    }

    #[test]
    fn test_threshold_counts_characters() {
        // 60 two-byte characters: 120 bytes but only 60 chars
        let text = "é".repeat(60);

        assert!(!should_summarize(&text, DEFAULT_SUMMARIZE_THRESHOLD));
    }

    #[test]
    fn test_usable_summary() {
        assert_eq!(usable_summary(Some("  Tokyo is big. ")), Some("  Tokyo is big. "));
        assert_eq!(usable_summary(Some("   ")), None);
        assert_eq!(usable_summary(None), None);
    }
}

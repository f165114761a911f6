use super::{BoundedInteractionLog, RollingSummary};

const SUMMARY_HEADER: &str = "SUMMARY OF PREVIOUS STEPS:\n";
const STEPS_HEADER: &str = "RECENT STEPS:\n";

/// Context assembler combines the rolling summary and the recent steps
/// into one text block for prompt injection.
///
/// The summary always comes first, followed by the steps oldest first, so a
/// reader sees the compressed history before the raw detail.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    /// Render the memory context. Pure: the same inputs give the same output.
    pub fn render(summary: &RollingSummary, log: &BoundedInteractionLog) -> String {
        let mut context_parts = Vec::with_capacity(log.len() + 2);

        // 1. Summary section, printed even when empty
        context_parts.push(format!("{}{}\n\n", SUMMARY_HEADER, summary.read()));

        // 2. Recent steps, each block followed by a blank line
        context_parts.push(STEPS_HEADER.to_string());
        for record in log.records() {
            context_parts.push(format!("{}\n", record.to_block()));
        }

        context_parts.join("")
    }
}

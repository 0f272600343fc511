//! Prompt builders for the two narrator use cases.

use agrivision_core::detection::ClassCounts;

/// Prompt for the harvest-analysis summary of one detection run.
pub fn harvest_summary(counts: &ClassCounts, total: u32) -> String {
    let breakdown = if counts.is_empty() {
        "no fruit detected".to_string()
    } else {
        counts
            .0
            .iter()
            .map(|(label, n)| format!("{label}: {n}"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "You are the analysis assistant of a jackfruit orchard monitoring \
         system built on YOLOv8 object detection. A detection run just \
         finished with these per-class counts: {breakdown} (total: {total}).\n\
         Write a short, professional analysis for the grower covering: \
         1) an overview of what was detected and the ripeness ratio, \
         2) whether harvesting is advisable now and why, \
         3) practical treatment steps if diseased fruit was found.\n\
         Keep it to a few paragraphs of plain prose."
    )
}

/// Prompt for one chat-assistant turn, prefixed with the assistant context.
pub fn chat_turn(user_message: &str) -> String {
    format!(
        "You are the assistant of a jackfruit orchard monitoring system. You \
         speak like a friendly, plain-spoken agricultural engineer.\n\
         Notes:\n\
         - You do not analyze images yourself; detection is handled by a \
         YOLOv8 model. If asked about a photo, explain how to read the \
         detection results instead of guessing from the image.\n\
         - Focus on practical advice: judging ripeness by eye, harvest \
         timing, fertilization, and pest and disease control.\n\n\
         The user asks: {user_message}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompt_includes_every_class_count() {
        let mut counts = ClassCounts::new();
        counts.record("ripe");
        counts.record("ripe");
        counts.record("diseased");

        let prompt = harvest_summary(&counts, counts.total());
        assert!(prompt.contains("ripe: 2"));
        assert!(prompt.contains("diseased: 1"));
        assert!(prompt.contains("total: 3"));
    }

    #[test]
    fn summary_prompt_handles_an_empty_run() {
        let counts = ClassCounts::new();
        let prompt = harvest_summary(&counts, 0);
        assert!(prompt.contains("no fruit detected"));
    }

    #[test]
    fn chat_prompt_carries_the_user_message() {
        let prompt = chat_turn("when should I harvest?");
        assert!(prompt.ends_with("when should I harvest?"));
    }
}

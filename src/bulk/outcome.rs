use crate::bulk::notify::Severity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Success,
    Failure(String),
    Skipped,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ItemOutcome::Failure(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: bool,
}

impl Summary {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn severity(&self) -> Severity {
        if self.failed > 0 && self.succeeded == 0 {
            Severity::Error
        } else if self.failed > 0 || self.cancelled {
            Severity::Warning
        } else {
            Severity::Info
        }
    }

    /// User-facing description of the result, e.g.
    /// "Deleted 2 of 3 affiliates. 1 failed, select the row and press r to retry."
    pub fn describe(&self, done: &str, noun: &str) -> String {
        let mut message = format!("{} {} of {} {}.", done, self.succeeded, self.attempted(), noun);
        if self.failed > 0 {
            message.push_str(&format!(
                " {} failed, select the row and press r to retry.",
                self.failed
            ));
        }
        if self.skipped > 0 {
            message.push_str(&format!(" {} skipped.", self.skipped));
        }
        if self.cancelled {
            message.push_str(" Cancelled before finishing.");
        }
        message
    }
}

/// Tallies per-item outcomes into a [`Summary`].
#[derive(Debug, Default)]
pub struct OutcomeAggregator {
    summary: Summary,
}

impl OutcomeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Success => self.summary.succeeded += 1,
            ItemOutcome::Failure(_) => self.summary.failed += 1,
            ItemOutcome::Skipped => self.summary.skipped += 1,
        }
    }

    /// Folds in items the caller excluded before the run.
    pub fn add_skipped(&mut self, count: usize) {
        self.summary.skipped += count;
    }

    pub fn mark_cancelled(&mut self) {
        self.summary.cancelled = true;
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_counts_each_bucket() {
        let mut aggregator = OutcomeAggregator::new();
        aggregator.accumulate(&ItemOutcome::Success);
        aggregator.accumulate(&ItemOutcome::Failure("not found".to_string()));
        aggregator.accumulate(&ItemOutcome::Success);
        aggregator.accumulate(&ItemOutcome::Skipped);
        aggregator.add_skipped(2);

        let summary = aggregator.summary();
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 3);
        assert!(!summary.cancelled);
        assert_eq!(summary.attempted(), 3);
    }

    #[test]
    fn test_empty_aggregator_reports_zeroes() {
        let aggregator = OutcomeAggregator::new();
        assert_eq!(aggregator.summary(), Summary::default());
    }

    #[test]
    fn test_severity_follows_failures() {
        let clean = Summary { succeeded: 3, ..Summary::default() };
        assert_eq!(clean.severity(), Severity::Info);

        let partial = Summary { succeeded: 2, failed: 1, ..Summary::default() };
        assert_eq!(partial.severity(), Severity::Warning);

        let total = Summary { failed: 2, ..Summary::default() };
        assert_eq!(total.severity(), Severity::Error);

        let cancelled = Summary { succeeded: 1, cancelled: true, ..Summary::default() };
        assert_eq!(cancelled.severity(), Severity::Warning);
    }

    #[test]
    fn test_describe_mentions_failures_and_skips() {
        let summary = Summary {
            succeeded: 3,
            failed: 2,
            skipped: 1,
            cancelled: false,
        };

        let message = summary.describe("Generated", "messages");

        assert!(message.starts_with("Generated 3 of 5 messages."));
        assert!(message.contains("2 failed"));
        assert!(message.contains("1 skipped"));
    }

    #[test]
    fn test_describe_clean_run() {
        let summary = Summary { succeeded: 4, ..Summary::default() };
        assert_eq!(summary.describe("Deleted", "affiliates"), "Deleted 4 of 4 affiliates.");
    }
}

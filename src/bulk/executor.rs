use crate::bulk::outcome::{ItemOutcome, OutcomeAggregator, Summary};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_ITEM_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent<Id> {
    ItemFinished {
        id: Id,
        outcome: ItemOutcome,
        progress: Progress,
    },
    Cancelled {
        progress: Progress,
    },
}

#[derive(Debug, Clone)]
pub struct BatchReport<Id> {
    pub outcomes: Vec<(Id, ItemOutcome)>,
    pub summary: Summary,
}

impl<Id> BatchReport<Id> {
    pub fn succeeded_ids(&self) -> impl Iterator<Item = &Id> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_success())
            .map(|(id, _)| id)
    }

    pub fn failed_ids(&self) -> impl Iterator<Item = &Id> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_failure())
            .map(|(id, _)| id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Pause between two items. Not applied after the last one.
    pub item_delay: Duration,
    /// Items the caller excluded up front because their precondition
    /// already held.
    pub pre_skipped: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            item_delay: DEFAULT_ITEM_DELAY,
            pre_skipped: 0,
        }
    }
}

/// Runs one operation over a list of ids, one at a time.
#[derive(Debug, Clone, Default)]
pub struct BatchExecutor {
    options: BatchOptions,
}

impl BatchExecutor {
    pub fn new(options: BatchOptions) -> Self {
        Self { options }
    }

    /// Processes `ids` in order. A failing item is recorded and the loop
    /// moves on. `cancel` is checked before each item; an item already in
    /// flight always runs to completion.
    pub async fn run<Id, Op, Fut, E, S>(
        &self,
        ids: Vec<Id>,
        mut operation: Op,
        mut sink: S,
        cancel: &CancellationToken,
    ) -> BatchReport<Id>
    where
        Id: Clone + std::fmt::Debug,
        Op: FnMut(Id) -> Fut,
        Fut: Future<Output = Result<ItemOutcome, E>>,
        E: Display,
        S: FnMut(BatchEvent<Id>),
    {
        let total = ids.len();
        let mut aggregator = OutcomeAggregator::new();
        aggregator.add_skipped(self.options.pre_skipped);
        let mut outcomes = Vec::with_capacity(total);

        info!(total, skipped = self.options.pre_skipped, "batch started");

        for (index, id) in ids.into_iter().enumerate() {
            if cancel.is_cancelled() {
                aggregator.mark_cancelled();
                let progress = Progress { current: index, total };
                info!(attempted = index, total, "batch cancelled");
                sink(BatchEvent::Cancelled { progress });
                break;
            }

            if index > 0 && !self.options.item_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.options.item_delay) => {}
                    _ = cancel.cancelled() => {}
                }
                if cancel.is_cancelled() {
                    aggregator.mark_cancelled();
                    let progress = Progress { current: index, total };
                    info!(attempted = index, total, "batch cancelled");
                    sink(BatchEvent::Cancelled { progress });
                    break;
                }
            }

            let outcome = match operation(id.clone()).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(item = ?id, error = %e, "batch item failed");
                    ItemOutcome::Failure(e.to_string())
                }
            };
            aggregator.accumulate(&outcome);

            let progress = Progress {
                current: index + 1,
                total,
            };
            debug!(item = ?id, current = progress.current, total, "batch item finished");
            sink(BatchEvent::ItemFinished {
                id: id.clone(),
                outcome: outcome.clone(),
                progress,
            });
            outcomes.push((id, outcome));
        }

        let summary = aggregator.summary();
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            cancelled = summary.cancelled,
            "batch finished"
        );

        BatchReport { outcomes, summary }
    }
}

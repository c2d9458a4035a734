use crate::bulk::executor::{BatchEvent, BatchExecutor, BatchOptions, BatchReport, Progress, DEFAULT_ITEM_DELAY};
use crate::bulk::notify::{NotificationChannel, DEFAULT_NOTIFICATION_TTL};
use crate::bulk::outcome::{ItemOutcome, Summary};
use crate::bulk::projector::{Projection, Selectable, ViewFilter, ViewProjector};
use crate::bulk::selection::{SelectionSnapshot, SelectionStore};
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub const DEFAULT_RESULT_DISPLAY: Duration = Duration::from_millis(3000);

/// A kind of bulk operation a page offers.
pub trait BatchAction: Copy + fmt::Debug + PartialEq {
    /// Shown while running, e.g. "Deleting".
    fn in_progress_label(&self) -> &'static str;
    /// Shown in the summary, e.g. "Deleted".
    fn done_label(&self) -> &'static str;
    fn noun(&self) -> &'static str;

    /// Whether successfully processed items leave the collection.
    fn removes_items(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub item_delay: Duration,
    pub notification_ttl: Duration,
    pub result_display: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            item_delay: DEFAULT_ITEM_DELAY,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            result_display: DEFAULT_RESULT_DISPLAY,
        }
    }
}

#[derive(Debug, Clone)]
pub enum JobState<K> {
    Idle,
    Running {
        kind: K,
        progress: Progress,
        cancel: CancellationToken,
    },
    Finished {
        kind: K,
        summary: Summary,
        finished_at: Instant,
    },
}

impl<K> JobState<K> {
    pub fn is_running(&self) -> bool {
        matches!(self, JobState::Running { .. })
    }
}

/// Work handed out by [`BulkController::begin_batch`], to be fed to a
/// [`BatchExecutor`] and returned through [`BulkController::complete_batch`].
#[derive(Debug, Clone)]
pub struct BatchTicket<Id, K> {
    pub kind: K,
    pub ids: Vec<Id>,
    pub skipped: usize,
    pub cancel: CancellationToken,
}

impl<Id, K> BatchTicket<Id, K> {
    pub fn options(&self, item_delay: Duration) -> BatchOptions {
        BatchOptions {
            item_delay,
            pre_skipped: self.skipped,
        }
    }
}

/// Page-level owner of the item collection, the selection, the running
/// job and the notification list.
pub struct BulkController<T: Selectable, F, K> {
    items: Arc<Vec<T>>,
    filter: F,
    selection: SelectionStore<T::Id>,
    projector: ViewProjector<T, F>,
    job: JobState<K>,
    /// Last outcome per item, with the action that produced it.
    outcomes: HashMap<T::Id, (K, ItemOutcome)>,
    notifications: NotificationChannel,
    settings: ControllerSettings,
}

impl<T, F, K> BulkController<T, F, K>
where
    T: Selectable + Clone,
    T::Id: fmt::Debug,
    F: ViewFilter<T>,
    K: BatchAction,
{
    pub fn new(filter: F, settings: ControllerSettings) -> Self {
        Self {
            items: Arc::new(Vec::new()),
            filter,
            selection: SelectionStore::new(),
            projector: ViewProjector::new(),
            job: JobState::Idle,
            outcomes: HashMap::new(),
            notifications: NotificationChannel::new(settings.notification_ttl),
            settings,
        }
    }

    pub fn settings(&self) -> ControllerSettings {
        self.settings
    }

    pub fn items(&self) -> &Arc<Vec<T>> {
        &self.items
    }

    /// Replaces the collection. Selected ids that no longer exist are dropped.
    pub fn set_items(&mut self, items: Vec<T>) {
        let present: HashSet<T::Id> = items.iter().map(|item| item.id()).collect();
        self.selection.retain(|id| present.contains(id));
        self.outcomes.retain(|id, _| present.contains(id));
        self.items = Arc::new(items);
        debug!(count = self.items.len(), "items replaced");
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: F) {
        self.filter = filter;
    }

    pub fn projection(&mut self) -> Arc<Projection<T::Id>> {
        self.projector
            .project(&self.items, &self.filter, &self.selection.snapshot())
    }

    pub fn selection(&self) -> SelectionSnapshot<T::Id> {
        self.selection.snapshot()
    }

    pub fn toggle(&mut self, id: T::Id) {
        self.selection.toggle(id);
    }

    pub fn select_all_visible(&mut self) {
        let projection = self.projection();
        self.selection.select_many(projection.visible_ids.iter().cloned());
    }

    pub fn deselect_all_visible(&mut self) {
        let projection = self.projection();
        self.selection.deselect_many(projection.visible_ids.iter());
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn job(&self) -> &JobState<K> {
        &self.job
    }

    pub fn is_running(&self) -> bool {
        self.job.is_running()
    }

    pub fn last_outcome(&self, id: &T::Id) -> Option<&ItemOutcome> {
        self.outcomes.get(id).map(|(_, outcome)| outcome)
    }

    pub fn notifications(&self) -> &NotificationChannel {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationChannel {
        &mut self.notifications
    }

    /// Starts a job over the visible selection. Items for which
    /// `precondition_met` holds are left out and counted as skipped.
    ///
    /// Returns `None` when a job is already running, when nothing visible is
    /// selected, or when every target was skipped.
    pub fn begin_batch<P>(&mut self, kind: K, precondition_met: P) -> Option<BatchTicket<T::Id, K>>
    where
        P: Fn(&T) -> bool,
    {
        if self.is_running() {
            debug!(?kind, "batch already running, trigger ignored");
            return None;
        }

        let projection = self.projection();
        if projection.visible_selection.is_empty() {
            return None;
        }

        let mut ids = Vec::with_capacity(projection.visible_selection.len());
        let mut skipped = 0;
        for &index in &projection.visible {
            let item = &self.items[index];
            if !self.selection.contains(&item.id()) {
                continue;
            }
            if precondition_met(item) {
                skipped += 1;
            } else {
                ids.push(item.id());
            }
        }

        if ids.is_empty() {
            let summary = Summary {
                skipped,
                ..Summary::default()
            };
            info!(?kind, skipped, "nothing left to process");
            self.notifications.info(format!(
                "Nothing to do: all {} selected {} were skipped.",
                skipped,
                kind.noun()
            ));
            self.job = JobState::Finished {
                kind,
                summary,
                finished_at: Instant::now(),
            };
            return None;
        }

        Some(self.start(kind, ids, skipped))
    }

    /// Re-submits a single item whose last outcome was a failure, using the
    /// action that produced it.
    pub fn begin_retry(&mut self, id: &T::Id) -> Option<BatchTicket<T::Id, K>> {
        if self.is_running() {
            return None;
        }
        let kind = match self.outcomes.get(id) {
            Some((kind, outcome)) if outcome.is_failure() => *kind,
            _ => return None,
        };

        Some(self.start(kind, vec![id.clone()], 0))
    }

    fn start(&mut self, kind: K, ids: Vec<T::Id>, skipped: usize) -> BatchTicket<T::Id, K> {
        let cancel = CancellationToken::new();
        info!(?kind, count = ids.len(), skipped, "batch job started");
        self.job = JobState::Running {
            kind,
            progress: Progress {
                current: 0,
                total: ids.len(),
            },
            cancel: cancel.clone(),
        };
        BatchTicket {
            kind,
            ids,
            skipped,
            cancel,
        }
    }

    pub fn apply_event(&mut self, event: &BatchEvent<T::Id>) {
        apply_event(&mut self.job, &mut self.outcomes, event);
    }

    /// Folds a finished run back into the page state and notifies the user.
    pub fn complete_batch(&mut self, report: BatchReport<T::Id>) -> Summary {
        let kind = match &self.job {
            JobState::Running { kind, .. } => *kind,
            _ => return report.summary,
        };

        let succeeded: Vec<T::Id> = report.succeeded_ids().cloned().collect();
        for (id, outcome) in &report.outcomes {
            self.outcomes.insert(id.clone(), (kind, outcome.clone()));
        }

        self.selection.deselect_many(succeeded.iter());

        if kind.removes_items() && !succeeded.is_empty() {
            let removed: HashSet<&T::Id> = succeeded.iter().collect();
            let remaining: Vec<T> = self
                .items
                .iter()
                .filter(|item| !removed.contains(&item.id()))
                .cloned()
                .collect();
            for id in &succeeded {
                self.outcomes.remove(id);
            }
            self.set_items(remaining);
        }

        let summary = report.summary;
        self.notifications.push(
            summary.describe(kind.done_label(), kind.noun()),
            summary.severity(),
        );
        self.job = JobState::Finished {
            kind,
            summary,
            finished_at: Instant::now(),
        };
        summary
    }

    /// Requests cancellation of the running job. Returns false when idle.
    pub fn cancel(&mut self) -> bool {
        match &self.job {
            JobState::Running { kind, cancel, .. } => {
                info!(?kind, "batch cancel requested");
                cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// The item source failed; the selection and job state are untouched.
    pub fn report_source_error(&mut self, error: impl Display) {
        error!(error = %error, "item source failed");
        self.notifications.error(format!("Could not load items: {}", error));
    }

    /// Returns a finished job to idle once its result has been shown long
    /// enough.
    pub fn expire_finished(&mut self, now: Instant) -> bool {
        if let JobState::Finished { finished_at, .. } = &self.job {
            if now.saturating_duration_since(*finished_at) >= self.settings.result_display {
                self.job = JobState::Idle;
                return true;
            }
        }
        false
    }

    /// Runs a whole job in place: selection, execution and cleanup.
    /// Returns `None` when the trigger was a no-op.
    pub async fn run_batch<P, Op, Fut, E>(
        &mut self,
        kind: K,
        precondition_met: P,
        operation: Op,
    ) -> Option<Summary>
    where
        P: Fn(&T) -> bool,
        Op: FnMut(T::Id) -> Fut,
        Fut: Future<Output = Result<ItemOutcome, E>>,
        E: Display,
    {
        let ticket = self.begin_batch(kind, precondition_met)?;
        let executor = BatchExecutor::new(ticket.options(self.settings.item_delay));

        let job = &mut self.job;
        let outcomes = &mut self.outcomes;
        let report = executor
            .run(
                ticket.ids,
                operation,
                |event| apply_event(job, outcomes, &event),
                &ticket.cancel,
            )
            .await;

        Some(self.complete_batch(report))
    }
}

fn apply_event<Id, K>(
    job: &mut JobState<K>,
    outcomes: &mut HashMap<Id, (K, ItemOutcome)>,
    event: &BatchEvent<Id>,
) where
    Id: std::hash::Hash + Eq + Clone,
    K: Copy,
{
    match event {
        BatchEvent::ItemFinished { id, outcome, progress: new } => {
            if let JobState::Running { kind, progress, .. } = job {
                outcomes.insert(id.clone(), (*kind, outcome.clone()));
                *progress = *new;
            }
        }
        BatchEvent::Cancelled { progress: new } => {
            if let JobState::Running { progress, .. } = job {
                *progress = *new;
            }
        }
    }
}

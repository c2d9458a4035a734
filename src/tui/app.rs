use crate::affiliate::{AffiliateService, ApiError, BatchKind, PipelineFilter, PipelineView, SavedAffiliate};
use crate::bulk::{
    BatchEvent, BatchExecutor, BatchReport, BatchTicket, BulkController, ControllerSettings, JobState,
    Selectable,
};
use crate::tui::handlers::{HelpModeAction, KeyHandler, NormalModeAction, SearchModeAction};
use crate::tui::navigation::NavigationState;
use crate::tui::search::SearchState;
use anyhow::Result;
use crossterm::event::KeyEvent;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;
use tracing::{info, warn};

pub type PipelineController = BulkController<SavedAffiliate, PipelineFilter, BatchKind>;

/// Results of background work, drained by the UI loop between frames.
#[derive(Debug)]
pub enum AppEvent {
    Loaded(Result<Vec<SavedAffiliate>, String>),
    Batch(BatchEvent<u64>),
    BatchFinished(BatchReport<u64>),
}

pub struct App {
    pub controller: PipelineController,
    pub navigation: NavigationState,
    pub search: SearchState,
    pub help_mode: bool,
    pub should_quit: bool,
    pub loading: bool,
    reload_pending: bool,
    pub source: String,
    service: Arc<dyn AffiliateService>,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(service: Arc<dyn AffiliateService>, settings: ControllerSettings, source: String) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            controller: BulkController::new(PipelineFilter::default(), settings),
            navigation: NavigationState::new(),
            search: SearchState::new(),
            help_mode: false,
            should_quit: false,
            loading: false,
            reload_pending: false,
            source,
            service,
            events_tx,
            events_rx,
        }
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> Result<()> {
        if self.help_mode {
            self.handle_help_mode_key(key_event);
        } else if self.search.search_mode {
            self.handle_search_mode_key(key_event);
        } else {
            self.handle_normal_mode_key(key_event);
        }
        Ok(())
    }

    fn handle_normal_mode_key(&mut self, key_event: KeyEvent) {
        match KeyHandler::handle_normal_mode_key(key_event) {
            NormalModeAction::Quit => self.should_quit = true,
            NormalModeAction::ClearSelection => self.controller.clear_selection(),
            NormalModeAction::MoveUp => self.navigation.move_up(),
            NormalModeAction::MoveDown => {
                let rows = self.controller.projection().visible_count();
                self.navigation.move_down(rows);
            }
            NormalModeAction::ToggleSelection => self.toggle_current(),
            NormalModeAction::SelectAllVisible => self.controller.select_all_visible(),
            NormalModeAction::DeselectAllVisible => self.controller.deselect_all_visible(),
            NormalModeAction::NextView => {
                let view = self.controller.filter().view.next();
                self.set_view(view);
            }
            NormalModeAction::PreviousView => {
                let view = self.controller.filter().view.previous();
                self.set_view(view);
            }
            NormalModeAction::EnterSearchMode => self.search.enter_search_mode(),
            NormalModeAction::BulkDelete => self.start_batch(BatchKind::Delete),
            NormalModeAction::BulkFindEmail => self.start_batch(BatchKind::FindEmail),
            NormalModeAction::BulkGenerateOutreach => self.start_batch(BatchKind::GenerateOutreach),
            NormalModeAction::CancelBatch => {
                self.controller.cancel();
            }
            NormalModeAction::RetryCurrent => self.retry_current(),
            NormalModeAction::Reload => self.refresh(),
            NormalModeAction::DismissNotification => {
                self.controller.notifications_mut().dismiss_oldest();
            }
            NormalModeAction::ToggleHelpMode => self.help_mode = true,
            NormalModeAction::None => {}
        }
    }

    fn handle_help_mode_key(&mut self, key_event: KeyEvent) {
        if KeyHandler::handle_help_mode_key(key_event) == HelpModeAction::ExitHelpMode {
            self.help_mode = false;
        }
    }

    fn handle_search_mode_key(&mut self, key_event: KeyEvent) {
        match KeyHandler::handle_search_mode_key(key_event) {
            SearchModeAction::CancelSearch => {
                self.search.cancel_search();
                self.apply_query();
            }
            SearchModeAction::ConfirmSearch => self.search.confirm_search(),
            SearchModeAction::Backspace => {
                if self.search.backspace() {
                    self.apply_query();
                }
            }
            SearchModeAction::InsertChar(c) => {
                self.search.insert_char(c);
                self.apply_query();
            }
            SearchModeAction::None => {}
        }
    }

    fn set_view(&mut self, view: PipelineView) {
        let mut filter = self.controller.filter().clone();
        filter.view = view;
        self.controller.set_filter(filter);
        self.navigation.reset();
    }

    fn apply_query(&mut self) {
        let mut filter = self.controller.filter().clone();
        filter.query = self.search.search_query.clone();
        self.controller.set_filter(filter);
        self.navigation.reset();
    }

    /// The affiliate under the cursor, if the visible list is not empty.
    pub fn current_affiliate(&mut self) -> Option<SavedAffiliate> {
        let projection = self.controller.projection();
        let index = *projection.visible.get(self.navigation.cursor)?;
        self.controller.items().get(index).cloned()
    }

    fn toggle_current(&mut self) {
        if let Some(affiliate) = self.current_affiliate() {
            self.controller.toggle(affiliate.id());
        }
    }

    /// Loads the collection in the background. A request made while a load
    /// is in flight starts another load once that one lands.
    pub fn refresh(&mut self) {
        if self.loading {
            self.reload_pending = true;
            return;
        }
        self.loading = true;

        let service = self.service.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let loaded = service.list_saved().await.map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::Loaded(loaded));
        });
    }

    pub fn start_batch(&mut self, kind: BatchKind) {
        let ticket = self
            .controller
            .begin_batch(kind, |affiliate| kind.precondition_met(affiliate));
        if let Some(ticket) = ticket {
            self.spawn_batch(ticket);
        }
    }

    fn retry_current(&mut self) {
        let Some(affiliate) = self.current_affiliate() else {
            return;
        };
        if let Some(ticket) = self.controller.begin_retry(&affiliate.id) {
            info!(id = affiliate.id, "retrying failed item");
            self.spawn_batch(ticket);
        }
    }

    fn spawn_batch(&mut self, ticket: BatchTicket<u64, BatchKind>) {
        let targets: HashMap<u64, SavedAffiliate> = self
            .controller
            .items()
            .iter()
            .filter(|affiliate| ticket.ids.contains(&affiliate.id))
            .map(|affiliate| (affiliate.id, affiliate.clone()))
            .collect();
        let executor = BatchExecutor::new(ticket.options(self.controller.settings().item_delay));
        let service = self.service.clone();
        let tx = self.events_tx.clone();

        tokio::spawn(async move {
            let BatchTicket { kind, ids, cancel, .. } = ticket;
            let progress_tx = tx.clone();
            let report = executor
                .run(
                    ids,
                    |id| {
                        let service = service.clone();
                        let target = targets.get(&id).cloned();
                        async move {
                            match target {
                                Some(affiliate) => kind.perform(service.as_ref(), &affiliate).await,
                                None => Err(ApiError::NotFound),
                            }
                        }
                    },
                    |event| {
                        let _ = progress_tx.send(AppEvent::Batch(event));
                    },
                    &cancel,
                )
                .await;
            let _ = tx.send(AppEvent::BatchFinished(report));
        });
    }

    /// Applies everything background tasks reported since the last call.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_app_event(event);
            handled += 1;
        }
        handled
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Loaded(Ok(affiliates)) => {
                self.loading = false;
                info!(count = affiliates.len(), "saved affiliates loaded");
                self.controller.set_items(affiliates);
                self.reload_if_pending();
            }
            AppEvent::Loaded(Err(error)) => {
                self.loading = false;
                warn!(%error, "failed to load saved affiliates");
                self.controller.report_source_error(error);
                self.reload_if_pending();
            }
            AppEvent::Batch(event) => self.controller.apply_event(&event),
            AppEvent::BatchFinished(report) => {
                let kind = match self.controller.job() {
                    JobState::Running { kind, .. } => Some(*kind),
                    _ => None,
                };
                let summary = self.controller.complete_batch(report);
                if kind.is_some_and(|kind| kind.refreshes_items()) && summary.succeeded > 0 {
                    self.refresh();
                }
            }
        }

        let rows = self.controller.projection().visible_count();
        self.navigation.clamp(rows);
    }

    fn reload_if_pending(&mut self) {
        if std::mem::take(&mut self.reload_pending) {
            self.refresh();
        }
    }

    /// Housekeeping between frames.
    pub fn tick(&mut self) {
        self.controller.expire_finished(Instant::now());
    }
}

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{ApiError, EventBackend};
use crate::creation::{CreationFlow, ValidationError};
use crate::models::{Event, EventDraft, EventId};
use crate::store::EventStore;
use crate::view::{self, EventSummary, ViewContent, ViewMode};

const LOAD_FAILED: &str = "Failed to load events";
const CREATED: &str = "Event created successfully!";

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
}

/// Transient toast.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

/// Identifies one refresh; only the newest may land.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshTicket(u64);

/// Identifies one create request; only the current one may drive the dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmissionTicket(u64);

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DashboardSnapshot {
    pub fetch_state: FetchState,
    pub loading: bool,
    pub error: Option<String>,
    pub notification: Option<Notification>,
    pub view_mode: ViewMode,
    pub total_events: usize,
    pub upcoming_events: usize,
    pub selected_event: Option<EventSummary>,
    pub content: ViewContent,
    /// Present while the creation dialog is open.
    pub creation: Option<CreationFlow>,
}

/// Top-level state: owns the store, drives the fetch lifecycle and hosts the
/// creation dialog. Network calls happen between `begin_*` and `finish_*` so
/// callers never need to hold the dashboard across an await.
#[derive(Debug, Default)]
pub struct Dashboard {
    store: EventStore,
    fetch_state: FetchState,
    view_mode: ViewMode,
    notification: Option<Notification>,
    creation: CreationFlow,
    creation_open: bool,
    refresh_generation: u64,
    submission_generation: u64,
    pending_submission: Option<u64>,
    detached: bool,
}

impl Dashboard {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            ..Self::default()
        }
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn fetch_state(&self) -> FetchState {
        self.fetch_state
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn is_creation_open(&self) -> bool {
        self.creation_open
    }

    pub fn creation(&self) -> &CreationFlow {
        &self.creation
    }

    pub fn creation_mut(&mut self) -> &mut CreationFlow {
        &mut self.creation
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.refresh_generation += 1;
        self.fetch_state = FetchState::Loading;
        self.store.set_loading(true);
        self.store.set_error(None);
        debug!(generation = self.refresh_generation, "refresh started");
        RefreshTicket(self.refresh_generation)
    }

    /// Applies a listing result. Returns `false` when the result was dropped
    /// because a newer refresh started or the dashboard was detached.
    pub fn finish_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<Event>, ApiError>,
    ) -> bool {
        if self.detached || ticket.0 != self.refresh_generation {
            debug!(ticket = ticket.0, "dropping superseded refresh");
            return false;
        }
        self.store.set_loading(false);
        match result {
            Ok(events) => {
                info!(count = events.len(), "events loaded");
                self.store.replace_all(events);
                self.fetch_state = FetchState::Loaded;
            }
            Err(err) => {
                warn!("event listing failed: {err}");
                let message = match err.message().trim() {
                    "" => LOAD_FAILED.to_string(),
                    msg => msg.to_string(),
                };
                self.store.set_error(Some(message.clone()));
                self.notification = Some(Notification::error(message));
                self.fetch_state = FetchState::Errored;
            }
        }
        true
    }

    /// Mount and user refresh run the same transition.
    pub async fn refresh<B: EventBackend + ?Sized>(&mut self, backend: &B) -> FetchState {
        let ticket = self.begin_refresh();
        let result = backend.list_events().await;
        self.finish_refresh(ticket, result);
        self.fetch_state
    }

    pub async fn mount<B: EventBackend + ?Sized>(&mut self, backend: &B) -> FetchState {
        self.detached = false;
        self.refresh(backend).await
    }

    /// In-flight completions are ignored from here on.
    pub fn detach(&mut self) {
        self.detached = true;
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn select(&mut self, event: Option<Event>) {
        self.store.select(event);
    }

    pub fn select_by_id(&mut self, id: &EventId) -> bool {
        match self.store.find(id).cloned() {
            Some(event) => {
                self.store.select(Some(event));
                true
            }
            None => false,
        }
    }

    pub fn dismiss_error(&mut self) {
        self.store.clear_error();
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn open_creation(&mut self) {
        self.creation_open = true;
    }

    /// Closing discards the draft at any step. A create already in flight
    /// still lands in the store but no longer drives the dialog.
    pub fn close_creation(&mut self) {
        self.creation.reset();
        self.creation_open = false;
        self.pending_submission = None;
    }

    pub fn begin_submission(&mut self) -> Result<(SubmissionTicket, EventDraft), ValidationError> {
        if !self.creation_open {
            return Err(ValidationError::NotReviewed);
        }
        let draft = self.creation.begin_submit()?;
        self.submission_generation += 1;
        self.pending_submission = Some(self.submission_generation);
        debug!(ticket = self.submission_generation, "submission started");
        Ok((SubmissionTicket(self.submission_generation), draft))
    }

    /// Applies a create result. A confirmed event is always appended; the
    /// dialog only moves when `ticket` is the submission it is waiting on.
    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<Event, ApiError>,
    ) -> Option<Event> {
        if self.detached {
            debug!(ticket = ticket.0, "dropping submission result after detach");
            return None;
        }
        let current = self.pending_submission == Some(ticket.0);
        if current {
            self.pending_submission = None;
        }

        match result {
            Ok(event) => {
                info!(id = %event.id, current, "event created");
                if current {
                    self.creation.complete_submit(Ok(event.clone()));
                    self.creation_open = false;
                }
                self.store.append(event.clone());
                self.notification = Some(Notification::success(CREATED));
                Some(event)
            }
            Err(err) => {
                warn!(current, "event creation failed: {err}");
                if current {
                    self.creation.complete_submit(Err(err));
                }
                None
            }
        }
    }

    pub async fn submit_creation<B: EventBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<Option<Event>, ValidationError> {
        let (ticket, draft) = self.begin_submission()?;
        let result = backend.create_event(&draft).await;
        Ok(self.finish_submission(ticket, result))
    }

    pub fn snapshot(&self, today: NaiveDate) -> DashboardSnapshot {
        let events = self.store.events();
        let content = if self.fetch_state == FetchState::Loading && events.is_empty() {
            ViewContent::Loading
        } else {
            ViewContent::for_events(self.view_mode, events)
        };
        DashboardSnapshot {
            fetch_state: self.fetch_state,
            loading: self.store.loading(),
            error: self.store.error().map(str::to_string),
            notification: self.notification.clone(),
            view_mode: self.view_mode,
            total_events: events.len(),
            upcoming_events: view::upcoming_count(events, today),
            selected_event: self.store.selected_event().map(EventSummary::from_event),
            content,
            creation: self.creation_open.then(|| self.creation.clone()),
        }
    }
}

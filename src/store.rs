use serde::Serialize;

use crate::models::{Event, EventId, EventPatch};

/// Client-side event state. Lives for the process; a reload refetches.
///
/// Every action is total: unknown ids are ignored and nothing panics.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct EventStore {
    events: Vec<Event>,
    loading: bool,
    error: Option<String>,
    selected_event: Option<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_event(&self) -> Option<&Event> {
        self.selected_event.as_ref()
    }

    pub fn find(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|event| &event.id == id)
    }

    pub fn replace_all(&mut self, events: Vec<Event>) {
        self.events = events;
    }

    pub fn append(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn patch(&mut self, id: &EventId, fields: &EventPatch) {
        if let Some(event) = self.events.iter_mut().find(|event| &event.id == id) {
            fields.apply_to(event);
        }
    }

    pub fn remove(&mut self, id: &EventId) {
        self.events.retain(|event| &event.id != id);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn select(&mut self, event: Option<Event>) {
        self.selected_event = event;
    }
}

//! What the map and list views show for a set of events.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::location::{self, Bounds, Coordinates};
use crate::models::{EndDate, Event, EventId, Role};

pub const DEFAULT_CENTER: Coordinates = Coordinates {
    lat: 12.992917,
    lng: 80.2218964,
};
pub const DEFAULT_ZOOM: u8 = 12;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Map,
    List,
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "map" => Ok(ViewMode::Map),
            "list" => Ok(ViewMode::List),
            other => Err(format!("unknown view mode: {other}")),
        }
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

/// `None` for an open-ended event, so nothing about the end is rendered.
pub fn end_date_label(end: &EndDate) -> Option<String> {
    end.as_date().map(format_date)
}

/// Landmark if there is one, then rounded coordinates, then the raw text.
pub fn location_label(event: &Event) -> String {
    let landmark = event.landmark_name.trim();
    if !landmark.is_empty() {
        return landmark.to_string();
    }
    match location::decode(&event.location) {
        Some(coords) => coords.display(),
        None => event.location.clone(),
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EventSummary {
    pub id: EventId,
    pub event_name: String,
    pub desc: String,
    pub role: Role,
    pub role_label: &'static str,
    pub organizer: String,
    pub email: String,
    pub start_label: String,
    pub end_label: Option<String>,
    pub location_label: String,
}

impl EventSummary {
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            event_name: event.event_name.clone(),
            desc: event.desc.clone(),
            role: event.role,
            role_label: event.role.label(),
            organizer: event.user_name.clone(),
            email: event.email.clone(),
            start_label: format_date(event.start_date),
            end_label: end_date_label(&event.end_date),
            location_label: location_label(event),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MapMarker {
    pub position: Coordinates,
    pub popup: EventSummary,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: u8,
    /// Fitted around every marker; absent when there are none.
    pub bounds: Option<Bounds>,
    pub markers: Vec<MapMarker>,
}

impl MapView {
    pub fn from_events(events: &[Event]) -> Self {
        let markers: Vec<MapMarker> = events
            .iter()
            .filter_map(|event| {
                location::decode(&event.location).map(|position| MapMarker {
                    position,
                    popup: EventSummary::from_event(event),
                })
            })
            .collect();
        let bounds = Bounds::fit(markers.iter().map(|marker| marker.position));
        Self {
            center: bounds.map(|b| b.center()).unwrap_or(DEFAULT_CENTER),
            zoom: DEFAULT_ZOOM,
            bounds,
            markers,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EventCard {
    #[serde(flatten)]
    pub summary: EventSummary,
    /// Directions link; `None` disables the navigate action.
    pub navigate_url: Option<String>,
}

impl EventCard {
    pub fn from_event(event: &Event) -> Self {
        Self {
            summary: EventSummary::from_event(event),
            navigate_url: location::navigation_url(&event.location),
        }
    }
}

pub fn cards(events: &[Event]) -> Vec<EventCard> {
    events.iter().map(EventCard::from_event).collect()
}

/// Events starting today or later.
pub fn upcoming_count(events: &[Event], today: NaiveDate) -> usize {
    events
        .iter()
        .filter(|event| event.start_date >= today)
        .count()
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewContent {
    Loading,
    Empty,
    Map(MapView),
    List { cards: Vec<EventCard> },
}

impl ViewContent {
    pub fn for_events(mode: ViewMode, events: &[Event]) -> Self {
        if events.is_empty() {
            return ViewContent::Empty;
        }
        match mode {
            ViewMode::Map => ViewContent::Map(MapView::from_events(events)),
            ViewMode::List => ViewContent::List {
                cards: cards(events),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, location: &str) -> Event {
        Event {
            id: EventId::new(id),
            role: Role::Admin,
            event_name: "Kabaddi League".to_string(),
            desc: "Inter-college".to_string(),
            location: location.to_string(),
            landmark_name: String::new(),
            user_name: "Dev".to_string(),
            email: "dev@example.com".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 10, 8).expect("date"),
            end_date: EndDate::Open,
        }
    }

    #[test]
    fn open_end_date_renders_nothing() {
        let card = EventCard::from_event(&event("1", "12.99,80.22"));
        assert_eq!(card.summary.end_label, None);
        assert_eq!(card.summary.start_label, "Oct 08, 2025");

        let rendered = serde_json::to_string(&card).expect("json");
        assert!(!rendered.contains("0000-00-00"));
    }

    #[test]
    fn closed_end_date_is_formatted() {
        let mut e = event("1", "12.99,80.22");
        e.end_date = EndDate::On(NaiveDate::from_ymd_opt(2025, 10, 10).expect("date"));
        assert_eq!(
            EventSummary::from_event(&e).end_label.as_deref(),
            Some("Oct 10, 2025")
        );
    }

    #[test]
    fn one_event_one_marker() {
        let map = MapView::from_events(&[event("1", "12.99,80.22")]);
        assert_eq!(map.markers.len(), 1);
        assert_eq!(map.markers[0].position, Coordinates::new(12.99, 80.22));
        assert_eq!(map.center, Coordinates::new(12.99, 80.22));
        assert_eq!(map.markers[0].popup.role_label, "Official Event");
    }

    #[test]
    fn legacy_locations_get_no_marker_and_no_navigation() {
        let events = [event("1", "Nehru Stadium"), event("2", "13.0,80.0")];
        let map = MapView::from_events(&events);
        assert_eq!(map.markers.len(), 1);

        let cards = cards(&events);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].navigate_url, None);
        assert_eq!(cards[0].summary.location_label, "Nehru Stadium");
        assert!(cards[1].navigate_url.is_some());
    }

    #[test]
    fn map_without_markers_uses_default_center() {
        let map = MapView::from_events(&[event("1", "somewhere")]);
        assert!(map.bounds.is_none());
        assert_eq!(map.center, DEFAULT_CENTER);
    }

    #[test]
    fn location_label_prefers_landmark() {
        let mut e = event("1", "12.992917,80.2218964");
        assert_eq!(location_label(&e), "12.992917, 80.221896");
        e.landmark_name = "IIT Madras".to_string();
        assert_eq!(location_label(&e), "IIT Madras");
    }

    #[test]
    fn empty_list_is_empty_state() {
        assert_eq!(ViewContent::for_events(ViewMode::Map, &[]), ViewContent::Empty);
        assert_eq!(ViewContent::for_events(ViewMode::List, &[]), ViewContent::Empty);
    }

    #[test]
    fn counts_upcoming_from_today() {
        let mut later = event("2", "1,1");
        later.start_date = NaiveDate::from_ymd_opt(2025, 10, 9).expect("date");
        let events = [event("1", "1,1"), later];
        let today = NaiveDate::from_ymd_opt(2025, 10, 8).expect("date");
        assert_eq!(upcoming_count(&events, today), 2);
        let tomorrow = NaiveDate::from_ymd_opt(2025, 10, 9).expect("date");
        assert_eq!(upcoming_count(&events, tomorrow), 1);
    }

    #[test]
    fn parses_view_modes() {
        assert_eq!("List".parse::<ViewMode>(), Ok(ViewMode::List));
        assert!("grid".parse::<ViewMode>().is_err());
    }
}

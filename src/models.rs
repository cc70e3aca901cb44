use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Wire value the backend uses for "no end date".
pub const NO_END_DATE: &str = "0000-00-00";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Backend-assigned identity. Accepts either a JSON string or integer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Ok(Self(s)),
            serde_json::Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(de::Error::custom(format!("invalid event id: {other}"))),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "Public Event",
            Role::Admin => "Official Event",
        }
    }
}

/// End of an event's date range. `Open` travels as [`NO_END_DATE`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EndDate {
    #[default]
    Open,
    On(NaiveDate),
}

impl EndDate {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            EndDate::Open => None,
            EndDate::On(date) => Some(*date),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, EndDate::Open)
    }
}

impl From<Option<NaiveDate>> for EndDate {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map(EndDate::On).unwrap_or(EndDate::Open)
    }
}

impl Serialize for EndDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EndDate::Open => serializer.serialize_str(NO_END_DATE),
            EndDate::On(date) => serializer.serialize_str(&date.format(DATE_FORMAT).to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for EndDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(EndDate::Open),
            Some(raw) if raw == NO_END_DATE => Ok(EndDate::Open),
            Some(raw) => parse_wire_date(&raw)
                .map(EndDate::On)
                .ok_or_else(|| de::Error::custom(format!("invalid end_date: {raw:?}"))),
        }
    }
}

/// Parses `YYYY-MM-DD`, or a timestamp that starts with one. Timestamps with
/// an offset are read as the calendar day they fall on in local time.
pub fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    parse_wire_date_in(raw, &Local)
}

fn parse_wire_date_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() > 10 {
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Some(instant.with_timezone(tz).date_naive());
        }
    }
    let head = raw.get(..10)?;
    if raw.len() > 10 && !raw[10..].starts_with(['T', ' ']) {
        return None;
    }
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
}

mod wire_date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_wire_date(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw:?}")))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Event {
    pub id: EventId,
    #[serde(default)]
    pub role: Role,
    pub event_name: String,
    pub desc: String,
    /// Canonical `"lat,lng"` token, or legacy free text.
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub landmark_name: String,
    pub user_name: String,
    pub email: String,
    #[serde(with = "wire_date")]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: EndDate,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Unsaved event data, as submitted to the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct EventDraft {
    pub role: Option<Role>,
    pub event_name: String,
    pub desc: String,
    pub location: String,
    pub landmark_name: Option<String>,
    pub user_name: String,
    pub email: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Body of `POST /api/events` with defaults applied.
#[derive(Serialize, Debug, PartialEq)]
pub struct CreateEventPayload<'a> {
    pub role: Role,
    pub event_name: &'a str,
    pub desc: &'a str,
    pub location: &'a str,
    pub landmark_name: &'a str,
    pub user_name: &'a str,
    pub email: &'a str,
    #[serde(with = "wire_date")]
    pub start_date: NaiveDate,
    pub end_date: EndDate,
    pub is_deleted: bool,
}

impl EventDraft {
    pub fn payload(&self) -> CreateEventPayload<'_> {
        CreateEventPayload {
            role: self.role.unwrap_or_default(),
            event_name: &self.event_name,
            desc: &self.desc,
            location: &self.location,
            landmark_name: self.landmark_name.as_deref().unwrap_or(""),
            user_name: &self.user_name,
            email: &self.email,
            start_date: self.start_date,
            end_date: EndDate::from(self.end_date),
            is_deleted: false,
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_wire_date"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<EndDate>,
}

mod optional_wire_date {
    use super::*;

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => wire_date::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse_wire_date(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date: {raw:?}"))),
        }
    }
}

impl EventPatch {
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(role) = self.role {
            event.role = role;
        }
        if let Some(name) = &self.event_name {
            event.event_name = name.clone();
        }
        if let Some(desc) = &self.desc {
            event.desc = desc.clone();
        }
        if let Some(location) = &self.location {
            event.location = location.clone();
        }
        if let Some(landmark) = &self.landmark_name {
            event.landmark_name = landmark.clone();
        }
        if let Some(user_name) = &self.user_name {
            event.user_name = user_name.clone();
        }
        if let Some(email) = &self.email {
            event.email = email.clone();
        }
        if let Some(start) = self.start_date {
            event.start_date = start;
        }
        if let Some(end) = self.end_date {
            event.end_date = end;
        }
    }
}

/// Acknowledgement body for deletes. Backends may send nothing at all.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GeocodeResult {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub place_type: Option<String>,
    pub address: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReverseGeocodeResult {
    pub name: String,
    pub address: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use serde_json::json;

    fn sample_json() -> serde_json::Value {
        json!({
            "id": 42,
            "role": "admin",
            "event_name": "City Marathon",
            "desc": "42km through downtown",
            "location": "12.99,80.22",
            "landmark_name": null,
            "user_name": "Asha",
            "email": "asha@example.com",
            "start_date": "2025-10-08T00:00:00",
            "end_date": "0000-00-00",
            "is_deleted": false
        })
    }

    #[test]
    fn decodes_backend_event() {
        let event: Event = serde_json::from_value(sample_json()).expect("decode event");
        assert_eq!(event.id.as_str(), "42");
        assert_eq!(event.role, Role::Admin);
        assert_eq!(event.landmark_name, "");
        assert_eq!(
            event.start_date,
            NaiveDate::from_ymd_opt(2025, 10, 8).expect("date")
        );
        assert!(event.end_date.is_open());
    }

    #[test]
    fn missing_role_and_end_date_fall_back() {
        let mut value = sample_json();
        let object = value.as_object_mut().expect("object");
        object.remove("role");
        object.remove("end_date");
        let event: Event = serde_json::from_value(value).expect("decode event");
        assert_eq!(event.role, Role::User);
        assert_eq!(event.end_date, EndDate::Open);
    }

    #[test]
    fn rejects_empty_end_date_and_unknown_role() {
        let mut value = sample_json();
        value["end_date"] = json!("");
        assert!(serde_json::from_value::<Event>(value).is_err());

        let mut value = sample_json();
        value["role"] = json!("superuser");
        assert!(serde_json::from_value::<Event>(value).is_err());
    }

    #[test]
    fn draft_payload_applies_defaults() {
        let draft = EventDraft {
            role: None,
            event_name: "5-a-side".to_string(),
            desc: "Evening football".to_string(),
            location: "12.99,80.22".to_string(),
            landmark_name: None,
            user_name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 11, 1).expect("date"),
            end_date: None,
        };
        let body = serde_json::to_value(draft.payload()).expect("encode payload");
        assert_eq!(body["role"], "user");
        assert_eq!(body["landmark_name"], "");
        assert_eq!(body["start_date"], "2025-11-01");
        assert_eq!(body["end_date"], NO_END_DATE);
        assert_eq!(body["is_deleted"], false);
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut event: Event = serde_json::from_value(sample_json()).expect("decode event");
        let patch = EventPatch {
            desc: Some("Half marathon".to_string()),
            end_date: Some(EndDate::On(NaiveDate::from_ymd_opt(2025, 10, 9).expect("date"))),
            ..EventPatch::default()
        };
        patch.apply_to(&mut event);
        assert_eq!(event.desc, "Half marathon");
        assert_eq!(event.event_name, "City Marathon");
        assert_eq!(
            serde_json::to_value(&patch).expect("encode patch"),
            json!({ "desc": "Half marathon", "end_date": "2025-10-09" })
        );
    }

    #[test]
    fn wire_dates_accept_timestamps_only_with_separator() {
        assert!(parse_wire_date("2025-01-02").is_some());
        assert!(parse_wire_date("2025-01-02 10:00:00").is_some());
        assert!(parse_wire_date("2025-01-02x").is_none());
        assert!(parse_wire_date("0000-00-00").is_none());
    }

    #[test]
    fn zoned_timestamps_use_the_local_calendar_day() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("date");
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).expect("offset");
        let est = FixedOffset::west_opt(5 * 3600).expect("offset");

        assert_eq!(
            parse_wire_date_in("2025-10-07T18:30:00.000Z", &ist),
            Some(date(2025, 10, 8))
        );
        assert_eq!(
            parse_wire_date_in("2025-10-08T02:00:00Z", &est),
            Some(date(2025, 10, 7))
        );
        assert_eq!(
            parse_wire_date_in("2025-10-08T00:00:00+05:30", &Utc),
            Some(date(2025, 10, 7))
        );
        assert_eq!(
            parse_wire_date_in("2025-10-08T23:00:00", &est),
            Some(date(2025, 10, 8))
        );
    }
}

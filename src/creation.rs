//! Three-step event creation: details, location, review, then submit.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiError;
use crate::location::Coordinates;
use crate::models::{Event, EventDraft, Role, NO_END_DATE};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Client-side guard failures. Never sent to the server.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingFields,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter a valid date")]
    InvalidDate,
    #[error("Please select a location")]
    MissingLocation,
    #[error("Please review the event before creating it")]
    NotReviewed,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Details,
    Location,
    Review,
    Submitting,
}

/// Free-text fields the details step edits.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    EventName,
    Desc,
    UserName,
    Email,
    StartDate,
    EndDate,
    LandmarkName,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct DraftForm {
    pub role: Role,
    pub event_name: String,
    pub desc: String,
    pub location: String,
    pub landmark_name: String,
    pub user_name: String,
    pub email: String,
    pub start_date: String,
    pub end_date: String,
}

impl DraftForm {
    fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::EventName => &mut self.event_name,
            FormField::Desc => &mut self.desc,
            FormField::UserName => &mut self.user_name,
            FormField::Email => &mut self.email,
            FormField::StartDate => &mut self.start_date,
            FormField::EndDate => &mut self.end_date,
            FormField::LandmarkName => &mut self.landmark_name,
        }
    }

    fn check_details(&self) -> Result<(NaiveDate, Option<NaiveDate>), ValidationError> {
        let required = [
            &self.event_name,
            &self.desc,
            &self.user_name,
            &self.email,
            &self.start_date,
        ];
        if required.iter().any(|value| value.trim().is_empty()) {
            return Err(ValidationError::MissingFields);
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }
        let start = parse_form_date(&self.start_date).ok_or(ValidationError::InvalidDate)?;
        let end = match self.end_date.trim() {
            "" | NO_END_DATE => None,
            raw => Some(parse_form_date(raw).ok_or(ValidationError::InvalidDate)?),
        };
        Ok((start, end))
    }

    fn to_draft(&self) -> Result<EventDraft, ValidationError> {
        let (start_date, end_date) = self.check_details()?;
        if self.location.trim().is_empty() {
            return Err(ValidationError::MissingLocation);
        }
        let landmark = self.landmark_name.trim();
        Ok(EventDraft {
            role: Some(self.role),
            event_name: self.event_name.trim().to_string(),
            desc: self.desc.trim().to_string(),
            location: self.location.clone(),
            landmark_name: (!landmark.is_empty()).then(|| landmark.to_string()),
            user_name: self.user_name.trim().to_string(),
            email: self.email.trim().to_string(),
            start_date,
            end_date,
        })
    }
}

fn parse_form_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct CreationFlow {
    step: Step,
    form: DraftForm,
    error: Option<String>,
}

impl CreationFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn form(&self) -> &DraftForm {
        &self.form
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.step == Step::Submitting
    }

    /// Drops everything entered so far.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        if self.is_submitting() {
            return;
        }
        *self.form.field_mut(field) = value.into();
    }

    pub fn set_role(&mut self, role: Role) {
        if !self.is_submitting() {
            self.form.role = role;
        }
    }

    fn fail<T>(&mut self, err: ValidationError) -> Result<T, ValidationError> {
        self.error = Some(err.to_string());
        Err(err)
    }

    pub fn next(&mut self) -> Result<Step, ValidationError> {
        self.error = None;
        match self.step {
            Step::Details => {
                if let Err(err) = self.form.check_details() {
                    return self.fail(err);
                }
                self.step = Step::Location;
            }
            Step::Location => {
                if self.form.location.trim().is_empty() {
                    return self.fail(ValidationError::MissingLocation);
                }
                self.step = Step::Review;
            }
            Step::Review | Step::Submitting => {}
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> Step {
        self.error = None;
        self.step = match self.step {
            Step::Details | Step::Location => Step::Details,
            Step::Review => Step::Location,
            Step::Submitting => Step::Submitting,
        };
        self.step
    }

    /// Records a picked point and jumps straight to review. Without a place
    /// name the rounded coordinates become the landmark label. Non-finite
    /// points are refused and leave the step where it was.
    pub fn select_location(&mut self, coords: Coordinates, name: Option<String>) -> bool {
        if !matches!(self.step, Step::Location | Step::Review) {
            return false;
        }
        if !coords.lat.is_finite() || !coords.lng.is_finite() {
            self.error = Some(ValidationError::MissingLocation.to_string());
            return false;
        }
        self.form.location = coords.token();
        self.form.landmark_name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| coords.display());
        self.error = None;
        self.step = Step::Review;
        true
    }

    /// Moves review to submitting and hands back the draft to send.
    pub fn begin_submit(&mut self) -> Result<EventDraft, ValidationError> {
        if self.step != Step::Review {
            return Err(ValidationError::NotReviewed);
        }
        match self.form.to_draft() {
            Ok(draft) => {
                self.error = None;
                self.step = Step::Submitting;
                Ok(draft)
            }
            Err(err) => self.fail(err),
        }
    }

    /// On success the flow resets and the created event is returned; on
    /// failure the form is kept on review with the server's message.
    pub fn complete_submit(&mut self, result: Result<Event, ApiError>) -> Option<Event> {
        if self.step != Step::Submitting {
            return None;
        }
        match result {
            Ok(event) => {
                self.reset();
                Some(event)
            }
            Err(err) => {
                self.step = Step::Review;
                self.error = Some(err.message().to_string());
                None
            }
        }
    }
}

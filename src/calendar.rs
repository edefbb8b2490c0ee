//! Upcoming events from a Google calendar.
//!
//! A stored OAuth refresh token is exchanged for an access token on every
//! request, then the events list is fetched and flattened into millisecond
//! timestamps for the frontend.

use chrono::{DateTime, NaiveDate, Utc};
use derive_builder::Builder;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

/// Only the first few upcoming items are considered.
const MAX_ITEMS: usize = 6;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar credentials are not configured")]
    NotConfigured,
    #[error("could not get events from google: {0}")]
    Request(#[from] reqwest::Error),
    #[error("google answered {url} with {status}")]
    Status { url: String, status: StatusCode },
    #[error("invalid calendar event {name:?}: {reason}")]
    InvalidEvent { name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub name: String,
    pub date: i64,
    pub start_time: i64,
    pub end_time: i64,
    pub frequency: String,
}

#[derive(Clone, Builder)]
pub struct CalendarClient {
    #[builder(setter(into))]
    client_id: String,
    #[builder(setter(into))]
    client_secret: String,
    #[builder(setter(into))]
    refresh_token: String,
    #[builder(setter(into))]
    calendar_id: String,
    #[builder(setter(into), default = "GOOGLE_TOKEN_URL.to_string()")]
    token_url: String,
    #[builder(setter(into), default = "GOOGLE_CALENDAR_API.to_string()")]
    api_base_url: String,
    #[builder(default)]
    client: reqwest::Client,
}

impl std::fmt::Debug for CalendarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("calendar_id", &self.calendar_id)
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<EventItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventItem {
    #[serde(default)]
    status: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    start: EventTime,
    #[serde(default)]
    end: EventTime,
    #[serde(default)]
    recurrence: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date: Option<String>,
    date_time: Option<String>,
}

impl CalendarClient {
    pub async fn upcoming_events(&self) -> Result<Vec<CalendarEvent>, CalendarError> {
        let now = Utc::now();
        let token = self.access_token().await?;

        let url = format!(
            "{}/calendars/{}/events",
            self.api_base_url.trim_end_matches('/'),
            self.calendar_id
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("timeMin", now.to_rfc3339())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::Status { url, status });
        }

        let list: EventList = response.json().await?;
        debug!(count = list.items.len(), "calendar events received");

        to_calendar_events(list.items, now.timestamp_millis())
    }

    async fn access_token(&self) -> Result<String, CalendarError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::Status {
                url: self.token_url.clone(),
                status,
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

fn to_calendar_events(
    items: Vec<EventItem>,
    now: i64,
) -> Result<Vec<CalendarEvent>, CalendarError> {
    let mut events = vec![];
    for item in items.into_iter().take(MAX_ITEMS) {
        if item.status == "cancelled" {
            continue;
        }
        events.push(to_calendar_event(item)?);
    }

    events.retain(|event| event.date > now);
    events.sort_by_key(|event| event.date);
    Ok(events)
}

fn to_calendar_event(item: EventItem) -> Result<CalendarEvent, CalendarError> {
    let invalid = |reason: String| CalendarError::InvalidEvent {
        name: item.summary.clone(),
        reason,
    };

    let (date, start_time, end_time) = match item.start.date.as_deref() {
        Some(day) if !day.is_empty() => {
            let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map_err(|e| invalid(e.to_string()))?
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| invalid(format!("no midnight on {day}")))?
                .and_utc()
                .timestamp_millis();
            (date, 0, 0)
        }
        _ => {
            let start = parse_millis(item.start.date_time.as_deref()).map_err(&invalid)?;
            let end = parse_millis(item.end.date_time.as_deref()).map_err(&invalid)?;
            (start, start, end)
        }
    };

    Ok(CalendarEvent {
        frequency: item.recurrence.first().cloned().unwrap_or_default(),
        name: item.summary,
        date,
        start_time,
        end_time,
    })
}

fn parse_millis(value: Option<&str>) -> Result<i64, String> {
    let value = value.ok_or_else(|| "missing dateTime".to_string())?;
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.timestamp_millis())
        .map_err(|e| format!("{value}: {e}"))
}

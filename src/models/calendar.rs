use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EventStart {
    Timed(DateTime<FixedOffset>),
    AllDay(NaiveDate),
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: EventStart,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// One line of the calendar rail, whichever source it came from.
#[derive(Debug, Clone, Serialize)]
pub struct RailItem {
    pub title: String,
    pub date_label: String,
    pub time_label: Option<String>,
    pub location: Option<String>,
}

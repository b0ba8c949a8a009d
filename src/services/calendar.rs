use chrono::{DateTime, Duration, FixedOffset, NaiveDate, SecondsFormat, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::config::CalendarConfig;
use crate::error::FetchError;
use crate::models::calendar::{CalendarEvent, EventStart};
use crate::services::upstream;

pub const SERVICE: &str = "google_calendar";
const LOOKAHEAD_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<EventItem>,
}

#[derive(Debug, Deserialize)]
struct EventItem {
    id: String,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start: Option<EventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: Option<DateTime<FixedOffset>>,
    date: Option<NaiveDate>,
}

impl EventItem {
    fn into_event(self) -> Option<CalendarEvent> {
        let start = match self.start? {
            EventTime { date_time: Some(at), .. } => EventStart::Timed(at),
            EventTime { date: Some(day), .. } => EventStart::AllDay(day),
            _ => return None,
        };
        Some(CalendarEvent {
            id: self.id,
            title: self.summary.unwrap_or_else(|| "(untitled)".into()),
            start,
            location: self.location.filter(|s| !s.trim().is_empty()),
            description: self.description,
        })
    }
}

pub struct CalendarService {
    client: Client,
    config: Option<CalendarConfig>,
}

impl CalendarService {
    pub fn new(client: Client, config: Option<CalendarConfig>) -> Self {
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Single (expanded) events starting within the next seven days.
    pub async fn try_upcoming_events(&self, now: DateTime<Utc>) -> Result<Vec<CalendarEvent>, FetchError> {
        let config = self
            .config
            .as_ref()
            .ok_or(FetchError::NotConfigured("google calendar"))?;

        let mut url = Url::parse(&config.api_url)
            .map_err(|e| FetchError::malformed(SERVICE, format!("invalid api url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::malformed(SERVICE, "api url cannot be a base"))?
            .pop_if_empty()
            .extend(["calendars", config.calendar_id.as_str(), "events"]);

        let time_min = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = (now + Duration::days(LOOKAHEAD_DAYS)).to_rfc3339_opts(SecondsFormat::Secs, true);
        let response = self
            .client
            .get(url)
            .query(&[
                ("key", config.api_key.as_str()),
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await?;
        let list: EventList = upstream::read_json(SERVICE, response).await?;

        Ok(list.items.into_iter().filter_map(EventItem::into_event).collect())
    }

    pub async fn upcoming_events(&self, now: DateTime<Utc>) -> Vec<CalendarEvent> {
        upstream::or_default(SERVICE, self.try_upcoming_events(now).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::upstream::test_support::serve;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn service(base: &str) -> CalendarService {
        CalendarService::new(
            Client::new(),
            Some(CalendarConfig {
                calendar_id: "school@group.calendar.google.com".into(),
                api_key: "key-1".into(),
                api_url: format!("{base}/calendar/v3"),
            }),
        )
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-10T13:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[tokio::test]
    async fn unconfigured_calendar_returns_no_events() {
        let calendar = CalendarService::new(Client::new(), None);
        assert!(matches!(
            calendar.try_upcoming_events(now()).await,
            Err(FetchError::NotConfigured(_))
        ));
        assert!(calendar.upcoming_events(now()).await.is_empty());
    }

    #[tokio::test]
    async fn requests_a_seven_day_window_and_maps_both_start_kinds() {
        let router = Router::new().route(
            "/calendar/v3/calendars/{id}/events",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params["key"], "key-1");
                assert_eq!(params["timeMin"], "2024-06-10T13:00:00Z");
                assert_eq!(params["timeMax"], "2024-06-17T13:00:00Z");
                assert_eq!(params["singleEvents"], "true");
                Json(json!({ "items": [
                    { "id": "e1", "summary": "Mass", "location": "Church",
                      "start": { "dateTime": "2024-06-11T08:15:00-05:00" } },
                    { "id": "e2", "summary": "No School", "start": { "date": "2024-06-14" } },
                    { "id": "e3", "summary": "Broken" }
                ]}))
            }),
        );
        let calendar = service(&serve(router).await);

        let events = calendar.upcoming_events(now()).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].start, EventStart::Timed(_)));
        assert_eq!(events[0].location.as_deref(), Some("Church"));
        assert_eq!(
            events[1].start,
            EventStart::AllDay(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap())
        );
    }

    #[tokio::test]
    async fn error_status_degrades_to_empty() {
        let router = Router::new().route(
            "/calendar/v3/calendars/{id}/events",
            get(|| async { (StatusCode::NOT_FOUND, "Not Found") }),
        );
        let calendar = service(&serve(router).await);
        assert!(calendar.upcoming_events(now()).await.is_empty());
    }
}

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::models::announcement::AnnouncementBuckets;
use crate::models::calendar::{CalendarEvent, EventStart, RailItem};
use crate::models::media::GalleryItem;
use crate::models::schedule::ScheduleEntry;
use crate::models::sports::HomeAway;
use crate::models::weather::WeatherSnapshot;
use crate::services::{clock, schedule};
use crate::AppState;

/// Everything one page render needs, fetched in a single pass.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: NaiveDateTime,
    pub weather: Option<WeatherSnapshot>,
    pub announcements: AnnouncementBuckets,
    pub schedule: Vec<ScheduleEntry>,
    pub rail: Vec<RailItem>,
    pub gallery: Vec<GalleryItem>,
}

impl DashboardSnapshot {
    pub fn empty(generated_at: NaiveDateTime) -> Self {
        Self {
            generated_at,
            weather: None,
            announcements: AnnouncementBuckets::default(),
            schedule: Vec::new(),
            rail: Vec::new(),
            gallery: Vec::new(),
        }
    }
}

/// Fetch every zone concurrently. A failing source only empties its own
/// zone; the accessors never return errors here.
pub async fn load(state: &AppState, now: DateTime<Local>) -> DashboardSnapshot {
    let local_now = now.naive_local();
    let sheets_configured = state.sheets.is_configured();

    let (weather, announcements, ticker, gallery, sheets, events) = tokio::join!(
        state.weather.current(),
        state.contentful.announcements(now.fixed_offset()),
        state.contentful.sports_ticker(),
        state.contentful.photo_gallery(),
        state.sheets.all_tabs(),
        async {
            // The spreadsheet supersedes the calendar for the rail.
            if sheets_configured {
                Vec::new()
            } else {
                state.calendar.upcoming_events(now.with_timezone(&Utc)).await
            }
        },
    );

    // Rows are normalized once so dropped rows are counted once.
    let sheet_schedule = schedule::windowed(schedule::entries_from_sheets(&sheets), local_now);
    let rail = if sheets_configured {
        rail_from_schedule(&sheet_schedule, local_now.date())
    } else {
        rail_from_events(&events)
    };
    let ticker_entries = ticker.as_ref().map(schedule::entries_from_ticker).unwrap_or_default();
    let schedule = schedule::windowed(sheet_schedule.into_iter().chain(ticker_entries), local_now);

    let gallery = if gallery.is_empty() && state.drive.is_configured() {
        state
            .drive
            .images()
            .await
            .into_iter()
            .filter_map(|image| image.into_gallery_item())
            .collect()
    } else {
        gallery
    };

    DashboardSnapshot {
        generated_at: local_now,
        weather,
        announcements: AnnouncementBuckets::partition(announcements),
        schedule,
        rail,
        gallery,
    }
}

/// Rail entries from the spreadsheet: today onwards only.
pub fn rail_from_schedule(entries: &[ScheduleEntry], today: NaiveDate) -> Vec<RailItem> {
    entries
        .iter()
        .filter(|entry| entry.starts_at.date() >= today)
        .map(|entry| RailItem {
            title: match (&entry.opponent, entry.home_away) {
                (Some(opponent), Some(HomeAway::Away)) => format!("{} @ {}", entry.label, opponent),
                (Some(opponent), _) => format!("{} vs {}", entry.label, opponent),
                (None, _) => entry.label.clone(),
            },
            date_label: format!("{}, {} {}", entry.weekday, entry.month, entry.day),
            time_label: entry.time_label.clone(),
            location: entry.location.clone(),
        })
        .collect()
}

pub fn rail_from_events(events: &[CalendarEvent]) -> Vec<RailItem> {
    events
        .iter()
        .map(|event| {
            let (date_label, time_label) = match &event.start {
                EventStart::Timed(at) => {
                    let local = at.naive_local();
                    (
                        local.format("%a, %b %-d").to_string(),
                        Some(clock::format_time(local.time())),
                    )
                }
                EventStart::AllDay(day) => (day.format("%a, %b %-d").to_string(), None),
            };
            RailItem {
                title: event.title.clone(),
                date_label,
                time_label,
                location: event.location.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::schedule::SheetData;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn entry(label: &str, opponent: Option<&str>, home_away: Option<HomeAway>, at: NaiveDateTime) -> ScheduleEntry {
        let data: SheetData = [(
            label.to_string(),
            vec![BTreeMap::from([("Date".to_string(), at.format("%m/%d/%Y").to_string())])],
        )]
        .into_iter()
        .collect();
        let mut entry = schedule::entries_from_sheets(&data).remove(0);
        entry.opponent = opponent.map(str::to_string);
        entry.home_away = home_away;
        entry
    }

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn schedule_rail_skips_past_days_and_formats_titles() {
        let entries = vec![
            entry("Soccer", Some("Trinity"), None, day(7)),
            entry("Baseball", Some("Fenwick"), Some(HomeAway::Away), day(10)),
            entry("Track", None, None, day(14)),
        ];
        let rail = rail_from_schedule(&entries, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        let titles: Vec<_> = rail.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Baseball @ Fenwick", "Track"]);
        assert_eq!(rail[0].date_label, "Mon, Jun 10");
        assert_eq!(rail[1].time_label, None);
    }

    #[test]
    fn calendar_rail_shows_time_only_for_timed_events() {
        let events = vec![
            CalendarEvent {
                id: "1".into(),
                title: "Mass".into(),
                start: EventStart::Timed(DateTime::parse_from_rfc3339("2024-06-11T08:15:00-05:00").unwrap()),
                location: Some("Church".into()),
                description: None,
            },
            CalendarEvent {
                id: "2".into(),
                title: "No School".into(),
                start: EventStart::AllDay(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()),
                location: None,
                description: None,
            },
        ];
        let rail = rail_from_events(&events);
        assert_eq!(rail[0].date_label, "Tue, Jun 11");
        assert_eq!(rail[0].time_label.as_deref(), Some("8:15 AM"));
        assert_eq!(rail[1].date_label, "Fri, Jun 14");
        assert_eq!(rail[1].time_label, None);
    }

    #[tokio::test]
    async fn unconfigured_sources_give_an_empty_snapshot() {
        let config = Config::from_lookup(|_| None).unwrap();
        let state = AppState::new(config).unwrap();
        let now = Local.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();

        let snapshot = load(&state, now).await;
        assert_eq!(snapshot.generated_at, now.naive_local());
        assert!(snapshot.weather.is_none());
        assert!(snapshot.announcements.school.is_empty());
        assert!(snapshot.schedule.is_empty());
        assert!(snapshot.rail.is_empty());
        assert!(snapshot.gallery.is_empty());
    }
}

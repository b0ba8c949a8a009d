//! Normalization of loosely formatted schedule rows (spreadsheet tabs and the
//! content platform's sports ticker) into one time-windowed, ordered list.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::schedule::{ScheduleEntry, ScheduleRow, SheetData};
use crate::models::sports::{HomeAway, SportsTicker};
use crate::services::{clock, metrics};

const DATE_HEADERS: &[&str] = &["Date"];
const TIME_HEADERS: &[&str] = &["Time", "Start Time"];
const OPPONENT_HEADERS: &[&str] = &["Opponent", "Event", "Title"];
const LOCATION_HEADERS: &[&str] = &["Location"];
const HOME_AWAY_HEADERS: &[&str] = &["Home/Away", "Home or Away", "H/A"];
const SCS_SCORE_HEADERS: &[&str] = &["SCS Score", "Score"];
const OPPONENT_SCORE_HEADERS: &[&str] = &["Opponent Score"];
const PLACE_HEADERS: &[&str] = &["Place"];

const WINDOW_PAST_DAYS: i64 = 7;
const WINDOW_FUTURE_DAYS: i64 = 21;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedDate {
    Parsed { at: NaiveDateTime, all_day: bool },
    Unparseable(String),
}

/// Accepts `M/D/YYYY`, `YYYY-MM-DD` and ISO date-times with or without an
/// offset. Offset date-times keep their wall-clock time.
pub fn parse_date(text: &str) -> ParsedDate {
    let s = text.trim();
    if s.is_empty() {
        return ParsedDate::Unparseable(text.to_string());
    }

    let day = |date: NaiveDate| ParsedDate::Parsed {
        at: date.and_time(NaiveTime::MIN),
        all_day: true,
    };
    let timed = |at: NaiveDateTime| ParsedDate::Parsed { at, all_day: false };

    if s.contains('/') {
        // chrono reads "24" as year 24; only four-digit years are accepted.
        let four_digit_year = s
            .rsplit('/')
            .next()
            .is_some_and(|year| year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()));
        return match NaiveDate::parse_from_str(s, "%m/%d/%Y") {
            Ok(date) if four_digit_year => day(date),
            _ => ParsedDate::Unparseable(text.to_string()),
        };
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return timed(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
        return timed(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(s, format) {
            return timed(at);
        }
    }
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(date) => day(date),
        Err(_) => ParsedDate::Unparseable(text.to_string()),
    }
}

/// Accepts `H:MM am|pm` (any case, optional space) or 24-hour `H:MM`.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    if compact.is_empty() {
        return None;
    }
    if compact.ends_with("AM") || compact.ends_with("PM") {
        NaiveTime::parse_from_str(&compact, "%I:%M%p").ok()
    } else {
        NaiveTime::parse_from_str(&compact, "%H:%M").ok()
    }
}

/// Rolling window relative to "now", both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ScheduleWindow {
    pub fn around(now: NaiveDateTime) -> Self {
        Self {
            start: now - Duration::days(WINDOW_PAST_DAYS),
            end: now + Duration::days(WINDOW_FUTURE_DAYS),
        }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

struct EntryParts {
    id: String,
    label: String,
    date_text: String,
    time_text: Option<String>,
    opponent: Option<String>,
    home_away: Option<HomeAway>,
    location: Option<String>,
    score: Option<(String, String)>,
    place: Option<u32>,
}

fn normalize(parts: EntryParts) -> Option<ScheduleEntry> {
    let (mut at, mut all_day) = match parse_date(&parts.date_text) {
        ParsedDate::Parsed { at, all_day } => (at, all_day),
        ParsedDate::Unparseable(original) => {
            tracing::debug!("Dropping schedule row {} with unparseable date {:?}", parts.id, original);
            metrics::DROPPED_ROWS_COUNTER.inc();
            return None;
        }
    };
    if let Some(time) = parts.time_text.as_deref().and_then(parse_time) {
        at = at.date().and_time(time);
        all_day = false;
    }

    Some(ScheduleEntry {
        id: parts.id,
        label: parts.label,
        opponent: parts.opponent,
        home_away: parts.home_away,
        date_text: parts.date_text,
        starts_at: at,
        all_day,
        time_label: (!all_day).then(|| clock::format_time(at.time())),
        location: parts.location,
        score: parts.score,
        place: parts.place,
        day: at.day(),
        month: at.format("%b").to_string(),
        weekday: at.format("%a").to_string(),
    })
}

/// Normalize every spreadsheet row; rows without a usable date are dropped.
pub fn entries_from_sheets(data: &SheetData) -> Vec<ScheduleEntry> {
    data.iter()
        .flat_map(|(sheet, rows)| {
            rows.iter().enumerate().map(move |(i, cells)| ScheduleRow {
                sheet: sheet.clone(),
                // Header is spreadsheet row 1.
                row: i + 2,
                cells: cells.clone(),
            })
        })
        .filter_map(|row| normalize(row_parts(&row)))
        .collect()
}

fn row_parts(row: &ScheduleRow) -> EntryParts {
    let owned = |aliases: &[&str]| row.cell(aliases).map(str::to_string);
    let score = match (row.cell(SCS_SCORE_HEADERS), row.cell(OPPONENT_SCORE_HEADERS)) {
        (Some(ours), Some(theirs)) => Some((ours.to_string(), theirs.to_string())),
        _ => None,
    };
    EntryParts {
        id: format!("{}:{}", row.sheet, row.row),
        label: row.sheet.clone(),
        date_text: owned(DATE_HEADERS).unwrap_or_default(),
        time_text: owned(TIME_HEADERS),
        opponent: owned(OPPONENT_HEADERS),
        home_away: row.cell(HOME_AWAY_HEADERS).and_then(HomeAway::parse),
        location: owned(LOCATION_HEADERS),
        score,
        place: row.cell(PLACE_HEADERS).and_then(|p| p.parse().ok()),
    }
}

/// Flatten the content platform's team → games structure into entries.
pub fn entries_from_ticker(ticker: &SportsTicker) -> Vec<ScheduleEntry> {
    ticker
        .teams
        .iter()
        .flat_map(|team| {
            team.games.iter().map(move |game| EntryParts {
                id: game.id.clone(),
                label: team.name.clone(),
                date_text: game.date.clone(),
                time_text: None,
                opponent: game.opponent.clone(),
                home_away: game.location,
                location: None,
                score: game.scs_score.clone().zip(game.opponent_score.clone()),
                place: game.place,
            })
        })
        .filter_map(normalize)
        .collect()
}

/// Keep entries inside the rolling window around `now`, ordered by start
/// time. The sort is stable, so ties keep their input order.
pub fn windowed(entries: impl IntoIterator<Item = ScheduleEntry>, now: NaiveDateTime) -> Vec<ScheduleEntry> {
    let window = ScheduleWindow::around(now);
    let mut entries: Vec<ScheduleEntry> = entries
        .into_iter()
        .filter(|entry| window.contains(entry.starts_at))
        .collect();
    entries.sort_by_key(|entry| entry.starts_at);
    entries
}

/// The full schedule shown by the ticker: spreadsheet rows and ticker games.
pub fn derive_schedule(
    sheets: &SheetData,
    ticker: Option<&SportsTicker>,
    now: NaiveDateTime,
) -> Vec<ScheduleEntry> {
    let mut entries = entries_from_sheets(sheets);
    if let Some(ticker) = ticker {
        entries.extend(entries_from_ticker(ticker));
    }
    windowed(entries, now)
}

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::sports::HomeAway;

/// Spreadsheet contents: tab name → rows, each row header → cell text.
pub type SheetData = BTreeMap<String, Vec<BTreeMap<String, String>>>;

/// One raw spreadsheet row, tagged with the tab it came from.
#[derive(Debug, Clone)]
pub struct ScheduleRow {
    pub sheet: String,
    pub row: usize,
    pub cells: BTreeMap<String, String>,
}

impl ScheduleRow {
    /// Case-insensitive, whitespace-tolerant cell lookup over header aliases.
    /// Earlier aliases win; blank cells count as missing.
    pub fn cell(&self, aliases: &[&str]) -> Option<&str> {
        aliases.iter().find_map(|alias| {
            self.cells
                .iter()
                .filter(|(header, _)| header.trim().eq_ignore_ascii_case(alias))
                .map(|(_, value)| value.trim())
                .find(|value| !value.is_empty())
        })
    }
}


/// A normalized, dated schedule item ready for the ticker and calendar rail.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
    pub id: String,
    pub label: String,
    pub opponent: Option<String>,
    pub home_away: Option<HomeAway>,
    pub date_text: String,
    pub starts_at: NaiveDateTime,
    pub all_day: bool,
    pub time_label: Option<String>,
    pub location: Option<String>,
    pub score: Option<(String, String)>,
    pub place: Option<u32>,
    pub day: u32,
    pub month: String,
    pub weekday: String,
}

//! Display formatting for the header clock and schedule labels.

use chrono::{NaiveDateTime, NaiveTime, Timelike};

/// `h:MM AM` with no leading zero on the hour.
pub fn format_time(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    format!("{}:{:02} {}", hour, time.minute(), if pm { "PM" } else { "AM" })
}

/// Header date, e.g. `Monday, June 10`.
pub fn format_date(now: NaiveDateTime) -> String {
    now.format("%A, %B %-d").to_string()
}

/// Ticker date, e.g. `June 15 at 4:30 PM`, or `June 15` for all-day entries.
pub fn format_ticker_date(starts_at: NaiveDateTime, all_day: bool) -> String {
    let date = starts_at.format("%B %-d").to_string();
    if all_day {
        date
    } else {
        format!("{} at {}", date, format_time(starts_at.time()))
    }
}

/// Finishing place of a meet, e.g. `1st place`, `12th place`, `22nd place`.
pub fn place_text(place: u32) -> Option<String> {
    if place == 0 {
        return None;
    }
    let suffix = match (place % 10, place % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    Some(format!("{place}{suffix} place"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn twelve_hour_clock() {
        assert_eq!(format_time(at(0, 5).time()), "12:05 AM");
        assert_eq!(format_time(at(9, 30).time()), "9:30 AM");
        assert_eq!(format_time(at(12, 0).time()), "12:00 PM");
        assert_eq!(format_time(at(15, 7).time()), "3:07 PM");
    }

    #[test]
    fn header_and_ticker_dates() {
        assert_eq!(format_date(at(8, 0)), "Monday, June 10");
        assert_eq!(format_ticker_date(at(16, 30), false), "June 10 at 4:30 PM");
        assert_eq!(format_ticker_date(at(0, 0), true), "June 10");
    }

    #[test]
    fn ordinal_places() {
        assert_eq!(place_text(0), None);
        assert_eq!(place_text(1).as_deref(), Some("1st place"));
        assert_eq!(place_text(2).as_deref(), Some("2nd place"));
        assert_eq!(place_text(3).as_deref(), Some("3rd place"));
        assert_eq!(place_text(4).as_deref(), Some("4th place"));
        assert_eq!(place_text(11).as_deref(), Some("11th place"));
        assert_eq!(place_text(13).as_deref(), Some("13th place"));
        assert_eq!(place_text(22).as_deref(), Some("22nd place"));
    }
}

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::rich_text::RichTextNode;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AnnouncementCategory {
    School,
    Athletics,
    Other(String),
}

impl From<&str> for AnnouncementCategory {
    fn from(s: &str) -> Self {
        match s.trim() {
            "School" => Self::School,
            "Athletics" => Self::Athletics,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: String,
    pub eyebrow_text: Option<String>,
    pub headline: String,
    pub category: AnnouncementCategory,
    pub body: Option<RichTextNode>,
    pub publish_date: DateTime<FixedOffset>,
    pub unpublish_date: Option<DateTime<FixedOffset>>,
}

impl Announcement {
    /// Published at or before `now` and not yet unpublished.
    pub fn is_live_at(&self, now: DateTime<FixedOffset>) -> bool {
        self.publish_date <= now && self.unpublish_date.map_or(true, |end| end > now)
    }
}

/// Announcements split into the two page zones that show them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnnouncementBuckets {
    pub school: Vec<Announcement>,
    pub athletics: Vec<Announcement>,
}

impl AnnouncementBuckets {
    /// Order is preserved within each bucket; other categories are dropped.
    pub fn partition(announcements: Vec<Announcement>) -> Self {
        let mut buckets = Self::default();
        for announcement in announcements {
            match announcement.category {
                AnnouncementCategory::School => buckets.school.push(announcement),
                AnnouncementCategory::Athletics => buckets.athletics.push(announcement),
                AnnouncementCategory::Other(_) => {}
            }
        }
        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announcement(id: &str, category: &str) -> Announcement {
        Announcement {
            id: id.into(),
            eyebrow_text: None,
            headline: format!("Headline {id}"),
            category: category.into(),
            body: None,
            publish_date: DateTime::parse_from_rfc3339("2024-06-01T08:00:00-05:00").unwrap(),
            unpublish_date: Some(DateTime::parse_from_rfc3339("2024-06-20T08:00:00-05:00").unwrap()),
        }
    }

    #[test]
    fn partition_keeps_order_and_drops_unknown_categories() {
        let buckets = AnnouncementBuckets::partition(vec![
            announcement("a", "School"),
            announcement("b", "Athletics"),
            announcement("c", "Fundraising"),
            announcement("d", "School"),
        ]);
        let school: Vec<_> = buckets.school.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(school, vec!["a", "d"]);
        assert_eq!(buckets.athletics.len(), 1);
    }

    #[test]
    fn live_window_excludes_unpublish_instant() {
        let a = announcement("a", "School");
        let before = DateTime::parse_from_rfc3339("2024-05-31T08:00:00-05:00").unwrap();
        let during = DateTime::parse_from_rfc3339("2024-06-10T08:00:00-05:00").unwrap();
        let end = DateTime::parse_from_rfc3339("2024-06-20T08:00:00-05:00").unwrap();
        assert!(!a.is_live_at(before));
        assert!(a.is_live_at(during));
        assert!(!a.is_live_at(end));
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    Article,
    Video,
    Bookmark,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Article => "article",
            ItemType::Video => "video",
            ItemType::Bookmark => "bookmark",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "article" => Ok(ItemType::Article),
            "video" => Ok(ItemType::Video),
            "bookmark" => Ok(ItemType::Bookmark),
            other => Err(format!("unknown item type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Unread,
    Read,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Unread => "unread",
            ItemStatus::Read => "read",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "unread" => Ok(ItemStatus::Unread),
            "read" => Ok(ItemStatus::Read),
            other => Err(format!("unknown item status: {other}")),
        }
    }
}

/// One saved link with its metadata and read state.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub tags: Option<String>,
    pub notes: Option<String>,
    pub status: ItemStatus,
    pub added_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub url: String,
    pub title: Option<String>,
    pub item_type: ItemType,
    pub tags: Option<String>,
    pub notes: Option<String>,
}

/// Sparse field update: only present fields are written.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemUpdate {
    pub title: Option<String>,
    pub tags: Option<String>,
    pub notes: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<ItemType>,
}

impl ItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.tags.is_none()
            && self.notes.is_none()
            && self.item_type.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub item_type: Option<ItemType>,
    pub status: Option<ItemStatus>,
    pub tag: Option<String>,
    pub limit: Option<u32>,
}

/// Items are addressed by numeric id or exact url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKey {
    Id(i64),
    Url(String),
}

impl ItemKey {
    pub fn parse(raw: &str) -> Self {
        raw.parse::<i64>()
            .map(ItemKey::Id)
            .unwrap_or_else(|_| ItemKey::Url(raw.to_string()))
    }

    /// Bind values for the `id = ?1 OR url = ?2` lookup. A numeric key also
    /// matches a url that is literally that number, same as the original
    /// single-query contract.
    pub fn query_params(&self) -> (Option<i64>, String) {
        match self {
            ItemKey::Id(id) => (Some(*id), id.to_string()),
            ItemKey::Url(url) => (None, url.clone()),
        }
    }
}

impl From<i64> for ItemKey {
    fn from(id: i64) -> Self {
        ItemKey::Id(id)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Id(id) => write!(f, "{id}"),
            ItemKey::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u32,
}

/// Time window for the history query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWindow {
    Days(u32),
    Weeks(u32),
    Month { year: i32, month: u32 },
}

impl HistoryWindow {
    /// Resolve the three CLI modes. Month wins over weeks, weeks over days,
    /// and no mode at all means the last 7 days.
    pub fn from_flags(days: Option<u32>, weeks: Option<u32>, month: Option<&str>) -> Result<Self> {
        if let Some(spec) = month {
            return Self::parse_month(spec);
        }
        if let Some(weeks) = weeks {
            return Ok(HistoryWindow::Weeks(weeks));
        }
        Ok(HistoryWindow::Days(days.unwrap_or(7)))
    }

    /// Parse a compact MMYY month spec, e.g. "0226" for February 2026.
    pub fn parse_month(spec: &str) -> Result<Self> {
        let invalid =
            || AppError::InvalidInput(format!("invalid month '{spec}', expected MMYY (e.g. 0226)"));

        if spec.len() != 4 || !spec.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let month: u32 = spec[..2].parse().map_err(|_| invalid())?;
        let year: i32 = spec[2..].parse::<i32>().map_err(|_| invalid())? + 2000;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }

        Ok(HistoryWindow::Month { year, month })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_key_parses_numeric_as_id() {
        assert_eq!(ItemKey::parse("42"), ItemKey::Id(42));
        assert_eq!(
            ItemKey::parse("https://example.com"),
            ItemKey::Url("https://example.com".to_string())
        );
    }

    #[test]
    fn history_window_defaults_to_seven_days() {
        assert_eq!(
            HistoryWindow::from_flags(None, None, None).unwrap(),
            HistoryWindow::Days(7)
        );
    }

    #[test]
    fn history_window_month_wins_over_weeks_and_days() {
        assert_eq!(
            HistoryWindow::from_flags(Some(3), Some(2), Some("0226")).unwrap(),
            HistoryWindow::Month {
                year: 2026,
                month: 2
            }
        );
        assert_eq!(
            HistoryWindow::from_flags(Some(3), Some(2), None).unwrap(),
            HistoryWindow::Weeks(2)
        );
    }

    #[test]
    fn history_window_rejects_malformed_month() {
        assert!(HistoryWindow::parse_month("1399").is_err());
        assert!(HistoryWindow::parse_month("0026").is_err());
        assert!(HistoryWindow::parse_month("226").is_err());
        assert!(HistoryWindow::parse_month("ab26").is_err());
    }

    #[test]
    fn type_and_status_round_trip_their_db_strings() {
        assert_eq!("video".parse::<ItemType>().unwrap(), ItemType::Video);
        assert_eq!(ItemType::Bookmark.as_str(), "bookmark");
        assert_eq!("read".parse::<ItemStatus>().unwrap(), ItemStatus::Read);
        assert!("starred".parse::<ItemStatus>().is_err());
    }
}

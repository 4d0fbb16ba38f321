use std::collections::HashMap;

use chrono::{DateTime, Duration, Months, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{
    HistoryWindow, Item, ItemKey, ItemUpdate, ListFilter, NewItem, TagCount,
};

use super::schema::SCHEMA;

const COLUMNS: &str = "id, url, title, type, tags, notes, status, added_at, read_at";

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Insert a new item and return the persisted row, including the
    /// assigned id and timestamp. A duplicate url surfaces as the raw
    /// UNIQUE constraint failure.
    pub async fn insert_item(&self, item: NewItem) -> Result<Item> {
        let added_at = to_db_timestamp(Utc::now());
        let item = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO items (url, title, type, tags, notes, added_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        item.url,
                        item.title,
                        item.item_type.as_str(),
                        item.tags,
                        item.notes,
                        added_at
                    ],
                )?;
                let id = conn.last_insert_rowid();
                let item = conn.query_row(
                    &format!("SELECT {COLUMNS} FROM items WHERE id = ?1"),
                    params![id],
                    |row| Ok(item_from_row(row)),
                )?;
                Ok(item)
            })
            .await?;
        Ok(item)
    }

    /// Look up by id or exact url in a single query.
    pub async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>> {
        let (id, url) = key.query_params();
        let item = self
            .conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(&format!("SELECT {COLUMNS} FROM items WHERE id = ?1 OR url = ?2"))?;
                let item = stmt
                    .query_row(params![id, url], |row| Ok(item_from_row(row)))
                    .optional()?;
                Ok(item)
            })
            .await?;
        Ok(item)
    }

    /// List items, newest first. All supplied filters are ANDed together.
    /// The tag filter is a raw substring match against the stored tags
    /// string, so "ai" also matches "air".
    pub async fn list_items(&self, filter: ListFilter) -> Result<Vec<Item>> {
        let items = self
            .conn
            .call(move |conn| {
                let mut clauses: Vec<&str> = Vec::new();
                let mut values: Vec<Value> = Vec::new();

                if let Some(item_type) = filter.item_type {
                    clauses.push("type = ?");
                    values.push(Value::Text(item_type.as_str().to_string()));
                }
                if let Some(status) = filter.status {
                    clauses.push("status = ?");
                    values.push(Value::Text(status.as_str().to_string()));
                }
                if let Some(tag) = &filter.tag {
                    clauses.push("tags LIKE ?");
                    values.push(Value::Text(format!("%{tag}%")));
                }

                let mut sql = format!("SELECT {COLUMNS} FROM items");
                if !clauses.is_empty() {
                    sql.push_str(" WHERE ");
                    sql.push_str(&clauses.join(" AND "));
                }
                sql.push_str(" ORDER BY added_at DESC");
                if let Some(limit) = filter.limit {
                    sql.push_str(" LIMIT ?");
                    values.push(Value::Integer(limit as i64));
                }

                let mut stmt = conn.prepare(&sql)?;
                let items = stmt
                    .query_map(params_from_iter(values), |row| Ok(item_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(items)
            })
            .await?;
        Ok(items)
    }

    /// Mark an item read, stamping read_at. Returns false when no item
    /// matches the key.
    pub async fn mark_done(&self, key: &ItemKey) -> Result<bool> {
        let Some(item) = self.get_item(key).await? else {
            return Ok(false);
        };
        let read_at = to_db_timestamp(Utc::now());
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE items SET status = 'read', read_at = ?1 WHERE id = ?2",
                    params![read_at, item.id],
                )?;
                Ok(())
            })
            .await?;
        Ok(true)
    }

    /// Mark an item unread and clear read_at.
    pub async fn mark_unread(&self, key: &ItemKey) -> Result<bool> {
        let Some(item) = self.get_item(key).await? else {
            return Ok(false);
        };
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE items SET status = 'unread', read_at = NULL WHERE id = ?1",
                    params![item.id],
                )?;
                Ok(())
            })
            .await?;
        Ok(true)
    }

    /// Overwrite exactly the fields present in the update, in one
    /// transaction. Returns false when no item matches the key.
    pub async fn update_item(&self, key: &ItemKey, update: ItemUpdate) -> Result<bool> {
        let Some(item) = self.get_item(key).await? else {
            return Ok(false);
        };
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                if let Some(title) = &update.title {
                    tx.execute(
                        "UPDATE items SET title = ?1 WHERE id = ?2",
                        params![title, item.id],
                    )?;
                }
                if let Some(tags) = &update.tags {
                    tx.execute(
                        "UPDATE items SET tags = ?1 WHERE id = ?2",
                        params![tags, item.id],
                    )?;
                }
                if let Some(notes) = &update.notes {
                    tx.execute(
                        "UPDATE items SET notes = ?1 WHERE id = ?2",
                        params![notes, item.id],
                    )?;
                }
                if let Some(item_type) = update.item_type {
                    tx.execute(
                        "UPDATE items SET type = ?1 WHERE id = ?2",
                        params![item_type.as_str(), item.id],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await?;
        Ok(true)
    }

    /// Delete an item. Returns false when no item matches the key.
    pub async fn delete_item(&self, key: &ItemKey) -> Result<bool> {
        let Some(item) = self.get_item(key).await? else {
            return Ok(false);
        };
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM items WHERE id = ?1", params![item.id])?;
                Ok(())
            })
            .await?;
        Ok(true)
    }

    /// Case-insensitive substring search across title, url, tags, and
    /// notes. Newest first, truncated to `limit` (default 20).
    pub async fn search_items(&self, query: &str, limit: Option<u32>) -> Result<Vec<Item>> {
        let pattern = format!("%{query}%");
        let limit = limit.unwrap_or(20) as i64;
        let items = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM items
                     WHERE title LIKE ?1 OR url LIKE ?1 OR tags LIKE ?1 OR notes LIKE ?1
                     ORDER BY added_at DESC
                     LIMIT ?2"
                ))?;
                let items = stmt
                    .query_map(params![pattern, limit], |row| Ok(item_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(items)
            })
            .await?;
        Ok(items)
    }

    /// Frequency of every normalized tag label across all items, count
    /// descending. Ties keep first-seen order.
    pub async fn get_tags(&self) -> Result<Vec<TagCount>> {
        let tag_strings = self
            .conn
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT tags FROM items WHERE tags IS NOT NULL AND tags != ''")?;
                let tags = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(tags)
            })
            .await?;
        Ok(aggregate_tags(&tag_strings))
    }

    /// Completed items whose read_at falls inside the window, most recently
    /// read first.
    pub async fn get_history(&self, window: HistoryWindow) -> Result<Vec<Item>> {
        match window {
            HistoryWindow::Month { year, month } => {
                let invalid = || {
                    AppError::InvalidInput(format!("invalid month {month:02}{:02}", year - 2000))
                };
                let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
                let end = start
                    .checked_add_months(Months::new(1))
                    .and_then(|d| d.pred_opt())
                    .ok_or_else(invalid)?;
                let lower = format!("{}T00:00:00Z", start.format("%Y-%m-%d"));
                let upper = format!("{}T23:59:59Z", end.format("%Y-%m-%d"));

                let items = self
                    .conn
                    .call(move |conn| {
                        let mut stmt = conn.prepare(&format!(
                            "SELECT {COLUMNS} FROM items
                             WHERE status = 'read' AND read_at >= ?1 AND read_at <= ?2
                             ORDER BY read_at DESC"
                        ))?;
                        let items = stmt
                            .query_map(params![lower, upper], |row| Ok(item_from_row(row)))?
                            .collect::<std::result::Result<Vec<_>, _>>()?;
                        Ok(items)
                    })
                    .await?;
                Ok(items)
            }
            HistoryWindow::Weeks(weeks) => self.history_since(weeks as i64 * 7).await,
            HistoryWindow::Days(days) => self.history_since(days as i64).await,
        }
    }

    async fn history_since(&self, days: i64) -> Result<Vec<Item>> {
        let cutoff = to_db_timestamp(Utc::now() - Duration::days(days));
        let items = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM items
                     WHERE status = 'read' AND read_at >= ?1
                     ORDER BY read_at DESC"
                ))?;
                let items = stmt
                    .query_map(params![cutoff], |row| Ok(item_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(items)
            })
            .await?;
        Ok(items)
    }

    /// Items added in the last `days` days regardless of status, newest
    /// first.
    pub async fn get_recent(&self, days: u32) -> Result<Vec<Item>> {
        let cutoff = to_db_timestamp(Utc::now() - Duration::days(days as i64));
        let items = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM items WHERE added_at >= ?1 ORDER BY added_at DESC"
                ))?;
                let items = stmt
                    .query_map(params![cutoff], |row| Ok(item_from_row(row)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(items)
            })
            .await?;
        Ok(items)
    }
}

/// Second-precision RFC 3339 with a Z suffix, so lexical comparison in SQL
/// matches chronological order.
fn to_db_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // RFC 3339 first (e.g. "2026-01-11T12:34:56Z")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // SQLite datetime format (e.g. "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn item_from_row(row: &Row) -> Item {
    Item {
        id: row.get(0).unwrap(),
        url: row.get(1).unwrap(),
        title: row.get(2).unwrap(),
        item_type: row.get::<_, String>(3).unwrap().parse().unwrap_or_default(),
        tags: row.get(4).unwrap(),
        notes: row.get(5).unwrap(),
        status: row.get::<_, String>(6).unwrap().parse().unwrap_or_default(),
        added_at: row
            .get::<_, String>(7)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
        read_at: row
            .get::<_, Option<String>>(8)
            .unwrap()
            .and_then(|s| parse_datetime(&s)),
    }
}

/// Split, trim, and lowercase every comma-separated tags string, counting
/// each label occurrence. An item listing the same label twice counts
/// twice. The stable sort keeps discovery order for equal counts.
fn aggregate_tags(tag_strings: &[String]) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for raw in tag_strings {
        for label in raw.split(',') {
            let label = label.trim().to_lowercase();
            if label.is_empty() {
                continue;
            }
            match index.get(&label) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(label.clone(), counts.len());
                    counts.push(TagCount { tag: label, count: 1 });
                }
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

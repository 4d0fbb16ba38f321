use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::{Item, ItemStatus, ItemType, TagCount};

pub fn type_emoji(item_type: ItemType) -> &'static str {
    match item_type {
        ItemType::Video => "🎬",
        ItemType::Bookmark => "🔖",
        ItemType::Article => "📄",
    }
}

pub fn status_emoji(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Read => "✅",
        ItemStatus::Unread => "⬜",
    }
}

pub fn truncate(s: &str, len: usize) -> String {
    if s.chars().count() > len {
        let cut: String = s.chars().take(len - 1).collect();
        format!("{cut}…")
    } else {
        s.to_string()
    }
}

pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y").to_string()
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_item(item: &Item, show_status: bool) {
    let status = if show_status {
        format!("{} ", status_emoji(item.status))
    } else {
        String::new()
    };
    let title = truncate(item.title.as_deref().unwrap_or(&item.url), 60);
    let tags = item
        .tags
        .as_deref()
        .map(|t| format!(" [{t}]"))
        .unwrap_or_default();
    println!(
        "{status}{}. {} {title}{tags}",
        item.id,
        type_emoji(item.item_type)
    );
}

/// Render a list with a heading, or the empty message when nothing matched.
pub fn print_item_list(items: &[Item], heading: &str, empty: &str, show_status: bool) {
    if items.is_empty() {
        println!("{empty}");
        return;
    }
    println!("\n{heading}\n");
    for item in items {
        print_item(item, show_status);
    }
    println!();
}

pub fn print_history(items: &[Item], period: &str) {
    if items.is_empty() {
        println!("No completed items in this period.");
        return;
    }
    println!("\n📖 History: {period}\n");
    for item in items {
        let title = truncate(item.title.as_deref().unwrap_or(&item.url), 50);
        let date = item.read_at.as_ref().map(format_date).unwrap_or_default();
        println!("  {} {title} — {date}", type_emoji(item.item_type));
    }
    println!();
}

pub fn print_tags(tags: &[TagCount]) {
    if tags.is_empty() {
        println!("No tags found.");
        return;
    }
    println!("\n🏷️ Tags\n");
    for t in tags {
        println!("  {} ({})", t.tag, t.count);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("short", 60), "short");
    }

    #[test]
    fn truncate_appends_ellipsis() {
        let long = "a".repeat(70);
        let out = truncate(&long, 60);
        assert_eq!(out.chars().count(), 60);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn truncate_is_char_boundary_safe() {
        let long = "é".repeat(70);
        let out = truncate(&long, 60);
        assert_eq!(out.chars().count(), 60);
    }
}

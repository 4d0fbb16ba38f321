mod output;

use std::process;

use clap::{Parser, Subcommand};
use serde_json::json;

use crate::classify::detect_type;
use crate::config::Config;
use crate::db::Repository;
use crate::error::Result;
use crate::models::{
    HistoryWindow, Item, ItemKey, ItemStatus, ItemType, ItemUpdate, ListFilter, NewItem,
};
use crate::services::TitleFetcher;

#[derive(Parser, Debug)]
#[command(name = "later", version, about = "Save links now, read them later")]
pub struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a URL (auto-detects type)
    Add {
        url: String,

        /// Save as bookmark (reference, not to consume)
        #[arg(short = 'b', long)]
        bookmark: bool,

        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,

        /// Attach a note
        #[arg(short, long)]
        notes: Option<String>,

        /// Set the title instead of fetching it from the page
        #[arg(long)]
        title: Option<String>,
    },

    /// Show the reading list (unread articles and videos)
    Reading {
        /// Articles only
        #[arg(long, conflicts_with = "videos")]
        articles: bool,

        /// Videos only
        #[arg(long)]
        videos: bool,

        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Show saved bookmarks
    Bookmarks {
        /// Filter by status (default: unread)
        #[arg(long)]
        status: Option<ItemStatus>,

        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// List items (default: unread)
    List {
        /// Filter by type
        #[arg(long = "type")]
        item_type: Option<ItemType>,

        /// Filter by status (default: unread)
        #[arg(long)]
        status: Option<ItemStatus>,

        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,

        /// Maximum number of items to show
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Mark an item as read/watched
    Done {
        /// Item id or url
        id: String,
    },

    /// Mark an item as unread
    Undone {
        /// Item id or url
        id: String,
    },

    /// Search across title, url, tags, and notes
    Search {
        #[arg(required = true)]
        query: Vec<String>,

        /// Maximum number of results (default: 20)
        #[arg(long)]
        limit: Option<u32>,
    },

    /// List all tags with counts
    Tags,

    /// Show recently completed items
    History {
        /// Last N days (default: 7)
        #[arg(long)]
        days: Option<u32>,

        /// Last N weeks
        #[arg(long)]
        weeks: Option<u32>,

        /// Specific month in MMYY form (e.g. 0226)
        #[arg(long)]
        month: Option<String>,
    },

    /// Show recently added items
    Recent {
        /// Window in days (default: 30)
        days: Option<u32>,
    },

    /// Edit an item's tags, notes, title, or type
    Edit {
        /// Item id or url
        id: String,

        /// Replace tags
        #[arg(short, long)]
        tags: Option<String>,

        /// Replace the note
        #[arg(short, long)]
        notes: Option<String>,

        /// Replace the title
        #[arg(long)]
        title: Option<String>,

        /// Change the type
        #[arg(long = "type")]
        item_type: Option<ItemType>,

        /// Shorthand for --type bookmark
        #[arg(short = 'b', long)]
        bookmark: bool,
    },

    /// Delete an item
    Delete {
        /// Item id or url
        id: String,
    },

    /// Show the database path
    Db,
}

pub async fn run(cli: Cli, config: &Config) -> Result<()> {
    let repo = Repository::new(&config.db_path).await?;
    let json = cli.json;

    match cli.command {
        Command::Add {
            url,
            bookmark,
            tags,
            notes,
            title,
        } => {
            let item_type = detect_type(&url, bookmark);

            let title = match title {
                Some(title) => Some(title),
                None => {
                    if !json {
                        println!("⏳ Fetching title...");
                    }
                    TitleFetcher::new().fetch_title(&url).await
                }
            };

            match repo
                .insert_item(NewItem {
                    url: url.clone(),
                    title,
                    item_type,
                    tags,
                    notes,
                })
                .await
            {
                Ok(item) => {
                    if json {
                        output::print_json(&item)?;
                    } else {
                        println!(
                            "✅ Added: {} {}",
                            output::type_emoji(item.item_type),
                            item.title.as_deref().unwrap_or(&item.url)
                        );
                        if let Some(tags) = &item.tags {
                            println!("   Tags: {tags}");
                        }
                    }
                }
                Err(e) if e.is_unique_violation() => {
                    eprintln!("❌ Already saved: {url}");
                    process::exit(1);
                }
                Err(e) => return Err(e),
            }
        }

        Command::Reading {
            articles,
            videos,
            tag,
        } => {
            let unread_of = |item_type| ListFilter {
                item_type: Some(item_type),
                status: Some(ItemStatus::Unread),
                tag: tag.clone(),
                limit: None,
            };

            let items: Vec<Item> = if articles {
                repo.list_items(unread_of(ItemType::Article)).await?
            } else if videos {
                repo.list_items(unread_of(ItemType::Video)).await?
            } else {
                let mut merged = repo.list_items(unread_of(ItemType::Article)).await?;
                merged.extend(repo.list_items(unread_of(ItemType::Video)).await?);
                merged.sort_by(|a, b| b.added_at.cmp(&a.added_at));
                merged
            };

            if json {
                output::print_json(&items)?;
            } else {
                let heading = if articles {
                    "📚 Reading List (articles)"
                } else if videos {
                    "📚 Reading List (videos)"
                } else {
                    "📚 Reading List"
                };
                output::print_item_list(&items, heading, "No items in reading list.", false);
            }
        }

        Command::Bookmarks { status, tag } => {
            let items = repo
                .list_items(ListFilter {
                    item_type: Some(ItemType::Bookmark),
                    status: Some(status.unwrap_or(ItemStatus::Unread)),
                    tag,
                    limit: None,
                })
                .await?;

            if json {
                output::print_json(&items)?;
            } else {
                output::print_item_list(&items, "🔖 Bookmarks", "No bookmarks found.", false);
            }
        }

        Command::List {
            item_type,
            status,
            tag,
            limit,
        } => {
            let status = status.unwrap_or(ItemStatus::Unread);
            let items = repo
                .list_items(ListFilter {
                    item_type,
                    status: Some(status),
                    tag,
                    limit,
                })
                .await?;

            if json {
                output::print_json(&items)?;
            } else {
                let heading = match status {
                    ItemStatus::Unread => "📚 Unread Items",
                    ItemStatus::Read => "📚 Read Items",
                };
                output::print_item_list(&items, heading, "No items found.", false);
            }
        }

        Command::Done { id } => {
            let success = repo.mark_done(&ItemKey::parse(&id)).await?;
            if json {
                output::print_json(&json!({ "success": success, "id": id }))?;
            } else if success {
                println!("✅ Marked as done: {id}");
            } else {
                eprintln!("❌ Item not found: {id}");
                process::exit(1);
            }
        }

        Command::Undone { id } => {
            let success = repo.mark_unread(&ItemKey::parse(&id)).await?;
            if json {
                output::print_json(&json!({ "success": success, "id": id }))?;
            } else if success {
                println!("✅ Marked as unread: {id}");
            } else {
                eprintln!("❌ Item not found: {id}");
                process::exit(1);
            }
        }

        Command::Search { query, limit } => {
            let query = query.join(" ");
            if query.trim().is_empty() {
                eprintln!("Usage: later search <query>");
                process::exit(1);
            }

            let results = repo.search_items(&query, limit).await?;
            if json {
                output::print_json(&results)?;
            } else if results.is_empty() {
                println!("No matching items found.");
            } else {
                println!("\n🔍 Search: \"{query}\"\n");
                for item in &results {
                    output::print_item(item, true);
                }
                println!();
            }
        }

        Command::Tags => {
            let tags = repo.get_tags().await?;
            if json {
                output::print_json(&tags)?;
            } else {
                output::print_tags(&tags);
            }
        }

        Command::History { days, weeks, month } => {
            let window = HistoryWindow::from_flags(days, weeks, month.as_deref())?;
            let items = repo.get_history(window).await?;

            if json {
                output::print_json(&items)?;
            } else {
                let period = match window {
                    HistoryWindow::Month { .. } => {
                        format!("Month {}", month.unwrap_or_default())
                    }
                    HistoryWindow::Weeks(weeks) => format!("Last {weeks} weeks"),
                    HistoryWindow::Days(days) => format!("Last {days} days"),
                };
                output::print_history(&items, &period);
            }
        }

        Command::Recent { days } => {
            let days = days.unwrap_or(30);
            let items = repo.get_recent(days).await?;

            if json {
                output::print_json(&items)?;
            } else {
                let heading = format!("🆕 Recently Added (last {days} days)");
                output::print_item_list(&items, &heading, "No recent items.", true);
            }
        }

        Command::Edit {
            id,
            tags,
            notes,
            title,
            item_type,
            bookmark,
        } => {
            let mut update = ItemUpdate {
                title,
                tags,
                notes,
                item_type,
            };
            if bookmark {
                update.item_type = Some(ItemType::Bookmark);
            }

            if update.is_empty() {
                eprintln!(
                    "Provide at least one field to update: --tags, --notes, --title, --type, --bookmark"
                );
                process::exit(1);
            }

            let updated_type = update.item_type;
            let success = repo.update_item(&ItemKey::parse(&id), update.clone()).await?;
            if json {
                output::print_json(&json!({ "success": success, "id": id, "updates": update }))?;
            } else if success {
                let type_msg = updated_type
                    .map(|t| format!(" → {} {t}", output::type_emoji(t)))
                    .unwrap_or_default();
                println!("✅ Updated: {id}{type_msg}");
            } else {
                eprintln!("❌ Item not found: {id}");
                process::exit(1);
            }
        }

        Command::Delete { id } => {
            let success = repo.delete_item(&ItemKey::parse(&id)).await?;
            if json {
                output::print_json(&json!({ "success": success, "id": id }))?;
            } else if success {
                println!("✅ Deleted: {id}");
            } else {
                eprintln!("❌ Item not found: {id}");
                process::exit(1);
            }
        }

        Command::Db => {
            println!("{}", config.db_path);
        }
    }

    Ok(())
}

use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use url::Url;

const USER_AGENT_STRING: &str = "Mozilla/5.0 (compatible; later-cli/1.0)";

/// Fetched titles are capped at 500 characters.
const MAX_TITLE_LEN: usize = 500;

pub struct TitleFetcher {
    client: Client,
}

impl TitleFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT_STRING)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Fetch the page and pull a title out of its HTML. Every failure mode
    /// (unparseable url, network error, non-2xx, undecodable body) degrades
    /// to None; the caller stores a titleless item instead of erroring.
    pub async fn fetch_title(&self, url: &str) -> Option<String> {
        if Url::parse(url).is_err() {
            tracing::debug!("Not fetching title for unparseable url {}", url);
            return None;
        }

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Failed to fetch {}: {}", url, e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Failed to fetch {}: HTTP {}", url, response.status());
            return None;
        }

        let html = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                tracing::debug!("Failed to read body from {}: {}", url, e);
                return None;
            }
        };

        extract_title(&html)
    }
}

impl Default for TitleFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Look for <title> first, then og:title.
fn extract_title(html: &str) -> Option<String> {
    let title_re = Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").ok()?;
    if let Some(title) = title_re.captures(html).and_then(|cap| cap.get(1)) {
        return Some(clean_title(title.as_str()));
    }

    let og_re =
        Regex::new(r#"(?i)<meta[^>]+property=["']og:title["'][^>]+content=["']([^"']+)["']"#)
            .ok()?;
    og_re
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| clean_title(m.as_str()))
}

fn clean_title(raw: &str) -> String {
    raw.trim().chars().take(MAX_TITLE_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_tag() {
        let html = "<html><head><title> My Page </title></head></html>";
        assert_eq!(extract_title(html), Some("My Page".to_string()));
    }

    #[test]
    fn falls_back_to_og_title() {
        let html = r#"<head><meta property="og:title" content="OG Title"></head>"#;
        assert_eq!(extract_title(html), Some("OG Title".to_string()));
    }

    #[test]
    fn title_tag_wins_over_og_title() {
        let html = r#"<title>Tag</title><meta property="og:title" content="OG">"#;
        assert_eq!(extract_title(html), Some("Tag".to_string()));
    }

    #[test]
    fn returns_none_without_any_title() {
        assert_eq!(extract_title("<html><body>hi</body></html>"), None);
    }

    #[test]
    fn truncates_long_titles_on_char_boundaries() {
        let html = format!("<title>{}</title>", "é".repeat(600));
        let title = extract_title(&html).unwrap();
        assert_eq!(title.chars().count(), 500);
    }
}

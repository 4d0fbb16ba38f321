use crate::models::ItemType;

/// Hosts whose links are watched rather than read. Matched case-insensitively
/// as substrings of the url; first hit wins.
const VIDEO_PATTERNS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "vimeo.com",
    "tiktok.com",
    "instagram.com/reel",
    "instagram.com/p/",
    "netflix.com",
    "twitch.tv",
    "dailymotion.com",
    "wistia.com",
    "loom.com",
];

/// Classify a url. An explicit bookmark flag always wins; otherwise known
/// video hosts classify as video and everything else is an article.
pub fn detect_type(url: &str, bookmark: bool) -> ItemType {
    if bookmark {
        return ItemType::Bookmark;
    }

    let url = url.to_ascii_lowercase();
    if VIDEO_PATTERNS.iter().any(|p| url.contains(p)) {
        return ItemType::Video;
    }

    ItemType::Article
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_youtube_urls() {
        assert_eq!(
            detect_type("https://youtube.com/watch?v=abc123", false),
            ItemType::Video
        );
        assert_eq!(
            detect_type("https://www.youtube.com/watch?v=abc123", false),
            ItemType::Video
        );
        assert_eq!(detect_type("https://youtu.be/abc123", false), ItemType::Video);
    }

    #[test]
    fn detects_other_video_platforms() {
        assert_eq!(detect_type("https://vimeo.com/123456", false), ItemType::Video);
        assert_eq!(
            detect_type("https://www.tiktok.com/@user/video/123", false),
            ItemType::Video
        );
        assert_eq!(
            detect_type("https://instagram.com/reel/abc123", false),
            ItemType::Video
        );
        assert_eq!(
            detect_type("https://instagram.com/p/abc123", false),
            ItemType::Video
        );
        assert_eq!(
            detect_type("https://netflix.com/watch/123", false),
            ItemType::Video
        );
        assert_eq!(detect_type("https://twitch.tv/channel", false), ItemType::Video);
        assert_eq!(
            detect_type("https://loom.com/share/abc123", false),
            ItemType::Video
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(
            detect_type("https://YouTube.com/watch?v=abc", false),
            ItemType::Video
        );
    }

    #[test]
    fn everything_else_is_an_article() {
        assert_eq!(
            detect_type("https://medium.com/@user/article-title", false),
            ItemType::Article
        );
        assert_eq!(
            detect_type("https://blog.example.com/post", false),
            ItemType::Article
        );
        assert_eq!(
            detect_type("https://nytimes.com/2024/article", false),
            ItemType::Article
        );
        assert_eq!(
            detect_type("https://docs.example.com/guide", false),
            ItemType::Article
        );
    }

    #[test]
    fn bookmark_flag_overrides_everything() {
        assert_eq!(
            detect_type("https://youtube.com/watch?v=abc123", true),
            ItemType::Bookmark
        );
        assert_eq!(detect_type("https://medium.com/article", true), ItemType::Bookmark);
        assert_eq!(detect_type("https://example.com", true), ItemType::Bookmark);
    }
}

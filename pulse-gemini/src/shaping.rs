//! Turns raw provider JSON into domain values.
//!
//! The provider is asked for a schema but not trusted to follow it: items
//! missing mandatory fields are dropped, counters are coerced, and links that
//! do not point where they claim are replaced or discarded.

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use serde_json::{Map, Value};

use crate::model::{Category, ContentItem, Rewrites};

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_LEN: usize = 9;
const SNIPPET_CHARS: usize = 40;

const FEED_LABEL: &str = "Trending Now";
const MEME_LABEL: &str = "Hot";

lazy_static! {
    static ref STATUS_URL: Regex = Regex::new(r"x\.com/.+/status/\d+").expect("valid status regex");
    static ref IMAGE_EXT: Regex =
        Regex::new(r"(?i)\.(jpg|jpeg|png|webp|gif)$").expect("valid image regex");
    static ref NOT_WORD: Regex = Regex::new(r"[^A-Za-z0-9_\s]").expect("valid snippet regex");
}

/// Nine random lowercase alphanumeric characters.
pub fn generate_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect()
}

fn text<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(Value::as_str)
}

fn required<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    text(fields, name).filter(|value| !value.trim().is_empty())
}

fn counter(fields: &Map<String, Value>, name: &str) -> u64 {
    match fields.get(name) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    }
}

fn items(raw: &Value) -> impl Iterator<Item = &Map<String, Value>> {
    raw.as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Link to the post, or a live search for it when the link is not a status URL.
pub fn status_url(url: &str, handle: &str, content: &str) -> String {
    let url = url.trim();
    if STATUS_URL.is_match(url) {
        return url.to_owned();
    }
    let snippet: String = NOT_WORD
        .replace_all(content, "")
        .chars()
        .take(SNIPPET_CHARS)
        .collect();
    let query = format!("from:{handle} {snippet}");
    match serde_urlencoded::to_string([("q", query.as_str()), ("f", "live")]) {
        Ok(params) => format!("https://x.com/search?{params}"),
        Err(_) => format!("https://x.com/{handle}"),
    }
}

/// Keeps only direct links to image files.
pub fn image_url(candidate: Option<&str>) -> Option<String> {
    let candidate = candidate?.trim();
    let direct = IMAGE_EXT.is_match(candidate) || candidate.contains("twimg.com");
    (candidate.starts_with("http") && direct).then(|| candidate.to_owned())
}

pub fn feed_items(raw: &Value) -> Vec<ContentItem> {
    items(raw)
        .filter_map(|fields| {
            let author = required(fields, "author")?;
            let content = required(fields, "content")?;
            let handle = text(fields, "handle")
                .map(|h| h.trim().trim_start_matches('@'))
                .unwrap_or_default();
            let category = text(fields, "category")
                .and_then(Category::parse)
                .unwrap_or(Category::TechInfo);

            Some(ContentItem {
                id: generate_id(),
                author: author.to_owned(),
                handle: handle.to_owned(),
                content: content.to_owned(),
                url: status_url(text(fields, "url").unwrap_or_default(), handle, content),
                image_url: image_url(text(fields, "imageUrl")),
                likes: counter(fields, "likes"),
                retweets: counter(fields, "retweets"),
                replies: counter(fields, "replies"),
                timestamp: FEED_LABEL.to_owned(),
                category,
                is_viral: true,
                rewrite_history: None,
            })
        })
        .collect()
}

pub fn meme_items(raw: &Value) -> Vec<ContentItem> {
    items(raw)
        .filter_map(|fields| {
            let author = required(fields, "author")?;
            let image = required(fields, "imageUrl")?;

            Some(ContentItem {
                id: generate_id(),
                author: author.to_owned(),
                handle: text(fields, "handle")
                    .map(|h| h.trim().trim_start_matches('@').to_owned())
                    .unwrap_or_default(),
                content: text(fields, "content").unwrap_or_default().to_owned(),
                url: text(fields, "url").unwrap_or_default().trim().to_owned(),
                image_url: Some(image.trim().to_owned()),
                likes: 0,
                retweets: 0,
                replies: 0,
                timestamp: MEME_LABEL.to_owned(),
                category: Category::Meme,
                is_viral: true,
                rewrite_history: None,
            })
        })
        .collect()
}

/// Missing or blank tones fall back to `original`.
///
/// Returns `None` when the answer carries no usable tone at all, so an
/// empty answer is never stored as if it were a rewrite.
pub fn rewrites(raw: &Value, original: &str) -> Option<Rewrites> {
    let tone = |name: &str| {
        raw.get(name)
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
    };
    let professional = tone("professional");
    let casual = tone("casual");
    let humorous = tone("humorous");
    if professional.is_none() && casual.is_none() && humorous.is_none() {
        return None;
    }
    Some(Rewrites {
        professional: professional.unwrap_or(original).to_owned(),
        casual: casual.unwrap_or(original).to_owned(),
        humorous: humorous.unwrap_or(original).to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_are_nine_lowercase_alphanumerics() {
        let id = generate_id();
        assert_eq!(id.len(), 9);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn direct_status_urls_are_kept() {
        let url = status_url(" https://x.com/rustlang/status/12345 ", "rustlang", "x");
        assert_eq!(url, "https://x.com/rustlang/status/12345");
    }

    #[test]
    fn other_urls_become_live_searches() {
        let url = status_url("https://example.com/post", "ferris", "Rust 2024 is out!! (finally)");
        assert_eq!(
            url,
            "https://x.com/search?q=from%3Aferris+Rust+2024+is+out+finally&f=live"
        );
    }

    #[test]
    fn search_snippet_is_cut_to_forty_chars() {
        let long = "a".repeat(100);
        let url = status_url("", "h", &long);
        let expected = format!("https://x.com/search?q=from%3Ah+{}&f=live", "a".repeat(40));
        assert_eq!(url, expected);
    }

    #[test]
    fn image_urls_must_be_direct() {
        assert_eq!(
            image_url(Some("https://pbs.twimg.com/media/abc?format=jpg")).as_deref(),
            Some("https://pbs.twimg.com/media/abc?format=jpg")
        );
        assert!(image_url(Some("https://cdn.example.com/cat.PNG")).is_some());
        assert!(image_url(Some("https://example.com/page")).is_none());
        assert!(image_url(Some("ftp://example.com/cat.png")).is_none());
        assert!(image_url(None).is_none());
    }

    #[test]
    fn feed_items_are_validated_and_defaulted() {
        let raw = json!([
            {
                "author": "Ferris",
                "handle": "@ferris",
                "content": "New release",
                "url": "https://x.com/ferris/status/42",
                "likes": 12.7,
                "category": "Thread"
            },
            { "author": "No content" },
            { "author": "", "content": "No author" },
            {
                "author": "Ada",
                "content": "Hello",
                "category": "Gossip",
                "retweets": -3,
                "imageUrl": "https://example.com/page"
            },
            "not an object"
        ]);

        let items = feed_items(&raw);
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.handle, "ferris");
        assert_eq!(first.likes, 12);
        assert_eq!(first.retweets, 0);
        assert_eq!(first.category, Category::Thread);
        assert_eq!(first.timestamp, "Trending Now");
        assert!(first.is_viral);

        let second = &items[1];
        assert_eq!(second.category, Category::TechInfo);
        assert_eq!(second.retweets, 0);
        assert_eq!(second.image_url, None);
        assert!(second.url.starts_with("https://x.com/search?q=from%3A+Hello"));
        assert_ne!(first.id, "");
    }

    #[test]
    fn non_array_payloads_shape_to_nothing() {
        assert!(feed_items(&Value::Null).is_empty());
        assert!(meme_items(&json!({"author": "x"})).is_empty());
    }

    #[test]
    fn memes_need_an_image() {
        let raw = json!([
            { "author": "A", "imageUrl": "https://pbs.twimg.com/media/1.jpg", "url": "u", "likes": 99 },
            { "author": "B", "url": "u" },
            { "author": "C", "imageUrl": "  " }
        ]);
        let memes = meme_items(&raw);
        assert_eq!(memes.len(), 1);
        assert_eq!(memes[0].category, Category::Meme);
        assert_eq!(memes[0].timestamp, "Hot");
        assert_eq!(memes[0].likes, 0);
    }

    #[test]
    fn missing_tones_echo_the_input() {
        let raw = json!({ "professional": "Formal.", "casual": "", "humorous": 3 });
        let rewrites = rewrites(&raw, "orig").unwrap();
        assert_eq!(rewrites.professional, "Formal.");
        assert_eq!(rewrites.casual, "orig");
        assert_eq!(rewrites.humorous, "orig");
    }

    #[test]
    fn answers_without_tones_are_not_rewrites() {
        assert_eq!(rewrites(&Value::Null, "t"), None);
        assert_eq!(rewrites(&json!([]), "t"), None);
        assert_eq!(rewrites(&json!({ "casual": "  ", "humorous": 1 }), "t"), None);
    }
}

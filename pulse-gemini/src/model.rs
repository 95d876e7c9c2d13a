//! Domain types returned to callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Feed category. Serialized with its display string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    All,
    Meme,
    #[serde(rename = "Tech Info")]
    TechInfo,
    Thread,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Meme => "Meme",
            Category::TechInfo => "Tech Info",
            Category::Thread => "Thread",
        }
    }

    /// Parses a display string, returning `None` for anything unknown.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "All" => Some(Category::All),
            "Meme" => Some(Category::Meme),
            "Tech Info" => Some(Category::TechInfo),
            "Thread" => Some(Category::Thread),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that names no known variant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseError {
    kind: &'static str,
    value: String,
}

impl FromStr for Category {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse(s).ok_or_else(|| ParseError {
            kind: "category",
            value: s.to_owned(),
        })
    }
}

/// How far back the feed looks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "6h")]
    SixHours,
    #[default]
    #[serde(rename = "24h")]
    Day,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Hour => "1h",
            TimeRange::SixHours => "6h",
            TimeRange::Day => "24h",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(TimeRange::Hour),
            "6h" => Ok(TimeRange::SixHours),
            "24h" => Ok(TimeRange::Day),
            _ => Err(ParseError {
                kind: "time range",
                value: s.to_owned(),
            }),
        }
    }
}

/// A post or meme as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub author: String,
    pub handle: String,
    pub content: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    /// Freshness label, e.g. `Trending Now`.
    pub timestamp: String,
    pub category: Category,
    pub is_viral: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite_history: Option<Vec<String>>,
}

impl ContentItem {
    /// Appends a chosen rewrite to the item's history.
    pub fn record_rewrite(&mut self, text: impl Into<String>) {
        self.rewrite_history.get_or_insert_with(Vec::new).push(text.into());
    }
}

/// One post rewritten in three tones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewrites {
    pub professional: String,
    pub casual: String,
    pub humorous: String,
}

impl Rewrites {
    /// All three tones set to `text`.
    pub fn echo(text: &str) -> Self {
        Self {
            professional: text.to_owned(),
            casual: text.to_owned(),
            humorous: text.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_uses_display_strings() {
        assert_eq!(serde_json::to_string(&Category::TechInfo).unwrap(), "\"Tech Info\"");
        let parsed: Category = serde_json::from_str("\"Thread\"").unwrap();
        assert_eq!(parsed, Category::Thread);
        assert_eq!("Tech Info".parse::<Category>().unwrap(), Category::TechInfo);
        assert!("tech".parse::<Category>().is_err());
    }

    #[test]
    fn time_range_round_trips_through_str() {
        for range in [TimeRange::Hour, TimeRange::SixHours, TimeRange::Day] {
            assert_eq!(range.as_str().parse::<TimeRange>().unwrap(), range);
        }
        assert_eq!(
            "2h".parse::<TimeRange>().unwrap_err().to_string(),
            "unknown time range: \"2h\""
        );
    }

    #[test]
    fn item_fields_are_camel_case() {
        let item = ContentItem {
            id: "abc123xyz".into(),
            author: "Ada".into(),
            handle: "ada".into(),
            content: "hello".into(),
            url: "https://x.com/ada/status/1".into(),
            image_url: None,
            likes: 1,
            retweets: 2,
            replies: 3,
            timestamp: "Trending Now".into(),
            category: Category::TechInfo,
            is_viral: true,
            rewrite_history: None,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["isViral"], true);
        assert_eq!(value["category"], "Tech Info");
        assert!(value.get("imageUrl").is_none());
        assert!(value.get("rewriteHistory").is_none());
    }

    #[test]
    fn rewrite_history_grows() {
        let mut item: ContentItem = serde_json::from_value(serde_json::json!({
            "id": "a", "author": "b", "handle": "c", "content": "d", "url": "e",
            "likes": 0, "retweets": 0, "replies": 0, "timestamp": "Hot",
            "category": "Meme", "isViral": true
        }))
        .unwrap();
        item.record_rewrite("first");
        item.record_rewrite("second");
        assert_eq!(
            item.rewrite_history.as_deref(),
            Some(&["first".to_owned(), "second".to_owned()][..])
        );
    }
}

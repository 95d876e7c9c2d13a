//! Instructions sent to the provider.

use crate::model::{Category, TimeRange};

/// Topic used when the caller asks for every category.
pub const DEFAULT_TOPIC: &str = "Software engineering, AI, developer humor, and tech hardware news";

pub fn feed(category: Category, range: TimeRange) -> String {
    let topic = match category {
        Category::All => DEFAULT_TOPIC,
        other => other.as_str(),
    };
    format!(
        "Find the most VIRAL and RECENT tech tweets and memes from the last {range} on X (Twitter).

Topic: {topic}.

CRITICAL DATA REQUIREMENTS:
1. SEARCH: Use Google Search to find actual live posts on x.com.
2. STATUS URL: Every item MUST have a direct URL: https://x.com/[username]/status/[numeric_id].
   If unsure of the ID, use: https://x.com/search?q=from:[handle] [snippet]
3. MEDIA/IMAGES: Prioritize posts with visual content (memes, charts, code snippets).
   You MUST find the direct image source URL (typically starting with https://pbs.twimg.com/media/...) and put it in 'imageUrl'.
   Do NOT provide website URLs or page links in the 'imageUrl' field. Only direct image files.
4. HANDLE: The user handle without @.

Return 6-8 items as a JSON array."
    )
}

pub fn memes() -> String {
    "Search for the latest, most popular visual tech memes on X (Twitter).
Focus specifically on: Programming humor, IT struggles, Computer Science jokes, and AI memes.

CRITICAL: Only return items that have a direct image URL (pbs.twimg.com).
I need visual content only.

Return 12 items as a JSON array."
        .to_owned()
}

pub fn rewrite(text: &str) -> String {
    format!("Rewrite this tech tweet in 3 styles (Professional, Casual, Humorous): \"{text}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_prompt_names_topic_and_window() {
        let all = feed(Category::All, TimeRange::SixHours);
        assert!(all.contains("from the last 6h"));
        assert!(all.contains(DEFAULT_TOPIC));
        assert!(all.contains("6-8 items"));

        let threads = feed(Category::Thread, TimeRange::Hour);
        assert!(threads.contains("Topic: Thread."));
        assert!(!threads.contains(DEFAULT_TOPIC));
    }

    #[test]
    fn rewrite_prompt_quotes_the_text() {
        assert!(rewrite("ship it").ends_with("\"ship it\""));
        assert!(memes().contains("12 items"));
    }
}

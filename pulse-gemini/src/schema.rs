//! Structured-output schemas sent with each request.

use serde_json::{Value, json};

/// Array of feed posts.
pub fn feed() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "author": { "type": "STRING" },
                "handle": { "type": "STRING", "description": "Username without @" },
                "content": { "type": "STRING" },
                "url": { "type": "STRING", "description": "Direct status link or precise search link" },
                "imageUrl": { "type": "STRING", "description": "Direct image file URL (e.g. pbs.twimg.com)" },
                "likes": { "type": "NUMBER" },
                "retweets": { "type": "NUMBER" },
                "replies": { "type": "NUMBER" },
                "category": { "type": "STRING" }
            },
            "required": ["author", "handle", "content", "url", "category"]
        }
    })
}

/// Array of image-bearing meme posts.
pub fn memes() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "author": { "type": "STRING" },
                "handle": { "type": "STRING" },
                "content": { "type": "STRING" },
                "url": { "type": "STRING" },
                "imageUrl": { "type": "STRING", "description": "MUST be a direct pbs.twimg.com image URL" }
            },
            "required": ["author", "imageUrl", "url"]
        }
    })
}

/// Object with the three rewrite tones.
pub fn rewrites() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "professional": { "type": "STRING" },
            "casual": { "type": "STRING" },
            "humorous": { "type": "STRING" }
        },
        "required": ["professional", "casual", "humorous"]
    })
}

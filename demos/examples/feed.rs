//! Live feed example
//!
//! Fetches viral tech posts from Gemini, then asks again to show that the
//! second request is answered from the in-memory store.
//!
//! Prerequisites:
//!   GEMINI_API_KEY set in the environment
//!
//! Run:
//!   cargo run -p pulse-demos --example feed -- "Tech Info" 6h

use std::env;

use pulse::RequestOrchestrator;
use pulse_gemini::{Category, ContentService, GeminiClient, TimeRange};
use pulse_moka::MokaBackend;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pulse=debug,pulse_gemini=debug".into()),
        )
        .init();

    let mut args = env::args().skip(1);
    let category: Category = args
        .next()
        .map(|arg| arg.parse().expect("category: All, Meme, Tech Info or Thread"))
        .unwrap_or_default();
    let range: TimeRange = args
        .next()
        .map(|arg| arg.parse().expect("time range: 1h, 6h or 24h"))
        .unwrap_or_default();

    let client = GeminiClient::builder()
        .api_key(env::var("GEMINI_API_KEY").unwrap_or_default())
        .build()
        .expect("failed to build client");
    let store = MokaBackend::builder().max_entries(256).label("session").build();
    let service = ContentService::new(client, RequestOrchestrator::new(store));

    let items = service.fetch_viral_content(category, range).await;
    tracing::info!(count = items.len(), %category, %range, "first fetch");
    println!("{}", serde_json::to_string_pretty(&items).unwrap());

    let again = service.fetch_viral_content(category, range).await;
    tracing::info!(same = (again == items), "second fetch");
}

//! Configured service example
//!
//! Builds the whole service from YAML: a FeOxDB store in a temporary
//! directory, the Gemini client and per-operation policies.
//!
//! Run:
//!   cargo run -p pulse-demos --example configured
//!   cargo run -p pulse-demos --example configured -- ./pulse.yaml

use pulse_configuration::Settings;
use tempfile::TempDir;

const DEFAULT_CONFIG: &str = r#"
provider:
  timeout: 30s
storage:
  type: FeOxDb
  path: "{dir}"
  max_file_size: 16777216
policies:
  memes:
    ttl: 1h
    max_retries: 3
  rewrite:
    throttle: 10s
"#;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info,pulse=debug,pulse_gemini=debug")
        .init();

    let dir = TempDir::new().unwrap();
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::from_path(path).expect("failed to load configuration"),
        None => {
            let yaml = DEFAULT_CONFIG.replace("{dir}", &dir.path().to_string_lossy());
            Settings::from_yaml(&yaml).expect("invalid built-in configuration")
        }
    };
    tracing::info!(?settings, "loaded configuration");

    let service = settings.into_service().expect("failed to build service");

    let memes = service.fetch_meme_images().await;
    tracing::info!(count = memes.len(), "memes");
    for meme in &memes {
        println!("{} (@{}) {}", meme.author, meme.handle, meme.image_url.as_deref().unwrap_or("-"));
    }

    let rewrites = service
        .rewrite("Just shipped a 10x faster build by deleting half the dependencies.")
        .await;
    println!("professional: {}", rewrites.professional);
    println!("casual:       {}", rewrites.casual);
    println!("humorous:     {}", rewrites.humorous);
}

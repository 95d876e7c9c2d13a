use std::collections::HashMap;
use std::time::Duration;

use pretty_assertions::assert_eq;
use pulse::RetryLimit;
use pulse_backend::Backend;
use pulse_configuration::{
    ConfigError, FeOxDb, KeySerialization, Moka, Policies, PolicyConfig, ProviderConfig,
    Settings, Storage,
};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn full_settings_deserialize() {
    let yaml = r#"
provider:
  model: gemini-test
  base_url: "http://localhost:9000"
  timeout: 5s
  api_key_env: PULSE_KEY
storage:
  type: FeOxDb
  path: "/tmp/pulse"
  max_file_size: 1048576
  key_format: UrlEncoded
policies:
  feed:
    ttl: 10m
    throttle: 1m
  memes:
    max_retries: 4
    backoff_factor: 3.0
"#;

    let settings = Settings::from_yaml(yaml).expect("failed to deserialize");

    assert_eq!(
        settings,
        Settings {
            provider: ProviderConfig {
                model: "gemini-test".into(),
                base_url: "http://localhost:9000".into(),
                timeout: Duration::from_secs(5),
                api_key_env: Some("PULSE_KEY".into()),
            },
            storage: Storage::FeOxDb(FeOxDb {
                path: Some("/tmp/pulse".into()),
                max_file_size: Some(1_048_576),
                max_memory: None,
                label: None,
                key_format: KeySerialization::UrlEncoded,
            }),
            policies: Policies {
                feed: PolicyConfig {
                    ttl: Some(Duration::from_secs(600)),
                    throttle: Some(Duration::from_secs(60)),
                    ..Default::default()
                },
                memes: PolicyConfig {
                    max_retries: Some(RetryLimit::new_saturating(4)),
                    backoff_factor: Some(3.0),
                    ..Default::default()
                },
                rewrite: PolicyConfig::default(),
            },
        }
    );
}

#[test]
fn missing_sections_use_defaults() {
    let settings = Settings::from_yaml("storage:\n  type: Moka\n  max_entries: 50\n").unwrap();

    assert_eq!(settings.provider, ProviderConfig::default());
    assert_eq!(
        settings.storage,
        Storage::Moka(Moka {
            max_entries: 50,
            label: None,
            key_format: KeySerialization::Plain,
        })
    );

    let policies = settings.policies.to_service_policies();
    assert_eq!(policies.feed.ttl, Duration::from_secs(15 * 60));
    assert_eq!(policies.memes.ttl, Duration::from_secs(30 * 60));
    assert_eq!(policies.rewrite.throttle, Duration::from_secs(30));
    assert_eq!(policies.feed.initial_delay, Duration::from_secs(2));
}

#[test]
fn unknown_storage_is_rejected() {
    let error = Settings::from_yaml("storage:\n  type: Redis\n").unwrap_err();
    assert!(matches!(error, ConfigError::Yaml(_)));
}

#[test]
fn retries_above_the_limit_are_rejected() {
    let error = Settings::from_yaml("policies:\n  feed:\n    max_retries: 99\n").unwrap_err();
    assert!(matches!(error, ConfigError::Yaml(_)));
}

#[test]
fn api_key_lookup_order() {
    let config = ProviderConfig::default();
    assert_eq!(
        config.resolve_api_key(env(&[("API_KEY", "fallback")])),
        Some("fallback".into())
    );
    assert_eq!(
        config.resolve_api_key(env(&[("API_KEY", "fallback"), ("GEMINI_API_KEY", "primary")])),
        Some("primary".into())
    );
    assert_eq!(config.resolve_api_key(env(&[("GEMINI_API_KEY", " ")])), None);

    let named = ProviderConfig {
        api_key_env: Some("PULSE_KEY".into()),
        ..Default::default()
    };
    assert_eq!(named.resolve_api_key(env(&[("GEMINI_API_KEY", "ignored")])), None);
    assert_eq!(
        named.resolve_api_key(env(&[("PULSE_KEY", "mine")])),
        Some("mine".into())
    );
}

#[test]
fn zero_capacity_moka_is_invalid() {
    let storage = Storage::Moka(Moka {
        max_entries: 0,
        label: None,
        key_format: KeySerialization::Plain,
    });
    assert!(matches!(
        storage.into_backend(),
        Err(ConfigError::InvalidValue { field: "storage.max_entries", .. })
    ));
}

#[test]
fn feoxdb_storage_opens_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::FeOxDb(FeOxDb {
        path: Some(dir.path().to_string_lossy().into_owned()),
        max_file_size: Some(16 * 1024 * 1024),
        max_memory: None,
        label: Some("disk".into()),
        key_format: KeySerialization::Plain,
    });

    let backend = storage.into_backend().unwrap();
    assert_eq!(backend.label().as_str(), "disk");
}

#[tokio::test]
async fn service_without_key_degrades() {
    let service = Settings::default()
        .into_service_with(env(&[]))
        .unwrap();

    assert!(service.fetch_meme_images().await.is_empty());
    assert_eq!(service.rewrite("as is").await.casual, "as is");
    assert!(service.orchestrator().last_success_at().is_none());
}

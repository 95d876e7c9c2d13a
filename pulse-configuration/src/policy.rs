use std::time::Duration;

use pulse::{RequestPolicy, RetryLimit};
use pulse_gemini::ServicePolicies;
use serde::{Deserialize, Serialize};

/// Overrides for one operation's [`RequestPolicy`]. Unset fields keep the
/// operation's default.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Duration>,
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub throttle: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<RetryLimit>,
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub initial_delay: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff_factor: Option<f64>,
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub max_jitter: Option<Duration>,
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub max_delay: Option<Duration>,
}

impl PolicyConfig {
    pub fn apply(&self, mut base: RequestPolicy) -> RequestPolicy {
        if let Some(ttl) = self.ttl {
            base.ttl = ttl;
        }
        if let Some(throttle) = self.throttle {
            base.throttle = throttle;
        }
        if let Some(retries) = self.max_retries {
            base.max_retries = retries;
        }
        if let Some(delay) = self.initial_delay {
            base.initial_delay = delay;
        }
        if let Some(factor) = self.backoff_factor {
            base.backoff_factor = factor;
        }
        if let Some(jitter) = self.max_jitter {
            base.max_jitter = jitter;
        }
        if self.max_delay.is_some() {
            base.max_delay = self.max_delay;
        }
        base
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Policies {
    pub feed: PolicyConfig,
    pub memes: PolicyConfig,
    pub rewrite: PolicyConfig,
}

impl Policies {
    pub fn to_service_policies(&self) -> ServicePolicies {
        let defaults = ServicePolicies::default();
        ServicePolicies {
            feed: self.feed.apply(defaults.feed),
            memes: self.memes.apply(defaults.memes),
            rewrite: self.rewrite.apply(defaults.rewrite),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_keep_defaults() {
        let config = PolicyConfig {
            ttl: Some(Duration::from_secs(60)),
            ..Default::default()
        };
        let policy = config.apply(RequestPolicy::default());
        assert_eq!(policy.ttl, Duration::from_secs(60));
        assert_eq!(policy.throttle, RequestPolicy::default().throttle);
    }

    #[test]
    fn per_operation_defaults() {
        let policies = Policies::default().to_service_policies();
        assert_eq!(policies.feed.ttl, Duration::from_secs(15 * 60));
        assert_eq!(policies.memes.ttl, Duration::from_secs(30 * 60));
        assert_eq!(policies.rewrite.ttl, Duration::from_secs(30 * 60));
        assert_eq!(policies.memes.max_retries.get(), 2);
    }
}

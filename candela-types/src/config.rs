//! Configuration types shared across the orchestrator and feeds.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{FeedKey, Purpose};

/// TTL table for the result cache.
///
/// TTLs are configuration, not code: each namespace (the requested interval's
/// [`as_str`](crate::Interval::as_str) label) declares its own freshness
/// window, with a default for namespaces not listed. A TTL of zero disables
/// caching for that namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Fallback TTL in milliseconds for namespaces without an override.
    pub default_ttl_ms: u64,
    /// Per-namespace TTL overrides in milliseconds, keyed by interval label.
    pub per_namespace_ttl_ms: HashMap<String, u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: 300_000,
            per_namespace_ttl_ms: HashMap::new(),
        }
    }
}

impl CacheConfig {
    /// Effective TTL for a namespace, or `None` when caching is disabled for it.
    #[must_use]
    pub fn ttl_for(&self, namespace: &str) -> Option<Duration> {
        let ms = self
            .per_namespace_ttl_ms
            .get(namespace)
            .copied()
            .unwrap_or(self.default_ttl_ms);
        (ms > 0).then(|| Duration::from_millis(ms))
    }

    /// Set the TTL for one namespace.
    #[must_use]
    pub fn with_namespace_ttl(mut self, namespace: impl Into<String>, ttl: Duration) -> Self {
        self.per_namespace_ttl_ms.insert(
            namespace.into(),
            u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
        );
        self
    }
}

/// Global configuration for the `Candela` orchestrator.
#[derive(Debug, Clone)]
pub struct CandelaConfig {
    /// Timeout applied to each individual feed call.
    pub feed_timeout: Duration,
    /// The designated display-safe primary; exempt from policy checks.
    pub display_safe: Option<FeedKey>,
    /// Per-purpose priority overrides. Feeds not listed retain registration
    /// order after the listed ones.
    pub per_purpose_priority: HashMap<Purpose, Vec<FeedKey>>,
    /// Result cache TTL table.
    pub cache: CacheConfig,
}

impl Default for CandelaConfig {
    fn default() -> Self {
        Self {
            feed_timeout: Duration::from_secs(5),
            display_safe: None,
            per_purpose_priority: HashMap::new(),
            cache: CacheConfig::default(),
        }
    }
}

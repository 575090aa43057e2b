//! Redistribution-compliance policy for upstream sources.
//!
//! Each entry declares what a feed's data may be used for and the minimum
//! attribution the license requires. The resolver consults the policy
//! *before* any network I/O: retroactively discarding fetched data does not
//! satisfy a redistribution obligation, so a denied source must never be
//! contacted in the first place.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::FeedKey;

/// What fetched data is about to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Purpose {
    /// Direct display to an end user.
    Display,
    /// Re-serving beyond direct display (exports, API responses to third parties).
    Redistribution,
    /// Holding in a shared cache that outlives the originating request.
    Caching,
    /// Feeding derived computations such as indicators.
    Derivation,
}

impl Purpose {
    /// Stable kebab-case identifier for logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Display => "display",
            Self::Redistribution => "redistribution",
            Self::Caching => "caching",
            Self::Derivation => "derivation",
        }
    }
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-source compliance declaration. Static configuration, never mutated at
/// runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEntry {
    /// Whether the source's data may be displayed to end users.
    pub allow_display: bool,
    /// Whether the source's data may be cached and re-served.
    pub allow_redistribution: bool,
    /// Additional purposes the source's license explicitly permits.
    pub purposes: HashSet<Purpose>,
    /// Minimum attribution string the license requires on served payloads.
    pub attribution: Option<String>,
}

impl PolicyEntry {
    /// An entry permitting display only.
    #[must_use]
    pub fn display_only() -> Self {
        Self {
            allow_display: true,
            ..Self::default()
        }
    }

    /// An entry permitting every purpose this engine distinguishes.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self {
            allow_display: true,
            allow_redistribution: true,
            purposes: [Purpose::Caching, Purpose::Derivation].into(),
            attribution: None,
        }
    }

    /// Attach a required attribution string.
    #[must_use]
    pub fn with_attribution(mut self, text: impl Into<String>) -> Self {
        self.attribution = Some(text.into());
        self
    }

    /// Additionally permit `purpose`.
    #[must_use]
    pub fn permit(mut self, purpose: Purpose) -> Self {
        match purpose {
            Purpose::Display => self.allow_display = true,
            Purpose::Redistribution => self.allow_redistribution = true,
            other => {
                self.purposes.insert(other);
            }
        }
        self
    }

    /// Whether this entry permits `purpose`.
    #[must_use]
    pub fn permits(&self, purpose: Purpose) -> bool {
        match purpose {
            Purpose::Display => self.allow_display,
            Purpose::Redistribution => self.allow_redistribution,
            other => self.purposes.contains(&other),
        }
    }
}

/// Lookup table from feed to compliance entry. Unknown feeds are denied for
/// every purpose.
#[derive(Debug, Clone, Default)]
pub struct SourcePolicy {
    entries: HashMap<FeedKey, PolicyEntry>,
}

impl SourcePolicy {
    /// An empty policy that denies everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the entry for a feed.
    #[must_use]
    pub fn with_entry(mut self, key: FeedKey, entry: PolicyEntry) -> Self {
        self.entries.insert(key, entry);
        self
    }

    /// Whether `key` may be used for `purpose`. Deny-by-default.
    #[must_use]
    pub fn is_allowed(&self, key: FeedKey, purpose: Purpose) -> bool {
        self.entries.get(&key).is_some_and(|e| e.permits(purpose))
    }

    /// Required attribution for `key`, when its entry declares one.
    #[must_use]
    pub fn attribution(&self, key: FeedKey) -> Option<&str> {
        self.entries.get(&key).and_then(|e| e.attribution.as_deref())
    }
}

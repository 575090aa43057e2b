//! Feed metadata types usable across crates.

/// Typed key for identifying feeds in priority lists and cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedKey(pub &'static str);

impl FeedKey {
    /// Construct a new typed feed key from a static name.
    ///
    /// This is useful when configuring per-purpose priorities or policy
    /// entries before the feed instance itself exists.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the inner static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl From<FeedKey> for &'static str {
    fn from(k: FeedKey) -> Self {
        k.0
    }
}

impl std::fmt::Display for FeedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

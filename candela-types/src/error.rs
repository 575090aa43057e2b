use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::Purpose;

/// Unified error type for the candela workspace.
///
/// This wraps argument validation errors, source-tagged transport failures,
/// compliance denials, cache/chain exhaustion, and indicator preconditions.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq)]
#[non_exhaustive]
pub enum CandelaError {
    /// Issues with returned or expected data (malformed payloads, broken invariants).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// An individual feed returned an error.
    #[error("{source_id} failed: {msg}")]
    Source {
        /// Feed name that failed.
        source_id: String,
        /// Human-readable error message.
        msg: String,
    },

    /// An individual feed call exceeded the configured timeout.
    #[error("source timed out: {source_id}")]
    SourceTimeout {
        /// Feed name that timed out.
        source_id: String,
    },

    /// A resource or subject could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "ticks for bitcoin".
        what: String,
    },

    /// Every live source failed and no cached series exists for the key;
    /// contains the individual failures.
    #[error("upstream unavailable for {subject}: {attempts:?}")]
    UpstreamUnavailable {
        /// Subject the resolve was issued for.
        subject: String,
        /// Per-source failures collected while walking the chain.
        attempts: Vec<CandelaError>,
    },

    /// The requested granularity is not derivable from the source's native data.
    #[error("invalid interval: {requested} is not derivable")]
    InvalidInterval {
        /// Kebab-case label of the requested interval.
        requested: String,
        /// Feed the request was evaluated against, when a single feed is at fault.
        source_id: Option<String>,
    },

    /// Policy denied every remaining candidate before any fetch was attempted.
    #[error("compliance blocked: no source permitted for purpose {purpose}")]
    ComplianceBlocked {
        /// Purpose the denied resolve was issued for.
        purpose: Purpose,
    },

    /// An indicator was requested with fewer samples than its minimum window.
    #[error("{indicator} needs >= {required} closes, got {got}")]
    InsufficientData {
        /// Indicator label, e.g. "rsi".
        indicator: String,
        /// Minimum number of samples the indicator requires.
        required: usize,
        /// Number of samples actually available.
        got: usize,
    },
}

impl CandelaError {
    /// Helper: build a `Source` error with the feed name and message.
    pub fn source(source_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            source_id: source_id.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `SourceTimeout` error.
    pub fn source_timeout(source_id: impl Into<String>) -> Self {
        Self::SourceTimeout {
            source_id: source_id.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build an `InvalidInterval` error for an interval label.
    pub fn invalid_interval(requested: impl Into<String>, source_id: Option<&str>) -> Self {
        Self::InvalidInterval {
            requested: requested.into(),
            source_id: source_id.map(str::to_string),
        }
    }

    /// Helper: build an `InsufficientData` error naming the minimum window.
    pub fn insufficient_data(indicator: impl Into<String>, required: usize, got: usize) -> Self {
        Self::InsufficientData {
            indicator: indicator.into(),
            required,
            got,
        }
    }

    /// Returns true if this error should be surfaced to users as actionable.
    ///
    /// Benign not-found conditions are not actionable; chain exhaustion is
    /// classified by its contents.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        match self {
            Self::NotFound { .. } => false,
            Self::UpstreamUnavailable { attempts, .. } => attempts.iter().any(Self::is_actionable),
            _ => true,
        }
    }
}

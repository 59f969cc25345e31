//! Resolution configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Maximum elements of one collection resolved at the same time
    pub max_concurrency: usize,
    /// Deadline for one top-level resolve call, in milliseconds
    pub deadline_ms: Option<u64>,
    /// Open a tracing span for every resolved entity
    pub span_per_entity: bool,
}

impl ResolveConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML; absent keys keep their defaults
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed input
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// With collection fan-out bound
    #[inline]
    #[must_use]
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// With deadline for top-level resolution
    #[inline]
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = Some(u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// With or without per-entity spans
    #[inline]
    #[must_use]
    pub fn with_entity_spans(mut self, enabled: bool) -> Self {
        self.span_per_entity = enabled;
        self
    }

    /// Effective fan-out bound (never zero)
    #[inline]
    #[must_use]
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }

    /// Configured deadline
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 64,
            deadline_ms: None,
            span_per_entity: true,
        }
    }
}

//! The seam between resolution and whatever renders generated source.
//!
//! The registry crate never produces output text itself. An `Emitter`
//! receives the resolution plus a few derived scalars and owns the
//! rendering entirely.

use crate::registry::Registry;
use crate::resolve::ResolutionResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scalar facts derived from a registry and one of its resolutions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitFacts {
    pub total_entry_points: usize,
    pub spec_version: Option<String>,
    pub source_digest: Option<String>,
    /// Whether "not available" symbols for disabled features are wanted.
    pub include_disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl EmitFacts {
    pub fn derive(registry: &Registry, resolution: &ResolutionResult) -> Self {
        Self {
            total_entry_points: resolution.enabled_count(),
            spec_version: registry.spec_version.clone(),
            source_digest: registry.source_digest.clone(),
            include_disabled: true,
            generated_at: None,
        }
    }

    pub fn with_include_disabled(mut self, include_disabled: bool) -> Self {
        self.include_disabled = include_disabled;
        self
    }

    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = Some(generated_at);
        self
    }
}

/// Renders a resolution into output text.
pub trait Emitter {
    type Error: std::error::Error;

    fn emit(&self, resolution: &ResolutionResult, facts: &EmitFacts) -> Result<String, Self::Error>;
}

//! API-version features and extensions.
//!
//! A `Feature` is immutable once parsed. Whether it is enabled depends on a
//! request, so enablement is computed by the resolver and returned next to
//! the feature rather than stored in it.

use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What sort of bundle a `Feature` is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FeatureKind {
    /// A core API revision. May remove entry points.
    ApiVersion,
    /// An optional capability. Only ever adds entry points.
    Extension {
        deprecated: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        superseded_by: Option<String>,
    },
}

/// A named, versioned bundle of entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub kind: FeatureKind,
    /// API version for core revisions, spec revision for extensions.
    pub version: Version,
    pub flavors: BTreeSet<String>,
    pub adds: BTreeSet<String>,
    pub removes: BTreeSet<String>,
}

impl Feature {
    pub fn api_version(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::ApiVersion,
            version,
            flavors: BTreeSet::new(),
            adds: BTreeSet::new(),
            removes: BTreeSet::new(),
        }
    }

    pub fn extension(name: impl Into<String>, spec_revision: Version) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Extension {
                deprecated: false,
                superseded_by: None,
            },
            version: spec_revision,
            flavors: BTreeSet::new(),
            adds: BTreeSet::new(),
            removes: BTreeSet::new(),
        }
    }

    pub fn with_flavors<I, S>(mut self, flavors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flavors.extend(flavors.into_iter().map(Into::into));
        self
    }

    pub fn with_adds<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.adds.extend(names.into_iter().map(Into::into));
        self
    }

    /// Removals only take effect for API-version features.
    pub fn with_removes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.removes.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn deprecated_by(mut self, superseded_by: Option<String>) -> Self {
        if let FeatureKind::Extension { .. } = self.kind {
            self.kind = FeatureKind::Extension {
                deprecated: true,
                superseded_by,
            };
        }
        self
    }

    pub fn is_extension(&self) -> bool {
        matches!(self.kind, FeatureKind::Extension { .. })
    }

    pub fn is_deprecated(&self) -> bool {
        matches!(self.kind, FeatureKind::Extension { deprecated: true, .. })
    }

    pub fn supports(&self, flavor: &str) -> bool {
        self.flavors.contains(flavor)
    }
}

/// Every feature and extension declared by one registry.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    api_versions: BTreeMap<String, Feature>,
    extensions: BTreeMap<String, Feature>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert by name; a later declaration with the same name replaces
    /// the earlier one.
    pub fn insert(&mut self, feature: Feature) -> Option<Feature> {
        let bucket = if feature.is_extension() {
            &mut self.extensions
        } else {
            &mut self.api_versions
        };
        bucket.insert(feature.name.clone(), feature)
    }

    /// API-version features ordered by (version, name).
    pub fn api_versions(&self) -> Vec<&Feature> {
        let mut ordered: Vec<&Feature> = self.api_versions.values().collect();
        ordered.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.name.cmp(&b.name)));
        ordered
    }

    /// Extensions ordered by name.
    pub fn extensions(&self) -> impl Iterator<Item = &Feature> {
        self.extensions.values()
    }

    pub fn api_version(&self, name: &str) -> Option<&Feature> {
        self.api_versions.get(name)
    }

    pub fn extension(&self, name: &str) -> Option<&Feature> {
        self.extensions.get(name)
    }

    pub fn len(&self) -> usize {
        self.api_versions.len() + self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any feature or extension supports `flavor`.
    pub fn knows_flavor(&self, flavor: &str) -> bool {
        self.api_versions
            .values()
            .chain(self.extensions.values())
            .any(|feature| feature.supports(flavor))
    }
}

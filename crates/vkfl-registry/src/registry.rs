//! The parsed registry model.

use crate::catalog::{EntryPointCatalog, EntryPointDecl, TierPolicy};
use crate::error::RegistryError;
use crate::feature::FeatureSet;
use crate::type_graph::TypeGraph;
use sha2::{Digest, Sha256};

/// Everything the resolver needs, extracted from one registry document.
///
/// Immutable after construction; one `Registry` serves any number of
/// resolution requests.
#[derive(Debug, Clone)]
pub struct Registry {
    pub types: TypeGraph,
    pub entry_points: EntryPointCatalog,
    pub features: FeatureSet,
    pub policy: TierPolicy,
    /// Header version string (`VK_HEADER_VERSION`), when declared.
    pub spec_version: Option<String>,
    /// `sha256:`-prefixed digest of the source text, when parsed from text.
    pub source_digest: Option<String>,
}

impl Registry {
    /// Assemble a registry from already-extracted parts.
    ///
    /// Checks the type graph for cycles, classifies every entry point, and
    /// checks that every feature and extension, enabled or not, names only
    /// declared entry points.
    pub fn from_parts(
        types: TypeGraph,
        entry_points: Vec<EntryPointDecl>,
        features: FeatureSet,
        policy: TierPolicy,
    ) -> Result<Self, RegistryError> {
        types.check_acyclic()?;
        let entry_points = EntryPointCatalog::build(entry_points, &types, &policy)?;
        check_references(&entry_points, &features)?;
        Ok(Self {
            types,
            entry_points,
            features,
            policy,
            spec_version: None,
            source_digest: None,
        })
    }

    pub fn with_spec_version(mut self, spec_version: Option<String>) -> Self {
        self.spec_version = spec_version;
        self
    }

    pub fn with_source_digest(mut self, source: &str) -> Self {
        self.source_digest = Some(source_digest(source));
        self
    }
}

/// Fail on the first undeclared name, visiting API versions in version
/// order and then extensions by name.
fn check_references(
    catalog: &EntryPointCatalog,
    features: &FeatureSet,
) -> Result<(), RegistryError> {
    let all = features
        .api_versions()
        .into_iter()
        .chain(features.extensions());
    for feature in all {
        for name in feature.adds.iter().chain(&feature.removes) {
            catalog.require(name, &feature.name)?;
        }
    }
    Ok(())
}

/// Stable digest of registry text, used to stamp generated output.
pub fn source_digest(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}

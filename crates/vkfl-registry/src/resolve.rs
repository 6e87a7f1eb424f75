//! Deterministic resolution of a registry against a request.
//!
//! Pipeline:
//!
//! ```text
//! features   ── version ≤ target ∧ flavor ──▶ enabled API versions
//! extensions ── selected ∧ flavor ∧ ¬deprecated ──▶ enabled extensions
//! (∪ version adds − ∪ version removes) ∪ extension adds ──▶ raw names
//! raw names ── alias chains ──▶ canonical names ── tier ──▶ sorted buckets
//! ```
//!
//! Nothing here writes into the registry: every output is a fresh value.

use crate::catalog::Tier;
use crate::error::RegistryError;
use crate::feature::{Feature, FeatureKind};
use crate::registry::Registry;
use crate::version::{Version, VersionRequest};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_FLAVOR: &str = "vulkan";
pub const ALL_EXTENSIONS: &str = "all";

/// Which extensions a request asks for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExtensionSelection {
    #[default]
    All,
    Named(BTreeSet<String>),
}

impl ExtensionSelection {
    /// Parse a comma separated list. Quotes are stripped, empty items are
    /// skipped, and `all` anywhere in the list selects everything.
    pub fn parse_list(raw: &str) -> Self {
        Self::from_names(raw.split(','))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = BTreeSet::new();
        for name in names {
            let cleaned: String = name
                .as_ref()
                .chars()
                .filter(|c| *c != '"' && *c != '\'')
                .collect();
            let cleaned = cleaned.trim();
            if cleaned == ALL_EXTENSIONS {
                return ExtensionSelection::All;
            }
            if !cleaned.is_empty() {
                selected.insert(cleaned.to_string());
            }
        }
        ExtensionSelection::Named(selected)
    }

    pub fn selects(&self, name: &str) -> bool {
        match self {
            ExtensionSelection::All => true,
            ExtensionSelection::Named(names) => names.contains(name),
        }
    }
}

/// Input to one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub flavor: String,
    pub version: VersionRequest,
    pub extensions: ExtensionSelection,
}

impl Default for ResolutionRequest {
    fn default() -> Self {
        Self {
            flavor: DEFAULT_FLAVOR.to_string(),
            version: VersionRequest::Latest,
            extensions: ExtensionSelection::All,
        }
    }
}

impl ResolutionRequest {
    pub fn new(
        flavor: impl Into<String>,
        version: VersionRequest,
        extensions: ExtensionSelection,
    ) -> Self {
        Self {
            flavor: flavor.into(),
            version,
            extensions,
        }
    }
}

/// Entry-point names per tier, each list sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierBuckets {
    pub global: Vec<String>,
    pub scope_a: Vec<String>,
    pub scope_b: Vec<String>,
}

impl TierBuckets {
    pub fn get(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::Global => &self.global,
            Tier::ScopeA => &self.scope_a,
            Tier::ScopeB => &self.scope_b,
        }
    }

    fn get_mut(&mut self, tier: Tier) -> &mut Vec<String> {
        match tier {
            Tier::Global => &mut self.global,
            Tier::ScopeA => &mut self.scope_a,
            Tier::ScopeB => &mut self.scope_b,
        }
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.scope_a.len() + self.scope_b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(tier, name)` pairs in tier order, names sorted within a tier.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &str)> {
        Tier::ALL
            .into_iter()
            .flat_map(move |tier| self.get(tier).iter().map(move |name| (tier, name.as_str())))
    }
}

/// A feature or extension as reported to emitters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSummary {
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
}

impl From<&Feature> for FeatureSummary {
    fn from(feature: &Feature) -> Self {
        let (deprecated, superseded_by) = match &feature.kind {
            FeatureKind::ApiVersion => (false, None),
            FeatureKind::Extension {
                deprecated,
                superseded_by,
            } => (*deprecated, superseded_by.clone()),
        };
        Self {
            name: feature.name.clone(),
            version: feature.version,
            deprecated,
            superseded_by,
        }
    }
}

/// Enabled/disabled partition of one feature collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureTable {
    pub enabled: Vec<FeatureSummary>,
    pub disabled: Vec<FeatureSummary>,
}

impl FeatureTable {
    fn record(&mut self, feature: &Feature, enabled: bool) {
        let summary = FeatureSummary::from(feature);
        if enabled {
            self.enabled.push(summary);
        } else {
            self.disabled.push(summary);
        }
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.iter().any(|summary| summary.name == name)
    }
}

/// The complete, emitter-ready output of one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub flavor: String,
    pub requested_version: String,
    /// Every enabled canonical entry point, partitioned by tier.
    pub tiers: TierBuckets,
    /// `tiers` minus each tier's own loader.
    pub load_sequences: TierBuckets,
    /// Canonical name to the alias names that enabled it.
    pub aliases: BTreeMap<String, BTreeSet<String>>,
    pub api_versions: FeatureTable,
    pub extensions: FeatureTable,
    /// Requested extension names the registry does not declare.
    pub unknown_extensions: Vec<String>,
    /// False when no feature or extension supports the requested flavor.
    pub flavor_matched: bool,
}

impl ResolutionResult {
    /// Number of enabled canonical entry points.
    pub fn enabled_count(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.tier_of(name).is_some()
    }

    pub fn tier_of(&self, name: &str) -> Option<Tier> {
        Tier::ALL
            .into_iter()
            .find(|tier| self.tiers.get(*tier).iter().any(|entry| entry == name))
    }

    /// All enabled canonical names, sorted.
    pub fn enabled(&self) -> BTreeSet<&str> {
        self.tiers.iter().map(|(_, name)| name).collect()
    }
}

impl Registry {
    pub fn resolve(&self, request: &ResolutionRequest) -> Result<ResolutionResult, RegistryError> {
        resolve(self, request)
    }
}

/// Resolve `request` against `registry`.
///
/// Pure: the same inputs always produce an identical result.
pub fn resolve(
    registry: &Registry,
    request: &ResolutionRequest,
) -> Result<ResolutionResult, RegistryError> {
    let flavor = request.flavor.as_str();
    let catalog = &registry.entry_points;

    let flavor_matched = registry.features.knows_flavor(flavor);
    if !flavor_matched {
        tracing::warn!(flavor, "no feature or extension supports the requested flavor");
    }

    let mut api_versions = FeatureTable::default();
    let mut enabled_versions = Vec::new();
    for feature in registry.features.api_versions() {
        let enabled = request.version.admits(feature.version) && feature.supports(flavor);
        api_versions.record(feature, enabled);
        if enabled {
            enabled_versions.push(feature);
        }
    }

    let mut extensions = FeatureTable::default();
    let mut enabled_extensions = Vec::new();
    for extension in registry.features.extensions() {
        let enabled = request.extensions.selects(&extension.name)
            && extension.supports(flavor)
            && !extension.is_deprecated();
        extensions.record(extension, enabled);
        if enabled {
            enabled_extensions.push(extension);
        }
    }

    let unknown_extensions: Vec<String> = match &request.extensions {
        ExtensionSelection::All => Vec::new(),
        ExtensionSelection::Named(names) => names
            .iter()
            .filter(|name| registry.features.extension(name).is_none())
            .cloned()
            .collect(),
    };
    if !unknown_extensions.is_empty() {
        tracing::warn!(?unknown_extensions, "requested extensions are not declared");
    }

    let mut raw: BTreeSet<&str> = BTreeSet::new();
    let mut removed: BTreeSet<&str> = BTreeSet::new();
    for feature in &enabled_versions {
        for name in &feature.adds {
            catalog.require(name, &feature.name)?;
            raw.insert(name.as_str());
        }
        for name in &feature.removes {
            catalog.require(name, &feature.name)?;
            removed.insert(name.as_str());
        }
    }
    raw.retain(|name| !removed.contains(name));
    for extension in &enabled_extensions {
        for name in &extension.adds {
            catalog.require(name, &extension.name)?;
            raw.insert(name.as_str());
        }
    }

    let mut canonical: BTreeMap<&str, Tier> = BTreeMap::new();
    let mut aliases: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for name in raw {
        let entry = catalog.require(name, name)?;
        if entry.is_alias() {
            aliases
                .entry(entry.canonical.clone())
                .or_default()
                .insert(name.to_string());
        }
        canonical.insert(entry.canonical.as_str(), entry.tier);
    }

    let mut tiers = TierBuckets::default();
    let mut load_sequences = TierBuckets::default();
    for (name, tier) in canonical {
        tiers.get_mut(tier).push(name.to_string());
        if !registry.policy.is_loader_for(name, tier) {
            load_sequences.get_mut(tier).push(name.to_string());
        }
    }

    tracing::debug!(
        flavor,
        version = %request.version,
        api_versions = enabled_versions.len(),
        extensions = enabled_extensions.len(),
        global = tiers.global.len(),
        scope_a = tiers.scope_a.len(),
        scope_b = tiers.scope_b.len(),
        "resolution complete"
    );

    Ok(ResolutionResult {
        flavor: flavor.to_string(),
        requested_version: request.version.to_string(),
        tiers,
        load_sequences,
        aliases,
        api_versions,
        extensions,
        unknown_extensions,
        flavor_matched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntryPointDecl, TierPolicy};
    use crate::feature::FeatureSet;
    use crate::type_graph::TypeGraph;

    fn versioned_registry() -> Registry {
        let mut types = TypeGraph::new();
        types.insert("Context", Vec::<String>::new());
        let decls = vec![
            EntryPointDecl::canonical("A", Some("Context")),
            EntryPointDecl::canonical("B", Some("Context")),
            EntryPointDecl::canonical("C", Some("Context")),
        ];
        let mut features = FeatureSet::new();
        features.insert(
            Feature::api_version("V_1_0", Version::new(1, 0))
                .with_flavors(["vulkan"])
                .with_adds(["A", "B"]),
        );
        features.insert(
            Feature::api_version("V_1_1", Version::new(1, 1))
                .with_flavors(["vulkan"])
                .with_adds(["C"])
                .with_removes(["B"]),
        );
        Registry::from_parts(types, decls, features, TierPolicy::vulkan()).unwrap()
    }

    fn request(version: &str) -> ResolutionRequest {
        ResolutionRequest::new("vulkan", version.parse().unwrap(), ExtensionSelection::All)
    }

    fn enabled(result: &ResolutionResult) -> Vec<&str> {
        result.enabled().into_iter().collect()
    }

    #[test]
    fn removal_applies_from_its_version_on() {
        let registry = versioned_registry();
        assert_eq!(
            enabled(&resolve(&registry, &request("1.0")).unwrap()),
            vec!["A", "B"]
        );
        assert_eq!(
            enabled(&resolve(&registry, &request("1.1")).unwrap()),
            vec!["A", "C"]
        );
        assert_eq!(
            enabled(&resolve(&registry, &request("latest")).unwrap()),
            vec!["A", "C"]
        );
    }

    #[test]
    fn feature_tables_partition_by_version() {
        let registry = versioned_registry();
        let result = resolve(&registry, &request("1.0")).unwrap();
        assert!(result.api_versions.is_enabled("V_1_0"));
        assert_eq!(result.api_versions.disabled.len(), 1);
        assert_eq!(result.api_versions.disabled[0].name, "V_1_1");
    }

    #[test]
    fn unknown_flavor_resolves_empty() {
        let registry = versioned_registry();
        let result = resolve(
            &registry,
            &ResolutionRequest::new("openxr", VersionRequest::Latest, ExtensionSelection::All),
        )
        .unwrap();
        assert!(!result.flavor_matched);
        assert!(result.tiers.is_empty());
        assert_eq!(result.api_versions.disabled.len(), 2);
    }

    #[test]
    fn dangling_removal_names_the_entry_point() {
        let mut features = FeatureSet::new();
        features.insert(
            Feature::api_version("V_1_0", Version::new(1, 0))
                .with_flavors(["vulkan"])
                .with_removes(["Z"]),
        );

        let err = Registry::from_parts(TypeGraph::new(), Vec::new(), features, TierPolicy::vulkan())
            .expect_err("must fail");
        assert_eq!(err, RegistryError::dangling("Z", "V_1_0"));
    }

    #[test]
    fn extension_list_parsing_follows_cli_conventions() {
        assert_eq!(
            ExtensionSelection::parse_list("VK_KHR_a,all"),
            ExtensionSelection::All
        );
        let named = ExtensionSelection::parse_list("'VK_KHR_a',,\"VK_KHR_b\" ");
        let expected = BTreeSet::from(["VK_KHR_a".to_string(), "VK_KHR_b".to_string()]);
        assert_eq!(named, ExtensionSelection::Named(expected));
        assert_eq!(
            ExtensionSelection::parse_list(""),
            ExtensionSelection::Named(BTreeSet::new())
        );
    }
}

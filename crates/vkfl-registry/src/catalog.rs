//! Entry-point catalog and loading-tier classification.
//!
//! Every declared entry point is either canonical (it has a signature and
//! an owner type) or an alias of another entry point. Tiers and canonical
//! names are computed once, when the catalog is built, and never change.
//!
//! ```text
//! GLOBAL   ← bootstrap allow-list (usable before any instance exists)
//! SCOPE_B  ← owner descends from the device root (minus the device loader)
//! SCOPE_A  ← everything else
//! ```

use crate::error::RegistryError;
use crate::type_graph::TypeGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Longest alias chain followed before declaring it cyclic.
pub const MAX_ALIAS_DEPTH: usize = 8;

pub const VK_GET_INSTANCE_PROC_ADDR: &str = "vkGetInstanceProcAddr";
pub const VK_GET_DEVICE_PROC_ADDR: &str = "vkGetDeviceProcAddr";

const VULKAN_GLOBAL_ENTRY_POINTS: [&str; 5] = [
    "vkEnumerateInstanceVersion",
    "vkEnumerateInstanceExtensionProperties",
    "vkEnumerateInstanceLayerProperties",
    "vkCreateInstance",
    VK_GET_INSTANCE_PROC_ADDR,
];
const VULKAN_SCOPE_B_ROOT: &str = "VkDevice";

/// Loading tier of an entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Global,
    ScopeA,
    ScopeB,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Global, Tier::ScopeA, Tier::ScopeB];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Global => "global",
            Tier::ScopeA => "scope_a",
            Tier::ScopeB => "scope_b",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry-independent constants that drive tier classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct TierPolicy {
    /// Entry points callable before any context object exists.
    pub global_entry_points: BTreeSet<String>,
    /// Owner types descending from this root classify as SCOPE_B.
    pub scope_b_root: String,
    /// Resolves GLOBAL and SCOPE_A entry points; cannot load itself.
    pub global_loader: String,
    /// Resolves SCOPE_B entry points; forced into SCOPE_A.
    pub scope_b_loader: String,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self::vulkan()
    }
}

impl TierPolicy {
    pub fn vulkan() -> Self {
        Self {
            global_entry_points: VULKAN_GLOBAL_ENTRY_POINTS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            scope_b_root: VULKAN_SCOPE_B_ROOT.to_string(),
            global_loader: VK_GET_INSTANCE_PROC_ADDR.to_string(),
            scope_b_loader: VK_GET_DEVICE_PROC_ADDR.to_string(),
        }
    }

    /// Classify a canonical entry point by name and owner type.
    pub fn classify(
        &self,
        types: &TypeGraph,
        name: &str,
        owner_type: Option<&str>,
    ) -> Result<Tier, RegistryError> {
        if self.global_entry_points.contains(name) {
            return Ok(Tier::Global);
        }
        if name == self.scope_b_loader {
            return Ok(Tier::ScopeA);
        }
        match owner_type {
            Some(owner) if types.is_descendant(owner, &self.scope_b_root)? => Ok(Tier::ScopeB),
            _ => Ok(Tier::ScopeA),
        }
    }

    /// Whether `name` is the loader for `tier` and so cannot appear in
    /// that tier's own load sequence.
    pub fn is_loader_for(&self, name: &str, tier: Tier) -> bool {
        match tier {
            Tier::Global => name == self.global_loader,
            Tier::ScopeA => false,
            Tier::ScopeB => name == self.scope_b_loader,
        }
    }
}

/// Either a real signature or a redirect to another entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPointKind {
    Canonical { owner_type: Option<String> },
    AliasOf(String),
}

/// An entry point as declared by the registry, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointDecl {
    pub name: String,
    pub kind: EntryPointKind,
}

impl EntryPointDecl {
    pub fn canonical(name: impl Into<String>, owner_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            kind: EntryPointKind::Canonical {
                owner_type: owner_type.map(str::to_string),
            },
        }
    }

    pub fn alias(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryPointKind::AliasOf(target.into()),
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self.kind, EntryPointKind::AliasOf(_))
    }
}

/// A classified entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub decl: EntryPointDecl,
    /// Name at the end of the alias chain (own name when canonical).
    pub canonical: String,
    /// Owner type of the canonical entry point.
    pub owner_type: Option<String>,
    pub tier: Tier,
}

impl EntryPoint {
    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn is_alias(&self) -> bool {
        self.decl.is_alias()
    }

    pub fn alias_target(&self) -> Option<&str> {
        match &self.decl.kind {
            EntryPointKind::AliasOf(target) => Some(target),
            EntryPointKind::Canonical { .. } => None,
        }
    }
}

/// All declared entry points, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct EntryPointCatalog {
    entries: BTreeMap<String, EntryPoint>,
}

impl EntryPointCatalog {
    /// Build and classify the catalog.
    ///
    /// Duplicate names keep the first declaration.
    pub fn build(
        decls: Vec<EntryPointDecl>,
        types: &TypeGraph,
        policy: &TierPolicy,
    ) -> Result<Self, RegistryError> {
        let mut declared: BTreeMap<String, EntryPointDecl> = BTreeMap::new();
        for decl in decls {
            if declared.contains_key(&decl.name) {
                tracing::debug!(entry_point = %decl.name, "duplicate declaration ignored");
                continue;
            }
            declared.insert(decl.name.clone(), decl);
        }

        let mut entries = BTreeMap::new();
        for (name, decl) in &declared {
            let (canonical, owner_type) = follow_alias_chain(&declared, name)?;
            let tier = policy.classify(types, canonical, owner_type)?;
            entries.insert(
                name.clone(),
                EntryPoint {
                    decl: decl.clone(),
                    canonical: canonical.to_string(),
                    owner_type: owner_type.map(str::to_string),
                    tier,
                },
            );
        }

        tracing::debug!(
            entry_points = entries.len(),
            aliases = entries.values().filter(|entry| entry.is_alias()).count(),
            "entry-point catalog built"
        );
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&EntryPoint> {
        self.entries.get(name)
    }

    /// Iterate entry points in name order.
    pub fn iter(&self) -> impl Iterator<Item = &EntryPoint> {
        self.entries.values()
    }

    /// Look up `name` on behalf of `referrer`, failing on a miss.
    pub fn require(&self, name: &str, referrer: &str) -> Result<&EntryPoint, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::dangling(name, referrer))
    }

    pub fn tier_of(&self, name: &str) -> Option<Tier> {
        self.get(name).map(|entry| entry.tier)
    }
}

/// Follow `AliasOf` links from `start` to a canonical declaration.
fn follow_alias_chain<'d>(
    declared: &'d BTreeMap<String, EntryPointDecl>,
    start: &'d str,
) -> Result<(&'d str, Option<&'d str>), RegistryError> {
    let mut current = start;
    for _ in 0..=MAX_ALIAS_DEPTH {
        let decl = declared
            .get(current)
            .ok_or_else(|| RegistryError::dangling(current, start))?;
        match &decl.kind {
            EntryPointKind::Canonical { owner_type } => {
                return Ok((decl.name.as_str(), owner_type.as_deref()));
            }
            EntryPointKind::AliasOf(target) => current = target.as_str(),
        }
    }
    Err(RegistryError::CyclicAlias {
        entry_point: start.to_string(),
    })
}

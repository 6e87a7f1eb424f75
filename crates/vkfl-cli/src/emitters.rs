//! Renderers for `vkfl resolve` output.

use serde::Serialize;
use std::fmt::Write as _;
use vkfl_registry::{EmitFacts, Emitter, FeatureTable, ResolutionResult, Tier};

/// Machine-readable output: the facts plus the resolution itself.
pub struct JsonEmitter;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonPayload<'a> {
    facts: &'a EmitFacts,
    resolution: &'a ResolutionResult,
}

impl Emitter for JsonEmitter {
    type Error = serde_json::Error;

    fn emit(
        &self,
        resolution: &ResolutionResult,
        facts: &EmitFacts,
    ) -> Result<String, Self::Error> {
        if facts.include_disabled {
            return serde_json::to_string_pretty(&JsonPayload { facts, resolution });
        }
        let mut trimmed = resolution.clone();
        trimmed.api_versions.disabled.clear();
        trimmed.extensions.disabled.clear();
        serde_json::to_string_pretty(&JsonPayload {
            facts,
            resolution: &trimmed,
        })
    }
}

/// Human-readable summary, one entry point per line grouped by tier.
pub struct SummaryEmitter;

impl SummaryEmitter {
    fn write_table(
        out: &mut String,
        label: &str,
        table: &FeatureTable,
        include_disabled: bool,
    ) -> std::fmt::Result {
        let enabled: Vec<&str> = table.enabled.iter().map(|s| s.name.as_str()).collect();
        writeln!(
            out,
            "  {label} enabled ({}): {}",
            enabled.len(),
            enabled.join(", ")
        )?;
        if include_disabled && !table.disabled.is_empty() {
            writeln!(out, "  {label} disabled ({}):", table.disabled.len())?;
            for summary in &table.disabled {
                match (summary.deprecated, summary.superseded_by.as_deref()) {
                    (true, Some(successor)) => {
                        writeln!(out, "    - {} (deprecated, use {successor})", summary.name)?
                    }
                    (true, None) => writeln!(out, "    - {} (deprecated)", summary.name)?,
                    (false, _) => writeln!(out, "    - {}", summary.name)?,
                }
            }
        }
        Ok(())
    }
}

impl Emitter for SummaryEmitter {
    type Error = std::fmt::Error;

    fn emit(
        &self,
        resolution: &ResolutionResult,
        facts: &EmitFacts,
    ) -> Result<String, Self::Error> {
        let mut out = String::new();
        writeln!(
            out,
            "vkfl resolve --flavor {} --api {}",
            resolution.flavor, resolution.requested_version
        )?;
        if let Some(version) = &facts.spec_version {
            writeln!(out, "  Header version: {version}")?;
        }
        if let Some(digest) = &facts.source_digest {
            writeln!(out, "  Source: {digest}")?;
        }
        if let Some(at) = facts.generated_at {
            writeln!(out, "  Generated: {}", at.to_rfc3339())?;
        }
        writeln!(out, "  Entry points: {}", facts.total_entry_points)?;

        let include_disabled = facts.include_disabled;
        Self::write_table(&mut out, "API versions", &resolution.api_versions, include_disabled)?;
        Self::write_table(&mut out, "Extensions", &resolution.extensions, include_disabled)?;
        if !resolution.unknown_extensions.is_empty() {
            let unknown = resolution.unknown_extensions.join(", ");
            writeln!(out, "  Unknown extensions: {unknown}")?;
        }

        for tier in Tier::ALL {
            let names = resolution.tiers.get(tier);
            writeln!(out, "  [{tier}] ({})", names.len())?;
            for name in names {
                let loaded = resolution.load_sequences.get(tier).contains(name);
                let marker = if loaded { "" } else { " (loader)" };
                match resolution.aliases.get(name) {
                    Some(aliases) => {
                        let aliases: Vec<&str> = aliases.iter().map(String::as_str).collect();
                        writeln!(out, "    {name}{marker} <- {}", aliases.join(", "))?
                    }
                    None => writeln!(out, "    {name}{marker}")?,
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vkfl_registry::{
        EntryPointDecl, Feature, FeatureSet, Registry, ResolutionRequest, TierPolicy, TypeGraph,
        Version,
    };

    fn fixture() -> (Registry, ResolutionResult) {
        let mut types = TypeGraph::new();
        types.insert("VkInstance", Vec::<String>::new());
        types.insert("VkDevice", Vec::<String>::new());

        let mut features = FeatureSet::new();
        features.insert(
            Feature::api_version("VK_VERSION_1_0", Version::new(1, 0))
                .with_flavors(["vulkan"])
                .with_adds(["vkGetInstanceProcAddr", "vkCreateInstance", "vkDestroyDevice"]),
        );
        features.insert(
            Feature::extension("VK_EXT_old", Version::new(3, 0))
                .with_flavors(["vulkan"])
                .deprecated_by(Some("VK_EXT_new".to_string())),
        );
        features.insert(
            Feature::extension("VK_KHR_destroy", Version::new(1, 0))
                .with_flavors(["vulkan"])
                .with_adds(["vkDestroyDeviceKHR"]),
        );

        let registry = Registry::from_parts(
            types,
            vec![
                EntryPointDecl::canonical("vkGetInstanceProcAddr", Some("VkInstance")),
                EntryPointDecl::canonical("vkCreateInstance", None),
                EntryPointDecl::canonical("vkDestroyDevice", Some("VkDevice")),
                EntryPointDecl::alias("vkDestroyDeviceKHR", "vkDestroyDevice"),
            ],
            features,
            TierPolicy::vulkan(),
        )
        .expect("registry should build")
        .with_spec_version(Some("290".to_string()));
        let resolution = registry
            .resolve(&ResolutionRequest::default())
            .expect("resolution should succeed");
        (registry, resolution)
    }

    #[test]
    fn json_payload_carries_facts_and_tiers() {
        let (registry, resolution) = fixture();
        let facts = EmitFacts::derive(&registry, &resolution);
        let text = JsonEmitter.emit(&resolution, &facts).expect("json");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");

        assert_eq!(value["facts"]["totalEntryPoints"], 3);
        assert_eq!(value["facts"]["specVersion"], "290");
        assert_eq!(
            value["resolution"]["loadSequences"]["global"],
            serde_json::json!(["vkCreateInstance"])
        );
        assert_eq!(
            value["resolution"]["extensions"]["disabled"][0]["supersededBy"],
            "VK_EXT_new"
        );
    }

    #[test]
    fn json_drops_disabled_tables_when_asked() {
        let (registry, resolution) = fixture();
        let facts = EmitFacts::derive(&registry, &resolution).with_include_disabled(false);
        let text = JsonEmitter.emit(&resolution, &facts).expect("json");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");

        assert_eq!(
            value["resolution"]["extensions"]["disabled"],
            serde_json::json!([])
        );
        assert_eq!(
            value["resolution"]["extensions"]["enabled"][0]["name"],
            "VK_KHR_destroy"
        );
    }

    #[test]
    fn summary_marks_loaders_aliases_and_deprecations() {
        let (registry, resolution) = fixture();
        let facts = EmitFacts::derive(&registry, &resolution);
        let text = SummaryEmitter.emit(&resolution, &facts).expect("summary");

        assert!(text.contains("  Header version: 290\n"));
        assert!(text.contains("    vkGetInstanceProcAddr (loader)\n"));
        assert!(text.contains("    vkDestroyDevice <- vkDestroyDeviceKHR\n"));
        assert!(text.contains("    - VK_EXT_old (deprecated, use VK_EXT_new)\n"));

        let quiet = SummaryEmitter
            .emit(&resolution, &facts.with_include_disabled(false))
            .expect("summary");
        assert!(!quiet.contains("VK_EXT_old"));
    }
}

//! Registry XML to `Registry`.
//!
//! Reads only what resolution needs: handle parentage, command owners and
//! aliases, feature/extension command lists, deprecation markers, and the
//! header version. Everything else in the document is ignored.

use crate::catalog::{EntryPointDecl, TierPolicy};
use crate::error::RegistryError;
use crate::feature::{Feature, FeatureSet};
use crate::registry::Registry;
use crate::type_graph::TypeGraph;
use crate::version::Version;
use roxmltree::{Document, Node};
use std::collections::BTreeSet;

pub const HEADER_VERSION_TYPE: &str = "VK_HEADER_VERSION";

/// Parse registry XML into a classified, immutable model.
pub fn parse_registry(text: &str, policy: TierPolicy) -> Result<Registry, RegistryError> {
    let document = Document::parse(text)
        .map_err(|error| RegistryError::malformed("registry", error.to_string()))?;
    let root = document.root_element();
    if !root.has_tag_name("registry") {
        return Err(RegistryError::malformed(
            root.tag_name().name(),
            "document root must be <registry>",
        ));
    }

    let mut types = TypeGraph::new();
    let mut spec_version = None;
    for node in child_elements(root, "types").flat_map(|types| child_elements(types, "type")) {
        if let Some(version) = header_version(node) {
            spec_version = Some(version);
        }
        if let Some(name) = type_name(node) {
            types.insert(name, type_parents(node));
        }
    }

    let mut entry_points = Vec::new();
    let commands = child_elements(root, "commands")
        .flat_map(|commands| child_elements(commands, "command"));
    for node in commands {
        entry_points.push(parse_command(node)?);
    }

    let mut features = FeatureSet::new();
    for node in child_elements(root, "feature") {
        features.insert(parse_feature(node)?);
    }
    let extensions = child_elements(root, "extensions")
        .flat_map(|extensions| child_elements(extensions, "extension"));
    for node in extensions {
        features.insert(parse_extension(node)?);
    }

    tracing::debug!(
        types = types.len(),
        entry_points = entry_points.len(),
        features = features.len(),
        spec_version = spec_version.as_deref().unwrap_or("<none>"),
        "registry parsed"
    );

    Ok(Registry::from_parts(types, entry_points, features, policy)?
        .with_spec_version(spec_version)
        .with_source_digest(text))
}

fn child_elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.has_tag_name(tag))
}

fn child_text<'a>(node: Node<'a, '_>, tag: &'static str) -> Option<&'a str> {
    child_elements(node, tag)
        .next()
        .and_then(|child| child.text())
        .map(str::trim)
}

fn required_attribute<'a>(node: Node<'a, '_>, attribute: &str) -> Result<&'a str, RegistryError> {
    node.attribute(attribute)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            let element = match node.attribute("name") {
                Some(name) => format!("{} name=\"{name}\"", node.tag_name().name()),
                None => node.tag_name().name().to_string(),
            };
            RegistryError::malformed(element, format!("missing `{attribute}` attribute"))
        })
}

fn comma_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn type_name<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute("name").or_else(|| child_text(node, "name"))
}

/// Declared parents plus the alias target, so an aliased handle type
/// inherits its target's ancestry.
fn type_parents(node: Node<'_, '_>) -> BTreeSet<String> {
    let mut parents = node
        .attribute("parent")
        .map(comma_list)
        .unwrap_or_default();
    let alias = node
        .attribute("alias")
        .map(str::trim)
        .filter(|alias| !alias.is_empty());
    if let Some(alias) = alias {
        parents.insert(alias.to_string());
    }
    parents
}

/// `#define <name>VK_HEADER_VERSION</name> 290` yields `290`.
fn header_version(node: Node<'_, '_>) -> Option<String> {
    let name = child_elements(node, "name").next()?;
    if name.text().map(str::trim) != Some(HEADER_VERSION_TYPE) {
        return None;
    }
    name.next_sibling()
        .filter(|sibling| sibling.is_text())
        .and_then(|sibling| sibling.text())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_command(node: Node<'_, '_>) -> Result<EntryPointDecl, RegistryError> {
    if node.attribute("alias").is_some() {
        let name = required_attribute(node, "name")?;
        let target = required_attribute(node, "alias")?;
        return Ok(EntryPointDecl::alias(name, target));
    }

    let proto = child_elements(node, "proto")
        .next()
        .ok_or_else(|| RegistryError::malformed("command", "missing <proto>"))?;
    let name = child_text(proto, "name")
        .filter(|name| !name.is_empty())
        .ok_or_else(|| RegistryError::malformed("command/proto", "missing <name>"))?;
    let owner_type = child_elements(node, "param")
        .next()
        .and_then(|param| child_text(param, "type"));

    Ok(EntryPointDecl::canonical(name, owner_type))
}

/// Command names listed under every `<{block}>` child of `node`.
fn block_commands(
    node: Node<'_, '_>,
    block: &'static str,
) -> Result<BTreeSet<String>, RegistryError> {
    let mut names = BTreeSet::new();
    for command in child_elements(node, block).flat_map(|b| child_elements(b, "command")) {
        names.insert(required_attribute(command, "name")?.to_string());
    }
    Ok(names)
}

fn parse_feature(node: Node<'_, '_>) -> Result<Feature, RegistryError> {
    let name = required_attribute(node, "name")?;
    let version: Version = required_attribute(node, "number")?.parse()?;
    let flavors = comma_list(required_attribute(node, "api")?);

    Ok(Feature::api_version(name, version)
        .with_flavors(flavors)
        .with_adds(block_commands(node, "require")?)
        .with_removes(block_commands(node, "remove")?))
}

fn parse_extension(node: Node<'_, '_>) -> Result<Feature, RegistryError> {
    let name = required_attribute(node, "name")?;
    let flavors = comma_list(required_attribute(node, "supported")?);
    let spec_revision = extension_spec_revision(node, name)?;

    let mut extension = Feature::extension(name, spec_revision)
        .with_flavors(flavors)
        .with_adds(block_commands(node, "require")?);

    let marker = node
        .attribute("deprecatedby")
        .or_else(|| node.attribute("obsoletedby"));
    if let Some(replacement) = marker {
        let replacement = replacement.trim();
        let superseded_by = (!replacement.is_empty()).then(|| replacement.to_string());
        extension = extension.deprecated_by(superseded_by);
    }
    Ok(extension)
}

/// Value of the `<NAME>_SPEC_VERSION` enum, or 0.0 when absent.
fn extension_spec_revision(node: Node<'_, '_>, name: &str) -> Result<Version, RegistryError> {
    let enum_name = format!("{}_SPEC_VERSION", name.to_uppercase());
    let value = child_elements(node, "require")
        .flat_map(|require| child_elements(require, "enum"))
        .find(|e| e.attribute("name") == Some(enum_name.as_str()))
        .and_then(|e| e.attribute("value"));
    match value {
        Some(raw) => raw.trim_matches('"').parse(),
        None => Ok(Version::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Tier;
    use crate::feature::FeatureKind;

    const MINI: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<registry>
  <types>
    <type api="vulkan" category="define">// Version of this file
#define <name>VK_HEADER_VERSION</name> 290</type>
    <type category="handle"><type>VK_DEFINE_HANDLE</type>(<name>VkInstance</name>)</type>
    <type category="handle" parent="VkInstance"><type>VK_DEFINE_HANDLE</type>(<name>VkPhysicalDevice</name>)</type>
    <type category="handle" parent="VkPhysicalDevice"><type>VK_DEFINE_HANDLE</type>(<name>VkDevice</name>)</type>
    <type category="handle" parent="VkDevice"><type>VK_DEFINE_HANDLE</type>(<name>VkQueue</name>)</type>
    <type category="handle" parent="VkDevice"><type>VK_DEFINE_NON_DISPATCHABLE_HANDLE</type>(<name>VkDescriptorUpdateTemplate</name>)</type>
    <type category="handle" name="VkDescriptorUpdateTemplateKHR" alias="VkDescriptorUpdateTemplate"/>
  </types>
  <commands>
    <command><proto><type>VkResult</type> <name>vkCreateInstance</name></proto><param>const <type>VkInstanceCreateInfo</type>* <name>pCreateInfo</name></param></command>
    <command><proto><type>VkResult</type> <name>vkQueueWaitIdle</name></proto><param><type>VkQueue</type> <name>queue</name></param></command>
    <command name="vkQueueWaitIdleKHR" alias="vkQueueWaitIdle"/>
  </commands>
  <feature api="vulkan,vulkansc" name="VK_VERSION_1_0" number="1.0">
    <require><command name="vkCreateInstance"/></require>
    <require><command name="vkQueueWaitIdle"/></require>
  </feature>
  <extensions>
    <extension name="VK_KHR_wait" number="1" supported="vulkan" deprecatedby="">
      <require>
        <enum value="3" name="VK_KHR_WAIT_SPEC_VERSION"/>
        <command name="vkQueueWaitIdleKHR"/>
      </require>
    </extension>
  </extensions>
</registry>"#;

    #[test]
    fn parses_mini_registry() {
        let registry = parse_registry(MINI, TierPolicy::vulkan()).expect("registry should parse");

        assert_eq!(registry.spec_version.as_deref(), Some("290"));
        assert!(registry.source_digest.is_some());
        assert!(registry.types.is_descendant("VkQueue", "VkDevice").unwrap());
        assert!(
            registry
                .types
                .is_descendant("VkDescriptorUpdateTemplateKHR", "VkDevice")
                .unwrap()
        );

        let alias = registry.entry_points.get("vkQueueWaitIdleKHR").unwrap();
        assert_eq!(alias.canonical, "vkQueueWaitIdle");
        assert_eq!(alias.tier, Tier::ScopeB);
        assert_eq!(
            registry.entry_points.tier_of("vkCreateInstance"),
            Some(Tier::Global)
        );

        let feature = registry.features.api_version("VK_VERSION_1_0").unwrap();
        assert_eq!(feature.version, Version::new(1, 0));
        assert!(feature.supports("vulkansc"));
        assert_eq!(feature.adds.len(), 2);

        let ext = registry.features.extension("VK_KHR_wait").unwrap();
        assert_eq!(ext.version, Version::new(3, 0));
        assert!(ext.is_deprecated());
    }

    #[test]
    fn obsoletedby_marks_an_extension_deprecated() {
        let xml = r#"<registry>
  <extensions>
    <extension name="VK_EXT_old" number="1" supported="vulkan" obsoletedby="VK_EXT_new"/>
    <extension name="VK_EXT_gone" number="2" supported="vulkan" obsoletedby=""/>
    <extension name="VK_EXT_live" number="3" supported="vulkan"/>
  </extensions>
</registry>"#;
        let registry = parse_registry(xml, TierPolicy::vulkan()).expect("registry should parse");
        let kind = |name: &str| registry.features.extension(name).unwrap().kind.clone();

        assert_eq!(
            kind("VK_EXT_old"),
            FeatureKind::Extension {
                deprecated: true,
                superseded_by: Some("VK_EXT_new".to_string()),
            }
        );
        assert_eq!(
            kind("VK_EXT_gone"),
            FeatureKind::Extension {
                deprecated: true,
                superseded_by: None,
            }
        );
        assert!(!registry.features.extension("VK_EXT_live").unwrap().is_deprecated());
    }

    #[test]
    fn feature_without_number_is_malformed() {
        let xml = r#"<registry><feature api="vulkan" name="VK_VERSION_1_0"/></registry>"#;
        let err = parse_registry(xml, TierPolicy::vulkan()).expect_err("must fail");
        let RegistryError::MalformedSpecification { element, .. } = err else {
            panic!("expected a malformed specification error, got {err:?}");
        };
        assert!(element.contains("VK_VERSION_1_0"));
    }

    #[test]
    fn bad_feature_number_is_unknown_version() {
        let xml =
            r#"<registry><feature api="vulkan" name="VK_VERSION_X" number="one"/></registry>"#;
        let err = parse_registry(xml, TierPolicy::vulkan()).expect_err("must fail");
        assert_eq!(err, RegistryError::UnknownVersionFormat("one".to_string()));
    }

    #[test]
    fn command_without_proto_is_malformed() {
        let xml = r#"<registry><commands><command/></commands></registry>"#;
        let err = parse_registry(xml, TierPolicy::vulkan()).expect_err("must fail");
        assert!(matches!(err, RegistryError::MalformedSpecification { .. }));
    }

    #[test]
    fn non_registry_root_and_bad_xml_are_malformed() {
        assert!(matches!(
            parse_registry("<spec/>", TierPolicy::vulkan()),
            Err(RegistryError::MalformedSpecification { .. })
        ));
        assert!(matches!(
            parse_registry("<registry>", TierPolicy::vulkan()),
            Err(RegistryError::MalformedSpecification { .. })
        ));
    }
}

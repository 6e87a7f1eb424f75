//! `vkfl.toml`: persistent defaults for `vkfl resolve`.
//!
//! ```toml
//! spec = "third_party/vk.xml"
//! flavor = "vulkan"
//! api = "1.3"
//! extensions = ["VK_KHR_surface", "VK_KHR_swapchain"]   # or "all"
//! generate_disabled = true
//!
//! [tiers]
//! scope_b_root = "VkDevice"
//! ```
//!
//! Command-line flags always win over file values. A relative `spec` is
//! taken relative to the directory holding the config file.

use crate::support::CliError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use vkfl_registry::{ExtensionSelection, ResolutionRequest, TierPolicy, VersionRequest};

pub const DEFAULT_CONFIG_PATH: &str = "vkfl.toml";
const DEFAULT_FLAVOR: &str = "vulkan";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub spec: Option<PathBuf>,
    pub flavor: Option<String>,
    pub api: Option<String>,
    pub extensions: Option<ExtensionsConfig>,
    pub generate_disabled: Option<bool>,
    pub tiers: Option<TierPolicy>,
}

/// `extensions` may be a TOML array or a comma separated string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExtensionsConfig {
    List(Vec<String>),
    Text(String),
}

impl ExtensionsConfig {
    fn selection(&self) -> ExtensionSelection {
        match self {
            ExtensionsConfig::List(names) => ExtensionSelection::from_names(names),
            ExtensionsConfig::Text(raw) => ExtensionSelection::parse_list(raw),
        }
    }
}

/// Request-shaping flags shared by the commands.
#[derive(Debug, Clone, Default)]
pub struct RequestOverrides {
    pub flavor: Option<String>,
    pub api: Option<String>,
    pub extensions: Option<String>,
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, CliError> {
        let mut config: Self = toml::from_str(text).map_err(|source| CliError::ParseConfig {
            path: path.display().to_string(),
            source,
        })?;
        if let Some(dir) = path.parent() {
            config.spec = config.spec.take().map(|spec| {
                if spec.is_relative() {
                    dir.join(spec)
                } else {
                    spec
                }
            });
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load `explicit` if given, else `./vkfl.toml` if it exists, else
    /// defaults.
    pub fn discover(explicit: Option<&str>) -> Result<Self, CliError> {
        match explicit {
            Some(path) => Self::load(Path::new(path)),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_PATH);
                if fallback.is_file() {
                    tracing::debug!(path = DEFAULT_CONFIG_PATH, "using default config file");
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn tier_policy(&self) -> TierPolicy {
        self.tiers.clone().unwrap_or_default()
    }

    pub fn generate_disabled(&self) -> bool {
        self.generate_disabled.unwrap_or(true)
    }

    /// Merge file values with flag overrides into a resolution request.
    pub fn request(&self, overrides: &RequestOverrides) -> Result<ResolutionRequest, CliError> {
        let flavor = overrides
            .flavor
            .clone()
            .or_else(|| self.flavor.clone())
            .unwrap_or_else(|| DEFAULT_FLAVOR.to_string());

        let version = match overrides.api.as_deref().or(self.api.as_deref()) {
            Some(raw) => raw.parse::<VersionRequest>()?,
            None => VersionRequest::Latest,
        };

        let extensions = match (&overrides.extensions, &self.extensions) {
            (Some(raw), _) => ExtensionSelection::parse_list(raw),
            (None, Some(configured)) => configured.selection(),
            (None, None) => ExtensionSelection::All,
        };

        Ok(ResolutionRequest::new(flavor, version, extensions))
    }
}

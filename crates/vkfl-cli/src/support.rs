use crate::config::GeneratorConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vkfl_registry::{Registry, RegistryError, parse_registry};

/// Relative location of the registry inside an SDK or install prefix.
pub const REGISTRY_SUBPATH: &str = "share/vulkan/registry/vk.xml";

const SDK_ENV_VARS: [&str; 2] = ["VULKAN_SDK", "VULKAN_SDK_PATH"];
const SYSTEM_PREFIXES: [&str; 2] = ["/usr/local", "/usr"];

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ParseConfig {
        path: String,
        source: toml::de::Error,
    },

    #[error("vk.xml not found; searched: {}", .searched.join(", "))]
    RegistryNotFound { searched: Vec<String> },
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the default `warn` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn exit_with(err: &CliError) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}

pub fn load_config_or_exit(config_arg: Option<&str>) -> GeneratorConfig {
    GeneratorConfig::discover(config_arg).unwrap_or_else(|e| exit_with(&e))
}

/// Candidate registry paths in search order, for the given environment.
pub fn registry_candidates<F>(env: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let mut prefixes: Vec<PathBuf> = SDK_ENV_VARS
        .into_iter()
        .filter_map(&env)
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .collect();
    if let Some(home) = env("HOME").filter(|home| !home.is_empty()) {
        prefixes.push(Path::new(&home).join(".local"));
    }
    prefixes.extend(SYSTEM_PREFIXES.iter().map(PathBuf::from));

    prefixes
        .into_iter()
        .map(|prefix| prefix.join(REGISTRY_SUBPATH))
        .collect()
}

/// Pick the registry file: an explicit path wins, then the config file's
/// `spec`, then the first existing search candidate.
pub fn locate_registry(
    explicit: Option<&str>,
    config: &GeneratorConfig,
) -> Result<PathBuf, CliError> {
    if let Some(path) = explicit {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = &config.spec {
        return Ok(path.clone());
    }

    let candidates = registry_candidates(|var| std::env::var(var).ok());
    for candidate in &candidates {
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "found registry");
            return Ok(candidate.clone());
        }
    }
    Err(CliError::RegistryNotFound {
        searched: candidates
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
    })
}

pub fn load_registry(path: &Path, config: &GeneratorConfig) -> Result<Registry, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let registry = parse_registry(&text, config.tier_policy())?;
    tracing::info!(
        path = %path.display(),
        entry_points = registry.entry_points.len(),
        features = registry.features.len(),
        "loaded registry"
    );
    Ok(registry)
}

pub fn load_registry_or_exit(
    spec_arg: Option<&str>,
    config: &GeneratorConfig,
) -> (Registry, PathBuf) {
    let path = locate_registry(spec_arg, config).unwrap_or_else(|e| exit_with(&e));
    let registry = load_registry(&path, config).unwrap_or_else(|e| exit_with(&e));
    (registry, path)
}

/// Pretty-print `payload` to stdout; exits 2 if it cannot be rendered.
pub fn print_json(payload: &serde_json::Value) {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("error: failed to render output: {e}");
            std::process::exit(2);
        }
    }
}

pub fn write_output(out: Option<&str>, text: &str) -> Result<(), CliError> {
    match out {
        Some(path) => fs::write(path, text).map_err(|source| CliError::WriteFile {
            path: path.to_string(),
            source,
        }),
        None => {
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn candidates_follow_sdk_then_home_then_system_order() {
        let candidates = registry_candidates(env_from(&[
            ("VULKAN_SDK", "/opt/sdk"),
            ("VULKAN_SDK_PATH", "/opt/sdk2"),
            ("HOME", "/home/dev"),
        ]));
        let expected: Vec<PathBuf> = [
            "/opt/sdk",
            "/opt/sdk2",
            "/home/dev/.local",
            "/usr/local",
            "/usr",
        ]
        .iter()
        .map(|prefix| Path::new(prefix).join(REGISTRY_SUBPATH))
        .collect();
        assert_eq!(candidates, expected);
    }

    #[test]
    fn empty_environment_still_searches_system_prefixes() {
        let candidates = registry_candidates(env_from(&[("VULKAN_SDK", "  ")]));
        assert_eq!(
            candidates,
            vec![
                Path::new("/usr/local").join(REGISTRY_SUBPATH),
                Path::new("/usr").join(REGISTRY_SUBPATH),
            ]
        );
    }

    #[test]
    fn explicit_path_beats_config_spec() {
        let config = GeneratorConfig {
            spec: Some(PathBuf::from("from-config.xml")),
            ..GeneratorConfig::default()
        };
        assert_eq!(
            locate_registry(Some("explicit.xml"), &config).expect("explicit path"),
            PathBuf::from("explicit.xml")
        );
        assert_eq!(
            locate_registry(None, &config).expect("config path"),
            PathBuf::from("from-config.xml")
        );
    }

    #[test]
    fn not_found_lists_every_searched_path() {
        let err = CliError::RegistryNotFound {
            searched: vec!["/a/vk.xml".to_string(), "/b/vk.xml".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "vk.xml not found; searched: /a/vk.xml, /b/vk.xml"
        );
    }
}

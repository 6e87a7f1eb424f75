use crate::support::{load_config_or_exit, load_registry_or_exit, print_json};
use serde_json::json;

pub fn run(names: Vec<String>, spec: Option<String>, config: Option<String>, json_output: bool) {
    let config = load_config_or_exit(config.as_deref());
    let (registry, path) = load_registry_or_exit(spec.as_deref(), &config);

    let mut unknown = Vec::new();
    let mut rows = Vec::new();
    for name in &names {
        match registry.entry_points.get(name) {
            Some(entry) => rows.push(json!({
                "name": name,
                "canonical": entry.canonical,
                "ownerType": entry.owner_type,
                "tier": entry.tier,
                "loader": registry.policy.is_loader_for(&entry.canonical, entry.tier),
            })),
            None => unknown.push(name.clone()),
        }
    }

    if json_output {
        let payload = json!({
            "registry": path.display().to_string(),
            "entryPoints": rows,
            "unknown": unknown,
        });
        print_json(&payload);
    } else {
        for name in &names {
            match registry.entry_points.get(name) {
                Some(entry) if entry.is_alias() => {
                    println!("{name}: {} (alias of {})", entry.tier, entry.canonical)
                }
                Some(entry) => println!("{name}: {}", entry.tier),
                None => println!("{name}: unknown"),
            }
        }
    }

    if !unknown.is_empty() {
        eprintln!("error: unknown entry points: {}", unknown.join(", "));
        std::process::exit(1);
    }
}

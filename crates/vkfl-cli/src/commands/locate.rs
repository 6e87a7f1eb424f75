use crate::support::{exit_with, load_config_or_exit, locate_registry, print_json};
use serde_json::json;

pub fn run(spec: Option<String>, config: Option<String>, json_output: bool) {
    let config = load_config_or_exit(config.as_deref());
    let path = locate_registry(spec.as_deref(), &config).unwrap_or_else(|e| exit_with(&e));
    let exists = path.is_file();

    if json_output {
        let payload = json!({
            "path": path.display().to_string(),
            "exists": exists,
        });
        print_json(&payload);
    } else {
        println!("{}", path.display());
    }

    if !exists {
        eprintln!("error: registry not found at {}", path.display());
        std::process::exit(1);
    }
}

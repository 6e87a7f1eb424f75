use crate::config::RequestOverrides;
use crate::emitters::{JsonEmitter, SummaryEmitter};
use crate::support::{CliError, exit_with, load_config_or_exit, load_registry_or_exit, write_output};
use vkfl_registry::{EmitFacts, Emitter};

pub struct Args {
    pub spec: Option<String>,
    pub api: Option<String>,
    pub extensions: Option<String>,
    pub flavor: Option<String>,
    pub config: Option<String>,
    pub no_disabled: bool,
    pub out: Option<String>,
    pub json: bool,
}

pub fn run(args: Args) {
    let config = load_config_or_exit(args.config.as_deref());
    let request = config
        .request(&RequestOverrides {
            flavor: args.flavor,
            api: args.api,
            extensions: args.extensions,
        })
        .unwrap_or_else(|e| exit_with(&e));
    let (registry, path) = load_registry_or_exit(args.spec.as_deref(), &config);

    let resolution = registry
        .resolve(&request)
        .unwrap_or_else(|e| exit_with(&CliError::from(e)));
    if !resolution.flavor_matched {
        eprintln!(
            "warning: no API version or extension in {} supports flavor `{}`",
            path.display(),
            resolution.flavor
        );
    }
    for name in &resolution.unknown_extensions {
        eprintln!("warning: unknown extension `{name}`");
    }

    let include_disabled = config.generate_disabled() && !args.no_disabled;
    let facts = EmitFacts::derive(&registry, &resolution)
        .with_include_disabled(include_disabled)
        .with_generated_at(chrono::Utc::now());

    let rendered = if args.json {
        JsonEmitter
            .emit(&resolution, &facts)
            .map_err(|e| e.to_string())
    } else {
        SummaryEmitter
            .emit(&resolution, &facts)
            .map_err(|e| e.to_string())
    };
    let text = rendered.unwrap_or_else(|e| {
        eprintln!("error: failed to render output: {e}");
        std::process::exit(2);
    });

    write_output(args.out.as_deref(), &text).unwrap_or_else(|e| exit_with(&e));
    if let Some(out) = &args.out {
        tracing::info!(path = %out, entry_points = facts.total_entry_points, "wrote output");
    }
}

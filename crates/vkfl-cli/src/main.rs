//! vkfl CLI: the `vkfl` command.

mod cli;
mod commands;
mod config;
mod emitters;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    support::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            spec,
            api,
            extensions,
            flavor,
            config,
            no_disabled,
            out,
            json,
        } => commands::resolve::run(commands::resolve::Args {
            spec,
            api,
            extensions,
            flavor,
            config,
            no_disabled,
            out,
            json,
        }),

        Commands::Classify {
            names,
            spec,
            config,
            json,
        } => commands::classify::run(names, spec, config, json),

        Commands::Locate { spec, config, json } => commands::locate::run(spec, config, json),
    }
}

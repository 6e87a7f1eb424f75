use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vkfl",
    about = "vkfl: resolve a Vulkan registry into tiered loader entry points",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the registry for one target and emit the result
    Resolve {
        /// Path to vk.xml (standard SDK locations are searched when omitted)
        #[arg(long)]
        spec: Option<String>,

        /// Highest API version to include: `1.0`, `1.3`, ... or `latest`
        #[arg(long)]
        api: Option<String>,

        /// Comma separated extension names, or `all`
        #[arg(long)]
        extensions: Option<String>,

        /// API flavor to resolve for (`vulkan`, `vulkansc`)
        #[arg(long)]
        flavor: Option<String>,

        /// Path to a vkfl.toml (defaults to ./vkfl.toml when present)
        #[arg(long)]
        config: Option<String>,

        /// Omit disabled API versions and extensions from the output
        #[arg(long)]
        no_disabled: bool,

        /// Write output to this file instead of stdout
        #[arg(long)]
        out: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report the loading tier of individual entry points
    Classify {
        /// Entry point names (aliases are followed)
        #[arg(required = true)]
        names: Vec<String>,

        /// Path to vk.xml (standard SDK locations are searched when omitted)
        #[arg(long)]
        spec: Option<String>,

        /// Path to a vkfl.toml (defaults to ./vkfl.toml when present)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the registry path `resolve` would read
    Locate {
        /// Explicit path to vk.xml
        #[arg(long)]
        spec: Option<String>,

        /// Path to a vkfl.toml (defaults to ./vkfl.toml when present)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

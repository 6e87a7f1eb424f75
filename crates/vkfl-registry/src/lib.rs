//! # vkfl-registry
//!
//! Resolution engine for API registries: which entry points a function
//! loader must provide for a given target version and extension set, and in
//! which loading tier each one lives.
//!
//! This crate performs no I/O. Locating the registry, reading files, and
//! rendering generated source belong to callers (see `vkfl-cli`).
//!
//! ## Architecture
//!
//! ```text
//! registry XML
//!     │  parse
//! TypeGraph ─┬─ EntryPointCatalog (tier per entry point, via TierPolicy)
//!            └─ FeatureSet (API versions + extensions)
//!     │  resolve(request)
//! ResolutionResult (sorted per-tier lists, alias table, feature tables)
//!     │  Emitter
//! generated source
//! ```

pub mod catalog;
pub mod emit;
pub mod error;
pub mod feature;
pub mod parse;
pub mod registry;
pub mod resolve;
pub mod type_graph;
pub mod version;

pub use catalog::{
    EntryPoint, EntryPointCatalog, EntryPointDecl, EntryPointKind, MAX_ALIAS_DEPTH, Tier,
    TierPolicy,
};
pub use emit::{EmitFacts, Emitter};
pub use error::RegistryError;
pub use feature::{Feature, FeatureKind, FeatureSet};
pub use parse::parse_registry;
pub use registry::{Registry, source_digest};
pub use resolve::{
    ExtensionSelection, FeatureSummary, FeatureTable, ResolutionRequest, ResolutionResult,
    TierBuckets, resolve,
};
pub use type_graph::TypeGraph;
pub use version::{Version, VersionRequest};

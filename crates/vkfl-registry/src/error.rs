//! Error types for registry parsing and resolution.

/// Errors raised while extracting or resolving a registry.
///
/// Every variant is fatal to the current run: a registry inconsistency
/// invalidates the whole resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A required element or attribute is missing or unreadable.
    #[error("malformed specification: <{element}>: {detail}")]
    MalformedSpecification { element: String, detail: String },

    /// A type transitively declares itself as an ancestor.
    #[error("cyclic type graph at `{type_name}`")]
    CyclicTypeGraph { type_name: String },

    /// An alias chain loops or exceeds the depth bound.
    #[error("cyclic alias chain starting at `{entry_point}`")]
    CyclicAlias { entry_point: String },

    /// A feature, extension or alias names an undeclared entry point.
    #[error("dangling reference to `{name}` from `{referrer}`")]
    DanglingReference { name: String, referrer: String },

    /// A version string is not `major[.minor]`.
    #[error("unknown version format: `{0}`")]
    UnknownVersionFormat(String),
}

impl RegistryError {
    pub(crate) fn malformed(element: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedSpecification {
            element: element.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn dangling(name: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self::DanglingReference {
            name: name.into(),
            referrer: referrer.into(),
        }
    }
}

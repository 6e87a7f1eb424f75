//! Type-inheritance graph over registry type names.
//!
//! Types may declare several parents. Names the registry never declares
//! (primitives, opaque platform types) are simply absent: they have no
//! ancestors and are nobody's descendant.

use crate::error::RegistryError;
use std::collections::{BTreeMap, BTreeSet};

/// Parent-name multi-map keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    parents: BTreeMap<String, BTreeSet<String>>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name`, merging `parents` into any parents already recorded.
    pub fn insert<I, S>(&mut self, name: impl Into<String>, parents: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents
            .entry(name.into())
            .or_default()
            .extend(parents.into_iter().map(Into::into));
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parents.contains_key(name)
    }

    /// Declared parents of `name` (empty for unknown names).
    pub fn parents_of(&self, name: &str) -> impl Iterator<Item = &str> {
        self.parents
            .get(name)
            .into_iter()
            .flat_map(|parents| parents.iter().map(String::as_str))
    }

    /// True iff `name == base` or `base` is a transitive parent of `name`.
    ///
    /// Fails with `CyclicTypeGraph` if the walk re-enters a type on its
    /// own ancestry path.
    pub fn is_descendant(&self, name: &str, base: &str) -> Result<bool, RegistryError> {
        if name == base {
            return Ok(true);
        }
        if !self.contains(name) {
            return Ok(false);
        }
        let mut walk = Walk::default();
        walk.reaches(self, name, base)
    }

    /// Validate that no declared type is its own ancestor.
    pub fn check_acyclic(&self) -> Result<(), RegistryError> {
        let mut walk = Walk::default();
        for name in self.parents.keys() {
            // An empty base never matches, so this visits every ancestor.
            walk.reaches(self, name, "")?;
        }
        Ok(())
    }
}

/// DFS state shared across one query.
#[derive(Default)]
struct Walk<'g> {
    finished: BTreeSet<&'g str>,
    on_path: BTreeSet<&'g str>,
}

impl<'g> Walk<'g> {
    fn reaches(
        &mut self,
        graph: &'g TypeGraph,
        name: &'g str,
        base: &str,
    ) -> Result<bool, RegistryError> {
        if self.finished.contains(name) {
            return Ok(false);
        }
        if !self.on_path.insert(name) {
            return Err(RegistryError::CyclicTypeGraph {
                type_name: name.to_string(),
            });
        }
        for parent in graph.parents_of(name) {
            if parent == base {
                return Ok(true);
            }
            if self.reaches(graph, parent, base)? {
                return Ok(true);
            }
        }
        self.on_path.remove(name);
        self.finished.insert(name);
        Ok(false)
    }
}

//! Two-part API versions and the version half of a resolution request.

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `major.minor` version. Ordering is major first, then minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = RegistryError;

    /// Accepts `major` or `major.minor`; a bare major implies minor 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || RegistryError::UnknownVersionFormat(s.to_string());
        let trimmed = s.trim();
        let mut parts = trimmed.split('.');
        let major = parts
            .next()
            .filter(|part| !part.is_empty())
            .ok_or_else(unknown)?
            .parse::<u32>()
            .map_err(|_| unknown())?;
        let minor = match parts.next() {
            Some(part) => part.parse::<u32>().map_err(|_| unknown())?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(unknown());
        }
        Ok(Self { major, minor })
    }
}

impl Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The requested target version: a concrete ceiling, or everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionRequest {
    #[default]
    Latest,
    At(Version),
}

impl VersionRequest {
    /// Whether a feature at `version` falls under this request (inclusive).
    pub fn admits(&self, version: Version) -> bool {
        match self {
            VersionRequest::Latest => true,
            VersionRequest::At(ceiling) => version <= *ceiling,
        }
    }
}

impl FromStr for VersionRequest {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "latest" {
            Ok(VersionRequest::Latest)
        } else {
            s.parse().map(VersionRequest::At)
        }
    }
}

impl fmt::Display for VersionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRequest::Latest => f.write_str("latest"),
            VersionRequest::At(version) => fmt::Display::fmt(version, f),
        }
    }
}

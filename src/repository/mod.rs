//! Repository abstraction for package sources.
//!
//! A repository resolves package names and versions against one backend
//! (an in-memory index, a simple-index server, ...). The pool composes
//! several of them behind a single lookup surface.

mod constraint;
mod index;
mod legacy;
mod version;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub use constraint::Constraint;
pub use index::IndexRepository;
pub use legacy::{LegacyRepository, SIMPLE_JSON_ACCEPT};
pub use version::{is_prerelease, is_valid_name, normalize_name};

/// A distribution file belonging to a package release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFile {
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub hashes: BTreeMap<String, String>,
    #[serde(default)]
    pub yanked: bool,
}

/// A package release as reported by a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name of the repository the package was found in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PackageFile>,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            source: None,
            files: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_files(mut self, files: Vec<PackageFile>) -> Self {
        self.files = files;
        self
    }

    pub fn is_prerelease(&self) -> bool {
        is_prerelease(&self.version)
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Outcome of an exact package lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Package),
    NotFound,
    /// The repository cannot process this query shape (e.g. a name it
    /// cannot parse). Distinct from `NotFound`: the query was never tried.
    Abstain(String),
}

impl Lookup {
    pub fn into_package(self) -> Option<Package> {
        match self {
            Lookup::Found(package) => Some(package),
            Lookup::NotFound | Lookup::Abstain(_) => None,
        }
    }
}

/// How a search query is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Match against names and descriptions
    #[default]
    FullText,
    /// Match against names only
    Name,
}

/// Repository kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    /// Generic index-backed repository
    Index,
    /// Legacy simple-index repository; excluded from aggregated search
    Legacy,
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryKind::Index => write!(f, "index"),
            RepositoryKind::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for RepositoryKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "index" => Ok(RepositoryKind::Index),
            "legacy" => Ok(RepositoryKind::Legacy),
            _ => anyhow::bail!("Unknown repository kind: {}. Expected index or legacy.", s),
        }
    }
}

/// Trait for package repositories.
///
/// Every capability returns `Err` only for failures the backend could not
/// model; "no such package" is `Lookup::NotFound` or an empty list.
#[cfg_attr(test, mockall::automock)]
pub trait Repository: Send + Sync {
    /// Unique repository name.
    fn name(&self) -> &str;

    /// Get the repository kind.
    fn kind(&self) -> RepositoryKind;

    /// Look up an exact package release.
    fn package(&self, name: &str, version: &str, extras: &[String]) -> Result<Lookup>;

    /// List the releases of `name` allowed by `constraint`.
    fn find_packages(
        &self,
        name: &str,
        constraint: &Constraint,
        extras: &[String],
        allow_prereleases: bool,
    ) -> Result<Vec<Package>>;

    /// Search the repository.
    fn search(&self, query: &str, mode: SearchMode) -> Result<Vec<Package>>;
}

/// Check whether a release passes the constraint and prerelease policy.
///
/// A prerelease pinned exactly by the constraint is always allowed.
pub(crate) fn is_candidate(version: &str, constraint: &Constraint, allow_prereleases: bool) -> bool {
    if !constraint.allows(version) {
        return false;
    }
    allow_prereleases || !is_prerelease(version) || constraint.is_exact(version)
}

//! In-memory index repository.

use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

use super::{
    Constraint, Lookup, Package, Repository, RepositoryKind, SearchMode, is_candidate,
    is_valid_name, normalize_name,
};

/// Generic index-backed repository holding its packages in memory.
///
/// Index files are JSON arrays of packages:
///
/// ```json
/// [{"name": "demo", "version": "1.0", "description": "A demo package"}]
/// ```
#[derive(Debug, Clone)]
pub struct IndexRepository {
    name: String,
    packages: Vec<Package>,
}

impl IndexRepository {
    /// Create an empty repository.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_packages(name, Vec::new())
    }

    /// Create a repository from a list of packages.
    pub fn with_packages(name: impl Into<String>, packages: Vec<Package>) -> Self {
        let name = name.into();
        let packages = packages
            .into_iter()
            .map(|p| Self::stamp(&name, p))
            .collect();
        Self { name, packages }
    }

    /// Load a repository from a JSON index file.
    pub fn from_json_file(name: impl Into<String>, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read index file {:?}", path))?;
        let packages: Vec<Package> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse index file {:?}", path))?;

        let repo = Self::with_packages(name, packages);
        debug!(
            "Loaded {} package(s) into index '{}' from {:?}",
            repo.packages.len(),
            repo.name,
            path
        );
        Ok(repo)
    }

    pub fn add_package(&mut self, package: Package) {
        let package = Self::stamp(&self.name, package);
        self.packages.push(package);
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    fn stamp(name: &str, mut package: Package) -> Package {
        if package.source.is_none() {
            package.source = Some(name.to_string());
        }
        package
    }

    fn releases_of<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Package> {
        let wanted = normalize_name(name);
        self.packages
            .iter()
            .filter(move |p| normalize_name(&p.name) == wanted)
    }
}

impl Repository for IndexRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RepositoryKind {
        RepositoryKind::Index
    }

    fn package(&self, name: &str, version: &str, _extras: &[String]) -> Result<Lookup> {
        if !is_valid_name(name) {
            return Ok(Lookup::Abstain(format!("invalid package name '{}'", name)));
        }
        if version.trim().is_empty() {
            return Ok(Lookup::Abstain("empty version".to_string()));
        }

        Ok(self
            .releases_of(name)
            .find(|p| p.version == version)
            .cloned()
            .map_or(Lookup::NotFound, Lookup::Found))
    }

    fn find_packages(
        &self,
        name: &str,
        constraint: &Constraint,
        _extras: &[String],
        allow_prereleases: bool,
    ) -> Result<Vec<Package>> {
        Ok(self
            .releases_of(name)
            .filter(|p| is_candidate(&p.version, constraint, allow_prereleases))
            .cloned()
            .collect())
    }

    fn search(&self, query: &str, mode: SearchMode) -> Result<Vec<Package>> {
        let query = query.to_lowercase();
        let matches = |text: &str| text.to_lowercase().contains(&query);

        Ok(self
            .packages
            .iter()
            .filter(|p| match mode {
                SearchMode::Name => matches(p.name.as_str()),
                SearchMode::FullText => {
                    matches(p.name.as_str()) || p.description.as_deref().is_some_and(matches)
                }
            })
            .cloned()
            .collect())
    }
}

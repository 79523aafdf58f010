//! Repository pool.
//!
//! The pool aggregates an ordered list of repositories behind a single
//! lookup surface. Registration order is precedence order: the first
//! repository that can answer a query wins.

use log::debug;
use std::sync::Arc;

use crate::error::{PoolError, Result};
use crate::repository::{
    Constraint, LegacyRepository, Lookup, Package, Repository, RepositoryKind, SearchMode,
};
use crate::source::SourceSpec;

/// Ordered collection of repositories with precedence-based lookup.
///
/// Repositories are shared: dropping the pool does not drop a repository
/// still referenced elsewhere.
#[derive(Default)]
pub struct Pool {
    repositories: Vec<Arc<dyn Repository>>,
    packages: Vec<Package>,
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field(
                "repositories",
                &self.repositories.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .field("packages", &self.packages)
            .finish()
    }
}

impl Pool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool from an initial list, in precedence order.
    pub fn with_repositories<I>(repositories: I) -> Result<Self>
    where
        I: IntoIterator<Item = Arc<dyn Repository>>,
    {
        let mut pool = Self::new();
        for repository in repositories {
            pool.add_repository(repository)?;
        }
        Ok(pool)
    }

    /// Registered repositories in precedence order.
    pub fn repositories(&self) -> &[Arc<dyn Repository>] {
        &self.repositories
    }

    /// Get a registered repository by name.
    pub fn repository(&self, name: &str) -> Option<&Arc<dyn Repository>> {
        self.repositories.iter().find(|r| r.name() == name)
    }

    pub fn has_repository(&self, name: &str) -> bool {
        self.repository(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Packages returned by successful `package` lookups, oldest first.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Append a repository with the lowest precedence.
    ///
    /// Fails if a repository with the same name is already registered.
    pub fn add_repository(&mut self, repository: Arc<dyn Repository>) -> Result<()> {
        let name = repository.name();
        if self.has_repository(name) {
            return Err(PoolError::DuplicateRepository(name.to_string()));
        }

        debug!(
            "Adding {} repository '{}' at position {}",
            repository.kind(),
            name,
            self.repositories.len()
        );
        self.repositories.push(repository);
        Ok(())
    }

    /// Remove the repository called `name`, keeping the order of the rest.
    ///
    /// Returns the removed repository, or `None` if no repository matched.
    pub fn remove_repository(&mut self, name: &str) -> Option<Arc<dyn Repository>> {
        let index = self.repositories.iter().position(|r| r.name() == name)?;
        debug!("Removing repository '{}'", name);
        Some(self.repositories.remove(index))
    }

    /// Build a simple-index repository from a source specification and
    /// register it.
    pub fn configure(&mut self, source: &SourceSpec) -> Result<()> {
        let (name, url) = source.validate()?;
        if self.has_repository(name) {
            return Err(PoolError::DuplicateRepository(name.to_string()));
        }

        let repository = LegacyRepository::new(name, url)?;
        self.add_repository(Arc::new(repository))
    }

    /// Not supported by the pool.
    pub fn has_package(&self, _package: &Package) -> Result<bool> {
        Err(PoolError::NotImplemented("has_package"))
    }

    /// Look up an exact release, consulting repositories in order.
    ///
    /// Repositories that abstain are skipped. The first match is recorded
    /// in [`Pool::packages`] and returned; later repositories are not asked.
    pub fn package(
        &mut self,
        name: &str,
        version: &str,
        extras: &[String],
    ) -> Result<Option<Package>> {
        for repository in &self.repositories {
            match repository.package(name, version, extras)? {
                Lookup::Found(package) => {
                    debug!(
                        "Found {} {} in repository '{}'",
                        name,
                        version,
                        repository.name()
                    );
                    self.packages.push(package.clone());
                    return Ok(Some(package));
                }
                Lookup::NotFound => {}
                Lookup::Abstain(reason) => {
                    debug!(
                        "Repository '{}' abstained from {} {}: {}",
                        repository.name(),
                        name,
                        version,
                        reason
                    );
                }
            }
        }

        debug!("{} {} not found in any repository", name, version);
        Ok(None)
    }

    /// Find the releases of `name` allowed by `constraint`.
    ///
    /// The first repository returning a non-empty list wins; its list is
    /// returned as-is and never merged with results from other repositories.
    pub fn find_packages(
        &self,
        name: &str,
        constraint: &Constraint,
        extras: &[String],
        allow_prereleases: bool,
    ) -> Result<Vec<Package>> {
        for repository in &self.repositories {
            let packages = repository.find_packages(name, constraint, extras, allow_prereleases)?;
            if !packages.is_empty() {
                debug!(
                    "Repository '{}' provides {} candidate(s) for {} {}",
                    repository.name(),
                    packages.len(),
                    name,
                    constraint
                );
                return Ok(packages);
            }
        }

        Ok(vec![])
    }

    /// Search every repository except simple indexes and concatenate the
    /// results in repository order.
    pub fn search(&self, query: &str, mode: SearchMode) -> Result<Vec<Package>> {
        let mut results = Vec::new();

        for repository in &self.repositories {
            match repository.kind() {
                RepositoryKind::Legacy => {
                    debug!("Skipping legacy repository '{}' in search", repository.name());
                }
                RepositoryKind::Index => {
                    results.extend(repository.search(query, mode)?);
                }
            }
        }

        debug!("Search for '{}' returned {} result(s)", query, results.len());
        Ok(results)
    }
}

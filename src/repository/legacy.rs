//! Simple-index repository (JSON simple API).

use anyhow::{Context, Result};
use log::debug;
use std::collections::BTreeMap;

use crate::http::{HttpClient, is_not_found};

use super::{
    Constraint, Lookup, Package, PackageFile, Repository, RepositoryKind, SearchMode,
    is_candidate, is_valid_name, normalize_name,
};

/// Media type requested from simple-index servers.
pub const SIMPLE_JSON_ACCEPT: &str = "application/vnd.pypi.simple.v1+json";

const SDIST_SUFFIXES: &[&str] = &[".tar.gz", ".tar.bz2", ".tgz", ".zip"];

/// Simple-index API response types (internal).
mod api {
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Deserialize, Debug)]
    pub struct ProjectPage {
        pub name: String,
        /// Only present on servers speaking API version 1.1 or later.
        pub versions: Option<Vec<String>>,
        #[serde(default)]
        pub files: Vec<File>,
    }

    #[derive(Deserialize, Debug)]
    pub struct File {
        pub filename: String,
        pub url: String,
        #[serde(default)]
        pub hashes: BTreeMap<String, String>,
        #[serde(default)]
        pub yanked: Yanked,
    }

    /// `yanked` is either a boolean or a reason string.
    #[derive(Deserialize, Debug, Default)]
    #[serde(untagged)]
    pub enum Yanked {
        #[default]
        No,
        Flag(bool),
        Reason(String),
    }

    impl Yanked {
        pub fn is_yanked(&self) -> bool {
            match self {
                Yanked::No => false,
                Yanked::Flag(flag) => *flag,
                Yanked::Reason(_) => true,
            }
        }
    }
}

/// Repository backed by a simple-index server.
///
/// Simple indexes expose no search endpoint, so the pool leaves them out
/// of aggregated search.
pub struct LegacyRepository {
    name: String,
    url: String,
    http_client: HttpClient,
}

impl LegacyRepository {
    /// Create a repository using a client configured from the environment.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(name, url, HttpClient::from_env()?))
    }

    /// Create a repository with an existing HTTP client.
    pub fn with_client(
        name: impl Into<String>,
        url: impl Into<String>,
        http_client: HttpClient,
    ) -> Self {
        let url: String = url.into();
        Self {
            name: name.into(),
            url: url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn project_url(&self, name: &str) -> String {
        format!("{}/{}/", self.url, normalize_name(name))
    }

    /// Fetch the project page, or `None` if the index does not know it.
    fn fetch_project(&self, name: &str) -> Result<Option<api::ProjectPage>> {
        let url = self.project_url(name);
        debug!("Fetching project page for {} from {}...", name, url);

        match self
            .http_client
            .get_json::<api::ProjectPage>(&url, SIMPLE_JSON_ACCEPT)
        {
            Ok(page) => Ok(Some(page)),
            Err(e) if is_not_found(&e) => {
                debug!("Project {} not found in '{}'", name, self.name);
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| {
                format!("Failed to fetch {} from repository '{}'", name, self.name)
            }),
        }
    }

    /// Group the files of a project page by version, keeping index order.
    fn releases(&self, page: api::ProjectPage) -> Vec<(String, Vec<PackageFile>)> {
        let project = normalize_name(&page.name);
        let mut by_version: BTreeMap<String, Vec<PackageFile>> = BTreeMap::new();
        let mut order: Vec<String> = page.versions.unwrap_or_default();

        for file in page.files {
            let Some(version) = version_from_filename(&project, &file.filename) else {
                debug!("Skipping unrecognized file {}", file.filename);
                continue;
            };
            if !order.contains(&version) {
                order.push(version.clone());
            }
            by_version.entry(version).or_default().push(PackageFile {
                filename: file.filename,
                url: file.url,
                hashes: file.hashes,
                yanked: file.yanked.is_yanked(),
            });
        }

        order
            .into_iter()
            .map(|version| {
                let files = by_version.remove(&version).unwrap_or_default();
                (version, files)
            })
            .collect()
    }

    fn make_package(&self, name: &str, version: String, files: Vec<PackageFile>) -> Package {
        Package::new(name, version)
            .with_source(self.name.clone())
            .with_files(files)
    }
}

impl Repository for LegacyRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RepositoryKind {
        RepositoryKind::Legacy
    }

    fn package(&self, name: &str, version: &str, _extras: &[String]) -> Result<Lookup> {
        if !is_valid_name(name) {
            return Ok(Lookup::Abstain(format!("invalid package name '{}'", name)));
        }
        if version.trim().is_empty() {
            return Ok(Lookup::Abstain("empty version".to_string()));
        }

        let Some(page) = self.fetch_project(name)? else {
            return Ok(Lookup::NotFound);
        };

        let display_name = page.name.clone();
        Ok(self
            .releases(page)
            .into_iter()
            .find(|(v, _)| v == version)
            .map_or(Lookup::NotFound, |(v, files)| {
                Lookup::Found(self.make_package(&display_name, v, files))
            }))
    }

    fn find_packages(
        &self,
        name: &str,
        constraint: &Constraint,
        _extras: &[String],
        allow_prereleases: bool,
    ) -> Result<Vec<Package>> {
        if !is_valid_name(name) {
            debug!("Repository '{}' cannot query name '{}'", self.name, name);
            return Ok(vec![]);
        }

        let Some(page) = self.fetch_project(name)? else {
            return Ok(vec![]);
        };

        let display_name = page.name.clone();
        let packages: Vec<Package> = self
            .releases(page)
            .into_iter()
            .filter(|(version, _)| is_candidate(version, constraint, allow_prereleases))
            .filter(|(_, files)| files.is_empty() || files.iter().any(|f| !f.yanked))
            .map(|(version, files)| self.make_package(&display_name, version, files))
            .collect();

        debug!(
            "Repository '{}' has {} candidate(s) for {} {}",
            self.name,
            packages.len(),
            name,
            constraint
        );
        Ok(packages)
    }

    fn search(&self, query: &str, _mode: SearchMode) -> Result<Vec<Package>> {
        debug!(
            "Repository '{}' does not support search (query: {})",
            self.name, query
        );
        Ok(vec![])
    }
}

/// Extract the version from a distribution file name.
///
/// Wheels are `{name}-{version}-{tags}.whl`; sdists are `{name}-{version}`
/// followed by an archive suffix. Names in file names may use `_` or `.`
/// where the normalized project name uses `-`.
fn version_from_filename(project: &str, filename: &str) -> Option<String> {
    if let Some(stem) = filename.strip_suffix(".whl") {
        let mut parts = stem.splitn(3, '-');
        let (name, version) = (parts.next()?, parts.next()?);
        return (normalize_name(name) == project).then(|| version.to_string());
    }

    let stem = SDIST_SUFFIXES
        .iter()
        .find_map(|suffix| filename.strip_suffix(suffix))?;

    // The project name may itself contain dashes: split at the first dash
    // whose prefix normalizes to the project name.
    stem.match_indices('-').find_map(|(idx, _)| {
        let (name, rest) = stem.split_at(idx);
        let version = &rest[1..];
        (normalize_name(name) == project && !version.is_empty()).then(|| version.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use reqwest::blocking::Client;
    use std::time::Duration;

    const PAGE: &str = r#"{
        "meta": {"api-version": "1.1"},
        "name": "Demo-Pkg",
        "versions": ["1.0", "1.1", "2.0rc1", "3.0"],
        "files": [
            {"filename": "demo_pkg-1.0.tar.gz", "url": "https://files.test/demo_pkg-1.0.tar.gz", "hashes": {"sha256": "aa"}},
            {"filename": "demo_pkg-1.0-py3-none-any.whl", "url": "https://files.test/demo_pkg-1.0-py3-none-any.whl", "hashes": {}},
            {"filename": "demo-pkg-1.1.zip", "url": "https://files.test/demo-pkg-1.1.zip", "hashes": {}, "yanked": false},
            {"filename": "demo_pkg-2.0rc1.tar.gz", "url": "https://files.test/demo_pkg-2.0rc1.tar.gz", "hashes": {}},
            {"filename": "demo_pkg-3.0.tar.gz", "url": "https://files.test/demo_pkg-3.0.tar.gz", "hashes": {}, "yanked": "broken build"}
        ]
    }"#;

    fn repository(server: &mockito::ServerGuard) -> LegacyRepository {
        let client = HttpClient::new(Client::new()).with_retry_delay(Duration::ZERO);
        LegacyRepository::with_client("private", format!("{}/simple/", server.url()), client)
    }

    fn mock_page(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("GET", "/simple/demo-pkg/")
            .match_header("accept", Matcher::Regex("vnd.pypi.simple.v1".into()))
            .with_status(200)
            .with_header("content-type", SIMPLE_JSON_ACCEPT)
            .with_body(PAGE)
            .create()
    }

    #[test]
    fn test_kind_and_url() {
        let server = mockito::Server::new();
        let repo = repository(&server);
        assert_eq!(repo.kind(), RepositoryKind::Legacy);
        assert_eq!(repo.name(), "private");
        assert_eq!(repo.url(), format!("{}/simple", server.url()));
    }

    #[test]
    fn test_package_found_with_files() {
        let mut server = mockito::Server::new();
        let mock = mock_page(&mut server);

        let lookup = repository(&server)
            .package("Demo_Pkg", "1.0", &[])
            .unwrap();

        mock.assert();
        let package = lookup.into_package().unwrap();
        assert_eq!(package.name, "Demo-Pkg");
        assert_eq!(package.version, "1.0");
        assert_eq!(package.source.as_deref(), Some("private"));
        assert_eq!(package.files.len(), 2);
        assert_eq!(package.files[0].hashes.get("sha256").unwrap(), "aa");
    }

    #[test]
    fn test_package_unknown_version() {
        let mut server = mockito::Server::new();
        let _mock = mock_page(&mut server);

        let lookup = repository(&server).package("demo-pkg", "9.9", &[]).unwrap();
        assert_eq!(lookup, Lookup::NotFound);
    }

    #[test]
    fn test_package_unknown_project() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/simple/missing/")
            .with_status(404)
            .expect(1)
            .create();

        let lookup = repository(&server).package("missing", "1.0", &[]).unwrap();

        mock.assert();
        assert_eq!(lookup, Lookup::NotFound);
    }

    #[test]
    fn test_package_abstains_without_request() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", Matcher::Any).expect(0).create();

        let repo = repository(&server);
        assert!(matches!(
            repo.package("bad/name", "1.0", &[]).unwrap(),
            Lookup::Abstain(_)
        ));
        assert!(matches!(
            repo.package("demo-pkg", "", &[]).unwrap(),
            Lookup::Abstain(_)
        ));

        mock.assert();
    }

    #[test]
    fn test_package_server_failure_propagates() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/simple/demo-pkg/")
            .with_status(500)
            .create();

        let err = repository(&server)
            .package("demo-pkg", "1.0", &[])
            .unwrap_err();
        assert!(err.to_string().contains("private"));
    }

    #[test]
    fn test_find_packages_filters() {
        let mut server = mockito::Server::new();
        let _mock = mock_page(&mut server);
        let repo = repository(&server);

        let stable: Vec<_> = repo
            .find_packages("demo-pkg", &Constraint::any(), &[], false)
            .unwrap()
            .into_iter()
            .map(|p| p.version)
            .collect();
        // 3.0 only has yanked files
        assert_eq!(stable, vec!["1.0", "1.1"]);

        let with_pre: Vec<_> = repo
            .find_packages("demo-pkg", &Constraint::any(), &[], true)
            .unwrap()
            .into_iter()
            .map(|p| p.version)
            .collect();
        assert_eq!(with_pre, vec!["1.0", "1.1", "2.0rc1"]);

        let pinned = repo
            .find_packages("demo-pkg", &Constraint::exact("1.1"), &[], false)
            .unwrap();
        assert_eq!(pinned.len(), 1);
        assert_eq!(pinned[0].files[0].filename, "demo-pkg-1.1.zip");
    }

    #[test]
    fn test_find_packages_unknown_project() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/simple/missing/")
            .with_status(404)
            .create();

        let found = repository(&server)
            .find_packages("missing", &Constraint::any(), &[], false)
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_versions_derived_from_files_without_versions_key() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/simple/tool/")
            .with_status(200)
            .with_body(
                r#"{"name": "tool", "files": [
                    {"filename": "tool-0.1.tar.gz", "url": "u1", "hashes": {}},
                    {"filename": "tool-0.2-py3-none-any.whl", "url": "u2", "hashes": {}},
                    {"filename": "README.txt", "url": "u3", "hashes": {}}
                ]}"#,
            )
            .create();

        let versions: Vec<_> = repository(&server)
            .find_packages("tool", &Constraint::any(), &[], false)
            .unwrap()
            .into_iter()
            .map(|p| p.version)
            .collect();
        assert_eq!(versions, vec!["0.1", "0.2"]);
    }

    #[test]
    fn test_search_is_unsupported() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", Matcher::Any).expect(0).create();

        let found = repository(&server)
            .search("demo", SearchMode::FullText)
            .unwrap();

        mock.assert();
        assert!(found.is_empty());
    }

    #[test]
    fn test_version_from_filename() {
        assert_eq!(
            version_from_filename("demo-pkg", "demo_pkg-1.0.tar.gz"),
            Some("1.0".into())
        );
        assert_eq!(
            version_from_filename("demo-pkg", "demo-pkg-1.0rc1.zip"),
            Some("1.0rc1".into())
        );
        assert_eq!(
            version_from_filename("demo-pkg", "demo_pkg-2.0-py3-none-any.whl"),
            Some("2.0".into())
        );
        assert_eq!(version_from_filename("demo-pkg", "other-1.0.tar.gz"), None);
        assert_eq!(version_from_filename("demo-pkg", "demo_pkg.exe"), None);
        assert_eq!(version_from_filename("demo-pkg", "demo-pkg-.tar.gz"), None);
    }
}

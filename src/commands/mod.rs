//! Command implementations for the `pkgpool` binary.

mod find;
mod search;
mod show;
mod sources;

use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

use crate::pool::Pool;
use crate::repository::{IndexRepository, Package};
use crate::source::{SourceSpec, SourcesFile, default_config_path};

pub use find::find;
pub use search::search;
pub use show::show;
pub use sources::sources;

/// Where the pool's repositories come from.
#[derive(Debug, Clone, Default)]
pub struct PoolConfig {
    /// Sources file; `None` means the default location.
    pub config_path: Option<PathBuf>,
    /// Extra `(name, path)` JSON indexes, registered after those in the file.
    pub indexes: Vec<(String, PathBuf)>,
    /// Extra `(name, url)` simple-index sources, registered last.
    pub sources: Vec<(String, String)>,
}

/// Build a pool: file indexes, file sources, then command-line indexes and
/// sources, in that precedence order.
pub fn build_pool(config: &PoolConfig) -> Result<Pool> {
    let file = match &config.config_path {
        Some(path) => SourcesFile::load(path)?,
        None => match default_config_path() {
            Some(path) => SourcesFile::load_optional(&path)?,
            None => SourcesFile::default(),
        },
    };

    let mut pool = Pool::new();

    let indexes = file
        .indexes
        .iter()
        .map(|i| (i.name.clone(), i.path.clone()))
        .chain(config.indexes.iter().cloned());
    for (name, path) in indexes {
        let repository = IndexRepository::from_json_file(&name, &path)
            .with_context(|| format!("Failed to load index '{}'", name))?;
        pool.add_repository(Arc::new(repository))?;
    }

    let specs = file.source_specs()?.into_iter().chain(
        config
            .sources
            .iter()
            .map(|(name, url)| SourceSpec::new(name, url)),
    );
    for spec in specs {
        pool.configure(&spec)?;
    }

    debug!("Pool configured with {} repositories", pool.len());
    Ok(pool)
}

pub(crate) fn print_packages(packages: &[Package], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(packages)?);
        return Ok(());
    }

    for package in packages {
        print_package(package);
    }
    Ok(())
}

pub(crate) fn print_package(package: &Package) {
    match (&package.source, &package.description) {
        (Some(source), Some(description)) => {
            println!("{} ({}) - {}", package, source, description)
        }
        (Some(source), None) => println!("{} ({})", package, source),
        (None, Some(description)) => println!("{} - {}", package, description),
        (None, None) => println!("{}", package),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryKind;

    fn write_index(dir: &std::path::Path, file: &str, body: &str) -> PathBuf {
        let path = dir.join(file);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_build_pool_precedence() {
        let dir = tempfile::tempdir().unwrap();
        write_index(dir.path(), "file.json", r#"[{"name": "a", "version": "1"}]"#);
        let extra = write_index(dir.path(), "extra.json", "[]");
        let config_path = write_index(
            dir.path(),
            "sources.json",
            r#"{
                "indexes": [{"name": "from-file", "path": "file.json"}],
                "sources": [{"name": "file-source", "url": "https://one.test/simple"}]
            }"#,
        );

        let pool = build_pool(&PoolConfig {
            config_path: Some(config_path),
            indexes: vec![("cli-index".into(), extra)],
            sources: vec![("cli-source".into(), "https://two.test/simple".into())],
        })
        .unwrap();

        let names: Vec<_> = pool.repositories().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec!["from-file", "cli-index", "file-source", "cli-source"]
        );
        let kinds: Vec<_> = pool.repositories().iter().map(|r| r.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                RepositoryKind::Index,
                RepositoryKind::Index,
                RepositoryKind::Legacy,
                RepositoryKind::Legacy
            ]
        );
    }

    #[test]
    fn test_build_pool_invalid_source_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_index(
            dir.path(),
            "sources.json",
            r#"{"sources": [{"name": "no-url"}]}"#,
        );

        let err = build_pool(&PoolConfig {
            config_path: Some(config_path),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("Unsupported source"));
    }

    #[test]
    fn test_build_pool_missing_index_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_index(dir.path(), "sources.json", "{}");

        let err = build_pool(&PoolConfig {
            config_path: Some(config_path),
            indexes: vec![("gone".into(), dir.path().join("gone.json"))],
            sources: vec![],
        })
        .unwrap_err();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_build_pool_duplicate_names() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_index(dir.path(), "sources.json", "{}");

        let result = build_pool(&PoolConfig {
            config_path: Some(config_path),
            indexes: vec![],
            sources: vec![
                ("dup".into(), "https://one.test/simple".into()),
                ("dup".into(), "https://two.test/simple".into()),
            ],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_print_packages_json() {
        let packages = vec![Package::new("demo", "1.0")];
        assert!(print_packages(&packages, true).is_ok());
        assert!(print_packages(&packages, false).is_ok());
    }
}

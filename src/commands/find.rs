use anyhow::Result;

use crate::repository::Constraint;

use super::{PoolConfig, build_pool, print_packages};

/// List the releases of a package from the first repository that has any.
#[tracing::instrument(skip(config))]
pub fn find(
    config: &PoolConfig,
    name: &str,
    version: Option<&str>,
    allow_prereleases: bool,
    json: bool,
) -> Result<()> {
    let pool = build_pool(config)?;
    let constraint = version.map_or_else(Constraint::any, Constraint::exact);

    let packages = pool.find_packages(name, &constraint, &[], allow_prereleases)?;
    if packages.is_empty() && !json {
        println!("No releases of {} match {}.", name, constraint);
        return Ok(());
    }

    print_packages(&packages, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_with_and_without_version() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index.json");
        std::fs::write(
            &index,
            r#"[{"name": "demo", "version": "1.0"}, {"name": "demo", "version": "2.0a1"}]"#,
        )
        .unwrap();
        let sources = dir.path().join("sources.json");
        std::fs::write(&sources, "{}").unwrap();

        let config = PoolConfig {
            config_path: Some(sources),
            indexes: vec![("local".into(), index)],
            sources: vec![],
        };

        assert!(find(&config, "demo", None, false, false).is_ok());
        assert!(find(&config, "demo", Some("2.0a1"), false, true).is_ok());
        assert!(find(&config, "missing", None, true, false).is_ok());
    }
}

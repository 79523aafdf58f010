use anyhow::{Result, bail};
use log::debug;

use super::{PoolConfig, build_pool, print_package};

/// Show one exact release, taken from the first repository that has it.
#[tracing::instrument(skip(config))]
pub fn show(
    config: &PoolConfig,
    name: &str,
    version: &str,
    extras: &[String],
    json: bool,
) -> Result<()> {
    let mut pool = build_pool(config)?;

    let Some(package) = pool.package(name, version, extras)? else {
        bail!("Package {} {} not found in any repository", name, version);
    };
    debug!("Resolved {} from {:?}", package, package.source);

    if json {
        println!("{}", serde_json::to_string_pretty(&package)?);
        return Ok(());
    }

    print_package(&package);
    for file in &package.files {
        let yanked = if file.yanked { " (yanked)" } else { "" };
        println!("  {}{}", file.filename, yanked);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config_with_index(dir: &std::path::Path) -> PoolConfig {
        let index = dir.join("index.json");
        std::fs::write(&index, r#"[{"name": "demo", "version": "1.0"}]"#).unwrap();
        let sources = dir.join("sources.json");
        std::fs::write(&sources, "{}").unwrap();

        PoolConfig {
            config_path: Some(sources),
            indexes: vec![("local".into(), index)],
            sources: vec![],
        }
    }

    #[test]
    fn test_show_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_index(dir.path());
        assert!(show(&config, "demo", "1.0", &[], false).is_ok());
        assert!(show(&config, "demo", "1.0", &[], true).is_ok());
    }

    #[test]
    fn test_show_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_index(dir.path());
        let err = show(&config, "demo", "2.0", &[], false).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_show_bad_config() {
        let config = PoolConfig {
            config_path: Some(PathBuf::from("/nonexistent/sources.json")),
            ..Default::default()
        };
        assert!(show(&config, "demo", "1.0", &[], false).is_err());
    }
}

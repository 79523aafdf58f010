use anyhow::Result;

use crate::repository::SearchMode;

use super::{PoolConfig, build_pool, print_packages};

/// Search all searchable repositories.
#[tracing::instrument(skip(config))]
pub fn search(config: &PoolConfig, query: &str, mode: SearchMode, json: bool) -> Result<()> {
    let pool = build_pool(config)?;

    let packages = pool.search(query, mode)?;
    if packages.is_empty() && !json {
        println!("No packages found.");
        return Ok(());
    }

    print_packages(&packages, json)
}

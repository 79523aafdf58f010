use anyhow::Result;

use super::{PoolConfig, build_pool};

/// List configured repositories in precedence order.
pub fn sources(config: &PoolConfig) -> Result<()> {
    let pool = build_pool(config)?;

    if pool.is_empty() {
        println!("No repositories configured.");
        return Ok(());
    }

    for (position, repository) in pool.repositories().iter().enumerate() {
        println!("{}. {} ({})", position + 1, repository.name(), repository.kind());
    }
    Ok(())
}

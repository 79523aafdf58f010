pub mod commands;
pub mod error;
pub mod http;
pub mod pool;
pub mod repository;
pub mod source;

pub use error::PoolError;
pub use pool::Pool;
pub use repository::{Constraint, Lookup, Package, Repository, RepositoryKind, SearchMode};

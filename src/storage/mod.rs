//! Verdict history persistence.
//!
//! - `pool`: SQLite pool creation (file or in-memory)
//! - `migrations`: schema setup from `migrations/`
//! - `models`: the stored row type
//! - `history`: the `HistoryStore` used by checks and the CLI

mod history;
pub mod migrations;
pub mod models;
pub mod pool;

pub use history::HistoryStore;
pub use migrations::run_migrations;
pub use models::{CheckSource, HistoryRecord};
pub use pool::{init_db_pool_with_path, DbPool, IN_MEMORY_DB};

#[cfg(test)]
mod tests;

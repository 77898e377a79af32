pub mod blob_store;
pub mod database;
pub mod feed_db;
pub mod identity_store;

pub use blob_store::BlobStore;
pub use feed_db::{FeedDatabase, FeedRow, FeedSummary};
pub use identity_store::IdentityStore;

use std::fs;
use std::path::Path;

/// Ensure data directory exists
pub fn ensure_data_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

//! List command implementation.

use crate::config;
use crate::error::Result;
use crate::pipeline::list_collections;

/// Execute the list command: one root collection name per line.
pub fn execute(project: Option<&str>, database: &str) -> Result<()> {
    let store = config::open_store(project, database)?;
    for name in list_collections(store.as_ref())? {
        println!("{name}");
    }
    Ok(())
}

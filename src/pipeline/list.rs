//! List the collections at the store root.

use tracing::warn;

use crate::error::Result;
use crate::store::DocumentStore;

/// Top-level collection names, in store order.
///
/// Entries the backend could not resolve to a usable name are logged and
/// skipped; one bad entry does not abort the listing.
pub fn list_collections(store: &dyn DocumentStore) -> Result<Vec<String>> {
    let ids = store.list_collection_ids(None)?;
    Ok(ids
        .into_iter()
        .filter(|id| {
            if id.is_empty() {
                warn!("skipping collection with empty id");
                return false;
            }
            true
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Fields;
    use crate::store::memory::MemoryStore;

    #[test]
    fn test_lists_root_collections_only() {
        let store = MemoryStore::new();
        store.insert("users/u1", Fields::new());
        store.insert("users/u1/orders/o1", Fields::new());
        store.insert("events/e1", Fields::new());

        let names = list_collections(&store).unwrap();
        assert_eq!(names, ["events", "users"]);
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let store = MemoryStore::new();
        assert!(list_collections(&store).unwrap().is_empty());
    }
}

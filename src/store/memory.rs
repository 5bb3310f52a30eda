use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{CatalogStore, SolutionStore, StoreError};
use crate::model::{Catalog, CatalogDocument, Solution, SolutionSpec};
use crate::value::Value;

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read()
        .map_err(|_| StoreError::Backend("store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::Backend("store lock poisoned".into()))
}

#[derive(Debug)]
struct Entry<T> {
    body: T,
    generation: u64,
}

/// In-memory [`CatalogStore`] keeping catalogs in their persisted envelope.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    entries: RwLock<BTreeMap<String, Entry<Value>>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn get(&self, id: &str) -> Result<Catalog, StoreError> {
        let entries = read(&self.entries)?;
        let entry = entries.get(id).ok_or_else(|| StoreError::NotFound {
            kind: "catalog",
            id: id.to_string(),
        })?;
        let doc: CatalogDocument = serde_json::from_value(entry.body.clone())?;
        Ok(doc.into_catalog(entry.generation.to_string()))
    }

    fn upsert(&self, id: &str, catalog: &Catalog) -> Result<String, StoreError> {
        let mut stored = catalog.clone();
        stored.id = id.to_string();
        let body = serde_json::to_value(CatalogDocument::from(&stored))?;

        let mut entries = write(&self.entries)?;
        let current = entries.get(id).map(|e| e.generation);
        let expected = &catalog.spec.generation;
        if !expected.is_empty() {
            let actual = current.map(|g| g.to_string()).unwrap_or_default();
            if *expected != actual {
                return Err(StoreError::Conflict {
                    kind: "catalog",
                    id: id.to_string(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let generation = current.unwrap_or(0) + 1;
        entries.insert(id.to_string(), Entry { body, generation });
        Ok(generation.to_string())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        write(&self.entries)?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                kind: "catalog",
                id: id.to_string(),
            })
    }

    fn list(&self) -> Result<Vec<Catalog>, StoreError> {
        read(&self.entries)?
            .values()
            .map(|entry| -> Result<Catalog, StoreError> {
                let doc: CatalogDocument = serde_json::from_value(entry.body.clone())?;
                Ok(doc.into_catalog(entry.generation.to_string()))
            })
            .collect()
    }
}

/// In-memory [`SolutionStore`]. Each upsert bumps the solution's etag.
#[derive(Debug, Default)]
pub struct MemorySolutionStore {
    entries: RwLock<BTreeMap<(String, String), Entry<SolutionSpec>>>,
}

impl MemorySolutionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SolutionStore for MemorySolutionStore {
    fn get(&self, name: &str, scope: &str) -> Result<Solution, StoreError> {
        let entries = read(&self.entries)?;
        let entry = entries
            .get(&(scope.to_string(), name.to_string()))
            .ok_or_else(|| StoreError::NotFound {
                kind: "solution",
                id: format!("{scope}/{name}"),
            })?;
        Ok(Solution {
            name: name.to_string(),
            scope: scope.to_string(),
            spec: entry.body.clone(),
            etag: entry.generation.to_string(),
        })
    }

    fn upsert(&self, name: &str, scope: &str, spec: &SolutionSpec) -> Result<(), StoreError> {
        let mut entries = write(&self.entries)?;
        let key = (scope.to_string(), name.to_string());
        let generation = entries.get(&key).map_or(0, |e| e.generation) + 1;
        entries.insert(
            key,
            Entry {
                body: spec.clone(),
                generation,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CatalogSpec;
    use crate::value::Mapping;

    fn catalog(id: &str) -> Catalog {
        Catalog::new(id, CatalogSpec::new(Mapping::new()))
    }

    #[test]
    fn test_catalog_get_missing() {
        let store = MemoryCatalogStore::new();
        let err = store.get("nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_catalog_upsert_bumps_generation() {
        let store = MemoryCatalogStore::new();
        assert_eq!(store.upsert("c1", &catalog("c1")).unwrap(), "1");
        let fetched = store.get("c1").unwrap();
        assert_eq!(fetched.spec.generation, "1");
        assert_eq!(store.upsert("c1", &fetched).unwrap(), "2");
    }

    #[test]
    fn test_catalog_stale_generation_conflicts() {
        let store = MemoryCatalogStore::new();
        store.upsert("c1", &catalog("c1")).unwrap();
        let first = store.get("c1").unwrap();
        let second = store.get("c1").unwrap();

        store.upsert("c1", &first).unwrap();
        let err = store.upsert("c1", &second).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { ref expected, ref actual, .. }
            if expected == "1" && actual == "2"));
    }

    #[test]
    fn test_catalog_delete_and_list() {
        let store = MemoryCatalogStore::new();
        store.upsert("b", &catalog("b")).unwrap();
        store.upsert("a", &catalog("a")).unwrap();

        let ids: Vec<_> = store.list().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        store.delete("a").unwrap();
        assert!(store.delete("a").unwrap_err().is_not_found());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_solution_scopes_are_separate() {
        let store = MemorySolutionStore::new();
        store.upsert("shop", "default", &SolutionSpec::default()).unwrap();

        assert_eq!(store.get("shop", "default").unwrap().etag, "1");
        assert!(store.get("shop", "staging").unwrap_err().is_not_found());

        store.upsert("shop", "default", &SolutionSpec::default()).unwrap();
        assert_eq!(store.get("shop", "default").unwrap().etag, "2");
    }
}

use std::collections::HashMap;

use super::model::Table;

/// Session-lifetime store of the current table for each uploaded file name.
///
/// Entries are created once on first upload and afterwards only replaced by
/// cleaning operations. There is no eviction.
#[derive(Debug, Default)]
pub struct SessionCache {
    entries: HashMap<String, Table>,
}

impl SessionCache {
    /// Return the cached table for `id`, building and storing it first if
    /// absent. A failing builder leaves the cache untouched.
    pub fn get_or_create<E, F>(&mut self, id: &str, builder: F) -> Result<&Table, E>
    where
        F: FnOnce() -> Result<Table, E>,
    {
        if !self.contains(id) {
            let table = builder()?;
            self.entries.insert(id.to_string(), table);
        } else {
            log::debug!("Session cache hit for {id}");
        }
        Ok(&self.entries[id])
    }

    /// Replace the cached table for `id`.
    pub fn update(&mut self, id: &str, table: Table) {
        self.entries.insert(id.to_string(), table);
    }

    pub fn get(&self, id: &str) -> Option<&Table> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Move the entry for `id` through `op` and store what it hands back.
    /// Returns `None` when nothing is cached under `id`.
    pub fn transform<R>(&mut self, id: &str, op: impl FnOnce(Table) -> (Table, R)) -> Option<R> {
        let table = self.entries.remove(id)?;
        let (table, out) = op(table);
        self.update(id, table);
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn table(values: &[i64]) -> Table {
        Table::new(vec![Column::new(
            "n",
            values.iter().map(|&v| CellValue::Integer(v)).collect(),
        )])
        .unwrap()
    }

    #[test]
    fn builder_runs_only_once() {
        let mut cache = SessionCache::default();
        let mut calls = 0;
        for _ in 0..3 {
            cache
                .get_or_create("a.csv", || -> Result<Table, ()> {
                    calls += 1;
                    Ok(table(&[1, 2]))
                })
                .unwrap();
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failing_builder_stores_nothing() {
        let mut cache = SessionCache::default();
        let res = cache.get_or_create("bad.csv", || Err::<Table, _>("boom"));
        assert_eq!(res.unwrap_err(), "boom");
        assert!(!cache.contains("bad.csv"));
    }

    #[test]
    fn contains_tracks_created_entries_only() {
        let mut cache = SessionCache::default();
        assert!(!cache.contains("a.csv"));
        cache.get_or_create("a.csv", || Ok::<_, ()>(table(&[1]))).unwrap();
        assert!(cache.contains("a.csv"));
        assert!(!cache.contains("b.csv"));
        cache.update("b.csv", table(&[2]));
        assert!(cache.contains("b.csv"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cached_entry_wins_over_new_builder() {
        let mut cache = SessionCache::default();
        cache.update("a.csv", table(&[7]));
        let got = cache
            .get_or_create("a.csv", || Ok::<_, ()>(table(&[1, 2, 3])))
            .unwrap();
        assert_eq!(got.n_rows(), 1);
    }

    #[test]
    fn transform_replaces_entry() {
        let mut cache = SessionCache::default();
        cache.update("a.csv", table(&[1, 2, 3]));
        let n = cache.transform("a.csv", |t| {
            let rows = t.n_rows();
            (t.head(1), rows)
        });
        assert_eq!(n, Some(3));
        assert_eq!(cache.get("a.csv").unwrap().n_rows(), 1);
        assert_eq!(cache.transform("missing.csv", |t| (t, ())), None);
    }
}

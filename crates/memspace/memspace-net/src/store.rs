//! The trivial in-memory tuple store behind the network façade (§4.8).
//!
//! Mirrors `memspace-core::Space`'s `put`/`get`/`read` semantics exactly —
//! linear scan, first match wins, `get` removes and `read` doesn't — but over
//! a plain `Vec<Tuple>` guarded by a single mutex, since this store never
//! crosses a process boundary.

use memspace_codec::{matches, Template, Tuple};
use std::sync::Mutex;
use tracing::trace;

pub struct TupleStore {
    tuples: Mutex<Vec<Tuple>>,
}

impl TupleStore {
    pub fn new() -> Self {
        Self { tuples: Mutex::new(Vec::new()) }
    }

    pub fn put(&self, tuple: Tuple) {
        let mut guard = self.tuples.lock().unwrap();
        trace!(arity = tuple.len(), "store put");
        guard.push(tuple);
    }

    /// Removes and returns the first tuple matching `template`, if any.
    pub fn get(&self, template: &Template) -> Option<Tuple> {
        let mut guard = self.tuples.lock().unwrap();
        let index = guard.iter().position(|tuple| matches(template, tuple))?;
        Some(guard.remove(index))
    }

    /// Returns a clone of the first tuple matching `template`, leaving the
    /// store unchanged.
    pub fn read(&self, template: &Template) -> Option<Tuple> {
        let guard = self.tuples.lock().unwrap();
        guard.iter().find(|tuple| matches(template, tuple)).cloned()
    }
}

impl Default for TupleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memspace_codec::Field;

    #[test]
    fn read_then_get_then_miss() {
        let store = TupleStore::new();
        store.put(vec![Field::Int(1), Field::Int(2)]);

        let template = vec![Field::Wildcard, Field::Wildcard];
        assert_eq!(store.read(&template), Some(vec![Field::Int(1), Field::Int(2)]));
        assert_eq!(store.get(&template), Some(vec![Field::Int(1), Field::Int(2)]));
        assert_eq!(store.get(&template), None);
    }

    #[test]
    fn wildcard_position_matches_by_key() {
        let store = TupleStore::new();
        store.put(vec![Field::Int(1), Field::Bytes(b"a".to_vec())]);
        store.put(vec![Field::Int(2), Field::Bytes(b"b".to_vec())]);

        let template = vec![Field::Int(2), Field::Wildcard];
        assert_eq!(store.get(&template), Some(vec![Field::Int(2), Field::Bytes(b"b".to_vec())]));
        assert_eq!(store.read(&vec![Field::Int(1), Field::Wildcard]), Some(vec![Field::Int(1), Field::Bytes(b"a".to_vec())]));
    }
}

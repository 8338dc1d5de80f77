//! Surrogate key generation.
//!
//! Ids are `<PREFIX><n>` with `n` zero-padded to six digits and counted
//! from 1 in first-seen order. They are only stable within one run.

use std::collections::HashMap;

/// Width of the numeric part of a surrogate id.
pub const ID_WIDTH: usize = 6;

pub const ARTIST_PREFIX: &str = "ART";
pub const ALBUM_PREFIX: &str = "ALB";

/// Explicit counter handing out sequential ids for one entity kind.
#[derive(Debug, Clone)]
pub struct IdSequence {
    prefix: &'static str,
    next: u64,
}

impl IdSequence {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, next: 1 }
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("{}{:0width$}", self.prefix, self.next, width = ID_WIDTH);
        self.next += 1;
        id
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

/// Maps unique names to the id they were first registered with.
#[derive(Debug, Clone)]
pub struct KeyRegistry {
    sequence: IdSequence,
    ids: HashMap<String, String>,
    order: Vec<(String, String)>,
}

impl KeyRegistry {
    pub fn new(sequence: IdSequence) -> Self {
        Self {
            sequence,
            ids: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a name, returning its id. Known names keep their first id.
    pub fn register(&mut self, name: &str) -> &str {
        if !self.ids.contains_key(name) {
            let id = self.sequence.next_id();
            self.ids.insert(name.to_string(), id.clone());
            self.order.push((id, name.to_string()));
        }
        &self.ids[name]
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.ids.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `(id, name)` pairs in registration order.
    pub fn into_entries(self) -> Vec<(String, String)> {
        self.order
    }
}

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Rule id to computed value, in rule order.
///
/// Produced by one evaluation pass; holds exactly one entry per rule.
#[derive(Debug, Clone, Default)]
pub struct ResultRecord {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl PartialEq for ResultRecord {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

/// Per-rule sums across items. Same shape as a [`ResultRecord`].
pub type Totals = ResultRecord;

impl ResultRecord {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Append an entry. Callers guarantee `id` is not already present.
    pub(crate) fn push(&mut self, id: &str, value: f64) {
        self.index.entry(id.to_owned()).or_insert(self.entries.len());
        self.entries.push((id.to_owned(), value));
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<f64> {
        self.index.get(id).map(|&slot| self.entries[slot].1)
    }

    /// Value for `id`, or `0` when absent.
    #[must_use]
    pub fn value_or_zero(&self, id: &str) -> f64 {
        self.get(id).unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(id, value)| (id.as_str(), *value))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ResultRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, value) in &self.entries {
            map.serialize_entry(id, value)?;
        }
        map.end()
    }
}

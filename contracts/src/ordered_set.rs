use std::collections::HashSet;
use std::hash::Hash;

/// A set that preserves insertion order, used for `AgentState.tools_used`
/// (spec §3: "set-with-insertion-order of agent identifiers that ran").
///
/// Small cardinality (at most a handful of agent ids per request) makes the
/// O(n) `contains` scan during `insert` irrelevant in practice; a `HashSet` is
/// kept alongside purely so membership checks elsewhere stay O(1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedSet<T> {
    order: Vec<T>,
    seen: HashSet<T>,
}

impl<T: Clone + Eq + Hash> OrderedSet<T> {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Insert `value`, returning `true` if it was newly added.
    pub fn insert(&mut self, value: T) -> bool {
        if self.seen.insert(value.clone()) {
            self.order.push(value);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.seen.contains(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.order
    }
}

impl<T: Clone + Eq + Hash> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl<T: serde::Serialize + Clone + Eq + Hash> serde::Serialize for OrderedSet<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.order.serialize(serializer)
    }
}

impl<'de, T: serde::Deserialize<'de> + Clone + Eq + Hash> serde::Deserialize<'de>
    for OrderedSet<T>
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let items: Vec<T> = Vec::deserialize(deserializer)?;
        Ok(items.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order_and_dedupes() {
        let mut set: OrderedSet<&'static str> = OrderedSet::new();
        assert!(set.insert("planner"));
        assert!(set.insert("cards"));
        assert!(!set.insert("planner"));
        assert_eq!(set.as_slice(), &["planner", "cards"]);
        assert!(set.contains(&"cards"));
        assert!(!set.contains(&"judge"));
    }
}

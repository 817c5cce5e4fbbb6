use std::collections::HashSet;
use std::hash::Hash;

/// Remembers which items already played their entrance presentation.
///
/// The record lives as long as the gate. It is never cleared between layout
/// passes, so an item that was revealed once is not revealed again when the
/// grid reflows, is reordered, or leaves and re-enters the item list.
#[derive(Debug, Clone)]
pub struct RevealGate<K> {
    revealed: HashSet<K>,
}

impl<K> RevealGate<K>
where
    K: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self {
            revealed: HashSet::new(),
        }
    }

    /// Returns `true` the first time it is called for `id` and `false` on every
    /// later call.
    pub fn should_reveal(&mut self, id: &K) -> bool {
        if self.revealed.contains(id) {
            return false;
        }
        self.revealed.insert(id.clone());
        true
    }

    pub fn is_revealed(&self, id: &K) -> bool {
        self.revealed.contains(id)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }
}

impl<K> Default for RevealGate<K>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveals_once() {
        let mut gate = RevealGate::new();
        assert!(gate.should_reveal(&7u64));
        for _ in 0..10 {
            assert!(!gate.should_reveal(&7u64));
        }
        assert!(gate.is_revealed(&7));
        assert_eq!(gate.revealed_count(), 1);
    }

    #[test]
    fn test_ids_are_independent() {
        let mut gate = RevealGate::new();
        let ids = ["a", "b", "c"];
        let first: Vec<bool> = ids.iter().map(|id| gate.should_reveal(id)).collect();
        assert_eq!(first, vec![true, true, true]);

        let reordered: Vec<bool> = ids.iter().rev().map(|id| gate.should_reveal(id)).collect();
        assert_eq!(reordered, vec![false, false, false]);
        assert!(gate.should_reveal(&"d"));
    }
}

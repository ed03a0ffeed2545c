use bitvec::prelude::*;

/// A set of values keyed by a dense `usize`, insertion-ordered, with
/// first-writer-wins semantics: inserting under an occupied key is a no-op.
///
/// The matcher keys threads by state id, which the finishing pass keeps
/// dense, so membership is a plain bitmap lookup and iteration is a vector
/// walk in the order threads were registered. That order is the thread
/// priority order and must be preserved.
pub(crate) struct ThreadSet<T> {
    items: Vec<(usize, T)>,
    occupied: BitVec,
}

impl<T> ThreadSet<T> {
    /// Creates a set accepting keys in `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self { items: Vec::new(), occupied: bitvec![0; capacity] }
    }

    /// Inserts `value` under `key` unless the key is already occupied.
    /// Returns true if the value was inserted.
    pub fn insert(&mut self, key: usize, value: T) -> bool {
        if self.occupied[key] {
            return false;
        }
        self.occupied.set(key, true);
        self.items.push((key, value));
        true
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Empties the set, yielding the stored values in insertion order.
    /// Only the occupied bits are cleared, so this is proportional to the
    /// number of items, not to the capacity.
    pub fn take(&mut self) -> impl Iterator<Item = T> + '_ {
        for (key, _) in self.items.iter() {
            self.occupied.set(*key, false);
        }
        self.items.drain(..).map(|(_, value)| value)
    }
}

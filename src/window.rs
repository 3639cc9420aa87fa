// Bounded, oldest-first window of recent items. Appending past capacity evicts from the head.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Window<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> Window<T> {
    /// A capacity of 0 is raised to 1; a window always retains the latest push.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Upper bound on `len()`, after the zero-capacity adjustment in `new`.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest-first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + Clone {
        self.items.iter()
    }

    /// Consecutive `(older, newer)` pairs, oldest pair first.
    pub fn pairs(&self) -> impl Iterator<Item = (&T, &T)> {
        self.items.iter().zip(self.items.iter().skip(1))
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> Window<T> {
    /// Owned copy of the contents, oldest-first. For callers that need the sequence after the
    /// window moves on; derivation borrows via `iter` and `pairs` instead.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

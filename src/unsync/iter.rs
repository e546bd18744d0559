use super::ValueEntry;

use std::slice;

/// An iterator over the `(name, payload)` pairs of a cache, in insertion order.
pub struct Iter<'i, V> {
    iter: slice::Iter<'i, Option<ValueEntry<V>>>,
}

impl<'i, V> Iter<'i, V> {
    pub(crate) fn new(iter: slice::Iter<'i, Option<ValueEntry<V>>>) -> Self {
        Self { iter }
    }
}

impl<'i, V> Iterator for Iter<'i, V> {
    type Item = (&'i str, &'i V);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .find_map(Option::as_ref)
            .map(|entry| (&*entry.name, &entry.payload))
    }
}

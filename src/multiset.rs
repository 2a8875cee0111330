/*!

An unordered collection with per-element multiplicity. This is the subject representation
for commutative operand sets: a commutative operator's operands are matched as a multiset,
not as an ordered list.

Equality and iteration are by `(value, count)` pairs. Zero-multiplicity entries are never
stored, so two multisets built along different paths compare equal whenever their
multiplicities agree.

*/

use std::hash::Hash;

use fnv::FnvHashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Multiset<T: Eq + Hash> {
  elements: FnvHashMap<T, usize>,
  /// Total multiplicity, maintained incrementally.
  size: usize,
}

impl<T: Eq + Hash + Clone> Multiset<T> {
  pub fn new() -> Multiset<T> {
    Multiset {
      elements: FnvHashMap::default(),
      size: 0,
    }
  }

  /// The total multiplicity of the multiset, i.e. the number of elements counted with
  /// repetition.
  pub fn len(&self) -> usize {
    self.size
  }

  pub fn is_empty(&self) -> bool {
    self.size == 0
  }

  /// The number of distinct values.
  pub fn distinct_len(&self) -> usize {
    self.elements.len()
  }

  /// The multiplicity of `value`, zero if absent.
  pub fn multiplicity(&self, value: &T) -> usize {
    self.elements.get(value).copied().unwrap_or(0)
  }

  pub fn contains(&self, value: &T) -> bool {
    self.elements.contains_key(value)
  }

  pub fn insert(&mut self, value: T) {
    self.insert_times(value, 1);
  }

  /// Inserts `count` occurrences of `value`. Inserting zero occurrences is a no-op, so
  /// no zero-multiplicity entry is ever created.
  pub fn insert_times(&mut self, value: T, count: usize) {
    if count == 0 {
      return;
    }
    *self.elements.entry(value).or_insert(0) += count;
    self.size += count;
  }

  /// Removes one occurrence of `value`. Returns false (and leaves the multiset
  /// untouched) if the value is absent.
  pub fn remove(&mut self, value: &T) -> bool {
    self.remove_times(value, 1)
  }

  /// Removes `count` occurrences of `value`. Returns false (and leaves the multiset
  /// untouched) if fewer than `count` occurrences are present.
  pub fn remove_times(&mut self, value: &T, count: usize) -> bool {
    if count == 0 {
      return true;
    }
    match self.elements.get_mut(value) {
      Some(multiplicity) if *multiplicity > count => {
        *multiplicity -= count;
        self.size -= count;
        true
      }
      Some(multiplicity) if *multiplicity == count => {
        self.elements.remove(value);
        self.size -= count;
        true
      }
      _ => false,
    }
  }

  /// Iterates over `(value, multiplicity)` pairs in unspecified order.
  pub fn iter(&self) -> impl Iterator<Item = (&T, usize)> {
    self.elements.iter().map(|(value, &count)| (value, count))
  }

  /// Iterates over the distinct values in unspecified order.
  pub fn distinct_values(&self) -> impl Iterator<Item = &T> {
    self.elements.keys()
  }

  /// The elements counted with repetition, in unspecified order.
  pub fn expanded(&self) -> Vec<T> {
    let mut elements = Vec::with_capacity(self.size);
    for (value, count) in self.iter() {
      for _ in 0..count {
        elements.push(value.clone());
      }
    }
    elements
  }
}

impl<T: Eq + Hash + Clone> Default for Multiset<T> {
  fn default() -> Self {
    Multiset::new()
  }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for Multiset<T> {
  fn from_iter<I: IntoIterator<Item = T>>(iterator: I) -> Self {
    let mut multiset = Multiset::new();
    for value in iterator {
      multiset.insert(value);
    }
    multiset
  }
}

impl<T: Eq + Hash + Clone> FromIterator<(T, usize)> for Multiset<T> {
  fn from_iter<I: IntoIterator<Item = (T, usize)>>(iterator: I) -> Self {
    let mut multiset = Multiset::new();
    for (value, count) in iterator {
      multiset.insert_times(value, count);
    }
    multiset
  }
}

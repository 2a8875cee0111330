/*!

Pure combinatorial enumerators over integer vectors: bounded compositions
(`fixed_integer_vector_iter`) and ordered compositions (`integer_partition_vector_iter`).
Both yield in lexicographic order and are lazy; each `next` computes the successor of
the current vector in place and hands out a copy.

*/

use smallvec::SmallVec;

/// An integer vector yielded by the enumerators.
pub type IntegerVector = SmallVec<[usize; 4]>;

/// Yields, in lexicographic order, every vector `v` with `0 ≤ v[i] ≤ max_vector[i]`
/// componentwise and `Σv = vector_sum`. A zero-length `max_vector` yields the empty
/// vector iff `vector_sum == 0`.
///
/// ```
/// # use rewritelib::fixed_integer_vector_iter;
/// let vectors: Vec<_> = fixed_integer_vector_iter(&[2, 2], 2).collect();
/// assert_eq!(vectors.len(), 3); // (0,2), (1,1), (2,0)
/// ```
pub fn fixed_integer_vector_iter(max_vector: &[usize], vector_sum: usize) -> FixedIntegerVectors {
  // suffix_capacity[j] = Σ max_vector[j..], so suffix_capacity[len] == 0.
  let mut suffix_capacity: SmallVec<[usize; 8]> = SmallVec::with_capacity(max_vector.len() + 1);
  suffix_capacity.push(0);
  for &bound in max_vector.iter().rev() {
    let last = *suffix_capacity.last().unwrap_or(&0);
    suffix_capacity.push(last + bound);
  }
  suffix_capacity.reverse();

  FixedIntegerVectors {
    max_vector: max_vector.iter().copied().collect(),
    suffix_capacity,
    current: IntegerVector::new(),
    vector_sum,
    started: false,
    exhausted: false,
  }
}

pub struct FixedIntegerVectors {
  max_vector: SmallVec<[usize; 8]>,
  suffix_capacity: SmallVec<[usize; 8]>,
  current: IntegerVector,
  vector_sum: usize,
  started: bool,
  exhausted: bool,
}

impl FixedIntegerVectors {
  /// Overwrites `current[from..]` with the lexicographically smallest suffix summing to
  /// `residual`. Requires `residual ≤ suffix_capacity[from]`.
  fn fill_minimal(&mut self, from: usize, mut residual: usize) {
    for index in from..self.max_vector.len() {
      let value = residual.saturating_sub(self.suffix_capacity[index + 1]);
      self.current[index] = value;
      residual -= value;
    }
  }
}

impl Iterator for FixedIntegerVectors {
  type Item = IntegerVector;

  fn next(&mut self) -> Option<IntegerVector> {
    if self.exhausted {
      return None;
    }

    if !self.started {
      self.started = true;
      if self.vector_sum > self.suffix_capacity[0] {
        self.exhausted = true;
        return None;
      }
      if self.max_vector.is_empty() {
        self.exhausted = true;
        return Some(IntegerVector::new());
      }
      self.current = SmallVec::from_elem(0, self.max_vector.len());
      self.fill_minimal(0, self.vector_sum);
      return Some(self.current.clone());
    }

    // Successor: find the rightmost component that can take one unit from its suffix,
    // bump it, and reset the suffix to its minimal configuration.
    let length = self.max_vector.len();
    let mut suffix_sum = match self.current.last() {
      Some(&last) => last,
      None => {
        self.exhausted = true;
        return None;
      }
    };
    for index in (0..length.saturating_sub(1)).rev() {
      if suffix_sum >= 1 && self.current[index] < self.max_vector[index] {
        self.current[index] += 1;
        self.fill_minimal(index + 1, suffix_sum - 1);
        return Some(self.current.clone());
      }
      suffix_sum += self.current[index];
    }

    self.exhausted = true;
    None
  }
}

/// Yields, in lexicographic order, every `parts`-length non-negative vector summing to
/// `total` (ordered compositions, not unique multisets). `parts == 0` yields the empty
/// vector iff `total == 0`.
///
/// ```
/// # use rewritelib::integer_partition_vector_iter;
/// let vectors: Vec<_> = integer_partition_vector_iter(5, 2).collect();
/// assert_eq!(vectors.len(), 6); // (0,5) through (5,0)
/// ```
pub fn integer_partition_vector_iter(total: usize, parts: usize) -> IntegerPartitionVectors {
  IntegerPartitionVectors {
    total,
    parts,
    current: IntegerVector::new(),
    started: false,
    exhausted: false,
  }
}

pub struct IntegerPartitionVectors {
  total: usize,
  parts: usize,
  current: IntegerVector,
  started: bool,
  exhausted: bool,
}

impl Iterator for IntegerPartitionVectors {
  type Item = IntegerVector;

  fn next(&mut self) -> Option<IntegerVector> {
    if self.exhausted {
      return None;
    }

    if !self.started {
      self.started = true;
      if self.parts == 0 {
        self.exhausted = true;
        return if self.total == 0 {
          Some(IntegerVector::new())
        } else {
          None
        };
      }
      self.current = SmallVec::from_elem(0, self.parts);
      self.current[self.parts - 1] = self.total;
      return Some(self.current.clone());
    }

    // Successor: move one unit from the suffix to the rightmost component that has a
    // non-empty suffix, then push the remainder all the way right.
    let mut suffix_sum = self.current[self.parts - 1];
    for index in (0..self.parts - 1).rev() {
      if suffix_sum >= 1 {
        self.current[index] += 1;
        for tail in index + 1..self.parts {
          self.current[tail] = 0;
        }
        self.current[self.parts - 1] = suffix_sum - 1;
        return Some(self.current.clone());
      }
      suffix_sum += self.current[index];
    }

    self.exhausted = true;
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use num_integer::binomial;

  fn as_tuples(vectors: Vec<IntegerVector>) -> Vec<Vec<usize>> {
    vectors.into_iter().map(|v| v.to_vec()).collect()
  }

  #[test]
  fn fixed_vectors_example() {
    let vectors = as_tuples(fixed_integer_vector_iter(&[2, 2], 2).collect());
    assert_eq!(vectors, vec![vec![0, 2], vec![1, 1], vec![2, 0]]);
  }

  #[test]
  fn fixed_vectors_zero_length() {
    assert_eq!(fixed_integer_vector_iter(&[], 0).count(), 1);
    assert_eq!(fixed_integer_vector_iter(&[], 1).count(), 0);
  }

  #[test]
  fn fixed_vectors_infeasible_sum() {
    assert_eq!(fixed_integer_vector_iter(&[1, 2], 5).count(), 0);
  }

  #[test]
  fn fixed_vectors_bounds_sum_and_order() {
    for (max_vector, vector_sum) in [
      (vec![3, 1, 2], 4),
      (vec![2, 2, 2, 2], 5),
      (vec![0, 4, 1], 3),
      (vec![5], 5),
    ] {
      let vectors = as_tuples(fixed_integer_vector_iter(&max_vector, vector_sum).collect());

      for vector in &vectors {
        assert_eq!(vector.iter().sum::<usize>(), vector_sum);
        for (component, bound) in vector.iter().zip(max_vector.iter()) {
          assert!(component <= bound);
        }
      }

      // Lexicographic order with no repeats.
      let mut sorted = vectors.clone();
      sorted.sort();
      sorted.dedup();
      assert_eq!(vectors, sorted);

      // Count matches brute force.
      let expected = brute_force_bounded(&max_vector, vector_sum);
      assert_eq!(vectors.len(), expected);
    }
  }

  fn brute_force_bounded(max_vector: &[usize], vector_sum: usize) -> usize {
    if max_vector.is_empty() {
      return usize::from(vector_sum == 0);
    }
    let mut count = 0;
    for value in 0..=max_vector[0].min(vector_sum) {
      count += brute_force_bounded(&max_vector[1..], vector_sum - value);
    }
    count
  }

  #[test]
  fn partition_vectors_example() {
    let vectors = as_tuples(integer_partition_vector_iter(5, 2).collect());
    assert_eq!(
      vectors,
      vec![
        vec![0, 5],
        vec![1, 4],
        vec![2, 3],
        vec![3, 2],
        vec![4, 1],
        vec![5, 0]
      ]
    );
  }

  #[test]
  fn partition_vectors_zero_parts() {
    assert_eq!(integer_partition_vector_iter(0, 0).count(), 1);
    assert_eq!(integer_partition_vector_iter(2, 0).count(), 0);
  }

  #[test]
  fn partition_vectors_counts_match_closed_form() {
    for (total, parts) in [(5usize, 2usize), (4, 3), (0, 3), (6, 1), (3, 4)] {
      let vectors = as_tuples(integer_partition_vector_iter(total, parts).collect());

      for vector in &vectors {
        assert_eq!(vector.len(), parts);
        assert_eq!(vector.iter().sum::<usize>(), total);
      }

      let mut sorted = vectors.clone();
      sorted.sort();
      sorted.dedup();
      assert_eq!(vectors, sorted);

      // C(total + parts - 1, parts - 1) ordered compositions.
      let expected = binomial(total + parts - 1, parts - 1);
      assert_eq!(vectors.len(), expected);
    }
  }
}

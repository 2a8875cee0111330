/*!

The commutative sequence-variable partitioner: enumerate every way to distribute a
subject multiset among a list of sequence variables, respecting each variable's
occurrence count and minimum captured size.

A variable occurring `count` times syntactically must receive the same sub-multiset for
each occurrence, so the occurrences of each subject value must split across the
variables as a solution of the linear Diophantine equation
`Σ countᵢ·xᵢ = multiplicity`. One generator-chain stage per distinct value threads a
partial assignment through those solution sets; a completed assignment is kept only if
every variable reached its minimum.

Results are not yielded in any particular order because the coordination data structure
is an associative mapping.

*/

use std::hash::Hash;

use fnv::FnvHashMap;

use crate::{
  error::Error,
  generators::{generator_chain, GeneratorFactory},
  interner::InternedString,
  multiset::Multiset,
  solve::{solve_linear_diop, DiophantineCache},
};

/// A sequence variable occurring `count` times syntactically in a commutative pattern,
/// requiring at least `minimum` captured elements (after dividing by `count`).
/// `name == None` denotes an anonymous variable whose binding is discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableWithCount {
  pub name: Option<InternedString>,
  pub count: usize,
  pub minimum: usize,
}

impl VariableWithCount {
  pub fn new(name: Option<InternedString>, count: usize, minimum: usize) -> VariableWithCount {
    VariableWithCount { name, count, minimum }
  }
}

/// One partition: each named variable mapped to the sub-multiset it captures.
pub type PartitionFragment<T> = FnvHashMap<InternedString, Multiset<T>>;

/// Yields every substitution fragment that partitions `values` among `variables`.
///
/// The single-variable cases short-circuit without touching the solver; the
/// multi-variable case chains one per-value solution generator per distinct value of
/// `values` through `generator_chain`. Diophantine solution sets are memoized in
/// `cache`, which the caller owns and may share across calls.
pub fn commutative_sequence_variable_partition_iter<T>(
  values: &Multiset<T>,
  variables: &[VariableWithCount],
  cache: &mut DiophantineCache,
) -> Result<Box<dyn Iterator<Item = PartitionFragment<T>>>, Error>
where
  T: Eq + Hash + Clone + 'static,
{
  if variables.len() == 1 {
    let fragment = single_variable_partition(values, &variables[0]);
    return Ok(Box::new(fragment.into_iter()));
  }

  let counts: Vec<i64> = variables.iter().map(|variable| variable.count as i64).collect();

  // Pre-solve the per-value Diophantine equations so the chain stages only replay
  // shared solution sets.
  let mut factories: Vec<GeneratorFactory<'static, Vec<Multiset<T>>>> = Vec::new();
  for (value, multiplicity) in values.iter() {
    let solutions = solve_linear_diop(cache, multiplicity as i64, &counts)?;
    let value = value.clone();
    factories.push(Box::new(move |partial: &Vec<Multiset<T>>| {
      let partial = partial.clone();
      let value = value.clone();
      let solutions = solutions.clone();
      Box::new((0..solutions.len()).map(move |solution_index| {
        let mut extended = partial.clone();
        for (slot, &amount) in extended.iter_mut().zip(solutions[solution_index].iter()) {
          slot.insert_times(value.clone(), amount);
        }
        extended
      }))
    }));
  }

  let initial: Vec<Multiset<T>> = vec![Multiset::new(); variables.len()];
  let variables = variables.to_vec();
  let partitions = generator_chain(initial, factories).filter_map(move |assignment| {
    for (variable, captured) in variables.iter().zip(assignment.iter()) {
      if captured.len() < variable.minimum {
        return None;
      }
    }
    let mut fragment = PartitionFragment::default();
    for (variable, captured) in variables.iter().zip(assignment.into_iter()) {
      if let Some(name) = variable.name {
        fragment.insert(name, captured);
      }
    }
    Some(fragment)
  });

  Ok(Box::new(partitions))
}

/// The whole multiset goes to the one variable. With `count > 1` every multiplicity must
/// divide evenly; an indivisible multiplicity is a failed match, not a fallback.
fn single_variable_partition<T>(
  values: &Multiset<T>,
  variable: &VariableWithCount,
) -> Option<PartitionFragment<T>>
where
  T: Eq + Hash + Clone,
{
  let captured = if variable.count == 1 {
    if values.len() < variable.minimum {
      return None;
    }
    values.clone()
  } else {
    let mut divided = Multiset::new();
    for (value, multiplicity) in values.iter() {
      if multiplicity % variable.count != 0 {
        return None;
      }
      divided.insert_times(value.clone(), multiplicity / variable.count);
    }
    if divided.len() < variable.minimum {
      return None;
    }
    divided
  };

  let mut fragment = PartitionFragment::default();
  if let Some(name) = variable.name {
    fragment.insert(name, captured);
  }
  Some(fragment)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::interner::interned;

  fn multiset(elements: &str) -> Multiset<char> {
    elements.chars().collect()
  }

  /// Renders a fragment as a sorted, deterministic string for comparison.
  fn fragment_to_string(fragment: &PartitionFragment<char>) -> String {
    let mut entries: Vec<String> = fragment
      .iter()
      .map(|(name, captured)| {
        let mut elements = captured.expanded();
        elements.sort();
        format!(
          "{} -> {}",
          crate::interner::resolve_str(*name),
          elements.into_iter().collect::<String>()
        )
      })
      .collect();
    entries.sort();
    format!("{{{}}}", entries.join(", "))
  }

  fn sorted_fragments(fragments: Vec<PartitionFragment<char>>) -> Vec<String> {
    let mut rendered: Vec<String> = fragments.iter().map(fragment_to_string).collect();
    rendered.sort();
    rendered
  }

  #[test]
  fn single_variable_takes_everything() {
    let mut cache = DiophantineCache::new();
    let variables = [VariableWithCount::new(Some(interned("x")), 1, 1)];
    let fragments: Vec<_> =
      commutative_sequence_variable_partition_iter(&multiset("aab"), &variables, &mut cache)
        .unwrap()
        .collect();
    assert_eq!(sorted_fragments(fragments), vec!["{x -> aab}"]);
  }

  #[test]
  fn single_variable_minimum_unsatisfied() {
    let mut cache = DiophantineCache::new();
    let variables = [VariableWithCount::new(Some(interned("x")), 1, 4)];
    let count = commutative_sequence_variable_partition_iter(&multiset("aab"), &variables, &mut cache)
      .unwrap()
      .count();
    assert_eq!(count, 0);
  }

  #[test]
  fn single_variable_division() {
    let mut cache = DiophantineCache::new();
    let variables = [VariableWithCount::new(Some(interned("x")), 2, 0)];
    let fragments: Vec<_> =
      commutative_sequence_variable_partition_iter(&multiset("aabb"), &variables, &mut cache)
        .unwrap()
        .collect();
    assert_eq!(sorted_fragments(fragments), vec!["{x -> ab}"]);
  }

  #[test]
  fn single_variable_indivisible_multiplicity_fails() {
    let mut cache = DiophantineCache::new();
    let variables = [VariableWithCount::new(Some(interned("x")), 2, 0)];
    let count = commutative_sequence_variable_partition_iter(&multiset("aab"), &variables, &mut cache)
      .unwrap()
      .count();
    assert_eq!(count, 0);
  }

  #[test]
  fn anonymous_variable_binding_is_discarded() {
    let mut cache = DiophantineCache::new();
    let variables = [VariableWithCount::new(None, 1, 0)];
    let fragments: Vec<_> =
      commutative_sequence_variable_partition_iter(&multiset("ab"), &variables, &mut cache)
        .unwrap()
        .collect();
    assert_eq!(fragments.len(), 1);
    assert!(fragments[0].is_empty());
  }

  /// The worked example for `f[x__, y__, y__]` against `f[a, a, a, b, b, c]`: x occurs
  /// once with minimum one, y occurs twice.
  #[test]
  fn two_variable_partition() {
    let mut cache = DiophantineCache::new();
    let variables = [
      VariableWithCount::new(Some(interned("x")), 1, 1),
      VariableWithCount::new(Some(interned("y")), 2, 0),
    ];
    let fragments: Vec<_> =
      commutative_sequence_variable_partition_iter(&multiset("aaabbc"), &variables, &mut cache)
        .unwrap()
        .collect();

    assert_eq!(
      sorted_fragments(fragments),
      vec![
        "{x -> aaabbc, y -> }",
        "{x -> aaac, y -> b}",
        "{x -> abbc, y -> a}",
        "{x -> ac, y -> ab}",
      ]
    );
  }

  /// Every fragment reconstructs the subject multiset exactly, with each variable's
  /// sub-multiset weighted by its occurrence count.
  #[test]
  fn partitions_account_for_every_occurrence() {
    let mut cache = DiophantineCache::new();
    let subject = multiset("aaabbc");
    let variables = [
      VariableWithCount::new(Some(interned("x")), 1, 1),
      VariableWithCount::new(Some(interned("y")), 2, 0),
    ];
    let fragments: Vec<_> =
      commutative_sequence_variable_partition_iter(&subject, &variables, &mut cache)
        .unwrap()
        .collect();
    assert!(!fragments.is_empty());

    for fragment in fragments {
      let mut reconstructed: Multiset<char> = Multiset::new();
      for variable in &variables {
        let name = variable.name.unwrap();
        let captured = fragment.get(&name).cloned().unwrap_or_default();
        for (value, multiplicity) in captured.iter() {
          reconstructed.insert_times(*value, multiplicity * variable.count);
        }
      }
      assert_eq!(reconstructed, subject);

      // y's share must divide evenly: the fragment stores the already-halved multiset,
      // so doubling it must stay within the subject.
      let y = fragment.get(&interned("y")).cloned().unwrap_or_default();
      for (value, multiplicity) in y.iter() {
        assert!(subject.multiplicity(value) >= 2 * multiplicity);
      }
    }
  }

  #[test]
  fn three_variables_with_minimums() {
    let mut cache = DiophantineCache::new();
    let variables = [
      VariableWithCount::new(Some(interned("x")), 1, 1),
      VariableWithCount::new(Some(interned("y")), 1, 1),
      VariableWithCount::new(Some(interned("z")), 1, 0),
    ];
    let subject = multiset("ab");
    let fragments: Vec<_> =
      commutative_sequence_variable_partition_iter(&subject, &variables, &mut cache)
        .unwrap()
        .collect();

    // Two elements across two mandatory variables: z must stay empty.
    assert_eq!(
      sorted_fragments(fragments),
      vec!["{x -> a, y -> b, z -> }", "{x -> b, y -> a, z -> }"]
    );
  }

  #[test]
  fn empty_subject_with_optional_variables() {
    let mut cache = DiophantineCache::new();
    let variables = [
      VariableWithCount::new(Some(interned("x")), 1, 0),
      VariableWithCount::new(Some(interned("y")), 1, 0),
    ];
    let subject: Multiset<char> = Multiset::new();
    let fragments: Vec<_> =
      commutative_sequence_variable_partition_iter(&subject, &variables, &mut cache)
        .unwrap()
        .collect();
    assert_eq!(sorted_fragments(fragments), vec!["{x -> , y -> }"]);
  }
}

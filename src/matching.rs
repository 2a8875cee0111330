/*!

The one-to-one matcher: match a single pattern against a single subject, producing every
substitution under which the pattern equals the subject.

Ordered operand lists are matched left to right, enumerating every contiguous split at
each sequence variable. Commutative operand lists are matched as multisets in stages:
ground operands are removed by lookup, non-ground operation subpatterns are tried against
each distinct remaining value, ordinary variables are enumerated over the remainder, and
whatever is left is distributed among the pattern's sequence variables by the commutative
partitioner, whose fragments are bound as unresolved multisets. Binding consistency is
enforced at every stage, which is what makes non-linear patterns work across all of them.

Enumeration is driven through an emitting callback: each completed substitution is handed
to the callback, and a `false` return unwinds the whole backtracking search immediately.
The rewrite engine uses this to stop at the first match instead of paying for the full
combinatorial enumeration.

*/

use crate::{
  error::Error,
  expression::Expression,
  interner::InternedString,
  logging::{log, Channel},
  multiset::Multiset,
  partitions::{commutative_sequence_variable_partition_iter, VariableWithCount},
  solve::DiophantineCache,
  substitution::{Binding, Substitution},
};

/// Receives each substitution as it is found, together with the solver cache on loan.
/// Returns whether the search should continue.
type Emit<'e> = dyn FnMut(&Substitution, &mut DiophantineCache) -> Result<bool, Error> + 'e;

/// As `Emit`, for the intermediate commutative stages that also carry the multiset of
/// operands not yet consumed.
type StageEmit<'e> =
  dyn FnMut(&Substitution, &Multiset<Expression>, &mut DiophantineCache) -> Result<bool, Error>
    + 'e;

/// Yields every substitution under which `pattern` matches `subject`.
///
/// The match is anchored at the root of `subject`; use `preorder_iter` to match against
/// subexpressions. A fresh Diophantine cache is used per call. Callers that only need
/// one result, such as the rewriting loop, go through `first_match_with_cache` and stop
/// the search at the first hit.
pub fn match_expression(
  subject: &Expression,
  pattern: &Expression,
) -> Result<std::vec::IntoIter<Substitution>, Error> {
  log(
    Channel::Match,
    4,
    &format!("matching {} against pattern {}", subject, pattern),
  );
  let mut cache = DiophantineCache::new();
  let mut results: Vec<Substitution> = Vec::new();
  match_terms(
    subject,
    pattern,
    &Substitution::new(),
    &mut cache,
    &mut |substitution: &Substitution, _: &mut DiophantineCache| {
      results.push(substitution.clone());
      Ok(true)
    },
  )?;
  Ok(results.into_iter())
}

/// The first substitution under which `pattern` matches `subject`, if any, abandoning
/// the rest of the search space as soon as it is found.
pub(crate) fn first_match_with_cache(
  subject: &Expression,
  pattern: &Expression,
  cache: &mut DiophantineCache,
) -> Result<Option<Substitution>, Error> {
  log(
    Channel::Match,
    5,
    &format!("seeking first match of {} against pattern {}", subject, pattern),
  );
  let mut first: Option<Substitution> = None;
  match_terms(
    subject,
    pattern,
    &Substitution::new(),
    cache,
    &mut |substitution: &Substitution, _: &mut DiophantineCache| {
      first = Some(substitution.clone());
      Ok(false)
    },
  )?;
  Ok(first)
}

/// Matches one pattern term against one subject term under existing bindings. Returns
/// whether the caller should keep searching.
fn match_terms(
  subject: &Expression,
  pattern: &Expression,
  bindings: &Substitution,
  cache: &mut DiophantineCache,
  emit: &mut Emit,
) -> Result<bool, Error> {
  match pattern {
    Expression::Symbol(_) => {
      if subject == pattern {
        emit(bindings, cache)
      } else {
        Ok(true)
      }
    }

    Expression::Variable(name) => {
      let mut extended = bindings.clone();
      if extended.try_bind(*name, Binding::Single(subject.clone())) {
        emit(&extended, cache)
      } else {
        Ok(true)
      }
    }

    // A sequence variable in term position captures exactly one expression.
    Expression::SequenceVariable { name, minimum } => {
      if *minimum > 1 {
        return Ok(true);
      }
      match name {
        Some(name) => {
          let mut extended = bindings.clone();
          if extended.try_bind(*name, Binding::Sequence(vec![subject.clone()])) {
            emit(&extended, cache)
          } else {
            Ok(true)
          }
        }
        None => emit(bindings, cache),
      }
    }

    Expression::Operation(pattern_operation) => {
      let Expression::Operation(subject_operation) = subject else {
        return Ok(true);
      };
      if subject_operation.operator.name != pattern_operation.operator.name {
        return Ok(true);
      }
      if subject_operation.operator.attributes.commutative() {
        match_commutative(
          &subject_operation.operands,
          &pattern_operation.operands,
          bindings,
          cache,
          emit,
        )
      } else {
        match_operand_sequence(
          &subject_operation.operands,
          &pattern_operation.operands,
          bindings,
          cache,
          emit,
        )
      }
    }
  }
}

/// Ordered matching: patterns consume subjects left to right, and each sequence variable
/// enumerates every contiguous span it could capture.
fn match_operand_sequence(
  subjects: &[Expression],
  patterns: &[Expression],
  bindings: &Substitution,
  cache: &mut DiophantineCache,
  emit: &mut Emit,
) -> Result<bool, Error> {
  let Some((first, rest)) = patterns.split_first() else {
    return if subjects.is_empty() {
      emit(bindings, cache)
    } else {
      Ok(true)
    };
  };

  if let Expression::SequenceVariable { name, minimum } = first {
    for take in *minimum..=subjects.len() {
      let extended = match name {
        Some(name) => {
          let mut extended = bindings.clone();
          if !extended.try_bind(*name, Binding::Sequence(subjects[..take].to_vec())) {
            continue;
          }
          extended
        }
        None => bindings.clone(),
      };
      if !match_operand_sequence(&subjects[take..], rest, &extended, cache, emit)? {
        return Ok(false);
      }
    }
    return Ok(true);
  }

  let Some((subject_first, subject_rest)) = subjects.split_first() else {
    return Ok(true);
  };
  match_terms(
    subject_first,
    first,
    bindings,
    cache,
    &mut |matched: &Substitution, cache: &mut DiophantineCache| {
      match_operand_sequence(subject_rest, rest, matched, cache, emit)
    },
  )
}

/// Commutative matching over operand multisets, staged from most to least constrained.
fn match_commutative(
  subjects: &[Expression],
  patterns: &[Expression],
  bindings: &Substitution,
  cache: &mut DiophantineCache,
  emit: &mut Emit,
) -> Result<bool, Error> {
  let mut remaining: Multiset<Expression> = subjects.iter().cloned().collect();
  let mut complex: Vec<Expression> = Vec::new();
  let mut single_variables: Vec<InternedString> = Vec::new();
  let mut sequence_variables: Vec<VariableWithCount> = Vec::new();

  for operand in patterns {
    // Ground operands, including ground operations, are removed by direct lookup.
    // Subject and pattern operands are both in C-normal form, so syntactic equality
    // is the right test.
    if operand.is_ground() {
      if !remaining.remove(operand) {
        return Ok(true);
      }
      continue;
    }

    match operand {
      Expression::Variable(name) => match bindings.get(name) {
        Some(Binding::Single(bound)) => {
          if !remaining.remove(bound) {
            return Ok(true);
          }
        }
        Some(Binding::Sequence(bound)) if bound.len() == 1 => {
          if !remaining.remove(&bound[0]) {
            return Ok(true);
          }
        }
        Some(_) => return Ok(true),
        None => single_variables.push(*name),
      },

      Expression::SequenceVariable { name, minimum } => {
        let bound = name.as_ref().and_then(|name| bindings.get(name)).cloned();
        match bound {
          Some(binding) => {
            for element in binding.to_expressions() {
              if !remaining.remove(&element) {
                return Ok(true);
              }
            }
          }
          None => match name {
            Some(name) => {
              match sequence_variables.iter_mut().find(|v| v.name == Some(*name)) {
                Some(entry) => {
                  entry.count += 1;
                  entry.minimum = entry.minimum.max(*minimum);
                }
                None => {
                  sequence_variables.push(VariableWithCount::new(Some(*name), 1, *minimum));
                }
              }
            }
            // Each anonymous occurrence is independent.
            None => sequence_variables.push(VariableWithCount::new(None, 1, *minimum)),
          },
        }
      }

      Expression::Operation(_) => complex.push(operand.clone()),

      // Symbols are ground, handled above.
      Expression::Symbol(_) => {}
    }
  }

  match_complex_stage(
    &remaining,
    &complex,
    bindings,
    cache,
    &mut |matched: &Substitution,
          narrowed: &Multiset<Expression>,
          cache: &mut DiophantineCache| {
      match_single_stage(
        narrowed,
        &single_variables,
        matched,
        cache,
        &mut |matched: &Substitution,
              narrowed: &Multiset<Expression>,
              cache: &mut DiophantineCache| {
          match_sequence_stage(narrowed, &sequence_variables, matched, cache, emit)
        },
      )
    },
  )
}

/// Tries each non-ground operation subpattern against every distinct remaining value,
/// emitting the surviving bindings with the narrowed multiset.
fn match_complex_stage(
  remaining: &Multiset<Expression>,
  complex: &[Expression],
  bindings: &Substitution,
  cache: &mut DiophantineCache,
  emit: &mut StageEmit,
) -> Result<bool, Error> {
  let Some((first, rest)) = complex.split_first() else {
    return emit(bindings, remaining, cache);
  };

  let candidates: Vec<Expression> = remaining.distinct_values().cloned().collect();
  for candidate in candidates {
    let keep_searching = match_terms(
      &candidate,
      first,
      bindings,
      cache,
      &mut |matched: &Substitution, cache: &mut DiophantineCache| {
        let mut narrowed = remaining.clone();
        narrowed.remove(&candidate);
        match_complex_stage(&narrowed, rest, matched, cache, emit)
      },
    )?;
    if !keep_searching {
      return Ok(false);
    }
  }
  Ok(true)
}

/// Binds each unbound ordinary variable to one remaining value. Repeated occurrences of
/// the same name stay consistent through `try_bind`.
fn match_single_stage(
  remaining: &Multiset<Expression>,
  single_variables: &[InternedString],
  bindings: &Substitution,
  cache: &mut DiophantineCache,
  emit: &mut StageEmit,
) -> Result<bool, Error> {
  let Some((first, rest)) = single_variables.split_first() else {
    return emit(bindings, remaining, cache);
  };

  let candidates: Vec<Expression> = remaining.distinct_values().cloned().collect();
  for candidate in candidates {
    let mut extended = bindings.clone();
    if !extended.try_bind(*first, Binding::Single(candidate.clone())) {
      continue;
    }
    let mut narrowed = remaining.clone();
    narrowed.remove(&candidate);
    if !match_single_stage(&narrowed, rest, &extended, cache, emit)? {
      return Ok(false);
    }
  }
  Ok(true)
}

/// Distributes whatever the earlier stages left over among the sequence variables,
/// binding each captured fragment as an unresolved multiset. With no sequence variables
/// the remainder must be empty.
fn match_sequence_stage(
  remaining: &Multiset<Expression>,
  sequence_variables: &[VariableWithCount],
  bindings: &Substitution,
  cache: &mut DiophantineCache,
  emit: &mut Emit,
) -> Result<bool, Error> {
  if sequence_variables.is_empty() {
    return if remaining.is_empty() {
      emit(bindings, cache)
    } else {
      Ok(true)
    };
  }

  let fragments =
    commutative_sequence_variable_partition_iter(remaining, sequence_variables, cache)?;
  for fragment in fragments {
    let mut extended = bindings.clone();
    let mut consistent = true;
    for (name, captured) in fragment {
      if !extended.try_bind(name, Binding::Multiset(captured)) {
        consistent = false;
        break;
      }
    }
    if consistent && !emit(&extended, cache)? {
      return Ok(false);
    }
  }
  Ok(true)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::expression::Operator;

  fn all_matches(subject: &Expression, pattern: &Expression) -> Vec<String> {
    let mut rendered: Vec<String> = match_expression(subject, pattern)
      .unwrap()
      .map(|substitution| substitution.to_string())
      .collect();
    rendered.sort();
    rendered
  }

  #[test]
  fn symbols_match_themselves() {
    let a = Expression::symbol("a");
    assert_eq!(all_matches(&a, &a), vec!["{}"]);
    assert!(all_matches(&a, &Expression::symbol("b")).is_empty());
  }

  #[test]
  fn variable_binds_the_subject() {
    let f = Operator::new("f");
    let subject = f.from_args(vec![Expression::symbol("a")]).unwrap();
    assert_eq!(all_matches(&subject, &Expression::variable("x")), vec!["{x -> f[a]}"]);
  }

  #[test]
  fn heads_must_agree() {
    let f = Operator::new("f");
    let g = Operator::new("g");
    let subject = f.from_args(vec![Expression::symbol("a")]).unwrap();
    let pattern = g.from_args(vec![Expression::variable("x")]).unwrap();
    assert!(all_matches(&subject, &pattern).is_empty());
  }

  #[test]
  fn ordered_non_linear_pattern() {
    let f = Operator::new("f");
    let pattern = f
      .from_args(vec![Expression::variable("x"), Expression::variable("x")])
      .unwrap();

    let same = f.from_args(vec![Expression::symbol("a"), Expression::symbol("a")]).unwrap();
    assert_eq!(all_matches(&same, &pattern), vec!["{x -> a}"]);

    let different = f.from_args(vec![Expression::symbol("a"), Expression::symbol("b")]).unwrap();
    assert!(all_matches(&different, &pattern).is_empty());
  }

  #[test]
  fn ordered_sequence_splits() {
    let f = Operator::new("f");
    let pattern = f
      .from_args(vec![
        Expression::null_sequence_variable("x"),
        Expression::null_sequence_variable("y"),
      ])
      .unwrap();
    let subject = f.from_args(vec![Expression::symbol("a"), Expression::symbol("b")]).unwrap();

    assert_eq!(
      all_matches(&subject, &pattern),
      vec![
        "{x -> (), y -> (a, b)}",
        "{x -> (a), y -> (b)}",
        "{x -> (a, b), y -> ()}",
      ]
    );
  }

  /// Ordered enumeration is shortest-prefix first, so the first result is deterministic
  /// and the search stops without exploring the remaining splits.
  #[test]
  fn first_match_stops_at_the_first_split() {
    let f = Operator::new("f");
    let pattern = f
      .from_args(vec![
        Expression::null_sequence_variable("x"),
        Expression::null_sequence_variable("y"),
      ])
      .unwrap();
    let subject = f.from_args(vec![Expression::symbol("a"), Expression::symbol("b")]).unwrap();

    let mut cache = DiophantineCache::new();
    let first = first_match_with_cache(&subject, &pattern, &mut cache).unwrap().unwrap();
    assert_eq!(first.to_string(), "{x -> (), y -> (a, b)}");

    let missing = first_match_with_cache(&subject, &Expression::symbol("z"), &mut cache).unwrap();
    assert!(missing.is_none());
  }

  #[test]
  fn sequence_minimum_one_rejects_empty() {
    let f = Operator::new("f");
    let pattern = f.from_args(vec![Expression::sequence_variable("x")]).unwrap();
    let empty = f.from_args(Vec::new()).unwrap();
    assert!(all_matches(&empty, &pattern).is_empty());

    let one = f.from_args(vec![Expression::symbol("a")]).unwrap();
    assert_eq!(all_matches(&one, &pattern), vec!["{x -> (a)}"]);
  }

  #[test]
  fn commutative_ground_operand_lookup() {
    let plus = Operator::commutative("Plus");
    let pattern = plus
      .from_args(vec![Expression::symbol("a"), Expression::variable("x")])
      .unwrap();
    // Subject operand order is irrelevant: both normalize to Plus[a, b].
    let subject = plus
      .from_args(vec![Expression::symbol("b"), Expression::symbol("a")])
      .unwrap();

    assert_eq!(all_matches(&subject, &pattern), vec!["{x -> b}"]);
  }

  #[test]
  fn commutative_variables_permute() {
    let plus = Operator::commutative("Plus");
    let pattern = plus
      .from_args(vec![Expression::variable("x"), Expression::variable("y")])
      .unwrap();
    let subject = plus
      .from_args(vec![Expression::symbol("a"), Expression::symbol("b")])
      .unwrap();

    assert_eq!(
      all_matches(&subject, &pattern),
      vec!["{x -> a, y -> b}", "{x -> b, y -> a}"]
    );
  }

  #[test]
  fn commutative_non_linear_consistency() {
    let plus = Operator::commutative("Plus");
    let g = Operator::new("g");

    let pattern = plus
      .from_args(vec![
        Expression::variable("x"),
        g.from_args(vec![Expression::variable("x")]).unwrap(),
      ])
      .unwrap();

    let matching = plus
      .from_args(vec![
        Expression::symbol("a"),
        g.from_args(vec![Expression::symbol("a")]).unwrap(),
      ])
      .unwrap();
    assert_eq!(all_matches(&matching, &pattern), vec!["{x -> a}"]);

    let mismatching = plus
      .from_args(vec![
        Expression::symbol("a"),
        g.from_args(vec![Expression::symbol("b")]).unwrap(),
      ])
      .unwrap();
    assert!(all_matches(&mismatching, &pattern).is_empty());
  }

  #[test]
  fn commutative_subpattern_with_rest() {
    let plus = Operator::commutative("Plus");
    let g = Operator::new("g");

    let pattern = plus
      .from_args(vec![
        g.from_args(vec![Expression::variable("x")]).unwrap(),
        Expression::null_sequence_variable("y"),
      ])
      .unwrap();
    let subject = plus
      .from_args(vec![
        g.from_args(vec![Expression::symbol("a")]).unwrap(),
        Expression::symbol("b"),
        Expression::symbol("c"),
      ])
      .unwrap();

    assert_eq!(all_matches(&subject, &pattern), vec!["{x -> a, y -> {b, c}}"]);
  }

  /// The repeated sequence variable forces its two occurrences to capture the same
  /// multiset, so the subject splits the same four ways as the bare partitioner.
  #[test]
  fn commutative_repeated_sequence_variable() {
    let plus = Operator::commutative("Plus");
    let pattern = plus
      .from_args(vec![
        Expression::sequence_variable("x"),
        Expression::null_sequence_variable("y"),
        Expression::null_sequence_variable("y"),
      ])
      .unwrap();
    let subject = plus
      .from_args(
        ["a", "a", "a", "b", "b", "c"].iter().map(|&name| Expression::symbol(name)).collect(),
      )
      .unwrap();

    assert_eq!(
      all_matches(&subject, &pattern),
      vec![
        "{x -> {a, a, a, b, b, c}, y -> {}}",
        "{x -> {a, a, a, c}, y -> {b}}",
        "{x -> {a, b, b, c}, y -> {a}}",
        "{x -> {a, c}, y -> {a, b}}",
      ]
    );
  }

  #[test]
  fn commutative_leftovers_without_sequence_variables_fail() {
    let plus = Operator::commutative("Plus");
    let pattern = plus.from_args(vec![Expression::variable("x")]).unwrap();
    let subject = plus
      .from_args(vec![Expression::symbol("a"), Expression::symbol("b")])
      .unwrap();
    assert!(all_matches(&subject, &pattern).is_empty());
  }

  #[test]
  fn anonymous_sequence_variable_absorbs_rest() {
    let plus = Operator::commutative("Plus");
    let pattern = plus
      .from_args(vec![
        Expression::variable("x"),
        Expression::anonymous_sequence_variable(0),
      ])
      .unwrap();
    let subject = plus
      .from_args(vec![Expression::symbol("a"), Expression::symbol("b")])
      .unwrap();

    assert_eq!(all_matches(&subject, &pattern), vec!["{x -> a}", "{x -> b}"]);
  }
}

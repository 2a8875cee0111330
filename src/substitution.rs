/*!

Substitutions map variable names to bindings. A binding is a single expression (for
ordinary variables), an expression sequence (for sequence variables), or an unresolved
multiset (a commutative partition fragment that was never given an order). Applying a
substitution splices sequence bindings into the surrounding operand list and rebuilds an
operation only when one of its operands actually changed.

*/

use std::{collections::hash_map::Entry, fmt};

use fnv::FnvHashMap;

use crate::{
  error::Error,
  expression::Expression,
  interner::{resolve_str, InternedString},
  logging::{log, Channel},
  multiset::Multiset,
  normal_form::NormalFormOrder,
};

/// What a variable is bound to. Ordinary variables carry `Single`; sequence variables
/// carry `Sequence`, possibly empty; commutative matching may bind `Multiset` when no
/// order of the captured operands was ever chosen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
  Single(Expression),
  Sequence(Vec<Expression>),
  Multiset(Multiset<Expression>),
}

impl Binding {
  /// The bound expressions as an ordered list, unifying all binding shapes for
  /// splicing. A multiset binding is ordered into normal form.
  pub fn to_expressions(&self) -> Vec<Expression> {
    match self {
      Binding::Single(expression) => vec![expression.clone()],
      Binding::Sequence(expressions) => expressions.clone(),
      Binding::Multiset(multiset) => {
        let mut expressions = multiset.expanded();
        expressions.sort_by(|left, right| NormalFormOrder::cmp(left, right));
        expressions
      }
    }
  }
}

impl fmt::Display for Binding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Binding::Single(expression) => write!(f, "{}", expression),
      Binding::Sequence(expressions) => {
        write!(
          f,
          "({})",
          expressions.iter().map(Expression::to_string).collect::<Vec<_>>().join(", ")
        )
      }
      Binding::Multiset(_) => {
        write!(
          f,
          "{{{}}}",
          self.to_expressions().iter().map(Expression::to_string).collect::<Vec<_>>().join(", ")
        )
      }
    }
  }
}

/// A finite map from variable names to bindings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
  bindings: FnvHashMap<InternedString, Binding>,
}

impl Substitution {
  pub fn new() -> Substitution {
    Substitution::default()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }

  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  pub fn get(&self, name: &InternedString) -> Option<&Binding> {
    self.bindings.get(name)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&InternedString, &Binding)> {
    self.bindings.iter()
  }

  /// Records `name -> binding`, refusing an inconsistent rebinding. A variable already
  /// bound to a different value fails the whole match attempt, which is what makes
  /// non-linear patterns like `f[x_, x_]` work.
  ///
  /// An unresolved multiset binding is compatible with an ordered sequence of the same
  /// elements; when the ordered occurrence arrives it resolves the binding, which from
  /// then on compares as a sequence.
  pub fn try_bind(&mut self, name: InternedString, binding: Binding) -> bool {
    match self.bindings.entry(name) {
      Entry::Vacant(slot) => {
        slot.insert(binding);
        true
      }
      Entry::Occupied(mut slot) => match (slot.get(), &binding) {
        (Binding::Multiset(have), Binding::Sequence(new)) => {
          let candidate: Multiset<Expression> = new.iter().cloned().collect();
          if *have == candidate {
            slot.insert(binding);
            true
          } else {
            false
          }
        }
        (Binding::Sequence(have), Binding::Multiset(new)) => {
          let have_as_multiset: Multiset<Expression> = have.iter().cloned().collect();
          have_as_multiset == *new
        }
        (have, new) => have == new,
      },
    }
  }

  /// Inserts without a consistency check. Used when building substitutions from parts
  /// already known to be disjoint.
  pub fn bind(&mut self, name: InternedString, binding: Binding) {
    self.bindings.insert(name, binding);
  }

  /// Merges `other` into `self`, failing on any conflicting binding.
  pub fn try_merge(&mut self, other: &Substitution) -> bool {
    for (name, binding) in other.bindings.iter() {
      if !self.try_bind(*name, binding.clone()) {
        return false;
      }
    }
    true
  }
}

impl fmt::Display for Substitution {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut entries: Vec<String> = self
      .bindings
      .iter()
      .map(|(name, binding)| format!("{} -> {}", resolve_str(*name), binding))
      .collect();
    entries.sort();
    write!(f, "{{{}}}", entries.join(", "))
  }
}

/// Applies `substitution` to `expression`, splicing sequence bindings in place. The
/// flag reports whether any variable was actually substituted.
///
/// An ordinary variable bound to a sequence of length one collapses to that single
/// expression. A variable with no binding is left in place. When nothing changed the
/// returned tree is the input tree, and untouched subtrees are always shared.
pub fn substitute(
  expression: &Expression,
  substitution: &Substitution,
) -> Result<(Expression, bool), Error> {
  match substitute_spliced(expression, substitution)? {
    (Spliced::One(result), changed) => Ok((result, changed)),
    (Spliced::Many(mut results), _) if results.len() == 1 => {
      Ok((results.pop().unwrap(), true))
    }
    (Spliced::Many(_), _) => {
      // A bare sequence variable at the root has no surrounding operand list to splice
      // into.
      log(
        Channel::Rewrite,
        4,
        &format!("sequence binding surfaced at the root of {}", expression),
      );
      Err(Error::SequenceAtRoot)
    }
  }
}

/// A substitution result before splicing: most nodes map to one expression, but a
/// sequence variable maps to zero or more.
pub(crate) enum Spliced {
  One(Expression),
  Many(Vec<Expression>),
}

pub(crate) fn substitute_spliced(
  expression: &Expression,
  substitution: &Substitution,
) -> Result<(Spliced, bool), Error> {
  match expression {
    Expression::Symbol(_) => Ok((Spliced::One(expression.clone()), false)),

    Expression::Variable(name) => {
      match substitution.get(name) {
        Some(Binding::Single(bound)) => Ok((Spliced::One(bound.clone()), true)),
        Some(binding) => {
          let mut bound = binding.to_expressions();
          // A single-expression sequence collapses when an ordinary variable receives
          // it.
          if bound.len() == 1 {
            Ok((Spliced::One(bound.pop().unwrap()), true))
          } else {
            Ok((Spliced::Many(bound), true))
          }
        }
        None => Ok((Spliced::One(expression.clone()), false)),
      }
    }

    Expression::SequenceVariable { name, .. } => {
      let bound = name.as_ref().and_then(|name| substitution.get(name));
      match bound {
        Some(binding) => Ok((Spliced::Many(binding.to_expressions()), true)),
        None => Ok((Spliced::One(expression.clone()), false)),
      }
    }

    Expression::Operation(operation) => {
      let mut new_operands: Vec<Expression> = Vec::with_capacity(operation.operands.len());
      let mut changed = false;
      for operand in operation.operands.iter() {
        let (result, operand_changed) = substitute_spliced(operand, substitution)?;
        changed = changed || operand_changed;
        match result {
          Spliced::One(result) => new_operands.push(result),
          Spliced::Many(results) => new_operands.extend(results),
        }
      }
      if changed {
        operation
          .operator
          .from_args(new_operands)
          .map(|rebuilt| (Spliced::One(rebuilt), true))
      } else {
        Ok((Spliced::One(expression.clone()), false))
      }
    }
  }
}

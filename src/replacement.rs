/*!

The rewriting layer: positional replacement, replacement rules, and the exhaustive
`replace_all` driver.

A rule's right-hand side is a function of the whole matched substitution. The common
case, a template expression instantiated through `substitute`, is one such function;
`ReplacementRule::computed` admits arbitrary ones, which is how rules whose replacement
must be calculated rather than spelled out (numeric simplification, say) are written. A
replacement that comes out as a sequence is spliced into the parent operand list at the
matched position.

`replace_all` groups consecutive rules by pattern head so that a subexpression is only
tried against rules that could match it. Each successful rewrite restarts the preorder
scan from the root, because a replacement can enable matches anywhere in the tree,
including above the rewritten position. The driver terminates when a full scan finds no
applicable rule; a rule set whose right-hand sides keep producing matchable expressions
will loop, and detecting that is the caller's concern.

*/

use std::fmt;

use crate::{
  error::Error,
  expression::Expression,
  interner::InternedString,
  logging::{log, Channel},
  matching::first_match_with_cache,
  solve::DiophantineCache,
  substitution::{substitute_spliced, Spliced, Substitution},
};

/// What goes into a replaced position: one expression, or a sequence to splice into the
/// parent operand list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Replacement {
  One(Expression),
  Spliced(Vec<Expression>),
}

impl From<Expression> for Replacement {
  fn from(expression: Expression) -> Replacement {
    Replacement::One(expression)
  }
}

impl fmt::Display for Replacement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Replacement::One(expression) => write!(f, "{}", expression),
      Replacement::Spliced(expressions) => {
        write!(
          f,
          "({})",
          expressions.iter().map(Expression::to_string).collect::<Vec<_>>().join(", ")
        )
      }
    }
  }
}

/// Returns a copy of `expression` with the subexpression at `position` replaced.
///
/// The empty position denotes the root; a spliced replacement there must have exactly
/// one element, since there is no parent operand list. Every operation along the path is
/// rebuilt through its operator, so a commutative parent re-sorts its operands around
/// the replacement. Subtrees off the path are shared with the input.
pub fn replace(
  expression: &Expression,
  position: &[usize],
  replacement: Replacement,
) -> Result<Expression, Error> {
  let Some((&index, rest)) = position.split_first() else {
    return match replacement {
      Replacement::One(replacement) => Ok(replacement),
      Replacement::Spliced(mut replacements) if replacements.len() == 1 => {
        Ok(replacements.pop().unwrap())
      }
      Replacement::Spliced(_) => Err(Error::SequenceAtRoot),
    };
  };

  let Expression::Operation(operation) = expression else {
    return Err(Error::InvalidPosition {
      position: position.to_vec(),
      expression: expression.to_string(),
    });
  };
  if index >= operation.operands.len() {
    return Err(Error::InvalidPosition {
      position: position.to_vec(),
      expression: expression.to_string(),
    });
  }

  let operands = if rest.is_empty() {
    match replacement {
      Replacement::One(replacement) => {
        let mut operands = operation.operands.clone();
        operands[index] = replacement;
        operands
      }
      Replacement::Spliced(replacements) => {
        let mut operands =
          Vec::with_capacity(operation.operands.len() + replacements.len() - 1);
        operands.extend_from_slice(&operation.operands[..index]);
        operands.extend(replacements);
        operands.extend_from_slice(&operation.operands[index + 1..]);
        operands
      }
    }
  } else {
    let mut operands = operation.operands.clone();
    operands[index] = replace(&operands[index], rest, replacement)?;
    operands
  };
  operation.operator.from_args(operands)
}

/// Produces a rule's replacement from the matched substitution.
pub type ReplacementCallable = Box<dyn Fn(&Substitution) -> Result<Replacement, Error>>;

/// A rewrite rule: wherever `pattern` matches, the matched subexpression becomes the
/// replacement the callable produces from the matching substitution.
pub struct ReplacementRule {
  pub pattern: Expression,
  pub replacement: ReplacementCallable,
}

impl ReplacementRule {
  /// A rule whose replacement is `template` instantiated with the matched substitution.
  /// A template whose root is a bound sequence variable yields a spliced replacement.
  pub fn new(pattern: Expression, template: Expression) -> ReplacementRule {
    ReplacementRule {
      pattern,
      replacement: Box::new(move |substitution: &Substitution| {
        match substitute_spliced(&template, substitution)? {
          (Spliced::One(result), _) => Ok(Replacement::One(result)),
          (Spliced::Many(results), _) => Ok(Replacement::Spliced(results)),
        }
      }),
    }
  }

  /// A rule whose replacement is computed by an arbitrary function of the substitution.
  pub fn computed(
    pattern: Expression,
    replacement: impl Fn(&Substitution) -> Result<Replacement, Error> + 'static,
  ) -> ReplacementRule {
    ReplacementRule {
      pattern,
      replacement: Box::new(replacement),
    }
  }
}

impl fmt::Debug for ReplacementRule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ReplacementRule").field("pattern", &self.pattern).finish_non_exhaustive()
  }
}

/// Rewrites `expression` with `rules` until no rule matches any subexpression.
///
/// Rules are grouped by consecutive runs of equal pattern head, preserving order; a
/// group with head `None` (a bare variable pattern) is tried against every
/// subexpression. Groups are tried in order, each scanning the whole tree in preorder;
/// the first rule that matches at the first eligible position wins, only its first
/// match is used, and after the rewrite the search starts over from the first group.
pub fn replace_all(
  expression: &Expression,
  rules: &[ReplacementRule],
) -> Result<Expression, Error> {
  if rules.is_empty() {
    return Err(Error::EmptyRuleList);
  }

  let groups = group_rules_by_head(rules);
  let mut cache = DiophantineCache::new();
  let mut current = expression.clone();

  'rescan: loop {
    for (group_head, group) in groups.iter() {
      for (subexpression, position) in current.preorder_iter() {
        if group_head.is_some() && *group_head != subexpression.head() {
          continue;
        }
        for rule in group.iter() {
          if let Some(substitution) =
            first_match_with_cache(&subexpression, &rule.pattern, &mut cache)?
          {
            let replacement = (rule.replacement)(&substitution)?;
            log(
              Channel::Rewrite,
              3,
              &format!(
                "{} -> {} at {:?} by pattern {}",
                subexpression, replacement, position, rule.pattern
              ),
            );
            current = replace(&current, &position, replacement)?;
            // Start over from the first group against the modified tree.
            continue 'rescan;
          }
        }
      }
    }
    return Ok(current);
  }
}

/// Groups consecutive rules sharing a pattern head. Non-adjacent rules with the same
/// head land in distinct groups, preserving the caller's rule order exactly.
fn group_rules_by_head(
  rules: &[ReplacementRule],
) -> Vec<(Option<InternedString>, Vec<&ReplacementRule>)> {
  let mut groups: Vec<(Option<InternedString>, Vec<&ReplacementRule>)> = Vec::new();
  for rule in rules {
    let head = rule.pattern.head();
    match groups.last_mut() {
      Some((group_head, group)) if *group_head == head => group.push(rule),
      _ => groups.push((head, vec![rule])),
    }
  }
  groups
}

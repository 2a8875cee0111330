/*!

Immutable expression tree node types.

An expression is a symbol, a variable, a sequence variable, or an n-ary operation. Trees
are persistent: operations hold their operand list behind an `Rc`, so cloning a node is
cheap and rewriting shares every untouched subtree with the original.

Operations are constructed through `Operator::from_args`, which owns validation
(arity) and normalization (commutative operand lists are sorted into C-normal form).

*/

use std::{
  cmp::Ordering,
  fmt,
  rc::Rc
};

use crate::{
  attributes::{Attribute, Attributes},
  error::Error,
  interner::{interned, resolve_str, InternedString},
  normal_form::NormalFormOrder
};

/// The identity of an operator: a name, its declared attributes, and an optional fixed
/// arity. `None` arity means variadic.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Operator {
  pub name: InternedString,
  pub attributes: Attributes,
  pub arity: Option<usize>,
}

impl Operator {
  pub fn new(name: &str) -> Operator {
    Operator {
      name: interned(name),
      attributes: Attributes::from(Attribute::Variadic),
      arity: None,
    }
  }

  pub fn commutative(name: &str) -> Operator {
    Operator {
      name: interned(name),
      attributes: Attributes::from(Attribute::Commutative) + Attribute::Variadic,
      arity: None,
    }
  }

  pub fn with_arity(name: &str, arity: usize) -> Operator {
    Operator {
      name: interned(name),
      attributes: Attributes::new(),
      arity: Some(arity),
    }
  }

  /// Constructs an operation from a flat operand list.
  ///
  /// Fails deterministically if the operand list violates the operator's declared
  /// arity. Commutative operand lists are sorted into C-normal form so that syntactic
  /// equality coincides with operand-multiset equality.
  pub fn from_args(&self, mut operands: Vec<Expression>) -> Result<Expression, Error> {
    if let Some(expected) = self.arity {
      if operands.len() != expected {
        return Err(Error::InvalidOperands {
          operator: resolve_str(self.name),
          expected,
          actual: operands.len(),
        });
      }
    }
    if self.attributes.commutative() {
      operands.sort_by(|left, right| NormalFormOrder::cmp(left, right));
    }
    Ok(Expression::Operation(Rc::new(Operation {
      operator: self.clone(),
      operands,
    })))
  }
}

/// An operator applied to an ordered operand list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Operation {
  pub operator: Operator,
  pub operands: Vec<Expression>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expression {
  Symbol(InternedString),
  /// A pattern variable binding exactly one expression.
  Variable(InternedString),
  /// A pattern variable binding zero or more expressions. An anonymous sequence
  /// variable (`name == None`) matches without recording a binding. `minimum` is the
  /// least number of expressions the variable must capture.
  SequenceVariable {
    name: Option<InternedString>,
    minimum: usize,
  },
  Operation(Rc<Operation>),
}

impl Expression {
  pub fn symbol(name: &str) -> Expression {
    Expression::Symbol(interned(name))
  }

  pub fn variable(name: &str) -> Expression {
    Expression::Variable(interned(name))
  }

  /// A sequence variable matching one or more expressions (`x__`).
  pub fn sequence_variable(name: &str) -> Expression {
    Expression::SequenceVariable {
      name: Some(interned(name)),
      minimum: 1,
    }
  }

  /// A sequence variable matching zero or more expressions (`x___`).
  pub fn null_sequence_variable(name: &str) -> Expression {
    Expression::SequenceVariable {
      name: Some(interned(name)),
      minimum: 0,
    }
  }

  /// An anonymous sequence variable whose binding is discarded.
  pub fn anonymous_sequence_variable(minimum: usize) -> Expression {
    Expression::SequenceVariable {
      name: None,
      minimum,
    }
  }

  /// The head identity used for rule grouping and preorder filtering. Variables have no
  /// head; a rule whose pattern is a variable matches every node.
  pub fn head(&self) -> Option<InternedString> {
    match self {
      Expression::Symbol(name) => Some(*name),
      Expression::Operation(operation) => Some(operation.operator.name),
      _ => None,
    }
  }

  /// True if no variable of any kind occurs in the tree.
  pub fn is_ground(&self) -> bool {
    match self {
      Expression::Symbol(_) => true,
      Expression::Variable(_)
      | Expression::SequenceVariable { .. } => false,
      Expression::Operation(operation) => operation.operands.iter().all(Expression::is_ground),
    }
  }

  /// Yields `(subexpression, position)` pairs in preorder. The empty position is the
  /// expression itself, `[0]` its first operand, and so on.
  pub fn preorder_iter(&self) -> PreorderIterator {
    PreorderIterator {
      stack: vec![(self.clone(), Vec::new())],
    }
  }
}

/// Preorder traversal over an expression tree, driven by an explicit work stack. The
/// iterator owns (cheap) clones of the nodes it will visit, so the tree it was started
/// from may be replaced while iteration results are still in hand.
pub struct PreorderIterator {
  stack: Vec<(Expression, Vec<usize>)>,
}

impl Iterator for PreorderIterator {
  type Item = (Expression, Vec<usize>);

  fn next(&mut self) -> Option<Self::Item> {
    let (expression, position) = self.stack.pop()?;
    if let Expression::Operation(operation) = &expression {
      for (index, operand) in operation.operands.iter().enumerate().rev() {
        let mut child_position = position.clone();
        child_position.push(index);
        self.stack.push((operand.clone(), child_position));
      }
    }
    Some((expression, position))
  }
}

/**
A total order on expressions, used for C-normal form. Variants are ranked
Symbol < Variable < SequenceVariable < Operation; within a variant the comparison is on
resolved names, then structure.
*/
impl NormalFormOrder for Expression {
  fn cmp(&self, other: &Self) -> Ordering {
    match (self, other) {
      (Expression::Symbol(s), Expression::Symbol(t)) => resolve_str(*s).cmp(&resolve_str(*t)),

      (Expression::Variable(s), Expression::Variable(t)) => resolve_str(*s).cmp(&resolve_str(*t)),

      (
        Expression::SequenceVariable { name: s, minimum: m },
        Expression::SequenceVariable { name: t, minimum: n },
      ) => {
        let s_name = s.as_ref().map(|name| resolve_str(*name));
        let t_name = t.as_ref().map(|name| resolve_str(*name));
        s_name.cmp(&t_name).then(m.cmp(n))
      }

      (Expression::Operation(f), Expression::Operation(g)) => {
        let head_ordering = resolve_str(f.operator.name).cmp(&resolve_str(g.operator.name));
        if head_ordering != Ordering::Equal {
          return head_ordering;
        }
        // Operations with the same head are compared via lexicographic comparison of
        // their operands, shorter lists first on ties.
        for (left, right) in f.operands.iter().zip(g.operands.iter()) {
          let ordering = NormalFormOrder::cmp(left, right);
          if ordering != Ordering::Equal {
            return ordering;
          }
        }
        f.operands.len().cmp(&g.operands.len())
      }

      (thing_one, thing_two) => variant_rank(thing_one).cmp(&variant_rank(thing_two)),
    }
  }
}

fn variant_rank(expression: &Expression) -> u32 {
  match expression {
    Expression::Symbol(_) => 0,
    Expression::Variable(_) => 1,
    Expression::SequenceVariable { .. } => 2,
    Expression::Operation(_) => 3,
  }
}

impl fmt::Display for Expression {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Expression::Symbol(name) => write!(f, "{}", resolve_str(*name)),

      Expression::Variable(name) => write!(f, "{}_", resolve_str(*name)),

      Expression::SequenceVariable { name, minimum } => {
        let underscores = if *minimum == 0 { "___" } else { "__" };
        match name {
          Some(name) => write!(f, "{}{}", resolve_str(*name), underscores),
          None => write!(f, "{}", underscores),
        }
      }

      Expression::Operation(operation) => {
        write!(
          f,
          "{}[{}]",
          resolve_str(operation.operator.name),
          operation
            .operands
            .iter()
            .map(Expression::to_string)
            .collect::<Vec<_>>()
            .join(", ")
        )
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_args_checks_arity() {
    let pair = Operator::with_arity("Pair", 2);
    assert!(pair.from_args(vec![Expression::symbol("a"), Expression::symbol("b")]).is_ok());

    let result = pair.from_args(vec![Expression::symbol("a")]);
    assert_eq!(
      result,
      Err(Error::InvalidOperands {
        operator: "Pair".to_string(),
        expected: 2,
        actual: 1
      })
    );
  }

  #[test]
  fn commutative_construction_normalizes() {
    let plus = Operator::commutative("Plus");
    let left = plus
      .from_args(vec![Expression::symbol("c"), Expression::symbol("a"), Expression::symbol("b")])
      .unwrap();
    let right = plus
      .from_args(vec![Expression::symbol("b"), Expression::symbol("c"), Expression::symbol("a")])
      .unwrap();

    assert_eq!(left, right);
    assert_eq!(left.to_string(), "Plus[a, b, c]");
  }

  #[test]
  fn non_commutative_construction_preserves_order() {
    let f = Operator::new("f");
    let expression = f
      .from_args(vec![Expression::symbol("c"), Expression::symbol("a")])
      .unwrap();
    assert_eq!(expression.to_string(), "f[c, a]");
  }

  #[test]
  fn heads() {
    let f = Operator::new("f");
    let expression = f.from_args(vec![Expression::symbol("a")]).unwrap();

    assert_eq!(expression.head(), Some(interned("f")));
    assert_eq!(Expression::symbol("a").head(), Some(interned("a")));
    assert_eq!(Expression::variable("x").head(), None);
  }

  #[test]
  fn ground_expressions() {
    let f = Operator::new("f");
    let ground = f.from_args(vec![Expression::symbol("a")]).unwrap();
    let open = f.from_args(vec![Expression::variable("x")]).unwrap();

    assert!(ground.is_ground());
    assert!(!open.is_ground());
    assert!(!Expression::sequence_variable("x").is_ground());
  }

  #[test]
  fn preorder_positions() {
    let f = Operator::new("f");
    let g = Operator::new("g");
    let inner = g.from_args(vec![Expression::symbol("a"), Expression::symbol("b")]).unwrap();
    let tree = f.from_args(vec![inner, Expression::symbol("c")]).unwrap();

    let visited: Vec<(String, Vec<usize>)> = tree
      .preorder_iter()
      .map(|(expression, position)| (expression.to_string(), position))
      .collect();

    assert_eq!(
      visited,
      vec![
        ("f[g[a, b], c]".to_string(), vec![]),
        ("g[a, b]".to_string(), vec![0]),
        ("a".to_string(), vec![0, 0]),
        ("b".to_string(), vec![0, 1]),
        ("c".to_string(), vec![1]),
      ]
    );
  }
}

/*!

The crate-level error taxonomy.

Absence of a match or of a solution is never an error: enumerators that cannot satisfy a
constraint simply yield nothing further. Errors are reserved for misuse of an operation,
and every error is raised at the call that detects it.

*/

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
  /// `base_solution_linear` requires positive coefficients.
  #[error("coefficient {coefficient} is not a positive integer")]
  NonPositiveCoefficient {
    coefficient: i64
  },

  /// A `replace` position that indexes into a non-operation, or past the end of an
  /// operand list.
  #[error("invalid position {position:?} for expression {expression}")]
  InvalidPosition {
    position: Vec<usize>,
    expression: String
  },

  /// An operand list that violates the operator's declared arity.
  #[error("operator {operator} expects {expected} operands, got {actual}")]
  InvalidOperands {
    operator: String,
    expected: usize,
    actual: usize
  },

  /// `replace_all` has no defined head grouping for an empty rule sequence.
  #[error("cannot group an empty rule sequence by pattern head")]
  EmptyRuleList,

  /// Substitution produced a multi-expression sequence with no surrounding operand
  /// list to splice it into.
  #[error("a sequence binding surfaced at the root of the expression")]
  SequenceAtRoot,
}

/*

# Normalization

Commutative matching requires a canonical operand order: a strict total order on symbols
is extended to terms and term sequences so that the obtained ordering is also total. A
commutative normal form (C-normal form) of a term is obtained by rearranging the operands
of commutative operators to obtain the minimal term with respect to the defined ordering.

Normal form makes syntactic equality meaningful for commutative operators: two
commutative operations with the same operand multiset compare equal after construction
through `Operator::from_args`. The ordering is arbitrary but fixed; think of it as an
extension of lexicographic ordering.

*/

use std::cmp::Ordering;

/// A total order on all symbols, variables, and terms.
///
/// The total ordering does not use Rust's in-built `Ord` trait, because implementors may
/// have a different ordering that is natural for the type, and normalization does not
/// require Rust's ordering machinery.
pub trait NormalFormOrder {
  fn cmp(&self, other: &Self) -> Ordering;

  fn is_equal(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }

  fn is_greater(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Greater
  }

  fn is_less(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Less
  }
}

/*!

A term rewriting core built around multiset matching.

Expressions are persistent trees of symbols, variables, sequence variables, and n-ary
operations. Commutative operations are kept in a sorted normal form and matched as
multisets; the matcher reduces a commutative match to distributing a multiset among the
pattern's sequence variables, which in turn reduces to enumerating non-negative solutions
of linear Diophantine equations. The rewriting layer applies replacement rules
exhaustively over a subject tree.

The combinatorial machinery (the Diophantine solver, the integer vector enumerators, the
generator chain, and the partitioner) is exposed directly and is usable independently of
the expression types.

*/

mod attributes;
mod enumerators;
mod error;
mod expression;
mod generators;
mod interner;
mod logging;
mod matching;
mod multiset;
mod normal_form;
mod partitions;
mod replacement;
mod solve;
mod substitution;

pub use crate::{
  attributes::{Attribute, Attributes},
  enumerators::{
    fixed_integer_vector_iter,
    integer_partition_vector_iter,
    FixedIntegerVectors,
    IntegerPartitionVectors,
    IntegerVector,
  },
  error::Error,
  expression::{Expression, Operation, Operator, PreorderIterator},
  generators::{generator_chain, GeneratorChain, GeneratorFactory},
  interner::{get_interned, interned, interned_static, resolve_str, InternedString},
  logging::{log, set_verbosity, verbosity, Channel},
  matching::match_expression,
  multiset::Multiset,
  normal_form::NormalFormOrder,
  partitions::{
    commutative_sequence_variable_partition_iter,
    PartitionFragment,
    VariableWithCount,
  },
  replacement::{replace, replace_all, Replacement, ReplacementCallable, ReplacementRule},
  solve::{
    base_solution_linear,
    extended_euclid,
    solve_linear_diop,
    BaseSolutions,
    DiophantineCache,
    Solution,
  },
  substitution::{substitute, Binding, Substitution},
};

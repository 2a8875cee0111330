/*!

A solver for linear Diophantine equations with non-negative solutions, used by the
commutative partitioner to distribute a value's multiplicity across the sequence
variables that have to absorb it.

`base_solution_linear` walks the one-parameter family of solutions of `ax + by = c`
starting from a Bézout base solution. `solve_linear_diop` reduces an n-coefficient
equation to the two-coefficient case by splitting off the gcd of the tail, and memoizes
complete solution sets per `(total, coefficients)` key in an injectable
`DiophantineCache`. The cache is deliberately an explicit object rather than process
global state, so its lifetime and thread placement are caller-controlled.

*/

use std::rc::Rc;

use fnv::FnvHashMap;
use num_integer::gcd;
use smallvec::SmallVec;

use crate::error::Error;

/// One non-negative integer solution vector of `Σ cᵢxᵢ = total`.
pub type Solution = SmallVec<[usize; 4]>;

type CacheKey = (i64, SmallVec<[i64; 4]>);

/// Memoized solution sets for `solve_linear_diop`. Entries are complete (fully
/// enumerated) and never evicted; coefficient order is part of the key.
#[derive(Debug, Default)]
pub struct DiophantineCache {
  solutions: FnvHashMap<CacheKey, Rc<Vec<Solution>>>,
}

impl DiophantineCache {
  pub fn new() -> DiophantineCache {
    DiophantineCache {
      solutions: FnvHashMap::default(),
    }
  }

  pub fn len(&self) -> usize {
    self.solutions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.solutions.is_empty()
  }
}

/// Extended Euclidean algorithm computing the Bézout coefficients as well as
/// `gcd(a, b)`: returns `(x, y, d)` with `a*x + b*y = d = gcd(a, b)`. The pair `(x, y)`
/// is the minimal pair produced by the standard recursion.
pub fn extended_euclid(a: i64, b: i64) -> (i64, i64, i64) {
  if b == 0 {
    return (1, 0, a);
  }
  let (x0, y0, d) = extended_euclid(b, a % b);
  (y0, x0 - (a / b) * y0, d)
}

/// Lazily yields every non-negative integer solution `(x, y)` of `ax + by = c`, each
/// exactly once. Fails if either coefficient is not positive.
///
/// The equation is first normalized by `gcd(a, gcd(b, c))`. From a Bézout base solution
/// the walk steps by `(±b, ∓a)` in the direction that keeps both coordinates
/// non-negative, so the solutions come out in a consistent order of monotone `x`.
pub fn base_solution_linear(a: i64, b: i64, c: i64) -> Result<BaseSolutions, Error> {
  if a <= 0 {
    return Err(Error::NonPositiveCoefficient { coefficient: a });
  }
  if b <= 0 {
    return Err(Error::NonPositiveCoefficient { coefficient: b });
  }

  let d = gcd(a, gcd(b, c));
  let a = a / d;
  let b = b / d;
  let c = c / d;

  if c == 0 {
    return Ok(BaseSolutions {
      a,
      b,
      x: 0,
      y: 0,
      state: WalkState::ZeroOnce,
    });
  }

  let (x0, y0, g) = extended_euclid(a, b);
  if c % g != 0 {
    // No solution if the gcd does not divide the constant.
    return Ok(BaseSolutions {
      a,
      b,
      x: 0,
      y: 0,
      state: WalkState::Exhausted,
    });
  }

  let x = c * x0;
  let y = c * y0;
  let state = if x <= 0 {
    WalkState::Ascending
  } else {
    WalkState::Descending
  };

  Ok(BaseSolutions { a, b, x, y, state })
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum WalkState {
  /// The normalized constant was zero; `(0, 0)` is the only solution.
  ZeroOnce,
  /// Walking `x += b, y -= a` until `y` goes negative.
  Ascending,
  /// Walking `x -= b, y += a` until `x` goes negative.
  Descending,
  Exhausted,
}

/// Iterator over the non-negative solutions of a two-coefficient equation. Constructed
/// by `base_solution_linear`.
#[derive(Debug)]
pub struct BaseSolutions {
  a: i64,
  b: i64,
  x: i64,
  y: i64,
  state: WalkState,
}

impl Iterator for BaseSolutions {
  type Item = (usize, usize);

  fn next(&mut self) -> Option<(usize, usize)> {
    loop {
      match self.state {
        WalkState::Exhausted => return None,

        WalkState::ZeroOnce => {
          self.state = WalkState::Exhausted;
          return Some((0, 0));
        }

        WalkState::Ascending => {
          if self.y < 0 {
            self.state = WalkState::Exhausted;
            return None;
          }
          let current = (self.x, self.y);
          self.x += self.b;
          self.y -= self.a;
          if current.0 >= 0 {
            return Some((current.0 as usize, current.1 as usize));
          }
        }

        WalkState::Descending => {
          if self.x < 0 {
            self.state = WalkState::Exhausted;
            return None;
          }
          let current = (self.x, self.y);
          self.x -= self.b;
          self.y += self.a;
          if current.1 >= 0 {
            return Some((current.0 as usize, current.1 as usize));
          }
        }
      }
    }
  }
}

/// Enumerates every non-negative integer solution of
/// `coeffs[0]*x₁ + … + coeffs[n-1]*xₙ = total`.
///
/// With at most two coefficients the solutions come from `base_solution_linear`;
/// otherwise the equation is reduced by solving `coeffs[0]*x + gcd(coeffs[1..])*y =
/// total` and recursing on the scaled-down tail for every `y`. The complete solution
/// set for a key is computed once, stored in `cache`, and shared on repeat calls.
pub fn solve_linear_diop(
  cache: &mut DiophantineCache,
  total: i64,
  coeffs: &[i64],
) -> Result<Rc<Vec<Solution>>, Error> {
  if coeffs.is_empty() {
    let solutions = if total == 0 {
      vec![Solution::new()]
    } else {
      Vec::new()
    };
    return Ok(Rc::new(solutions));
  }

  if coeffs.len() == 1 {
    if coeffs[0] <= 0 {
      return Err(Error::NonPositiveCoefficient { coefficient: coeffs[0] });
    }
    let solutions = if total >= 0 && total % coeffs[0] == 0 {
      vec![Solution::from_slice(&[(total / coeffs[0]) as usize])]
    } else {
      Vec::new()
    };
    return Ok(Rc::new(solutions));
  }

  let cache_key: CacheKey = (total, coeffs.iter().copied().collect());
  if let Some(solutions) = cache.solutions.get(&cache_key) {
    return Ok(solutions.clone());
  }

  let solutions = if coeffs.len() == 2 {
    base_solution_linear(coeffs[0], coeffs[1], total)?
      .map(|(x, y)| Solution::from_slice(&[x, y]))
      .collect::<Vec<Solution>>()
  } else {
    let mut remainder_gcd = gcd(coeffs[1], coeffs[2]);
    for &coeff in &coeffs[3..] {
      remainder_gcd = gcd(remainder_gcd, coeff);
    }

    let scaled_tail: SmallVec<[i64; 4]> = coeffs[1..].iter().map(|&c| c / remainder_gcd).collect();
    let mut solutions = Vec::new();
    for (x, y) in base_solution_linear(coeffs[0], remainder_gcd, total)? {
      let tail_solutions = solve_linear_diop(cache, y as i64, &scaled_tail)?;
      for tail in tail_solutions.iter() {
        let mut solution = Solution::with_capacity(coeffs.len());
        solution.push(x);
        solution.extend(tail.iter().copied());
        solutions.push(solution);
      }
    }
    solutions
  };

  let solutions = Rc::new(solutions);
  cache.solutions.insert(cache_key, solutions.clone());
  Ok(solutions)
}

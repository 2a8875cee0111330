/*!

A general-purpose coordinator for chains of dependent enumerators.

Each factory consumes the datum produced by the previous stage and returns a fresh
enumerator of next-stage data. The chain performs depth-first backtracking over the
stages: advancing forward instantiates the next stage from each produced datum, a stage
that runs dry is discarded and its predecessor pulled again, and after the last stage
surfaces a value the chain resumes from that last stage without resetting anything
earlier.

The coordination is an explicit frame stack inside an `Iterator` impl, not recursive
composition, so a chain of hundreds of stages consumes no call-stack depth. The
commutative partitioner relies on this: it builds one stage per distinct value of the
subject multiset.

*/

/// A stage of a generator chain: given the previous stage's datum, produce an enumerator
/// of this stage's data.
pub type GeneratorFactory<'a, T> = Box<dyn Fn(&T) -> Box<dyn Iterator<Item = T> + 'a> + 'a>;

/// Chains `factories` together, seeding the first with `initial_data` and yielding every
/// datum produced by the final stage. With no factories, yields `initial_data` once.
///
/// ```
/// # use rewritelib::{generator_chain, GeneratorFactory};
/// // For every n in 1..5, count from 1 up to n.
/// let factories: Vec<GeneratorFactory<usize>> = vec![
///   Box::new(|&n| Box::new(1..n)),
///   Box::new(|&i| Box::new(1..i + 1)),
/// ];
/// let flattened: Vec<usize> = generator_chain(5, factories).collect();
/// assert_eq!(flattened, vec![1, 1, 2, 1, 2, 3, 1, 2, 3, 4]);
/// ```
pub fn generator_chain<'a, T: Clone + 'a>(
  initial_data: T,
  factories: Vec<GeneratorFactory<'a, T>>,
) -> GeneratorChain<'a, T> {
  let generators = factories.iter().map(|_| None).collect();
  GeneratorChain {
    factories,
    generators,
    next_data: Some(initial_data),
    index: 0,
    exhausted: false,
  }
}

pub struct GeneratorChain<'a, T> {
  factories: Vec<GeneratorFactory<'a, T>>,
  /// One live enumerator per stage; `None` when the stage is awaiting (re)instantiation.
  generators: Vec<Option<Box<dyn Iterator<Item = T> + 'a>>>,
  /// The datum most recently produced, which seeds the next stage to instantiate.
  next_data: Option<T>,
  index: usize,
  exhausted: bool,
}

impl<'a, T: Clone> Iterator for GeneratorChain<'a, T> {
  type Item = T;

  fn next(&mut self) -> Option<T> {
    if self.exhausted {
      return None;
    }
    if self.factories.is_empty() {
      self.exhausted = true;
      return self.next_data.take();
    }

    loop {
      while self.index < self.factories.len() {
        if self.generators[self.index].is_none() {
          let generator = match self.next_data.as_ref() {
            Some(datum) => (self.factories[self.index])(datum),
            None => {
              self.exhausted = true;
              return None;
            }
          };
          self.generators[self.index] = Some(generator);
        }

        match self.generators[self.index].as_mut().and_then(|generator| generator.next()) {
          Some(datum) => {
            self.next_data = Some(datum);
            self.index += 1;
          }
          None => {
            // This stage is dry; discard it and back up to pull the previous stage.
            self.generators[self.index] = None;
            if self.index == 0 {
              self.exhausted = true;
              return None;
            }
            self.index -= 1;
          }
        }
      }

      // The final stage produced a datum; surface it and resume from the final stage.
      self.index -= 1;
      return self.next_data.clone();
    }
  }
}

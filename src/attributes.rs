/*!

The attributes of an operator, e.g. `Commutative`, `Associative`, ….

Attributes are implemented as a bitfield.

*/

use std::ops::Add;

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

#[derive(Copy, Clone, PartialEq, Eq, Display, IntoStaticStr, Debug, EnumString, EnumIter)]
#[repr(u32)]
pub enum Attribute {
  /// Operand order is semantically irrelevant; matching is multiset-based.
  Commutative = 0,
  Associative,
  /// Can the operator have a variable number of operands.
  Variadic,
}

#[derive(Copy, Clone, Default, PartialEq, Eq, Debug, Hash)]
pub struct Attributes(u32);

impl Attributes {
  pub fn new() -> Attributes {
    Attributes(0)
  }

  pub fn get(&self, attribute: Attribute) -> bool {
    (self.0 & (1 << attribute as u32)) != 0
  }

  pub fn set(&mut self, attribute: Attribute) {
    self.0 |= 1 << attribute as u32;
  }

  pub fn reset(&mut self, attribute: Attribute) {
    self.0 &= !(1 << attribute as u32);
  }

  pub fn commutative(&self) -> bool {
    self.get(Attribute::Commutative)
  }

  pub fn associative(&self) -> bool {
    self.get(Attribute::Associative)
  }

  pub fn variadic(&self) -> bool {
    self.get(Attribute::Variadic)
  }
}

impl From<Attribute> for Attributes {
  fn from(attribute: Attribute) -> Self {
    let mut attributes = Attributes::new();
    attributes.set(attribute);
    attributes
  }
}

impl Add for Attributes {
  type Output = Attributes;

  fn add(self, other: Attributes) -> Attributes {
    Attributes(self.0 | other.0)
  }
}

impl Add<Attribute> for Attributes {
  type Output = Attributes;

  fn add(self, attribute: Attribute) -> Attributes {
    let mut attributes = self;
    attributes.set(attribute);
    attributes
  }
}

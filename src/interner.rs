/*!
A global dictionary of interned strings. Variable and operator names are interned so that
identity comparisons are integer comparisons. Provides an abstraction API for any interner
library.

*/

use std::sync::Mutex;

use lazy_static::lazy_static;
use string_interner::{
  StringInterner,
  symbol::SymbolU32
};

pub type InternedString = SymbolU32;

lazy_static! {
  static ref STRING_INTERNER: Mutex<StringInterner> = Mutex::new(StringInterner::default());
}


pub fn interned(string: &str) -> InternedString {
  STRING_INTERNER.lock().unwrap().get_or_intern(string)
}


pub fn interned_static(string: &'static str) -> InternedString {
  STRING_INTERNER.lock().unwrap().get_or_intern_static(string)
}


pub fn get_interned(string: &str) -> Option<InternedString> {
  STRING_INTERNER.lock().unwrap().get(string)
}

/// Resolves an interned symbol back to its string. Symbols are never evicted, so any
/// symbol produced by `interned` resolves.
pub fn resolve_str(symbol: InternedString) -> String {
  STRING_INTERNER.lock().unwrap().resolve(symbol).unwrap().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trip() {
    let symbol = interned("Plus");
    assert_eq!(symbol, interned("Plus"));
    assert_eq!(resolve_str(symbol), "Plus");
    assert_eq!(get_interned("Plus"), Some(symbol));
    assert!(get_interned("NeverInterned-ZZZ").is_none());
  }
}

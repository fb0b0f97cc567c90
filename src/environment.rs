use std::fmt;

use string_interner::{DefaultBackend, DefaultSymbol, StringInterner, Symbol as _};

/// An interned name. Two symbols are equal iff they were interned from the
/// same name in the same [`Interner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(DefaultSymbol);

impl Symbol {
    pub fn id(self) -> usize {
        self.0.to_usize()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<symbol {}>", self.id())
    }
}

/// The interning capability the reader needs from its surrounding session.
pub trait Interner {
    /// Returns the symbol for `name`, creating it on first use.
    fn intern(&mut self, name: &str) -> Symbol;

    /// Returns the name a symbol was interned from, if it belongs to this table.
    fn resolve(&self, symbol: Symbol) -> Option<&str>;
}

/// Session-scoped symbol table.
///
/// Each interpreter session owns one; symbols from different environments
/// must not be mixed.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    symbols: StringInterner<DefaultBackend>,
}

impl Environment {
    /// Creates a new, empty environment.
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Gets every name interned so far, in interning order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(|(_, name)| name)
    }
}

impl Interner for Environment {
    fn intern(&mut self, name: &str) -> Symbol {
        Symbol(self.symbols.get_or_intern(name))
    }

    fn resolve(&self, symbol: Symbol) -> Option<&str> {
        self.symbols.resolve(symbol.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_same_name_returns_same_symbol() {
        let mut env = Environment::new();
        let first = env.intern("foo");
        let second = env.intern("foo");
        assert_eq!(first, second);
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_intern_different_names() {
        let mut env = Environment::new();
        assert_ne!(env.intern("foo"), env.intern("bar"));
    }

    #[test]
    fn test_resolve_returns_name() {
        let mut env = Environment::new();
        let sym = env.intern("hello");
        assert_eq!(env.resolve(sym), Some("hello"));
    }

    #[test]
    fn test_resolve_only_knows_interned_names() {
        let mut env = Environment::new();
        assert!(env.is_empty());

        let sym = env.intern("quote");
        assert_eq!(env.resolve(sym), Some("quote"));
        assert_eq!(Environment::new().resolve(sym), None);
    }

    #[test]
    fn test_identifiers_in_order() {
        let mut env = Environment::new();
        env.intern("b");
        env.intern("a");
        env.intern("b");
        let names: Vec<&str> = env.identifiers().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_cloned_environment_keeps_ids() {
        let mut env = Environment::new();
        let sym = env.intern("x");
        let mut copy = env.clone();
        assert_eq!(copy.intern("x"), sym);
        assert_eq!(copy.resolve(sym), Some("x"));
    }
}

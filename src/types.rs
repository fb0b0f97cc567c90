use std::fmt;
use std::mem;

use crate::environment::{Interner, Symbol};

/// A symbolic expression: the value every reader routine produces.
///
/// `Clone`, `PartialEq` and `Debug` walk list spines in a loop, so only
/// nesting depth (not list length) costs stack.
#[derive(Default)]
pub enum Sexp {
    /// The empty list, and the terminator of every proper list.
    #[default]
    Null,
    /// End-of-stream sentinel returned by the reader. Never part of a list.
    End,
    Pair(Box<Pair>),
    Symbol(Symbol),
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
    /// `[...]` literal. Distinct from a cons list.
    Array(Vec<Sexp>),
}

/// A cons cell.
pub struct Pair {
    pub head: Sexp,
    pub tail: Sexp,
}

impl Pair {
    pub fn new(head: Sexp, tail: Sexp) -> Self {
        Pair { head, tail }
    }

    /// Borrowing iterator over the heads of the chain starting at this pair.
    pub fn iter(&self) -> ListIter<'_> {
        ListIter {
            pending: Some(&self.head),
            next: &self.tail,
        }
    }
}

// Unlink the spine one cell at a time so long lists don't overflow the stack.
impl Drop for Pair {
    fn drop(&mut self) {
        let mut tail = mem::take(&mut self.tail);
        while let Sexp::Pair(mut pair) = tail {
            tail = mem::take(&mut pair.tail);
        }
    }
}

impl Clone for Pair {
    fn clone(&self) -> Self {
        let mut items = self.tail.iter();
        let heads: Vec<Sexp> = items.by_ref().cloned().collect();
        // `rest` is never a pair, so cloning it doesn't recurse.
        let tail = heads
            .into_iter()
            .rev()
            .fold(items.rest().clone(), |tail, head| Sexp::cons(head, tail));
        Pair::new(self.head.clone(), tail)
    }
}

impl PartialEq for Pair {
    fn eq(&self, other: &Self) -> bool {
        let (mut left, mut right) = (self.iter(), other.iter());
        loop {
            match (left.next(), right.next()) {
                (Some(a), Some(b)) if a == b => {}
                (None, None) => return left.rest() == right.rest(),
                _ => return false,
            }
        }
    }
}

impl fmt::Debug for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pair")?;
        let mut items = self.iter();
        let mut list = f.debug_list();
        list.entries(items.by_ref());
        let rest = items.rest();
        if !rest.is_null() {
            list.entry(&format_args!(". {:?}", rest));
        }
        list.finish()
    }
}

impl Clone for Sexp {
    fn clone(&self) -> Self {
        match self {
            Sexp::Null => Sexp::Null,
            Sexp::End => Sexp::End,
            Sexp::Pair(pair) => Sexp::Pair(pair.clone()),
            Sexp::Symbol(symbol) => Sexp::Symbol(*symbol),
            Sexp::Int(n) => Sexp::Int(*n),
            Sexp::Float(n) => Sexp::Float(*n),
            Sexp::Bool(b) => Sexp::Bool(*b),
            Sexp::Char(c) => Sexp::Char(*c),
            Sexp::Str(s) => Sexp::Str(s.clone()),
            Sexp::Array(items) => Sexp::Array(items.clone()),
        }
    }
}

impl PartialEq for Sexp {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Sexp::Null, Sexp::Null) | (Sexp::End, Sexp::End) => true,
            (Sexp::Pair(a), Sexp::Pair(b)) => a == b,
            (Sexp::Symbol(a), Sexp::Symbol(b)) => a == b,
            (Sexp::Int(a), Sexp::Int(b)) => a == b,
            (Sexp::Float(a), Sexp::Float(b)) => a == b,
            (Sexp::Bool(a), Sexp::Bool(b)) => a == b,
            (Sexp::Char(a), Sexp::Char(b)) => a == b,
            (Sexp::Str(a), Sexp::Str(b)) => a == b,
            (Sexp::Array(a), Sexp::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexp::Null => f.write_str("Null"),
            Sexp::End => f.write_str("End"),
            Sexp::Pair(pair) => fmt::Debug::fmt(pair, f),
            Sexp::Symbol(symbol) => f.debug_tuple("Symbol").field(symbol).finish(),
            Sexp::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Sexp::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Sexp::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Sexp::Char(c) => f.debug_tuple("Char").field(c).finish(),
            Sexp::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Sexp::Array(items) => f.debug_tuple("Array").field(items).finish(),
        }
    }
}

impl Sexp {
    pub fn cons(head: Sexp, tail: Sexp) -> Sexp {
        Sexp::Pair(Box::new(Pair::new(head, tail)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Sexp::Null)
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Sexp::End)
    }

    /// Iterates over list heads. Stops at the first tail that is not a pair;
    /// see [`ListIter::rest`].
    pub fn iter(&self) -> ListIter<'_> {
        ListIter {
            pending: None,
            next: self,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Sexp::Null => "null",
            Sexp::End => "end",
            Sexp::Pair(_) => "pair",
            Sexp::Symbol(_) => "symbol",
            Sexp::Int(_) => "int",
            Sexp::Float(_) => "float",
            Sexp::Bool(_) => "bool",
            Sexp::Char(_) => "char",
            Sexp::Str(_) => "string",
            Sexp::Array(_) => "array",
        }
    }

    /// Renders the expression in reader syntax. Symbols are resolved
    /// through `symbols`.
    pub fn display<'a, I>(&'a self, symbols: &'a I) -> SexpDisplay<'a, I>
    where
        I: Interner + ?Sized,
    {
        SexpDisplay {
            sexp: self,
            symbols,
        }
    }
}

impl From<i64> for Sexp {
    fn from(value: i64) -> Self {
        Sexp::Int(value)
    }
}

impl From<f64> for Sexp {
    fn from(value: f64) -> Self {
        Sexp::Float(value)
    }
}

impl From<bool> for Sexp {
    fn from(value: bool) -> Self {
        Sexp::Bool(value)
    }
}

impl From<char> for Sexp {
    fn from(value: char) -> Self {
        Sexp::Char(value)
    }
}

impl From<&str> for Sexp {
    fn from(value: &str) -> Self {
        Sexp::Str(value.to_string())
    }
}

impl From<Symbol> for Sexp {
    fn from(value: Symbol) -> Self {
        Sexp::Symbol(value)
    }
}

pub struct ListIter<'a> {
    pending: Option<&'a Sexp>,
    next: &'a Sexp,
}

impl<'a> ListIter<'a> {
    /// The part of the chain not yet visited. After the iterator is
    /// exhausted this is `Null` for a proper list, or the improper tail.
    pub fn rest(&self) -> &'a Sexp {
        self.next
    }
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Sexp;

    fn next(&mut self) -> Option<&'a Sexp> {
        if let Some(head) = self.pending.take() {
            return Some(head);
        }
        match self.next {
            Sexp::Pair(pair) => {
                self.next = &pair.tail;
                Some(&pair.head)
            }
            _ => None,
        }
    }
}

pub struct SexpDisplay<'a, I: ?Sized> {
    sexp: &'a Sexp,
    symbols: &'a I,
}

impl<I: Interner + ?Sized> fmt::Display for SexpDisplay<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_sexp(f, self.sexp, self.symbols)
    }
}

fn write_sequence<'a, I>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a Sexp>,
    symbols: &I,
) -> fmt::Result
where
    I: Interner + ?Sized,
{
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write_sexp(f, item, symbols)?;
    }
    Ok(())
}

fn write_sexp<I: Interner + ?Sized>(
    f: &mut fmt::Formatter<'_>,
    sexp: &Sexp,
    symbols: &I,
) -> fmt::Result {
    match sexp {
        Sexp::Null => write!(f, "()"),
        Sexp::End => write!(f, "#<end>"),
        Sexp::Pair(pair) => {
            write!(f, "(")?;
            let mut items = pair.iter();
            write_sequence(f, items.by_ref(), symbols)?;
            if !items.rest().is_null() {
                write!(f, " . ")?;
                write_sexp(f, items.rest(), symbols)?;
            }
            write!(f, ")")
        }
        Sexp::Symbol(symbol) => match symbols.resolve(*symbol) {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", symbol),
        },
        Sexp::Int(n) => write!(f, "{}", n),
        // Debug keeps the fractional part ("1.0") so floats read back as floats.
        Sexp::Float(n) => write!(f, "{:?}", n),
        Sexp::Bool(b) => write!(f, "{}", b),
        Sexp::Char(c) => match c {
            '\n' => write!(f, "#\\newline"),
            ' ' => write!(f, "#\\space"),
            '\t' => write!(f, "#\\tab"),
            '\r' => write!(f, "#\\return"),
            c => write!(f, "#\\{}", c),
        },
        Sexp::Str(s) => write!(
            f,
            "\"{}\"",
            s.chars().fold(String::with_capacity(s.len()), |mut acc, c| {
                match c {
                    '"' => acc.push_str("\\\""),
                    '\\' => acc.push_str("\\\\"),
                    '\n' => acc.push_str("\\n"),
                    '\r' => acc.push_str("\\r"),
                    '\t' => acc.push_str("\\t"),
                    c => acc.push(c),
                }
                acc
            })
        ),
        Sexp::Array(items) => {
            write!(f, "[")?;
            write_sequence(f, items.iter(), symbols)?;
            write!(f, "]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;

    fn list(items: Vec<Sexp>) -> Sexp {
        items
            .into_iter()
            .rev()
            .fold(Sexp::Null, |tail, head| Sexp::cons(head, tail))
    }

    #[test]
    fn test_null_and_end_are_distinct() {
        assert_ne!(Sexp::Null, Sexp::End);
        assert!(Sexp::Null.is_null());
        assert!(!Sexp::End.is_null());
        assert!(Sexp::End.is_end());
        assert_ne!(Sexp::Null, Sexp::Array(vec![]));
        assert_ne!(Sexp::Null, Sexp::Bool(false));
    }

    #[test]
    fn test_iter_proper_list() {
        let l = list(vec![Sexp::Int(1), Sexp::Int(2), Sexp::Int(3)]);
        let mut items = l.iter();
        let heads: Vec<&Sexp> = items.by_ref().collect();
        assert_eq!(heads, vec![&Sexp::Int(1), &Sexp::Int(2), &Sexp::Int(3)]);
        assert!(items.rest().is_null());
    }

    #[test]
    fn test_iter_dotted_list_exposes_tail() {
        let l = Sexp::cons(Sexp::Int(1), Sexp::cons(Sexp::Int(2), Sexp::Int(3)));
        let mut items = l.iter();
        assert_eq!(items.by_ref().count(), 2);
        assert_eq!(items.rest(), &Sexp::Int(3));
    }

    #[test]
    fn test_iter_atom_yields_nothing() {
        let atom = Sexp::Int(7);
        let mut items = atom.iter();
        assert_eq!(items.next(), None);
        assert_eq!(items.rest(), &Sexp::Int(7));
    }

    #[test]
    fn test_pair_iter_starts_at_head() {
        let pair = Pair::new("a".into(), Sexp::cons("b".into(), Sexp::Null));
        let heads: Vec<&Sexp> = pair.iter().collect();
        assert_eq!(heads, vec![&Sexp::from("a"), &Sexp::from("b")]);
    }

    #[test]
    fn test_drop_long_list() {
        let long = (0..200_000).fold(Sexp::Null, |tail, n| Sexp::cons(Sexp::Int(n), tail));
        drop(long);
    }

    #[test]
    fn test_clone_long_list() {
        let long = (0..200_000).fold(Sexp::Null, |tail, n| Sexp::cons(Sexp::Int(n), tail));
        let copy = long.clone();
        assert_eq!(copy, long);
        assert_eq!(copy.iter().count(), 200_000);
    }

    #[test]
    fn test_clone_keeps_dotted_tail() {
        let dotted = Sexp::cons(Sexp::Int(1), Sexp::cons(Sexp::Int(2), Sexp::Int(3)));
        let copy = dotted.clone();
        let mut items = copy.iter();
        assert_eq!(items.by_ref().count(), 2);
        assert_eq!(items.rest(), &Sexp::Int(3));
        assert_eq!(copy, dotted);
    }

    #[test]
    fn test_eq_compares_tails() {
        let proper = Sexp::cons(Sexp::Int(1), Sexp::Null);
        let dotted = Sexp::cons(Sexp::Int(1), Sexp::Int(2));
        assert_ne!(proper, dotted);
        assert_ne!(dotted, Sexp::cons(Sexp::Int(1), Sexp::Int(3)));
        assert_ne!(Sexp::Float(f64::NAN), Sexp::Float(f64::NAN));
    }

    #[test]
    fn test_debug_format() {
        let dotted = Sexp::cons(Sexp::Int(1), Sexp::cons(Sexp::Int(2), Sexp::Int(3)));
        assert_eq!(format!("{:?}", dotted), "Pair[Int(1), Int(2), . Int(3)]");
        let nested = Sexp::cons(Sexp::Array(vec![Sexp::Null]), Sexp::Null);
        assert_eq!(format!("{:?}", nested), "Pair[Array([Null])]");

        let long = (0..200_000).fold(Sexp::Null, |tail, n| Sexp::cons(Sexp::Int(n), tail));
        assert!(format!("{:?}", long).ends_with("Int(199999)]"));
    }

    #[test]
    fn test_display_atoms() {
        let env = Environment::new();
        assert_eq!(Sexp::Null.display(&env).to_string(), "()");
        assert_eq!(Sexp::Int(-42).display(&env).to_string(), "-42");
        assert_eq!(Sexp::Float(1.0).display(&env).to_string(), "1.0");
        assert_eq!(Sexp::Float(0.25).display(&env).to_string(), "0.25");
        assert_eq!(Sexp::Bool(true).display(&env).to_string(), "true");
        assert_eq!(Sexp::Char('a').display(&env).to_string(), "#\\a");
        assert_eq!(Sexp::Char('\n').display(&env).to_string(), "#\\newline");
        assert_eq!(
            Sexp::from("say \"hi\"\n").display(&env).to_string(),
            r#""say \"hi\"\n""#
        );
    }

    #[test]
    fn test_display_symbols() {
        let mut env = Environment::new();
        let foo = env.intern("foo");
        assert_eq!(Sexp::Symbol(foo).display(&env).to_string(), "foo");

        let other = Environment::new();
        assert_eq!(
            Sexp::Symbol(foo).display(&other).to_string(),
            format!("#<symbol {}>", foo.id())
        );
    }

    #[test]
    fn test_display_lists() {
        let env = Environment::new();
        let proper = list(vec![Sexp::Int(1), list(vec![Sexp::Int(2), Sexp::Int(3)]), Sexp::Null]);
        assert_eq!(proper.display(&env).to_string(), "(1 (2 3) ())");

        let dotted = Sexp::cons(Sexp::Int(1), Sexp::cons(Sexp::Int(2), Sexp::Int(3)));
        assert_eq!(dotted.display(&env).to_string(), "(1 2 . 3)");

        let array = Sexp::Array(vec![Sexp::Int(1), Sexp::Array(vec![]), true.into()]);
        assert_eq!(array.display(&env).to_string(), "[1 [] true]");
    }
}

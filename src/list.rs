//! Structural helpers over cons chains.
//!
//! These only look at the spine; they never interpret the elements. The
//! callback given to [`map_list`] is how callers (typically an evaluator)
//! plug in behaviour without this module depending on them.

use thiserror::Error;

use crate::types::{Pair, Sexp};

/// A list operation was given something other than a proper list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("not a list: found {found}")]
pub struct NotAList {
    pub found: &'static str,
}

impl NotAList {
    fn new(found: &Sexp) -> Self {
        NotAList {
            found: found.type_name(),
        }
    }
}

/// True for `Null` and for pair chains that end in `Null`.
pub fn is_list(expr: &Sexp) -> bool {
    let mut items = expr.iter();
    items.by_ref().count();
    items.rest().is_null()
}

/// Collects the heads of a proper list, in order.
pub fn list_to_sequence(expr: &Sexp) -> Result<Vec<Sexp>, NotAList> {
    if !is_list(expr) {
        return Err(NotAList::new(expr));
    }
    Ok(expr.iter().cloned().collect())
}

/// Builds a proper list. An empty sequence gives `Null`.
pub fn make_list<I>(items: I) -> Sexp
where
    I: IntoIterator<Item = Sexp>,
    I::IntoIter: DoubleEndedIterator,
{
    prepend(items, Sexp::Null)
}

// Conses `items` in front of `tail`, last element first.
fn prepend<I>(items: I, tail: Sexp) -> Sexp
where
    I: IntoIterator<Item = Sexp>,
    I::IntoIter: DoubleEndedIterator,
{
    items
        .into_iter()
        .rev()
        .fold(tail, |tail, head| Sexp::cons(head, tail))
}

/// Applies `f` to each element, left to right, and returns the results as a
/// new list.
///
/// The first error from `f` is returned as-is and no later element is
/// visited. Fails with [`NotAList`] when `expr` is neither `Null` nor a pair,
/// or when the chain ends in an improper tail.
pub fn map_list<F, E>(mut f: F, expr: &Sexp) -> Result<Sexp, E>
where
    F: FnMut(&Sexp) -> Result<Sexp, E>,
    E: From<NotAList>,
{
    if !matches!(expr, Sexp::Null | Sexp::Pair(_)) {
        return Err(NotAList::new(expr).into());
    }

    let mut items = expr.iter();
    let mut mapped = Vec::new();
    for item in items.by_ref() {
        mapped.push(f(item)?);
    }
    match items.rest() {
        Sexp::Null => Ok(make_list(mapped)),
        tail => Err(NotAList::new(tail).into()),
    }
}

/// Returns a new chain holding the elements of `a` followed by `b`.
///
/// `a` is left untouched; its heads are cloned into a fresh spine whose final
/// tail is `b` itself.
pub fn concat_list(a: &Pair, b: Sexp) -> Result<Sexp, NotAList> {
    if !is_list(&b) {
        return Err(NotAList::new(&b));
    }

    let mut items = a.iter();
    let heads: Vec<Sexp> = items.by_ref().cloned().collect();
    if !items.rest().is_null() {
        return Err(NotAList::new(items.rest()));
    }
    Ok(prepend(heads, b))
}

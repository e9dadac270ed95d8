use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::{Error, KelpValue};

/// A line/column location in an input stream.  Both start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The source extent of a form, as `(line, column)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: (usize, usize),
    pub end: (usize, usize),
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span {
            start: (start.line, start.column),
            end: (end.line, end.column),
        }
    }
}

/// A mutable two-slot cell.  Lists are chains of pairs whose last `rest` is
/// the empty list.
pub struct Pair {
    first: RefCell<KelpValue>,
    rest: RefCell<KelpValue>,
    span: Cell<Option<Span>>,
}

impl Pair {
    pub fn new(first: KelpValue, rest: KelpValue) -> Self {
        Pair {
            first: RefCell::new(first),
            rest: RefCell::new(rest),
            span: Cell::new(None),
        }
    }

    pub fn first(&self) -> KelpValue {
        self.first.borrow().clone()
    }

    pub fn rest(&self) -> KelpValue {
        self.rest.borrow().clone()
    }

    pub fn set_first(&self, value: KelpValue) {
        *self.first.borrow_mut() = value;
    }

    pub fn set_rest(&self, value: KelpValue) {
        *self.rest.borrow_mut() = value;
    }

    pub fn span(&self) -> Option<Span> {
        self.span.get()
    }

    pub fn set_span(&self, span: Option<Span>) {
        self.span.set(span);
    }
}

// Long lists would otherwise recurse once per element on drop.
impl Drop for Pair {
    fn drop(&mut self) {
        let mut next = self.rest.take();
        while let KelpValue::Pair(pair) = next {
            match Rc::try_unwrap(pair) {
                Ok(pair) => next = pair.rest.take(),
                Err(_) => break,
            }
        }
    }
}

/// Iterates over the elements of a list.  Iteration stops at the first
/// `rest` that is not a pair, so the tail of an improper list is skipped.
pub struct BaseIter {
    next: KelpValue,
}

impl BaseIter {
    pub(crate) fn new(list: KelpValue) -> Self {
        BaseIter { next: list }
    }
}

impl Iterator for BaseIter {
    type Item = KelpValue;

    fn next(&mut self) -> Option<Self::Item> {
        let KelpValue::Pair(pair) = &self.next else {
            return None;
        };
        let first = pair.first();
        let rest = pair.rest();
        self.next = rest;
        Some(first)
    }
}

impl FromIterator<KelpValue> for KelpValue {
    fn from_iter<T: IntoIterator<Item = KelpValue>>(iter: T) -> Self {
        let items: Vec<KelpValue> = iter.into_iter().collect();
        list_with_tail(items, KelpValue::EmptyList)
    }
}

/// Builds a list from `items`, ending in `tail` instead of the empty list.
pub fn list_with_tail(items: Vec<KelpValue>, tail: KelpValue) -> KelpValue {
    items
        .into_iter()
        .rev()
        .fold(tail, |rest, first| KelpValue::cons(first, rest))
}

/// Counts the elements of a proper list.  Improper lists are a type error,
/// cyclic lists an error.
pub fn list_length(list: &KelpValue) -> Result<usize, Error> {
    let mut slow = list.clone();
    let mut fast = list.clone();
    let mut length = 0;
    loop {
        for _ in 0..2 {
            let next = match &fast {
                KelpValue::EmptyList => return Ok(length),
                KelpValue::Pair(pair) => pair.rest(),
                _ => return Err(Error::type_error("list", list)),
            };
            length += 1;
            fast = next;
        }
        slow = slow.cdr()?;
        if fast.eq(&slow) && fast.consp() {
            return Err(Error::lisp_error("circular list"));
        }
    }
}

/// Collects the elements of a proper list.
pub fn list_to_vec(list: &KelpValue) -> Result<Vec<KelpValue>, Error> {
    let length = list_length(list)?;
    let mut items = Vec::with_capacity(length);
    items.extend(list.base_iter());
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KelpContext;

    #[test]
    fn test_list_length() {
        let list: KelpValue = (1..=4).map(KelpValue::from).collect();
        assert_eq!(list_length(&list).unwrap(), 4);
        assert_eq!(list_length(&KelpValue::EmptyList).unwrap(), 0);

        let improper = list_with_tail(vec![1.into(), 2.into()], 3.into());
        assert_eq!(
            list_length(&improper).unwrap_err().to_string(),
            "type-error: expecting list: (1 2 . 3)"
        );
    }

    #[test]
    fn test_circular_list() {
        let mut ctx = KelpContext::new();
        let list = ctx
            .eval_string("(define l (list 1 2 3)) (set-cdr! (cdr (cdr l)) l) l")
            .unwrap();
        assert_eq!(
            list_length(&list).unwrap_err().to_string(),
            "error: circular list"
        );
    }

    #[test]
    fn test_long_list_drop() {
        let list: KelpValue = (0..1_000_000).map(KelpValue::from).collect();
        assert_eq!(list_length(&list).unwrap(), 1_000_000);
        drop(list);
    }
}

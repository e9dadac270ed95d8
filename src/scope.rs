use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::{Error, KelpValue, value::Symbol};

struct Frame {
    bindings: RefCell<HashMap<Symbol, KelpValue>>,
    parent: Option<Scope>,
}

/// A lexical environment: a frame of bindings and an optional parent.
///
/// Scopes are shared.  Every closure created in a scope holds on to it, and
/// bindings added later are visible to all of them.
#[derive(Clone)]
pub struct Scope(Rc<Frame>);

impl Scope {
    /// Creates a scope with no parent.
    pub fn root() -> Self {
        Scope(Rc::new(Frame {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        }))
    }

    /// Creates an empty scope whose lookups fall back to `self`.
    pub fn child(&self) -> Self {
        Scope(Rc::new(Frame {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(self.clone()),
        }))
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.0.parent.as_ref()
    }

    /// The outermost scope of the chain.
    pub fn root_of(&self) -> Scope {
        let mut scope = self;
        while let Some(parent) = scope.parent() {
            scope = parent;
        }
        scope.clone()
    }

    /// Creates or overwrites a binding in this frame.
    pub fn bind(&self, name: Symbol, value: KelpValue) {
        self.0.bindings.borrow_mut().insert(name, value);
    }

    pub fn bind_str(&self, name: &str, value: impl Into<KelpValue>) {
        self.bind(Symbol::new(name), value.into());
    }

    /// Finds the nearest binding for `name`.
    pub fn lookup(&self, name: &Symbol) -> Result<KelpValue, Error> {
        let mut scope = self;
        loop {
            if let Some(value) = scope.0.bindings.borrow().get(name) {
                return Ok(value.clone());
            }
            match scope.parent() {
                Some(parent) => scope = parent,
                None => return Err(Error::lisp_error(format!("unknown variable: {}", name))),
            }
        }
    }

    pub fn lookup_str(&self, name: &str) -> Result<KelpValue, Error> {
        self.lookup(&Symbol::new(name))
    }

    /// Overwrites the nearest existing binding for `name`.
    pub fn mutate(&self, name: &Symbol, value: KelpValue) -> Result<(), Error> {
        let mut scope = self;
        loop {
            if let Some(slot) = scope.0.bindings.borrow_mut().get_mut(name) {
                *slot = value;
                return Ok(());
            }
            match scope.parent() {
                Some(parent) => scope = parent,
                None => return Err(Error::lisp_error(format!("unknown variable: {}", name))),
            }
        }
    }

    pub fn is_bound(&self, name: &Symbol) -> bool {
        let mut scope = self;
        loop {
            if scope.0.bindings.borrow().contains_key(name) {
                return true;
            }
            match scope.parent() {
                Some(parent) => scope = parent,
                None => return false,
            }
        }
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

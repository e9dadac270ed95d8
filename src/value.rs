use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::{
    Error,
    cons::{self, BaseIter, Pair, Span},
    context::Primitive,
    eval::Closure,
    expand::Macro,
    number::Number,
    port::{InputPort, OutputPort},
    printer::{Mode, Printer},
    scope::Scope,
    vector::Vector,
};

/// An interned-by-name identifier.  Two symbols are the same symbol if they
/// have the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Symbol(Rc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

/// A host object exposed to lisp code under a type tag.
pub struct Custom {
    tag: Symbol,
    payload: RefCell<Rc<dyn Any>>,
}

impl Custom {
    pub fn new(tag: Symbol, payload: Rc<dyn Any>) -> Self {
        Custom {
            tag,
            payload: RefCell::new(payload),
        }
    }

    pub fn tag(&self) -> &Symbol {
        &self.tag
    }

    pub fn payload(&self) -> Rc<dyn Any> {
        self.payload.borrow().clone()
    }

    pub fn set_payload(&self, payload: Rc<dyn Any>) {
        *self.payload.borrow_mut() = payload;
    }

    /// Returns the payload if it has type `T`.
    pub fn downcast<T: 'static>(&self) -> Option<Rc<T>> {
        self.payload().downcast::<T>().ok()
    }
}

/// A lisp value.
///
/// Clones are cheap: compound values are reference counted and a clone
/// refers to the same pair, vector or closure.
#[derive(Clone, Default)]
pub enum KelpValue {
    /// The result of forms evaluated for effect, printed as `#v`.
    #[default]
    Void,
    Bool(bool),
    Number(Number),
    String(Rc<str>),
    Symbol(Symbol),
    Pair(Rc<Pair>),
    EmptyList,
    Vector(Vector),
    Closure(Rc<Closure>),
    Primitive(Rc<Primitive>),
    Macro(Rc<Macro>),
    Custom(Rc<Custom>),
    Error(Rc<Error>),
    Environment(Scope),
    InputPort(Rc<RefCell<dyn InputPort>>),
    OutputPort(Rc<RefCell<dyn OutputPort>>),
    /// Returned by readers at the end of their input.
    Eof,
}

macro_rules! extractor_fn {
    ($retty: ty, $name: ident, $expected: literal, $pattern: pat => $result: expr) => {
        #[doc = concat!("Returns the value if `self` is a ", $expected, ", and a type error otherwise.")]
        pub fn $name(&self) -> Result<$retty, Error> {
            match self {
                $pattern => Ok($result),
                _ => Err(Error::type_error($expected, self)),
            }
        }
    };
}

macro_rules! predicate_fn {
    ($name: ident, $doc: literal, $pattern: pat) => {
        #[doc = $doc]
        pub fn $name(&self) -> bool {
            matches!(self, $pattern)
        }
    };
}

impl KelpValue {
    pub fn cons(first: KelpValue, rest: KelpValue) -> KelpValue {
        KelpValue::Pair(Rc::new(Pair::new(first, rest)))
    }

    pub fn symbol(name: &str) -> KelpValue {
        KelpValue::Symbol(Symbol::new(name))
    }

    pub fn string(value: &str) -> KelpValue {
        KelpValue::String(Rc::from(value))
    }

    /// Identity comparison: the same heap object, the same symbol name, or
    /// the same atom.
    pub fn eq(&self, other: &KelpValue) -> bool {
        use KelpValue::*;
        match (self, other) {
            (Void, Void) | (EmptyList, EmptyList) | (Eof, Eof) => true,
            (Bool(a), Bool(b)) => a == b,
            (Number(a), Number(b)) => a.eqv(b),
            (String(a), String(b)) => Rc::ptr_eq(a, b),
            (Symbol(a), Symbol(b)) => a == b,
            (Pair(a), Pair(b)) => Rc::ptr_eq(a, b),
            (Vector(a), Vector(b)) => a.ptr_eq(b),
            (Closure(a), Closure(b)) => Rc::ptr_eq(a, b),
            (Primitive(a), Primitive(b)) => Rc::ptr_eq(a, b),
            (Macro(a), Macro(b)) => Rc::ptr_eq(a, b),
            (Custom(a), Custom(b)) => Rc::ptr_eq(a, b),
            (Error(a), Error(b)) => Rc::ptr_eq(a, b),
            (Environment(a), Environment(b)) => a.ptr_eq(b),
            (InputPort(a), InputPort(b)) => Rc::ptr_eq(a, b),
            (OutputPort(a), OutputPort(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Structural comparison of strings, lists and vectors.  Terminates on
    /// cyclic structures.
    pub fn equal(&self, other: &KelpValue) -> bool {
        equal_inner(self, other, &mut HashSet::new())
    }

    /// Returns an iterator over the elements of a list.
    pub fn base_iter(&self) -> BaseIter {
        BaseIter::new(self.clone())
    }

    /// The source span, for lists produced by the reader.
    pub fn span(&self) -> Option<Span> {
        match self {
            KelpValue::Pair(pair) => pair.span(),
            _ => None,
        }
    }

    /// Renders the value the way `write` does, so that strings and other
    /// readable values can be read back.
    pub fn to_write_string(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = Printer::new(&mut out, Mode::Write).print(self);
        out
    }

    /// The name reported by `type-of`.
    pub fn type_name(&self) -> Symbol {
        let name = match self {
            KelpValue::Void => "void",
            KelpValue::Bool(_) => "boolean",
            KelpValue::Number(number) => number.type_name(),
            KelpValue::String(_) => "string",
            KelpValue::Symbol(_) => "symbol",
            KelpValue::Pair(_) => "pair",
            KelpValue::EmptyList => "null",
            KelpValue::Vector(_) => "vector",
            KelpValue::Closure(_) | KelpValue::Primitive(_) => "function",
            KelpValue::Macro(_) => "macro",
            KelpValue::Custom(custom) => return custom.tag().clone(),
            KelpValue::Error(_) => "error",
            KelpValue::Environment(_) => "environment",
            KelpValue::InputPort(_) => "input-port",
            KelpValue::OutputPort(_) => "output-port",
            KelpValue::Eof => "eof-object",
        };
        Symbol::new(name)
    }

    /// Every value except `#f` counts as true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, KelpValue::Bool(false))
    }

    // extractors begin
    extractor_fn!(Rc<Pair>, as_pair, "pair", KelpValue::Pair(pair) => pair.clone());
    extractor_fn!(Symbol, as_symbol, "symbol", KelpValue::Symbol(symbol) => symbol.clone());
    extractor_fn!(Rc<str>, as_string, "string", KelpValue::String(string) => string.clone());
    extractor_fn!(bool, as_bool, "boolean", KelpValue::Bool(value) => *value);
    extractor_fn!(i64, as_int, "fixnum", KelpValue::Number(Number::Fixnum(value)) => *value);
    extractor_fn!(f64, as_float, "flonum", KelpValue::Number(Number::Flonum(value)) => *value);
    extractor_fn!(Number, as_number, "number", KelpValue::Number(number) => number.clone());
    extractor_fn!(Vector, as_vector, "vector", KelpValue::Vector(vector) => vector.clone());
    extractor_fn!(Scope, as_scope, "environment", KelpValue::Environment(scope) => scope.clone());
    extractor_fn!(Rc<Custom>, as_custom, "custom", KelpValue::Custom(custom) => custom.clone());
    extractor_fn!(
        Rc<RefCell<dyn InputPort>>,
        as_input_port,
        "input-port",
        KelpValue::InputPort(port) => port.clone()
    );
    extractor_fn!(
        Rc<RefCell<dyn OutputPort>>,
        as_output_port,
        "output-port",
        KelpValue::OutputPort(port) => port.clone()
    );
    // extractors end

    /// Returns the `first` of a pair, and a type error otherwise.
    pub fn car(&self) -> Result<KelpValue, Error> {
        self.as_pair().map(|pair| pair.first())
    }

    /// Returns the `rest` of a pair, and a type error otherwise.
    pub fn cdr(&self) -> Result<KelpValue, Error> {
        self.as_pair().map(|pair| pair.rest())
    }

    /// Returns a float if `self` holds any number.
    pub fn try_float(&self) -> Result<f64, Error> {
        self.as_number().map(|number| number.to_f64())
    }

    // predicates begin
    predicate_fn!(consp, "Returns True if `self` is a pair.", KelpValue::Pair(_));
    predicate_fn!(null, "Returns True if `self` is the empty list.", KelpValue::EmptyList);
    predicate_fn!(
        listp,
        "Returns True if `self` is a pair or the empty list.",
        KelpValue::Pair(_) | KelpValue::EmptyList
    );
    predicate_fn!(symbolp, "Returns True if `self` is a symbol.", KelpValue::Symbol(_));
    predicate_fn!(stringp, "Returns True if `self` is a string.", KelpValue::String(_));
    predicate_fn!(numberp, "Returns True if `self` is a number.", KelpValue::Number(_));
    predicate_fn!(vectorp, "Returns True if `self` is a vector.", KelpValue::Vector(_));
    predicate_fn!(
        functionp,
        "Returns True if `self` can be applied.",
        KelpValue::Closure(_) | KelpValue::Primitive(_)
    );
    predicate_fn!(macrop, "Returns True if `self` is a macro.", KelpValue::Macro(_));
    predicate_fn!(errorp, "Returns True if `self` is a reified error.", KelpValue::Error(_));
    predicate_fn!(is_void, "Returns True if `self` is `#v`.", KelpValue::Void);
    predicate_fn!(is_eof, "Returns True if `self` is the end-of-input object.", KelpValue::Eof);
    // predicates end
}

fn addr<T: ?Sized>(rc: &Rc<T>) -> usize {
    Rc::as_ptr(rc) as *const () as usize
}

fn equal_inner(a: &KelpValue, b: &KelpValue, seen: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (KelpValue::String(x), KelpValue::String(y)) => x == y,
        (KelpValue::Pair(x), KelpValue::Pair(y)) => {
            let mut x = x.clone();
            let mut y = y.clone();
            loop {
                // Pairs already being compared are assumed equal.
                if Rc::ptr_eq(&x, &y) || !seen.insert((addr(&x), addr(&y))) {
                    return true;
                }
                if !equal_inner(&x.first(), &y.first(), seen) {
                    return false;
                }
                match (x.rest(), y.rest()) {
                    (KelpValue::Pair(next_x), KelpValue::Pair(next_y)) => {
                        x = next_x;
                        y = next_y;
                    }
                    (rest_x, rest_y) => return equal_inner(&rest_x, &rest_y, seen),
                }
            }
        }
        (KelpValue::Vector(x), KelpValue::Vector(y)) => {
            if x.ptr_eq(y) || !seen.insert((x.addr(), y.addr())) {
                return true;
            }
            let xs = x.items().clone();
            let ys = y.items().clone();
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys.iter())
                    .all(|(x, y)| equal_inner(x, y, seen))
        }
        _ => a.eq(b),
    }
}

impl PartialEq for KelpValue {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl std::fmt::Display for KelpValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Printer::new(f, Mode::Display).print(self)
    }
}

impl std::fmt::Debug for KelpValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Printer::new(f, Mode::Write).print(self)
    }
}

impl From<bool> for KelpValue {
    fn from(value: bool) -> Self {
        KelpValue::Bool(value)
    }
}

impl From<&str> for KelpValue {
    fn from(value: &str) -> Self {
        KelpValue::string(value)
    }
}

impl From<String> for KelpValue {
    fn from(value: String) -> Self {
        KelpValue::String(Rc::from(value))
    }
}

impl From<Rc<str>> for KelpValue {
    fn from(value: Rc<str>) -> Self {
        KelpValue::String(value)
    }
}

impl From<Symbol> for KelpValue {
    fn from(value: Symbol) -> Self {
        KelpValue::Symbol(value)
    }
}

impl From<Scope> for KelpValue {
    fn from(value: Scope) -> Self {
        KelpValue::Environment(value)
    }
}

impl From<Error> for KelpValue {
    fn from(value: Error) -> Self {
        value.into_value()
    }
}

impl From<()> for KelpValue {
    fn from(_: ()) -> Self {
        KelpValue::Void
    }
}

/// Conversion of an argument value into the parameter type of a host
/// function.  Mismatches are type errors.
pub trait FromValue: Sized {
    fn from_value(value: KelpValue) -> Result<Self, Error>;
}

impl FromValue for KelpValue {
    fn from_value(value: KelpValue) -> Result<Self, Error> {
        Ok(value)
    }
}

macro_rules! from_value_impl {
    ($($ty: ty => $extractor: ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: KelpValue) -> Result<Self, Error> {
                    value.$extractor()
                }
            }

            impl TryFrom<KelpValue> for $ty {
                type Error = Error;

                fn try_from(value: KelpValue) -> Result<Self, Self::Error> {
                    value.$extractor()
                }
            }
        )*
    };
}

from_value_impl!(
    i64 => as_int,
    f64 => as_float,
    bool => as_bool,
    Number => as_number,
    Symbol => as_symbol,
    Rc<str> => as_string,
    Rc<Pair> => as_pair,
    Vector => as_vector,
    Scope => as_scope,
    Rc<Custom> => as_custom,
    Rc<RefCell<dyn InputPort>> => as_input_port,
    Rc<RefCell<dyn OutputPort>> => as_output_port,
);

impl FromValue for String {
    fn from_value(value: KelpValue) -> Result<Self, Error> {
        value.as_string().map(|string| string.to_string())
    }
}

impl TryFrom<KelpValue> for String {
    type Error = Error;

    fn try_from(value: KelpValue) -> Result<Self, Self::Error> {
        String::from_value(value)
    }
}

/// Appends the elements of `lists` into a fresh list.  The last list is
/// shared, not copied.
pub(crate) fn append(lists: &[KelpValue]) -> Result<KelpValue, Error> {
    let Some((last, init)) = lists.split_last() else {
        return Ok(KelpValue::EmptyList);
    };
    let mut items = vec![];
    for list in init {
        items.extend(cons::list_to_vec(list)?);
    }
    Ok(cons::list_with_tail(items, last.clone()))
}

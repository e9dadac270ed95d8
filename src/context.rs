use std::cell::Cell;
use std::fs::File;
use std::io::BufReader;
use std::rc::Rc;

mod add_function;
pub use add_function::{Arity, KelpCallable, Primitive};

mod rest;
pub use rest::Rest;

use crate::{
    Error, KelpValue, builtin,
    eval::eval,
    expand::{Macro, expand},
    parse::Reader,
    port::{InputPort, ReaderPort, StringPort},
    scope::Scope,
    value::Symbol,
};

/// Reads every datum from `port`, then evaluates them in order in `scope`.
/// Returns the value of the last one, or `#v` for an empty port.
pub(crate) fn load(reader: &Reader, port: &mut dyn InputPort, scope: &Scope) -> Result<KelpValue, Error> {
    let forms = reader.read_all(port)?;
    let mut result = KelpValue::Void;
    for form in forms {
        result = eval(&form, scope)?;
    }
    Ok(result)
}

/// Represents an instance of the interpreter.
///
/// `KelpContext` holds the root scope, the reader and the state the builtin
/// primitives share.  Every interpreter is independent: two contexts never
/// see each other's definitions.
pub struct KelpContext {
    root: Scope,
    reader: Rc<Reader>,
    gensym: Rc<Cell<u64>>,
}

impl Default for KelpContext {
    fn default() -> Self {
        Self::new()
    }
}

const PRELUDE: &str = include_str!("builtin/prelude.kelp");

impl KelpContext {
    /// Creates a context with the full primitive library, the builtin macros
    /// and the prelude.
    pub fn new() -> Self {
        let mut ctx = Self::bare();
        builtin::add(&mut ctx);
        if let Err(err) = ctx.eval_string(PRELUDE) {
            panic!("prelude failed to load: {}", err.format());
        }
        ctx
    }

    /// Creates a context with only the special forms, and the `macro`
    /// primitive that `define-macro` expands into.
    pub fn bare() -> Self {
        let mut ctx = KelpContext {
            root: Scope::root(),
            reader: Rc::new(Reader::new()),
            gensym: Rc::new(Cell::new(0)),
        };
        ctx.add_function("macro", |transformer: KelpValue| -> Result<KelpValue, Error> {
            Macro::new(transformer).map(|mac| KelpValue::Macro(Rc::new(mac)))
        });
        ctx
    }

    /// Installs the syntax rules of `reader`, replacing the current ones.
    pub fn with_reader(self, reader: Reader) -> Self {
        self.reader.install(reader);
        self
    }

    /// The root scope, as returned by `root-environment`.
    pub fn root(&self) -> &Scope {
        &self.root
    }

    /// The reader used by `eval_string`, `load` and the read primitives.
    pub fn reader(&self) -> &Reader {
        &self.reader
    }

    pub(crate) fn shared_reader(&self) -> Rc<Reader> {
        self.reader.clone()
    }

    pub(crate) fn gensym_counter(&self) -> Rc<Cell<u64>> {
        self.gensym.clone()
    }

    /// Returns a symbol that the reader cannot produce.
    pub fn gensym(&self) -> Symbol {
        next_gensym(&self.gensym)
    }

    /// Registers a Rust function under `name` in the root scope.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use kelp::{KelpContext, Error, Rest};
    ///
    /// let mut ctx = KelpContext::new();
    /// ctx.add_function("add-nums", |a: i64, b: i64| a + b);
    /// ctx.add_function("sum", |first: i64, rest: Rest<i64>| -> Result<i64, Error> {
    ///     Ok(first + rest.iter().sum::<i64>())
    /// });
    ///
    /// let out: i64 = ctx.eval_string("(sum (add-nums 1 2) 3 4)").unwrap().try_into().unwrap();
    /// assert_eq!(out, 10);
    /// ```
    #[inline(always)]
    pub fn add_function<
        Args: 'static,
        Output: 'static,
        const HAS_REST: bool,
        const FALLIBLE: bool,
    >(
        &mut self,
        name: &str,
        func: impl KelpCallable<Args, Output, HAS_REST, FALLIBLE>,
    ) -> &mut Self {
        let primitive = func.into_primitive(name);
        self.root.bind_str(name, KelpValue::Primitive(Rc::new(primitive)));
        self
    }

    /// Registers a function that receives its arguments as a slice.
    pub fn add_primitive(
        &mut self,
        name: &str,
        arity: Arity,
        body: impl Fn(&[KelpValue]) -> Result<KelpValue, Error> + 'static,
    ) -> &mut Self {
        let primitive = Primitive::new(name, arity, body);
        self.root.bind_str(name, KelpValue::Primitive(Rc::new(primitive)));
        self
    }

    /// Registers a native macro.  The transformer receives the unevaluated
    /// operands of each use and returns the replacement form.
    pub fn add_macro(
        &mut self,
        name: &str,
        arity: Arity,
        transformer: impl Fn(&[KelpValue]) -> Result<KelpValue, Error> + 'static,
    ) -> &mut Self {
        let primitive = KelpValue::Primitive(Rc::new(Primitive::new(name, arity, transformer)));
        self.root.bind_str(name, KelpValue::Macro(Rc::new(Macro::native(primitive))));
        self
    }

    /// Binds `name` to `value` in the root scope.
    pub fn define(&mut self, name: &str, value: impl Into<KelpValue>) -> &mut Self {
        self.root.bind_str(name, value);
        self
    }

    pub fn lookup(&self, name: &str) -> Result<KelpValue, Error> {
        self.root.lookup_str(name)
    }

    /// Reads the first datum of `input`.
    pub fn read_str(&self, input: &str) -> Result<KelpValue, Error> {
        self.reader.read_str(input)
    }

    /// Expands `expr` in the root scope.
    pub fn expand(&mut self, expr: &KelpValue) -> Result<KelpValue, Error> {
        expand(expr, &self.root)
    }

    /// Expands and evaluates `expr` in the root scope.
    pub fn eval(&mut self, expr: &KelpValue) -> Result<KelpValue, Error> {
        eval(expr, &self.root)
    }

    /// Reads and evaluates every form in `program`, returning the value of
    /// the last one.
    pub fn eval_string(&mut self, program: &str) -> Result<KelpValue, Error> {
        self.eval_port(&mut StringPort::new(program))
    }

    /// Like [`eval_string`](Self::eval_string), but returns errors as
    /// first-class error values.
    pub fn eval_string_value(&mut self, program: &str) -> KelpValue {
        self.eval_string(program).unwrap_or_else(Error::into_value)
    }

    pub fn eval_port(&mut self, port: &mut dyn InputPort) -> Result<KelpValue, Error> {
        load(&self.reader, port, &self.root)
    }

    /// Reads and evaluates the file at `path`.
    pub fn eval_file(&mut self, path: &str) -> Result<KelpValue, Error> {
        let file = File::open(path)
            .map_err(|e| Error::system_error(format!("couldn't open {}: {}", path, e)))?;
        self.eval_port(&mut ReaderPort::new(BufReader::new(file)))
    }
}

pub(crate) fn next_gensym(counter: &Cell<u64>) -> Symbol {
    let count = counter.get();
    counter.set(count + 1);
    Symbol::new(&format!("#gensym{}", count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Token;

    #[test]
    fn test_contexts_are_independent() {
        let mut first = KelpContext::new();
        let mut second = KelpContext::new();
        first.eval_string("(define x 1)").unwrap();
        assert!(second.eval_string("x").is_err());
        assert_eq!(first.gensym().name(), "#gensym0");
        assert_eq!(second.gensym().name(), "#gensym0");
    }

    #[test]
    fn test_bare_context() {
        let mut ctx = KelpContext::bare();
        assert!(ctx.eval_string("(car '(1))").is_err());
        ctx.define("answer", 42);
        assert_eq!(ctx.eval_string("answer").unwrap().to_string(), "42");
        assert_eq!(
            ctx.eval_string("(define-macro (m) ''ok) (m)").unwrap().to_string(),
            "ok"
        );
    }

    #[test]
    fn test_eval_string_value() {
        let mut ctx = KelpContext::new();
        let value = ctx.eval_string_value("(vector-ref (vector 1) 5)");
        assert!(value.errorp());
        assert_eq!(value.to_string(), "error: invalid index (5)");
        assert_eq!(ctx.eval_string_value("(+ 1 2)").to_string(), "3");
    }

    #[test]
    fn test_with_reader() {
        let reader = Reader::new();
        reader.register(|token, _| match token {
            Token::Hash { text, .. } if text == "#nil" => Ok(Some(KelpValue::EmptyList)),
            _ => Ok(None),
        });
        let mut ctx = KelpContext::new().with_reader(reader);
        assert_eq!(ctx.eval_string("(null? #nil)").unwrap().to_string(), "#t");
        assert_eq!(
            ctx.eval_string("(read-string \"(1 . #nil)\")").unwrap().to_string(),
            "(1)"
        );
    }

    #[test]
    fn test_add_macro() {
        let mut ctx = KelpContext::new();
        ctx.add_macro("swap-args", Arity::Exact(1), |args| {
            let form = &args[0];
            let items = crate::cons::list_to_vec(form)?;
            Ok(items.into_iter().rev().collect())
        });
        assert_eq!(
            ctx.eval_string("(swap-args (2 10 -))").unwrap().to_string(),
            "8"
        );
    }

    #[test]
    fn test_missing_file() {
        let mut ctx = KelpContext::new();
        let err = ctx.eval_file("/definitely/not/here.kelp").unwrap_err();
        assert_eq!(err.kind_ref().to_string(), "system-error");
    }
}

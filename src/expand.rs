use crate::{
    Error, KelpValue,
    cons::{list_to_vec, list_with_tail},
    eval::{apply, eval_expr},
    list,
    scope::Scope,
};

/// A source-to-source transformer.  Invoked by the expander with the
/// unevaluated operands of a form whose head names it.
pub struct Macro {
    transformer: KelpValue,
}

impl Macro {
    /// Wraps a function value.  Non-functions are a type error.
    pub fn new(transformer: KelpValue) -> Result<Self, Error> {
        if !transformer.functionp() {
            return Err(Error::type_error("function", &transformer));
        }
        Ok(Macro { transformer })
    }

    /// Wraps a native transformer.
    pub(crate) fn native(transformer: KelpValue) -> Self {
        Macro { transformer }
    }

    pub fn transformer(&self) -> &KelpValue {
        &self.transformer
    }
}

/// Rewrites `expr` until no macro invocations remain outside quoted data.
///
/// `define-macro` forms are evaluated in `scope` as soon as they are
/// expanded, so later forms in the same unit can use the macro.
pub fn expand(expr: &KelpValue, scope: &Scope) -> Result<KelpValue, Error> {
    let mut expr = expr.clone();
    loop {
        let KelpValue::Pair(pair) = &expr else {
            return Ok(expr);
        };
        let head = pair.first();
        let KelpValue::Symbol(name) = &head else {
            return expand_list(&expr, scope);
        };
        match name.name() {
            "quote" => return Ok(expr),
            "if" | "set!" | "begin" => {
                return with_span(KelpValue::cons(head, expand_list(&pair.rest(), scope)?), &expr);
            }
            "lambda" => {
                let rest = pair.rest();
                let params = rest.car().map_err(|e| e.with_trace(expr.clone()))?;
                let body = expand_list(&rest.cdr()?, &scope.child())?;
                return with_span(KelpValue::cons(head, KelpValue::cons(params, body)), &expr);
            }
            "define" => {
                let definition = expand_definition(&pair.rest(), scope)
                    .map_err(|e| e.with_trace(expr.clone()))?;
                return with_span(KelpValue::cons(head, definition), &expr);
            }
            "define-macro" => {
                let definition = expand_definition(&pair.rest(), scope)
                    .map_err(|e| e.with_trace(expr.clone()))?;
                let name = definition.car()?;
                let transformer = definition.cdr()?;
                let form = list!(
                    ,KelpValue::symbol("define")
                    ,name
                    ,KelpValue::cons(KelpValue::symbol("macro"), transformer)
                )?;
                eval_expr(&form, scope).map_err(|e| e.with_trace(expr.clone()))?;
                return with_span(form, &expr);
            }
            _ => {}
        }
        match scope.lookup(name) {
            Ok(KelpValue::Macro(mac)) => {
                let args = list_to_vec(&pair.rest()).map_err(|e| e.with_trace(expr.clone()))?;
                expr = apply(mac.transformer(), args).map_err(|e| e.with_trace(expr.clone()))?;
            }
            _ => return expand_list(&expr, scope),
        }
    }
}

fn with_span(form: KelpValue, source: &KelpValue) -> Result<KelpValue, Error> {
    if let KelpValue::Pair(pair) = &form {
        pair.set_span(source.span());
    }
    Ok(form)
}

/// Expands every element of a list, and the tail of an improper list.
pub fn expand_list(list: &KelpValue, scope: &Scope) -> Result<KelpValue, Error> {
    let mut items = vec![];
    let mut next = list.clone();
    while let KelpValue::Pair(pair) = &next {
        items.push(expand(&pair.first(), scope)?);
        let rest = pair.rest();
        next = rest;
    }
    let tail = expand(&next, scope)?;
    let expanded = list_with_tail(items, tail);
    with_span(expanded, list)
}

/// Normalises the operands of `define`.
///
/// The curried shorthand `(define ((f a) b) body...)` is rewritten one level
/// at a time into `(define (f a) (lambda (b) body...))` until the target is
/// a plain symbol; the value is then expanded.
fn expand_definition(operands: &KelpValue, scope: &Scope) -> Result<KelpValue, Error> {
    let mut operands = operands.clone();
    loop {
        let target = operands.car()?;
        let KelpValue::Pair(target) = target else {
            let value = expand_list(&operands.cdr()?, scope)?;
            return Ok(KelpValue::cons(target, value));
        };
        let lambda = KelpValue::cons(
            KelpValue::symbol("lambda"),
            KelpValue::cons(target.rest(), operands.cdr()?),
        );
        operands = list!(,target.first() ,lambda)?;
    }
}

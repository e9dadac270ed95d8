use crate::{
    Error, KelpValue, destruct_bind,
    expand::expand,
    scope::Scope,
};

/// A user-defined function: a parameter pattern, a body and the scope it was
/// created in.
///
/// The parameter pattern is a proper list of symbols, a list ending in a
/// dotted rest symbol, or a single symbol that receives all arguments.
pub struct Closure {
    scope: Scope,
    params: KelpValue,
    body: KelpValue,
}

impl Closure {
    pub fn new(scope: Scope, params: KelpValue, body: KelpValue) -> Self {
        Closure { scope, params, body }
    }

    pub fn params(&self) -> &KelpValue {
        &self.params
    }

    pub fn body(&self) -> &KelpValue {
        &self.body
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    fn bind_args(&self, callee: &KelpValue, frame: &Scope, args: &[KelpValue]) -> Result<(), Error> {
        let mut params = self.params.clone();
        let mut index = 0;
        loop {
            match params {
                KelpValue::EmptyList => {
                    if index != args.len() {
                        return Err(Error::argument_error(callee, args));
                    }
                    return Ok(());
                }
                KelpValue::Pair(pair) => {
                    let name = pair.first().as_symbol()?;
                    let Some(arg) = args.get(index) else {
                        return Err(Error::argument_error(callee, args));
                    };
                    frame.bind(name, arg.clone());
                    index += 1;
                    params = pair.rest();
                }
                KelpValue::Symbol(rest) => {
                    frame.bind(rest, args[index..].iter().cloned().collect());
                    return Ok(());
                }
                other => return Err(Error::type_error("symbol", &other)),
            }
        }
    }
}

/// The outcome of evaluating a form in tail position: either a finished
/// value, or a call the caller's trampoline still has to make.
pub(crate) enum Bounce {
    Done(KelpValue),
    Call {
        function: KelpValue,
        args: Vec<KelpValue>,
        form: KelpValue,
    },
}

/// Expands `expr` in `scope` and evaluates the result.
pub fn eval(expr: &KelpValue, scope: &Scope) -> Result<KelpValue, Error> {
    let expanded = expand(expr, scope)?;
    eval_expr(&expanded, scope)
}

/// Evaluates an already expanded form.
pub fn eval_expr(expr: &KelpValue, scope: &Scope) -> Result<KelpValue, Error> {
    match eval_step(expr, scope, false)? {
        Bounce::Done(value) => Ok(value),
        Bounce::Call { function, args, form } => {
            apply(&function, args).map_err(|e| e.with_trace(form))
        }
    }
}

/// Calls `function` with `args`.
///
/// Closures run in a loop: a call in tail position of the body replaces the
/// current function and arguments instead of growing the native stack.
pub fn apply(function: &KelpValue, args: Vec<KelpValue>) -> Result<KelpValue, Error> {
    let mut function = function.clone();
    let mut args = args;
    let mut form: Option<KelpValue> = None;
    loop {
        let step = match &function {
            KelpValue::Primitive(primitive) => primitive.call(&args).map(Bounce::Done),
            KelpValue::Closure(closure) => {
                let frame = closure.scope().child();
                closure
                    .bind_args(&function, &frame, &args)
                    .and_then(|_| eval_body(closure.body(), &frame, true))
            }
            other => Err(Error::type_error("function", other)),
        };
        let step = match form.take() {
            Some(form) => step.map_err(|e| e.with_trace(form)),
            None => step,
        };
        match step? {
            Bounce::Done(value) => return Ok(value),
            Bounce::Call {
                function: next,
                args: next_args,
                form: next_form,
            } => {
                function = next;
                args = next_args;
                form = Some(next_form);
            }
        }
    }
}

/// Raises a reified error instead of letting it flow on as a value.
pub(crate) fn raise_error_value(value: KelpValue) -> Result<KelpValue, Error> {
    match value {
        KelpValue::Error(err) => Err((*err).clone()),
        value => Ok(value),
    }
}

fn eval_step(expr: &KelpValue, scope: &Scope, tail: bool) -> Result<Bounce, Error> {
    match expr {
        KelpValue::Symbol(name) => scope
            .lookup(name)
            .and_then(raise_error_value)
            .map(Bounce::Done),
        KelpValue::Pair(_) => {
            eval_form(expr, scope, tail).map_err(|e| e.with_trace(expr.clone()))
        }
        _ => raise_error_value(expr.clone()).map(Bounce::Done),
    }
}

fn eval_form(expr: &KelpValue, scope: &Scope, tail: bool) -> Result<Bounce, Error> {
    let head = expr.car()?;
    let rest = expr.cdr()?;
    if let KelpValue::Symbol(name) = &head {
        match name.name() {
            "quote" => {
                destruct_bind!((datum) = rest);
                return Ok(Bounce::Done(datum));
            }
            "if" => {
                destruct_bind!((test then &optional otherwise) = rest);
                let branch = if eval_expr(&test, scope)?.is_truthy() {
                    then
                } else {
                    otherwise
                };
                return eval_step(&branch, scope, tail);
            }
            "lambda" => {
                destruct_bind!((params &rest body) = rest);
                let closure = Closure::new(scope.clone(), params, body);
                return Ok(Bounce::Done(KelpValue::Closure(closure.into())));
            }
            "set!" => {
                destruct_bind!((target value) = rest);
                let target = target.as_symbol()?;
                let value = eval_expr(&value, scope)?;
                scope.mutate(&target, value)?;
                return Ok(Bounce::Done(KelpValue::Void));
            }
            "define" => {
                destruct_bind!((target value) = rest);
                let target = target.as_symbol()?;
                let value = eval_expr(&value, scope)?;
                scope.bind(target, value);
                return Ok(Bounce::Done(KelpValue::Void));
            }
            "begin" => return eval_body(&rest, scope, tail),
            _ => {}
        }
    } else if !head.consp() {
        return Err(Error::type_error("pair or symbol", &head));
    }

    let function = eval_expr(&head, scope)?;
    if !function.functionp() {
        return Err(Error::type_error("function", &function));
    }
    let mut args = vec![];
    let mut next = rest;
    while let KelpValue::Pair(pair) = &next {
        args.push(eval_expr(&pair.first(), scope)?);
        let rest = pair.rest();
        next = rest;
    }
    if !next.null() {
        return Err(Error::syntax_error("improper argument list"));
    }
    if tail {
        Ok(Bounce::Call {
            function,
            args,
            form: expr.clone(),
        })
    } else {
        apply(&function, args).map(Bounce::Done)
    }
}

/// Evaluates a sequence of forms, the last one in tail position if `tail`.
/// An empty sequence evaluates to `#v`.
pub(crate) fn eval_body(body: &KelpValue, scope: &Scope, tail: bool) -> Result<Bounce, Error> {
    let mut next = body.clone();
    let mut result = Bounce::Done(KelpValue::Void);
    while let KelpValue::Pair(pair) = &next {
        let form = pair.first();
        let rest = pair.rest();
        if rest.null() {
            result = eval_step(&form, scope, tail)?;
        } else {
            eval_expr(&form, scope)?;
        }
        next = rest;
    }
    if !next.null() {
        return Err(Error::syntax_error("improper body"));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use crate::KelpContext;
    use crate::test_utils::{eval_assert, eval_assert_equal, eval_assert_error};

    #[test]
    fn test_special_forms() {
        let ctx = &mut KelpContext::bare();
        eval_assert_equal(ctx, "(quote (a b))", "'(a b)");
        eval_assert_equal(ctx, "(if #f 1 2)", "2");
        eval_assert_equal(ctx, "(if '() 1 2)", "1");
        eval_assert_equal(ctx, "(if #f 1)", "#v");
        eval_assert_equal(ctx, "(begin)", "#v");
        eval_assert_equal(ctx, "(begin (define x 5) (set! x 6) x)", "6");
        eval_assert_equal(ctx, "(define y 1)", "#v");
        eval_assert_equal(ctx, "((lambda args args) 1 2 3)", "'(1 2 3)");
        eval_assert_equal(ctx, "((lambda (a . rest) rest) 1 2 3)", "'(2 3)");
        eval_assert_equal(ctx, "((lambda (a . rest) rest) 1)", "'()");
    }

    #[test]
    fn test_closures_capture_scope() {
        let ctx = &mut KelpContext::new();
        eval_assert_equal(
            ctx,
            "(define (make-counter)
               (define n 0)
               (lambda () (set! n (+ n 1)) n))
             (define c (make-counter))
             (c) (c)
             (list (c) ((make-counter)))",
            "'(3 1)",
        );
    }

    #[test]
    fn test_tail_calls_do_not_grow_stack() {
        let ctx = &mut KelpContext::new();
        eval_assert_equal(
            ctx,
            "(define (loop n) (if (= n 0) 'done (loop (- n 1)))) (loop 1000000)",
            "'done",
        );
        eval_assert_equal(
            ctx,
            "(define (even? n) (if (= n 0) #t (odd? (- n 1))))
             (define (odd? n) (if (= n 0) #f (even? (- n 1))))
             (even? 100001)",
            "#f",
        );
        eval_assert_equal(
            ctx,
            "(define (count n acc) (cond ((= n 0) acc) (else (count (- n 1) (+ acc 1)))))
             (count 500000 0)",
            "500000",
        );
    }

    #[test]
    fn test_arity_errors() {
        let ctx = &mut KelpContext::new();
        eval_assert_error(
            ctx,
            "((lambda (a b) a) 1)",
            "argument-error: wrong number of arguments to #<closure (a b)>: (1)",
        );
        eval_assert_error(
            ctx,
            "((lambda (a) a) 1 2)",
            "argument-error: wrong number of arguments to #<closure (a)>: (1 2)",
        );
        eval_assert_error(
            ctx,
            "(car 1 2)",
            "argument-error: wrong number of arguments to #<primitive car>: (1 2)",
        );
        eval_assert_error(ctx, "((lambda (1) 1) 1)", "type-error: expecting symbol: 1");
    }

    #[test]
    fn test_evaluation_errors() {
        let ctx = &mut KelpContext::new();
        eval_assert_error(ctx, "x", "error: unknown variable: x");
        eval_assert_error(ctx, "(1 2)", "type-error: expecting pair or symbol: 1");
        eval_assert_error(ctx, "(\"f\" 2)", "type-error: expecting pair or symbol: \"f\"");
        eval_assert_error(ctx, "(define v 1) (v 2)", "type-error: expecting function: 1");
        eval_assert_error(ctx, "(if)", "syntax-error: missing test in form");
        eval_assert_error(ctx, "(quote 1 2)", "syntax-error: too many elements in form");
        eval_assert(ctx, "(eq? (catch (lambda () (car '())) (lambda (k m) k)) 'type-error)");
    }

    #[test]
    fn test_backtrace_spans() {
        let ctx = &mut KelpContext::new();
        let err = ctx
            .eval_string("(define (f x)\n  (car x))\n(f 5)")
            .unwrap_err();
        assert_eq!(
            err.format(),
            "ERR type-error: expecting pair: 5\n2.3-2.10:  at (car x)\n3.1-3.6:  at (f 5)\n"
        );
    }
}

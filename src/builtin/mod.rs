/*!
The functions and macros every [`KelpContext::new`](crate::KelpContext::new)
interpreter starts with.

## Special forms

Handled by the evaluator itself, and available in bare contexts too.

| Name           | Details                                              |
|----------------|------------------------------------------------------|
| `quote`        |                                                      |
| `if`           | Without an else branch, a false test gives `#v`.     |
| `lambda`       | Proper, dotted and single-symbol parameter lists.    |
| `define`       | Also `(define (f . params) body...)`, curried too.   |
| `set!`         | The variable must already be bound.                  |
| `begin`        |                                                      |
| `define-macro` | Takes effect as soon as it is expanded.              |

## Macros

| Name         | Details                                               |
|--------------|-------------------------------------------------------|
| `quasiquote` | With `unquote` and `unquote-splicing`, nested levels. |
| `let`        | Also named `let`.                                     |
| `let*`       |                                                       |
| `cond`       | `else` clauses and test-only clauses.                 |
| `and`        |                                                       |
| `or`         |                                                       |
| `when`       |                                                       |
| `unless`     |                                                       |

## Equality

| Name     | Details                                       |
|----------|-----------------------------------------------|
| `eq?`    | Identity.  Numbers and symbols by value.      |
| `eqv?`   | Same as `eq?`.                                |
| `equal?` | Structural, terminates on cyclic data.        |

## Errors

| Name    | Details                                                        |
|---------|----------------------------------------------------------------|
| `throw` | `(throw kind message)`                                         |
| `catch` | `(catch thunk handler)`, handler receives `kind` and `message`. |
| `error` | `(error message)`                                              |

## Reading, writing and evaluating

| Name                  | Details                                      |
|-----------------------|----------------------------------------------|
| `read`                | From an input port, `#eof-object` at the end. |
| `read-string`         |                                              |
| `read-file`           | Every datum left in an input port, as a list. |
| `write`               | `(write object port)`                        |
| `display`             | `(display object port)`                      |
| `macro`               |                                              |
| `macroexpand`         | `(macroexpand form [environment])`           |
| `eval`                | `(eval expr environment)`                    |
| `apply`               |                                              |
| `load`                | `(load path environment)`                    |
| `null-environment`    | An empty scope, with only the special forms. |
| `capture-environment` | A new child of the given environment.        |
| `root-environment`    |                                              |

## Types and symbols

| Name             | Details                                        |
|------------------|------------------------------------------------|
| `type-of`        |                                                |
| `define-type`    | `(define-type name (lambda (wrap unwrap set) ...))` |
| `symbol->string` |                                                |
| `string->symbol` |                                                |
| `gensym`         | Symbols the reader can never produce.          |

## Numbers

| Name             | Details                                |
|------------------|----------------------------------------|
| `+` `-` `*` `/`  | Fixnums overflow into bignums.         |
| `quotient`       | Truncates.                             |
| `modulo`         | Takes the sign of the divisor.         |
| `fixnum->flonum` |                                        |
| `=` `<` `>` `<=` `>=` |                                   |

## Strings

| Name             | Details                                  |
|------------------|------------------------------------------|
| `string-length`  | In characters.                           |
| `string-append`  |                                          |
| `string-split`   | `(string-split string separator)`        |
| `string-join`    | `(string-join list separator)`           |
| `string->vector` | A vector of character codes.             |
| `vector->string` |                                          |
| `object->string` | The `write` representation.              |

## Lists and vectors

| Name                       | Details                                |
|----------------------------|----------------------------------------|
| `cons` `car` `cdr`         |                                        |
| `set-car!` `set-cdr!`      |                                        |
| `list` `length` `append`   |                                        |
| `list->vector` `vector->list` |                                     |
| `make-vector` `vector`     |                                        |
| `vector-length`            |                                        |
| `vector-ref` `vector-set!` |                                        |
| `vector-slice`             | `(vector-slice vector start end)`      |

## Ports

| Name                  | Details                            |
|-----------------------|------------------------------------|
| `open-input-string`   |                                    |
| `open-output-string`  |                                    |
| `get-output-string`   |                                    |
| `open-file`           | `(open-file path mode)`, mode is `'read`, `'write` or `'append`. |
| `read-char`           |                                    |
| `read-byte`           | The next byte as a fixnum, or the eof object. |
| `read-line`           |                                    |
| `eof-object?`         |                                    |
| `write-string`        |                                    |
| `write-byte`          | `(write-byte port byte)`           |
| `flush`               |                                    |
| `close-port`          |                                    |
| `current-output-port` |                                    |

## Prelude

Written in Kelp and loaded after everything above: `not`, `null?`, `pair?`,
`list?`, `symbol?`, `string?`, `number?`, `integer?`, `vector?`,
`procedure?`, `boolean?`, `error?`, `zero?`, `cadr`, `cddr`, `caddr`,
`map`, `for-each`, `filter`, `fold`, `reverse`, `assq`, `assoc`, `member`
and `newline`.
*/

use crate::KelpContext;

mod functions;
mod macros;

pub(crate) fn add(ctx: &mut KelpContext) {
    functions::add(ctx);
    macros::add(ctx);
}

#[cfg(test)]
mod tests {
    use crate::KelpContext;
    use crate::test_utils::{eval_assert, eval_assert_equal, eval_assert_not};

    #[test]
    fn test_prelude_predicates() {
        let ctx = &mut KelpContext::new();
        eval_assert(ctx, "(not #f)");
        eval_assert_not(ctx, "(not '())");
        eval_assert(ctx, "(null? '())");
        eval_assert(ctx, "(pair? '(1))");
        eval_assert(ctx, "(list? '())");
        eval_assert_not(ctx, "(list? 1)");
        eval_assert(ctx, "(symbol? 'a)");
        eval_assert(ctx, "(string? \"a\")");
        eval_assert(ctx, "(vector? #(1))");
        eval_assert(ctx, "(boolean? #f)");
        eval_assert(ctx, "(procedure? car)");
        eval_assert(ctx, "(procedure? (lambda () 1))");
        eval_assert_not(ctx, "(procedure? 'car)");
        eval_assert(ctx, "(integer? 100000000000000000000)");
        eval_assert_not(ctx, "(integer? 1.5)");
        eval_assert(ctx, "(number? 1.5)");
        eval_assert(ctx, "(zero? 0)");
        eval_assert_not(ctx, "(error? 'error)");
    }

    #[test]
    fn test_prelude_lists() {
        let ctx = &mut KelpContext::new();
        eval_assert_equal(ctx, "(cadr '(1 2 3))", "2");
        eval_assert_equal(ctx, "(caddr '(1 2 3))", "3");
        eval_assert_equal(ctx, "(reverse '(1 2 3))", "'(3 2 1)");
        eval_assert_equal(ctx, "(map (lambda (x) (* x x)) '(1 2 3))", "'(1 4 9)");
        eval_assert_equal(
            ctx,
            "(define total 0) (for-each (lambda (x) (set! total (+ total x))) '(1 2 3)) total",
            "6",
        );
        eval_assert_equal(ctx, "(filter (lambda (x) (> x 1)) '(1 2 3))", "'(2 3)");
        eval_assert_equal(ctx, "(fold + 0 '(1 2 3))", "6");
        eval_assert_equal(ctx, "(assq 'b '((a 1) (b 2)))", "'(b 2)");
        eval_assert_not(ctx, "(assq 'c '((a 1) (b 2)))");
        eval_assert_equal(ctx, "(assoc \"b\" '((\"a\" . 1) (\"b\" . 2)))", "'(\"b\" . 2)");
        eval_assert_equal(ctx, "(member 2 '(1 2 3))", "'(2 3)");
        eval_assert_equal(ctx, "(length (map (lambda (x) x) (vector->list (make-vector 100000 0))))", "100000");
    }

    #[test]
    fn test_newline() {
        let ctx = &mut KelpContext::new();
        eval_assert_equal(
            ctx,
            "(define out (open-output-string)) (display 1 out) (newline out) (get-output-string out)",
            "\"1\\n\"",
        );
    }
}

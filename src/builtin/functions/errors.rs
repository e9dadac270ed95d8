use crate::{Error, ErrorKind, KelpContext, KelpValue, eval::apply, value::Symbol};

pub(crate) fn add(ctx: &mut KelpContext) {
    ctx.add_function("throw", |kind: Symbol, message: KelpValue| -> Result<KelpValue, Error> {
        Err(Error::thrown(kind, message))
    });

    ctx.add_function("catch", |thunk: KelpValue, handler: KelpValue| -> Result<KelpValue, Error> {
        for function in [&thunk, &handler] {
            if !function.functionp() {
                return Err(Error::type_error("function", function));
            }
        }
        match apply(&thunk, vec![]) {
            Ok(value) => Ok(value),
            Err(err) => apply(&handler, vec![err.kind().symbol().into(), err.message().clone()]),
        }
    });

    ctx.add_function("error", |message: KelpValue| -> Result<KelpValue, Error> {
        Err(Error::new(ErrorKind::Error, message))
    });
}

#[cfg(test)]
mod tests {
    use crate::KelpContext;
    use crate::test_utils::{eval_assert_equal, eval_assert_error};

    #[test]
    fn test_error_handling() {
        let ctx = &mut KelpContext::new();
        eval_assert_equal(
            ctx,
            "(catch (lambda () (throw 'my-kind 42)) (lambda (kind msg) (list kind msg)))",
            "'(my-kind 42)",
        );
        eval_assert_equal(
            ctx,
            "(catch (lambda () 'fine) (lambda (kind msg) 'handled))",
            "'fine",
        );
        eval_assert_equal(
            ctx,
            "(catch (lambda () (vector-ref (vector) 0)) (lambda (kind msg) (list kind msg)))",
            "'(error \"invalid index (0)\")",
        );
        eval_assert_equal(
            ctx,
            "(catch (lambda () (car 5)) (lambda (kind msg) kind))",
            "'type-error",
        );
        eval_assert_error(ctx, "(throw 'my-kind \"bad\")", "my-kind: bad");
        eval_assert_error(ctx, "(throw 'system-error \"disk\")", "system-error: disk");
        eval_assert_error(ctx, "(error \"Something went wrong!\")", "error: Something went wrong!");
        eval_assert_error(ctx, "(throw \"kind\" 1)", "type-error: expecting symbol: \"kind\"");
    }

    #[test]
    fn test_catch_checks_its_arguments() {
        let ctx = &mut KelpContext::new();
        eval_assert_error(
            ctx,
            "(catch 5 (lambda (k m) (list 'handled k)))",
            "type-error: expecting function: 5",
        );
        eval_assert_error(
            ctx,
            "(catch (lambda () (throw 'never 1)) 'handler)",
            "type-error: expecting function: handler",
        );
    }

    #[test]
    fn test_error_in_handler_propagates() {
        let ctx = &mut KelpContext::new();
        eval_assert_error(
            ctx,
            "(catch (lambda () (error 1)) (lambda (kind msg) (error (+ msg 1))))",
            "error: 2",
        );
    }
}

use std::rc::Rc;

use kelp::{Arity, Error, KelpContext, KelpValue, Reader, Rest, Token};

macro_rules! kelp_assert {
    (@impl $ctx: expr, program:$input:expr, result:$result:expr $(,)?) => {
        let output = $ctx.eval_string($input).map_err(|err| {
            println!("{}:{}: execution failed: {}", file!(), line!(), err.format());
            err
        })?;
        let expected = $ctx.eval_string($result)?;
        assert!(
            output.equal(&expected),
            "\n{}:{}: program: {}\n  output: {},\n  expected: {}\n",
            file!(),
            line!(),
            $input,
            output,
            expected
        );
    };
    (@impl $ctx: expr, program:$input:expr, error:$desc:expr $(,)?) => {
        let output = $ctx.eval_string($input);
        assert!(output.is_err());
        assert_eq!(output.unwrap_err().to_string(), $desc);
    };
    (ctx: $ctx: expr, program: $($tail:tt)+) => {
        kelp_assert!(@impl $ctx, program: $($tail)+)
    };
    (program: $($tail:tt)+) => {
        let mut ctx = KelpContext::new();
        kelp_assert!(ctx: ctx, program: $($tail)+)
    };
}

#[test]
fn test_reader_round_trip() -> Result<(), Error> {
    let ctx = KelpContext::new();
    for input in [
        "(1 2 3)",
        "(1 . 2)",
        "(1 2 . 3)",
        "\"tab\\there\"",
        "#(1 (2) \"x\")",
        "(quote (a b))",
        "()",
        "-12.5",
        "123456789012345678901234567890",
        "(#t #f #v)",
    ] {
        let value = ctx.read_str(input)?;
        let written = value.to_write_string();
        let reread = ctx.read_str(&written)?;
        assert!(value.equal(&reread), "{} -> {} -> {:?}", input, written, reread);
    }
    assert_eq!(ctx.read_str("[a (b) . c]")?.to_write_string(), "(a (b) . c)");
    assert_eq!(ctx.read_str("'x")?.to_write_string(), "(quote x)");
    assert_eq!(
        ctx.read_str("`(a ,b ,@c)")?.to_write_string(),
        "(quasiquote (a (unquote b) (unquote-splicing c)))"
    );
    Ok(())
}

#[test]
fn test_conditionals() -> Result<(), Error> {
    kelp_assert! { program: "(if #t 10 20)",        result: "10" }
    kelp_assert! { program: "(if #f 10 20)",        result: "20" }
    kelp_assert! { program: "(if (> 20 10) 10 20)", result: "10" }
    kelp_assert! { program: "(if (> 10 20) 10 20)", result: "20" }
    kelp_assert! { program: r##"
       (define (cf vv)
         (cond ((> vv 45) 'gt45)
               ((> vv 5) 'gt5)))

       (list (cf 2) (cf 200) (cf 8))
    "##, result: "'(#v gt45 gt5)" }

    kelp_assert! { program: "(when #t 10 20 30)",  result: "30" }
    kelp_assert! { program: "(unless #f 10 20 30)", result: "30" }
    kelp_assert! { program: "(and 1 2 #f)",         result: "#f" }
    kelp_assert! { program: "(or #f #f 3)",         result: "3" }
    Ok(())
}

#[test]
fn test_define() -> Result<(), Error> {
    kelp_assert! {
        program: "(define (add a b) (+ a b)) (add 20 22)",
        result: "42",
    }
    kelp_assert! {
        program: "(define ((adder n) x) (+ n x)) ((adder 2) 40)",
        result: "42",
    }
    kelp_assert! {
        program: "(define (rest-args a . more) (list a more)) (rest-args 1 2 3)",
        result: "'(1 (2 3))",
    }
    kelp_assert! {
        program: "(set! never-defined 1)",
        error: "error: unknown variable: never-defined",
    }
    Ok(())
}

#[test]
fn test_scope_shadowing() -> Result<(), Error> {
    kelp_assert! {
        program: r##"
        (define x 'outer)
        (define (f) (define x 'inner) x)
        (list (f) x)
        "##,
        result: "'(inner outer)",
    }
    kelp_assert! {
        program: r##"
        (define counter 0)
        (define (bump!) (set! counter (+ counter 1)))
        (bump!) (bump!)
        counter
        "##,
        result: "2",
    }
    Ok(())
}

#[test]
fn test_tail_calls() -> Result<(), Error> {
    kelp_assert! {
        program: "(define (countdown n) (if (= n 0) n (countdown (- n 1)))) (countdown 1000000)",
        result: "0",
    }
    kelp_assert! {
        program: r##"
        (define (ping n) (if (= n 0) 'ping (pong (- n 1))))
        (define (pong n) (if (= n 0) 'pong (ping (- n 1))))
        (ping 300001)
        "##,
        result: "'pong",
    }
    kelp_assert! {
        program: r##"
        (define (walk n)
          (begin
            (when (< n 0) (error "negative"))
            (let ((next (- n 1)))
              (if (> next 0) (walk next) 'done))))
        (walk 300000)
        "##,
        result: "'done",
    }
    Ok(())
}

#[test]
fn test_macros() -> Result<(), Error> {
    kelp_assert! {
        program: "(define-macro (my-if c t e) (list 'if c t e)) (my-if #t 1 2)",
        result: "1",
    }
    kelp_assert! {
        program: r##"
        (define-macro (swap! a b)
          `(let ((tmp ,a))
             (set! ,a ,b)
             (set! ,b tmp)))
        (define p 1)
        (define q 2)
        (swap! p q)
        (list p q)
        "##,
        result: "'(2 1)",
    }
    // Expansion is unhygienic: the template's `tmp` captures the caller's.
    kelp_assert! {
        program: r##"
        (define-macro (swap! a b)
          `(let ((tmp ,a))
             (set! ,a ,b)
             (set! ,b tmp)))
        (define tmp 1)
        (define other 2)
        (swap! tmp other)
        (list tmp other)
        "##,
        result: "'(1 2)",
    }
    kelp_assert! {
        program: r##"
        (define-macro (while test . body)
          (let ((loop (gensym)))
            `(let ,loop ()
               (when ,test ,@body (,loop)))))
        (define i 0)
        (define total 0)
        (while (< i 5) (set! total (+ total i)) (set! i (+ i 1)))
        total
        "##,
        result: "10",
    }
    Ok(())
}

#[test]
fn test_errors() -> Result<(), Error> {
    kelp_assert! {
        program: "((lambda (a b) a) 1 2 3)",
        error: "argument-error: wrong number of arguments to #<closure (a b)>: (1 2 3)",
    }
    kelp_assert! { program: "undefined-thing", error: "error: unknown variable: undefined-thing" }
    kelp_assert! { program: "(vector-ref (vector 1 2) 2)", error: "error: invalid index (2)" }
    kelp_assert! { program: "(car \"x\")", error: "type-error: expecting pair: \"x\"" }
    kelp_assert! { program: "(1 2", error: "syntax-error: failed to parse (1:1): unterminated list" }
    kelp_assert! {
        program: "(catch (lambda () (throw 'oops '(1 2))) (lambda (kind msg) (cons kind msg)))",
        result: "'(oops 1 2)",
    }

    let mut ctx = KelpContext::new();
    let value = ctx.eval_string_value("(error \"failed\")");
    assert!(value.errorp());
    assert_eq!(value.to_string(), "error: failed");
    Ok(())
}

#[test]
fn test_error_values_are_raised() -> Result<(), Error> {
    let mut ctx = KelpContext::new();
    ctx.define("e", Error::lisp_error("boom").into_value());
    kelp_assert! { ctx: ctx, program: "(e 1)", error: "error: boom" }
    kelp_assert! { ctx: ctx, program: "(list 1 e)", error: "error: boom" }
    kelp_assert! { ctx: ctx, program: "(begin (define x e) 'after)", error: "error: boom" }
    kelp_assert! { ctx: ctx, program: "(if e 1 2)", error: "error: boom" }
    kelp_assert! { ctx: ctx, program: "((lambda () e 'after))", error: "error: boom" }
    kelp_assert! { ctx: ctx, program: "(car (list e))", error: "error: boom" }
    kelp_assert! { ctx: ctx, program: "x", error: "error: unknown variable: x" }
    kelp_assert! {
        ctx: ctx,
        program: "(catch (lambda () (list e)) (lambda (kind msg) (list kind msg)))",
        result: "'(error \"boom\")",
    }
    Ok(())
}

#[test]
fn test_host_functions() -> Result<(), Error> {
    let mut ctx = KelpContext::new();
    ctx.add_function("scale", |factor: f64, values: Rest<f64>| -> KelpValue {
        values.iter().map(|v| KelpValue::from(v * factor)).collect()
    })
    .add_function("checked-root", |x: f64| -> Result<f64, Error> {
        if x < 0.0 {
            return Err(Error::lisp_error(format!("negative input: {}", x)));
        }
        Ok(x.sqrt())
    })
    .add_primitive("count-args", Arity::AtLeast(0), |args| Ok(args.len().into()));

    kelp_assert! { ctx: ctx, program: "(scale 2.0 1.5 3.0)", result: "'(3.0 6.0)" }
    kelp_assert! { ctx: ctx, program: "(scale 2.0)", result: "'()" }
    kelp_assert! { ctx: ctx, program: "(checked-root 16.0)", result: "4.0" }
    kelp_assert! { ctx: ctx, program: "(count-args 1 'a \"b\")", result: "3" }
    kelp_assert! { ctx: ctx, program: "(checked-root -1.0)", error: "error: negative input: -1" }
    kelp_assert! {
        ctx: ctx,
        program: "(checked-root 1)",
        error: "type-error: expecting flonum: 1",
    }
    Ok(())
}

#[test]
fn test_reader_extension() -> Result<(), Error> {
    let reader = Reader::new();
    let counter = Rc::new(std::cell::Cell::new(0));
    let seen = counter.clone();
    reader.register(move |token, _| match token {
        Token::Hash { text, .. } if text == "#count" => {
            seen.set(seen.get() + 1);
            Ok(Some(KelpValue::from(seen.get())))
        }
        _ => Ok(None),
    });
    let mut ctx = KelpContext::new().with_reader(reader);
    kelp_assert! { ctx: ctx, program: "(list #count #count)", result: "'(1 2)" }
    assert_eq!(counter.get(), 2);
    Ok(())
}

#[test]
fn test_independent_interpreters() -> Result<(), Error> {
    let mut first = KelpContext::new();
    let mut second = KelpContext::new();
    kelp_assert! { ctx: first, program: "(define shared 1) shared", result: "1" }
    kelp_assert! { ctx: second, program: "shared", error: "error: unknown variable: shared" }
    Ok(())
}

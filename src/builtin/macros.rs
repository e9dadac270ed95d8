use std::cell::Cell;
use std::rc::Rc;

use crate::cons::{list_to_vec, list_with_tail};
use crate::context::{Arity, KelpContext, next_gensym};
use crate::error::Error;
use crate::value::KelpValue;
use crate::{destruct_bind, list};

fn sym(name: &str) -> KelpValue {
    KelpValue::symbol(name)
}

fn quoted(value: KelpValue) -> Result<KelpValue, Error> {
    list!(,sym("quote") ,value)
}

fn head_is(form: &KelpValue, name: &str) -> bool {
    match form {
        KelpValue::Pair(pair) => matches!(pair.first(), KelpValue::Symbol(head) if head.name() == name),
        _ => false,
    }
}

fn quasi_operand(form: &KelpValue) -> Result<KelpValue, Error> {
    let operands = form.cdr()?;
    destruct_bind!((operand) = operands);
    Ok(operand)
}

/// Builds the code that constructs `template`, with `depth` levels of
/// quasiquotation still open.
fn quasi(template: &KelpValue, depth: usize) -> Result<KelpValue, Error> {
    match template {
        KelpValue::Pair(_) => {
            for (name, delta) in [("unquote", -1), ("unquote-splicing", -1), ("quasiquote", 1)] {
                if !head_is(template, name) {
                    continue;
                }
                let operand = quasi_operand(template)?;
                if delta < 0 && depth == 1 {
                    if name == "unquote-splicing" {
                        return Err(Error::syntax_error("unquote-splicing outside of a list"));
                    }
                    return Ok(operand);
                }
                let depth = if delta < 0 { depth - 1 } else { depth + 1 };
                return list!(,sym("list") ,quoted(sym(name))? ,quasi(&operand, depth)?);
            }
            quasi_list(template, depth)
        }
        KelpValue::Vector(vector) => {
            list!(,sym("list->vector") ,quasi_list(&vector.to_list(), depth)?)
        }
        KelpValue::Symbol(_) | KelpValue::EmptyList => quoted(template.clone()),
        _ => Ok(template.clone()),
    }
}

fn quasi_list(template: &KelpValue, depth: usize) -> Result<KelpValue, Error> {
    let mut parts = vec![sym("append")];
    let mut next = template.clone();
    loop {
        let KelpValue::Pair(pair) = &next else {
            break;
        };
        // `(a . ,b)` reads as `(a unquote b)`.
        if head_is(&next, "unquote") || head_is(&next, "quasiquote") {
            break;
        }
        let element = pair.first();
        if depth == 1 && head_is(&element, "unquote-splicing") {
            parts.push(quasi_operand(&element)?);
        } else {
            parts.push(list!(,sym("list") ,quasi(&element, depth)?)?);
        }
        let rest = pair.rest();
        next = rest;
    }
    parts.push(quasi(&next, depth)?);
    Ok(parts.into_iter().collect())
}

fn quasiquote(args: &[KelpValue]) -> Result<KelpValue, Error> {
    quasi(&args[0], 1)
}

/// Splits `((name init) ...)` into names and initial values.
fn split_bindings(bindings: &KelpValue) -> Result<(Vec<KelpValue>, Vec<KelpValue>), Error> {
    let mut names = vec![];
    let mut inits = vec![];
    for binding in list_to_vec(bindings)? {
        destruct_bind!((name init) = binding);
        names.push(name.as_symbol()?.into());
        inits.push(init);
    }
    Ok((names, inits))
}

fn lambda(params: Vec<KelpValue>, body: KelpValue) -> KelpValue {
    KelpValue::cons(
        sym("lambda"),
        KelpValue::cons(params.into_iter().collect(), body),
    )
}

fn let_form(args: &[KelpValue]) -> Result<KelpValue, Error> {
    let form: KelpValue = args.iter().cloned().collect();
    if let KelpValue::Symbol(name) = &args[0] {
        // Named let.
        destruct_bind!((_name bindings &rest body) = form);
        let (names, inits) = split_bindings(&bindings)?;
        let define = list!(,sym("define") ,name.clone().into() ,lambda(names, body))?;
        let procedure = list!(,list!(,sym("lambda") ,KelpValue::EmptyList ,define ,name.clone().into())?)?;
        return Ok(list_with_tail(vec![procedure], inits.into_iter().collect()));
    }
    destruct_bind!((bindings &rest body) = form);
    let (names, inits) = split_bindings(&bindings)?;
    Ok(KelpValue::cons(lambda(names, body), inits.into_iter().collect()))
}

fn let_star(args: &[KelpValue]) -> Result<KelpValue, Error> {
    let form: KelpValue = args.iter().cloned().collect();
    destruct_bind!((bindings &rest body) = form);
    let bindings = list_to_vec(&bindings)?;
    let Some((first, rest)) = bindings.split_first() else {
        return Ok(list_with_tail(vec![sym("let"), KelpValue::EmptyList], body));
    };
    let first = list!(,first.clone())?;
    if rest.is_empty() {
        return Ok(list_with_tail(vec![sym("let"), first], body));
    }
    let inner = list_with_tail(vec![sym("let*"), rest.iter().cloned().collect()], body);
    list!(,sym("let") ,first ,inner)
}

fn cond(args: &[KelpValue]) -> Result<KelpValue, Error> {
    let mut result: Option<KelpValue> = None;
    for (index, clause) in args.iter().enumerate().rev() {
        let clause = clause.clone();
        destruct_bind!((test &rest body) = clause);
        if matches!(&test, KelpValue::Symbol(name) if name.name() == "else") {
            if index != args.len() - 1 {
                return Err(Error::syntax_error("else clause must be last"));
            }
            result = Some(KelpValue::cons(sym("begin"), body));
            continue;
        }
        let otherwise: Vec<KelpValue> = result.take().into_iter().collect();
        result = Some(if body.null() {
            list_with_tail(vec![sym("or"), test], otherwise.into_iter().collect())
        } else {
            let then = KelpValue::cons(sym("begin"), body);
            list_with_tail(vec![sym("if"), test, then], otherwise.into_iter().collect())
        });
    }
    Ok(result.unwrap_or(KelpValue::Void))
}

fn and(args: &[KelpValue]) -> Result<KelpValue, Error> {
    match args {
        [] => Ok(KelpValue::Bool(true)),
        [only] => Ok(only.clone()),
        [first, rest @ ..] => {
            let rest = KelpValue::cons(sym("and"), rest.iter().cloned().collect());
            list!(,sym("if") ,first.clone() ,rest ,KelpValue::Bool(false))
        }
    }
}

fn or(counter: &Cell<u64>, args: &[KelpValue]) -> Result<KelpValue, Error> {
    match args {
        [] => Ok(KelpValue::Bool(false)),
        [only] => Ok(only.clone()),
        [first, rest @ ..] => {
            let temp: KelpValue = next_gensym(counter).into();
            let rest = KelpValue::cons(sym("or"), rest.iter().cloned().collect());
            let test = list!(,sym("if") ,temp.clone() ,temp.clone() ,rest)?;
            let lambda = list!(,sym("lambda") ,list!(,temp)? ,test)?;
            list!(,lambda ,first.clone())
        }
    }
}

fn when(args: &[KelpValue]) -> Result<KelpValue, Error> {
    let body = KelpValue::cons(sym("begin"), args[1..].iter().cloned().collect());
    list!(,sym("if") ,args[0].clone() ,body)
}

fn unless(args: &[KelpValue]) -> Result<KelpValue, Error> {
    let body = KelpValue::cons(sym("begin"), args[1..].iter().cloned().collect());
    list!(,sym("if") ,args[0].clone() ,KelpValue::Void ,body)
}

pub(crate) fn add(ctx: &mut KelpContext) {
    ctx.add_macro("quasiquote", Arity::Exact(1), quasiquote);
    ctx.add_macro("let", Arity::AtLeast(1), let_form);
    ctx.add_macro("let*", Arity::AtLeast(1), let_star);
    ctx.add_macro("cond", Arity::AtLeast(0), cond);
    ctx.add_macro("and", Arity::AtLeast(0), and);
    let counter: Rc<Cell<u64>> = ctx.gensym_counter();
    ctx.add_macro("or", Arity::AtLeast(0), move |args| or(&counter, args));
    ctx.add_macro("when", Arity::AtLeast(1), when);
    ctx.add_macro("unless", Arity::AtLeast(1), unless);
}

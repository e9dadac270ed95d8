use std::any::Any;
use std::rc::Rc;

use crate::{
    Error, KelpContext, KelpValue,
    context::{Arity, Primitive},
    eval::apply,
    value::{Custom, Symbol},
};

/// Extracts the value wrapped in a custom object tagged `tag`.
fn checked_custom(tag: &Symbol, object: &KelpValue) -> Result<Rc<Custom>, Error> {
    match object {
        KelpValue::Custom(custom) if custom.tag() == tag => Ok(custom.clone()),
        _ => Err(Error::type_error(tag.name(), object)),
    }
}

fn unwrap_custom(tag: &Symbol, object: &KelpValue) -> Result<KelpValue, Error> {
    let custom = checked_custom(tag, object)?;
    match custom.downcast::<KelpValue>() {
        Some(value) => Ok((*value).clone()),
        None => Err(Error::type_error(tag.name(), object)),
    }
}

fn primitive(
    name: String,
    arity: Arity,
    body: impl Fn(&[KelpValue]) -> Result<KelpValue, Error> + 'static,
) -> KelpValue {
    KelpValue::Primitive(Rc::new(Primitive::new(&name, arity, body)))
}

/// Mints a new custom type called `name` and calls `callback` with its
/// `wrap`, `unwrap` and `set` functions.
fn define_type(name: Symbol, callback: KelpValue) -> Result<KelpValue, Error> {
    if !callback.functionp() {
        return Err(Error::type_error("function", &callback));
    }
    let tag = name.clone();
    let wrap = primitive(format!("wrap-{}", name), Arity::Exact(1), move |args| {
        let payload: Rc<dyn Any> = Rc::new(args[0].clone());
        Ok(KelpValue::Custom(Rc::new(Custom::new(tag.clone(), payload))))
    });
    let tag = name.clone();
    let unwrap = primitive(format!("unwrap-{}", name), Arity::Exact(1), move |args| {
        unwrap_custom(&tag, &args[0])
    });
    let tag = name.clone();
    let set = primitive(format!("set-{}!", name), Arity::Exact(2), move |args| {
        let custom = checked_custom(&tag, &args[0])?;
        custom.set_payload(Rc::new(args[1].clone()));
        Ok(KelpValue::Void)
    });
    apply(&callback, vec![wrap, unwrap, set])?;
    Ok(KelpValue::Void)
}

pub(crate) fn add(ctx: &mut KelpContext) {
    ctx.add_function("type-of", |object: KelpValue| object.type_name());
    ctx.add_function("define-type", define_type);
}

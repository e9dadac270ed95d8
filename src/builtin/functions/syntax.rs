use std::cell::RefCell;
use std::rc::Rc;

use crate::{
    Error, KelpContext, KelpValue, Rest,
    expand::expand,
    port::{InputPort, OutputPort},
    scope::Scope,
};

pub(crate) fn add(ctx: &mut KelpContext) {
    let reader = ctx.shared_reader();
    ctx.add_function("read", move |port: Rc<RefCell<dyn InputPort>>| -> Result<KelpValue, Error> {
        reader.read(&mut *port.borrow_mut())
    });

    let reader = ctx.shared_reader();
    ctx.add_function("read-string", move |input: String| -> Result<KelpValue, Error> {
        reader.read_str(&input)
    });

    let reader = ctx.shared_reader();
    ctx.add_function("read-file", move |port: Rc<RefCell<dyn InputPort>>| -> Result<KelpValue, Error> {
        reader
            .read_all(&mut *port.borrow_mut())
            .map(|data| data.into_iter().collect::<KelpValue>())
    });

    ctx.add_function(
        "write",
        |object: KelpValue, port: Rc<RefCell<dyn OutputPort>>| -> Result<(), Error> {
            port.borrow_mut().write_str(&object.to_write_string())
        },
    );

    ctx.add_function(
        "display",
        |object: KelpValue, port: Rc<RefCell<dyn OutputPort>>| -> Result<(), Error> {
            port.borrow_mut().write_str(&object.to_string())
        },
    );

    let root = ctx.root().clone();
    ctx.add_function(
        "macroexpand",
        move |form: KelpValue, env: Rest<Scope>| -> Result<KelpValue, Error> {
            match &*env {
                [] => expand(&form, &root),
                [scope] => expand(&form, scope),
                _ => Err(Error::lisp_error("macroexpand takes at most one environment")),
            }
        },
    );
}

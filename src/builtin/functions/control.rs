use std::fs::File;
use std::io::BufReader;

use crate::{
    Error, KelpContext, KelpValue,
    cons::list_to_vec,
    context::load,
    eval::{apply, eval},
    port::ReaderPort,
    scope::Scope,
};

pub(crate) fn add(ctx: &mut KelpContext) {
    ctx.add_function("eval", |expr: KelpValue, env: Scope| -> Result<KelpValue, Error> {
        eval(&expr, &env)
    });

    ctx.add_function("apply", |function: KelpValue, args: KelpValue| -> Result<KelpValue, Error> {
        apply(&function, list_to_vec(&args)?)
    });

    let reader = ctx.shared_reader();
    ctx.add_function("load", move |path: String, env: Scope| -> Result<KelpValue, Error> {
        let file = File::open(&path)
            .map_err(|e| Error::system_error(format!("couldn't open {}: {}", path, e)))?;
        load(&reader, &mut ReaderPort::new(BufReader::new(file)), &env)
    });

    ctx.add_function("null-environment", Scope::root);

    ctx.add_function("capture-environment", |env: Scope| env.child());

    let root = ctx.root().clone();
    ctx.add_function("root-environment", move || root.clone());
}

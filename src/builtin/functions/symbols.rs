use crate::{KelpContext, context::next_gensym, value::Symbol};

pub(crate) fn add(ctx: &mut KelpContext) {
    ctx.add_function("symbol->string", |symbol: Symbol| symbol.name().to_string());
    ctx.add_function("string->symbol", |name: String| Symbol::new(&name));

    let counter = ctx.gensym_counter();
    ctx.add_function("gensym", move || next_gensym(&counter));
}

use std::rc::Rc;

use crate::{
    Error, KelpContext, KelpValue, Rest,
    cons::{Pair, list_length, list_to_vec},
    value::append,
    vector::Vector,
};

pub(crate) fn add(ctx: &mut KelpContext) {
    ctx.add_function("cons", KelpValue::cons);
    ctx.add_function("car", |pair: Rc<Pair>| pair.first());
    ctx.add_function("cdr", |pair: Rc<Pair>| pair.rest());
    ctx.add_function("set-car!", |pair: Rc<Pair>, value: KelpValue| pair.set_first(value));
    ctx.add_function("set-cdr!", |pair: Rc<Pair>, value: KelpValue| pair.set_rest(value));

    ctx.add_function("list", |items: Rest<KelpValue>| KelpValue::from(items));
    ctx.add_function("length", |list: KelpValue| -> Result<usize, Error> {
        list_length(&list)
    });
    ctx.add_function("append", |lists: Rest<KelpValue>| -> Result<KelpValue, Error> {
        append(&lists)
    });

    ctx.add_function("list->vector", |list: KelpValue| -> Result<Vector, Error> {
        Ok(Vector::new(list_to_vec(&list)?))
    });
    ctx.add_function("vector->list", |vector: Vector| vector.to_list());
}

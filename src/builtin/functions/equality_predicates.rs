use crate::{KelpContext, KelpValue};

pub(crate) fn add(ctx: &mut KelpContext) {
    ctx.add_function("eq?", |object1: KelpValue, object2: KelpValue| {
        object1.eq(&object2)
    });
    ctx.add_function("eqv?", |object1: KelpValue, object2: KelpValue| {
        object1.eq(&object2)
    });
    ctx.add_function("equal?", |object1: KelpValue, object2: KelpValue| {
        object1.equal(&object2)
    });
}

use crate::{Error, ErrorKind, KelpContext, KelpValue, Rest, vector::Vector};

const MAX_VECTOR_LENGTH: usize = 1 << 28;

pub(crate) fn add(ctx: &mut KelpContext) {
    ctx.add_function(
        "make-vector",
        |length: i64, fill: KelpValue| -> Result<Vector, Error> {
            let length = usize::try_from(length)
                .map_err(|_| Error::lisp_error(format!("invalid index ({})", length)))?;
            if length > MAX_VECTOR_LENGTH {
                return Err(Error::new(
                    ErrorKind::ArgumentError,
                    format!("vector length too large: {}", length),
                ));
            }
            Ok(Vector::filled(length, fill))
        },
    );
    ctx.add_function("vector", |items: Rest<KelpValue>| Vector::new(items.into_vec()));
    ctx.add_function("vector-length", |vector: Vector| vector.len());
    ctx.add_function("vector-ref", |vector: Vector, index: i64| -> Result<KelpValue, Error> {
        vector.get(index)
    });
    ctx.add_function(
        "vector-set!",
        |vector: Vector, index: i64, value: KelpValue| -> Result<(), Error> {
            vector.set(index, value)
        },
    );
    ctx.add_function(
        "vector-slice",
        |vector: Vector, start: i64, end: i64| -> Result<Vector, Error> {
            vector.slice(start, end)
        },
    );
}

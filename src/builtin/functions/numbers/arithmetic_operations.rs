use crate::{Error, KelpContext, KelpValue, Rest, number::Number};

pub(crate) fn add(ctx: &mut KelpContext) {
    ctx.add_function("+", |args: Rest<Number>| {
        args.iter().fold(Number::Fixnum(0), |acc, x| acc.add(x))
    });

    ctx.add_function("-", |first: Number, rest: Rest<Number>| {
        if rest.is_empty() {
            return first.neg();
        }
        rest.iter().fold(first, |acc, x| acc.sub(x))
    });

    ctx.add_function("*", |args: Rest<Number>| {
        args.iter().fold(Number::Fixnum(1), |acc, x| acc.mul(x))
    });

    ctx.add_function("/", |first: Number, rest: Rest<Number>| -> Result<Number, Error> {
        if rest.is_empty() {
            return Number::Fixnum(1).div(&first);
        }
        let mut result = first;
        for divisor in rest.iter() {
            result = result.div(divisor)?;
        }
        Ok(result)
    });

    ctx.add_function("quotient", |a: Number, b: Number| -> Result<Number, Error> {
        a.quotient(&b)
    });
    ctx.add_function("modulo", |a: Number, b: Number| -> Result<Number, Error> {
        a.modulo(&b)
    });

    ctx.add_function("fixnum->flonum", |number: Number| -> KelpValue {
        number.to_f64().into()
    });
}

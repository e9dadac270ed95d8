use std::rc::Rc;

use crate::{
    Error, KelpContext, KelpValue, Rest,
    cons::list_to_vec,
    vector::Vector,
};

fn string_split(string: Rc<str>, separator: Rc<str>) -> KelpValue {
    if separator.is_empty() {
        return string
            .chars()
            .map(|ch| KelpValue::from(ch.to_string()))
            .collect();
    }
    string.split(&*separator).map(KelpValue::from).collect()
}

fn string_join(strings: KelpValue, separator: Rc<str>) -> Result<KelpValue, Error> {
    let parts = list_to_vec(&strings)?
        .iter()
        .map(|part| part.as_string())
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(parts.join(&*separator).into())
}

fn vector_to_string(vector: Vector) -> Result<KelpValue, Error> {
    let mut string = String::with_capacity(vector.len());
    for item in vector.items().iter() {
        let ch = item
            .as_int()
            .ok()
            .and_then(|code| u32::try_from(code).ok())
            .and_then(char::from_u32);
        match ch {
            Some(ch) => string.push(ch),
            None => {
                return Err(Error::type_error(
                    "vector of character codes",
                    &KelpValue::from(vector.clone()),
                ));
            }
        }
    }
    Ok(string.into())
}

pub(crate) fn add(ctx: &mut KelpContext) {
    ctx.add_function("string-split", string_split);
    ctx.add_function("string-join", string_join);

    ctx.add_function("string->vector", |string: Rc<str>| {
        Vector::new(string.chars().map(|ch| KelpValue::from(ch as i64)).collect())
    });
    ctx.add_function("vector->string", vector_to_string);

    ctx.add_function("object->string", |object: KelpValue| object.to_write_string());

    ctx.add_function("string-length", |string: Rc<str>| string.chars().count());

    ctx.add_function("string-append", |strings: Rest<Rc<str>>| {
        strings.iter().map(|s| &**s).collect::<String>()
    });
}

#[cfg(test)]
mod tests {
    use crate::KelpContext;
    use crate::test_utils::{eval_assert_equal, eval_assert_error};

    #[test]
    fn test_split_and_join() {
        let ctx = &mut KelpContext::new();
        eval_assert_equal(ctx, "(string-split \"a,b,,c\" \",\")", "'(\"a\" \"b\" \"\" \"c\")");
        eval_assert_equal(ctx, "(string-split \"abc\" \"\")", "'(\"a\" \"b\" \"c\")");
        eval_assert_equal(ctx, "(string-join '(\"a\" \"b\" \"c\") \", \")", "\"a, b, c\"");
        eval_assert_equal(ctx, "(string-join '() \"-\")", "\"\"");
        eval_assert_error(
            ctx,
            "(string-join '(\"a\" 1) \"-\")",
            "type-error: expecting string: 1",
        );
    }

    #[test]
    fn test_string_vectors() {
        let ctx = &mut KelpContext::new();
        eval_assert_equal(ctx, "(string->vector \"hé\")", "(vector 104 233)");
        eval_assert_equal(ctx, "(vector->string (vector 104 233))", "\"hé\"");
        eval_assert_error(
            ctx,
            "(vector->string (vector 104 'x))",
            "type-error: expecting vector of character codes: #(104 x)",
        );
    }

    #[test]
    fn test_string_functions() {
        let ctx = &mut KelpContext::new();
        eval_assert_equal(ctx, "(object->string '(1 \"a\" b))", "\"(1 \\\"a\\\" b)\"");
        eval_assert_equal(ctx, "(string-length \"héllo\")", "5");
        eval_assert_equal(ctx, "(string-append \"a\" \"bc\" \"\")", "\"abc\"");
        eval_assert_equal(ctx, "(string-append)", "\"\"");
    }
}

use std::cmp::Ordering;

use crate::{KelpContext, Rest, number::Number};

macro_rules! compare_impl {
    ($ctx:ident, $symbol:literal, $ordering:pat) => {
        $ctx.add_function($symbol, |first: Number, rest: Rest<Number>| {
            let mut previous = first;
            for next in rest {
                if !matches!(previous.compare(&next), Some($ordering)) {
                    return false;
                }
                previous = next;
            }
            true
        });
    };
}

pub(crate) fn add(ctx: &mut KelpContext) {
    compare_impl!(ctx, "=", Ordering::Equal);
    compare_impl!(ctx, "<", Ordering::Less);
    compare_impl!(ctx, ">", Ordering::Greater);
    compare_impl!(ctx, "<=", Ordering::Less | Ordering::Equal);
    compare_impl!(ctx, ">=", Ordering::Greater | Ordering::Equal);
}

#[cfg(test)]
mod tests {
    use crate::KelpContext;
    use crate::test_utils::{eval_assert, eval_assert_error, eval_assert_not};

    #[test]
    fn test_comparison_of_numbers() {
        let ctx = &mut KelpContext::new();
        eval_assert(ctx, "(= 1 1 1)");
        eval_assert(ctx, "(= 1 1.0)");
        eval_assert_not(ctx, "(= 1 2)");
        eval_assert(ctx, "(< 1 2 3)");
        eval_assert_not(ctx, "(< 1 3 2)");
        eval_assert(ctx, "(> 3 2.5 1)");
        eval_assert(ctx, "(<= 1 1 2)");
        eval_assert_not(ctx, "(>= 1 2)");
        eval_assert(ctx, "(< 5)");
        eval_assert(ctx, "(< 9223372036854775807 9223372036854775808)");
        eval_assert_error(ctx, "(< 1 'a)", "type-error: expecting number: a");
    }
}

mod arithmetic_operations;
mod comparison_of_numbers;

use crate::KelpContext;

pub(crate) fn add(ctx: &mut KelpContext) {
    arithmetic_operations::add(ctx);
    comparison_of_numbers::add(ctx);
}

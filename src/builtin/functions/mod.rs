use crate::KelpContext;

mod control;
mod equality_predicates;
mod errors;
mod list_elements;
mod numbers;
mod ports;
mod strings;
mod symbols;
mod syntax;
mod types;
mod vectors;

pub(crate) fn add(ctx: &mut KelpContext) {
    equality_predicates::add(ctx);
    errors::add(ctx);
    syntax::add(ctx);
    control::add(ctx);
    types::add(ctx);
    symbols::add(ctx);
    numbers::add(ctx);
    strings::add(ctx);
    list_elements::add(ctx);
    vectors::add(ctx);
    ports::add(ctx);
}

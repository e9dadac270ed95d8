use crate::KelpContext;

#[track_caller]
pub(crate) fn eval_assert_equal(ctx: &mut KelpContext, program: &str, expected: &str) {
    let output = ctx
        .eval_string(program)
        .unwrap_or_else(|err| panic!("program: {}\nfailed with:\n{}", program, err.format()));
    let expected_value = ctx
        .eval_string(expected)
        .unwrap_or_else(|err| panic!("expected: {}\nfailed with:\n{}", expected, err.format()));
    assert!(
        output.equal(&expected_value),
        "program: {}\n  output: {:?}\n  expected: {:?}",
        program,
        output,
        expected_value
    );
}

#[track_caller]
pub(crate) fn eval_assert_error(ctx: &mut KelpContext, program: &str, expected: &str) {
    match ctx.eval_string(program) {
        Ok(output) => panic!(
            "program: {}\n  expected error: {}\n  got: {:?}",
            program, expected, output
        ),
        Err(err) => assert_eq!(err.to_string(), expected, "program: {}", program),
    }
}

#[track_caller]
pub(crate) fn eval_assert(ctx: &mut KelpContext, program: &str) {
    let output = ctx
        .eval_string(program)
        .unwrap_or_else(|err| panic!("program: {}\nfailed with:\n{}", program, err.format()));
    assert!(output.is_truthy(), "program: {}\n  output: {:?}", program, output);
}

#[track_caller]
pub(crate) fn eval_assert_not(ctx: &mut KelpContext, program: &str) {
    let output = ctx
        .eval_string(program)
        .unwrap_or_else(|err| panic!("program: {}\nfailed with:\n{}", program, err.format()));
    assert!(!output.is_truthy(), "program: {}\n  output: {:?}", program, output);
}

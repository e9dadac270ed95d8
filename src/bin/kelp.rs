use std::env;
use std::process;

use kelp::{Error, KelpContext, KelpValue};

fn run(ctx: &mut KelpContext) -> Result<(), Error> {
    let args: Vec<String> = env::args().skip(1).collect();
    for arg in args {
        ctx.eval_file(&arg)?;
    }

    Ok(())
}

fn main() {
    let mut ctx = KelpContext::new();

    let result = run(&mut ctx);
    // Flush anything buffered on `current-output-port`.
    let flushed = match ctx.eval_string("(current-output-port)") {
        Ok(KelpValue::OutputPort(stdout)) => stdout.borrow_mut().flush(),
        _ => Ok(()),
    };
    if let Err(e) = result.and(flushed) {
        print!("{}", e.format());
        process::exit(-1);
    }
}

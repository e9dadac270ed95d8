/*!
Kelp is a small Scheme-flavoured lisp that can be embedded into Rust
programs.  It has an extensible reader, unhygienic `define-macro` macros,
lexically scoped closures, and an evaluator that runs calls in tail position
in constant native stack space.

## Getting started

Here's an example:
*/

/*!
  ```rust
  use kelp::{KelpContext, Error};

  fn main() -> Result<(), Error> {
      // Create a new interpreter.
      let mut ctx = KelpContext::new();

      // Add a function called `add-nums` to `ctx`.
      ctx.add_function("add-nums", |num1: i64, num2: i64| num1 + num2);

      // Write a lisp program that calls `add-nums`
      let program = "(define (twice f x) (f x x)) (twice add-nums 15)";

      // Evaluate the program, and save the result.
      let sum: i64 = ctx.eval_string(program)?.try_into()?;

      assert_eq!(sum, 30);
      Ok(())
  }
  ```
*/

/*!
## Extending the reader

The grammar is an ordered list of rules, and new rules are tried before the
builtin ones:

  ```rust
  use kelp::{KelpContext, KelpValue, Reader, Token};

  let reader = Reader::new();
  reader.register(|token, parser| match token {
      Token::Hash { text, .. } if text == "#pair" => {
          let first = parser.parse_datum()?;
          let rest = parser.parse_datum()?;
          Ok(Some(KelpValue::cons(first, rest)))
      }
      _ => Ok(None),
  });

  let mut ctx = KelpContext::new().with_reader(reader);
  let value = ctx.eval_string("(car '#pair 1 2)").unwrap();
  assert_eq!(value.to_string(), "1");
  ```
*/

/*!
## Next steps

1. Values in _Kelp_ are represented in rust as [`KelpValue`](KelpValue)s.
   The enum implements methods for inspecting and converting values.

1. [`KelpContext`](KelpContext) tracks the state of the interpreter and
   provides methods for executing _Kelp_ programs.

1. [`KelpContext::add_function`](KelpContext::add_function) registers plain
   Rust functions and closures, converting their arguments and return values.

1. The [`builtin`] module lists the functions and macros every interpreter
   starts with.
*/

mod macros;

pub mod builtin;

mod cons;
pub use cons::{BaseIter, Pair, Position, Span, list_length, list_to_vec, list_with_tail};

mod context;
pub use context::{Arity, KelpCallable, KelpContext, Primitive, Rest};

mod error;
pub use error::{Error, ErrorKind};

mod eval;
pub use eval::{Closure, apply, eval, eval_expr};

mod expand;
pub use expand::{Macro, expand};

mod number;
pub use number::Number;

mod parse;
pub use parse::{Delimiter, Parser, QuoteKind, Reader, SyntaxRule, Token, syntax_error};

mod port;
pub use port::{InputPort, OutputPort, ReaderPort, StringOutputPort, StringPort, WriterPort};

mod printer;

mod scope;
pub use scope::Scope;

mod value;
pub use value::{Custom, FromValue, KelpValue, Symbol};

mod vector;
pub use vector::Vector;

#[cfg(test)]
mod test_utils;

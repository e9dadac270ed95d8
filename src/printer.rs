use std::collections::HashSet;
use std::fmt::{self, Write};
use std::rc::Rc;

use crate::{KelpValue, cons::Pair};

/// `Display` renders strings raw; `Write` renders them quoted and escaped so
/// that the output can be read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Display,
    Write,
}

/// Renders values into any `fmt::Write` sink.
///
/// Lists are walked iteratively along their `rest` chain.  A pair or vector
/// that is already being printed further up is rendered as `...`, so cyclic
/// structures terminate.
pub(crate) struct Printer<'a, W: Write> {
    out: &'a mut W,
    mode: Mode,
    active: HashSet<usize>,
}

impl<'a, W: Write> Printer<'a, W> {
    pub(crate) fn new(out: &'a mut W, mode: Mode) -> Self {
        Printer {
            out,
            mode,
            active: HashSet::new(),
        }
    }

    pub(crate) fn print(&mut self, value: &KelpValue) -> fmt::Result {
        match value {
            KelpValue::Void => self.out.write_str("#v"),
            KelpValue::Bool(true) => self.out.write_str("#t"),
            KelpValue::Bool(false) => self.out.write_str("#f"),
            KelpValue::Number(number) => write!(self.out, "{}", number),
            KelpValue::String(string) => match self.mode {
                Mode::Display => self.out.write_str(string),
                Mode::Write => self.write_escaped(string),
            },
            KelpValue::Symbol(symbol) => self.out.write_str(symbol.name()),
            KelpValue::Pair(pair) => self.print_list(pair),
            KelpValue::EmptyList => self.out.write_str("()"),
            KelpValue::Vector(vector) => {
                let addr = vector.addr();
                if !self.active.insert(addr) {
                    return self.out.write_str("...");
                }
                let items = vector.items().clone();
                self.out.write_str("#(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        self.out.write_char(' ')?;
                    }
                    self.print(item)?;
                }
                self.active.remove(&addr);
                self.out.write_char(')')
            }
            KelpValue::Closure(closure) => {
                self.out.write_str("#<closure ")?;
                self.print(closure.params())?;
                self.out.write_char('>')
            }
            KelpValue::Primitive(primitive) => write!(self.out, "#<primitive {}>", primitive.name()),
            KelpValue::Macro(_) => self.out.write_str("#<macro>"),
            KelpValue::Custom(custom) => write!(
                self.out,
                "#<{}: {:p}>",
                custom.tag(),
                Rc::as_ptr(custom)
            ),
            KelpValue::Error(err) => {
                write!(self.out, "{}: ", err.kind_ref())?;
                self.print(err.message())
            }
            KelpValue::Environment(_) => self.out.write_str("#<environment>"),
            KelpValue::InputPort(_) => self.out.write_str("#<input-port>"),
            KelpValue::OutputPort(_) => self.out.write_str("#<output-port>"),
            KelpValue::Eof => self.out.write_str("#eof-object"),
        }
    }

    fn print_list(&mut self, head: &Rc<Pair>) -> fmt::Result {
        let head_addr = Rc::as_ptr(head) as usize;
        if self.active.contains(&head_addr) {
            return self.out.write_str("...");
        }
        let mut entered = vec![];
        let mut current = head.clone();
        self.out.write_char('(')?;
        let result = loop {
            let addr = Rc::as_ptr(&current) as usize;
            self.active.insert(addr);
            entered.push(addr);
            self.print(&current.first())?;
            match current.rest() {
                KelpValue::EmptyList => break Ok(()),
                KelpValue::Pair(next) => {
                    if self.active.contains(&(Rc::as_ptr(&next) as usize)) {
                        break self.out.write_str(" . ...");
                    }
                    self.out.write_char(' ')?;
                    current = next;
                }
                tail => {
                    self.out.write_str(" . ")?;
                    break self.print(&tail);
                }
            }
        };
        for addr in entered {
            self.active.remove(&addr);
        }
        result?;
        self.out.write_char(')')
    }

    fn write_escaped(&mut self, string: &str) -> fmt::Result {
        self.out.write_char('"')?;
        for ch in string.chars() {
            match ch {
                '"' => self.out.write_str("\\\"")?,
                '\\' => self.out.write_str("\\\\")?,
                '\n' => self.out.write_str("\\n")?,
                '\t' => self.out.write_str("\\t")?,
                '\r' => self.out.write_str("\\r")?,
                ch if ch.is_control() && (ch as u32) < 0x100 => {
                    write!(self.out, "\\x{:02x}", ch as u32)?
                }
                ch => self.out.write_char(ch)?,
            }
        }
        self.out.write_char('"')
    }
}

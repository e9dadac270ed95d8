use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::rc::Rc;

use crate::{
    Error, KelpContext, KelpValue,
    port::{InputPort, OutputPort, ReaderPort, StringOutputPort, StringPort, WriterPort},
    value::Symbol,
};

fn input_port(port: impl InputPort + 'static) -> KelpValue {
    let port: Rc<RefCell<dyn InputPort>> = Rc::new(RefCell::new(port));
    KelpValue::InputPort(port)
}

fn output_port(port: impl OutputPort + 'static) -> KelpValue {
    let port: Rc<RefCell<dyn OutputPort>> = Rc::new(RefCell::new(port));
    KelpValue::OutputPort(port)
}

fn open_file(path: String, mode: Symbol) -> Result<KelpValue, Error> {
    let opened = |result: std::io::Result<File>| {
        result.map_err(|e| Error::system_error(format!("couldn't open {}: {}", path, e)))
    };
    match mode.name() {
        "read" => {
            let file = opened(File::open(&path))?;
            Ok(input_port(ReaderPort::new(BufReader::new(file))))
        }
        "write" => {
            let file = opened(File::create(&path))?;
            Ok(output_port(WriterPort::new(file)))
        }
        "append" => {
            let file = opened(OpenOptions::new().append(true).create(true).open(&path))?;
            Ok(output_port(WriterPort::new(file)))
        }
        _ => Err(Error::lisp_error(format!("wrong access token: {}", mode))),
    }
}

fn close_port(port: KelpValue) -> Result<(), Error> {
    match &port {
        KelpValue::InputPort(input) => input.borrow_mut().close(),
        KelpValue::OutputPort(output) => output.borrow_mut().close(),
        _ => Err(Error::type_error("port", &port)),
    }
}

pub(crate) fn add(ctx: &mut KelpContext) {
    ctx.add_function("open-input-string", |string: String| {
        input_port(StringPort::new(&string))
    });
    ctx.add_function("open-output-string", || output_port(StringOutputPort::new()));
    ctx.add_function(
        "get-output-string",
        |port: Rc<RefCell<dyn OutputPort>>| -> Result<String, Error> {
            port.borrow()
                .contents()
                .ok_or_else(|| Error::type_error("string output port", &KelpValue::OutputPort(port.clone())))
        },
    );
    ctx.add_function("open-file", open_file);

    ctx.add_function(
        "read-char",
        |port: Rc<RefCell<dyn InputPort>>| -> Result<KelpValue, Error> {
            Ok(match port.borrow_mut().read_char()? {
                Some(ch) => ch.to_string().into(),
                None => KelpValue::Eof,
            })
        },
    );
    ctx.add_function(
        "read-byte",
        |port: Rc<RefCell<dyn InputPort>>| -> Result<KelpValue, Error> {
            Ok(match port.borrow_mut().read_byte()? {
                Some(byte) => i64::from(byte).into(),
                None => KelpValue::Eof,
            })
        },
    );
    ctx.add_function(
        "read-line",
        |port: Rc<RefCell<dyn InputPort>>| -> Result<KelpValue, Error> {
            Ok(match port.borrow_mut().read_line()? {
                Some(line) => line.into(),
                None => KelpValue::Eof,
            })
        },
    );
    ctx.add_function("eof-object?", |object: KelpValue| object.is_eof());

    ctx.add_function(
        "write-string",
        |port: Rc<RefCell<dyn OutputPort>>, string: Rc<str>| -> Result<(), Error> {
            port.borrow_mut().write_str(&string)
        },
    );
    ctx.add_function(
        "write-byte",
        |port: Rc<RefCell<dyn OutputPort>>, byte: i64| -> Result<(), Error> {
            let byte = u8::try_from(byte).map_err(|_| Error::type_error("byte", &byte.into()))?;
            port.borrow_mut().write_byte(byte)
        },
    );
    ctx.add_function(
        "flush",
        |port: Rc<RefCell<dyn OutputPort>>| -> Result<(), Error> { port.borrow_mut().flush() },
    );
    ctx.add_function("close-port", close_port);

    let stdout = output_port(WriterPort::new(std::io::stdout()));
    ctx.add_function("current-output-port", move || stdout.clone());
}

#[cfg(test)]
mod tests {
    use crate::KelpContext;
    use crate::test_utils::{eval_assert, eval_assert_equal, eval_assert_error};

    #[test]
    fn test_string_ports() {
        let ctx = &mut KelpContext::new();
        eval_assert_equal(
            ctx,
            "(define in (open-input-string \"ab\\ncd\\n\"))
             (list (read-char in) (read-line in) (read-line in))",
            "'(\"a\" \"b\" \"cd\")",
        );
        eval_assert(ctx, "(eof-object? (read-line in))");
        eval_assert(ctx, "(eof-object? (read-char in))");
        eval_assert_equal(
            ctx,
            "(define out (open-output-string))
             (write-string out \"x\")
             (write-string out \"y\")
             (flush out)
             (get-output-string out)",
            "\"xy\"",
        );
        eval_assert_equal(ctx, "(close-port in)", "#v");
        eval_assert_error(ctx, "(read-char in)", "system-error: port closed");
        eval_assert_error(ctx, "(close-port 5)", "type-error: expecting port: 5");
        eval_assert(ctx, "(eq? (current-output-port) (current-output-port))");
    }

    #[test]
    fn test_byte_ports() {
        let ctx = &mut KelpContext::new();
        eval_assert_equal(
            ctx,
            "(define in (open-input-string \"Aé\"))
             (list (read-byte in) (read-byte in) (read-byte in))",
            "'(65 195 169)",
        );
        eval_assert(ctx, "(eof-object? (read-byte in))");
        eval_assert_equal(
            ctx,
            "(define out (open-output-string))
             (write-byte out 104)
             (write-byte out 195)
             (write-byte out 169)
             (get-output-string out)",
            "\"hé\"",
        );
        eval_assert_error(ctx, "(write-byte out 256)", "type-error: expecting byte: 256");
        eval_assert_error(ctx, "(write-byte out 'x)", "type-error: expecting fixnum: x");
        eval_assert_error(
            ctx,
            "(read-byte (open-output-string))",
            "type-error: expecting input-port: #<output-port>",
        );
    }

    #[test]
    fn test_file_ports() {
        let mut path = std::env::temp_dir();
        path.push(format!("kelp-ports-{}.txt", std::process::id()));
        let path = path.to_string_lossy().to_string();
        let ctx = &mut KelpContext::new();
        ctx.define("path", path.as_str());
        eval_assert_equal(
            ctx,
            "(define out (open-file path 'write))
             (display \"line one\" out)
             (write-string out \"\\n\")
             (close-port out)
             (define more (open-file path 'append))
             (write '(2 \"two\") more)
             (close-port more)
             (define in (open-file path 'read))
             (list (read-line in) (read in) (eof-object? (read in)))",
            "'(\"line one\" (2 \"two\") #t)",
        );
        std::fs::remove_file(&path).unwrap();
        eval_assert_error(
            ctx,
            "(open-file path 'sideways)",
            "error: wrong access token: sideways",
        );
    }
}

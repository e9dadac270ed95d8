use crate::{KelpValue, cons::Position, value::Symbol};

/// A macro for defining the `ErrorKind` enum, its lisp-visible kind symbols,
/// the `Display` implementation for it, and the constructors for the `Error`
/// struct.
macro_rules! ErrorKind {
    ($(
        ($kind:ident, $lisp_name:literal $(, $vis:vis $ctor:ident)?)
    ),* $(,)?) => {
        /// The kind of error that occurred.
        #[derive(Debug, Clone, PartialEq)]
        pub enum ErrorKind {
            $(
                #[doc = concat!("Raised with the `", $lisp_name, "` kind symbol.")]
                $kind,
            )*
            /// A user condition raised by `throw` with a kind symbol outside
            /// the builtin taxonomy.
            Thrown(Symbol),
        }

        impl ErrorKind {
            /// Maps a kind symbol back to its `ErrorKind`.  Unknown names
            /// become [`ErrorKind::Thrown`].
            pub fn from_symbol(symbol: &Symbol) -> ErrorKind {
                match symbol.name() {
                    $($lisp_name => ErrorKind::$kind,)*
                    _ => ErrorKind::Thrown(symbol.clone()),
                }
            }

            /// The symbol that lisp code sees as the kind of this error.
            pub fn symbol(&self) -> Symbol {
                match self {
                    $(Self::$kind => Symbol::new($lisp_name),)*
                    Self::Thrown(symbol) => symbol.clone(),
                }
            }
        }

        impl std::fmt::Display for ErrorKind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$kind => f.write_str($lisp_name),)*
                    Self::Thrown(symbol) => f.write_str(symbol.name()),
                }
            }
        }

        /// Constructors for [`Error`].
        impl Error {
            $(
                $(
                #[doc = concat!(
                    "Creates a new [`Error`] with the `",
                    $lisp_name,
                    "` kind and the given message."
                )]
                $vis fn $ctor(message: impl Into<KelpValue>) -> crate::error::Error {
                    Self::new(ErrorKind::$kind, message)
                }
                )?
            )*
        }
    };
}

ErrorKind!(
    (TypeError,     "type-error"),
    (ArgumentError, "argument-error"),
    (SystemError,   "system-error", pub system_error),
    (SyntaxError,   "syntax-error", pub syntax_error),
    (Error,         "error",        pub lisp_error),
);

/// Represents an error raised while reading, expanding or evaluating.
///
/// Errors carry a kind, a message payload that can be any value, and the
/// list of forms they propagated through.  Use [format](crate::Error::format)
/// to produce a report including the source spans of those forms.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: KelpValue,
    position: Option<Position>,
    backtrace: Vec<KelpValue>,
}

impl Error {
    /// Creates an error of the given kind with a message payload.
    pub fn new(kind: ErrorKind, message: impl Into<KelpValue>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: None,
            backtrace: vec![],
        }
    }

    /// A value did not have the shape an operation required.
    pub fn type_error(expected: &str, object: &KelpValue) -> Self {
        Self::new(
            ErrorKind::TypeError,
            format!("expecting {}: {}", expected, object.to_write_string()),
        )
    }

    /// A function was called with the wrong number of arguments.
    pub fn argument_error(function: &dyn std::fmt::Display, args: &[KelpValue]) -> Self {
        let args: KelpValue = args.iter().cloned().collect();
        Self::new(
            ErrorKind::ArgumentError,
            format!(
                "wrong number of arguments to {}: {}",
                function,
                args.to_write_string()
            ),
        )
    }

    /// The condition raised by the `throw` primitive.
    pub fn thrown(kind: Symbol, message: KelpValue) -> Self {
        Self::new(ErrorKind::from_symbol(&kind), message)
    }

    /// Attaches the stream position a syntax error was detected at.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Adds a form to the error's backtrace.
    pub fn with_trace(mut self, form: KelpValue) -> Self {
        if self.backtrace.last().is_some_and(|last| last.eq(&form)) {
            return self;
        }
        self.backtrace.push(form);
        self
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind.clone()
    }

    pub(crate) fn kind_ref(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the message payload.
    pub fn message(&self) -> &KelpValue {
        &self.message
    }

    /// Returns the message rendered in display form.
    pub fn desc(&self) -> String {
        self.message.to_string()
    }

    /// The reader position, for syntax errors.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Turns the error into a first-class value.
    pub fn into_value(self) -> KelpValue {
        KelpValue::Error(std::rc::Rc::new(self))
    }

    /// Formats the error into a human-readable report, including the
    /// source spans of the forms it propagated through.
    pub fn format(&self) -> String {
        let mut out = format!("ERR {}", self);
        if let Some(position) = self.position {
            out.push_str(&format!(" (at {}.{})", position.line, position.column));
        }
        for form in &self.backtrace {
            let Some(span) = form.span() else {
                continue;
            };
            let string = form.to_write_string().replace('\n', "\\n");
            let prefix = format!(
                "{}.{}-{}.{}:",
                span.start.0, span.start.1, span.end.0, span.end.1
            );
            if string.len() > 80 {
                out.push_str(&format!("\n{}  at {:.80}...", prefix, string));
            } else {
                out.push_str(&format!("\n{}  at {}", prefix, string));
            }
        }
        out + "\n"
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::system_error(err.to_string())
    }
}

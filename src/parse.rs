use std::cell::RefCell;
use std::rc::Rc;

use num_bigint::BigInt;

use crate::{
    Error, KelpValue,
    cons::{Position, Span, list_with_tail},
    port::{InputPort, StringPort},
    vector::Vector,
};

/// The two bracket shapes that delimit lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Paren,
    Bracket,
}

/// The prefix characters that abbreviate a two-element list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    Quote,
    Quasiquote,
    Unquote,
    UnquoteSplicing,
}

impl QuoteKind {
    pub fn symbol_name(&self) -> &'static str {
        match self {
            QuoteKind::Quote => "quote",
            QuoteKind::Quasiquote => "quasiquote",
            QuoteKind::Unquote => "unquote",
            QuoteKind::UnquoteSplicing => "unquote-splicing",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Open { delimiter: Delimiter, span: Span },
    Close { delimiter: Delimiter, span: Span },
    /// `#(`
    VectorOpen { span: Span },
    Dot { span: Span },
    Quote { kind: QuoteKind, span: Span },
    Integer { text: String, span: Span },
    Float { text: String, span: Span },
    String { value: String, span: Span },
    Symbol { name: String, span: Span },
    /// `#` followed by a run of symbol characters, e.g. `#t` or `#x1f`.
    Hash { text: String, span: Span },
}

impl Token {
    pub fn span(&self) -> Span {
        match self {
            Token::Open { span, .. }
            | Token::Close { span, .. }
            | Token::VectorOpen { span }
            | Token::Dot { span }
            | Token::Quote { span, .. }
            | Token::Integer { span, .. }
            | Token::Float { span, .. }
            | Token::String { span, .. }
            | Token::Symbol { span, .. }
            | Token::Hash { span, .. } => *span,
        }
    }
}

/// A syntax error detected at `position`.
pub fn syntax_error(position: Position, desc: &str) -> Error {
    Error::syntax_error(format!("failed to parse ({}): {}", position, desc)).with_position(position)
}

fn span_start(span: Span) -> Position {
    Position::new(span.start.0, span.start.1)
}

fn is_terminator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '(' | ')' | '[' | ']' | '"' | ';' | '\'' | '`' | ',')
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit())
}

fn is_float(text: &str) -> bool {
    match text.split_once('.') {
        Some((whole, fraction)) => {
            is_integer(whole)
                && !fraction.is_empty()
                && fraction.chars().all(|ch| ch.is_ascii_digit())
        }
        None => false,
    }
}

struct Tokenizer<'a> {
    port: &'a mut dyn InputPort,
}

impl Tokenizer<'_> {
    fn single(&mut self, start: Position) -> Result<Span, Error> {
        self.port.read_char()?;
        Ok(Span::new(start, self.port.position()))
    }

    fn read_run(&mut self) -> Result<String, Error> {
        let mut run = String::new();
        while let Some(ch) = self.port.peek_char()? {
            if is_terminator(ch) {
                break;
            }
            run.push(ch);
            self.port.read_char()?;
        }
        Ok(run)
    }

    fn read_hex(&mut self, start: Position, text: &str) -> Result<char, Error> {
        u32::from_str_radix(text, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| syntax_error(start, &format!("invalid escape code {}", text)))
    }

    fn read_string(&mut self, start: Position) -> Result<Token, Error> {
        self.port.read_char()?;
        let mut value = String::new();
        loop {
            let escape_start = self.port.position();
            let Some(ch) = self.port.read_char()? else {
                return Err(syntax_error(start, "unterminated string"));
            };
            match ch {
                '"' => break,
                '\\' => {
                    let Some(escaped) = self.port.read_char()? else {
                        return Err(syntax_error(start, "unterminated string"));
                    };
                    let out = match escaped {
                        'a' => '\x07',
                        'b' => '\x08',
                        'f' => '\x0c',
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        'v' => '\x0b',
                        '0' => '\0',
                        '\\' | '"' | '\'' => escaped,
                        'x' => {
                            let mut digits = String::new();
                            for _ in 0..2 {
                                if let Some(digit) = self.port.read_char()? {
                                    digits.push(digit);
                                }
                            }
                            self.read_hex(escape_start, &digits)?
                        }
                        'u' => {
                            if self.port.read_char()? != Some('{') {
                                return Err(syntax_error(escape_start, "expected { after \\u"));
                            }
                            let mut digits = String::new();
                            loop {
                                match self.port.read_char()? {
                                    Some('}') => break,
                                    Some(digit) => digits.push(digit),
                                    None => return Err(syntax_error(start, "unterminated string")),
                                }
                            }
                            self.read_hex(escape_start, &digits)?
                        }
                        other => {
                            return Err(syntax_error(
                                escape_start,
                                &format!("unknown escape \\{}", other),
                            ));
                        }
                    };
                    value.push(out);
                }
                ch => value.push(ch),
            }
        }
        Ok(Token::String {
            value,
            span: Span::new(start, self.port.position()),
        })
    }

    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        loop {
            let start = self.port.position();
            let Some(ch) = self.port.peek_char()? else {
                return Ok(None);
            };
            let token = match ch {
                ch if ch.is_whitespace() => {
                    self.port.read_char()?;
                    continue;
                }
                ';' => {
                    while !matches!(self.port.read_char()?, Some('\n') | None) {}
                    continue;
                }
                '(' | '[' => {
                    let delimiter = if ch == '(' { Delimiter::Paren } else { Delimiter::Bracket };
                    Token::Open { delimiter, span: self.single(start)? }
                }
                ')' | ']' => {
                    let delimiter = if ch == ')' { Delimiter::Paren } else { Delimiter::Bracket };
                    Token::Close { delimiter, span: self.single(start)? }
                }
                '\'' => Token::Quote { kind: QuoteKind::Quote, span: self.single(start)? },
                '`' => Token::Quote { kind: QuoteKind::Quasiquote, span: self.single(start)? },
                ',' => {
                    self.port.read_char()?;
                    let kind = if self.port.peek_char()? == Some('@') {
                        self.port.read_char()?;
                        QuoteKind::UnquoteSplicing
                    } else {
                        QuoteKind::Unquote
                    };
                    Token::Quote { kind, span: Span::new(start, self.port.position()) }
                }
                '"' => self.read_string(start)?,
                '#' => {
                    self.port.read_char()?;
                    if self.port.peek_char()? == Some('(') {
                        self.port.read_char()?;
                        Token::VectorOpen { span: Span::new(start, self.port.position()) }
                    } else {
                        let text = format!("#{}", self.read_run()?);
                        Token::Hash { text, span: Span::new(start, self.port.position()) }
                    }
                }
                _ => {
                    let text = self.read_run()?;
                    let span = Span::new(start, self.port.position());
                    if text == "." {
                        Token::Dot { span }
                    } else if is_integer(&text) {
                        Token::Integer { text, span }
                    } else if is_float(&text) {
                        Token::Float { text, span }
                    } else {
                        Token::Symbol { name: text, span }
                    }
                }
            };
            return Ok(Some(token));
        }
    }
}

/// A grammar alternative.  Returns `Ok(None)` when it does not apply to the
/// token, so that the next alternative is tried.
pub type SyntaxRule = dyn Fn(&Token, &mut Parser<'_>) -> Result<Option<KelpValue>, Error>;

type BuiltinRule = fn(&Token, &mut Parser<'_>) -> Result<Option<KelpValue>, Error>;

const BUILTIN_RULES: &[BuiltinRule] = &[
    parse_atom,
    parse_paren_list,
    parse_bracket_list,
    parse_vector,
    parse_quote,
    parse_hash_constant,
];

/// Parses one datum at a time from a port.  Handed to syntax rules so they
/// can read nested data.
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    extensions: Rc<[Rc<SyntaxRule>]>,
}

impl Parser<'_> {
    pub fn next_token(&mut self) -> Result<Option<Token>, Error> {
        self.tokenizer.next_token()
    }

    /// The position of the next unread character.
    pub fn position(&self) -> Position {
        self.tokenizer.port.position()
    }

    /// Reads a complete datum.  Running out of input is a syntax error.
    pub fn parse_datum(&mut self) -> Result<KelpValue, Error> {
        match self.next_token()? {
            Some(token) => self.parse_token(token),
            None => Err(syntax_error(self.position(), "unexpected end of input")),
        }
    }

    /// Tries each grammar alternative in order on a token that was already
    /// read.
    pub fn parse_token(&mut self, token: Token) -> Result<KelpValue, Error> {
        let extensions = self.extensions.clone();
        for rule in extensions.iter() {
            if let Some(value) = rule(&token, self)? {
                return Ok(value);
            }
        }
        for rule in BUILTIN_RULES {
            if let Some(value) = rule(&token, self)? {
                return Ok(value);
            }
        }
        let start = span_start(token.span());
        Err(match token {
            Token::Close { .. } => syntax_error(start, "unexpected closing delimiter"),
            Token::Dot { .. } => syntax_error(start, "unexpected dot"),
            Token::Hash { text, .. } => syntax_error(start, &format!("unknown hash syntax {}", text)),
            _ => syntax_error(start, "no rule matches"),
        })
    }

    /// Reads data up to the closing `delimiter`, with an optional dotted
    /// tail.  Returns the elements, the tail and the span from `open`.
    fn parse_sequence(
        &mut self,
        delimiter: Delimiter,
        open: Span,
        allow_dot: bool,
    ) -> Result<(Vec<KelpValue>, KelpValue, Span), Error> {
        let mut items = vec![];
        let start = span_start(open);
        loop {
            let Some(token) = self.next_token()? else {
                return Err(syntax_error(start, "unterminated list"));
            };
            match token {
                Token::Close { delimiter: close, span } => {
                    if close != delimiter {
                        return Err(syntax_error(span_start(span), "mismatched closing delimiter"));
                    }
                    let span = Span { start: open.start, end: span.end };
                    return Ok((items, KelpValue::EmptyList, span));
                }
                Token::Dot { span } if allow_dot => {
                    if items.is_empty() {
                        return Err(syntax_error(span_start(span), "unexpected dot"));
                    }
                    let tail = self.parse_datum()?;
                    return match self.next_token()? {
                        Some(Token::Close { delimiter: close, span }) if close == delimiter => {
                            let span = Span { start: open.start, end: span.end };
                            Ok((items, tail, span))
                        }
                        Some(token) => Err(syntax_error(
                            span_start(token.span()),
                            "expected closing delimiter after dotted tail",
                        )),
                        None => Err(syntax_error(start, "unterminated list")),
                    };
                }
                token => items.push(self.parse_token(token)?),
            }
        }
    }

    fn parse_list(&mut self, delimiter: Delimiter, open: Span) -> Result<KelpValue, Error> {
        let (items, tail, span) = self.parse_sequence(delimiter, open, true)?;
        let list = list_with_tail(items, tail);
        if let KelpValue::Pair(pair) = &list {
            pair.set_span(Some(span));
        }
        Ok(list)
    }
}

fn parse_atom(token: &Token, parser: &mut Parser<'_>) -> Result<Option<KelpValue>, Error> {
    let value = match token {
        Token::Integer { text, .. } => match text.parse::<i64>() {
            Ok(fixnum) => fixnum.into(),
            Err(_) => match text.parse::<BigInt>() {
                Ok(bignum) => bignum.into(),
                Err(_) => return Err(syntax_error(parser.position(), "invalid integer")),
            },
        },
        Token::Float { text, span } => match text.parse::<f64>() {
            Ok(flonum) => flonum.into(),
            Err(_) => return Err(syntax_error(span_start(*span), "invalid float")),
        },
        Token::String { value, .. } => KelpValue::string(value),
        Token::Symbol { name, .. } => KelpValue::symbol(name),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn parse_paren_list(token: &Token, parser: &mut Parser<'_>) -> Result<Option<KelpValue>, Error> {
    match token {
        Token::Open { delimiter: Delimiter::Paren, span } => {
            parser.parse_list(Delimiter::Paren, *span).map(Some)
        }
        _ => Ok(None),
    }
}

fn parse_bracket_list(token: &Token, parser: &mut Parser<'_>) -> Result<Option<KelpValue>, Error> {
    match token {
        Token::Open { delimiter: Delimiter::Bracket, span } => {
            parser.parse_list(Delimiter::Bracket, *span).map(Some)
        }
        _ => Ok(None),
    }
}

fn parse_vector(token: &Token, parser: &mut Parser<'_>) -> Result<Option<KelpValue>, Error> {
    let Token::VectorOpen { span } = token else {
        return Ok(None);
    };
    let (items, _, _) = parser.parse_sequence(Delimiter::Paren, *span, false)?;
    Ok(Some(Vector::new(items).into()))
}

fn parse_quote(token: &Token, parser: &mut Parser<'_>) -> Result<Option<KelpValue>, Error> {
    let Token::Quote { kind, span } = token else {
        return Ok(None);
    };
    let datum = match parser.next_token()? {
        Some(token) => parser.parse_token(token)?,
        None => {
            return Err(syntax_error(
                span_start(*span),
                &format!("unexpected end of input after {}", kind.symbol_name()),
            ));
        }
    };
    let list = list_with_tail(
        vec![KelpValue::symbol(kind.symbol_name()), datum],
        KelpValue::EmptyList,
    );
    if let KelpValue::Pair(pair) = &list {
        pair.set_span(Some(Span::new(span_start(*span), parser.position())));
    }
    Ok(Some(list))
}

fn parse_hash_constant(token: &Token, _: &mut Parser<'_>) -> Result<Option<KelpValue>, Error> {
    let Token::Hash { text, .. } = token else {
        return Ok(None);
    };
    Ok(match text.as_str() {
        "#t" => Some(KelpValue::Bool(true)),
        "#f" => Some(KelpValue::Bool(false)),
        "#v" => Some(KelpValue::Void),
        _ => None,
    })
}

/// The reader: turns characters from a port into data.
///
/// The grammar is an ordered choice of rules.  Rules added with
/// [`register`](Reader::register) are tried first, in the order they were
/// added, followed by the builtin rules for atoms, parenthesised lists,
/// bracketed lists, vectors, the quote family and the `#t`/`#f`/`#v`
/// constants.
#[derive(Default)]
pub struct Reader {
    extensions: RefCell<Vec<Rc<SyntaxRule>>>,
}

impl Reader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a grammar alternative.  Must happen before reading begins.
    pub fn register(
        &self,
        rule: impl Fn(&Token, &mut Parser<'_>) -> Result<Option<KelpValue>, Error> + 'static,
    ) {
        self.extensions.borrow_mut().push(Rc::new(rule));
    }

    /// Replaces this reader's grammar alternatives with those of `other`.
    pub fn install(&self, other: Reader) {
        *self.extensions.borrow_mut() = other.extensions.into_inner();
    }

    /// Reads one datum.  Returns [`KelpValue::Eof`] if the port holds nothing
    /// but whitespace and comments.
    pub fn read(&self, port: &mut dyn InputPort) -> Result<KelpValue, Error> {
        let mut parser = Parser {
            tokenizer: Tokenizer { port },
            extensions: Rc::from(self.extensions.borrow().as_slice()),
        };
        match parser.next_token()? {
            Some(token) => parser.parse_token(token),
            None => Ok(KelpValue::Eof),
        }
    }

    /// Reads data until the port is exhausted.
    pub fn read_all(&self, port: &mut dyn InputPort) -> Result<Vec<KelpValue>, Error> {
        let mut data = vec![];
        loop {
            match self.read(port)? {
                KelpValue::Eof => return Ok(data),
                datum => data.push(datum),
            }
        }
    }

    /// Reads the first datum of a string.
    pub fn read_str(&self, input: &str) -> Result<KelpValue, Error> {
        self.read(&mut StringPort::new(input))
    }
}

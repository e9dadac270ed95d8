use std::collections::VecDeque;
use std::io::{BufRead, BufWriter, Write};

use crate::{Error, cons::Position};

fn port_closed() -> Error {
    Error::system_error("port closed")
}

fn mid_character() -> Error {
    Error::system_error("port is inside a multi-byte character")
}

fn queue_char(pending: &mut VecDeque<u8>, ch: char) {
    let mut encoded = [0; 4];
    pending.extend(ch.encode_utf8(&mut encoded).as_bytes());
}

/// A source of characters for the reader and the port primitives.
pub trait InputPort {
    fn read_char(&mut self) -> Result<Option<char>, Error>;

    fn peek_char(&mut self) -> Result<Option<char>, Error>;

    /// Reads the next byte of the UTF-8 encoded input.  Characters are not
    /// available again until every byte of a partly read one is consumed.
    fn read_byte(&mut self) -> Result<Option<u8>, Error>;

    /// Reads up to the next newline, which is consumed but not returned.
    fn read_line(&mut self) -> Result<Option<String>, Error> {
        let mut line = String::new();
        loop {
            match self.read_char()? {
                Some('\n') => return Ok(Some(line)),
                Some(ch) => line.push(ch),
                None if line.is_empty() => return Ok(None),
                None => return Ok(Some(line)),
            }
        }
    }

    fn is_eof(&mut self) -> Result<bool, Error> {
        Ok(self.peek_char()?.is_none())
    }

    fn close(&mut self) -> Result<(), Error>;

    /// The position of the next character.
    fn position(&self) -> Position;
}

/// A sink for characters.
pub trait OutputPort {
    fn write_str(&mut self, string: &str) -> Result<(), Error>;

    fn write_byte(&mut self, byte: u8) -> Result<(), Error>;

    fn flush(&mut self) -> Result<(), Error>;

    fn close(&mut self) -> Result<(), Error>;

    /// Everything written so far, for ports that accumulate their output.
    fn contents(&self) -> Option<String> {
        None
    }
}

fn advance(position: &mut Position, ch: char) {
    if ch == '\n' {
        position.line += 1;
        position.column = 1;
    } else {
        position.column += 1;
    }
}

/// Reads from an in-memory string.
pub struct StringPort {
    chars: Vec<char>,
    index: usize,
    pending: VecDeque<u8>,
    position: Position,
    closed: bool,
}

impl StringPort {
    pub fn new(input: &str) -> Self {
        StringPort {
            chars: input.chars().collect(),
            index: 0,
            pending: VecDeque::new(),
            position: Position::new(1, 1),
            closed: false,
        }
    }
}

impl InputPort for StringPort {
    fn read_char(&mut self) -> Result<Option<char>, Error> {
        let next = self.peek_char()?;
        if let Some(ch) = next {
            self.index += 1;
            advance(&mut self.position, ch);
        }
        Ok(next)
    }

    fn peek_char(&mut self) -> Result<Option<char>, Error> {
        if self.closed {
            return Err(port_closed());
        }
        if !self.pending.is_empty() {
            return Err(mid_character());
        }
        Ok(self.chars.get(self.index).copied())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Error> {
        if self.pending.is_empty() {
            match self.read_char()? {
                Some(ch) => queue_char(&mut self.pending, ch),
                None => return Ok(None),
            }
        }
        Ok(self.pending.pop_front())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.closed = true;
        self.pending.clear();
        Ok(())
    }

    fn position(&self) -> Position {
        self.position
    }
}

/// Reads from any buffered reader, one line at a time.
pub struct ReaderPort<R: BufRead> {
    reader: Option<R>,
    buffer: VecDeque<char>,
    pending: VecDeque<u8>,
    position: Position,
}

impl<R: BufRead> ReaderPort<R> {
    pub fn new(reader: R) -> Self {
        ReaderPort {
            reader: Some(reader),
            buffer: VecDeque::new(),
            pending: VecDeque::new(),
            position: Position::new(1, 1),
        }
    }

    fn fill(&mut self) -> Result<(), Error> {
        let Some(reader) = self.reader.as_mut() else {
            return Err(port_closed());
        };
        if !self.pending.is_empty() {
            return Err(mid_character());
        }
        if self.buffer.is_empty() {
            let mut line = String::new();
            reader.read_line(&mut line)?;
            self.buffer.extend(line.chars());
        }
        Ok(())
    }
}

impl<R: BufRead> InputPort for ReaderPort<R> {
    fn read_char(&mut self) -> Result<Option<char>, Error> {
        self.fill()?;
        let next = self.buffer.pop_front();
        if let Some(ch) = next {
            advance(&mut self.position, ch);
        }
        Ok(next)
    }

    fn peek_char(&mut self) -> Result<Option<char>, Error> {
        self.fill()?;
        Ok(self.buffer.front().copied())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Error> {
        if self.pending.is_empty() {
            match self.read_char()? {
                Some(ch) => queue_char(&mut self.pending, ch),
                None => return Ok(None),
            }
        }
        Ok(self.pending.pop_front())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.reader = None;
        self.buffer.clear();
        self.pending.clear();
        Ok(())
    }

    fn position(&self) -> Position {
        self.position
    }
}

/// Writes to any `io::Write`.
pub struct WriterPort<W: Write> {
    writer: Option<BufWriter<W>>,
}

impl<W: Write> WriterPort<W> {
    pub fn new(writer: W) -> Self {
        WriterPort {
            writer: Some(BufWriter::new(writer)),
        }
    }
}

impl<W: Write> OutputPort for WriterPort<W> {
    fn write_str(&mut self, string: &str) -> Result<(), Error> {
        let writer = self.writer.as_mut().ok_or_else(port_closed)?;
        writer.write_all(string.as_bytes())?;
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        let writer = self.writer.as_mut().ok_or_else(port_closed)?;
        writer.write_all(&[byte])?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        let writer = self.writer.as_mut().ok_or_else(port_closed)?;
        writer.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Accumulates output in memory.
#[derive(Default)]
pub struct StringOutputPort {
    buffer: String,
    pending: Vec<u8>,
    closed: bool,
}

impl StringOutputPort {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputPort for StringOutputPort {
    fn write_str(&mut self, string: &str) -> Result<(), Error> {
        if self.closed {
            return Err(port_closed());
        }
        if !self.pending.is_empty() {
            return Err(mid_character());
        }
        self.buffer.push_str(string);
        Ok(())
    }

    /// Bytes are held back until they complete a UTF-8 character.
    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        if self.closed {
            return Err(port_closed());
        }
        self.pending.push(byte);
        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                self.buffer.push_str(text);
                self.pending.clear();
                Ok(())
            }
            Err(err) if err.error_len().is_none() => Ok(()),
            Err(_) => {
                self.pending.clear();
                Err(Error::lisp_error("invalid utf-8 byte sequence"))
            }
        }
    }

    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.closed = true;
        Ok(())
    }

    fn contents(&self) -> Option<String> {
        Some(self.buffer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_port_positions() {
        let mut port = StringPort::new("ab\nc");
        assert_eq!(port.read_char().unwrap(), Some('a'));
        assert_eq!(port.peek_char().unwrap(), Some('b'));
        assert_eq!(port.read_line().unwrap().as_deref(), Some("b"));
        assert_eq!(port.position(), Position::new(2, 1));
        assert_eq!(port.read_char().unwrap(), Some('c'));
        assert_eq!(port.read_char().unwrap(), None);
        port.close().unwrap();
        assert_eq!(
            port.read_char().unwrap_err().to_string(),
            "system-error: port closed"
        );
    }

    #[test]
    fn test_byte_reads() {
        let mut port = StringPort::new("aé");
        assert_eq!(port.read_byte().unwrap(), Some(b'a'));
        assert_eq!(port.read_byte().unwrap(), Some(0xc3));
        assert_eq!(
            port.read_char().unwrap_err().to_string(),
            "system-error: port is inside a multi-byte character"
        );
        assert_eq!(port.read_byte().unwrap(), Some(0xa9));
        assert_eq!(port.read_byte().unwrap(), None);

        let mut port = ReaderPort::new("é!".as_bytes());
        assert_eq!(port.read_byte().unwrap(), Some(0xc3));
        assert_eq!(port.read_byte().unwrap(), Some(0xa9));
        assert_eq!(port.read_char().unwrap(), Some('!'));
        assert_eq!(port.read_byte().unwrap(), None);
    }

    #[test]
    fn test_reader_port() {
        let mut port = ReaderPort::new("héllo\nworld".as_bytes());
        assert_eq!(port.read_line().unwrap().as_deref(), Some("héllo"));
        assert_eq!(port.read_line().unwrap().as_deref(), Some("world"));
        assert_eq!(port.read_line().unwrap(), None);
    }

    #[test]
    fn test_output_ports() {
        let mut port = StringOutputPort::new();
        port.write_str("abc").unwrap();
        assert_eq!(port.contents().as_deref(), Some("abc"));
        port.write_byte(0xc3).unwrap();
        assert!(port.write_str("x").is_err());
        port.write_byte(0xa9).unwrap();
        assert_eq!(port.contents().as_deref(), Some("abcé"));
        assert_eq!(
            port.write_byte(0xff).unwrap_err().to_string(),
            "error: invalid utf-8 byte sequence"
        );
        port.close().unwrap();
        assert!(port.write_str("d").is_err());

        let mut sink = vec![];
        {
            let mut port = WriterPort::new(&mut sink);
            port.write_str("xyz").unwrap();
            port.write_byte(0).unwrap();
            port.close().unwrap();
        }
        assert_eq!(sink, b"xyz\0");
    }
}

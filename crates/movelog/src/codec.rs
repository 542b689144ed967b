#![forbid(unsafe_code)]

//! Plain-text save format for a [`MoveLog`].
//!
//! # Grammar
//!
//! ```text
//! log    := token* "." EOL
//! token  := move | mark | "c"
//! move   := int "," int "," int        (id, direction, slice mask)
//! mark   := "m" <any single char>
//! int    := ws* "-"? digit+
//! ```
//!
//! Tokens are separated by whitespace. The writer puts a line break after
//! every [`tokens_per_line`](crate::MoveLogConfig::tokens_per_line) tokens
//! and a space otherwise:
//!
//! ```text
//! 1,1,-1 30,-1,2 m| 100,1,1.
//! ```
//!
//! Only applied entries are written; the pending tail is never saved.
//!
//! The `c` token marks the cursor position: the entry following it becomes
//! the cursor once reading finishes. The writer never produces it (the
//! pending tail is not saved, so the cursor is always at the end of what
//! was written) but the reader accepts it.
//!
//! # Failure Modes
//!
//! - **Malformed input**: any bad token, missing separator or early end of
//!   stream aborts the read. The log is cleared and a [`ReadError`] with the
//!   byte offset is returned; no partial log is left behind.
//! - **Corrupt chain on write**: the chain is sanity-checked before writing
//!   and a violation panics, since it means the log itself is broken.

use std::io::{self, BufRead, Write};

use crate::error::ReadError;
use crate::log::MoveLog;
use crate::node::{Direction, Entry, Move, MoveId, SliceMask};

impl MoveLog {
    /// Write the applied entries to `writer` in the save format.
    ///
    /// # Panics
    ///
    /// Panics if the chain fails [`check_sanity`](Self::check_sanity).
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let _span = tracing::debug_span!("movelog.write").entered();
        self.assert_sane();

        let per_line = self.config.tokens_per_line.max(1);
        let eol = self.config.line_ending.as_str();
        let mut written = 0usize;
        let mut entries = self.applied().peekable();
        while let Some(entry) = entries.next() {
            match entry {
                Entry::Move(mv) => write!(writer, "{mv}")?,
                Entry::Mark(mark) => write!(writer, "m{mark}")?,
            }
            written += 1;
            if entries.peek().is_some() {
                if written % per_line == 0 {
                    writer.write_all(eol.as_bytes())?;
                } else {
                    writer.write_all(b" ")?;
                }
            }
        }
        write!(writer, ".{eol}")?;
        writer.flush()?;

        tracing::debug!(target: "movelog", tokens = written, "log written");
        Ok(())
    }

    /// The save-format text of the applied entries.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut buf = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Replace the contents of this log with the one read from `reader`.
    ///
    /// The log is cleared first. On error it is cleared again, so it is
    /// either fully loaded or empty. Entries are stored exactly as written:
    /// an inverse pair that survived in the saved log is not cancelled on the
    /// way back in. Listeners fire once.
    pub fn read<R: BufRead>(&mut self, reader: R) -> Result<(), ReadError> {
        let _span = tracing::debug_span!("movelog.read").entered();
        let layers = self.config.layers;
        self.clear_step(layers);

        let mut scanner = Scanner::new(reader);
        let result = self.read_entries(&mut scanner);
        match result {
            Ok(cursor_index) => {
                let cursor = cursor_index.and_then(|index| self.chain.nth(index));
                self.seat(cursor);
                tracing::debug!(
                    target: "movelog",
                    entries = self.chain.len(),
                    bytes = scanner.offset,
                    "log read"
                );
            }
            Err(ref e) => {
                tracing::warn!(
                    target: "movelog",
                    offset = e.offset(),
                    error = %e,
                    "malformed move log, clearing"
                );
                self.clear_step(layers);
            }
        }
        self.mark_cursor_moved();
        self.settle();
        result.map(|_| ())
    }

    /// [`read`](Self::read) from a string.
    pub fn read_str(&mut self, text: &str) -> Result<(), ReadError> {
        self.read(text.as_bytes())
    }

    /// Parse tokens up to the terminator. Returns the chain index recorded by
    /// a `c` token, if any.
    fn read_entries<R: BufRead>(
        &mut self,
        scanner: &mut Scanner<R>,
    ) -> Result<Option<usize>, ReadError> {
        let mut cursor_index = None;
        loop {
            scanner.skip_whitespace()?;
            let offset = scanner.offset;
            let Some(byte) = scanner.peek()? else {
                return Err(ReadError::UnexpectedEof { offset });
            };
            match byte {
                b'.' => {
                    scanner.bump();
                    return Ok(cursor_index);
                }
                b'0'..=b'9' => {
                    let mv = read_move(scanner)?;
                    self.chain.insert_before(None, Entry::Move(mv.normalized()));
                }
                b'm' => {
                    scanner.bump();
                    let mark = scanner.read_char()?;
                    self.mark(mark);
                }
                b'c' => {
                    scanner.bump();
                    cursor_index = Some(self.chain.len());
                }
                _ => {
                    let found = scanner.read_char().unwrap_or(char::REPLACEMENT_CHARACTER);
                    return Err(ReadError::UnexpectedChar { found, offset });
                }
            }
        }
    }
}

fn read_move<R: BufRead>(scanner: &mut Scanner<R>) -> Result<Move, ReadError> {
    let id_offset = scanner.offset;
    let id = u32::try_from(scanner.read_int()?)
        .map_err(|_| ReadError::InvalidNumber { offset: id_offset })?;
    scanner.expect_separator()?;

    scanner.skip_whitespace()?;
    let direction_offset = scanner.offset;
    let raw_direction = scanner.read_int()?;
    let direction = i32::try_from(raw_direction)
        .ok()
        .and_then(Direction::from_i32)
        .ok_or(ReadError::InvalidDirection {
            value: i32::try_from(raw_direction).unwrap_or(i32::MAX),
            offset: direction_offset,
        })?;
    scanner.expect_separator()?;

    scanner.skip_whitespace()?;
    let mask_offset = scanner.offset;
    let slices = i32::try_from(scanner.read_int()?)
        .map_err(|_| ReadError::InvalidNumber { offset: mask_offset })?;

    Ok(Move::new(MoveId::new(id), direction, SliceMask(slices)))
}

/// Whitespace as the save format understands it.
const fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c | 0x1c..=0x1f)
}

/// Byte-level reader with one byte of lookahead and offset tracking.
struct Scanner<R> {
    reader: R,
    offset: u64,
}

impl<R: BufRead> Scanner<R> {
    fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    fn peek(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn bump(&mut self) {
        self.reader.consume(1);
        self.offset += 1;
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = self.peek()?;
        if byte.is_some() {
            self.bump();
        }
        Ok(byte)
    }

    fn skip_whitespace(&mut self) -> io::Result<()> {
        while let Some(byte) = self.peek()? {
            if !is_space(byte) {
                break;
            }
            self.bump();
        }
        Ok(())
    }

    fn expect_separator(&mut self) -> Result<(), ReadError> {
        let offset = self.offset;
        match self.peek()? {
            Some(b',') => {
                self.bump();
                Ok(())
            }
            Some(_) => Err(ReadError::ExpectedSeparator {
                found: Some(self.read_char().unwrap_or(char::REPLACEMENT_CHARACTER)),
                offset,
            }),
            None => Err(ReadError::ExpectedSeparator { found: None, offset }),
        }
    }

    /// Read an optionally negative decimal integer, skipping leading
    /// whitespace.
    fn read_int(&mut self) -> Result<i64, ReadError> {
        self.skip_whitespace()?;
        let offset = self.offset;
        let negative = self.peek()? == Some(b'-');
        if negative {
            self.bump();
        }

        let mut value: i64 = 0;
        let mut digits = 0usize;
        while let Some(byte @ b'0'..=b'9') = self.peek()? {
            self.bump();
            digits += 1;
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(byte - b'0')))
                .filter(|v| *v <= i64::from(u32::MAX))
                .ok_or(ReadError::InvalidNumber { offset })?;
        }
        if digits == 0 {
            return Err(ReadError::InvalidNumber { offset });
        }
        Ok(if negative { -value } else { value })
    }

    /// Read one UTF-8 encoded character.
    fn read_char(&mut self) -> Result<char, ReadError> {
        let offset = self.offset;
        let Some(lead) = self.next_byte()? else {
            return Err(ReadError::UnexpectedEof { offset });
        };
        let width = match lead {
            0x00..=0x7f => 1,
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => return Err(ReadError::InvalidMark { offset }),
        };
        let mut buf = [lead, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            match self.next_byte()? {
                Some(byte) => *slot = byte,
                None => return Err(ReadError::UnexpectedEof { offset: self.offset }),
            }
        }
        std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or(ReadError::InvalidMark { offset })
    }
}

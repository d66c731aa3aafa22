//! Pull-based character sources for the streaming lexer.

use std::io::{self, Read};
use std::str::Chars;

/// Default size of the byte buffer used by [`Utf8Source`].
const DEFAULT_CAPACITY: usize = 8 * 1024;

/// A source that hands out one character per call.
///
/// `Ok(None)` means clean end of input. An `Err` is a genuine read failure;
/// callers treat it as terminal.
pub trait CharSource {
    fn next_char(&mut self) -> io::Result<Option<char>>;
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        (**self).next_char()
    }
}

impl<S: CharSource + ?Sized> CharSource for Box<S> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        (**self).next_char()
    }
}

/// Infallible source over an in-memory string.
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    chars: Chars<'a>,
}

impl<'a> StrSource<'a> {
    /// Create a source handing out the characters of `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
        }
    }

    /// The part of the text not pulled yet.
    pub fn remaining(&self) -> &'a str {
        self.chars.as_str()
    }
}

impl<'a> From<&'a str> for StrSource<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text)
    }
}

impl CharSource for StrSource<'_> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        Ok(self.chars.next())
    }
}

/// Decodes UTF-8 characters from any byte reader.
///
/// Bytes are read in blocks into an internal buffer. A multi-byte character
/// split across two reads is held back until its remaining bytes arrive.
/// Invalid UTF-8, or a sequence cut off by the end of input, is reported as
/// [`io::ErrorKind::InvalidData`].
///
/// # Example
///
/// ```
/// use trex::{CharSource, Utf8Source};
///
/// let mut source = Utf8Source::new("día".as_bytes());
/// assert_eq!(source.next_char().unwrap(), Some('d'));
/// assert_eq!(source.next_char().unwrap(), Some('í'));
/// assert_eq!(source.next_char().unwrap(), Some('a'));
/// assert_eq!(source.next_char().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct Utf8Source<R> {
    reader: R,
    buffer: Box<[u8]>,
    start: usize,
    end: usize,
}

impl<R: Read> Utf8Source<R> {
    /// Create a source with the default 8 KiB buffer.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, reader)
    }

    /// Create a source with a buffer of `capacity` bytes (at least 4, the
    /// longest UTF-8 sequence).
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            reader,
            buffer: vec![0; capacity.max(4)].into_boxed_slice(),
            start: 0,
            end: 0,
        }
    }

    /// Number of bytes read but not yet decoded.
    pub fn pending_bytes(&self) -> usize {
        self.end - self.start
    }

    /// Unwrap the reader. Buffered bytes are discarded.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Move the undecoded tail to the front and read more after it.
    ///
    /// `Interrupted` reads are retried, as [`Read::read_exact`] does.
    fn fill(&mut self) -> io::Result<usize> {
        self.buffer.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;

        loop {
            match self.reader.read(&mut self.buffer[self.end..]) {
                Ok(read) => {
                    self.end += read;
                    return Ok(read);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

impl<R: Read> CharSource for Utf8Source<R> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        loop {
            let pending = &self.buffer[self.start..self.end];

            if let Some(&first) = pending.first() {
                let len = sequence_len(first).ok_or_else(|| {
                    invalid_data(format!("invalid UTF-8 lead byte 0x{first:02X}"))
                })?;

                if pending.len() >= len {
                    let ch = std::str::from_utf8(&pending[..len])
                        .ok()
                        .and_then(|s| s.chars().next())
                        .ok_or_else(|| invalid_data("invalid UTF-8 sequence".to_string()))?;
                    self.start += len;
                    return Ok(Some(ch));
                }
            }

            let had_pending = self.pending_bytes() > 0;
            if self.fill()? == 0 {
                return if had_pending {
                    Err(invalid_data(
                        "incomplete UTF-8 sequence at end of input".to_string(),
                    ))
                } else {
                    Ok(None)
                };
            }
        }
    }
}

/// Length of the UTF-8 sequence started by `first`, or `None` for a byte that
/// cannot start one (continuation or invalid byte).
fn sequence_len(first: u8) -> Option<usize> {
    match first {
        0x00..=0x7F => Some(1),
        // 2-byte sequence: 110xxxxx
        0xC0..=0xDF => Some(2),
        // 3-byte sequence: 1110xxxx
        0xE0..=0xEF => Some(3),
        // 4-byte sequence: 11110xxx
        0xF0..=0xF7 => Some(4),
        _ => None,
    }
}

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

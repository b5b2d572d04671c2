//! Whitespace tokenizer for hostname input files.
//!
//! Fields are separated by any run of C `isspace` bytes. A field longer than
//! [`MAX_TOKEN_LEN`] bytes is cut into consecutive tokens of that size.

use std::io::{self, BufRead};
use std::mem;

/// Longest hostname token handed to the queue, in bytes.
pub const MAX_TOKEN_LEN: usize = 1024;

#[inline]
fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Iterator over the hostname tokens of a reader.
///
/// Yields `Err` at most once, after which the iterator is exhausted.
pub struct Tokens<R> {
    reader: R,
    token: Vec<u8>,
    done: bool,
}

/// Splits `reader` into hostname tokens.
pub fn tokens<R: BufRead>(reader: R) -> Tokens<R> {
    Tokens {
        reader,
        token: Vec::with_capacity(64),
        done: false,
    }
}

impl<R> Tokens<R> {
    fn take_token(&mut self) -> Option<io::Result<String>> {
        if self.token.is_empty() {
            return None;
        }
        let bytes = mem::take(&mut self.token);
        let token = String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
        Some(Ok(token))
    }
}

impl<R: BufRead> Iterator for Tokens<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    self.token.clear();
                    return Some(Err(e));
                }
            };

            if buf.is_empty() {
                self.done = true;
                return self.take_token();
            }

            let mut used = 0;
            let mut complete = false;
            for &byte in buf {
                if is_space(byte) {
                    used += 1;
                    if !self.token.is_empty() {
                        complete = true;
                        break;
                    }
                } else if self.token.len() == MAX_TOKEN_LEN {
                    // Leave the byte for the next token.
                    complete = true;
                    break;
                } else {
                    self.token.push(byte);
                    used += 1;
                }
            }
            self.reader.consume(used);

            if complete {
                return self.take_token();
            }
        }
    }
}

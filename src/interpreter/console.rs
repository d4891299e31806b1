//! Readers behind the `input` statement.

use log::debug;
use std::io::{self, BufRead};

/// Reads the next whitespace-delimited token and parses it as an integer.
/// Leading blank lines are skipped. A missing or malformed token reads as 0.
/// Only the token itself is consumed; the rest of its line stays buffered.
pub fn read_int<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<i32> {
    let mut token = Vec::new();
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }

        let mut used = 0;
        let mut done = false;
        for &byte in buf {
            if byte.is_ascii_whitespace() {
                if !token.is_empty() {
                    done = true;
                    break;
                }
            } else {
                token.push(byte);
            }
            used += 1;
        }
        reader.consume(used);
        if done {
            break;
        }
    }

    Ok(std::str::from_utf8(&token)
        .ok()
        .and_then(|text| text.parse::<i32>().ok())
        .unwrap_or(0))
}

/// Reads the rest of the current line without its terminator. End of input,
/// a failed read and bytes that are not UTF-8 never fail the program: the
/// first two read as the empty string, the last is decoded lossily.
pub fn read_line<R: BufRead + ?Sized>(reader: &mut R) -> String {
    let mut bytes = Vec::new();
    if let Err(e) = reader.read_until(b'\n', &mut bytes) {
        debug!("string input failed: {}", e);
        return String::new();
    }
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_int_tokens() {
        let mut input = Cursor::new("  42\n\n -7 x9 ");
        assert_eq!(read_int(&mut input).unwrap(), 42);
        assert_eq!(read_int(&mut input).unwrap(), -7);
        assert_eq!(read_int(&mut input).unwrap(), 0);
        assert_eq!(read_int(&mut input).unwrap(), 0);
    }

    #[test]
    fn test_read_int_leaves_rest_of_line() {
        let mut input = Cursor::new("5\nhello\n");
        assert_eq!(read_int(&mut input).unwrap(), 5);
        assert_eq!(read_line(&mut input), "");
        assert_eq!(read_line(&mut input), "hello");
    }

    #[test]
    fn test_read_line() {
        let mut input = Cursor::new("first line\r\nsecond");
        assert_eq!(read_line(&mut input), "first line");
        assert_eq!(read_line(&mut input), "second");
        assert_eq!(read_line(&mut input), "");
    }

    #[test]
    fn test_read_line_invalid_utf8() {
        let mut input = Cursor::new(&b"ok\xff\n\xfe"[..]);
        assert_eq!(read_line(&mut input), "ok\u{fffd}");
        assert_eq!(read_line(&mut input), "\u{fffd}");
    }
}

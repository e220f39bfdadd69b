//! ASCIIHexDecode implementation.
//!
//! Whitespace is ignored, `>` ends the data, and a trailing odd digit is
//! padded with an implicit `0`.

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};

/// ASCIIHexDecode filter implementation.
pub struct AsciiHexDecoder;

impl StreamDecoder for AsciiHexDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len() / 2);
        let mut high: Option<u8> = None;

        for &c in input {
            if c == b'>' {
                break;
            }
            if c.is_ascii_whitespace() || c == 0 {
                continue;
            }
            let nibble = hex_value(c).ok_or_else(|| {
                Error::Decode(format!("ASCIIHexDecode: invalid hex digit '{}'", c as char))
            })?;
            match high.take() {
                Some(h) => output.push((h << 4) | nibble),
                None => high = Some(nibble),
            }
        }
        if let Some(h) = high {
            output.push(h << 4);
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        "ASCIIHexDecode"
    }
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_hex_with_whitespace() {
        let output = AsciiHexDecoder.decode(b"48 65\n6C 6C 6F>").unwrap();
        assert_eq!(output, b"Hello");
    }

    #[test]
    fn test_ascii_hex_odd_length() {
        let output = AsciiHexDecoder.decode(b"ABC>").unwrap();
        assert_eq!(output, vec![0xAB, 0xC0]);
    }

    #[test]
    fn test_ascii_hex_stops_at_eod() {
        let output = AsciiHexDecoder.decode(b"FF>zz").unwrap();
        assert_eq!(output, vec![0xFF]);
    }

    #[test]
    fn test_ascii_hex_invalid_digit() {
        assert!(AsciiHexDecoder.decode(b"4G").is_err());
    }
}

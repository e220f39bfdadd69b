//! RunLengthDecode implementation.
//!
//! - Length byte 0-127: copy the next N+1 bytes literally
//! - Length byte 128: end of data
//! - Length byte 129-255: repeat the next byte 257-N times

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};

/// RunLengthDecode filter implementation.
pub struct RunLengthDecoder;

impl StreamDecoder for RunLengthDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut rest = input;

        while let Some((&length, tail)) = rest.split_first() {
            match length {
                0..=127 => {
                    let count = length as usize + 1;
                    if tail.len() < count {
                        return Err(Error::Decode(format!(
                            "RunLengthDecode: literal run needs {} bytes, {} left",
                            count,
                            tail.len()
                        )));
                    }
                    output.extend_from_slice(&tail[..count]);
                    rest = &tail[count..];
                },
                128 => break,
                129..=255 => {
                    let (&byte, tail) = tail
                        .split_first()
                        .ok_or_else(|| Error::Decode("RunLengthDecode: missing byte for run".into()))?;
                    output.resize(output.len() + 257 - length as usize, byte);
                    rest = tail;
                },
            }
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        "RunLengthDecode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runlength_literal_and_repeat() {
        let input = [2, b'a', b'b', b'c', 254, b'z', 128, 5];
        let output = RunLengthDecoder.decode(&input).unwrap();
        assert_eq!(output, b"abczzz");
    }

    #[test]
    fn test_runlength_short_literal() {
        assert!(RunLengthDecoder.decode(&[4, b'a']).is_err());
    }

    #[test]
    fn test_runlength_missing_repeat_byte() {
        assert!(RunLengthDecoder.decode(&[200]).is_err());
    }
}

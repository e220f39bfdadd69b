//! FlateDecode (zlib/deflate) implementation.

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use std::io::Read;

/// FlateDecode filter implementation.
///
/// Image streams are frequently truncated by a few bytes, so any data
/// recovered before a decompression error is kept.
pub struct FlateDecoder;

impl StreamDecoder for FlateDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        match ZlibDecoder::new(input).read_to_end(&mut output) {
            Ok(_) => Ok(output),
            Err(e) if !output.is_empty() => {
                log::warn!(
                    "FlateDecode partial recovery: {} bytes before corruption: {}",
                    output.len(),
                    e
                );
                Ok(output)
            },
            Err(e) => {
                // Some producers omit the zlib wrapper.
                log::debug!("Zlib decode failed ({}), trying raw deflate", e);
                output.clear();
                match DeflateDecoder::new(input).read_to_end(&mut output) {
                    Ok(_) => Ok(output),
                    Err(_) if !output.is_empty() => Ok(output),
                    Err(raw_err) => Err(Error::Decode(format!("FlateDecode: {}", raw_err))),
                }
            },
        }
    }

    fn name(&self) -> &str {
        "FlateDecode"
    }
}

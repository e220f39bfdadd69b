//! DCTDecode (JPEG) implementation.
//!
//! JPEG data is decoded to interleaved samples in the stream's own colour
//! model so that it can be streamed row by row like any other filtered
//! image: one byte per pixel for grayscale, three for RGB and four for CMYK.

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};
use jpeg_decoder::{Decoder, PixelFormat};

/// DCTDecode filter implementation.
pub struct DctDecoder;

impl StreamDecoder for DctDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = Decoder::new(input);
        let pixels = decoder
            .decode()
            .map_err(|e| Error::Decode(format!("DCTDecode: {}", e)))?;
        if let Some(info) = decoder.info() {
            let channels = match info.pixel_format {
                PixelFormat::L8 => 1,
                PixelFormat::L16 => 2,
                PixelFormat::RGB24 => 3,
                PixelFormat::CMYK32 => 4,
            };
            log::trace!(
                "DCTDecode {}x{}, {} bytes per pixel",
                info.width,
                info.height,
                channels
            );
        }
        Ok(pixels)
    }

    fn name(&self) -> &str {
        "DCTDecode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dct_rejects_non_jpeg() {
        assert!(DctDecoder.decode(b"not a jpeg").is_err());
    }

    #[test]
    fn test_dct_decoder_name() {
        assert_eq!(DctDecoder.name(), "DCTDecode");
    }
}

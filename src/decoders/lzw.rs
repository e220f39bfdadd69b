//! LZWDecode implementation.
//!
//! PDF LZW is MSB-first with 9-bit initial codes and switches code width one
//! code early (EarlyChange=1), which is the TIFF convention in `weezl`.

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};
use weezl::{decode::Decoder as WeezlDecoder, BitOrder};

/// LZWDecode filter implementation.
pub struct LzwDecoder;

impl StreamDecoder for LzwDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = WeezlDecoder::with_tiff_size_switch(BitOrder::Msb, 8);
        decoder
            .decode(input)
            .map_err(|e| Error::Decode(format!("LZWDecode error: {:?}", e)))
    }

    fn name(&self) -> &str {
        "LZWDecode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weezl::encode::Encoder;

    #[test]
    fn test_lzw_roundtrip_samples() {
        let original: Vec<u8> = (0..=255u8).cycle().take(1024).collect();
        let compressed = Encoder::with_tiff_size_switch(BitOrder::Msb, 8)
            .encode(&original)
            .unwrap();
        assert_eq!(LzwDecoder.decode(&compressed).unwrap(), original);
    }

    #[test]
    fn test_lzw_name() {
        assert_eq!(LzwDecoder.name(), "LZWDecode");
    }
}

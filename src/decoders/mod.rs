//! Stream filters applied before image samples reach the compositor.
//!
//! Supported filters:
//! - FlateDecode (`Fl`) with PNG/TIFF predictors
//! - LZWDecode (`LZW`)
//! - ASCIIHexDecode (`AHx`)
//! - RunLengthDecode (`RL`)
//! - DCTDecode (`DCT`), decoded through `jpeg-decoder` in the stream's colour model
//!
//! JPXDecode is recognised but not decoded; only its header is scanned (see
//! [`crate::images::jpx`]).

use crate::config::RenderOptions;
use crate::error::{Error, Result};
use crate::object::{Dict, Object};

mod ascii_hex;
mod dct;
mod flate;
mod lzw;
mod predictor;
mod runlength;

pub use ascii_hex::AsciiHexDecoder;
pub use dct::DctDecoder;
pub use flate::FlateDecoder;
pub use lzw::LzwDecoder;
pub use predictor::{apply_predictor, DecodeParams};
pub use runlength::RunLengthDecoder;

/// PDF stream filter types handled by the painting core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// FlateDecode (deflate/zlib compression)
    FlateDecode,
    /// LZWDecode (Lempel-Ziv-Welch compression)
    LZWDecode,
    /// ASCIIHexDecode (hexadecimal encoding)
    ASCIIHexDecode,
    /// RunLengthDecode (run-length encoding)
    RunLengthDecode,
    /// DCTDecode (JPEG compression)
    DCTDecode,
    /// JPXDecode (JPEG 2000), header scan only
    JPXDecode,
}

impl Filter {
    /// Parse a full or inline-abbreviated filter name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "FlateDecode" | "Fl" => Some(Filter::FlateDecode),
            "LZWDecode" | "LZW" => Some(Filter::LZWDecode),
            "ASCIIHexDecode" | "AHx" => Some(Filter::ASCIIHexDecode),
            "RunLengthDecode" | "RL" => Some(Filter::RunLengthDecode),
            "DCTDecode" | "DCT" => Some(Filter::DCTDecode),
            "JPXDecode" => Some(Filter::JPXDecode),
            _ => None,
        }
    }

    fn decoder(self) -> Result<Box<dyn StreamDecoder>> {
        Ok(match self {
            Filter::FlateDecode => Box::new(FlateDecoder),
            Filter::LZWDecode => Box::new(LzwDecoder),
            Filter::ASCIIHexDecode => Box::new(AsciiHexDecoder),
            Filter::RunLengthDecode => Box::new(RunLengthDecoder),
            Filter::DCTDecode => Box::new(DctDecoder),
            Filter::JPXDecode => return Err(Error::UnsupportedFilter("JPXDecode".to_string())),
        })
    }
}

/// Trait for PDF stream decoders.
pub trait StreamDecoder {
    /// Decode the input data.
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Get the name of this decoder (e.g., "FlateDecode").
    fn name(&self) -> &str;
}

/// Filter names from a `/Filter` (or inline `/F`) value.
pub fn filter_names(filter: Option<&Object>) -> Vec<String> {
    match filter {
        Some(Object::Name(name)) => vec![name.clone()],
        Some(Object::Array(arr)) => arr
            .iter()
            .filter_map(|obj| obj.as_name().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Decode `data` through the filter chain named in `dict`.
///
/// Both full (`Filter`, `DecodeParms`) and inline (`F`, `DP`) keys are
/// honoured. Predictor parameters apply to the filter they accompany.
pub fn decode_with_dict(data: &[u8], dict: &Dict, options: &RenderOptions) -> Result<Vec<u8>> {
    let names = filter_names(dict.get("Filter").or_else(|| dict.get("F")));
    let params = dict.get("DecodeParms").or_else(|| dict.get("DP"));

    let mut current = data.to_vec();
    for (index, name) in names.iter().enumerate() {
        let filter = Filter::from_name(name).ok_or_else(|| Error::UnsupportedFilter(name.clone()))?;
        current = filter.decoder()?.decode(&current)?;

        if options.max_decompressed_size > 0 && current.len() > options.max_decompressed_size {
            return Err(Error::Decode(format!(
                "decoded size {} bytes exceeds limit {} bytes",
                current.len(),
                options.max_decompressed_size
            )));
        }

        if matches!(filter, Filter::FlateDecode | Filter::LZWDecode) {
            if let Some(p) = params_at(params, index).map(DecodeParams::from_dict) {
                current = apply_predictor(&current, &p)?;
            }
        }
    }
    Ok(current)
}

/// Decode a stream object's payload.
pub fn decode_stream_object(obj: &Object, options: &RenderOptions) -> Result<Vec<u8>> {
    match obj {
        Object::Stream { dict, data } => decode_with_dict(data, dict, options),
        other => Err(Error::type_check("Stream", other)),
    }
}

fn params_at(params: Option<&Object>, index: usize) -> Option<&Dict> {
    match params? {
        Object::Dictionary(d) if index == 0 => Some(d),
        Object::Array(items) => items.get(index).and_then(Object::as_dict),
        _ => None,
    }
}

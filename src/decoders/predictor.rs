//! PNG and TIFF predictors for FlateDecode and LZWDecode image data.

use crate::error::{Error, Result};
use crate::object::Dict;

/// Predictor parameters taken from `/DecodeParms`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeParams {
    /// Predictor algorithm (1 = none, 2 = TIFF, 10-15 = PNG)
    pub predictor: i64,
    /// Samples per row
    pub columns: usize,
    /// Components per sample
    pub colors: usize,
    /// Bits per component
    pub bits_per_component: usize,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            columns: 1,
            colors: 1,
            bits_per_component: 8,
        }
    }
}

impl DecodeParams {
    /// Read predictor parameters, defaulting absent entries.
    pub fn from_dict(dict: &Dict) -> Self {
        let int = |key: &str, default: i64| dict.get(key).and_then(|o| o.as_integer()).unwrap_or(default);
        Self {
            predictor: int("Predictor", 1),
            columns: int("Columns", 1).max(1) as usize,
            colors: int("Colors", 1).max(1) as usize,
            bits_per_component: int("BitsPerComponent", 8).max(1) as usize,
        }
    }

    /// Bytes of sample data per row, excluding any PNG tag byte.
    pub fn row_bytes(&self) -> usize {
        (self.columns * self.colors * self.bits_per_component).div_ceil(8)
    }

    /// Distance in bytes to the corresponding byte of the previous pixel.
    fn pixel_stride(&self) -> usize {
        (self.colors * self.bits_per_component).div_ceil(8).max(1)
    }
}

/// Reverse a predictor, returning the raw sample rows.
pub fn apply_predictor(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    match params.predictor {
        1 => Ok(data.to_vec()),
        2 => undo_tiff(data, params),
        10..=15 => undo_png(data, params),
        other => Err(Error::Decode(format!("Unsupported predictor: {}", other))),
    }
}

fn undo_tiff(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    if params.bits_per_component != 8 {
        return Err(Error::Decode(format!(
            "TIFF predictor with {} bits per component",
            params.bits_per_component
        )));
    }
    let row_len = params.row_bytes();
    let mut output = data.to_vec();
    for row in output.chunks_mut(row_len) {
        for i in params.colors..row.len() {
            row[i] = row[i].wrapping_add(row[i - params.colors]);
        }
    }
    Ok(output)
}

fn undo_png(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    let row_len = params.row_bytes();
    let stride = params.pixel_stride();
    let mut output = Vec::with_capacity(data.len());
    let mut previous = vec![0u8; row_len];

    for encoded in data.chunks(row_len + 1) {
        let (&tag, samples) = match encoded.split_first() {
            Some(split) => split,
            None => break,
        };
        let mut row = samples.to_vec();
        row.resize(row_len, 0);

        for i in 0..row_len {
            let left = if i >= stride { row[i - stride] } else { 0 };
            let up = previous[i];
            let upper_left = if i >= stride { previous[i - stride] } else { 0 };
            row[i] = match tag {
                0 => row[i],
                1 => row[i].wrapping_add(left),
                2 => row[i].wrapping_add(up),
                3 => row[i].wrapping_add(((left as u16 + up as u16) / 2) as u8),
                4 => row[i].wrapping_add(paeth(left, up, upper_left)),
                other => return Err(Error::Decode(format!("Invalid PNG predictor tag {}", other))),
            };
        }

        output.extend_from_slice(&row);
        previous = row;
    }

    Ok(output)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

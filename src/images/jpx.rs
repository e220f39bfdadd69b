//! JPEG 2000 (JP2) header scanning.
//!
//! Only the `jp2h` header box is examined: component count and bit depth
//! from `ihdr`, overrides from `bpcc` and `pclr`, and the colour
//! specification from the first `colr` box. The codestream itself is
//! never decoded.
//!
//! The scanner never fails. A malformed header yields an empty
//! [`JpxInfo`] and a diagnostic, and the image falls back to what its
//! dictionary declares.

use crate::diagnostics::{Diagnostics, Warnings};
use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom};

type BoxType = [u8; 4];

const BOX_HEADER: BoxType = *b"jp2h";
const BOX_IMAGE_HEADER: BoxType = *b"ihdr";
const BOX_BITS_PER_COMPONENT: BoxType = *b"bpcc";
const BOX_COLOUR_SPECIFICATION: BoxType = *b"colr";
const BOX_PALETTE: BoxType = *b"pclr";
const BOX_CHANNEL_DEFINITION: BoxType = *b"cdef";

const BOX_HEADER_LEN: u64 = 8;
const IMAGE_HEADER_LEN: u64 = 14;

/// Bit depth byte meaning "components differ, see bpcc".
const BPC_UNSPECIFIED: u32 = 255;

/// Colour specification found in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JpxColor {
    /// No `colr` box, or an unknown method
    #[default]
    Unspecified,
    /// Method 1: enumerated colour space id
    Enumerated(u32),
    /// Methods 2 and 3: an embedded ICC profile, located relative to the
    /// start of the scanned data
    Icc {
        /// Byte offset of the profile
        offset: u64,
        /// Profile length in bytes
        length: u64,
    },
}

/// What the header scan recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JpxInfo {
    /// Number of components (`ihdr` NC)
    pub components: u16,
    /// Bits per component, after `bpcc`/`pclr` overrides
    pub bits_per_component: u32,
    /// Colour specification
    pub color: JpxColor,
}

impl JpxInfo {
    /// Whether the scan recovered nothing.
    pub fn is_empty(&self) -> bool {
        self.components == 0
    }

    /// Enumerated colour space id, zero when absent.
    pub fn enumerated_color(&self) -> u32 {
        match self.color {
            JpxColor::Enumerated(id) => id,
            _ => 0,
        }
    }
}

/// Scan the JP2 header in the next `length` bytes of `source`.
///
/// Problems are recorded in `diag` as [`Warnings::JPX_HEADER`] and never
/// escalate.
pub fn scan_jpx_header<R: Read + Seek>(source: &mut R, length: u64, diag: &mut Diagnostics) -> JpxInfo {
    match scan(source, length) {
        Ok(info) => {
            log::debug!(
                "JPX header: {} components, {} bpc, {:?}",
                info.components,
                info.bits_per_component,
                info.color
            );
            info
        },
        Err(e) => {
            diag.note(Warnings::JPX_HEADER, format!("Invalid JPX header ignored: {}", e));
            JpxInfo::default()
        },
    }
}

fn read_box_header<R: Read>(source: &mut R, avail: u64) -> Result<(u64, BoxType)> {
    if avail < BOX_HEADER_LEN {
        return Err(Error::LimitCheck(format!("{} bytes left, box header needs 8", avail)));
    }
    let len = source.read_u32::<BigEndian>()? as u64;
    if len < BOX_HEADER_LEN {
        return Err(Error::LimitCheck(format!("box length {}", len)));
    }
    let mut tag = [0u8; 4];
    source.read_exact(&mut tag)?;
    log::trace!("JPX box {:?} length {}", String::from_utf8_lossy(&tag), len);
    Ok((len - BOX_HEADER_LEN, tag))
}

fn scan<R: Read + Seek>(source: &mut R, length: u64) -> Result<JpxInfo> {
    let start = source.stream_position()?;
    let mut avail = length;

    // Skip top-level boxes up to the header box.
    let header_len = loop {
        let (len, tag) = read_box_header(source, avail)?;
        avail -= BOX_HEADER_LEN;
        if len == 0 || len > avail {
            return Err(Error::Syntax(format!("box length {} with {} bytes left", len + 8, avail)));
        }
        if tag == BOX_HEADER {
            break len;
        }
        source.seek(SeekFrom::Current(len as i64))?;
        avail -= len;
        if avail == 0 {
            return Err(Error::Syntax("no jp2h box".to_string()));
        }
    };

    // From here on only the header box's payload is considered.
    avail = header_len;
    let (len, tag) = read_box_header(source, avail)?;
    if tag != BOX_IMAGE_HEADER {
        return Err(Error::Syntax(format!(
            "jp2h starts with {:?}, not ihdr",
            String::from_utf8_lossy(&tag)
        )));
    }
    avail -= BOX_HEADER_LEN;
    if len != IMAGE_HEADER_LEN || len > avail {
        return Err(Error::Syntax(format!("ihdr payload of {} bytes", len)));
    }
    let mut ihdr = [0u8; IMAGE_HEADER_LEN as usize];
    source.read_exact(&mut ihdr)?;
    avail -= IMAGE_HEADER_LEN;

    let components = BigEndian::read_u16(&ihdr[8..10]);
    let mut bpc = ihdr[10] as u32;
    if bpc != BPC_UNSPECIFIED {
        bpc += 1;
    }

    let mut color = JpxColor::Unspecified;
    let mut got_color = false;

    while avail > 0 {
        let (len, tag) = read_box_header(source, avail)?;
        avail -= BOX_HEADER_LEN;
        if len == 0 || len > avail {
            return Err(Error::Syntax(format!("box length {} with {} bytes left", len + 8, avail)));
        }
        let mut data = vec![0u8; len as usize];
        source.read_exact(&mut data)?;
        avail -= len;

        match tag {
            BOX_BITS_PER_COMPONENT => {
                let first = data[0];
                if data.iter().take(components as usize).any(|d| *d != first) {
                    log::warn!("JPX image channels do not all have the same colour depth");
                }
                bpc = first as u32 + 1;
            },
            BOX_COLOUR_SPECIFICATION => {
                if got_color {
                    log::warn!("Extra JPX colr box ignored");
                    continue;
                }
                got_color = true;
                color = match data[0] {
                    1 if data.len() >= 7 => JpxColor::Enumerated(BigEndian::read_u32(&data[3..7])),
                    1 => return Err(Error::Syntax(format!("colr box of {} bytes", len))),
                    2 | 3 if data.len() >= 3 => {
                        let end = source.stream_position()? - start;
                        JpxColor::Icc {
                            offset: end - (len - 3),
                            length: len - 3,
                        }
                    },
                    method => {
                        log::debug!("JPX colr method {} not understood", method);
                        JpxColor::Unspecified
                    },
                };
            },
            BOX_PALETTE => {
                let Some(depth) = data.get(3) else {
                    return Err(Error::Syntax(format!("pclr box of {} bytes", len)));
                };
                bpc = (*depth as u32 & 0x7) + 1;
            },
            BOX_CHANNEL_DEFINITION => log::debug!("JPX cdef box not supported"),
            _ => {},
        }
    }

    Ok(JpxInfo {
        components,
        bits_per_component: bpc,
        color,
    })
}

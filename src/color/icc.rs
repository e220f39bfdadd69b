//! ICC profile handles.
//!
//! Profile decoding proper belongs to a colour management module. The
//! painting core only needs to know how many components a profile expects
//! and whether it can transform a sample at all, which the header and tag
//! table answer.

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;

const HEADER_SIZE: usize = 128;
const MAGIC_OFFSET: usize = 36;
const MAGIC: u32 = 0x6163_7370; // 'acsp'
const DATA_SPACE_OFFSET: usize = 16;
const TAG_COUNT_OFFSET: usize = 128;
const TAG_ENTRY_SIZE: usize = 12;
const MAX_TAG_COUNT: u32 = 1024;

const GRAY_SIGNATURE: u32 = 0x4752_4159; // 'GRAY'
const RGB_SIGNATURE: u32 = 0x5247_4220; // 'RGB '
const CMYK_SIGNATURE: u32 = 0x434D_594B; // 'CMYK'
const LAB_SIGNATURE: u32 = 0x4C61_6220; // 'Lab '
const XYZ_SIGNATURE: u32 = 0x5859_5A20; // 'XYZ '
const YCBCR_SIGNATURE: u32 = 0x5943_6272; // 'YCbr'
const HSV_SIGNATURE: u32 = 0x4853_5620; // 'HSV '
const HLS_SIGNATURE: u32 = 0x484C_5320; // 'HLS '
const CMY_SIGNATURE: u32 = 0x434D_5920; // 'CMY '

const TAG_A2B0: u32 = 0x4132_4230;
const TAG_A2B1: u32 = 0x4132_4231;
const TAG_A2B2: u32 = 0x4132_4232;
const TAG_KTRC: u32 = 0x6B54_5243;
const RGB_MATRIX_TAGS: [u32; 6] = [
    0x7258_595A, // rXYZ
    0x6758_595A, // gXYZ
    0x6258_595A, // bXYZ
    0x7254_5243, // rTRC
    0x6754_5243, // gTRC
    0x6254_5243, // bTRC
];

/// Data colour space declared in a profile header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IccDataSpace {
    /// 'GRAY'
    Gray,
    /// 'RGB '
    Rgb,
    /// 'CMYK'
    Cmyk,
    /// 'Lab '
    Lab,
    /// 'XYZ '
    Xyz,
    /// Other three-channel spaces (YCbCr, HSV, HLS, CMY)
    OtherThree(u32),
    /// 'nCLR' with n in 2..=15
    NChannel(usize),
    /// Anything else
    Unknown(u32),
}

impl IccDataSpace {
    fn from_signature(sig: u32) -> Self {
        match sig {
            GRAY_SIGNATURE => IccDataSpace::Gray,
            RGB_SIGNATURE => IccDataSpace::Rgb,
            CMYK_SIGNATURE => IccDataSpace::Cmyk,
            LAB_SIGNATURE => IccDataSpace::Lab,
            XYZ_SIGNATURE => IccDataSpace::Xyz,
            YCBCR_SIGNATURE | HSV_SIGNATURE | HLS_SIGNATURE | CMY_SIGNATURE => {
                IccDataSpace::OtherThree(sig)
            },
            _ => {
                // '2CLR' .. 'FCLR'
                let [n, c, l, r] = sig.to_be_bytes();
                let count = (n as char).to_digit(16).map(|d| d as usize);
                match (count, &[c, l, r]) {
                    (Some(count @ 2..=15), b"CLR") => IccDataSpace::NChannel(count),
                    _ => IccDataSpace::Unknown(sig),
                }
            },
        }
    }

    /// Intrinsic component count, zero when unknown.
    pub fn components(self) -> usize {
        match self {
            IccDataSpace::Gray => 1,
            IccDataSpace::Rgb | IccDataSpace::Lab | IccDataSpace::Xyz | IccDataSpace::OtherThree(_) => 3,
            IccDataSpace::Cmyk => 4,
            IccDataSpace::NChannel(n) => n,
            IccDataSpace::Unknown(_) => 0,
        }
    }
}

/// A loaded ICC profile.
#[derive(Debug, Clone, PartialEq)]
pub struct IccProfile {
    data: Bytes,
    data_space: IccDataSpace,
}

impl IccProfile {
    /// Parse the profile header.
    pub fn parse(data: Bytes) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::Syntax(format!(
                "ICC profile of {} bytes is shorter than its header",
                data.len()
            )));
        }
        let declared = BigEndian::read_u32(&data[0..4]) as usize;
        if declared > data.len() {
            return Err(Error::Syntax(format!(
                "ICC profile declares {} bytes but only {} are present",
                declared,
                data.len()
            )));
        }
        if BigEndian::read_u32(&data[MAGIC_OFFSET..MAGIC_OFFSET + 4]) != MAGIC {
            return Err(Error::Syntax("ICC profile lacks 'acsp' signature".to_string()));
        }
        let data_space =
            IccDataSpace::from_signature(BigEndian::read_u32(&data[DATA_SPACE_OFFSET..DATA_SPACE_OFFSET + 4]));
        Ok(Self { data, data_space })
    }

    /// Data colour space from the header.
    pub fn data_space(&self) -> IccDataSpace {
        self.data_space
    }

    /// Number of input components the profile expects.
    pub fn components(&self) -> usize {
        self.data_space.components()
    }

    /// Whether this is a CIE Lab input profile.
    pub fn is_lab(&self) -> bool {
        self.data_space == IccDataSpace::Lab
    }

    /// Raw profile bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    /// Check that a zero-valued sample can be transformed through the profile.
    ///
    /// Requires an intact tag table and a device-to-PCS transform: an AToB
    /// table, or the matrix/TRC tags for gray and RGB profiles.
    pub fn probe(&self) -> Result<()> {
        if self.components() == 0 {
            return Err(Error::Undefined(format!("ICC data space {:?}", self.data_space)));
        }
        let tags = self.tag_signatures()?;
        let has = |sig: u32| tags.contains(&sig);

        let usable = [TAG_A2B0, TAG_A2B1, TAG_A2B2].iter().any(|&t| has(t))
            || (self.data_space == IccDataSpace::Gray && has(TAG_KTRC))
            || (self.data_space == IccDataSpace::Rgb && RGB_MATRIX_TAGS.iter().all(|&t| has(t)));
        if usable {
            Ok(())
        } else {
            Err(Error::Undefined("ICC profile has no usable input transform".to_string()))
        }
    }

    fn tag_signatures(&self) -> Result<Vec<u32>> {
        let data = &self.data;
        if data.len() < TAG_COUNT_OFFSET + 4 {
            return Err(Error::Syntax("ICC profile has no tag table".to_string()));
        }
        let count = BigEndian::read_u32(&data[TAG_COUNT_OFFSET..TAG_COUNT_OFFSET + 4]);
        if count > MAX_TAG_COUNT {
            return Err(Error::LimitCheck(format!("ICC profile declares {} tags", count)));
        }

        let mut signatures = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let entry = TAG_COUNT_OFFSET + 4 + i * TAG_ENTRY_SIZE;
            let Some(raw) = data.get(entry..entry + TAG_ENTRY_SIZE) else {
                return Err(Error::Syntax("ICC tag table truncated".to_string()));
            };
            let offset = BigEndian::read_u32(&raw[4..8]) as usize;
            let size = BigEndian::read_u32(&raw[8..12]) as usize;
            if offset.checked_add(size).map_or(true, |end| end > data.len()) {
                return Err(Error::Syntax(format!("ICC tag {} lies outside the profile", i)));
            }
            signatures.push(BigEndian::read_u32(&raw[0..4]));
        }
        Ok(signatures)
    }
}

/// Turns profile bytes into a profile handle.
pub trait IccLoader {
    /// Load a profile from its raw bytes.
    fn load(&self, data: &[u8]) -> Result<IccProfile>;
}

/// [`IccLoader`] that reads only the profile header and tag table.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderIccLoader;

impl IccLoader for HeaderIccLoader {
    fn load(&self, data: &[u8]) -> Result<IccProfile> {
        IccProfile::parse(Bytes::copy_from_slice(data))
    }
}

/// Build a minimal well-formed profile for fixtures.
///
/// `tags` lists the tag signatures to include; each tag gets a 4-byte body.
#[doc(hidden)]
pub fn synthetic_profile(data_space: &[u8; 4], tags: &[&[u8; 4]]) -> Vec<u8> {
    let table_len = 4 + tags.len() * TAG_ENTRY_SIZE;
    let total = HEADER_SIZE + table_len + tags.len() * 4;
    let mut out = vec![0u8; total];
    BigEndian::write_u32(&mut out[0..4], total as u32);
    out[DATA_SPACE_OFFSET..DATA_SPACE_OFFSET + 4].copy_from_slice(data_space);
    BigEndian::write_u32(&mut out[MAGIC_OFFSET..MAGIC_OFFSET + 4], MAGIC);
    BigEndian::write_u32(&mut out[TAG_COUNT_OFFSET..TAG_COUNT_OFFSET + 4], tags.len() as u32);
    for (i, sig) in tags.iter().enumerate() {
        let entry = TAG_COUNT_OFFSET + 4 + i * TAG_ENTRY_SIZE;
        out[entry..entry + 4].copy_from_slice(&sig[..]);
        BigEndian::write_u32(&mut out[entry + 4..entry + 8], (HEADER_SIZE + table_len + i * 4) as u32);
        BigEndian::write_u32(&mut out[entry + 8..entry + 12], 4);
    }
    out
}

//! Image painting.
//!
//! An image goes through four stages:
//!
//! 1. [`descriptor`] normalizes the image dictionary, substitutes a
//!    preferred alternate, scans a JPX header when needed and selects the
//!    colour space.
//! 2. The selector classifies the image as one of the [`ImageType`]s,
//!    pre-decoding any stencil or soft mask it needs.
//! 3. Transparency groups and soft-mask groups are opened around the image.
//! 4. [`pump::RowPump`] streams decoded rows into the device, carrying over
//!    whatever the device did not accept.

pub mod descriptor;
pub mod jpx;
mod mask;
pub mod pump;
mod render;
mod xobject;

pub use descriptor::{ImageDescriptor, ImageInfo, MaskEntry};
pub use jpx::{scan_jpx_header, JpxColor, JpxInfo};
pub use pump::{row_length, PumpState, RowPump};

/// Geometry of a mask plane sent alongside the image samples.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskGeometry {
    /// Samples per row
    pub width: u32,
    /// Rows
    pub height: u32,
    /// Bits per sample
    pub bits_per_component: u8,
    /// Two-entry decode array
    pub decode: Vec<f64>,
    /// Interpolation requested
    pub interpolate: bool,
}

/// How an image is handed to the device.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageType {
    /// Opaque samples, or a 1-bit stencil painted in the fill colour
    Type1,
    /// Samples plus a separate 1-bit stencil mask (plane 0)
    Type3 {
        /// Stencil geometry
        mask: MaskGeometry,
    },
    /// Samples with a colour-key range per component
    Type4 {
        /// Inclusive `[min max]` pairs, one per component
        mask_color: Vec<u32>,
    },
    /// Samples plus a soft mask (plane 0) the device composites itself
    Type3x {
        /// Soft-mask geometry
        soft_mask: MaskGeometry,
        /// Premultiplication colour, if the soft mask declares one
        matte: Option<Vec<f64>>,
    },
}

impl ImageType {
    /// Name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            ImageType::Type1 => "Type1",
            ImageType::Type3 { .. } => "Type3",
            ImageType::Type4 { .. } => "Type4",
            ImageType::Type3x { .. } => "Type3x",
        }
    }
}

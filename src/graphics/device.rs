//! The rasterizer seam.
//!
//! A [`Device`] receives image geometry followed by plane buffers, and hosts
//! the transparency groups the compositor opens around masked images.

use crate::color::{ColorSpace, PatternSpace, TintTransform};
use crate::error::Result;
use crate::images::ImageType;
use crate::object::Object;
use std::sync::Arc;

/// Geometry and sample layout of an image handed to the device.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    /// Classification and mask details
    pub image_type: ImageType,
    /// Samples per row
    pub width: u32,
    /// Rows
    pub height: u32,
    /// Bits per sample component
    pub bits_per_component: u8,
    /// Components per sample (1 for stencil masks)
    pub components: usize,
    /// Colour space; `None` for stencil masks
    pub color_space: Option<Arc<ColorSpace>>,
    /// Decode array, two entries per component
    pub decode: Vec<f64>,
    /// Interpolation requested
    pub interpolate: bool,
    /// Image is a 1-bit stencil painted in the fill colour
    pub image_mask: bool,
    /// Maps image space to the unit square: `[w 0 0 -h 0 h]`
    pub matrix: [f64; 6],
}

impl ImageParams {
    /// Number of planes the device will receive per call.
    pub fn plane_count(&self) -> usize {
        match self.image_type {
            ImageType::Type3 { .. } | ImageType::Type3x { .. } => 2,
            _ => 1,
        }
    }
}

/// Transparency group parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupParams {
    /// Isolated group
    pub isolated: bool,
    /// Knockout group
    pub knockout: bool,
    /// Group bounds in user space
    pub bbox: [f64; 4],
}

/// Soft-mask group parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftMaskParams {
    /// Premultiplication colour to reverse, if any
    pub matte: Vec<f64>,
    /// Mask bounds in user space
    pub bbox: [f64; 4],
}

/// Rasterizer and transparency host.
pub trait Device {
    /// Begin an image. Planes follow through [`Device::next_planes`].
    fn begin_image(&mut self, params: &ImageParams) -> Result<()>;

    /// Offer plane data. For each plane the device writes how many bytes it
    /// accepted into `used`; unaccepted bytes are offered again next call.
    fn next_planes(&mut self, planes: &[&[u8]], used: &mut [usize]) -> Result<()>;

    /// Finish the current image.
    fn end_image(&mut self) -> Result<()>;

    /// Open a transparency group.
    fn begin_transparency_group(&mut self, group: &GroupParams) -> Result<()>;

    /// Close the innermost transparency group.
    fn end_transparency_group(&mut self) -> Result<()>;

    /// Open a luminosity soft-mask group.
    fn begin_transparency_mask(&mut self, mask: &SoftMaskParams) -> Result<()>;

    /// Close the soft-mask group, making it the current mask.
    fn end_transparency_mask(&mut self) -> Result<()>;

    /// A colour space has been selected for painting.
    fn install_color_space(&mut self, _space: &ColorSpace) -> Result<()> {
        Ok(())
    }

    /// Paint a form XObject.
    fn render_form(&mut self, _form: &Object) -> Result<()> {
        log::debug!("Form XObject ignored by device");
        Ok(())
    }

    /// Release any state built for a tint transform.
    fn release_tint_transform(&mut self, _transform: &TintTransform) {}

    /// Release any state built for a pattern space.
    fn release_pattern(&mut self, _pattern: &PatternSpace) {}
}

/// Device that accepts everything and paints nothing.
///
/// Useful for resolving colour spaces or validating images without output.
#[derive(Debug, Default, Clone)]
pub struct NullDevice {
    /// Bytes accepted across all planes
    pub bytes_accepted: usize,
    /// Tint transforms released
    pub released_functions: usize,
    /// Pattern spaces released
    pub released_patterns: usize,
}

impl Device for NullDevice {
    fn begin_image(&mut self, _params: &ImageParams) -> Result<()> {
        Ok(())
    }

    fn next_planes(&mut self, planes: &[&[u8]], used: &mut [usize]) -> Result<()> {
        for (slot, plane) in used.iter_mut().zip(planes) {
            *slot = plane.len();
            self.bytes_accepted += plane.len();
        }
        Ok(())
    }

    fn end_image(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_transparency_group(&mut self, _group: &GroupParams) -> Result<()> {
        Ok(())
    }

    fn end_transparency_group(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_transparency_mask(&mut self, _mask: &SoftMaskParams) -> Result<()> {
        Ok(())
    }

    fn end_transparency_mask(&mut self) -> Result<()> {
        Ok(())
    }

    fn release_tint_transform(&mut self, _transform: &TintTransform) {
        self.released_functions += 1;
    }

    fn release_pattern(&mut self, _pattern: &PatternSpace) {
        self.released_patterns += 1;
    }
}

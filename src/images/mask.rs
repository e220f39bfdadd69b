//! Mask and soft-mask preparation for the image type selector.

use crate::color::MAX_COMPONENTS;
use crate::context::PaintContext;
use crate::decoders::decode_with_dict;
use crate::diagnostics::{Diagnostics, Warnings};
use crate::error::{Error, Result};
use crate::graphics::release_space;
use crate::images::descriptor::{ImageDescriptor, ImageInfo};
use crate::images::MaskGeometry;
use crate::object::{deref, dict_get, number_array, Dict, Object, ObjectStore};
use crate::resources::{Resource, ResourceScope};
use bytes::Bytes;

/// Validate a colour-key `/Mask` array into inclusive `[min max]` pairs.
///
/// Returns `Err` when the mask must be dropped; the caller paints the
/// image unmasked.
pub(crate) fn setup_type4(
    store: &dyn ObjectStore,
    mask: &[Object],
    bits_per_component: u8,
    components: usize,
    indexed: bool,
    diag: &mut Diagnostics,
) -> Result<Vec<u32>> {
    if mask.len() > 2 * components || mask.len() % 2 != 0 {
        return Err(Error::RangeCheck(format!(
            "colour-key mask of {} entries for {} components",
            mask.len(),
            components
        )));
    }

    let max_value: i64 = (1i64 << bits_per_component) - 1;
    let indexed_bits1 = indexed && bits_per_component == 1;
    let mut had_float = false;
    let mut had_range = false;

    let mut values = Vec::with_capacity(mask.len());
    let result = (|| {
        for (i, entry) in mask.iter().enumerate() {
            let (entry, _) = deref(store, entry)?;
            let mut value = match entry {
                Object::Integer(v) => v,
                Object::Real(r) => {
                    had_float = true;
                    (r + 0.5).trunc() as i64
                },
                other => return Err(Error::type_check("Number", &other)),
            };
            if value < 0 {
                had_range = true;
                value = 0;
            }
            if value > max_value {
                had_range = true;
                if indexed_bits1 {
                    if i == 0 {
                        return Err(Error::RangeCheck(format!("colour-key index {} out of range", value)));
                    }
                    value = 1;
                } else {
                    value &= max_value;
                }
            }
            values.push(value as u32);
        }

        if !indexed && bits_per_component == 1 && values.chunks(2).any(|pair| pair[0] != pair[1]) {
            return Err(Error::RangeCheck("1-bit colour-key range is not a single value".to_string()));
        }
        Ok(())
    })();

    if had_float {
        diag.note(Warnings::IMAGE_ERROR, "Some elements of the Mask array are not integers");
    }
    if had_range {
        diag.note(Warnings::IMAGE_ERROR, "Some elements of the Mask array are out of range");
    }
    result.map(|()| values)
}

/// The soft mask's `/Matte`, if it declares one.
pub(crate) fn image_matte(store: &dyn ObjectStore, soft_mask: &Dict) -> Result<Option<Vec<f64>>> {
    let Some(matte) = dict_get(store, soft_mask, "Matte")? else {
        return Ok(None);
    };
    if !matches!(matte, Object::Array(_)) {
        return Ok(None);
    }
    let values = number_array(store, &matte)?;
    if values.len() > MAX_COMPONENTS {
        return Err(Error::LimitCheck(format!("Matte with {} entries", values.len())));
    }
    Ok(Some(values))
}

/// Soft mask for a JPX image that carries its alpha channel in the
/// codestream: a copy of the image dictionary read as one gray channel.
pub(crate) fn smask_from_data(info: &ImageInfo, jpx_bits: u32, components: usize) -> Option<Resource> {
    let mut dict = info.dict()?.clone();
    dict.insert("SMaskInData".to_string(), Object::Integer(0));
    dict.insert("ColorSpace".to_string(), Object::name("DeviceGray"));
    dict.insert("BitsPerComponent".to_string(), Object::Integer(jpx_bits as i64));
    dict.insert("Alpha".to_string(), Object::Boolean(true));
    dict.insert(
        "Decode".to_string(),
        Object::Array(vec![Object::Integer(0), Object::Integer(1)]),
    );
    dict.remove("SMask");
    dict.remove("Mask");
    if info.smask_in_data == 2 {
        dict.insert("Matte".to_string(), Object::Array(vec![Object::Integer(0); components]));
    }
    let data = info.image.stream_data().cloned().unwrap_or_else(Bytes::new);
    Some(Resource {
        value: Object::Stream { dict, data },
        origin: None,
    })
}

/// Geometry of a described mask or soft mask.
pub(crate) fn geometry(desc: &ImageDescriptor) -> MaskGeometry {
    MaskGeometry {
        width: desc.info.width,
        height: desc.info.height,
        bits_per_component: desc.bits_per_component,
        decode: desc.decode[..2].to_vec(),
        interpolate: desc.info.interpolate,
    }
}

impl<'a> PaintContext<'a> {
    /// Describe a mask sub-image and decode its samples in full.
    ///
    /// Stencil and soft masks are read before the main image begins so only
    /// one filtered stream is ever open at a time. A stencil is always read
    /// as one 1-bit channel, whatever its dictionary says.
    pub(crate) fn predecode_mask(
        &mut self,
        mask: &Resource,
        stencil: bool,
        scope: ResourceScope<'_>,
        diag: &mut Diagnostics,
    ) -> Result<(ImageDescriptor, Vec<u8>)> {
        let mut info = ImageInfo::read(self.store, &mask.value, mask.origin, scope, false, diag)?;
        if stencil {
            info.image_mask = true;
            info.bits_per_component = 1;
        }
        let mut desc = self.describe(info, scope, diag)?;
        // Mask spaces are never installed, so nothing else will tear them down.
        if let Some(space) = desc.color_space.take() {
            release_space(space, &mut *self.device);
        }
        let dict = desc.info.dict().ok_or_else(|| Error::type_check("Stream", &desc.info.image))?;
        let mut samples = decode_with_dict(desc.info.data(), dict, &self.options)?;

        let expected = desc
            .row_length()?
            .checked_mul(desc.info.height as usize)
            .ok_or_else(|| Error::LimitCheck("mask size overflows".to_string()))?;
        if samples.len() < expected {
            log::debug!("Mask data short by {} bytes, padding", expected - samples.len());
        }
        samples.resize(expected, 0);
        Ok((desc, samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::MemoryStore;

    fn ints(values: &[i64]) -> Vec<Object> {
        values.iter().map(|v| Object::Integer(*v)).collect()
    }

    fn type4(mask: &[Object], bpc: u8, comps: usize, indexed: bool) -> (Result<Vec<u32>>, Diagnostics) {
        let store = MemoryStore::new();
        let mut diag = Diagnostics::new(false);
        let result = setup_type4(&store, mask, bpc, comps, indexed, &mut diag);
        (result, diag)
    }

    #[test]
    fn test_equal_pair_at_one_bit() {
        let (result, diag) = type4(&ints(&[0, 0]), 1, 1, false);
        assert_eq!(result.unwrap(), vec![0, 0]);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_mismatched_pair_at_one_bit_degrades() {
        let (result, _) = type4(&ints(&[0, 1]), 1, 1, false);
        assert!(matches!(result, Err(Error::RangeCheck(_))));
    }

    #[test]
    fn test_one_bit_key_masked_to_depth() {
        let (result, diag) = type4(&ints(&[3, 3]), 1, 1, false);
        assert_eq!(result.unwrap(), vec![1, 1]);
        assert!(diag.has(Warnings::IMAGE_ERROR));
    }

    #[test]
    fn test_values_masked_into_range() {
        let (result, diag) = type4(&ints(&[10, 300, 0, 255, 1, 2]), 8, 3, false);
        assert_eq!(result.unwrap(), vec![10, 300 & 255, 0, 255, 1, 2]);
        assert!(diag.has(Warnings::IMAGE_ERROR));
    }

    #[test]
    fn test_indexed_one_bit_special_cases() {
        let (result, _) = type4(&ints(&[2, 1]), 1, 1, true);
        assert!(result.is_err());

        let (result, diag) = type4(&ints(&[0, 5]), 1, 1, true);
        assert_eq!(result.unwrap(), vec![0, 1]);
        assert!(diag.has(Warnings::IMAGE_ERROR));
    }

    #[test]
    fn test_real_entries_rounded() {
        let mask = vec![Object::Real(3.6), Object::Integer(7)];
        let (result, diag) = type4(&mask, 8, 1, false);
        assert_eq!(result.unwrap(), vec![4, 7]);
        assert!(diag.has(Warnings::IMAGE_ERROR));
    }

    #[test]
    fn test_too_many_entries() {
        let (result, _) = type4(&ints(&[0, 0, 1, 1]), 8, 1, false);
        assert!(matches!(result, Err(Error::RangeCheck(_))));
    }

    #[test]
    fn test_matte_limit() {
        let store = MemoryStore::new();
        let mut dict = Dict::new();
        dict.insert("Matte".to_string(), Object::Array(ints(&[0; 33])));
        assert!(matches!(image_matte(&store, &dict), Err(Error::LimitCheck(_))));

        dict.insert("Matte".to_string(), Object::Array(ints(&[0, 0, 0])));
        assert_eq!(image_matte(&store, &dict).unwrap(), Some(vec![0.0; 3]));
    }
}

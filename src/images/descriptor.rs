//! Image dictionary normalization.
//!
//! [`ImageInfo`] is the image dictionary read as written, with PDF defaults
//! applied and a preferred alternate swapped in. [`ImageDescriptor`] adds
//! what only the painting context can supply: the JPX header scan, the
//! resolved colour space and the final decode array.

use crate::color::ColorSpace;
use crate::context::PaintContext;
use crate::diagnostics::{Diagnostics, Warnings};
use crate::error::{Error, Result};
use crate::images::jpx::{scan_jpx_header, JpxColor, JpxInfo};
use crate::object::{deref, dict_get, dict_get_any, number_array, Dict, Object, ObjectRef, ObjectStore};
use crate::resources::{Resource, ResourceCategory, ResourceScope};
use std::io::Cursor;
use std::sync::Arc;

/// Keys only inline images may abbreviate, in (full, abbreviated) pairs.
const ABBREVIATED_KEYS: [(&str, &str); 9] = [
    ("BitsPerComponent", "BPC"),
    ("ColorSpace", "CS"),
    ("Decode", "D"),
    ("DecodeParms", "DP"),
    ("Filter", "F"),
    ("Height", "H"),
    ("ImageMask", "IM"),
    ("Interpolate", "I"),
    ("Width", "W"),
];

/// The `/Mask` entry of an image.
#[derive(Debug, Clone, PartialEq)]
pub enum MaskEntry {
    /// A stencil mask image
    Stencil(Resource),
    /// A colour-key array of `[min max]` pairs
    ColorKey(Vec<Object>),
}

/// An image dictionary read with defaults applied.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// The image stream being painted (the alternate, if one was chosen)
    pub image: Object,
    /// Identity of `image`, if it was reached through a reference
    pub origin: Option<ObjectRef>,
    /// Samples per row
    pub width: u32,
    /// Rows
    pub height: u32,
    /// Declared bits per component, 1 when absent
    pub bits_per_component: i64,
    /// Stencil mask flag
    pub image_mask: bool,
    /// Interpolation flag
    pub interpolate: bool,
    /// Stencil or colour-key mask
    pub mask: Option<MaskEntry>,
    /// Soft-mask image
    pub soft_mask: Option<Resource>,
    /// JPX embedded alpha mode
    pub smask_in_data: i64,
    /// Colour space as written, references intact
    pub color_space: Option<Object>,
    /// Image-local rendering intent
    pub intent: Option<String>,
    /// Decode array as written
    pub decode: Option<Vec<f64>>,
    /// `/OC` entry as written
    pub optional_content: Option<Object>,
    /// Filter is JPXDecode
    pub is_jpx: bool,
    /// Read from inline image syntax
    pub inline: bool,
}

impl ImageInfo {
    /// Read `image` (a stream, or for inline images a dictionary).
    ///
    /// When the primary dictionary lists an alternate flagged
    /// `/DefaultForPrinting`, that alternate is read instead. Alternates of
    /// the alternate are not followed.
    pub fn read(
        store: &dyn ObjectStore,
        image: &Object,
        origin: Option<ObjectRef>,
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Self> {
        let primary = Self::parse(store, image, origin, scope, inline, diag)?;
        let alternates = image_dict(image)?.get("Alternates").cloned();
        let Some(alternate) = alternates.and_then(|a| find_alternate(store, &a)) else {
            return Ok(primary);
        };

        log::debug!("Painting the DefaultForPrinting alternate image");
        let mut chosen = Self::parse(store, &alternate.value, alternate.origin, scope, inline, diag)?;
        if chosen.optional_content.is_none() {
            chosen.optional_content = primary.optional_content;
        }
        Ok(chosen)
    }

    fn parse(
        store: &dyn ObjectStore,
        image: &Object,
        origin: Option<ObjectRef>,
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Self> {
        let dict = image_dict(image)?;
        check_key_forms(dict, inline, diag)?;

        let height = dimension(store, dict, ["Height", "H"], diag)?;
        let width = dimension(store, dict, ["Width", "W"], diag)?;
        let image_mask = flag(store, dict, ["ImageMask", "IM"])?;
        let interpolate = flag(store, dict, ["Interpolate", "I"])?;

        let bits_per_component = match dict_get_any(store, dict, &["BitsPerComponent", "BPC"])? {
            None => 1,
            Some(v) => v.as_integer().ok_or_else(|| Error::type_check("Integer", &v))?,
        };

        let mask = match dict_get(store, dict, "Mask") {
            Ok(value) => mask_entry(store, dict, value, diag)?,
            Err(e) => {
                diag.warn(Warnings::BAD_IMAGEDICT, format!("Unreadable image /Mask ignored: {}", e))?;
                None
            },
        };

        let soft_mask = soft_mask_entry(store, dict, scope)?;

        let smask_in_data = match dict_get(store, dict, "SMaskInData")? {
            None => 0,
            Some(v) => v.as_integer().ok_or_else(|| Error::type_check("Integer", &v))?,
        };

        let color_space = ["ColorSpace", "CS"]
            .iter()
            .find_map(|k| dict.get(*k))
            .filter(|v| !v.is_null())
            .cloned();

        let intent = match dict_get(store, dict, "Intent")? {
            None => None,
            Some(Object::Name(n)) => Some(n),
            Some(other) => {
                diag.warn(
                    Warnings::BAD_IMAGEDICT,
                    format!("Image /Intent is a {}, ignored", other.type_name()),
                )?;
                None
            },
        };

        let decode = match dict_get_any(store, dict, &["Decode", "D"])? {
            None => None,
            Some(d) => Some(number_array(store, &d)?),
        };

        let optional_content = dict.get("OC").filter(|v| !v.is_null()).cloned();

        let is_jpx = matches!(
            dict_get_any(store, dict, &["Filter", "F"])?,
            Some(Object::Name(ref n)) if n == "JPXDecode"
        );

        Ok(Self {
            image: image.clone(),
            origin,
            width,
            height,
            bits_per_component,
            image_mask,
            interpolate,
            mask,
            soft_mask,
            smask_in_data,
            color_space,
            intent,
            decode,
            optional_content,
            is_jpx,
            inline,
        })
    }

    /// The image dictionary.
    pub fn dict(&self) -> Option<&Dict> {
        self.image.as_dict()
    }

    /// Encoded sample bytes.
    pub fn data(&self) -> &[u8] {
        self.image.stream_data().map(|d| &d[..]).unwrap_or(&[])
    }
}

fn image_dict(image: &Object) -> Result<&Dict> {
    match image {
        Object::Stream { dict, .. } => Ok(dict),
        Object::Dictionary(dict) => Ok(dict),
        other => Err(Error::type_check("Stream", other)),
    }
}

/// Outside inline images the abbreviations are a format violation; inside
/// them, the full forms are.
fn check_key_forms(dict: &Dict, inline: bool, diag: &mut Diagnostics) -> Result<()> {
    let offending = ABBREVIATED_KEYS
        .iter()
        .map(|(full, short)| if inline { *full } else { *short })
        .find(|key| dict.contains_key(*key));
    match offending {
        Some(key) if inline => diag.warn(
            Warnings::BAD_INLINEIMAGEKEY,
            format!("Inline image uses the full key /{}", key),
        ),
        Some(key) => diag.warn(
            Warnings::BAD_INLINEIMAGEKEY,
            format!("Image dictionary uses the inline abbreviation /{}", key),
        ),
        None => Ok(()),
    }
}

/// Width or Height. Real values are truncated; a value more than half a
/// unit from its truncation is reported.
fn dimension(store: &dyn ObjectStore, dict: &Dict, keys: [&str; 2], diag: &mut Diagnostics) -> Result<u32> {
    let value = dict_get_any(store, dict, &keys)?
        .ok_or_else(|| Error::Undefined(format!("image lacks /{}", keys[0])))?;
    let value = value.as_number().ok_or_else(|| Error::type_check("Number", &value))?;
    let truncated = value.trunc();
    if !(1.0..=u32::MAX as f64).contains(&truncated) {
        return Err(Error::RangeCheck(format!("image /{} {}", keys[0], value)));
    }
    if truncated != (value + 0.5).trunc() {
        let message = format!("Image /{} {} is not an integer", keys[0], value);
        if diag.warn(Warnings::BAD_IMAGEDICT, message.clone()).is_err() {
            return Err(Error::RangeCheck(message));
        }
    }
    Ok(truncated as u32)
}

fn flag(store: &dyn ObjectStore, dict: &Dict, keys: [&str; 2]) -> Result<bool> {
    match dict_get_any(store, dict, &keys)? {
        None => Ok(false),
        Some(v) => v.as_bool().ok_or_else(|| Error::type_check("Boolean", &v)),
    }
}

fn mask_entry(
    store: &dyn ObjectStore,
    dict: &Dict,
    value: Option<Object>,
    diag: &mut Diagnostics,
) -> Result<Option<MaskEntry>> {
    match value {
        None => Ok(None),
        Some(Object::Array(items)) => Ok(Some(MaskEntry::ColorKey(items))),
        Some(value @ (Object::Stream { .. } | Object::Dictionary(_))) => {
            let origin = dict.get("Mask").and_then(Object::as_reference);
            let origin = match origin {
                Some(r) => deref(store, &Object::Reference(r))?.1,
                None => None,
            };
            Ok(Some(MaskEntry::Stencil(Resource { value, origin })))
        },
        Some(other) => {
            diag.warn(
                Warnings::BAD_IMAGEDICT,
                format!("Image /Mask is a {}, ignored", other.type_name()),
            )?;
            Ok(None)
        },
    }
}

/// `/SMask`, which may name an ExtGState resource. Anything that is not a
/// dictionary is dropped.
fn soft_mask_entry(store: &dyn ObjectStore, dict: &Dict, scope: ResourceScope<'_>) -> Result<Option<Resource>> {
    let Some(raw) = dict.get("SMask") else {
        return Ok(None);
    };
    let (value, origin) = deref(store, raw)?;
    let resource = match value {
        Object::Name(name) => match scope.find(store, ResourceCategory::ExtGState, &name)? {
            Some(found) => found,
            None => Resource {
                value: Object::Name(name),
                origin: None,
            },
        },
        value => Resource { value, origin },
    };
    match resource.value {
        Object::Stream { .. } | Object::Dictionary(_) => Ok(Some(resource)),
        ref other => {
            log::debug!("Image /SMask is a {}, dropped", other.type_name());
            Ok(None)
        },
    }
}

/// First `/Alternates` entry flagged `/DefaultForPrinting true`.
fn find_alternate(store: &dyn ObjectStore, alternates: &Object) -> Option<Resource> {
    let (alternates, _) = deref(store, alternates).ok()?;
    for entry in alternates.as_array()? {
        let Ok((Object::Dictionary(entry), _)) = deref(store, entry) else {
            continue;
        };
        let preferred = dict_get(store, &entry, "DefaultForPrinting")
            .ok()
            .flatten()
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !preferred {
            continue;
        }
        match entry.get("Image").map(|image| deref(store, image)) {
            Some(Ok((value @ Object::Stream { .. }, origin))) => return Some(Resource { value, origin }),
            _ => continue,
        }
    }
    None
}

/// A fully normalized image, ready for classification.
#[derive(Debug, Clone)]
pub struct ImageDescriptor {
    /// Dictionary-level description
    pub info: ImageInfo,
    /// Effective bits per component
    pub bits_per_component: u8,
    /// Components per sample
    pub components: usize,
    /// Resolved colour space; `None` for stencil masks
    pub color_space: Option<Arc<ColorSpace>>,
    /// Decode array, two entries per component
    pub decode: Vec<f64>,
    /// JPX header scan, when one was made
    pub jpx: Option<JpxInfo>,
    /// Whether the data is treated as a JPX codestream
    pub is_jpx: bool,
}

impl ImageDescriptor {
    /// Bytes per row of samples.
    pub fn row_length(&self) -> Result<usize> {
        crate::images::pump::row_length(self.info.width, self.components, self.bits_per_component)
    }

    /// Image-space to unit-square matrix.
    pub fn matrix(&self) -> [f64; 6] {
        let (w, h) = (self.info.width as f64, self.info.height as f64);
        [w, 0.0, 0.0, -h, 0.0, h]
    }
}

impl<'a> PaintContext<'a> {
    /// Normalize an image dictionary into a descriptor.
    ///
    /// For inline images pass the dictionary (or a stream built from the
    /// dictionary and inline data) with `inline` set.
    pub fn build_image_descriptor(
        &mut self,
        image: &Object,
        scope: ResourceScope<'_>,
        inline: bool,
    ) -> Result<ImageDescriptor> {
        let mut diag = self.new_diagnostics();
        let result = ImageInfo::read(self.store, image, None, scope, inline, &mut diag)
            .and_then(|info| self.describe(info, scope, &mut diag));
        self.diagnostics.merge(diag);
        result
    }

    pub(crate) fn describe(
        &mut self,
        info: ImageInfo,
        scope: ResourceScope<'_>,
        diag: &mut Diagnostics,
    ) -> Result<ImageDescriptor> {
        let maybe_jpx = info.color_space.is_none() && !info.image_mask;
        let mut is_jpx = info.is_jpx;
        let mut jpx = None;
        if (maybe_jpx || info.is_jpx) && !info.inline {
            let data = info.data();
            let scanned = scan_jpx_header(&mut Cursor::new(data), data.len() as u64, diag);
            if maybe_jpx && !scanned.is_empty() {
                is_jpx = true;
            }
            jpx = Some(scanned);
        }

        let mut bpc = info.bits_per_component;
        if info.image_mask && bpc != 1 {
            diag.warn(
                Warnings::BAD_IMAGEDICT,
                format!("ImageMask with BitsPerComponent {}, using 1", bpc),
            )?;
            bpc = 1;
        }

        let (components, color_space) = if info.image_mask {
            (1, None)
        } else {
            let space = match (&info.color_space, jpx.as_mut()) {
                (Some(space), _) => self.resolve_space(space, scope, info.inline, diag)?,
                (None, Some(jpx)) if is_jpx => {
                    if jpx.bits_per_component == 12 {
                        jpx.bits_per_component = 16;
                    }
                    bpc = jpx.bits_per_component as i64;
                    self.jpx_color_space(jpx, info.data(), diag)?
                },
                (None, _) => {
                    diag.warn(
                        Warnings::MISSING_COLORSPACE,
                        "Image has no /ColorSpace, assuming DeviceRGB",
                    )?;
                    Arc::new(ColorSpace::DeviceRGB)
                },
            };
            (space.components(), Some(space))
        };

        if !matches!(bpc, 1 | 2 | 4 | 8 | 16) {
            return Err(Error::RangeCheck(format!("BitsPerComponent {}", bpc)));
        }
        let bits_per_component = bpc as u8;

        let default_decode = match &color_space {
            Some(space) => space.default_decode(bits_per_component),
            None => vec![0.0, 1.0],
        };
        let decode = match &info.decode {
            None => default_decode,
            Some(declared) => {
                let mut decode = declared.clone();
                if decode.len() > 2 * components {
                    diag.warn(
                        Warnings::BAD_IMAGEDICT,
                        format!(
                            "Decode array has {} entries for {} components, truncated",
                            decode.len(),
                            components
                        ),
                    )?;
                    decode.truncate(2 * components);
                }
                if decode.len() < default_decode.len() {
                    decode.extend_from_slice(&default_decode[decode.len()..]);
                }
                decode
            },
        };

        Ok(ImageDescriptor {
            info,
            bits_per_component,
            components,
            color_space,
            decode,
            jpx,
            is_jpx,
        })
    }

    fn jpx_color_space(&mut self, jpx: &JpxInfo, data: &[u8], diag: &mut Diagnostics) -> Result<Arc<ColorSpace>> {
        if let JpxColor::Icc { offset, length } = jpx.color {
            let profile = usize::try_from(offset)
                .ok()
                .zip(usize::try_from(length).ok())
                .and_then(|(start, len)| data.get(start..start.checked_add(len)?))
                .ok_or_else(|| Error::Syntax(format!("JPX ICC profile at {}+{} outside data", offset, length)))?;
            return self.icc_from_bytes(profile, jpx.components as usize);
        }

        let space = match jpx.enumerated_color() {
            12 => ColorSpace::DeviceCMYK,
            16 | 18 => ColorSpace::DeviceRGB,
            17 => ColorSpace::DeviceGray,
            id @ (20 | 24) => {
                diag.warn(
                    Warnings::JPX_COLORSPACE,
                    format!("JPX enumerated colour space {} treated as DeviceRGB", id),
                )?;
                ColorSpace::DeviceRGB
            },
            id => return Err(Error::Undefined(format!("JPX enumerated colour space {}", id))),
        };
        Ok(Arc::new(space))
    }
}

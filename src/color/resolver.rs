//! Recursive colour-space resolution.
//!
//! A colour space operand is either a name or an array whose first element
//! names the family. Names other than the device families refer to
//! `/ColorSpace` resources, which may in turn name or contain further
//! spaces. Every level runs inside a resolution mark, so a resource chain
//! that loops back on itself is reported instead of recursing forever.

use crate::color::marks::MarkKey;
use crate::color::space::{
    CalGray, CalRGB, ColorSpace, Colorant, DeviceN, DeviceNAttributes, DeviceNSubtype, IccBased, Indexed,
    Lab, PatternSpace, ProcessSpace, Separation, TintTransform, MAX_COMPONENTS,
};
use crate::context::PaintContext;
use crate::decoders::decode_stream_object;
use crate::diagnostics::{Diagnostics, Warnings};
use crate::error::{Error, Result};
use crate::object::{deref, dict_get, number_array, Dict, Object, ObjectRef};
use crate::resources::{ResourceCategory, ResourceScope};
use indexmap::IndexMap;
use std::sync::Arc;

const LAB_DEFAULT_RANGE: [f64; 4] = [-100.0, 100.0, -100.0, 100.0];
const ICC_LAB_RANGE: [f64; 6] = [0.0, 100.0, -128.0, 127.0, -128.0, 127.0];
const IDENTITY_MATRIX: [f64; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

impl<'a> PaintContext<'a> {
    /// Resolve a colour-space operand (name or array) against `scope`.
    ///
    /// Nothing is installed in the graphics state; see
    /// [`PaintContext::set_color_space`] for that.
    pub fn resolve_color_space(&mut self, space: &Object, scope: ResourceScope<'_>) -> Result<Arc<ColorSpace>> {
        let mut diag = self.new_diagnostics();
        let result = self.resolve_space(space, scope, false, &mut diag);
        self.diagnostics.merge(diag);
        result
    }

    /// Resolve inside a fresh resolution level.
    pub(crate) fn resolve_space(
        &mut self,
        space: &Object,
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Arc<ColorSpace>> {
        self.with_mark(|ctx| {
            let (direct, origin) = deref(ctx.store, space)?;
            if let Some(r) = origin {
                ctx.visit(MarkKey::Object(r))?;
            }
            ctx.resolve_direct(&direct, origin, scope, inline, diag)
        })
    }

    fn resolve_direct(
        &mut self,
        space: &Object,
        origin: Option<ObjectRef>,
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Arc<ColorSpace>> {
        match space {
            Object::Name(name) => self.space_by_name(name, scope, inline, diag),
            Object::Array(items) => self.space_by_array(items, origin, scope, inline, diag),
            other => Err(Error::type_check("Name or Array", other)),
        }
    }

    fn space_by_name(
        &mut self,
        name: &str,
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Arc<ColorSpace>> {
        let device = match name {
            "DeviceGray" | "G" => ColorSpace::DeviceGray,
            "DeviceRGB" | "RGB" => ColorSpace::DeviceRGB,
            "DeviceCMYK" | "CMYK" => ColorSpace::DeviceCMYK,
            "Pattern" => ColorSpace::Pattern(PatternSpace::default()),
            _ => return self.named_resource(name, scope, inline, diag),
        };
        if !inline && matches!(name, "G" | "RGB" | "CMYK") {
            diag.warn(
                Warnings::BAD_INLINECOLORSPACE,
                format!("Inline colour space abbreviation /{} outside an inline image", name),
            )?;
        }
        Ok(Arc::new(device))
    }

    fn named_resource(
        &mut self,
        name: &str,
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Arc<ColorSpace>> {
        self.with_mark(|ctx| {
            ctx.visit(MarkKey::Resource(ResourceCategory::ColorSpace, name.to_string()))?;
            let resource = scope
                .find(ctx.store, ResourceCategory::ColorSpace, name)?
                .ok_or_else(|| Error::Undefined(format!("colour space resource /{}", name)))?;
            if let Some(r) = resource.origin {
                ctx.visit(MarkKey::Object(r))?;
            }
            log::debug!("Colour space /{} resolved to {}", name, resource.value.type_name());
            ctx.resolve_direct(&resource.value, resource.origin, scope, inline, diag)
        })
    }

    fn space_by_array(
        &mut self,
        items: &[Object],
        origin: Option<ObjectRef>,
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Arc<ColorSpace>> {
        let first = items
            .first()
            .ok_or_else(|| Error::RangeCheck("empty colour space array".to_string()))?;
        let (tag, _) = deref(self.store, first)?;
        let tag = tag.as_name().ok_or_else(|| Error::type_check("Name", &tag))?.to_string();

        match tag.as_str() {
            "Indexed" | "I" => {
                if !inline && tag == "I" {
                    diag.warn(
                        Warnings::BAD_INLINECOLORSPACE,
                        "Inline colour space abbreviation /I outside an inline image",
                    )?;
                }
                self.create_indexed(items, scope, inline, diag)
            },
            "Lab" | "CalRGB" | "CalGray" => self.create_calibrated(&tag, items, origin),
            "Pattern" => self.create_pattern(items, scope, inline, diag),
            "DeviceN" => self.create_devicen(items, scope, inline, diag),
            "ICCBased" => self.create_iccbased(items, scope, inline, diag),
            "Separation" => self.create_separation(items, scope, inline, diag),
            other => self.space_by_name(other, scope, inline, diag),
        }
    }

    fn create_indexed(
        &mut self,
        items: &[Object],
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Arc<ColorSpace>> {
        let [_, base, hival, lookup, ..] = items else {
            return Err(Error::RangeCheck(format!("Indexed array has {} entries, needs 4", items.len())));
        };

        let base = self.resolve_space(base, scope, inline, diag)?;

        let (hival, _) = deref(self.store, hival)?;
        let hival = hival.as_integer().ok_or_else(|| Error::type_check("Integer", &hival))?;
        if !(0..=255).contains(&hival) {
            return Err(Error::RangeCheck(format!("Indexed hival {} outside 0..=255", hival)));
        }

        let (lookup, _) = deref(self.store, lookup)?;
        let mut table = match &lookup {
            Object::Stream { .. } => decode_stream_object(&lookup, &self.options)?,
            // Not permitted by the format, but common in the wild.
            Object::String(bytes) => bytes.clone(),
            other => return Err(Error::type_check("Stream or String", other)),
        };

        let needed = (hival as usize + 1) * base.components();
        if table.len() < needed {
            return Err(Error::RangeCheck(format!(
                "Indexed lookup table has {} bytes, needs {}",
                table.len(),
                needed
            )));
        }
        table.truncate(needed);

        Ok(Arc::new(ColorSpace::Indexed(Indexed {
            base,
            hival: hival as u8,
            lookup: table,
        })))
    }

    fn create_pattern(
        &mut self,
        items: &[Object],
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Arc<ColorSpace>> {
        let base = match items.get(1) {
            Some(base) => Some(self.resolve_space(base, scope, inline, diag)?),
            None => None,
        };
        if base.as_deref().is_some_and(ColorSpace::is_pattern) {
            return Err(Error::TypeCheck {
                expected: "non-Pattern underlying space".to_string(),
                found: "Pattern".to_string(),
            });
        }
        Ok(Arc::new(ColorSpace::Pattern(PatternSpace { base })))
    }

    fn create_separation(
        &mut self,
        items: &[Object],
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Arc<ColorSpace>> {
        let [_, name, alternate, transform, ..] = items else {
            return Err(Error::RangeCheck(format!("Separation array has {} entries, needs 4", items.len())));
        };

        let (name, _) = deref(self.store, name)?;
        let colorant = Colorant::from_name(name.as_name().ok_or_else(|| Error::type_check("Name", &name))?);

        let alternate = self.resolve_alternate(alternate, scope, inline, diag)?;
        let tint_transform = self.tint_transform(transform)?;

        Ok(Arc::new(ColorSpace::Separation(Separation {
            colorant,
            alternate,
            tint_transform,
        })))
    }

    fn create_devicen(
        &mut self,
        items: &[Object],
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Arc<ColorSpace>> {
        let [_, inks, alternate, transform, rest @ ..] = items else {
            return Err(Error::RangeCheck(format!("DeviceN array has {} entries, needs 4", items.len())));
        };

        let alternate = self.resolve_alternate(alternate, scope, inline, diag)?;
        let tint_transform = self.tint_transform(transform)?;

        let (inks, _) = deref(self.store, inks)?;
        let inks = inks.as_array().ok_or_else(|| Error::type_check("Array", &inks))?;
        let mut names = Vec::with_capacity(inks.len());
        for ink in inks {
            let (ink, _) = deref(self.store, ink)?;
            let name = ink.as_name().ok_or_else(|| Error::type_check("Name", &ink))?;
            names.push(name.to_string());
        }

        match names.len() {
            0 => return Err(Error::RangeCheck("DeviceN with no inks".to_string())),
            n if n > MAX_COMPONENTS => {
                return Err(Error::LimitCheck(format!("DeviceN with {} inks", n)));
            },
            1 if names[0] == "All" => {
                return Err(Error::Undefined("DeviceN with the single ink /All".to_string()));
            },
            1 => diag.warn(
                Warnings::DEVICEN_SINGLE_INK,
                format!("DeviceN space with the single ink /{}", names[0]),
            )?,
            _ => {},
        }

        let attributes = match rest.first() {
            Some(attrs) => self.devicen_attributes(attrs, scope, inline, diag)?,
            None => None,
        };

        Ok(Arc::new(ColorSpace::DeviceN(DeviceN {
            inks: names,
            alternate,
            tint_transform,
            attributes,
        })))
    }

    fn devicen_attributes(
        &mut self,
        attrs: &Object,
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Option<DeviceNAttributes>> {
        let (attrs, _) = deref(self.store, attrs)?;
        let attrs = match attrs {
            Object::Null => return Ok(None),
            Object::Dictionary(d) => d,
            other => return Err(Error::type_check("Dictionary", &other)),
        };

        let subtype = match dict_get(self.store, &attrs, "Subtype")? {
            None => DeviceNSubtype::DeviceN,
            Some(Object::Name(n)) if n == "DeviceN" => DeviceNSubtype::DeviceN,
            Some(Object::Name(n)) if n == "NChannel" => DeviceNSubtype::NChannel,
            Some(other) => {
                return Err(Error::RangeCheck(format!(
                    "DeviceN attribute subtype {:?}",
                    other.as_name().unwrap_or(other.type_name())
                )));
            },
        };

        let process = match dict_get(self.store, &attrs, "Process")? {
            Some(Object::Dictionary(process)) => {
                let space = dict_get(self.store, &process, "ColorSpace")?
                    .ok_or_else(|| Error::Undefined("DeviceN Process lacks /ColorSpace".to_string()))?;
                let space = self.resolve_space(&space, scope, inline, diag)?;
                let components = match dict_get(self.store, &process, "Components")? {
                    Some(Object::Array(items)) => self.name_list(&items)?,
                    Some(other) => return Err(Error::type_check("Array", &other)),
                    None => Vec::new(),
                };
                Some(ProcessSpace { space, components })
            },
            Some(other) => return Err(Error::type_check("Dictionary", &other)),
            None => None,
        };

        let mut colorants = IndexMap::new();
        match dict_get(self.store, &attrs, "Colorants")? {
            Some(Object::Dictionary(entries)) => {
                // HashMap order is arbitrary; sort so that colorant order is stable.
                let mut keys: Vec<&String> = entries.keys().collect();
                keys.sort();
                for key in keys {
                    let (value, _) = deref(self.store, &entries[key])?;
                    let space = match value {
                        Object::String(bytes) => Object::Name(String::from_utf8_lossy(&bytes).into_owned()),
                        Object::Name(_) | Object::Array(_) => entries[key].clone(),
                        other => return Err(Error::type_check("Name or Array", &other)),
                    };
                    let space = self.resolve_space(&space, scope, inline, diag)?;
                    colorants.insert(key.clone(), space);
                }
            },
            Some(other) => return Err(Error::type_check("Dictionary", &other)),
            None => {},
        }

        Ok(Some(DeviceNAttributes {
            subtype,
            process,
            colorants,
        }))
    }

    fn name_list(&self, items: &[Object]) -> Result<Vec<String>> {
        items
            .iter()
            .map(|item| match deref(self.store, item)? {
                (Object::Name(n), _) => Ok(n),
                (Object::String(s), _) => Ok(String::from_utf8_lossy(&s).into_owned()),
                (other, _) => Err(Error::type_check("Name", &other)),
            })
            .collect()
    }

    fn resolve_alternate(
        &mut self,
        alternate: &Object,
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Arc<ColorSpace>> {
        let (direct, _) = deref(self.store, alternate)?;
        if !matches!(direct, Object::Name(_) | Object::Array(_)) {
            return Err(Error::type_check("Name or Array", &direct));
        }
        self.resolve_space(alternate, scope, inline, diag)
    }

    fn tint_transform(&self, transform: &Object) -> Result<TintTransform> {
        let (function, origin) = deref(self.store, transform)?;
        match function {
            Object::Dictionary(_) | Object::Stream { .. } => Ok(TintTransform { function, origin }),
            other => Err(Error::type_check("Function", &other)),
        }
    }

    fn create_iccbased(
        &mut self,
        items: &[Object],
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Arc<ColorSpace>> {
        let Some(stream) = items.get(1) else {
            return Err(Error::RangeCheck("ICCBased array lacks its stream".to_string()));
        };
        let (stream, _) = deref(self.store, stream)?;
        let dict = match &stream {
            Object::Stream { dict, .. } => dict,
            Object::Dictionary(_) => {
                return Err(Error::Undefined("ICCBased entry is a dictionary, not a stream".to_string()));
            },
            other => return Err(Error::type_check("Stream", other)),
        };

        let n = dict_get(self.store, dict, "N")?
            .and_then(|n| n.as_integer())
            .ok_or_else(|| Error::Undefined("ICCBased stream lacks /N".to_string()))?;
        if n < 1 || n as usize > MAX_COMPONENTS {
            return Err(Error::RangeCheck(format!("ICCBased /N {}", n)));
        }
        let n = n as usize;
        let range = self.icc_range(dict, n);

        let attempt = decode_stream_object(&stream, &self.options)
            .and_then(|bytes| self.icc.load(&bytes))
            .and_then(|profile| {
                if profile.components() != n {
                    log::debug!(
                        "ICCBased /N {} but profile carries {} components, probing",
                        n,
                        profile.components()
                    );
                    profile.probe()?;
                }
                Ok(profile)
            });

        match attempt {
            Ok(profile) => Ok(Arc::new(icc_space(profile, n, range))),
            Err(e) => {
                log::warn!("ICCBased profile unusable: {}", e);
                self.icc_fallback(dict, n, scope, inline, diag)
            },
        }
    }

    fn icc_range(&self, dict: &Dict, n: usize) -> Vec<f64> {
        let declared = dict_get(self.store, dict, "Range")
            .ok()
            .flatten()
            .and_then(|r| number_array(self.store, &r).ok())
            .filter(|r| r.len() >= 2 * n);
        match declared {
            Some(mut r) => {
                r.truncate(2 * n);
                r
            },
            None => [0.0, 1.0].repeat(n),
        }
    }

    fn icc_fallback(
        &mut self,
        dict: &Dict,
        n: usize,
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<Arc<ColorSpace>> {
        if let Some(alternate) = dict_get(self.store, dict, "Alternate")? {
            match self.resolve_space(&alternate, scope, inline, diag) {
                Ok(space) => {
                    diag.warn(Warnings::BADICC_USE_ALT, "Broken ICC profile, using /Alternate")?;
                    return Ok(space);
                },
                Err(e) => log::debug!("ICCBased /Alternate unusable: {}", e),
            }
        }
        diag.warn(
            Warnings::BADICC_USECOMPS,
            format!("Broken ICC profile, using a device space for /N {}", n),
        )?;
        ColorSpace::device_for_components(n)
            .map(Arc::new)
            .ok_or_else(|| Error::Undefined(format!("no device space with {} components", n)))
    }

    /// Build an ICC space from raw profile bytes, such as a JPX `colr` box.
    pub(crate) fn icc_from_bytes(&mut self, bytes: &[u8], components: usize) -> Result<Arc<ColorSpace>> {
        let profile = self.icc.load(bytes)?;
        if profile.components() != components {
            profile.probe()?;
        }
        let n = profile.components();
        Ok(Arc::new(icc_space(profile, n, [0.0, 1.0].repeat(n))))
    }

    fn create_calibrated(&mut self, family: &str, items: &[Object], origin: Option<ObjectRef>) -> Result<Arc<ColorSpace>> {
        let Some(params) = items.get(1) else {
            return Err(Error::RangeCheck(format!("{} array lacks its dictionary", family)));
        };
        let (params, dict_origin) = deref(self.store, params)?;
        let dict = params.as_dict().ok_or_else(|| Error::type_check("Dictionary", &params))?;

        let key = origin.or(dict_origin);
        if let Some(cached) = key.and_then(|k| self.calibrated.get(&k)) {
            if cached.family_name() == family {
                log::debug!("Reusing cached {} space", family);
                return Ok(cached.clone());
            }
        }

        let white_point = self.white_point(dict)?;
        let black_point = self.black_point(dict)?;
        let space = match family {
            "CalGray" => {
                let gamma = self.optional_number(dict, "Gamma")?.unwrap_or(1.0);
                if gamma < 0.0 {
                    return Err(Error::RangeCheck(format!("CalGray gamma {}", gamma)));
                }
                ColorSpace::CalGray(CalGray {
                    white_point,
                    black_point,
                    gamma,
                })
            },
            "CalRGB" => {
                let gamma = match self.optional_numbers(dict, "Gamma", 3)? {
                    Some(g) if g.iter().any(|v| *v < 0.0) => {
                        return Err(Error::RangeCheck(format!("CalRGB gamma {:?}", g)));
                    },
                    Some(g) => [g[0], g[1], g[2]],
                    None => [1.0; 3],
                };
                let matrix = match self.optional_numbers(dict, "Matrix", 9)? {
                    Some(m) => {
                        let mut out = [0.0; 9];
                        out.copy_from_slice(&m);
                        out
                    },
                    None => IDENTITY_MATRIX,
                };
                ColorSpace::CalRGB(CalRGB {
                    white_point,
                    black_point,
                    gamma,
                    matrix,
                })
            },
            _ => {
                let range = match self.optional_numbers(dict, "Range", 4)? {
                    Some(r) => [r[0], r[1], r[2], r[3]],
                    None => LAB_DEFAULT_RANGE,
                };
                ColorSpace::Lab(Lab {
                    white_point,
                    black_point,
                    range,
                })
            },
        };

        let space = Arc::new(space);
        if let Some(k) = key {
            self.calibrated.insert(k, space.clone());
        }
        Ok(space)
    }

    fn white_point(&self, dict: &Dict) -> Result<[f64; 3]> {
        let wp = self
            .optional_numbers(dict, "WhitePoint", 3)?
            .ok_or_else(|| Error::Undefined("calibrated space lacks /WhitePoint".to_string()))?;
        if wp[0] <= 0.0 || wp[2] <= 0.0 || wp[1] != 1.0 {
            return Err(Error::RangeCheck(format!("WhitePoint {:?}", wp)));
        }
        Ok([wp[0], wp[1], wp[2]])
    }

    fn black_point(&self, dict: &Dict) -> Result<[f64; 3]> {
        match self.optional_numbers(dict, "BlackPoint", 3)? {
            Some(bp) if bp.iter().any(|v| *v < 0.0) => Err(Error::RangeCheck(format!("BlackPoint {:?}", bp))),
            Some(bp) => Ok([bp[0], bp[1], bp[2]]),
            None => Ok([0.0; 3]),
        }
    }

    fn optional_number(&self, dict: &Dict, key: &str) -> Result<Option<f64>> {
        match dict_get(self.store, dict, key)? {
            None => Ok(None),
            Some(v) => v.as_number().map(Some).ok_or_else(|| Error::type_check("Number", &v)),
        }
    }

    fn optional_numbers(&self, dict: &Dict, key: &str, len: usize) -> Result<Option<Vec<f64>>> {
        let Some(value) = dict_get(self.store, dict, key)? else {
            return Ok(None);
        };
        let values = number_array(self.store, &value)?;
        if values.len() != len {
            return Err(Error::RangeCheck(format!(
                "/{} has {} entries, expected {}",
                key,
                values.len(),
                len
            )));
        }
        Ok(Some(values))
    }
}

fn icc_space(profile: crate::color::icc::IccProfile, declared: usize, mut range: Vec<f64>) -> ColorSpace {
    let components = profile.components();
    if profile.is_lab() {
        range = ICC_LAB_RANGE.to_vec();
    } else if range.len() < 2 * components {
        range.extend([0.0, 1.0].repeat(components - range.len() / 2));
    } else {
        range.truncate(2 * components);
    }
    ColorSpace::IccBased(IccBased {
        profile: Arc::new(profile),
        declared_components: declared,
        components,
        range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderOptions;
    use crate::graphics::NullDevice;
    use crate::object::MemoryStore;

    fn name(n: &str) -> Object {
        Object::name(n)
    }

    fn resolve(store: &MemoryStore, space: &Object) -> Result<Arc<ColorSpace>> {
        let mut device = NullDevice::default();
        let mut ctx = PaintContext::new(store, &mut device, RenderOptions::default());
        ctx.resolve_color_space(space, ResourceScope::empty())
    }

    #[test]
    fn test_device_names() {
        let store = MemoryStore::new();
        assert_eq!(*resolve(&store, &name("DeviceRGB")).unwrap(), ColorSpace::DeviceRGB);
        assert_eq!(*resolve(&store, &name("CMYK")).unwrap(), ColorSpace::DeviceCMYK);
        assert!(resolve(&store, &name("Pattern")).unwrap().is_pattern());
    }

    #[test]
    fn test_abbreviation_outside_inline_warns() {
        let store = MemoryStore::new();
        let mut device = NullDevice::default();
        let mut ctx = PaintContext::new(&store, &mut device, RenderOptions::default());
        ctx.resolve_color_space(&name("G"), ResourceScope::empty()).unwrap();
        assert!(ctx.diagnostics.has(Warnings::BAD_INLINECOLORSPACE));
    }

    #[test]
    fn test_abbreviation_escalates_when_strict() {
        let store = MemoryStore::new();
        let mut device = NullDevice::default();
        let mut ctx = PaintContext::new(&store, &mut device, RenderOptions::strict());
        let result = ctx.resolve_color_space(&name("RGB"), ResourceScope::empty());
        assert!(matches!(result, Err(Error::Escalated(_))));
    }

    #[test]
    fn test_non_name_non_array_is_typecheck() {
        let store = MemoryStore::new();
        assert!(matches!(resolve(&store, &Object::Integer(3)), Err(Error::TypeCheck { .. })));
    }

    #[test]
    fn test_single_element_device_array() {
        let store = MemoryStore::new();
        let space = Object::Array(vec![name("DeviceGray")]);
        assert_eq!(*resolve(&store, &space).unwrap(), ColorSpace::DeviceGray);
    }

    #[test]
    fn test_indexed_string_lookup() {
        let store = MemoryStore::new();
        let space = Object::Array(vec![
            name("Indexed"),
            name("DeviceGray"),
            Object::Integer(1),
            Object::String(vec![0, 255, 7]),
        ]);
        match &*resolve(&store, &space).unwrap() {
            ColorSpace::Indexed(ix) => assert_eq!(ix.lookup, vec![0, 255]),
            other => panic!("expected Indexed, got {:?}", other),
        }
    }

    #[test]
    fn test_indexed_hival_range() {
        let store = MemoryStore::new();
        let space = Object::Array(vec![
            name("Indexed"),
            name("DeviceGray"),
            Object::Integer(256),
            Object::String(vec![0; 257]),
        ]);
        assert!(matches!(resolve(&store, &space), Err(Error::RangeCheck(_))));
    }

    #[test]
    fn test_separation_requires_function() {
        let store = MemoryStore::new();
        let space = Object::Array(vec![
            name("Separation"),
            name("Gold"),
            name("DeviceCMYK"),
            Object::Integer(5),
        ]);
        assert!(matches!(resolve(&store, &space), Err(Error::TypeCheck { .. })));
    }

    #[test]
    fn test_calgray_white_point_checks() {
        let store = MemoryStore::new();
        let cal = |wp: Vec<f64>| {
            let mut d = Dict::new();
            d.insert("WhitePoint".to_string(), Object::Array(wp.into_iter().map(Object::Real).collect()));
            Object::Array(vec![name("CalGray"), Object::Dictionary(d)])
        };
        assert!(resolve(&store, &cal(vec![0.9505, 1.0, 1.089])).is_ok());
        assert!(matches!(resolve(&store, &cal(vec![0.9505, 0.9, 1.089])), Err(Error::RangeCheck(_))));
        assert!(matches!(resolve(&store, &cal(vec![0.0, 1.0, 1.089])), Err(Error::RangeCheck(_))));
        assert!(matches!(resolve(&store, &cal(vec![0.9505, 1.0])), Err(Error::RangeCheck(_))));
    }

    #[test]
    fn test_calibrated_cache_by_identity() {
        let mut store = MemoryStore::new();
        let mut d = Dict::new();
        d.insert(
            "WhitePoint".to_string(),
            Object::Array(vec![Object::Real(0.95), Object::Integer(1), Object::Real(1.09)]),
        );
        let r = store.insert(3, Object::Array(vec![name("CalRGB"), Object::Dictionary(d)]));

        let mut device = NullDevice::default();
        let mut ctx = PaintContext::new(&store, &mut device, RenderOptions::default());
        let a = ctx.resolve_color_space(&Object::Reference(r), ResourceScope::empty()).unwrap();
        let b = ctx.resolve_color_space(&Object::Reference(r), ResourceScope::empty()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(ctx.calibrated_cache_len(), 1);
    }

    #[test]
    fn test_lab_range_size() {
        let store = MemoryStore::new();
        let mut d = Dict::new();
        d.insert(
            "WhitePoint".to_string(),
            Object::Array(vec![Object::Real(0.95), Object::Integer(1), Object::Real(1.09)]),
        );
        d.insert("Range".to_string(), Object::Array(vec![Object::Integer(-50), Object::Integer(50)]));
        let space = Object::Array(vec![name("Lab"), Object::Dictionary(d)]);
        assert!(matches!(resolve(&store, &space), Err(Error::RangeCheck(_))));
    }
}

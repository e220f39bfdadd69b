//! Image type selection and compositing.
//!
//! Painting an image runs inside its own resolution level and graphics
//! state save. The image-local rendering intent, any transparency group and
//! every decode buffer are released on all exit paths.

use crate::color::marks::MarkKey;
use crate::color::{ColorSpace, PaintTarget};
use crate::context::PaintContext;
use crate::decoders::decode_with_dict;
use crate::diagnostics::{Diagnostics, Warnings};
use crate::error::{Error, Result};
use crate::graphics::{BlendMode, GroupParams, ImageParams, RenderingIntent, SoftMaskParams};
use crate::images::descriptor::{ImageDescriptor, ImageInfo, MaskEntry};
use crate::images::mask::{geometry, image_matte, setup_type4, smask_from_data};
use crate::images::pump::RowPump;
use crate::images::ImageType;
use crate::object::{deref, Object};
use crate::resources::{Resource, ResourceScope};
use std::io::Cursor;

/// Images and soft masks are painted into the unit square.
const UNIT_BOX: [f64; 4] = [0.0, 0.0, 1.0, 1.0];

impl<'a> PaintContext<'a> {
    /// Paint an image XObject (a stream, or a reference to one).
    ///
    /// Unless stop-on-error is set, a failing image is recorded as
    /// [`Warnings::IMAGE_ERROR`] and skipped.
    pub fn render_image(&mut self, image: &Object, scope: ResourceScope<'_>) -> Result<()> {
        let (value, origin) = deref(self.store, image)?;
        self.run_image(&Resource { value, origin }, scope, false)
    }

    pub(crate) fn run_image(&mut self, image: &Resource, scope: ResourceScope<'_>, inline: bool) -> Result<()> {
        let mut diag = self.new_diagnostics();
        let result = match self.paint_image(image, scope, inline, &mut diag) {
            Err(e) if !self.options.stop_on_error => {
                diag.note(Warnings::IMAGE_ERROR, format!("Image skipped: {}", e));
                Ok(())
            },
            other => other,
        };
        self.diagnostics.merge(diag);
        result
    }

    /// Paint one image without error suppression. Also used for soft masks.
    pub(crate) fn paint_image(
        &mut self,
        image: &Resource,
        scope: ResourceScope<'_>,
        inline: bool,
        diag: &mut Diagnostics,
    ) -> Result<()> {
        self.with_mark(|ctx| {
            if let Some(r) = image.origin {
                ctx.visit(MarkKey::Object(r))?;
            }
            let info = ImageInfo::read(ctx.store, &image.value, image.origin, scope, inline, diag)?;

            if let (Some(oc), Some(gate)) = (&info.optional_content, ctx.optional_content) {
                if !gate.is_visible(ctx.store, oc) {
                    log::debug!("Image hidden by optional content");
                    return Ok(());
                }
            }

            let saved_intent = ctx.gstate.rendering_intent();
            if let Some(intent) = &info.intent {
                match RenderingIntent::from_name(intent) {
                    Some(intent) => ctx.gstate.set_rendering_intent(intent),
                    None => log::debug!("Image /Intent /{} not recognised, ignored", intent),
                }
            }
            let result = ctx
                .describe(info, scope, diag)
                .and_then(|desc| ctx.composite(desc, scope, diag));
            ctx.gstate.set_rendering_intent(saved_intent);
            result
        })
    }

    fn composite(&mut self, desc: ImageDescriptor, scope: ResourceScope<'_>, diag: &mut Diagnostics) -> Result<()> {
        self.with_gsave(move |ctx| {
            if let Some(space) = &desc.color_space {
                ctx.install_space(space.clone(), PaintTarget::Fill)?;
            }

            let mut groups = 0;
            let result = ctx.select_and_paint(&desc, scope, diag, &mut groups);
            let mut closed = Ok(());
            for _ in 0..groups {
                if let Err(e) = ctx.device.end_transparency_group() {
                    log::warn!("Failed to close image transparency group: {}", e);
                    closed = closed.and(Err(e));
                }
            }
            // The gstate copy must be the last holder when the save is popped.
            drop(desc);
            result.and(closed)
        })
    }

    fn select_and_paint(
        &mut self,
        desc: &ImageDescriptor,
        scope: ResourceScope<'_>,
        diag: &mut Diagnostics,
        groups: &mut usize,
    ) -> Result<()> {
        let transparency = self.options.page_has_transparency;

        let mut soft_mask = desc.info.soft_mask.clone();
        if transparency && desc.is_jpx && desc.info.smask_in_data != 0 {
            if soft_mask.is_some() {
                log::warn!("SMaskInData set on an image that already has an /SMask");
            } else {
                let bits = desc.jpx.map(|j| j.bits_per_component).unwrap_or(8);
                soft_mask = smask_from_data(&desc.info, bits, desc.components);
            }
        }
        if !transparency && soft_mask.take().is_some() {
            log::debug!("Page has no transparency, image /SMask ignored");
        }

        let mut image_type = ImageType::Type1;
        let mut mask_plane = None;

        if let Some(smask) = &soft_mask {
            if self.options.preserve_smask {
                match self.soft_mask_plane(smask, scope, diag) {
                    Ok((kind, plane)) => {
                        image_type = kind;
                        mask_plane = Some(plane);
                    },
                    Err(e @ Error::Allocation(_)) => return Err(e),
                    Err(e) => diag.note(Warnings::MASK_ERROR, format!("Soft mask dropped: {}", e)),
                }
            } else if let Err(e) = self.paint_soft_mask(smask, scope, diag) {
                if matches!(e, Error::Allocation(_)) {
                    return Err(e);
                }
                diag.note(Warnings::MASK_ERROR, format!("Soft mask dropped: {}", e));
            }
            self.begin_group(true, groups)?;
        } else if self.gstate.current().soft_mask.is_some() {
            self.begin_group(true, groups)?;
        } else if transparency && self.gstate.current().needs_compositing() {
            self.begin_group(false, groups)?;
        }

        // An /SMask entry overrides /Mask even when the soft mask itself was dropped.
        if desc.info.soft_mask.is_none() && soft_mask.is_none() && !desc.info.image_mask {
            match &desc.info.mask {
                Some(MaskEntry::ColorKey(entries)) => {
                    let indexed = desc.color_space.as_deref().is_some_and(ColorSpace::is_indexed);
                    match setup_type4(
                        self.store,
                        entries,
                        desc.bits_per_component,
                        desc.components,
                        indexed,
                        diag,
                    ) {
                        Ok(mask_color) => image_type = ImageType::Type4 { mask_color },
                        Err(e) => diag.note(Warnings::MASK_ERROR, format!("Colour-key mask dropped: {}", e)),
                    }
                },
                Some(MaskEntry::Stencil(stencil)) => match self.predecode_mask(stencil, true, scope, diag) {
                    Ok((mask_desc, plane)) => {
                        image_type = ImageType::Type3 {
                            mask: geometry(&mask_desc),
                        };
                        mask_plane = Some(plane);
                    },
                    Err(e @ Error::Allocation(_)) => return Err(e),
                    Err(e) => diag.note(Warnings::MASK_ERROR, format!("Stencil mask dropped: {}", e)),
                },
                None => {},
            }
        }

        log::debug!(
            "{} image {}x{}, {} x {} bits",
            image_type.name(),
            desc.info.width,
            desc.info.height,
            desc.components,
            desc.bits_per_component
        );
        self.stream_image(desc, image_type, mask_plane)
    }

    fn begin_group(&mut self, isolated: bool, groups: &mut usize) -> Result<()> {
        self.device.begin_transparency_group(&GroupParams {
            isolated,
            knockout: false,
            bbox: UNIT_BOX,
        })?;
        *groups += 1;
        Ok(())
    }

    /// Render the soft mask into a luminosity mask group for the device.
    fn paint_soft_mask(&mut self, smask: &Resource, scope: ResourceScope<'_>, diag: &mut Diagnostics) -> Result<()> {
        let dict = smask.value.as_dict().ok_or_else(|| Error::type_check("Stream", &smask.value))?;
        let matte = image_matte(self.store, dict)?.unwrap_or_default();
        self.device.begin_transparency_mask(&SoftMaskParams { matte, bbox: UNIT_BOX })?;

        let painted = self.with_gsave(|ctx| {
            let state = ctx.gstate.current_mut();
            state.soft_mask = None;
            state.fill_alpha = 1.0;
            state.stroke_alpha = 1.0;
            state.blend_mode = BlendMode::Compatible;
            ctx.paint_image(smask, scope, false, diag)
        });
        let ended = self.device.end_transparency_mask();
        painted.and(ended)
    }

    /// Decode the soft mask for the device to composite itself.
    fn soft_mask_plane(
        &mut self,
        smask: &Resource,
        scope: ResourceScope<'_>,
        diag: &mut Diagnostics,
    ) -> Result<(ImageType, Vec<u8>)> {
        let dict = smask.value.as_dict().ok_or_else(|| Error::type_check("Stream", &smask.value))?;
        let matte = image_matte(self.store, dict)?;
        let (mask_desc, plane) = self.predecode_mask(smask, false, scope, diag)?;
        let kind = ImageType::Type3x {
            soft_mask: geometry(&mask_desc),
            matte,
        };
        Ok((kind, plane))
    }

    fn stream_image(&mut self, desc: &ImageDescriptor, image_type: ImageType, mask_plane: Option<Vec<u8>>) -> Result<()> {
        let dict = desc.info.dict().ok_or_else(|| Error::type_check("Stream", &desc.info.image))?;
        let samples = decode_with_dict(desc.info.data(), dict, &self.options)?;
        let line_len = desc.row_length()?;

        let params = ImageParams {
            image_type,
            width: desc.info.width,
            height: desc.info.height,
            bits_per_component: desc.bits_per_component,
            components: desc.components,
            color_space: desc.color_space.clone(),
            decode: desc.decode.clone(),
            interpolate: desc.info.interpolate,
            image_mask: desc.info.image_mask,
            matrix: desc.matrix(),
        };

        let mut pump = RowPump::new(Cursor::new(samples), line_len, desc.info.height, mask_plane)?;
        self.device.begin_image(&params)?;
        let pumped = pump.run(&mut *self.device);
        let ended = self.device.end_image();
        pumped.and(ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderOptions;
    use crate::graphics::NullDevice;
    use crate::object::{Dict, MemoryStore};
    use bytes::Bytes;

    fn stream(entries: &[(&str, Object)], data: Vec<u8>) -> Object {
        let dict: Dict = entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        Object::Stream {
            dict,
            data: Bytes::from(data),
        }
    }

    #[test]
    fn test_type1_streams_every_byte() {
        let store = MemoryStore::new();
        let mut device = NullDevice::default();
        let mut ctx = PaintContext::new(&store, &mut device, RenderOptions::default());
        let image = stream(
            &[
                ("Width", Object::Integer(10)),
                ("Height", Object::Integer(10)),
                ("BitsPerComponent", Object::Integer(8)),
                ("ColorSpace", Object::name("DeviceRGB")),
            ],
            vec![0x80; 300],
        );
        ctx.render_image(&image, ResourceScope::empty()).unwrap();
        assert!(ctx.diagnostics.is_empty());
        drop(ctx);
        assert_eq!(device.bytes_accepted, 300);
    }

    #[test]
    fn test_short_data_skipped_when_lenient() {
        let store = MemoryStore::new();
        let mut device = NullDevice::default();
        let mut ctx = PaintContext::new(&store, &mut device, RenderOptions::default());
        let image = stream(
            &[
                ("Width", Object::Integer(4)),
                ("Height", Object::Integer(4)),
                ("BitsPerComponent", Object::Integer(8)),
                ("ColorSpace", Object::name("DeviceGray")),
            ],
            vec![0; 10],
        );
        ctx.render_image(&image, ResourceScope::empty()).unwrap();
        assert!(ctx.diagnostics.has(Warnings::IMAGE_ERROR));
        assert_eq!(ctx.resolution_depth(), 0);
    }

    #[test]
    fn test_self_referencing_smask_is_contained() {
        let mut store = MemoryStore::new();
        let mut dict = Dict::new();
        dict.insert("Width".to_string(), Object::Integer(1));
        dict.insert("Height".to_string(), Object::Integer(1));
        dict.insert("BitsPerComponent".to_string(), Object::Integer(8));
        dict.insert("ColorSpace".to_string(), Object::name("DeviceGray"));
        dict.insert("SMask".to_string(), Object::Reference(crate::object::ObjectRef::new(5, 0)));
        let image = store.insert(
            5,
            Object::Stream {
                dict,
                data: Bytes::from_static(&[0]),
            },
        );

        let mut device = NullDevice::default();
        let options = RenderOptions::default().with_page_transparency(true);
        let mut ctx = PaintContext::new(&store, &mut device, options);
        ctx.render_image(&Object::Reference(image), ResourceScope::empty()).unwrap();
        assert!(ctx.diagnostics.has(Warnings::MASK_ERROR));
        assert_eq!(ctx.resolution_depth(), 0);
        assert_eq!(ctx.gstate.depth(), 1);
    }
}

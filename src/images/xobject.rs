//! `Do` and inline-image entry points.

use crate::color::marks::MarkKey;
use crate::context::PaintContext;
use crate::diagnostics::{Diagnostics, Warnings};
use crate::error::{Error, Result};
use crate::object::{dict_get, Dict, Object};
use crate::resources::{Resource, ResourceCategory, ResourceScope};
use bytes::Bytes;

impl<'a> PaintContext<'a> {
    /// `Do`: paint the named XObject.
    ///
    /// Images are painted here, forms are handed to the device. Failures are
    /// recorded and suppressed unless stop-on-error is set.
    pub fn do_xobject(&mut self, name: &str, scope: ResourceScope<'_>) -> Result<()> {
        let mut diag = self.new_diagnostics();
        let result = self.with_mark(|ctx| {
            ctx.visit(MarkKey::Resource(ResourceCategory::XObject, name.to_string()))?;
            let found = scope
                .find(ctx.store, ResourceCategory::XObject, name)?
                .ok_or_else(|| Error::Undefined(format!("XObject /{}", name)))?;
            if !matches!(found.value, Object::Stream { .. } | Object::Dictionary(_)) {
                return Err(Error::type_check("Stream", &found.value));
            }
            ctx.render_image_or_form(&found, scope, &mut diag)
        });
        let result = match result {
            Err(e) if !self.options.stop_on_error => {
                diag.note(Warnings::IMAGE_ERROR, format!("XObject /{} skipped: {}", name, e));
                Ok(())
            },
            other => other,
        };
        self.diagnostics.merge(diag);
        result
    }

    fn render_image_or_form(
        &mut self,
        xobject: &Resource,
        scope: ResourceScope<'_>,
        diag: &mut Diagnostics,
    ) -> Result<()> {
        let dict = xobject
            .value
            .as_dict()
            .ok_or_else(|| Error::type_check("Stream", &xobject.value))?;
        let subtype = dict_get(self.store, dict, "Subtype")?
            .ok_or_else(|| Error::Undefined("XObject lacks /Subtype".to_string()))?;
        match subtype.as_name() {
            Some("Image") => self.paint_image(xobject, scope, false, diag),
            Some("Form") => {
                if let Some(r) = xobject.origin {
                    self.visit(MarkKey::Object(r))?;
                }
                self.device.render_form(&xobject.value)
            },
            Some("PS") => diag.warn(Warnings::DEPRECATED_PS_XOBJECT, "PostScript XObject ignored"),
            _ => Err(Error::type_check("Image or Form", &subtype)),
        }
    }

    /// `BI ... ID ... EI`: paint an inline image from its dictionary and
    /// raw data.
    pub fn render_inline_image(&mut self, dict: &Dict, data: &[u8], scope: ResourceScope<'_>) -> Result<()> {
        let image = Resource {
            value: Object::Stream {
                dict: dict.clone(),
                data: Bytes::copy_from_slice(data),
            },
            origin: None,
        };
        self.run_image(&image, scope, true)
    }
}

//! Colour operators: cs/CS, sc/scn, g/rg/k and ri.

use crate::color::space::ColorSpace;
use crate::context::PaintContext;
use crate::diagnostics::Warnings;
use crate::error::{Error, Result};
use crate::graphics::RenderingIntent;
use crate::object::{deref, Object};
use crate::resources::ResourceScope;
use std::sync::Arc;

/// Fill or stroke target of a colour operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintTarget {
    /// Non-stroking (lower-case operators)
    Fill,
    /// Stroking (upper-case operators)
    Stroke,
}

impl<'a> PaintContext<'a> {
    /// Resolve `space` and make it current for `target`, with its initial colour.
    ///
    /// Resolution or device installation failure leaves the graphics state
    /// untouched.
    pub fn set_color_space(&mut self, space: &Object, scope: ResourceScope<'_>, target: PaintTarget) -> Result<()> {
        let mut diag = self.new_diagnostics();
        let result = self
            .resolve_space(space, scope, false, &mut diag)
            .and_then(|resolved| self.install_space(resolved, target));
        self.diagnostics.merge(diag);
        result
    }

    /// `cs` / `CS`: the operand must be a name.
    pub fn set_color_space_operator(
        &mut self,
        operand: &Object,
        scope: ResourceScope<'_>,
        target: PaintTarget,
    ) -> Result<()> {
        if operand.as_name().is_none() {
            return Err(Error::type_check("Name", operand));
        }
        self.set_color_space(operand, scope, target)
    }

    pub(crate) fn install_space(&mut self, space: Arc<ColorSpace>, target: PaintTarget) -> Result<()> {
        self.device.install_color_space(&space)?;
        let initial = space.initial_color();
        log::debug!("Installing {} for {:?}", space.family_name(), target);
        let state = self.gstate.current_mut();
        match target {
            PaintTarget::Fill => {
                state.fill_color = initial;
                state.fill_pattern = None;
                self.gstate.set_fill_space(space, &mut *self.device);
            },
            PaintTarget::Stroke => {
                state.stroke_color = initial;
                state.stroke_pattern = None;
                self.gstate.set_stroke_space(space, &mut *self.device);
            },
        }
        Ok(())
    }

    fn set_device_color(&mut self, space: ColorSpace, values: &[f64], target: PaintTarget) -> Result<()> {
        self.install_space(Arc::new(space), target)?;
        let values: Vec<f64> = values.iter().map(|v| v.clamp(0.0, 1.0)).collect();
        let state = self.gstate.current_mut();
        match target {
            PaintTarget::Fill => state.fill_color = values,
            PaintTarget::Stroke => state.stroke_color = values,
        }
        Ok(())
    }

    /// `g` / `G`
    pub fn set_gray(&mut self, gray: f64, target: PaintTarget) -> Result<()> {
        self.set_device_color(ColorSpace::DeviceGray, &[gray], target)
    }

    /// `rg` / `RG`
    pub fn set_rgb(&mut self, r: f64, g: f64, b: f64, target: PaintTarget) -> Result<()> {
        self.set_device_color(ColorSpace::DeviceRGB, &[r, g, b], target)
    }

    /// `k` / `K`
    pub fn set_cmyk(&mut self, c: f64, m: f64, y: f64, k: f64, target: PaintTarget) -> Result<()> {
        self.set_device_color(ColorSpace::DeviceCMYK, &[c, m, y, k], target)
    }

    /// `sc` / `scn` / `SC` / `SCN`.
    ///
    /// The number of operands consumed comes from the current space. In a
    /// Pattern space the last operand names the pattern and the preceding
    /// ones (if the pattern space has a base) colour it.
    pub fn set_color(&mut self, operands: &[Object], target: PaintTarget) -> Result<()> {
        let space = match target {
            PaintTarget::Fill => self.gstate.current().fill_space.clone(),
            PaintTarget::Stroke => self.gstate.current().stroke_space.clone(),
        };

        let (operands, pattern) = match (&*space, operands.split_last()) {
            (ColorSpace::Pattern(_), Some((Object::Name(name), rest))) => (rest, Some(name.clone())),
            (ColorSpace::Pattern(_), _) => {
                return Err(Error::TypeCheck {
                    expected: "pattern name".to_string(),
                    found: operands.last().map_or("nothing", Object::type_name).to_string(),
                });
            },
            _ => (operands, None),
        };

        let needed = match (&*space, &pattern) {
            (ColorSpace::Pattern(p), _) => p.base.as_ref().map_or(0, |b| b.components()),
            _ => space.components(),
        };
        if operands.len() < needed {
            return Err(Error::RangeCheck(format!(
                "{} needs {} colour operands, got {}",
                space.family_name(),
                needed,
                operands.len()
            )));
        }

        let mut values = Vec::with_capacity(needed);
        for operand in &operands[operands.len() - needed..] {
            let (value, _) = deref(self.store, operand)?;
            values.push(value.as_number().ok_or_else(|| Error::type_check("Number", &value))?);
        }

        let state = self.gstate.current_mut();
        match target {
            PaintTarget::Fill => {
                state.fill_color = values;
                state.fill_pattern = pattern;
            },
            PaintTarget::Stroke => {
                state.stroke_color = values;
                state.stroke_pattern = pattern;
            },
        }
        Ok(())
    }

    /// `ri`. Unknown intents are reported and ignored.
    pub fn set_rendering_intent(&mut self, intent: &str) -> Result<()> {
        match RenderingIntent::from_name(intent) {
            Some(intent) => {
                self.gstate.set_rendering_intent(intent);
                Ok(())
            },
            None => self
                .diagnostics
                .warn(Warnings::RENDERING_INTENT, format!("Unknown rendering intent /{}", intent)),
        }
    }

    /// Colour from a bare numeric array, choosing the device space by length.
    ///
    /// An empty array selects nothing.
    pub fn set_color_array(&mut self, values: &[f64], target: PaintTarget) -> Result<()> {
        match *values {
            [] => Ok(()),
            [g] => self.set_gray(g, target),
            [r, g, b] => self.set_rgb(r, g, b, target),
            [c, m, y, k] => self.set_cmyk(c, m, y, k, target),
            _ => Err(Error::RangeCheck(format!("{} colour components", values.len()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderOptions;
    use crate::graphics::NullDevice;
    use crate::object::MemoryStore;

    #[test]
    fn test_cmyk_operator_sets_space_and_color() {
        let store = MemoryStore::new();
        let mut device = NullDevice::default();
        let mut ctx = PaintContext::new(&store, &mut device, RenderOptions::default());
        ctx.set_cmyk(0.1, 0.2, 0.3, 1.5, PaintTarget::Stroke).unwrap();
        let state = ctx.gstate.current();
        assert_eq!(*state.stroke_space, ColorSpace::DeviceCMYK);
        assert_eq!(state.stroke_color, vec![0.1, 0.2, 0.3, 1.0]);
        assert_eq!(*state.fill_space, ColorSpace::DeviceGray);
    }

    #[test]
    fn test_cs_requires_name() {
        let store = MemoryStore::new();
        let mut device = NullDevice::default();
        let mut ctx = PaintContext::new(&store, &mut device, RenderOptions::default());
        let operand = Object::Array(vec![Object::name("DeviceRGB")]);
        let result = ctx.set_color_space_operator(&operand, ResourceScope::empty(), PaintTarget::Fill);
        assert!(matches!(result, Err(Error::TypeCheck { .. })));
    }

    #[test]
    fn test_cs_initial_color() {
        let store = MemoryStore::new();
        let mut device = NullDevice::default();
        let mut ctx = PaintContext::new(&store, &mut device, RenderOptions::default());
        ctx.set_color_space_operator(&Object::name("DeviceCMYK"), ResourceScope::empty(), PaintTarget::Fill)
            .unwrap();
        assert_eq!(ctx.gstate.current().fill_color, vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_scn_with_pattern_name() {
        let store = MemoryStore::new();
        let mut device = NullDevice::default();
        let mut ctx = PaintContext::new(&store, &mut device, RenderOptions::default());
        ctx.set_color_space(&Object::name("Pattern"), ResourceScope::empty(), PaintTarget::Fill)
            .unwrap();
        ctx.set_color(&[Object::name("P1")], PaintTarget::Fill).unwrap();
        assert_eq!(ctx.gstate.current().fill_pattern.as_deref(), Some("P1"));
    }

    #[test]
    fn test_sc_too_few_operands() {
        let store = MemoryStore::new();
        let mut device = NullDevice::default();
        let mut ctx = PaintContext::new(&store, &mut device, RenderOptions::default());
        ctx.set_rgb(0.0, 0.0, 0.0, PaintTarget::Fill).unwrap();
        let result = ctx.set_color(&[Object::Real(0.5)], PaintTarget::Fill);
        assert!(matches!(result, Err(Error::RangeCheck(_))));
    }

    #[test]
    fn test_unknown_intent_is_ignored() {
        let store = MemoryStore::new();
        let mut device = NullDevice::default();
        let mut ctx = PaintContext::new(&store, &mut device, RenderOptions::default());
        ctx.set_rendering_intent("Perceptual").unwrap();
        ctx.set_rendering_intent("Vivid").unwrap();
        assert_eq!(ctx.gstate.rendering_intent(), RenderingIntent::Perceptual);
        assert!(ctx.diagnostics.has(Warnings::RENDERING_INTENT));
    }

    #[test]
    fn test_color_array_sizes() {
        let store = MemoryStore::new();
        let mut device = NullDevice::default();
        let mut ctx = PaintContext::new(&store, &mut device, RenderOptions::default());
        ctx.set_color_array(&[0.2, 0.4, 0.6], PaintTarget::Fill).unwrap();
        assert_eq!(*ctx.gstate.current().fill_space, ColorSpace::DeviceRGB);
        assert!(matches!(
            ctx.set_color_array(&[0.2, 0.4], PaintTarget::Fill),
            Err(Error::RangeCheck(_))
        ));
    }
}

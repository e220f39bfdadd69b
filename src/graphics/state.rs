//! Graphics state and the q/Q stack.

use crate::color::ColorSpace;
use crate::graphics::device::Device;
use crate::object::Object;
use std::sync::Arc;

/// Rendering intents (PDF 8.6.5.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingIntent {
    /// `/AbsoluteColorimetric`
    AbsoluteColorimetric,
    /// `/RelativeColorimetric`
    #[default]
    RelativeColorimetric,
    /// `/Saturation`
    Saturation,
    /// `/Perceptual`
    Perceptual,
}

impl RenderingIntent {
    /// Parse an intent name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "AbsoluteColorimetric" => Some(RenderingIntent::AbsoluteColorimetric),
            "RelativeColorimetric" => Some(RenderingIntent::RelativeColorimetric),
            "Saturation" => Some(RenderingIntent::Saturation),
            "Perceptual" => Some(RenderingIntent::Perceptual),
            _ => None,
        }
    }
}

/// Blend modes relevant to image painting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// `/Normal`
    #[default]
    Normal,
    /// `/Compatible`, treated as Normal
    Compatible,
    /// Any separable or non-separable mode other than Normal
    Other,
}

impl BlendMode {
    /// Parse a blend mode name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Normal" => BlendMode::Normal,
            "Compatible" => BlendMode::Compatible,
            _ => BlendMode::Other,
        }
    }

    /// Whether compositing reduces to simple painting.
    pub fn is_normal(self) -> bool {
        matches!(self, BlendMode::Normal | BlendMode::Compatible)
    }
}

/// The parts of the PDF graphics state the painting core reads or writes.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    /// Fill colour space
    pub fill_space: Arc<ColorSpace>,
    /// Stroke colour space
    pub stroke_space: Arc<ColorSpace>,
    /// Fill colour components
    pub fill_color: Vec<f64>,
    /// Stroke colour components
    pub stroke_color: Vec<f64>,
    /// Pattern name selected with `scn`/`SCN`
    pub fill_pattern: Option<String>,
    /// Pattern name selected with `SCN`
    pub stroke_pattern: Option<String>,
    /// Rendering intent
    pub rendering_intent: RenderingIntent,
    /// Fill alpha (ca)
    pub fill_alpha: f64,
    /// Stroke alpha (CA)
    pub stroke_alpha: f64,
    /// Blend mode (BM)
    pub blend_mode: BlendMode,
    /// Soft mask dictionary from ExtGState (SMask)
    pub soft_mask: Option<Object>,
}

impl GraphicsState {
    /// Initial graphics state: DeviceGray black, opaque, Normal blending.
    pub fn new() -> Self {
        let gray = Arc::new(ColorSpace::DeviceGray);
        Self {
            fill_space: gray.clone(),
            stroke_space: gray,
            fill_color: vec![0.0],
            stroke_color: vec![0.0],
            fill_pattern: None,
            stroke_pattern: None,
            rendering_intent: RenderingIntent::default(),
            fill_alpha: 1.0,
            stroke_alpha: 1.0,
            blend_mode: BlendMode::Normal,
            soft_mask: None,
        }
    }

    /// Whether painting requires a transparency group.
    pub fn needs_compositing(&self) -> bool {
        self.fill_alpha < 1.0 || !self.blend_mode.is_normal()
    }
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack of graphics states for save/restore.
///
/// Colour spaces leaving the stack for the last time are torn down through
/// the device before their final reference is dropped.
#[derive(Debug, Clone)]
pub struct GraphicsStack {
    stack: Vec<GraphicsState>,
}

impl GraphicsStack {
    /// Create a stack holding the initial state.
    pub fn new() -> Self {
        Self {
            stack: vec![GraphicsState::new()],
        }
    }

    /// Current graphics state.
    pub fn current(&self) -> &GraphicsState {
        // The stack is never empty: restore() keeps the initial state.
        &self.stack[self.stack.len() - 1]
    }

    /// Mutable access to the current graphics state.
    pub fn current_mut(&mut self) -> &mut GraphicsState {
        let top = self.stack.len() - 1;
        &mut self.stack[top]
    }

    /// Save the current state (q).
    pub fn save(&mut self) {
        let state = self.current().clone();
        self.stack.push(state);
    }

    /// Restore the previous state (Q). The initial state is never popped.
    pub fn restore(&mut self, device: &mut dyn Device) {
        if self.stack.len() > 1 {
            if let Some(popped) = self.stack.pop() {
                release_space(popped.fill_space, device);
                release_space(popped.stroke_space, device);
            }
        }
    }

    /// Current stack depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Replace the fill colour space, releasing the previous one.
    pub fn set_fill_space(&mut self, space: Arc<ColorSpace>, device: &mut dyn Device) {
        let old = std::mem::replace(&mut self.current_mut().fill_space, space);
        release_space(old, device);
    }

    /// Replace the stroke colour space, releasing the previous one.
    pub fn set_stroke_space(&mut self, space: Arc<ColorSpace>, device: &mut dyn Device) {
        let old = std::mem::replace(&mut self.current_mut().stroke_space, space);
        release_space(old, device);
    }

    /// Current rendering intent.
    pub fn rendering_intent(&self) -> RenderingIntent {
        self.current().rendering_intent
    }

    /// Set the rendering intent.
    pub fn set_rendering_intent(&mut self, intent: RenderingIntent) {
        self.current_mut().rendering_intent = intent;
    }
}

impl Default for GraphicsStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop a colour space, first running device teardown for any function or
/// pattern state it is the last owner of.
pub fn release_space(space: Arc<ColorSpace>, device: &mut dyn Device) {
    if Arc::strong_count(&space) == 1 {
        teardown(&space, device);
    }
}

fn teardown(space: &ColorSpace, device: &mut dyn Device) {
    if let Some(tint) = space.tint_transform() {
        device.release_tint_transform(tint);
    }
    if let ColorSpace::Pattern(pattern) = space {
        device.release_pattern(pattern);
    }
    for child in space.children() {
        // A child referenced only by this parent dies with it.
        if Arc::strong_count(child) == 1 {
            teardown(child, device);
        }
    }
}

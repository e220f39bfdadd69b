//! Per-document painting context.

use crate::color::icc::{HeaderIccLoader, IccLoader};
use crate::color::marks::{MarkKey, ResolutionContext};
use crate::color::ColorSpace;
use crate::config::RenderOptions;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::graphics::{Device, GraphicsStack, OptionalContent};
use crate::object::{ObjectRef, ObjectStore};
use std::collections::HashMap;
use std::sync::Arc;

/// Everything colour and image painting needs from its surroundings.
///
/// One context lives for the duration of a document (or page). It owns the
/// graphics state stack, the resolution guard, and the calibrated-space
/// cache; the object store and device are borrowed from the embedding
/// interpreter.
pub struct PaintContext<'a> {
    /// Indirect object access
    pub store: &'a dyn ObjectStore,
    /// Rasterizer and transparency host
    pub device: &'a mut dyn Device,
    /// Policy flags
    pub options: RenderOptions,
    /// Graphics state stack
    pub gstate: GraphicsStack,
    /// Diagnostics merged from every completed invocation
    pub diagnostics: Diagnostics,
    pub(crate) icc: Box<dyn IccLoader + 'a>,
    pub(crate) optional_content: Option<&'a dyn OptionalContent>,
    pub(crate) marks: ResolutionContext,
    pub(crate) calibrated: HashMap<ObjectRef, Arc<ColorSpace>>,
}

impl<'a> PaintContext<'a> {
    /// Create a context with the header-only ICC loader and everything visible.
    pub fn new(store: &'a dyn ObjectStore, device: &'a mut dyn Device, options: RenderOptions) -> Self {
        Self {
            store,
            device,
            options,
            gstate: GraphicsStack::new(),
            diagnostics: Diagnostics::new(options.stop_on_warning),
            icc: Box::new(HeaderIccLoader),
            optional_content: None,
            marks: ResolutionContext::new(options.max_resolution_depth),
            calibrated: HashMap::new(),
        }
    }

    /// Use a different ICC profile loader.
    pub fn with_icc_loader(mut self, loader: Box<dyn IccLoader + 'a>) -> Self {
        self.icc = loader;
        self
    }

    /// Evaluate `/OC` entries through `oc`.
    pub fn with_optional_content(mut self, oc: &'a dyn OptionalContent) -> Self {
        self.optional_content = Some(oc);
        self
    }

    /// Number of resolution levels currently open. Zero between calls.
    pub fn resolution_depth(&self) -> usize {
        self.marks.depth()
    }

    /// Number of calibrated spaces cached so far.
    pub fn calibrated_cache_len(&self) -> usize {
        self.calibrated.len()
    }

    /// A fresh per-invocation diagnostics collector.
    pub fn new_diagnostics(&self) -> Diagnostics {
        Diagnostics::new(self.options.stop_on_warning)
    }

    /// Run `f` inside a resolution level, closing it on every exit path.
    pub(crate) fn with_mark<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.marks.push_mark()?;
        let result = f(self);
        self.marks.clear_to_mark();
        result
    }

    /// Record an identity at the current resolution level.
    pub(crate) fn visit(&mut self, key: MarkKey) -> Result<()> {
        self.marks.visit(key)
    }

    /// Run `f` between a graphics-state save and restore.
    pub(crate) fn with_gsave<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.gstate.save();
        let result = f(self);
        self.gstate.restore(&mut *self.device);
        result
    }
}

//! Per-invocation diagnostics.
//!
//! Each top-level paint call owns a [`Diagnostics`] value. Sub-pipelines
//! (soft masks, nested colour spaces) may collect into a child value that is
//! merged upward once they finish, so repeated or nested invocations never
//! interleave unrelated warnings.

use crate::error::{Error, Result};
use bitflags::bitflags;

bitflags! {
    /// Recoverable conditions observed while painting.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Warnings: u32 {
        /// Malformed or out-of-range image dictionary entry
        const BAD_IMAGEDICT = 1 << 0;
        /// Abbreviated key outside an inline image, or full key inside one
        const BAD_INLINEIMAGEKEY = 1 << 1;
        /// Inline colour-space abbreviation used outside an inline image
        const BAD_INLINECOLORSPACE = 1 << 2;
        /// Broken ICC profile replaced by its Alternate space
        const BADICC_USE_ALT = 1 << 3;
        /// Broken ICC profile replaced by a device space matching /N
        const BADICC_USECOMPS = 1 << 4;
        /// An image failed and was skipped
        const IMAGE_ERROR = 1 << 5;
        /// DeviceN with a single ink
        const DEVICEN_SINGLE_INK = 1 << 6;
        /// JPX header could not be scanned
        const JPX_HEADER = 1 << 7;
        /// JPX enumerated colour space approximated
        const JPX_COLORSPACE = 1 << 8;
        /// Mask or soft mask dropped, image painted unmasked
        const MASK_ERROR = 1 << 9;
        /// PostScript XObject ignored
        const DEPRECATED_PS_XOBJECT = 1 << 10;
        /// Image without a colour space painted as DeviceRGB
        const MISSING_COLORSPACE = 1 << 11;
        /// Unknown rendering intent ignored
        const RENDERING_INTENT = 1 << 12;
    }
}

/// A single recorded diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Condition class
    pub flag: Warnings,
    /// Human-readable detail
    pub message: String,
}

/// Diagnostics gathered by one paint invocation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    flags: Warnings,
    entries: Vec<Diagnostic>,
    stop_on_warning: bool,
}

impl Diagnostics {
    /// Create an empty collector honouring the given escalation policy.
    pub fn new(stop_on_warning: bool) -> Self {
        Self {
            flags: Warnings::empty(),
            entries: Vec::new(),
            stop_on_warning,
        }
    }

    /// A fresh collector with the same escalation policy.
    pub fn child(&self) -> Self {
        Self::new(self.stop_on_warning)
    }

    /// Record a recoverable condition.
    ///
    /// Returns [`Error::Escalated`] when stop-on-warning is in force.
    pub fn warn(&mut self, flag: Warnings, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        log::warn!("{}", message);
        self.push(flag, message.clone());
        if self.stop_on_warning {
            return Err(Error::Escalated(message));
        }
        Ok(())
    }

    /// Record a condition that is never escalated.
    pub fn note(&mut self, flag: Warnings, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.push(flag, message);
    }

    fn push(&mut self, flag: Warnings, message: String) {
        self.flags |= flag;
        self.entries.push(Diagnostic { flag, message });
    }

    /// Fold a child's diagnostics into this one, preserving order.
    pub fn merge(&mut self, child: Diagnostics) {
        self.flags |= child.flags;
        self.entries.extend(child.entries);
    }

    /// Union of the flags recorded so far.
    pub fn flags(&self) -> Warnings {
        self.flags
    }

    /// Whether `flag` was recorded.
    pub fn has(&self, flag: Warnings) -> bool {
        self.flags.contains(flag)
    }

    /// Recorded entries in the order they occurred.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether warnings escalate into errors.
    pub fn stops_on_warning(&self) -> bool {
        self.stop_on_warning
    }

    /// Drop everything recorded so far.
    pub fn clear(&mut self) {
        self.flags = Warnings::empty();
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_records_flag() {
        let mut diag = Diagnostics::new(false);
        diag.warn(Warnings::BAD_IMAGEDICT, "Width not integral").unwrap();
        assert!(diag.has(Warnings::BAD_IMAGEDICT));
        assert_eq!(diag.entries().len(), 1);
    }

    #[test]
    fn test_warn_escalates_when_stopping() {
        let mut diag = Diagnostics::new(true);
        let result = diag.warn(Warnings::JPX_HEADER, "short box");
        assert!(matches!(result, Err(Error::Escalated(_))));
        assert!(diag.has(Warnings::JPX_HEADER));
    }

    #[test]
    fn test_note_never_escalates() {
        let mut diag = Diagnostics::new(true);
        diag.note(Warnings::MASK_ERROR, "mask dropped");
        assert!(diag.has(Warnings::MASK_ERROR));
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut parent = Diagnostics::new(false);
        parent.note(Warnings::BAD_IMAGEDICT, "first");
        let mut child = parent.child();
        child.note(Warnings::MASK_ERROR, "second");
        parent.merge(child);

        let messages: Vec<_> = parent.entries().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(parent.flags(), Warnings::BAD_IMAGEDICT | Warnings::MASK_ERROR);
    }
}

//! Rendering policy for colour and image painting.
//!
//! # Example
//!
//! ```
//! use pdf_paint::config::RenderOptions;
//!
//! // Best-effort rendering (default)
//! let lenient = RenderOptions::lenient();
//!
//! // Conformance testing: every recoverable condition aborts
//! let strict = RenderOptions::strict();
//! assert!(strict.stop_on_warning);
//!
//! // Custom configuration
//! let custom = RenderOptions::lenient()
//!     .with_page_transparency(true)
//!     .with_preserve_smask(true);
//! assert!(custom.preserve_smask);
//! # let _ = lenient;
//! ```

/// Policy flags consulted while painting a page.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Promote every recoverable diagnostic into a hard error.
    pub stop_on_warning: bool,

    /// Propagate image-level errors to the caller instead of logging them.
    ///
    /// With this off, a failing image is skipped and painting continues
    /// with the rest of the page.
    pub stop_on_error: bool,

    /// Hand soft masks to the device as a Type3x image instead of
    /// compositing them locally through a luminosity group.
    pub preserve_smask: bool,

    /// The page being painted uses transparency.
    ///
    /// Soft masks, SMaskInData and non-normal blending are only honoured
    /// on transparent pages.
    pub page_has_transparency: bool,

    /// Maximum nesting of colour-space and resource resolution.
    pub max_resolution_depth: u32,

    /// Maximum decoded size of a single stream in bytes (0 = unlimited).
    pub max_decompressed_size: usize,
}

impl Default for RenderOptions {
    /// Default configuration: lenient mode
    fn default() -> Self {
        Self::lenient()
    }
}

impl RenderOptions {
    /// Strict mode: abort on warnings and errors alike.
    pub fn strict() -> Self {
        Self {
            stop_on_warning: true,
            stop_on_error: true,
            ..Self::lenient()
        }
    }

    /// Lenient mode: render past non-conformant content, logging diagnostics.
    pub fn lenient() -> Self {
        Self {
            stop_on_warning: false,
            stop_on_error: false,
            preserve_smask: false,
            page_has_transparency: false,
            max_resolution_depth: 100,
            max_decompressed_size: 100 * 1024 * 1024, // 100 MB
        }
    }

    /// Set the stop-on-warning flag.
    pub fn with_stop_on_warning(mut self, enable: bool) -> Self {
        self.stop_on_warning = enable;
        self
    }

    /// Set the stop-on-error flag.
    pub fn with_stop_on_error(mut self, enable: bool) -> Self {
        self.stop_on_error = enable;
        self
    }

    /// Delegate soft masks to the device.
    pub fn with_preserve_smask(mut self, enable: bool) -> Self {
        self.preserve_smask = enable;
        self
    }

    /// Mark the page as using transparency.
    pub fn with_page_transparency(mut self, enable: bool) -> Self {
        self.page_has_transparency = enable;
        self
    }

    /// Set the resolution depth cap.
    pub fn with_max_resolution_depth(mut self, depth: u32) -> Self {
        self.max_resolution_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_lenient() {
        let opts = RenderOptions::default();
        assert!(!opts.stop_on_warning);
        assert!(!opts.stop_on_error);
        assert_eq!(opts.max_resolution_depth, 100);
    }

    #[test]
    fn test_strict_mode() {
        let opts = RenderOptions::strict();
        assert!(opts.stop_on_warning);
        assert!(opts.stop_on_error);
        assert!(!opts.preserve_smask);
    }

    #[test]
    fn test_builder_setters() {
        let opts = RenderOptions::lenient()
            .with_stop_on_error(true)
            .with_max_resolution_depth(8);
        assert!(opts.stop_on_error);
        assert_eq!(opts.max_resolution_depth, 8);
    }
}

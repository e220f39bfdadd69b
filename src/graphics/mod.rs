//! Graphics-state host and device seam.

pub mod device;
pub mod optional_content;
pub mod state;

pub use device::{Device, GroupParams, ImageParams, NullDevice, SoftMaskParams};
pub use optional_content::{HiddenGroups, OptionalContent};
pub use state::{release_space, BlendMode, GraphicsStack, GraphicsState, RenderingIntent};

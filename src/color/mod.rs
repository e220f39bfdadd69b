//! Colour spaces: the resolved node types, their resolution from PDF
//! objects, and the operators that install them.

pub mod icc;
pub mod marks;
pub mod ops;
mod resolver;
pub mod space;
mod spots;

pub use icc::{HeaderIccLoader, IccDataSpace, IccLoader, IccProfile};
pub use marks::{MarkKey, ResolutionContext};
pub use ops::PaintTarget;
pub use space::{
    CalGray, CalRGB, ColorSpace, Colorant, DeviceN, DeviceNAttributes, DeviceNSubtype, IccBased, Indexed, Lab,
    PatternSpace, ProcessSpace, Separation, TintTransform, MAX_COMPONENTS,
};

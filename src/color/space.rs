//! Resolved colour-space nodes.

use crate::color::icc::IccProfile;
use crate::object::{Object, ObjectRef};
use indexmap::IndexMap;
use std::sync::Arc;

/// Maximum number of colour components a space may carry.
pub const MAX_COMPONENTS: usize = 32;

/// A fully resolved colour space.
///
/// Nested spaces (bases, alternates, colorants) are shared through [`Arc`]
/// so that a space cached or installed in the graphics state can be
/// embedded in several parents without copying.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpace {
    /// `DeviceGray`
    DeviceGray,
    /// `DeviceRGB`
    DeviceRGB,
    /// `DeviceCMYK`
    DeviceCMYK,
    /// `[/CalGray dict]`
    CalGray(CalGray),
    /// `[/CalRGB dict]`
    CalRGB(CalRGB),
    /// `[/Lab dict]`
    Lab(Lab),
    /// `[/ICCBased stream]`
    IccBased(IccBased),
    /// `[/Indexed base hival lookup]`
    Indexed(Indexed),
    /// `[/Separation name alternate tint]`
    Separation(Separation),
    /// `[/DeviceN inks alternate tint attributes?]`
    DeviceN(DeviceN),
    /// `/Pattern` or `[/Pattern base]`
    Pattern(PatternSpace),
}

/// CalGray parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CalGray {
    /// Diffuse white point
    pub white_point: [f64; 3],
    /// Diffuse black point
    pub black_point: [f64; 3],
    /// Gamma
    pub gamma: f64,
}

/// CalRGB parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CalRGB {
    /// Diffuse white point
    pub white_point: [f64; 3],
    /// Diffuse black point
    pub black_point: [f64; 3],
    /// Per-component gamma
    pub gamma: [f64; 3],
    /// Linear transform to XYZ, column major
    pub matrix: [f64; 9],
}

/// CIE L*a*b* parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Lab {
    /// Diffuse white point
    pub white_point: [f64; 3],
    /// Diffuse black point
    pub black_point: [f64; 3],
    /// a* and b* ranges: amin amax bmin bmax
    pub range: [f64; 4],
}

/// ICC-profile-backed space.
#[derive(Debug, Clone, PartialEq)]
pub struct IccBased {
    /// Loaded profile
    pub profile: Arc<IccProfile>,
    /// `/N` from the stream dictionary
    pub declared_components: usize,
    /// Component count supplied by the profile
    pub components: usize,
    /// Component ranges, two entries per component
    pub range: Vec<f64>,
}

/// Palette space.
#[derive(Debug, Clone, PartialEq)]
pub struct Indexed {
    /// Base space the palette entries are expressed in
    pub base: Arc<ColorSpace>,
    /// Highest valid index
    pub hival: u8,
    /// Exactly `(hival + 1) * base.components()` bytes
    pub lookup: Vec<u8>,
}

impl Indexed {
    /// Palette entry for `index`, clamped to `hival`.
    pub fn entry(&self, index: usize) -> &[u8] {
        let n = self.base.components();
        let i = index.min(self.hival as usize);
        &self.lookup[i * n..(i + 1) * n]
    }
}

/// Opaque tint-transform function.
///
/// Evaluation is the job of the function evaluator; the painting core only
/// carries the definition so that the device can build and release it.
#[derive(Debug, Clone, PartialEq)]
pub struct TintTransform {
    /// Function dictionary or stream
    pub function: Object,
    /// Indirect object the function came from, if any
    pub origin: Option<ObjectRef>,
}

/// Which colorant a Separation space paints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Colorant {
    /// `/All`: every separation including process colorants
    All,
    /// `/None`: paints nothing
    None,
    /// A named ink
    Named(String),
}

impl Colorant {
    /// Classify a colorant name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "All" => Colorant::All,
            "None" => Colorant::None,
            other => Colorant::Named(other.to_string()),
        }
    }

    /// Name as written in the document.
    pub fn as_str(&self) -> &str {
        match self {
            Colorant::All => "All",
            Colorant::None => "None",
            Colorant::Named(name) => name,
        }
    }
}

/// Single-colorant space.
#[derive(Debug, Clone, PartialEq)]
pub struct Separation {
    /// Colorant being painted
    pub colorant: Colorant,
    /// Space the tint transform maps into
    pub alternate: Arc<ColorSpace>,
    /// Tint transform
    pub tint_transform: TintTransform,
}

/// DeviceN attribute subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceNSubtype {
    /// `/DeviceN`
    DeviceN,
    /// `/NChannel`
    NChannel,
}

/// Process colour description from the DeviceN attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSpace {
    /// Process colour space
    pub space: Arc<ColorSpace>,
    /// Names of the process components
    pub components: Vec<String>,
}

/// Optional DeviceN attributes dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceNAttributes {
    /// Attribute subtype
    pub subtype: DeviceNSubtype,
    /// Process colour space, if declared
    pub process: Option<ProcessSpace>,
    /// Colorant name to Separation (or other) space, in declaration order
    pub colorants: IndexMap<String, Arc<ColorSpace>>,
}

/// Multi-ink space.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceN {
    /// Ink names, one per component
    pub inks: Vec<String>,
    /// Space the tint transform maps into
    pub alternate: Arc<ColorSpace>,
    /// Tint transform
    pub tint_transform: TintTransform,
    /// Attributes dictionary
    pub attributes: Option<DeviceNAttributes>,
}

/// Pattern space, optionally with an underlying space for uncoloured patterns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatternSpace {
    /// Underlying space
    pub base: Option<Arc<ColorSpace>>,
}

impl ColorSpace {
    /// Device space with `n` components, if one exists.
    pub fn device_for_components(n: usize) -> Option<Self> {
        match n {
            1 => Some(ColorSpace::DeviceGray),
            3 => Some(ColorSpace::DeviceRGB),
            4 => Some(ColorSpace::DeviceCMYK),
            _ => None,
        }
    }

    /// Family name as used in PDF.
    pub fn family_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
            ColorSpace::CalGray(_) => "CalGray",
            ColorSpace::CalRGB(_) => "CalRGB",
            ColorSpace::Lab(_) => "Lab",
            ColorSpace::IccBased(_) => "ICCBased",
            ColorSpace::Indexed(_) => "Indexed",
            ColorSpace::Separation(_) => "Separation",
            ColorSpace::DeviceN(_) => "DeviceN",
            ColorSpace::Pattern(_) => "Pattern",
        }
    }

    /// Number of colour components a sample in this space carries.
    pub fn components(&self) -> usize {
        match self {
            ColorSpace::DeviceGray | ColorSpace::CalGray(_) => 1,
            ColorSpace::DeviceRGB | ColorSpace::CalRGB(_) | ColorSpace::Lab(_) => 3,
            ColorSpace::DeviceCMYK => 4,
            ColorSpace::IccBased(icc) => icc.components,
            ColorSpace::Indexed(_) | ColorSpace::Separation(_) => 1,
            ColorSpace::DeviceN(devn) => devn.inks.len(),
            ColorSpace::Pattern(p) => p.base.as_ref().map_or(1, |b| b.components()),
        }
    }

    /// Whether this is a palette space.
    pub fn is_indexed(&self) -> bool {
        matches!(self, ColorSpace::Indexed(_))
    }

    /// Whether this is a pattern space.
    pub fn is_pattern(&self) -> bool {
        matches!(self, ColorSpace::Pattern(_))
    }

    /// Initial colour when the space is selected with `cs`/`CS`.
    pub fn initial_color(&self) -> Vec<f64> {
        match self {
            ColorSpace::DeviceCMYK => vec![0.0, 0.0, 0.0, 1.0],
            ColorSpace::Separation(_) => vec![1.0],
            ColorSpace::DeviceN(devn) => vec![1.0; devn.inks.len()],
            ColorSpace::Lab(lab) => vec![0.0, clamp(0.0, lab.range[0], lab.range[1]), clamp(0.0, lab.range[2], lab.range[3])],
            ColorSpace::IccBased(icc) => icc
                .range
                .chunks(2)
                .take(icc.components)
                .map(|r| clamp(0.0, r[0], r.get(1).copied().unwrap_or(1.0)))
                .collect(),
            ColorSpace::Pattern(_) => Vec::new(),
            other => vec![0.0; other.components()],
        }
    }

    /// Default image decode array for samples of `bpc` bits.
    pub fn default_decode(&self, bpc: u8) -> Vec<f64> {
        match self {
            ColorSpace::Indexed(_) => vec![0.0, ((1u32 << bpc.min(16)) - 1) as f64],
            other => [0.0, 1.0].repeat(other.components()),
        }
    }

    /// Nested spaces owned by this one.
    pub fn children(&self) -> Vec<&Arc<ColorSpace>> {
        match self {
            ColorSpace::Indexed(ix) => vec![&ix.base],
            ColorSpace::Separation(sep) => vec![&sep.alternate],
            ColorSpace::DeviceN(devn) => {
                let mut out = vec![&devn.alternate];
                if let Some(attrs) = &devn.attributes {
                    if let Some(process) = &attrs.process {
                        out.push(&process.space);
                    }
                    out.extend(attrs.colorants.values());
                }
                out
            },
            ColorSpace::Pattern(p) => p.base.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Tint transform carried by Separation and DeviceN spaces.
    pub fn tint_transform(&self) -> Option<&TintTransform> {
        match self {
            ColorSpace::Separation(sep) => Some(&sep.tint_transform),
            ColorSpace::DeviceN(devn) => Some(&devn.tint_transform),
            _ => None,
        }
    }
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

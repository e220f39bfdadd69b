//! Spot colorant census.

use crate::color::space::{ColorSpace, Colorant};
use crate::context::PaintContext;
use crate::error::Result;
use crate::object::Object;
use crate::resources::ResourceScope;
use indexmap::IndexSet;

const PROCESS_NAMES: [&str; 6] = ["Cyan", "Magenta", "Yellow", "Black", "All", "None"];

impl<'a> PaintContext<'a> {
    /// Names of the spot inks `space` can paint with, in first-seen order.
    pub fn collect_spot_names(&mut self, space: &Object, scope: ResourceScope<'_>) -> Result<IndexSet<String>> {
        let resolved = self.resolve_color_space(space, scope)?;
        let mut spots = IndexSet::new();
        gather(&resolved, &mut spots);
        Ok(spots)
    }
}

fn gather(space: &ColorSpace, spots: &mut IndexSet<String>) {
    let mut add = |name: &str| {
        if !PROCESS_NAMES.contains(&name) {
            spots.insert(name.to_string());
        }
    };
    match space {
        ColorSpace::Separation(sep) => {
            if let Colorant::Named(name) = &sep.colorant {
                add(name);
            }
        },
        ColorSpace::DeviceN(devn) => {
            for ink in &devn.inks {
                add(ink);
            }
            if let Some(attrs) = &devn.attributes {
                for name in attrs.colorants.keys() {
                    add(name);
                }
            }
        },
        _ => {},
    }
    // Alternates are process spaces by construction; base and colorant spaces may not be.
    // ICCBased contributes nothing: a broken profile was already replaced by its alternate.
    let nested: Vec<&ColorSpace> = match space {
        ColorSpace::Indexed(ix) => vec![&*ix.base],
        ColorSpace::Pattern(p) => p.base.iter().map(|b| &**b).collect(),
        ColorSpace::DeviceN(devn) => devn
            .attributes
            .iter()
            .flat_map(|a| a.colorants.values().map(|c| &**c))
            .collect(),
        _ => Vec::new(),
    };
    for child in nested {
        gather(child, spots);
    }
}

//! Named resource lookup.
//!
//! PDF content refers to colour spaces, XObjects and graphics-state
//! parameter sets by name. Names are looked up first in the resources of the
//! content stream being executed (a form or pattern) and then in the page.

use crate::error::Result;
use crate::object::{deref, Dict, Object, ObjectRef, ObjectStore};

/// Resource categories the painting core consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    /// `/ColorSpace`
    ColorSpace,
    /// `/XObject`
    XObject,
    /// `/ExtGState`
    ExtGState,
}

impl ResourceCategory {
    /// Key of the category inside a `/Resources` dictionary.
    pub fn key(self) -> &'static str {
        match self {
            ResourceCategory::ColorSpace => "ColorSpace",
            ResourceCategory::XObject => "XObject",
            ResourceCategory::ExtGState => "ExtGState",
        }
    }
}

/// A resolved resource and the identity of the indirect object it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Direct value
    pub value: Object,
    /// Reference the value was loaded through, if any
    pub origin: Option<ObjectRef>,
}

/// The pair of dictionaries names are resolved against.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceScope<'a> {
    /// Dictionary of the content stream being executed
    pub stream: Option<&'a Dict>,
    /// Page dictionary
    pub page: Option<&'a Dict>,
}

impl<'a> ResourceScope<'a> {
    /// Scope with both dictionaries.
    pub fn new(stream: Option<&'a Dict>, page: Option<&'a Dict>) -> Self {
        Self { stream, page }
    }

    /// Scope that only consults the page.
    pub fn page(page: &'a Dict) -> Self {
        Self {
            stream: None,
            page: Some(page),
        }
    }

    /// Scope with no resources; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Find `name` in `category`, stream dictionary first.
    pub fn find(
        &self,
        store: &dyn ObjectStore,
        category: ResourceCategory,
        name: &str,
    ) -> Result<Option<Resource>> {
        for dict in [self.stream, self.page].into_iter().flatten() {
            if let Some(found) = lookup_in(store, dict, category, name)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}

fn lookup_in(
    store: &dyn ObjectStore,
    owner: &Dict,
    category: ResourceCategory,
    name: &str,
) -> Result<Option<Resource>> {
    let Some(resources) = owner.get("Resources") else {
        return Ok(None);
    };
    let (resources, _) = deref(store, resources)?;
    let Some(group) = resources.as_dict().and_then(|d| d.get(category.key())) else {
        return Ok(None);
    };
    let (group, _) = deref(store, group)?;
    let Some(entry) = group.as_dict().and_then(|d| d.get(name)) else {
        return Ok(None);
    };
    let (value, origin) = deref(store, entry)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(Resource { value, origin }))
}

//! Cycle and depth guard for recursive resolution.
//!
//! Each resolution level pushes a mark and then records the identities it
//! dereferences. An identity already recorded by a pending level means the
//! resolution has looped back on itself.

use crate::error::{Error, Result};
use crate::object::ObjectRef;
use crate::resources::ResourceCategory;

/// Identity recorded while a resolution is pending.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkKey {
    /// An indirect object
    Object(ObjectRef),
    /// A named resource
    Resource(ResourceCategory, String),
}

impl std::fmt::Display for MarkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkKey::Object(r) => write!(f, "object {}", r),
            MarkKey::Resource(category, name) => write!(f, "/{} resource /{}", category.key(), name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Mark,
    Key(MarkKey),
}

/// Stack of pending resolutions.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    entries: Vec<Entry>,
    marks: usize,
    max_depth: u32,
}

impl ResolutionContext {
    /// Create an empty context allowing `max_depth` nested marks.
    pub fn new(max_depth: u32) -> Self {
        Self {
            entries: Vec::new(),
            marks: 0,
            max_depth,
        }
    }

    /// Open a resolution level.
    pub fn push_mark(&mut self) -> Result<()> {
        if self.marks >= self.max_depth as usize {
            return Err(Error::RecursionLimitExceeded(self.max_depth));
        }
        self.entries.push(Entry::Mark);
        self.marks += 1;
        Ok(())
    }

    /// Close the innermost level, forgetting what it recorded.
    pub fn clear_to_mark(&mut self) {
        while let Some(entry) = self.entries.pop() {
            if entry == Entry::Mark {
                self.marks -= 1;
                return;
            }
        }
    }

    /// Record `key` at the current level; fails if a pending level holds it.
    pub fn visit(&mut self, key: MarkKey) -> Result<()> {
        if self.entries.iter().any(|e| matches!(e, Entry::Key(k) if *k == key)) {
            log::warn!("Resolution loop through {}", key);
            return Err(Error::CircularReference(key.to_string()));
        }
        self.entries.push(Entry::Key(key));
        Ok(())
    }

    /// Number of open levels.
    pub fn depth(&self) -> usize {
        self.marks
    }

    /// Whether no level is open.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

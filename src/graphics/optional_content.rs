//! Optional-content visibility.

use crate::object::{deref, Object, ObjectRef, ObjectStore};
use std::collections::HashSet;

/// Decides whether content tagged with `/OC` is painted.
pub trait OptionalContent {
    /// `oc` is the value of the `/OC` entry as written, usually a reference.
    fn is_visible(&self, store: &dyn ObjectStore, oc: &Object) -> bool;
}

/// Visibility from a set of groups switched off in the current configuration.
///
/// Membership dictionaries (`/Type /OCMD`) are evaluated through their
/// `/OCGs` and `/P` entries. Visibility expressions (`/VE`) are not
/// evaluated; such dictionaries fall back to their `/P` policy.
#[derive(Debug, Default, Clone)]
pub struct HiddenGroups {
    hidden: HashSet<ObjectRef>,
}

impl HiddenGroups {
    /// Everything visible.
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch a group off.
    pub fn hide(&mut self, group: ObjectRef) {
        self.hidden.insert(group);
    }

    fn group_on(&self, group: &Object) -> bool {
        group.as_reference().map_or(true, |r| !self.hidden.contains(&r))
    }
}

impl OptionalContent for HiddenGroups {
    fn is_visible(&self, store: &dyn ObjectStore, oc: &Object) -> bool {
        let dict = match deref(store, oc) {
            Ok((value, _)) => match value {
                Object::Dictionary(d) => d,
                _ => return true,
            },
            Err(e) => {
                log::debug!("Unreadable /OC entry treated as visible: {}", e);
                return true;
            },
        };

        if dict.get("Type").and_then(Object::as_name) != Some("OCMD") {
            return self.group_on(oc);
        }

        let groups: Vec<Object> = match dict.get("OCGs") {
            Some(Object::Array(items)) => items.clone(),
            Some(single) => vec![single.clone()],
            None => return true,
        };
        if groups.is_empty() {
            return true;
        }
        let on = groups.iter().filter(|g| self.group_on(g)).count();
        match dict.get("P").and_then(Object::as_name).unwrap_or("AnyOn") {
            "AllOn" => on == groups.len(),
            "AnyOff" => on < groups.len(),
            "AllOff" => on == 0,
            _ => on > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Dict, MemoryStore};

    fn ocg(store: &mut MemoryStore, id: u32) -> ObjectRef {
        let mut d = Dict::new();
        d.insert("Type".to_string(), Object::name("OCG"));
        store.insert(id, Object::Dictionary(d))
    }

    fn ocmd(store: &mut MemoryStore, id: u32, groups: &[ObjectRef], policy: &str) -> ObjectRef {
        let mut d = Dict::new();
        d.insert("Type".to_string(), Object::name("OCMD"));
        d.insert(
            "OCGs".to_string(),
            Object::Array(groups.iter().map(|r| Object::Reference(*r)).collect()),
        );
        d.insert("P".to_string(), Object::name(policy));
        store.insert(id, Object::Dictionary(d))
    }

    #[test]
    fn test_hidden_group() {
        let mut store = MemoryStore::new();
        let a = ocg(&mut store, 1);
        let mut oc = HiddenGroups::new();
        assert!(oc.is_visible(&store, &Object::Reference(a)));
        oc.hide(a);
        assert!(!oc.is_visible(&store, &Object::Reference(a)));
    }

    #[test]
    fn test_membership_policies() {
        let mut store = MemoryStore::new();
        let a = ocg(&mut store, 1);
        let b = ocg(&mut store, 2);
        let any_on = ocmd(&mut store, 3, &[a, b], "AnyOn");
        let all_on = ocmd(&mut store, 4, &[a, b], "AllOn");
        let all_off = ocmd(&mut store, 5, &[a, b], "AllOff");

        let mut oc = HiddenGroups::new();
        oc.hide(a);
        assert!(oc.is_visible(&store, &Object::Reference(any_on)));
        assert!(!oc.is_visible(&store, &Object::Reference(all_on)));
        assert!(!oc.is_visible(&store, &Object::Reference(all_off)));
    }

    #[test]
    fn test_missing_reference_is_visible() {
        let store = MemoryStore::new();
        let oc = HiddenGroups::new();
        assert!(oc.is_visible(&store, &Object::Reference(ObjectRef::new(40, 0))));
    }
}

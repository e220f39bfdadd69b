//! PDF object types and the object store seam.
//!
//! The painting core never parses PDF syntax itself. It receives already
//! parsed [`Object`] values and follows indirect references through an
//! [`ObjectStore`] supplied by the embedding interpreter.

use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Dictionary payload shared by dictionary and stream objects.
pub type Dict = HashMap<String, Object>;

/// Longest chain of reference-to-reference hops followed by [`deref`].
const MAX_REFERENCE_CHAIN: usize = 32;

/// PDF object representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// String (byte array)
    String(Vec<u8>),
    /// Name (starting with /)
    Name(String),
    /// Array of objects
    Array(Vec<Object>),
    /// Dictionary (key-value pairs)
    Dictionary(Dict),
    /// Stream (dictionary + data)
    Stream {
        /// Stream dictionary
        dict: Dict,
        /// Raw (still filtered) stream data
        data: bytes::Bytes,
    },
    /// Indirect object reference
    Reference(ObjectRef),
}

/// Reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}

impl Object {
    /// Shorthand for building a name object.
    pub fn name(name: &str) -> Self {
        Object::Name(name.to_string())
    }

    /// Get the type name of this object (without data).
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Boolean(_) => "Boolean",
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Dictionary(_) => "Dictionary",
            Object::Stream { .. } => "Stream",
            Object::Reference(_) => "Reference",
        }
    }

    /// Try to cast to integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to cast to a number, accepting both integers and reals.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Try to cast to dictionary. Works for both Dictionary and Stream objects.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// Try to cast to array.
    pub fn as_array(&self) -> Option<&Vec<Object>> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to cast to reference.
    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Object::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Raw stream payload, if this is a stream.
    pub fn stream_data(&self) -> Option<&bytes::Bytes> {
        match self {
            Object::Stream { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Check if object is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }
}

/// Access to indirect objects owned by the embedding interpreter.
pub trait ObjectStore {
    /// Load the object stored under `r`.
    fn load(&self, r: ObjectRef) -> Result<Object>;
}

/// In-memory [`ObjectStore`] backed by a hash map.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    objects: HashMap<ObjectRef, Object>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object, returning the reference it is stored under.
    pub fn insert(&mut self, id: u32, object: Object) -> ObjectRef {
        let r = ObjectRef::new(id, 0);
        self.objects.insert(r, object);
        r
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for MemoryStore {
    fn load(&self, r: ObjectRef) -> Result<Object> {
        self.objects.get(&r).cloned().ok_or(Error::ObjectNotFound(r))
    }
}

/// Follow indirect references until a direct object is reached.
///
/// Returns the direct object together with the identity of the last
/// reference followed, which callers use as a cache or cycle key.
pub fn deref(store: &dyn ObjectStore, obj: &Object) -> Result<(Object, Option<ObjectRef>)> {
    let mut current = match obj {
        Object::Reference(r) => *r,
        other => return Ok((other.clone(), None)),
    };
    let mut seen = HashSet::new();

    loop {
        if !seen.insert(current) || seen.len() > MAX_REFERENCE_CHAIN {
            return Err(Error::CircularReference(current.to_string()));
        }
        match store.load(current)? {
            Object::Reference(next) => current = next,
            direct => return Ok((direct, Some(current))),
        }
    }
}

/// Look up `key` in `dict` and dereference the value.
///
/// A missing key and an explicit null both yield `None`.
pub fn dict_get(store: &dyn ObjectStore, dict: &Dict, key: &str) -> Result<Option<Object>> {
    match dict.get(key) {
        None => Ok(None),
        Some(value) => {
            let (direct, _) = deref(store, value)?;
            Ok(if direct.is_null() { None } else { Some(direct) })
        },
    }
}

/// Look up the first present key among `keys`, dereferencing the value.
pub fn dict_get_any(
    store: &dyn ObjectStore,
    dict: &Dict,
    keys: &[&str],
) -> Result<Option<Object>> {
    for key in keys {
        if let Some(value) = dict_get(store, dict, key)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Dereference every element of an array.
pub fn resolve_array(store: &dyn ObjectStore, items: &[Object]) -> Result<Vec<Object>> {
    items
        .iter()
        .map(|item| deref(store, item).map(|(direct, _)| direct))
        .collect()
}

/// Read an array of numbers, rejecting any non-numeric element.
pub fn number_array(store: &dyn ObjectStore, obj: &Object) -> Result<Vec<f64>> {
    let items = obj.as_array().ok_or_else(|| Error::type_check("Array", obj))?;
    resolve_array(store, items)?
        .iter()
        .map(|item| item.as_number().ok_or_else(|| Error::type_check("Number", item)))
        .collect()
}

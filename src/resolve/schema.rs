use crate::types::TypeTag;
use dashmap::DashMap;
use std::collections::HashMap;

/// Source of property types, supplied by the surrounding content store.
///
/// Implementations are read during a resolution pass and must not change while one runs.
pub trait SchemaLookup {
    /// Returns the type of the property with the given decoded name, or `None` if the
    /// property is unknown.
    fn property_type(&self, name: &str) -> Option<TypeTag>;
}

impl SchemaLookup for HashMap<String, TypeTag> {
    fn property_type(&self, name: &str) -> Option<TypeTag> {
        self.get(name).copied()
    }
}

/// Thread-safe property type table, shareable across concurrent resolutions.
#[derive(Debug, Default)]
pub struct PropertyTypes {
    types: DashMap<String, TypeTag>,
}

impl PropertyTypes {
    pub fn new() -> Self {
        Self {
            types: DashMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(self, name: &str, tag: TypeTag) -> Self {
        self.types.insert(name.to_string(), tag);
        self
    }

    /// Registers or replaces a property type. Returns the previous type, if any.
    pub fn insert(&self, name: &str, tag: TypeTag) -> Option<TypeTag> {
        self.types.insert(name.to_string(), tag)
    }

    pub fn remove(&self, name: &str) -> Option<TypeTag> {
        self.types.remove(name).map(|(_, tag)| tag)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl SchemaLookup for PropertyTypes {
    fn property_type(&self, name: &str) -> Option<TypeTag> {
        self.types.get(name).map(|entry| *entry.value())
    }
}

impl FromIterator<(String, TypeTag)> for PropertyTypes {
    fn from_iter<I: IntoIterator<Item = (String, TypeTag)>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}

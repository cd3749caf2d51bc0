//! The property surface animations read from and write to.
//!
//! Hosts (widgets, scene nodes, ...) implement [`PropertySet`]; the animation
//! core only ever sees named string properties.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::error::PropertyError;

/// Named, string-valued properties on a target object.
pub trait PropertySet {
    fn get_property(&self, name: &str) -> Result<String, PropertyError>;

    fn set_property(&mut self, name: &str, value: &str) -> Result<(), PropertyError>;

    fn is_property_present(&self, name: &str) -> bool {
        self.get_property(name).is_ok()
    }
}

/// Shared handle to a target; the animation core never owns its targets.
pub type SharedPropertySet = Rc<RefCell<dyn PropertySet>>;

/// In-memory property bag. Writes create missing properties.
#[derive(Clone, Debug, Default)]
pub struct PropertyMap {
    values: HashMap<String, String>,
    writes: usize,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Borrow a property value without cloning it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Number of successful `set_property` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Wrap into a shared handle suitable for binding to animation instances.
    pub fn into_shared(self) -> Rc<RefCell<PropertyMap>> {
        Rc::new(RefCell::new(self))
    }
}

impl PropertySet for PropertyMap {
    fn get_property(&self, name: &str) -> Result<String, PropertyError> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| PropertyError::Unknown(name.to_string()))
    }

    fn set_property(&mut self, name: &str, value: &str) -> Result<(), PropertyError> {
        self.values.insert(name.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn is_property_present(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

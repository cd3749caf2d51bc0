//! Interpolator trait and registry.
//!
//! Interpolators are stateless strategies keyed by a type name. They blend two
//! property strings (plus an optional base string) at a normalised position.
//! The registry is a shared handle: the manager and every animation it creates
//! hold clones of the same table.

pub mod functions;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ceanim_api_core::{
    Colour, ColourRect, FormatError, Rectf, Sizef, UBox, UDim, URect, USize, UVector2, Vector2f,
    Vector3f,
};
use hashbrown::{HashMap, HashSet};

use crate::error::AnimationError;
pub use functions::{
    DiscreteInterpolator, DiscreteRelativeInterpolator, LinearInterpolator,
    QuaternionSlerpInterpolator,
};

/// Blends two string-encoded values of one type.
pub trait Interpolator: fmt::Debug {
    /// Registry key, e.g. `"float"` or `"ColourRect"`.
    fn type_name(&self) -> &str;

    fn interpolate_absolute(
        &self,
        value1: &str,
        value2: &str,
        position: f32,
    ) -> Result<String, FormatError>;

    /// `base` combined with the blend of `value1`/`value2`.
    fn interpolate_relative(
        &self,
        base: &str,
        value1: &str,
        value2: &str,
        position: f32,
    ) -> Result<String, FormatError>;

    /// `base` scaled by the blend of `value1`/`value2`, read as plain floats.
    fn interpolate_relative_multiply(
        &self,
        base: &str,
        value1: &str,
        value2: &str,
        position: f32,
    ) -> Result<String, FormatError>;
}

#[derive(Default)]
struct Entries {
    by_name: HashMap<String, Rc<dyn Interpolator>>,
    builtin: HashSet<String>,
}

/// Shared name → interpolator table.
#[derive(Clone, Default)]
pub struct InterpolatorRegistry {
    inner: Rc<RefCell<Entries>>,
}

impl fmt::Debug for InterpolatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpolatorRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl InterpolatorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in interpolators.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register_builtin_interpolators();
        registry
    }

    fn register_builtin_interpolators(&self) {
        self.insert_builtin(Rc::new(DiscreteRelativeInterpolator::<String>::new("String")));
        self.insert_builtin(Rc::new(LinearInterpolator::<f32>::new("float")));
        self.insert_builtin(Rc::new(LinearInterpolator::<i32>::new("int")));
        self.insert_builtin(Rc::new(LinearInterpolator::<u32>::new("uint")));
        self.insert_builtin(Rc::new(DiscreteInterpolator::<bool>::new("bool")));
        self.insert_builtin(Rc::new(LinearInterpolator::<Sizef>::new("Size")));
        self.insert_builtin(Rc::new(LinearInterpolator::<Vector2f>::new("Vector2")));
        self.insert_builtin(Rc::new(LinearInterpolator::<Vector3f>::new("Vector3")));
        self.insert_builtin(Rc::new(QuaternionSlerpInterpolator::new()));
        self.insert_builtin(Rc::new(LinearInterpolator::<Rectf>::new("Rect")));
        self.insert_builtin(Rc::new(LinearInterpolator::<Colour>::new("Colour")));
        self.insert_builtin(Rc::new(LinearInterpolator::<ColourRect>::new("ColourRect")));
        self.insert_builtin(Rc::new(LinearInterpolator::<UDim>::new("UDim")));
        self.insert_builtin(Rc::new(LinearInterpolator::<UVector2>::new("UVector2")));
        self.insert_builtin(Rc::new(LinearInterpolator::<USize>::new("USize")));
        self.insert_builtin(Rc::new(LinearInterpolator::<URect>::new("URect")));
        self.insert_builtin(Rc::new(LinearInterpolator::<UBox>::new("UBox")));
    }

    fn insert_builtin(&self, interpolator: Rc<dyn Interpolator>) {
        let name = interpolator.type_name().to_string();
        let mut entries = self.inner.borrow_mut();
        entries.builtin.insert(name.clone());
        entries.by_name.insert(name, interpolator);
    }

    /// Register a caller-supplied interpolator under its type name.
    pub fn add(&self, interpolator: Rc<dyn Interpolator>) -> Result<(), AnimationError> {
        let name = interpolator.type_name().to_string();
        let mut entries = self.inner.borrow_mut();
        if entries.by_name.contains_key(&name) {
            return Err(AnimationError::already_exists("Interpolator", name));
        }
        entries.by_name.insert(name, interpolator);
        Ok(())
    }

    /// Unregister an interpolator. Affectors already holding it keep working.
    pub fn remove(&self, type_name: &str) -> Result<Rc<dyn Interpolator>, AnimationError> {
        let mut entries = self.inner.borrow_mut();
        entries.builtin.remove(type_name);
        entries
            .by_name
            .remove(type_name)
            .ok_or_else(|| AnimationError::unknown("Interpolator", type_name))
    }

    pub fn get(&self, type_name: &str) -> Result<Rc<dyn Interpolator>, AnimationError> {
        self.inner
            .borrow()
            .by_name
            .get(type_name)
            .cloned()
            .ok_or_else(|| AnimationError::unknown("Interpolator", type_name))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.inner.borrow().by_name.contains_key(type_name)
    }

    pub fn is_builtin(&self, type_name: &str) -> bool {
        self.inner.borrow().builtin.contains(type_name)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered type names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.borrow().by_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop every entry. Caller-held handles to user interpolators stay valid.
    pub fn clear(&self) {
        let mut entries = self.inner.borrow_mut();
        entries.by_name.clear();
        entries.builtin.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered_and_flagged() {
        let reg = InterpolatorRegistry::with_builtins();
        for name in [
            "String",
            "float",
            "int",
            "uint",
            "bool",
            "Size",
            "Vector2",
            "Vector3",
            "QuaternionSlerp",
            "Rect",
            "Colour",
            "ColourRect",
            "UDim",
            "UVector2",
            "USize",
            "URect",
            "UBox",
        ] {
            assert!(reg.contains(name), "missing builtin {name}");
            assert!(reg.is_builtin(name));
        }
        assert_eq!(reg.len(), 17);
    }

    #[test]
    fn clones_share_the_same_table() {
        let reg = InterpolatorRegistry::new();
        let view = reg.clone();
        reg.add(Rc::new(LinearInterpolator::<f32>::new("custom")))
            .unwrap();
        assert!(view.contains("custom"));
        assert!(!view.is_builtin("custom"));
    }

    #[test]
    fn duplicate_and_missing_names() {
        let reg = InterpolatorRegistry::with_builtins();
        let err = reg
            .add(Rc::new(LinearInterpolator::<f32>::new("float")))
            .unwrap_err();
        assert!(matches!(err, AnimationError::AlreadyExists { .. }));
        assert!(matches!(
            reg.get("nope"),
            Err(AnimationError::UnknownObject { .. })
        ));
        assert!(reg.remove("nope").is_err());
    }

    #[test]
    fn removed_interpolator_survives_in_holders() {
        let reg = InterpolatorRegistry::with_builtins();
        let held = reg.get("float").unwrap();
        reg.remove("float").unwrap();
        assert!(!reg.contains("float"));
        assert_eq!(held.interpolate_absolute("0", "2", 0.5).unwrap(), "1");
    }
}

//! AnimationManager: owns definitions, instances and the interpolator registry.
//!
//! Methods:
//! - create/destroy/look up animation definitions (generated names for `""`)
//! - instantiate definitions and hand out [`Playback`] views over instances
//! - register interpolators
//! - tick with `auto_step_instances`, route named events, drain lifecycle events
//!
//! The manager is a plain value; create as many independent managers as needed.
//! It holds `Rc` handles and is therefore neither `Send` nor `Sync`: confine
//! each manager to the thread that drives it.

use std::path::Path;
use std::rc::Rc;

use hashbrown::HashMap;
use indexmap::map::Entry;
use indexmap::IndexMap;
use log::{debug, warn};

use crate::animation::Animation;
use crate::config::Config;
use crate::error::AnimationError;
use crate::ids::{IdAllocator, InstId};
use crate::instance::{AnimationInstance, Playback};
use crate::interp::{Interpolator, InterpolatorRegistry};
use crate::outputs::AnimationEvent;
use crate::xml;

#[derive(Debug)]
pub struct AnimationManager {
    cfg: Config,
    ids: IdAllocator,
    interpolators: InterpolatorRegistry,

    // Owned data
    animations: IndexMap<String, Animation>,
    instances: Vec<AnimationInstance>,
    instances_by_animation: HashMap<String, Vec<InstId>>,
}

impl Default for AnimationManager {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AnimationManager {
    /// Manager with the built-in interpolators registered.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            interpolators: InterpolatorRegistry::with_builtins(),
            animations: IndexMap::new(),
            instances: Vec::new(),
            instances_by_animation: HashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    // ----- Interpolators -----

    pub fn add_interpolator(
        &mut self,
        interpolator: Rc<dyn Interpolator>,
    ) -> Result<(), AnimationError> {
        self.interpolators.add(interpolator)
    }

    pub fn remove_interpolator(
        &mut self,
        type_name: &str,
    ) -> Result<Rc<dyn Interpolator>, AnimationError> {
        self.interpolators.remove(type_name)
    }

    pub fn interpolator(&self, type_name: &str) -> Result<Rc<dyn Interpolator>, AnimationError> {
        self.interpolators.get(type_name)
    }

    pub fn has_interpolator(&self, type_name: &str) -> bool {
        self.interpolators.contains(type_name)
    }

    /// The registry shared with every definition this manager creates.
    pub fn interpolators(&self) -> &InterpolatorRegistry {
        &self.interpolators
    }

    // ----- Animations -----

    fn generate_name(&mut self) -> String {
        let (uid, wrapped) = self.ids.alloc_uid();
        if wrapped {
            warn!("generated animation name counter wrapped around, names may repeat");
        }
        format!("{}{}", self.cfg.generated_name_prefix, uid)
    }

    /// Create an empty definition. An empty `name` generates a unique one.
    pub fn create_animation(&mut self, name: &str) -> Result<&mut Animation, AnimationError> {
        let name = if name.is_empty() {
            self.generate_name()
        } else {
            name.to_string()
        };
        match self.animations.entry(name) {
            Entry::Occupied(entry) => Err(AnimationError::already_exists(
                "Animation",
                entry.key().clone(),
            )),
            Entry::Vacant(entry) => {
                debug!("created animation '{}'", entry.key());
                let animation = Animation::new(entry.key().clone(), self.interpolators.clone());
                Ok(entry.insert(animation))
            }
        }
    }

    /// Destroy a definition together with all of its instances.
    pub fn destroy_animation(&mut self, name: &str) -> Result<(), AnimationError> {
        if !self.animations.contains_key(name) {
            return Err(AnimationError::unknown("Animation", name));
        }
        self.destroy_all_instances_of_animation(name);
        self.animations.shift_remove(name);
        debug!("destroyed animation '{name}'");
        Ok(())
    }

    pub fn destroy_all_animations(&mut self) {
        self.destroy_all_animation_instances();
        self.animations.clear();
    }

    pub fn animation(&self, name: &str) -> Result<&Animation, AnimationError> {
        self.animations
            .get(name)
            .ok_or_else(|| AnimationError::unknown("Animation", name))
    }

    pub fn animation_mut(&mut self, name: &str) -> Result<&mut Animation, AnimationError> {
        self.animations
            .get_mut(name)
            .ok_or_else(|| AnimationError::unknown("Animation", name))
    }

    pub fn has_animation(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    /// Definition by creation order.
    pub fn animation_at_idx(&self, idx: usize) -> Result<&Animation, AnimationError> {
        self.animations
            .get_index(idx)
            .map(|(_, animation)| animation)
            .ok_or_else(|| {
                AnimationError::invalid(format!(
                    "animation index {idx} out of bounds ({})",
                    self.animations.len()
                ))
            })
    }

    pub fn num_animations(&self) -> usize {
        self.animations.len()
    }

    pub fn animations(&self) -> impl Iterator<Item = &Animation> + '_ {
        self.animations.values()
    }

    // ----- Instances -----

    pub fn instantiate_animation(&mut self, name: &str) -> Result<InstId, AnimationError> {
        if name.is_empty() {
            return Err(AnimationError::invalid(
                "cannot instantiate an animation without a name",
            ));
        }
        if !self.animations.contains_key(name) {
            return Err(AnimationError::unknown("Animation", name));
        }
        let id = self.ids.alloc_inst();
        self.instances
            .push(AnimationInstance::new(id, name.to_string(), &self.cfg));
        self.instances_by_animation
            .entry(name.to_string())
            .or_default()
            .push(id);
        debug!("instantiated '{name}' as {id:?}");
        Ok(id)
    }

    fn instance_index(&self, id: InstId) -> Result<usize, AnimationError> {
        self.instances
            .iter()
            .position(|i| i.id() == id)
            .ok_or_else(|| AnimationError::unknown("AnimationInstance", format!("{id:?}")))
    }

    pub fn destroy_animation_instance(&mut self, id: InstId) -> Result<(), AnimationError> {
        let idx = self.instance_index(id)?;
        let instance = self.instances.remove(idx);
        if let Some(ids) = self
            .instances_by_animation
            .get_mut(instance.animation_name())
        {
            ids.retain(|i| *i != id);
            if ids.is_empty() {
                self.instances_by_animation
                    .remove(instance.animation_name());
            }
        }
        Ok(())
    }

    /// Returns how many instances were destroyed.
    pub fn destroy_all_instances_of_animation(&mut self, name: &str) -> usize {
        let Some(ids) = self.instances_by_animation.remove(name) else {
            return 0;
        };
        self.instances.retain(|i| !ids.contains(&i.id()));
        ids.len()
    }

    pub fn destroy_all_animation_instances(&mut self) {
        self.instances.clear();
        self.instances_by_animation.clear();
    }

    pub fn instance(&self, id: InstId) -> Result<&AnimationInstance, AnimationError> {
        let idx = self.instance_index(id)?;
        Ok(&self.instances[idx])
    }

    pub fn instance_mut(&mut self, id: InstId) -> Result<&mut AnimationInstance, AnimationError> {
        let idx = self.instance_index(id)?;
        Ok(&mut self.instances[idx])
    }

    /// View pairing an instance with its definition for start/stop/step/apply.
    pub fn playback(&mut self, id: InstId) -> Result<Playback<'_>, AnimationError> {
        let idx = self.instance_index(id)?;
        let instance = &mut self.instances[idx];
        let animation = self
            .animations
            .get(instance.animation_name())
            .ok_or_else(|| AnimationError::unknown("Animation", instance.animation_name()))?;
        Ok(Playback::new(instance, animation))
    }

    /// Instance by creation order.
    pub fn animation_instance_at_idx(
        &self,
        idx: usize,
    ) -> Result<&AnimationInstance, AnimationError> {
        self.instances.get(idx).ok_or_else(|| {
            AnimationError::invalid(format!(
                "instance index {idx} out of bounds ({})",
                self.instances.len()
            ))
        })
    }

    pub fn num_animation_instances(&self) -> usize {
        self.instances.len()
    }

    /// Ids of the live instances of one definition.
    pub fn instances_of(&self, name: &str) -> &[InstId] {
        self.instances_by_animation
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ----- Ticking and events -----

    /// Advance every auto-stepping instance by `delta` seconds.
    pub fn auto_step_instances(&mut self, delta: f32) -> Result<(), AnimationError> {
        if delta.is_nan() || delta < 0.0 {
            return Err(AnimationError::invalid(format!(
                "step delta must be >= 0, got {delta}"
            )));
        }
        for instance in self.instances.iter_mut().filter(|i| i.is_auto_stepping()) {
            let Some(animation) = self.animations.get(instance.animation_name()) else {
                continue;
            };
            Playback::new(instance, animation).step(delta)?;
        }
        Ok(())
    }

    /// Deliver `event` from `sender` to every instance subscribed to it.
    /// Returns the number of actions that ran.
    pub fn fire_event(&mut self, sender: &str, event: &str) -> usize {
        let mut handled = 0;
        for instance in self.instances.iter_mut() {
            if instance.event_sender() != Some(sender) || !instance.is_connected_to(event) {
                continue;
            }
            let Some(animation) = self.animations.get(instance.animation_name()) else {
                continue;
            };
            handled += Playback::new(instance, animation).handle_event(event);
        }
        handled
    }

    /// Collect pending lifecycle events from every instance, in instance order.
    pub fn drain_events(&mut self) -> Vec<AnimationEvent> {
        self.instances
            .iter_mut()
            .flat_map(|i| i.drain_events().collect::<Vec<_>>())
            .collect()
    }

    // ----- XML -----

    /// Load every definition in `source`. Returns the created names.
    /// On failure nothing from `source` stays registered.
    pub fn load_animations_from_xml(&mut self, source: &str) -> Result<Vec<String>, AnimationError> {
        xml::load_animations(self, source)
    }

    pub fn load_animations_from_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<String>, AnimationError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        self.load_animations_from_xml(&source)
            .map_err(|err| err.in_context(path.as_ref().display().to_string()))
    }

    pub fn animation_definition_as_xml(&self, name: &str) -> Result<String, AnimationError> {
        Ok(xml::write_animation_xml(self.animation(name)?))
    }
}

impl Drop for AnimationManager {
    fn drop(&mut self) {
        self.destroy_all_animation_instances();
        self.destroy_all_animations();
        self.interpolators.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::LinearInterpolator;

    #[test]
    fn generated_names_are_unique_and_increasing() {
        let mut mgr = AnimationManager::default();
        let names: Vec<String> = (0..3)
            .map(|_| mgr.create_animation("").unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["__ceanim_uid_0", "__ceanim_uid_1", "__ceanim_uid_2"]
        );
    }

    #[test]
    fn generated_name_collision_is_reported() {
        let mut mgr = AnimationManager::default();
        mgr.create_animation("__ceanim_uid_0").unwrap();
        assert!(matches!(
            mgr.create_animation(""),
            Err(AnimationError::AlreadyExists { .. })
        ));
        assert_eq!(mgr.create_animation("").unwrap().name(), "__ceanim_uid_1");
    }

    #[test]
    fn counter_wraps_without_failing() {
        let mut mgr = AnimationManager::default();
        mgr.ids = IdAllocator::starting_at(u64::MAX);
        let last = mgr.create_animation("").unwrap().name().to_string();
        assert_eq!(last, format!("__ceanim_uid_{}", u64::MAX));
        assert_eq!(mgr.create_animation("").unwrap().name(), "__ceanim_uid_0");
    }

    #[test]
    fn interpolator_registration() {
        let mut mgr = AnimationManager::default();
        assert!(mgr.has_interpolator("QuaternionSlerp"));
        let custom: Rc<dyn Interpolator> = Rc::new(LinearInterpolator::<f32>::new("Depth"));
        mgr.add_interpolator(custom.clone()).unwrap();
        assert!(matches!(
            mgr.add_interpolator(custom),
            Err(AnimationError::AlreadyExists { .. })
        ));
        // definitions see registrations made after they were created
        mgr.create_animation("A").unwrap();
        mgr.add_interpolator(Rc::new(LinearInterpolator::<f32>::new("Late")))
            .unwrap();
        mgr.animation_mut("A")
            .unwrap()
            .create_affector("Z", "Late")
            .unwrap();
        mgr.remove_interpolator("Depth").unwrap();
        assert!(mgr.interpolator("Depth").is_err());
    }

    #[test]
    fn index_bookkeeping() {
        let mut mgr = AnimationManager::default();
        mgr.create_animation("A").unwrap();
        mgr.create_animation("B").unwrap();
        let a0 = mgr.instantiate_animation("A").unwrap();
        let a1 = mgr.instantiate_animation("A").unwrap();
        let b0 = mgr.instantiate_animation("B").unwrap();
        assert_eq!(mgr.instances_of("A"), &[a0, a1]);

        mgr.destroy_animation_instance(a0).unwrap();
        assert_eq!(mgr.instances_of("A"), &[a1]);
        assert!(mgr.destroy_animation_instance(a0).is_err());

        mgr.destroy_animation("A").unwrap();
        assert!(mgr.instances_of("A").is_empty());
        assert_eq!(mgr.num_animation_instances(), 1);
        assert_eq!(mgr.animation_instance_at_idx(0).unwrap().id(), b0);
        assert_eq!(mgr.animation_at_idx(0).unwrap().name(), "B");
    }
}

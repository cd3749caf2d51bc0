//! Animation definitions: a named, reusable set of affectors.
//!
//! Definitions are created and owned by the [`AnimationManager`](crate::AnimationManager)
//! and are never played directly; an [`AnimationInstance`] carries the playback state.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::affector::Affector;
use crate::error::AnimationError;
use crate::instance::AnimationInstance;
use crate::interp::{Interpolator, InterpolatorRegistry};

/// What happens when an instance reaches the end of the timeline.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplayMode {
    Once,
    #[default]
    Loop,
    Bounce,
}

impl ReplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReplayMode::Once => "once",
            ReplayMode::Loop => "loop",
            ReplayMode::Bounce => "bounce",
        }
    }
}

impl fmt::Display for ReplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplayMode {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "once" => Ok(ReplayMode::Once),
            "loop" => Ok(ReplayMode::Loop),
            "bounce" => Ok(ReplayMode::Bounce),
            other => Err(AnimationError::invalid(format!(
                "unknown replay mode '{other}'"
            ))),
        }
    }
}

/// Instance handler an auto-subscribed event triggers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationAction {
    Start,
    Stop,
    Pause,
    Unpause,
    TogglePause,
}

impl AnimationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AnimationAction::Start => "Start",
            AnimationAction::Stop => "Stop",
            AnimationAction::Pause => "Pause",
            AnimationAction::Unpause => "Unpause",
            AnimationAction::TogglePause => "TogglePause",
        }
    }
}

impl fmt::Display for AnimationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimationAction {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Start" => Ok(AnimationAction::Start),
            "Stop" => Ok(AnimationAction::Stop),
            "Pause" => Ok(AnimationAction::Pause),
            "Unpause" => Ok(AnimationAction::Unpause),
            "TogglePause" => Ok(AnimationAction::TogglePause),
            other => Err(AnimationError::invalid(format!(
                "unknown animation action '{other}'"
            ))),
        }
    }
}

/// A named animation definition.
#[derive(Debug)]
pub struct Animation {
    name: String,
    duration: f32,
    replay_mode: ReplayMode,
    auto_start: bool,
    affectors: Vec<Affector>,
    auto_subscriptions: Vec<(String, AnimationAction)>,
    interpolators: InterpolatorRegistry,
}

impl Animation {
    pub(crate) fn new(name: String, interpolators: InterpolatorRegistry) -> Self {
        Self {
            name,
            duration: 0.0,
            replay_mode: ReplayMode::default(),
            auto_start: false,
            affectors: Vec::new(),
            auto_subscriptions: Vec::new(),
            interpolators,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length of the timeline in seconds.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: f32) -> Result<(), AnimationError> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(AnimationError::invalid(format!(
                "duration of '{}' must be finite and >= 0, got {duration}",
                self.name
            )));
        }
        self.duration = duration + 0.0;
        for affector in &self.affectors {
            for kf in affector.key_frames() {
                if kf.position() > self.duration {
                    warn!(
                        "animation '{}': keyframe of '{}' at {} lies past duration {}",
                        self.name,
                        affector.target_property(),
                        kf.position(),
                        self.duration
                    );
                }
            }
        }
        Ok(())
    }

    pub fn replay_mode(&self) -> ReplayMode {
        self.replay_mode
    }

    pub fn set_replay_mode(&mut self, mode: ReplayMode) {
        self.replay_mode = mode;
    }

    /// Whether binding a target starts the instance.
    pub fn auto_start(&self) -> bool {
        self.auto_start
    }

    pub fn set_auto_start(&mut self, auto_start: bool) {
        self.auto_start = auto_start;
    }

    /// Add an affector whose interpolator is looked up by type name.
    pub fn create_affector(
        &mut self,
        target_property: impl Into<String>,
        interpolator: &str,
    ) -> Result<&mut Affector, AnimationError> {
        let interpolator = self.interpolators.get(interpolator)?;
        Ok(self.create_affector_with(target_property, interpolator))
    }

    pub fn create_affector_with(
        &mut self,
        target_property: impl Into<String>,
        interpolator: Rc<dyn Interpolator>,
    ) -> &mut Affector {
        self.push_affector(Affector::new(target_property, Some(interpolator)))
    }

    /// Affector with no interpolator yet; it is skipped by `apply` until one is set.
    pub(crate) fn create_affector_without_interpolator(
        &mut self,
        target_property: impl Into<String>,
    ) -> &mut Affector {
        self.push_affector(Affector::new(target_property, None))
    }

    fn push_affector(&mut self, affector: Affector) -> &mut Affector {
        self.affectors.push(affector);
        let idx = self.affectors.len() - 1;
        &mut self.affectors[idx]
    }

    fn affector_out_of_bounds(&self, idx: usize) -> AnimationError {
        AnimationError::invalid(format!(
            "affector index {idx} out of bounds for '{}' ({} affectors)",
            self.name,
            self.affectors.len()
        ))
    }

    pub fn destroy_affector(&mut self, idx: usize) -> Result<Affector, AnimationError> {
        if idx >= self.affectors.len() {
            return Err(self.affector_out_of_bounds(idx));
        }
        Ok(self.affectors.remove(idx))
    }

    pub fn affector_at_idx(&self, idx: usize) -> Result<&Affector, AnimationError> {
        self.affectors
            .get(idx)
            .ok_or_else(|| self.affector_out_of_bounds(idx))
    }

    pub fn affector_at_idx_mut(&mut self, idx: usize) -> Result<&mut Affector, AnimationError> {
        if idx >= self.affectors.len() {
            return Err(self.affector_out_of_bounds(idx));
        }
        Ok(&mut self.affectors[idx])
    }

    pub fn num_affectors(&self) -> usize {
        self.affectors.len()
    }

    /// Affectors in insertion order.
    pub fn affectors(&self) -> &[Affector] {
        &self.affectors
    }

    /// Wire `event` on an instance's event sender to `action`.
    pub fn define_auto_subscription(
        &mut self,
        event: impl Into<String>,
        action: &str,
    ) -> Result<(), AnimationError> {
        let event = event.into();
        let action: AnimationAction = action.parse()?;
        if self
            .auto_subscriptions
            .iter()
            .any(|(e, a)| *e == event && *a == action)
        {
            return Err(AnimationError::already_exists(
                "auto subscription",
                format!("{event} -> {action}"),
            ));
        }
        self.auto_subscriptions.push((event, action));
        Ok(())
    }

    pub fn undefine_auto_subscription(
        &mut self,
        event: &str,
        action: &str,
    ) -> Result<(), AnimationError> {
        let action: AnimationAction = action.parse()?;
        let idx = self
            .auto_subscriptions
            .iter()
            .position(|(e, a)| e == event && *a == action)
            .ok_or_else(|| {
                AnimationError::unknown("auto subscription", format!("{event} -> {action}"))
            })?;
        self.auto_subscriptions.remove(idx);
        Ok(())
    }

    pub fn undefine_all_auto_subscriptions(&mut self) {
        self.auto_subscriptions.clear();
    }

    /// (event, action) pairs in definition order.
    pub fn auto_subscriptions(&self) -> &[(String, AnimationAction)] {
        &self.auto_subscriptions
    }

    /// Connect every auto-subscription to the instance's event sender.
    /// Instances without a sender are left untouched.
    pub fn auto_subscribe(&self, instance: &mut AnimationInstance) {
        if instance.event_sender().is_none() {
            return;
        }
        for (event, action) in &self.auto_subscriptions {
            instance.connect(event.clone(), *action);
        }
    }

    pub fn auto_unsubscribe(&self, instance: &mut AnimationInstance) {
        instance.disconnect_all();
    }

    /// Snapshot every base and source property this definition reads.
    /// Failures are logged per affector; the rest are still saved.
    pub fn save_property_values(&self, instance: &mut AnimationInstance) {
        for (idx, affector) in self.affectors.iter().enumerate() {
            if let Err(err) = affector.save_property_values(instance) {
                warn!(
                    "animation '{}' affector #{idx} ('{}'): cannot save property values: {err}",
                    self.name,
                    affector.target_property()
                );
            }
        }
    }

    /// Apply every affector in insertion order. A failing affector is logged
    /// and skipped for this tick.
    pub fn apply(&self, instance: &AnimationInstance) {
        for (idx, affector) in self.affectors.iter().enumerate() {
            if let Err(err) = affector.apply(instance) {
                error!(
                    "animation '{}' affector #{idx} ('{}'): {err}",
                    self.name,
                    affector.target_property()
                );
            }
        }
        debug!(
            "applied '{}' at position {}",
            self.name,
            instance.position()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ids::InstId;
    use crate::keyframe::Progression;
    use ceanim_api_core::{PropertyMap, SharedPropertySet};

    fn animation(name: &str) -> Animation {
        Animation::new(name.to_string(), InterpolatorRegistry::with_builtins())
    }

    #[test]
    fn defaults() {
        let anim = animation("A");
        assert_eq!(anim.duration(), 0.0);
        assert_eq!(anim.replay_mode(), ReplayMode::Loop);
        assert!(!anim.auto_start());
        assert_eq!(anim.num_affectors(), 0);
    }

    #[test]
    fn duration_is_validated() {
        let mut anim = animation("A");
        assert!(anim.set_duration(-1.0).is_err());
        assert!(anim.set_duration(f32::NAN).is_err());
        anim.set_duration(2.5).unwrap();
        assert_eq!(anim.duration(), 2.5);
    }

    #[test]
    fn affectors_by_index() {
        let mut anim = animation("A");
        assert!(matches!(
            anim.create_affector("Alpha", "missing"),
            Err(AnimationError::UnknownObject { .. })
        ));
        anim.create_affector("Alpha", "float").unwrap();
        anim.create_affector("Text", "String").unwrap();
        assert_eq!(anim.affector_at_idx(1).unwrap().target_property(), "Text");
        assert!(matches!(
            anim.affector_at_idx(2),
            Err(AnimationError::InvalidRequest { .. })
        ));
        let removed = anim.destroy_affector(0).unwrap();
        assert_eq!(removed.target_property(), "Alpha");
        assert_eq!(anim.num_affectors(), 1);
        assert!(anim.destroy_affector(5).is_err());
    }

    #[test]
    fn auto_subscription_rules() {
        let mut anim = animation("A");
        anim.define_auto_subscription("MouseEnters", "Start")
            .unwrap();
        anim.define_auto_subscription("MouseEnters", "Pause")
            .unwrap();
        assert!(matches!(
            anim.define_auto_subscription("MouseEnters", "Start"),
            Err(AnimationError::AlreadyExists { .. })
        ));
        assert!(matches!(
            anim.define_auto_subscription("MouseEnters", "Explode"),
            Err(AnimationError::InvalidRequest { .. })
        ));
        assert!(matches!(
            anim.undefine_auto_subscription("MouseLeaves", "Start"),
            Err(AnimationError::UnknownObject { .. })
        ));
        anim.undefine_auto_subscription("MouseEnters", "Start")
            .unwrap();
        assert_eq!(
            anim.auto_subscriptions(),
            &[("MouseEnters".to_string(), AnimationAction::Pause)]
        );
        anim.undefine_all_auto_subscriptions();
        assert!(anim.auto_subscriptions().is_empty());
    }

    #[test]
    fn auto_subscribe_needs_a_sender() {
        let mut anim = animation("A");
        anim.define_auto_subscription("Clicked", "TogglePause")
            .unwrap();
        let mut inst = AnimationInstance::new(InstId(0), "A".into(), &Config::default());
        anim.auto_subscribe(&mut inst);
        assert!(inst.auto_connections().is_empty());

        inst.set_event_sender_name(Some("button".into()));
        anim.auto_subscribe(&mut inst);
        assert_eq!(inst.auto_connections().len(), 1);
        anim.auto_unsubscribe(&mut inst);
        assert!(inst.auto_connections().is_empty());
    }

    #[test]
    fn failing_affector_does_not_stop_the_rest() {
        let mut anim = animation("A");
        anim.create_affector("Broken", "float")
            .unwrap()
            .create_key_frame(0.0, "not a number", Progression::Linear, None)
            .unwrap();
        anim.create_affector("Alpha", "float")
            .unwrap()
            .create_key_frame(0.0, "0.75", Progression::Linear, None)
            .unwrap();

        let target = PropertyMap::new().into_shared();
        let mut inst = AnimationInstance::new(InstId(0), "A".into(), &Config::default());
        let shared: SharedPropertySet = target.clone();
        inst.bind_target(Some(shared));
        anim.apply(&inst);
        assert_eq!(target.borrow().get("Alpha"), Some("0.75"));
        assert_eq!(target.borrow().get("Broken"), None);
    }

    #[test]
    fn enum_names() {
        assert_eq!("bounce".parse::<ReplayMode>().unwrap(), ReplayMode::Bounce);
        assert!("twice".parse::<ReplayMode>().is_err());
        assert_eq!(
            "TogglePause".parse::<AnimationAction>().unwrap(),
            AnimationAction::TogglePause
        );
    }
}

//! Affectors bind one target property to a timeline of keyframes.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::AnimationError;
use crate::instance::AnimationInstance;
use crate::interp::Interpolator;
use crate::keyframe::{checked_position, KeyFrame, Progression};

/// How the interpolated value combines with the saved base value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationMethod {
    #[default]
    Absolute,
    Relative,
    RelativeMultiply,
}

impl ApplicationMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationMethod::Absolute => "absolute",
            ApplicationMethod::Relative => "relative",
            ApplicationMethod::RelativeMultiply => "relative multiply",
        }
    }

    /// Whether the target property has to be snapshotted at start.
    #[inline]
    pub fn uses_base_value(self) -> bool {
        !matches!(self, ApplicationMethod::Absolute)
    }
}

impl fmt::Display for ApplicationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationMethod {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "absolute" => Ok(ApplicationMethod::Absolute),
            "relative" => Ok(ApplicationMethod::Relative),
            "relative multiply" => Ok(ApplicationMethod::RelativeMultiply),
            other => Err(AnimationError::invalid(format!(
                "unknown application method '{other}'"
            ))),
        }
    }
}

/// Result of the bracket search for one query position.
///
/// `left`/`right` are keyframe indices. Distances are already corrected for
/// the degenerate case, so `left_distance + right_distance > 0` always holds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bracket {
    pub left: usize,
    pub right: usize,
    pub left_distance: f32,
    pub right_distance: f32,
}

impl Bracket {
    /// Raw interpolation fraction before progression reshaping.
    #[inline]
    pub fn fraction(&self) -> f32 {
        self.left_distance / (self.left_distance + self.right_distance)
    }
}

/// Writes one property of the instance's target from a keyframe timeline.
#[derive(Clone, Debug)]
pub struct Affector {
    target_property: String,
    application_method: ApplicationMethod,
    interpolator: Option<Rc<dyn Interpolator>>,
    // sorted by position, positions unique
    key_frames: Vec<KeyFrame>,
}

impl Affector {
    pub(crate) fn new(
        target_property: impl Into<String>,
        interpolator: Option<Rc<dyn Interpolator>>,
    ) -> Self {
        Self {
            target_property: target_property.into(),
            application_method: ApplicationMethod::Absolute,
            interpolator,
            key_frames: Vec::new(),
        }
    }

    pub fn target_property(&self) -> &str {
        &self.target_property
    }

    pub fn set_target_property(&mut self, name: impl Into<String>) {
        self.target_property = name.into();
    }

    pub fn application_method(&self) -> ApplicationMethod {
        self.application_method
    }

    pub fn set_application_method(&mut self, method: ApplicationMethod) {
        self.application_method = method;
    }

    pub fn interpolator(&self) -> Option<&Rc<dyn Interpolator>> {
        self.interpolator.as_ref()
    }

    pub fn set_interpolator(&mut self, interpolator: Option<Rc<dyn Interpolator>>) {
        self.interpolator = interpolator;
    }

    fn search(&self, position: f32) -> Result<usize, usize> {
        let position = position + 0.0;
        self.key_frames
            .binary_search_by(|kf| kf.position().total_cmp(&position))
    }

    fn missing_key_frame(position: f32) -> AnimationError {
        AnimationError::unknown("KeyFrame", format!("at position {position}"))
    }

    /// Insert a keyframe. Fails with `AlreadyExists` if the position is taken.
    pub fn create_key_frame(
        &mut self,
        position: f32,
        value: impl Into<String>,
        progression: Progression,
        source_property: Option<&str>,
    ) -> Result<&mut KeyFrame, AnimationError> {
        let position = checked_position(position)?;
        match self.search(position) {
            Ok(_) => Err(AnimationError::already_exists(
                "KeyFrame",
                format!("at position {position}"),
            )),
            Err(slot) => {
                let kf = KeyFrame::new(
                    position,
                    value.into(),
                    progression,
                    source_property.map(str::to_string),
                );
                self.key_frames.insert(slot, kf);
                Ok(&mut self.key_frames[slot])
            }
        }
    }

    pub fn destroy_key_frame(&mut self, position: f32) -> Result<KeyFrame, AnimationError> {
        let idx = self
            .search(position)
            .map_err(|_| Self::missing_key_frame(position))?;
        Ok(self.key_frames.remove(idx))
    }

    pub fn key_frame_at_position(&self, position: f32) -> Result<&KeyFrame, AnimationError> {
        let idx = self
            .search(position)
            .map_err(|_| Self::missing_key_frame(position))?;
        Ok(&self.key_frames[idx])
    }

    pub fn key_frame_at_position_mut(
        &mut self,
        position: f32,
    ) -> Result<&mut KeyFrame, AnimationError> {
        let idx = self
            .search(position)
            .map_err(|_| Self::missing_key_frame(position))?;
        Ok(&mut self.key_frames[idx])
    }

    pub fn has_key_frame_at_position(&self, position: f32) -> bool {
        self.search(position).is_ok()
    }

    /// Keyframe by index in position order.
    pub fn key_frame_at_idx(&self, idx: usize) -> Result<&KeyFrame, AnimationError> {
        let len = self.key_frames.len();
        self.key_frames.get(idx).ok_or_else(|| {
            AnimationError::invalid(format!("keyframe index {idx} out of bounds ({len})"))
        })
    }

    pub fn num_key_frames(&self) -> usize {
        self.key_frames.len()
    }

    pub fn key_frames(&self) -> &[KeyFrame] {
        &self.key_frames
    }

    /// Re-key a keyframe, keeping the timeline sorted.
    pub fn move_key_frame_to_position(
        &mut self,
        old_position: f32,
        new_position: f32,
    ) -> Result<(), AnimationError> {
        let new_position = checked_position(new_position)?;
        let from = self
            .search(old_position)
            .map_err(|_| Self::missing_key_frame(old_position))?;
        if self.key_frames[from].position() == new_position {
            return Ok(());
        }
        if self.search(new_position).is_ok() {
            return Err(AnimationError::already_exists(
                "KeyFrame",
                format!("at position {new_position}"),
            ));
        }
        let mut kf = self.key_frames.remove(from);
        kf.set_position(new_position);
        let slot = self.search(new_position).unwrap_or_else(|slot| slot);
        self.key_frames.insert(slot, kf);
        Ok(())
    }

    /// Linear scan for the keyframes surrounding `position`. `None` without keyframes.
    pub fn bracket(&self, position: f32) -> Option<Bracket> {
        let last = self.key_frames.len().checked_sub(1)?;
        let mut left = None;
        let mut right = None;
        for (idx, kf) in self.key_frames.iter().enumerate() {
            if kf.position() <= position {
                left = Some(idx);
            }
            if right.is_none() && kf.position() >= position {
                right = Some(idx);
            }
            if kf.position() > position {
                break;
            }
        }

        let (left, mut left_distance) = match left {
            Some(idx) => (idx, position - self.key_frames[idx].position()),
            None => (0, 0.0),
        };
        let (right, mut right_distance) = match right {
            Some(idx) => (idx, self.key_frames[idx].position() - position),
            None => (last, 0.0),
        };
        if left_distance + right_distance == 0.0 {
            left_distance = 0.5;
            right_distance = 0.5;
        }
        Some(Bracket {
            left,
            right,
            left_distance,
            right_distance,
        })
    }

    /// Snapshot base values this affector and its keyframes read during playback.
    pub fn save_property_values(
        &self,
        instance: &mut AnimationInstance,
    ) -> Result<(), AnimationError> {
        if self.application_method.uses_base_value() {
            instance.save_property_value(&self.target_property)?;
        }
        for kf in &self.key_frames {
            kf.save_property_value(instance)?;
        }
        Ok(())
    }

    /// Interpolate at the instance's position and write the target property.
    pub fn apply(&self, instance: &AnimationInstance) -> Result<(), AnimationError> {
        if self.key_frames.is_empty() {
            return Ok(());
        }
        if self.target_property.is_empty() {
            warn!("affector has no target property set, skipping");
            return Ok(());
        }
        let Some(interpolator) = &self.interpolator else {
            warn!(
                "affector for '{}' has no interpolator, skipping",
                self.target_property
            );
            return Ok(());
        };
        let target = instance
            .target()
            .ok_or_else(|| AnimationError::invalid("instance has no target"))?;
        let Some(bracket) = self.bracket(instance.position()) else {
            return Ok(());
        };

        let left = &self.key_frames[bracket.left];
        let right = &self.key_frames[bracket.right];
        let position = right.alter_interpolation_position(bracket.fraction());
        let v1 = left.value_for_animation(instance)?;
        let v2 = right.value_for_animation(instance)?;

        let result = match self.application_method {
            ApplicationMethod::Absolute => interpolator.interpolate_absolute(v1, v2, position)?,
            ApplicationMethod::Relative => {
                let base = self.base_value(instance)?;
                interpolator.interpolate_relative(base, v1, v2, position)?
            }
            ApplicationMethod::RelativeMultiply => {
                let base = self.base_value(instance)?;
                interpolator.interpolate_relative_multiply(base, v1, v2, position)?
            }
        };

        target
            .borrow_mut()
            .set_property(&self.target_property, &result)?;
        Ok(())
    }

    fn base_value<'a>(&self, instance: &'a AnimationInstance) -> Result<&'a str, AnimationError> {
        instance
            .saved_property_value(&self.target_property)
            .ok_or_else(|| {
                AnimationError::unknown("saved property value", self.target_property.clone())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ids::InstId;
    use crate::interp::InterpolatorRegistry;
    use ceanim_api_core::{PropertyMap, SharedPropertySet};
    use std::cell::RefCell;

    fn float_affector(positions: &[(f32, &str)]) -> Affector {
        let reg = InterpolatorRegistry::with_builtins();
        let mut aff = Affector::new("Alpha", Some(reg.get("float").unwrap()));
        for (p, v) in positions {
            aff.create_key_frame(*p, *v, Progression::Linear, None)
                .unwrap();
        }
        aff
    }

    fn instance_at(position: f32, target: &Rc<RefCell<PropertyMap>>) -> AnimationInstance {
        let mut inst = AnimationInstance::new(InstId(0), "test".into(), &Config::default());
        let shared: SharedPropertySet = target.clone();
        inst.bind_target(Some(shared));
        inst.force_position(position);
        inst
    }

    #[test]
    fn keyframes_stay_sorted_and_unique() {
        let mut aff = float_affector(&[(1.0, "1"), (0.0, "0"), (0.5, "0.5")]);
        let positions: Vec<f32> = aff.key_frames().iter().map(|k| k.position()).collect();
        assert_eq!(positions, vec![0.0, 0.5, 1.0]);

        let err = aff
            .create_key_frame(0.5, "x", Progression::Linear, None)
            .unwrap_err();
        assert!(matches!(err, AnimationError::AlreadyExists { .. }));
        // -0.0 and 0.0 are the same slot
        assert!(aff
            .create_key_frame(-0.0, "x", Progression::Linear, None)
            .is_err());
        assert!(aff.has_key_frame_at_position(-0.0));
    }

    #[test]
    fn move_and_destroy() {
        let mut aff = float_affector(&[(0.0, "0"), (0.5, "5"), (1.0, "10")]);
        assert!(matches!(
            aff.move_key_frame_to_position(0.5, 1.0),
            Err(AnimationError::AlreadyExists { .. })
        ));
        assert!(matches!(
            aff.move_key_frame_to_position(0.25, 0.75),
            Err(AnimationError::UnknownObject { .. })
        ));
        aff.move_key_frame_to_position(0.5, 2.0).unwrap();
        assert_eq!(aff.key_frame_at_idx(2).unwrap().value(), "5");
        assert_eq!(aff.key_frame_at_position(2.0).unwrap().value(), "5");
        assert!(aff.key_frame_at_idx(3).is_err());

        let removed = aff.destroy_key_frame(0.0).unwrap();
        assert_eq!(removed.value(), "0");
        assert_eq!(aff.num_key_frames(), 2);
        assert!(aff.destroy_key_frame(0.0).is_err());
    }

    #[test]
    fn bracket_inside_and_outside_range() {
        let aff = float_affector(&[(0.2, "0"), (0.6, "1"), (1.0, "2")]);

        let b = aff.bracket(0.4).unwrap();
        assert_eq!((b.left, b.right), (0, 1));
        assert!((b.fraction() - 0.5).abs() < 1e-6);

        let before = aff.bracket(0.0).unwrap();
        assert_eq!((before.left, before.right), (0, 0));
        assert_eq!(before.left_distance, 0.0);
        assert_eq!(before.fraction(), 0.0);

        let after = aff.bracket(3.0).unwrap();
        assert_eq!((after.left, after.right), (2, 2));
        assert_eq!(after.right_distance, 0.0);
        assert_eq!(after.fraction(), 1.0);

        let on = aff.bracket(0.6).unwrap();
        assert_eq!((on.left, on.right), (1, 1));
        assert_eq!(on.fraction(), 0.5);
    }

    #[test]
    fn bracket_sweep_keeps_order_and_encloses_position() {
        let aff = float_affector(&[
            (0.1, "0"),
            (0.25, "1"),
            (0.7, "2"),
            (0.75, "3"),
            (1.5, "4"),
        ]);
        let (min, max) = (0.1f32, 1.5f32);
        for step in 0..=200 {
            let p = (min - 0.2) + step as f32 * (max - min + 0.4) / 200.0;
            let b = aff.bracket(p).unwrap();
            let left = aff.key_frame_at_idx(b.left).unwrap().position();
            let right = aff.key_frame_at_idx(b.right).unwrap().position();
            assert!(left <= right, "p={p}: {left} > {right}");
            if (min..=max).contains(&p) {
                assert!(left <= p && p <= right, "p={p} outside [{left}, {right}]");
            }
            let f = b.fraction();
            assert!((0.0..=1.0).contains(&f), "p={p}: fraction {f}");
        }
    }

    #[test]
    fn discrete_right_keyframe_holds_left_value() {
        let reg = InterpolatorRegistry::with_builtins();
        let mut aff = Affector::new("Alpha", Some(reg.get("float").unwrap()));
        aff.create_key_frame(0.0, "0", Progression::Linear, None)
            .unwrap();
        aff.create_key_frame(1.0, "10", Progression::Discrete, None)
            .unwrap();
        let target = PropertyMap::new().into_shared();
        for p in [0.0, 0.25, 0.5, 0.99] {
            aff.apply(&instance_at(p, &target)).unwrap();
            assert_eq!(target.borrow().get("Alpha"), Some("0"), "at {p}");
        }
        aff.apply(&instance_at(1.0, &target)).unwrap();
        assert_eq!(target.borrow().get("Alpha"), Some("10"));
    }

    #[test]
    fn single_keyframe_resolves_to_its_value() {
        let aff = float_affector(&[(0.3, "7")]);
        let target = PropertyMap::new().into_shared();
        assert_eq!(aff.bracket(0.3).unwrap().fraction(), 0.5);
        for p in [0.0, 0.3, 0.9] {
            let b = aff.bracket(p).unwrap();
            assert_eq!((b.left, b.right), (0, 0));
            aff.apply(&instance_at(p, &target)).unwrap();
            assert_eq!(target.borrow().get("Alpha"), Some("7"));
        }
    }

    #[test]
    fn empty_affector_is_a_noop() {
        let aff = float_affector(&[]);
        let target = PropertyMap::new().into_shared();
        aff.apply(&instance_at(0.5, &target)).unwrap();
        assert_eq!(target.borrow().write_count(), 0);
        assert!(aff.bracket(0.5).is_none());
    }

    #[test]
    fn missing_interpolator_or_property_skips() {
        let target = PropertyMap::new().into_shared();
        let mut aff = float_affector(&[(0.0, "1")]);
        aff.set_interpolator(None);
        aff.apply(&instance_at(0.0, &target)).unwrap();
        let mut aff = float_affector(&[(0.0, "1")]);
        aff.set_target_property("");
        aff.apply(&instance_at(0.0, &target)).unwrap();
        assert_eq!(target.borrow().write_count(), 0);
    }

    #[test]
    fn absolute_application_is_idempotent() {
        let aff = float_affector(&[(0.0, "0"), (1.0, "1")]);
        let target = PropertyMap::new().into_shared();
        let inst = instance_at(0.25, &target);
        aff.apply(&inst).unwrap();
        let first = target.borrow().get("Alpha").map(str::to_string);
        aff.apply(&inst).unwrap();
        assert_eq!(target.borrow().get("Alpha").map(str::to_string), first);
        assert_eq!(first.as_deref(), Some("0.25"));
    }

    #[test]
    fn relative_needs_a_saved_base() {
        let mut aff = float_affector(&[(0.0, "0"), (1.0, "10")]);
        aff.set_application_method(ApplicationMethod::Relative);
        let target = PropertyMap::new().with("Alpha", "100").into_shared();
        let mut inst = instance_at(0.5, &target);
        assert!(matches!(
            aff.apply(&inst),
            Err(AnimationError::UnknownObject { .. })
        ));
        aff.save_property_values(&mut inst).unwrap();
        aff.apply(&inst).unwrap();
        assert_eq!(target.borrow().get("Alpha"), Some("105"));
    }

    #[test]
    fn format_errors_propagate() {
        let aff = float_affector(&[(0.0, "zero"), (1.0, "1")]);
        let target = PropertyMap::new().into_shared();
        let err = aff.apply(&instance_at(0.5, &target)).unwrap_err();
        assert!(matches!(err, AnimationError::Format(_)));
    }

    #[test]
    fn source_property_keyframes_read_snapshots() {
        let reg = InterpolatorRegistry::with_builtins();
        let mut aff = Affector::new("Alpha", Some(reg.get("float").unwrap()));
        aff.create_key_frame(0.0, "0", Progression::Linear, None)
            .unwrap();
        aff.create_key_frame(1.0, "", Progression::Linear, Some("TargetAlpha"))
            .unwrap();
        let target = PropertyMap::new().with("TargetAlpha", "4").into_shared();
        let mut inst = instance_at(0.5, &target);
        aff.save_property_values(&mut inst).unwrap();
        aff.apply(&inst).unwrap();
        assert_eq!(target.borrow().get("Alpha"), Some("2"));
    }

    #[test]
    fn application_method_names() {
        assert_eq!(
            "relative multiply".parse::<ApplicationMethod>().unwrap(),
            ApplicationMethod::RelativeMultiply
        );
        assert!("sideways".parse::<ApplicationMethod>().is_err());
    }
}

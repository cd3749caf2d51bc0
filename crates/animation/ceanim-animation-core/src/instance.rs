//! Animation instances: one live playback of a definition bound to a target.
//!
//! Operations that depend on the definition (start, step, apply, ...) live on
//! [`Playback`], a short-lived view pairing the instance with its definition.
//! The manager hands these out through [`AnimationManager::playback`](crate::AnimationManager::playback).

use std::collections::VecDeque;
use std::fmt;

use ceanim_api_core::SharedPropertySet;
use hashbrown::HashMap;
use log::{debug, trace, warn};

use crate::animation::{Animation, AnimationAction, ReplayMode};
use crate::config::Config;
use crate::error::AnimationError;
use crate::ids::InstId;
use crate::outputs::{AnimationEvent, AnimationEventKind};

/// Playback state of one instance.
pub struct AnimationInstance {
    id: InstId,
    animation: String,
    target: Option<SharedPropertySet>,
    event_receiver: Option<String>,
    event_sender: Option<String>,

    position: f32,
    speed: f32,
    bounce_backwards: bool,
    running: bool,
    skip_next_step: bool,
    max_step_delta_skip: f32,
    max_step_delta_clamp: f32,
    auto_stepping: bool,

    saved_property_values: HashMap<String, String>,
    auto_connections: Vec<(String, AnimationAction)>,
    pending_events: VecDeque<AnimationEvent>,
    max_pending_events: usize,
}

impl fmt::Debug for AnimationInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationInstance")
            .field("id", &self.id)
            .field("animation", &self.animation)
            .field("has_target", &self.target.is_some())
            .field("event_receiver", &self.event_receiver)
            .field("event_sender", &self.event_sender)
            .field("position", &self.position)
            .field("speed", &self.speed)
            .field("running", &self.running)
            .field("auto_stepping", &self.auto_stepping)
            .finish_non_exhaustive()
    }
}

impl AnimationInstance {
    pub(crate) fn new(id: InstId, animation: String, cfg: &Config) -> Self {
        Self {
            id,
            animation,
            target: None,
            event_receiver: None,
            event_sender: None,
            position: 0.0,
            speed: 1.0,
            bounce_backwards: false,
            running: false,
            skip_next_step: false,
            max_step_delta_skip: cfg.max_step_delta_skip_default,
            max_step_delta_clamp: cfg.max_step_delta_clamp_default,
            auto_stepping: cfg.auto_stepping_default,
            saved_property_values: HashMap::new(),
            auto_connections: Vec::new(),
            pending_events: VecDeque::new(),
            max_pending_events: cfg.max_pending_events,
        }
    }

    pub fn id(&self) -> InstId {
        self.id
    }

    /// Name of the definition this instance plays.
    pub fn animation_name(&self) -> &str {
        &self.animation
    }

    pub fn target(&self) -> Option<&SharedPropertySet> {
        self.target.as_ref()
    }

    pub(crate) fn bind_target(&mut self, target: Option<SharedPropertySet>) {
        self.target = target;
        self.purge_saved_property_values();
    }

    /// Name lifecycle events are addressed to.
    pub fn event_receiver(&self) -> Option<&str> {
        self.event_receiver.as_deref()
    }

    pub fn set_event_receiver(&mut self, receiver: Option<String>) {
        self.event_receiver = receiver;
    }

    /// Name of the event source auto-subscriptions listen on.
    pub fn event_sender(&self) -> Option<&str> {
        self.event_sender.as_deref()
    }

    pub(crate) fn set_event_sender_name(&mut self, sender: Option<String>) {
        self.event_sender = sender;
    }

    /// Current position in seconds, within `[0, duration]`.
    pub fn position(&self) -> f32 {
        self.position
    }

    #[cfg(test)]
    pub(crate) fn force_position(&mut self, position: f32) {
        self.position = position;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<(), AnimationError> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(AnimationError::invalid(format!(
                "playback speed must be finite and >= 0, got {speed}"
            )));
        }
        self.speed = speed;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True while a `Bounce` animation plays backwards.
    pub fn is_bouncing_backwards(&self) -> bool {
        self.bounce_backwards
    }

    pub fn max_step_delta_skip(&self) -> f32 {
        self.max_step_delta_skip
    }

    /// Steps longer than this are treated as zero. `<= 0` disables.
    pub fn set_max_step_delta_skip(&mut self, max: f32) {
        self.max_step_delta_skip = max;
    }

    pub fn max_step_delta_clamp(&self) -> f32 {
        self.max_step_delta_clamp
    }

    /// Steps are clamped to this length. `<= 0` disables.
    pub fn set_max_step_delta_clamp(&mut self, max: f32) {
        self.max_step_delta_clamp = max;
    }

    pub fn is_auto_stepping(&self) -> bool {
        self.auto_stepping
    }

    pub fn set_auto_stepping(&mut self, auto_stepping: bool) {
        self.auto_stepping = auto_stepping;
    }

    /// Snapshot of `name` taken when playback started.
    pub fn saved_property_value(&self, name: &str) -> Option<&str> {
        self.saved_property_values.get(name).map(String::as_str)
    }

    /// Read `name` from the target and keep it as a base value.
    pub fn save_property_value(&mut self, name: &str) -> Result<(), AnimationError> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| AnimationError::invalid("instance has no target"))?;
        let value = target.borrow().get_property(name)?;
        trace!("instance {:?}: saved '{name}' = '{value}'", self.id);
        self.saved_property_values.insert(name.to_string(), value);
        Ok(())
    }

    pub fn purge_saved_property_values(&mut self) {
        self.saved_property_values.clear();
    }

    /// Event → action pairs currently connected.
    pub fn auto_connections(&self) -> &[(String, AnimationAction)] {
        &self.auto_connections
    }

    pub(crate) fn connect(&mut self, event: String, action: AnimationAction) {
        self.auto_connections.push((event, action));
    }

    pub(crate) fn disconnect_all(&mut self) {
        self.auto_connections.clear();
    }

    pub(crate) fn is_connected_to(&self, event: &str) -> bool {
        self.auto_connections.iter().any(|(e, _)| e == event)
    }

    pub fn pending_events(&self) -> impl Iterator<Item = &AnimationEvent> + '_ {
        self.pending_events.iter()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = AnimationEvent> + '_ {
        self.pending_events.drain(..)
    }

    fn emit(&mut self, kind: AnimationEventKind) {
        debug!(
            "instance {:?} of '{}': {}",
            self.id,
            self.animation,
            kind.as_str()
        );
        if self.max_pending_events == 0 {
            return;
        }
        if self.pending_events.len() >= self.max_pending_events {
            self.pending_events.pop_front();
        }
        self.pending_events.push_back(AnimationEvent {
            instance: self.id,
            animation: self.animation.clone(),
            receiver: self.event_receiver.clone(),
            kind,
        });
    }

    /// Stop and rewind. Does not need the definition.
    pub fn stop(&mut self) {
        self.position = 0.0;
        self.running = false;
        self.emit(AnimationEventKind::Stopped);
    }

    pub fn pause(&mut self) {
        self.running = false;
        self.emit(AnimationEventKind::Paused);
    }
}

/// An instance paired with its definition.
pub struct Playback<'a> {
    instance: &'a mut AnimationInstance,
    animation: &'a Animation,
}

impl<'a> Playback<'a> {
    pub(crate) fn new(instance: &'a mut AnimationInstance, animation: &'a Animation) -> Self {
        Self {
            instance,
            animation,
        }
    }

    pub fn instance(&self) -> &AnimationInstance {
        self.instance
    }

    pub fn instance_mut(&mut self) -> &mut AnimationInstance {
        self.instance
    }

    pub fn animation(&self) -> &Animation {
        self.animation
    }

    pub fn is_running(&self) -> bool {
        self.instance.running
    }

    pub fn position(&self) -> f32 {
        self.instance.position
    }

    fn on_started(&mut self) {
        self.instance.purge_saved_property_values();
        if self.instance.target.is_some() {
            self.animation.save_property_values(self.instance);
        }
        self.instance.emit(AnimationEventKind::Started);
    }

    /// Rewind, snapshot base values and start running. `skip_next_step`
    /// makes the next step advance by zero so the first frame shows position 0.
    pub fn start(&mut self, skip_next_step: bool) {
        self.instance.position = 0.0;
        self.instance.bounce_backwards = false;
        self.instance.skip_next_step = skip_next_step;
        if self.animation.duration() > 0.0 {
            self.instance.running = true;
            self.on_started();
        } else {
            warn!(
                "instance {:?}: '{}' has zero duration, ending immediately",
                self.instance.id,
                self.animation.name()
            );
            self.on_started();
            self.instance.emit(AnimationEventKind::Ended);
        }
    }

    pub fn stop(&mut self) {
        self.instance.stop();
    }

    pub fn pause(&mut self) {
        self.instance.pause();
    }

    pub fn unpause(&mut self, skip_next_step: bool) {
        if self.animation.duration() > 0.0 {
            self.instance.running = true;
            self.instance.skip_next_step = skip_next_step;
            self.instance.emit(AnimationEventKind::Unpaused);
        } else {
            warn!(
                "instance {:?}: cannot unpause zero-duration '{}'",
                self.instance.id,
                self.animation.name()
            );
            self.instance.emit(AnimationEventKind::Unpaused);
            self.instance.emit(AnimationEventKind::Ended);
        }
    }

    pub fn toggle_pause(&mut self, skip_next_step: bool) {
        if self.instance.running {
            self.pause();
        } else {
            self.unpause(skip_next_step);
        }
    }

    /// Jump to `position` seconds. Does not apply.
    pub fn set_position(&mut self, position: f32) -> Result<(), AnimationError> {
        let duration = self.animation.duration();
        if !(0.0..=duration).contains(&position) {
            return Err(AnimationError::invalid(format!(
                "position {position} outside [0, {duration}] of '{}'",
                self.animation.name()
            )));
        }
        self.instance.position = position;
        Ok(())
    }

    /// Advance by `delta` seconds and apply. No-op unless running.
    pub fn step(&mut self, delta: f32) -> Result<(), AnimationError> {
        if !self.instance.running {
            return Ok(());
        }
        if delta.is_nan() || delta < 0.0 {
            return Err(AnimationError::invalid(format!(
                "step delta must be >= 0, got {delta}"
            )));
        }

        let inst = &mut *self.instance;
        let mut delta = delta;
        if inst.max_step_delta_skip > 0.0 && delta > inst.max_step_delta_skip {
            delta = 0.0;
        }
        if inst.max_step_delta_clamp > 0.0 {
            delta = delta.min(inst.max_step_delta_clamp);
        }
        if inst.skip_next_step {
            inst.skip_next_step = false;
            delta = 0.0;
        }

        delta *= inst.speed;
        if !delta.is_finite() {
            return Err(AnimationError::invalid(format!(
                "step of {delta} seconds at speed {} leaves the timeline",
                inst.speed
            )));
        }
        if inst.bounce_backwards {
            delta = -delta;
        }

        let duration = self.animation.duration();
        let mut position = inst.position + delta;
        if position >= duration {
            match self.animation.replay_mode() {
                ReplayMode::Once => {
                    inst.position = duration;
                    self.apply();
                    self.instance.running = false;
                    self.instance.emit(AnimationEventKind::Ended);
                    return Ok(());
                }
                ReplayMode::Loop => {
                    position = 0.0;
                    inst.emit(AnimationEventKind::Looped);
                }
                ReplayMode::Bounce => {
                    position = duration;
                    inst.bounce_backwards = true;
                    inst.emit(AnimationEventKind::Looped);
                }
            }
        } else if position < 0.0 {
            position = 0.0;
            inst.bounce_backwards = false;
            inst.emit(AnimationEventKind::Looped);
        }
        inst.position = position;
        self.apply();
        Ok(())
    }

    /// Write the definition's values at the current position, if a target is bound.
    pub fn apply(&self) {
        if self.instance.target.is_some() {
            self.animation.apply(self.instance);
        }
    }

    /// Bind a target. Starts the instance when the definition auto-starts.
    pub fn set_target(&mut self, target: Option<SharedPropertySet>) {
        self.instance.bind_target(target);
        if self.animation.auto_start() && !self.instance.running {
            self.start(true);
        }
    }

    /// Change the event source and rewire the definition's auto-subscriptions.
    pub fn set_event_sender(&mut self, sender: Option<String>) {
        self.animation.auto_unsubscribe(self.instance);
        self.instance.set_event_sender_name(sender);
        self.animation.auto_subscribe(self.instance);
    }

    /// Run every action connected to `event`. Returns how many ran.
    pub fn handle_event(&mut self, event: &str) -> usize {
        let actions: Vec<AnimationAction> = self
            .instance
            .auto_connections
            .iter()
            .filter(|(e, _)| e == event)
            .map(|(_, a)| *a)
            .collect();
        for action in &actions {
            match action {
                AnimationAction::Start => self.handle_start(),
                AnimationAction::Stop => self.handle_stop(),
                AnimationAction::Pause => self.handle_pause(),
                AnimationAction::Unpause => self.handle_unpause(),
                AnimationAction::TogglePause => self.handle_toggle_pause(),
            }
        }
        actions.len()
    }

    pub fn handle_start(&mut self) {
        self.start(true);
    }

    pub fn handle_stop(&mut self) {
        self.stop();
    }

    pub fn handle_pause(&mut self) {
        self.pause();
    }

    pub fn handle_unpause(&mut self) {
        self.unpause(true);
    }

    pub fn handle_toggle_pause(&mut self) {
        self.toggle_pause(true);
    }
}

//! Lifecycle events produced by animation instances.
//!
//! Instances queue events as they start, stop, pause, loop and end. Hosts
//! collect them with [`AnimationManager::drain_events`](crate::AnimationManager::drain_events)
//! and route them to whatever listens on `receiver`.

use serde::{Deserialize, Serialize};

use crate::ids::InstId;

/// Playback transitions an instance reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationEventKind {
    Started,
    Stopped,
    Paused,
    Unpaused,
    /// A `Once` animation reached its end.
    Ended,
    /// A `Loop` animation wrapped or a `Bounce` animation turned around.
    Looped,
}

impl AnimationEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnimationEventKind::Started => "AnimationStarted",
            AnimationEventKind::Stopped => "AnimationStopped",
            AnimationEventKind::Paused => "AnimationPaused",
            AnimationEventKind::Unpaused => "AnimationUnpaused",
            AnimationEventKind::Ended => "AnimationEnded",
            AnimationEventKind::Looped => "AnimationLooped",
        }
    }
}

/// One lifecycle event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationEvent {
    pub instance: InstId,
    pub animation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    pub kind: AnimationEventKind,
}

//! Core configuration for ceanim-animation-core.

use serde::{Deserialize, Serialize};

/// Configuration for the animation manager and the instances it creates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix for names generated by `create_animation("")`.
    pub generated_name_prefix: String,

    /// Maximum lifecycle events retained per instance before the oldest are dropped.
    pub max_pending_events: usize,

    /// Whether new instances are advanced by `auto_step_instances`.
    pub auto_stepping_default: bool,

    /// Initial per-instance step thresholds; values <= 0 disable them.
    pub max_step_delta_skip_default: f32,
    pub max_step_delta_clamp_default: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generated_name_prefix: "__ceanim_uid_".to_string(),
            max_pending_events: 1024,
            auto_stepping_default: true,
            max_step_delta_skip_default: -1.0,
            max_step_delta_clamp_default: -1.0,
        }
    }
}

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Shaping curve applied to normalized blend time.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Fast start, gentle finish.
    #[default]
    QuadOut,
    SmoothStep,
}

impl Easing {
    /// Maps `t` in `[0, 1]` (clamped) to a blend factor in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Easing::Linear),
            "quad_out" | "quad-out" | "power1.out" => Ok(Easing::QuadOut),
            "smooth_step" | "smoothstep" => Ok(Easing::SmoothStep),
            other => Err(format!("unknown easing '{other}'")),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Fade length in seconds. Zero or less completes on the next frame.
    pub duration_s: f64,
    pub easing: Easing,
}

impl BlendConfig {
    pub const DEFAULT_DURATION_S: f64 = 0.4;

    pub fn from_millis(ms: u64) -> Self {
        Self {
            duration_s: ms as f64 / 1000.0,
            ..Self::default()
        }
    }

    /// Normalized progress after `elapsed_s`.
    pub fn progress(&self, elapsed_s: f64) -> f64 {
        if self.duration_s.is_nan() || self.duration_s <= 0.0 {
            return 1.0;
        }
        (elapsed_s / self.duration_s).clamp(0.0, 1.0)
    }
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            duration_s: Self::DEFAULT_DURATION_S,
            easing: Easing::default(),
        }
    }
}

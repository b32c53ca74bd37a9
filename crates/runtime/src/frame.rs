use foundation::time::Time;

/// Fallback cadence for invalid frame rates.
pub const DEFAULT_FPS: f64 = 60.0;

/// Fastest supported cadence; keeps `dt_s` well above timer resolution.
pub const MAX_FPS: f64 = 1000.0;

/// One step of the render cadence that drives blend progression.
///
/// Frames are pure values: the same index and delta always yield the same
/// start time, so a recorded slider session replays identically.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub index: u64,
    /// Seconds covered by this frame.
    pub dt_s: f64,
    /// Start of the frame, measured from frame 0.
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// Frame 0 of a cadence at `fps`.
    ///
    /// Zero, negative or NaN rates use [`DEFAULT_FPS`]; rates above
    /// [`MAX_FPS`] are clamped.
    pub fn at_fps(fps: f64) -> Self {
        let fps = if fps.is_nan() || fps <= 0.0 {
            DEFAULT_FPS
        } else {
            fps.min(MAX_FPS)
        };
        Self::new(0, 1.0 / fps)
    }

    pub fn fps(&self) -> f64 {
        if self.dt_s > 0.0 { 1.0 / self.dt_s } else { DEFAULT_FPS }
    }

    /// Frames needed to cover `seconds` at this cadence, rounded up.
    pub fn frames_for(&self, seconds: f64) -> u64 {
        if !(seconds.is_finite() && self.dt_s > 0.0) || seconds <= 0.0 {
            return 0;
        }
        (seconds / self.dt_s).ceil() as u64
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }
}

use foundation::Age;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliderError {
    InvertedRange { min: i32, max: i32 },
    ZeroStep,
}

impl std::fmt::Display for SliderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SliderError::InvertedRange { min, max } => {
                write!(f, "slider range is inverted: min={min} max={max}")
            }
            SliderError::ZeroStep => write!(f, "slider step must be positive"),
        }
    }
}

impl std::error::Error for SliderError {}

/// Value range and step of the timeline control, in Ma.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSlider", into = "RawSlider")]
pub struct SliderRange {
    min: i32,
    max: i32,
    step: u32,
}

#[derive(Serialize, Deserialize)]
struct RawSlider {
    min: i32,
    max: i32,
    #[serde(default = "default_step")]
    step: u32,
}

fn default_step() -> u32 {
    1
}

impl TryFrom<RawSlider> for SliderRange {
    type Error = SliderError;

    fn try_from(raw: RawSlider) -> Result<Self, Self::Error> {
        SliderRange::new(raw.min, raw.max, raw.step)
    }
}

impl From<SliderRange> for RawSlider {
    fn from(s: SliderRange) -> Self {
        RawSlider {
            min: s.min,
            max: s.max,
            step: s.step,
        }
    }
}

impl SliderRange {
    pub fn new(min: i32, max: i32, step: u32) -> Result<Self, SliderError> {
        if min > max {
            return Err(SliderError::InvertedRange { min, max });
        }
        if step == 0 {
            return Err(SliderError::ZeroStep);
        }
        Ok(Self { min, max, step })
    }

    /// `[0, 540]`, one Ma per step.
    pub fn phanerozoic() -> Self {
        Self {
            min: 0,
            max: 540,
            step: 1,
        }
    }

    /// `[-600, 250]`: past and projected future.
    pub fn past_and_future() -> Self {
        Self {
            min: -600,
            max: 250,
            step: 1,
        }
    }

    pub fn min(&self) -> Age {
        Age(self.min)
    }

    pub fn max(&self) -> Age {
        Age(self.max)
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn contains(&self, age: Age) -> bool {
        (self.min..=self.max).contains(&age.0)
    }

    /// Snap a raw control value onto the range.
    ///
    /// Values are clamped to `[min, max]` and rounded to the nearest step counted
    /// from `min`; halfway values round away from `min`. A step grid that does not
    /// land on `max` never produces a value above it. NaN maps to `min`.
    pub fn quantize(&self, raw: f64) -> Age {
        if raw.is_nan() {
            return Age(self.min);
        }
        let min = f64::from(self.min);
        let max = f64::from(self.max);
        let step = f64::from(self.step);

        let clamped = raw.clamp(min, max);
        let steps = ((clamped - min) / step).round() as i64;
        let mut value = i64::from(self.min) + steps * i64::from(self.step);
        if value > i64::from(self.max) {
            value -= i64::from(self.step);
        }
        // In range after the adjustment above.
        Age(value as i32)
    }

    /// Every reachable value, ascending.
    pub fn ages(&self) -> impl Iterator<Item = Age> + use<> {
        (i64::from(self.min)..=i64::from(self.max))
            .step_by(self.step as usize)
            .map(|v| Age(v as i32))
    }
}

impl Default for SliderRange {
    fn default() -> Self {
        Self::phanerozoic()
    }
}

#[cfg(test)]
mod tests {
    use super::{SliderError, SliderRange};
    use foundation::Age;

    #[test]
    fn rejects_bad_ranges() {
        assert_eq!(
            SliderRange::new(10, 0, 1),
            Err(SliderError::InvertedRange { min: 10, max: 0 })
        );
        assert_eq!(SliderRange::new(0, 10, 0), Err(SliderError::ZeroStep));
    }

    #[test]
    fn quantize_clamps_and_snaps() {
        let s = SliderRange::new(-600, 250, 10).expect("range");
        assert_eq!(s.quantize(-1000.0), Age(-600));
        assert_eq!(s.quantize(1000.0), Age(250));
        assert_eq!(s.quantize(14.9), Age(10));
        assert_eq!(s.quantize(15.0), Age(20));
        assert_eq!(s.quantize(-4.0), Age(0));
        assert_eq!(s.quantize(f64::NAN), Age(-600));
    }

    #[test]
    fn quantize_never_exceeds_max_on_uneven_grid() {
        let s = SliderRange::new(0, 25, 10).expect("range");
        assert_eq!(s.quantize(24.0), Age(20));
        assert_eq!(s.quantize(25.0), Age(20));
        assert!(s.ages().all(|a| s.contains(a)));
        assert_eq!(s.ages().collect::<Vec<_>>(), vec![Age(0), Age(10), Age(20)]);
    }

    #[test]
    fn presets_match_viewer_ranges() {
        let p = SliderRange::phanerozoic();
        assert_eq!((p.min(), p.max(), p.step()), (Age(0), Age(540), 1));
        assert_eq!(SliderRange::past_and_future().ages().count(), 851);
    }

    #[test]
    fn deserialization_validates() {
        let ok: SliderRange = serde_json::from_str(r#"{"min":0,"max":540}"#).expect("parse");
        assert_eq!(ok, SliderRange::phanerozoic());
        assert!(serde_json::from_str::<SliderRange>(r#"{"min":5,"max":0,"step":1}"#).is_err());
    }
}

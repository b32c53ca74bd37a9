/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Time(pub f64); // seconds

/// Geological age in millions of years (Ma).
///
/// Positive values are in the past, `0` is the present, negative values are
/// projections into the future.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Age(pub i32);

impl Age {
    pub const PRESENT: Age = Age(0);

    pub fn ma(self) -> i32 {
        self.0
    }

    pub fn is_present(self) -> bool {
        self.0 == 0
    }

    pub fn is_future(self) -> bool {
        self.0 < 0
    }

    /// Absolute distance in Ma. Computed in 64 bits so extreme ages cannot overflow.
    pub fn distance(self, other: Age) -> u64 {
        (i64::from(self.0) - i64::from(other.0)).unsigned_abs()
    }
}

impl std::fmt::Display for Age {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Ma", self.0)
    }
}

/// Monotonic counter identifying the most recent transition request.
///
/// Every accepted request bumps the live generation; work started under an older
/// generation is stale and must not touch shared state when it completes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl Generation {
    pub fn initial() -> Self {
        Generation(0)
    }

    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }

    /// `true` if work captured under `self` is still the latest issued.
    pub fn is_current(self, live: Generation) -> bool {
        self == live
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

use foundation::{AssetId, Generation};

/// Transition lifecycle:
/// Idle → Loading → Blending → Idle
///
/// A failed load goes straight from Loading back to Idle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TransitionPhase {
    #[default]
    Idle,
    Loading,
    Blending,
}

impl TransitionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionPhase::Idle => "idle",
            TransitionPhase::Loading => "loading",
            TransitionPhase::Blending => "blending",
        }
    }
}

/// Snapshot of what the controller is showing and what it is moving towards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionState {
    pub current: AssetId,
    /// Present exactly when the phase is not [`TransitionPhase::Idle`].
    pub pending: Option<AssetId>,
    pub generation: Generation,
    pub phase: TransitionPhase,
    /// False while `current` has never reached the render target, e.g. after
    /// a failed preload. Such an asset is requested again instead of skipped.
    pub displayed: bool,
}

impl TransitionState {
    pub fn new(current: AssetId) -> Self {
        Self {
            current,
            pending: None,
            generation: Generation::initial(),
            phase: TransitionPhase::Idle,
            displayed: true,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == TransitionPhase::Idle
    }
}

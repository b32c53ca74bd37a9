use foundation::{AssetId, Generation};

use crate::frame::Frame;

/// What happened to a transition request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    Requested,
    BlendStarted,
    Committed,
    /// A completion arrived for a generation that is no longer live.
    StaleDiscarded,
    /// A load failed; the displayed asset is unchanged.
    LoadFailed,
    /// A visible fade was snapped to completion by a newer request.
    Superseded,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Requested => "requested",
            EventKind::BlendStarted => "blend_started",
            EventKind::Committed => "committed",
            EventKind::StaleDiscarded => "stale_discarded",
            EventKind::LoadFailed => "load_failed",
            EventKind::Superseded => "superseded",
        }
    }

    /// Kinds that a UI may surface as a transient warning.
    pub fn is_warning(self) -> bool {
        matches!(self, EventKind::LoadFailed)
    }
}

/// Passive notification record.
///
/// Nothing in the transition path raises errors to the caller; anything worth
/// reporting lands here instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: EventKind,
    pub asset: AssetId,
    pub generation: Generation,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventBus {
    frame_index: u64,
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp subsequent events with `frame`'s index.
    pub fn begin_frame(&mut self, frame: Frame) {
        self.frame_index = frame.index;
    }

    pub fn emit(
        &mut self,
        kind: EventKind,
        asset: &AssetId,
        generation: Generation,
        message: impl Into<String>,
    ) {
        self.events.push(Event {
            frame_index: self.frame_index,
            kind,
            asset: asset.clone(),
            generation,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.kind.is_warning())
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

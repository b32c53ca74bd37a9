use foundation::{AssetId, Generation};
use runtime::{EventBus, EventKind, Frame};
use serde::Serialize;
use tracing::{debug, warn};

use crate::blend::BlendConfig;
use crate::loader::LoadError;
use crate::request::LoadTicket;
use crate::residency::{TransitionPhase, TransitionState};
use crate::target::RenderTarget;

/// Result of [`TransitionController::request_transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Already showing (or already heading to) this asset.
    Unchanged,
    /// The user returned to the displayed asset before the pending load landed.
    Cancelled,
    /// Caller must start this load and report back via `complete_load`.
    Load(LoadTicket),
}

/// Result of [`TransitionController::complete_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    BlendStarted,
    /// Superseded by a newer request; nothing was touched.
    Stale,
    /// The pending request was dropped; the displayed asset is unchanged.
    Failed(LoadError),
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransitionStats {
    pub requested: u64,
    pub blends_started: u64,
    pub committed: u64,
    /// Fades snapped to completion by a newer request.
    pub superseded: u64,
    pub cancelled: u64,
    pub stale: u64,
    pub failed: u64,
    /// Requests served without calling the loader (filled in by the driver).
    pub cache_hits: u64,
}

/// Owns the displayed/pending asset pair and the generation counter.
///
/// Invariants:
/// - `pending` is `Some` exactly while the phase is `Loading` or `Blending`.
/// - Only a completion carrying the live generation may touch the render target.
/// - The render target sees `set_displayed_asset` once per accepted transition,
///   always immediately followed by `set_blend_factor(0.0)`.
#[derive(Debug)]
pub struct TransitionController {
    state: TransitionState,
    blend: BlendConfig,
    blend_elapsed_s: f64,
    stats: TransitionStats,
    bus: EventBus,
}

impl TransitionController {
    pub fn new(initial: AssetId, blend: BlendConfig) -> Self {
        Self {
            state: TransitionState::new(initial),
            blend,
            blend_elapsed_s: 0.0,
            stats: TransitionStats::default(),
            bus: EventBus::new(),
        }
    }

    pub fn current(&self) -> &AssetId {
        &self.state.current
    }

    pub fn pending(&self) -> Option<&AssetId> {
        self.state.pending.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.state.generation
    }

    pub fn phase(&self) -> TransitionPhase {
        self.state.phase
    }

    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    pub fn stats(&self) -> TransitionStats {
        self.stats
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Put the current asset on screen at full blend, e.g. after a preload.
    ///
    /// Refused (returns `false`) while a transition owns the render target.
    pub fn show_current<T: RenderTarget + ?Sized>(
        &mut self,
        handle: T::Handle,
        target: &mut T,
    ) -> bool {
        if !self.state.is_idle() {
            return false;
        }
        target.set_displayed_asset(&self.state.current, handle);
        target.set_blend_factor(1.0);
        self.state.displayed = true;
        true
    }

    /// Record that the current asset never made it on screen.
    ///
    /// The next request for it issues a load instead of being skipped.
    pub fn mark_current_unavailable(&mut self) {
        if self.state.is_idle() {
            self.state.displayed = false;
        }
    }

    /// Ask for `asset` to become the displayed asset.
    pub fn request_transition<T: RenderTarget + ?Sized>(
        &mut self,
        asset: AssetId,
        target: &mut T,
    ) -> RequestOutcome {
        if self.state.pending.as_ref() == Some(&asset) {
            return RequestOutcome::Unchanged;
        }

        match self.state.phase {
            TransitionPhase::Idle => {}
            TransitionPhase::Loading => {
                if asset == self.state.current && self.state.displayed {
                    return self.cancel_pending();
                }
            }
            TransitionPhase::Blending => self.snap_blend(target),
        }

        if self.state.is_idle() && asset == self.state.current && self.state.displayed {
            return RequestOutcome::Unchanged;
        }

        self.state.generation = self.state.generation.next();
        self.state.pending = Some(asset.clone());
        self.state.phase = TransitionPhase::Loading;
        self.stats.requested += 1;

        debug!(%asset, generation = %self.state.generation, "transition requested");
        self.bus.emit(
            EventKind::Requested,
            &asset,
            self.state.generation,
            format!("load {asset}"),
        );

        RequestOutcome::Load(LoadTicket::new(self.state.generation, asset))
    }

    /// Report the outcome of a load issued for `ticket`.
    pub fn complete_load<T: RenderTarget + ?Sized>(
        &mut self,
        ticket: LoadTicket,
        result: Result<T::Handle, LoadError>,
        target: &mut T,
    ) -> CompletionOutcome {
        let live = ticket.generation.is_current(self.state.generation)
            && self.state.phase == TransitionPhase::Loading;
        if !live {
            self.stats.stale += 1;
            debug!(
                asset = %ticket.asset,
                generation = %ticket.generation,
                live = %self.state.generation,
                ok = result.is_ok(),
                "discarding stale load"
            );
            self.bus.emit(
                EventKind::StaleDiscarded,
                &ticket.asset,
                ticket.generation,
                format!("superseded by {}", self.state.generation),
            );
            return CompletionOutcome::Stale;
        }

        match result {
            Ok(handle) => {
                target.set_displayed_asset(&ticket.asset, handle);
                target.set_blend_factor(0.0);
                self.state.phase = TransitionPhase::Blending;
                self.blend_elapsed_s = 0.0;
                self.stats.blends_started += 1;
                self.bus.emit(
                    EventKind::BlendStarted,
                    &ticket.asset,
                    ticket.generation,
                    format!("fade in over {:.3}s", self.blend.duration_s),
                );
                CompletionOutcome::BlendStarted
            }
            Err(err) => {
                self.state.pending = None;
                self.state.phase = TransitionPhase::Idle;
                self.stats.failed += 1;
                warn!(
                    asset = %ticket.asset,
                    current = %self.state.current,
                    error = %err,
                    "asset load failed; keeping current asset"
                );
                self.bus.emit(
                    EventKind::LoadFailed,
                    &ticket.asset,
                    ticket.generation,
                    err.to_string(),
                );
                CompletionOutcome::Failed(err)
            }
        }
    }

    /// Progress an active blend by `dt_s` seconds.
    ///
    /// Returns the newly committed asset when the blend finishes.
    pub fn advance<T: RenderTarget + ?Sized>(
        &mut self,
        dt_s: f64,
        target: &mut T,
    ) -> Option<AssetId> {
        if self.state.phase != TransitionPhase::Blending {
            return None;
        }

        if dt_s.is_finite() && dt_s > 0.0 {
            self.blend_elapsed_s += dt_s;
        }
        let t = self.blend.progress(self.blend_elapsed_s);
        target.set_blend_factor(self.blend.easing.apply(t) as f32);

        if t < 1.0 {
            return None;
        }
        self.commit()
    }

    /// Stamp events with `frame` and advance any active blend by its delta.
    pub fn tick<T: RenderTarget + ?Sized>(
        &mut self,
        frame: Frame,
        target: &mut T,
    ) -> Option<AssetId> {
        self.bus.begin_frame(frame);
        self.advance(frame.dt_s, target)
    }

    fn snap_blend<T: RenderTarget + ?Sized>(&mut self, target: &mut T) {
        target.set_blend_factor(1.0);
        self.stats.superseded += 1;
        if let Some(pending) = &self.state.pending {
            self.bus.emit(
                EventKind::Superseded,
                pending,
                self.state.generation,
                "fade snapped to completion",
            );
        }
        let _ = self.commit();
    }

    fn cancel_pending(&mut self) -> RequestOutcome {
        self.state.generation = self.state.generation.next();
        self.stats.cancelled += 1;
        if let Some(pending) = self.state.pending.take() {
            debug!(%pending, generation = %self.state.generation, "pending load cancelled");
        }
        self.state.phase = TransitionPhase::Idle;
        RequestOutcome::Cancelled
    }

    fn commit(&mut self) -> Option<AssetId> {
        let asset = self.state.pending.take()?;
        self.state.current = asset.clone();
        self.state.phase = TransitionPhase::Idle;
        self.state.displayed = true;
        self.blend_elapsed_s = 0.0;
        self.stats.committed += 1;
        debug!(%asset, generation = %self.state.generation, "transition committed");
        self.bus.emit(
            EventKind::Committed,
            &asset,
            self.state.generation,
            "now displayed",
        );
        Some(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::{CompletionOutcome, RequestOutcome, TransitionController};
    use crate::blend::{BlendConfig, Easing};
    use crate::loader::LoadError;
    use crate::request::LoadTicket;
    use crate::residency::TransitionPhase;
    use crate::testing::{RecordingTarget, TargetCall};
    use foundation::AssetId;
    use pretty_assertions::assert_eq;
    use runtime::{EventKind, Frame};

    fn id(s: &str) -> AssetId {
        AssetId::new(s)
    }

    fn linear(duration_s: f64) -> BlendConfig {
        BlendConfig {
            duration_s,
            easing: Easing::Linear,
        }
    }

    fn ticket(outcome: RequestOutcome) -> LoadTicket {
        match outcome {
            RequestOutcome::Load(t) => t,
            other => panic!("expected a load, got {other:?}"),
        }
    }

    #[test]
    fn same_asset_while_idle_is_a_noop() {
        let mut target = RecordingTarget::default();
        let mut c = TransitionController::new(id("present"), linear(0.4));
        assert_eq!(
            c.request_transition(id("present"), &mut target),
            RequestOutcome::Unchanged
        );
        assert_eq!(c.generation().0, 0);
        assert!(target.calls.is_empty());
    }

    #[test]
    fn repeated_request_issues_one_load() {
        let mut target = RecordingTarget::default();
        let mut c = TransitionController::new(id("present"), linear(0.4));
        let first = c.request_transition(id("jurassic"), &mut target);
        let second = c.request_transition(id("jurassic"), &mut target);
        assert!(matches!(first, RequestOutcome::Load(_)));
        assert_eq!(second, RequestOutcome::Unchanged);
        assert_eq!(c.stats().requested, 1);
        assert_eq!(c.events().count(EventKind::Requested), 1);
    }

    #[test]
    fn full_cycle_swaps_at_blend_start_and_commits_at_end() {
        let mut target = RecordingTarget::default();
        let mut c = TransitionController::new(id("present"), linear(0.4));

        let t = ticket(c.request_transition(id("jurassic"), &mut target));
        assert_eq!(c.phase(), TransitionPhase::Loading);
        assert_eq!(c.pending(), Some(&id("jurassic")));

        assert_eq!(
            c.complete_load(t, Ok(7), &mut target),
            CompletionOutcome::BlendStarted
        );
        assert_eq!(c.phase(), TransitionPhase::Blending);
        assert_eq!(c.current(), &id("present"));
        assert_eq!(
            target.calls,
            vec![
                TargetCall::Displayed(id("jurassic"), 7),
                TargetCall::Blend(0.0)
            ]
        );

        assert_eq!(c.advance(0.2, &mut target), None);
        assert_eq!(target.last_blend(), Some(0.5));
        assert_eq!(c.advance(0.2, &mut target), Some(id("jurassic")));
        assert_eq!(target.last_blend(), Some(1.0));

        assert_eq!(c.phase(), TransitionPhase::Idle);
        assert_eq!(c.current(), &id("jurassic"));
        assert_eq!(c.pending(), None);
        assert_eq!(c.stats().committed, 1);
    }

    #[test]
    fn stale_success_is_discarded() {
        let mut target = RecordingTarget::default();
        let mut c = TransitionController::new(id("present"), linear(0.4));
        let a = ticket(c.request_transition(id("a"), &mut target));
        let b = ticket(c.request_transition(id("b"), &mut target));
        assert!(b.generation > a.generation);

        // A lands late; nothing changes.
        assert_eq!(c.complete_load(a, Ok(1), &mut target), CompletionOutcome::Stale);
        assert!(target.calls.is_empty());
        assert_eq!(c.phase(), TransitionPhase::Loading);
        assert_eq!(c.pending(), Some(&id("b")));

        assert_eq!(
            c.complete_load(b, Ok(2), &mut target),
            CompletionOutcome::BlendStarted
        );
        c.advance(1.0, &mut target);
        assert_eq!(c.current(), &id("b"));
        assert_eq!(target.displayed(), vec![id("b")]);
    }

    #[test]
    fn out_of_order_late_arrival_after_newer_commit_is_ignored() {
        let mut target = RecordingTarget::default();
        let mut c = TransitionController::new(id("present"), linear(0.4));
        let a = ticket(c.request_transition(id("a"), &mut target));
        let b = ticket(c.request_transition(id("b"), &mut target));

        c.complete_load(b, Ok(2), &mut target);
        c.advance(0.4, &mut target);
        assert_eq!(c.current(), &id("b"));

        assert_eq!(c.complete_load(a, Ok(1), &mut target), CompletionOutcome::Stale);
        assert_eq!(c.current(), &id("b"));
        assert_eq!(target.displayed(), vec![id("b")]);
        assert_eq!(c.stats().stale, 1);
    }

    #[test]
    fn failure_keeps_current_and_returns_to_idle() {
        let mut target = RecordingTarget::default();
        let mut c = TransitionController::new(id("present"), linear(0.4));
        let t = ticket(c.request_transition(id("missing"), &mut target));
        let err = LoadError::NotFound {
            asset: id("missing"),
        };

        assert_eq!(
            c.complete_load(t, Err(err.clone()), &mut target),
            CompletionOutcome::Failed(err)
        );
        assert_eq!(c.phase(), TransitionPhase::Idle);
        assert_eq!(c.current(), &id("present"));
        assert_eq!(c.pending(), None);
        assert!(target.calls.is_empty());

        let warnings: Vec<_> = c.events().warnings().map(|e| e.asset.clone()).collect();
        assert_eq!(warnings, vec![id("missing")]);

        // A later move can still succeed.
        let t = ticket(c.request_transition(id("missing"), &mut target));
        c.complete_load(t, Ok(3), &mut target);
        c.advance(0.4, &mut target);
        assert_eq!(c.current(), &id("missing"));
    }

    #[test]
    fn stale_failure_is_not_a_warning() {
        let mut target = RecordingTarget::default();
        let mut c = TransitionController::new(id("present"), linear(0.4));
        let a = ticket(c.request_transition(id("a"), &mut target));
        let _b = ticket(c.request_transition(id("b"), &mut target));
        let err = LoadError::NotFound { asset: id("a") };
        assert_eq!(c.complete_load(a, Err(err), &mut target), CompletionOutcome::Stale);
        assert_eq!(c.events().warnings().count(), 0);
        assert_eq!(c.phase(), TransitionPhase::Loading);
    }

    #[test]
    fn returning_to_current_while_loading_cancels() {
        let mut target = RecordingTarget::default();
        let mut c = TransitionController::new(id("present"), linear(0.4));
        let a = ticket(c.request_transition(id("a"), &mut target));

        assert_eq!(
            c.request_transition(id("present"), &mut target),
            RequestOutcome::Cancelled
        );
        assert_eq!(c.phase(), TransitionPhase::Idle);
        assert_eq!(c.complete_load(a, Ok(1), &mut target), CompletionOutcome::Stale);
        assert!(target.calls.is_empty());
        assert_eq!(c.current(), &id("present"));
    }

    #[test]
    fn new_request_during_blend_snaps_and_commits() {
        let mut target = RecordingTarget::default();
        let mut c = TransitionController::new(id("present"), linear(0.4));
        let a = ticket(c.request_transition(id("a"), &mut target));
        c.complete_load(a, Ok(1), &mut target);
        c.advance(0.1, &mut target);

        let b = ticket(c.request_transition(id("b"), &mut target));
        assert_eq!(target.last_blend(), Some(1.0));
        assert_eq!(c.current(), &id("a"));
        assert_eq!(c.pending(), Some(&id("b")));
        assert_eq!(c.phase(), TransitionPhase::Loading);
        assert_eq!(c.stats().superseded, 1);
        assert_eq!(c.stats().committed, 1);

        c.complete_load(b, Ok(2), &mut target);
        assert_eq!(c.advance(0.4, &mut target), Some(id("b")));
        assert_eq!(target.displayed(), vec![id("a"), id("b")]);
    }

    #[test]
    fn same_pending_during_blend_keeps_fading() {
        let mut target = RecordingTarget::default();
        let mut c = TransitionController::new(id("present"), linear(0.4));
        let a = ticket(c.request_transition(id("a"), &mut target));
        c.complete_load(a, Ok(1), &mut target);
        assert_eq!(
            c.request_transition(id("a"), &mut target),
            RequestOutcome::Unchanged
        );
        assert_eq!(c.phase(), TransitionPhase::Blending);
    }

    #[test]
    fn zero_duration_commits_on_next_tick() {
        let mut target = RecordingTarget::default();
        let mut c = TransitionController::new(id("present"), linear(0.0));
        let a = ticket(c.request_transition(id("a"), &mut target));
        c.complete_load(a, Ok(1), &mut target);
        assert_eq!(c.tick(Frame::new(1, 1.0 / 60.0), &mut target), Some(id("a")));
        assert_eq!(c.events().events().last().map(|e| e.frame_index), Some(1));
    }

    #[test]
    fn undisplayed_current_is_loaded_again() {
        let mut target = RecordingTarget::default();
        let mut c = TransitionController::new(id("present"), linear(0.4));
        c.mark_current_unavailable();

        let t = ticket(c.request_transition(id("present"), &mut target));
        assert_eq!(c.pending(), Some(&id("present")));
        c.complete_load(t, Ok(4), &mut target);
        assert_eq!(c.advance(0.4, &mut target), Some(id("present")));
        assert_eq!(target.displayed(), vec![id("present")]);

        assert_eq!(
            c.request_transition(id("present"), &mut target),
            RequestOutcome::Unchanged
        );
    }

    #[test]
    fn undisplayed_current_requested_while_loading_replaces_pending() {
        let mut target = RecordingTarget::default();
        let mut c = TransitionController::new(id("present"), linear(0.4));
        c.mark_current_unavailable();
        let a = ticket(c.request_transition(id("a"), &mut target));

        let p = ticket(c.request_transition(id("present"), &mut target));
        assert_eq!(c.stats().cancelled, 0);
        assert_eq!(c.complete_load(a, Ok(1), &mut target), CompletionOutcome::Stale);
        assert_eq!(
            c.complete_load(p, Ok(2), &mut target),
            CompletionOutcome::BlendStarted
        );
    }

    #[test]
    fn advance_is_inert_when_idle() {
        let mut target = RecordingTarget::default();
        let mut c = TransitionController::new(id("present"), BlendConfig::default());
        assert_eq!(c.advance(1.0, &mut target), None);
        assert!(target.calls.is_empty());
    }
}

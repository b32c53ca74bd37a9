use foundation::AssetId;
use futures_util::future::LocalBoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use runtime::{Event, Frame};
use tracing::{debug, warn};

use crate::blend::BlendConfig;
use crate::cache::{CacheBudget, HandleCache};
use crate::controller::{CompletionOutcome, RequestOutcome, TransitionController, TransitionStats};
use crate::loader::{AssetLoader, LoadError};
use crate::request::LoadTicket;
use crate::residency::TransitionPhase;
use crate::target::RenderTarget;

type Completion<H> = (LoadTicket, Result<H, LoadError>);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DriverConfig {
    pub blend: BlendConfig,
    pub cache: CacheBudget,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            blend: BlendConfig::default(),
            cache: CacheBudget::new(8),
        }
    }
}

/// Runs a [`TransitionController`] against real collaborators.
///
/// Everything happens on one logical event loop: `request` from input
/// handlers, `next_completion` when a load finishes, `tick` once per frame.
/// Loads are never aborted; superseded ones still run to completion and are
/// discarded by generation.
pub struct TransitionDriver<L: AssetLoader, T> {
    controller: TransitionController,
    loader: L,
    target: T,
    cache: HandleCache<L::Handle>,
    in_flight: FuturesUnordered<LocalBoxFuture<'static, Completion<L::Handle>>>,
    pinned: Option<AssetId>,
    cache_hits: u64,
}

impl<L, T> TransitionDriver<L, T>
where
    L: AssetLoader,
    L::Handle: Clone,
    T: RenderTarget<Handle = L::Handle>,
{
    pub fn new(loader: L, target: T, initial: AssetId, config: DriverConfig) -> Self {
        Self {
            controller: TransitionController::new(initial, config.blend),
            loader,
            target,
            cache: HandleCache::new(config.cache),
            in_flight: FuturesUnordered::new(),
            pinned: None,
            cache_hits: 0,
        }
    }

    pub fn controller(&self) -> &TransitionController {
        &self.controller
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn cache(&self) -> &HandleCache<L::Handle> {
        &self.cache
    }

    pub fn stats(&self) -> TransitionStats {
        TransitionStats {
            cache_hits: self.cache_hits,
            ..self.controller.stats()
        }
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.controller.events_mut().drain()
    }

    pub fn has_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    /// Load the initial asset and show it at full blend.
    pub async fn preload(&mut self) -> Result<(), LoadError> {
        let asset = self.controller.current().clone();
        let handle = match self.cache.get(&asset) {
            Some(handle) => handle,
            None => match self.loader.load(&asset).await {
                Ok(handle) => handle,
                Err(err) => {
                    warn!(%asset, error = %err, "initial asset failed to load");
                    self.controller.mark_current_unavailable();
                    return Err(err);
                }
            },
        };

        self.remember(asset, handle.clone());
        self.controller.show_current(handle, &mut self.target);
        self.sync_pin();
        Ok(())
    }

    /// Route a resolved asset into the controller, starting a load if needed.
    pub fn request(&mut self, asset: AssetId) -> RequestOutcome {
        let outcome = self.controller.request_transition(asset, &mut self.target);

        if let RequestOutcome::Load(ticket) = &outcome {
            if let Some(handle) = self.cache.get(&ticket.asset) {
                self.cache_hits += 1;
                debug!(asset = %ticket.asset, "serving transition from handle cache");
                self.controller
                    .complete_load(ticket.clone(), Ok(handle), &mut self.target);
            } else {
                let load = self.loader.load(&ticket.asset);
                let ticket = ticket.clone();
                self.in_flight
                    .push(async move { (ticket, load.await) }.boxed_local());
            }
        }

        self.sync_pin();
        outcome
    }

    /// Wait for the next load to finish (in completion order) and apply it.
    ///
    /// Returns `None` when nothing is in flight. Cancel-safe: dropping the
    /// future loses no completion.
    pub async fn next_completion(&mut self) -> Option<CompletionOutcome> {
        let (ticket, result) = self.in_flight.next().await?;
        Some(self.apply(ticket, result))
    }

    /// Advance the active blend by one frame.
    pub fn tick(&mut self, frame: Frame) -> Option<AssetId> {
        let committed = self.controller.tick(frame, &mut self.target);
        self.sync_pin();
        committed
    }

    /// Drive the live transition to completion.
    ///
    /// Waits for completions only while the live load is outstanding, ticks
    /// frames while blending, and returns once idle. Superseded loads may
    /// still be in flight afterwards. Returns the first frame not yet ticked;
    /// stops after `max_frames` ticks.
    pub async fn settle(&mut self, mut frame: Frame, max_frames: u64) -> Frame {
        let mut ticked = 0;
        loop {
            match self.controller.phase() {
                TransitionPhase::Idle => return frame,
                TransitionPhase::Loading => {
                    if self.next_completion().await.is_none() {
                        return frame;
                    }
                }
                TransitionPhase::Blending => {
                    if ticked >= max_frames {
                        return frame;
                    }
                    self.tick(frame);
                    frame = frame.next();
                    ticked += 1;
                }
            }
        }
    }

    fn apply(
        &mut self,
        ticket: LoadTicket,
        result: Result<L::Handle, LoadError>,
    ) -> CompletionOutcome {
        if let Ok(handle) = &result {
            self.remember(ticket.asset.clone(), handle.clone());
        }
        let outcome = self.controller.complete_load(ticket, result, &mut self.target);
        self.sync_pin();
        outcome
    }

    fn remember(&mut self, asset: AssetId, handle: L::Handle) {
        match self.cache.insert(asset, handle) {
            Ok(evicted) if !evicted.is_empty() => {
                debug!(evicted = evicted.len(), "handle cache evicted entries");
            }
            Ok(_) => {}
            Err(err) => debug!(error = %err, "handle cache over budget"),
        }
    }

    /// Keep the displayed asset pinned so eviction never drops it.
    fn sync_pin(&mut self) {
        let current = self.controller.current().clone();
        if self.pinned.as_ref() == Some(&current) {
            return;
        }
        if let Some(old) = self.pinned.take() {
            let _ = self.cache.unpin(&old);
        }
        if self.cache.pin(&current).is_ok() {
            self.pinned = Some(current);
        }
    }
}

impl<L: AssetLoader, T> std::fmt::Debug for TransitionDriver<L, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionDriver")
            .field("phase", &self.controller.phase().as_str())
            .field("state", self.controller.state())
            .field("in_flight", &self.in_flight.len())
            .field("pinned", &self.pinned)
            .field("cache_hits", &self.cache_hits)
            .finish()
    }
}

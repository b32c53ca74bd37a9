use std::time::Duration;

use epochs::{LabelLocale, SliderRange, TimelineResolver, format_age, format_epoch};
use runtime::Frame;
use serde::Serialize;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use transition::{
    CompletionOutcome, DriverConfig, RequestOutcome, TransitionDriver, TransitionStats,
};

use crate::loader::FsLoader;
use crate::script::{Script, ScriptStep};
use crate::target::GlobeMaterial;

/// Upper bound on frames spent finishing the last fade.
const MAX_SETTLE_FRAMES: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitedStep {
    pub value: f64,
    pub age: i32,
    /// Table key that was selected.
    pub epoch: i32,
    pub asset: String,
    pub label: String,
    /// Label of the selected epoch, with its display name when known.
    pub epoch_label: String,
    pub outcome: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub steps: Vec<VisitedStep>,
    pub current: String,
    pub displayed: Option<String>,
    pub blend: f32,
    pub swaps: u64,
    pub blend_updates: u64,
    pub frames: u64,
    pub stats: TransitionStats,
    pub warnings: Vec<String>,
}

/// A slider session against one timeline: input → resolve → transition.
pub struct Session {
    resolver: TimelineResolver,
    slider: SliderRange,
    locale: LabelLocale,
    driver: TransitionDriver<FsLoader, GlobeMaterial>,
    frame: Frame,
    visited: Vec<VisitedStep>,
    warnings: Vec<String>,
}

impl Session {
    pub fn new(
        resolver: TimelineResolver,
        slider: SliderRange,
        locale: LabelLocale,
        loader: FsLoader,
        config: DriverConfig,
        fps: f64,
        initial_value: f64,
    ) -> Result<Self, String> {
        let age = slider.quantize(initial_value);
        let initial = resolver
            .resolve(age)
            .map_err(|e| e.to_string())?
            .asset
            .clone();
        let frame = Frame::at_fps(fps);
        info!(
            %initial,
            age = age.ma(),
            policy = %resolver.policy(),
            fps = frame.fps(),
            blend_frames = frame.frames_for(config.blend.duration_s),
            "starting session"
        );

        Ok(Self {
            driver: TransitionDriver::new(loader, GlobeMaterial::new(), initial, config),
            resolver,
            slider,
            locale,
            frame,
            visited: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Show the initial texture. Failure is a warning, not an error.
    pub async fn preload(&mut self) {
        if let Err(err) = self.driver.preload().await {
            self.warnings.push(err.to_string());
        }
    }

    pub async fn run(&mut self, script: &Script) -> Result<SessionSummary, String> {
        let mut interval = tokio::time::interval(Duration::from_secs_f64(self.frame.dt_s));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        for step in &script.steps {
            self.input(step)?;
            let deadline = Instant::now() + step.wait;

            loop {
                tokio::select! {
                    biased;
                    Some(outcome) = self.driver.next_completion(),
                        if self.driver.has_in_flight() =>
                    {
                        self.on_completion(outcome);
                    }
                    _ = interval.tick() => {
                        self.tick();
                        if Instant::now() >= deadline {
                            break;
                        }
                    }
                }
            }
        }

        self.frame = self.driver.settle(self.frame, MAX_SETTLE_FRAMES).await;
        self.collect_events();
        Ok(self.summary())
    }

    /// One slider event: quantize, resolve, label, request.
    fn input(&mut self, step: &ScriptStep) -> Result<(), String> {
        let age = self.slider.quantize(step.value);
        let resolution = self.resolver.resolve(age).map_err(|e| e.to_string())?;
        let asset = resolution.asset.clone();
        let epoch = resolution.age;
        let label = format_age(age, self.locale);
        let epoch_label = format_epoch(epoch, resolution.name, self.locale);

        info!(
            value = step.value,
            %label,
            epoch = %epoch_label,
            %asset,
            "slider moved"
        );

        let outcome = match self.driver.request(asset.clone()) {
            RequestOutcome::Unchanged => "unchanged",
            RequestOutcome::Cancelled => "cancelled",
            RequestOutcome::Load(_) => "load",
        };

        self.visited.push(VisitedStep {
            value: step.value,
            age: age.ma(),
            epoch: epoch.ma(),
            asset: asset.to_string(),
            label,
            epoch_label,
            outcome,
        });
        Ok(())
    }

    fn on_completion(&mut self, outcome: CompletionOutcome) {
        match outcome {
            CompletionOutcome::BlendStarted => debug!("blend started"),
            CompletionOutcome::Stale => debug!("stale load ignored"),
            CompletionOutcome::Failed(err) => debug!(error = %err, "load failed"),
        }
        self.collect_events();
    }

    fn tick(&mut self) {
        if let Some(asset) = self.driver.tick(self.frame) {
            info!(%asset, frame = self.frame.index, "transition committed");
        }
        self.frame = self.frame.next();
    }

    fn collect_events(&mut self) {
        for event in self.driver.drain_events() {
            if event.kind.is_warning() {
                warn!(asset = %event.asset, "{}", event.message);
                self.warnings.push(event.message);
            } else {
                debug!(
                    kind = event.kind.as_str(),
                    asset = %event.asset,
                    generation = %event.generation,
                    frame = event.frame_index,
                    "{}",
                    event.message
                );
            }
        }
    }

    fn summary(&self) -> SessionSummary {
        let material = self.driver.target();
        SessionSummary {
            steps: self.visited.clone(),
            current: self.driver.controller().current().to_string(),
            displayed: material.displayed().map(|a| a.to_string()),
            blend: material.blend(),
            swaps: material.swaps(),
            blend_updates: material.blend_updates(),
            frames: self.frame.index,
            stats: self.driver.stats(),
            warnings: self.warnings.clone(),
        }
    }
}

mod loader;
mod script;
mod session;
mod target;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use epochs::{EpochManifest, LabelLocale, ResolutionPolicy, paleomaps};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use transition::{BlendConfig, CacheBudget, DriverConfig, Easing};

use crate::loader::FsLoader;
use crate::script::{DEFAULT_WAIT, Script};
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless paleo-globe timeline viewer")]
struct Args {
    /// Epoch manifest (JSON). Defaults to the built-in paleomap set.
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Base URL or directory for the built-in paleomaps
    #[arg(long)]
    base_url: Option<String>,

    /// Directory relative asset ids are read from
    #[arg(long, default_value = ".")]
    assets_root: PathBuf,

    /// Slider script (`<value> [wait_ms]` per line). Defaults to a sweep over every epoch.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Initial slider value (defaults to the slider minimum)
    #[arg(long, allow_hyphen_values = true)]
    initial: Option<f64>,

    /// Resolution policy override: nearest_below or nearest
    #[arg(long)]
    policy: Option<ResolutionPolicy>,

    /// Label language: en or zh-TW
    #[arg(long, default_value = "en")]
    locale: LabelLocale,

    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Cross-fade duration in milliseconds
    #[arg(long, default_value_t = 400)]
    blend_ms: u64,

    #[arg(long, default_value = "quad_out")]
    easing: Easing,

    /// Decoded textures kept resident (0 disables the cache)
    #[arg(long, default_value_t = 8)]
    cache_entries: usize,

    /// Simulated latency for every load
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,

    /// Extra latency for matching assets: PATTERN=MS (repeatable)
    #[arg(long = "slow", value_parser = parse_slow)]
    slow: Vec<(String, u64)>,

    /// Print the session summary as JSON
    #[arg(long)]
    json: bool,
}

fn parse_slow(s: &str) -> Result<(String, u64), String> {
    let (pattern, ms) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PATTERN=MS, got '{s}'"))?;
    let ms = ms
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid latency '{ms}': {e}"))?;
    Ok((pattern.trim().to_string(), ms))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(e) = real_main(args).await {
        error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main(args: Args) -> Result<(), String> {
    let manifest = match &args.manifest {
        Some(path) => EpochManifest::load(path).map_err(|e| e.to_string())?,
        None => paleomaps(args.base_url.as_deref()),
    };
    let mut resolver = manifest.resolver().map_err(|e| e.to_string())?;
    if let Some(policy) = args.policy {
        resolver.set_policy(policy);
    }
    let slider = manifest.slider;
    info!(
        name = manifest.name.as_deref().unwrap_or("unnamed"),
        epochs = resolver.table().len(),
        min = slider.min().ma(),
        max = slider.max().ma(),
        "timeline ready"
    );

    let script = match &args.script {
        Some(path) => Script::load(path)?,
        None => Script::sweep(resolver.table(), &slider, DEFAULT_WAIT),
    };
    if script.is_empty() {
        return Err("script has no steps".to_string());
    }
    info!(steps = script.len(), "script loaded");

    let mut loader = FsLoader::new(&args.assets_root)
        .with_default_latency(Duration::from_millis(args.latency_ms));
    for (pattern, ms) in &args.slow {
        loader = loader.with_latency(pattern.clone(), Duration::from_millis(*ms));
    }

    let config = DriverConfig {
        blend: BlendConfig {
            duration_s: args.blend_ms as f64 / 1000.0,
            easing: args.easing,
        },
        cache: CacheBudget::new(args.cache_entries),
    };

    let initial = args.initial.unwrap_or(f64::from(slider.min().ma()));
    let mut session = Session::new(
        resolver,
        slider,
        args.locale,
        loader,
        config,
        args.fps,
        initial,
    )?;
    session.preload().await;

    let summary = session.run(&script).await?;
    if args.json {
        let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        for step in &summary.steps {
            println!(
                "{:>8.1} -> {:<40} {:<32} {} ({})",
                step.value, step.epoch_label, step.asset, step.label, step.outcome
            );
        }
        println!(
            "final: {} (blend {:.2}) after {} frames; {} warning(s)",
            summary.current,
            summary.blend,
            summary.frames,
            summary.warnings.len()
        );
    }
    Ok(())
}

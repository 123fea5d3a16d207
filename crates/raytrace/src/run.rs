use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossbeam_channel::never;
use progressive::{
    CancelPolicy, RenderController, RenderOutcome, SamplerConfig, SamplerKind, WorkerSettings,
};
use renderconfig::{CancelPolicySetting, RenderConfig, SamplerSetting};
use scenes::SceneKind;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::canvas::{Canvas, OutputFormat};
use crate::cli::RunArgs;
use crate::input;
use crate::paths::AppPaths;
use crate::status::{completion_line, StatusLine};

/// Scene rendered when neither the command line nor the config names one.
pub const FALLBACK_SCENE: SceneKind = SceneKind::SingleSphere;

/// Settings for one render, after merging the config file with CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub scene: SceneKind,
    pub width: u32,
    pub height: u32,
    pub sampler: SamplerConfig,
    pub worker: WorkerSettings,
    pub progress_interval: Duration,
    pub output: Option<PathBuf>,
    pub background: Option<PathBuf>,
}

impl RenderOptions {
    pub fn resolve(args: &RunArgs, config: &RenderConfig) -> Result<Self> {
        let scene = match args.scene.as_deref().or(config.default_scene()) {
            Some(name) => name.parse::<SceneKind>()?,
            None => FALLBACK_SCENE,
        };

        let (width, height) = args
            .size
            .unwrap_or((config.image.width, config.image.height));

        let kind = args
            .sampler
            .unwrap_or_else(|| map_sampler(config.sampler.kind));
        let samples = args.samples.unwrap_or(config.sampler.samples);
        let seed = args.seed.or(config.sampler.seed).unwrap_or_default();

        let render = &config.render;
        let cancel_policy = if args.discard_on_stop {
            CancelPolicy::Discard
        } else {
            map_cancel_policy(render.cancel_policy)
        };
        let max_batch_pixels = match args.max_batch_pixels {
            Some(limit) => Some(
                usize::try_from(limit).context("--max-batch-pixels is too large")?,
            ),
            None => render.max_batch_pixels,
        };
        let worker = WorkerSettings {
            flush_interval: args
                .flush_ms
                .map(Duration::from_millis)
                .unwrap_or(render.flush_interval),
            batch_capacity: render.batch_capacity,
            max_batch_pixels,
            cancel_policy,
        };
        if worker.flush_interval.is_zero() {
            bail!("flush interval must be greater than zero");
        }

        let progress_interval = args
            .progress_ms
            .map(Duration::from_millis)
            .unwrap_or(render.progress_interval);
        if progress_interval.is_zero() {
            bail!("progress interval must be greater than zero");
        }

        let output = args
            .output
            .clone()
            .or_else(|| config.defaults.output.as_ref().map(PathBuf::from));
        if let Some(path) = &output {
            OutputFormat::from_path(path).map_err(anyhow::Error::msg)?;
        }

        Ok(Self {
            scene,
            width,
            height,
            sampler: SamplerConfig::new(kind, samples).with_seed(seed),
            worker,
            progress_interval,
            output,
            background: args.background.clone(),
        })
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = load_config(&args)?;
    let options = RenderOptions::resolve(&args, &config)?;
    info!(
        scene = %options.scene,
        width = options.width,
        height = options.height,
        sampler = %options.sampler.kind,
        samples = options.sampler.samples,
        output = ?options.output,
        "starting render"
    );

    let commands = if args.no_stdin {
        never()
    } else {
        input::spawn_stdin_reader()?
    };

    let mut controller = RenderController::new(options.worker.clone())
        .with_progress_interval(options.progress_interval);
    let mut canvas = match &options.background {
        Some(path) => Canvas::from_file(path, options.width, options.height)?,
        None => Canvas::new(options.width, options.height),
    };
    let mut status = StatusLine::default();

    controller
        .start(
            &options.scene.builder(),
            options.sampler,
            options.width,
            options.height,
        )
        .with_context(|| format!("failed to start scene {}", options.scene))?;
    let summary = controller
        .run(&mut canvas, &mut status, &commands)
        .context("render session ended unexpectedly")?;

    info!(
        painted = canvas.painted(),
        progress_reports = status.reports(),
        "{}",
        completion_line(&summary)
    );

    if let Some(path) = &options.output {
        canvas.save(path)?;
        info!(path = %path.display(), "saved image");
    }

    if let RenderOutcome::Failed(message) = &summary.outcome {
        bail!("render failed: {message}");
    }
    Ok(())
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &RunArgs) -> Result<RenderConfig> {
    if let Some(path) = &args.config {
        return RenderConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()));
    }

    let paths = AppPaths::discover()?;
    let path = paths.config_file();
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no configuration file; using defaults");
        return Ok(RenderConfig::default());
    }
    tracing::debug!(path = %path.display(), "loading configuration");
    RenderConfig::load(&path)
        .with_context(|| format!("failed to load configuration {}", path.display()))
}

fn map_sampler(setting: SamplerSetting) -> SamplerKind {
    match setting {
        SamplerSetting::Hammersley => SamplerKind::Hammersley,
        SamplerSetting::Jittered => SamplerKind::Jittered,
        SamplerSetting::MultiJittered => SamplerKind::MultiJittered,
        SamplerSetting::NRooks => SamplerKind::NRooks,
        SamplerSetting::Random => SamplerKind::PureRandom,
        SamplerSetting::Regular => SamplerKind::Regular,
    }
}

fn map_cancel_policy(setting: CancelPolicySetting) -> CancelPolicy {
    match setting {
        CancelPolicySetting::Flush => CancelPolicy::Flush,
        CancelPolicySetting::Discard => CancelPolicy::Discard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_config() {
        let config = RenderConfig::from_toml_str(
            r#"
version = 1
[render]
flush_interval = "50ms"
cancel_policy = "discard"
[image]
width = 64
height = 32
[sampler]
kind = "hammersley"
samples = 9
seed = 4
[defaults]
scene = "math"
output = "out/render.png"
"#,
        )
        .unwrap();
        let options = RenderOptions::resolve(&RunArgs::default(), &config).unwrap();
        assert_eq!(options.scene, SceneKind::Math);
        assert_eq!((options.width, options.height), (64, 32));
        assert_eq!(
            options.sampler,
            SamplerConfig::new(SamplerKind::Hammersley, 9).with_seed(4)
        );
        assert_eq!(options.worker.flush_interval, Duration::from_millis(50));
        assert_eq!(options.worker.cancel_policy, CancelPolicy::Discard);
        assert_eq!(options.output, Some(PathBuf::from("out/render.png")));
    }

    #[test]
    fn flags_override_config() {
        let args = RunArgs {
            scene: Some("4.4a".into()),
            size: Some((10, 20)),
            sampler: Some(SamplerKind::NRooks),
            samples: Some(3),
            flush_ms: Some(5),
            progress_ms: Some(40),
            max_batch_pixels: Some(64),
            ..RunArgs::default()
        };
        let options = RenderOptions::resolve(&args, &RenderConfig::default()).unwrap();
        assert_eq!(options.scene, SceneKind::MatteSphere);
        assert_eq!((options.width, options.height), (10, 20));
        assert_eq!(options.sampler.kind, SamplerKind::NRooks);
        assert_eq!(options.sampler.samples, 3);
        assert_eq!(options.worker.flush_interval, Duration::from_millis(5));
        assert_eq!(options.worker.max_batch_pixels, Some(64));
        assert_eq!(options.progress_interval, Duration::from_millis(40));
        assert_eq!(options.worker.cancel_policy, CancelPolicy::Flush);
    }

    #[test]
    fn falls_back_to_first_scene() {
        let options = RenderOptions::resolve(&RunArgs::default(), &RenderConfig::default()).unwrap();
        assert_eq!(options.scene, FALLBACK_SCENE);
        assert!(options.output.is_none());
    }

    #[test]
    fn rejects_unknown_scene_and_zero_intervals() {
        let args = RunArgs {
            scene: Some("7.7".into()),
            ..RunArgs::default()
        };
        assert!(RenderOptions::resolve(&args, &RenderConfig::default()).is_err());

        let args = RunArgs {
            flush_ms: Some(0),
            ..RunArgs::default()
        };
        assert!(RenderOptions::resolve(&args, &RenderConfig::default()).is_err());
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            config: Some(dir.path().join("missing.toml")),
            ..RunArgs::default()
        };
        assert!(load_config(&args).is_err());
    }
}

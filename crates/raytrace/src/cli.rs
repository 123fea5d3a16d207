use std::path::PathBuf;

use clap::{Parser, Subcommand};
use progressive::{SamplerKind, MAX_SAMPLES};

use crate::canvas::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "raytrace",
    author,
    version,
    about = "Progressive CPU ray tracer with pause, resume and stop controls",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Scene to render (`3.1`, `3.2`, `4.4a`, `math`, `debug`).
    #[arg(value_name = "SCENE")]
    pub scene: Option<String>,

    /// Configuration file; defaults to `config.toml` in the config directory.
    #[arg(long, value_name = "FILE", env = "RAYTRACE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Image size (e.g. `640x480`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Anti-aliasing pattern: hammersley, jittered, multi-jittered, n-rooks, random or regular.
    #[arg(long, value_name = "KIND", value_parser = parse_sampler)]
    pub sampler: Option<SamplerKind>,

    /// Samples per pixel (1-1024).
    #[arg(
        long,
        value_name = "COUNT",
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_SAMPLES))
    )]
    pub samples: Option<u32>,

    /// Seed for randomised sample patterns.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Save the image here once rendering ends (bmp, png, jpg, jpeg, tif, tiff).
    #[arg(short, long, value_name = "PATH", value_parser = parse_output_path)]
    pub output: Option<PathBuf>,

    /// Start from this image instead of the checkerboard; scaled to the render size.
    #[arg(long, value_name = "PATH")]
    pub background: Option<PathBuf>,

    /// Age (ms) at which pending pixels are handed to the canvas.
    #[arg(long, value_name = "MILLISECONDS")]
    pub flush_ms: Option<u64>,

    /// Interval (ms) between progress reports.
    #[arg(long, value_name = "MILLISECONDS")]
    pub progress_ms: Option<u64>,

    /// Flush as soon as this many pixels are pending.
    #[arg(long, value_name = "PIXELS", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_batch_pixels: Option<u64>,

    /// Drop pending pixels instead of delivering them when stopped.
    #[arg(long)]
    pub discard_on_stop: bool,

    /// Ignore pause/resume/stop commands on standard input.
    #[arg(long)]
    pub no_stdin: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the built-in scenes.
    Scenes,
    /// Print the resolved configuration directory and file.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT format, e.g. 640x480".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in size '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in size '{trimmed}'"))?;

    if width == 0 || height == 0 {
        return Err("image dimensions must be greater than zero".to_string());
    }

    Ok((width, height))
}

pub fn parse_sampler(value: &str) -> Result<SamplerKind, String> {
    if value.trim().is_empty() {
        return Err("sampler must not be empty".to_string());
    }
    value.parse()
}

pub fn parse_output_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value.trim());
    OutputFormat::from_path(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_size() {
        assert_eq!(parse_size("640x480"), Ok((640, 480)));
        assert_eq!(parse_size(" 32 X 16 "), Ok((32, 16)));
        assert!(parse_size("640").is_err());
        assert!(parse_size("0x480").is_err());
        assert!(parse_size("wide x tall").is_err());
    }

    #[test]
    fn parses_sampler_names() {
        assert_eq!(parse_sampler("n-rooks"), Ok(SamplerKind::NRooks));
        assert_eq!(parse_sampler("Random"), Ok(SamplerKind::PureRandom));
        assert!(parse_sampler(" ").is_err());
        assert!(parse_sampler("halton").is_err());
    }

    #[test]
    fn output_path_requires_known_extension() {
        assert!(parse_output_path("frame.PNG").is_ok());
        assert!(parse_output_path("frame.tif").is_ok());
        assert!(parse_output_path("frame.gif").is_err());
        assert!(parse_output_path("frame").is_err());
    }

    #[test]
    fn cli_accepts_run_flags() {
        let cli = Cli::try_parse_from([
            "raytrace",
            "4.4a",
            "--size",
            "64x48",
            "--sampler",
            "jittered",
            "--samples",
            "4",
            "-o",
            "out.bmp",
            "--max-batch-pixels",
            "128",
            "--discard-on-stop",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.scene.as_deref(), Some("4.4a"));
        assert_eq!(cli.run.size, Some((64, 48)));
        assert_eq!(cli.run.sampler, Some(SamplerKind::Jittered));
        assert_eq!(cli.run.samples, Some(4));
        assert_eq!(cli.run.max_batch_pixels, Some(128));
        assert!(cli.run.discard_on_stop);
    }

    #[test]
    fn cli_bounds_sample_count() {
        assert!(Cli::try_parse_from(["raytrace", "--samples", "0"]).is_err());
        assert!(Cli::try_parse_from(["raytrace", "--samples", "4000000000"]).is_err());
        let cli = Cli::try_parse_from(["raytrace", "--samples", "1024"]).unwrap();
        assert_eq!(cli.run.samples, Some(MAX_SAMPLES));
    }

    #[test]
    fn scenes_subcommand_parses() {
        let cli = Cli::try_parse_from(["raytrace", "scenes"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Scenes)));
    }
}

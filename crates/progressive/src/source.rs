use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use crate::emitter::PixelEmitter;

/// Answer returned to a scene for every emitted pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelControl {
    /// Keep rendering.
    Continue,
    /// Cancellation was requested or delivery failed; return from `render`.
    Stop,
}

impl PixelControl {
    pub fn is_stop(self) -> bool {
        matches!(self, PixelControl::Stop)
    }
}

/// A scene that produces its image one pixel at a time.
///
/// `render` is called exactly once, on the worker thread. It must hand every
/// finished pixel to `emitter.emit` and should return promptly once `emit`
/// answers [`PixelControl::Stop`] or `emitter.should_stop()` turns true.
pub trait ScenePixelSource: Send {
    fn render(&mut self, emitter: &mut PixelEmitter) -> Result<()>;
}

impl<F> ScenePixelSource for F
where
    F: FnMut(&mut PixelEmitter) -> Result<()> + Send,
{
    fn render(&mut self, emitter: &mut PixelEmitter) -> Result<()> {
        self(emitter)
    }
}

/// Convenient alias for owning pixel sources behind trait objects.
pub type BoxedPixelSource = Box<dyn ScenePixelSource + Send>;

/// Sample pattern family requested for anti-aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamplerKind {
    Hammersley,
    Jittered,
    MultiJittered,
    NRooks,
    PureRandom,
    #[default]
    Regular,
}

impl SamplerKind {
    pub const ALL: [SamplerKind; 6] = [
        SamplerKind::Hammersley,
        SamplerKind::Jittered,
        SamplerKind::MultiJittered,
        SamplerKind::NRooks,
        SamplerKind::PureRandom,
        SamplerKind::Regular,
    ];
}

impl fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SamplerKind::Hammersley => "hammersley",
            SamplerKind::Jittered => "jittered",
            SamplerKind::MultiJittered => "multi-jittered",
            SamplerKind::NRooks => "n-rooks",
            SamplerKind::PureRandom => "random",
            SamplerKind::Regular => "regular",
        })
    }
}

impl FromStr for SamplerKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "hammersley" => Ok(SamplerKind::Hammersley),
            "jitter" | "jittered" => Ok(SamplerKind::Jittered),
            "multijitter" | "multi-jitter" | "multijittered" | "multi-jittered" => {
                Ok(SamplerKind::MultiJittered)
            }
            "nrooks" | "n-rooks" => Ok(SamplerKind::NRooks),
            "random" | "pure-random" | "purerandom" => Ok(SamplerKind::PureRandom),
            "regular" => Ok(SamplerKind::Regular),
            other => Err(format!(
                "unknown sampler '{other}'; expected hammersley, jittered, multi-jittered, n-rooks, random, or regular"
            )),
        }
    }
}

/// Largest sample count per pixel a session accepts.
pub const MAX_SAMPLES: u32 = 1024;

/// Sampler selection handed through to scene builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub kind: SamplerKind,
    /// Samples per pixel, within `1..=MAX_SAMPLES`.
    pub samples: u32,
    /// Seed for randomised patterns.
    pub seed: u64,
}

impl SamplerConfig {
    pub fn new(kind: SamplerKind, samples: u32) -> Self {
        Self {
            kind,
            samples: samples.clamp(1, MAX_SAMPLES),
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::new(SamplerKind::Regular, 16)
    }
}

/// Everything a builder needs to configure a scene for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneParams {
    pub width: u32,
    pub height: u32,
    pub sampler: SamplerConfig,
}

impl SceneParams {
    pub fn new(width: u32, height: u32, sampler: SamplerConfig) -> Self {
        Self {
            width,
            height,
            sampler,
        }
    }

    /// Number of pixels the session expects to receive.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Configures a scene for a new render session.
pub trait SceneBuilder {
    fn build(&self, params: &SceneParams) -> Result<BoxedPixelSource>;
}

impl<F> SceneBuilder for F
where
    F: Fn(&SceneParams) -> Result<BoxedPixelSource>,
{
    fn build(&self, params: &SceneParams) -> Result<BoxedPixelSource> {
        self(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sampler_aliases() {
        assert_eq!("Jitter".parse::<SamplerKind>(), Ok(SamplerKind::Jittered));
        assert_eq!(
            "multijitter".parse::<SamplerKind>(),
            Ok(SamplerKind::MultiJittered)
        );
        assert_eq!("nrooks".parse::<SamplerKind>(), Ok(SamplerKind::NRooks));
        assert!("sobol".parse::<SamplerKind>().is_err());
    }

    #[test]
    fn display_round_trips_for_every_kind() {
        for kind in SamplerKind::ALL {
            assert_eq!(kind.to_string().parse::<SamplerKind>(), Ok(kind));
        }
    }

    #[test]
    fn sampler_config_clamps_sample_count() {
        assert_eq!(SamplerConfig::new(SamplerKind::Regular, 0).samples, 1);
        assert_eq!(
            SamplerConfig::new(SamplerKind::PureRandom, u32::MAX).samples,
            MAX_SAMPLES
        );
    }

    #[test]
    fn pixel_count_does_not_overflow_u32() {
        let params = SceneParams::new(100_000, 100_000, SamplerConfig::default());
        assert_eq!(params.pixel_count(), 10_000_000_000);
    }
}

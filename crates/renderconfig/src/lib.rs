use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Upper bound for `sampler.samples`.
pub const MAX_SAMPLES: u32 = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    pub version: u32,
    #[serde(default)]
    pub render: RenderSection,
    #[serde(default)]
    pub image: ImageSection,
    #[serde(default)]
    pub sampler: SamplerSection,
    #[serde(default)]
    pub defaults: Defaults,
}

/// Worker batching and progress cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderSection {
    #[serde(
        default = "default_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub flush_interval: Duration,
    #[serde(
        default = "default_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub progress_interval: Duration,
    #[serde(default = "default_batch_capacity")]
    pub batch_capacity: usize,
    #[serde(default)]
    pub max_batch_pixels: Option<usize>,
    #[serde(default)]
    pub cancel_policy: CancelPolicySetting,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            flush_interval: default_interval(),
            progress_interval: default_interval(),
            batch_capacity: default_batch_capacity(),
            max_batch_pixels: None,
            cancel_policy: CancelPolicySetting::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelPolicySetting {
    #[default]
    Flush,
    Discard,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageSection {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for ImageSection {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SamplerSection {
    #[serde(default)]
    pub kind: SamplerSetting,
    #[serde(default = "default_samples")]
    pub samples: u32,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SamplerSection {
    fn default() -> Self {
        Self {
            kind: SamplerSetting::default(),
            samples: default_samples(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplerSetting {
    Hammersley,
    #[serde(alias = "jitter")]
    Jittered,
    #[serde(alias = "multijitter", alias = "multi-jitter")]
    MultiJittered,
    #[serde(alias = "nrooks")]
    NRooks,
    #[serde(alias = "pure-random")]
    Random,
    #[default]
    Regular,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Defaults {
    pub scene: Option<String>,
    pub output: Option<String>,
}

fn default_interval() -> Duration {
    Duration::from_millis(250)
}

fn default_batch_capacity() -> usize {
    500
}

fn default_width() -> u32 {
    400
}

fn default_height() -> u32 {
    300
}

fn default_samples() -> u32 {
    16
}

/// Accepts humantime strings (`"250ms"`, `"2s"`) or a plain number of
/// seconds. Integers are never read as milliseconds.
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct DurationVisitor;

    impl<'de> de::Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration string such as \"250ms\" or a number of seconds")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v.trim())
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u64::try_from(v)
                .map(Duration::from_secs)
                .map_err(|_| E::custom(format!("duration must be non-negative (got {v})")))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Duration::try_from_secs_f64(v)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}

impl RenderConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: RenderConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn default_scene(&self) -> Option<&str> {
        self.defaults.scene.as_deref()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        let render = &self.render;
        if render.flush_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "render.flush_interval must be greater than zero".into(),
            ));
        }
        if render.progress_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "render.progress_interval must be greater than zero".into(),
            ));
        }
        if render.batch_capacity == 0 {
            return Err(ConfigError::Invalid(
                "render.batch_capacity must be greater than zero".into(),
            ));
        }
        if render.max_batch_pixels == Some(0) {
            return Err(ConfigError::Invalid(
                "render.max_batch_pixels must be greater than zero when set".into(),
            ));
        }

        if self.image.width == 0 || self.image.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "image dimensions must be greater than zero (got {}x{})",
                self.image.width, self.image.height
            )));
        }

        if !(1..=MAX_SAMPLES).contains(&self.sampler.samples) {
            return Err(ConfigError::Invalid(format!(
                "sampler.samples must be between 1 and {MAX_SAMPLES} (got {})",
                self.sampler.samples
            )));
        }

        if let Some(scene) = &self.defaults.scene {
            if scene.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "defaults.scene may not be empty".into(),
                ));
            }
        }

        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            version: 1,
            render: RenderSection::default(),
            image: ImageSection::default(),
            sampler: SamplerSection::default(),
            defaults: Defaults::default(),
        }
    }
}

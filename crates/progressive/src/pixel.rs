use std::fmt;

/// Default number of samples reserved for each fresh batch.
pub const DEFAULT_BATCH_CAPACITY: usize = 500;

/// 8-bit per channel colour carried by a [`PixelSample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb8 {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb8 {
    pub const BLACK: Rgb8 = Rgb8::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn channels(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

/// One finished pixel as emitted by a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelSample {
    pub x: u32,
    pub y: u32,
    pub color: Rgb8,
}

impl PixelSample {
    pub fn new(x: u32, y: u32, color: Rgb8) -> Self {
        Self { x, y, color }
    }
}

impl fmt::Display for PixelSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) #{:02x}{:02x}{:02x}",
            self.x, self.y, self.color.red, self.color.green, self.color.blue
        )
    }
}

/// Samples in the order the scene emitted them.
///
/// A batch is filled on the worker thread and then moved, whole, to the
/// consumer. It is never shared between threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelBatch {
    samples: Vec<PixelSample>,
}

impl PixelBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: PixelSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[PixelSample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PixelSample> {
        self.samples.iter()
    }

    /// Swaps the accumulated samples out for a fresh batch of `capacity`.
    pub(crate) fn take(&mut self, capacity: usize) -> PixelBatch {
        std::mem::replace(self, PixelBatch::with_capacity(capacity))
    }
}

impl IntoIterator for PixelBatch {
    type Item = PixelSample;
    type IntoIter = std::vec::IntoIter<PixelSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

impl<'a> IntoIterator for &'a PixelBatch {
    type Item = &'a PixelSample;
    type IntoIter = std::slice::Iter<'a, PixelSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl From<Vec<PixelSample>> for PixelBatch {
    fn from(samples: Vec<PixelSample>) -> Self {
        Self { samples }
    }
}

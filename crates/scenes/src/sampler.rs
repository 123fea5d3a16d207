use progressive::{SamplerConfig, SamplerKind, MAX_SAMPLES};
use rand::prelude::*;

/// Independent sample sets kept for randomised patterns.
pub const RANDOM_SET_COUNT: usize = 83;

/// A point in the unit square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Precomputed anti-aliasing sample sets.
///
/// Each call to [`Sampler::next_pixel`] picks one set; the samples of that set
/// are returned in order by [`Sampler::samples`].
#[derive(Debug)]
pub struct Sampler {
    kind: SamplerKind,
    per_set: usize,
    sets: Vec<Vec<Point2>>,
    current: usize,
    rng: StdRng,
}

impl Sampler {
    pub fn new(config: SamplerConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let requested = config.samples.clamp(1, MAX_SAMPLES) as usize;
        let per_set = match config.kind {
            SamplerKind::Regular | SamplerKind::Jittered | SamplerKind::MultiJittered => {
                let side = grid_side(requested);
                side * side
            }
            _ => requested,
        };
        let set_count = match config.kind {
            SamplerKind::Regular | SamplerKind::Hammersley => 1,
            _ => RANDOM_SET_COUNT,
        };

        let sets = (0..set_count)
            .map(|_| generate(config.kind, per_set, &mut rng))
            .collect();

        Self {
            kind: config.kind,
            per_set,
            sets,
            current: 0,
            rng,
        }
    }

    pub fn kind(&self) -> SamplerKind {
        self.kind
    }

    /// Samples taken for every pixel.
    pub fn samples_per_pixel(&self) -> usize {
        self.per_set
    }

    /// Selects the sample set for the next pixel.
    pub fn next_pixel(&mut self) {
        if self.sets.len() > 1 {
            self.current = self.rng.gen_range(0..self.sets.len());
        }
    }

    pub fn samples(&self) -> &[Point2] {
        &self.sets[self.current]
    }
}

fn grid_side(samples: usize) -> usize {
    ((samples as f64).sqrt().floor() as usize).max(1)
}

fn generate(kind: SamplerKind, count: usize, rng: &mut StdRng) -> Vec<Point2> {
    match kind {
        SamplerKind::Regular => regular(grid_side(count)),
        SamplerKind::Jittered => jittered(grid_side(count), rng),
        SamplerKind::MultiJittered => multi_jittered(grid_side(count), rng),
        SamplerKind::NRooks => n_rooks(count, rng),
        SamplerKind::Hammersley => hammersley(count),
        SamplerKind::PureRandom => (0..count)
            .map(|_| Point2::new(rng.gen(), rng.gen()))
            .collect(),
    }
}

fn regular(side: usize) -> Vec<Point2> {
    let step = 1.0 / side as f64;
    let mut points = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            points.push(Point2::new(
                (col as f64 + 0.5) * step,
                (row as f64 + 0.5) * step,
            ));
        }
    }
    points
}

fn jittered(side: usize, rng: &mut StdRng) -> Vec<Point2> {
    let step = 1.0 / side as f64;
    let mut points = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            points.push(Point2::new(
                (col as f64 + rng.gen::<f64>()) * step,
                (row as f64 + rng.gen::<f64>()) * step,
            ));
        }
    }
    points
}

/// One sample per row and column of a `count` x `count` grid.
fn n_rooks(count: usize, rng: &mut StdRng) -> Vec<Point2> {
    let step = 1.0 / count as f64;
    let mut xs: Vec<f64> = (0..count)
        .map(|k| (k as f64 + rng.gen::<f64>()) * step)
        .collect();
    let mut ys: Vec<f64> = (0..count)
        .map(|k| (k as f64 + rng.gen::<f64>()) * step)
        .collect();
    xs.shuffle(rng);
    ys.shuffle(rng);
    xs.into_iter()
        .zip(ys)
        .map(|(x, y)| Point2::new(x, y))
        .collect()
}

/// Jittered in the coarse grid and n-rooks in the fine grid.
fn multi_jittered(side: usize, rng: &mut StdRng) -> Vec<Point2> {
    let count = side * side;
    let subcell = 1.0 / count as f64;
    let mut points = Vec::with_capacity(count);
    for i in 0..side {
        for j in 0..side {
            points.push(Point2::new(
                ((i * side + j) as f64 + rng.gen::<f64>()) * subcell,
                ((j * side + i) as f64 + rng.gen::<f64>()) * subcell,
            ));
        }
    }

    for i in 0..side {
        for j in 0..side {
            let k = rng.gen_range(j..side);
            let (a, b) = (i * side + j, i * side + k);
            let x = points[a].x;
            points[a].x = points[b].x;
            points[b].x = x;
        }
    }
    for i in 0..side {
        for j in 0..side {
            let k = rng.gen_range(j..side);
            let (a, b) = (j * side + i, k * side + i);
            let y = points[a].y;
            points[a].y = points[b].y;
            points[b].y = y;
        }
    }
    points
}

fn hammersley(count: usize) -> Vec<Point2> {
    (0..count)
        .map(|index| Point2::new(index as f64 / count as f64, radical_inverse(index as u32)))
        .collect()
}

/// Base-two radical inverse: mirrors the binary digits around the point.
fn radical_inverse(mut value: u32) -> f64 {
    let mut inverse = 0.0;
    let mut fraction = 0.5;
    while value > 0 {
        if value & 1 == 1 {
            inverse += fraction;
        }
        fraction *= 0.5;
        value >>= 1;
    }
    inverse
}

//! Seeded fractal value noise used to lay out the initial population.

use outbreak_core::{NoiseField, SimulationError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Parameters of the fractal sum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FractalNoise {
    /// Number of layers summed together.
    pub(crate) octaves: u32,
    /// Amplitude multiplier between consecutive octaves.
    pub(crate) persistence: f32,
    /// Lattice spacing of the first octave, in cells.
    pub(crate) base_period: f32,
}

impl Default for FractalNoise {
    fn default() -> Self {
        Self {
            octaves: 6,
            persistence: 0.24,
            base_period: 32.0,
        }
    }
}

impl FractalNoise {
    /// Generates a `width` x `height` field normalized to `[0, 1]`.
    pub(crate) fn generate(
        &self,
        width: u32,
        height: u32,
        seed: u64,
    ) -> Result<NoiseField, SimulationError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let len = width as usize * height as usize;
        let mut values = vec![0.0_f32; len];

        let mut period = self.base_period.max(1.0);
        let mut amplitude = 1.0_f32;
        for _ in 0..self.octaves {
            let layer = Lattice::random(width, height, period, &mut rng);
            for row in 0..height {
                for column in 0..width {
                    let index = row as usize * width as usize + column as usize;
                    values[index] += amplitude * layer.sample(column, row);
                }
            }
            period = (period / 2.0).max(1.0);
            amplitude *= self.persistence;
        }

        normalize(&mut values);
        NoiseField::new(width, height, values)
    }
}

/// Random values on a coarse lattice, interpolated per cell.
struct Lattice {
    columns: usize,
    period: f32,
    values: Vec<f32>,
}

impl Lattice {
    fn random(width: u32, height: u32, period: f32, rng: &mut ChaCha8Rng) -> Self {
        let columns = (width as f32 / period).ceil() as usize + 2;
        let rows = (height as f32 / period).ceil() as usize + 2;
        let values = (0..columns * rows).map(|_| rng.gen::<f32>()).collect();
        Self {
            columns,
            period,
            values,
        }
    }

    fn sample(&self, column: u32, row: u32) -> f32 {
        let x = column as f32 / self.period;
        let y = row as f32 / self.period;
        let (x0, y0) = (x.floor() as usize, y.floor() as usize);
        let tx = smoothstep(x.fract());
        let ty = smoothstep(y.fract());

        let at = |lx: usize, ly: usize| self.values[ly * self.columns + lx];
        let top = lerp(at(x0, y0), at(x0 + 1, y0), tx);
        let bottom = lerp(at(x0, y0 + 1), at(x0 + 1, y0 + 1), tx);
        lerp(top, bottom, ty)
    }
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn normalize(values: &mut [f32]) {
    let (min, max) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &value| {
            (min.min(value), max.max(value))
        });
    let span = max - min;
    for value in values.iter_mut() {
        *value = if span > f32::EPSILON {
            (*value - min) / span
        } else {
            0.5
        };
    }
}

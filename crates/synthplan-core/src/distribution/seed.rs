use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::spec::options::{RandomDistribution, SeedMethod};
use crate::value::stable_hash;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Standard deviations on either side of the mean that a normal draw spreads
/// over `[0, 1)`. Draws further out are clamped to the ends.
const NORMAL_SPAN: f64 = 3.0;

/// Largest `f64` below 1.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Independent random streams drawn for the same row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Drives the value draw.
    Value,
    /// Drives null injection, independent of the value draw.
    Null,
}

impl Stream {
    fn salt(self) -> u64 {
        match self {
            Stream::Value => 0,
            Stream::Null => 0xD1B5_4A32_D192_ED03,
        }
    }
}

/// Key of a column's random stream.
///
/// A uniform draw is a pure function of `(key, row id, stream)`, so any row
/// can be evaluated on any worker, in any order, and always yields the same
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeedKey(u64);

impl SeedKey {
    pub fn new(key: u64) -> Self {
        Self(key)
    }

    /// Key for a column, following its seed method.
    ///
    /// `hash_fieldname` mixes the column name into the plan seed (or the
    /// column's own `random_seed`), so columns draw independent streams.
    /// `fixed` uses `random_seed` verbatim, so all columns sharing it share a
    /// stream.
    pub fn for_column(
        plan_seed: u64,
        column: &str,
        method: SeedMethod,
        random_seed: Option<u64>,
    ) -> Self {
        match method {
            SeedMethod::Fixed => Self(random_seed.unwrap_or(plan_seed)),
            SeedMethod::HashFieldname => {
                Self(random_seed.unwrap_or(plan_seed) ^ stable_hash(column.as_bytes()))
            }
        }
    }

    /// Key for the `index`-th sibling of an expanded column.
    pub fn sibling(self, index: usize) -> Self {
        let tag = stable_hash(format!("#{}", index).as_bytes());
        Self(self.0.rotate_left(17) ^ tag)
    }

    fn rng(self, row_id: i64, stream: Stream) -> StdRng {
        let seed = self
            .0
            .wrapping_add((row_id as u64).wrapping_mul(GOLDEN_GAMMA))
            ^ stream.salt();
        StdRng::seed_from_u64(seed)
    }

    /// Uniform draw in `[0, 1)` for one row.
    pub fn uniform(self, row_id: i64, stream: Stream) -> f64 {
        self.rng(row_id, stream).random::<f64>()
    }

    /// Draw in `[0, 1)` shaped by `distribution`.
    ///
    /// A normal draw uses Box-Muller and maps `mean ± 3σ` onto `[0, 1)`, so
    /// values cluster around the middle of the column's range.
    pub fn draw(self, row_id: i64, stream: Stream, distribution: RandomDistribution) -> f64 {
        match distribution {
            RandomDistribution::Uniform => self.uniform(row_id, stream),
            RandomDistribution::Normal => {
                let mut rng = self.rng(row_id, stream);
                let u1: f64 = rng.random();
                let u2: f64 = rng.random();
                let z = (-2.0 * (1.0 - u1).ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
                (0.5 + z / (2.0 * NORMAL_SPAN)).clamp(0.0, BELOW_ONE)
            }
        }
    }
}

impl std::fmt::Display for SeedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_is_deterministic() {
        let key = SeedKey::for_column(42, "price", SeedMethod::HashFieldname, None);
        for row in [0, 1, 17, 99_999] {
            assert_eq!(
                key.uniform(row, Stream::Value),
                key.uniform(row, Stream::Value)
            );
        }
    }

    #[test]
    fn test_uniform_in_unit_interval() {
        let key = SeedKey::new(7);
        for row in 0..1000 {
            let u = key.uniform(row, Stream::Value);
            assert!((0.0..1.0).contains(&u), "draw out of range: {}", u);
        }
    }

    #[test]
    fn test_streams_and_columns_differ() {
        let a = SeedKey::for_column(42, "a", SeedMethod::HashFieldname, None);
        let b = SeedKey::for_column(42, "b", SeedMethod::HashFieldname, None);
        assert_ne!(a, b);
        assert_ne!(a.uniform(5, Stream::Value), a.uniform(5, Stream::Null));
        assert_ne!(a.sibling(0), a.sibling(1));
    }

    #[test]
    fn test_normal_draw_clusters_in_the_middle() {
        let key = SeedKey::new(11);
        let n = 20_000;
        let draws: Vec<f64> = (0..n)
            .map(|row| key.draw(row, Stream::Value, RandomDistribution::Normal))
            .collect();
        assert!(draws.iter().all(|d| (0.0..1.0).contains(d)));

        let mean = draws.iter().sum::<f64>() / n as f64;
        assert!((mean - 0.5).abs() < 0.01, "mean was {}", mean);
        let var = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n as f64;
        let sd = var.sqrt();
        assert!((sd - 1.0 / 6.0).abs() < 0.01, "sd was {}", sd);

        let uniform = key.draw(3, Stream::Value, RandomDistribution::Uniform);
        assert_eq!(uniform, key.uniform(3, Stream::Value));
    }

    #[test]
    fn test_fixed_method_shares_stream() {
        let a = SeedKey::for_column(42, "a", SeedMethod::Fixed, Some(1234));
        let b = SeedKey::for_column(42, "b", SeedMethod::Fixed, Some(1234));
        assert_eq!(a, b);
    }
}

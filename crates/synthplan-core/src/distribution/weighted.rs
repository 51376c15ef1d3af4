/// Cumulative weight table for a weighted discrete column.
///
/// Built once per column when the plan is synthesized. A draw `d` in
/// `[0, total)` selects the first index whose running total exceeds `d`, so
/// a boundary tie goes to the following index and zero-weight values can
/// never be selected.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeWeights {
    prefix: Vec<f64>,
}

impl CumulativeWeights {
    pub fn new(weights: &[f64]) -> Result<Self, String> {
        if weights.is_empty() {
            return Err("weights must not be empty".to_string());
        }
        let mut prefix = Vec::with_capacity(weights.len());
        let mut running = 0.0;
        for (i, &w) in weights.iter().enumerate() {
            if !w.is_finite() || w < 0.0 {
                return Err(format!(
                    "weight at position {} must be a non-negative number, got {}",
                    i, w
                ));
            }
            running += w;
            prefix.push(running);
        }
        if running <= 0.0 {
            return Err("at least one weight must be greater than zero".to_string());
        }
        Ok(Self { prefix })
    }

    pub fn total(&self) -> f64 {
        self.prefix.last().copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.prefix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }

    /// The individual weights, recovered from the prefix sums.
    pub fn weights(&self) -> Vec<f64> {
        let mut prev = 0.0;
        self.prefix
            .iter()
            .map(|&cum| {
                let w = cum - prev;
                prev = cum;
                w
            })
            .collect()
    }

    /// Index for a draw in `[0, total)`, located by binary search.
    ///
    /// The comparison is strict: the first prefix `> draw`, not `>= draw`.
    /// With `>=`, a draw of 0 would select a leading zero-weight value.
    pub fn locate(&self, draw: f64) -> usize {
        let idx = self.prefix.partition_point(|&cum| cum <= draw);
        idx.min(self.prefix.len().saturating_sub(1))
    }

    /// Index for a fraction in `[0, 1)`, scaled to the total weight.
    pub fn pick(&self, fraction: f64) -> usize {
        self.locate(fraction * self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference linear scan; binary search must agree with it everywhere.
    fn linear_locate(weights: &[f64], draw: f64) -> usize {
        let mut running = 0.0;
        for (i, w) in weights.iter().enumerate() {
            running += w;
            if running > draw {
                return i;
            }
        }
        weights.len() - 1
    }

    #[test]
    fn test_rejects_invalid_weights() {
        assert!(CumulativeWeights::new(&[]).is_err());
        assert!(CumulativeWeights::new(&[1.0, -0.5]).is_err());
        assert!(CumulativeWeights::new(&[0.0, 0.0]).is_err());
        assert!(CumulativeWeights::new(&[f64::NAN]).is_err());
    }

    #[test]
    fn test_boundary_tie_goes_to_next_index() {
        let table = CumulativeWeights::new(&[9.0, 1.0]).unwrap();
        assert_eq!(table.total(), 10.0);
        assert_eq!(table.locate(0.0), 0);
        assert_eq!(table.locate(8.999), 0);
        assert_eq!(table.locate(9.0), 1);
        assert_eq!(table.locate(9.999), 1);

        let leading_zero = CumulativeWeights::new(&[0.0, 1.0]).unwrap();
        assert_eq!(leading_zero.locate(0.0), 1);
    }

    #[test]
    fn test_zero_weight_never_selected() {
        let table = CumulativeWeights::new(&[0.0, 2.0, 0.0, 1.0]).unwrap();
        for i in 0..300 {
            let idx = table.locate(i as f64 / 100.0);
            assert!(idx == 1 || idx == 3, "selected zero-weight index {}", idx);
        }
    }

    #[test]
    fn test_binary_search_matches_linear_scan() {
        let weights = [0.5, 0.0, 3.0, 1.25, 0.0, 2.0];
        let table = CumulativeWeights::new(&weights).unwrap();
        for i in 0..675 {
            let draw = i as f64 / 100.0;
            assert_eq!(table.locate(draw), linear_locate(&weights, draw), "draw {}", draw);
        }
    }

    #[test]
    fn test_pick_scales_fraction() {
        let table = CumulativeWeights::new(&[1.0, 1.0, 2.0]).unwrap();
        assert_eq!(table.pick(0.1), 0);
        assert_eq!(table.pick(0.3), 1);
        assert_eq!(table.pick(0.6), 2);
        assert_eq!(table.pick(0.999_999), 2);
    }
}

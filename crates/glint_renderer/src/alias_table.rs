//! Constant-time sampling of discrete distributions (Vose's alias method).

/// One column of the table: keep `index` with probability `divide`,
/// otherwise take `alias`.
#[derive(Debug, Clone, Copy)]
struct AliasEntry {
    divide: f32,
    alias: usize,
}

/// Result of drawing from an [`AliasTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AliasSample {
    /// Selected index.
    pub index: usize,
    /// Probability of having selected `index`.
    pub probability: f32,
    /// A fresh uniform value in `[0, 1)` recovered from the unused part of
    /// the input, so one random number can drive both the selection and a
    /// follow-up continuous choice.
    pub remapped: f32,
}

/// A discrete distribution over `0..len` proportional to given weights.
///
/// Built once in O(n); each draw is O(1).
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
    probabilities: Vec<f32>,
}

impl AliasTable {
    /// Build a table from non-negative weights.
    ///
    /// Negative or non-finite weights count as zero. If every weight is zero
    /// the table is uniform.
    pub fn new(weights: &[f32]) -> Self {
        let n = weights.len();
        if n == 0 {
            return Self::default();
        }

        let clean: Vec<f32> = weights
            .iter()
            .map(|&w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
            .collect();
        let sum: f32 = clean.iter().sum();

        let probabilities: Vec<f32> = if sum > 0.0 {
            clean.iter().map(|w| w / sum).collect()
        } else {
            vec![1.0 / n as f32; n]
        };

        let mut scaled: Vec<f32> = probabilities.iter().map(|p| p * n as f32).collect();
        let mut entries: Vec<AliasEntry> = (0..n)
            .map(|i| AliasEntry {
                divide: 1.0,
                alias: i,
            })
            .collect();

        let (mut small, mut large): (Vec<usize>, Vec<usize>) =
            (0..n).partition(|&i| scaled[i] < 1.0);

        while let (Some(poor), Some(rich)) = (small.pop(), large.pop()) {
            entries[poor] = AliasEntry {
                divide: scaled[poor],
                alias: rich,
            };
            scaled[rich] = (scaled[rich] + scaled[poor]) - 1.0;

            if scaled[rich] < 1.0 {
                small.push(rich);
            } else {
                large.push(rich);
            }
        }

        // Whatever is left over is 1.0 up to rounding error and keeps itself
        for i in small.into_iter().chain(large) {
            entries[i] = AliasEntry { divide: 1.0, alias: i };
        }

        Self {
            entries,
            probabilities,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draw an index using a uniform value `u` in `[0, 1)`.
    ///
    /// Returns `None` only for an empty table.
    pub fn sample(&self, u: f32) -> Option<AliasSample> {
        let n = self.entries.len();
        if n == 0 {
            return None;
        }

        let q = u.clamp(0.0, 1.0) * n as f32;
        let column = (q as usize).min(n - 1);
        let fraction = (q - column as f32).clamp(0.0, 1.0);
        let entry = self.entries[column];

        let (index, remapped) = if fraction < entry.divide || entry.divide >= 1.0 {
            (column, fraction / entry.divide)
        } else {
            (entry.alias, (fraction - entry.divide) / (1.0 - entry.divide))
        };

        Some(AliasSample {
            index,
            probability: self.probabilities[index],
            remapped: remapped.clamp(0.0, 1.0 - f32::EPSILON),
        })
    }

    /// Probability of drawing `index` (zero when out of range).
    pub fn probability(&self, index: usize) -> f32 {
        self.probabilities.get(index).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_empty_table() {
        let table = AliasTable::new(&[]);
        assert!(table.is_empty());
        assert!(table.sample(0.5).is_none());
        assert_eq!(table.probability(0), 0.0);
    }

    #[test]
    fn test_probabilities_are_normalized() {
        let table = AliasTable::new(&[1.0, 3.0, 0.0, 4.0]);

        assert!((table.probability(0) - 0.125).abs() < 1e-6);
        assert!((table.probability(1) - 0.375).abs() < 1e-6);
        assert_eq!(table.probability(2), 0.0);
        assert!((table.probability(3) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_weights_are_uniform() {
        let table = AliasTable::new(&[0.0, 0.0, 0.0, 0.0]);
        for i in 0..4 {
            assert!((table.probability(i) - 0.25).abs() < 1e-6);
        }
        assert!(table.sample(0.99).is_some());
    }

    #[test]
    fn test_zero_weight_never_selected() {
        let table = AliasTable::new(&[2.0, 0.0, 1.0]);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..10_000 {
            let s = table.sample(rng.gen()).unwrap();
            assert_ne!(s.index, 1);
            assert_eq!(s.probability, table.probability(s.index));
        }
    }

    #[test]
    fn test_sample_frequencies_match_weights() {
        let weights = [5.0, 1.0, 2.0, 0.5, 1.5];
        let table = AliasTable::new(&weights);
        let total: f32 = weights.iter().sum();
        let mut rng = StdRng::seed_from_u64(11);

        let draws = 100_000;
        let mut counts = [0usize; 5];
        for _ in 0..draws {
            counts[table.sample(rng.gen()).unwrap().index] += 1;
        }

        for (i, w) in weights.iter().enumerate() {
            let expected = w / total;
            let observed = counts[i] as f32 / draws as f32;
            assert!(
                (expected - observed).abs() < 0.01,
                "index {i}: expected {expected}, observed {observed}"
            );
        }
    }

    #[test]
    fn test_remapped_value_is_uniform() {
        let table = AliasTable::new(&[1.0, 2.0, 3.0]);
        let mut rng = StdRng::seed_from_u64(5);

        let draws = 50_000;
        let mut mean = 0.0;
        for _ in 0..draws {
            let s = table.sample(rng.gen()).unwrap();
            assert!((0.0..1.0).contains(&s.remapped));
            mean += s.remapped;
        }
        mean /= draws as f32;

        assert!((mean - 0.5).abs() < 0.01, "mean of remapped values was {mean}");
    }
}

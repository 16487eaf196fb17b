//! Statistics aggregation from recorded games.
//!
//! Covers the score and length distributions, their correlation, and how the
//! number of available moves drifts from turn to turn (overall and grouped by
//! the number of moves available before the step). Histograms carry densities
//! so a plotting front end can draw them directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::GameRecord;

/// Summary of a sample, following scipy's `describe`: sample variance
/// (ddof = 1), biased skewness, Fisher (excess) kurtosis.
///
/// Degenerate samples report 0 where scipy would report NaN: variance for a
/// single observation, skewness and kurtosis for zero spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Describe {
    pub nobs: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub variance: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

impl Describe {
    /// `None` for an empty sample.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &v in values {
            let d = v - mean;
            m2 += d * d;
            m3 += d * d * d;
            m4 += d * d * d * d;
            min = min.min(v);
            max = max.max(v);
        }
        let variance = if values.len() > 1 { m2 / (n - 1.0) } else { 0.0 };
        let (m2, m3, m4) = (m2 / n, m3 / n, m4 / n);
        let (skewness, kurtosis) = if m2 > 0.0 { (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0) } else { (0.0, 0.0) };
        Some(Describe { nobs: values.len(), min, max, mean, variance, skewness, kurtosis })
    }

    pub fn of_ints<T: Copy + Into<f64>>(values: &[T]) -> Option<Self> {
        let v: Vec<f64> = values.iter().map(|&x| x.into()).collect();
        Self::of(&v)
    }

    /// Sample standard deviation (scipy `tstd`).
    #[inline]
    pub fn std_dev(&self) -> f64 { self.variance.sqrt() }
}

/// Pearson correlation coefficient. `None` if the lengths differ, there are
/// fewer than two points, or either sample has zero spread.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
        syy += (y - my) * (y - my);
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

/// Equal-width histogram normalized to a probability density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `bins + 1` ascending edges.
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
    pub densities: Vec<f64>,
}

impl Histogram {
    /// Bin `values` into `bins` equal bins over `[min, max]`; the last bin is
    /// closed. A zero-width range is widened to `[v - 0.5, v + 0.5]`.
    pub fn density(values: &[f64], bins: usize) -> Option<Self> {
        if values.is_empty() || bins == 0 {
            return None;
        }
        let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0u64; bins];
        for &v in values {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        let total = values.len() as f64;
        let densities = counts.iter().map(|&c| c as f64 / (total * width)).collect();
        Some(Histogram { edges, counts, densities })
    }
}

/// How the available-move count changes after a turn that started with
/// `available` moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionDeltas {
    pub available: u32,
    pub describe: Describe,
    /// Empirical probability of each delta.
    pub distribution: BTreeMap<i64, f64>,
}

impl PositionDeltas {
    /// Expected jump in available moves from this position.
    #[inline]
    pub fn mean_jump(&self) -> f64 { self.describe.mean }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub games: usize,
    pub truncated: usize,
    pub scores: Option<Describe>,
    pub lengths: Option<Describe>,
    pub length_score_correlation: Option<f64>,
    pub score_histogram: Option<Histogram>,
    pub length_histogram: Option<Histogram>,
    /// Turn-to-turn change in available moves, all games pooled.
    pub deltas: Option<Describe>,
    pub delta_histogram: Option<Histogram>,
    pub delta_counts: BTreeMap<i64, u64>,
    pub deltas_by_position: Vec<PositionDeltas>,
    pub initial_moves: Option<Describe>,
    pub max_moves: Option<Describe>,
    /// How many evolves produced each chain count.
    pub chain_counts: BTreeMap<u32, u64>,
}

impl Statistics {
    pub const SCORE_BINS: usize = 70;
    pub const DELTA_BINS: usize = 50;

    pub fn from_records(records: &[GameRecord]) -> Self {
        let scores: Vec<f64> = records.iter().map(|r| r.score as f64).collect();
        let lengths: Vec<f64> = records.iter().map(|r| r.turns as f64).collect();

        let mut all_deltas: Vec<f64> = Vec::new();
        let mut delta_counts: BTreeMap<i64, u64> = BTreeMap::new();
        let mut by_position: BTreeMap<u32, Vec<i64>> = BTreeMap::new();
        let mut chain_counts: BTreeMap<u32, u64> = BTreeMap::new();
        for rec in records {
            for (&available, delta) in rec.moves_available.iter().zip(rec.move_deltas()) {
                all_deltas.push(delta as f64);
                *delta_counts.entry(delta).or_default() += 1;
                by_position.entry(available).or_default().push(delta);
            }
            for &c in &rec.chains {
                *chain_counts.entry(c).or_default() += 1;
            }
        }

        let deltas_by_position = by_position
            .into_iter()
            .filter_map(|(available, deltas)| {
                let describe = Describe::of(&deltas.iter().map(|&d| d as f64).collect::<Vec<_>>())?;
                let n = deltas.len() as f64;
                let mut distribution: BTreeMap<i64, f64> = BTreeMap::new();
                for d in deltas {
                    *distribution.entry(d).or_default() += 1.0 / n;
                }
                Some(PositionDeltas { available, describe, distribution })
            })
            .collect();

        let initial: Vec<u32> = records.iter().map(GameRecord::initial_moves).collect();
        let max: Vec<u32> = records.iter().map(GameRecord::max_moves).collect();

        Statistics {
            games: records.len(),
            truncated: records.iter().filter(|r| r.truncated).count(),
            scores: Describe::of(&scores),
            lengths: Describe::of(&lengths),
            length_score_correlation: pearson(&lengths, &scores),
            score_histogram: Histogram::density(&scores, Self::SCORE_BINS),
            length_histogram: Histogram::density(&lengths, Self::SCORE_BINS),
            deltas: Describe::of(&all_deltas),
            delta_histogram: Histogram::density(&all_deltas, Self::DELTA_BINS),
            delta_counts,
            deltas_by_position,
            initial_moves: Describe::of_ints(&initial),
            max_moves: Describe::of_ints(&max),
            chain_counts,
        }
    }

    /// Mean chain reactions per evolve, over every turn of every game.
    pub fn mean_chains(&self) -> f64 {
        let total: u64 = self.chain_counts.values().sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: u64 = self.chain_counts.iter().map(|(&c, &n)| c as u64 * n).sum();
        weighted as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

    fn record(score: u64, available: &[u32], chains: &[u32]) -> GameRecord {
        let mut rec = GameRecord::new(0);
        rec.score = score;
        rec.turns = available.len().saturating_sub(1) as u32;
        rec.moves_available = available.to_vec();
        rec.chains = chains.to_vec();
        rec
    }

    #[test]
    fn describe_matches_scipy() {
        // scipy.stats.describe([1, 2, 3, 4, 10])
        let d = Describe::of(&[1.0, 2.0, 3.0, 4.0, 10.0]).unwrap();
        assert_eq!(d.nobs, 5);
        assert_eq!((d.min, d.max), (1.0, 10.0));
        assert!(approx(d.mean, 4.0));
        assert!(approx(d.variance, 12.5));
        assert!((d.skewness - 1.1384199576606167).abs() < 1e-9);
        assert!((d.kurtosis - -0.212).abs() < 1e-9);
        assert!(approx(d.std_dev(), 12.5f64.sqrt()));
    }

    #[test]
    fn describe_degenerate_samples() {
        assert!(Describe::of(&[]).is_none());
        let d = Describe::of(&[3.0]).unwrap();
        assert_eq!((d.variance, d.skewness, d.kurtosis), (0.0, 0.0, 0.0));
        let d = Describe::of(&[2.0, 2.0, 2.0]).unwrap();
        assert_eq!((d.variance, d.skewness), (0.0, 0.0));
    }

    #[test]
    fn pearson_basics() {
        assert!(approx(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap(), 1.0));
        assert!(approx(pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap(), -1.0));
        assert!(pearson(&[1.0, 1.0], &[2.0, 3.0]).is_none());
        assert!(pearson(&[1.0], &[2.0]).is_none());
        assert!(pearson(&[1.0, 2.0], &[2.0]).is_none());
    }

    #[test]
    fn histogram_density_integrates_to_one() {
        let values = [0.0, 1.0, 1.0, 2.0, 3.0, 4.0];
        let h = Histogram::density(&values, 4).unwrap();
        assert_eq!(h.edges.len(), 5);
        assert_eq!(h.counts, vec![1, 2, 1, 2]);
        let width = h.edges[1] - h.edges[0];
        let area: f64 = h.densities.iter().map(|d| d * width).sum();
        assert!(approx(area, 1.0));

        let flat = Histogram::density(&[5.0, 5.0], 2).unwrap();
        assert_eq!(flat.counts.iter().sum::<u64>(), 2);
        assert!(Histogram::density(&[], 3).is_none());
    }

    #[test]
    fn aggregates_deltas_by_position() {
        let records = vec![record(10, &[4, 6, 4, 0], &[0, 1, 0, 2]), record(30, &[4, 2, 0], &[0, 0, 0])];
        let s = Statistics::from_records(&records);
        assert_eq!(s.games, 2);
        assert!(approx(s.scores.unwrap().mean, 20.0));
        assert_eq!(s.lengths.unwrap().max, 3.0);
        // Deltas: +2 -2 -4 from the first game, -2 -2 from the second.
        assert_eq!(s.delta_counts.get(&-2), Some(&3));
        assert_eq!(s.delta_counts.get(&2), Some(&1));
        assert_eq!(s.delta_counts.get(&-4), Some(&1));
        let at4 = s.deltas_by_position.iter().find(|p| p.available == 4).unwrap();
        assert_eq!(at4.describe.nobs, 3);
        assert!(approx(at4.mean_jump(), (2.0 - 4.0 - 2.0) / 3.0));
        assert!(approx(at4.distribution.values().sum::<f64>(), 1.0));
        assert_eq!(s.initial_moves.unwrap().mean, 4.0);
        assert_eq!(s.max_moves.unwrap().max, 6.0);
        assert_eq!(s.chain_counts.get(&0), Some(&5));
        assert!(approx(s.mean_chains(), 3.0 / 7.0));
    }

    #[test]
    fn empty_input() {
        let s = Statistics::from_records(&[]);
        assert_eq!(s.games, 0);
        assert!(s.scores.is_none());
        assert!(s.deltas_by_position.is_empty());
        assert_eq!(s.mean_chains(), 0.0);
    }
}

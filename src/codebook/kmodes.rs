//! A single k-modes clustering run over packed binary tiles.
//!
//! k-modes is k-means for categorical data: distance is the number of
//! mismatched bits and a centroid is the per-bit majority (mode) of its
//! members. One run is fully determined by its seed.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use super::quantizer::nearest;
use crate::error::MonovidError;
use crate::types::Tile;

/// The result of one clustering run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KModesRun {
    /// Sum over all points of the distance to their final centroid.
    pub cost: u64,
    pub centroids: Vec<Tile>,
    pub iterations: usize,
    /// `true` when the run stopped because no point changed cluster.
    pub converged: bool,
}

/// Clusters `points` into exactly `k` centroids.
///
/// `points` must hold at least `k` distinct tiles; the initial centroids are
/// `k` of them chosen at random without replacement.
pub fn run_kmodes(
    points: &[Tile],
    k: usize,
    max_iterations: usize,
    seed: u64,
) -> Result<KModesRun, MonovidError> {
    if k == 0 || points.len() < k {
        return Err(MonovidError::InsufficientCorpus {
            unique: points.len(),
            requested: k,
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids: Vec<Tile> = index::sample(&mut rng, points.len(), k)
        .into_iter()
        .map(|i| points[i])
        .collect();

    let mut assignments = vec![usize::MAX; points.len()];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;

        let mut changed = false;
        for (point, slot) in points.iter().zip(assignments.iter_mut()) {
            let (cluster, _) = nearest(*point, &centroids).ok_or_else(|| {
                MonovidError::InternalError("k-modes ran with an empty centroid set".into())
            })?;
            if *slot != cluster {
                *slot = cluster;
                changed = true;
            }
        }
        if !changed {
            converged = true;
            break;
        }

        reseed_empty_clusters(&mut assignments, k, &mut rng);
        centroids = majority_centroids(points, &assignments, k);
    }

    // Final pass so the reported cost matches the returned centroids.
    let mut cost = 0u64;
    for point in points {
        let (_, distance) = nearest(*point, &centroids).ok_or_else(|| {
            MonovidError::InternalError("k-modes ran with an empty centroid set".into())
        })?;
        cost += u64::from(distance);
    }

    Ok(KModesRun {
        cost,
        centroids,
        iterations,
        converged,
    })
}

/// Moves one random member of the largest cluster into each empty cluster.
fn reseed_empty_clusters(assignments: &mut [usize], k: usize, rng: &mut StdRng) {
    let mut sizes = vec![0usize; k];
    for &cluster in assignments.iter() {
        sizes[cluster] += 1;
    }

    for empty in 0..k {
        if sizes[empty] != 0 {
            continue;
        }
        // With at least k distinct points, an empty cluster implies some
        // cluster holds two or more.
        let Some((largest, &size)) = sizes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
        else {
            return;
        };
        if size < 2 {
            return;
        }

        let pick = rng.random_range(0..size);
        let member = assignments
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == largest)
            .map(|(i, _)| i)
            .nth(pick);
        if let Some(member) = member {
            assignments[member] = empty;
            sizes[largest] -= 1;
            sizes[empty] = 1;
        }
    }
}

/// Per-bit majority of each cluster's members. Ties resolve to 0.
fn majority_centroids(points: &[Tile], assignments: &[usize], k: usize) -> Vec<Tile> {
    let words: &[u64] = bytemuck::cast_slice(points);
    let mut ones = vec![[0u32; Tile::MAX_PIXELS]; k];
    let mut sizes = vec![0u32; k];

    for (&word, &cluster) in words.iter().zip(assignments) {
        sizes[cluster] += 1;
        let mut rest = word;
        while rest != 0 {
            let bit = rest.trailing_zeros() as usize;
            ones[cluster][bit] += 1;
            rest &= rest - 1;
        }
    }

    ones.iter()
        .zip(&sizes)
        .map(|(counts, &size)| {
            let raw = counts
                .iter()
                .enumerate()
                .filter(|(_, &c)| 2 * c > size)
                .fold(0u64, |acc, (bit, _)| acc | (1 << bit));
            Tile::from_raw(raw)
        })
        .collect()
}

// In: src/codebook/mod.rs

//! Learns a dictionary of representative tiles and maps tiles onto it.
//!
//! The builder runs `n_init` independent k-modes initializations in parallel on
//! a dedicated `rayon` pool. Each run returns its cost and centroids; selection
//! happens after the join, so the runs never share mutable state.

pub mod corpus;
pub mod kmodes;
pub mod quantizer;

use rayon::prelude::*;

use crate::config::{ClusteringConfig, CorpusPolicy, MonovidConfig, MAX_CODEBOOK_SIZE};
use crate::error::MonovidError;
use crate::kernels::bitpack;
use crate::types::{Tile, TileShape};

pub use corpus::TileCorpus;
pub use kmodes::{run_kmodes, KModesRun};
pub use quantizer::{nearest, quantize_frame, quantize_tiles, Quantization};

//==================================================================================
// 1. Codebook
//==================================================================================

/// An ordered set of codewords. A codeword's position is its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebook {
    shape: TileShape,
    codewords: Vec<Tile>,
}

impl Codebook {
    pub fn new(shape: TileShape, codewords: Vec<Tile>) -> Result<Self, MonovidError> {
        if codewords.is_empty() || codewords.len() > MAX_CODEBOOK_SIZE {
            return Err(MonovidError::InvalidConfig(format!(
                "A codebook needs 1..={} codewords, got {}",
                MAX_CODEBOOK_SIZE,
                codewords.len()
            )));
        }
        Ok(Codebook { shape, codewords })
    }

    pub fn len(&self) -> usize {
        self.codewords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codewords.is_empty()
    }

    pub fn shape(&self) -> TileShape {
        self.shape
    }

    pub fn codewords(&self) -> &[Tile] {
        &self.codewords
    }

    pub fn get(&self, index: usize) -> Option<Tile> {
        self.codewords.get(index).copied()
    }

    #[inline]
    pub fn nearest(&self, tile: Tile) -> Option<(usize, u32)> {
        nearest(tile, &self.codewords)
    }

    /// Codewords as one unpacked 0/1 byte per pixel, `len() x shape.len()`.
    pub fn raw_rows(&self) -> Vec<u8> {
        let tile_len = self.shape.len();
        let mut rows = Vec::with_capacity(self.codewords.len() * tile_len);
        for codeword in &self.codewords {
            rows.extend(codeword.to_pixels(tile_len));
        }
        rows
    }

    /// Inverse of [`Codebook::raw_rows`].
    pub fn from_raw_rows(shape: TileShape, rows: &[u8]) -> Result<Self, MonovidError> {
        let tile_len = shape.len();
        if tile_len == 0 || rows.len() % tile_len != 0 {
            return Err(MonovidError::ArtifactFormatError(format!(
                "Raw codebook of {} bytes is not a whole number of {}-pixel rows",
                rows.len(),
                tile_len
            )));
        }
        let codewords = rows
            .chunks_exact(tile_len)
            .map(|row| Tile::from_pixels(row.iter().copied()))
            .collect();
        Self::new(shape, codewords)
    }

    /// Codewords packed MSB-first, `shape.packed_len()` bytes each.
    pub fn packed(&self) -> Vec<u8> {
        bitpack::pack_codewords(&self.codewords, self.shape)
    }
}

//==================================================================================
// 2. Builder
//==================================================================================

/// The chosen codebook and how it was obtained.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub codebook: Codebook,
    /// Clustering cost of the winning run (0 for a degenerate codebook).
    pub cost: u64,
    /// `true` when the corpus was too small and the codebook was padded.
    pub degenerate: bool,
    /// Index of the winning initialization, if clustering ran.
    pub best_init: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct CodebookBuilder {
    shape: TileShape,
    clustering: ClusteringConfig,
}

impl CodebookBuilder {
    pub fn new(shape: TileShape, clustering: ClusteringConfig) -> Self {
        CodebookBuilder { shape, clustering }
    }

    pub fn from_config(config: &MonovidConfig) -> Self {
        Self::new(config.tile, config.clustering.clone())
    }

    /// Builds exactly `codebook_size` codewords from the corpus.
    pub fn build(&self, corpus: &TileCorpus) -> Result<BuildOutcome, MonovidError> {
        let k = self.clustering.codebook_size;
        let points = corpus.unique_tiles();

        if points.len() < k {
            return match self.clustering.corpus_policy {
                CorpusPolicy::Abort => Err(MonovidError::InsufficientCorpus {
                    unique: points.len(),
                    requested: k,
                }),
                CorpusPolicy::Degenerate => self.build_degenerate(points),
            };
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.clustering.threads)
            .build()?;

        let max_iterations = self.clustering.max_iterations;
        let base_seed = self.clustering.seed;
        let runs: Vec<Result<KModesRun, MonovidError>> = pool.install(|| {
            (0..self.clustering.n_init)
                .into_par_iter()
                .map(|init| run_kmodes(&points, k, max_iterations, base_seed.wrapping_add(init as u64)))
                .collect()
        });

        let mut best: Option<(usize, KModesRun)> = None;
        for (init, run) in runs.into_iter().enumerate() {
            let run = run?;
            log::debug!(
                "k-modes init {}: cost {} after {} iterations (converged: {})",
                init,
                run.cost,
                run.iterations,
                run.converged
            );
            log_metric!(
                "event" = "kmodes_run",
                "init" = &init,
                "cost" = &run.cost,
                "iterations" = &run.iterations
            );
            let better = match &best {
                Some((_, current)) => run.cost < current.cost,
                None => true,
            };
            if better {
                best = Some((init, run));
            }
        }

        let (best_init, run) = best.ok_or_else(|| {
            MonovidError::InvalidConfig("n_init must be at least 1".into())
        })?;
        log::info!(
            "Codebook: {} codewords from {} unique tiles, best init {} with cost {}",
            k,
            points.len(),
            best_init,
            run.cost
        );

        Ok(BuildOutcome {
            codebook: Codebook::new(self.shape, run.centroids)?,
            cost: run.cost,
            degenerate: false,
            best_init: Some(best_init),
        })
    }

    fn build_degenerate(&self, points: Vec<Tile>) -> Result<BuildOutcome, MonovidError> {
        let k = self.clustering.codebook_size;
        log::warn!(
            "Only {} unique tiles for {} codewords; emitting a padded codebook",
            points.len(),
            k
        );

        let mut codewords = points;
        let pad = codewords.last().copied().unwrap_or_default();
        codewords.resize(k, pad);

        Ok(BuildOutcome {
            codebook: Codebook::new(self.shape, codewords)?,
            cost: 0,
            degenerate: true,
            best_init: None,
        })
    }
}

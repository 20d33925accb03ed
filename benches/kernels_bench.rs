// In benches/kernels_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use monovid::codebook::{nearest, quantize_tiles, Codebook};
use monovid::kernels::rle::{self, RunLayout, DICTIONARY_COUNT_BITS, PIXEL_COUNT_BITS};
use monovid::types::{Tile, TileShape};

// --- Mock Data Generation ---

/// Codeword indices with the long runs typical of mostly static scenes.
fn generate_index_stream(len: usize, seed: u64) -> Vec<u16> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut symbols = Vec::with_capacity(len);
    while symbols.len() < len {
        let symbol: u16 = rng.random_range(0..2048);
        let run = rng.random_range(1..64usize).min(len - symbols.len());
        symbols.extend(std::iter::repeat(symbol).take(run));
    }
    symbols
}

/// One 1-bit pixel per symbol, alternating in medium runs.
fn generate_pixel_stream(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pixels = Vec::with_capacity(len);
    let mut value = 0u8;
    while pixels.len() < len {
        let run = rng.random_range(1..300usize).min(len - pixels.len());
        pixels.extend(std::iter::repeat(value).take(run));
        value ^= 1;
    }
    pixels
}

fn random_tiles(count: usize, seed: u64) -> Vec<Tile> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| Tile::from_raw(rng.random())).collect()
}

// --- Benchmark Suite ---

const FRAMES: usize = 64;
const TILES_PER_FRAME: usize = 128; // 128x64 with 8x8 tiles

fn bench_rle_kernels(c: &mut Criterion) {
    let dict_layout = RunLayout::dictionary(2048, DICTIONARY_COUNT_BITS).unwrap();
    let pixel_layout = RunLayout::pixel(PIXEL_COUNT_BITS).unwrap();
    let indices = generate_index_stream(FRAMES * TILES_PER_FRAME, 1);
    let pixels = generate_pixel_stream(FRAMES * 128 * 64, 2);
    let encoded_indices = rle::encode(&indices, dict_layout).unwrap();
    let encoded_pixels = rle::encode(&pixels, pixel_layout).unwrap();

    let mut group = c.benchmark_group("RLE");
    group.bench_function("encode_indices", |b| {
        b.iter(|| rle::encode(black_box(&indices), dict_layout).unwrap())
    });
    group.bench_function("decode_indices", |b| {
        b.iter(|| rle::decode(black_box(&encoded_indices), dict_layout).unwrap())
    });
    group.bench_function("encode_pixels", |b| {
        b.iter(|| rle::encode(black_box(&pixels), pixel_layout).unwrap())
    });
    group.bench_function("decode_pixels", |b| {
        b.iter(|| rle::decode(black_box(&encoded_pixels), pixel_layout).unwrap())
    });
    group.finish();
}

fn bench_quantizer(c: &mut Criterion) {
    let codebook = Codebook::new(TileShape::EIGHT, random_tiles(2048, 3)).unwrap();
    let tiles = random_tiles(TILES_PER_FRAME, 4);

    let mut group = c.benchmark_group("Quantizer");
    group.bench_function("nearest_2048", |b| {
        b.iter(|| nearest(black_box(tiles[0]), codebook.codewords()))
    });
    group.bench_function("quantize_frame_2048", |b| {
        b.iter(|| quantize_tiles(black_box(&tiles), &codebook).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_rle_kernels, bench_quantizer);
criterion_main!(benches);

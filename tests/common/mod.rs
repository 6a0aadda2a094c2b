//! Common test utilities for bin store integration tests.

#![allow(dead_code)]

use multival_bin::*;
use rand::prelude::*;

/// Deterministic sparse rows: each row gets up to `max_per_row` distinct bins
/// in `[1, num_bin)`, returned unsorted.
pub fn random_rows(num_rows: usize, num_bin: u32, max_per_row: usize, seed: u64) -> Vec<Vec<u32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_rows)
        .map(|_| {
            let n = rng.gen_range(0..=max_per_row);
            let mut row: Vec<u32> = (1..num_bin).collect();
            row.shuffle(&mut rng);
            row.truncate(n);
            row
        })
        .collect()
}

/// Build and finalize a CSR store from per-row bin lists.
pub fn build_multi_val<V: BinValue>(rows: &[Vec<u32>]) -> MultiValDenseBin<V> {
    let mut bin = MultiValDenseBin::<V>::new(rows.len() as DataSize);
    for (row, values) in rows.iter().enumerate() {
        for &v in values {
            bin.push(row as DataSize, v);
        }
    }
    bin.finish_load();
    bin
}

/// Reference lookup straight from the unsorted rows.
pub fn reference_lookup(row: &[u32], min_bin: u32, max_bin: u32, default_bin: u32) -> u32 {
    row.iter()
        .copied()
        .filter(|&v| v >= min_bin && v <= max_bin)
        .min()
        .unwrap_or(default_bin)
}

/// Reference histogram: stored bins only, gradients by loop position.
pub fn reference_histogram(
    rows: &[Vec<u32>],
    indices: &[DataSize],
    gradients: &[Score],
    hessians: Option<&[Score]>,
    num_bin: usize,
) -> Vec<Hist> {
    let mut out = vec![0.0; 2 * num_bin];
    for (i, &row) in indices.iter().enumerate() {
        for &bin in &rows[row as usize] {
            out[2 * bin as usize] += gradients[i] as Hist;
            out[2 * bin as usize + 1] += hessians.map_or(1.0, |h| h[i] as Hist);
        }
    }
    out
}

/// Run a numerical split over every row and return (lte, gt).
#[allow(clippy::too_many_arguments)]
pub fn split_all(
    bin: &dyn Bin,
    min_bin: u32,
    max_bin: u32,
    default_bin: u32,
    most_freq_bin: u32,
    missing_type: MissingType,
    default_left: bool,
    threshold: u32,
) -> (Vec<DataSize>, Vec<DataSize>) {
    let n = bin.num_data();
    let indices: Vec<DataSize> = (0..n).collect();
    let mut lte = vec![-1; n as usize];
    let mut gt = vec![-1; n as usize];
    let cnt = bin.split(
        min_bin,
        max_bin,
        default_bin,
        most_freq_bin,
        missing_type,
        default_left,
        threshold,
        &indices,
        n,
        &mut lte,
        &mut gt,
    ) as usize;
    lte.truncate(cnt);
    gt.truncate(n as usize - cnt);
    (lte, gt)
}

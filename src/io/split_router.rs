/*!
 * Copyright (c) 2020 Microsoft Corporation. All rights reserved.
 * Licensed under the MIT License. See LICENSE file in the project root for license information.
 */

//! Row partitioning shared by every bin store.
//!
//! Each row falls into exactly one of three buckets (missing, most frequent,
//! ordinary). The side each bucket routes to is fixed once per call; the
//! per-row work is a single windowed lookup plus a comparison.

use crate::core::types::{DataSize, MissingType};
use crate::core::utils::bitset::find_in_bitset;
use crate::io::bin::BinValue;

/// Windowed lookup of a row's stored bin.
pub(crate) trait RawBinSource<V: BinValue> {
    /// Stored bin of row `idx` inside `[min_bin, max_bin]`, or `most_freq_bin`
    /// when the row has none there
    fn raw_bin(&self, idx: DataSize, min_bin: V, max_bin: V, most_freq_bin: V) -> V;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Lte,
    Gt,
}

impl Side {
    #[inline]
    fn left_if(goes_left: bool) -> Self {
        if goes_left {
            Side::Lte
        } else {
            Side::Gt
        }
    }
}

struct Partition<'a> {
    lte: &'a mut [DataSize],
    gt: &'a mut [DataSize],
    lte_count: usize,
    gt_count: usize,
}

impl<'a> Partition<'a> {
    fn new(lte: &'a mut [DataSize], gt: &'a mut [DataSize]) -> Self {
        Self {
            lte,
            gt,
            lte_count: 0,
            gt_count: 0,
        }
    }

    #[inline]
    fn route(&mut self, side: Side, idx: DataSize) {
        match side {
            Side::Lte => {
                self.lte[self.lte_count] = idx;
                self.lte_count += 1;
            }
            Side::Gt => {
                self.gt[self.gt_count] = idx;
                self.gt_count += 1;
            }
        }
    }
}

/// Numerical threshold split.
///
/// `threshold`, `default_bin` and `most_freq_bin` are relative to the window
/// starting at `min_bin`. When `most_freq_bin` is 0 the stored ids of the
/// window are shifted by one, so all three are shifted back before comparing.
#[allow(clippy::too_many_arguments)]
pub(crate) fn split_numerical<V, S>(
    source: &S,
    min_bin: u32,
    max_bin: u32,
    default_bin: u32,
    most_freq_bin: u32,
    missing_type: MissingType,
    default_left: bool,
    threshold: u32,
    data_indices: &[DataSize],
    num_data: DataSize,
    lte_indices: &mut [DataSize],
    gt_indices: &mut [DataSize],
) -> DataSize
where
    V: BinValue,
    S: RawBinSource<V>,
{
    if num_data <= 0 {
        return 0;
    }
    let mut th = threshold.wrapping_add(min_bin);
    let mut t_default_bin = min_bin.wrapping_add(default_bin);
    let mut t_most_freq_bin = min_bin.wrapping_add(most_freq_bin);
    if most_freq_bin == 0 {
        th = th.wrapping_sub(1);
        t_default_bin = t_default_bin.wrapping_sub(1);
        t_most_freq_bin = t_most_freq_bin.wrapping_sub(1);
    }
    let th = V::from_bin(th);
    let t_default_bin = V::from_bin(t_default_bin);
    let t_most_freq_bin = V::from_bin(t_most_freq_bin);
    let minb = V::from_bin(min_bin);
    let maxb = V::from_bin(max_bin);

    let most_freq_side = Side::left_if(most_freq_bin <= threshold);
    let rows = &data_indices[..num_data as usize];
    let mut partition = Partition::new(lte_indices, gt_indices);

    let ordinary = |bin: V| if bin > th { Side::Gt } else { Side::Lte };

    match missing_type {
        MissingType::NaN => {
            let missing_side = Side::left_if(default_left);
            for &idx in rows {
                let bin = source.raw_bin(idx, minb, maxb, t_most_freq_bin);
                let side = if bin == maxb {
                    missing_side
                } else if bin == t_most_freq_bin {
                    most_freq_side
                } else {
                    ordinary(bin)
                };
                partition.route(side, idx);
            }
        }
        MissingType::Zero | MissingType::None => {
            let missing_side = Side::left_if(
                (default_left && missing_type == MissingType::Zero)
                    || (default_bin <= threshold && missing_type != MissingType::Zero),
            );
            if default_bin == most_freq_bin {
                // Missing and most frequent rows are indistinguishable here.
                for &idx in rows {
                    let bin = source.raw_bin(idx, minb, maxb, t_most_freq_bin);
                    let side = if bin == t_most_freq_bin {
                        missing_side
                    } else {
                        ordinary(bin)
                    };
                    partition.route(side, idx);
                }
            } else {
                for &idx in rows {
                    let bin = source.raw_bin(idx, minb, maxb, t_most_freq_bin);
                    let side = if bin == t_default_bin {
                        missing_side
                    } else if bin == t_most_freq_bin {
                        most_freq_side
                    } else {
                        ordinary(bin)
                    };
                    partition.route(side, idx);
                }
            }
        }
    }

    partition.lte_count as DataSize
}

/// Categorical split on bitset membership of `bin - min_bin`.
///
/// Rows without a value in the window route with the most frequent bin, whose
/// side is decided once from the bitset.
#[allow(clippy::too_many_arguments)]
pub(crate) fn split_categorical<V, S>(
    source: &S,
    min_bin: u32,
    max_bin: u32,
    most_freq_bin: u32,
    threshold: &[u32],
    num_threshold: i32,
    data_indices: &[DataSize],
    num_data: DataSize,
    lte_indices: &mut [DataSize],
    gt_indices: &mut [DataSize],
) -> DataSize
where
    V: BinValue,
    S: RawBinSource<V>,
{
    if num_data <= 0 {
        return 0;
    }
    let num_words = num_threshold.max(0) as usize;
    let most_freq_side = Side::left_if(find_in_bitset(threshold, num_words, most_freq_bin));
    let minb = V::from_bin(min_bin);
    let maxb = V::from_bin(max_bin);
    let t_most_freq_bin = V::from_bin(most_freq_bin);
    let rows = &data_indices[..num_data as usize];
    let mut partition = Partition::new(lte_indices, gt_indices);

    for &idx in rows {
        let bin = source.raw_bin(idx, minb, maxb, t_most_freq_bin).to_bin();
        let side = if bin == most_freq_bin {
            most_freq_side
        } else {
            Side::left_if(find_in_bitset(
                threshold,
                num_words,
                bin.wrapping_sub(min_bin),
            ))
        };
        partition.route(side, idx);
    }

    partition.lte_count as DataSize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::bitset::construct_bitset;

    /// One optional stored bin per row.
    struct Rows(Vec<Option<u8>>);

    impl RawBinSource<u8> for Rows {
        fn raw_bin(&self, idx: DataSize, min_bin: u8, max_bin: u8, most_freq_bin: u8) -> u8 {
            match self.0[idx as usize] {
                Some(v) if v >= min_bin && v <= max_bin => v,
                _ => most_freq_bin,
            }
        }
    }

    fn run_split(
        rows: &Rows,
        min_bin: u32,
        max_bin: u32,
        default_bin: u32,
        most_freq_bin: u32,
        missing_type: MissingType,
        default_left: bool,
        threshold: u32,
    ) -> (Vec<DataSize>, Vec<DataSize>) {
        let n = rows.0.len();
        let indices: Vec<DataSize> = (0..n as DataSize).collect();
        let mut lte = vec![-1; n];
        let mut gt = vec![-1; n];
        let cnt = split_numerical(
            rows,
            min_bin,
            max_bin,
            default_bin,
            most_freq_bin,
            missing_type,
            default_left,
            threshold,
            &indices,
            n as DataSize,
            &mut lte,
            &mut gt,
        ) as usize;
        lte.truncate(cnt);
        gt.truncate(n - cnt);
        (lte, gt)
    }

    #[test]
    fn test_nan_row_follows_default_left() {
        // window [1, 10], most frequent bin 4 sits right of threshold 3
        let rows = Rows(vec![Some(10), None, Some(2), Some(9)]);
        let (lte, gt) = run_split(&rows, 1, 10, 0, 4, MissingType::NaN, true, 3);
        assert_eq!(lte, vec![0, 2]);
        assert_eq!(gt, vec![1, 3]);

        let (lte, gt) = run_split(&rows, 1, 10, 0, 4, MissingType::NaN, false, 3);
        assert_eq!(lte, vec![2]);
        assert_eq!(gt, vec![0, 1, 3]);
    }

    #[test]
    fn test_none_missing_uses_threshold_for_default() {
        // most_freq_bin == 0 shifts everything down by one
        let rows = Rows(vec![None, Some(1), Some(3), Some(6)]);
        let (lte, gt) = run_split(&rows, 1, 8, 0, 0, MissingType::None, false, 2);
        // th = 1 + 2 - 1 = 2; default rows go left because 0 <= 2
        assert_eq!(lte, vec![0, 1]);
        assert_eq!(gt, vec![2, 3]);
    }

    #[test]
    fn test_zero_missing_separates_default_and_most_frequent() {
        // default_bin 2 -> stored 3, most frequent 5 -> stored 6, th = 1 + 3
        let rows = Rows(vec![Some(3), None, Some(6), Some(2), Some(7)]);
        let (lte, gt) = run_split(&rows, 1, 9, 2, 5, MissingType::Zero, false, 3);
        // missing (row 0) -> gt because default_left is false
        // most frequent (rows 1, 2) -> gt because 5 > 3
        assert_eq!(lte, vec![3]);
        assert_eq!(gt, vec![0, 1, 2, 4]);

        let (lte, gt) = run_split(&rows, 1, 9, 2, 5, MissingType::Zero, true, 3);
        assert_eq!(lte, vec![0, 3]);
        assert_eq!(gt, vec![1, 2, 4]);
    }

    #[test]
    fn test_zero_missing_collapses_when_default_is_most_frequent() {
        let rows = Rows(vec![None, Some(4), Some(2)]);
        // default == most frequent == 3 (stored 4): both buckets follow default_left
        let (lte, gt) = run_split(&rows, 1, 9, 3, 3, MissingType::Zero, true, 0);
        assert_eq!(lte, vec![0, 1]);
        assert_eq!(gt, vec![2]);
    }

    #[test]
    fn test_empty_split_writes_nothing() {
        let rows = Rows(vec![Some(1)]);
        let mut lte = vec![-1];
        let mut gt = vec![-1];
        let cnt = split_numerical(
            &rows,
            1,
            4,
            0,
            0,
            MissingType::None,
            false,
            1,
            &[0],
            0,
            &mut lte,
            &mut gt,
        );
        assert_eq!(cnt, 0);
        assert_eq!(lte, vec![-1]);
        assert_eq!(gt, vec![-1]);
    }

    #[test]
    fn test_categorical_membership() {
        let rows = Rows(vec![Some(5), Some(3), None, Some(2)]);
        let bits = construct_bitset(&[2, 5]);
        let indices = [0, 1, 2, 3];
        let mut lte = [0; 4];
        let mut gt = [0; 4];
        let cnt = split_categorical(
            &rows,
            0,
            9,
            7,
            &bits,
            bits.len() as i32,
            &indices,
            4,
            &mut lte,
            &mut gt,
        );
        assert_eq!(cnt, 2);
        assert_eq!(&lte[..2], &[0, 3]);
        assert_eq!(&gt[..2], &[1, 2]);
    }

    #[test]
    fn test_categorical_most_frequent_member_goes_left() {
        let rows = Rows(vec![None, Some(4)]);
        let bits = construct_bitset(&[1]);
        let mut lte = [0; 2];
        let mut gt = [0; 2];
        let cnt = split_categorical(&rows, 0, 9, 1, &bits, 1, &[0, 1], 2, &mut lte, &mut gt);
        assert_eq!(cnt, 1);
        assert_eq!(lte[0], 0);
        assert_eq!(gt[0], 1);
    }
}

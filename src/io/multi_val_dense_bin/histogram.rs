use super::MultiValDenseBin;
use crate::core::constants::HIST_ENTRY_STRIDE;
use crate::core::types::{DataSize, Hist, Score};
use crate::core::utils::prefetch::prefetch_t0;
use crate::io::bin::BinValue;

impl<V: BinValue> MultiValDenseBin<V> {
    /// Shared body of the four histogram variants.
    ///
    /// Gradients and hessians are indexed by the loop position `i`, not by the
    /// row id. Only stored bins are accumulated; rows falling back to the most
    /// frequent bin contribute nothing.
    #[inline]
    pub(super) fn construct_histogram_inner<const USE_INDICES: bool, const USE_HESSIAN: bool>(
        &self,
        data_indices: &[DataSize],
        start: DataSize,
        end: DataSize,
        ordered_gradients: &[Score],
        ordered_hessians: &[Score],
        out: &mut [Hist],
    ) {
        let pf_offset = self.config.prefetch_distance;
        let row_of = |i: usize| -> usize {
            if USE_INDICES {
                data_indices[i] as usize
            } else {
                i
            }
        };

        let (start, end) = (start.max(0) as usize, end.max(0) as usize);
        for i in start..end {
            if pf_offset > 0 && i + pf_offset < end {
                let pf_row = row_of(i + pf_offset);
                prefetch_t0(&self.row_ptr, pf_row);
                prefetch_t0(ordered_gradients, i + pf_offset);
                if USE_HESSIAN {
                    prefetch_t0(ordered_hessians, i + pf_offset);
                }
                prefetch_t0(&self.data, self.row_ptr[pf_row] as usize);
            }

            let row = row_of(i);
            let gradient = ordered_gradients[i] as Hist;
            let hessian = if USE_HESSIAN {
                ordered_hessians[i] as Hist
            } else {
                1.0
            };
            let j_start = self.row_ptr[row] as usize;
            let j_end = self.row_ptr[row + 1] as usize;
            for &bin in &self.data[j_start..j_end] {
                let ti = bin.to_bin() as usize * HIST_ENTRY_STRIDE;
                out[ti] += gradient;
                out[ti + 1] += hessian;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::config::BinStoreConfig;
    use crate::core::types::{Hist, Score};
    use crate::io::bin::Bin;
    use crate::io::multi_val_dense_bin::{MultiValDenseBinU16, MultiValDenseBinU8};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_two_rows_same_bin() {
        let mut bin = MultiValDenseBinU8::new(2);
        bin.push(0, 6);
        bin.push(1, 6);
        bin.finish_load();

        let mut out = vec![0.0 as Hist; 20];
        bin.construct_histogram(&[0, 1], 0, 2, &[1.0, 2.0], &[0.5, 0.5], &mut out);
        assert_abs_diff_eq!(out[12], 3.0);
        assert_abs_diff_eq!(out[13], 1.0);
        for (slot, &v) in out.iter().enumerate() {
            if slot != 12 && slot != 13 {
                assert_eq!(v, 0.0, "slot {}", slot);
            }
        }
    }

    #[test]
    fn test_gradients_follow_loop_position() {
        let mut bin = MultiValDenseBinU8::new(3);
        bin.push(0, 1);
        bin.push(2, 2);
        bin.push(2, 1);
        bin.finish_load();

        // rows 2 then 0, gradients already permuted to that order
        let mut out = vec![0.0; 6];
        bin.construct_histogram(&[2, 0], 0, 2, &[10.0, 1.0], &[2.0, 3.0], &mut out);
        assert_abs_diff_eq!(out[2], 11.0);
        assert_abs_diff_eq!(out[3], 5.0);
        assert_abs_diff_eq!(out[4], 10.0);
        assert_abs_diff_eq!(out[5], 2.0);
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn test_no_hessian_counts_rows() {
        let mut bin = MultiValDenseBinU8::new(4);
        for row in 0..4 {
            bin.push(row, 3);
        }
        bin.finish_load();

        let grads: Vec<Score> = vec![0.25; 4];
        let mut out = vec![0.0; 8];
        bin.construct_histogram_no_indices_no_hessian(1, 4, &grads, &mut out);
        assert_abs_diff_eq!(out[6], 0.75);
        assert_abs_diff_eq!(out[7], 3.0);

        let mut out = vec![0.0; 8];
        bin.construct_histogram_no_hessian(&[3, 1], 0, 2, &grads, &mut out);
        assert_abs_diff_eq!(out[7], 2.0);
    }

    #[test]
    fn test_accumulates_without_reset() {
        let mut bin = MultiValDenseBinU8::new(1);
        bin.push(0, 0);
        bin.finish_load();

        let mut out = vec![1.0, 1.0];
        bin.construct_histogram_no_indices(0, 1, &[2.0], &[4.0], &mut out);
        assert_abs_diff_eq!(out[0], 3.0);
        assert_abs_diff_eq!(out[1], 5.0);
    }

    #[test]
    fn test_prefetch_distance_does_not_change_result() {
        let build = |config: BinStoreConfig| {
            let mut bin = MultiValDenseBinU16::with_config(64, config);
            for row in 0..64 {
                bin.push(row, (row % 5) as u32);
                bin.push(row, 5 + (row % 3) as u32);
            }
            bin.finish_load();
            bin
        };
        let grads: Vec<Score> = (0..64).map(|i| i as Score * 0.5).collect();
        let hess: Vec<Score> = (0..64).map(|i| 1.0 + i as Score).collect();

        let mut expected = vec![0.0; 16];
        build(BinStoreConfig {
            prefetch_distance: 0,
            ..BinStoreConfig::default()
        })
        .construct_histogram_no_indices(0, 64, &grads, &hess, &mut expected);

        let mut actual = vec![0.0; 16];
        build(BinStoreConfig::default()).construct_histogram_no_indices(
            0,
            64,
            &grads,
            &hess,
            &mut actual,
        );
        assert_eq!(expected, actual);
    }
}

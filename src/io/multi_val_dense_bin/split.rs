use super::MultiValDenseBin;
use crate::core::types::{DataSize, MissingType};
use crate::io::bin::BinValue;
use crate::io::split_router::{self, RawBinSource};

impl<V: BinValue> RawBinSource<V> for MultiValDenseBin<V> {
    #[inline]
    fn raw_bin(&self, idx: DataSize, min_bin: V, max_bin: V, most_freq_bin: V) -> V {
        self.get_raw_bin(idx, min_bin, max_bin, most_freq_bin)
    }
}

impl<V: BinValue> MultiValDenseBin<V> {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn split_numerical(
        &self,
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
    ) -> DataSize {
        split_router::split_numerical(
            self,
            min_bin,
            max_bin,
            default_bin,
            most_freq_bin,
            missing_type,
            default_left,
            threshold,
            data_indices,
            num_data,
            lte_indices,
            gt_indices,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn split_by_bitset(
        &self,
        min_bin: u32,
        max_bin: u32,
        most_freq_bin: u32,
        threshold: &[u32],
        num_threshold: i32,
        data_indices: &[DataSize],
        num_data: DataSize,
        lte_indices: &mut [DataSize],
        gt_indices: &mut [DataSize],
    ) -> DataSize {
        split_router::split_categorical(
            self,
            min_bin,
            max_bin,
            most_freq_bin,
            threshold,
            num_threshold,
            data_indices,
            num_data,
            lte_indices,
            gt_indices,
        )
    }
}

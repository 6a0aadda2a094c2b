use super::MultiValDenseBin;
use crate::core::types::DataSize;
use crate::core::utils::log::Log;
use crate::io::bin::{BinIterator, BinValue};

/// Windowed row cursor over a [`MultiValDenseBin`].
///
/// Holds no position state; every [`get`](BinIterator::get) is an independent
/// lower-bound search in the row's slice.
#[derive(Debug, Clone, Copy)]
pub struct MultiValDenseBinIterator<'a, V: BinValue> {
    bin_data: &'a MultiValDenseBin<V>,
    min_bin: V,
    max_bin: V,
    most_freq_bin: V,
    offset: V,
}

impl<'a, V: BinValue> MultiValDenseBinIterator<'a, V> {
    /// Bins stored while the most frequent bin is 0 are shifted up by one, so
    /// present values are reported with `offset = 1` in that case.
    pub fn new(bin_data: &'a MultiValDenseBin<V>, min_bin: u32, max_bin: u32, most_freq_bin: u32) -> Self {
        let most_freq_bin = V::from_bin(most_freq_bin);
        let offset = if most_freq_bin == V::zero() {
            V::one()
        } else {
            V::zero()
        };
        Self {
            bin_data,
            min_bin: V::from_bin(min_bin),
            max_bin: V::from_bin(max_bin),
            most_freq_bin,
            offset,
        }
    }
}

impl<V: BinValue> BinIterator for MultiValDenseBinIterator<'_, V> {
    #[inline]
    fn get(&self, idx: DataSize) -> u32 {
        self.bin_data
            .get_bin(idx, self.min_bin, self.max_bin, self.most_freq_bin, self.offset)
    }

    /// # Panics
    ///
    /// Always. The CSR layout only answers windowed queries.
    fn raw_get(&self, _idx: DataSize) -> u32 {
        Log::fatal("No RawGet for MultiValDenseBinIterator");
    }

    fn reset(&mut self, _start_idx: DataSize) {}
}

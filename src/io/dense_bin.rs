//! Dense bin store: exactly one bin id per row.
//!
//! Used for bin groups holding a single feature, where a CSR layout would
//! only add an offsets array. Shares the capability interface and the split
//! decision table with [`MultiValDenseBin`](crate::io::multi_val_dense_bin::MultiValDenseBin),
//! so callers can switch layouts per group without changing behavior.

use crate::core::config::BinStoreConfig;
use crate::core::constants::HIST_ENTRY_STRIDE;
use crate::core::error::{BinError, Result};
use crate::core::types::*;
use crate::core::utils::binary_writer::BinaryWriter;
use crate::core::utils::byte_reader::ByteReader;
use crate::core::utils::prefetch::prefetch_t0;
use crate::io::bin::{Bin, BinIterator, BinValue, BinWidth};
use crate::io::split_router::{self, RawBinSource};

use std::any::Any;

/// Dense bin iterator for traversing dense bin data
#[derive(Debug, Clone, Copy)]
pub struct DenseBinIterator<'a, V: BinValue> {
    bin_data: &'a DenseBin<V>,
    min_bin: V,
    max_bin: V,
    most_freq_bin: V,
    offset: V,
}

impl<'a, V: BinValue> DenseBinIterator<'a, V> {
    /// Create a new dense bin iterator
    pub fn new(bin_data: &'a DenseBin<V>, min_bin: u32, max_bin: u32, most_freq_bin: u32) -> Self {
        let offset = if most_freq_bin == 0 { V::one() } else { V::zero() };
        Self {
            bin_data,
            min_bin: V::from_bin(min_bin),
            max_bin: V::from_bin(max_bin),
            most_freq_bin: V::from_bin(most_freq_bin),
            offset,
        }
    }
}

impl<V: BinValue> BinIterator for DenseBinIterator<'_, V> {
    fn get(&self, idx: DataSize) -> u32 {
        let ret = self.bin_data.data(idx);
        if ret >= self.min_bin && ret <= self.max_bin {
            ret.to_bin() - self.min_bin.to_bin() + self.offset.to_bin()
        } else {
            self.most_freq_bin.to_bin()
        }
    }

    fn raw_get(&self, idx: DataSize) -> u32 {
        self.bin_data.data(idx).to_bin()
    }

    fn reset(&mut self, _start_idx: DataSize) {}
}

/// One-value-per-row bin store generic over the stored bin id width.
#[derive(Debug, Clone)]
pub struct DenseBin<V: BinValue> {
    /// Main data storage
    data: Vec<V>,
    /// Number of data points
    num_data: DataSize,
    config: BinStoreConfig,
}

impl<V: BinValue> DenseBin<V> {
    /// Create a new dense bin with every row at bin 0
    pub fn new(num_data: DataSize) -> Self {
        Self::with_config(num_data, BinStoreConfig::default())
    }

    /// Create a new dense bin with an explicit config
    pub fn with_config(num_data: DataSize, config: BinStoreConfig) -> Self {
        let num_data = num_data.max(0);
        Self {
            data: vec![V::default(); num_data as usize],
            num_data,
            config,
        }
    }

    /// Stored bin of row `idx`
    #[inline]
    pub fn data(&self, idx: DataSize) -> V {
        self.data[idx as usize]
    }

    /// All stored bins, one per row
    pub fn values(&self) -> &[V] {
        &self.data
    }

    fn construct_histogram_inner<const USE_INDICES: bool, const USE_HESSIAN: bool>(
        &self,
        data_indices: &[DataSize],
        start: DataSize,
        end: DataSize,
        ordered_gradients: &[Score],
        ordered_hessians: &[Score],
        out: &mut [Hist],
    ) {
        let pf_offset = self.config.prefetch_distance;
        let (start, end) = (start.max(0) as usize, end.max(0) as usize);
        for i in start..end {
            if USE_INDICES && pf_offset > 0 && i + pf_offset < end {
                prefetch_t0(&self.data, data_indices[i + pf_offset] as usize);
            }
            let idx = if USE_INDICES {
                data_indices[i] as usize
            } else {
                i
            };
            let ti = self.data[idx].to_bin() as usize * HIST_ENTRY_STRIDE;
            out[ti] += ordered_gradients[i] as Hist;
            out[ti + 1] += if USE_HESSIAN {
                ordered_hessians[i] as Hist
            } else {
                1.0
            };
        }
    }
}

impl<V: BinValue> RawBinSource<V> for DenseBin<V> {
    #[inline]
    fn raw_bin(&self, idx: DataSize, min_bin: V, max_bin: V, most_freq_bin: V) -> V {
        let bin = self.data[idx as usize];
        if bin >= min_bin && bin <= max_bin {
            bin
        } else {
            most_freq_bin
        }
    }
}

impl<V: BinValue> Bin for DenseBin<V> {
    fn push(&mut self, idx: DataSize, value: u32) {
        self.data[idx as usize] = V::from_bin(value);
    }

    fn resize(&mut self, num_data: DataSize) {
        let num_data = num_data.max(0);
        if self.num_data != num_data {
            self.num_data = num_data;
            self.data.resize(num_data as usize, V::default());
        }
    }

    fn finish_load(&mut self) {}

    fn get_iterator(
        &self,
        min_bin: u32,
        max_bin: u32,
        most_freq_bin: u32,
    ) -> Box<dyn BinIterator + '_> {
        Box::new(DenseBinIterator::new(self, min_bin, max_bin, most_freq_bin))
    }

    fn construct_histogram(
        &self,
        data_indices: &[DataSize],
        start: DataSize,
        end: DataSize,
        ordered_gradients: &[Score],
        ordered_hessians: &[Score],
        out: &mut [Hist],
    ) {
        self.construct_histogram_inner::<true, true>(
            data_indices,
            start,
            end,
            ordered_gradients,
            ordered_hessians,
            out,
        );
    }

    fn construct_histogram_no_indices(
        &self,
        start: DataSize,
        end: DataSize,
        ordered_gradients: &[Score],
        ordered_hessians: &[Score],
        out: &mut [Hist],
    ) {
        self.construct_histogram_inner::<false, true>(
            &[],
            start,
            end,
            ordered_gradients,
            ordered_hessians,
            out,
        );
    }

    fn construct_histogram_no_hessian(
        &self,
        data_indices: &[DataSize],
        start: DataSize,
        end: DataSize,
        ordered_gradients: &[Score],
        out: &mut [Hist],
    ) {
        self.construct_histogram_inner::<true, false>(
            data_indices,
            start,
            end,
            ordered_gradients,
            &[],
            out,
        );
    }

    fn construct_histogram_no_indices_no_hessian(
        &self,
        start: DataSize,
        end: DataSize,
        ordered_gradients: &[Score],
        out: &mut [Hist],
    ) {
        self.construct_histogram_inner::<false, false>(
            &[],
            start,
            end,
            ordered_gradients,
            &[],
            out,
        );
    }

    fn split(
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

    fn split_categorical(
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

    fn num_data(&self) -> DataSize {
        self.num_data
    }

    fn copy_subrow(&mut self, full_bin: &dyn Bin, used_indices: &[DataSize]) -> Result<()> {
        let other = full_bin
            .as_any()
            .downcast_ref::<DenseBin<V>>()
            .ok_or_else(|| {
                BinError::invalid_operation(format!(
                    "copy_subrow expects a DenseBin<{}> source, got a {} store",
                    V::WIDTH,
                    full_bin.bin_width()
                ))
            })?;
        let mut data = Vec::with_capacity(used_indices.len());
        for &idx in used_indices {
            let i = usize::try_from(idx)
                .ok()
                .filter(|&i| i < other.data.len())
                .ok_or_else(|| BinError::index_out_of_bounds(idx.max(0) as usize, other.data.len()))?;
            data.push(other.data[i]);
        }
        self.data = data;
        self.num_data = used_indices.len() as DataSize;
        Ok(())
    }

    /// The persisted layout is the raw value array. Without a remap it must
    /// hold at least `num_data` values; with one, the remap must list exactly
    /// `num_data` rows and every listed row must exist.
    fn load_from_memory(&mut self, memory: &[u8], local_used_indices: &[DataSize]) -> Result<()> {
        let width = V::WIDTH.size_bytes();
        let mut reader = ByteReader::new(memory);
        if local_used_indices.is_empty() {
            let bytes = reader.take(self.num_data as usize * width, "bin values")?;
            self.data = V::decode_ne_bytes(bytes);
            if reader.remaining() > 0 {
                log::debug!(
                    "{} trailing bytes after DenseBin payload",
                    reader.remaining()
                );
            }
        } else {
            if local_used_indices.len() != self.num_data as usize {
                return Err(BinError::dimension_mismatch(
                    format!("{} used indices", self.num_data),
                    format!("{} used indices", local_used_indices.len()),
                ));
            }
            let mem_data = V::decode_ne_bytes(&memory[..memory.len() - memory.len() % width]);
            let mut data = Vec::with_capacity(local_used_indices.len());
            for &idx in local_used_indices {
                let i = usize::try_from(idx)
                    .ok()
                    .filter(|&i| i < mem_data.len())
                    .ok_or_else(|| BinError::index_out_of_bounds(idx.max(0) as usize, mem_data.len()))?;
                data.push(mem_data[i]);
            }
            self.data = data;
        }
        log::debug!("DenseBin<{}> loaded: {} rows", V::WIDTH, self.num_data);
        Ok(())
    }

    fn save_binary_to_file(&self, writer: &mut dyn BinaryWriter) -> Result<()> {
        let mut bytes = Vec::with_capacity(self.sizes_in_byte());
        V::extend_ne_bytes(&self.data, &mut bytes);
        let written = writer.write(&bytes)?;
        if written != bytes.len() {
            return Err(BinError::serialization(format!(
                "short write: {} of {} bytes",
                written,
                bytes.len()
            )));
        }
        Ok(())
    }

    fn sizes_in_byte(&self) -> usize {
        V::WIDTH.size_bytes() * self.data.len()
    }

    fn clone_bin(&self) -> Box<dyn Bin> {
        Box::new(self.clone())
    }

    fn bin_width(&self) -> BinWidth {
        V::WIDTH
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::binary_writer::VecBinaryWriter;
    use crate::core::utils::bitset::construct_bitset;

    fn sample_bin() -> DenseBin<u8> {
        let mut bin = DenseBin::<u8>::new(5);
        for (row, v) in [3u32, 0, 7, 7, 1].into_iter().enumerate() {
            bin.push(row as DataSize, v);
        }
        bin.finish_load();
        bin
    }

    #[test]
    fn test_dense_bin_creation() {
        let bin = DenseBin::<u16>::new(100);
        assert_eq!(bin.num_data(), 100);
        assert_eq!(bin.sizes_in_byte(), 200);
        assert_eq!(bin.bin_width(), BinWidth::U16);
    }

    #[test]
    fn test_iterator_window_and_raw_get() {
        let bin = sample_bin();
        let it = bin.get_iterator(1, 7, 2);
        assert_eq!(it.get(0), 2);
        assert_eq!(it.get(1), 2);
        assert_eq!(it.raw_get(2), 7);

        let it = bin.get_iterator(1, 7, 0);
        assert_eq!(it.get(4), 1);
    }

    #[test]
    fn test_histogram_counts_every_row() {
        let bin = sample_bin();
        let grads = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mut out = vec![0.0; 16];
        bin.construct_histogram_no_indices_no_hessian(0, 5, &grads, &mut out);
        assert_eq!(out[0], 2.0);
        assert_eq!(out[1], 1.0);
        assert_eq!(out[14], 7.0);
        assert_eq!(out[15], 2.0);

        let mut out = vec![0.0; 16];
        bin.construct_histogram(&[4, 2], 0, 2, &[1.0, 1.0], &[0.5, 0.25], &mut out);
        assert_eq!(out[2], 1.0);
        assert_eq!(out[3], 0.5);
        assert_eq!(out[15], 0.25);
    }

    #[test]
    fn test_split_matches_window_semantics() {
        let bin = sample_bin();
        let mut lte = [0; 5];
        let mut gt = [0; 5];
        // window [1, 7], most frequent 2, th = 1 + 3
        let cnt = bin.split(1, 7, 2, 2, MissingType::None, false, 3, &[0, 1, 2, 3, 4], 5, &mut lte, &mut gt);
        assert_eq!(&lte[..cnt as usize], &[0, 1, 4]);
        assert_eq!(&gt[..5 - cnt as usize], &[2, 3]);

        let bits = construct_bitset(&[7]);
        let cnt = bin.split_categorical(0, 9, 0, &bits, 1, &[0, 1, 2, 3, 4], 5, &mut lte, &mut gt);
        assert_eq!(&lte[..cnt as usize], &[2, 3]);
    }

    #[test]
    fn test_save_load_and_remap() {
        let bin = sample_bin();
        let mut writer = VecBinaryWriter::new();
        bin.save_binary_to_file(&mut writer).unwrap();
        assert_eq!(writer.len(), 5);

        let mut loaded = DenseBin::<u8>::new(5);
        loaded.load_from_memory(writer.buffer(), &[]).unwrap();
        assert_eq!(loaded.values(), bin.values());

        let mut remapped = DenseBin::<u8>::new(2);
        remapped.load_from_memory(writer.buffer(), &[4, 0]).unwrap();
        assert_eq!(remapped.values(), &[1, 3]);

        let mut short = DenseBin::<u8>::new(6);
        assert!(short.load_from_memory(writer.buffer(), &[]).is_err());
    }

    #[test]
    fn test_remap_length_must_match_num_data() {
        let bin = sample_bin();
        let mut writer = VecBinaryWriter::new();
        bin.save_binary_to_file(&mut writer).unwrap();

        let mut loaded = DenseBin::<u8>::new(5);
        assert!(matches!(
            loaded.load_from_memory(writer.buffer(), &[0]),
            Err(BinError::DimensionMismatch { .. })
        ));
        assert_eq!(loaded.num_data(), 5);
    }

    #[test]
    fn test_load_ignores_trailing_bytes() {
        let bin = sample_bin();
        let mut writer = VecBinaryWriter::new();
        bin.save_binary_to_file(&mut writer).unwrap();
        let mut bytes = writer.into_buffer();
        bytes.extend_from_slice(&[9, 9, 9]);

        let mut loaded = DenseBin::<u8>::new(5);
        loaded.load_from_memory(&bytes, &[]).unwrap();
        assert_eq!(loaded.values(), bin.values());
    }

    #[derive(Default)]
    struct TruncatingWriter {
        written: usize,
    }

    impl BinaryWriter for TruncatingWriter {
        fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
            let n = data.len().saturating_sub(1);
            self.written += n;
            Ok(n)
        }

        fn bytes_written(&self) -> usize {
            self.written
        }
    }

    #[test]
    fn test_short_write_is_an_error() {
        let bin = sample_bin();
        let mut writer = TruncatingWriter::default();
        assert!(matches!(
            bin.save_binary_to_file(&mut writer),
            Err(BinError::Serialization { .. })
        ));
    }

    #[test]
    fn test_copy_subrow() {
        let bin = sample_bin();
        let mut sub = DenseBin::<u8>::new(0);
        sub.copy_subrow(&bin, &[2, 2, 4]).unwrap();
        assert_eq!(sub.num_data(), 3);
        assert_eq!(sub.values(), &[7, 7, 1]);
        assert!(sub.copy_subrow(&bin, &[5]).is_err());
    }
}

/*!
 * Copyright (c) 2020 Microsoft Corporation. All rights reserved.
 * Licensed under the MIT License. See LICENSE file in the project root for license information.
 */

//! CSR bin store for multi-valued bin groups.
//!
//! Every row keeps only the bin ids that differ from the group's most
//! frequent bin, sorted ascending:
//!
//! ```text
//! row_ptr: [0, 2, 2, 5]          (num_data + 1 offsets)
//! data:    [3, 9 | 1, 4, 7]      (row 0 | row 1 empty | row 2)
//! ```
//!
//! Rows are staged unsorted through [`MultiValDenseBin::push`] and compacted
//! once by [`finish_load`](Bin::finish_load). Afterwards the store is
//! read-only and every query is a lower-bound search inside one row slice.

mod histogram;
mod iterator;
mod split;

pub use iterator::MultiValDenseBinIterator;

use crate::core::config::BinStoreConfig;
use crate::core::constants::ROW_INDEX_BYTES;
use crate::core::error::{BinError, Result};
use crate::core::types::*;
use crate::core::utils::binary_writer::BinaryWriter;
use crate::core::utils::byte_reader::ByteReader;
use crate::core::utils::log::Log;
use crate::io::bin::{Bin, BinIterator, BinValue, BinWidth};

use rayon::prelude::*;
use std::any::Any;
use std::ops::Range;

/// CSR bin store generic over the stored bin id width.
#[derive(Debug, Clone)]
pub struct MultiValDenseBin<V: BinValue> {
    num_data: DataSize,
    row_ptr: Vec<DataSize>,
    data: Vec<V>,
    push_buf: Vec<Vec<V>>,
    finished: bool,
    config: BinStoreConfig,
}

impl<V: BinValue> MultiValDenseBin<V> {
    /// Create an empty store for `num_data` rows with the default config
    pub fn new(num_data: DataSize) -> Self {
        Self::with_config(num_data, BinStoreConfig::default())
    }

    /// Create an empty store for `num_data` rows
    pub fn with_config(num_data: DataSize, config: BinStoreConfig) -> Self {
        let rows = num_data.max(0) as usize;
        Self {
            num_data: num_data.max(0),
            row_ptr: vec![0; rows + 1],
            data: Vec::new(),
            push_buf: vec![Vec::new(); rows],
            finished: false,
            config,
        }
    }

    /// Load a persisted store, taking the row count from its header.
    pub fn from_bytes(memory: &[u8], config: BinStoreConfig) -> Result<Self> {
        let num_data = ByteReader::new(memory).read_i32("row count")?;
        if num_data < 0 {
            return Err(BinError::serialization(format!(
                "negative row count {} in header",
                num_data
            )));
        }
        let mut bin = Self {
            num_data,
            row_ptr: Vec::new(),
            data: Vec::new(),
            push_buf: Vec::new(),
            finished: false,
            config,
        };
        bin.load_from_memory(memory, &[])?;
        Ok(bin)
    }

    /// Build a store holding `used_indices` rows of `source`, in that order.
    pub fn copy_subset(source: &Self, used_indices: &[DataSize]) -> Result<Self> {
        let mut bin = Self {
            num_data: used_indices.len() as DataSize,
            row_ptr: Vec::new(),
            data: Vec::new(),
            push_buf: Vec::new(),
            finished: true,
            config: source.config.clone(),
        };
        bin.gather_from(&source.row_ptr, &source.data, used_indices)?;
        Ok(bin)
    }

    /// Stage every row in parallel.
    ///
    /// `producer` is called once per row with an empty scratch buffer to fill
    /// with that row's bin ids. Each rayon task owns exactly one row.
    pub fn push_rows_parallel<F>(&mut self, producer: F) -> Result<()>
    where
        F: Fn(DataSize, &mut Vec<u32>) + Send + Sync,
    {
        if self.finished {
            return Err(BinError::invalid_operation(
                "push_rows_parallel called after finish_load",
            ));
        }
        log::debug!(
            "staging {} rows on {} threads",
            self.num_data,
            self.config.effective_num_threads()
        );
        let push_buf = &mut self.push_buf;
        let mut fill = move || {
            push_buf
                .par_iter_mut()
                .enumerate()
                .for_each_init(Vec::new, |scratch, (row, buf)| {
                    scratch.clear();
                    producer(row as DataSize, scratch);
                    buf.extend(scratch.iter().map(|&v| V::from_bin(v)));
                });
        };
        match self.config.thread_pool()? {
            Some(pool) => pool.install(fill),
            None => fill(),
        }
        Ok(())
    }

    #[inline]
    fn row_range(&self, idx: DataSize) -> Range<usize> {
        let i = idx as usize;
        self.row_ptr[i] as usize..self.row_ptr[i + 1] as usize
    }

    /// Sorted bin ids stored for row `row`
    #[inline]
    pub fn row_values(&self, row: DataSize) -> &[V] {
        &self.data[self.row_range(row)]
    }

    /// Smallest stored bin of row `idx` inside `[min_bin, max_bin]`
    #[inline]
    fn find_in_window(&self, idx: DataSize, min_bin: V, max_bin: V) -> Option<V> {
        let row = self.row_values(idx);
        let pos = row.partition_point(|&v| v < min_bin);
        match row.get(pos) {
            Some(&v) if v <= max_bin => Some(v),
            _ => None,
        }
    }

    /// Stored bin of row `idx` inside `[min_bin, max_bin]`, or `most_freq_bin`
    #[inline]
    pub fn get_raw_bin(&self, idx: DataSize, min_bin: V, max_bin: V, most_freq_bin: V) -> V {
        self.find_in_window(idx, min_bin, max_bin)
            .unwrap_or(most_freq_bin)
    }

    /// Window-relative bin of row `idx`, shifted by `offset`, or
    /// `most_freq_bin` when the row has nothing in the window.
    #[inline]
    pub fn get_bin(
        &self,
        idx: DataSize,
        min_bin: V,
        max_bin: V,
        most_freq_bin: V,
        offset: V,
    ) -> u32 {
        match self.find_in_window(idx, min_bin, max_bin) {
            Some(v) => v.to_bin() - min_bin.to_bin() + offset.to_bin(),
            None => most_freq_bin.to_bin(),
        }
    }

    /// Point lookup: the smallest stored value of `row` inside
    /// `[min_bin, max_bin]`, or `default_bin` when there is none.
    ///
    /// ```rust
    /// use multival_bin::io::bin::Bin;
    /// use multival_bin::io::multi_val_dense_bin::MultiValDenseBin;
    ///
    /// let mut bin = MultiValDenseBin::<u8>::new(1);
    /// for v in [9, 3, 7] {
    ///     bin.push(0, v);
    /// }
    /// bin.finish_load();
    /// assert_eq!(bin.lookup(0, 5, 8, 0), 7);
    /// assert_eq!(bin.lookup(0, 10, 20, 0), 0);
    /// ```
    pub fn lookup(&self, row: DataSize, min_bin: u32, max_bin: u32, default_bin: u32) -> u32 {
        self.find_in_window(row, V::from_bin(min_bin), V::from_bin(max_bin))
            .map_or(default_bin, BinValue::to_bin)
    }

    /// Row offsets into [`values`](Self::values), `num_data + 1` entries
    pub fn row_offsets(&self) -> &[DataSize] {
        &self.row_ptr
    }

    /// Flat stored bin ids of all rows
    pub fn values(&self) -> &[V] {
        &self.data
    }

    /// Total number of stored bin ids
    pub fn num_values(&self) -> usize {
        self.data.len()
    }

    /// Average stored bin ids per row
    pub fn num_element_per_row(&self) -> f64 {
        if self.num_data == 0 {
            0.0
        } else {
            self.data.len() as f64 / self.num_data as f64
        }
    }

    /// Whether the store has been finalized
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Configuration the store was created with
    pub fn config(&self) -> &BinStoreConfig {
        &self.config
    }

    /// Replace the CSR arrays with the selected rows of another CSR layout.
    fn gather_from(
        &mut self,
        src_row_ptr: &[DataSize],
        src_data: &[V],
        used_indices: &[DataSize],
    ) -> Result<()> {
        let src_rows = src_row_ptr.len().saturating_sub(1);
        let mut row_ptr = Vec::with_capacity(used_indices.len() + 1);
        let mut data = Vec::new();
        row_ptr.push(0);
        for &idx in used_indices {
            let i = usize::try_from(idx)
                .ok()
                .filter(|&i| i < src_rows)
                .ok_or_else(|| BinError::index_out_of_bounds(idx.max(0) as usize, src_rows))?;
            let (start, end) = (src_row_ptr[i], src_row_ptr[i + 1]);
            if start < 0 || start > end || end as usize > src_data.len() {
                return Err(BinError::serialization(format!(
                    "invalid offsets [{}, {}) for row {} over {} values",
                    start,
                    end,
                    i,
                    src_data.len()
                )));
            }
            data.extend_from_slice(&src_data[start as usize..end as usize]);
            row_ptr.push(data.len() as DataSize);
        }
        self.row_ptr = row_ptr;
        self.data = data;
        self.push_buf = Vec::new();
        self.finished = true;
        Ok(())
    }
}

/// Full offset check: starts at zero, never decreases, ends at `num_values`.
fn validate_row_offsets(row_ptr: &[DataSize], num_values: usize) -> Result<()> {
    if row_ptr.first().copied() != Some(0) {
        return Err(BinError::serialization("row offsets must start at 0"));
    }
    if let Some(row) = row_ptr.windows(2).position(|w| w[0] > w[1]) {
        return Err(BinError::serialization(format!(
            "row offsets decrease at row {}",
            row
        )));
    }
    let last = row_ptr.last().copied().unwrap_or(0);
    if last as usize != num_values {
        return Err(BinError::dimension_mismatch(
            format!("{} values", last),
            format!("{} values", num_values),
        ));
    }
    Ok(())
}

impl<V: BinValue> Bin for MultiValDenseBin<V> {
    fn push(&mut self, idx: DataSize, value: u32) {
        if self.finished {
            Log::fatal("Cannot push into MultiValDenseBin after finish_load");
        }
        self.push_buf[idx as usize].push(V::from_bin(value));
    }

    fn resize(&mut self, num_data: DataSize) {
        let num_data = num_data.max(0);
        if self.num_data != num_data {
            self.num_data = num_data;
            self.row_ptr = vec![0; num_data as usize + 1];
            if !self.finished {
                self.push_buf.resize_with(num_data as usize, Vec::new);
            }
        }
    }

    fn finish_load(&mut self) {
        if self.finished {
            log::warn!("finish_load called twice on MultiValDenseBin, ignoring");
            return;
        }
        let total: usize = self.push_buf.iter().map(Vec::len).sum();
        let mut row_ptr = Vec::with_capacity(self.push_buf.len() + 1);
        let mut data = Vec::with_capacity(total);
        row_ptr.push(0);
        for buf in self.push_buf.iter_mut() {
            buf.sort_unstable();
            data.extend_from_slice(buf);
            row_ptr.push(data.len() as DataSize);
        }
        self.row_ptr = row_ptr;
        self.data = data;
        self.push_buf = Vec::new();
        self.finished = true;
        log::debug!(
            "MultiValDenseBin<{}> finalized: {} rows, {} values, {:.3} per row",
            V::WIDTH,
            self.num_data,
            self.data.len(),
            self.num_element_per_row()
        );
    }

    fn get_iterator(
        &self,
        min_bin: u32,
        max_bin: u32,
        most_freq_bin: u32,
    ) -> Box<dyn BinIterator + '_> {
        Box::new(MultiValDenseBinIterator::new(self, min_bin, max_bin, most_freq_bin))
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
        self.split_numerical(
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
        self.split_by_bitset(
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
            .downcast_ref::<MultiValDenseBin<V>>()
            .ok_or_else(|| {
                BinError::invalid_operation(format!(
                    "copy_subrow expects a MultiValDenseBin<{}> source, got a {} store",
                    V::WIDTH,
                    full_bin.bin_width()
                ))
            })?;
        self.gather_from(&other.row_ptr, &other.data, used_indices)?;
        self.num_data = used_indices.len() as DataSize;
        Ok(())
    }

    fn load_from_memory(&mut self, memory: &[u8], local_used_indices: &[DataSize]) -> Result<()> {
        let mut reader = ByteReader::new(memory);
        let mem_num_data = reader.read_i32("row count")?;
        if mem_num_data < 0 {
            return Err(BinError::serialization(format!(
                "negative row count {} in header",
                mem_num_data
            )));
        }
        let mem_row_ptr = reader.read_i32_slice(mem_num_data as usize + 1, "row offsets")?;
        let num_values = mem_row_ptr[mem_num_data as usize];
        if num_values < 0 {
            return Err(BinError::serialization(format!(
                "negative value count {} in row offsets",
                num_values
            )));
        }
        let value_bytes = reader.take(num_values as usize * V::WIDTH.size_bytes(), "bin values")?;
        let mem_data = V::decode_ne_bytes(value_bytes);

        if self.config.validate_offsets {
            validate_row_offsets(&mem_row_ptr, mem_data.len())?;
        }

        if local_used_indices.is_empty() {
            if mem_num_data != self.num_data {
                return Err(BinError::dimension_mismatch(
                    format!("{} rows", self.num_data),
                    format!("{} rows", mem_num_data),
                ));
            }
            self.row_ptr = mem_row_ptr;
            self.data = mem_data;
            self.push_buf = Vec::new();
            self.finished = true;
        } else {
            if local_used_indices.len() != self.num_data as usize {
                return Err(BinError::dimension_mismatch(
                    format!("{} used indices", self.num_data),
                    format!("{} used indices", local_used_indices.len()),
                ));
            }
            self.gather_from(&mem_row_ptr, &mem_data, local_used_indices)?;
        }

        if reader.remaining() > 0 {
            log::debug!(
                "{} trailing bytes after MultiValDenseBin payload",
                reader.remaining()
            );
        }
        log::debug!(
            "MultiValDenseBin<{}> loaded: {} rows, {} values",
            V::WIDTH,
            self.num_data,
            self.data.len()
        );
        Ok(())
    }

    fn save_binary_to_file(&self, writer: &mut dyn BinaryWriter) -> Result<()> {
        let mut bytes = Vec::with_capacity(self.sizes_in_byte());
        bytes.extend_from_slice(&self.num_data.to_ne_bytes());
        for offset in &self.row_ptr {
            bytes.extend_from_slice(&offset.to_ne_bytes());
        }
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
        ROW_INDEX_BYTES * (self.num_data as usize + 2) + V::WIDTH.size_bytes() * self.data.len()
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

/// CSR store with 1-byte bin ids (up to 256 bins)
pub type MultiValDenseBinU8 = MultiValDenseBin<u8>;

/// CSR store with 2-byte bin ids (up to 65536 bins)
pub type MultiValDenseBinU16 = MultiValDenseBin<u16>;

/// CSR store with 4-byte bin ids
pub type MultiValDenseBinU32 = MultiValDenseBin<u32>;

//! Capability interface shared by the bin stores, plus the bin value codec.
//!
//! Two store variants implement [`Bin`]:
//!
//! - [`MultiValDenseBin`]: CSR layout, any number of non-default bin ids per
//!   row, used for multi-valued bin groups
//! - [`DenseBin`]: exactly one bin id per row
//!
//! The storage width (1, 2 or 4 bytes per bin id) is a type parameter chosen
//! once per bin group through [`BinWidth::for_num_bins`], so the inner loops
//! are monomorphic per width.

use crate::core::config::BinStoreConfig;
use crate::core::constants::{MAX_BINS_U16, MAX_BINS_U8};
use crate::core::error::Result;
use crate::core::types::*;
use crate::core::utils::binary_writer::BinaryWriter;
use crate::io::dense_bin::DenseBin;
use crate::io::multi_val_dense_bin::MultiValDenseBin;

use num_traits::{PrimInt, Unsigned};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Fixed storage width of a bin id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinWidth {
    /// 1-byte bin ids (up to 256 bins)
    U8,
    /// 2-byte bin ids (up to 65536 bins)
    U16,
    /// 4-byte bin ids
    U32,
}

impl BinWidth {
    /// Narrowest width able to hold every bin id in `[0, num_bin)`.
    pub fn for_num_bins(num_bin: usize) -> Self {
        if num_bin <= MAX_BINS_U8 {
            BinWidth::U8
        } else if num_bin <= MAX_BINS_U16 {
            BinWidth::U16
        } else {
            BinWidth::U32
        }
    }

    /// Size in bytes of one stored bin id.
    pub const fn size_bytes(self) -> usize {
        match self {
            BinWidth::U8 => 1,
            BinWidth::U16 => 2,
            BinWidth::U32 => 4,
        }
    }
}

impl fmt::Display for BinWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinWidth::U8 => write!(f, "u8"),
            BinWidth::U16 => write!(f, "u16"),
            BinWidth::U32 => write!(f, "u32"),
        }
    }
}

/// Unsigned integer type used to store bin ids.
pub trait BinValue:
    PrimInt + Unsigned + Default + fmt::Debug + Send + Sync + 'static
{
    /// Width tag of this type
    const WIDTH: BinWidth;

    /// Truncating conversion from a public bin id
    fn from_bin(value: u32) -> Self;

    /// Widening conversion to a public bin id
    fn to_bin(self) -> u32;

    /// Append the native-endian encoding of `values` to `out`
    fn extend_ne_bytes(values: &[Self], out: &mut Vec<u8>);

    /// Decode native-endian values; `bytes.len()` must be a multiple of the width
    fn decode_ne_bytes(bytes: &[u8]) -> Vec<Self>;
}

macro_rules! impl_bin_value {
    ($t:ty, $width:expr) => {
        impl BinValue for $t {
            const WIDTH: BinWidth = $width;

            #[inline(always)]
            fn from_bin(value: u32) -> Self {
                value as $t
            }

            #[inline(always)]
            fn to_bin(self) -> u32 {
                self as u32
            }

            fn extend_ne_bytes(values: &[Self], out: &mut Vec<u8>) {
                out.reserve(values.len() * std::mem::size_of::<$t>());
                for v in values {
                    out.extend_from_slice(&v.to_ne_bytes());
                }
            }

            fn decode_ne_bytes(bytes: &[u8]) -> Vec<Self> {
                bytes
                    .chunks_exact(std::mem::size_of::<$t>())
                    .map(|chunk| {
                        let mut raw = [0u8; std::mem::size_of::<$t>()];
                        raw.copy_from_slice(chunk);
                        <$t>::from_ne_bytes(raw)
                    })
                    .collect()
            }
        }
    };
}

impl_bin_value!(u8, BinWidth::U8);
impl_bin_value!(u16, BinWidth::U16);
impl_bin_value!(u32, BinWidth::U32);

/// Per-row cursor over a bin store restricted to one feature's bin window.
pub trait BinIterator {
    /// Window-relative bin of row `idx`, or the most frequent bin when the row
    /// has no value inside the window
    fn get(&self, idx: DataSize) -> u32;

    /// Stored bin of row `idx` without windowing.
    ///
    /// Stores that cannot serve this efficiently fail fatally instead of
    /// returning a wrong value.
    fn raw_get(&self, idx: DataSize) -> u32;

    /// Reset the iterator to a given starting position
    fn reset(&mut self, start_idx: DataSize);
}

/// Capability interface of a bin store.
///
/// Lifecycle: construct with a row count, [`push`](Bin::push) values, call
/// [`finish_load`](Bin::finish_load) exactly once, then query. Queries before
/// `finish_load` are a contract violation. After `finish_load` the store is
/// read-only and can be shared across threads freely.
#[allow(clippy::too_many_arguments)]
pub trait Bin: Send + Sync + fmt::Debug {
    /// Stage `value` for row `idx`
    fn push(&mut self, idx: DataSize, value: u32);

    /// Change the row count; only meaningful before data is loaded
    fn resize(&mut self, num_data: DataSize);

    /// Finalize staged data into the queryable layout
    fn finish_load(&mut self);

    /// Iterator over the bin window `[min_bin, max_bin]`
    fn get_iterator(
        &self,
        min_bin: u32,
        max_bin: u32,
        most_freq_bin: u32,
    ) -> Box<dyn BinIterator + '_>;

    /// Accumulate gradients and hessians of rows `data_indices[start..end]`
    fn construct_histogram(
        &self,
        data_indices: &[DataSize],
        start: DataSize,
        end: DataSize,
        ordered_gradients: &[Score],
        ordered_hessians: &[Score],
        out: &mut [Hist],
    );

    /// Accumulate gradients and hessians of rows `start..end`
    fn construct_histogram_no_indices(
        &self,
        start: DataSize,
        end: DataSize,
        ordered_gradients: &[Score],
        ordered_hessians: &[Score],
        out: &mut [Hist],
    );

    /// Accumulate gradients of rows `data_indices[start..end]`, counting each
    /// row with hessian 1
    fn construct_histogram_no_hessian(
        &self,
        data_indices: &[DataSize],
        start: DataSize,
        end: DataSize,
        ordered_gradients: &[Score],
        out: &mut [Hist],
    );

    /// Accumulate gradients of rows `start..end`, counting each row with
    /// hessian 1
    fn construct_histogram_no_indices_no_hessian(
        &self,
        start: DataSize,
        end: DataSize,
        ordered_gradients: &[Score],
        out: &mut [Hist],
    );

    /// Partition `data_indices[..num_data]` by a numerical threshold.
    ///
    /// Returns the number of rows written to `lte_indices`.
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
    ) -> DataSize;

    /// Partition `data_indices[..num_data]` by categorical bitset membership.
    ///
    /// Returns the number of rows written to `lte_indices`.
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
    ) -> DataSize;

    /// Number of rows
    fn num_data(&self) -> DataSize;

    /// Replace contents with the listed rows of `full_bin`, which must be the
    /// same store type and width
    fn copy_subrow(&mut self, full_bin: &dyn Bin, used_indices: &[DataSize]) -> Result<()>;

    /// Load the persisted layout, optionally keeping only `local_used_indices`
    fn load_from_memory(&mut self, memory: &[u8], local_used_indices: &[DataSize]) -> Result<()>;

    /// Write the persisted layout
    fn save_binary_to_file(&self, writer: &mut dyn BinaryWriter) -> Result<()>;

    /// Size in bytes of the persisted layout
    fn sizes_in_byte(&self) -> usize;

    /// Deep copy
    fn clone_bin(&self) -> Box<dyn Bin>;

    /// Storage width of bin ids
    fn bin_width(&self) -> BinWidth;

    /// Downcasting hook used by [`copy_subrow`](Bin::copy_subrow)
    fn as_any(&self) -> &dyn Any;
}

/// Create a CSR multi-value bin store with the narrowest width for `num_bin`.
pub fn create_multi_val_bin(
    num_data: DataSize,
    num_bin: usize,
    config: &BinStoreConfig,
) -> Box<dyn Bin> {
    match BinWidth::for_num_bins(num_bin) {
        BinWidth::U8 => Box::new(MultiValDenseBin::<u8>::with_config(num_data, config.clone())),
        BinWidth::U16 => Box::new(MultiValDenseBin::<u16>::with_config(num_data, config.clone())),
        BinWidth::U32 => Box::new(MultiValDenseBin::<u32>::with_config(num_data, config.clone())),
    }
}

/// Create a one-value-per-row bin store with the narrowest width for `num_bin`.
pub fn create_dense_bin(num_data: DataSize, num_bin: usize, config: &BinStoreConfig) -> Box<dyn Bin> {
    match BinWidth::for_num_bins(num_bin) {
        BinWidth::U8 => Box::new(DenseBin::<u8>::with_config(num_data, config.clone())),
        BinWidth::U16 => Box::new(DenseBin::<u16>::with_config(num_data, config.clone())),
        BinWidth::U32 => Box::new(DenseBin::<u32>::with_config(num_data, config.clone())),
    }
}

/// Create the store variant a bin group needs.
pub fn create_bin(
    num_data: DataSize,
    num_bin: usize,
    is_multi_val: bool,
    config: &BinStoreConfig,
) -> Box<dyn Bin> {
    if is_multi_val {
        create_multi_val_bin(num_data, num_bin, config)
    } else {
        create_dense_bin(num_data, num_bin, config)
    }
}

//! Constants controlling bin layout, histogram addressing and prefetching.

use crate::core::types::DataSize;

/// Number of rows to look ahead when prefetching CSR slices, gradients and
/// hessians during histogram construction.
pub const DEFAULT_PREFETCH_SIZE: usize = 16;

/// Each bin owns two histogram slots: gradient at `2 * bin`, hessian at
/// `2 * bin + 1`.
pub const HIST_ENTRY_STRIDE: usize = 2;

/// Bits per bitset word used by categorical thresholds.
pub const BITSET_WORD_BITS: u32 = 32;

/// Largest bin count representable by 1-byte bin ids.
pub const MAX_BINS_U8: usize = 1 << 8;

/// Largest bin count representable by 2-byte bin ids.
pub const MAX_BINS_U16: usize = 1 << 16;

/// Size in bytes of the row count header and of every row offset.
pub const ROW_INDEX_BYTES: usize = std::mem::size_of::<DataSize>();

/// Library version string.
pub const MULTIVAL_BIN_VERSION: &str = env!("CARGO_PKG_VERSION");

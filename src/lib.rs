//! # multival-bin
//!
//! Bin storage for histogram-based gradient boosting.
//!
//! Training rows are discretized into bin ids per bin group. Groups whose rows
//! carry several non-default bins (one-hot expanded categoricals, bundled
//! sparse features) are kept in a compressed sparse row layout that stores
//! only the bins differing from the group's most frequent bin. On top of that
//! layout the crate provides the two hot operations of tree growth:
//!
//! - histogram construction: per-bin gradient and hessian sums over a row
//!   subset
//! - split routing: partitioning row indices into left and right children by
//!   a numerical threshold (with missing-value handling) or a categorical
//!   bitset
//!
//! ## Quick Start
//!
//! ```rust
//! use multival_bin::{create_multi_val_bin, Bin, BinStoreConfig, MissingType};
//!
//! # fn main() -> multival_bin::Result<()> {
//! let config = BinStoreConfig::default();
//! let mut bin = create_multi_val_bin(3, 16, &config);
//!
//! // producers push (row, bin) pairs in any order
//! bin.push(0, 9);
//! bin.push(0, 3);
//! bin.push(2, 6);
//! bin.finish_load();
//!
//! // histogram over all rows
//! let mut hist = vec![0.0; 2 * 16];
//! bin.construct_histogram_no_indices(0, 3, &[1.0, 1.0, 1.0], &[0.5, 0.5, 0.5], &mut hist);
//! assert_eq!(hist[2 * 6], 1.0);
//!
//! // split rows on the window [1, 10]
//! let mut lte = vec![0; 3];
//! let mut gt = vec![0; 3];
//! let left = bin.split(1, 10, 0, 0, MissingType::None, false, 4, &[0, 1, 2], 3, &mut lte, &mut gt);
//! assert_eq!(left, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: types, constants, error handling, configuration and utilities
//! - [`io`]: the bin store trait, the CSR store and the dense store
//!
//! ## Concurrency
//!
//! Stores are built single-threaded or through
//! [`MultiValDenseBin::push_rows_parallel`], finalized once, and are read-only
//! afterwards. Histogram construction and split routing take `&self` and can
//! run from many threads at once as long as every thread writes into its own
//! output buffers.

#![doc(html_root_url = "https://docs.rs/multival-bin/")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Bin stores
pub mod io;

// Re-export core functionality for convenience
pub use crate::core::{
    config::BinStoreConfig,
    error::{BinError, Result},
    types::*,
    utils::log::init_logging,
};

// Re-export bin stores
pub use crate::io::{
    bin::{create_bin, create_dense_bin, create_multi_val_bin, Bin, BinIterator, BinValue, BinWidth},
    dense_bin::DenseBin,
    multi_val_dense_bin::{
        MultiValDenseBin, MultiValDenseBinIterator, MultiValDenseBinU16, MultiValDenseBinU32,
        MultiValDenseBinU8,
    },
};

// Version information
pub use crate::core::constants::MULTIVAL_BIN_VERSION as VERSION;

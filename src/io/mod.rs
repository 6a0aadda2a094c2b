//! Bin stores and their shared capability interface.
//!
//! [`bin`] defines the [`Bin`](bin::Bin) / [`BinIterator`](bin::BinIterator)
//! traits and the storage-width codec; the store variants live in
//! [`multi_val_dense_bin`] (CSR, many bins per row) and [`dense_bin`] (one bin
//! per row).

pub mod bin;
pub mod dense_bin;
pub mod multi_val_dense_bin;
pub(crate) mod split_router;

/// Bitset helpers for categorical thresholds
pub mod bitset;
/// Binary writer utilities
pub mod binary_writer;
/// Bounds-checked reader for persisted buffers
pub mod byte_reader;
/// Fatal error and logger initialisation helpers
pub mod log;
/// Software prefetch hint
pub mod prefetch;

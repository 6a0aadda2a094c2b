//! Core infrastructure shared by every bin store.
//!
//! # Organization
//!
//! - [`types`]: Fundamental data types and enumerations
//! - [`constants`]: Layout constants and defaults
//! - [`error`]: Error type and `Result` alias
//! - [`config`]: Runtime configuration, loadable from TOML or JSON
//! - [`utils`]: Bitsets, binary writer/reader and logging helpers
//!
//! ```rust
//! use multival_bin::core::{
//!     config::BinStoreConfig,
//!     error::Result,
//!     types::{DataSize, MissingType},
//! };
//!
//! # fn main() -> Result<()> {
//! let config = BinStoreConfig::default();
//! config.validate()?;
//! let rows: DataSize = 128;
//! assert_eq!(MissingType::default(), MissingType::None);
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
pub mod utils;

pub use config::BinStoreConfig;
pub use constants::*;
pub use error::{BinError, Result};
pub use types::*;

//! Print a JSON summary of a persisted CSR bin store.
//!
//! ```text
//! bin_store_inspect <file> [--width u8|u16|u32] [--config <file.toml|file.json>]
//! ```

use anyhow::{bail, Context, Result};
use multival_bin::{init_logging, BinStoreConfig, BinValue, BinWidth, MultiValDenseBin};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct StoreSummary {
    width: BinWidth,
    num_data: i32,
    num_values: usize,
    avg_values_per_row: f64,
    max_values_per_row: usize,
    max_bin: Option<u32>,
    size_bytes: usize,
}

/// Inspected files are untrusted, so offsets are always fully validated.
fn summarize<V: BinValue>(bytes: &[u8], config: BinStoreConfig) -> Result<StoreSummary> {
    let config = BinStoreConfig {
        validate_offsets: true,
        ..config
    };
    let bin = MultiValDenseBin::<V>::from_bytes(bytes, config)
        .with_context(|| format!("failed to load {} store", V::WIDTH))?;
    let max_values_per_row = bin
        .row_offsets()
        .windows(2)
        .filter_map(|w| w[1].checked_sub(w[0]).and_then(|n| usize::try_from(n).ok()))
        .max()
        .unwrap_or(0);
    Ok(StoreSummary {
        width: V::WIDTH,
        num_data: multival_bin::Bin::num_data(&bin),
        num_values: bin.num_values(),
        avg_values_per_row: bin.num_element_per_row(),
        max_values_per_row,
        max_bin: bin.values().iter().map(|v| v.to_bin()).max(),
        size_bytes: multival_bin::Bin::sizes_in_byte(&bin),
    })
}

fn print_help() {
    println!("usage: bin_store_inspect <file> [--width u8|u16|u32] [--config <file>]");
}

fn main() -> Result<()> {
    init_logging();

    let mut path: Option<PathBuf> = None;
    let mut width = BinWidth::U8;
    let mut config = BinStoreConfig::default();

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--width" => {
                let v = it.next().context("--width requires a value")?;
                width = match v.as_str() {
                    "u8" => BinWidth::U8,
                    "u16" => BinWidth::U16,
                    "u32" => BinWidth::U32,
                    _ => bail!("unknown width: {v} (expected u8|u16|u32)"),
                };
            }
            "--config" => {
                let v = it.next().context("--config requires a path")?;
                config = BinStoreConfig::load_from_file(&v)
                    .with_context(|| format!("failed to load config {v}"))?;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other if other.starts_with("--") => bail!("unknown arg: {other}"),
            other => {
                if path.is_some() {
                    bail!("only one input file is supported");
                }
                path = Some(PathBuf::from(other));
            }
        }
    }

    let Some(path) = path else {
        print_help();
        bail!("missing input file");
    };

    let bytes = std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    log::info!("read {} bytes from {}", bytes.len(), path.display());

    let summary = match width {
        BinWidth::U8 => summarize::<u8>(&bytes, config)?,
        BinWidth::U16 => summarize::<u16>(&bytes, config)?,
        BinWidth::U32 => summarize::<u32>(&bytes, config)?,
    };
    if summary.size_bytes != bytes.len() {
        log::warn!(
            "file holds {} bytes, store payload is {}",
            bytes.len(),
            summary.size_bytes
        );
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(num_data: i32, row_ptr: &[i32], values: &[u8]) -> Vec<u8> {
        let mut bytes = num_data.to_ne_bytes().to_vec();
        for offset in row_ptr {
            bytes.extend_from_slice(&offset.to_ne_bytes());
        }
        bytes.extend_from_slice(values);
        bytes
    }

    #[test]
    fn test_summarize_valid_store() {
        let bytes = encode(3, &[0, 2, 2, 3], &[1, 4, 9]);
        let summary = summarize::<u8>(&bytes, BinStoreConfig::default()).unwrap();
        assert_eq!(summary.num_data, 3);
        assert_eq!(summary.num_values, 3);
        assert_eq!(summary.max_values_per_row, 2);
        assert_eq!(summary.max_bin, Some(9));
        assert_eq!(summary.size_bytes, bytes.len());
    }

    #[test]
    fn test_summarize_rejects_decreasing_offsets() {
        let bytes = encode(2, &[0, 5, 1], &[7]);
        let config = BinStoreConfig {
            validate_offsets: false,
            ..BinStoreConfig::default()
        };
        assert!(summarize::<u8>(&bytes, config).is_err());
    }
}

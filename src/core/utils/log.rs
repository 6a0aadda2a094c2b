/*!
 * Copyright (c) 2016 Microsoft Corporation. All rights reserved.
 * Licensed under the MIT License. See LICENSE file in the project root for
 * license information.
 */

/// Fatal-error facility for contract violations that cannot be reported
/// through a `Result`.
///
/// Regular diagnostics go through the `log` macros directly; this type only
/// covers the "log, then abort the operation" path.
#[derive(Debug)]
pub struct Log;

impl Log {
    /// Logs a fatal error message and panics with it.
    /// This function never returns (marked with `!`).
    pub fn fatal(message: &str) -> ! {
        log::error!("[Fatal] {}", message);
        panic!("{}", message);
    }
}

/// Initialise `env_logger` once for the process.
///
/// Reads `RUST_LOG`; repeated calls are harmless.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

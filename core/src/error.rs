//! Recorder error types

use std::path::PathBuf;

/// Errors surfaced by the trace recorder
///
/// Degenerate (zero-width) traces and name sanitization are reported
/// through `tracing` and never abort the run, so they have no variant
/// here.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The output sink could not be opened
    #[error("failed to open waveform output {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to the output sink failed
    #[error("waveform write failed: {0}")]
    Io(#[from] std::io::Error),

    /// Registration attempted after the first settled cycle
    #[error("trace '{name}' registered after initialization")]
    LateRegistration { name: String },

    /// The handle allocator ran out of distinct identifiers
    #[error("handle space exhausted ({cap} identifiers)", cap = crate::handle::HANDLE_CAPACITY)]
    HandlesExhausted,
}

//! Wavetrace Core - VCD waveform trace recorder
//!
//! This crate turns a set of observed simulation values into a textual
//! value-change dump (VCD): a full initial value set followed by
//! timestamped incremental changes, suitable for any waveform viewer.
//!
//! # Architecture
//!
//! - [`SignalStore`] - Arena of observed slots; the simulation owns and
//!   mutates it, the recorder only reads
//! - [`VcdRecorder`] - Registration, one-time header/declaration emission
//!   and the per-cycle change scan
//! - [`TraceRecord`] - One name bound to one slot, with the snapshot used
//!   for change detection and the per-kind value encoding
//! - [`HandleAllocator`] - Deterministic base-26 output identifiers
//! - [`ScopeTree`] - Dot-delimited names grouped into nested `$scope`
//!   declaration blocks
//!
//! # Usage
//!
//! ```
//! use wavetrace_core::{RecorderConfig, SignalStore, VcdRecorder};
//!
//! let mut store = SignalStore::new();
//! let clk = store.bit(false);
//! let count = store.int(0);
//!
//! let mut recorder = VcdRecorder::new(Vec::new(), RecorderConfig::default());
//! recorder.trace(&store, "top.clk", clk, None).unwrap();
//! recorder.trace(&store, "top.count", count, Some(8)).unwrap();
//!
//! // First settled cycle writes the header, declarations and initial values
//! recorder.cycle(&store, 0, true).unwrap();
//!
//! // The scheduler mutates observed slots between cycles
//! store.set_bit(clk, true);
//! store.set_int(count, 1);
//! recorder.cycle(&store, 5, true).unwrap();
//! ```

pub mod error;
pub mod handle;
pub mod recorder;
pub mod scope;
pub mod signal;
pub mod trace;

pub use error::TraceError;
pub use handle::{HANDLE_CAPACITY, HandleAllocator};
pub use recorder::{EnablePredicate, RecorderConfig, Timescale, TraceId, VcdRecorder};
pub use scope::ScopeTree;
pub use signal::{Fixed, Logic, SignalId, SignalStore, SignalValue};
pub use trace::TraceRecord;

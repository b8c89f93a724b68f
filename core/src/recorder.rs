//! VCD dump writer
//!
//! Orchestrates trace registration, the one-time initialization pass
//! (sort, alias detection, handle allocation, header + declarations +
//! initial values) and the per-cycle change scan with delta emission.
//!
//! The recorder is call-driven: the external scheduler invokes
//! [`VcdRecorder::cycle`] once per simulation step and guarantees that
//! observed slots are not mutated during the call. There is no
//! scheduling, locking or suspension inside the recorder itself; any
//! concurrent caller must serialize calls.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use hashbrown::HashMap;

use crate::error::TraceError;
use crate::handle::HandleAllocator;
use crate::scope::ScopeTree;
use crate::signal::{SignalId, SignalStore};
use crate::trace::TraceRecord;

/// Declared time resolution of the dump
///
/// Times passed to [`VcdRecorder::cycle`] are already expressed in these
/// units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timescale {
    Fs,
    #[default]
    Ps,
    Ns,
    Us,
    Ms,
    S,
}

impl fmt::Display for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self {
            Timescale::Fs => "fs",
            Timescale::Ps => "ps",
            Timescale::Ns => "ns",
            Timescale::Us => "us",
            Timescale::Ms => "ms",
            Timescale::S => "s",
        };
        write!(f, "1 {unit}")
    }
}

/// Configuration for a [`VcdRecorder`]
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Label of the root `$scope` block
    pub top_scope: String,
    /// Time resolution declared in the `$timescale` header
    pub timescale: Timescale,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            top_scope: "top".to_string(),
            timescale: Timescale::Ps,
        }
    }
}

/// Handle to a registered trace, stable across initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(usize);

/// Per-run dump enable predicate, re-evaluated on every settled cycle
pub type EnablePredicate = Box<dyn Fn() -> bool>;

/// VCD dump writer over an arbitrary sink
pub struct VcdRecorder<W: Write> {
    out: W,
    config: RecorderConfig,
    enabled: Option<EnablePredicate>,
    traces: Vec<TraceRecord>,
    /// Indices of active (non-alias, nonzero-width) traces, fixed at init,
    /// in lexicographic name order
    active: Vec<usize>,
    /// Indices collected by the change scan, reused across cycles
    changed: Vec<usize>,
    handles: HandleAllocator,
    initialized: bool,
    /// One sanitization warning per run, however many names are affected
    warned_brackets: bool,
    /// Reusable buffer for vector value encoding
    scratch: String,
}

impl VcdRecorder<BufWriter<File>> {
    /// Open `<name>.vcd` as the output sink.
    ///
    /// A sink that cannot be opened is fatal for the recorder and is
    /// surfaced immediately rather than producing an empty dump later.
    pub fn create(name: &str, config: RecorderConfig) -> Result<Self, TraceError> {
        let path = PathBuf::from(format!("{name}.vcd"));
        let file = File::create(&path).map_err(|source| TraceError::Open { path, source })?;
        Ok(Self::new(BufWriter::new(file), config))
    }
}

impl<W: Write> VcdRecorder<W> {
    pub fn new(out: W, config: RecorderConfig) -> Self {
        Self {
            out,
            config,
            enabled: None,
            traces: Vec::new(),
            active: Vec::new(),
            changed: Vec::new(),
            handles: HandleAllocator::new(),
            initialized: false,
            warned_brackets: false,
            scratch: String::new(),
        }
    }

    /// Install the dump enable predicate.
    ///
    /// While it returns false on a settled cycle, no comparison runs and
    /// nothing is emitted; snapshots stay untouched, so a change during a
    /// disabled interval is still caught when dumping resumes.
    pub fn with_enable(mut self, predicate: impl Fn() -> bool + 'static) -> Self {
        self.enabled = Some(Box::new(predicate));
        self
    }

    /// Register an observed slot under a hierarchical dotted name.
    ///
    /// Only usable before the first settled cycle; afterwards handle and
    /// alias assignment are final and registration fails fast.
    pub fn trace(
        &mut self,
        store: &SignalStore,
        name: &str,
        signal: SignalId,
        width_hint: Option<u32>,
    ) -> Result<TraceId, TraceError> {
        if self.initialized {
            return Err(TraceError::LateRegistration {
                name: name.to_string(),
            });
        }
        let name = self.sanitize_name(name);
        let trace_id = TraceId(self.traces.len());
        self.traces
            .push(TraceRecord::new(store, name, signal, width_hint));
        Ok(trace_id)
    }

    /// Per-step entry point driven by the external scheduler.
    ///
    /// `time` is the current simulated time in timescale units. Calls
    /// with `settled == false` are intermediate evaluations of the same
    /// time point and are ignored, collapsing them into one recorded
    /// sample. The first settled call initializes the dump (header,
    /// declarations, unconditional initial values); every later settled
    /// call emits a `#time` batch for the traces that changed, if any.
    pub fn cycle(
        &mut self,
        store: &SignalStore,
        time: u64,
        settled: bool,
    ) -> Result<(), TraceError> {
        if !settled {
            return Ok(());
        }

        if !self.initialized {
            self.init(store)?;
            self.initialized = true;
            return Ok(());
        }

        if let Some(enabled) = &self.enabled {
            if !enabled() {
                return Ok(());
            }
        }

        self.changed.clear();
        for &idx in &self.active {
            if self.traces[idx].changed(store) {
                self.changed.push(idx);
            }
        }
        if self.changed.is_empty() {
            return Ok(());
        }

        writeln!(self.out, "#{time}")?;
        for &idx in &self.changed {
            self.traces[idx].update_and_record(store, &mut self.out, &mut self.scratch)?;
        }
        Ok(())
    }

    /// True once the first settled cycle has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of traces in the active (change-checked) set; 0 before init
    pub fn active_trace_count(&self) -> usize {
        self.active.len()
    }

    /// Output handle assigned to a trace; empty before init, shared among
    /// aliases, absent for degenerate traces
    pub fn handle_of(&self, id: TraceId) -> Option<&str> {
        self.traces.get(id.0).map(|trace| trace.handle.as_str())
    }

    /// Flush buffered output to the sink
    pub fn flush(&mut self) -> Result<(), TraceError> {
        self.out.flush()?;
        Ok(())
    }

    /// Consume the recorder and return the inner sink
    pub fn into_inner(self) -> W {
        self.out
    }

    fn sanitize_name(&mut self, name: &str) -> String {
        if !name.contains(['[', ']']) {
            return name.to_string();
        }
        if !self.warned_brackets {
            tracing::warn!(
                "traced names contain [], which waveform viewers may \
                 interpret unexpectedly; replacing with ()"
            );
            self.warned_brackets = true;
        }
        name.chars()
            .map(|c| match c {
                '[' => '(',
                ']' => ')',
                other => other,
            })
            .collect()
    }

    fn init(&mut self, store: &SignalStore) -> Result<(), TraceError> {
        // Stable indirection keeps TraceId valid across the sort
        let mut order: Vec<usize> = (0..self.traces.len()).collect();
        order.sort_by(|&a, &b| self.traces[a].name.cmp(&self.traces[b].name));

        let mut alias_map: HashMap<SignalId, String> = HashMap::new();
        let mut scope = ScopeTree::new();
        for &idx in &order {
            let trace = &mut self.traces[idx];
            if trace.width > 0 {
                match alias_map.get(&trace.signal) {
                    Some(handle) => {
                        trace.is_alias = true;
                        trace.handle = handle.clone();
                    }
                    None => {
                        trace.handle = self.handles.next_handle()?;
                        alias_map.insert(trace.signal, trace.handle.clone());
                    }
                }
            }
            // Degenerate traces still enter the tree; rendering reports
            // and skips them
            scope.insert(&trace.name, idx);
        }
        self.active = order
            .iter()
            .copied()
            .filter(|&idx| !self.traces[idx].is_alias && self.traces[idx].width > 0)
            .collect();

        let now = chrono::Local::now();
        writeln!(
            self.out,
            "$date\n     {}\n$end\n",
            now.format("%b %d, %Y       %H:%M:%S")
        )?;
        writeln!(
            self.out,
            "$version\n {} {}\n$end\n",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )?;
        writeln!(self.out, "$timescale\n     {}\n$end\n", self.config.timescale)?;
        self.write_comment(&format!(
            "tracing {} distinct traces out of {} traces",
            self.active.len(),
            self.traces.len()
        ))?;
        scope.render(&mut self.out, &self.config.top_scope, &self.traces)?;
        writeln!(self.out, "$enddefinitions $end\n\n$dumpvars")?;
        for &idx in &self.active {
            self.traces[idx].update_and_record(store, &mut self.out, &mut self.scratch)?;
        }
        writeln!(self.out, "$end\n")?;

        tracing::info!(
            "waveform dump initialized: {} active of {} registered traces",
            self.active.len(),
            self.traces.len()
        );
        Ok(())
    }

    fn write_comment(&mut self, comment: &str) -> Result<(), TraceError> {
        writeln!(self.out, "$comment\n{comment}\n$end\n")?;
        Ok(())
    }
}

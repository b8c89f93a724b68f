//! Hierarchical scope tree for VCD declarations
//!
//! Groups dot-delimited trace names into nested `$scope module` blocks.
//! At every level leaves render before child scopes; leaves and children
//! each keep insertion order, so the effective declaration order is
//! whatever order the recorder inserts in (lexicographic, since it sorts
//! traces globally before building the tree).

use std::io::{self, Write};

use crate::trace::TraceRecord;

/// One level of the declaration hierarchy
#[derive(Debug, Default)]
pub struct ScopeTree {
    /// Traces declared directly in this scope: (display segment, trace index)
    leaves: Vec<(String, usize)>,
    /// Child scopes in insertion order, segment names unique
    children: Vec<(String, ScopeTree)>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a trace leaf at the position named by its dotted path
    pub fn insert(&mut self, path: &str, trace_idx: usize) {
        let segments: Vec<&str> = path.split('.').collect();
        self.insert_rec(&segments, trace_idx);
    }

    fn insert_rec(&mut self, segments: &[&str], trace_idx: usize) {
        match segments {
            [] => {}
            [leaf] => self.leaves.push(((*leaf).to_string(), trace_idx)),
            [head, rest @ ..] => {
                let child_idx = match self.children.iter().position(|(name, _)| name == head) {
                    Some(idx) => idx,
                    None => {
                        self.children.push(((*head).to_string(), ScopeTree::new()));
                        self.children.len() - 1
                    }
                };
                self.children[child_idx].1.insert_rec(rest, trace_idx);
            }
        }
    }

    /// Render this scope and everything below it as declaration blocks
    pub fn render<W: Write>(
        &self,
        out: &mut W,
        label: &str,
        traces: &[TraceRecord],
    ) -> io::Result<()> {
        writeln!(out, "$scope module {label} $end")?;
        for (segment, trace_idx) in &self.leaves {
            declaration_line(out, segment, &traces[*trace_idx])?;
        }
        for (name, child) in &self.children {
            child.render(out, name, traces)?;
        }
        writeln!(out, "$upscope $end")
    }
}

fn declaration_line<W: Write>(
    out: &mut W,
    segment: &str,
    trace: &TraceRecord,
) -> io::Result<()> {
    match trace.width {
        0 => {
            tracing::error!("traced object '{}' has 0 bits, ignored", trace.name);
            Ok(())
        }
        1 => writeln!(out, "$var wire 1 {} {} $end", trace.handle, segment),
        width => writeln!(
            out,
            "$var wire {} {} {} [{}:0] $end",
            width,
            trace.handle,
            segment,
            width - 1
        ),
    }
}

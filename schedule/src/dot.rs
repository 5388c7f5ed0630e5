//! Graphviz rendering of the dual graph.
//!
//! Dependency edges use the default style and carry the weight of the
//! matching weight edge when there is one. Weight-only edges are drawn
//! undirected in green. A weight of -1 is labelled `N/A`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;
use snafu::ResultExt;

use crate::cost::dag_cost;
use crate::error::*;
use crate::graph::{GraphDW, NO_SAVING};

pub fn write_dot<W: Write>(graph: &GraphDW, out: &mut W) -> io::Result<()> {
    writeln!(out, "digraph DAG {{")?;
    writeln!(out, "    graph [bgcolor=white, fontname=\"Courier New\"];")?;
    writeln!(out, "    node [shape=box, color=\"#0060ff\", fontname=\"Courier New\"];")?;
    writeln!(out, "    label=\"Total cost: {} bytes\";", dag_cost(graph))?;

    for v in graph.vertices() {
        let kernel = graph.kernel(v);
        let mut label = format!("Kernel {}, cost: {} bytes\\n", v.0, kernel.cost());
        label += &format!("inputs: {}\\l", kernel.inputs().iter().join(", "));
        label += &format!("outputs: {}\\l", kernel.outputs().iter().join(", "));
        label += &format!("temps: {}\\l", kernel.temps().iter().map(|b| b.id()).join(", "));
        label += "instructions:\\l";
        for instr in kernel.instrs() {
            label += &format!("{instr}\\l");
        }
        writeln!(out, "    {} [label=\"{}\"];", v.0, escape(&label))?;
    }

    for (u, v) in graph.edges_d() {
        match graph.weight(u, v) {
            Some(weight) => writeln!(out, "    {} -> {} [label=\"{}\"];", u.0, v.0, weight_label(weight))?,
            None => writeln!(out, "    {} -> {};", u.0, v.0)?,
        }
    }
    for edge in graph.edges_w() {
        if !graph.has_edge_d(edge.u, edge.v) && !graph.has_edge_d(edge.v, edge.u) {
            writeln!(
                out,
                "    {} -> {} [dir=none color=green label=\"{}\"];",
                edge.u.0,
                edge.v.0,
                weight_label(edge.weight)
            )?;
        }
    }

    writeln!(out, "}}")
}

/// Write the DOT rendering of `graph` to `path`.
pub fn pprint(graph: &GraphDW, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).context(DotIoSnafu { path })?;
    let mut out = BufWriter::new(file);
    write_dot(graph, &mut out).and_then(|()| out.flush()).context(DotIoSnafu { path })?;
    tracing::debug!(path = %path.display(), vertices = graph.num_vertices(), "dot written");
    Ok(())
}

fn weight_label(weight: i64) -> String {
    if weight == NO_SAVING { "N/A".to_string() } else { format!("{weight} bytes") }
}

fn escape(label: &str) -> String {
    label.replace('"', "\\\"")
}

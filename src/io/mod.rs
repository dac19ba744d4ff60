//! Text formats: the edge-list input, the Matrix Market graph dump, the stats line and the
//! basis listing.
//!
//! Input:
//! ```text
//! % comment lines start with '%' or '#'
//! 4 5          <- nodes edges
//! 1 2 1        <- u v weight, 1-indexed
//! ...
//! ```
//! Anything after the declared edges is ignored.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{McbError, Result};
use crate::graph::{CsrGraph, Weight};
use crate::mcb::{MinimumCycleBasis, RunStats};

/// Reads a graph file.
///
/// # Errors
/// `Io` if the file cannot be read, `Parse` for malformed lines, `InvalidGraph` for
/// self-loops.
pub fn read_graph(path: impl AsRef<Path>) -> Result<CsrGraph> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| McbError::io(path, e))?;
    parse_graph(BufReader::new(file)).map_err(|err| match err {
        McbError::Io { source, .. } => McbError::io(path, source),
        other => other,
    })
}

fn field<T: core::str::FromStr>(token: Option<&str>, line: usize, what: &str) -> Result<T> {
    let token = token.ok_or_else(|| McbError::Parse {
        line,
        message: format!("missing {what}"),
    })?;
    token.parse().map_err(|_| McbError::Parse {
        line,
        message: format!("invalid {what} `{token}`"),
    })
}

/// Parses the edge-list format from any reader.
///
/// # Errors
/// See [`read_graph`].
pub fn parse_graph(reader: impl BufRead) -> Result<CsrGraph> {
    let mut header: Option<(usize, usize)> = None;
    let mut edges: Vec<(usize, usize, Weight)> = Vec::new();
    let mut last = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| McbError::io("<input>", e))?;
        let lineno = idx + 1;
        last = lineno;
        let text = line.trim();
        if text.is_empty() || text.starts_with('%') || text.starts_with('#') {
            continue;
        }
        let mut tokens = text.split_whitespace();
        match header {
            None => {
                let nodes = field(tokens.next(), lineno, "node count")?;
                let count = field(tokens.next(), lineno, "edge count")?;
                edges.reserve(count);
                header = Some((nodes, count));
            }
            Some((nodes, count)) => {
                if edges.len() == count {
                    break;
                }
                let u: usize = field(tokens.next(), lineno, "source vertex")?;
                let v: usize = field(tokens.next(), lineno, "target vertex")?;
                let w: Weight = field(tokens.next(), lineno, "weight")?;
                for x in [u, v] {
                    if x == 0 || x > nodes {
                        return Err(McbError::Parse {
                            line: lineno,
                            message: format!("vertex {x} outside 1..={nodes}"),
                        });
                    }
                }
                edges.push((u - 1, v - 1, w));
            }
        }
    }

    let Some((nodes, count)) = header else {
        return Err(McbError::Parse {
            line: last,
            message: "missing `nodes edges` header".into(),
        });
    };
    if edges.len() != count {
        return Err(McbError::Parse {
            line: last,
            message: format!("expected {count} edges, found {}", edges.len()),
        });
    }
    CsrGraph::from_edges(nodes, &edges)
}

/// Writes `graph` in Matrix Market coordinate format, one line per edge, 1-indexed.
///
/// # Errors
/// Propagates write failures.
pub fn write_matrix_market_to(mut out: impl Write, graph: &CsrGraph) -> std::io::Result<()> {
    writeln!(out, "%%MatrixMarket matrix coordinate integer symmetric")?;
    writeln!(
        out,
        "{} {} {}",
        graph.node_count(),
        graph.node_count(),
        graph.edge_count()
    )?;
    for a in graph.edges() {
        writeln!(out, "{} {} {}", graph.row(a) + 1, graph.col(a) + 1, graph.weight(a))?;
    }
    out.flush()
}

/// Writes `graph` to `path` in Matrix Market format.
///
/// # Errors
/// `Io` on any file error.
pub fn write_matrix_market(path: impl AsRef<Path>, graph: &CsrGraph) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| McbError::io(path, e))?;
    write_matrix_market_to(BufWriter::new(file), graph).map_err(|e| McbError::io(path, e))
}

/// Appends the fixed-width stats line of a run to `path`, creating the file if needed.
///
/// # Errors
/// `Io` on any file error.
pub fn append_stats_line(path: impl AsRef<Path>, stats: &RunStats) -> Result<()> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| McbError::io(path, e))?;
    writeln!(file, "{}", stats.line()).map_err(|e| McbError::io(path, e))
}

/// Writes `cycles total_weight`, then `weight k e1 .. ek` per cycle with 1-indexed edges.
///
/// # Errors
/// Propagates write failures.
pub fn write_basis_to(mut out: impl Write, basis: &MinimumCycleBasis) -> std::io::Result<()> {
    writeln!(out, "{} {}", basis.len(), basis.total_weight)?;
    for cycle in &basis.cycles {
        write!(out, "{} {}", cycle.weight, cycle.edges.len())?;
        for e in &cycle.edges {
            write!(out, " {}", e + 1)?;
        }
        writeln!(out)?;
    }
    out.flush()
}

/// Writes the basis listing to `path`.
///
/// # Errors
/// `Io` on any file error.
pub fn write_basis(path: impl AsRef<Path>, basis: &MinimumCycleBasis) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| McbError::io(path, e))?;
    write_basis_to(BufWriter::new(file), basis).map_err(|e| McbError::io(path, e))
}

//! Error type shared by the graph, tree and basis layers.

use std::path::PathBuf;

use crate::alloc::AllocError;

/// Errors produced while reading a graph or constructing a cycle basis.
///
/// Parse and I/O failures are ordinary input problems. `Invariant` and
/// `NoIndependentCycle` mean an internal consistency check failed; they are never
/// transient and the computation cannot continue.
#[derive(Debug)]
pub enum McbError {
    /// A line of the text graph format could not be parsed.
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },
    /// A file could not be opened, read or written.
    Io {
        /// Path of the file involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The graph violates an input precondition (self-loop, vertex out of range, ...).
    InvalidGraph(String),
    /// Tree storage could not be allocated.
    Alloc(AllocError),
    /// The worker thread pool could not be created.
    ThreadPool(String),
    /// An algorithmic invariant was violated.
    Invariant(String),
    /// No remaining candidate cycle is independent of the basis chosen so far.
    NoIndependentCycle {
        /// Outer-loop iteration (non-tree coordinate) that found no cycle.
        edge: usize,
    },
}

impl McbError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl core::fmt::Display for McbError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse { line, message } => write!(f, "line {line}: {message}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::InvalidGraph(msg) => write!(f, "invalid graph: {msg}"),
            Self::Alloc(err) => write!(f, "tree storage: {err}"),
            Self::ThreadPool(msg) => write!(f, "thread pool: {msg}"),
            Self::Invariant(msg) => write!(f, "invariant violated: {msg}"),
            Self::NoIndependentCycle { edge } => write!(
                f,
                "no candidate cycle is independent for non-tree edge {edge} \
                 (feedback vertex set does not cover every basis cycle)"
            ),
        }
    }
}

impl std::error::Error for McbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Alloc(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AllocError> for McbError {
    fn from(err: AllocError) -> Self {
        Self::Alloc(err)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, McbError>;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BayesError>;

/// All failure modes surfaced by the library.
///
/// Every mutating graph operation validates before committing, so any of
/// the structural variants below guarantee the graph was left unchanged.
#[derive(Debug, Error)]
pub enum BayesError {
    /// Adding this edge would close a directed cycle.
    #[error("edge {from}->{target} would create a cycle")]
    Cycle { from: String, target: String },

    /// A batch edge insertion would leave the graph cyclic.
    #[error("edge set would create a cycle")]
    CyclicEdgeSet,

    #[error("edge {from}->{target} already exists in graph")]
    DuplicateEdge { from: String, target: String },

    #[error("edge list contains duplicates")]
    DuplicateEdges,

    #[error("self-loop {0}->{0} is not permitted")]
    SelfLoop(String),

    #[error("node {0} already exists in graph")]
    DuplicateNode(String),

    /// Node names appear verbatim in modelstrings, so the bracket
    /// delimiters and separators are reserved.
    #[error("invalid node name {0:?}")]
    InvalidName(String),

    #[error("unknown node {0}")]
    UnknownNode(String),

    #[error("invalid modelstring: {0}")]
    Modelstring(String),

    /// Discrete estimation or sampling needs `levels`, either set
    /// beforehand or inferred from data on request.
    #[error("node {0} has no levels; set levels or pass infer_levels")]
    MissingLevels(String),

    #[error("column {column}: {reason}")]
    UnsupportedColumnType { column: String, reason: String },

    /// Sampling needs every node to carry the same kind of parameter
    /// model; `found` describes what the graph actually holds.
    #[error("sampling requires a fully discrete or fully continuous network, found {found}")]
    IncompleteParameterization { found: String },

    #[error("cannot remove node {node}: {reason}")]
    InvalidRemoval { node: String, reason: String },

    #[error("node {0} has no conditional parameter model")]
    MissingCpd(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The equivalence class enumeration is exponential in the number of
    /// free edges; callers can bound it and get this instead of a hang.
    #[error("equivalence class with {free_edges} free edges ({combinations} orientations) exceeds cap of {cap}")]
    EnumerationBudget {
        free_edges: usize,
        combinations: usize,
        cap: usize,
    },

    #[error("data table: {0}")]
    Data(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

pub mod data;
pub mod equivalence;
pub mod error;
pub mod graph;
pub mod parameters;
pub mod persist;
pub mod sampling;

pub use data::{DataColumn, DataTable};
pub use error::{BayesError, Result};
pub use graph::Dag;
pub use graph::generation;
pub use parameters::{
    Cpd, ConditionalProbabilityDistribution, ConditionalProbabilityTable, EstimationMethod,
    NetworkKind,
};

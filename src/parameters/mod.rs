pub mod continuous;
pub mod discrete;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use continuous::ConditionalProbabilityDistribution;
pub use discrete::ConditionalProbabilityTable;

/// Parameter kind of a fully parameterized network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkKind {
    /// Every node carries a conditional probability table.
    Discrete,
    /// Every node carries a linear-Gaussian distribution.
    Continuous,
    /// Nodes carry a mix of both kinds.
    Mixed,
}

impl std::fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkKind::Discrete => write!(f, "discrete"),
            NetworkKind::Continuous => write!(f, "continuous"),
            NetworkKind::Mixed => write!(f, "mixed"),
        }
    }
}

/// How conditional probability rows are estimated from counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EstimationMethod {
    /// Relative frequencies; unobserved parent configurations fall back
    /// to a uniform row.
    MaximumLikelihood,
    /// Relative frequencies smoothed by a pseudo-count added to every
    /// cell, covering the full parent-configuration cross-product.
    Bayes { pseudocount: f64 },
}

/// The conditional parameter model attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cpd {
    Discrete(ConditionalProbabilityTable),
    Gaussian(ConditionalProbabilityDistribution),
}

impl Cpd {
    /// Try to get the model as a discrete table
    pub fn as_table(&self) -> Option<&ConditionalProbabilityTable> {
        match self {
            Cpd::Discrete(cpt) => Some(cpt),
            _ => None,
        }
    }

    /// Try to get the model as a linear-Gaussian distribution
    pub fn as_distribution(&self) -> Option<&ConditionalProbabilityDistribution> {
        match self {
            Cpd::Gaussian(cpd) => Some(cpd),
            _ => None,
        }
    }

    /// Parent names the model conditions on.
    pub fn parents(&self) -> &[String] {
        match self {
            Cpd::Discrete(cpt) => cpt.parents(),
            Cpd::Gaussian(cpd) => cpd.parents(),
        }
    }

    /// Replace the model with a degenerate one pinned at `level`,
    /// severing all parent dependence (the "do" operation).
    pub fn intervene(&mut self, level: &str) -> Result<()> {
        match self {
            Cpd::Discrete(cpt) => cpt.intervene(level),
            Cpd::Gaussian(cpd) => cpd.intervene(level),
        }
    }
}

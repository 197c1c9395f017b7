use rand::Rng;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::data::DataTable;
use crate::error::{BayesError, Result};

/// Candidate edge weights used when the caller does not supply a set.
pub const DEFAULT_WEIGHTS: [f64; 4] = [-2.0, -0.5, 0.5, 2.0];
pub const DEFAULT_MEAN: f64 = 0.0;
pub const DEFAULT_STD: f64 = 1.0;

/// Linear-Gaussian conditional distribution for a continuous node.
///
/// A sampled value is `mean + Σ weight_i * parent_i + noise(std)`, with
/// one weight per parent (parents ordered by name). An intervened
/// distribution has no parents and zero noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalProbabilityDistribution {
    node: String,
    parents: Vec<String>,
    mean: f64,
    std: f64,
    weights: Vec<f64>,
}

impl ConditionalProbabilityDistribution {
    pub fn new(node: &str, parents: Vec<String>, mean: Option<f64>, std: Option<f64>) -> Result<Self> {
        let std = std.unwrap_or(DEFAULT_STD);
        if std < 0.0 || !std.is_finite() {
            return Err(BayesError::InvalidParameter(format!(
                "standard deviation must be non-negative and finite, got {std}"
            )));
        }
        Ok(Self {
            node: node.to_string(),
            weights: vec![0.0; parents.len()],
            parents,
            mean: mean.unwrap_or(DEFAULT_MEAN),
            std,
        })
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std(&self) -> f64 {
        self.std
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Draw one weight per parent from the candidate set.
    pub fn sample_parameters(
        &mut self,
        possible_weights: Option<&[f64]>,
        rng: &mut StdRng,
    ) -> Result<()> {
        let candidates = possible_weights.unwrap_or(&DEFAULT_WEIGHTS);
        if candidates.is_empty() {
            return Err(BayesError::InvalidParameter(
                "candidate weight set is empty".to_string(),
            ));
        }
        self.weights = (0..self.parents.len())
            .map(|_| candidates[rng.gen_range(0..candidates.len())])
            .collect();
        Ok(())
    }

    /// Pin the node at a fixed value, severing parent dependence.
    ///
    /// The level is parsed as a real number since continuous nodes have no
    /// categorical levels.
    pub fn intervene(&mut self, level: &str) -> Result<()> {
        let value: f64 = level.parse().map_err(|_| {
            BayesError::InvalidParameter(format!(
                "intervention level {level:?} is not a real number"
            ))
        })?;
        self.parents.clear();
        self.weights.clear();
        self.mean = value;
        self.std = 0.0;
        Ok(())
    }

    /// Draw one value per row from already-sampled parent columns.
    pub fn sample(&self, table: &DataTable, rng: &mut StdRng) -> Result<Vec<f64>> {
        let n = table.n_rows();
        let mut parent_values = Vec::with_capacity(self.parents.len());
        for parent in &self.parents {
            parent_values.push(table.real_values(parent)?);
        }
        let noise = if self.std > 0.0 {
            Some(Normal::new(0.0, self.std).map_err(|e| {
                BayesError::InvalidParameter(format!("noise distribution: {e}"))
            })?)
        } else {
            None
        };
        let mut out = Vec::with_capacity(n);
        for row in 0..n {
            let mut value = self.mean;
            for (weight, column) in self.weights.iter().zip(&parent_values) {
                value += weight * column[row];
            }
            if let Some(noise) = &noise {
                value += noise.sample(rng);
            }
            out.push(value);
        }
        Ok(out)
    }
}

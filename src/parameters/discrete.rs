use log::debug;
use ndarray::Array2;
use rand::Rng;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Gamma;

use crate::data::DataTable;
use crate::error::{BayesError, Result};
use crate::parameters::EstimationMethod;

/// Dirichlet concentration used when the caller does not supply one.
pub const DEFAULT_ALPHA: f64 = 20.0;

/// Conditional probability table for a discrete node.
///
/// Rows index joint parent-level configurations (parents ordered by name,
/// first parent most significant), columns index the node's own levels.
/// Every row sums to 1 within floating tolerance; a root node has a single
/// row holding its marginal distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalProbabilityTable {
    node: String,
    levels: Vec<String>,
    parents: Vec<String>,
    parent_levels: Vec<Vec<String>>,
    probs: Array2<f64>,
}

fn config_count(parent_levels: &[Vec<String>]) -> usize {
    parent_levels.iter().map(Vec::len).product()
}

impl ConditionalProbabilityTable {
    /// Build a table with uniform rows, ready for `sample_parameters`.
    ///
    /// `parents` and `parent_levels` must be parallel and ordered by
    /// parent name.
    pub fn new(
        node: &str,
        levels: Vec<String>,
        parents: Vec<String>,
        parent_levels: Vec<Vec<String>>,
    ) -> Result<Self> {
        if levels.is_empty() {
            return Err(BayesError::MissingLevels(node.to_string()));
        }
        if parents.len() != parent_levels.len() {
            return Err(BayesError::InvalidParameter(
                "parents and parent_levels must be parallel".to_string(),
            ));
        }
        if parent_levels.iter().any(Vec::is_empty) {
            return Err(BayesError::MissingLevels(node.to_string()));
        }
        let rows = config_count(&parent_levels);
        let uniform = 1.0 / levels.len() as f64;
        Ok(Self {
            node: node.to_string(),
            probs: Array2::from_elem((rows, levels.len()), uniform),
            levels,
            parents,
            parent_levels,
        })
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn parent_levels(&self) -> &[Vec<String>] {
        &self.parent_levels
    }

    /// Probability matrix, one row per parent configuration.
    pub fn probabilities(&self) -> &Array2<f64> {
        &self.probs
    }

    pub fn n_configurations(&self) -> usize {
        self.probs.nrows()
    }

    /// Flat row index of a joint parent-level configuration.
    pub fn config_index(&self, codes: &[usize]) -> usize {
        codes
            .iter()
            .zip(&self.parent_levels)
            .fold(0, |acc, (&code, levels)| acc * levels.len() + code)
    }

    fn config_codes(&self, mut index: usize) -> Vec<usize> {
        let mut codes = vec![0; self.parent_levels.len()];
        for j in (0..self.parent_levels.len()).rev() {
            let k = self.parent_levels[j].len();
            codes[j] = index % k;
            index /= k;
        }
        codes
    }

    /// Redraw every row from a symmetric Dirichlet.
    ///
    /// Rows are sampled as normalized Gamma(alpha, 1) draws. With
    /// `normalise_alpha`, alpha is divided by the level count first so the
    /// expected row entropy is comparable across nodes with differing
    /// cardinality.
    pub fn sample_parameters(
        &mut self,
        alpha: Option<f64>,
        normalise_alpha: bool,
        rng: &mut StdRng,
    ) -> Result<()> {
        let mut alpha = alpha.unwrap_or(DEFAULT_ALPHA);
        if normalise_alpha {
            alpha /= self.levels.len() as f64;
        }
        if !(alpha > 0.0) || !alpha.is_finite() {
            return Err(BayesError::InvalidParameter(format!(
                "Dirichlet concentration must be positive and finite, got {alpha}"
            )));
        }
        let gamma = Gamma::new(alpha, 1.0)
            .map_err(|e| BayesError::InvalidParameter(format!("Dirichlet concentration: {e}")))?;
        let n_levels = self.levels.len();
        for mut row in self.probs.rows_mut() {
            let draws: Vec<f64> = (0..n_levels).map(|_| gamma.sample(rng)).collect();
            let total: f64 = draws.iter().sum();
            if total > 0.0 && total.is_finite() {
                for (cell, draw) in row.iter_mut().zip(&draws) {
                    *cell = draw / total;
                }
            } else {
                // Gamma draws can underflow to zero for tiny alpha
                row.fill(1.0 / n_levels as f64);
            }
        }
        Ok(())
    }

    /// Estimate a table from recoded observations.
    ///
    /// `node_codes` holds the node's level index per row; `parent_codes`
    /// holds one code vector per parent, parallel to `parents`.
    pub fn estimate(
        node: &str,
        levels: Vec<String>,
        parents: Vec<String>,
        parent_levels: Vec<Vec<String>>,
        node_codes: &[usize],
        parent_codes: &[Vec<usize>],
        method: EstimationMethod,
    ) -> Result<Self> {
        if parent_codes.len() != parents.len() {
            return Err(BayesError::InvalidParameter(
                "one code column per parent is required".to_string(),
            ));
        }
        if parent_codes.iter().any(|c| c.len() != node_codes.len()) {
            return Err(BayesError::Data(
                "parent columns and node column differ in length".to_string(),
            ));
        }
        let pseudocount = match method {
            EstimationMethod::MaximumLikelihood => 0.0,
            EstimationMethod::Bayes { pseudocount } => {
                if !(pseudocount > 0.0) || !pseudocount.is_finite() {
                    return Err(BayesError::InvalidParameter(format!(
                        "pseudocount must be positive and finite, got {pseudocount}"
                    )));
                }
                pseudocount
            }
        };

        let mut table = Self::new(node, levels, parents, parent_levels)?;
        let n_levels = table.levels.len();
        let mut counts = Array2::<f64>::from_elem(table.probs.dim(), pseudocount);
        let mut codes = vec![0usize; table.parents.len()];
        for (row, &level) in node_codes.iter().enumerate() {
            if level >= n_levels {
                return Err(BayesError::Data(format!(
                    "level code {level} out of range for node {node}"
                )));
            }
            for (j, column) in parent_codes.iter().enumerate() {
                codes[j] = column[row];
            }
            let config = table.config_index(&codes);
            counts[[config, level]] += 1.0;
        }
        for (mut prob_row, count_row) in table.probs.rows_mut().into_iter().zip(counts.rows()) {
            let total: f64 = count_row.sum();
            if total > 0.0 {
                for (cell, &count) in prob_row.iter_mut().zip(count_row) {
                    *cell = count / total;
                }
            } else {
                // Unobserved configuration under MLE: uniform row
                prob_row.fill(1.0 / n_levels as f64);
            }
        }
        debug!(
            "estimated CPT for {node}: {} configurations x {} levels",
            table.n_configurations(),
            n_levels
        );
        Ok(table)
    }

    /// Remove `parent` from the table, averaging its contribution out.
    ///
    /// Each remaining configuration's row becomes the weighted sum of the
    /// original rows over the removed parent's levels; the weighting is
    /// uniform since the parent's own marginal is unknown here.
    pub fn marginalise(&mut self, parent: &str) -> Result<()> {
        let j = self
            .parents
            .iter()
            .position(|p| p == parent)
            .ok_or_else(|| BayesError::UnknownNode(parent.to_string()))?;
        let k = self.parent_levels[j].len();
        let weight = 1.0 / k as f64;

        let mut parents = self.parents.clone();
        parents.remove(j);
        let mut parent_levels = self.parent_levels.clone();
        parent_levels.remove(j);

        let reduced = Self::new(&self.node, self.levels.clone(), parents, parent_levels)?;
        let mut probs = Array2::<f64>::zeros(reduced.probs.dim());
        for index in 0..self.probs.nrows() {
            let mut codes = self.config_codes(index);
            codes.remove(j);
            let target = reduced.config_index(&codes);
            for (level, &p) in self.probs.row(index).iter().enumerate() {
                probs[[target, level]] += p * weight;
            }
        }
        self.parents = reduced.parents;
        self.parent_levels = reduced.parent_levels;
        self.probs = probs;
        Ok(())
    }

    /// Replace the table with a degenerate distribution pinned at `level`.
    pub fn intervene(&mut self, level: &str) -> Result<()> {
        let target = self
            .levels
            .iter()
            .position(|l| l == level)
            .ok_or_else(|| {
                BayesError::InvalidParameter(format!(
                    "level {level:?} is not a level of node {}",
                    self.node
                ))
            })?;
        let mut probs = Array2::<f64>::zeros((1, self.levels.len()));
        probs[[0, target]] = 1.0;
        self.parents.clear();
        self.parent_levels.clear();
        self.probs = probs;
        Ok(())
    }

    /// Draw one level code per row, conditioning on already-sampled
    /// parent columns in `table`.
    pub fn sample(&self, table: &DataTable, rng: &mut StdRng) -> Result<Vec<i64>> {
        let n = table.n_rows();
        let mut parent_codes = Vec::with_capacity(self.parents.len());
        for (parent, levels) in self.parents.iter().zip(&self.parent_levels) {
            parent_codes.push(table.discrete_codes(parent, levels)?);
        }
        let mut codes = vec![0usize; self.parents.len()];
        let mut out = Vec::with_capacity(n);
        for row in 0..n {
            for (j, column) in parent_codes.iter().enumerate() {
                codes[j] = column[row];
            }
            let config = self.config_index(&codes);
            let u: f64 = rng.gen_range(0.0..1.0);
            let mut acc = 0.0;
            let mut drawn = self.levels.len() - 1;
            for (level, &p) in self.probs.row(config).iter().enumerate() {
                acc += p;
                if u < acc {
                    drawn = level;
                    break;
                }
            }
            out.push(drawn as i64);
        }
        Ok(out)
    }
}

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::data::{DataColumn, DataTable};
use crate::error::{BayesError, Result};
use crate::graph::Dag;
use crate::parameters::{Cpd, NetworkKind};

/// Build the RNG handle threaded through generation and sampling calls:
/// seeded for reproducibility, fresh entropy otherwise.
pub(crate) fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl Dag {
    /// Ancestrally sample `n_samples` rows from the network.
    ///
    /// Nodes are visited in topological order, each drawing from its
    /// conditional model given the already-sampled parent columns. The
    /// table has one column per node in arena order: integer level codes
    /// for a discrete network, reals for a continuous one. A mixed or
    /// partially parameterized network is rejected.
    pub fn sample(&self, n_samples: usize, seed: Option<u64>) -> Result<DataTable> {
        let kind = match self.dtype() {
            Some(kind @ (NetworkKind::Discrete | NetworkKind::Continuous)) => kind,
            Some(NetworkKind::Mixed) => {
                return Err(BayesError::IncompleteParameterization {
                    found: "a mix of discrete and continuous models".to_string(),
                });
            }
            None => {
                return Err(BayesError::IncompleteParameterization {
                    found: "nodes without parameter models".to_string(),
                });
            }
        };
        let mut table = DataTable::new();
        for vertex in &self.vertices {
            let column = match kind {
                NetworkKind::Discrete => DataColumn::Int(vec![0; n_samples]),
                _ => DataColumn::Real(vec![0.0; n_samples]),
            };
            table.push_column(&vertex.name, column)?;
        }
        let mut rng = rng_from_seed(seed);
        for idx in self.topological_order() {
            let vertex = &self.vertices[idx];
            let cpd = vertex
                .cpd
                .as_ref()
                .ok_or_else(|| BayesError::MissingCpd(vertex.name.clone()))?;
            let column = match cpd {
                Cpd::Discrete(cpt) => DataColumn::Int(cpt.sample(&table, &mut rng)?),
                Cpd::Gaussian(cpd) => DataColumn::Real(cpd.sample(&table, &mut rng)?),
            };
            table.set_column(&vertex.name, column)?;
        }
        debug!(
            "sampled {n_samples} rows from {} {kind} nodes",
            self.node_count()
        );
        Ok(table)
    }
}

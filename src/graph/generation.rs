use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{BayesError, Result};
use crate::graph::{Dag, name_node};
use crate::sampling::rng_from_seed;

/// Generate a random DAG over `n_nodes` base-26-named nodes.
///
/// A random topological order is drawn, then each forward edge of that
/// order is included independently with probability `edge_prob`, so the
/// result is acyclic by construction.
pub fn erdos_renyi(n_nodes: usize, edge_prob: f64, seed: Option<u64>) -> Result<Dag> {
    if n_nodes == 0 {
        return Err(BayesError::InvalidParameter(
            "n_nodes must be positive".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&edge_prob) {
        return Err(BayesError::InvalidParameter(format!(
            "edge probability must be in [0, 1], got {edge_prob}"
        )));
    }
    let mut rng = rng_from_seed(seed);
    let names: Vec<String> = (0..n_nodes).map(name_node).collect();
    let mut dag = Dag::new();
    dag.add_nodes(&names.iter().map(String::as_str).collect::<Vec<_>>())?;
    let mut order: Vec<usize> = (0..n_nodes).collect();
    order.shuffle(&mut rng);
    let mut edges = Vec::new();
    for i in 0..n_nodes {
        for j in i + 1..n_nodes {
            if rng.gen_range(0.0..1.0) < edge_prob {
                edges.push((names[order[i]].as_str(), names[order[j]].as_str()));
            }
        }
    }
    dag.add_edges(&edges)?;
    Ok(dag)
}

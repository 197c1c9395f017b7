use std::collections::BTreeSet;

use log::debug;

use crate::data::DataTable;
use crate::error::{BayesError, Result};
use crate::graph::Dag;
use crate::parameters::EstimationMethod;

impl Dag {
    /// Edges whose orientation is forced by a collider: for each
    /// v-structure `(a, b, c)`, the edges `a -> b` and `c -> b`.
    pub fn forced_edges(&self, shielded: bool) -> BTreeSet<(String, String)> {
        self.get_v_structures(shielded)
            .into_iter()
            .flat_map(|(a, b, c)| [(a, b.clone()), (c, b)])
            .collect()
    }

    /// Edges not incident to any v-structure, free to be reoriented
    /// within the equivalence class.
    pub fn free_edges(&self, shielded: bool) -> BTreeSet<(String, String)> {
        let forced = self.forced_edges(shielded);
        self.edges().difference(&forced).cloned().collect()
    }

    /// Number of free edges: the enumeration below costs `2^k` of these.
    /// Call this first to judge feasibility.
    pub fn free_edge_count(&self, shielded: bool) -> usize {
        self.free_edges(shielded).len()
    }

    /// Enumerate the Markov equivalence class of this DAG.
    ///
    /// Every assignment of orientations to the free edges is tried, so
    /// the cost is exponential (`2^k` candidate orientations for `k` free
    /// edges); pass `cap` to fail fast instead of enumerating an
    /// infeasible class. Orientation assignments that would close a cycle
    /// or change the v-structure set are not members of the class and are
    /// skipped. With `data`, each member is additionally fitted by
    /// maximum likelihood with inferred levels, so the result is a
    /// collection of parameterized networks.
    ///
    /// The returned collection is structurally de-duplicated.
    pub fn get_equivalence_class(
        &self,
        shielded: bool,
        data: Option<&DataTable>,
        cap: Option<usize>,
    ) -> Result<Vec<Dag>> {
        let forced = self.forced_edges(shielded);
        let free: Vec<(String, String)> = self.free_edges(shielded).into_iter().collect();
        let combinations = 1usize.checked_shl(free.len() as u32).ok_or_else(|| {
            BayesError::InvalidParameter(format!(
                "{} free edges overflow the enumeration counter",
                free.len()
            ))
        })?;
        if let Some(cap) = cap {
            if combinations > cap {
                return Err(BayesError::EnumerationBudget {
                    free_edges: free.len(),
                    combinations,
                    cap,
                });
            }
        }
        let names: Vec<String> = self.nodes().into_iter().collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let v_structures = self.get_v_structures(shielded);
        let mut class: Vec<Dag> = Vec::new();
        let mut skipped = 0usize;
        for orientation in 0..combinations {
            let mut edges = forced.clone();
            for (bit, (source, target)) in free.iter().enumerate() {
                if orientation & (1 << bit) == 0 {
                    edges.insert((source.clone(), target.clone()));
                } else {
                    edges.insert((target.clone(), source.clone()));
                }
            }
            let edge_refs: Vec<(&str, &str)> =
                edges.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
            let mut candidate = Dag::new();
            candidate.add_nodes(&name_refs)?;
            match candidate.add_edges(&edge_refs) {
                Ok(()) => {}
                Err(BayesError::CyclicEdgeSet) => {
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            }
            if candidate.get_v_structures(shielded) != v_structures {
                skipped += 1;
                continue;
            }
            if let Some(data) = data {
                candidate.estimate_parameters(data, EstimationMethod::MaximumLikelihood, true)?;
            }
            if !class.contains(&candidate) {
                class.push(candidate);
            }
        }
        if skipped > 0 {
            debug!("skipped {skipped} orientation assignments outside the class");
        }
        Ok(class)
    }
}

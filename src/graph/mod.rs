pub mod generation;
mod modelstring;

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashSet};
use std::hash::{Hash, Hasher};

use log::debug;
use ndarray::Array2;
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::data::DataTable;
use crate::error::{BayesError, Result};
use crate::parameters::{
    Cpd, ConditionalProbabilityDistribution, ConditionalProbabilityTable, EstimationMethod,
    NetworkKind,
};
use crate::sampling::rng_from_seed;

/// Characters reserved by the modelstring encoding.
const RESERVED_NAME_CHARS: [char; 4] = ['[', ']', '|', ':'];

/// A node of the network: its name, optional discrete levels, and the
/// conditional parameter model once generated or estimated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub(crate) name: String,
    pub(crate) levels: Option<Vec<String>>,
    pub(crate) cpd: Option<Cpd>,
}

/// Directed acyclic graph with per-node conditional parameter models.
///
/// Vertices live in an arena indexed by insertion position; a node's
/// identity is its name, and every operation that takes a name fails with
/// [`BayesError::UnknownNode`] if it is absent. Mutations validate before
/// committing, so the graph is acyclic at all times.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dag {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) parents: Vec<Vec<usize>>,
    pub(crate) children: Vec<Vec<usize>>,
}

/// Kahn's algorithm, smallest index first so the order is deterministic.
/// Returns None if the adjacency contains a cycle.
pub(crate) fn topo_sort(children: &[Vec<usize>], parents: &[Vec<usize>]) -> Option<Vec<usize>> {
    let n = children.len();
    let mut indegree: Vec<usize> = parents.iter().map(Vec::len).collect();
    let mut ready: BinaryHeap<Reverse<usize>> = indegree
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();
    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(next)) = ready.pop() {
        order.push(next);
        for &child in &children[next] {
            indegree[child] -= 1;
            if indegree[child] == 0 {
                ready.push(Reverse(child));
            }
        }
    }
    (order.len() == n).then_some(order)
}

/// Default node name for `index`: A, B, ..., Z, AA, AB, ...
pub(crate) fn name_node(mut index: usize) -> String {
    let mut chars = Vec::new();
    loop {
        chars.push((b'A' + (index % 26) as u8) as char);
        index /= 26;
        if index == 0 {
            break;
        }
        index -= 1;
    }
    chars.iter().rev().collect()
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a modelstring like `[A][B|C:D][C|D][D]`.
    ///
    /// Nodes are created in lexicographic order regardless of listing
    /// order; an undeclared parent is an error.
    pub fn from_modelstring(modelstring: &str) -> Result<Self> {
        let groups = modelstring::parse(modelstring)?;
        let mut names: Vec<&str> = groups.iter().map(|(node, _)| node.as_str()).collect();
        names.sort_unstable();
        let mut dag = Self::new();
        dag.add_nodes(&names)?;
        let mut edges = Vec::new();
        for (node, parents) in &groups {
            for parent in parents {
                edges.push((parent.as_str(), node.as_str()));
            }
        }
        dag.add_edges(&edges)?;
        Ok(dag)
    }

    /// Build a graph from an edge list; the node set is the union of the
    /// endpoints, sorted lexicographically.
    pub fn from_edges(edges: &[(&str, &str)]) -> Result<Self> {
        let names: BTreeSet<&str> = edges
            .iter()
            .flat_map(|&(source, target)| [source, target])
            .collect();
        let mut dag = Self::new();
        dag.add_nodes(&names.into_iter().collect::<Vec<_>>())?;
        dag.add_edges(edges)?;
        Ok(dag)
    }

    /// Build a graph from a square 0/1 adjacency matrix (row = parent,
    /// column = child). Missing names default to A, B, ..., Z, AA, ...
    pub fn from_amat(amat: &Array2<u8>, names: Option<Vec<String>>) -> Result<Self> {
        let n = amat.nrows();
        if amat.ncols() != n {
            return Err(BayesError::InvalidParameter(format!(
                "adjacency matrix must be square, got {}x{}",
                n,
                amat.ncols()
            )));
        }
        let names = match names {
            Some(names) => {
                if names.len() != n {
                    return Err(BayesError::InvalidParameter(format!(
                        "{} names supplied for a {n}x{n} matrix",
                        names.len()
                    )));
                }
                names
            }
            None => (0..n).map(name_node).collect(),
        };
        let mut dag = Self::new();
        dag.add_nodes(&names.iter().map(String::as_str).collect::<Vec<_>>())?;
        let mut edges = Vec::new();
        for parent in 0..n {
            for child in 0..n {
                if amat[[parent, child]] != 0 {
                    edges.push((names[parent].as_str(), names[child].as_str()));
                }
            }
        }
        dag.add_edges(&edges)?;
        Ok(dag)
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.is_empty() || name.contains(&RESERVED_NAME_CHARS[..]) {
            return Err(BayesError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    pub fn add_node(&mut self, name: &str) -> Result<()> {
        Self::validate_name(name)?;
        if self.find_node(name).is_some() {
            return Err(BayesError::DuplicateNode(name.to_string()));
        }
        self.vertices.push(Vertex {
            name: name.to_string(),
            levels: None,
            cpd: None,
        });
        self.parents.push(Vec::new());
        self.children.push(Vec::new());
        Ok(())
    }

    /// Add several nodes; validated as a batch before any is inserted.
    pub fn add_nodes(&mut self, names: &[&str]) -> Result<()> {
        let mut batch = HashSet::new();
        for name in names {
            Self::validate_name(name)?;
            if self.find_node(name).is_some() || !batch.insert(*name) {
                return Err(BayesError::DuplicateNode(name.to_string()));
            }
        }
        for name in names {
            self.vertices.push(Vertex {
                name: name.to_string(),
                levels: None,
                cpd: None,
            });
            self.parents.push(Vec::new());
            self.children.push(Vec::new());
        }
        Ok(())
    }

    /// Add a single edge by node names.
    ///
    /// A same-direction duplicate is rejected as such; an edge whose
    /// commit would close a directed cycle (including the reverse of an
    /// existing edge) is rejected before any mutation.
    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<()> {
        let s = self.get_node_index(source)?;
        let t = self.get_node_index(target)?;
        if s == t {
            return Err(BayesError::SelfLoop(source.to_string()));
        }
        if self.children[s].contains(&t) {
            return Err(BayesError::DuplicateEdge {
                from: source.to_string(),
                target: target.to_string(),
            });
        }
        // The new edge closes a cycle iff source is already reachable
        // from target.
        if self.reachable(t, s) {
            return Err(BayesError::Cycle {
                from: source.to_string(),
                target: target.to_string(),
            });
        }
        self.children[s].push(t);
        self.parents[t].push(s);
        debug!("added edge {source}->{target}");
        Ok(())
    }

    /// Add a batch of edges atomically: the whole batch is validated on a
    /// scratch adjacency and either committed or discarded.
    pub fn add_edges(&mut self, edges: &[(&str, &str)]) -> Result<()> {
        let mut resolved = Vec::with_capacity(edges.len());
        let mut batch = HashSet::new();
        for &(source, target) in edges {
            let s = self.get_node_index(source)?;
            let t = self.get_node_index(target)?;
            if s == t {
                return Err(BayesError::SelfLoop(source.to_string()));
            }
            if !batch.insert((s, t)) {
                return Err(BayesError::DuplicateEdges);
            }
            if self.children[s].contains(&t) {
                return Err(BayesError::DuplicateEdge {
                    from: source.to_string(),
                    target: target.to_string(),
                });
            }
            resolved.push((s, t));
        }
        let mut children = self.children.clone();
        let mut parents = self.parents.clone();
        for &(s, t) in &resolved {
            children[s].push(t);
            parents[t].push(s);
        }
        if topo_sort(&children, &parents).is_none() {
            return Err(BayesError::CyclicEdgeSet);
        }
        self.children = children;
        self.parents = parents;
        debug!("added {} edges", resolved.len());
        Ok(())
    }

    fn find_node(&self, name: &str) -> Option<usize> {
        self.vertices.iter().position(|v| v.name == name)
    }

    /// Convert node name to arena index.
    pub fn get_node_index(&self, name: &str) -> Result<usize> {
        self.find_node(name)
            .ok_or_else(|| BayesError::UnknownNode(name.to_string()))
    }

    /// Convert arena index to node name.
    pub fn get_node_name(&self, index: usize) -> Option<&str> {
        self.vertices.get(index).map(|v| v.name.as_str())
    }

    pub fn node_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.children.iter().map(Vec::len).sum()
    }

    /// Names of all nodes in the network.
    pub fn nodes(&self) -> BTreeSet<String> {
        self.vertices.iter().map(|v| v.name.clone()).collect()
    }

    /// All directed edges as `(parent, child)` name pairs.
    pub fn edges(&self) -> BTreeSet<(String, String)> {
        let mut out = BTreeSet::new();
        for (parent, children) in self.children.iter().enumerate() {
            for &child in children {
                out.insert((
                    self.vertices[parent].name.clone(),
                    self.vertices[child].name.clone(),
                ));
            }
        }
        out
    }

    /// Every edge reversed.
    pub fn reversed_edges(&self) -> BTreeSet<(String, String)> {
        self.edges()
            .into_iter()
            .map(|(source, target)| (target, source))
            .collect()
    }

    /// The undirected edge set: edges unioned with their reverses.
    pub fn skeleton_edges(&self) -> BTreeSet<(String, String)> {
        let mut out = self.edges();
        out.extend(self.reversed_edges());
        out
    }

    pub fn levels(&self, node: &str) -> Result<Option<&[String]>> {
        let idx = self.get_node_index(node)?;
        Ok(self.vertices[idx].levels.as_deref())
    }

    /// Assign a discrete node's ordered category labels.
    pub fn set_levels(&mut self, node: &str, levels: Vec<String>) -> Result<()> {
        let idx = self.get_node_index(node)?;
        if levels.is_empty() {
            return Err(BayesError::MissingLevels(node.to_string()));
        }
        let distinct: HashSet<&String> = levels.iter().collect();
        if distinct.len() != levels.len() {
            return Err(BayesError::InvalidParameter(format!(
                "levels of {node} contain duplicates"
            )));
        }
        self.vertices[idx].levels = Some(levels);
        Ok(())
    }

    pub fn cpd(&self, node: &str) -> Result<Option<&Cpd>> {
        let idx = self.get_node_index(node)?;
        Ok(self.vertices[idx].cpd.as_ref())
    }

    fn reachable(&self, from: usize, to: usize) -> bool {
        let mut stack = vec![from];
        let mut visited = vec![false; self.vertices.len()];
        while let Some(next) = stack.pop() {
            if next == to {
                return true;
            }
            if visited[next] {
                continue;
            }
            visited[next] = true;
            stack.extend(&self.children[next]);
        }
        false
    }

    fn walk(&self, start: usize, backwards: bool) -> Vec<usize> {
        let adjacency = if backwards { &self.parents } else { &self.children };
        let mut visited = vec![false; self.vertices.len()];
        let mut stack = adjacency[start].clone();
        let mut found = Vec::new();
        while let Some(next) = stack.pop() {
            if visited[next] {
                continue;
            }
            visited[next] = true;
            found.push(next);
            stack.extend(&adjacency[next]);
        }
        found
    }

    fn sorted_names(&self, indices: &[usize]) -> Vec<String> {
        let mut names: Vec<String> = indices
            .iter()
            .map(|&i| self.vertices[i].name.clone())
            .collect();
        names.sort();
        names
    }

    /// Ancestor names of `node`, or exactly its parents when
    /// `only_parents` is set. Sorted by name.
    pub fn get_ancestors(&self, node: &str, only_parents: bool) -> Result<Vec<String>> {
        let idx = self.get_node_index(node)?;
        let found = if only_parents {
            self.parents[idx].clone()
        } else {
            self.walk(idx, true)
        };
        Ok(self.sorted_names(&found))
    }

    /// Descendant names of `node`, or exactly its children when
    /// `only_children` is set. Sorted by name.
    pub fn get_descendants(&self, node: &str, only_children: bool) -> Result<Vec<String>> {
        let idx = self.get_node_index(node)?;
        let found = if only_children {
            self.children[idx].clone()
        } else {
            self.walk(idx, false)
        };
        Ok(self.sorted_names(&found))
    }

    fn neighbours_idx(&self, a: usize, b: usize) -> bool {
        self.children[a].contains(&b) || self.children[b].contains(&a)
    }

    /// True iff an edge exists between the nodes in either direction.
    pub fn are_neighbours(&self, node_a: &str, node_b: &str) -> Result<bool> {
        let a = self.get_node_index(node_a)?;
        let b = self.get_node_index(node_b)?;
        Ok(self.neighbours_idx(a, b))
    }

    /// V-structures `(a, b, c)` meaning `a -> b <- c`, with `a < c`
    /// lexicographically. Shielded colliders (parents that are themselves
    /// neighbours) are excluded unless requested.
    pub fn get_v_structures(&self, include_shielded: bool) -> BTreeSet<(String, String, String)> {
        let mut out = BTreeSet::new();
        for (idx, vertex) in self.vertices.iter().enumerate() {
            let mut parents = self.parents[idx].clone();
            parents.sort_by(|&a, &b| self.vertices[a].name.cmp(&self.vertices[b].name));
            for i in 0..parents.len() {
                for j in i + 1..parents.len() {
                    if include_shielded || !self.neighbours_idx(parents[i], parents[j]) {
                        out.insert((
                            self.vertices[parents[i]].name.clone(),
                            vertex.name.clone(),
                            self.vertices[parents[j]].name.clone(),
                        ));
                    }
                }
            }
        }
        out
    }

    /// Modelstring encoding: nodes in sorted order, parents sorted within
    /// each group.
    pub fn get_modelstring(&self) -> String {
        let mut indices: Vec<usize> = (0..self.vertices.len()).collect();
        indices.sort_by(|&a, &b| self.vertices[a].name.cmp(&self.vertices[b].name));
        let mut out = String::new();
        for idx in indices {
            let parents = self.sorted_names(&self.parents[idx]);
            out.push_str(&modelstring::format_group(&self.vertices[idx].name, &parents));
        }
        out
    }

    /// Boolean adjacency matrix in arena order; `skeleton` ORs the matrix
    /// with its transpose.
    pub fn get_adjacency(&self, skeleton: bool) -> Array2<bool> {
        let n = self.vertices.len();
        let mut amat = Array2::from_elem((n, n), false);
        for (parent, children) in self.children.iter().enumerate() {
            for &child in children {
                amat[[parent, child]] = true;
            }
        }
        if skeleton {
            for i in 0..n {
                for j in i + 1..n {
                    let undirected = amat[[i, j]] || amat[[j, i]];
                    amat[[i, j]] = undirected;
                    amat[[j, i]] = undirected;
                }
            }
        }
        amat
    }

    /// Parameter kind of the network, if uniform.
    pub fn dtype(&self) -> Option<NetworkKind> {
        if self.vertices.is_empty() {
            return None;
        }
        let mut all_discrete = true;
        let mut all_continuous = true;
        let mut all_parameterized = true;
        for vertex in &self.vertices {
            match &vertex.cpd {
                Some(Cpd::Discrete(_)) => all_continuous = false,
                Some(Cpd::Gaussian(_)) => all_discrete = false,
                None => {
                    all_discrete = false;
                    all_continuous = false;
                    all_parameterized = false;
                }
            }
        }
        if all_discrete {
            Some(NetworkKind::Discrete)
        } else if all_continuous {
            Some(NetworkKind::Continuous)
        } else if all_parameterized {
            Some(NetworkKind::Mixed)
        } else {
            None
        }
    }

    /// A deterministic parents-before-children ordering of arena indices.
    pub fn topological_order(&self) -> Vec<usize> {
        topo_sort(&self.children, &self.parents).expect("graph invariant: acyclic")
    }

    fn sorted_parent_names(&self, idx: usize) -> Vec<String> {
        self.sorted_names(&self.parents[idx])
    }

    fn parent_names_and_levels(&self, idx: usize) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let names = self.sorted_parent_names(idx);
        let mut levels = Vec::with_capacity(names.len());
        for name in &names {
            let parent = self.get_node_index(name)?;
            levels.push(
                self.vertices[parent]
                    .levels
                    .clone()
                    .ok_or_else(|| BayesError::MissingLevels(name.clone()))?,
            );
        }
        Ok((names, levels))
    }

    /// Assign every node a level count drawn uniformly from
    /// `[min_levels, max_levels]` (defaults 2 and 3), labelled "0".."k-1".
    pub fn generate_levels(
        &mut self,
        min_levels: Option<usize>,
        max_levels: Option<usize>,
        seed: Option<u64>,
    ) -> Result<()> {
        let mut rng = rng_from_seed(seed);
        self.generate_levels_with(min_levels, max_levels, &mut rng)
    }

    pub(crate) fn generate_levels_with(
        &mut self,
        min_levels: Option<usize>,
        max_levels: Option<usize>,
        rng: &mut StdRng,
    ) -> Result<()> {
        let min = min_levels.unwrap_or(2);
        let max = max_levels.unwrap_or(3);
        if min < 2 || max < min {
            return Err(BayesError::InvalidParameter(format!(
                "level bounds must satisfy max >= min >= 2, got {min}..={max}"
            )));
        }
        for vertex in &mut self.vertices {
            let n_levels = rng.gen_range(min..=max);
            vertex.levels = Some((0..n_levels).map(|l| l.to_string()).collect());
        }
        Ok(())
    }

    /// Populate every node with a Dirichlet-sampled CPT.
    ///
    /// Nodes without levels get them generated first (see
    /// [`Dag::generate_levels`]).
    pub fn generate_discrete_parameters(
        &mut self,
        alpha: Option<f64>,
        min_levels: Option<usize>,
        max_levels: Option<usize>,
        normalise_alpha: bool,
        seed: Option<u64>,
    ) -> Result<()> {
        let mut rng = rng_from_seed(seed);
        if self.vertices.iter().any(|v| v.levels.is_none()) {
            self.generate_levels_with(min_levels, max_levels, &mut rng)?;
        }
        for idx in 0..self.vertices.len() {
            let (parents, parent_levels) = self.parent_names_and_levels(idx)?;
            let levels = self.vertices[idx]
                .levels
                .clone()
                .ok_or_else(|| BayesError::MissingLevels(self.vertices[idx].name.clone()))?;
            let mut cpt = ConditionalProbabilityTable::new(
                &self.vertices[idx].name,
                levels,
                parents,
                parent_levels,
            )?;
            cpt.sample_parameters(alpha, normalise_alpha, &mut rng)?;
            self.vertices[idx].cpd = Some(Cpd::Discrete(cpt));
        }
        Ok(())
    }

    /// Populate every node with a linear-Gaussian distribution, weights
    /// drawn from `possible_weights`.
    pub fn generate_continuous_parameters(
        &mut self,
        possible_weights: Option<&[f64]>,
        mean: Option<f64>,
        std: Option<f64>,
        seed: Option<u64>,
    ) -> Result<()> {
        let mut rng = rng_from_seed(seed);
        for idx in 0..self.vertices.len() {
            let parents = self.sorted_parent_names(idx);
            let mut cpd = ConditionalProbabilityDistribution::new(
                &self.vertices[idx].name,
                parents,
                mean,
                std,
            )?;
            cpd.sample_parameters(possible_weights, &mut rng)?;
            self.vertices[idx].cpd = Some(Cpd::Gaussian(cpd));
        }
        Ok(())
    }

    /// Estimate every node's CPT from data.
    ///
    /// With `infer_levels`, each node's level set is derived from the
    /// observed distinct values; otherwise pre-set levels are required and
    /// the columns are recoded against them. Nothing is committed until
    /// every table estimates cleanly.
    pub fn estimate_parameters(
        &mut self,
        data: &DataTable,
        method: EstimationMethod,
        infer_levels: bool,
    ) -> Result<()> {
        let mut resolved = Vec::with_capacity(self.vertices.len());
        for vertex in &self.vertices {
            let levels = if infer_levels {
                data.infer_levels(&vertex.name)?
            } else {
                vertex
                    .levels
                    .clone()
                    .ok_or_else(|| BayesError::MissingLevels(vertex.name.clone()))?
            };
            resolved.push(levels);
        }
        let mut estimated = Vec::with_capacity(self.vertices.len());
        for idx in 0..self.vertices.len() {
            let name = &self.vertices[idx].name;
            let node_codes = data.discrete_codes(name, &resolved[idx])?;
            let parent_names = self.sorted_parent_names(idx);
            let mut parent_levels = Vec::with_capacity(parent_names.len());
            let mut parent_codes = Vec::with_capacity(parent_names.len());
            for parent in &parent_names {
                let pidx = self.get_node_index(parent)?;
                parent_levels.push(resolved[pidx].clone());
                parent_codes.push(data.discrete_codes(parent, &resolved[pidx])?);
            }
            let cpt = ConditionalProbabilityTable::estimate(
                name,
                resolved[idx].clone(),
                parent_names,
                parent_levels,
                &node_codes,
                &parent_codes,
                method,
            )?;
            estimated.push(Cpd::Discrete(cpt));
        }
        for ((vertex, levels), cpd) in self.vertices.iter_mut().zip(resolved).zip(estimated) {
            vertex.levels = Some(levels);
            vertex.cpd = Some(cpd);
        }
        Ok(())
    }

    fn delete_vertex(&mut self, idx: usize) {
        self.vertices.remove(idx);
        self.parents.remove(idx);
        self.children.remove(idx);
        for list in self.parents.iter_mut().chain(self.children.iter_mut()) {
            list.retain(|&i| i != idx);
            for i in list.iter_mut() {
                if *i > idx {
                    *i -= 1;
                }
            }
        }
    }

    /// Remove a node, marginalizing it out of each child's CPT first.
    ///
    /// Requires a discrete model on the node and on all of its children;
    /// the requirement is checked up front so a failure leaves the graph
    /// unchanged.
    pub fn remove_node(&mut self, node: &str) -> Result<()> {
        let idx = self.get_node_index(node)?;
        match &self.vertices[idx].cpd {
            Some(Cpd::Discrete(_)) => {}
            Some(Cpd::Gaussian(_)) => {
                return Err(BayesError::InvalidRemoval {
                    node: node.to_string(),
                    reason: "marginalization requires a discrete model".to_string(),
                });
            }
            None => {
                return Err(BayesError::InvalidRemoval {
                    node: node.to_string(),
                    reason: "node has no parameter model".to_string(),
                });
            }
        }
        for &child in &self.children[idx] {
            if !matches!(self.vertices[child].cpd, Some(Cpd::Discrete(_))) {
                return Err(BayesError::InvalidRemoval {
                    node: node.to_string(),
                    reason: format!(
                        "child {} lacks a discrete model",
                        self.vertices[child].name
                    ),
                });
            }
        }
        for child in self.children[idx].clone() {
            if let Some(Cpd::Discrete(cpt)) = &mut self.vertices[child].cpd {
                cpt.marginalise(node)?;
            }
        }
        self.delete_vertex(idx);
        debug!("removed node {node}");
        Ok(())
    }

    /// Remove several nodes in turn, marginalizing each out of its
    /// children's CPTs.
    pub fn remove_nodes(&mut self, nodes: &[&str]) -> Result<()> {
        for node in nodes {
            self.remove_node(node)?;
        }
        Ok(())
    }

    /// Return a copy with `node` pinned at `evidence_level` and its
    /// parents removed: the causal "do" operation.
    pub fn mutilate(&self, node: &str, evidence_level: &str) -> Result<Dag> {
        self.get_node_index(node)?;
        let mut mutilated = self.clone();
        let parents = mutilated.get_ancestors(node, true)?;
        let parent_refs: Vec<&str> = parents.iter().map(String::as_str).collect();
        mutilated.remove_nodes(&parent_refs)?;
        let idx = mutilated.get_node_index(node)?;
        match &mut mutilated.vertices[idx].cpd {
            Some(cpd) => cpd.intervene(evidence_level)?,
            None => return Err(BayesError::MissingCpd(node.to_string())),
        }
        Ok(mutilated)
    }

    /// Consistency check used when a graph arrives from outside the
    /// mutation API (deserialization).
    pub(crate) fn validate(&self) -> Result<()> {
        let n = self.vertices.len();
        if self.parents.len() != n || self.children.len() != n {
            return Err(BayesError::Data(
                "adjacency lists do not match vertex count".to_string(),
            ));
        }
        let names: HashSet<&str> = self.vertices.iter().map(|v| v.name.as_str()).collect();
        if names.len() != n {
            return Err(BayesError::Data("node names are not unique".to_string()));
        }
        for (parent, children) in self.children.iter().enumerate() {
            for &child in children {
                if child >= n || !self.parents[child].contains(&parent) {
                    return Err(BayesError::Data(
                        "adjacency lists are not mirrored".to_string(),
                    ));
                }
            }
        }
        for (child, parents) in self.parents.iter().enumerate() {
            for &parent in parents {
                if parent >= n || !self.children[parent].contains(&child) {
                    return Err(BayesError::Data(
                        "adjacency lists are not mirrored".to_string(),
                    ));
                }
            }
        }
        if topo_sort(&self.children, &self.parents).is_none() {
            return Err(BayesError::CyclicEdgeSet);
        }
        Ok(())
    }
}

/// Structural equality: same node set and same directed edge set.
/// Parameter models are deliberately not compared, matching the identity
/// used to de-duplicate equivalence classes.
impl PartialEq for Dag {
    fn eq(&self, other: &Self) -> bool {
        self.nodes() == other.nodes() && self.edges() == other.edges()
    }
}

impl Eq for Dag {}

impl Hash for Dag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for node in self.nodes() {
            node.hash(state);
        }
        for edge in self.edges() {
            edge.hash(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_node_base26() {
        assert_eq!(name_node(0), "A");
        assert_eq!(name_node(25), "Z");
        assert_eq!(name_node(26), "AA");
        assert_eq!(name_node(27), "AB");
        assert_eq!(name_node(51), "AZ");
        assert_eq!(name_node(52), "BA");
    }

    #[test]
    fn test_topo_sort_detects_cycle() {
        let children = vec![vec![1], vec![2], vec![0]];
        let parents = vec![vec![2], vec![0], vec![1]];
        assert!(topo_sort(&children, &parents).is_none());
    }

    #[test]
    fn test_topo_sort_is_deterministic() {
        let children = vec![vec![], vec![], vec![0, 1]];
        let parents = vec![vec![2], vec![2], vec![]];
        assert_eq!(topo_sort(&children, &parents), Some(vec![2, 0, 1]));
    }

    #[test]
    fn test_add_node_rejects_reserved_names() {
        let mut dag = Dag::new();
        assert!(dag.add_node("A|B").is_err());
        assert!(dag.add_node("").is_err());
        assert!(dag.add_node("A").is_ok());
        assert!(dag.add_node("A").is_err());
    }

    #[test]
    fn test_delete_vertex_remaps_indices() {
        let mut dag = Dag::from_modelstring("[A][B|A][C|B]").unwrap();
        let idx = dag.get_node_index("A").unwrap();
        dag.delete_vertex(idx);
        assert_eq!(dag.node_count(), 2);
        assert_eq!(
            dag.edges().into_iter().collect::<Vec<_>>(),
            vec![("B".to_string(), "C".to_string())]
        );
        dag.validate().unwrap();
    }
}

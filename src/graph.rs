// LanSim: Packet-Level Network Lab Simulator written in Rust
// Copyright (C) 2024-2025 The LanSim Developers
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Graph analyzer
//!
//! An undirected graph over the node/link set. The driver only needs [`GraphAnalyzer::is_reachable`]
//! for its pre-flight check; shortest paths, components and [`GraphAnalyzer::validate`] serve
//! the editor's path highlighting and pre-flight diagnostics.

use std::collections::{HashMap, HashSet, VecDeque};

use itertools::Itertools;
use petgraph::algo::{connected_components, has_path_connecting};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;

use crate::topology::Topology;
use crate::types::MacAddr;

/// Connectivity analysis over one topology snapshot.
#[derive(Debug)]
pub struct GraphAnalyzer<'a> {
    topology: &'a Topology,
    graph: UnGraph<&'a str, ()>,
    index: HashMap<&'a str, NodeIndex>,
}

impl<'a> GraphAnalyzer<'a> {
    /// Build the undirected graph from the topology's nodes and links. Link endpoints that do
    /// not name a known node are skipped (and reported by [`Self::validate`]).
    pub fn new(topology: &'a Topology) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut index = HashMap::new();
        for node in &topology.nodes {
            index.insert(node.id.as_str(), graph.add_node(node.id.as_str()));
        }
        for link in &topology.links {
            if let (Some(&a), Some(&b)) = (
                index.get(link.a.node.as_str()),
                index.get(link.b.node.as_str()),
            ) {
                graph.add_edge(a, b, ());
            }
        }
        Self {
            topology,
            graph,
            index,
        }
    }

    /// `true` iff some link path connects the two nodes. Unknown ids are unreachable.
    pub fn is_reachable(&self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&a), Some(&b)) => has_path_connecting(&self.graph, a, b, None),
            _ => false,
        }
    }

    /// The node-id sequence of a shortest path from `a` to `b` (inclusive), or `None` if the
    /// nodes are disconnected.
    pub fn shortest_path(&self, a: &str, b: &str) -> Option<Vec<String>> {
        let (&start, &goal) = (self.index.get(a)?, self.index.get(b)?);
        if start == goal {
            return Some(vec![a.to_string()]);
        }
        let mut pred: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut seen: HashSet<NodeIndex> = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for next in self.graph.neighbors(current) {
                if seen.insert(next) {
                    pred.insert(next, current);
                    if next == goal {
                        let mut path = vec![goal];
                        let mut at = goal;
                        while let Some(&prev) = pred.get(&at) {
                            path.push(prev);
                            at = prev;
                        }
                        path.reverse();
                        return Some(path.into_iter().map(|ix| self.graph[ix].to_string()).collect());
                    }
                    queue.push_back(next);
                }
            }
        }
        None
    }

    /// The set of node ids reachable from `id` (including itself).
    pub fn connected_component(&self, id: &str) -> HashSet<String> {
        let Some(&start) = self.index.get(id) else {
            return HashSet::new();
        };
        let mut component = HashSet::new();
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(ix) = bfs.next(&self.graph) {
            component.insert(self.graph[ix].to_string());
        }
        component
    }

    /// Pre-flight diagnostics: isolated nodes, a split topology, dangling link endpoints and
    /// duplicate hardware addresses. None of these is fatal to a simulation.
    pub fn validate(&self) -> Vec<String> {
        let mut diagnostics = Vec::new();

        for node in &self.topology.nodes {
            let ix = self.index[node.id.as_str()];
            if self.graph.neighbors(ix).next().is_none() {
                diagnostics.push(format!("Node {} has no links attached", node.label));
            }
        }

        let components = connected_components(&self.graph);
        if components > 1 {
            diagnostics.push(format!("Topology has {components} disconnected components"));
        }

        for link in &self.topology.links {
            for endpoint in [&link.a, &link.b] {
                let exists = self
                    .topology
                    .node(&endpoint.node)
                    .map_or(false, |n| n.interface(&endpoint.iface).is_some());
                if !exists {
                    diagnostics.push(format!(
                        "Link endpoint {}/{} does not exist",
                        endpoint.node, endpoint.iface
                    ));
                }
            }
        }

        let mut seen_macs: HashMap<MacAddr, Vec<String>> = HashMap::new();
        for node in &self.topology.nodes {
            for iface in &node.interfaces {
                seen_macs
                    .entry(iface.mac)
                    .or_default()
                    .push(format!("{}/{}", node.id, iface.id));
            }
        }
        for (mac, owners) in seen_macs.into_iter().sorted() {
            if owners.len() > 1 {
                diagnostics.push(format!("Duplicate MAC {mac} on {}", owners.iter().join(", ")));
            }
        }

        diagnostics
    }
}

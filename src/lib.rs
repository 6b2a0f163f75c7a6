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

#![deny(missing_docs, missing_debug_implementations)]

//! # LanSim
//!
//! This is a library for simulating a single packet traveling through a small layer-2/layer-3
//! network topology, as built in a drag-and-drop network lab.
//!
//! ## Main Concepts
//!
//! The [`topology::Topology`] is the value the simulator operates on. It consists of nodes
//! (hosts, switches, routers, firewalls and cloud endpoints), each with a list of configured
//! interfaces, and undirected links between `(node, interface)` endpoints. A topology is an
//! immutable snapshot for the duration of one simulation.
//!
//! One call to [`sim::simulate`] plays one packet from a source host towards a destination and
//! returns a [`types::SimulationResult`] carrying a hop-by-hop [`types::TraceHop`] list. The
//! simulation honors MAC learning and VLAN tagging on switches, longest-prefix-match static
//! routing with TTL on routers, and ordered access-control rules on firewalls. Events between
//! devices are processed in strict FIFO order from a single [`event::EventQueue`] with a
//! monotone logical clock, which makes every simulation deterministic and replayable.
//!
//! The [`graph::GraphAnalyzer`] answers connectivity questions (reachability, shortest path,
//! connected components) over the same topology and pre-validates a simulation before any
//! event is dispatched. The [`editor::Document`] type is the boundary towards the graphical
//! editor: it parses the persisted `{nodes, edges}` JSON document and projects it onto the
//! engine's topology model.
//!
//! ## Example usage
//!
//! The following example connects two hosts in different subnets through a router and checks
//! that a ping from `A` reaches `B`:
//!
//! ```
//! use lansim::prelude::*;
//!
//! let mut topo = Topology::new();
//! topo.add_node(
//!     Node::host("a", "Host A").with_interface(
//!         Interface::new("eth0", "02:AA:00:00:00:01".parse().unwrap())
//!             .with_ip("10.0.0.10/24".parse().unwrap()),
//!     ),
//! );
//! topo.add_node(
//!     Node::router("r", "Router", RouterConfig::default())
//!         .with_interface(
//!             Interface::new("eth0", "02:AA:00:00:00:10".parse().unwrap())
//!                 .with_ip("10.0.0.1/24".parse().unwrap()),
//!         )
//!         .with_interface(
//!             Interface::new("eth1", "02:AA:00:00:00:11".parse().unwrap())
//!                 .with_ip("10.0.1.1/24".parse().unwrap()),
//!         ),
//! );
//! topo.add_node(
//!     Node::host("b", "Host B").with_interface(
//!         Interface::new("eth0", "02:AA:00:00:00:02".parse().unwrap())
//!             .with_ip("10.0.1.10/24".parse().unwrap()),
//!     ),
//! );
//! topo.add_link(Link::new("a", "eth0", "r", "eth0"));
//! topo.add_link(Link::new("r", "eth1", "b", "eth0"));
//!
//! let result = simulate(&topo, &PacketSpec::new("a", "b"), SimOptions::default());
//! assert!(result.success);
//! assert!(result.trace.iter().any(|hop| hop.action == TraceAction::Route));
//! ```

pub mod device;
pub mod editor;
pub mod event;
pub mod graph;
pub mod mac_table;
pub mod packet;
pub mod prelude;
pub mod sim;
pub mod topology;
pub mod types;

#[cfg(test)]
mod test;

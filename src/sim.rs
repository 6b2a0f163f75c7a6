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

//! # Simulator driver
//!
//! The driver builds one device instance per node, seeds the first packet from the source
//! host, and consumes the event queue to completion. The loop terminates on delivery, on an
//! empty queue, on a repeated `(node, interface, packet-id)` triple, or on the hop cap.
//! Failures are data: `simulate` always returns a [`SimulationResult`], never an error.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::device::{Device, Host};
use crate::event::EventQueue;
use crate::graph::GraphAnalyzer;
use crate::mac_table::MacTable;
use crate::packet::{PacketIdGen, PacketSpec};
use crate::topology::{Node, NodeKind, Topology};
use crate::types::{MacAddr, SimOptions, SimulationResult, TraceAction, TraceHop, TraceLevel};

/// Simulate one packet through the topology.
///
/// This is the single entry point of the engine: the caller supplies the topology snapshot and
/// the packet specification, and receives the result with its hop-by-hop trace. Calling it
/// twice with the same inputs yields identical traces.
pub fn simulate(topology: &Topology, spec: &PacketSpec, opts: SimOptions) -> SimulationResult {
    Simulator::new(topology, opts).run(spec)
}

/// The per-call state of one simulation: devices, MAC tables, queue and trace.
///
/// Each simulation call instantiates its own `Simulator`, so independent simulations never
/// share state and may run on independent threads without locking.
#[derive(Debug)]
pub struct Simulator<'a> {
    topology: &'a Topology,
    opts: SimOptions,
    devices: HashMap<&'a str, Device<'a>>,
    mac_tables: HashMap<&'a str, MacTable>,
    queue: EventQueue,
    ids: PacketIdGen,
}

impl<'a> Simulator<'a> {
    /// Construct a device instance per node and an empty MAC table per switch.
    pub fn new(topology: &'a Topology, opts: SimOptions) -> Self {
        let devices = topology
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), Device::from_node(node)))
            .collect();
        let mac_tables = topology
            .nodes
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::Switch(_)))
            .map(|node| (node.id.as_str(), MacTable::new()))
            .collect();
        Self {
            topology,
            opts,
            devices,
            mac_tables,
            queue: EventQueue::new(),
            ids: PacketIdGen::new(),
        }
    }

    /// Run one packet specification to completion.
    pub fn run(&mut self, spec: &PacketSpec) -> SimulationResult {
        let Some(source) = self.topology.node(&spec.source) else {
            return SimulationResult::failure(format!("Source node {} not found", spec.source));
        };
        let Some(destination) = self.topology.node(&spec.destination) else {
            return SimulationResult::failure(format!(
                "Destination node {} not found",
                spec.destination
            ));
        };
        if !source.kind.is_host_like() {
            return SimulationResult::failure(format!(
                "Source device {} cannot originate packets",
                source.label
            ));
        }

        let analyzer = GraphAnalyzer::new(self.topology);
        if !analyzer.is_reachable(&source.id, &destination.id) {
            return SimulationResult::failure(format!(
                "No path exists between {} and {}",
                source.label, destination.label
            ));
        }

        let mut trace = Vec::new();
        self.seed(source, destination, spec, &mut trace);
        self.consume(destination, trace)
    }

    /// Ask the source host to synthesize the initial packet and enqueue its events.
    fn seed(&mut self, source: &Node, destination: &Node, spec: &PacketSpec, trace: &mut Vec<TraceHop>) {
        let dst_mac = destination
            .first_interface()
            .map(|iface| iface.mac)
            .unwrap_or(MacAddr::BROADCAST);
        let dst_ip = destination
            .first_interface()
            .and_then(|iface| iface.addr())
            .or(spec.dst_ip);
        let host = Host::new(source);
        let outcome = host.send(
            self.ids.mint(),
            dst_mac,
            dst_ip,
            spec,
            &self.topology.links,
            self.queue.time(),
        );
        self.append_trace(trace, outcome.trace);
        for event in outcome.events {
            self.queue.push(event);
        }
    }

    /// The main loop: dequeue, tick, detect loops, dispatch, collect.
    fn consume(&mut self, destination: &Node, mut trace: Vec<TraceHop>) -> SimulationResult {
        let mut visited: HashSet<(String, String, String)> = HashSet::new();
        let mut hops = 0usize;

        while let Some(event) = self.queue.pop() {
            if hops >= self.opts.max_hops {
                debug!("hop cap of {} exceeded", self.opts.max_hops);
                return SimulationResult {
                    success: false,
                    delivered: false,
                    blocked: false,
                    loop_detected: true,
                    trace,
                    reason: "Max hops exceeded".to_string(),
                };
            }
            let clock = self.queue.tick();
            trace!(
                "t={clock} {} arrives at {}/{}",
                event.packet.id,
                event.node,
                event.iface
            );

            let key = (event.node.clone(), event.iface.clone(), event.packet.id.clone());
            if !visited.insert(key) {
                debug!("loop detected at {}/{}", event.node, event.iface);
                let label = self
                    .topology
                    .node(&event.node)
                    .map(|n| n.label.clone())
                    .unwrap_or_else(|| event.node.clone());
                return SimulationResult {
                    success: false,
                    delivered: false,
                    blocked: false,
                    loop_detected: true,
                    trace,
                    reason: format!("Loop detected at {label}"),
                };
            }

            // A dangling link may schedule a delivery to an unknown node; tolerate it.
            let Some(device) = self.devices.get(event.node.as_str()) else {
                hops += 1;
                continue;
            };
            let outcome = device.process(
                &event.iface,
                &event.packet,
                &self.topology.links,
                clock,
                self.mac_tables.get_mut(event.node.as_str()),
            );
            self.append_trace(&mut trace, outcome.trace);
            if outcome.delivered {
                debug!("delivered after {} hops", hops + 1);
                let reason = trace
                    .last()
                    .map(|hop| hop.reason.clone())
                    .unwrap_or_else(|| format!("Delivered to {}", destination.label));
                return SimulationResult {
                    success: true,
                    delivered: true,
                    blocked: false,
                    loop_detected: false,
                    trace,
                    reason,
                };
            }
            for next in outcome.events {
                self.queue.push(next);
            }
            hops += 1;
        }

        // The queue ran dry without a delivery. An access-control rejection reports as
        // blocked; every other drop keeps its reason but is not "blocked".
        let (blocked, reason) = match trace.last() {
            Some(hop) if hop.action == TraceAction::AclDeny => (true, hop.reason.clone()),
            Some(hop) if hop.action == TraceAction::Drop => (false, hop.reason.clone()),
            _ => (false, "Packet did not reach destination".to_string()),
        };
        debug!("queue exhausted: {reason}");
        SimulationResult {
            success: false,
            delivered: false,
            blocked,
            loop_detected: false,
            trace,
            reason,
        }
    }

    /// Append hops, honoring the configured trace level.
    fn append_trace(&self, trace: &mut Vec<TraceHop>, hops: Vec<TraceHop>) {
        for hop in hops {
            if self.opts.trace_level == TraceLevel::Minimal
                && matches!(hop.action, TraceAction::Receive | TraceAction::Learn)
            {
                continue;
            }
            trace.push(hop);
        }
    }
}

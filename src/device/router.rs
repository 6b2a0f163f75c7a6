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

//! The layer-3 router: directly-connected lookup first, then longest-prefix-match static
//! routing, with TTL accounting.
//!
//! The router rewrites the source MAC to the egress interface's address but never the
//! destination MAC: no separate ARP exchange is modeled, and MAC learning at downstream
//! switches carries delivery.

use log::debug;

use super::DeviceOutcome;
use crate::event::Event;
use crate::packet::Packet;
use crate::topology::{peer_of, Link, Node, RouterConfig, StaticRoute};
use crate::types::{Time, TraceAction};

/// A layer-3 router.
#[derive(Debug, Clone, Copy)]
pub struct Router<'a> {
    node: &'a Node,
    config: &'a RouterConfig,
}

impl<'a> Router<'a> {
    /// Wrap a router node and its configuration.
    pub fn new(node: &'a Node, config: &'a RouterConfig) -> Self {
        Self { node, config }
    }

    /// Process one packet: consume it if addressed to us, otherwise route it.
    pub fn process(
        &self,
        iface_id: &str,
        packet: &Packet,
        links: &[Link],
        time: Time,
    ) -> DeviceOutcome {
        let mut out = DeviceOutcome::default();

        // The only case a router consumes a packet: the destination IP is one of ours.
        if let Some(dst_ip) = packet.dst_ip {
            if self.node.interfaces.iter().any(|i| i.addr() == Some(dst_ip)) {
                out.hop(
                    self.node,
                    iface_id,
                    TraceAction::Deliver,
                    format!("Delivered to {}", self.node.label),
                    packet,
                    time,
                );
                out.delivered = true;
                return out;
            }
        }

        if packet.ttl <= 1 {
            out.hop(
                self.node,
                iface_id,
                TraceAction::Drop,
                "TTL expired",
                packet,
                time,
            );
            return out;
        }
        let mut packet = packet.clone();
        packet.ttl -= 1;

        out.hop(
            self.node,
            iface_id,
            TraceAction::Receive,
            format!("Received, TTL {}", packet.ttl),
            &packet,
            time,
        );

        let Some(dst_ip) = packet.dst_ip else {
            out.hop(
                self.node,
                iface_id,
                TraceAction::Drop,
                "No destination IP for routing",
                &packet,
                time,
            );
            return out;
        };

        // Directly connected networks win over any static route. First match in configured
        // interface order.
        for egress in self.node.interfaces.iter().filter(|i| i.id != iface_id) {
            let Some(net) = egress.ip else { continue };
            if net.contains(&dst_ip) {
                if let Some(peer) = peer_of(links, &self.node.id, &egress.id) {
                    packet.src_mac = egress.mac;
                    out.hop(
                        self.node,
                        &egress.id,
                        TraceAction::Route,
                        format!("Routing to directly connected network via {}", egress.id),
                        &packet,
                        time,
                    );
                    out.events
                        .push(Event::new(packet, &peer.node, &peer.iface, time));
                }
                return out;
            }
        }

        match self.best_static_route(dst_ip) {
            Some(route) => {
                // A route naming a nonexistent interface, or an egress without a link, is
                // ignored: the packet is silently undeliverable.
                let Some(egress) = self.node.interface(&route.iface) else {
                    debug!(
                        "route {} on {} names unknown interface {}",
                        route.prefix, self.node.id, route.iface
                    );
                    return out;
                };
                let Some(peer) = peer_of(links, &self.node.id, &egress.id) else {
                    debug!("egress {}/{} has no link", self.node.id, egress.id);
                    return out;
                };
                packet.src_mac = egress.mac;
                out.hop(
                    self.node,
                    &egress.id,
                    TraceAction::Route,
                    format!("Routing via {} next hop {}", route.prefix, route.next_hop),
                    &packet,
                    time,
                );
                out.events
                    .push(Event::new(packet, &peer.node, &peer.iface, time));
            }
            None => {
                out.hop(
                    self.node,
                    iface_id,
                    TraceAction::Drop,
                    format!("No route to {dst_ip}"),
                    &packet,
                    time,
                );
            }
        }
        out
    }

    /// Longest-prefix match over the static routes; ties resolve to the earliest route in the
    /// configured order.
    fn best_static_route(&self, dst_ip: std::net::Ipv4Addr) -> Option<&StaticRoute> {
        let mut best: Option<&StaticRoute> = None;
        for route in &self.config.static_routes {
            if route.prefix.contains(&dst_ip)
                && best.map_or(true, |b| route.prefix.prefix_len() > b.prefix.prefix_len())
            {
                best = Some(route);
            }
        }
        best
    }
}

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

//! The layer-2 switch: per-VLAN MAC learning, table-or-flood forwarding, and VLAN tag
//! discipline on access and trunk ports.

use log::warn;

use super::DeviceOutcome;
use crate::event::Event;
use crate::mac_table::MacTable;
use crate::packet::{Packet, Protocol};
use crate::topology::{peer_of, Interface, Link, Node, PortMode, SwitchConfig, DEFAULT_VLAN};
use crate::types::{MacAddr, Time, TraceAction};

/// A layer-2 switch. Switches never deliver; they only learn and replicate.
#[derive(Debug, Clone, Copy)]
pub struct Switch<'a> {
    node: &'a Node,
    config: &'a SwitchConfig,
}

impl<'a> Switch<'a> {
    /// Wrap a switch node and its configuration.
    pub fn new(node: &'a Node, config: &'a SwitchConfig) -> Self {
        Self { node, config }
    }

    /// Process one frame: resolve the ingress VLAN, learn the source address, then forward by
    /// table lookup or flood.
    pub fn process(
        &self,
        iface_id: &str,
        packet: &Packet,
        links: &[Link],
        time: Time,
        table: &mut MacTable,
    ) -> DeviceOutcome {
        let mut out = DeviceOutcome::default();
        let Some(ingress) = self.node.interface(iface_id) else {
            warn!("frame for unknown interface {}/{iface_id}", self.node.id);
            return out;
        };

        // Ingress VLAN resolution. Access ports force their configured VLAN; trunk ports keep
        // the frame's own tag, subject to the allowed set.
        let vlan = match ingress.mode.unwrap_or(PortMode::Access) {
            PortMode::Access => ingress.vlan.unwrap_or(DEFAULT_VLAN),
            PortMode::Trunk => {
                let vlan = packet.vlan.unwrap_or(DEFAULT_VLAN);
                if let Some(allowed) = &ingress.allowed_vlans {
                    if !allowed.contains(&vlan) {
                        out.hop(
                            self.node,
                            iface_id,
                            TraceAction::Drop,
                            format!("VLAN {vlan} not allowed on trunk"),
                            packet,
                            time,
                        );
                        return out;
                    }
                }
                vlan
            }
        };
        let mut packet = packet.clone();
        packet.vlan = Some(vlan);

        if self.config.mac_learning && table.learn(packet.src_mac, vlan, iface_id, time) {
            out.hop(
                self.node,
                iface_id,
                TraceAction::Learn,
                format!("Learned {} on {iface_id} (VLAN {vlan})", packet.src_mac),
                &learn_packet(&packet, vlan),
                time,
            );
        }

        out.hop(
            self.node,
            iface_id,
            TraceAction::Receive,
            format!("Received on VLAN {vlan}"),
            &packet,
            time,
        );

        // Egress decision: known unicast goes out one port, everything else floods.
        let dst = packet.dst_mac;
        let unicast_egress = if dst.is_broadcast() || dst.is_multicast() {
            None
        } else {
            table
                .lookup(dst, vlan)
                .filter(|entry| entry.iface != iface_id)
                .and_then(|entry| self.node.interface(&entry.iface))
                .filter(|egress| self.admissible(egress, vlan))
        };

        match unicast_egress {
            Some(egress) => {
                if let Some(peer) = peer_of(links, &self.node.id, &egress.id) {
                    let forwarded = egress_packet(egress, &packet);
                    out.hop(
                        self.node,
                        &egress.id,
                        TraceAction::Forward,
                        format!("Forwarding to {dst} via {}", egress.id),
                        &forwarded,
                        time,
                    );
                    out.events
                        .push(Event::new(forwarded, &peer.node, &peer.iface, time));
                }
            }
            None => {
                let reason = if dst.is_broadcast() || dst.is_multicast() {
                    format!("Flooding {dst} on VLAN {vlan}")
                } else {
                    format!("{dst} not in MAC table, flooding VLAN {vlan}")
                };
                out.hop(self.node, iface_id, TraceAction::Flood, reason, &packet, time);
                for egress in self
                    .node
                    .interfaces
                    .iter()
                    .filter(|egress| egress.id != iface_id && self.admissible(egress, vlan))
                {
                    if let Some(peer) = peer_of(links, &self.node.id, &egress.id) {
                        out.events.push(Event::new(
                            egress_packet(egress, &packet),
                            &peer.node,
                            &peer.iface,
                            time,
                        ));
                    }
                }
            }
        }
        out
    }

    /// An interface may transmit for `vlan` iff it is an access port in that VLAN, or a trunk
    /// whose allowed set (if any) lists it.
    fn admissible(&self, iface: &Interface, vlan: u16) -> bool {
        match iface.mode.unwrap_or(PortMode::Access) {
            PortMode::Access => iface.vlan.unwrap_or(DEFAULT_VLAN) == vlan,
            PortMode::Trunk => iface
                .allowed_vlans
                .as_ref()
                .map_or(true, |allowed| allowed.contains(&vlan)),
        }
    }
}

/// The frame as it leaves `egress`: access ports strip the tag, trunks preserve it.
fn egress_packet(egress: &Interface, packet: &Packet) -> Packet {
    let mut packet = packet.clone();
    if egress.mode.unwrap_or(PortMode::Access) == PortMode::Access {
        packet.vlan = None;
    }
    packet
}

/// Minimal synthesized packet recorded with a `learn` hop: it carries the learned source MAC
/// and VLAN, nothing else.
fn learn_packet(packet: &Packet, vlan: u16) -> Packet {
    Packet {
        id: packet.id.clone(),
        src_mac: packet.src_mac,
        dst_mac: MacAddr::NIL,
        src_ip: None,
        dst_ip: None,
        vlan: Some(vlan),
        protocol: Protocol::Other,
        src_port: None,
        dst_port: None,
        ttl: 0,
        payload: None,
    }
}

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

//! The firewall: a stateless, ordered access-control filter with a default policy.

use itertools::Itertools;

use super::DeviceOutcome;
use crate::event::Event;
use crate::packet::Packet;
use crate::topology::{peer_of, AclAction, FirewallConfig, Link, Node};
use crate::types::{Time, TraceAction};

/// A stateless packet filter.
#[derive(Debug, Clone, Copy)]
pub struct Firewall<'a> {
    node: &'a Node,
    config: &'a FirewallConfig,
}

impl<'a> Firewall<'a> {
    /// Wrap a firewall node and its configuration.
    pub fn new(node: &'a Node, config: &'a FirewallConfig) -> Self {
        Self { node, config }
    }

    /// Process one packet: consume it if addressed to us, otherwise filter and forward.
    pub fn process(
        &self,
        iface_id: &str,
        packet: &Packet,
        links: &[Link],
        time: Time,
    ) -> DeviceOutcome {
        let mut out = DeviceOutcome::default();

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

        out.hop(
            self.node,
            iface_id,
            TraceAction::Receive,
            "Received for filtering",
            packet,
            time,
        );

        // First matching rule wins; the default policy covers the rest.
        let verdict = self
            .config
            .rules
            .iter()
            .sorted_by_key(|rule| rule.order)
            .find(|rule| rule.matches(packet));
        let (action, origin) = match verdict {
            Some(rule) => (rule.action, format!("rule {}", rule.order)),
            None => (self.config.default_policy, "default policy".to_string()),
        };

        match action {
            AclAction::Deny => {
                out.hop(
                    self.node,
                    iface_id,
                    TraceAction::AclDeny,
                    format!("Denied by {origin}"),
                    packet,
                    time,
                );
            }
            AclAction::Allow => {
                out.hop(
                    self.node,
                    iface_id,
                    TraceAction::AclAllow,
                    format!("Allowed by {origin}"),
                    packet,
                    time,
                );
                // Forward out the first non-ingress interface that has a link peer. Without
                // one, the packet is not re-emitted and the simulation runs dry.
                for egress in self.node.interfaces.iter().filter(|i| i.id != iface_id) {
                    if let Some(peer) = peer_of(links, &self.node.id, &egress.id) {
                        let mut packet = packet.clone();
                        packet.src_mac = egress.mac;
                        out.events
                            .push(Event::new(packet, &peer.node, &peer.iface, time));
                        break;
                    }
                }
            }
        }
        out
    }
}

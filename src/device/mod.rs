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

//! # Device behaviors
//!
//! Each device class is a pure function from `(node state, ingress interface, packet, links,
//! clock)` to `(emitted events, trace hops, delivered?)`. The only mutable state in the whole
//! simulation is the per-switch MAC table, which is passed into switch calls by mutable
//! reference and never shared between switches.

mod firewall;
mod host;
mod router;
mod switch;

pub use firewall::Firewall;
pub use host::{Cloud, Host};
pub use router::Router;
pub use switch::Switch;

use crate::event::Event;
use crate::mac_table::MacTable;
use crate::packet::Packet;
use crate::topology::{Link, Node, NodeKind};
use crate::types::{Time, TraceAction, TraceHop};

/// What one device call produced: new events to enqueue, trace hops to append, and whether the
/// device consumed the packet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceOutcome {
    /// Events to enqueue, in the device's declared iteration order.
    pub events: Vec<Event>,
    /// Trace hops to append, in decision order.
    pub trace: Vec<TraceHop>,
    /// The packet reached its final device.
    pub delivered: bool,
}

impl DeviceOutcome {
    pub(crate) fn hop(
        &mut self,
        node: &Node,
        iface: &str,
        action: TraceAction,
        reason: impl Into<String>,
        packet: &Packet,
        time: Time,
    ) {
        self.trace.push(TraceHop {
            time,
            node: node.id.clone(),
            label: node.label.clone(),
            iface: iface.to_string(),
            action,
            reason: reason.into(),
            packet: packet.clone(),
        });
    }
}

/// A device instance, constructed from a [`Node`] at driver startup.
#[derive(Debug)]
pub enum Device<'a> {
    /// A host-like end device (host, phone, server or laptop).
    Host(Host<'a>),
    /// A cloud endpoint.
    Cloud(Cloud<'a>),
    /// A layer-2 switch.
    Switch(Switch<'a>),
    /// A layer-3 router.
    Router(Router<'a>),
    /// A stateless packet filter.
    Firewall(Firewall<'a>),
}

impl<'a> Device<'a> {
    /// Construct the device matching the node's kind.
    pub fn from_node(node: &'a Node) -> Self {
        match &node.kind {
            NodeKind::Host(_) => Device::Host(Host::new(node)),
            NodeKind::Cloud => Device::Cloud(Cloud::new(node)),
            NodeKind::Switch(config) => Device::Switch(Switch::new(node, config)),
            NodeKind::Router(config) => Device::Router(Router::new(node, config)),
            NodeKind::Firewall(config) => Device::Firewall(Firewall::new(node, config)),
        }
    }

    /// Process one packet arriving on `iface` at logical time `time`.
    ///
    /// `mac_table` must be the owning switch's table for switch devices; other devices ignore
    /// it. A switch called without a table cannot learn and degrades to flooding.
    pub fn process(
        &self,
        iface: &str,
        packet: &Packet,
        links: &[Link],
        time: Time,
        mac_table: Option<&mut MacTable>,
    ) -> DeviceOutcome {
        match self {
            Device::Host(host) => host.process(iface, packet, time),
            Device::Cloud(cloud) => cloud.process(iface, packet, time),
            Device::Switch(switch) => match mac_table {
                Some(table) => switch.process(iface, packet, links, time, table),
                None => switch.process(iface, packet, links, time, &mut MacTable::new()),
            },
            Device::Router(router) => router.process(iface, packet, links, time),
            Device::Firewall(firewall) => firewall.process(iface, packet, links, time),
        }
    }
}

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

//! Host-like devices (host, phone, server, laptop) and the cloud endpoint.
//!
//! Hosts originate packets and terminate delivery; they never forward. A cloud accepts any
//! packet arriving on its interface and never originates.

use std::net::Ipv4Addr;

use log::warn;

use super::DeviceOutcome;
use crate::event::Event;
use crate::packet::{Packet, PacketSpec, DEFAULT_TTL};
use crate::topology::{peer_of, Link, Node};
use crate::types::{MacAddr, Time, TraceAction};

/// A host-like end device.
#[derive(Debug, Clone, Copy)]
pub struct Host<'a> {
    node: &'a Node,
}

impl<'a> Host<'a> {
    /// Wrap a host-like node.
    pub fn new(node: &'a Node) -> Self {
        Self { node }
    }

    /// Synthesize the initial packet and emit the first forwarding event.
    ///
    /// The packet leaves through the host's first interface: its MAC becomes the source MAC
    /// and its address (prefix stripped) the source IP. If no link is attached to that
    /// interface, the attempt is dropped with a trace.
    pub fn send(
        &self,
        id: String,
        dst_mac: MacAddr,
        dst_ip: Option<Ipv4Addr>,
        spec: &PacketSpec,
        links: &[Link],
        time: Time,
    ) -> DeviceOutcome {
        let mut out = DeviceOutcome::default();
        let Some(iface) = self.node.first_interface() else {
            warn!("host {} has no interface to send from", self.node.id);
            return out;
        };
        let packet = Packet {
            id,
            src_mac: iface.mac,
            dst_mac,
            src_ip: iface.addr(),
            dst_ip,
            vlan: None,
            protocol: spec.protocol,
            src_port: spec.src_port,
            dst_port: spec.dst_port,
            ttl: spec.ttl.unwrap_or(DEFAULT_TTL),
            payload: spec.payload.clone(),
        };
        match peer_of(links, &self.node.id, &iface.id) {
            Some(peer) => {
                let reason = match dst_ip {
                    Some(ip) => format!("Sending {} to {}", packet.protocol, ip),
                    None => format!("Sending {} to {}", packet.protocol, dst_mac),
                };
                out.hop(self.node, &iface.id, TraceAction::Forward, reason, &packet, time);
                out.events
                    .push(Event::new(packet, &peer.node, &peer.iface, time));
            }
            None => {
                out.hop(
                    self.node,
                    &iface.id,
                    TraceAction::Drop,
                    "No link connected",
                    &packet,
                    time,
                );
            }
        }
        out
    }

    /// Receive a packet. The packet is for us iff the destination MAC equals the ingress
    /// interface's MAC, the destination MAC is broadcast, or the destination IP equals the
    /// ingress interface's IP.
    pub fn process(&self, iface_id: &str, packet: &Packet, time: Time) -> DeviceOutcome {
        let mut out = DeviceOutcome::default();
        let Some(iface) = self.node.interface(iface_id) else {
            warn!("packet for unknown interface {}/{iface_id}", self.node.id);
            return out;
        };
        let for_us = packet.dst_mac == iface.mac
            || packet.dst_mac.is_broadcast()
            || (packet.dst_ip.is_some() && packet.dst_ip == iface.addr());
        if for_us {
            out.hop(
                self.node,
                iface_id,
                TraceAction::Deliver,
                format!("Delivered to {}", self.node.label),
                packet,
                time,
            );
            out.delivered = true;
        } else {
            out.hop(
                self.node,
                iface_id,
                TraceAction::Drop,
                "Packet not addressed to this host",
                packet,
                time,
            );
        }
        out
    }
}

/// An opaque endpoint that accepts any packet arriving on its interface.
#[derive(Debug, Clone, Copy)]
pub struct Cloud<'a> {
    node: &'a Node,
}

impl<'a> Cloud<'a> {
    /// Wrap a cloud node.
    pub fn new(node: &'a Node) -> Self {
        Self { node }
    }

    /// Accept whatever arrives.
    pub fn process(&self, iface_id: &str, packet: &Packet, time: Time) -> DeviceOutcome {
        let mut out = DeviceOutcome::default();
        out.hop(
            self.node,
            iface_id,
            TraceAction::Deliver,
            format!("Accepted by {}", self.node.label),
            packet,
            time,
        );
        out.delivered = true;
        out
    }
}

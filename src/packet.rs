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

//! Module defining the simulated packet, the caller-facing packet specification, and the
//! deterministic packet-id minter.

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::types::MacAddr;

/// TTL assigned to packets at synthesis when the caller does not override it.
pub const DEFAULT_TTL: u8 = 64;

/// The transport (or pseudo-) protocol carried by a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Transmission Control Protocol.
    Tcp,
    /// User Datagram Protocol.
    Udp,
    /// Internet Control Message Protocol; the default for "ping" packets.
    #[default]
    Icmp,
    /// Address Resolution Protocol.
    Arp,
    /// Anything else.
    Other,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Icmp => "icmp",
            Protocol::Arp => "arp",
            Protocol::Other => "other",
        })
    }
}

/// A packet in flight.
///
/// The id is minted once at origination and is immutable for the lifetime of the packet: every
/// copy made while forwarding or flooding keeps the same id. Loop detection keys on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Simulation-unique identifier, shared by all copies of the same packet.
    pub id: String,
    /// Source hardware address; rewritten by routers and firewalls at egress.
    pub src_mac: MacAddr,
    /// Destination hardware address. Never rewritten by the simulator.
    pub dst_mac: MacAddr,
    /// Source IPv4 address, if the packet is layer-3.
    pub src_ip: Option<Ipv4Addr>,
    /// Destination IPv4 address, if the packet is layer-3.
    pub dst_ip: Option<Ipv4Addr>,
    /// VLAN tag. Inside a switch this always holds the effective ingress VLAN.
    pub vlan: Option<u16>,
    /// The carried protocol.
    pub protocol: Protocol,
    /// Source transport port.
    pub src_port: Option<u16>,
    /// Destination transport port.
    pub dst_port: Option<u16>,
    /// Remaining hop budget; decremented by every router.
    pub ttl: u8,
    /// Opaque payload string carried along for tracing.
    pub payload: Option<String>,
}

/// What the caller wants to send: the packet specification handed to [`crate::sim::simulate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketSpec {
    /// Id of the originating node. Must be a host-like device.
    pub source: String,
    /// Id of the destination node.
    pub destination: String,
    /// The protocol to send; defaults to ICMP.
    pub protocol: Protocol,
    /// Source transport port.
    pub src_port: Option<u16>,
    /// Destination transport port.
    pub dst_port: Option<u16>,
    /// TTL override; [`DEFAULT_TTL`] when absent.
    pub ttl: Option<u8>,
    /// Destination IP fallback, used when the destination node has no configured address.
    pub dst_ip: Option<Ipv4Addr>,
    /// Opaque payload string carried along for tracing.
    pub payload: Option<String>,
}

impl PacketSpec {
    /// Create a ping (ICMP) specification between two nodes.
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            protocol: Protocol::Icmp,
            src_port: None,
            dst_port: None,
            ttl: None,
            dst_ip: None,
            payload: None,
        }
    }

    /// Replace the protocol.
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set source and destination transport ports.
    pub fn with_ports(mut self, src_port: u16, dst_port: u16) -> Self {
        self.src_port = Some(src_port);
        self.dst_port = Some(dst_port);
        self
    }

    /// Override the TTL assigned at origination.
    pub fn with_ttl(mut self, ttl: u8) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// Deterministic per-simulation packet-id minter.
///
/// Ids are minted in insertion order, so two simulations over the same inputs produce
/// identical traces.
#[derive(Debug, Default)]
pub struct PacketIdGen {
    next: u64,
}

impl PacketIdGen {
    /// Create a fresh minter starting at `pkt-1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next packet id.
    pub fn mint(&mut self) -> String {
        self.next += 1;
        format!("pkt-{}", self.next)
    }
}

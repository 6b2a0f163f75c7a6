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

//! Module containing the type definitions shared across the simulator: hardware addresses, the
//! trace model, simulation options and the simulation result.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::packet::Packet;

/// The logical clock of a simulation. It ticks once per dequeued event.
pub type Time = u64;

/// A 48-bit Ethernet hardware address.
///
/// Addresses compare by their octets, so two differently-cased textual representations of the
/// same address are equal after parsing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// The all-ones broadcast address `FF:FF:FF:FF:FF:FF`.
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);

    /// The all-zero address, used as the placeholder in synthesized trace packets.
    pub const NIL: MacAddr = MacAddr([0x00; 6]);

    /// Returns `true` iff this is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Returns `true` iff the group bit (the low bit of the first octet) is set. The broadcast
    /// address is a multicast address as well.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    /// Returns `true` iff the locally-administered bit is set.
    pub fn is_locally_administered(&self) -> bool {
        self.0[0] & 0x02 != 0
    }

    /// Return the six octets of the address.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddr({self})")
    }
}

impl FromStr for MacAddr {
    type Err = InvalidMacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(|| InvalidMacError(s.to_string()))?;
            *octet = u8::from_str_radix(part, 16).map_err(|_| InvalidMacError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(InvalidMacError(s.to_string()));
        }
        Ok(MacAddr(octets))
    }
}

impl Serialize for MacAddr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error raised when parsing a malformed hardware address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid MAC address: `{0}`")]
pub struct InvalidMacError(pub String);

/// The decision a device took for a packet, recorded in a [`TraceHop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraceAction {
    /// The packet was accepted on an ingress interface for processing.
    Receive,
    /// The packet was sent out a single egress interface.
    Forward,
    /// The packet was replicated out every admissible interface except the ingress.
    Flood,
    /// The packet was discarded.
    Drop,
    /// The packet reached a device that consumes it.
    Deliver,
    /// A switch recorded a source address in its MAC table.
    Learn,
    /// A router selected an egress by IP lookup.
    Route,
    /// Reserved for address-resolution traffic.
    Arp,
    /// A firewall rule (or the default policy) permitted the packet.
    AclAllow,
    /// A firewall rule (or the default policy) rejected the packet.
    AclDeny,
}

impl fmt::Display for TraceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TraceAction::Receive => "receive",
            TraceAction::Forward => "forward",
            TraceAction::Flood => "flood",
            TraceAction::Drop => "drop",
            TraceAction::Deliver => "deliver",
            TraceAction::Learn => "learn",
            TraceAction::Route => "route",
            TraceAction::Arp => "arp",
            TraceAction::AclAllow => "acl-allow",
            TraceAction::AclDeny => "acl-deny",
        })
    }
}

/// A single timestamped record describing one device's decision about one packet.
///
/// Hops are append-only: once emitted, a hop is never edited. The `packet` field is a snapshot
/// of the packet as it was at that moment (after TTL decrement, VLAN rewrite or source-MAC
/// rewrite, where applicable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceHop {
    /// Logical time at which the hop was recorded.
    pub time: Time,
    /// Id of the node that recorded the hop.
    pub node: String,
    /// Display label of that node.
    pub label: String,
    /// Id of the interface the decision applies to.
    pub iface: String,
    /// What the device did.
    pub action: TraceAction,
    /// Short human-readable explanation, displayed verbatim by the UI.
    pub reason: String,
    /// Immutable copy of the packet at that moment.
    pub packet: Packet,
}

impl TraceHop {
    /// Render the hop as a single console line.
    pub fn fmt_line(&self) -> String {
        format!(
            "[{:>4}] {:<9} {}/{}: {}",
            self.time, self.action, self.label, self.iface, self.reason
        )
    }
}

/// How much detail the trace should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    /// Suppress `receive` and `learn` hops.
    Minimal,
    /// Record every action.
    #[default]
    Detailed,
}

/// Options for one simulation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimOptions {
    /// Hard ceiling on the number of dequeued events; the sole termination guarantee.
    pub max_hops: usize,
    /// Reserved for UI pacing. Does not affect the simulation semantics.
    pub step_mode: bool,
    /// How much detail the trace should carry.
    pub trace_level: TraceLevel,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            max_hops: 100,
            step_mode: false,
            trace_level: TraceLevel::Detailed,
        }
    }
}

/// The outcome of one simulation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// `true` only when the packet was delivered.
    pub success: bool,
    /// The packet reached a device that consumed it.
    pub delivered: bool,
    /// The packet was rejected by an access-control rule. Drops for other reasons (TTL expiry,
    /// VLAN rejection, missing routes) report `false` here.
    pub blocked: bool,
    /// Loop detection or the hop cap fired.
    #[serde(rename = "loop")]
    pub loop_detected: bool,
    /// The ordered hop-by-hop trace.
    pub trace: Vec<TraceHop>,
    /// Short human-readable summary, displayed verbatim by the UI.
    pub reason: String,
}

impl SimulationResult {
    /// A failure result with an empty trace.
    pub(crate) fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            delivered: false,
            blocked: false,
            loop_detected: false,
            trace: Vec::new(),
            reason: reason.into(),
        }
    }
}

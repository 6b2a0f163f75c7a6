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

//! # Topology model
//!
//! Canonical value types for nodes, interfaces, links, static routes and access-control rules.
//! A [`Topology`] is an immutable snapshot for the duration of one simulation: devices are
//! constructed from it at driver startup and discarded when the result is returned.

use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use crate::packet::{Packet, Protocol};
use crate::types::MacAddr;

/// The VLAN assumed for ports without an explicit VLAN configuration.
pub const DEFAULT_VLAN: u16 = 1;

/// Whether a switch port carries a single untagged VLAN or a set of tagged ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortMode {
    /// The port carries one untagged VLAN; tags are added on ingress and stripped on egress.
    Access,
    /// The port carries tagged frames for a set of allowed VLANs.
    Trunk,
}

/// A port on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    /// Stable identifier, unique within the owning node (conventionally `eth0`, `eth1`, ...).
    pub id: String,
    /// Hardware address. Unique per topology at creation; duplicates are tolerated but flagged
    /// by [`crate::graph::GraphAnalyzer::validate`].
    pub mac: MacAddr,
    /// IPv4 address with prefix length. Absent on pure layer-2 devices.
    pub ip: Option<Ipv4Net>,
    /// VLAN id for access ports.
    pub vlan: Option<u16>,
    /// Port mode; an absent mode behaves like an access port.
    pub mode: Option<PortMode>,
    /// Allowed-VLAN set for trunk ports. An absent set allows every VLAN.
    pub allowed_vlans: Option<BTreeSet<u16>>,
}

impl Interface {
    /// Create an interface without IP or VLAN configuration.
    pub fn new(id: impl Into<String>, mac: MacAddr) -> Self {
        Self {
            id: id.into(),
            mac,
            ip: None,
            vlan: None,
            mode: None,
            allowed_vlans: None,
        }
    }

    /// Assign an IPv4 address with prefix length.
    pub fn with_ip(mut self, ip: Ipv4Net) -> Self {
        self.ip = Some(ip);
        self
    }

    /// Configure the port as an access port in the given VLAN.
    pub fn access(mut self, vlan: u16) -> Self {
        self.mode = Some(PortMode::Access);
        self.vlan = Some(vlan);
        self
    }

    /// Configure the port as a trunk. An empty iterator leaves the trunk unrestricted.
    pub fn trunk(mut self, allowed: impl IntoIterator<Item = u16>) -> Self {
        self.mode = Some(PortMode::Trunk);
        let allowed: BTreeSet<u16> = allowed.into_iter().collect();
        self.allowed_vlans = (!allowed.is_empty()).then_some(allowed);
        self
    }

    /// The interface address without its prefix length.
    pub fn addr(&self) -> Option<Ipv4Addr> {
        self.ip.map(|net| net.addr())
    }
}

/// Host flavors. They all behave identically; the tag only drives the editor's iconography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKind {
    /// A generic end host.
    Host,
    /// A phone.
    Phone,
    /// A server.
    Server,
    /// A laptop.
    Laptop,
}

/// Static configuration of a switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchConfig {
    /// Whether the switch records source addresses; disabled switches always flood.
    pub mac_learning: bool,
    /// The VLAN database (ids >= 1).
    pub vlans: BTreeSet<u16>,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            mac_learning: true,
            vlans: BTreeSet::from([DEFAULT_VLAN]),
        }
    }
}

/// Static configuration of a router.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Static routes in configured order. Ordering only matters to break prefix-length ties.
    pub static_routes: Vec<StaticRoute>,
}

/// A static route entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticRoute {
    /// Destination prefix.
    pub prefix: Ipv4Net,
    /// Next-hop address, recorded in the trace.
    pub next_hop: Ipv4Addr,
    /// Id of the egress interface. Must name an existing interface on the router; routes to
    /// nonexistent interfaces are ignored, not fatal.
    pub iface: String,
}

impl StaticRoute {
    /// Create a static route.
    pub fn new(prefix: Ipv4Net, next_hop: Ipv4Addr, iface: impl Into<String>) -> Self {
        Self {
            prefix,
            next_hop,
            iface: iface.into(),
        }
    }
}

/// Static configuration of a firewall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirewallConfig {
    /// Access-control rules, evaluated in ascending `order`.
    pub rules: Vec<AclRule>,
    /// Applied when no rule matches.
    pub default_policy: AclAction,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            default_policy: AclAction::Allow,
        }
    }
}

/// What a matched access-control rule does with a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclAction {
    /// Let the packet through.
    Allow,
    /// Reject the packet.
    Deny,
}

impl fmt::Display for AclAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AclAction::Allow => "allow",
            AclAction::Deny => "deny",
        })
    }
}

/// An address pattern in an access-control rule: a single host or a CIDR range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IpMatch {
    /// Containment in a CIDR range.
    Net(Ipv4Net),
    /// Equality with a single address.
    Host(Ipv4Addr),
}

impl IpMatch {
    /// Check whether the pattern matches the given address.
    pub fn matches(&self, ip: Ipv4Addr) -> bool {
        match self {
            IpMatch::Net(net) => net.contains(&ip),
            IpMatch::Host(host) => *host == ip,
        }
    }
}

impl fmt::Display for IpMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpMatch::Net(net) => net.fmt(f),
            IpMatch::Host(host) => host.fmt(f),
        }
    }
}

impl FromStr for IpMatch {
    type Err = InvalidIpMatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('/') {
            s.parse::<Ipv4Net>().map(IpMatch::Net).ok()
        } else {
            s.parse::<Ipv4Addr>().map(IpMatch::Host).ok()
        }
        .ok_or_else(|| InvalidIpMatchError(s.to_string()))
    }
}

/// Error raised when parsing a malformed address pattern.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid address pattern: `{0}`")]
pub struct InvalidIpMatchError(pub String);

/// One access-control rule. A packet matches iff **every** configured clause matches; absent
/// clauses match anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AclRule {
    /// Stable identifier from the editor.
    pub id: String,
    /// Evaluation position; rules are evaluated in ascending order. Orders are total.
    pub order: u32,
    /// What to do when the rule matches.
    pub action: AclAction,
    /// Source-address clause.
    pub src: Option<IpMatch>,
    /// Destination-address clause.
    pub dst: Option<IpMatch>,
    /// Protocol clause.
    pub proto: Option<Protocol>,
    /// Source-port clause.
    pub src_port: Option<u16>,
    /// Destination-port clause.
    pub dst_port: Option<u16>,
}

impl AclRule {
    /// Create a rule matching everything, to be narrowed with the `with_*` builders.
    pub fn new(id: impl Into<String>, order: u32, action: AclAction) -> Self {
        Self {
            id: id.into(),
            order,
            action,
            src: None,
            dst: None,
            proto: None,
            src_port: None,
            dst_port: None,
        }
    }

    /// Add a source-address clause.
    pub fn with_src(mut self, src: IpMatch) -> Self {
        self.src = Some(src);
        self
    }

    /// Add a destination-address clause.
    pub fn with_dst(mut self, dst: IpMatch) -> Self {
        self.dst = Some(dst);
        self
    }

    /// Add a protocol clause.
    pub fn with_proto(mut self, proto: Protocol) -> Self {
        self.proto = Some(proto);
        self
    }

    /// Check whether the packet matches every configured clause.
    pub fn matches(&self, packet: &Packet) -> bool {
        if let Some(proto) = self.proto {
            if proto != packet.protocol {
                return false;
            }
        }
        if let Some(pattern) = self.src {
            match packet.src_ip {
                Some(ip) if pattern.matches(ip) => {}
                _ => return false,
            }
        }
        if let Some(pattern) = self.dst {
            match packet.dst_ip {
                Some(ip) if pattern.matches(ip) => {}
                _ => return false,
            }
        }
        if let Some(port) = self.src_port {
            if packet.src_port != Some(port) {
                return false;
            }
        }
        if let Some(port) = self.dst_port {
            if packet.dst_port != Some(port) {
                return false;
            }
        }
        true
    }
}

/// The device class of a node, carrying the type-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// An end device that originates and terminates packets. Never forwards.
    Host(HostKind),
    /// A layer-2 switch.
    Switch(SwitchConfig),
    /// A layer-3 router.
    Router(RouterConfig),
    /// A stateless packet filter.
    Firewall(FirewallConfig),
    /// An opaque endpoint that accepts anything arriving on its interface. Never originates.
    Cloud,
}

impl NodeKind {
    /// `true` for the device classes that may originate packets.
    pub fn is_host_like(&self) -> bool {
        matches!(self, NodeKind::Host(_))
    }
}

/// A device in the topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identifier.
    pub id: String,
    /// Display label, used in traces and diagnostics.
    pub label: String,
    /// Device class and configuration.
    pub kind: NodeKind,
    /// Configured interfaces, in order. The order is observable: it drives flood emission,
    /// directly-connected route lookup and the "first interface" origination rule.
    pub interfaces: Vec<Interface>,
}

impl Node {
    /// Create a node without interfaces.
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            interfaces: Vec::new(),
        }
    }

    /// Create a generic host.
    pub fn host(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, NodeKind::Host(HostKind::Host))
    }

    /// Create a switch.
    pub fn switch(id: impl Into<String>, label: impl Into<String>, config: SwitchConfig) -> Self {
        Self::new(id, label, NodeKind::Switch(config))
    }

    /// Create a router.
    pub fn router(id: impl Into<String>, label: impl Into<String>, config: RouterConfig) -> Self {
        Self::new(id, label, NodeKind::Router(config))
    }

    /// Create a firewall.
    pub fn firewall(
        id: impl Into<String>,
        label: impl Into<String>,
        config: FirewallConfig,
    ) -> Self {
        Self::new(id, label, NodeKind::Firewall(config))
    }

    /// Create a cloud endpoint.
    pub fn cloud(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, NodeKind::Cloud)
    }

    /// Append an interface.
    pub fn with_interface(mut self, iface: Interface) -> Self {
        self.interfaces.push(iface);
        self
    }

    /// Look up an interface by id.
    pub fn interface(&self, id: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.id == id)
    }

    /// The first configured interface, which hosts originate from.
    pub fn first_interface(&self) -> Option<&Interface> {
        self.interfaces.first()
    }
}

/// One side of a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Id of the attached node.
    pub node: String,
    /// Id of the attached interface on that node.
    pub iface: String,
}

/// An undirected edge between two `(node, interface)` endpoints.
///
/// A given `(node, interface)` pair appears in at most one link, and never on both sides of
/// the same link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// One endpoint.
    pub a: Endpoint,
    /// The other endpoint.
    pub b: Endpoint,
}

impl Link {
    /// Create a link between two `(node, interface)` endpoints.
    pub fn new(
        a_node: impl Into<String>,
        a_iface: impl Into<String>,
        b_node: impl Into<String>,
        b_iface: impl Into<String>,
    ) -> Self {
        Self {
            a: Endpoint {
                node: a_node.into(),
                iface: a_iface.into(),
            },
            b: Endpoint {
                node: b_node.into(),
                iface: b_iface.into(),
            },
        }
    }

    /// The opposite endpoint, if `(node, iface)` is one side of this link.
    pub fn peer_of(&self, node: &str, iface: &str) -> Option<&Endpoint> {
        if self.a.node == node && self.a.iface == iface {
            Some(&self.b)
        } else if self.b.node == node && self.b.iface == iface {
            Some(&self.a)
        } else {
            None
        }
    }
}

/// Find the `(node, interface)` connected to the given endpoint, if any link attaches to it.
pub fn peer_of<'a>(links: &'a [Link], node: &str, iface: &str) -> Option<&'a Endpoint> {
    links.iter().find_map(|link| link.peer_of(node, iface))
}

/// A complete network topology: the immutable input of one simulation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Topology {
    /// All devices.
    pub nodes: Vec<Node>,
    /// All links.
    pub links: Vec<Link>,
}

impl Topology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Add a node.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Add a link.
    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }
}

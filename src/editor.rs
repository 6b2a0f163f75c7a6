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

//! # Editor document conversion
//!
//! The graphical editor persists topologies as a `{nodes, edges}` JSON document with node
//! positions, connection handles and per-node configuration blobs. This module parses that
//! document and projects it onto the engine's [`Topology`].
//!
//! Conversion is deliberately lenient: the simulator is a teaching tool and must tolerate
//! partial configuration. A malformed address simply becomes an unconfigured field, a missing
//! hardware address is minted, and an edge handle that does not name an interface falls back
//! to the node's first interface. Only a syntactically broken JSON document is an error.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::packet::Protocol;
use crate::topology::{
    AclAction, AclRule, FirewallConfig, HostKind, Interface, IpMatch, Link, Node, NodeKind,
    PortMode, RouterConfig, StaticRoute, SwitchConfig, Topology, DEFAULT_VLAN,
};
use crate::types::MacAddr;

/// Error raised when a persisted document cannot be parsed at all.
#[derive(Error, Debug)]
pub enum EditorError {
    /// The document is not valid JSON (or not an object with `nodes`/`edges`).
    #[error("Malformed topology document: {0}")]
    Json(#[from] serde_json::Error),
}

/// A persisted editor document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Visual nodes.
    #[serde(default)]
    pub nodes: Vec<DocumentNode>,
    /// Visual edges.
    #[serde(default)]
    pub edges: Vec<DocumentEdge>,
}

/// A visual node: identifier, canvas position and configuration payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// Stable identifier, shared with the engine node.
    pub id: String,
    /// Canvas position; irrelevant to the engine but preserved on round trips.
    #[serde(default)]
    pub position: Position,
    /// The configuration payload.
    #[serde(default)]
    pub data: NodeData,
}

/// A canvas position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// The configuration payload of a visual node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeData {
    /// Display label; falls back to the node id when empty.
    pub label: String,
    /// Device type tag (`host`, `phone`, `server`, `laptop`, `switch`, `router`, `firewall`,
    /// `cloud`). Unknown tags convert as plain hosts.
    #[serde(rename = "type")]
    pub kind: String,
    /// The per-device configuration blob.
    pub config: NodeConfig,
}

/// Per-device configuration blob, a superset of all device classes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeConfig {
    /// Configured interfaces.
    pub interfaces: Vec<InterfaceConfig>,
    /// Switch: whether MAC learning is enabled (default on).
    pub mac_learning: Option<bool>,
    /// Switch: the VLAN database.
    pub vlans: Option<Vec<u16>>,
    /// Router: static routes.
    pub routes: Vec<RouteConfig>,
    /// Firewall: access-control rules.
    pub acl_rules: Vec<AclRuleConfig>,
    /// Firewall: default policy (`allow` unless it spells `deny`).
    pub default_policy: Option<String>,
}

/// One interface as the editor stores it. All fields except the id are free-form text and
/// parsed leniently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterfaceConfig {
    /// Interface identifier (`eth0`, ...).
    pub id: String,
    /// Hardware address in colon-hex; minted when missing or malformed.
    pub mac: Option<String>,
    /// IPv4 address, `a.b.c.d/len` or a bare address (treated as `/32`).
    pub ip: Option<String>,
    /// Access VLAN id.
    pub vlan: Option<u16>,
    /// Port mode, `access` or `trunk`.
    pub mode: Option<String>,
    /// Allowed VLANs on a trunk.
    pub allowed_vlans: Option<Vec<u16>>,
}

/// One static route as the editor stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteConfig {
    /// Destination prefix in CIDR notation.
    pub prefix: String,
    /// Next-hop address.
    pub next_hop: String,
    /// Egress interface id.
    pub iface: String,
}

/// One access-control rule as the editor stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AclRuleConfig {
    /// Rule identifier.
    pub id: String,
    /// Evaluation position.
    pub order: u32,
    /// `allow` or `deny`.
    pub action: String,
    /// Source pattern: `any`, an address, or a CIDR range.
    pub src_ip: Option<String>,
    /// Destination pattern, same syntax.
    pub dst_ip: Option<String>,
    /// Protocol: `any`, `tcp`, `udp`, `icmp`, `arp`.
    pub protocol: Option<String>,
    /// Source-port clause.
    pub src_port: Option<u16>,
    /// Destination-port clause.
    pub dst_port: Option<u16>,
}

/// A visual edge. Handle ids carry a trailing `-source`/`-target` suffix naming the interface
/// they attach to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentEdge {
    /// Edge identifier.
    pub id: String,
    /// Id of the source node.
    pub source: String,
    /// Id of the target node.
    pub target: String,
    /// Source connection handle.
    pub source_handle: Option<String>,
    /// Target connection handle.
    pub target_handle: Option<String>,
}

impl Document {
    /// Parse a persisted document.
    pub fn from_json(s: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize for persistence (browser storage or file download).
    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Project the document onto the engine topology.
    pub fn to_topology(&self) -> Topology {
        let mut minter = MacMinter::default();
        let mut topology = Topology::new();
        for node in &self.nodes {
            topology.add_node(convert_node(node, &mut minter));
        }
        for edge in &self.edges {
            let Some(src_iface) = handle_iface(&topology, &edge.source, edge.source_handle.as_deref())
            else {
                continue;
            };
            let Some(dst_iface) = handle_iface(&topology, &edge.target, edge.target_handle.as_deref())
            else {
                continue;
            };
            topology.add_link(Link::new(&edge.source, src_iface, &edge.target, dst_iface));
        }
        topology
    }
}

/// Resolve an edge handle to an interface id: strip the `-source`/`-target` suffix, fall back
/// to the node's first interface, then to the conventional `eth0`. Returns `None` only when
/// the edge references an unknown node.
fn handle_iface(topology: &Topology, node_id: &str, handle: Option<&str>) -> Option<String> {
    let node = topology.node(node_id)?;
    if let Some(handle) = handle {
        let stripped = handle
            .strip_suffix("-source")
            .or_else(|| handle.strip_suffix("-target"))
            .unwrap_or(handle);
        if node.interface(stripped).is_some() {
            return Some(stripped.to_string());
        }
    }
    Some(
        node.first_interface()
            .map(|iface| iface.id.clone())
            .unwrap_or_else(|| "eth0".to_string()),
    )
}

fn convert_node(node: &DocumentNode, minter: &mut MacMinter) -> Node {
    let data = &node.data;
    let kind = match data.kind.as_str() {
        "phone" => NodeKind::Host(HostKind::Phone),
        "server" => NodeKind::Host(HostKind::Server),
        "laptop" => NodeKind::Host(HostKind::Laptop),
        "switch" => NodeKind::Switch(SwitchConfig {
            mac_learning: data.config.mac_learning.unwrap_or(true),
            vlans: match &data.config.vlans {
                Some(vlans) if !vlans.is_empty() => vlans.iter().copied().collect(),
                _ => BTreeSet::from([DEFAULT_VLAN]),
            },
        }),
        "router" => NodeKind::Router(RouterConfig {
            static_routes: data.config.routes.iter().filter_map(convert_route).collect(),
        }),
        "firewall" => NodeKind::Firewall(FirewallConfig {
            rules: data.config.acl_rules.iter().map(convert_rule).collect(),
            default_policy: match data.config.default_policy.as_deref() {
                Some("deny") => AclAction::Deny,
                _ => AclAction::Allow,
            },
        }),
        "cloud" => NodeKind::Cloud,
        // "host" and anything unrecognized
        _ => NodeKind::Host(HostKind::Host),
    };
    let label = if data.label.is_empty() {
        node.id.clone()
    } else {
        data.label.clone()
    };
    let mut converted = Node::new(&node.id, label, kind);
    for iface in &data.config.interfaces {
        converted.interfaces.push(convert_interface(iface, minter));
    }
    converted
}

fn convert_interface(iface: &InterfaceConfig, minter: &mut MacMinter) -> Interface {
    let mac = iface
        .mac
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| minter.mint());
    Interface {
        id: iface.id.clone(),
        mac,
        ip: iface.ip.as_deref().and_then(parse_ip),
        vlan: iface.vlan,
        mode: match iface.mode.as_deref() {
            Some("access") => Some(PortMode::Access),
            Some("trunk") => Some(PortMode::Trunk),
            _ => None,
        },
        allowed_vlans: iface
            .allowed_vlans
            .as_ref()
            .filter(|vlans| !vlans.is_empty())
            .map(|vlans| vlans.iter().copied().collect()),
    }
}

fn convert_route(route: &RouteConfig) -> Option<StaticRoute> {
    Some(StaticRoute {
        prefix: route.prefix.parse().ok()?,
        next_hop: route.next_hop.parse().ok()?,
        iface: route.iface.clone(),
    })
}

fn convert_rule(rule: &AclRuleConfig) -> AclRule {
    AclRule {
        id: rule.id.clone(),
        order: rule.order,
        action: match rule.action.as_str() {
            "deny" => AclAction::Deny,
            _ => AclAction::Allow,
        },
        src: parse_ip_match(rule.src_ip.as_deref()),
        dst: parse_ip_match(rule.dst_ip.as_deref()),
        proto: match rule.protocol.as_deref() {
            None | Some("any") | Some("") => None,
            Some("tcp") => Some(Protocol::Tcp),
            Some("udp") => Some(Protocol::Udp),
            Some("icmp") => Some(Protocol::Icmp),
            Some("arp") => Some(Protocol::Arp),
            Some(_) => Some(Protocol::Other),
        },
        src_port: rule.src_port,
        dst_port: rule.dst_port,
    }
}

fn parse_ip_match(pattern: Option<&str>) -> Option<IpMatch> {
    match pattern {
        None | Some("any") | Some("") => None,
        Some(s) => s.parse().ok(),
    }
}

/// Parse an interface address: CIDR notation, or a bare address treated as a /32.
fn parse_ip(s: &str) -> Option<ipnet::Ipv4Net> {
    if s.contains('/') {
        s.parse().ok()
    } else {
        ipnet::Ipv4Net::new(s.parse().ok()?, 32).ok()
    }
}

/// Mints deterministic locally-administered addresses for interfaces that arrive without one.
#[derive(Debug, Default)]
struct MacMinter {
    next: u16,
}

impl MacMinter {
    fn mint(&mut self) -> MacAddr {
        self.next += 1;
        let [hi, lo] = self.next.to_be_bytes();
        MacAddr([0x02, 0x00, 0x00, 0x00, hi, lo])
    }
}

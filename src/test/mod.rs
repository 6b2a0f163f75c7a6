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

//! Shared fixtures for the test suite.

mod test_simulator;

use std::net::Ipv4Addr;

use lazy_static::lazy_static;
use maplit::btreeset;

use crate::prelude::*;

lazy_static! {
    pub(crate) static ref MAC_A: MacAddr = "02:AA:00:00:00:01".parse().unwrap();
    pub(crate) static ref MAC_B: MacAddr = "02:AA:00:00:00:02".parse().unwrap();
    pub(crate) static ref MAC_R0: MacAddr = "02:AA:00:00:00:10".parse().unwrap();
    pub(crate) static ref MAC_R1: MacAddr = "02:AA:00:00:00:11".parse().unwrap();
    pub(crate) static ref MAC_F0: MacAddr = "02:AA:00:00:00:20".parse().unwrap();
    pub(crate) static ref MAC_F1: MacAddr = "02:AA:00:00:00:21".parse().unwrap();
    pub(crate) static ref MAC_P1: MacAddr = "02:AA:00:00:01:01".parse().unwrap();
    pub(crate) static ref MAC_P2: MacAddr = "02:AA:00:00:01:02".parse().unwrap();
    pub(crate) static ref MAC_S1X: MacAddr = "02:AA:00:00:02:01".parse().unwrap();
    pub(crate) static ref MAC_S1Y: MacAddr = "02:AA:00:00:02:02".parse().unwrap();
    pub(crate) static ref MAC_S2X: MacAddr = "02:AA:00:00:02:03".parse().unwrap();
    pub(crate) static ref MAC_S2Y: MacAddr = "02:AA:00:00:02:04".parse().unwrap();
    pub(crate) static ref IP_B: Ipv4Addr = "10.0.0.20".parse().unwrap();
}

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An ICMP packet towards `dst_mac`, originated by host A.
pub(crate) fn packet(dst_mac: MacAddr) -> Packet {
    Packet {
        id: "pkt-1".to_string(),
        src_mac: *MAC_A,
        dst_mac,
        src_ip: None,
        dst_ip: None,
        vlan: None,
        protocol: Protocol::Icmp,
        src_port: None,
        dst_port: None,
        ttl: 64,
        payload: None,
    }
}

/// Two hosts in one subnet behind a learning switch.
///
/// ```text
/// A --[p1]-- SW --[p2]-- B
/// ```
///
/// The access VLANs of `p1` and `p2` are parameters so the same fixture covers both the
/// connected and the VLAN-isolated case.
pub(crate) fn switched_pair(vlan_a: u16, vlan_b: u16) -> Topology {
    let mut topo = Topology::new();
    topo.add_node(
        Node::host("a", "Host A").with_interface(
            Interface::new("eth0", *MAC_A).with_ip("192.168.1.10/24".parse().unwrap()),
        ),
    );
    topo.add_node(
        Node::switch(
            "sw",
            "Switch",
            SwitchConfig {
                mac_learning: true,
                vlans: btreeset! {vlan_a, vlan_b},
            },
        )
        .with_interface(Interface::new("p1", *MAC_P1).access(vlan_a))
        .with_interface(Interface::new("p2", *MAC_P2).access(vlan_b)),
    );
    topo.add_node(
        Node::host("b", "Host B").with_interface(
            Interface::new("eth0", *MAC_B).with_ip("192.168.1.11/24".parse().unwrap()),
        ),
    );
    topo.add_link(Link::new("a", "eth0", "sw", "p1"));
    topo.add_link(Link::new("sw", "p2", "b", "eth0"));
    topo
}

/// Two hosts in different subnets joined by a router.
///
/// ```text
/// A (10.0.0.10/24) --- R (10.0.0.1/24 | 10.0.1.1/24) --- B (10.0.1.10/24)
/// ```
pub(crate) fn routed_pair() -> Topology {
    let mut topo = Topology::new();
    topo.add_node(
        Node::host("a", "Host A").with_interface(
            Interface::new("eth0", *MAC_A).with_ip("10.0.0.10/24".parse().unwrap()),
        ),
    );
    topo.add_node(
        Node::router("r", "Router", RouterConfig::default())
            .with_interface(
                Interface::new("eth0", *MAC_R0).with_ip("10.0.0.1/24".parse().unwrap()),
            )
            .with_interface(
                Interface::new("eth1", *MAC_R1).with_ip("10.0.1.1/24".parse().unwrap()),
            ),
    );
    topo.add_node(
        Node::host("b", "Host B").with_interface(
            Interface::new("eth0", *MAC_B).with_ip("10.0.1.10/24".parse().unwrap()),
        ),
    );
    topo.add_link(Link::new("a", "eth0", "r", "eth0"));
    topo.add_link(Link::new("r", "eth1", "b", "eth0"));
    topo
}

/// Two hosts in one subnet with a transparent firewall between them.
///
/// ```text
/// A (10.0.0.10/24) --- F --- B (10.0.0.20/24)
/// ```
pub(crate) fn firewalled_pair(rules: Vec<AclRule>, default_policy: AclAction) -> Topology {
    let mut topo = Topology::new();
    topo.add_node(
        Node::host("a", "Host A").with_interface(
            Interface::new("eth0", *MAC_A).with_ip("10.0.0.10/24".parse().unwrap()),
        ),
    );
    topo.add_node(
        Node::firewall(
            "f",
            "Firewall",
            FirewallConfig {
                rules,
                default_policy,
            },
        )
        .with_interface(Interface::new("eth0", *MAC_F0))
        .with_interface(Interface::new("eth1", *MAC_F1)),
    );
    topo.add_node(
        Node::host("b", "Host B").with_interface(
            Interface::new("eth0", *MAC_B).with_ip("10.0.0.20/24".parse().unwrap()),
        ),
    );
    topo.add_link(Link::new("a", "eth0", "f", "eth0"));
    topo.add_link(Link::new("f", "eth1", "b", "eth0"));
    topo
}

/// Two switches joined by two parallel links, one host on each switch.
///
/// ```text
///        .-[s1x]==[s2x]-.
/// A -- SW1              SW2 -- B
///        '-[s1y]==[s2y]-'
/// ```
///
/// All switch-to-switch ports are access VLAN 1; `b_vlan` sets the VLAN of B's port, so the
/// storm either reaches B (VLAN 1) or circulates until loop detection fires.
pub(crate) fn switch_loop(b_vlan: u16) -> Topology {
    let mut topo = Topology::new();
    topo.add_node(
        Node::host("a", "Host A").with_interface(
            Interface::new("eth0", *MAC_A).with_ip("192.168.1.10/24".parse().unwrap()),
        ),
    );
    topo.add_node(
        Node::switch("sw1", "Switch 1", SwitchConfig::default())
            .with_interface(Interface::new("pa", *MAC_P1).access(1))
            .with_interface(Interface::new("s1x", *MAC_S1X).access(1))
            .with_interface(Interface::new("s1y", *MAC_S1Y).access(1)),
    );
    topo.add_node(
        Node::switch("sw2", "Switch 2", SwitchConfig::default())
            .with_interface(Interface::new("s2x", *MAC_S2X).access(1))
            .with_interface(Interface::new("s2y", *MAC_S2Y).access(1))
            .with_interface(Interface::new("pb", *MAC_P2).access(b_vlan)),
    );
    topo.add_node(
        Node::host("b", "Host B").with_interface(
            Interface::new("eth0", *MAC_B).with_ip("192.168.1.11/24".parse().unwrap()),
        ),
    );
    topo.add_link(Link::new("a", "eth0", "sw1", "pa"));
    topo.add_link(Link::new("sw1", "s1x", "sw2", "s2x"));
    topo.add_link(Link::new("sw1", "s1y", "sw2", "s2y"));
    topo.add_link(Link::new("sw2", "pb", "b", "eth0"));
    topo
}

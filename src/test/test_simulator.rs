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

//! End-to-end simulations over small reference topologies.

use pretty_assertions::assert_eq;

use super::*;
use crate::prelude::*;

fn actions(result: &SimulationResult) -> Vec<TraceAction> {
    result.trace.iter().map(|hop| hop.action).collect()
}

fn nodes(result: &SimulationResult) -> Vec<&str> {
    result.trace.iter().map(|hop| hop.node.as_str()).collect()
}

#[test]
fn switched_connectivity() {
    init_logging();
    let topo = switched_pair(1, 1);
    let result = simulate(&topo, &PacketSpec::new("a", "b"), SimOptions::default());

    assert!(result.success);
    assert!(result.delivered);
    assert!(!result.blocked);
    assert!(!result.loop_detected);
    assert_eq!(
        actions(&result),
        vec![
            TraceAction::Forward,
            TraceAction::Learn,
            TraceAction::Receive,
            TraceAction::Flood,
            TraceAction::Deliver,
        ]
    );
    assert_eq!(nodes(&result), vec!["a", "sw", "sw", "sw", "b"]);
    // the switch learned A on its ingress port before flooding towards B
    assert!(result.trace[1].reason.contains("02:AA:00:00:00:01"));
    assert!(result.trace[1].reason.contains("p1"));
}

#[test]
fn vlan_isolation_on_one_switch() {
    let topo = switched_pair(10, 20);
    let result = simulate(&topo, &PacketSpec::new("a", "b"), SimOptions::default());

    assert!(!result.success);
    assert!(!result.delivered);
    assert!(!result.blocked);
    assert!(!result.loop_detected);
    // the flood finds no admissible egress, so nothing ever reaches B
    assert_eq!(result.trace.last().map(|h| h.action), Some(TraceAction::Flood));
    assert!(!nodes(&result).contains(&"b"));
    assert_eq!(result.reason, "Packet did not reach destination");
}

#[test]
fn routing_between_subnets() {
    let topo = routed_pair();
    let result = simulate(&topo, &PacketSpec::new("a", "b"), SimOptions::default());

    assert!(result.success);
    assert_eq!(
        actions(&result),
        vec![
            TraceAction::Forward,
            TraceAction::Receive,
            TraceAction::Route,
            TraceAction::Deliver,
        ]
    );
    let route_hop = &result.trace[2];
    assert_eq!(route_hop.node, "r");
    assert_eq!(
        route_hop.reason,
        "Routing to directly connected network via eth1"
    );
    // the router rewrote the source MAC to its egress interface and burned one TTL tick
    assert_eq!(route_hop.packet.src_mac, *MAC_R1);
    assert_eq!(route_hop.packet.ttl, 63);
}

#[test]
fn ttl_expiry_at_router() {
    let topo = routed_pair();
    let spec = PacketSpec::new("a", "b").with_ttl(1);
    let result = simulate(&topo, &spec, SimOptions::default());

    assert!(!result.delivered);
    assert!(!result.blocked);
    let last = result.trace.last().unwrap();
    assert_eq!(last.node, "r");
    assert_eq!(last.action, TraceAction::Drop);
    assert_eq!(last.reason, "TTL expired");
    assert_eq!(result.reason, "TTL expired");
}

#[test]
fn acl_deny_blocks() {
    let rules = vec![AclRule::new("r1", 1, AclAction::Deny)
        .with_dst(IpMatch::Host(*IP_B))
        .with_proto(Protocol::Icmp)];
    let topo = firewalled_pair(rules, AclAction::Allow);
    let result = simulate(&topo, &PacketSpec::new("a", "b"), SimOptions::default());

    assert!(!result.success);
    assert!(!result.delivered);
    assert!(result.blocked);
    let last = result.trace.last().unwrap();
    assert_eq!(last.action, TraceAction::AclDeny);
    assert_eq!(last.reason, "Denied by rule 1");
    assert_eq!(result.reason, "Denied by rule 1");
}

#[test]
fn acl_miss_falls_through_to_default_allow() {
    let rules = vec![AclRule::new("r1", 1, AclAction::Deny)
        .with_dst(IpMatch::Host(*IP_B))
        .with_proto(Protocol::Icmp)];
    let topo = firewalled_pair(rules, AclAction::Allow);
    let spec = PacketSpec::new("a", "b")
        .with_protocol(Protocol::Tcp)
        .with_ports(40000, 443);
    let result = simulate(&topo, &spec, SimOptions::default());

    assert!(result.success);
    assert!(actions(&result).contains(&TraceAction::AclAllow));
    assert_eq!(result.trace.last().map(|h| h.node.as_str()), Some("b"));
}

#[test]
fn disconnected_graph_fails_fast() {
    let mut topo = Topology::new();
    topo.add_node(
        Node::host("a", "Host A").with_interface(Interface::new("eth0", *MAC_A)),
    );
    topo.add_node(
        Node::host("b", "Host B").with_interface(Interface::new("eth0", *MAC_B)),
    );
    let result = simulate(&topo, &PacketSpec::new("a", "b"), SimOptions::default());

    assert!(!result.success);
    assert!(result.trace.is_empty());
    assert!(result.reason.contains("No path exists"));
}

#[test]
fn parallel_links_terminate() {
    // With B's port in VLAN 1 the unknown-unicast storm still reaches B before any triple
    // repeats, so the run ends in a delivery after a bounded trace.
    let topo = switch_loop(1);
    let result = simulate(&topo, &PacketSpec::new("a", "b"), SimOptions::default());

    assert!(result.delivered);
    assert!(result.trace.len() < 32);
}

#[test]
fn unknown_unicast_storm_trips_loop_detection() {
    // With B's port in VLAN 2, the frame circulates between the two switches until the same
    // (node, interface, packet) triple comes around again.
    let topo = switch_loop(2);
    let result = simulate(&topo, &PacketSpec::new("a", "b"), SimOptions::default());

    assert!(!result.success);
    assert!(!result.delivered);
    assert!(result.loop_detected);
    assert!(result.reason.starts_with("Loop detected"));
}

#[test]
fn hop_cap_bounds_the_storm() {
    let topo = switch_loop(2);
    let opts = SimOptions {
        max_hops: 3,
        ..SimOptions::default()
    };
    let result = simulate(&topo, &PacketSpec::new("a", "b"), opts);

    assert!(result.loop_detected);
    assert_eq!(result.reason, "Max hops exceeded");
}

#[test]
fn simulation_is_deterministic() {
    let topo = switch_loop(2);
    let spec = PacketSpec::new("a", "b");
    let first = simulate(&topo, &spec, SimOptions::default());
    let second = simulate(&topo, &spec, SimOptions::default());
    assert_eq!(first, second);
}

#[test]
fn trace_times_are_monotone() {
    let topo = switch_loop(2);
    let result = simulate(&topo, &PacketSpec::new("a", "b"), SimOptions::default());
    for window in result.trace.windows(2) {
        assert!(window[0].time <= window[1].time);
    }
}

#[test]
fn minimal_trace_level_suppresses_receive_and_learn() {
    let topo = switched_pair(1, 1);
    let opts = SimOptions {
        trace_level: TraceLevel::Minimal,
        ..SimOptions::default()
    };
    let result = simulate(&topo, &PacketSpec::new("a", "b"), opts);

    assert!(result.success);
    assert_eq!(
        actions(&result),
        vec![TraceAction::Forward, TraceAction::Flood, TraceAction::Deliver]
    );
}

#[test]
fn unknown_nodes_fail_with_reason() {
    let topo = switched_pair(1, 1);
    let result = simulate(&topo, &PacketSpec::new("nope", "b"), SimOptions::default());
    assert_eq!(result.reason, "Source node nope not found");
    assert!(result.trace.is_empty());

    let result = simulate(&topo, &PacketSpec::new("a", "nope"), SimOptions::default());
    assert_eq!(result.reason, "Destination node nope not found");
}

#[test]
fn only_hosts_originate() {
    let topo = switched_pair(1, 1);
    let result = simulate(&topo, &PacketSpec::new("sw", "b"), SimOptions::default());
    assert!(!result.success);
    assert_eq!(result.reason, "Source device Switch cannot originate packets");
}

#[test]
fn cloud_accepts_anything() {
    let mut topo = Topology::new();
    topo.add_node(
        Node::host("a", "Host A").with_interface(
            Interface::new("eth0", *MAC_A).with_ip("192.168.1.10/24".parse().unwrap()),
        ),
    );
    topo.add_node(
        Node::cloud("net", "Internet").with_interface(Interface::new("eth0", *MAC_B)),
    );
    topo.add_link(Link::new("a", "eth0", "net", "eth0"));
    let result = simulate(&topo, &PacketSpec::new("a", "net"), SimOptions::default());

    assert!(result.success);
    assert_eq!(result.trace.last().map(|h| h.action), Some(TraceAction::Deliver));
    assert_eq!(result.reason, "Accepted by Internet");
}

#[test]
fn host_without_link_drops_at_origination() {
    let mut topo = Topology::new();
    topo.add_node(
        Node::host("a", "Host A").with_interface(Interface::new("eth0", *MAC_A)),
    );
    topo.add_node(
        Node::host("b", "Host B").with_interface(Interface::new("eth0", *MAC_B)),
    );
    // a link keeps the pair in one component, but it is attached to an unrelated port
    topo.add_node(
        Node::switch("sw", "Switch", SwitchConfig::default())
            .with_interface(Interface::new("p1", *MAC_P1))
            .with_interface(Interface::new("p2", *MAC_P2)),
    );
    topo.add_link(Link::new("a", "eth1", "sw", "p1"));
    topo.add_link(Link::new("sw", "p2", "b", "eth0"));
    let result = simulate(&topo, &PacketSpec::new("a", "b"), SimOptions::default());

    assert!(!result.success);
    assert_eq!(result.trace.last().map(|h| h.action), Some(TraceAction::Drop));
    assert_eq!(result.reason, "No link connected");
}

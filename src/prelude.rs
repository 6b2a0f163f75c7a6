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

//! Convenient re-export of the most commonly used types.

pub use crate::device::{Device, DeviceOutcome};
pub use crate::editor::{Document, EditorError};
pub use crate::event::{Event, EventQueue};
pub use crate::graph::GraphAnalyzer;
pub use crate::mac_table::{MacTable, MacTableEntry};
pub use crate::packet::{Packet, PacketSpec, Protocol, DEFAULT_TTL};
pub use crate::sim::{simulate, Simulator};
pub use crate::topology::{
    peer_of, AclAction, AclRule, Endpoint, FirewallConfig, HostKind, Interface, IpMatch, Link,
    Node, NodeKind, PortMode, RouterConfig, StaticRoute, SwitchConfig, Topology, DEFAULT_VLAN,
};
pub use crate::types::{
    MacAddr, SimOptions, SimulationResult, TraceAction, TraceHop, TraceLevel,
};

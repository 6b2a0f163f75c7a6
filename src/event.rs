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

//! Module defining events and the event queue.
//!
//! The queue is strict FIFO: events are processed in the order they were enqueued, which makes
//! the total order of traces deterministic for a fixed topology and packet specification. The
//! queue also owns the monotone logical clock, ticked once per dequeued event.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::packet::Packet;
use crate::types::Time;

/// A scheduled packet delivery to one `(node, interface)` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The packet being delivered.
    pub packet: Packet,
    /// Id of the target node.
    pub node: String,
    /// Id of the target interface on that node.
    pub iface: String,
    /// Logical clock value at enqueue time.
    pub time: Time,
}

impl Event {
    /// Create a new delivery event.
    pub fn new(
        packet: Packet,
        node: impl Into<String>,
        iface: impl Into<String>,
        time: Time,
    ) -> Self {
        Self {
            packet,
            node: node.into(),
            iface: iface.into(),
            time,
        }
    }
}

/// FIFO event queue with a monotone logical clock.
///
/// One queue lives exactly as long as one simulation call; nothing is shared across calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventQueue {
    events: VecDeque<Event>,
    time: Time,
}

impl EventQueue {
    /// Create a new empty event queue at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a new event.
    pub fn push(&mut self, event: Event) {
        self.events.push_back(event)
    }

    /// Pop the next event.
    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Peek the next event.
    pub fn peek(&self) -> Option<&Event> {
        self.events.front()
    }

    /// Advance the clock by one tick and return the new time.
    pub fn tick(&mut self) -> Time {
        self.time += 1;
        self.time
    }

    /// The current logical time.
    pub fn time(&self) -> Time {
        self.time
    }

    /// Get the number of enqueued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no event is enqueued.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

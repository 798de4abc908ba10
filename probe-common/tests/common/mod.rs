// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! In-memory USB bus for driving a real `UsbDevice` from host tests.
//!
//! The test plays the host through [`Host`]: it queues bus events, then
//! polls the device and inspects what was written to or stalled on EP0.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use usb_device::bus::{PollResult, UsbBus, UsbBusAllocator};
use usb_device::endpoint::{EndpointAddress, EndpointType};
use usb_device::{Result, UsbDirection, UsbError};

pub const EP0_OUT: u8 = 0x00;
pub const EP0_IN: u8 = 0x80;

/// bmRequestType for a class request to an interface.
pub const CLASS_INTERFACE_OUT: u8 = 0x21;
pub const CLASS_INTERFACE_IN: u8 = 0xa1;
/// bmRequestType for a standard request to the device.
pub const STANDARD_DEVICE_OUT: u8 = 0x00;
pub const STANDARD_DEVICE_IN: u8 = 0x80;

pub const SET_CONFIGURATION: u8 = 9;
pub const GET_DESCRIPTOR: u8 = 6;
pub const DESCRIPTOR_CONFIGURATION: u16 = 2;

enum Event {
    Reset,
    Setup([u8; 8]),
    Out(Vec<u8>),
    InComplete(u16),
}

struct State {
    events: VecDeque<Event>,
    ep0_out: Option<Vec<u8>>,
    written: Vec<(u8, Vec<u8>)>,
    stalled: HashSet<u8>,
    next_index: [usize; 2],
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap()
}

pub struct MockBus {
    state: Arc<Mutex<State>>,
}

/// Host side of a [`MockBus`].
#[derive(Clone)]
pub struct Host {
    state: Arc<Mutex<State>>,
}

/// How the device answered a control request.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    /// Data stage bytes for IN, an empty status packet for OUT.
    Data(Vec<u8>),
    Stall,
    /// Nothing written and nothing stalled.
    Silent,
}

pub fn allocator() -> (UsbBusAllocator<MockBus>, Host) {
    let state = Arc::new(Mutex::new(State {
        events: VecDeque::new(),
        ep0_out: None,
        written: Vec::new(),
        stalled: HashSet::new(),
        next_index: [1, 1],
    }));
    let bus = MockBus {
        state: Arc::clone(&state),
    };
    (UsbBusAllocator::new(bus), Host { state })
}

pub fn setup_packet(request_type: u8, request: u8, value: u16, index: u16, length: u16) -> [u8; 8] {
    let [v0, v1] = value.to_le_bytes();
    let [i0, i1] = index.to_le_bytes();
    let [l0, l1] = length.to_le_bytes();
    [request_type, request, v0, v1, i0, i1, l0, l1]
}

impl Host {
    pub fn setup(&self, packet: [u8; 8]) {
        lock(&self.state).events.push_back(Event::Setup(packet));
    }

    /// Zero-length OUT packet ending an IN transfer.
    pub fn status_out(&self) {
        lock(&self.state).events.push_back(Event::Out(Vec::new()));
    }

    /// Host collected the last packet written to EP0 IN.
    pub fn ep0_in_complete(&self) {
        lock(&self.state).events.push_back(Event::InComplete(1));
    }

    /// Host collected a packet on a non-control IN endpoint.
    pub fn endpoint_in_complete(&self, index: usize) {
        lock(&self.state)
            .events
            .push_back(Event::InComplete(1 << index));
    }

    pub fn bus_reset(&self) {
        lock(&self.state).events.push_back(Event::Reset);
    }

    pub fn ep0_stalled(&self) -> bool {
        lock(&self.state).stalled.contains(&EP0_IN)
    }

    /// Everything written to EP0 IN since the last call, concatenated, or
    /// `None` if nothing was written.
    pub fn take_ep0_in(&self) -> Option<Vec<u8>> {
        let mut state = lock(&self.state);
        let packets: Vec<Vec<u8>> = std::mem::take(&mut state.written)
            .into_iter()
            .filter(|(ep, _)| *ep == EP0_IN)
            .map(|(_, data)| data)
            .collect();
        if packets.is_empty() {
            None
        } else {
            Some(packets.concat())
        }
    }

    /// Outcome of the request whose SETUP was just serviced.
    pub fn reply(&self) -> Reply {
        let written = self.take_ep0_in();
        if self.ep0_stalled() {
            Reply::Stall
        } else {
            written.map_or(Reply::Silent, Reply::Data)
        }
    }
}

impl UsbBus for MockBus {
    fn alloc_ep(
        &mut self,
        ep_dir: UsbDirection,
        ep_addr: Option<EndpointAddress>,
        _ep_type: EndpointType,
        _max_packet_size: u16,
        _interval: u8,
    ) -> Result<EndpointAddress> {
        if let Some(addr) = ep_addr {
            return Ok(addr);
        }
        let mut state = lock(&self.state);
        let slot = match ep_dir {
            UsbDirection::Out => 0,
            UsbDirection::In => 1,
        };
        let index = state.next_index[slot];
        state.next_index[slot] += 1;
        Ok(EndpointAddress::from_parts(index, ep_dir))
    }

    fn enable(&mut self) {}

    fn reset(&self) {
        let mut state = lock(&self.state);
        state.stalled.clear();
        state.ep0_out = None;
    }

    fn set_device_address(&self, _addr: u8) {}

    fn write(&self, ep_addr: EndpointAddress, buf: &[u8]) -> Result<usize> {
        lock(&self.state)
            .written
            .push((u8::from(ep_addr), buf.to_vec()));
        Ok(buf.len())
    }

    fn read(&self, ep_addr: EndpointAddress, buf: &mut [u8]) -> Result<usize> {
        if u8::from(ep_addr) != EP0_OUT {
            return Err(UsbError::WouldBlock);
        }
        let packet = lock(&self.state)
            .ep0_out
            .take()
            .ok_or(UsbError::WouldBlock)?;
        if packet.len() > buf.len() {
            return Err(UsbError::BufferOverflow);
        }
        buf[..packet.len()].copy_from_slice(&packet);
        Ok(packet.len())
    }

    fn set_stalled(&self, ep_addr: EndpointAddress, stalled: bool) {
        let mut state = lock(&self.state);
        if stalled {
            state.stalled.insert(u8::from(ep_addr));
        } else {
            state.stalled.remove(&u8::from(ep_addr));
        }
    }

    fn is_stalled(&self, ep_addr: EndpointAddress) -> bool {
        lock(&self.state).stalled.contains(&u8::from(ep_addr))
    }

    fn suspend(&self) {}

    fn resume(&self) {}

    fn poll(&self) -> PollResult {
        let mut state = lock(&self.state);
        match state.events.pop_front() {
            None => PollResult::None,
            Some(Event::Reset) => PollResult::Reset,
            Some(Event::Setup(packet)) => {
                // A SETUP token clears any protocol stall on EP0.
                state.stalled.remove(&EP0_OUT);
                state.stalled.remove(&EP0_IN);
                state.ep0_out = Some(packet.to_vec());
                PollResult::Data {
                    ep_out: 0,
                    ep_in_complete: 0,
                    ep_setup: 1,
                }
            }
            Some(Event::Out(packet)) => {
                state.ep0_out = Some(packet);
                PollResult::Data {
                    ep_out: 1,
                    ep_in_complete: 0,
                    ep_setup: 0,
                }
            }
            Some(Event::InComplete(mask)) => PollResult::Data {
                ep_out: 0,
                ep_in_complete: mask,
                ep_setup: 0,
            },
        }
    }
}

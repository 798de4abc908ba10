// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Negotiated configuration state and SET_CONFIGURATION observation.

use core::sync::atomic::{AtomicU8, Ordering};

use usb_device::class_prelude::*;
use usb_device::control::{Recipient, Request, RequestType};

use crate::descriptors::CONFIGURATION_VALUE;

/// Last configuration value selected by the host, 0 when unconfigured.
///
/// Single writer (the USB interrupt), any number of lock-free readers. A
/// main-line read may be one event stale; callers treat it as advisory.
pub struct ActiveConfiguration(AtomicU8);

impl ActiveConfiguration {
    pub const fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    pub fn get(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }

    pub fn is_configured(&self) -> bool {
        self.get() != 0
    }

    pub fn publish(&self, configuration: u8) {
        self.0.store(configuration, Ordering::Release);
    }
}

impl Default for ActiveConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

/// Passive USB class that records SET_CONFIGURATION requests without
/// answering them, so the device core can run its configuration chain once
/// the stack has finished servicing the event.
///
/// Must come first in the poll list so it sees the request before any
/// function class.
#[derive(Default)]
pub struct SetConfigWatch {
    pending: Option<u8>,
    bus_reset: bool,
}

impl SetConfigWatch {
    pub const fn new() -> Self {
        Self {
            pending: None,
            bus_reset: false,
        }
    }

    /// Record `req` if it is a SET_CONFIGURATION the device will accept.
    /// Returns whether it was recorded.
    pub fn observe(&mut self, req: &Request) -> bool {
        let is_set_config = req.request_type == RequestType::Standard
            && req.recipient == Recipient::Device
            && req.request == Request::SET_CONFIGURATION;
        if !is_set_config {
            return false;
        }

        match req.value {
            0 => self.pending = Some(0),
            v if v == CONFIGURATION_VALUE as u16 => self.pending = Some(CONFIGURATION_VALUE),
            _ => return false,
        }
        true
    }

    pub fn note_bus_reset(&mut self) {
        self.pending = None;
        self.bus_reset = true;
    }

    pub fn take_pending(&mut self) -> Option<u8> {
        self.pending.take()
    }

    pub fn take_bus_reset(&mut self) -> bool {
        core::mem::take(&mut self.bus_reset)
    }
}

impl<B: UsbBus> UsbClass<B> for SetConfigWatch {
    fn reset(&mut self) {
        self.note_bus_reset();
    }

    fn control_out(&mut self, xfer: ControlOut<B>) {
        // Leave the transfer pending; the device answers it.
        let req = *xfer.request();
        self.observe(&req);
    }
}

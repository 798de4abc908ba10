// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! DFU run-time function.
//!
//! Advertises DFU capability next to the device's other functions and turns a
//! host DFU_DETACH into a reboot into the system bootloader, which then
//! speaks DFU mode proper. Only the run-time requests are implemented:
//! DETACH, GETSTATUS and GETSTATE.

use usb_device::class_prelude::*;
use usb_device::control::{Recipient, Request, RequestType};
use usb_device::Result;

use super::chain::ConfigEvent;

pub const USB_CLASS_APPLICATION_SPECIFIC: u8 = 0xfe;
pub const DFU_SUBCLASS_FIRMWARE_UPGRADE: u8 = 0x01;
pub const DFU_PROTOCOL_RUNTIME: u8 = 0x01;

pub const DFU_TYPE_FUNCTIONAL: u8 = 0x21;
pub const DFU_WILL_DETACH: u8 = 1 << 3;
pub const DFU_MANIFESTATION_TOLERANT: u8 = 1 << 2;
pub const DFU_CAN_UPLOAD: u8 = 1 << 1;
pub const DFU_CAN_DNLOAD: u8 = 1 << 0;

pub const DFU_DETACH_TIMEOUT_MS: u16 = 255;
pub const DFU_TRANSFER_SIZE: u16 = 1024;
pub const DFU_VERSION: u16 = 0x011a;

pub const DFU_REQ_DETACH: u8 = 0;
pub const DFU_REQ_GETSTATUS: u8 = 3;
pub const DFU_REQ_GETSTATE: u8 = 5;

pub const DFU_STATUS_OK: u8 = 0x00;
pub const DFU_STATE_APP_IDLE: u8 = 0;

/// Run-time DFU functional descriptor body (after bLength/bDescriptorType).
pub const FUNCTIONAL_DESCRIPTOR: [u8; 7] = {
    let timeout = DFU_DETACH_TIMEOUT_MS.to_le_bytes();
    let transfer = DFU_TRANSFER_SIZE.to_le_bytes();
    let version = DFU_VERSION.to_le_bytes();
    [
        DFU_CAN_DNLOAD | DFU_WILL_DETACH,
        timeout[0],
        timeout[1],
        transfer[0],
        transfer[1],
        version[0],
        version[1],
    ]
};

/// GETSTATUS reply while in application mode.
pub const APP_IDLE_STATUS: [u8; 6] = [DFU_STATUS_OK, 0, 0, 0, DFU_STATE_APP_IDLE, 0];

/// Device-specific action taken once a detach has been acknowledged.
pub trait DetachHandler {
    fn detach(&mut self);
}

/// Progress of a DFU_DETACH request.
///
/// The reboot must wait until the host has seen the status stage, so the
/// request is only acted on at the first poll after the one that accepted it.
///
/// Classes are polled once per serviced bus event without being told which
/// endpoint it was for. Idle polls do not count, but an event on another
/// endpoint (CDC bulk traffic, say) landing between the DETACH setup and its
/// status ZLP does, and then the reboot can overtake the status stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DetachState {
    Idle,
    Accepted,
    StatusSent,
}

/// What a poll should do about a pending detach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetachStep {
    Wait,
    Fire,
}

impl DetachState {
    pub fn advance(&mut self) -> DetachStep {
        match *self {
            DetachState::Idle => DetachStep::Wait,
            DetachState::Accepted => {
                *self = DetachState::StatusSent;
                DetachStep::Wait
            }
            DetachState::StatusSent => {
                *self = DetachState::Idle;
                DetachStep::Fire
            }
        }
    }
}

pub struct DfuRuntime<H: DetachHandler> {
    handler: H,
    iface: InterfaceNumber,
    configured: bool,
    detach: DetachState,
}

impl<H: DetachHandler> DfuRuntime<H> {
    pub fn new<B: UsbBus>(alloc: &UsbBusAllocator<B>, handler: H) -> Self {
        Self {
            handler,
            iface: alloc.interface(),
            configured: false,
            detach: DetachState::Idle,
        }
    }

    /// Configuration chain entry for this function.
    pub fn set_config(&mut self, event: &ConfigEvent) {
        self.configured = event.is_configured();
        self.detach = DetachState::Idle;
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn detach_state(&self) -> DetachState {
        self.detach
    }

    fn is_for_us(&self, req: &Request) -> bool {
        req.request_type == RequestType::Class
            && req.recipient == Recipient::Interface
            && req.index == u8::from(self.iface) as u16
    }
}

impl<H: DetachHandler, B: UsbBus> UsbClass<B> for DfuRuntime<H> {
    fn get_configuration_descriptors(&self, writer: &mut DescriptorWriter) -> Result<()> {
        writer.interface(
            self.iface,
            USB_CLASS_APPLICATION_SPECIFIC,
            DFU_SUBCLASS_FIRMWARE_UPGRADE,
            DFU_PROTOCOL_RUNTIME,
        )?;
        writer.write(DFU_TYPE_FUNCTIONAL, &FUNCTIONAL_DESCRIPTOR)
    }

    fn reset(&mut self) {
        self.configured = false;
        self.detach = DetachState::Idle;
    }

    fn poll(&mut self) {
        if self.detach.advance() == DetachStep::Fire {
            self.handler.detach();
        }
    }

    fn control_in(&mut self, xfer: ControlIn<B>) {
        let req = *xfer.request();
        if !self.is_for_us(&req) {
            return;
        }
        if !self.configured {
            xfer.reject().ok();
            return;
        }

        match req.request {
            DFU_REQ_GETSTATUS => {
                xfer.accept_with(&APP_IDLE_STATUS).ok();
            }
            DFU_REQ_GETSTATE => {
                xfer.accept_with(&[DFU_STATE_APP_IDLE]).ok();
            }
            _ => {
                xfer.reject().ok();
            }
        }
    }

    fn control_out(&mut self, xfer: ControlOut<B>) {
        let req = *xfer.request();
        if !self.is_for_us(&req) {
            return;
        }
        if !self.configured {
            xfer.reject().ok();
            return;
        }

        match req.request {
            DFU_REQ_DETACH => {
                self.detach = DetachState::Accepted;
                xfer.accept().ok();
            }
            _ => {
                xfer.reject().ok();
            }
        }
    }
}

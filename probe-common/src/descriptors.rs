// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! USB identity and descriptor layout of the probe.
//!
//! Endpoint and interface numbers are handed out by the bus allocator in the
//! order the functions are constructed; that order must match the order the
//! configuration chain is registered in.

pub const USB_VID: u16 = 0x1d50;
pub const USB_PID: u16 = 0x6018;
pub const DEVICE_RELEASE: u16 = 0x0100;

pub const MANUFACTURER: &str = "Black Magic Debug";
pub const PRODUCT: &str = "Black Magic Probe (STM32F072)";

/// The only configuration this device offers.
pub const CONFIGURATION_VALUE: u8 = 1;

pub const MAX_PACKET_SIZE_0: u8 = 64;

/// Control buffer size. The composite configuration descriptor and string
/// table do not fit the stack's 128-byte default.
pub const CONTROL_BUFFER_SIZE: usize = 256;

// Descriptor sizes that make up the configuration descriptor.
const CONFIGURATION_LEN: usize = 9;
const IAD_LEN: usize = 8;
const INTERFACE_LEN: usize = 9;
const ENDPOINT_LEN: usize = 7;
const CDC_HEADER_LEN: usize = 5;
const CDC_CALL_MANAGEMENT_LEN: usize = 5;
const CDC_ACM_LEN: usize = 4;
const CDC_UNION_LEN: usize = 5;
const DFU_FUNCTIONAL_LEN: usize = 9;

/// CDC-ACM: IAD, communication interface with its class descriptors and
/// notification endpoint, data interface with two bulk endpoints.
pub const SERIAL_FUNCTION_LEN: usize = IAD_LEN
    + INTERFACE_LEN
    + CDC_HEADER_LEN
    + CDC_CALL_MANAGEMENT_LEN
    + CDC_ACM_LEN
    + CDC_UNION_LEN
    + ENDPOINT_LEN
    + INTERFACE_LEN
    + 2 * ENDPOINT_LEN;

pub const DFU_FUNCTION_LEN: usize = INTERFACE_LEN + DFU_FUNCTIONAL_LEN;

pub const CONFIGURATION_DESCRIPTOR_LEN: usize =
    CONFIGURATION_LEN + SERIAL_FUNCTION_LEN + DFU_FUNCTION_LEN;

const _: () = assert!(CONFIGURATION_DESCRIPTOR_LEN <= CONTROL_BUFFER_SIZE);
const _: () = assert!(DFU_FUNCTIONAL_LEN == 2 + crate::usb::dfu::FUNCTIONAL_DESCRIPTOR.len());

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! USB serial number derived from the chip unique ID.
//!
//! Uses the same formula as the ST system bootloader so the probe and its
//! DFU-mode alter ego enumerate with one serial number.

use core::fmt::Write;

pub const SERIAL_NUMBER_LEN: usize = 12;

pub type SerialNumber = heapless::String<SERIAL_NUMBER_LEN>;

/// `uid` is the 96-bit unique ID as three little-endian words.
pub fn from_unique_id(uid: [u32; 3]) -> SerialNumber {
    let mut serial = SerialNumber::new();
    // 8 + 4 hex digits always fit.
    let _ = write!(
        serial,
        "{:08X}{:04X}",
        uid[0].wrapping_add(uid[2]),
        uid[1] >> 16
    );
    serial
}

/// Read the unique ID from its factory-programmed location.
///
/// # Safety
/// `ptr` must point at three readable, aligned `u32` words.
pub unsafe fn read_unique_id(ptr: *const u32) -> [u32; 3] {
    [
        ptr.read_volatile(),
        ptr.add(1).read_volatile(),
        ptr.add(2).read_volatile(),
    ]
}

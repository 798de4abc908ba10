// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Boot arbitration and USB bring-up logic for the probe firmware.
//!
//! Everything here is `no_std` and free of register access so it can be
//! tested on the host:
//! - Default: pure logic only
//! - `defmt` feature: `defmt::Format` on the public enums
//! - `embedded` feature: Cortex-M backed [`SystemReset`]

#![no_std]

pub mod arbiter;
pub mod boot_signal;
pub mod descriptors;
pub mod serial_number;
pub mod usb;

// Re-export commonly used types
pub use arbiter::{
    arbitrate, request_bootloader, BootDecision, BootPlatform, MemoryMap, SystemReset,
};
pub use boot_signal::{BootSignal, RawSignal, SignalStore, MAGIC0, MAGIC1};
pub use usb::{
    ActiveConfiguration, ConfigChain, ConfigEvent, SetConfigWatch, UsbCore, UsbFunctions,
};

/// System reset through the Cortex-M AIRCR register.
#[cfg(feature = "embedded")]
pub struct CortexReset;

#[cfg(feature = "embedded")]
impl SystemReset for CortexReset {
    fn system_reset(&mut self) -> ! {
        cortex_m::peripheral::SCB::sys_reset()
    }
}

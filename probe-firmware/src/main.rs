// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Debug probe firmware for STM32F072: boot arbitration and composite USB
//! bring-up (CDC-ACM serial bridge + DFU run-time).

#![no_std]
#![no_main]

mod peripherals;
mod platform;
mod usb;
mod usb_bus;

use defmt_rtt as _;
use panic_probe as _;
use stm32f0xx_hal::prelude::*;

use probe_common::serial_number::{self, SerialNumber};

defmt::timestamp!("{=u64:us}", { 0 });

use cortex_m_rt::entry;

#[entry]
fn main() -> ! {
    // Nothing may touch the clock tree or the boot signal before this.
    cortex_m::interrupt::disable();
    unsafe {
        probe_common::arbitrate(&mut platform::Stm32f0Boot, &mut platform::boot_signal());
    }

    defmt::println!("Probe init");

    let mut p = peripherals::init();

    let uid = unsafe { serial_number::read_unique_id(platform::UNIQUE_ID) };
    let serial = serial_number::from_unique_id(uid);
    defmt::println!("Serial number {}", serial.as_str());
    let serial: &'static SerialNumber =
        defmt::unwrap!(cortex_m::singleton!(: SerialNumber = serial));

    let usb = usb::init(defmt::unwrap!(p.usb.take()), serial.as_str());

    unsafe { cortex_m::interrupt::enable() };

    let mut was_configured = false;
    loop {
        let configured = usb.active_configuration() != 0;
        if configured != was_configured {
            defmt::println!("USB configuration {}", usb.active_configuration());
            was_configured = configured;
        }

        if configured {
            p.led_pin.set_high().ok();
        } else {
            p.led_pin.set_low().ok();
        }

        cortex_m::asm::wfi();
    }
}

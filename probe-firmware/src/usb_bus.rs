// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Binds the STM32F072 USB peripheral to the stm32-usbd bus driver.

use stm32f0xx_hal::gpio::gpioa::{PA11, PA12};
use stm32f0xx_hal::gpio::{Floating, Input};
use stm32f0xx_hal::pac::{RCC, USB};
use stm32_usbd::UsbPeripheral;

pub type UsbBusType = stm32_usbd::UsbBus<Peripheral>;

/// USB registers plus the D-/D+ pins they drive.
pub struct Peripheral {
    pub usb: USB,
    pub pin_dm: PA11<Input<Floating>>,
    pub pin_dp: PA12<Input<Floating>>,
}

unsafe impl Sync for Peripheral {}

unsafe impl UsbPeripheral for Peripheral {
    const REGISTERS: *const () = USB::ptr() as *const ();
    const DP_PULL_UP_FEATURE: bool = true;
    const EP_MEMORY: *const () = 0x4000_6000 as _;
    const EP_MEMORY_SIZE: usize = 1024;
    const EP_MEMORY_ACCESS_2X16: bool = true;

    fn enable() {
        let rcc = unsafe { &*RCC::ptr() };

        cortex_m::interrupt::free(|_| {
            rcc.apb1enr.modify(|_, w| w.usben().set_bit());
            rcc.apb1rstr.modify(|_, w| w.usbrst().set_bit());
            rcc.apb1rstr.modify(|_, w| w.usbrst().clear_bit());
        });
    }

    fn startup_delay() {
        // tSTARTUP is 1 us; 48 cycles at 48 MHz.
        cortex_m::asm::delay(48);
    }
}

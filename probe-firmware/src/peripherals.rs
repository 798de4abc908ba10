// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Clock tree and pin bring-up. Runs only after boot arbitration.

use stm32f0xx_hal as hal;
use hal::gpio::{gpioa, Output, PushPull};
use hal::prelude::*;
use hal::rcc::{HSEBypassMode, USBClockSource};

use crate::usb_bus;

pub type LedPin = gpioa::PA5<Output<PushPull>>;

pub struct Peripherals {
    pub led_pin: LedPin,
    pub usb: Option<usb_bus::Peripheral>,
}

/// 8 MHz HSE, 48 MHz SYSCLK from the PLL, USB clocked from the PLL.
pub fn init() -> Peripherals {
    let mut pac = unsafe { hal::pac::Peripherals::steal() };

    let mut rcc = pac
        .RCC
        .configure()
        .hse(8.mhz(), HSEBypassMode::NotBypassed)
        .sysclk(48.mhz())
        .pclk(24.mhz())
        .usbsrc(USBClockSource::PLL)
        .freeze(&mut pac.FLASH);

    let gpioa = pac.GPIOA.split(&mut rcc);
    let led_pin = cortex_m::interrupt::free(|cs| gpioa.pa5.into_push_pull_output(cs));

    Peripherals {
        led_pin,
        usb: Some(usb_bus::Peripheral {
            usb: pac.USB,
            pin_dm: gpioa.pa11,
            pin_dp: gpioa.pa12,
        }),
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! USB device core: one composite device (CDC-ACM serial + DFU run-time)
//! serviced entirely from the USB interrupt.

use core::ptr::addr_of_mut;

use cortex_m::peripheral::NVIC;
use probe_common::descriptors::{
    DEVICE_RELEASE, MANUFACTURER, MAX_PACKET_SIZE_0, PRODUCT, USB_PID, USB_VID,
};
use probe_common::usb::{
    ActiveConfiguration, ConfigCallback, ConfigChain, ConfigEvent, DetachHandler, DfuRuntime,
    UsbCore, UsbFunctions,
};
use stm32f0xx_hal::pac::{interrupt, Interrupt};
use usb_device::class_prelude::{UsbBusAllocator, UsbClass};
use usb_device::prelude::*;
use usbd_serial::SerialPort;

use crate::platform;
use crate::usb_bus::{self, UsbBusType};

/// Upper two bits are the only implemented priority bits on Cortex-M0.
pub const IRQ_PRI_USB: u8 = 1 << 6;

const MAX_FUNCTIONS: usize = 4;

/// Static storage for UsbBusAllocator (required by usb-device for 'static lifetime).
static mut USB_BUS: Option<UsbBusAllocator<UsbBusType>> = None;

/// Written once by [`init`] before the interrupt is unmasked, then owned by
/// the USB interrupt.
static mut USB_CORE: Option<Core> = None;

static ACTIVE_CONFIGURATION: ActiveConfiguration = ActiveConfiguration::new();

fn usb_bus_ref() -> &'static UsbBusAllocator<UsbBusType> {
    defmt::unwrap!(unsafe { (*addr_of_mut!(USB_BUS)).as_ref() })
}

fn store_usb_bus(bus: UsbBusAllocator<UsbBusType>) {
    unsafe {
        USB_BUS = Some(bus);
    }
}

/// DFU_DETACH reboots straight into the ROM bootloader.
pub struct BootloaderDetach;

impl DetachHandler for BootloaderDetach {
    fn detach(&mut self) {
        platform::request_boot();
    }
}

/// CDC-ACM endpoint of the serial bridge. The UART side attaches through
/// the port's read/write buffers.
pub struct SerialFunction {
    port: SerialPort<'static, UsbBusType>,
}

impl SerialFunction {
    fn new(bus: &'static UsbBusAllocator<UsbBusType>) -> Self {
        Self {
            port: SerialPort::new(bus),
        }
    }

    /// Data buffered under the previous configuration is stale either way.
    fn set_config(&mut self, event: &ConfigEvent) {
        UsbClass::<UsbBusType>::reset(&mut self.port);
        defmt::debug!("serial bridge configured={}", event.is_configured());
    }
}

/// Per-function state handed to the configuration chain.
pub struct Functions {
    pub serial: SerialFunction,
    pub dfu: DfuRuntime<BootloaderDetach>,
}

fn serial_set_config(functions: &mut Functions, event: &ConfigEvent) {
    functions.serial.set_config(event);
}

fn dfu_set_config(functions: &mut Functions, event: &ConfigEvent) {
    functions.dfu.set_config(event);
}

impl UsbFunctions<UsbBusType> for Functions {
    fn poll_with(
        &mut self,
        device: &mut UsbDevice<'_, UsbBusType>,
        first: &mut dyn UsbClass<UsbBusType>,
    ) -> bool {
        device.poll(&mut [first, &mut self.serial.port, &mut self.dfu])
    }
}

type Core = UsbCore<'static, UsbBusType, Functions, MAX_FUNCTIONS>;

fn build_core(
    bus: &'static UsbBusAllocator<UsbBusType>,
    serial_number: &'static str,
    active: &'static ActiveConfiguration,
) -> Core {
    // Construction order assigns interface and endpoint numbers and must
    // match the chain registration order below.
    let functions = Functions {
        serial: SerialFunction::new(bus),
        dfu: DfuRuntime::new(bus, BootloaderDetach),
    };

    let strings = [StringDescriptors::default()
        .manufacturer(MANUFACTURER)
        .product(PRODUCT)
        .serial_number(serial_number)];
    let builder = UsbDeviceBuilder::new(bus, UsbVidPid(USB_VID, USB_PID));
    let builder = defmt::unwrap!(builder.strings(&strings).ok());
    let builder = defmt::unwrap!(builder.max_packet_size_0(MAX_PACKET_SIZE_0).ok());
    let device = builder
        .composite_with_iads()
        .device_release(DEVICE_RELEASE)
        .build();

    let mut chain = ConfigChain::new();
    let callbacks: [ConfigCallback<Functions>; 2] = [serial_set_config, dfu_set_config];
    for callback in callbacks {
        if chain.register(callback).is_err() {
            defmt::panic!("configuration chain full");
        }
    }

    UsbCore::new(device, functions, chain, active)
}

/// Main-line view of the USB device.
#[derive(Clone, Copy)]
pub struct UsbHandle {
    active: &'static ActiveConfiguration,
}

impl UsbHandle {
    /// Last configuration selected by the host, 0 if not configured.
    pub fn active_configuration(&self) -> u8 {
        self.active.get()
    }
}

/// Bring up the USB device and unmask its interrupt. From here on the
/// interrupt may fire at any time.
pub fn init(peripheral: usb_bus::Peripheral, serial_number: &'static str) -> UsbHandle {
    store_usb_bus(UsbBusType::new(peripheral));

    let core = build_core(usb_bus_ref(), serial_number, &ACTIVE_CONFIGURATION);
    unsafe {
        USB_CORE = Some(core);
    }

    unsafe {
        let mut cp = cortex_m::Peripherals::steal();
        cp.NVIC.set_priority(Interrupt::USB, IRQ_PRI_USB);
        NVIC::unmask(Interrupt::USB);
    }

    defmt::println!("USB initialized");

    UsbHandle {
        active: &ACTIVE_CONFIGURATION,
    }
}

#[interrupt]
fn USB() {
    let Some(core) = (unsafe { (*addr_of_mut!(USB_CORE)).as_mut() }) else {
        return;
    };

    let outcome = core.poll();
    if outcome.bus_reset {
        defmt::debug!("USB bus reset");
    }
    if let Some(configuration) = outcome.configuration {
        defmt::info!("SET_CONFIGURATION {}", configuration);
    }
}

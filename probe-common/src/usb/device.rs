// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Composite device servicing: one pass of the USB stack, then the
//! configuration chain.

use usb_device::class_prelude::*;
use usb_device::device::UsbDevice;

use super::chain::ConfigChain;
use super::config::{ActiveConfiguration, SetConfigWatch};

/// The logical functions of a composite device, as the stack sees them.
pub trait UsbFunctions<B: UsbBus> {
    /// Poll `device` once. `first` must lead the class list, ahead of every
    /// function class, in the same order on every call.
    fn poll_with(&mut self, device: &mut UsbDevice<'_, B>, first: &mut dyn UsbClass<B>) -> bool;
}

/// What a single [`UsbCore::poll`] observed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollOutcome {
    pub bus_reset: bool,
    /// Configuration the chain was run for, if the host selected one.
    pub configuration: Option<u8>,
}

/// Device, SET_CONFIGURATION observer, functions and their configuration
/// chain, owned together by whoever services the USB interrupt.
pub struct UsbCore<'a, B: UsbBus, F, const N: usize> {
    device: UsbDevice<'a, B>,
    watch: SetConfigWatch,
    functions: F,
    chain: ConfigChain<F, N>,
    active: &'a ActiveConfiguration,
}

impl<'a, B, F, const N: usize> UsbCore<'a, B, F, N>
where
    B: UsbBus,
    F: UsbFunctions<B>,
{
    pub fn new(
        device: UsbDevice<'a, B>,
        functions: F,
        chain: ConfigChain<F, N>,
        active: &'a ActiveConfiguration,
    ) -> Self {
        Self {
            device,
            watch: SetConfigWatch::new(),
            functions,
            chain,
            active,
        }
    }

    /// Service one USB event. The chain only runs once the stack has
    /// returned, so every function sees a fully settled device; a bus reset
    /// deconfigures without running it.
    pub fn poll(&mut self) -> PollOutcome {
        self.functions.poll_with(&mut self.device, &mut self.watch);

        let mut outcome = PollOutcome::default();

        if self.watch.take_bus_reset() {
            self.active.publish(0);
            outcome.bus_reset = true;
        }

        if let Some(configuration) = self.watch.take_pending() {
            self.chain.apply(&mut self.functions, configuration, self.active);
            outcome.configuration = Some(configuration);
        }

        outcome
    }

    pub fn device(&self) -> &UsbDevice<'a, B> {
        &self.device
    }

    pub fn functions(&self) -> &F {
        &self.functions
    }

    pub fn active_configuration(&self) -> u8 {
        self.active.get()
    }
}

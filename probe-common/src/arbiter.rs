// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Early-boot arbitration between the probe application and the ROM
//! system bootloader.
//!
//! The decision logic is kept free of register access: the chip-specific
//! parts sit behind [`BootPlatform`], so the ordering below can be exercised
//! on the host with a recording platform.

use crate::boot_signal::{BootSignal, SignalStore};

/// Outcome of reading the boot signal on this reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootDecision {
    EnterBootloader,
    ContinueApplication,
}

impl BootDecision {
    /// Pure decision, no side effects on the signal.
    pub fn from_signal<S: SignalStore>(signal: &BootSignal<S>) -> Self {
        if signal.is_armed() {
            BootDecision::EnterBootloader
        } else {
            BootDecision::ContinueApplication
        }
    }
}

/// Which physical memory is aliased at address 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryMap {
    MainFlash,
    SystemMemory,
}

/// Software-requested system reset.
pub trait SystemReset {
    fn system_reset(&mut self) -> !;
}

/// Hardware operations the arbiter sequences.
pub trait BootPlatform: SystemReset {
    /// True while the clock configuration register holds its reset value.
    ///
    /// A non-default value means code already ran past clock setup and we
    /// got here by a stray re-entry (e.g. a USB bus reset handled by the
    /// ROM bootloader) rather than a clean reset. This heuristic is tied to
    /// the STM32F0 reset behaviour; re-derive it before reusing elsewhere.
    fn clock_config_is_reset_default(&self) -> bool;

    fn set_memory_map(&mut self, map: MemoryMap);

    /// Transfer control to the system bootloader entry point.
    ///
    /// # Safety
    /// Interrupts must be disabled, the stack pointer must be valid and
    /// system memory must already be mapped at address 0.
    unsafe fn enter_system_bootloader(&mut self) -> !;
}

/// Run boot arbitration. Returns only when the application should continue.
///
/// 1. Clock configuration not at reset default: reset and never return.
/// 2. Drop any memory remap left from a previous run.
/// 3. Armed signal: clear it, map system memory, jump into ROM.
/// 4. Otherwise return.
///
/// # Safety
/// Must run with interrupts disabled, before peripheral or USB bring-up and
/// before anything else touches the boot signal storage.
pub unsafe fn arbitrate<P, S>(platform: &mut P, signal: &mut BootSignal<S>)
where
    P: BootPlatform,
    S: SignalStore,
{
    if !platform.clock_config_is_reset_default() {
        platform.system_reset();
    }

    platform.set_memory_map(MemoryMap::MainFlash);

    if signal.consume() {
        platform.set_memory_map(MemoryMap::SystemMemory);
        platform.enter_system_bootloader();
    }
}

/// Arm the boot signal and reset. The ROM bootloader is entered on the next
/// boot, once [`arbitrate`] sees the armed signal.
pub fn request_bootloader<R, S>(signal: &mut BootSignal<S>, reset: &mut R) -> !
where
    R: SystemReset,
    S: SignalStore,
{
    signal.arm();
    reset.system_reset()
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! STM32F072 boot platform: boot signal storage, memory remap and the jump
//! into the system bootloader.

use core::mem::MaybeUninit;
use core::ptr::addr_of_mut;

use probe_common::{
    request_bootloader, BootPlatform, BootSignal, CortexReset, MemoryMap, RawSignal, SystemReset,
};

const RCC_CFGR: *const u32 = 0x4002_1004 as *const u32;
const RCC_CFGR_RESET_VALUE: u32 = 0;

const SYSCFG_CFGR1: *mut u32 = 0x4001_0000 as *mut u32;
const MEM_MODE_MASK: u32 = 0b11;
const MEM_MODE_MAIN_FLASH: u32 = 0b00;
const MEM_MODE_SYSTEM_FLASH: u32 = 0b01;

/// Reset vector of the factory bootloader (vector table at 0x1FFF_C800).
const SYSMEM_RESET_VECTOR: *const u32 = 0x1fff_c804 as *const u32;

pub const UNIQUE_ID: *const u32 = 0x1fff_f7ac as *const u32;

/// Boot signal storage. `.uninit` follows `.bss` and is never zero-filled
/// by the runtime, so the words survive a software reset.
#[unsafe(link_section = ".uninit.BOOT_SIGNAL")]
static mut BOOT_SIGNAL: MaybeUninit<[u32; 2]> = MaybeUninit::uninit();

/// The only accessor for the boot signal storage.
pub fn boot_signal() -> BootSignal<RawSignal> {
    let ptr = addr_of_mut!(BOOT_SIGNAL).cast::<u32>();
    BootSignal::new(unsafe { RawSignal::new(ptr) })
}

/// Arm the boot signal and reset into the system bootloader.
pub fn request_boot() -> ! {
    defmt::println!("Rebooting into system bootloader");
    request_bootloader(&mut boot_signal(), &mut CortexReset)
}

pub struct Stm32f0Boot;

impl SystemReset for Stm32f0Boot {
    fn system_reset(&mut self) -> ! {
        CortexReset.system_reset()
    }
}

impl BootPlatform for Stm32f0Boot {
    fn clock_config_is_reset_default(&self) -> bool {
        unsafe { RCC_CFGR.read_volatile() == RCC_CFGR_RESET_VALUE }
    }

    fn set_memory_map(&mut self, map: MemoryMap) {
        let mode = match map {
            MemoryMap::MainFlash => MEM_MODE_MAIN_FLASH,
            MemoryMap::SystemMemory => MEM_MODE_SYSTEM_FLASH,
        };
        unsafe {
            let cfgr1 = SYSCFG_CFGR1.read_volatile();
            SYSCFG_CFGR1.write_volatile((cfgr1 & !MEM_MODE_MASK) | mode);
        }
        cortex_m::asm::dsb();
        cortex_m::asm::isb();
    }

    /// Straight out of reset MSP is already valid and nothing needs
    /// de-initialising, so the ROM entry is called as a plain function.
    unsafe fn enter_system_bootloader(&mut self) -> ! {
        let entry = SYSMEM_RESET_VECTOR.read_volatile();
        let bootloader: extern "C" fn() -> ! = core::mem::transmute(entry as usize);
        bootloader()
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Persistent boot signal: a two-word magic pair that survives a warm reset.
//!
//! The storage sits outside every region the runtime zero-fills, so a value
//! written right before a software reset is still there when the next boot
//! reads it. After a power cycle the contents are undefined; the magic pair
//! is wide enough that garbage matching it is not a practical concern.

/// First word of the "bootloader requested" pair.
pub const MAGIC0: u32 = 0xB007_DA7A;
/// Second word of the "bootloader requested" pair.
pub const MAGIC1: u32 = 0xBAAD_FEED;

/// The armed value of the signal, in storage order.
pub const MAGIC_PAIR: [u32; 2] = [MAGIC0, MAGIC1];

/// Value left behind once the signal has been consumed.
pub const CLEARED: [u32; 2] = [0, 0];

/// Backing storage for a [`BootSignal`].
pub trait SignalStore {
    fn load(&self) -> [u32; 2];
    fn store(&mut self, words: [u32; 2]);
}

/// Plain RAM. Used by simulations, where re-wrapping the same array in a new
/// [`BootSignal`] stands in for a warm reset.
impl SignalStore for [u32; 2] {
    fn load(&self) -> [u32; 2] {
        *self
    }

    fn store(&mut self, words: [u32; 2]) {
        *self = words;
    }
}

impl<S: SignalStore + ?Sized> SignalStore for &mut S {
    fn load(&self) -> [u32; 2] {
        (**self).load()
    }

    fn store(&mut self, words: [u32; 2]) {
        (**self).store(words)
    }
}

/// Volatile view of two `u32` words at a fixed address.
///
/// The region is treated as a raw buffer: no slice or array bounds exist for
/// the compiler to reason about, every access is a single volatile word.
pub struct RawSignal {
    ptr: *mut u32,
}

impl RawSignal {
    /// # Safety
    /// `ptr` must be 4-byte aligned, valid for reads and writes of two `u32`
    /// words for the lifetime of the returned value, and not accessed
    /// through any other path meanwhile.
    pub const unsafe fn new(ptr: *mut u32) -> Self {
        Self { ptr }
    }
}

impl SignalStore for RawSignal {
    fn load(&self) -> [u32; 2] {
        unsafe { [self.ptr.read_volatile(), self.ptr.add(1).read_volatile()] }
    }

    fn store(&mut self, words: [u32; 2]) {
        unsafe {
            self.ptr.write_volatile(words[0]);
            self.ptr.add(1).write_volatile(words[1]);
        }
    }
}

/// One-shot "enter the system bootloader on next reset" flag.
pub struct BootSignal<S: SignalStore> {
    store: S,
}

impl<S: SignalStore> BootSignal<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Current raw contents.
    pub fn words(&self) -> [u32; 2] {
        self.store.load()
    }

    pub fn is_armed(&self) -> bool {
        self.store.load() == MAGIC_PAIR
    }

    /// Write the magic pair. Arming twice is the same as arming once.
    pub fn arm(&mut self) {
        self.store.store(MAGIC_PAIR);
    }

    /// Returns true and clears the signal if it was armed. Any other content
    /// is left exactly as found.
    pub fn consume(&mut self) -> bool {
        if !self.is_armed() {
            return false;
        }
        self.store.store(CLEARED);
        true
    }
}

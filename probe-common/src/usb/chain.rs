// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Ordered registry of per-function SET_CONFIGURATION handlers.

use super::config::ActiveConfiguration;

/// Context handed to every handler for one configuration-set event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigEvent {
    /// Configuration value selected by the host; 0 deconfigures.
    pub configuration: u8,
}

impl ConfigEvent {
    pub fn is_configured(&self) -> bool {
        self.configuration != 0
    }
}

/// A handler claims its function's interfaces and endpoints. It runs inside
/// the USB interrupt, must not block, and must tolerate being called again
/// whenever the host re-selects a configuration.
pub type ConfigCallback<Ctx> = fn(&mut Ctx, &ConfigEvent);

/// Handlers in registration order, populated once at init.
pub struct ConfigChain<Ctx, const N: usize> {
    callbacks: heapless::Vec<ConfigCallback<Ctx>, N>,
}

impl<Ctx, const N: usize> ConfigChain<Ctx, N> {
    pub const fn new() -> Self {
        Self {
            callbacks: heapless::Vec::new(),
        }
    }

    /// Append a handler. Hands the callback back if the chain is full.
    pub fn register(&mut self, callback: ConfigCallback<Ctx>) -> Result<(), ConfigCallback<Ctx>> {
        self.callbacks.push(callback)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Invoke every handler once, in registration order.
    pub fn dispatch(&self, ctx: &mut Ctx, event: &ConfigEvent) {
        for callback in self.callbacks.iter() {
            callback(ctx, event);
        }
    }

    /// Run the whole chain, then publish the new configuration. Readers of
    /// `active` never see the new value before every handler has finished.
    pub fn apply(&self, ctx: &mut Ctx, configuration: u8, active: &ActiveConfiguration) {
        self.dispatch(ctx, &ConfigEvent { configuration });
        active.publish(configuration);
    }
}

impl<Ctx, const N: usize> Default for ConfigChain<Ctx, N> {
    fn default() -> Self {
        Self::new()
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! USB device-side building blocks shared by the firmware functions.

pub mod chain;
pub mod config;
pub mod device;
pub mod dfu;

pub use chain::{ConfigCallback, ConfigChain, ConfigEvent};
pub use config::{ActiveConfiguration, SetConfigWatch};
pub use device::{PollOutcome, UsbCore, UsbFunctions};
pub use dfu::{DetachHandler, DetachState, DfuRuntime};

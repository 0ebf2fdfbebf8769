// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

#![deny(unsafe_op_in_unsafe_fn)]

//! The declarative installation configuration model: [`ProvisioningConfig`]
//! and its [`ProvisioningConfigBuilder`], [`FeaturePackConfig`] entries, and
//! the [`OptionMap`] they and the layout carry options in.

mod config;
mod error;
mod option_map;

pub use config::{
    ConvergencePolicy,
    FeaturePackConfig,
    ProvisioningConfig,
    ProvisioningConfigBuilder,
    VERSION_CONVERGENCE,
};
pub use error::{Error, Result};
pub use option_map::OptionMap;

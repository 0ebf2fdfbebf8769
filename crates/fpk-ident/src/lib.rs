// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

#![deny(unsafe_op_in_unsafe_fn)]

//! Immutable location identifiers for the fpk-layout provisioning engine:
//! producers, channels, builds and the feature-pack locations built from
//! them.

mod error;
mod location;
mod names;

pub use error::{Error, Result};
pub use location::{FeaturePackId, FeaturePackLocation, FullLocation, ProducerSpec};
pub use names::{Build, ChannelName, ProducerName, UniverseName};

// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

#![deny(unsafe_op_in_unsafe_fn)]

//! The feature-pack provisioning layout engine.
//!
//! [`Layout`] is the engine's public handle: built from a
//! [`fpk_config::ProvisioningConfig`] plus caller-supplied resolver
//! implementations, it resolves versions across a dependency graph,
//! converges conflicting branches, lays out feature packs on disk in
//! dependency order, applies patches, and aggregates resources and plugin
//! artifacts. [`Layout::install`], [`Layout::uninstall`] and
//! [`Layout::apply`] mutate the underlying config and rebuild; [`WorkArea`]
//! is the scoped, refcounted working directory all of this is written to.

mod builder;
mod error;
mod mutation;
mod options;
mod patch;
pub mod settings;
#[cfg(test)]
mod testutil;
mod workarea;

pub use builder::Layout;
pub use error::{Error, Result};
pub use mutation::ProvisioningPlan;
pub use workarea::WorkArea;

// Re-exported so a caller assembling a `Layout` never needs a direct
// dependency on the lower-level crates just to name their types.
pub use fpk_config::{
    ConvergencePolicy,
    FeaturePackConfig,
    ProvisioningConfig,
    ProvisioningConfigBuilder,
    VERSION_CONVERGENCE,
};
pub use fpk_ident::{Build, ChannelName, FeaturePackId, FeaturePackLocation, ProducerSpec};
pub use fpk_resolve::{
    ArtifactReference,
    ArtifactResolver,
    Channel,
    DeclaredDependency,
    FeaturePackKind,
    FeaturePackLayout,
    FeaturePackLayoutFactory,
    FeaturePackSpec,
    FeaturePackUpdatePlan,
    LayoutFactory,
    PluginDeclaration,
    PluginId,
    PluginOptionSpec,
    ProgressTracker,
    UniverseResolver,
    UpdateRequest,
};

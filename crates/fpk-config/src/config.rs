// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

use std::collections::BTreeMap;
use std::str::FromStr;

use fpk_ident::{FeaturePackId, FeaturePackLocation, ProducerSpec};

use crate::{Error, OptionMap, Result};

#[cfg(test)]
#[path = "./config_test.rs"]
mod config_test;

/// The name of the built-in option that selects the convergence policy.
pub const VERSION_CONVERGENCE: &str = "VERSION_CONVERGENCE";

/// `VERSION_CONVERGENCE` policy: what to do when two branches of the
/// dependency graph want different builds of the same producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConvergencePolicy {
    /// Accept whichever build was registered first (first-wins). Default.
    #[default]
    FirstProcessed,
    /// Fail the build, reporting every disagreeing `FeaturePackId`.
    Fail,
}

impl ConvergencePolicy {
    pub fn fails_on_convergence(self) -> bool {
        matches!(self, Self::Fail)
    }
}

impl FromStr for ConvergencePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "FIRST_PROCESSED" => Ok(Self::FirstProcessed),
            "FAIL" => Ok(Self::Fail),
            other => Err(Error::IllegalOptionValue {
                name: VERSION_CONVERGENCE.to_string(),
                value: other.to_string(),
                allowed: vec!["FIRST_PROCESSED", "FAIL"],
            }),
        }
    }
}

/// One entry in the installation configuration: a location, whether it was
/// pulled in transitively or listed directly, the patches to apply to it,
/// and its feature-pack-specific options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeaturePackConfig {
    pub location: FeaturePackLocation,
    pub transitive: bool,
    pub patches: Vec<FeaturePackId>,
    pub options: OptionMap,
}

impl FeaturePackConfig {
    pub fn new(location: FeaturePackLocation) -> Self {
        Self {
            location,
            transitive: false,
            patches: Vec::new(),
            options: OptionMap::new(),
        }
    }

    pub fn transitive(location: FeaturePackLocation) -> Self {
        Self {
            transitive: true,
            ..Self::new(location)
        }
    }

    pub fn producer_spec(&self) -> Option<ProducerSpec> {
        self.location.producer_spec()
    }

    pub fn with_patch(mut self, patch: FeaturePackId) -> Self {
        self.patches.push(patch);
        self
    }

    pub fn with_location(mut self, location: FeaturePackLocation) -> Self {
        self.location = location;
        self
    }
}

/// Immutable installation configuration: an ordered list of direct entries,
/// a set of transitive entries addressed by producer, global options, and
/// universe aliases.
///
/// `ProvisioningConfig` is never mutated in place. [`ProvisioningConfigBuilder`]
/// produces new instances from edits applied to a prior config (or from
/// scratch); the config type itself is never mutated in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProvisioningConfig {
    direct: Vec<FeaturePackConfig>,
    transitive: BTreeMap<ProducerSpec, FeaturePackConfig>,
    options: OptionMap,
    universe_aliases: BTreeMap<String, String>,
}

impl ProvisioningConfig {
    pub fn builder() -> ProvisioningConfigBuilder {
        ProvisioningConfigBuilder::default()
    }

    /// Starts a builder pre-populated with this config's current state, for
    /// incremental edits.
    pub fn to_builder(&self) -> ProvisioningConfigBuilder {
        ProvisioningConfigBuilder {
            direct: self.direct.clone(),
            transitive: self.transitive.clone(),
            options: self.options.clone(),
            universe_aliases: self.universe_aliases.clone(),
        }
    }

    pub fn direct_entries(&self) -> &[FeaturePackConfig] {
        &self.direct
    }

    pub fn transitive_entries(&self) -> impl Iterator<Item = &FeaturePackConfig> {
        self.transitive.values()
    }

    pub fn get_direct(&self, producer: &ProducerSpec) -> Option<&FeaturePackConfig> {
        self.direct
            .iter()
            .find(|entry| entry.producer_spec().as_ref() == Some(producer))
    }

    pub fn get_direct_index(&self, producer: &ProducerSpec) -> Option<usize> {
        self.direct
            .iter()
            .position(|entry| entry.producer_spec().as_ref() == Some(producer))
    }

    pub fn get_transitive(&self, producer: &ProducerSpec) -> Option<&FeaturePackConfig> {
        self.transitive.get(producer)
    }

    pub fn has_feature_packs(&self) -> bool {
        !self.direct.is_empty()
    }

    pub fn options(&self) -> &OptionMap {
        &self.options
    }

    pub fn universe_aliases(&self) -> &BTreeMap<String, String> {
        &self.universe_aliases
    }

    pub fn convergence_policy(&self) -> Result<ConvergencePolicy> {
        match self.options.get(VERSION_CONVERGENCE) {
            Some(value) => value.parse(),
            None => Ok(ConvergencePolicy::default()),
        }
    }
}

/// Builds new [`ProvisioningConfig`] instances from an existing config plus
/// a sequence of edits, or from scratch.
#[derive(Clone, Debug, Default)]
pub struct ProvisioningConfigBuilder {
    direct: Vec<FeaturePackConfig>,
    transitive: BTreeMap<ProducerSpec, FeaturePackConfig>,
    options: OptionMap,
    universe_aliases: BTreeMap<String, String>,
}

impl ProvisioningConfigBuilder {
    /// Appends a new direct entry at the end of the direct list.
    pub fn append_direct(mut self, entry: FeaturePackConfig) -> Self {
        self.direct.push(entry);
        self
    }

    /// Inserts a direct entry at `index`, shifting later entries back.
    pub fn insert_direct(mut self, index: usize, entry: FeaturePackConfig) -> Self {
        let index = index.min(self.direct.len());
        self.direct.insert(index, entry);
        self
    }

    /// Replaces the direct entry for `entry`'s producer in place, or
    /// appends it if no such entry exists.
    pub fn set_direct(mut self, entry: FeaturePackConfig) -> Self {
        let producer = entry.producer_spec();
        match producer.and_then(|p| {
            self.direct
                .iter()
                .position(|e| e.producer_spec().as_ref() == Some(&p))
        }) {
            Some(index) => self.direct[index] = entry,
            None => self.direct.push(entry),
        }
        self
    }

    pub fn remove_direct(mut self, producer: &ProducerSpec) -> Self {
        self.direct
            .retain(|entry| entry.producer_spec().as_ref() != Some(producer));
        self
    }

    pub fn set_transitive(mut self, producer: ProducerSpec, entry: FeaturePackConfig) -> Self {
        self.transitive.insert(producer, entry);
        self
    }

    pub fn remove_transitive(mut self, producer: &ProducerSpec) -> Self {
        self.transitive.remove(producer);
        self
    }

    pub fn options(mut self, options: OptionMap) -> Self {
        self.options = options;
        self
    }

    pub fn clear_options(mut self) -> Self {
        self.options = OptionMap::new();
        self
    }

    pub fn set_option(mut self, name: String, value: String) -> Self {
        self.options.insert(name, value);
        self
    }

    pub fn remove_option(mut self, name: &str) -> Self {
        self.options.remove(name);
        self
    }

    pub fn universe_alias(mut self, alias: String, universe: String) -> Self {
        self.universe_aliases.insert(alias, universe);
        self
    }

    pub fn build(self) -> ProvisioningConfig {
        ProvisioningConfig {
            direct: self.direct,
            transitive: self.transitive,
            options: self.options,
            universe_aliases: self.universe_aliases,
        }
    }
}

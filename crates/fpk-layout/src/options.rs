// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

//! The options & plugins driver.
//!
//! Runs after every rebuild, reconciling three sources — the config's
//! carried-over options, a caller-supplied override map, and every visited
//! F's declared plugin options — into the single effective option set a
//! caller queries through [`Layout::option_value`].

use std::collections::BTreeSet;

use fpk_config::{FeaturePackConfig, OptionMap, VERSION_CONVERGENCE};
use fpk_resolve::{FeaturePackLayout, PluginOptionSpec};

use crate::error::{Error, Result};
use crate::Layout;

#[cfg(test)]
#[path = "./options_test.rs"]
mod options_test;

/// Built-in options every layout recognises regardless of what plugins are
/// installed.
fn builtin_options() -> Vec<PluginOptionSpec> {
    vec![PluginOptionSpec::new(VERSION_CONVERGENCE).persistent()]
}

impl<F: FeaturePackLayout> Layout<F> {
    /// Reconciles builtin and plugin-declared options against the config
    /// and any caller-supplied overrides.
    pub(crate) fn init_options(
        &mut self,
        extra_options: OptionMap,
        cleanup_config_options: bool,
    ) -> Result<()> {
        let effective = self.config.options().overlaid_with(&extra_options);

        let mut recognised: Vec<PluginOptionSpec> = builtin_options();
        for f in self.state.ordered.iter() {
            for opt in &f.spec().plugin_options {
                if !recognised.iter().any(|r| r.name == opt.name) {
                    recognised.push(opt.clone());
                }
            }
        }

        for opt in recognised.iter().filter(|o| o.required) {
            if !effective.contains_key(&opt.name) {
                return Err(Error::PluginOptionRequired(opt.name.clone()));
            }
        }

        let mut builder = self.config.to_builder();
        let mut config_changed = false;
        let mut unrecognised: BTreeSet<String> = BTreeSet::new();
        for (name, _) in effective.iter() {
            if recognised.iter().any(|r| &r.name == name) {
                continue;
            }
            if cleanup_config_options {
                if self.config.options().contains_key(name) {
                    builder = builder.remove_option(name);
                    config_changed = true;
                }
            } else {
                unrecognised.insert(name.clone());
            }
        }
        if !unrecognised.is_empty() {
            return Err(Error::PluginOptionsNotRecognised(unrecognised));
        }

        for opt in &recognised {
            let Some(override_value) = extra_options.get(&opt.name) else {
                continue;
            };
            if opt.persistent {
                builder = builder.set_option(opt.name.clone(), override_value.to_string());
                config_changed = true;
                continue;
            }
            // Non-persistent: a value equal to the config's current value
            // is left untouched; a differing value is removed from the
            // config so the override applies for this run only, without
            // persisting a now-contradicted value.
            match self.config.options().get(&opt.name) {
                Some(existing) if existing == override_value => {}
                _ => {
                    builder = builder.remove_option(&opt.name);
                    config_changed = true;
                }
            }
        }

        if config_changed {
            self.config = builder.build();
        }
        self.effective_options = effective;
        Ok(())
    }
}

/// Locates the [`FeaturePackConfig`] entry for `producer`, whether direct or
/// transitive, shared by the mutation and options code paths.
pub(crate) fn find_entry<'a>(
    config: &'a fpk_config::ProvisioningConfig,
    producer: &fpk_ident::ProducerSpec,
) -> Option<&'a FeaturePackConfig> {
    config
        .get_direct(producer)
        .or_else(|| config.get_transitive(producer))
}

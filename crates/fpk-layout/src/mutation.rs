// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

//! The mutation API: install/uninstall/apply, each a config
//! edit via [`fpk_config::ProvisioningConfigBuilder`] followed by a full
//! rebuild, plus the update-query surface for proposing and listing updates.

use fpk_config::{FeaturePackConfig, OptionMap, ProvisioningConfig};
use fpk_ident::{FeaturePackId, FeaturePackLocation, ProducerSpec};
use fpk_resolve::{FeaturePackKind, FeaturePackLayout, FeaturePackUpdatePlan, UpdateRequest};

use crate::error::{Error, Result};
use crate::options::find_entry;
use crate::Layout;

#[cfg(test)]
#[path = "./mutation_test.rs"]
mod mutation_test;

/// Collections of installs, uninstalls and per-producer update plans.
/// Any collection may be empty.
#[derive(Clone, Debug, Default)]
pub struct ProvisioningPlan {
    pub installs: Vec<FeaturePackConfig>,
    pub uninstalls: Vec<FeaturePackId>,
    pub updates: Vec<FeaturePackUpdatePlan>,
}

impl<F: FeaturePackLayout> Layout<F> {
    /// Installs or replaces a direct feature pack entry, then rebuilds.
    pub fn install(&mut self, fp_config: FeaturePackConfig, options: OptionMap) -> Result<()> {
        let new_config = self.plan_install(fp_config)?;
        self.rebuild(new_config, false, options)
    }

    /// Convenience overload of [`Layout::install`] for a bare location.
    pub fn install_location(&mut self, location: FeaturePackLocation, options: OptionMap) -> Result<()> {
        self.install(FeaturePackConfig::new(location), options)
    }

    /// Removes a direct feature pack entry, then rebuilds.
    pub fn uninstall(&mut self, fpid: FeaturePackId, options: OptionMap) -> Result<()> {
        let new_config = self.plan_uninstall(fpid)?;
        self.rebuild(new_config, false, options)
    }

    /// Applies a batch of updates, installs and uninstalls, in
    /// that order, each against the config as edited by the steps before
    /// it; then a single rebuild.
    pub fn apply(&mut self, plan: ProvisioningPlan, options: OptionMap) -> Result<()> {
        for update in &plan.updates {
            if update.is_empty() {
                continue;
            }
            self.config = self.plan_update(update)?;
        }
        for fp_config in plan.installs {
            self.config = self.plan_install(fp_config)?;
        }
        for fpid in plan.uninstalls {
            self.config = self.plan_uninstall(fpid)?;
        }
        self.rebuild_unchanged(false, options)
    }

    /// Proposes an update for one installed producer's feature pack.
    pub fn get_feature_pack_update(&self, producer: &ProducerSpec) -> Result<FeaturePackUpdatePlan> {
        let installed = self
            .state
            .feature_packs
            .get(producer)
            .ok_or_else(|| Error::UnsatisfiedFeaturePackDependency(producer.clone()))?;
        let location = installed.fpid().to_location();
        let channel = self.universe.get_channel(&location)?;
        let mut plan = channel.get_update_plan(&UpdateRequest {
            producer: producer.clone(),
            installed: installed.fpid().clone(),
        })?;
        plan.new_patches = self
            .patches(installed.fpid())
            .iter()
            .map(|p| p.fpid().clone())
            .collect();
        Ok(plan)
    }

    /// Proposes updates for several installed producers; non-empty update
    /// plans only.
    pub fn get_updates(&self, producers: &[ProducerSpec]) -> Result<Vec<FeaturePackUpdatePlan>> {
        let mut plans = Vec::new();
        for producer in producers {
            let plan = self.get_feature_pack_update(producer)?;
            if !plan.is_empty() {
                plans.push(plan);
            }
        }
        Ok(plans)
    }

    /// Re-resolves `self.config` against `new_config`, then rebuilds and
    /// reconciles options: the common "form a new config, rebuild, then
    /// re-run the options driver" shape shared by every mutation.
    fn rebuild(&mut self, new_config: ProvisioningConfig, cleanup_transitive: bool, options: OptionMap) -> Result<()> {
        self.config = new_config;
        self.rebuild_unchanged(cleanup_transitive, options)
    }

    /// Rebuilds against the config already staged in `self.config` and
    /// reconciles options — the tail shared by `rebuild` and `apply`.
    fn rebuild_unchanged(&mut self, cleanup_transitive: bool, options: OptionMap) -> Result<()> {
        self.rebuild_in_place(cleanup_transitive)?;
        self.init_options(options, cleanup_transitive)
    }

    fn plan_install(&mut self, mut fp_config: FeaturePackConfig) -> Result<ProvisioningConfig> {
        if !fp_config.location.is_coordinate() && fp_config.location.build().is_none() {
            fp_config.location = self.normalize(&fp_config.location)?;
        }

        let resolved = self.resolve_feature_pack(&fp_config.location, FeaturePackKind::DirectDep)?;

        if resolved.spec().is_patch() {
            let target = resolved.spec().patch_for.clone().ok_or_else(|| {
                Error::String(format!("{} declares itself a patch but names no target", resolved.fpid()))
            })?;
            return self.plan_install_patch(resolved.fpid().clone(), target);
        }

        if fp_config.location.is_coordinate() {
            fp_config.location = resolved.fpid().to_location();
        }

        let producer = fp_config
            .location
            .producer_spec()
            .expect("a resolved, non-patch location always names a producer");

        let direct = self.config.get_direct(&producer).cloned();
        let transitive = self.config.get_transitive(&producer).cloned();
        let mut builder = self.config.to_builder();

        builder = match (direct, transitive) {
            (Some(_), _) if fp_config.transitive => {
                // Demote direct -> transitive.
                builder.remove_direct(&producer).set_transitive(producer, fp_config)
            }
            (Some(existing), _) => builder.set_direct(merge_patches(existing, fp_config)),
            (None, Some(existing)) if !fp_config.transitive => {
                // Promote transitive -> direct: insert at the earliest
                // direct entry that declares this producer as a dependency.
                let index = self.promotion_index(&producer);
                let mut promoted = merge_patches(existing, fp_config);
                promoted.transitive = false;
                builder.remove_transitive(&producer).insert_direct(index, promoted)
            }
            (None, Some(existing)) => builder.set_transitive(producer, merge_patches(existing, fp_config)),
            (None, None) if fp_config.transitive => builder.set_transitive(producer, fp_config),
            (None, None) => builder.append_direct(fp_config),
        };

        Ok(builder.build())
    }

    fn plan_install_patch(&mut self, patch_fpid: FeaturePackId, target: FeaturePackId) -> Result<ProvisioningConfig> {
        let target_producer = target.producer_spec();
        match self.state.feature_packs.get(&target_producer) {
            Some(installed) if installed.fpid() == &target => {}
            _ => {
                return Err(Error::PatchNotApplicable {
                    patch: patch_fpid,
                    target,
                })
            }
        }

        if find_entry(&self.config, &target_producer).is_some_and(|e| e.patches.contains(&patch_fpid)) {
            return Err(Error::PatchAlreadyApplied(patch_fpid));
        }

        let mut builder = self.config.to_builder();
        builder = if let Some(existing) = self.config.get_direct(&target_producer).cloned() {
            builder.set_direct(existing.with_patch(patch_fpid))
        } else if let Some(existing) = self.config.get_transitive(&target_producer).cloned() {
            builder.set_transitive(target_producer, existing.with_patch(patch_fpid))
        } else {
            builder.set_transitive(
                target_producer.clone(),
                FeaturePackConfig::transitive(target.to_location()).with_patch(patch_fpid),
            )
        };
        Ok(builder.build())
    }

    fn plan_uninstall(&mut self, fpid: FeaturePackId) -> Result<ProvisioningConfig> {
        if let Some(target_producer) = self.find_patch_target(&fpid) {
            let mut builder = self.config.to_builder();
            builder = if let Some(mut existing) = self.config.get_direct(&target_producer).cloned() {
                existing.patches.retain(|p| p != &fpid);
                builder.set_direct(existing)
            } else if let Some(mut existing) = self.config.get_transitive(&target_producer).cloned() {
                existing.patches.retain(|p| p != &fpid);
                builder.set_transitive(target_producer, existing)
            } else {
                builder
            };
            return Ok(builder.build());
        }

        let producer = fpid.producer_spec();
        let entry = self
            .config
            .get_direct(&producer)
            .ok_or_else(|| Error::UnknownFeaturePack(fpid.clone()))?;
        if let Some(installed_build) = entry.location.build() {
            if installed_build != &fpid.build {
                return Err(Error::UnknownFeaturePack(fpid));
            }
        }

        let removed = self.config.to_builder().remove_direct(&producer).build();
        Ok(if removed.has_feature_packs() {
            removed
        } else {
            removed.to_builder().clear_options().build()
        })
    }

    fn plan_update(&mut self, update: &FeaturePackUpdatePlan) -> Result<ProvisioningConfig> {
        let producer = &update.producer;
        let direct = self.config.get_direct(producer).cloned();
        let transitive = self.config.get_transitive(producer).cloned();
        let mut builder = self.config.to_builder();

        builder = match (direct, transitive) {
            (Some(existing), _) => {
                check_installed_location(producer, &existing, update)?;
                builder.set_direct(merge_update(existing, update))
            }
            (None, Some(existing)) => {
                check_installed_location(producer, &existing, update)?;
                builder.set_transitive(producer.clone(), merge_update(existing, update))
            }
            (None, None) => builder.set_transitive(
                producer.clone(),
                FeaturePackConfig::transitive(update.proposed_location.clone()),
            ),
        };
        Ok(builder.build())
    }

    /// The earliest direct entry whose resolved spec declares `producer`
    /// as a dependency; falls back to appending at the end when no direct
    /// entry does.
    fn promotion_index(&self, producer: &ProducerSpec) -> usize {
        for (index, entry) in self.config.direct_entries().iter().enumerate() {
            let Some(entry_producer) = entry.producer_spec() else {
                continue;
            };
            let Some(f) = self.state.feature_packs.get(&entry_producer) else {
                continue;
            };
            let depends_on_producer = f
                .spec()
                .transitive_deps
                .iter()
                .chain(f.spec().direct_deps.iter())
                .any(|dep| dep.location.producer_spec().as_ref() == Some(producer));
            if depends_on_producer {
                return index;
            }
        }
        self.config.direct_entries().len()
    }

    fn find_patch_target(&self, patch_fpid: &FeaturePackId) -> Option<ProducerSpec> {
        self.state
            .fp_patches
            .iter()
            .find(|(_, patches)| patches.iter().any(|p| p.fpid() == patch_fpid))
            .map(|(target, _)| target.producer_spec())
    }
}

fn merge_patches(existing: FeaturePackConfig, mut incoming: FeaturePackConfig) -> FeaturePackConfig {
    for patch in existing.patches {
        if !incoming.patches.contains(&patch) {
            incoming.patches.push(patch);
        }
    }
    incoming
}

fn merge_update(existing: FeaturePackConfig, update: &FeaturePackUpdatePlan) -> FeaturePackConfig {
    let mut updated = existing.with_location(update.proposed_location.clone());
    for patch in &update.new_patches {
        if !updated.patches.contains(patch) {
            updated.patches.push(patch.clone());
        }
    }
    updated
}

fn check_installed_location(
    producer: &ProducerSpec,
    existing: &FeaturePackConfig,
    update: &FeaturePackUpdatePlan,
) -> Result<()> {
    if existing.location != update.installed_location {
        return Err(Error::String(format!(
            "update plan installed location for {producer} does not match the config"
        )));
    }
    Ok(())
}

// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

//! The core graph traversal: version resolution, convergence, conflict
//! detection, ordering, and patch loading.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fpk_config::{FeaturePackConfig, OptionMap, ProvisioningConfig};
use fpk_ident::{Build, ChannelName, FeaturePackId, FeaturePackLocation, ProducerSpec};
use fpk_resolve::{
    FeaturePackKind,
    FeaturePackLayout,
    FeaturePackLayoutFactory,
    LayoutFactory,
    NullProgressTracker,
    ProgressTracker,
    UniverseResolver,
};

use crate::error::{Error, Result};
use crate::workarea::{PluginContextGuard, WorkArea};

#[cfg(test)]
#[path = "./builder_test.rs"]
mod builder_test;

/// A DFS-path pin for one producer, tracking convergence within a branch.
#[derive(Clone, Debug, Default)]
pub(crate) struct BranchPin {
    pub channel: Option<ChannelName>,
    pub build: Option<Build>,
}

pub(crate) type Branch = BTreeMap<ProducerSpec, BranchPin>;

/// The engine's mutable heart.
pub(crate) struct LayoutState<F: FeaturePackLayout> {
    pub feature_packs: BTreeMap<ProducerSpec, F>,
    pub ordered: Vec<F>,
    pub all_patches: BTreeMap<FeaturePackId, F>,
    pub fp_patches: BTreeMap<FeaturePackId, Vec<F>>,
    pub transitive_deps: BTreeSet<ProducerSpec>,
    pub resolved_versions: BTreeMap<ProducerSpec, FeaturePackLocation>,
    pub maven_producers: BTreeMap<String, F>,
    pub conflicts: BTreeMap<ProducerSpec, BTreeSet<FeaturePackId>>,
    pub plugin_locations: BTreeMap<fpk_resolve::PluginId, fpk_resolve::ArtifactReference>,
    pub fail_on_convergence: bool,
}

impl<F: FeaturePackLayout> LayoutState<F> {
    fn empty(fail_on_convergence: bool) -> Self {
        Self {
            feature_packs: BTreeMap::new(),
            ordered: Vec::new(),
            all_patches: BTreeMap::new(),
            fp_patches: BTreeMap::new(),
            transitive_deps: BTreeSet::new(),
            resolved_versions: BTreeMap::new(),
            maven_producers: BTreeMap::new(),
            conflicts: BTreeMap::new(),
            plugin_locations: BTreeMap::new(),
            fail_on_convergence,
        }
    }

    pub(crate) fn map<G: FeaturePackLayout>(&self, transform: &impl Fn(&F) -> G) -> LayoutState<G> {
        LayoutState {
            feature_packs: self
                .feature_packs
                .iter()
                .map(|(k, v)| (k.clone(), transform(v)))
                .collect(),
            ordered: self.ordered.iter().map(transform).collect(),
            all_patches: self
                .all_patches
                .iter()
                .map(|(k, v)| (k.clone(), transform(v)))
                .collect(),
            fp_patches: self
                .fp_patches
                .iter()
                .map(|(k, v)| (k.clone(), v.iter().map(transform).collect()))
                .collect(),
            transitive_deps: self.transitive_deps.clone(),
            resolved_versions: self.resolved_versions.clone(),
            // The coordinate-alias cache is a resolution-time scratch map;
            // it has no meaning for a type it was never populated for.
            maven_producers: BTreeMap::new(),
            conflicts: self.conflicts.clone(),
            plugin_locations: self.plugin_locations.clone(),
            fail_on_convergence: self.fail_on_convergence,
        }
    }
}

/// A resolved, laid-out installation: the engine's public handle.
///
/// Generic over `F`, the capability set a caller's chosen feature-pack
/// representation must satisfy ([`FeaturePackLayout`]).
pub struct Layout<F: FeaturePackLayout> {
    pub(crate) config: ProvisioningConfig,
    pub(crate) state: LayoutState<F>,
    pub(crate) work_area: Option<WorkArea>,
    pub(crate) universe: Arc<dyn UniverseResolver>,
    pub(crate) layout_factory: Arc<dyn LayoutFactory<F>>,
    pub(crate) fp_factory: Arc<dyn FeaturePackLayoutFactory<F>>,
    pub(crate) progress: Box<dyn ProgressTracker>,
    pub(crate) effective_options: OptionMap,
}

impl<F: FeaturePackLayout> Layout<F> {
    /// Creates a layout from a config: acquires the work area and runs the
    /// initial build. On failure the work area is closed before the error
    /// propagates.
    pub fn create(
        config: ProvisioningConfig,
        universe: Arc<dyn UniverseResolver>,
        layout_factory: Arc<dyn LayoutFactory<F>>,
        fp_factory: Arc<dyn FeaturePackLayoutFactory<F>>,
        work_area_root: PathBuf,
        cleanup_transitive: bool,
        track_progress: bool,
    ) -> Result<Self> {
        let work_area = WorkArea::acquire(work_area_root)?;
        let progress = if track_progress {
            layout_factory.new_progress_tracker()
        } else {
            Box::new(NullProgressTracker)
        };
        let mut layout = Self {
            config,
            state: LayoutState::empty(false),
            work_area: Some(work_area),
            universe,
            layout_factory,
            fp_factory,
            progress,
            effective_options: OptionMap::new(),
        };
        let result = layout
            .rebuild_in_place(cleanup_transitive)
            .and_then(|()| layout.init_options(OptionMap::new(), cleanup_transitive));
        match result {
            Ok(()) => Ok(layout),
            Err(err) => {
                layout.close();
                Err(err)
            }
        }
    }

    /// Clears mutable state, resets the work area and re-runs the builder
    /// against `self.config`. Used both by the initial `create` and by
    /// every mutation; callers are responsible for following up with
    /// `init_options` since every mutation ends by re-running the builtin
    /// and plugin option reconciliation.
    pub(crate) fn rebuild_in_place(&mut self, cleanup_transitive: bool) -> Result<()> {
        let span = tracing::info_span!("build");
        let _enter = span.enter();

        if let Some(work_area) = &self.work_area {
            work_area.reset();
        }

        let policy = self.config.convergence_policy()?;
        self.state = LayoutState::empty(policy.fails_on_convergence());

        let mut branch = Branch::new();
        let transitive: Vec<FeaturePackConfig> =
            self.config.transitive_entries().cloned().collect();
        let direct: Vec<FeaturePackConfig> = self.config.direct_entries().to_vec();
        self.layout(transitive, direct, &mut branch, FeaturePackKind::DirectDep)?;
        self.post_build(cleanup_transitive)?;
        Ok(())
    }

    /// The recursive graph traversal: pins transitive dependencies,
    /// resolves and registers direct ones, then recurses.
    pub(crate) fn layout(
        &mut self,
        transitive_entries: Vec<FeaturePackConfig>,
        direct_entries: Vec<FeaturePackConfig>,
        branch: &mut Branch,
        kind: FeaturePackKind,
    ) -> Result<()> {
        let mut pinned_here: Vec<ProducerSpec> = Vec::new();
        let mut post_queue: Vec<F> = Vec::new();

        // Step 1: transitive entries.
        for entry in transitive_entries {
            for patch in entry.patches.iter().cloned() {
                self.load_patch(patch)?;
            }

            let mut location = entry.location.clone();

            if let Some(producer) = location.producer_spec() {
                if let Some(pin) = branch.get(&producer) {
                    if let Some(pin_channel) = &pin.channel {
                        if Some(pin_channel) != location.channel() {
                            self.record_channel_conflict(&producer, &location, pin);
                            continue;
                        }
                    }
                }
            }

            if location.is_coordinate() {
                let resolved = self.resolve_feature_pack(&location, FeaturePackKind::TransitiveDep)?;
                let resolved_location = resolved.fpid().to_location();
                if let FeaturePackLocation::Coordinate(coord) = &location {
                    self.state.maven_producers.insert(coord.clone(), resolved.clone());
                }
                self.state
                    .resolved_versions
                    .insert(resolved.fpid().producer_spec(), resolved_location.clone());
                location = resolved_location;
            }

            let Some(producer) = location.producer_spec() else {
                continue;
            };

            self.state.transitive_deps.insert(producer.clone());
            if !branch.contains_key(&producer) {
                branch.insert(
                    producer.clone(),
                    BranchPin {
                        channel: location.channel().cloned(),
                        build: location.build().cloned(),
                    },
                );
                pinned_here.push(producer);
            }
        }

        // Step 2: direct entries.
        for entry in direct_entries {
            for patch in entry.patches.iter().cloned() {
                self.load_patch(patch)?;
            }

            let pin = entry
                .location
                .producer_spec()
                .and_then(|p| branch.get(&p).cloned());
            let effective_location = self.resolve_version(&entry.location, pin.as_ref())?;

            if !effective_location.is_coordinate() {
                let producer = effective_location.producer_spec().expect("non-coordinate location has a producer");
                if let Some(existing) = self.state.feature_packs.get(&producer).cloned() {
                    let effective_fpid = FeaturePackId::try_from(effective_location.clone())?;
                    self.converge(branch, &producer, existing.fpid(), &effective_fpid);
                    continue;
                }
            }

            let mut resolved = self.resolve_feature_pack(&effective_location, kind)?;

            if entry.location.is_coordinate() {
                let producer = resolved.fpid().producer_spec();
                if let Some(pin) = branch.get(&producer).cloned() {
                    let repinned = self.resolve_version(&resolved.fpid().to_location(), Some(&pin))?;
                    if repinned != resolved.fpid().to_location() {
                        if let Some(existing) = self.state.feature_packs.get(&producer).cloned() {
                            let repinned_fpid = FeaturePackId::try_from(repinned)?;
                            self.converge(branch, &producer, existing.fpid(), &repinned_fpid);
                            continue;
                        }
                        resolved = self.resolve_feature_pack(&repinned, kind)?;
                    }
                }
                if let FeaturePackLocation::Coordinate(coord) = &entry.location {
                    self.state.maven_producers.insert(coord.clone(), resolved.clone());
                }
            }

            let producer = resolved.fpid().producer_spec();
            self.progress.producer_started(&producer);
            self.state.feature_packs.insert(producer.clone(), resolved.clone());
            post_queue.push(resolved.clone());

            if !branch.contains_key(&producer) {
                branch.insert(
                    producer.clone(),
                    BranchPin {
                        channel: Some(resolved.fpid().channel.clone()),
                        build: Some(resolved.fpid().build.clone()),
                    },
                );
                pinned_here.push(producer);
            }
        }

        // Step 3: post-queue, in enqueue order.
        for f in post_queue {
            let producer = f.fpid().producer_spec();
            let spec = Arc::clone(f.spec());

            let transitive_cfgs: Vec<FeaturePackConfig> = spec
                .transitive_deps
                .iter()
                .map(|d| FeaturePackConfig::transitive(d.location.clone()))
                .collect();
            let direct_cfgs: Vec<FeaturePackConfig> = spec
                .direct_deps
                .iter()
                .map(|d| {
                    if d.transitive {
                        FeaturePackConfig::transitive(d.location.clone())
                    } else {
                        FeaturePackConfig::new(d.location.clone())
                    }
                })
                .collect();

            self.layout(transitive_cfgs, direct_cfgs, branch, FeaturePackKind::TransitiveDep)?;

            for plugin in &spec.plugins {
                self.state
                    .plugin_locations
                    .insert(plugin.id.clone(), plugin.artifact.clone());
            }

            if let Some(work_area) = &self.work_area {
                work_area.aggregate_feature_pack_content(f.dir())?;
            }

            self.state.ordered.push(f);
            self.progress.producer_finished(&producer);
        }

        // Step 4: unpin.
        for producer in pinned_here {
            branch.remove(&producer);
        }

        Ok(())
    }

    /// Resolves a possibly-unversioned location to a concrete build.
    fn resolve_version(
        &mut self,
        fpl: &FeaturePackLocation,
        pin: Option<&BranchPin>,
    ) -> Result<FeaturePackLocation> {
        let Some(pin) = pin else {
            return self.normalize(fpl);
        };
        let channels_match = match (&pin.channel, fpl.channel()) {
            (None, _) => true,
            (Some(pin_channel), Some(fpl_channel)) => pin_channel == fpl_channel,
            (Some(_), None) => false,
        };
        if channels_match {
            return match &pin.build {
                None => self.normalize(fpl),
                Some(build) => Ok(fpl.with_build(Some(build.clone()))),
            };
        }
        if let Some(producer) = fpl.producer_spec() {
            self.record_channel_conflict(&producer, fpl, pin);
        }
        Ok(fpl.with_channel(pin.channel.clone()).with_build(pin.build.clone()))
    }

    /// Normalizes a location, with universe-alias resolution applied
    /// first: a location whose `universe` names a configured
    /// alias is rewritten to the canonical universe before any resolver
    /// call.
    pub(crate) fn normalize(&mut self, fpl: &FeaturePackLocation) -> Result<FeaturePackLocation> {
        if fpl.is_coordinate() {
            return Ok(fpl.clone());
        }
        let mut full = fpl.as_full().expect("non-coordinate location is Full").clone();
        if let Some(canonical) = self.config.universe_aliases().get(full.universe.as_str()) {
            full.universe = fpk_ident::UniverseName::new(canonical.clone())?;
        }
        if full.channel.is_some() && full.build.is_some() {
            return Ok(FeaturePackLocation::Full(full));
        }
        let producer = ProducerSpec::new(full.universe.clone(), full.producer.clone());
        let mut working = full;
        if working.channel.is_none() {
            working.channel = Some(self.universe.default_channel(&producer)?);
        }
        if working.build.is_none() {
            let probe = FeaturePackLocation::Full(working.clone());
            let channel = self.universe.get_channel(&probe)?;
            let build = channel.get_latest_build(&probe)?;
            working.build = Some(build);
            let pinned = FeaturePackLocation::Full(working.clone());
            self.state.resolved_versions.insert(producer, pinned);
        }
        Ok(FeaturePackLocation::Full(working))
    }

    /// Reconciles a newly resolved build against an existing branch pin.
    fn converge(
        &mut self,
        branch: &Branch,
        producer: &ProducerSpec,
        current: &FeaturePackId,
        effective: &FeaturePackId,
    ) {
        if let Some(pin) = branch.get(producer) {
            if pin.build.is_some() {
                return;
            }
        }
        if current == effective {
            return;
        }
        if current.channel != effective.channel {
            self.record_conflict(producer.clone(), current.clone(), effective.clone());
            return;
        }
        if self.state.fail_on_convergence && current.build != effective.build {
            self.record_conflict(producer.clone(), current.clone(), effective.clone());
        }
        // Otherwise: silently accept the already-registered build (first-wins).
    }

    /// Resolves the archive for a concrete location, then
    /// rebuilds its spec so that any declared dependency already known to
    /// resolve to a concrete location (via an earlier coordinate alias)
    /// is rewritten in place, preserving declaration order.
    pub(crate) fn resolve_feature_pack(
        &mut self,
        location: &FeaturePackLocation,
        kind: FeaturePackKind,
    ) -> Result<F> {
        if let FeaturePackLocation::Coordinate(coord) = location {
            if let Some(existing) = self.state.maven_producers.get(coord) {
                return Ok(existing.clone());
            }
        }
        let resolved = self
            .layout_factory
            .resolve_feature_pack(location, kind, self.fp_factory.as_ref())?;
        let rebuilt_spec = self.rebuild_spec_with_aliases(resolved.spec());
        if &rebuilt_spec == resolved.spec().as_ref() {
            return Ok(resolved);
        }
        Ok(self.fp_factory.create(
            resolved.fpid().clone(),
            Arc::new(rebuilt_spec),
            resolved.dir().to_path_buf(),
            kind,
        ))
    }

    fn rebuild_spec_with_aliases(
        &self,
        spec: &fpk_resolve::FeaturePackSpec,
    ) -> fpk_resolve::FeaturePackSpec {
        let mut rebuilt = spec.clone();
        for dep in spec.transitive_deps.iter().chain(spec.direct_deps.iter()) {
            if let FeaturePackLocation::Coordinate(coord) = &dep.location {
                if let Some(resolved_f) = self.state.maven_producers.get(coord) {
                    rebuilt = rebuilt.with_dependency_replaced(&dep.location, resolved_f.fpid().to_location());
                }
            }
        }
        rebuilt
    }

    fn record_conflict(&mut self, producer: ProducerSpec, a: FeaturePackId, b: FeaturePackId) {
        tracing::warn!(%producer, %a, %b, "version conflict recorded");
        let set = self.state.conflicts.entry(producer).or_default();
        set.insert(a);
        set.insert(b);
    }

    fn record_channel_conflict(
        &mut self,
        producer: &ProducerSpec,
        fpl: &FeaturePackLocation,
        pin: &BranchPin,
    ) {
        let a = diagnostic_fpid(producer, fpl.channel(), fpl.build());
        let b = diagnostic_fpid(producer, pin.channel.as_ref(), pin.build.as_ref());
        self.record_conflict(producer.clone(), a, b);
    }

    /// Resolves `fpid` as a `Patch`-kind F,
    /// recursively loads the patches it itself declares as deps (chaining),
    /// then appends it to `fpPatches[spec.patchFor]`. A patch is never
    /// loaded twice.
    pub(crate) fn load_patch(&mut self, fpid: FeaturePackId) -> Result<()> {
        if self.state.all_patches.contains_key(&fpid) {
            return Ok(());
        }
        let f = self.resolve_feature_pack(&fpid.to_location(), FeaturePackKind::Patch)?;
        if !f.spec().is_patch() {
            return Err(Error::String(format!("{fpid} is not a patch")));
        }
        let target = f
            .spec()
            .patch_for
            .clone()
            .ok_or_else(|| Error::String(format!("patch {fpid} declares no target")))?;

        let chained: Vec<FeaturePackId> = f
            .spec()
            .transitive_deps
            .iter()
            .chain(f.spec().direct_deps.iter())
            .filter_map(|dep| FeaturePackId::try_from(dep.location.clone()).ok())
            .collect();
        for dep_fpid in chained {
            self.load_patch(dep_fpid)?;
        }

        self.state.all_patches.insert(fpid.clone(), f.clone());
        self.state.fp_patches.entry(target).or_default().push(f);
        Ok(())
    }

    /// Finishing steps run once the traversal completes: conflict check,
    /// resolved-version pin-back, patch application, plugin materialization.
    pub(crate) fn post_build(&mut self, cleanup_transitive: bool) -> Result<()> {
        if !self.state.conflicts.is_empty() {
            return Err(Error::VersionConflict(self.state.conflicts.clone()));
        }

        let mut missing = Vec::new();
        let mut builder = self.config.to_builder();
        let mut config_changed = false;
        for producer in self.state.transitive_deps.clone() {
            if self.state.feature_packs.contains_key(&producer) {
                continue;
            }
            if cleanup_transitive && self.config.get_transitive(&producer).is_some() {
                builder = builder.remove_transitive(&producer);
                config_changed = true;
            } else {
                missing.push(producer);
            }
        }
        if !missing.is_empty() {
            missing.sort();
            return Err(Error::TransitiveDependencyNotFound(missing));
        }
        if config_changed {
            self.config = builder.build();
        }

        if !self.state.resolved_versions.is_empty() {
            let mut builder = self.config.to_builder();
            for (producer, location) in self.state.resolved_versions.clone() {
                if let Some(idx) = self.config.get_direct_index(&producer) {
                    let existing = self.config.direct_entries()[idx].clone();
                    builder = builder.set_direct(existing.with_location(location));
                } else if let Some(existing) = self.config.get_transitive(&producer).cloned() {
                    builder = builder.set_transitive(producer, existing.with_location(location));
                } else {
                    builder = builder.set_transitive(producer, FeaturePackConfig::transitive(location));
                }
            }
            self.config = builder.build();
        }

        self.apply_patches()?;
        self.materialize_plugins()?;
        Ok(())
    }

    /// Materializes aggregated plugin artifacts via the artifact resolver
    /// into `plugins/`.
    fn materialize_plugins(&mut self) -> Result<()> {
        let Some(work_area) = self.work_area.clone() else {
            return Ok(());
        };
        for (plugin_id, artifact) in self.state.plugin_locations.clone() {
            let resolver = self.universe.get_artifact_resolver(artifact.repo_id())?;
            let resolved_path = resolver.resolve(&artifact)?;
            let file_name = format!("{}.jar", plugin_id.as_str());
            work_area.add_plugin_artifact(&file_name, &resolved_path)?;
        }
        Ok(())
    }

    /// Decrements the work area's refcount, deleting the directory if this
    /// was the last live reference. Idempotent: a second call is a no-op.
    pub fn close(&mut self) {
        self.work_area.take();
    }

    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    pub fn has_feature_packs(&self) -> bool {
        !self.state.ordered.is_empty()
    }

    pub fn feature_pack(&self, producer: &ProducerSpec) -> Option<&F> {
        self.state.feature_packs.get(producer)
    }

    pub fn ordered_feature_packs(&self) -> &[F] {
        &self.state.ordered
    }

    pub fn patches(&self, fpid: &FeaturePackId) -> &[F] {
        self.state
            .fp_patches
            .get(fpid)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_patches(&self, fpid: &FeaturePackId) -> bool {
        !self.patches(fpid).is_empty()
    }

    pub fn has_plugins(&self) -> bool {
        self.work_area.as_ref().map(WorkArea::has_plugins).unwrap_or(false)
    }

    pub fn plugins_dir(&self) -> Option<PathBuf> {
        self.work_area.as_ref().map(WorkArea::plugins_dir)
    }

    pub fn has_resources(&self) -> bool {
        self.work_area.as_ref().map(WorkArea::has_resources).unwrap_or(false)
    }

    pub fn resource<I, S>(&self, segments: I) -> Option<PathBuf>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        self.work_area.as_ref().map(|w| w.resource_path(segments))
    }

    pub fn tmp_path<I, S>(&self, segments: I) -> Option<PathBuf>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        self.work_area.as_ref().map(|w| w.tmp_path(segments))
    }

    pub fn new_staged_dir(&self) -> Result<PathBuf> {
        self.work_area
            .as_ref()
            .ok_or_else(|| Error::String("layout is closed".into()))?
            .new_staged_dir()
    }

    /// Opens the plugin-discovery class-loading context (§4.1); the
    /// ambient context is restored when the returned guard drops.
    pub fn plugin_discovery_context(&self) -> Result<PluginContextGuard> {
        Ok(self
            .work_area
            .as_ref()
            .ok_or_else(|| Error::String("layout is closed".into()))?
            .open_plugin_context())
    }

    /// Enumerates plugin artifacts under `plugins/`, optionally filtered to
    /// those whose file name contains `plugin_type`, invoking `visitor` for
    /// each. The discovery context is installed for the duration of the
    /// call and restored on every exit path, including an early `Err`.
    pub fn visit_plugins(
        &self,
        plugin_type: Option<&str>,
        mut visitor: impl FnMut(&str, &Path) -> Result<()>,
    ) -> Result<()> {
        let work_area = self
            .work_area
            .as_ref()
            .ok_or_else(|| Error::String("layout is closed".into()))?;
        let _guard = work_area.open_plugin_context();
        let dir = work_area.plugins_dir();
        if !dir.exists() {
            return Ok(());
        }
        let entries = std::fs::read_dir(&dir).map_err(|source| Error::ReadDirFailed {
            path: dir.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| Error::ReadDirFailed {
                path: dir.clone(),
                source,
            })?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(plugin_type) = plugin_type {
                if !name.contains(plugin_type) {
                    continue;
                }
            }
            visitor(&name, &entry.path())?;
        }
        Ok(())
    }

    pub fn is_option_set(&self, name: &str) -> bool {
        self.effective_options.contains_key(name)
    }

    pub fn option_value(&self, name: &str) -> Option<&str> {
        self.effective_options.get(name)
    }

    pub fn options(&self) -> &OptionMap {
        &self.effective_options
    }

    /// Returns a new layout over a different `F` type, sharing this
    /// layout's work area (refcounted: neither view's close deletes the
    /// directory until the other has also closed).
    pub fn transform<G, T>(
        &self,
        layout_factory: Arc<dyn LayoutFactory<G>>,
        fp_factory: Arc<dyn FeaturePackLayoutFactory<G>>,
        transformer: T,
    ) -> Layout<G>
    where
        G: FeaturePackLayout,
        T: Fn(&F) -> G,
    {
        Layout {
            config: self.config.clone(),
            state: self.state.map(&transformer),
            work_area: self.work_area.as_ref().map(WorkArea::share),
            universe: Arc::clone(&self.universe),
            layout_factory,
            fp_factory,
            progress: Box::new(NullProgressTracker),
            effective_options: self.effective_options.clone(),
        }
    }
}

fn diagnostic_fpid(
    producer: &ProducerSpec,
    channel: Option<&ChannelName>,
    build: Option<&Build>,
) -> FeaturePackId {
    FeaturePackId {
        universe: producer.universe.clone(),
        producer: producer.producer.clone(),
        channel: channel
            .cloned()
            .unwrap_or_else(|| ChannelName::new("<unresolved>").expect("literal is valid")),
        frequency: None,
        build: build
            .cloned()
            .unwrap_or_else(|| Build::new("<unresolved>")),
    }
}

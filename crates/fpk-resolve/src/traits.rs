// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fpk_ident::{Build, ChannelName, FeaturePackId, FeaturePackLocation, ProducerSpec};

use crate::spec::{FeaturePackKind, FeaturePackSpec};
use crate::update::{FeaturePackUpdatePlan, UpdateRequest};
use crate::Result;

/// The capability a resolved feature pack must expose to the layout builder.
///
/// The engine is generic over this trait rather than over a concrete type,
/// so callers can plug in whatever representation of a laid-out feature
/// pack suits them instead of being forced into one fixed type hierarchy.
pub trait FeaturePackLayout: Clone {
    fn fpid(&self) -> &FeaturePackId;
    fn spec(&self) -> &Arc<FeaturePackSpec>;
    fn dir(&self) -> &Path;
    fn kind(&self) -> FeaturePackKind;

    /// Returns a copy of this F repointed at a new on-disk directory (used
    /// by the patch applicator when it copies a feature pack into
    /// `patched/<fpid>` and redirects consumers to the copy).
    fn with_dir(&self, dir: PathBuf) -> Self;
}

/// Constructs `F` instances from `(fpid, spec, dir, kind)`. Kept separate
/// from [`LayoutFactory`] because it is pure data construction with no I/O,
/// unlike archive resolution.
pub trait FeaturePackLayoutFactory<F: FeaturePackLayout> {
    fn create(
        &self,
        fpid: FeaturePackId,
        spec: Arc<FeaturePackSpec>,
        dir: PathBuf,
        kind: FeaturePackKind,
    ) -> F;
}

/// Reports build progress. Must be non-blocking: it is invoked
/// synchronously between unit-of-work boundaries on the calling thread.
pub trait ProgressTracker {
    fn producer_started(&self, producer: &ProducerSpec);
    fn producer_finished(&self, producer: &ProducerSpec);
}

/// A no-op tracker, used when the caller passes `trackProgress = false`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullProgressTracker;

impl ProgressTracker for NullProgressTracker {
    fn producer_started(&self, _producer: &ProducerSpec) {}
    fn producer_finished(&self, _producer: &ProducerSpec) {}
}

/// Resolves an archive for a location into an `F`, and hands out the
/// collaborators the rest of a build needs.
pub trait LayoutFactory<F: FeaturePackLayout> {
    /// Resolves a (non-coordinate) feature-pack location to its concrete F,
    /// downloading/extracting the archive as needed.
    fn resolve_feature_pack(
        &self,
        location: &FeaturePackLocation,
        kind: FeaturePackKind,
        fp_factory: &dyn FeaturePackLayoutFactory<F>,
    ) -> Result<F>;

    fn new_progress_tracker(&self) -> Box<dyn ProgressTracker>;
}

/// Answers producer/channel-level questions: what is the producer's default
/// channel, what is the latest build on a channel, and hands out per-repo
/// artifact resolvers.
pub trait UniverseResolver {
    fn get_universe(&self, producer: &ProducerSpec) -> Result<()>;

    /// The producer's default channel, used when a location names no
    /// channel at all.
    fn default_channel(&self, producer: &ProducerSpec) -> Result<ChannelName>;

    fn get_channel(&self, location: &FeaturePackLocation) -> Result<Arc<dyn Channel>>;

    fn get_artifact_resolver(&self, repo_id: &str) -> Result<Arc<dyn ArtifactResolver>>;
}

/// A named series of builds within a producer.
pub trait Channel: Send + Sync {
    fn name(&self) -> &ChannelName;

    fn get_latest_build(&self, location: &FeaturePackLocation) -> Result<Build>;

    fn resolve(&self, location: &FeaturePackLocation) -> Result<PathBuf>;

    fn is_resolved(&self, location: &FeaturePackLocation) -> bool;

    /// Default: if the latest build differs from the installed build,
    /// propose replacing the build in the new location; always returns a
    /// plan, possibly empty.
    fn get_update_plan(&self, request: &UpdateRequest) -> Result<FeaturePackUpdatePlan> {
        let installed_location = request.installed.to_location();
        let latest = self.get_latest_build(&installed_location)?;
        let proposed_location = if latest == request.installed.build {
            installed_location.clone()
        } else {
            installed_location.with_build(Some(latest))
        };
        Ok(FeaturePackUpdatePlan {
            producer: request.producer.clone(),
            installed_location,
            proposed_location,
            new_patches: Vec::new(),
            transitive: false,
        })
    }
}

/// Resolves a plugin artifact reference to a path on disk.
pub trait ArtifactResolver: Send + Sync {
    fn resolve(&self, reference: &crate::ArtifactReference) -> Result<PathBuf>;
}

// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

//! In-memory fakes of the resolver traits, used by the builder/patch/options/
//! mutation test modules. A test-only in-memory stand-in for an external
//! system, built once per test via a small registry.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fpk_ident::{Build, ChannelName, FeaturePackId, FeaturePackLocation, ProducerName, ProducerSpec, UniverseName};
use fpk_resolve::{
    ArtifactReference,
    ArtifactResolver,
    Channel,
    FeaturePackKind,
    FeaturePackLayout,
    FeaturePackLayoutFactory,
    FeaturePackSpec,
    LayoutFactory,
    NullProgressTracker,
    ProgressTracker,
    UniverseResolver,
};

use crate::error::{Error, Result};

/// Installs a `tracing` subscriber that writes to the test harness's
/// captured output, so `tracing::debug!`/`warn!` events emitted during a
/// build are visible in a failing test's output.
#[allow(dead_code)]
pub(crate) fn init_logging() {
    let sub = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::DEBUG)
        .without_time()
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(sub);
}

pub(crate) fn universe(name: &str) -> UniverseName {
    UniverseName::new(name).unwrap()
}

pub(crate) fn producer_name(name: &str) -> ProducerName {
    ProducerName::new(name).unwrap()
}

pub(crate) fn channel_name(name: &str) -> ChannelName {
    ChannelName::new(name).unwrap()
}

pub(crate) fn fpid(producer: &str, channel: &str, build: &str) -> FeaturePackId {
    FeaturePackId {
        universe: universe("acme"),
        producer: producer_name(producer),
        channel: channel_name(channel),
        frequency: None,
        build: Build::new(build),
    }
}

pub(crate) fn producer_spec(producer: &str) -> ProducerSpec {
    ProducerSpec::new(universe("acme"), producer_name(producer))
}

/// The `F` used by every test in this crate: just the data
/// `FeaturePackLayout` requires, nothing more.
#[derive(Clone)]
pub(crate) struct TestFp {
    fpid: FeaturePackId,
    spec: Arc<FeaturePackSpec>,
    dir: PathBuf,
    kind: FeaturePackKind,
}

impl FeaturePackLayout for TestFp {
    fn fpid(&self) -> &FeaturePackId {
        &self.fpid
    }

    fn spec(&self) -> &Arc<FeaturePackSpec> {
        &self.spec
    }

    fn dir(&self) -> &Path {
        &self.dir
    }

    fn kind(&self) -> FeaturePackKind {
        self.kind
    }

    fn with_dir(&self, dir: PathBuf) -> Self {
        Self {
            dir,
            ..self.clone()
        }
    }
}

pub(crate) struct TestFpFactory;

impl FeaturePackLayoutFactory<TestFp> for TestFpFactory {
    fn create(
        &self,
        fpid: FeaturePackId,
        spec: Arc<FeaturePackSpec>,
        dir: PathBuf,
        kind: FeaturePackKind,
    ) -> TestFp {
        TestFp {
            fpid,
            spec,
            dir,
            kind,
        }
    }
}

struct Archive {
    spec: FeaturePackSpec,
    dir: PathBuf,
}

/// An in-memory stand-in for the universe of upstream catalogs: known
/// archives, each producer's default channel, and the latest build per
/// `(producer, channel)`.
#[derive(Default)]
pub(crate) struct Registry {
    archives: BTreeMap<FeaturePackId, Archive>,
    default_channels: BTreeMap<ProducerSpec, ChannelName>,
    latest_builds: BTreeMap<(ProducerSpec, ChannelName), Build>,
}

impl Registry {
    pub(crate) fn add_archive(&mut self, fpid: FeaturePackId, spec: FeaturePackSpec, dir: PathBuf) {
        self.archives.insert(fpid, Archive { spec, dir });
    }

    pub(crate) fn set_default_channel(&mut self, producer: ProducerSpec, channel: ChannelName) {
        self.default_channels.insert(producer, channel);
    }

    pub(crate) fn set_latest_build(&mut self, producer: ProducerSpec, channel: ChannelName, build: Build) {
        self.latest_builds.insert((producer, channel), build);
    }
}

pub(crate) struct FakeUniverse(pub(crate) Arc<Registry>);

impl UniverseResolver for FakeUniverse {
    fn get_universe(&self, _producer: &ProducerSpec) -> Result<()> {
        Ok(())
    }

    fn default_channel(&self, producer: &ProducerSpec) -> Result<ChannelName> {
        self.0
            .default_channels
            .get(producer)
            .cloned()
            .ok_or_else(|| Error::String(format!("no default channel configured for {producer}")))
    }

    fn get_channel(&self, location: &FeaturePackLocation) -> Result<Arc<dyn Channel>> {
        let producer = location
            .producer_spec()
            .ok_or_else(|| Error::String("coordinate-form location has no channel".into()))?;
        let name = match location.channel() {
            Some(channel) => channel.clone(),
            None => self.default_channel(&producer)?,
        };
        Ok(Arc::new(FakeChannel {
            registry: Arc::clone(&self.0),
            producer,
            name,
        }))
    }

    fn get_artifact_resolver(&self, _repo_id: &str) -> Result<Arc<dyn ArtifactResolver>> {
        Ok(Arc::new(FakeArtifactResolver))
    }
}

struct FakeChannel {
    registry: Arc<Registry>,
    producer: ProducerSpec,
    name: ChannelName,
}

impl Channel for FakeChannel {
    fn name(&self) -> &ChannelName {
        &self.name
    }

    fn get_latest_build(&self, _location: &FeaturePackLocation) -> Result<Build> {
        self.registry
            .latest_builds
            .get(&(self.producer.clone(), self.name.clone()))
            .cloned()
            .ok_or_else(|| Error::String(format!("no latest build known for {}/{}", self.producer, self.name)))
    }

    fn resolve(&self, location: &FeaturePackLocation) -> Result<PathBuf> {
        let fpid = FeaturePackId::try_from(location.clone())?;
        self.registry
            .archives
            .get(&fpid)
            .map(|a| a.dir.clone())
            .ok_or_else(|| Error::UnknownFeaturePack(fpid))
    }

    fn is_resolved(&self, location: &FeaturePackLocation) -> bool {
        FeaturePackId::try_from(location.clone())
            .map(|fpid| self.registry.archives.contains_key(&fpid))
            .unwrap_or(false)
    }
}

struct FakeArtifactResolver;

impl ArtifactResolver for FakeArtifactResolver {
    fn resolve(&self, reference: &ArtifactReference) -> Result<PathBuf> {
        Ok(PathBuf::from(reference.coordinate()))
    }
}

pub(crate) struct FakeLayoutFactory(pub(crate) Arc<Registry>);

impl LayoutFactory<TestFp> for FakeLayoutFactory {
    fn resolve_feature_pack(
        &self,
        location: &FeaturePackLocation,
        kind: FeaturePackKind,
        fp_factory: &dyn FeaturePackLayoutFactory<TestFp>,
    ) -> Result<TestFp> {
        let fpid = FeaturePackId::try_from(location.clone())?;
        let archive = self
            .0
            .archives
            .get(&fpid)
            .ok_or_else(|| Error::UnknownFeaturePack(fpid.clone()))?;
        Ok(fp_factory.create(fpid, Arc::new(archive.spec.clone()), archive.dir.clone(), kind))
    }

    fn new_progress_tracker(&self) -> Box<dyn ProgressTracker> {
        Box::new(NullProgressTracker)
    }
}

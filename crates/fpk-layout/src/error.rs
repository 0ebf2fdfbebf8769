// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

use std::collections::BTreeMap;
use std::path::PathBuf;

use fpk_ident::{FeaturePackId, ProducerSpec};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The engine's single error type. Every reason is a distinct variant.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown feature pack {0}")]
    UnknownFeaturePack(FeaturePackId),

    #[error("unsatisfied feature-pack dependency on producer {0}")]
    UnsatisfiedFeaturePackDependency(ProducerSpec),

    #[error("patch {0} is already applied")]
    PatchAlreadyApplied(FeaturePackId),

    #[error("patch {patch} does not apply to target {target}")]
    PatchNotApplicable {
        patch: FeaturePackId,
        target: FeaturePackId,
    },

    #[error("version conflict(s) detected: {0:?}")]
    VersionConflict(BTreeMap<ProducerSpec, std::collections::BTreeSet<FeaturePackId>>),

    #[error("transitive dependency not found: {0:?}")]
    TransitiveDependencyNotFound(Vec<ProducerSpec>),

    #[error("required plugin option '{0}' was not set")]
    PluginOptionRequired(String),

    #[error("plugin option(s) not recognised: {0:?}")]
    PluginOptionsNotRecognised(std::collections::BTreeSet<String>),

    #[error("failed to copy {src} to {dst}: {source}")]
    CopyFailed {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    MkdirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read directory {path}: {source}")]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] fpk_config::Error),

    #[error(transparent)]
    Ident(#[from] fpk_ident::Error),

    #[error(transparent)]
    Resolve(#[from] fpk_resolve::Error),

    #[error(transparent)]
    Settings(#[from] crate::settings::Error),

    #[error("Error: {0}")]
    String(String),
}

impl From<&str> for Error {
    fn from(err: &str) -> Error {
        Error::String(err.to_owned())
    }
}

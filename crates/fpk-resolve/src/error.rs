// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

use fpk_ident::{FeaturePackId, FeaturePackLocation};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no channel resolvable for location {0}")]
    NoChannel(FeaturePackLocation),
    #[error("no artifact resolver registered for repository '{0}'")]
    ArtifactResolverMissing(String),
    #[error("unknown feature pack {0}")]
    UnknownFeaturePack(FeaturePackId),
    #[error(transparent)]
    Ident(#[from] fpk_ident::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Error: {0}")]
    String(String),
}

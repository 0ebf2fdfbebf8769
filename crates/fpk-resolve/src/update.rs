// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

use fpk_ident::{FeaturePackId, FeaturePackLocation, ProducerSpec};

/// A request to a [`crate::Channel`] for the latest available update of an
/// installed producer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateRequest {
    pub producer: ProducerSpec,
    pub installed: FeaturePackId,
}

/// For a single producer: the installed location, the proposed new
/// location (equal to installed when there is nothing to do), and any new
/// patches to add. "Empty" iff `proposed_location == installed_location`
/// and `new_patches` is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeaturePackUpdatePlan {
    pub producer: ProducerSpec,
    pub installed_location: FeaturePackLocation,
    pub proposed_location: FeaturePackLocation,
    pub new_patches: Vec<FeaturePackId>,
    pub transitive: bool,
}

impl FeaturePackUpdatePlan {
    pub fn is_empty(&self) -> bool {
        self.proposed_location == self.installed_location && self.new_patches.is_empty()
    }
}

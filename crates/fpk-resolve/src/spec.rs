// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

use fpk_ident::{FeaturePackId, FeaturePackLocation};

#[cfg(test)]
#[path = "./spec_test.rs"]
mod spec_test;

/// The role a resolved feature pack plays in a layout: an ordinary feature
/// pack, or a patch targeting one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeaturePackKind {
    DirectDep,
    TransitiveDep,
    Patch,
}

/// One dependency declared inside a feature-pack's spec: a location plus
/// whether the declaring spec means for it to be addressed transitively
/// (by producer) or directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclaredDependency {
    pub location: FeaturePackLocation,
    pub transitive: bool,
}

impl DeclaredDependency {
    pub fn new(location: FeaturePackLocation, transitive: bool) -> Self {
        Self {
            location,
            transitive,
        }
    }
}

/// The opaque identifier of a plugin a feature pack contributes, e.g. a
/// service name used by the plugin registry for discovery.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PluginId(String);

impl PluginId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PluginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque coordinate that an [`crate::ArtifactResolver`] can turn into a
/// path on disk (e.g. a plugin jar).
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArtifactReference(String);

impl ArtifactReference {
    pub fn new<S: Into<String>>(reference: S) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The repository id an artifact reference is scoped to, given as the
    /// `<repoId>:<coordinate>` prefix. References with no `:` are assumed
    /// to live in the `"default"` repository.
    pub fn repo_id(&self) -> &str {
        self.0.split_once(':').map_or("default", |(repo, _)| repo)
    }

    /// The coordinate portion of the reference, with any `<repoId>:` prefix
    /// stripped.
    pub fn coordinate(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, coord)| coord)
    }
}

impl std::fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A plugin artifact declared by a feature-pack's spec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginDeclaration {
    pub id: PluginId,
    pub artifact: ArtifactReference,
}

/// A plugin option declared recognised by a feature pack's install plugin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginOptionSpec {
    pub name: String,
    /// Build fails unless the effective option set contains this name.
    pub required: bool,
    /// A user override of this option is written back into the config
    /// rather than applying for a single run only.
    pub persistent: bool,
}

impl PluginOptionSpec {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            required: false,
            persistent: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }
}

/// The parsed metadata of a feature-pack archive: everything the layout
/// builder needs that isn't the raw resources/plugins content itself
/// (reading those subtrees is the work area's job, not this crate's).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeaturePackSpec {
    pub transitive_deps: Vec<DeclaredDependency>,
    pub direct_deps: Vec<DeclaredDependency>,
    pub plugins: Vec<PluginDeclaration>,
    /// Options this feature pack's install plugin(s) recognise.
    pub plugin_options: Vec<PluginOptionSpec>,
    /// Set when this spec declares itself a patch; the FPID it overlays.
    pub patch_for: Option<FeaturePackId>,
    pub default_packages: Vec<String>,
}

impl FeaturePackSpec {
    pub fn is_patch(&self) -> bool {
        self.patch_for.is_some()
    }

    /// Returns a copy of this spec with every dependency (transitive or
    /// direct) whose location equals `from` replaced by `to`, preserving
    /// the exact order of the source spec.
    pub fn with_dependency_replaced(
        &self,
        from: &FeaturePackLocation,
        to: FeaturePackLocation,
    ) -> Self {
        let replace = |deps: &[DeclaredDependency]| -> Vec<DeclaredDependency> {
            deps.iter()
                .map(|dep| {
                    if &dep.location == from {
                        DeclaredDependency::new(to.clone(), dep.transitive)
                    } else {
                        dep.clone()
                    }
                })
                .collect()
        };
        Self {
            transitive_deps: replace(&self.transitive_deps),
            direct_deps: replace(&self.direct_deps),
            ..self.clone()
        }
    }
}

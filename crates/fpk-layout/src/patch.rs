// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

//! The patch applicator.
//!
//! Runs once per build, after traversal has populated `ordered` and
//! `fpPatches`. For every patched F it copies the F's directory into
//! `patched/<fpid>`, repoints the F at the copy, then overlays each patch
//! in list order: content-only subdirectories land in the patched copy,
//! `plugins/` and `resources/` additionally land in the global aggregates
//! so a patch can override a dependency's contribution the same way a
//! consumer FP does.

use std::path::{Path, PathBuf};

use fpk_resolve::FeaturePackLayout;

use crate::error::Result;
use crate::workarea::copy_dir_recursive;
use crate::Layout;

#[cfg(test)]
#[path = "./patch_test.rs"]
mod patch_test;

/// Subdirectories a patch may contribute that only ever land in the
/// patched copy of the target, never in a global aggregate.
const PATCH_ONLY_SUBDIRS: &[&str] = &["packages", "features", "feature-groups", "configs", "layers"];

impl<F: FeaturePackLayout> Layout<F> {
    /// For each F in `ordered` with patches registered under
    /// its FPID, copy it into `patched/<fpid>` and overlay its patches in
    /// insertion order. Unpatched Fs are left exactly as traversal copied
    /// them.
    pub(crate) fn apply_patches(&mut self) -> Result<()> {
        let Some(work_area) = self.work_area.clone() else {
            return Ok(());
        };

        let ordered = std::mem::take(&mut self.state.ordered);
        let mut patched = Vec::with_capacity(ordered.len());
        for f in ordered {
            let patches = self.state.fp_patches.get(f.fpid()).cloned().unwrap_or_default();
            if patches.is_empty() {
                patched.push(f);
                continue;
            }

            let dest = patched_dir_for(&work_area.patched_dir(), f.fpid());
            copy_dir_recursive(f.dir(), &dest)?;

            for patch in &patches {
                for subdir in PATCH_ONLY_SUBDIRS {
                    copy_subtree_if_present(&patch.dir().join(subdir), &dest.join(subdir))?;
                }
                copy_subtree_if_present(&patch.dir().join("plugins"), &dest.join("plugins"))?;
                copy_subtree_if_present(&patch.dir().join("plugins"), &work_area.plugins_dir())?;
                copy_subtree_if_present(&patch.dir().join("resources"), &dest.join("resources"))?;
                copy_subtree_if_present(&patch.dir().join("resources"), &work_area.resources_dir())?;
                tracing::debug!(target = %f.fpid(), patch = %patch.fpid(), "applied patch");
            }

            let patched_f = f.with_dir(dest);
            self.state
                .feature_packs
                .insert(patched_f.fpid().producer_spec(), patched_f.clone());
            patched.push(patched_f);
        }

        self.state.ordered = patched;
        Ok(())
    }
}

fn patched_dir_for(patched_root: &Path, fpid: &fpk_ident::FeaturePackId) -> PathBuf {
    patched_root
        .join(fpid.universe.as_str())
        .join(fpid.producer.as_str())
        .join(fpid.channel.as_str())
        .join(fpid.build.as_str())
}

fn copy_subtree_if_present(src: &Path, dst: &Path) -> Result<()> {
    if !src.exists() {
        return Ok(());
    }
    copy_dir_recursive(src, dst)
}

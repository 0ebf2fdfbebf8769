// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

//! A patch overlays a target's resources, and uninstalling the patch
//! restores the original content.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fpk_config::{FeaturePackConfig, OptionMap, ProvisioningConfig};
use fpk_resolve::FeaturePackSpec;
use rstest::rstest;
use tempfile::tempdir;

use super::*;
use crate::error::Error;
use crate::testutil::{fpid, FakeLayoutFactory, FakeUniverse, Registry, TestFp, TestFpFactory};

fn dir_with_resource(root: &Path, name: &str, content: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(dir.join("resources")).unwrap();
    fs::write(dir.join("resources").join("x"), content).unwrap();
    dir
}

fn new_layout(registry: Registry, config: ProvisioningConfig, root: &Path) -> Result<Layout<TestFp>> {
    let registry = Arc::new(registry);
    Layout::create(
        config,
        Arc::new(FakeUniverse(Arc::clone(&registry))),
        Arc::new(FakeLayoutFactory(Arc::clone(&registry))),
        Arc::new(TestFpFactory),
        root.join("work"),
        false,
        false,
    )
}

#[rstest]
fn patch_overlays_resources_and_uninstall_restores_original() {
    let tmp = tempdir().unwrap();
    let a_fpid = fpid("a", "stable", "1.0");
    let patch_fpid = fpid("a-patch", "stable", "1.0");

    let mut registry = Registry::default();
    registry.add_archive(
        a_fpid.clone(),
        FeaturePackSpec::default(),
        dir_with_resource(tmp.path(), "a", "v1"),
    );
    registry.add_archive(
        patch_fpid.clone(),
        FeaturePackSpec {
            patch_for: Some(a_fpid.clone()),
            ..Default::default()
        },
        dir_with_resource(tmp.path(), "a-patch", "v2"),
    );

    let config = ProvisioningConfig::builder()
        .append_direct(FeaturePackConfig::new(a_fpid.to_location()).with_patch(patch_fpid.clone()))
        .build();

    let mut layout = new_layout(registry, config, tmp.path()).unwrap();

    assert!(layout.has_patches(&a_fpid));
    assert_eq!(layout.patches(&a_fpid).len(), 1);
    let patched = fs::read_to_string(layout.resource(["x"]).unwrap()).unwrap();
    assert_eq!(patched, "v2", "the patch's resource overlays the target's");

    layout.uninstall(patch_fpid, OptionMap::new()).unwrap();

    assert!(!layout.has_patches(&a_fpid));
    let restored = fs::read_to_string(layout.resource(["x"]).unwrap()).unwrap();
    assert_eq!(restored, "v1", "removing the patch restores the target's own resource");
}

#[rstest]
fn patch_install_fails_when_target_not_installed() {
    let tmp = tempdir().unwrap();
    let a_fpid = fpid("a", "stable", "1.0");
    let other_fpid = fpid("b", "stable", "1.0");
    let patch_fpid = fpid("a-patch", "stable", "1.0");

    let mut registry = Registry::default();
    registry.add_archive(
        other_fpid.clone(),
        FeaturePackSpec::default(),
        dir_with_resource(tmp.path(), "b", "v1"),
    );
    registry.add_archive(
        patch_fpid.clone(),
        FeaturePackSpec {
            patch_for: Some(a_fpid),
            ..Default::default()
        },
        dir_with_resource(tmp.path(), "a-patch", "v2"),
    );

    let config = ProvisioningConfig::builder()
        .append_direct(FeaturePackConfig::new(other_fpid.to_location()))
        .build();

    let mut layout = new_layout(registry, config, tmp.path()).unwrap();
    let result = layout.install(FeaturePackConfig::new(patch_fpid.to_location()), OptionMap::new());
    assert!(matches!(result, Err(Error::PatchNotApplicable { .. })));
}

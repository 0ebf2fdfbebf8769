// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

//! The options driver: required/persistent/transient plugin options,
//! reconciled against a caller override map on every rebuild.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fpk_config::{option_map, FeaturePackConfig, ProvisioningConfig};
use fpk_resolve::{FeaturePackSpec, PluginOptionSpec};
use rstest::rstest;
use tempfile::tempdir;

use super::*;
use crate::testutil::{fpid, FakeLayoutFactory, FakeUniverse, Registry, TestFp, TestFpFactory};
use crate::ProvisioningPlan;

fn empty_dir(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
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
fn required_plugin_option_missing_fails_the_build() {
    let tmp = tempdir().unwrap();
    let mut registry = Registry::default();
    registry.add_archive(
        fpid("a", "stable", "1.0"),
        FeaturePackSpec {
            plugin_options: vec![PluginOptionSpec::new("FEATURE_X").required()],
            ..Default::default()
        },
        empty_dir(tmp.path(), "a"),
    );

    let config = ProvisioningConfig::builder()
        .append_direct(FeaturePackConfig::new(fpid("a", "stable", "1.0").to_location()))
        .build();

    let result = new_layout(registry, config, tmp.path());
    assert!(matches!(result, Err(Error::PluginOptionRequired(name)) if name == "FEATURE_X"));
}

#[rstest]
fn persistent_override_is_written_back_into_config() {
    let tmp = tempdir().unwrap();
    let mut registry = Registry::default();
    registry.add_archive(
        fpid("a", "stable", "1.0"),
        FeaturePackSpec {
            plugin_options: vec![PluginOptionSpec::new("MODE").persistent()],
            ..Default::default()
        },
        empty_dir(tmp.path(), "a"),
    );

    let config = ProvisioningConfig::builder()
        .append_direct(FeaturePackConfig::new(fpid("a", "stable", "1.0").to_location()))
        .build();

    let mut layout = new_layout(registry, config, tmp.path()).unwrap();
    assert_eq!(layout.option_value("MODE"), None);

    layout
        .apply(ProvisioningPlan::default(), option_map! { "MODE" => "fast" })
        .unwrap();

    assert_eq!(layout.option_value("MODE"), Some("fast"));
    assert_eq!(layout.config().options().get("MODE"), Some("fast"), "persistent options survive in the config");
}

#[rstest]
fn non_persistent_override_applies_for_one_run_without_persisting() {
    let tmp = tempdir().unwrap();
    let mut registry = Registry::default();
    registry.add_archive(
        fpid("a", "stable", "1.0"),
        FeaturePackSpec {
            plugin_options: vec![PluginOptionSpec::new("LEVEL")],
            ..Default::default()
        },
        empty_dir(tmp.path(), "a"),
    );

    let config = ProvisioningConfig::builder()
        .append_direct(FeaturePackConfig::new(fpid("a", "stable", "1.0").to_location()))
        .options(option_map! { "LEVEL" => "low" })
        .build();

    let mut layout = new_layout(registry, config, tmp.path()).unwrap();
    assert_eq!(layout.option_value("LEVEL"), Some("low"));

    layout
        .apply(ProvisioningPlan::default(), option_map! { "LEVEL" => "high" })
        .unwrap();

    assert_eq!(layout.option_value("LEVEL"), Some("high"), "the override applies for this run");
    assert_eq!(
        layout.config().options().get("LEVEL"),
        None,
        "a differing non-persistent override is dropped from the config, not persisted"
    );
}

#[rstest]
fn unrecognised_config_option_fails_without_cleanup() {
    let tmp = tempdir().unwrap();
    let mut registry = Registry::default();
    registry.add_archive(fpid("a", "stable", "1.0"), FeaturePackSpec::default(), empty_dir(tmp.path(), "a"));

    let config = ProvisioningConfig::builder()
        .append_direct(FeaturePackConfig::new(fpid("a", "stable", "1.0").to_location()))
        .options(option_map! { "NONSENSE" => "1" })
        .build();

    let result = new_layout(registry, config, tmp.path());
    match result {
        Err(Error::PluginOptionsNotRecognised(names)) => assert!(names.contains("NONSENSE")),
        other => panic!("expected PluginOptionsNotRecognised, got {other:?}"),
    }
}

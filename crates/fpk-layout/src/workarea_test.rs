// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

use std::fs;

use rstest::rstest;
use tempfile::tempdir;

use super::*;

#[rstest]
fn root_is_deleted_only_after_every_clone_drops() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("work");
    let area = WorkArea::acquire(root.clone()).unwrap();
    let view = area.share();
    assert!(root.exists());

    drop(area);
    assert!(root.exists(), "one live reference should keep the directory");

    drop(view);
    assert!(!root.exists(), "last reference drop should remove the directory");
}

#[rstest]
fn aggregate_feature_pack_content_overwrites_in_call_order() {
    let tmp = tempdir().unwrap();
    let area = WorkArea::acquire(tmp.path().join("work")).unwrap();

    let dep_a = tmp.path().join("dep-a");
    fs::create_dir_all(dep_a.join("resources")).unwrap();
    fs::write(dep_a.join("resources/shared.txt"), "from-a").unwrap();

    let dep_b = tmp.path().join("dep-b");
    fs::create_dir_all(dep_b.join("resources")).unwrap();
    fs::write(dep_b.join("resources/shared.txt"), "from-b").unwrap();

    area.aggregate_feature_pack_content(&dep_a).unwrap();
    area.aggregate_feature_pack_content(&dep_b).unwrap();

    let content = fs::read_to_string(area.resource_path(["shared.txt"])).unwrap();
    assert_eq!(content, "from-b", "later aggregation call should win");
}

#[rstest]
fn reset_clears_subdirs_but_keeps_root() {
    let tmp = tempdir().unwrap();
    let area = WorkArea::acquire(tmp.path().join("work")).unwrap();
    fs::create_dir_all(area.resources_dir()).unwrap();
    fs::write(area.resources_dir().join("x"), "1").unwrap();

    area.reset();

    assert!(area.root().exists());
    assert!(!area.resources_dir().exists());
}

#[rstest]
fn plugin_context_guard_restores_ambient_state_on_drop() {
    let tmp = tempdir().unwrap();
    let area = WorkArea::acquire(tmp.path().join("work")).unwrap();
    assert!(active_plugin_root().is_none());
    {
        let _guard = area.open_plugin_context();
        assert_eq!(active_plugin_root(), Some(area.plugins_dir()));
    }
    assert!(active_plugin_root().is_none());
}

#[rstest]
fn new_staged_dir_empties_preexisting_content() {
    let tmp = tempdir().unwrap();
    let area = WorkArea::acquire(tmp.path().join("work")).unwrap();
    let staged = area.new_staged_dir().unwrap();
    fs::write(staged.join("stale.txt"), "old").unwrap();

    let staged_again = area.new_staged_dir().unwrap();
    assert_eq!(staged, staged_again);
    assert!(!staged_again.join("stale.txt").exists());
}

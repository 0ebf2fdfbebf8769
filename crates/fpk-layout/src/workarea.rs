// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

//! Scoped, reference-counted working directory.
//!
//! [`WorkArea`] wraps an [`Arc`] around the actual directory handle: cloning
//! it (what [`WorkArea::share`] does, used by `Layout::transform`) bumps the
//! refcount, and the directory is deleted only when the last clone is
//! dropped. This gives a ref-count-driven close for free from `Arc`'s
//! own drop glue, rather than hand-rolling a counter.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};

#[cfg(test)]
#[path = "./workarea_test.rs"]
mod workarea_test;

struct WorkAreaInner {
    root: PathBuf,
}

impl Drop for WorkAreaInner {
    fn drop(&mut self) {
        // I/O errors during close are swallowed: best effort.
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

#[derive(Clone)]
pub struct WorkArea {
    inner: Arc<WorkAreaInner>,
}

impl WorkArea {
    /// Creates the work area's root directory. Subdirectories are created
    /// lazily by the operations that need them.
    pub fn acquire(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root).map_err(|source| Error::MkdirFailed {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            inner: Arc::new(WorkAreaInner { root }),
        })
    }

    /// Returns a new strong reference to the same on-disk directory, for a
    /// `transform`ed view of the layout. The directory is only deleted once
    /// every clone (the original and all transformed views) has been
    /// dropped/closed.
    pub fn share(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    pub fn patched_dir(&self) -> PathBuf {
        self.root().join("patched")
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.root().join("plugins")
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.root().join("resources")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.root().join("tmp")
    }

    pub fn staged_dir(&self) -> PathBuf {
        self.root().join("staged")
    }

    pub fn tmp_path<I, S>(&self, segments: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        let mut path = self.tmp_dir();
        for segment in segments {
            path.push(segment);
        }
        path
    }

    pub fn resource_path<I, S>(&self, segments: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        let mut path = self.resources_dir();
        for segment in segments {
            path.push(segment);
        }
        path
    }

    pub fn has_resources(&self) -> bool {
        dir_has_entries(&self.resources_dir())
    }

    pub fn has_plugins(&self) -> bool {
        dir_has_entries(&self.plugins_dir())
    }

    /// Acquires the staged output directory, emptying it first if it
    /// already holds content from a previous stage.
    pub fn new_staged_dir(&self) -> Result<PathBuf> {
        let staged = self.staged_dir();
        if staged.exists() {
            std::fs::remove_dir_all(&staged).map_err(|source| Error::CopyFailed {
                src: staged.clone(),
                dst: staged.clone(),
                source,
            })?;
        }
        mkdir_all(&staged)?;
        Ok(staged)
    }

    /// Copies a feature pack's `resources/` and `plugins/` subtrees into the
    /// work area's aggregates. Call this in dependency order (leaves
    /// first): a later call overwrites files a prior call wrote at the same
    /// relative path, giving "last writer wins" semantics.
    pub fn aggregate_feature_pack_content(&self, fp_dir: &Path) -> Result<()> {
        copy_subtree_if_exists(&fp_dir.join("resources"), &self.resources_dir())?;
        copy_subtree_if_exists(&fp_dir.join("plugins"), &self.plugins_dir())?;
        Ok(())
    }

    /// Copies a single already-resolved plugin artifact into `plugins/`,
    /// named after its plugin id.
    pub fn add_plugin_artifact(&self, file_name: &str, artifact: &Path) -> Result<PathBuf> {
        let dir = self.plugins_dir();
        mkdir_all(&dir)?;
        let dest = dir.join(file_name);
        std::fs::copy(artifact, &dest).map_err(|source| Error::CopyFailed {
            src: artifact.to_path_buf(),
            dst: dest.clone(),
            source,
        })?;
        Ok(dest)
    }

    /// Clears every subdirectory's content but keeps the work area's root.
    /// Best-effort: a failed removal is logged and skipped rather than
    /// aborting the reset, which continues attempting the rest of the
    /// recursive deletion.
    pub fn reset(&self) {
        for dir in [
            self.patched_dir(),
            self.plugins_dir(),
            self.resources_dir(),
            self.tmp_dir(),
            self.staged_dir(),
        ] {
            if dir.exists() {
                if let Err(err) = std::fs::remove_dir_all(&dir) {
                    tracing::warn!(path = %dir.display(), %err, "failed to clear work-area subdirectory, continuing");
                }
            }
        }
    }

    /// Opens a plugin-discovery context rooted at `plugins/`. The ambient
    /// context is restored when the returned guard is dropped, on every
    /// exit path including early return or panic unwind.
    pub fn open_plugin_context(&self) -> PluginContextGuard {
        let previous = ACTIVE_PLUGIN_ROOT.with(|cell| cell.borrow_mut().replace(self.plugins_dir()));
        PluginContextGuard { previous }
    }
}

thread_local! {
    static ACTIVE_PLUGIN_ROOT: std::cell::RefCell<Option<PathBuf>> = std::cell::RefCell::new(None);
}

/// Returns the plugin-discovery root currently installed as ambient
/// context, if any `PluginContextGuard` is live on this thread.
pub fn active_plugin_root() -> Option<PathBuf> {
    ACTIVE_PLUGIN_ROOT.with(|cell| cell.borrow().clone())
}

/// Restores the previous plugin-discovery context on drop.
#[must_use]
pub struct PluginContextGuard {
    previous: Option<PathBuf>,
}

impl Drop for PluginContextGuard {
    fn drop(&mut self) {
        ACTIVE_PLUGIN_ROOT.with(|cell| *cell.borrow_mut() = self.previous.take());
    }
}

fn dir_has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

fn mkdir_all(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| Error::MkdirFailed {
        path: dir.to_path_buf(),
        source,
    })
}

fn copy_subtree_if_exists(src: &Path, dst_root: &Path) -> Result<()> {
    if !src.exists() {
        return Ok(());
    }
    copy_dir_recursive(src, dst_root)
}

/// Recursively copies `src`'s content into `dst_root`, overwriting any
/// file already present at the same relative path ("last writer wins").
pub fn copy_dir_recursive(src: &Path, dst_root: &Path) -> Result<()> {
    mkdir_all(dst_root)?;
    let entries = std::fs::read_dir(src).map_err(|source| Error::ReadDirFailed {
        path: src.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| Error::ReadDirFailed {
            path: src.to_path_buf(),
            source,
        })?;
        let file_type = entry.file_type().map_err(|source| Error::ReadDirFailed {
            path: entry.path(),
            source,
        })?;
        let dst = dst_root.join(entry.file_name());
        if file_type.is_dir() {
            copy_dir_recursive(&entry.path(), &dst)?;
        } else {
            std::fs::copy(entry.path(), &dst).map_err(|source| Error::CopyFailed {
                src: entry.path(),
                dst: dst.clone(),
                source,
            })?;
        }
    }
    Ok(())
}

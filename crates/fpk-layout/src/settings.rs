// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

//! Process-wide engine tunables. These are *not* part of the per-install
//! [`fpk_config::ProvisioningConfig`] data model (which stays a plain,
//! non-persisted in-memory value): they are ambient knobs a host
//! application loads once at startup, held in a global
//! `OnceCell<RwLock<Arc<Settings>>>`. [`load_settings`] populates it from
//! layered config sources via the `config` crate (an optional
//! `fpk-layout.{toml,yaml,...}` file, overridden by `FPK_LAYOUT_*`
//! environment variables); until a host calls it, [`get_settings`] hands
//! back [`Settings::default`].

use std::sync::{Arc, RwLock};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static SETTINGS: OnceCell<RwLock<Arc<Settings>>> = OnceCell::new();

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot load settings, lock has been poisoned: {0}")]
    LockPoisoned(String),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Default policy and verbosity knobs for the engine.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Fallback `VERSION_CONVERGENCE` policy used when a config sets
    /// none explicitly: `"FIRST_PROCESSED"` or `"FAIL"`.
    pub default_convergence_policy: String,
    /// Increase progress verbosity whenever a build produces a conflict.
    pub verbose_on_conflict: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_convergence_policy: "FIRST_PROCESSED".to_string(),
            verbose_on_conflict: false,
        }
    }
}

/// Returns the current process-wide settings, loading the default value the
/// first time it is called.
pub fn get_settings() -> Result<Arc<Settings>> {
    let lock = SETTINGS.get_or_init(|| RwLock::new(Arc::new(Settings::default())));
    lock.read()
        .map(|s| Arc::clone(&s))
        .map_err(|e| Error::LockPoisoned(e.to_string()))
}

/// Replaces the current process-wide settings, e.g. after loading from a
/// config file via the `config` crate. Returns the replaced value.
pub fn set_settings(settings: Settings) -> Result<Arc<Settings>> {
    let lock = SETTINGS.get_or_init(|| RwLock::new(Arc::new(Settings::default())));
    let mut guard = lock.write().map_err(|e| Error::LockPoisoned(e.to_string()))?;
    Ok(std::mem::replace(&mut *guard, Arc::new(settings)))
}

/// Builds a [`Settings`] value by layering an optional `fpk-layout` config
/// file (any format the `config` crate recognises, e.g. `fpk-layout.toml`
/// in the current directory) under `FPK_LAYOUT_`-prefixed environment
/// variables, e.g. `FPK_LAYOUT_DEFAULT_CONVERGENCE_POLICY=FAIL`.
pub fn load() -> Result<Settings> {
    let built = config::Config::builder()
        .add_source(config::File::with_name("fpk-layout").required(false))
        .add_source(config::Environment::with_prefix("FPK_LAYOUT").separator("_"))
        .build()?;
    Ok(built.try_deserialize()?)
}

/// Loads settings via [`load`] and installs them as the process-wide
/// settings, returning the value that was replaced.
pub fn load_settings() -> Result<Arc<Settings>> {
    let settings = load()?;
    set_settings(settings)
}

// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

use std::collections::BTreeMap;
use std::iter::FromIterator;

#[cfg(test)]
#[path = "./option_map_test.rs"]
mod option_map_test;

/// Create a set of options from a simple mapping.
///
/// ```
/// # use fpk_config::option_map;
/// let opts = option_map! {
///     "parallelism" => "4",
///     "target" => "linux-x86_64",
/// };
/// assert_eq!(opts.get("target"), Some("linux-x86_64"));
/// ```
#[macro_export]
macro_rules! option_map {
    ($($k:expr => $v:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut opts = $crate::OptionMap::default();
        $(opts.insert($k.to_string(), $v.to_string());)*
        opts
    }};
}

/// A set of key/value options attached to a config entry or the global
/// config. Plain string values; interpretation (required/persistent) is
/// the options driver's concern (see `fpk_layout::options`).
#[derive(Default, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct OptionMap {
    options: BTreeMap<String, String>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: String, value: String) -> Option<String> {
        self.options.insert(name, value)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.options.remove(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.options.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns a copy of `self` with every key/value pair from `other`
    /// overlaid on top (overwriting any matching key).
    pub fn overlaid_with(&self, other: &OptionMap) -> OptionMap {
        let mut merged = self.clone();
        for (k, v) in other.iter() {
            merged.insert(k.clone(), v.clone());
        }
        merged
    }
}

impl FromIterator<(String, String)> for OptionMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            options: BTreeMap::from_iter(iter),
        }
    }
}

impl IntoIterator for OptionMap {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.into_iter()
    }
}

impl std::fmt::Display for OptionMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items: Vec<_> = self.iter().map(|(n, v)| format!("{n}: {v}")).collect();
        write!(f, "{{{}}}", items.join(", "))
    }
}

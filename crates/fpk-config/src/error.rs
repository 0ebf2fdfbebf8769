// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("illegal value '{value}' for option '{name}': expected one of {allowed:?}")]
    IllegalOptionValue {
        name: String,
        value: String,
        allowed: Vec<&'static str>,
    },
    #[error(transparent)]
    Ident(#[from] fpk_ident::Error),
    #[error("Error: {0}")]
    String(String),
}

impl From<&str> for Error {
    fn from(err: &str) -> Error {
        Error::String(err.to_owned())
    }
}

// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

use std::fmt;
use std::str::FromStr;

use crate::names::{Build, ChannelName, ProducerName, UniverseName};
use crate::{Error, Result};

#[cfg(test)]
#[path = "./location_test.rs"]
mod location_test;

/// The identity of a feature-pack stream, independent of version.
///
/// Equality is structural on `(universe, producer)`. Membership in a
/// layout's installed set is always keyed by `ProducerSpec`, never by
/// channel or build.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProducerSpec {
    pub universe: UniverseName,
    pub producer: ProducerName,
}

impl ProducerSpec {
    pub fn new(universe: UniverseName, producer: ProducerName) -> Self {
        Self { universe, producer }
    }
}

impl fmt::Display for ProducerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.universe, self.producer)
    }
}

/// A `FeaturePackLocation` (FPL): `(universe, producer, channel, frequency,
/// build)`, where `build` may be absent ("latest"), or a degenerate
/// coordinate-form location carrying only an opaque artifact coordinate.
///
/// A coordinate-form location must be normalized into `Full` form by
/// resolution before it can be used as a dependency target; see
/// `resolveFeaturePack` in the layout builder.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeaturePackLocation {
    /// An opaque artifact coordinate (e.g. a maven-style `group:artifact:version`).
    Coordinate(String),
    Full(FullLocation),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FullLocation {
    pub universe: UniverseName,
    pub producer: ProducerName,
    pub channel: Option<ChannelName>,
    pub frequency: Option<String>,
    pub build: Option<Build>,
}

impl FeaturePackLocation {
    pub fn coordinate<S: Into<String>>(coord: S) -> Self {
        Self::Coordinate(coord.into())
    }

    pub fn full(universe: UniverseName, producer: ProducerName) -> Self {
        Self::Full(FullLocation {
            universe,
            producer,
            channel: None,
            frequency: None,
            build: None,
        })
    }

    pub fn is_coordinate(&self) -> bool {
        matches!(self, Self::Coordinate(_))
    }

    pub fn as_full(&self) -> Option<&FullLocation> {
        match self {
            Self::Full(f) => Some(f),
            Self::Coordinate(_) => None,
        }
    }

    pub fn producer_spec(&self) -> Option<ProducerSpec> {
        self.as_full()
            .map(|f| ProducerSpec::new(f.universe.clone(), f.producer.clone()))
    }

    pub fn channel(&self) -> Option<&ChannelName> {
        self.as_full().and_then(|f| f.channel.as_ref())
    }

    pub fn build(&self) -> Option<&Build> {
        self.as_full().and_then(|f| f.build.as_ref())
    }

    /// Returns a copy of this location with its build replaced.
    pub fn with_build(&self, build: Option<Build>) -> Self {
        match self {
            Self::Coordinate(c) => Self::Coordinate(c.clone()),
            Self::Full(f) => Self::Full(FullLocation {
                build,
                ..f.clone()
            }),
        }
    }

    /// Returns a copy of this location with its channel replaced.
    pub fn with_channel(&self, channel: Option<ChannelName>) -> Self {
        match self {
            Self::Coordinate(c) => Self::Coordinate(c.clone()),
            Self::Full(f) => Self::Full(FullLocation {
                channel,
                ..f.clone()
            }),
        }
    }
}

impl fmt::Display for FeaturePackLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coordinate(c) => write!(f, "coord:{c}"),
            Self::Full(loc) => {
                write!(f, "{}/{}", loc.universe, loc.producer)?;
                if let Some(channel) = &loc.channel {
                    write!(f, "/{channel}")?;
                    if let Some(frequency) = &loc.frequency {
                        write!(f, "@{frequency}")?;
                    }
                }
                if let Some(build) = &loc.build {
                    write!(f, "/{build}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for FeaturePackLocation {
    type Err = Error;

    /// Parses the textual form produced by `Display`:
    /// `coord:<opaque>` or `<universe>/<producer>[/<channel>[@<frequency>]][/<build>]`.
    fn from_str(source: &str) -> Result<Self> {
        if let Some(coord) = source.strip_prefix("coord:") {
            return Ok(Self::coordinate(coord));
        }
        let parts: Vec<&str> = source.split('/').collect();
        if parts.len() < 2 || parts.len() > 4 {
            return Err(Error::InvalidLocation(
                source.to_string(),
                "expected universe/producer[/channel[@frequency]][/build]".into(),
            ));
        }
        let universe = UniverseName::new(parts[0])?;
        let producer = ProducerName::new(parts[1])?;
        let (channel, frequency) = match parts.get(2) {
            Some(chan_part) => {
                let mut split = chan_part.splitn(2, '@');
                let channel = ChannelName::new(split.next().unwrap())?;
                let frequency = split.next().map(str::to_string);
                (Some(channel), frequency)
            }
            None => (None, None),
        };
        let build = parts.get(3).map(|b| Build::new(*b));
        Ok(Self::Full(FullLocation {
            universe,
            producer,
            channel,
            frequency,
            build,
        }))
    }
}

/// A [`FeaturePackLocation`] with a concrete, non-null build: a specific,
/// resolvable artifact.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeaturePackId {
    pub universe: UniverseName,
    pub producer: ProducerName,
    pub channel: ChannelName,
    pub frequency: Option<String>,
    pub build: Build,
}

impl FeaturePackId {
    pub fn producer_spec(&self) -> ProducerSpec {
        ProducerSpec::new(self.universe.clone(), self.producer.clone())
    }

    pub fn to_location(&self) -> FeaturePackLocation {
        FeaturePackLocation::Full(FullLocation {
            universe: self.universe.clone(),
            producer: self.producer.clone(),
            channel: Some(self.channel.clone()),
            frequency: self.frequency.clone(),
            build: Some(self.build.clone()),
        })
    }
}

impl fmt::Display for FeaturePackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_location(), f)
    }
}

impl TryFrom<FeaturePackLocation> for FeaturePackId {
    type Error = Error;

    fn try_from(loc: FeaturePackLocation) -> Result<Self> {
        match loc {
            FeaturePackLocation::Coordinate(c) => Err(Error::InvalidLocation(
                format!("coord:{c}"),
                "a coordinate-form location cannot become a FeaturePackId before resolution"
                    .into(),
            )),
            FeaturePackLocation::Full(full) => {
                let channel = full.channel.ok_or_else(|| {
                    Error::InvalidLocation(
                        full.producer.to_string(),
                        "a FeaturePackId requires a resolved channel".into(),
                    )
                })?;
                let build = full.build.ok_or_else(|| {
                    Error::InvalidLocation(
                        full.producer.to_string(),
                        "a FeaturePackId requires a concrete build".into(),
                    )
                })?;
                Ok(Self {
                    universe: full.universe,
                    producer: full.producer,
                    channel,
                    frequency: full.frequency,
                    build,
                })
            }
        }
    }
}

impl From<FeaturePackId> for FeaturePackLocation {
    fn from(fpid: FeaturePackId) -> Self {
        fpid.to_location()
    }
}

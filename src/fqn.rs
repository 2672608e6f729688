//! Fully qualified names.
//!
//! An [`Fqn`] is a dot separated path such as `App.Models.User`. Each segment
//! addresses one slot in the namespace tree, walked from the root.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::registry::error::{NamespaceError, NamespaceResult};

pub const SEPARATOR: char = '.';

lazy_static! {
    static ref SEGMENT: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
}

/// Validated, dot separated namespace path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fqn {
    segments: Vec<String>,
}

impl Fqn {
    pub fn parse(fqn: &str) -> NamespaceResult<Self> {
        if fqn.is_empty() {
            return Err(NamespaceError::invalid_fqn(fqn, "name is empty"));
        }
        let segments = fqn
            .split(SEPARATOR)
            .map(|segment| {
                if segment.is_empty() {
                    Err(NamespaceError::invalid_fqn(fqn, "empty segment"))
                } else if !SEGMENT.is_match(segment) {
                    Err(NamespaceError::invalid_fqn(
                        fqn,
                        format!("segment '{}' is not an identifier", segment),
                    ))
                } else {
                    Ok(segment.to_string())
                }
            })
            .collect::<NamespaceResult<Vec<_>>>()?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; a parsed name has at least one segment.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn leaf(&self) -> &str {
        // parse guarantees at least one segment
        &self.segments[self.segments.len() - 1]
    }

    pub fn parent(&self) -> Option<Fqn> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Prefix up to and including segment `index`.
    ///
    /// Indexes past the end clamp to the full name.
    pub fn truncate(&self, index: usize) -> Fqn {
        let end = (index + 1).min(self.segments.len());
        Self {
            segments: self.segments[..end].to_vec(),
        }
    }

    /// Every prefix, shortest first, ending with the name itself.
    pub fn prefixes(&self) -> impl Iterator<Item = Fqn> + '_ {
        (0..self.segments.len()).map(|i| self.truncate(i))
    }

    pub fn child(&self, segment: &str) -> NamespaceResult<Fqn> {
        Fqn::parse(&format!("{}{}{}", self, SEPARATOR, segment))
    }
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for Fqn {
    type Err = NamespaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Fqn::parse(s)
    }
}

impl Serialize for Fqn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Fqn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Fqn::parse(&raw).map_err(serde::de::Error::custom)
    }
}

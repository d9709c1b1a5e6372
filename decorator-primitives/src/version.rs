//! Semantic versions and decorator version compatibility.
//!
//! Decorator versions follow `major.minor.patch`. A registered version
//! satisfies a requested one when the majors are equal and the registered
//! `minor.patch` is at least the requested `minor.patch`; no compatibility is
//! assumed across majors.

use crate::error::{Error, Result};

pub use semver::Version;

/// Parses a `major.minor.patch` string into a [`Version`].
///
/// # Errors
///
/// Returns [`Error::InvalidVersion`] when the string is not a valid semantic
/// version.
pub fn parse_version(input: &str) -> Result<Version> {
    Version::parse(input.trim()).map_err(|source| Error::InvalidVersion {
        input: input.to_owned(),
        source,
    })
}

/// Returns true when `available` can serve a request for `requested`.
#[must_use]
pub fn is_compatible(available: &Version, requested: &Version) -> bool {
    available.major == requested.major
        && (available.minor, available.patch) >= (requested.minor, requested.patch)
}

/// Inclusive range of prompt-decorator standard versions a definition supports.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StandardRange {
    min: Option<Version>,
    max: Option<Version>,
}

impl StandardRange {
    /// Creates a range from optional inclusive bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] when `min` is greater than `max`.
    pub fn new(min: Option<Version>, max: Option<Version>) -> Result<Self> {
        if let (Some(lo), Some(hi)) = (&min, &max) {
            if lo > hi {
                return Err(Error::InvalidRange {
                    min: lo.to_string(),
                    max: hi.to_string(),
                });
            }
        }
        Ok(Self { min, max })
    }

    /// Range accepting every standard version.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Lower bound, if any.
    #[must_use]
    pub fn min(&self) -> Option<&Version> {
        self.min.as_ref()
    }

    /// Upper bound, if any.
    #[must_use]
    pub fn max(&self) -> Option<&Version> {
        self.max.as_ref()
    }

    /// Returns true when `version` lies within the range.
    #[must_use]
    pub fn contains(&self, version: &Version) -> bool {
        self.min.as_ref().is_none_or(|min| version >= min)
            && self.max.as_ref().is_none_or(|max| version <= max)
    }
}

//! Decorator identifiers.

use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MAX_NAME_LEN: usize = 64;

/// Case-sensitive identifier of a decorator, e.g. `Reasoning` or `ELI5`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DecoratorName(String);

impl DecoratorName {
    /// Creates a decorator name after validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if the name is empty, too long, does not
    /// start with an ASCII letter, or contains characters other than ASCII
    /// alphanumerics and underscores.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name cannot be empty".to_owned()
    } else if name.len() > MAX_NAME_LEN {
        format!("name length must be <= {MAX_NAME_LEN}")
    } else if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        "name must start with an ASCII letter".to_owned()
    } else if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        "name must contain only ASCII letters, digits, or underscores".to_owned()
    } else {
        return Ok(());
    };

    Err(Error::InvalidName {
        name: name.to_owned(),
        reason,
    })
}

impl Display for DecoratorName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for DecoratorName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DecoratorName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for DecoratorName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DecoratorName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl TryFrom<String> for DecoratorName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl FromStr for DecoratorName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl From<DecoratorName> for String {
    fn from(value: DecoratorName) -> Self {
        value.0
    }
}

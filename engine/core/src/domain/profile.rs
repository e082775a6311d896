// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Voice profile identity

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ValidationError;

/// Name of the built-in profile backed by the default sample file
pub const DEFAULT_PROFILE: &str = "default";

/// Validated voice profile name.
///
/// Keeps the name as given by the user and derives a filesystem-safe slug
/// used for every per-profile file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfileName(String);

impl ProfileName {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyField("profile_name"));
        }
        if slugify(trimmed).is_empty() {
            return Err(ValidationError::InvalidProfileName(name));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase, keeps `[a-z0-9 _-]`, spaces become underscores
    pub fn slug(&self) -> String {
        slugify(&self.0)
    }

    /// Matches by slug, like every other per-profile lookup
    pub fn is_default(&self) -> bool {
        self.slug() == DEFAULT_PROFILE
    }
}

fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, ' ' | '_' | '-'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

impl TryFrom<String> for ProfileName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProfileName> for String {
    fn from(value: ProfileName) -> Self {
        value.0
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        let name = ProfileName::new("My Tech Voice!").unwrap();
        assert_eq!(name.slug(), "my_tech_voice");
        assert_eq!(name.as_str(), "My Tech Voice!");
    }

    #[test]
    fn test_rejects_empty_and_unsluggable() {
        assert_eq!(
            ProfileName::new("   "),
            Err(ValidationError::EmptyField("profile_name"))
        );
        assert!(matches!(
            ProfileName::new("!!!"),
            Err(ValidationError::InvalidProfileName(_))
        ));
    }

    #[test]
    fn test_default_profile() {
        assert!(ProfileName::new("default").unwrap().is_default());
        assert!(ProfileName::new("Default").unwrap().is_default());
        assert!(ProfileName::new(" DEFAULT ").unwrap().is_default());
        assert!(!ProfileName::new("work").unwrap().is_default());
    }
}

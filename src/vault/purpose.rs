//! Purpose tags that scope vault keys.
//!
//! Each purpose projects onto a stable string, and the string is what the
//! key derivation sees (`"local:" + tag`). Renaming a projection would
//! orphan every blob written under it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longest accepted application-defined tag
pub const MAX_CUSTOM_TAG_LEN: usize = 64;

/// What a vault key is used for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Purpose {
    /// The persisted credentials record
    Credentials,
    /// Wrapped key material
    Key,
    /// Field-level codec: values
    FieldValue,
    /// Field-level codec: aliases
    FieldAlias,
    /// Field-level codec: tags
    FieldTag,
    /// Validated application-defined tag
    Custom(CustomTag),
}

/// An application-defined purpose tag: `[a-z0-9-]`, 1 to 64 chars
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomTag(String);

impl CustomTag {
    /// The validated tag text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Purpose {
    /// Every built-in purpose
    pub const BUILTIN: [Purpose; 5] = [
        Purpose::Credentials,
        Purpose::Key,
        Purpose::FieldValue,
        Purpose::FieldAlias,
        Purpose::FieldTag,
    ];

    /// Stable string projection fed into key derivation
    pub fn as_str(&self) -> &str {
        match self {
            Purpose::Credentials => "credentials",
            Purpose::Key => "key",
            Purpose::FieldValue => "field-value",
            Purpose::FieldAlias => "field-alias",
            Purpose::FieldTag => "field-tag",
            Purpose::Custom(tag) => tag.as_str(),
        }
    }

    /// Whether this purpose belongs to the field-level codec
    pub fn is_field(&self) -> bool {
        matches!(
            self,
            Purpose::FieldValue | Purpose::FieldAlias | Purpose::FieldTag
        )
    }

    /// Build an application-defined purpose, validating the tag
    ///
    /// Tags equal to a built-in projection resolve to the built-in variant.
    pub fn custom(tag: &str) -> Result<Self> {
        tag.parse()
    }
}

impl FromStr for Purpose {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(builtin) = Self::BUILTIN.iter().find(|p| p.as_str() == s) {
            return Ok(builtin.clone());
        }

        let valid = !s.is_empty()
            && s.len() <= MAX_CUSTOM_TAG_LEN
            && !s.starts_with('-')
            && s
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if !valid {
            return Err(Error::UnknownPurpose(s.to_string()));
        }

        Ok(Purpose::Custom(CustomTag(s.to_string())))
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Purpose {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Purpose> for String {
    fn from(purpose: Purpose) -> Self {
        purpose.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_projections_are_stable() {
        assert_eq!(Purpose::Credentials.as_str(), "credentials");
        assert_eq!(Purpose::Key.as_str(), "key");
        assert_eq!(Purpose::FieldValue.as_str(), "field-value");
        assert_eq!(Purpose::FieldAlias.as_str(), "field-alias");
        assert_eq!(Purpose::FieldTag.as_str(), "field-tag");
    }

    #[test]
    fn test_parse_resolves_builtins() {
        for purpose in Purpose::BUILTIN {
            assert_eq!(purpose.as_str().parse::<Purpose>().unwrap(), purpose);
        }
    }

    #[test]
    fn test_custom_tags() {
        let purpose = Purpose::custom("notes-v2").unwrap();
        assert_eq!(purpose.as_str(), "notes-v2");
        assert!(!purpose.is_field());

        let too_long = "x".repeat(65);
        for bad in ["", "Notes", "a b", "-lead", "é", too_long.as_str()] {
            assert!(
                matches!(Purpose::custom(bad), Err(Error::UnknownPurpose(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_field_purposes() {
        assert!(Purpose::FieldValue.is_field());
        assert!(Purpose::FieldTag.is_field());
        assert!(!Purpose::Credentials.is_field());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Purpose::FieldAlias).unwrap();
        assert_eq!(json, "\"field-alias\"");

        let parsed: Purpose = serde_json::from_str("\"credentials\"").unwrap();
        assert_eq!(parsed, Purpose::Credentials);

        assert!(serde_json::from_str::<Purpose>("\"NOPE\"").is_err());
    }
}

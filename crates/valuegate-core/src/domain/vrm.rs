use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

pub const MAX_VRM_LEN: usize = 7;

/// Vehicle registration mark, kept exactly as given.
///
/// Only emptiness and length are checked; case and punctuation are part of
/// the stored key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Vrm(String);

impl Vrm {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.trim().is_empty() {
            return Err(ValidationError::EmptyVrm);
        }

        let len = input.chars().count();
        if len > MAX_VRM_LEN {
            return Err(ValidationError::VrmTooLong {
                len,
                max: MAX_VRM_LEN,
            });
        }

        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Vrm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Vrm {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Vrm {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Vrm> for String {
    fn from(value: Vrm) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_input_verbatim() {
        let lower = Vrm::parse("ab12cde").expect("vrm should parse");
        assert_eq!(lower.as_str(), "ab12cde");
        assert_ne!(lower, Vrm::parse("AB12CDE").expect("vrm should parse"));
    }

    #[test]
    fn accepts_punctuation_within_length() {
        assert_eq!(Vrm::parse("AB-12").map(String::from), Ok("AB-12".to_string()));
    }

    #[test]
    fn accepts_exactly_seven_characters() {
        assert!(Vrm::parse("AB12CDE").is_ok());
    }

    #[test]
    fn rejects_eight_characters() {
        let err = Vrm::parse("12345678").expect_err("must fail");
        assert_eq!(err, ValidationError::VrmTooLong { len: 8, max: 7 });
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(Vrm::parse(""), Err(ValidationError::EmptyVrm));
        assert_eq!(Vrm::parse("   "), Err(ValidationError::EmptyVrm));
    }
}

// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const ID_MAX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    Trimmed(&'static str),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::Trimmed(name) => {
                write!(f, "{name} must not contain leading/trailing whitespace")
            }
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::InvalidFormat(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ParseError {}

macro_rules! opaque_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn parse(input: &str) -> Result<Self, ParseError> {
                if input.is_empty() {
                    return Err(ParseError::Empty($label));
                }
                if input.trim() != input {
                    return Err(ParseError::Trimmed($label));
                }
                if input.len() > ID_MAX_LEN {
                    return Err(ParseError::TooLong($label, ID_MAX_LEN));
                }
                Ok(Self(input.to_string()))
            }

            /// A freshly generated random id.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(UserId, "user_id");
opaque_id!(VideoId, "video_id");
opaque_id!(TaskId, "task_id");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_empty_and_padded_ids() {
        assert_eq!(TaskId::parse(""), Err(ParseError::Empty("task_id")));
        assert_eq!(UserId::parse(" x"), Err(ParseError::Trimmed("user_id")));
        assert_eq!(
            VideoId::parse(&"v".repeat(ID_MAX_LEN + 1)),
            Err(ParseError::TooLong("video_id", ID_MAX_LEN))
        );
    }

    #[test]
    fn generated_ids_are_unique_and_parseable() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert_ne!(a, b);
        assert_eq!(TaskId::parse(a.as_str()).expect("roundtrip"), a);
    }
}
